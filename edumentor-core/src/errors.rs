// User-facing messages for the error taxonomy. Wording is shown verbatim in
// the transcript, so keep it stable.

pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please check your connection.";
pub const REGISTERED_MESSAGE: &str = "Student information saved successfully!";

const MICROPHONE_PREFIX: &str = "Unable to access microphone. ";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please register your student information first")]
    NotRegistered,

    #[error("Please select your class/level")]
    MissingClass,

    #[error("Please enter your question")]
    EmptyQuestion,

    #[error("Please select an image")]
    NoImageSelected,

    #[error("No audio was captured. Please try recording again.")]
    NoAudioCaptured,

    #[error("No recording in progress")]
    NotRecording,

    #[error("A recording is already in progress")]
    AlreadyRecording,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MicrophoneError {
    #[error("microphone permission denied")]
    PermissionDenied,

    #[error("no microphone found")]
    NoDevice,

    #[error("voice recording not supported")]
    Unsupported,

    #[error("microphone blocked by security restrictions")]
    InsecureContext,

    #[error("{0}")]
    Other(String),
}

impl MicrophoneError {
    pub fn user_message(&self) -> String {
        let detail = match self {
            MicrophoneError::PermissionDenied => {
                "Please allow microphone access in your system settings and try again."
            }
            MicrophoneError::NoDevice => {
                "No microphone found. Please connect a microphone and try again."
            }
            MicrophoneError::Unsupported => {
                "Voice recording is not supported on this platform or build."
            }
            MicrophoneError::InsecureContext => {
                "Microphone access blocked due to security restrictions."
            }
            MicrophoneError::Other(msg) if !msg.trim().is_empty() => msg.as_str(),
            MicrophoneError::Other(_) => "Please check your microphone settings.",
        };
        format!("{MICROPHONE_PREFIX}{detail}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CameraError {
    #[error("camera permission denied")]
    PermissionDenied,

    #[error("no camera found")]
    NoDevice,

    #[error("camera capture failed: {0}")]
    Capture(String),
}

impl CameraError {
    pub fn user_message(&self) -> String {
        match self {
            CameraError::PermissionDenied | CameraError::NoDevice => {
                "Could not access camera.".into()
            }
            CameraError::Capture(_) => "Failed to capture image from camera.".into(),
        }
    }
}

/// Appended after a microphone failure so the user has something to act on.
pub fn microphone_troubleshooting() -> &'static str {
    "🎤 **Microphone Troubleshooting:**\n\
     1. **Allow Permissions:** grant microphone access to this terminal in your OS privacy settings\n\
     2. **Check Device:** make sure a microphone is connected and selected as the default input\n\
     3. **Test Microphone:** ensure your microphone works in other applications\n\
     4. **Use a Recording:** pass a WAV file instead of recording live"
}
