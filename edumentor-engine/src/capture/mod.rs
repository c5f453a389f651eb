pub mod image;
pub mod text;
pub mod voice;

use edumentor_core::errors::{CameraError, MicrophoneError, ValidationError};

pub use image::{CameraState, ImageCapture, ImageFile};
pub use text::read_question;
pub use voice::{RecordingState, VoiceCapture};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CaptureError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Microphone(#[from] MicrophoneError),

    #[error(transparent)]
    Camera(#[from] CameraError),
}
