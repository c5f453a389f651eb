use edumentor_core::audio_format::{AudioEncoding, FALLBACK_AUDIO_MIME, select_encoding};
use edumentor_core::errors::ValidationError;
use edumentor_core::types::DataUrl;
use tokio::sync::mpsc;

use super::CaptureError;
use crate::traits::{ActiveRecording, Microphone, RecorderEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingState {
    Idle,
    Recording,
}

/// Voice adapter: at most one recording at a time.
#[derive(Default)]
pub struct VoiceCapture {
    active: Option<Box<dyn ActiveRecording>>,
}

impl std::fmt::Debug for VoiceCapture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoiceCapture")
            .field("state", &self.state())
            .finish()
    }
}

impl VoiceCapture {
    pub fn state(&self) -> RecordingState {
        if self.active.is_some() {
            RecordingState::Recording
        } else {
            RecordingState::Idle
        }
    }

    pub fn can_stop(&self) -> bool {
        self.active.is_some()
    }

    pub async fn start(&mut self, mic: &dyn Microphone) -> Result<AudioEncoding, CaptureError> {
        if self.active.is_some() {
            return Err(ValidationError::AlreadyRecording.into());
        }

        let encoding = select_encoding(&mic.supported_encodings());
        log::debug!("recording with encoding {encoding:?}");

        let recording = mic.start(encoding).await?;
        self.active = Some(recording);
        Ok(encoding)
    }

    /// Stops the device and waits for every buffered chunk before encoding.
    pub async fn stop(&mut self) -> Result<DataUrl, CaptureError> {
        let recording = self
            .active
            .take()
            .ok_or(ValidationError::NotRecording)?;

        let mime_type = recording
            .mime_type()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| FALLBACK_AUDIO_MIME.to_string());

        let audio = collect_recording(recording.stop()).await;
        if audio.is_empty() {
            return Err(ValidationError::NoAudioCaptured.into());
        }

        log::debug!("recorded {} bytes as {mime_type}", audio.len());
        Ok(DataUrl::encode(mime_type, &audio))
    }
}

async fn collect_recording(mut events: mpsc::UnboundedReceiver<RecorderEvent>) -> Vec<u8> {
    let mut audio = Vec::new();
    while let Some(event) = events.recv().await {
        match event {
            RecorderEvent::Data(chunk) => audio.extend_from_slice(&chunk),
            RecorderEvent::Stopped => break,
        }
    }
    audio
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedMicrophone;
    use edumentor_core::errors::MicrophoneError;

    #[tokio::test]
    async fn chunks_are_joined_in_order_and_empty_ones_dropped() {
        let mic = ScriptedMicrophone::new(vec![AudioEncoding::Webm, AudioEncoding::Wav])
            .with_chunks(vec![b"RI".to_vec(), Vec::new(), b"FF".to_vec()]);
        let mut voice = VoiceCapture::default();

        let encoding = voice.start(&mic).await.unwrap();
        assert_eq!(encoding, AudioEncoding::Wav);
        assert_eq!(voice.state(), RecordingState::Recording);

        let url = voice.stop().await.unwrap();
        assert_eq!(url.mime_type(), "audio/wav");
        assert_eq!(url.decode().unwrap(), b"RIFF");
        assert_eq!(voice.state(), RecordingState::Idle);
        assert!(mic.is_released());
    }

    #[tokio::test]
    async fn missing_encoder_mime_falls_back_to_wav() {
        let mic = ScriptedMicrophone::new(Vec::new())
            .with_reported_mime(None)
            .with_chunks(vec![vec![1, 2]]);
        let mut voice = VoiceCapture::default();

        assert_eq!(voice.start(&mic).await.unwrap(), AudioEncoding::EncoderDefault);
        let url = voice.stop().await.unwrap();
        assert_eq!(url.mime_type(), FALLBACK_AUDIO_MIME);
    }

    #[tokio::test]
    async fn silence_is_not_submitted() {
        let mic = ScriptedMicrophone::new(vec![AudioEncoding::Wav]).with_chunks(vec![Vec::new()]);
        let mut voice = VoiceCapture::default();
        voice.start(&mic).await.unwrap();

        assert_eq!(
            voice.stop().await.unwrap_err(),
            CaptureError::Validation(ValidationError::NoAudioCaptured)
        );
        assert_eq!(voice.state(), RecordingState::Idle);
    }

    #[tokio::test]
    async fn stop_without_start_and_double_start_are_rejected() {
        let mic = ScriptedMicrophone::new(vec![AudioEncoding::Wav]).with_chunks(vec![vec![1]]);
        let mut voice = VoiceCapture::default();

        assert!(!voice.can_stop());
        assert_eq!(
            voice.stop().await.unwrap_err(),
            CaptureError::Validation(ValidationError::NotRecording)
        );

        voice.start(&mic).await.unwrap();
        assert_eq!(
            voice.start(&mic).await.unwrap_err(),
            CaptureError::Validation(ValidationError::AlreadyRecording)
        );
    }

    #[tokio::test]
    async fn denied_microphone_leaves_capture_idle() {
        let mic = ScriptedMicrophone::failing(MicrophoneError::PermissionDenied);
        let mut voice = VoiceCapture::default();

        assert_eq!(
            voice.start(&mic).await.unwrap_err(),
            CaptureError::Microphone(MicrophoneError::PermissionDenied)
        );
        assert_eq!(voice.state(), RecordingState::Idle);
    }
}
