use async_trait::async_trait;
use edumentor_core::audio_format::AudioEncoding;
use edumentor_core::errors::MicrophoneError;
use edumentor_engine::traits::{ActiveRecording, Microphone, RecorderEvent};
use tokio::sync::mpsc;

use crate::SPEECH_SAMPLE_RATE_HZ;
use crate::recorder::{AudioCaptureError, AudioRecorder};
use crate::resample::resample_mono;
use crate::wav::encode_wav;

/// Live capture from a system input device. Produces 16 kHz mono WAV.
#[derive(Debug, Clone, Default)]
pub struct CpalMicrophone {
    device_name: Option<String>,
}

impl CpalMicrophone {
    pub fn new(device_name: Option<String>) -> Self {
        Self { device_name }
    }
}

#[async_trait]
impl Microphone for CpalMicrophone {
    fn supported_encodings(&self) -> Vec<AudioEncoding> {
        vec![AudioEncoding::Wav]
    }

    async fn start(
        &self,
        encoding: AudioEncoding,
    ) -> Result<Box<dyn ActiveRecording>, MicrophoneError> {
        if encoding != AudioEncoding::Wav {
            return Err(MicrophoneError::Unsupported);
        }

        let name = self.device_name.clone();
        let recorder = tokio::task::spawn_blocking(move || AudioRecorder::open_named(name.as_deref()))
            .await
            .map_err(|e| MicrophoneError::Other(format!("audio worker panicked: {e}")))?
            .map_err(classify)?;

        Ok(Box::new(CpalRecording { recorder }))
    }
}

/// Maps cpal failures onto the user-facing categories. cpal has no dedicated
/// permission error, so backend messages are inspected.
fn classify(err: AudioCaptureError) -> MicrophoneError {
    if matches!(err, AudioCaptureError::NoInputDevice) {
        return MicrophoneError::NoDevice;
    }
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();
    if ["permission", "denied", "not allowed", "access"]
        .iter()
        .any(|needle| lower.contains(needle))
    {
        return MicrophoneError::PermissionDenied;
    }
    if lower.contains("not supported") || lower.contains("unsupported") {
        return MicrophoneError::Unsupported;
    }
    MicrophoneError::Other(msg)
}

struct CpalRecording {
    recorder: AudioRecorder,
}

impl ActiveRecording for CpalRecording {
    fn mime_type(&self) -> Option<String> {
        AudioEncoding::Wav.mime_type().map(str::to_string)
    }

    fn stop(self: Box<Self>) -> mpsc::UnboundedReceiver<RecorderEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        let recorder = self.recorder;

        // Stopping waits on the worker thread; keep that off the async runtime.
        std::thread::spawn(move || {
            match finish(recorder) {
                Ok(wav) => {
                    let _ = tx.send(RecorderEvent::Data(wav));
                }
                Err(e) => log::error!("finishing recording failed: {e:#}"),
            }
            let _ = tx.send(RecorderEvent::Stopped);
        });
        rx
    }
}

fn finish(recorder: AudioRecorder) -> anyhow::Result<Vec<u8>> {
    let captured = recorder.stop()?;
    log::debug!(
        "captured {} samples at {} Hz",
        captured.samples.len(),
        captured.sample_rate_hz
    );
    if captured.samples.is_empty() {
        return Ok(Vec::new());
    }
    let samples = resample_mono(&captured.samples, captured.sample_rate_hz, SPEECH_SAMPLE_RATE_HZ)?;
    encode_wav(&samples, SPEECH_SAMPLE_RATE_HZ)
}
