use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use edumentor_core::audio_format::AudioEncoding;
use edumentor_core::errors::MicrophoneError;
use edumentor_engine::traits::{ActiveRecording, Microphone, RecorderEvent};
use tokio::sync::mpsc;

use crate::SPEECH_SAMPLE_RATE_HZ;
use crate::resample::resample_mono;
use crate::wav::{decode_wav, encode_wav};

const DEFAULT_CHUNK_BYTES: usize = 32 * 1024;

/// Plays a WAV file back as if it had just been recorded. The audio is
/// normalized to 16 kHz mono and delivered in fixed-size chunks.
#[derive(Debug, Clone)]
pub struct WavFileMicrophone {
    path: PathBuf,
    chunk_bytes: usize,
}

impl WavFileMicrophone {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            chunk_bytes: DEFAULT_CHUNK_BYTES,
        }
    }

    pub fn with_chunk_bytes(mut self, chunk_bytes: usize) -> Self {
        self.chunk_bytes = chunk_bytes.max(1);
        self
    }

    fn load(&self) -> Result<Vec<u8>, MicrophoneError> {
        let raw = std::fs::read(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => MicrophoneError::NoDevice,
            ErrorKind::PermissionDenied => MicrophoneError::PermissionDenied,
            _ => MicrophoneError::Other(format!("{}: {e}", self.path.display())),
        })?;

        let normalize = || -> anyhow::Result<Vec<u8>> {
            let decoded = decode_wav(&raw)?;
            let samples =
                resample_mono(&decoded.samples, decoded.sample_rate_hz, SPEECH_SAMPLE_RATE_HZ)?;
            encode_wav(&samples, SPEECH_SAMPLE_RATE_HZ)
        };
        normalize().map_err(|e| MicrophoneError::Other(format!("unreadable recording: {e:#}")))
    }
}

#[async_trait]
impl Microphone for WavFileMicrophone {
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
        let wav = self.load()?;
        log::info!("replaying {} ({} bytes)", self.path.display(), wav.len());
        Ok(Box::new(FileRecording {
            wav,
            chunk_bytes: self.chunk_bytes,
        }))
    }
}

struct FileRecording {
    wav: Vec<u8>,
    chunk_bytes: usize,
}

impl ActiveRecording for FileRecording {
    fn mime_type(&self) -> Option<String> {
        AudioEncoding::Wav.mime_type().map(str::to_string)
    }

    fn stop(self: Box<Self>) -> mpsc::UnboundedReceiver<RecorderEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        for chunk in self.wav.chunks(self.chunk_bytes) {
            let _ = tx.send(RecorderEvent::Data(chunk.to_vec()));
        }
        let _ = tx.send(RecorderEvent::Stopped);
        rx
    }
}
