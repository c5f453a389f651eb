pub mod file;
pub mod resample;
pub mod wav;

#[cfg(feature = "native")]
pub mod microphone;
#[cfg(feature = "native")]
pub mod recorder;

pub use file::WavFileMicrophone;
pub use wav::{DecodedWav, decode_wav, encode_wav};

#[cfg(feature = "native")]
pub use microphone::CpalMicrophone;
#[cfg(feature = "native")]
pub use recorder::{AudioCaptureError, AudioRecorder, CapturedAudio};

/// Rate the backend's speech recognizer expects.
pub const SPEECH_SAMPLE_RATE_HZ: u32 = 16_000;
