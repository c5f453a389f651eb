use serde::{Deserialize, Serialize};

/// MIME used when the encoder does not report one.
pub const FALLBACK_AUDIO_MIME: &str = "audio/wav";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioEncoding {
    Wav,
    WebmOpus,
    Webm,
    Mp4,
    EncoderDefault,
}

impl AudioEncoding {
    /// Uncompressed first, then compressed with a known codec, then generic.
    pub const PREFERENCE: [AudioEncoding; 4] = [
        AudioEncoding::Wav,
        AudioEncoding::WebmOpus,
        AudioEncoding::Webm,
        AudioEncoding::Mp4,
    ];

    pub fn mime_type(self) -> Option<&'static str> {
        match self {
            AudioEncoding::Wav => Some("audio/wav"),
            AudioEncoding::WebmOpus => Some("audio/webm;codecs=opus"),
            AudioEncoding::Webm => Some("audio/webm"),
            AudioEncoding::Mp4 => Some("audio/mp4"),
            AudioEncoding::EncoderDefault => None,
        }
    }
}

/// Picks the best encoding a device reports as supported.
pub fn select_encoding(supported: &[AudioEncoding]) -> AudioEncoding {
    AudioEncoding::PREFERENCE
        .into_iter()
        .find(|e| supported.contains(e))
        .unwrap_or(AudioEncoding::EncoderDefault)
}
