use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::profile::StudentProfile;

/// Fixed key under which the session record is persisted.
pub const SESSION_STORAGE_KEY: &str = "eduMentorSession";

const SESSION_SUFFIX_LEN: usize = 9;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(pub String);

impl SessionToken {
    /// `session_<unix-ms>_<base36 suffix>`. Unique in practice, not a secret.
    pub fn generate() -> Self {
        let ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        Self(format!("session_{ms}_{}", random_base36(SESSION_SUFFIX_LEN)))
    }

    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn random_base36(len: usize) -> String {
    const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    // Low bits of a v4 UUID are random; 9 base36 digits need ~47 of them.
    let mut n = Uuid::new_v4().as_u128();
    let mut out = String::with_capacity(len);
    for _ in 0..len {
        out.push(ALPHABET[(n % 36) as usize] as char);
        n /= 36;
    }
    out
}

/// The single persisted record: `{sessionId, studentInfo}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub session_id: SessionToken,
    pub student_info: StudentProfile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    Text,
    Image,
    Voice,
}

impl InputMode {
    pub const ALL: [InputMode; 3] = [InputMode::Text, InputMode::Image, InputMode::Voice];

    pub fn as_str(self) -> &'static str {
        match self {
            InputMode::Text => "text",
            InputMode::Image => "image",
            InputMode::Voice => "voice",
        }
    }
}

impl fmt::Display for InputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(InputMode::Text),
            "image" => Ok(InputMode::Image),
            "voice" => Ok(InputMode::Voice),
            other => Err(format!("unknown input mode: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TranscriptRole {
    User,
    Ai,
    ExtractedText,
    TranscribedText,
    Error,
    Success,
}

impl TranscriptRole {
    pub fn as_str(self) -> &'static str {
        match self {
            TranscriptRole::User => "user",
            TranscriptRole::Ai => "ai",
            TranscriptRole::ExtractedText => "extracted-text",
            TranscriptRole::TranscribedText => "transcribed-text",
            TranscriptRole::Error => "error",
            TranscriptRole::Success => "success",
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DataUrlError {
    #[error("not a data URL")]
    NotDataUrl,

    #[error("data URL is not base64 encoded")]
    NotBase64,

    #[error("invalid base64 payload: {0}")]
    Decode(String),
}

/// `data:<mime>;base64,<payload>` as produced by the capture adapters.
#[derive(Clone, PartialEq, Eq)]
pub struct DataUrl {
    mime_type: String,
    payload: String,
}

impl DataUrl {
    pub fn encode(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.into(),
            payload: STANDARD.encode(bytes),
        }
    }

    pub fn parse(raw: &str) -> Result<Self, DataUrlError> {
        let rest = raw.strip_prefix("data:").ok_or(DataUrlError::NotDataUrl)?;
        let (meta, payload) = rest.split_once(',').ok_or(DataUrlError::NotDataUrl)?;
        let mime_type = meta
            .strip_suffix(";base64")
            .ok_or(DataUrlError::NotBase64)?;
        Ok(Self {
            mime_type: mime_type.to_string(),
            payload: payload.to_string(),
        })
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn decode(&self) -> Result<Vec<u8>, DataUrlError> {
        STANDARD
            .decode(self.payload.as_bytes())
            .map_err(|e| DataUrlError::Decode(e.to_string()))
    }

    pub fn payload_len(&self) -> usize {
        self.payload.len()
    }
}

impl fmt::Display for DataUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data:{};base64,{}", self.mime_type, self.payload)
    }
}

// Payloads can be megabytes of base64; never dump them into logs.
impl fmt::Debug for DataUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataUrl")
            .field("mime_type", &self.mime_type)
            .field("payload_len", &self.payload.len())
            .finish()
    }
}

const MEDIA_TYPES: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("bmp", "image/bmp"),
    ("heic", "image/heic"),
    ("wav", "audio/wav"),
    ("webm", "audio/webm"),
    ("m4a", "audio/mp4"),
    ("ogg", "audio/ogg"),
];

pub fn mime_for_extension(ext: &str) -> Option<&'static str> {
    let ext = ext.trim_start_matches('.').to_ascii_lowercase();
    MEDIA_TYPES
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, mime)| *mime)
}

/// File extension for an upload name; codec parameters are ignored.
pub fn extension_for_mime(mime: &str) -> &'static str {
    let base = mime.split(';').next().unwrap_or_default().trim();
    MEDIA_TYPES
        .iter()
        .find(|(_, m)| *m == base)
        .map(|(e, _)| *e)
        .unwrap_or("bin")
}

/// Where an image came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageSource {
    File,
    Camera,
}

/// What a capture adapter hands to the backend client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapturePayload {
    Text(String),
    Image(DataUrl, ImageSource),
    Voice(DataUrl),
}

impl CapturePayload {
    pub fn mode(&self) -> InputMode {
        match self {
            CapturePayload::Text(_) => InputMode::Text,
            CapturePayload::Image(..) => InputMode::Image,
            CapturePayload::Voice(_) => InputMode::Voice,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_token_has_time_prefix_and_suffix() {
        let token = SessionToken::generate();
        let parts: Vec<&str> = token.as_str().split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "session");
        assert!(parts[1].parse::<u128>().is_ok());
        assert_eq!(parts[2].len(), SESSION_SUFFIX_LEN);
        assert!(parts[2].chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn generated_tokens_differ() {
        assert_ne!(SessionToken::generate(), SessionToken::generate());
    }

    #[test]
    fn session_record_uses_storage_field_names() {
        let record = SessionRecord {
            session_id: SessionToken::new("session_1_abc"),
            student_info: StudentProfile::new("10"),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["sessionId"], "session_1_abc");
        assert_eq!(json["studentInfo"]["class"], "10");
        assert_eq!(json["studentInfo"]["language"], "English");
    }

    #[test]
    fn data_url_round_trips_through_string_form() {
        let url = DataUrl::encode("image/png", &[1, 2, 3, 4]);
        let text = url.to_string();
        assert!(text.starts_with("data:image/png;base64,"));

        let parsed = DataUrl::parse(&text).unwrap();
        assert_eq!(parsed.mime_type(), "image/png");
        assert_eq!(parsed.decode().unwrap(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn data_url_rejects_non_base64() {
        assert_eq!(DataUrl::parse("hello"), Err(DataUrlError::NotDataUrl));
        assert_eq!(
            DataUrl::parse("data:text/plain,hi"),
            Err(DataUrlError::NotBase64)
        );
    }

    #[test]
    fn data_url_debug_hides_payload() {
        let url = DataUrl::encode("audio/wav", b"secret-bytes");
        let s = format!("{url:?}");
        assert!(!s.contains(&url.to_string()));
        assert!(s.contains("audio/wav"));
    }

    #[test]
    fn media_types_map_both_ways() {
        assert_eq!(mime_for_extension("JPG"), Some("image/jpeg"));
        assert_eq!(mime_for_extension(".png"), Some("image/png"));
        assert_eq!(mime_for_extension("exe"), None);
        assert_eq!(extension_for_mime("image/jpeg"), "jpg");
        assert_eq!(extension_for_mime("audio/webm;codecs=opus"), "webm");
        assert_eq!(extension_for_mime("application/x-unknown"), "bin");
    }

    #[test]
    fn input_mode_parses_case_insensitively() {
        assert_eq!("Voice".parse::<InputMode>().unwrap(), InputMode::Voice);
        assert!("video".parse::<InputMode>().is_err());
    }
}
