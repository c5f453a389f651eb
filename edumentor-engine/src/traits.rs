use async_trait::async_trait;
use edumentor_core::audio_format::AudioEncoding;
use edumentor_core::errors::{CameraError, MicrophoneError};
use edumentor_core::profile::StudentProfile;
use edumentor_core::speech::{Utterance, Voice};
use edumentor_core::types::{DataUrl, ImageSource, SessionRecord, SessionToken};
use tokio::sync::mpsc;

pub use edumentor_providers::parse::{QueryResponse, RegisterResponse};

/// Cross-cutting context attached to every backend call.
#[derive(Debug, Clone, Copy)]
pub struct RequestContext<'a> {
    pub session: &'a SessionToken,
    pub profile: &'a StudentProfile,
}

/// One network exchange per call. `Err` means the backend could not be reached
/// or answered with something undecodable; `success: false` comes back as `Ok`.
#[async_trait]
pub trait QueryBackend: Send + Sync {
    async fn register_student(&self, ctx: RequestContext<'_>) -> anyhow::Result<RegisterResponse>;

    async fn submit_text(&self, ctx: RequestContext<'_>, text: &str)
    -> anyhow::Result<QueryResponse>;

    async fn submit_image(
        &self,
        ctx: RequestContext<'_>,
        image: &DataUrl,
        source: ImageSource,
    ) -> anyhow::Result<QueryResponse>;

    async fn submit_voice(
        &self,
        ctx: RequestContext<'_>,
        audio: &DataUrl,
    ) -> anyhow::Result<QueryResponse>;
}

/// Holds the single persisted session record.
pub trait ProfileStorage: Send + Sync {
    fn load(&self) -> anyhow::Result<Option<SessionRecord>>;
    fn save(&self, record: &SessionRecord) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedImage {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

#[async_trait]
pub trait Camera: Send + Sync {
    /// Requests the device and starts a live stream.
    async fn open(&self) -> Result<Box<dyn CameraStream>, CameraError>;
}

#[async_trait]
pub trait CameraStream: Send {
    /// Grabs one still frame, already encoded (e.g. JPEG).
    async fn capture_still(&mut self) -> Result<CapturedImage, CameraError>;

    /// Releases the device. Must be idempotent.
    fn stop(&mut self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecorderEvent {
    Data(Vec<u8>),
    Stopped,
}

#[async_trait]
pub trait Microphone: Send + Sync {
    /// Capability probe: encodings this device/encoder can produce.
    fn supported_encodings(&self) -> Vec<AudioEncoding>;

    async fn start(
        &self,
        encoding: AudioEncoding,
    ) -> Result<Box<dyn ActiveRecording>, MicrophoneError>;
}

pub trait ActiveRecording: Send {
    /// MIME type reported by the encoder, if it reports one.
    fn mime_type(&self) -> Option<String>;

    /// Stops capture and releases the device. The returned stream yields every
    /// buffered chunk and then `Stopped`.
    fn stop(self: Box<Self>) -> mpsc::UnboundedReceiver<RecorderEvent>;
}

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    fn voices(&self) -> Vec<Voice>;
    async fn speak(&self, utterance: &Utterance) -> anyhow::Result<()>;
}
