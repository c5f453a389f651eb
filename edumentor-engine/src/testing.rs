//! In-memory doubles for the engine's trait seams, for unit and integration
//! tests. Built only under `cfg(test)` or the `testing` feature.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use edumentor_core::audio_format::AudioEncoding;
use edumentor_core::errors::{CameraError, MicrophoneError};
use edumentor_core::profile::StudentProfile;
use edumentor_core::speech::{Utterance, Voice};
use edumentor_core::types::{DataUrl, ImageSource, SessionRecord};
use tokio::sync::mpsc;

use crate::traits::{
    ActiveRecording, Camera, CameraStream, CapturedImage, Microphone, ProfileStorage,
    QueryBackend, QueryResponse, RecorderEvent, RegisterResponse, RequestContext,
    SpeechSynthesizer,
};

#[derive(Debug, Default)]
pub struct MemoryProfileStorage {
    record: Mutex<Option<SessionRecord>>,
    fail_saves: AtomicBool,
    corrupt: AtomicBool,
    saves: Mutex<usize>,
}

impl MemoryProfileStorage {
    pub fn with_record(record: SessionRecord) -> Self {
        let s = Self::default();
        *s.record.lock().unwrap() = Some(record);
        s
    }

    /// Every `load` reports an unreadable record.
    pub fn corrupt() -> Self {
        let s = Self::default();
        s.corrupt.store(true, Ordering::SeqCst);
        s
    }

    pub fn fail_saves(&self) {
        self.fail_saves.store(true, Ordering::SeqCst);
    }

    pub fn record(&self) -> Option<SessionRecord> {
        self.record.lock().unwrap().clone()
    }

    pub fn save_count(&self) -> usize {
        *self.saves.lock().unwrap()
    }
}

impl ProfileStorage for MemoryProfileStorage {
    fn load(&self) -> anyhow::Result<Option<SessionRecord>> {
        if self.corrupt.load(Ordering::SeqCst) {
            anyhow::bail!("decode session record: expected value at line 1 column 1");
        }
        Ok(self.record.lock().unwrap().clone())
    }

    fn save(&self, record: &SessionRecord) -> anyhow::Result<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            anyhow::bail!("disk full");
        }
        *self.record.lock().unwrap() = Some(record.clone());
        *self.saves.lock().unwrap() += 1;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    Register {
        session_id: String,
        profile: StudentProfile,
    },
    Text {
        session_id: String,
        query: String,
    },
    Image {
        session_id: String,
        mime_type: String,
        source: ImageSource,
    },
    Voice {
        session_id: String,
        mime_type: String,
    },
}

/// Scripted backend. Every call is recorded, even when it then fails.
#[derive(Debug)]
pub struct StubBackend {
    register: Mutex<RegisterResponse>,
    text: Mutex<QueryResponse>,
    image: Mutex<QueryResponse>,
    voice: Mutex<QueryResponse>,
    unreachable: AtomicBool,
    calls: Mutex<Vec<BackendCall>>,
}

impl Default for StubBackend {
    fn default() -> Self {
        Self {
            register: Mutex::new(RegisterResponse {
                success: true,
                error: None,
            }),
            text: Mutex::new(QueryResponse::answered("ok")),
            image: Mutex::new(QueryResponse::answered("ok")),
            voice: Mutex::new(QueryResponse::answered("ok")),
            unreachable: AtomicBool::new(false),
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl StubBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_register(self, resp: RegisterResponse) -> Self {
        *self.register.lock().unwrap() = resp;
        self
    }

    pub fn on_text(self, resp: QueryResponse) -> Self {
        *self.text.lock().unwrap() = resp;
        self
    }

    pub fn on_image(self, resp: QueryResponse) -> Self {
        *self.image.lock().unwrap() = resp;
        self
    }

    pub fn on_voice(self, resp: QueryResponse) -> Self {
        *self.voice.lock().unwrap() = resp;
        self
    }

    /// Every subsequent call fails at the transport layer.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: BackendCall) -> anyhow::Result<()> {
        self.calls.lock().unwrap().push(call);
        if self.unreachable.load(Ordering::SeqCst) {
            anyhow::bail!("connection refused");
        }
        Ok(())
    }
}

#[async_trait]
impl QueryBackend for StubBackend {
    async fn register_student(&self, ctx: RequestContext<'_>) -> anyhow::Result<RegisterResponse> {
        self.record(BackendCall::Register {
            session_id: ctx.session.to_string(),
            profile: ctx.profile.clone(),
        })?;
        Ok(self.register.lock().unwrap().clone())
    }

    async fn submit_text(
        &self,
        ctx: RequestContext<'_>,
        text: &str,
    ) -> anyhow::Result<QueryResponse> {
        self.record(BackendCall::Text {
            session_id: ctx.session.to_string(),
            query: text.to_string(),
        })?;
        Ok(self.text.lock().unwrap().clone())
    }

    async fn submit_image(
        &self,
        ctx: RequestContext<'_>,
        image: &DataUrl,
        source: ImageSource,
    ) -> anyhow::Result<QueryResponse> {
        self.record(BackendCall::Image {
            session_id: ctx.session.to_string(),
            mime_type: image.mime_type().to_string(),
            source,
        })?;
        Ok(self.image.lock().unwrap().clone())
    }

    async fn submit_voice(
        &self,
        ctx: RequestContext<'_>,
        audio: &DataUrl,
    ) -> anyhow::Result<QueryResponse> {
        self.record(BackendCall::Voice {
            session_id: ctx.session.to_string(),
            mime_type: audio.mime_type().to_string(),
        })?;
        Ok(self.voice.lock().unwrap().clone())
    }
}

/// Microphone that replays fixed chunks, or refuses to open.
#[derive(Debug)]
pub struct ScriptedMicrophone {
    supported: Vec<AudioEncoding>,
    chunks: Vec<Vec<u8>>,
    reported_mime: Option<Option<String>>,
    failure: Option<MicrophoneError>,
    released: Arc<AtomicBool>,
}

impl ScriptedMicrophone {
    pub fn new(supported: Vec<AudioEncoding>) -> Self {
        Self {
            supported,
            chunks: Vec::new(),
            reported_mime: None,
            failure: None,
            released: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn failing(err: MicrophoneError) -> Self {
        let mut mic = Self::new(vec![AudioEncoding::Wav]);
        mic.failure = Some(err);
        mic
    }

    pub fn with_chunks(mut self, chunks: Vec<Vec<u8>>) -> Self {
        self.chunks = chunks;
        self
    }

    /// Overrides the MIME the encoder reports; by default it reports the
    /// chosen encoding's MIME.
    pub fn with_reported_mime(mut self, mime: Option<&str>) -> Self {
        self.reported_mime = Some(mime.map(str::to_string));
        self
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Microphone for ScriptedMicrophone {
    fn supported_encodings(&self) -> Vec<AudioEncoding> {
        self.supported.clone()
    }

    async fn start(
        &self,
        encoding: AudioEncoding,
    ) -> Result<Box<dyn ActiveRecording>, MicrophoneError> {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        self.released.store(false, Ordering::SeqCst);
        let mime_type = match &self.reported_mime {
            Some(m) => m.clone(),
            None => encoding.mime_type().map(str::to_string),
        };
        Ok(Box::new(ScriptedRecording {
            mime_type,
            chunks: self.chunks.clone(),
            released: self.released.clone(),
        }))
    }
}

struct ScriptedRecording {
    mime_type: Option<String>,
    chunks: Vec<Vec<u8>>,
    released: Arc<AtomicBool>,
}

impl ActiveRecording for ScriptedRecording {
    fn mime_type(&self) -> Option<String> {
        self.mime_type.clone()
    }

    fn stop(self: Box<Self>) -> mpsc::UnboundedReceiver<RecorderEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        for chunk in self.chunks {
            let _ = tx.send(RecorderEvent::Data(chunk));
        }
        let _ = tx.send(RecorderEvent::Stopped);
        self.released.store(true, Ordering::SeqCst);
        rx
    }
}

/// Camera that yields one fixed still, or is denied.
#[derive(Debug)]
pub struct ScriptedCamera {
    still: Result<CapturedImage, CameraError>,
    denied: bool,
    released: Arc<AtomicBool>,
}

impl ScriptedCamera {
    pub fn with_still(mime_type: &str, bytes: Vec<u8>) -> Self {
        Self {
            still: Ok(CapturedImage {
                mime_type: mime_type.to_string(),
                bytes,
            }),
            denied: false,
            released: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn denied() -> Self {
        Self {
            still: Err(CameraError::PermissionDenied),
            denied: true,
            released: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Opens fine, but grabbing the frame fails.
    pub fn broken_capture() -> Self {
        Self {
            still: Err(CameraError::Capture("frame unavailable".into())),
            denied: false,
            released: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Camera for ScriptedCamera {
    async fn open(&self) -> Result<Box<dyn CameraStream>, CameraError> {
        if self.denied {
            return Err(CameraError::PermissionDenied);
        }
        self.released.store(false, Ordering::SeqCst);
        Ok(Box::new(ScriptedStream {
            still: self.still.clone(),
            released: self.released.clone(),
        }))
    }
}

struct ScriptedStream {
    still: Result<CapturedImage, CameraError>,
    released: Arc<AtomicBool>,
}

#[async_trait]
impl CameraStream for ScriptedStream {
    async fn capture_still(&mut self) -> Result<CapturedImage, CameraError> {
        self.still.clone()
    }

    fn stop(&mut self) {
        self.released.store(true, Ordering::SeqCst);
    }
}

#[derive(Debug, Default)]
pub struct MemorySynthesizer {
    voices: Vec<Voice>,
    fail: bool,
    spoken: Mutex<Vec<Utterance>>,
}

impl MemorySynthesizer {
    pub fn new(voices: Vec<Voice>) -> Self {
        Self {
            voices,
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn spoken(&self) -> Vec<Utterance> {
        self.spoken.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechSynthesizer for MemorySynthesizer {
    fn voices(&self) -> Vec<Voice> {
        self.voices.clone()
    }

    async fn speak(&self, utterance: &Utterance) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("no speech engine available");
        }
        self.spoken.lock().unwrap().push(utterance.clone());
        Ok(())
    }
}
