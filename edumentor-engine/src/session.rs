use std::sync::Arc;

use edumentor_core::audio_format::AudioEncoding;
use edumentor_core::errors::{REGISTERED_MESSAGE, ValidationError, microphone_troubleshooting};
use edumentor_core::mode::InputModeController;
use edumentor_core::profile::StudentProfile;
use edumentor_core::speech::VoicePreference;
use edumentor_core::types::{
    CapturePayload, ImageSource, InputMode, SessionRecord, SessionToken, TranscriptRole,
};

use crate::capture::{
    CameraState, CaptureError, ImageCapture, ImageFile, RecordingState, VoiceCapture,
    read_question,
};
use crate::error::{ClientError, backend_error};
use crate::render::ResponseRenderer;
use crate::traits::{
    Camera, Microphone, ProfileStorage, QueryBackend, RequestContext, SpeechSynthesizer,
};
use crate::transcript::Transcript;

pub const IMAGE_UPLOADED_MESSAGE: &str = "📸 Image uploaded for analysis";
pub const VOICE_RECORDED_MESSAGE: &str = "🎤 Voice message recorded";

const REGISTER_FALLBACK: &str = "Failed to register student information";
const TEXT_FALLBACK: &str = "Failed to process your question";
const IMAGE_FALLBACK: &str = "Failed to process the image";
const VOICE_FALLBACK: &str = "Failed to process voice message";

/// One client session: identity, registration, capture state and transcript.
///
/// Every user action goes through `&mut self`, so actions on one session never
/// interleave. Any error an action returns has already been appended to the
/// transcript as an error entry.
pub struct ClientSession {
    token: SessionToken,
    profile: Option<StudentProfile>,
    backend: Arc<dyn QueryBackend>,
    storage: Arc<dyn ProfileStorage>,
    mode: InputModeController,
    image: ImageCapture,
    voice: VoiceCapture,
    renderer: ResponseRenderer,
}

impl std::fmt::Debug for ClientSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSession")
            .field("token", &self.token)
            .field("registered", &self.is_registered())
            .field("mode", &self.mode.current())
            .field("image", &self.image)
            .field("voice", &self.voice)
            .field("renderer", &self.renderer)
            .finish()
    }
}

impl ClientSession {
    /// Fresh, unregistered session with a newly generated token.
    pub fn new(backend: Arc<dyn QueryBackend>, storage: Arc<dyn ProfileStorage>) -> Self {
        Self {
            token: SessionToken::generate(),
            profile: None,
            backend,
            storage,
            mode: InputModeController::default(),
            image: ImageCapture::default(),
            voice: VoiceCapture::default(),
            renderer: ResponseRenderer::default(),
        }
    }

    /// Startup path: new session, then restore whatever storage holds.
    pub fn start(backend: Arc<dyn QueryBackend>, storage: Arc<dyn ProfileStorage>) -> Self {
        let mut session = Self::new(backend, storage);
        session.load();
        session
    }

    pub fn with_speech(
        mut self,
        synth: Arc<dyn SpeechSynthesizer>,
        preference: VoicePreference,
    ) -> Self {
        self.renderer = std::mem::take(&mut self.renderer).with_speech(synth, preference);
        self
    }

    /// Restores the persisted token and profile. An unreadable record counts as
    /// no record.
    pub fn load(&mut self) {
        match self.storage.load() {
            Ok(Some(record)) => {
                log::info!("restored session {}", record.session_id);
                self.token = record.session_id;
                self.profile = Some(record.student_info);
            }
            Ok(None) => log::debug!("no stored session; registration required"),
            Err(e) => log::warn!("ignoring unreadable session record: {e:#}"),
        }
    }

    pub fn token(&self) -> &SessionToken {
        &self.token
    }

    pub fn profile(&self) -> Option<&StudentProfile> {
        self.profile.as_ref()
    }

    pub fn is_registered(&self) -> bool {
        self.profile.is_some()
    }

    pub fn profile_summary(&self) -> Option<Vec<String>> {
        self.profile.as_ref().map(StudentProfile::summary_lines)
    }

    pub fn transcript(&self) -> &Transcript {
        self.renderer.transcript()
    }

    pub fn mode(&self) -> InputMode {
        self.mode.current()
    }

    pub fn select_mode(&mut self, mode: InputMode) {
        self.mode.select(mode);
    }

    pub fn mode_controller(&self) -> &InputModeController {
        &self.mode
    }

    pub fn camera_state(&self) -> CameraState {
        self.image.camera_state()
    }

    pub fn image_selection(&self) -> Option<String> {
        self.image.selection_label()
    }

    pub fn recording_state(&self) -> RecordingState {
        self.voice.state()
    }

    pub async fn register(&mut self, profile: StudentProfile) -> Result<(), ClientError> {
        let result = self.try_register(profile).await;
        self.report("register", result)
    }

    async fn try_register(&mut self, profile: StudentProfile) -> Result<(), ClientError> {
        profile.validate()?;

        let ctx = RequestContext {
            session: &self.token,
            profile: &profile,
        };
        let resp = self
            .backend
            .register_student(ctx)
            .await
            .map_err(ClientError::Connectivity)?;
        if !resp.success {
            return Err(backend_error(resp.error, REGISTER_FALLBACK));
        }

        let record = SessionRecord {
            session_id: self.token.clone(),
            student_info: profile,
        };
        self.storage.save(&record).map_err(ClientError::Storage)?;

        log::info!("registered session {}", self.token);
        self.profile = Some(record.student_info);
        self.renderer.append(TranscriptRole::Success, REGISTERED_MESSAGE);
        Ok(())
    }

    pub async fn submit_text(&mut self, raw: &str) -> Result<(), ClientError> {
        let result = self.try_submit_text(raw).await;
        self.report("text query", result)
    }

    async fn try_submit_text(&mut self, raw: &str) -> Result<(), ClientError> {
        self.require_registration()?;
        let query = read_question(raw)?;
        self.send(CapturePayload::Text(query)).await
    }

    pub fn select_image_file(&mut self, file: ImageFile) {
        self.image.select_file(file);
    }

    pub async fn start_camera(&mut self, camera: &dyn Camera) -> Result<(), ClientError> {
        let result: Result<(), ClientError> = self
            .image
            .start_camera(camera)
            .await
            .map_err(|e| CaptureError::from(e).into());
        self.report("camera", result)
    }

    pub fn stop_camera(&mut self) {
        self.image.stop_camera();
    }

    /// Grabs a still from the running camera and submits it.
    pub async fn capture_photo(&mut self) -> Result<(), ClientError> {
        let captured: Result<(), ClientError> = self
            .image
            .capture_still()
            .await
            .map_err(|e| CaptureError::from(e).into());
        self.report("camera capture", captured)?;
        self.submit_image().await
    }

    pub async fn submit_image(&mut self) -> Result<(), ClientError> {
        let result = self.try_submit_image().await;
        self.report("image query", result)
    }

    async fn try_submit_image(&mut self) -> Result<(), ClientError> {
        self.require_registration()?;
        let source = self
            .image
            .source()
            .ok_or(ValidationError::NoImageSelected)?;
        let image = self.image.encode()?;
        self.send(CapturePayload::Image(image, source)).await
    }

    /// Starts recording. A device failure also appends troubleshooting steps.
    pub async fn start_recording(
        &mut self,
        mic: &dyn Microphone,
    ) -> Result<AudioEncoding, ClientError> {
        let result = self.try_start_recording(mic).await;
        let result = self.report("microphone", result);
        if let Err(ClientError::Permission(_)) = &result {
            self.renderer
                .append(TranscriptRole::Ai, microphone_troubleshooting());
        }
        result
    }

    async fn try_start_recording(
        &mut self,
        mic: &dyn Microphone,
    ) -> Result<AudioEncoding, ClientError> {
        self.require_registration()?;
        Ok(self.voice.start(mic).await?)
    }

    /// Stops recording, then submits the finalized audio.
    pub async fn stop_recording(&mut self) -> Result<(), ClientError> {
        let result = self.try_stop_recording().await;
        self.report("voice query", result)
    }

    async fn try_stop_recording(&mut self) -> Result<(), ClientError> {
        let audio = self.voice.stop().await?;
        self.send(CapturePayload::Voice(audio)).await
    }

    fn require_registration(&self) -> Result<(), ValidationError> {
        if self.profile.is_none() {
            return Err(ValidationError::NotRegistered);
        }
        Ok(())
    }

    /// One query turn: user entry, backend call, optional extracted or
    /// transcribed entry, ai entry.
    async fn send(&mut self, payload: CapturePayload) -> Result<(), ClientError> {
        let user_entry = match &payload {
            CapturePayload::Text(query) => query.clone(),
            CapturePayload::Image(..) => IMAGE_UPLOADED_MESSAGE.to_string(),
            CapturePayload::Voice(_) => VOICE_RECORDED_MESSAGE.to_string(),
        };
        self.renderer.append(TranscriptRole::User, user_entry);

        let profile = self
            .profile
            .as_ref()
            .ok_or(ValidationError::NotRegistered)?;
        let ctx = RequestContext {
            session: &self.token,
            profile,
        };
        log::debug!("submitting {} query", payload.mode());
        let (resp, fallback) = match &payload {
            CapturePayload::Text(query) => (self.backend.submit_text(ctx, query).await, TEXT_FALLBACK),
            CapturePayload::Image(image, source) => (
                self.backend.submit_image(ctx, image, *source).await,
                IMAGE_FALLBACK,
            ),
            CapturePayload::Voice(audio) => {
                (self.backend.submit_voice(ctx, audio).await, VOICE_FALLBACK)
            }
        };

        let resp = resp.map_err(ClientError::Connectivity)?;
        if !resp.success {
            return Err(backend_error(resp.error, fallback));
        }

        match payload.mode() {
            InputMode::Image => {
                if let Some(text) = non_empty(resp.extracted_text) {
                    self.renderer.append(
                        TranscriptRole::ExtractedText,
                        format!("Extracted text: \"{text}\""),
                    );
                }
            }
            InputMode::Voice => {
                if let Some(text) = non_empty(resp.transcribed_text) {
                    self.renderer
                        .append(TranscriptRole::TranscribedText, format!("You said: \"{text}\""));
                }
            }
            InputMode::Text => {}
        }

        self.renderer
            .answer(resp.response.as_deref().unwrap_or_default())
            .await;
        Ok(())
    }

    fn report<T>(&mut self, action: &str, result: Result<T, ClientError>) -> Result<T, ClientError> {
        if let Err(e) = &result {
            match e {
                ClientError::Connectivity(src) | ClientError::Storage(src) => {
                    log::error!("{action} failed: {src:#}")
                }
                other => log::warn!("{action} failed ({}): {other}", other.kind()),
            }
            self.renderer.append(TranscriptRole::Error, e.to_string());
        }
        result
    }
}

fn non_empty(text: Option<String>) -> Option<String> {
    text.filter(|t| !t.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemoryProfileStorage, StubBackend};

    fn session() -> (ClientSession, Arc<StubBackend>, Arc<MemoryProfileStorage>) {
        let backend = Arc::new(StubBackend::new());
        let storage = Arc::new(MemoryProfileStorage::default());
        let s = ClientSession::start(backend.clone(), storage.clone());
        (s, backend, storage)
    }

    #[test]
    fn fresh_session_is_unregistered_in_text_mode() {
        let (s, _, _) = session();
        assert!(!s.is_registered());
        assert_eq!(s.mode(), InputMode::Text);
        assert!(s.token().as_str().starts_with("session_"));
        assert!(s.transcript().is_empty());
    }

    #[test]
    fn stored_record_restores_token_and_profile() {
        let record = SessionRecord {
            session_id: SessionToken::new("session_1700000000000_abcdefghi"),
            student_info: StudentProfile::new("8").with_name("Asha"),
        };
        let storage = Arc::new(MemoryProfileStorage::with_record(record.clone()));
        let s = ClientSession::start(Arc::new(StubBackend::new()), storage);

        assert!(s.is_registered());
        assert_eq!(s.token(), &record.session_id);
        assert_eq!(s.profile(), Some(&record.student_info));
    }

    #[test]
    fn corrupt_record_counts_as_absent() {
        let s = ClientSession::start(
            Arc::new(StubBackend::new()),
            Arc::new(MemoryProfileStorage::corrupt()),
        );
        assert!(!s.is_registered());
    }

    #[tokio::test]
    async fn switching_modes_keeps_selected_image() {
        let (mut s, _, _) = session();
        s.select_mode(InputMode::Image);
        s.select_image_file(ImageFile::new("leaf.png", "image/png", vec![1]));
        s.select_mode(InputMode::Voice);
        s.select_mode(InputMode::Image);
        assert_eq!(s.image_selection().as_deref(), Some("leaf.png"));
    }

    #[tokio::test]
    async fn failed_save_leaves_session_unregistered() {
        let (mut s, _, storage) = session();
        storage.fail_saves();

        let err = s.register(StudentProfile::new("10")).await.unwrap_err();
        assert_eq!(err.kind(), "storage");
        assert!(!s.is_registered());
        assert_eq!(s.transcript().last().unwrap().role, TranscriptRole::Error);
    }
}
