use std::sync::Arc;

use edumentor_core::audio_format::AudioEncoding;
use edumentor_core::config::{ClientConfig, IntegrationProfile};
use edumentor_core::profile::StudentProfile;
use edumentor_core::types::TranscriptRole;
use edumentor_engine::capture::ImageFile;
use edumentor_engine::session::ClientSession;
use edumentor_engine::testing::{ScriptedCamera, ScriptedMicrophone};
use edumentor_engine::traits::ProfileStorage;
use edumentor_runtime::{FileProfileStorage, backend_from_config};
use serde_json::json;
use wiremock::matchers::{body_partial_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn json_reply(body: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}

fn session_for(
    server: &MockServer,
    integration: IntegrationProfile,
    dir: &tempfile::TempDir,
) -> (ClientSession, Arc<FileProfileStorage>) {
    let cfg = ClientConfig {
        integration,
        base_url: server.uri(),
        form_base_url: server.uri(),
        data_dir: Some(dir.path().to_path_buf()),
        ..Default::default()
    };
    let storage = Arc::new(FileProfileStorage::at_path(
        edumentor_runtime::defaults::session_file(&cfg),
    ));
    let backend = backend_from_config(&cfg).unwrap();
    (ClientSession::start(backend, storage.clone()), storage)
}

#[tokio::test]
async fn register_then_ask_over_session_api() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/api/student/register"))
        .and(body_partial_json(json!({
            "name": "",
            "class": "10",
            "board": "",
            "language": "English",
        })))
        .respond_with(json_reply(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/query/text"))
        .and(body_partial_json(json!({"query": "What is photosynthesis?"})))
        .respond_with(json_reply(json!({"success": true, "response": "It is..."})))
        .expect(1)
        .mount(&server)
        .await;

    let (mut session, storage) = session_for(&server, IntegrationProfile::SessionJson, &dir);
    session
        .register(StudentProfile::new("10").with_board("").with_language("English"))
        .await
        .unwrap();

    let record = storage.load().unwrap().unwrap();
    assert_eq!(&record.session_id, session.token());
    assert!(dir.path().join("eduMentorSession.json").exists());

    let before = session.transcript().len();
    session.submit_text("What is photosynthesis?").await.unwrap();
    let added = session.transcript().since(before);
    assert_eq!(added.len(), 2);
    assert_eq!(added[0].role, TranscriptRole::User);
    assert_eq!(added[1].content, "It is...");

    let requests = server.received_requests().await.unwrap();
    let sent: serde_json::Value = requests[1].body_json().unwrap();
    assert_eq!(sent["session_id"], session.token().as_str());
}

#[tokio::test]
async fn backend_failure_message_is_shown_verbatim() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/api/student/register"))
        .respond_with(json_reply(json!({"success": true})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/query/image"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({"success": false, "error": "OCR service unavailable"})),
        )
        .mount(&server)
        .await;

    let (mut session, _) = session_for(&server, IntegrationProfile::SessionJson, &dir);
    session.register(StudentProfile::new("9")).await.unwrap();
    session.select_image_file(ImageFile::new("page.png", "image/png", vec![0x89, 0x50]));

    let err = session.submit_image().await.unwrap_err();
    assert_eq!(err.to_string(), "OCR service unavailable");
    assert_eq!(
        session.transcript().last().unwrap().content,
        "OCR service unavailable"
    );

    let requests = server.received_requests().await.unwrap();
    let sent: serde_json::Value = requests.last().unwrap().body_json().unwrap();
    assert_eq!(sent["image_data"], "data:image/png;base64,iVA=");
}

#[tokio::test]
async fn undecodable_body_is_a_network_error() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/api/student/register"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let (mut session, storage) = session_for(&server, IntegrationProfile::SessionJson, &dir);
    let err = session.register(StudentProfile::new("7")).await.unwrap_err();

    assert_eq!(err.kind(), "connectivity");
    assert_eq!(err.to_string(), "Network error. Please check your connection.");
    assert!(!session.is_registered());
    assert!(storage.load().unwrap().is_none());
}

#[tokio::test]
async fn restart_restores_registration_from_disk() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    Mock::given(method("POST"))
        .and(path("/api/student/register"))
        .respond_with(json_reply(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let (mut first, _) = session_for(&server, IntegrationProfile::SessionJson, &dir);
    first
        .register(StudentProfile::new("11").with_name("Kabir").with_board("CBSE"))
        .await
        .unwrap();

    let (second, _) = session_for(&server, IntegrationProfile::SessionJson, &dir);
    assert!(second.is_registered());
    assert_eq!(second.token(), first.token());
    assert_eq!(second.profile(), first.profile());
}

#[tokio::test]
async fn form_profile_sends_multipart_fields() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/ask"))
        .and(body_string_contains("name=\"question\"\r\n\r\nWhat is gravity?"))
        .and(body_string_contains("name=\"class_level\"\r\n\r\n8"))
        .and(body_string_contains("name=\"board\"\r\n\r\nICSE"))
        .and(body_string_contains("name=\"language\"\r\n\r\nHindi"))
        .respond_with(json_reply(json!({"response": "Gravity pulls objects together."})))
        .expect(1)
        .mount(&server)
        .await;

    let (mut session, _) = session_for(&server, IntegrationProfile::Form, &dir);
    session
        .register(StudentProfile::new("8").with_board("ICSE").with_language("Hindi"))
        .await
        .unwrap();
    session.submit_text("What is gravity?").await.unwrap();

    assert_eq!(
        session.transcript().last().unwrap().content,
        "Gravity pulls objects together."
    );
    // Registration stays local for the form API.
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn form_image_without_response_uses_fallback() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/upload-image"))
        .and(body_string_contains("name=\"file\"; filename=\"capture.jpg\""))
        .respond_with(json_reply(json!({"extracted_text": "H2O"})))
        .mount(&server)
        .await;

    let (mut session, _) = session_for(&server, IntegrationProfile::Form, &dir);
    session.register(StudentProfile::new("6")).await.unwrap();
    session.select_image_file(ImageFile::new("photo.jpeg", "image/jpeg", vec![0xff, 0xd8]));
    session.submit_image().await.unwrap();

    let tail: Vec<_> = session
        .transcript()
        .entries()
        .iter()
        .rev()
        .take(2)
        .map(|e| e.content.clone())
        .collect();
    assert_eq!(tail, vec!["✅ Image processed.", "Extracted text: \"H2O\""]);
}

#[tokio::test]
async fn form_camera_capture_uses_capture_fallback() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/upload-image"))
        .and(body_string_contains("filename=\"capture.jpg\""))
        .respond_with(json_reply(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let (mut session, _) = session_for(&server, IntegrationProfile::Form, &dir);
    session.register(StudentProfile::new("6")).await.unwrap();
    let camera = ScriptedCamera::with_still("image/jpeg", vec![0xff, 0xd8, 0xff]);
    session.start_camera(&camera).await.unwrap();
    session.capture_photo().await.unwrap();

    let last = session.transcript().last().unwrap();
    assert_eq!(last.role, TranscriptRole::Ai);
    assert_eq!(last.content, "Captured image processed.");
}

#[tokio::test]
async fn form_voice_transcribes_then_asks() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/voice"))
        .and(body_string_contains("filename=\"recording.wav\""))
        .respond_with(json_reply(json!({"text": "what is an atom"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/ask"))
        .and(body_string_contains("what is an atom"))
        .respond_with(json_reply(json!({"response": "The smallest unit of matter."})))
        .expect(1)
        .mount(&server)
        .await;

    let (mut session, _) = session_for(&server, IntegrationProfile::Form, &dir);
    session.register(StudentProfile::new("9")).await.unwrap();

    let mic = ScriptedMicrophone::new(vec![AudioEncoding::Wav]).with_chunks(vec![b"RIFF".to_vec()]);
    session.start_recording(&mic).await.unwrap();
    session.stop_recording().await.unwrap();

    let contents: Vec<_> = session
        .transcript()
        .entries()
        .iter()
        .map(|e| e.content.as_str())
        .collect();
    assert_eq!(
        &contents[contents.len() - 3..],
        &[
            "🎤 Voice message recorded",
            "You said: \"what is an atom\"",
            "The smallest unit of matter.",
        ]
    );
}
