// Multipart, question-keyed backend (`/ask`, `/upload-image`, `/voice`).
//
// This is a separate contract from the session API, not a variant of it: it has
// no registration and no session id, and expects the profile on every question.

use edumentor_core::profile::StudentProfile;

use crate::endpoint::ApiEndpoint;
use crate::multipart::MultipartBuilder;
use crate::request::HttpRequest;

pub const ASK_PATH: &str = "/ask";
pub const UPLOAD_IMAGE_PATH: &str = "/upload-image";
pub const VOICE_PATH: &str = "/voice";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

pub fn build_ask_request(
    endpoint: &ApiEndpoint,
    question: &str,
    profile: &StudentProfile,
) -> HttpRequest {
    let form = MultipartBuilder::new()
        .field("question", question)
        .field("class_level", &profile.class)
        .field("board", &profile.board)
        .field("language", &profile.language);
    multipart_request(endpoint.url_for(ASK_PATH), form)
}

pub fn build_upload_image_request(endpoint: &ApiEndpoint, file: &UploadFile) -> HttpRequest {
    let form =
        MultipartBuilder::new().file("file", &file.filename, &file.mime_type, &file.bytes);
    multipart_request(endpoint.url_for(UPLOAD_IMAGE_PATH), form)
}

pub fn build_voice_upload_request(endpoint: &ApiEndpoint, file: &UploadFile) -> HttpRequest {
    let form =
        MultipartBuilder::new().file("file", &file.filename, &file.mime_type, &file.bytes);
    multipart_request(endpoint.url_for(VOICE_PATH), form)
}

fn multipart_request(url: String, form: MultipartBuilder) -> HttpRequest {
    let (boundary, bytes) = form.finish();
    HttpRequest::post_multipart(url, boundary, bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Body;

    fn endpoint() -> ApiEndpoint {
        ApiEndpoint::new("http://localhost:8000").unwrap()
    }

    fn body_text(req: &HttpRequest) -> String {
        match &req.body {
            Body::MultipartFormData { bytes, .. } => String::from_utf8_lossy(bytes).into_owned(),
            other => panic!("expected multipart, got {}", other.summary()),
        }
    }

    #[test]
    fn ask_sends_all_four_profile_fields() {
        let profile = StudentProfile::new("Class 8")
            .with_board("ICSE")
            .with_language("Hinglish");
        let req = build_ask_request(&endpoint(), "What is gravity?", &profile);

        assert_eq!(req.url, "http://localhost:8000/ask");
        assert!(
            req.header("content-type")
                .unwrap()
                .starts_with("multipart/form-data; boundary=")
        );
        let s = body_text(&req);
        assert!(s.contains("name=\"question\"\r\n\r\nWhat is gravity?"));
        assert!(s.contains("name=\"class_level\"\r\n\r\nClass 8"));
        assert!(s.contains("name=\"board\"\r\n\r\nICSE"));
        assert!(s.contains("name=\"language\"\r\n\r\nHinglish"));
    }

    #[test]
    fn uploads_use_file_field() {
        let file = UploadFile {
            filename: "capture.jpg".into(),
            mime_type: "image/jpeg".into(),
            bytes: b"jpeg-bytes".to_vec(),
        };
        let req = build_upload_image_request(&endpoint(), &file);
        assert!(req.url.ends_with(UPLOAD_IMAGE_PATH));
        let s = body_text(&req);
        assert!(s.contains("name=\"file\"; filename=\"capture.jpg\""));
        assert!(s.contains("jpeg-bytes"));

        let req = build_voice_upload_request(&endpoint(), &file);
        assert!(req.url.ends_with(VOICE_PATH));
    }
}
