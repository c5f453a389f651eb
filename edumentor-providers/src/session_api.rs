// JSON, session-keyed backend: the primary integration profile.

use edumentor_core::profile::StudentProfile;
use edumentor_core::types::{DataUrl, SessionToken};
use serde_json::json;

use crate::endpoint::ApiEndpoint;
use crate::request::HttpRequest;

pub const REGISTER_PATH: &str = "/api/student/register";
pub const TEXT_QUERY_PATH: &str = "/api/query/text";
pub const IMAGE_QUERY_PATH: &str = "/api/query/image";
pub const VOICE_QUERY_PATH: &str = "/api/query/voice";

pub fn build_register_request(
    endpoint: &ApiEndpoint,
    session: &SessionToken,
    profile: &StudentProfile,
) -> HttpRequest {
    let payload = json!({
        "session_id": session.as_str(),
        "name": profile.name,
        "class": profile.class,
        "board": profile.board,
        "language": profile.language,
    });
    HttpRequest::post_json(endpoint.url_for(REGISTER_PATH), &payload)
}

pub fn build_text_query_request(
    endpoint: &ApiEndpoint,
    session: &SessionToken,
    query: &str,
) -> HttpRequest {
    let payload = json!({
        "session_id": session.as_str(),
        "query": query,
    });
    HttpRequest::post_json(endpoint.url_for(TEXT_QUERY_PATH), &payload)
}

pub fn build_image_query_request(
    endpoint: &ApiEndpoint,
    session: &SessionToken,
    image: &DataUrl,
) -> HttpRequest {
    let payload = json!({
        "session_id": session.as_str(),
        "image_data": image.to_string(),
    });
    HttpRequest::post_json(endpoint.url_for(IMAGE_QUERY_PATH), &payload)
}

pub fn build_voice_query_request(
    endpoint: &ApiEndpoint,
    session: &SessionToken,
    audio: &DataUrl,
) -> HttpRequest {
    let payload = json!({
        "session_id": session.as_str(),
        "audio_data": audio.to_string(),
    });
    HttpRequest::post_json(endpoint.url_for(VOICE_QUERY_PATH), &payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Body;

    fn endpoint() -> ApiEndpoint {
        ApiEndpoint::new("http://localhost:5000").unwrap()
    }

    fn body_json(req: &HttpRequest) -> serde_json::Value {
        match &req.body {
            Body::Json(s) => serde_json::from_str(s).unwrap(),
            other => panic!("expected json, got {}", other.summary()),
        }
    }

    #[test]
    fn register_flattens_profile_next_to_session() {
        let profile = StudentProfile::new("10").with_name("Asha").with_board("CBSE");
        let req = build_register_request(&endpoint(), &SessionToken::new("s1"), &profile);

        assert_eq!(req.method, "POST");
        assert_eq!(req.url, "http://localhost:5000/api/student/register");
        assert_eq!(req.header("content-type"), Some("application/json"));
        let body = body_json(&req);
        assert_eq!(body["session_id"], "s1");
        assert_eq!(body["name"], "Asha");
        assert_eq!(body["class"], "10");
        assert_eq!(body["board"], "CBSE");
        assert_eq!(body["language"], "English");
    }

    #[test]
    fn text_query_carries_literal_question() {
        let req = build_text_query_request(
            &endpoint(),
            &SessionToken::new("s1"),
            "What is photosynthesis?",
        );
        assert!(req.url.ends_with(TEXT_QUERY_PATH));
        let body = body_json(&req);
        assert_eq!(body["query"], "What is photosynthesis?");
    }

    #[test]
    fn media_queries_send_data_urls() {
        let image = DataUrl::encode("image/jpeg", &[1, 2, 3]);
        let req = build_image_query_request(&endpoint(), &SessionToken::new("s1"), &image);
        assert_eq!(body_json(&req)["image_data"], image.to_string());

        let audio = DataUrl::encode("audio/wav", &[4, 5, 6]);
        let req = build_voice_query_request(&endpoint(), &SessionToken::new("s1"), &audio);
        assert!(req.url.ends_with(VOICE_QUERY_PATH));
        assert_eq!(body_json(&req)["audio_data"], audio.to_string());
    }
}
