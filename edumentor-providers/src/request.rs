use serde::{Deserialize, Serialize};

const JSON: &str = "application/json";

/// Headers whose values never reach logs.
const SENSITIVE_HEADERS: &[&str] = &["authorization", "cookie", "x-api-key"];

/// One backend call, fully built before any I/O happens.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpRequest {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Body,
}

// Query bodies carry base64 images and audio; Debug shows sizes only.
impl std::fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let headers: Vec<(&str, &str)> = self
            .headers
            .iter()
            .map(|(k, v)| {
                let hidden = SENSITIVE_HEADERS.iter().any(|s| k.eq_ignore_ascii_case(s));
                (k.as_str(), if hidden { "[REDACTED]" } else { v.as_str() })
            })
            .collect();

        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &headers)
            .field("body", &self.body.summary())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Body {
    Empty,
    Json(String),
    MultipartFormData { boundary: String, bytes: Vec<u8> },
}

impl Body {
    pub fn len(&self) -> usize {
        match self {
            Body::Empty => 0,
            Body::Json(s) => s.len(),
            Body::MultipartFormData { bytes, .. } => bytes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn summary(&self) -> String {
        match self {
            Body::Empty => "empty".to_string(),
            Body::Json(_) => format!("json, {} bytes", self.len()),
            Body::MultipartFormData { boundary, .. } => {
                format!("multipart ({boundary}), {} bytes", self.len())
            }
        }
    }
}

impl HttpRequest {
    pub fn post_json(url: String, payload: &serde_json::Value) -> Self {
        Self {
            method: "POST".into(),
            url,
            headers: vec![
                ("Content-Type".into(), JSON.into()),
                ("Accept".into(), JSON.into()),
            ],
            body: Body::Json(payload.to_string()),
        }
    }

    /// `bytes` must already be framed with `boundary`.
    pub fn post_multipart(url: String, boundary: String, bytes: Vec<u8>) -> Self {
        Self {
            method: "POST".into(),
            url,
            headers: vec![
                (
                    "Content-Type".into(),
                    format!("multipart/form-data; boundary={boundary}"),
                ),
                ("Accept".into(), JSON.into()),
            ],
            body: Body::MultipartFormData { boundary, bytes },
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}
