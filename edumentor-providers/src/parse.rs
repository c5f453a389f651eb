use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};

/// `{success, error?}` from the registration endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// Shared shape of the three query endpoints. `extracted_text` only comes back
/// from image queries and `transcribed_text` only from voice queries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub extracted_text: Option<String>,
    #[serde(default)]
    pub transcribed_text: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl QueryResponse {
    pub fn answered(response: impl Into<String>) -> Self {
        Self {
            success: true,
            response: Some(response.into()),
            ..Default::default()
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }
}

pub fn parse_register_response(body: &[u8]) -> anyhow::Result<RegisterResponse> {
    serde_json::from_slice(body).context("decode register JSON")
}

pub fn parse_query_response(body: &[u8]) -> anyhow::Result<QueryResponse> {
    serde_json::from_slice(body).context("decode query JSON")
}

#[derive(Debug, Deserialize)]
struct AskResponse {
    response: Option<String>,
}

pub fn parse_ask_response(body: &[u8]) -> anyhow::Result<String> {
    let resp: AskResponse = serde_json::from_slice(body).context("decode ask JSON")?;
    resp.response
        .ok_or_else(|| anyhow!("no response in ask reply"))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UploadImageResponse {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub extracted_text: Option<String>,
}

pub fn parse_upload_image_response(body: &[u8]) -> anyhow::Result<UploadImageResponse> {
    serde_json::from_slice(body).context("decode upload-image JSON")
}

#[derive(Debug, Deserialize)]
struct VoiceUploadResponse {
    text: String,
}

pub fn parse_voice_upload_response(body: &[u8]) -> anyhow::Result<String> {
    let resp: VoiceUploadResponse =
        serde_json::from_slice(body).context("decode voice JSON")?;
    Ok(resp.text)
}
