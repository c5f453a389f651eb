use edumentor_core::errors::{NETWORK_ERROR_MESSAGE, ValidationError};
use thiserror::Error;

use crate::capture::CaptureError;

/// Why a user action did not complete. `Display` is the text shown to the user.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Permission(String),

    #[error("{}", NETWORK_ERROR_MESSAGE)]
    Connectivity(#[source] anyhow::Error),

    #[error("{0}")]
    Backend(String),

    #[error("Failed to save student information: {0:#}")]
    Storage(#[source] anyhow::Error),
}

impl ClientError {
    pub fn kind(&self) -> &'static str {
        match self {
            ClientError::Validation(_) => "validation",
            ClientError::Permission(_) => "permission",
            ClientError::Connectivity(_) => "connectivity",
            ClientError::Backend(_) => "backend",
            ClientError::Storage(_) => "storage",
        }
    }

    pub fn is_validation(&self, expected: &ValidationError) -> bool {
        matches!(self, ClientError::Validation(v) if v == expected)
    }
}

impl From<CaptureError> for ClientError {
    fn from(e: CaptureError) -> Self {
        match e {
            CaptureError::Validation(v) => ClientError::Validation(v),
            CaptureError::Microphone(m) => ClientError::Permission(m.user_message()),
            CaptureError::Camera(c) => ClientError::Permission(c.user_message()),
        }
    }
}

/// Backend message verbatim, or the per-operation fallback when it sent none.
pub(crate) fn backend_error(error: Option<String>, fallback: &str) -> ClientError {
    let msg = error
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string());
    ClientError::Backend(msg)
}
