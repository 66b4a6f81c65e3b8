//! Client-side API error types.

use serde::Deserialize;

use crate::session::SessionError;

/// Fallback text when the backend gives no usable detail.
pub const GENERIC_ERROR: &str = "Error desconocido";

/// Error body shape of the backend: `{"detail": ...}`.
///
/// `detail` is usually a string; validation failures carry a JSON array, which
/// is kept as compact JSON text.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

/// Extract the human-readable detail from an error response body.
pub fn extract_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail? {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) if s.trim().is_empty() => None,
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// Failure of a single backend call.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Non-success HTTP status.
    #[error("HTTP {status}: {}", .detail.as_deref().unwrap_or(GENERIC_ERROR))]
    Http { status: u16, detail: Option<String> },
    /// Connection refused, DNS failure, broken stream.
    #[error("Transport error: {0}")]
    Transport(String),
    /// Success status but the body did not match the expected shape.
    #[error("Response decoding error: {0}")]
    Decode(String),
    /// Request could not be built (bad base URL, unserializable body).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Http { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// The backend rejected the credential; the stored token is stale.
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Server detail when present, `fallback` otherwise.
    pub fn user_message(&self, fallback: &str) -> String {
        self.detail()
            .map(str::to_string)
            .unwrap_or_else(|| fallback.to_string())
    }
}
