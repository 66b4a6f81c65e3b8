use serde::{Deserialize, Serialize};

/// Response of `POST /auth/token`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Response of the export/import and delivery-retry jobs: `{status, result}`.
///
/// `result` is whatever the job produced. Its shape, including how partial
/// failures are reported, is owned by the backend and shown verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobReport {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub result: serde_json::Value,
}

impl JobReport {
    /// Pretty JSON of `result`, as shown to the user.
    pub fn summary(&self) -> String {
        pretty(&self.result)
    }
}

/// Pretty-print any backend JSON for display.
pub fn pretty(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
