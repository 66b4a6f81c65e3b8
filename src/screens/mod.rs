//! Per-screen view models.
//!
//! Each screen owns its view state and talks to the backend only through a
//! cloned `ApiClient`. Outcomes reach the user in one of three ways:
//! - `ScreenError::Validation`: blocking, no request issued, state untouched
//! - `ScreenError::Api`: blocking, the call failed, state preserved
//! - silent-log: `tracing::warn!`, the view keeps its previous data
//!
//! Successful actions return a `Notice` to be shown as a blocking message.

pub mod composer;
pub mod doctors;
pub mod entities;
pub mod local_prescriptions;
pub mod patients;
pub mod prescriptions;
pub mod rows;

use std::fmt;

use thiserror::Error;

use crate::api::{ApiError, GENERIC_ERROR};
use crate::documents::DocumentError;

pub use composer::{Composer, Draft};
pub use entities::{EntityKind, EntityScreen};
pub use local_prescriptions::LocalPrescriptionsScreen;
pub use prescriptions::PrescriptionsScreen;
pub use rows::RowAction;

/// Blocking failure of a screen action.
#[derive(Error, Debug)]
pub enum ScreenError {
    /// Input rejected before any request.
    #[error("{0}")]
    Validation(String),
    /// Backend call failed; `message` is the text shown to the user.
    #[error("{message}")]
    Api {
        message: String,
        #[source]
        source: ApiError,
    },
    #[error("{0}")]
    Document(#[from] DocumentError),
}

impl ScreenError {
    pub fn validation(message: impl Into<String>) -> Self {
        ScreenError::Validation(message.into())
    }

    /// `"<prefix>: <server detail or Error desconocido>"`.
    pub fn api(prefix: &str, source: ApiError) -> Self {
        let message = format!("{prefix}: {}", source.user_message(GENERIC_ERROR));
        ScreenError::Api { message, source }
    }

    /// Server detail alone, or `fallback` when the server gave none.
    pub fn api_or(fallback: &str, source: ApiError) -> Self {
        let message = source.user_message(fallback);
        ScreenError::Api { message, source }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ScreenError::Validation(_))
    }

    /// Underlying backend failure, if any.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            ScreenError::Api { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Message shown after a successful action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
}

impl Notice {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Heading followed by pretty-printed JSON, the way job results are shown.
    pub fn with_json(heading: &str, value: &serde_json::Value) -> Self {
        Self::new(format!("{heading}\n{}", crate::models::pretty(value)))
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Blocking yes/no prompt.
pub trait Confirm {
    fn confirm(&mut self, question: &str) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, question: &str) -> bool {
        self(question)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_message_uses_detail_or_generic() {
        let with_detail = ApiError::Http {
            status: 409,
            detail: Some("Paciente con este ID ya existe".into()),
        };
        assert_eq!(
            ScreenError::api("Error", with_detail).to_string(),
            "Error: Paciente con este ID ya existe"
        );

        let without = ApiError::Http {
            status: 500,
            detail: None,
        };
        assert_eq!(ScreenError::api("Error", without).to_string(), "Error: Error desconocido");
    }

    #[test]
    fn api_or_uses_fallback_without_prefix() {
        let err = ScreenError::api_or("Error al iniciar sesión", ApiError::Transport("refused".into()));
        assert_eq!(err.to_string(), "Error al iniciar sesión");
        assert!(err.api_error().is_some());
        assert!(!err.is_validation());
    }

    #[test]
    fn notice_with_json_is_pretty() {
        let n = Notice::with_json("Exportación completada:", &serde_json::json!({"ok": 1}));
        assert_eq!(n.text, "Exportación completada:\n{\n  \"ok\": 1\n}");
    }

    #[test]
    fn closures_confirm() {
        let mut asked = Vec::new();
        let mut prompt = |q: &str| {
            asked.push(q.to_string());
            false
        };
        assert!(!prompt.confirm("¿Seguro?"));
        drop(prompt);
        assert_eq!(asked, ["¿Seguro?"]);
    }
}
