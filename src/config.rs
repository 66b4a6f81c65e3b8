use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "recetas-admin";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Backend base used when `RECETAS_API_BASE` is not set.
pub const DEFAULT_API_BASE: &str = "http://localhost:8000/api";

/// Environment variables read by `ClientConfig::from_env`.
pub const ENV_API_BASE: &str = "RECETAS_API_BASE";
pub const ENV_DATA_DIR: &str = "RECETAS_DATA_DIR";
pub const ENV_DOWNLOAD_DIR: &str = "RECETAS_DOWNLOAD_DIR";

/// File name of the persisted bearer token inside the data directory.
pub const SESSION_FILE_NAME: &str = "token";

/// Delay before the automatic list refresh that follows a forced sync.
pub const SYNC_REFRESH_DELAY: Duration = Duration::from_secs(2);

/// Log filter used when `RUST_LOG` is absent.
pub fn default_log_filter() -> String {
    format!("warn,{}=info", env!("CARGO_CRATE_NAME"))
}

/// Get the application data directory.
/// `<platform data dir>/recetas-admin`, falling back to the working directory
/// when the platform reports none.
pub fn app_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Directory where fetched prescription documents are written.
pub fn default_download_dir() -> PathBuf {
    dirs::download_dir().unwrap_or_else(|| app_data_dir().join("downloads"))
}

/// Runtime configuration for the client and its screens.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL, without trailing slash.
    pub api_base: String,
    /// Where the single bearer token is persisted.
    pub session_path: PathBuf,
    pub download_dir: PathBuf,
    pub sync_refresh_delay: Duration,
}

impl ClientConfig {
    /// Build a configuration from the environment, defaulting every field.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env` with an injectable lookup, so tests do not touch the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base = lookup(ENV_API_BASE)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let data_dir = lookup(ENV_DATA_DIR)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(app_data_dir);
        let download_dir = lookup(ENV_DOWNLOAD_DIR)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_download_dir);

        Self {
            api_base: normalize_base(&api_base),
            session_path: data_dir.join(SESSION_FILE_NAME),
            download_dir,
            sync_refresh_delay: SYNC_REFRESH_DELAY,
        }
    }

    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = normalize_base(api_base);
        self
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("API base must be an http(s) URL, got {0:?}")]
    InvalidApiBase(String),
}

impl ClientConfig {
    /// Reject configurations that cannot produce a single request.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = self.api_base.to_ascii_lowercase();
        let has_host = base
            .split_once("://")
            .map(|(_, rest)| !rest.is_empty())
            .unwrap_or(false);
        if !(base.starts_with("http://") || base.starts_with("https://")) || !has_host {
            return Err(ConfigError::InvalidApiBase(self.api_base.clone()));
        }
        Ok(())
    }
}

fn normalize_base(base: &str) -> String {
    base.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_data_dir_ends_with_app_name() {
        assert!(app_data_dir().ends_with(APP_NAME));
    }

    #[test]
    fn defaults_when_env_missing() {
        let cfg = ClientConfig::from_lookup(|_| None);
        assert_eq!(cfg.api_base, DEFAULT_API_BASE);
        assert!(cfg.session_path.ends_with(SESSION_FILE_NAME));
        assert_eq!(cfg.sync_refresh_delay, Duration::from_secs(2));
    }

    #[test]
    fn env_overrides_and_trailing_slash_trimmed() {
        let cfg = ClientConfig::from_lookup(|key| match key {
            ENV_API_BASE => Some("https://recetas.example.org/api/".into()),
            ENV_DATA_DIR => Some("/tmp/recetas".into()),
            _ => None,
        });
        assert_eq!(cfg.api_base, "https://recetas.example.org/api");
        assert_eq!(cfg.session_path, PathBuf::from("/tmp/recetas/token"));
    }

    #[test]
    fn blank_env_values_fall_back() {
        let cfg = ClientConfig::from_lookup(|_| Some("  ".into()));
        assert_eq!(cfg.api_base, DEFAULT_API_BASE);
    }

    #[test]
    fn with_api_base_normalizes() {
        let cfg = ClientConfig::from_lookup(|_| None).with_api_base("http://h:1/api//");
        assert_eq!(cfg.api_base, "http://h:1/api");
    }

    #[test]
    fn default_filter_mentions_crate() {
        assert!(default_log_filter().contains("recetas_admin"));
    }

    #[test]
    fn validate_rejects_non_http_base() {
        let cfg = ClientConfig::from_lookup(|_| None).with_api_base("ftp://h/api");
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::InvalidApiBase("ftp://h/api".into()))
        );
        let cfg = ClientConfig::from_lookup(|_| None).with_api_base("http://");
        assert!(cfg.validate().is_err());
        assert!(ClientConfig::from_lookup(|_| None).validate().is_ok());
    }
}
