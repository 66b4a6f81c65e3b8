//! Session store: the single bearer credential and its change channel.
//!
//! Key properties:
//! - At most one credential is active; its presence means "authenticated"
//! - The credential is persisted through a `CredentialStore` backend
//! - Token bytes are zeroed when the in-memory copy is dropped
//! - Every change is published on a `watch` channel for route guards

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

use tokio::sync::watch;
use zeroize::Zeroize;

// ═══════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Credential storage I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Session lock poisoned")]
    LockPoisoned,
}

// ═══════════════════════════════════════════════════════════
// SessionCredential (zeroed on drop)
// ═══════════════════════════════════════════════════════════

/// Opaque bearer token. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq, Zeroize)]
#[zeroize(drop)]
pub struct SessionCredential {
    token: String,
}

impl SessionCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Value for the `Authorization` header.
    pub fn bearer_header(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

impl fmt::Debug for SessionCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionCredential(<redacted>)")
    }
}

// ═══════════════════════════════════════════════════════════
// Storage backends
// ═══════════════════════════════════════════════════════════

/// Persistence for the single credential.
pub trait CredentialStore: Send + Sync {
    fn load(&self) -> Result<Option<String>, SessionError>;
    fn save(&self, token: &str) -> Result<(), SessionError>;
    fn remove(&self) -> Result<(), SessionError>;
}

/// Credential persisted as a plain file at a fixed path.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: std::io::Error) -> SessionError {
        SessionError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<String>, SessionError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => {
                let token = raw.trim();
                if token.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(token.to_string()))
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_err(e)),
        }
    }

    fn save(&self, token: &str) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
        }
        std::fs::write(&self.path, token).map_err(|e| self.io_err(e))?;
        restrict_permissions(&self.path).map_err(|e| self.io_err(e))
    }

    fn remove(&self) -> Result<(), SessionError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_err(e)),
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

/// In-memory backend; nothing survives the process.
#[derive(Default)]
pub struct MemoryCredentialStore {
    slot: Mutex<Option<String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<String>, SessionError> {
        let slot = self.slot.lock().map_err(|_| SessionError::LockPoisoned)?;
        Ok(slot.clone())
    }

    fn save(&self, token: &str) -> Result<(), SessionError> {
        let mut slot = self.slot.lock().map_err(|_| SessionError::LockPoisoned)?;
        *slot = Some(token.to_string());
        Ok(())
    }

    fn remove(&self) -> Result<(), SessionError> {
        let mut slot = self.slot.lock().map_err(|_| SessionError::LockPoisoned)?;
        if let Some(mut old) = slot.take() {
            old.zeroize();
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════
// SessionStore (shared context value)
// ═══════════════════════════════════════════════════════════

/// Holds the active credential and publishes authentication changes.
///
/// Shared as `Arc<SessionStore>` between the HTTP client and route guards.
/// Reads go through a `RwLock`; every mutation writes the backend first,
/// then the in-memory copy, then notifies subscribers.
pub struct SessionStore {
    backend: Box<dyn CredentialStore>,
    current: RwLock<Option<SessionCredential>>,
    changes: watch::Sender<bool>,
}

impl SessionStore {
    /// Open a store, loading any credential persisted by a previous run.
    pub fn open(backend: Box<dyn CredentialStore>) -> Result<Self, SessionError> {
        let current = backend.load()?.map(SessionCredential::new);
        let (changes, _) = watch::channel(current.is_some());
        Ok(Self {
            backend,
            current: RwLock::new(current),
            changes,
        })
    }

    /// Store backed by a file at `path`.
    pub fn open_file(path: impl Into<PathBuf>) -> Result<Self, SessionError> {
        Self::open(Box::new(FileCredentialStore::new(path)))
    }

    /// Store with no persistence.
    pub fn in_memory() -> Self {
        let (changes, _) = watch::channel(false);
        Self {
            backend: Box::new(MemoryCredentialStore::new()),
            current: RwLock::new(None),
            changes,
        }
    }

    /// Persist `token` for subsequent requests and future runs.
    /// Replaces any previous credential.
    pub fn set_credential(&self, token: &str) -> Result<(), SessionError> {
        self.backend.save(token)?;
        {
            let mut guard = self.current.write().map_err(|_| SessionError::LockPoisoned)?;
            *guard = Some(SessionCredential::new(token));
        }
        self.changes.send_replace(true);
        tracing::info!("Session credential stored");
        Ok(())
    }

    /// The active credential, if any.
    pub fn credential(&self) -> Option<SessionCredential> {
        match self.current.read() {
            Ok(guard) => guard.clone(),
            Err(_) => {
                tracing::error!("Session lock poisoned on read");
                None
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.current
            .read()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    /// Remove the credential from memory and storage.
    pub fn clear_credential(&self) -> Result<(), SessionError> {
        self.backend.remove()?;
        {
            let mut guard = self.current.write().map_err(|_| SessionError::LockPoisoned)?;
            *guard = None;
        }
        self.changes.send_replace(false);
        tracing::info!("Session credential cleared");
        Ok(())
    }

    /// Receiver that observes every authentication change.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.changes.subscribe()
    }
}
