//! Persistent storage for the backend session token.
//!
//! The token returned by `/auth/login` is kept in a small key-value store
//! under the key `token`. The API client reads it before every request and
//! clears it when the backend answers 401.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use thiserror::Error;
use tracing::warn;

/// Key the session token is stored under.
pub const TOKEN_KEY: &str = "token";

/// Errors raised while persisting the session token.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session file is not valid JSON: {0}")]
    Format(#[from] serde_json::Error),

    #[error("Session store lock poisoned")]
    Poisoned,
}

/// Storage for the bearer token.
pub trait TokenStore: Send + Sync {
    /// Current token, if logged in.
    fn get_token(&self) -> Option<String>;

    /// Replace the stored token.
    ///
    /// # Errors
    ///
    /// Returns error if the token cannot be persisted.
    fn set_token(&self, token: &str) -> Result<(), SessionError>;

    /// Forget the stored token.
    ///
    /// # Errors
    ///
    /// Returns error if the store cannot be updated.
    fn clear_token(&self) -> Result<(), SessionError>;
}

/// In-memory token store, shared between clones.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    token: Arc<RwLock<Option<String>>>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that starts out logged in.
    #[must_use]
    pub fn with_token(token: &str) -> Self {
        Self {
            token: Arc::new(RwLock::new(Some(token.to_string()))),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn get_token(&self) -> Option<String> {
        self.token.read().ok().and_then(|guard| guard.clone())
    }

    fn set_token(&self, token: &str) -> Result<(), SessionError> {
        let mut guard = self.token.write().map_err(|_| SessionError::Poisoned)?;
        *guard = Some(token.to_string());
        Ok(())
    }

    fn clear_token(&self) -> Result<(), SessionError> {
        let mut guard = self.token.write().map_err(|_| SessionError::Poisoned)?;
        *guard = None;
        Ok(())
    }
}

/// Token store backed by a JSON key-value file.
///
/// Other keys in the file are preserved when the token changes.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, SessionError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(entries)?)?;
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn get_token(&self) -> Option<String> {
        match self.load() {
            Ok(mut entries) => entries.remove(TOKEN_KEY).filter(|t| !t.is_empty()),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Ignoring unreadable session file");
                None
            }
        }
    }

    fn set_token(&self, token: &str) -> Result<(), SessionError> {
        let mut entries = self.load().unwrap_or_default();
        entries.insert(TOKEN_KEY.to_string(), token.to_string());
        self.save(&entries)
    }

    fn clear_token(&self) -> Result<(), SessionError> {
        let mut entries = self.load().unwrap_or_default();
        if entries.remove(TOKEN_KEY).is_none() && !self.path.exists() {
            return Ok(());
        }
        self.save(&entries)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryTokenStore::new();
        assert_eq!(store.get_token(), None);

        store.set_token("abc").unwrap();
        let clone = store.clone();
        assert_eq!(clone.get_token().as_deref(), Some("abc"));

        clone.clear_token().unwrap();
        assert_eq!(store.get_token(), None);
    }

    #[test]
    fn test_file_store_persists_under_token_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/session.json");
        let store = FileTokenStore::new(&path);

        store.set_token("jwt-value").unwrap();
        let raw: BTreeMap<String, String> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw.get("token").map(String::as_str), Some("jwt-value"));

        let reopened = FileTokenStore::new(&path);
        assert_eq!(reopened.get_token().as_deref(), Some("jwt-value"));
    }

    #[test]
    fn test_file_store_clear_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, r#"{"token":"t","theme":"dark"}"#).unwrap();

        let store = FileTokenStore::new(&path);
        store.clear_token().unwrap();

        assert_eq!(store.get_token(), None);
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("theme"));
    }

    #[test]
    fn test_file_store_missing_file_is_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("absent.json"));
        assert_eq!(store.get_token(), None);
        store.clear_token().unwrap();
    }
}
