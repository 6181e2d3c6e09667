//! Durable storage for the access/refresh token pair.
//!
//! The pair is persisted as a small JSON file and always replaced
//! wholesale: login and refresh overwrite both tokens, logout and a
//! rejected refresh remove the file entirely.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;

/// Access/refresh token pair issued by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// File-backed store for the current session
#[derive(Debug)]
pub struct SessionStore {
    path: PathBuf,
    pair: Option<TokenPair>,
}

impl SessionStore {
    /// Open the store at `path`, loading any persisted pair. A missing or
    /// unreadable file simply means no session.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let pair = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(pair) => Some(pair),
                Err(e) => {
                    warn!("Ignoring corrupt session file {:?}: {}", path, e);
                    None
                }
            },
            Err(_) => None,
        };

        Self { path, pair }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn pair(&self) -> Option<&TokenPair> {
        self.pair.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.pair.is_some()
    }

    /// Replace the stored pair and persist it
    pub fn store(&mut self, pair: TokenPair) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write to temp file then rename for atomic save
        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, serde_json::to_string_pretty(&pair)?)?;
        fs::rename(&temp_path, &self.path)?;

        self.pair = Some(pair);
        Ok(())
    }

    /// Drop the session, removing the file if present
    pub fn clear(&mut self) -> Result<()> {
        self.pair = None;
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(access: &str, refresh: &str) -> TokenPair {
        TokenPair {
            access: access.to_string(),
            refresh: refresh.to_string(),
        }
    }

    #[test]
    fn missing_file_means_no_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path().join("session.json"));
        assert!(!store.is_logged_in());
        assert!(store.pair().is_none());
    }

    #[test]
    fn store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let mut store = SessionStore::open(&path);
        store.store(pair("a1", "r1")).unwrap();

        let reopened = SessionStore::open(&path);
        assert_eq!(reopened.pair(), Some(&pair("a1", "r1")));
    }

    #[test]
    fn store_replaces_wholesale() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let mut store = SessionStore::open(&path);
        store.store(pair("a1", "r1")).unwrap();
        store.store(pair("a2", "r2")).unwrap();

        let reopened = SessionStore::open(&path);
        assert_eq!(reopened.pair(), Some(&pair("a2", "r2")));
    }

    #[test]
    fn clear_removes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let mut store = SessionStore::open(&path);
        store.store(pair("a1", "r1")).unwrap();
        store.clear().unwrap();

        assert!(!path.exists());
        assert!(!SessionStore::open(&path).is_logged_in());
    }

    #[test]
    fn corrupt_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "not json at all").unwrap();

        let store = SessionStore::open(&path);
        assert!(!store.is_logged_in());
    }
}
