use std::path::PathBuf;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Session file name in the cache directory
const SESSION_FILE: &str = "session.json";

/// Token values that mean "no token". Corrupted client storage has been
/// seen holding the literal strings "undefined" and "null"; treat both
/// the same as an empty slot.
const SENTINEL_TOKENS: [&str; 2] = ["undefined", "null"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub token: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl SessionData {
    pub fn new(token: String, email: String) -> Self {
        Self {
            token,
            email,
            created_at: Utc::now(),
        }
    }
}

/// Shared, persisted holder for the admin session token.
///
/// Cloning is cheap and every clone shares the same in-memory cell, so a
/// token cleared through one clone disappears for all in-flight requests.
/// The cell is written only on login and on the unauthorized-logout path;
/// everything else just reads it.
#[derive(Clone)]
pub struct SessionStore {
    dir: PathBuf,
    data: Arc<RwLock<Option<SessionData>>>,
}

impl SessionStore {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            data: Arc::new(RwLock::new(None)),
        }
    }

    /// Load a previously saved session from disk. Returns true if one was found.
    pub fn load(&self) -> Result<bool> {
        let path = self.session_path();
        if !path.exists() {
            return Ok(false);
        }
        let contents =
            std::fs::read_to_string(&path).context("Failed to read session file")?;
        let data: SessionData =
            serde_json::from_str(&contents).context("Failed to parse session file")?;
        *self.cell_mut() = Some(data);
        Ok(true)
    }

    /// Persist the current session to disk.
    pub fn save(&self) -> Result<()> {
        let snapshot = self.cell().clone();
        if let Some(data) = snapshot {
            let path = self.session_path();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let contents = serde_json::to_string_pretty(&data)?;
            std::fs::write(path, contents)?;
        }
        Ok(())
    }

    /// Install a fresh session after a successful login.
    ///
    /// A persistence failure is logged, not fatal: the in-memory session
    /// still serves this process.
    pub fn establish(&self, data: SessionData) {
        *self.cell_mut() = Some(data);
        if let Err(e) = self.save() {
            warn!(error = %e, "Failed to persist session");
        }
    }

    /// The bearer token, if a usable one is stored.
    pub fn token(&self) -> Option<String> {
        self.cell()
            .as_ref()
            .map(|d| d.token.clone())
            .filter(|t| is_usable_token(t))
    }

    /// The email the current session was opened with.
    pub fn email(&self) -> Option<String> {
        self.cell().as_ref().map(|d| d.email.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Drop the session in response to an unauthorized response.
    ///
    /// Returns true only when a usable token was actually removed, so the
    /// caller can fire its logout side effect exactly once even with
    /// several rejected requests in flight.
    pub fn invalidate(&self) -> bool {
        let had_token = {
            let mut guard = self.cell_mut();
            let had = guard
                .as_ref()
                .map(|d| is_usable_token(&d.token))
                .unwrap_or(false);
            *guard = None;
            had
        };
        self.remove_file();
        had_token
    }

    /// Explicit logout: clear memory and disk unconditionally.
    pub fn clear(&self) {
        *self.cell_mut() = None;
        self.remove_file();
    }

    fn remove_file(&self) {
        let path = self.session_path();
        if path.exists() {
            if let Err(e) = std::fs::remove_file(&path) {
                warn!(error = %e, "Failed to remove session file");
            }
        }
    }

    fn session_path(&self) -> PathBuf {
        self.dir.join(SESSION_FILE)
    }

    // A poisoned lock only means another thread panicked mid-write of an
    // Option; the value itself is still coherent, so recover it.
    fn cell(&self) -> RwLockReadGuard<'_, Option<SessionData>> {
        self.data.read().unwrap_or_else(|e| e.into_inner())
    }

    fn cell_mut(&self) -> RwLockWriteGuard<'_, Option<SessionData>> {
        self.data.write().unwrap_or_else(|e| e.into_inner())
    }
}

fn is_usable_token(token: &str) -> bool {
    !token.is_empty() && !SENTINEL_TOKENS.contains(&token)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (SessionStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("tempdir");
        (SessionStore::new(dir.path().to_path_buf()), dir)
    }

    #[test]
    fn test_sentinel_tokens_are_not_usable() {
        let (store, _dir) = store();
        for bad in ["undefined", "null", ""] {
            store.establish(SessionData::new(bad.to_string(), "a@b.c".to_string()));
            assert_eq!(store.token(), None, "token {:?} should be filtered", bad);
            assert!(!store.is_authenticated());
        }
        store.establish(SessionData::new("tok-1".to_string(), "a@b.c".to_string()));
        assert_eq!(store.token().as_deref(), Some("tok-1"));
    }

    #[test]
    fn test_establish_then_load_roundtrip() {
        let (store, dir) = store();
        store.establish(SessionData::new(
            "tok-xyz".to_string(),
            "admin@example.com".to_string(),
        ));

        let reopened = SessionStore::new(dir.path().to_path_buf());
        assert!(reopened.load().expect("load"));
        assert_eq!(reopened.token().as_deref(), Some("tok-xyz"));
        assert_eq!(reopened.email().as_deref(), Some("admin@example.com"));
    }

    #[test]
    fn test_invalidate_reports_transition_once() {
        let (store, dir) = store();
        store.establish(SessionData::new("tok-1".to_string(), "a@b.c".to_string()));

        assert!(store.invalidate());
        assert!(!store.invalidate());
        assert_eq!(store.token(), None);
        assert!(!dir.path().join("session.json").exists());
    }

    #[test]
    fn test_invalidate_without_usable_token_is_false() {
        let (store, _dir) = store();
        assert!(!store.invalidate());

        store.establish(SessionData::new("undefined".to_string(), "a@b.c".to_string()));
        assert!(!store.invalidate());
    }

    #[test]
    fn test_clones_share_the_cell() {
        let (store, _dir) = store();
        let clone = store.clone();
        store.establish(SessionData::new("tok-1".to_string(), "a@b.c".to_string()));
        assert!(clone.is_authenticated());
        clone.invalidate();
        assert!(!store.is_authenticated());
    }
}
