use std::path::PathBuf;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::User;

/// Session file name inside the app data directory
const SESSION_FILE: &str = "session.json";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("session storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("session data could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
}

/// On-disk shape of the session. The profile snapshot is kept as the raw
/// JSON text it was saved with, so a stale or corrupt snapshot degrades to
/// "no cached user" instead of poisoning the whole file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SessionData {
    access_token: Option<String>,
    refresh_token: Option<String>,
    user_json: Option<String>,
    saved_at: Option<DateTime<Utc>>,
}

/// Persisted authentication state: access token, refresh token, and the
/// cached profile of the signed-in user.
///
/// The store is the single writer of session state. Open it once at startup
/// and share it (`Arc`) with the API client and anything else that needs to
/// know who is signed in. Every mutation rewrites `session.json` before it
/// returns; reads serve from the in-memory copy.
pub struct SessionStore {
    path: PathBuf,
    state: RwLock<SessionData>,
}

impl SessionStore {
    /// Open (or create) the session store in `dir`.
    ///
    /// A missing session file means signed out. An unreadable or corrupt
    /// file is also treated as signed out, with a warning, so a damaged
    /// session never blocks startup; the next login rewrites it.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        let path = dir.join(SESSION_FILE);

        let state = match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(data) => data,
                Err(e) => {
                    warn!(error = %e, "Session file is corrupt, starting signed out");
                    SessionData::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => SessionData::default(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            state: RwLock::new(state),
        })
    }

    /// Persist a new token pair, replacing any existing one.
    pub fn save_tokens(&self, access: &str, refresh: &str) -> Result<(), StoreError> {
        let mut state = self.write_lock();
        state.access_token = Some(access.to_string());
        state.refresh_token = Some(refresh.to_string());
        state.saved_at = Some(Utc::now());
        self.persist(&state)
    }

    /// Replace only the access token, as the refresh flow does. The refresh
    /// token is retained.
    pub fn save_access_token(&self, access: &str) -> Result<(), StoreError> {
        let mut state = self.write_lock();
        state.access_token = Some(access.to_string());
        state.saved_at = Some(Utc::now());
        self.persist(&state)
    }

    /// Persist a snapshot of the signed-in user's profile.
    pub fn save_user(&self, user: &User) -> Result<(), StoreError> {
        let user_json = serde_json::to_string(user)?;
        let mut state = self.write_lock();
        state.user_json = Some(user_json);
        self.persist(&state)
    }

    pub fn access_token(&self) -> Option<String> {
        self.read_lock().access_token.clone()
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read_lock().refresh_token.clone()
    }

    /// The cached profile snapshot. Returns `None` when nothing is stored
    /// or when the stored snapshot no longer parses; never an error.
    pub fn current_user(&self) -> Option<User> {
        let state = self.read_lock();
        let user_json = state.user_json.as_deref()?;
        match serde_json::from_str(user_json) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "Stored user snapshot no longer parses");
                None
            }
        }
    }

    /// Signed in means both an access token and a usable profile snapshot.
    pub fn is_authenticated(&self) -> bool {
        self.read_lock().access_token.is_some() && self.current_user().is_some()
    }

    /// Remove tokens and profile (logout). The session file is deleted.
    pub fn clear(&self) -> Result<(), StoreError> {
        let mut state = self.write_lock();
        *state = SessionData::default();
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        debug!("Session cleared");
        Ok(())
    }

    fn persist(&self, state: &SessionData) -> Result<(), StoreError> {
        let contents = serde_json::to_string_pretty(state)?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }

    fn read_lock(&self) -> std::sync::RwLockReadGuard<'_, SessionData> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_lock(&self) -> std::sync::RwLockWriteGuard<'_, SessionData> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        serde_json::from_value(serde_json::json!({
            "id": 5, "email": "p@example.com", "display_name": "Pat",
            "is_active": true, "is_staff": false,
            "created_at": "2025-01-01T00:00:00Z", "updated_at": "2025-01-01T00:00:00Z"
        }))
        .expect("sample user")
    }

    #[test]
    fn test_empty_store_is_signed_out() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SessionStore::open(dir.path()).expect("open");
        assert_eq!(store.access_token(), None);
        assert_eq!(store.refresh_token(), None);
        assert!(store.current_user().is_none());
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_tokens_and_user_round_trip_across_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        {
            let store = SessionStore::open(dir.path()).expect("open");
            store.save_tokens("A1", "R1").expect("save tokens");
            store.save_user(&sample_user()).expect("save user");
            assert!(store.is_authenticated());
        }

        let store = SessionStore::open(dir.path()).expect("reopen");
        assert_eq!(store.access_token().as_deref(), Some("A1"));
        assert_eq!(store.refresh_token().as_deref(), Some("R1"));
        assert_eq!(store.current_user().expect("user").display_name, "Pat");
        assert!(store.is_authenticated());
    }

    #[test]
    fn test_refresh_replaces_access_and_keeps_refresh() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SessionStore::open(dir.path()).expect("open");
        store.save_tokens("A1", "R1").expect("save tokens");
        store.save_access_token("A2").expect("save access");
        assert_eq!(store.access_token().as_deref(), Some("A2"));
        assert_eq!(store.refresh_token().as_deref(), Some("R1"));
    }

    #[test]
    fn test_tokens_without_user_is_not_authenticated() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SessionStore::open(dir.path()).expect("open");
        store.save_tokens("A1", "R1").expect("save tokens");
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_clear_removes_everything() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SessionStore::open(dir.path()).expect("open");
        store.save_tokens("A1", "R1").expect("save tokens");
        store.save_user(&sample_user()).expect("save user");

        store.clear().expect("clear");
        assert_eq!(store.access_token(), None);
        assert_eq!(store.refresh_token(), None);
        assert!(store.current_user().is_none());
        assert!(!store.is_authenticated());

        // Cleared on disk too, not just in memory
        let store = SessionStore::open(dir.path()).expect("reopen");
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_corrupt_user_snapshot_reads_as_absent() {
        let dir = tempfile::tempdir().expect("tempdir");
        {
            let store = SessionStore::open(dir.path()).expect("open");
            store.save_tokens("A1", "R1").expect("save tokens");
        }
        // Plant a snapshot that is valid JSON text but not a User
        let path = dir.path().join(SESSION_FILE);
        let mut data: SessionData =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        data.user_json = Some("{\"truncated\":".to_string());
        std::fs::write(&path, serde_json::to_string_pretty(&data).unwrap()).unwrap();

        let store = SessionStore::open(dir.path()).expect("reopen");
        assert_eq!(store.access_token().as_deref(), Some("A1"));
        assert!(store.current_user().is_none());
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_corrupt_session_file_starts_signed_out() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join(SESSION_FILE), "not json at all").unwrap();
        let store = SessionStore::open(dir.path()).expect("open");
        assert!(!store.is_authenticated());
        assert_eq!(store.access_token(), None);
    }
}
