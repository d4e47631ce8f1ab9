//! JSON-file session store

use serde::{Deserialize, Serialize};
use snapcheck_api::Session;
use snapcheck_util::UserId;
use std::path::{Path, PathBuf};

use crate::{SessionStore, StoreResult};

/// On-disk session document. Key names mirror the mobile app's key-value
/// store so a dashboard-side inspector reads both the same way.
#[derive(Debug, Serialize, Deserialize)]
struct SessionDocument {
    #[serde(rename = "authToken")]
    auth_token: String,
    user: StoredUser,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredUser {
    id: String,
}

/// Session store backed by a single JSON file
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Conventional location under a data directory
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join("session.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load_session(&self) -> StoreResult<Option<Session>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let doc: SessionDocument = serde_json::from_str(&content)?;
        Ok(Some(Session {
            user_id: UserId::new(doc.user.id),
            token: doc.auth_token,
        }))
    }

    fn save_session(&self, session: &Session) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let doc = SessionDocument {
            auth_token: session.token.clone(),
            user: StoredUser {
                id: session.user_id.as_str().to_string(),
            },
        };

        let content = serde_json::to_string_pretty(&doc)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    fn clear_session(&self) -> StoreResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::in_dir(dir.path());

        assert!(store.load_session().unwrap().is_none());

        let session = Session {
            user_id: UserId::new("64fe2a1b"),
            token: "tok-123".into(),
        };
        store.save_session(&session).unwrap();

        let loaded = store.load_session().unwrap().unwrap();
        assert_eq!(loaded, session);
        assert_eq!(store.auth_token().unwrap().as_deref(), Some("tok-123"));
    }

    #[test]
    fn clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::in_dir(dir.path());

        store.clear_session().unwrap();

        store
            .save_session(&Session {
                user_id: UserId::new("u1"),
                token: "t".into(),
            })
            .unwrap();
        store.clear_session().unwrap();
        store.clear_session().unwrap();

        assert!(store.load_session().unwrap().is_none());
    }

    #[test]
    fn document_uses_mobile_key_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::in_dir(dir.path());
        store
            .save_session(&Session {
                user_id: UserId::new("u1"),
                token: "t".into(),
            })
            .unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["authToken"], "t");
        assert_eq!(json["user"]["id"], "u1");
    }
}
