//! In-memory session store for tests

use snapcheck_api::Session;
use std::sync::Mutex;

use crate::{SessionStore, StoreResult};

/// Session store held entirely in memory
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    session: Mutex<Option<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            session: Mutex::new(Some(session)),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load_session(&self) -> StoreResult<Option<Session>> {
        Ok(self.session.lock().unwrap().clone())
    }

    fn save_session(&self, session: &Session) -> StoreResult<()> {
        *self.session.lock().unwrap() = Some(session.clone());
        Ok(())
    }

    fn clear_session(&self) -> StoreResult<()> {
        *self.session.lock().unwrap() = None;
        Ok(())
    }
}
