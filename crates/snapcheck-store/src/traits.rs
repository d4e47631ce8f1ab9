//! Session store trait definition

use snapcheck_api::Session;

use crate::StoreResult;

/// Read/write access to the persisted session.
///
/// The engine only calls `load_session`/`auth_token`; `save_session` and
/// `clear_session` belong to the login/logout flows.
pub trait SessionStore: Send + Sync {
    /// Load the current session, if one is stored
    fn load_session(&self) -> StoreResult<Option<Session>>;

    /// Persist a new session (login)
    fn save_session(&self, session: &Session) -> StoreResult<()>;

    /// Remove the stored session (logout)
    fn clear_session(&self) -> StoreResult<()>;

    /// Bearer token for outgoing requests. `None` is not an error at this
    /// layer; the server decides what an unauthenticated request means.
    fn auth_token(&self) -> StoreResult<Option<String>> {
        Ok(self.load_session()?.map(|s| s.token))
    }
}
