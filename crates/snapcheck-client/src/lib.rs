//! Typed HTTP client for the snapcheck backend
//!
//! Every operation the engine performs remotely lives behind the [`SyncApi`]
//! trait; [`HttpSyncClient`] is the reqwest implementation and
//! [`MockSyncApi`] the test double. Failures are normalized into
//! [`ClientError`] values: transport problems, auth rejections, and
//! backend `{success:false}` envelopes all come back as typed errors that
//! the engine logs and moves past, never as panics or aborts.

mod http;
mod mock;
mod traits;

pub use http::*;
pub use mock::*;
pub use traits::*;

use thiserror::Error;

/// Errors from backend operations
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network-level failure, including timeouts
    #[error("Transport failure: {0}")]
    Transport(String),

    /// 401/403-class rejection; the presentation layer may force a logout
    #[error("Auth failure (HTTP {status}): {message}")]
    Auth { status: u16, message: String },

    /// The backend answered but refused the operation
    #[error("API failure: {message}")]
    Api { message: String },

    /// The backend answered with a body this client cannot interpret
    #[error("Decode failure: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn is_auth(&self) -> bool {
        matches!(self, ClientError::Auth { .. })
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Transport(e.to_string())
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
