//! Local session store for the snapcheck agent
//!
//! The engine treats the session (`userId` + auth token) as externally
//! owned: it reads it on every authenticated request and never writes it.
//! Only the login flow persists a new session.

mod file;
mod memory;
mod traits;

pub use file::*;
pub use memory::*;
pub use traits::*;

use thiserror::Error;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt session document: {0}")]
    Corrupt(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;
