//! Monitoring engine for the snapcheck agent
//!
//! This crate is the heart of the agent, containing:
//! - Monitoring state machine (Idle -> Starting -> Active -> Stopping -> Idle)
//! - Sync scheduler (heartbeat, snapshot, usage, lock poll per cycle)
//! - Lock reconciler (server directive merged with a local countdown)
//! - Permission gatekeeper (usage access, battery exemption)
//!
//! Everything remote or platform-specific arrives through trait objects
//! (`SyncApi`, the host capability traits), so the whole engine is testable
//! without a network or a device.

mod engine;
mod events;
mod monitor;
mod permissions;
mod reconcile;
mod scheduler;
mod usage;

pub use engine::*;
pub use events::*;
pub use monitor::*;
pub use permissions::*;
pub use reconcile::*;
pub use usage::*;

use thiserror::Error;

/// Errors from engine lifecycle operations
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Monitoring already active")]
    AlreadyActive,

    #[error("Foreground presence unavailable: {0}")]
    PresenceUnavailable(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
