//! Shared utilities for the snapcheck agent
//!
//! This crate provides:
//! - ID types (UserId, PackageId, SessionId)
//! - Time utilities (monotonic time, wire timestamp formatting)

mod ids;
mod time;

pub use ids::*;
pub use time::*;
