//! Host capability trait interfaces for the snapcheck agent
//!
//! This crate defines the capability-based interface between the engine and
//! platform-specific implementations. It contains no platform code itself.

mod mock;
mod traits;

pub use mock::*;
pub use traits::*;
