//! Linux host adapter for the snapcheck agent
//!
//! Best-effort implementations of the host capability traits for a Linux
//! machine:
//! - Telemetry from sysinfo and `/sys` (battery, network, machine id)
//! - Presence as an exclusively-created pidfile
//! - Lock propagation by spawning configurable commands
//! - Permission probe that treats a readable `/proc` as usage access
//!
//! The production host shell (the mobile platform) implements the same
//! traits natively; this adapter exists so the daemon runs end-to-end on a
//! development box.

mod lock;
mod permissions;
mod presence;
mod telemetry;

pub use lock::*;
pub use permissions::*;
pub use presence::*;
pub use telemetry::*;
