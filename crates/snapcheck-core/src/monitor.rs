//! Monitoring session state

use chrono::{DateTime, Utc};
use snapcheck_util::{MonotonicInstant, SessionId};
use std::time::Duration;

/// Lifecycle of background monitoring.
///
/// `Starting` and `Stopping` are only ever held while the transition mutex
/// is locked, so callers observe `Idle` or `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Idle,
    Starting,
    Active,
    Stopping,
}

/// One active monitoring run. Exactly one exists per device at a time,
/// enforced by the state machine.
#[derive(Debug, Clone)]
pub struct MonitoringSession {
    pub session_id: SessionId,

    /// Wall-clock start time (for display/logging)
    pub started_at: DateTime<Utc>,

    /// Monotonic start time (for uptime accounting)
    pub started_at_mono: MonotonicInstant,

    /// Full sync cycle period
    pub sync_interval: Duration,
}

impl MonitoringSession {
    pub fn begin(sync_interval: Duration) -> Self {
        Self {
            session_id: SessionId::new(),
            started_at: Utc::now(),
            started_at_mono: MonotonicInstant::now(),
            sync_interval,
        }
    }

    /// Monitoring uptime so far
    pub fn uptime(&self) -> Duration {
        self.started_at_mono.elapsed()
    }
}
