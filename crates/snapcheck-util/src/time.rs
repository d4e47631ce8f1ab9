//! Time utilities for the snapcheck agent
//!
//! Monotonic time drives the lock countdown and scheduler (immune to
//! wall-clock jumps); wall-clock time only appears in wire payloads.

use chrono::{DateTime, Utc};
use std::time::{Duration, Instant};

/// Represents a point in monotonic time for countdown enforcement.
/// This is immune to wall-clock changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MonotonicInstant(Instant);

impl MonotonicInstant {
    pub fn now() -> Self {
        Self(Instant::now())
    }

    pub fn elapsed(&self) -> Duration {
        self.0.elapsed()
    }

    pub fn duration_since(&self, earlier: MonotonicInstant) -> Duration {
        self.0.duration_since(earlier.0)
    }

    /// Returns duration until `self`, or zero if `self` is in the past
    pub fn saturating_duration_until(&self, from: MonotonicInstant) -> Duration {
        if self.0 > from.0 {
            self.0.duration_since(from.0)
        } else {
            Duration::ZERO
        }
    }
}

impl std::ops::Add<Duration> for MonotonicInstant {
    type Output = MonotonicInstant;

    fn add(self, rhs: Duration) -> Self::Output {
        MonotonicInstant(self.0 + rhs)
    }
}

/// Format a timestamp the way the backend stores it: `YYYY-MM-DD HH:MM:SS`,
/// UTC, no sub-second part.
pub fn sql_timestamp(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Format total usage minutes for dashboard display: `"2 hrs 5 min"`, or
/// `"45 min"` when under an hour.
pub fn format_usage_time(total_minutes: u64) -> String {
    let hrs = total_minutes / 60;
    let mins = total_minutes % 60;
    if hrs > 0 {
        format!("{} hrs {} min", hrs, mins)
    } else {
        format!("{} min", mins)
    }
}
