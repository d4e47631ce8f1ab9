//! Domain types for the monitoring engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use snapcheck_util::{PackageId, UserId};

/// Authenticated session read from the local store.
/// Absence means the engine must not run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: UserId,
    pub token: String,
}

/// Active network classification reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkType {
    Wifi,
    Other,
}

/// Location permission state reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationStatus {
    Gps,
    Off,
}

/// Point-in-time device state, captured fresh on every sync cycle.
/// Never persisted; its only identity is `captured_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    pub device_model: String,
    pub unique_id: String,
    /// 0–100
    pub battery_percent: u8,
    pub network: NetworkType,
    pub location: LocationStatus,
    pub captured_at: DateTime<Utc>,
}

/// Per-application usage, already normalized for upload
/// (nonzero minutes, unique package per batch, sorted descending).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppUsageRecord {
    pub app_name: String,
    pub package: PackageId,
    pub usage_minutes: u64,
}

/// Server-declared lock directive, mirrored locally between polls.
///
/// `remaining_seconds` is the time until a scheduled lock engages and is
/// only meaningful while `is_locked` is false.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockState {
    pub is_locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_seconds: Option<u64>,
}

impl LockState {
    pub fn unlocked() -> Self {
        Self {
            is_locked: false,
            remaining_seconds: None,
        }
    }
}

impl Default for LockState {
    fn default() -> Self {
        Self::unlocked()
    }
}

/// Subscription details returned by a device sync
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanInfo {
    pub device_model: String,
    pub plan: String,
    pub days_left: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_state_defaults_unlocked() {
        let state = LockState::default();
        assert!(!state.is_locked);
        assert!(state.remaining_seconds.is_none());
    }

    #[test]
    fn lock_state_wire_names() {
        let parsed: LockState =
            serde_json::from_str(r#"{"isLocked":true,"remainingSeconds":120}"#).unwrap();
        assert!(parsed.is_locked);
        assert_eq!(parsed.remaining_seconds, Some(120));
    }

    #[test]
    fn lock_state_remaining_optional() {
        let parsed: LockState = serde_json::from_str(r#"{"isLocked":false}"#).unwrap();
        assert!(!parsed.is_locked);
        assert!(parsed.remaining_seconds.is_none());
    }
}
