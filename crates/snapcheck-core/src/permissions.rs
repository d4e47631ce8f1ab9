//! Permission gatekeeper
//!
//! Two device-level authorizations gate full telemetry: usage access and
//! battery-optimization exemption. Both are re-probed from scratch on
//! every evaluation; the only memory is the in-flight flag that keeps an
//! unresolved prompt from being shown twice.

use snapcheck_host_api::PermissionProbe;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Which permission a prompt should ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionKind {
    UsageAccess,
    BatteryOptimization,
}

/// Snapshot of the permission checklist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionState {
    pub usage_access_granted: bool,
    pub battery_unrestricted: bool,
    pub alert_in_flight: bool,
}

/// Serializes prompt decisions so the resume trigger and the user's prompt
/// response never race.
pub struct PermissionGatekeeper {
    probe: Arc<dyn PermissionProbe>,
    alert_in_flight: Mutex<bool>,
}

impl PermissionGatekeeper {
    pub fn new(probe: Arc<dyn PermissionProbe>) -> Self {
        Self {
            probe,
            alert_in_flight: Mutex::new(false),
        }
    }

    /// Re-run both checks and decide whether a prompt is due.
    ///
    /// Usage access is checked first; battery exemption only matters once
    /// usage access exists. While a prompt is unresolved no second prompt
    /// is produced, but a re-evaluation that finds the permission granted
    /// clears the in-flight flag (the usual path: the user visited
    /// settings and came back).
    pub async fn evaluate(&self) -> Option<PermissionKind> {
        let usage_access = self.probe.usage_access_granted().await;
        let battery = if usage_access {
            self.probe.battery_unrestricted().await
        } else {
            false
        };

        let mut in_flight = self.alert_in_flight.lock().await;

        let due = if !usage_access {
            Some(PermissionKind::UsageAccess)
        } else if !battery {
            Some(PermissionKind::BatteryOptimization)
        } else {
            None
        };

        match due {
            None => {
                *in_flight = false;
                None
            }
            Some(_) if *in_flight => {
                debug!("Permission prompt already in flight, suppressing");
                None
            }
            Some(kind) => {
                *in_flight = true;
                info!(kind = ?kind, "Permission missing, surfacing prompt");
                Some(kind)
            }
        }
    }

    /// The user dismissed or acted on the prompt
    pub async fn resolve(&self) {
        *self.alert_in_flight.lock().await = false;
    }

    /// Current checklist state, freshly probed
    pub async fn current_state(&self) -> PermissionState {
        let usage_access_granted = self.probe.usage_access_granted().await;
        let battery_unrestricted = if usage_access_granted {
            self.probe.battery_unrestricted().await
        } else {
            false
        };
        PermissionState {
            usage_access_granted,
            battery_unrestricted,
            alert_in_flight: *self.alert_in_flight.lock().await,
        }
    }

    /// Open the settings page that resolves the given prompt
    pub async fn open_settings(&self, kind: PermissionKind) -> Result<(), snapcheck_host_api::HostError> {
        match kind {
            PermissionKind::UsageAccess => self.probe.open_usage_settings().await,
            PermissionKind::BatteryOptimization => self.probe.open_battery_settings().await,
        }
    }
}
