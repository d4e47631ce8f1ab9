//! Telemetry from sysinfo and /sys

use async_trait::async_trait;
use chrono::Utc;
use snapcheck_api::{DeviceSnapshot, LocationStatus, NetworkType};
use snapcheck_host_api::{HostError, HostResult, RawUsageSample, TelemetrySource};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System};
use tracing::debug;

/// Telemetry source for a Linux machine.
///
/// The sysfs roots are injectable so tests can point them at a temp
/// directory; defaults target the real system paths.
pub struct LinuxTelemetry {
    system: Mutex<System>,
    power_supply_root: PathBuf,
    net_root: PathBuf,
    machine_id_path: PathBuf,
    own_pid: u32,
}

impl LinuxTelemetry {
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new()),
            power_supply_root: PathBuf::from("/sys/class/power_supply"),
            net_root: PathBuf::from("/sys/class/net"),
            machine_id_path: PathBuf::from("/etc/machine-id"),
            own_pid: std::process::id(),
        }
    }

    pub fn with_roots(
        power_supply_root: impl Into<PathBuf>,
        net_root: impl Into<PathBuf>,
        machine_id_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            system: Mutex::new(System::new()),
            power_supply_root: power_supply_root.into(),
            net_root: net_root.into(),
            machine_id_path: machine_id_path.into(),
            own_pid: std::process::id(),
        }
    }

    fn device_model(&self) -> String {
        for candidate in [
            "/sys/devices/virtual/dmi/id/product_name",
            "/sys/firmware/devicetree/base/model",
        ] {
            if let Ok(model) = std::fs::read_to_string(candidate) {
                let model = model.trim_matches(char::from(0)).trim();
                if !model.is_empty() {
                    return model.to_string();
                }
            }
        }
        System::name().unwrap_or_else(|| "Linux".to_string())
    }

    fn unique_id(&self) -> HostResult<String> {
        match std::fs::read_to_string(&self.machine_id_path) {
            Ok(id) if !id.trim().is_empty() => Ok(id.trim().to_string()),
            Ok(_) => Err(HostError::DataUnavailable("machine-id is empty".into())),
            Err(e) => Err(HostError::DataUnavailable(format!(
                "machine-id unreadable: {}",
                e
            ))),
        }
    }

    /// First battery's capacity; a machine without one reports full.
    fn battery_percent(&self) -> u8 {
        let entries = match std::fs::read_dir(&self.power_supply_root) {
            Ok(entries) => entries,
            Err(_) => return 100,
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if read_trimmed(&path.join("type")).as_deref() != Some("Battery") {
                continue;
            }
            if let Some(capacity) = read_trimmed(&path.join("capacity")) {
                if let Ok(percent) = capacity.parse::<u8>() {
                    return percent.min(100);
                }
            }
        }

        debug!("No battery found, reporting 100%");
        100
    }

    /// Wifi when any wl* interface is up
    fn network_type(&self) -> NetworkType {
        let entries = match std::fs::read_dir(&self.net_root) {
            Ok(entries) => entries,
            Err(_) => return NetworkType::Other,
        };

        for entry in entries.flatten() {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if !name.starts_with("wl") {
                continue;
            }
            if read_trimmed(&entry.path().join("operstate")).as_deref() == Some("up") {
                return NetworkType::Wifi;
            }
        }

        NetworkType::Other
    }
}

impl Default for LinuxTelemetry {
    fn default() -> Self {
        Self::new()
    }
}

fn read_trimmed(path: &Path) -> Option<String> {
    std::fs::read_to_string(path).ok().map(|s| s.trim().to_string())
}

#[async_trait]
impl TelemetrySource for LinuxTelemetry {
    async fn device_snapshot(&self) -> HostResult<DeviceSnapshot> {
        Ok(DeviceSnapshot {
            device_model: self.device_model(),
            unique_id: self.unique_id()?,
            battery_percent: self.battery_percent(),
            network: self.network_type(),
            // No location hardware to probe on this host
            location: LocationStatus::Off,
            captured_at: Utc::now(),
        })
    }

    async fn usage_stats(&self) -> HostResult<Vec<RawUsageSample>> {
        let mut system = self
            .system
            .lock()
            .map_err(|_| HostError::Internal("telemetry mutex poisoned".into()))?;

        system.refresh_processes_specifics(ProcessesToUpdate::All, ProcessRefreshKind::everything());

        // Aggregate run time by process name; multiple instances of the
        // same program count as one application
        let mut by_name: HashMap<String, u64> = HashMap::new();
        for (pid, process) in system.processes() {
            if pid.as_u32() == self.own_pid {
                continue;
            }
            let name = process.name().to_string_lossy().to_string();
            if name.is_empty() {
                continue;
            }
            *by_name.entry(name).or_insert(0) += process.run_time() * 1000;
        }

        Ok(by_name
            .into_iter()
            .map(|(name, total_time_ms)| RawUsageSample {
                app_name: Some(name.clone()),
                package_name: name,
                total_time_ms,
            })
            .collect())
    }
}
