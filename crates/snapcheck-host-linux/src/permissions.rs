//! Permission probe for Linux

use async_trait::async_trait;
use snapcheck_host_api::{HostResult, PermissionProbe};
use std::path::Path;
use tracing::info;

/// Permission probe for a Linux host.
///
/// Usage access maps to a readable `/proc`; there is no battery-optimizer
/// to be exempted from, so that check always passes. The settings
/// deep links have no target on a headless box and only log.
pub struct LinuxPermissionProbe;

impl LinuxPermissionProbe {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LinuxPermissionProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PermissionProbe for LinuxPermissionProbe {
    async fn usage_access_granted(&self) -> bool {
        Path::new("/proc/uptime").exists()
    }

    async fn battery_unrestricted(&self) -> bool {
        true
    }

    async fn open_usage_settings(&self) -> HostResult<()> {
        info!("No usage-access settings page on this host");
        Ok(())
    }

    async fn open_battery_settings(&self) -> HostResult<()> {
        info!("No battery settings page on this host");
        Ok(())
    }
}
