//! Mock host for testing

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use snapcheck_api::{DeviceSnapshot, LocationStatus, NetworkType};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::{
    HostError, HostResult, LockControl, PermissionProbe, PresenceIndicator, RawUsageSample,
    TelemetrySource,
};

/// Mock implementation of every host capability, with failure toggles and
/// call counters for unit/integration testing.
#[derive(Debug)]
pub struct MockHost {
    /// Configure snapshot capture to fail
    pub fail_snapshot: AtomicBool,

    /// Configure usage stats to fail
    pub fail_usage: AtomicBool,

    /// Configure presence acquisition to fail
    pub fail_presence: AtomicBool,

    /// Configure lock propagation to fail
    pub fail_lock: AtomicBool,

    /// Permission probe answers
    pub usage_access: AtomicBool,
    pub battery_unrestricted: AtomicBool,

    usage_samples: Mutex<Vec<RawUsageSample>>,

    presence_active: AtomicUsize,
    double_acquire: AtomicBool,
    pub snapshot_calls: AtomicU64,
    pub usage_calls: AtomicU64,
    pub lock_activations: AtomicU64,
    pub lock_deactivations: AtomicU64,
    pub settings_opens: AtomicU64,
}

impl MockHost {
    pub fn new() -> Self {
        Self {
            fail_snapshot: AtomicBool::new(false),
            fail_usage: AtomicBool::new(false),
            fail_presence: AtomicBool::new(false),
            fail_lock: AtomicBool::new(false),
            usage_access: AtomicBool::new(true),
            battery_unrestricted: AtomicBool::new(true),
            usage_samples: Mutex::new(Vec::new()),
            presence_active: AtomicUsize::new(0),
            double_acquire: AtomicBool::new(false),
            snapshot_calls: AtomicU64::new(0),
            usage_calls: AtomicU64::new(0),
            lock_activations: AtomicU64::new(0),
            lock_deactivations: AtomicU64::new(0),
            settings_opens: AtomicU64::new(0),
        }
    }

    pub fn set_usage_samples(&self, samples: Vec<RawUsageSample>) {
        *self.usage_samples.lock().unwrap() = samples;
    }

    /// True while the presence indicator is held
    pub fn presence_held(&self) -> bool {
        self.presence_active.load(Ordering::SeqCst) > 0
    }

    /// True if two acquisitions were ever active at once
    pub fn saw_double_acquire(&self) -> bool {
        self.double_acquire.load(Ordering::SeqCst)
    }

    fn fixed_snapshot() -> DeviceSnapshot {
        DeviceSnapshot {
            device_model: "MockPhone".into(),
            unique_id: "mock-0001".into(),
            battery_percent: 73,
            network: NetworkType::Wifi,
            location: LocationStatus::Gps,
            captured_at: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
        }
    }
}

impl Default for MockHost {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TelemetrySource for MockHost {
    async fn device_snapshot(&self) -> HostResult<DeviceSnapshot> {
        self.snapshot_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_snapshot.load(Ordering::SeqCst) {
            return Err(HostError::DataUnavailable("mock snapshot failure".into()));
        }
        Ok(Self::fixed_snapshot())
    }

    async fn usage_stats(&self) -> HostResult<Vec<RawUsageSample>> {
        self.usage_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_usage.load(Ordering::SeqCst) {
            return Err(HostError::DataUnavailable("mock usage failure".into()));
        }
        Ok(self.usage_samples.lock().unwrap().clone())
    }
}

#[async_trait]
impl LockControl for MockHost {
    async fn activate_lock(&self) -> HostResult<()> {
        if self.fail_lock.load(Ordering::SeqCst) {
            return Err(HostError::LockFailed("mock lock failure".into()));
        }
        self.lock_activations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn deactivate_lock(&self) -> HostResult<()> {
        if self.fail_lock.load(Ordering::SeqCst) {
            return Err(HostError::LockFailed("mock unlock failure".into()));
        }
        self.lock_deactivations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl PresenceIndicator for MockHost {
    async fn acquire(&self) -> HostResult<()> {
        if self.fail_presence.load(Ordering::SeqCst) {
            return Err(HostError::PresenceUnavailable("mock presence failure".into()));
        }
        let previous = self.presence_active.fetch_add(1, Ordering::SeqCst);
        if previous > 0 {
            self.double_acquire.store(true, Ordering::SeqCst);
        }
        Ok(())
    }

    async fn release(&self) -> HostResult<()> {
        let _ = self
            .presence_active
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| Some(n.saturating_sub(1)));
        Ok(())
    }
}

#[async_trait]
impl PermissionProbe for MockHost {
    async fn usage_access_granted(&self) -> bool {
        self.usage_access.load(Ordering::SeqCst)
    }

    async fn battery_unrestricted(&self) -> bool {
        self.battery_unrestricted.load(Ordering::SeqCst)
    }

    async fn open_usage_settings(&self) -> HostResult<()> {
        self.settings_opens.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn open_battery_settings(&self) -> HostResult<()> {
        self.settings_opens.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn presence_tracks_held_state() {
        let host = MockHost::new();
        assert!(!host.presence_held());

        host.acquire().await.unwrap();
        assert!(host.presence_held());
        assert!(!host.saw_double_acquire());

        host.release().await.unwrap();
        assert!(!host.presence_held());

        // Release without acquire is tolerated
        host.release().await.unwrap();
        assert!(!host.presence_held());
    }

    #[tokio::test]
    async fn presence_detects_double_acquire() {
        let host = MockHost::new();
        host.acquire().await.unwrap();
        host.acquire().await.unwrap();
        assert!(host.saw_double_acquire());
    }

    #[tokio::test]
    async fn snapshot_failure_toggle() {
        let host = MockHost::new();
        assert!(host.device_snapshot().await.is_ok());

        host.fail_snapshot.store(true, Ordering::SeqCst);
        let result = host.device_snapshot().await;
        assert!(matches!(result, Err(HostError::DataUnavailable(_))));
        assert_eq!(host.snapshot_calls.load(Ordering::SeqCst), 2);
    }
}
