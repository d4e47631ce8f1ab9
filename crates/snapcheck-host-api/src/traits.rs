//! Host capability traits

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use snapcheck_api::DeviceSnapshot;
use thiserror::Error;

/// Errors from host capability operations
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Telemetry unavailable: {0}")]
    DataUnavailable(String),

    #[error("Foreground presence unavailable: {0}")]
    PresenceUnavailable(String),

    #[error("Lock propagation failed: {0}")]
    LockFailed(String),

    #[error("Settings navigation failed: {0}")]
    SettingsFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type HostResult<T> = Result<T, HostError>;

/// One raw usage sample as reported by the platform, before the engine
/// normalizes the batch. `app_name` may be missing or `"Unknown"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawUsageSample {
    pub package_name: String,
    #[serde(default)]
    pub app_name: Option<String>,
    /// Total foreground time in milliseconds
    pub total_time_ms: u64,
}

/// Produces device state and per-app usage on demand.
/// May fail or return partial data; callers treat every call as best-effort.
#[async_trait]
pub trait TelemetrySource: Send + Sync {
    async fn device_snapshot(&self) -> HostResult<DeviceSnapshot>;

    async fn usage_stats(&self) -> HostResult<Vec<RawUsageSample>>;
}

/// Hardware-level lock activation on the host device.
/// Fire-and-forget from the engine's perspective; a failure here never
/// reverts the engine's in-memory lock flag.
#[async_trait]
pub trait LockControl: Send + Sync {
    async fn activate_lock(&self) -> HostResult<()>;

    async fn deactivate_lock(&self) -> HostResult<()>;
}

/// OS-visible "monitoring active" signal that keeps the process alive.
#[async_trait]
pub trait PresenceIndicator: Send + Sync {
    /// Acquire the indicator. Failure aborts a monitoring start.
    async fn acquire(&self) -> HostResult<()>;

    /// Release the indicator. Must tolerate release-without-acquire.
    async fn release(&self) -> HostResult<()>;
}

/// Device-level authorization checks and the settings deep links that
/// resolve them.
#[async_trait]
pub trait PermissionProbe: Send + Sync {
    async fn usage_access_granted(&self) -> bool;

    async fn battery_unrestricted(&self) -> bool;

    async fn open_usage_settings(&self) -> HostResult<()>;

    async fn open_battery_settings(&self) -> HostResult<()>;
}
