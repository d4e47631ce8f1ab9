//! Configuration parsing and validation for the snapcheck agent
//!
//! TOML configuration with a versioned schema and validation that collects
//! every problem before failing, so a misconfigured device reports all of
//! its mistakes at once.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Current supported config version
pub const CURRENT_CONFIG_VERSION: u32 = 1;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation failed: {errors:?}")]
    ValidationFailed { errors: Vec<ValidationError> },

    #[error("Unsupported config version: {0}")]
    UnsupportedVersion(u32),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// A single validation problem, with the offending field path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Top-level agent configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default = "default_version")]
    pub config_version: u32,

    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub monitor: MonitorConfig,

    #[serde(default)]
    pub host: HostConfig,
}

fn default_version() -> u32 {
    CURRENT_CONFIG_VERSION
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            config_version: CURRENT_CONFIG_VERSION,
            backend: BackendConfig::default(),
            monitor: MonitorConfig::default(),
            host: HostConfig::default(),
        }
    }
}

/// Backend endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL including the `/api` prefix
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Transport timeout applied to every request
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://appbackend.snapcheck.io/api".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl BackendConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Monitoring cadence settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Full sync cycle period (heartbeat, snapshot, usage, lock poll)
    #[serde(default = "default_sync_interval_secs")]
    pub sync_interval_secs: u64,

    /// Fast lock-only poll period, independent of the sync cycle
    #[serde(default = "default_lock_poll_interval_secs")]
    pub lock_poll_interval_secs: u64,

    /// The agent's own package, excluded from usage batches
    #[serde(default = "default_own_package")]
    pub own_package: String,
}

fn default_sync_interval_secs() -> u64 {
    15
}

fn default_lock_poll_interval_secs() -> u64 {
    5
}

fn default_own_package() -> String {
    "com.parental.snapcheck".to_string()
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            sync_interval_secs: default_sync_interval_secs(),
            lock_poll_interval_secs: default_lock_poll_interval_secs(),
            own_package: default_own_package(),
        }
    }
}

impl MonitorConfig {
    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs)
    }

    pub fn lock_poll_interval(&self) -> Duration {
        Duration::from_secs(self.lock_poll_interval_secs)
    }
}

/// Host adapter settings (Linux)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    /// Command spawned when the lock engages
    #[serde(default = "default_lock_command")]
    pub lock_command: Vec<String>,

    /// Command spawned when the lock releases
    #[serde(default = "default_unlock_command")]
    pub unlock_command: Vec<String>,
}

fn default_lock_command() -> Vec<String> {
    vec!["loginctl".into(), "lock-session".into()]
}

fn default_unlock_command() -> Vec<String> {
    vec!["loginctl".into(), "unlock-session".into()]
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            lock_command: default_lock_command(),
            unlock_command: default_unlock_command(),
        }
    }
}

/// Load and validate configuration from a TOML file
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<AgentConfig> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from a TOML string
pub fn parse_config(content: &str) -> ConfigResult<AgentConfig> {
    let config: AgentConfig = toml::from_str(content)?;

    if config.config_version != CURRENT_CONFIG_VERSION {
        return Err(ConfigError::UnsupportedVersion(config.config_version));
    }

    let errors = validate_config(&config);
    if !errors.is_empty() {
        return Err(ConfigError::ValidationFailed { errors });
    }

    Ok(config)
}

/// Collect every validation problem in the parsed config
pub fn validate_config(config: &AgentConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if !config.backend.base_url.starts_with("http://")
        && !config.backend.base_url.starts_with("https://")
    {
        errors.push(ValidationError::new(
            "backend.base_url",
            "must be an http(s) URL",
        ));
    }

    if config.backend.request_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "backend.request_timeout_secs",
            "must be at least 1",
        ));
    }

    if config.monitor.sync_interval_secs < 5 {
        errors.push(ValidationError::new(
            "monitor.sync_interval_secs",
            "must be at least 5 to avoid hammering the backend",
        ));
    }

    if config.monitor.lock_poll_interval_secs == 0 {
        errors.push(ValidationError::new(
            "monitor.lock_poll_interval_secs",
            "must be at least 1",
        ));
    }

    if config.monitor.own_package.is_empty() {
        errors.push(ValidationError::new(
            "monitor.own_package",
            "must not be empty",
        ));
    }

    if config.host.lock_command.is_empty() {
        errors.push(ValidationError::new("host.lock_command", "must not be empty"));
    }

    if config.host.unlock_command.is_empty() {
        errors.push(ValidationError::new(
            "host.unlock_command",
            "must not be empty",
        ));
    }

    errors
}
