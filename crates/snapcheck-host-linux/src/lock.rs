//! Command-spawning lock control

use async_trait::async_trait;
use snapcheck_host_api::{HostError, HostResult, LockControl};
use tokio::process::Command;
use tracing::info;

/// Lock propagation by running configurable commands
/// (default: `loginctl lock-session` / `loginctl unlock-session`).
pub struct CommandLockControl {
    lock_command: Vec<String>,
    unlock_command: Vec<String>,
}

impl CommandLockControl {
    pub fn new(lock_command: Vec<String>, unlock_command: Vec<String>) -> Self {
        Self {
            lock_command,
            unlock_command,
        }
    }

    async fn run(command: &[String]) -> HostResult<()> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| HostError::LockFailed("empty lock command".into()))?;

        let status = Command::new(program)
            .args(args)
            .status()
            .await
            .map_err(|e| HostError::LockFailed(format!("{}: {}", program, e)))?;

        if status.success() {
            Ok(())
        } else {
            Err(HostError::LockFailed(format!(
                "{} exited with {}",
                program, status
            )))
        }
    }
}

#[async_trait]
impl LockControl for CommandLockControl {
    async fn activate_lock(&self) -> HostResult<()> {
        info!(command = ?self.lock_command, "Activating hardware lock");
        Self::run(&self.lock_command).await
    }

    async fn deactivate_lock(&self) -> HostResult<()> {
        info!(command = ?self.unlock_command, "Deactivating hardware lock");
        Self::run(&self.unlock_command).await
    }
}
