//! Pidfile-based presence indicator

use async_trait::async_trait;
use snapcheck_host_api::{HostError, HostResult, PresenceIndicator};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Presence as an exclusively-created pidfile.
///
/// The file plays the role of the platform's persistent "monitoring
/// active" notification: it is visible to the rest of the system, at most
/// one exists, and acquiring it fails while another monitoring run holds
/// it. A pidfile left behind by a dead process is reclaimed.
pub struct PidfilePresence {
    path: PathBuf,
}

impl PidfilePresence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn try_create(&self) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)?;
        write!(file, "{}", std::process::id())?;
        Ok(())
    }

    fn holder_alive(&self) -> bool {
        let Ok(content) = std::fs::read_to_string(&self.path) else {
            return false;
        };
        let Ok(pid) = content.trim().parse::<u32>() else {
            return false;
        };
        Path::new("/proc").join(pid.to_string()).exists()
    }
}

#[async_trait]
impl PresenceIndicator for PidfilePresence {
    async fn acquire(&self) -> HostResult<()> {
        match self.try_create() {
            Ok(()) => {
                info!(path = %self.path.display(), "Presence indicator acquired");
                return Ok(());
            }
            Err(e) if e.kind() != std::io::ErrorKind::AlreadyExists => {
                return Err(HostError::PresenceUnavailable(e.to_string()));
            }
            Err(_) => {}
        }

        if self.holder_alive() {
            return Err(HostError::PresenceUnavailable(format!(
                "pidfile {} held by a live process",
                self.path.display()
            )));
        }

        // Stale pidfile from a dead process; reclaim it
        warn!(path = %self.path.display(), "Reclaiming stale presence pidfile");
        std::fs::remove_file(&self.path)
            .map_err(|e| HostError::PresenceUnavailable(e.to_string()))?;
        self.try_create()
            .map_err(|e| HostError::PresenceUnavailable(e.to_string()))?;

        info!(path = %self.path.display(), "Presence indicator acquired");
        Ok(())
    }

    async fn release(&self) -> HostResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "Presence indicator released");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(HostError::Io(e)),
        }
    }
}
