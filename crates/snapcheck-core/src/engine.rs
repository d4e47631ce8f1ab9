//! The monitoring engine
//!
//! One logical actor driven by three periodic triggers (sync cycle, fast
//! lock poll, 1-second countdown) plus the event-driven foreground-resume
//! trigger. Start/stop transitions serialize on the monitor mutex; lock
//! state serializes on its own mutex; every write from a scheduled task is
//! guarded by the session epoch so a cycle that outlives `stop()` mutates
//! nothing.

use snapcheck_api::{LockState, PlanInfo, Session};
use snapcheck_client::SyncApi;
use snapcheck_config::MonitorConfig;
use snapcheck_host_api::{LockControl, PermissionProbe, PresenceIndicator, TelemetrySource};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::scheduler;
use crate::{
    EngineError, EngineEvent, EngineResult, MonitorState, MonitoringSession, PermissionGatekeeper,
    PermissionKind,
};

pub(crate) struct MonitorInner {
    pub(crate) state: MonitorState,
    pub(crate) session: Option<MonitoringSession>,
    pub(crate) shutdown: Option<watch::Sender<bool>>,
    pub(crate) tasks: Vec<JoinHandle<()>>,
}

pub(crate) struct EngineInner {
    pub(crate) session: Session,
    pub(crate) config: MonitorConfig,
    pub(crate) api: Arc<dyn SyncApi>,
    pub(crate) telemetry: Arc<dyn TelemetrySource>,
    pub(crate) lock_control: Arc<dyn LockControl>,
    pub(crate) presence: Arc<dyn PresenceIndicator>,
    pub(crate) gatekeeper: PermissionGatekeeper,

    pub(crate) monitor: Mutex<MonitorInner>,
    pub(crate) lock: Mutex<LockState>,
    pub(crate) plan: StdMutex<Option<PlanInfo>>,
    pub(crate) lock_tx: watch::Sender<LockState>,
    pub(crate) events: mpsc::UnboundedSender<EngineEvent>,

    /// Bumped on every start and stop; scheduled work captures the value
    /// at cycle entry and re-checks it before each state write.
    pub(crate) epoch: AtomicU64,

    /// Serializes sync cycles so a slow cycle never races the next tick
    pub(crate) cycle_lock: Mutex<()>,
}

impl EngineInner {
    pub(crate) fn current_epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    pub(crate) fn is_current(&self, epoch: u64) -> bool {
        self.current_epoch() == epoch
    }

    pub(crate) fn emit(&self, event: EngineEvent) {
        let _ = self.events.send(event);
    }
}

/// Handle to the monitoring engine. Cheap to clone; all clones drive the
/// same underlying state.
#[derive(Clone)]
pub struct Engine {
    inner: Arc<EngineInner>,
}

impl Engine {
    /// Build an engine around an authenticated session. Returns the engine
    /// and the event stream for the presentation layer.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        session: Session,
        config: MonitorConfig,
        api: Arc<dyn SyncApi>,
        telemetry: Arc<dyn TelemetrySource>,
        lock_control: Arc<dyn LockControl>,
        presence: Arc<dyn PresenceIndicator>,
        permissions: Arc<dyn PermissionProbe>,
    ) -> (Self, mpsc::UnboundedReceiver<EngineEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (lock_tx, _) = watch::channel(LockState::unlocked());

        let inner = Arc::new(EngineInner {
            session,
            config,
            api,
            telemetry,
            lock_control,
            presence,
            gatekeeper: PermissionGatekeeper::new(permissions),
            monitor: Mutex::new(MonitorInner {
                state: MonitorState::Idle,
                session: None,
                shutdown: None,
                tasks: Vec::new(),
            }),
            lock: Mutex::new(LockState::unlocked()),
            plan: StdMutex::new(None),
            lock_tx,
            events: events_tx,
            epoch: AtomicU64::new(0),
            cycle_lock: Mutex::new(()),
        });

        (Self { inner }, events_rx)
    }

    /// Start background monitoring. Valid only from `Idle`.
    ///
    /// Acquires the foreground presence indicator (failure aborts the
    /// start and the state stays `Idle`), runs one immediate sync cycle
    /// regardless of its outcome, then begins the periodic schedule.
    pub async fn start(&self) -> EngineResult<()> {
        let mut monitor = self.inner.monitor.lock().await;
        if monitor.state != MonitorState::Idle {
            return Err(EngineError::AlreadyActive);
        }
        monitor.state = MonitorState::Starting;

        if let Err(e) = self.inner.presence.acquire().await {
            warn!(error = %e, "Presence indicator unavailable, aborting start");
            monitor.state = MonitorState::Idle;
            return Err(EngineError::PresenceUnavailable(e.to_string()));
        }

        let epoch = self.inner.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        let session = MonitoringSession::begin(self.inner.config.sync_interval());
        let session_id = session.session_id.clone();

        info!(
            session_id = %session_id,
            sync_interval_secs = self.inner.config.sync_interval_secs,
            lock_poll_interval_secs = self.inner.config.lock_poll_interval_secs,
            "Monitoring starting"
        );

        // First cycle runs inline so the dashboard sees the device
        // immediately; its outcome does not gate the start.
        scheduler::run_sync_cycle(&self.inner, epoch).await;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        monitor.tasks = scheduler::spawn_tasks(self.inner.clone(), epoch, shutdown_rx);
        monitor.shutdown = Some(shutdown_tx);
        monitor.session = Some(session);
        monitor.state = MonitorState::Active;

        self.inner.emit(EngineEvent::MonitoringStarted { session_id });
        Ok(())
    }

    /// Stop background monitoring. A no-op from `Idle`.
    ///
    /// Cancels all three periodic triggers atomically and releases the
    /// presence indicator. A cycle already in flight completes, but the
    /// epoch bump makes its writes no-ops.
    pub async fn stop(&self) -> EngineResult<()> {
        let mut monitor = self.inner.monitor.lock().await;
        if monitor.state != MonitorState::Active {
            return Ok(());
        }
        monitor.state = MonitorState::Stopping;

        self.inner.epoch.fetch_add(1, Ordering::SeqCst);

        if let Some(shutdown) = monitor.shutdown.take() {
            let _ = shutdown.send(true);
        }
        monitor.tasks.clear();

        let session = monitor.session.take();

        if let Err(e) = self.inner.presence.release().await {
            warn!(error = %e, "Failed to release presence indicator");
        }

        monitor.state = MonitorState::Idle;

        if let Some(session) = session {
            info!(
                session_id = %session.session_id,
                uptime_secs = session.uptime().as_secs(),
                "Monitoring stopped"
            );
            self.inner.emit(EngineEvent::MonitoringStopped {
                session_id: session.session_id,
            });
        }

        Ok(())
    }

    /// Current lifecycle state
    pub async fn state(&self) -> MonitorState {
        self.inner.monitor.lock().await.state
    }

    /// Subscribe to lock state updates for rendering the overlay and the
    /// countdown text
    pub fn lock_state(&self) -> watch::Receiver<LockState> {
        self.inner.lock_tx.subscribe()
    }

    /// Last plan details returned by a device sync, if any
    pub fn last_plan(&self) -> Option<PlanInfo> {
        self.inner.plan.lock().unwrap().clone()
    }

    /// Run the permission checklist (app start). Emits a prompt event when
    /// a permission is missing and no prompt is already in flight.
    pub async fn check_permissions(&self) -> Option<PermissionKind> {
        let due = self.inner.gatekeeper.evaluate().await;
        if let Some(kind) = due {
            self.inner.emit(EngineEvent::PermissionPromptRequired(kind));
        }
        due
    }

    /// Foreground-resume trigger: re-runs the permission checklist from
    /// scratch with the same single-prompt discipline.
    pub async fn notify_foreground_resume(&self) -> Option<PermissionKind> {
        self.check_permissions().await
    }

    /// The user dismissed or acted on the current permission prompt
    pub async fn resolve_permission_prompt(&self) {
        self.inner.gatekeeper.resolve().await;
    }

    /// Open the settings page that resolves the given prompt
    pub async fn open_permission_settings(&self, kind: PermissionKind) {
        if let Err(e) = self.inner.gatekeeper.open_settings(kind).await {
            warn!(error = %e, kind = ?kind, "Failed to open settings");
        }
    }
}
