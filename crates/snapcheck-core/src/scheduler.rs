//! Periodic scheduling and the sync cycle
//!
//! Three named tasks run under one shutdown channel: the full sync cycle,
//! the fast lock-only poll, and the 1-second countdown tick. `stop()`
//! flips the channel once, which cancels all three atomically.

use snapcheck_api::{DeviceSyncRequest, LockState, UsageSyncRequest};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::engine::EngineInner;
use crate::reconcile::{reconcile, tick, LockTransition};
use crate::usage::normalize_usage;
use crate::EngineEvent;

pub(crate) fn spawn_tasks(
    inner: Arc<EngineInner>,
    epoch: u64,
    shutdown: watch::Receiver<bool>,
) -> Vec<JoinHandle<()>> {
    vec![
        tokio::spawn(sync_loop(inner.clone(), epoch, shutdown.clone())),
        tokio::spawn(lock_poll_loop(inner.clone(), epoch, shutdown.clone())),
        tokio::spawn(countdown_loop(inner, epoch, shutdown)),
    ]
}

async fn sync_loop(inner: Arc<EngineInner>, epoch: u64, mut shutdown: watch::Receiver<bool>) {
    let mut interval = tokio::time::interval(inner.config.sync_interval());
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The immediate cycle already ran inside start()
    interval.tick().await;

    loop {
        tokio::select! {
            _ = interval.tick() => {
                run_sync_cycle(&inner, epoch).await;
            }
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    debug!("Sync loop shutting down");
                    break;
                }
            }
        }
    }
}

async fn lock_poll_loop(inner: Arc<EngineInner>, epoch: u64, mut shutdown: watch::Receiver<bool>) {
    let mut interval = tokio::time::interval(inner.config.lock_poll_interval());
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval.tick().await;

    loop {
        tokio::select! {
            _ = interval.tick() => {
                poll_lock(&inner, epoch).await;
            }
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    debug!("Lock poll loop shutting down");
                    break;
                }
            }
        }
    }
}

async fn countdown_loop(inner: Arc<EngineInner>, epoch: u64, mut shutdown: watch::Receiver<bool>) {
    let mut interval = tokio::time::interval(Duration::from_secs(1));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval.tick().await;

    loop {
        tokio::select! {
            _ = interval.tick() => {
                tick_countdown(&inner, epoch).await;
            }
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    debug!("Countdown loop shutting down");
                    break;
                }
            }
        }
    }
}

/// One full sync cycle: heartbeat, snapshot upload, usage upload, lock
/// poll. Every step is best-effort; a failure is logged and the cycle
/// moves to the next step.
pub(crate) async fn run_sync_cycle(inner: &Arc<EngineInner>, epoch: u64) {
    // Monitoring may have stopped between scheduling and execution
    if !inner.is_current(epoch) {
        debug!("Skipping sync cycle for a stopped session");
        return;
    }

    let _cycle = inner.cycle_lock.lock().await;
    let user_id = inner.session.user_id.clone();

    // 1. Heartbeat
    if let Err(e) = inner.api.heartbeat(&user_id).await {
        warn!(error = %e, "Heartbeat failed");
    }

    // 2. Device snapshot: capture then upload; a failed capture skips the
    // upload for this cycle without retrying mid-cycle
    match inner.telemetry.device_snapshot().await {
        Ok(snapshot) => {
            let request = DeviceSyncRequest::from_snapshot(user_id.clone(), &snapshot);
            match inner.api.sync_device(&request).await {
                Ok(plan) => {
                    if inner.is_current(epoch) {
                        *inner.plan.lock().unwrap() = Some(plan.clone());
                        inner.emit(EngineEvent::PlanRefreshed(plan));
                    }
                }
                Err(e) => warn!(error = %e, "Device sync failed"),
            }
        }
        Err(e) => warn!(error = %e, "Snapshot capture failed, skipping device sync"),
    }

    // 3. Usage batch, only when non-empty
    match inner.telemetry.usage_stats().await {
        Ok(samples) => {
            let records = normalize_usage(samples, &inner.config.own_package);
            if !records.is_empty() {
                let request = UsageSyncRequest::new(user_id.clone(), &records);
                if let Err(e) = inner.api.sync_usage(&request).await {
                    warn!(error = %e, apps = request.apps_list.len(), "Usage sync failed");
                }
            }
        }
        Err(e) => warn!(error = %e, "Usage stats unavailable"),
    }

    // 4. Lock poll
    fetch_and_apply_lock(inner, epoch).await;
}

async fn fetch_and_apply_lock(inner: &Arc<EngineInner>, epoch: u64) {
    match inner.api.latest_lock_state(&inner.session.user_id).await {
        Ok(poll) => apply_lock_poll(inner, epoch, poll).await,
        Err(e) => warn!(error = %e, "Lock poll failed"),
    }
}

/// Fast poll entry point; shares the reconciler with the full cycle,
/// last write wins by arrival order.
async fn poll_lock(inner: &Arc<EngineInner>, epoch: u64) {
    if !inner.is_current(epoch) {
        return;
    }
    fetch_and_apply_lock(inner, epoch).await;
}

/// Merge a poll result into the lock mirror and propagate any transition.
pub(crate) async fn apply_lock_poll(inner: &Arc<EngineInner>, epoch: u64, poll: LockState) {
    let mut lock = inner.lock.lock().await;
    // Checked under the lock, immediately before the write
    if !inner.is_current(epoch) {
        debug!("Discarding lock poll result for a stopped session");
        return;
    }

    let (next, transition) = reconcile(*lock, poll);
    *lock = next;
    // send_replace publishes even before the first subscriber appears
    inner.lock_tx.send_replace(next);
    drop(lock);

    if let Some(transition) = transition {
        propagate_transition(inner, transition);
    }
}

/// Push a lock transition to the hardware. Fire-and-forget: a failure is
/// logged, the in-memory flag stands, and the next poll resyncs.
fn propagate_transition(inner: &Arc<EngineInner>, transition: LockTransition) {
    inner.emit(match transition {
        LockTransition::Engaged => EngineEvent::LockEngaged,
        LockTransition::Released => EngineEvent::LockReleased,
    });

    let control = inner.lock_control.clone();
    tokio::spawn(async move {
        let result = match transition {
            LockTransition::Engaged => control.activate_lock().await,
            LockTransition::Released => control.deactivate_lock().await,
        };
        if let Err(e) = result {
            warn!(
                error = %e,
                transition = ?transition,
                "Hardware lock propagation failed, next poll will resync"
            );
        }
    });
}

async fn tick_countdown(inner: &Arc<EngineInner>, epoch: u64) {
    let mut lock = inner.lock.lock().await;
    if !inner.is_current(epoch) {
        return;
    }

    let next = tick(*lock);
    if next != *lock {
        *lock = next;
        inner.lock_tx.send_replace(next);
    }
}
