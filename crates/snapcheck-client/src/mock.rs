//! Mock sync API for engine tests

use async_trait::async_trait;
use snapcheck_api::{
    DeviceSyncRequest, LockState, LoginRequest, LoginResponse, PlanInfo, UsageSyncRequest,
    UserInfo,
};
use snapcheck_util::UserId;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use crate::{ClientError, ClientResult, SyncApi};

/// In-memory [`SyncApi`] with per-operation failure toggles and recorded
/// request bodies, so engine tests can assert which calls were attempted
/// and with what payloads.
#[derive(Debug)]
pub struct MockSyncApi {
    pub fail_heartbeat: AtomicBool,
    pub fail_device_sync: AtomicBool,
    pub fail_usage_sync: AtomicBool,
    pub fail_lock_poll: AtomicBool,

    lock_state: Mutex<LockState>,
    plan: Mutex<PlanInfo>,

    pub heartbeats: AtomicU64,
    pub lock_polls: AtomicU64,
    device_syncs: Mutex<Vec<DeviceSyncRequest>>,
    usage_batches: Mutex<Vec<UsageSyncRequest>>,
}

impl MockSyncApi {
    pub fn new() -> Self {
        Self {
            fail_heartbeat: AtomicBool::new(false),
            fail_device_sync: AtomicBool::new(false),
            fail_usage_sync: AtomicBool::new(false),
            fail_lock_poll: AtomicBool::new(false),
            lock_state: Mutex::new(LockState::unlocked()),
            plan: Mutex::new(PlanInfo {
                device_model: "MockPhone".into(),
                plan: "Premium - 12 Months".into(),
                days_left: 214,
            }),
            heartbeats: AtomicU64::new(0),
            lock_polls: AtomicU64::new(0),
            device_syncs: Mutex::new(Vec::new()),
            usage_batches: Mutex::new(Vec::new()),
        }
    }

    /// Set the lock directive returned by the next polls
    pub fn set_lock_state(&self, state: LockState) {
        *self.lock_state.lock().unwrap() = state;
    }

    pub fn device_sync_bodies(&self) -> Vec<DeviceSyncRequest> {
        self.device_syncs.lock().unwrap().clone()
    }

    pub fn usage_sync_bodies(&self) -> Vec<UsageSyncRequest> {
        self.usage_batches.lock().unwrap().clone()
    }

    fn refused(message: &str) -> ClientError {
        ClientError::Api {
            message: message.to_string(),
        }
    }
}

impl Default for MockSyncApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SyncApi for MockSyncApi {
    async fn login(&self, request: &LoginRequest) -> ClientResult<LoginResponse> {
        Ok(LoginResponse {
            success: true,
            message: None,
            token: Some("mock-token".into()),
            user: Some(UserInfo {
                id: "mock-user".into(),
                name: None,
                email: Some(request.email.clone()),
            }),
        })
    }

    async fn heartbeat(&self, _user_id: &UserId) -> ClientResult<()> {
        if self.fail_heartbeat.load(Ordering::SeqCst) {
            return Err(Self::refused("mock heartbeat failure"));
        }
        self.heartbeats.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn sync_device(&self, request: &DeviceSyncRequest) -> ClientResult<PlanInfo> {
        if self.fail_device_sync.load(Ordering::SeqCst) {
            return Err(Self::refused("mock device sync failure"));
        }
        self.device_syncs.lock().unwrap().push(request.clone());
        Ok(self.plan.lock().unwrap().clone())
    }

    async fn sync_usage(&self, request: &UsageSyncRequest) -> ClientResult<()> {
        if self.fail_usage_sync.load(Ordering::SeqCst) {
            return Err(Self::refused("mock usage sync failure"));
        }
        self.usage_batches.lock().unwrap().push(request.clone());
        Ok(())
    }

    async fn latest_lock_state(&self, _user_id: &UserId) -> ClientResult<LockState> {
        if self.fail_lock_poll.load(Ordering::SeqCst) {
            return Err(Self::refused("mock lock poll failure"));
        }
        self.lock_polls.fetch_add(1, Ordering::SeqCst);
        Ok(*self.lock_state.lock().unwrap())
    }
}
