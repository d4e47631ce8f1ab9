//! Remote sync operations as a trait seam

use async_trait::async_trait;
use snapcheck_api::{
    DeviceSyncRequest, LockState, LoginRequest, LoginResponse, PlanInfo, UsageSyncRequest,
};
use snapcheck_util::UserId;

use crate::ClientResult;

/// The backend operations the engine depends on.
///
/// Each call is a single request; retry policy belongs to the caller
/// (in practice: the next scheduled cycle).
#[async_trait]
pub trait SyncApi: Send + Sync {
    /// `POST /auth/login`
    async fn login(&self, request: &LoginRequest) -> ClientResult<LoginResponse>;

    /// `POST /activity/heartbeat`: minimal liveness ping
    async fn heartbeat(&self, user_id: &UserId) -> ClientResult<()>;

    /// `POST /device/sync`: upload one device snapshot
    async fn sync_device(&self, request: &DeviceSyncRequest) -> ClientResult<PlanInfo>;

    /// `POST /apps/sync`: upload one usage batch
    async fn sync_usage(&self, request: &UsageSyncRequest) -> ClientResult<()>;

    /// `GET /device/latest/:userId`: fetch the current lock directive
    async fn latest_lock_state(&self, user_id: &UserId) -> ClientResult<LockState>;
}
