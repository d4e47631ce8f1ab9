//! Events emitted by the engine for the presentation layer

use snapcheck_api::PlanInfo;
use snapcheck_util::SessionId;

use crate::PermissionKind;

/// Observable engine state changes.
///
/// The presentation layer renders these; the engine never waits on the
/// receiver, so a slow or absent UI cannot stall monitoring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    MonitoringStarted { session_id: SessionId },

    MonitoringStopped { session_id: SessionId },

    /// The authoritative lock flag flipped to locked
    LockEngaged,

    /// The authoritative lock flag flipped to unlocked
    LockReleased,

    /// A device permission is missing; show the prompt with a settings link
    PermissionPromptRequired(PermissionKind),

    /// A device sync returned fresh subscription details
    PlanRefreshed(PlanInfo),
}
