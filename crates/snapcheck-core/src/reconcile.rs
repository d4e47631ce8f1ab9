//! Lock state reconciliation
//!
//! Pure functions: the server's poll result and the 1-second local tick
//! both produce the next `LockState` without touching any IO, which is
//! what makes the countdown behavior testable without a network.

use snapcheck_api::LockState;

/// A change of the authoritative lock flag that must be propagated to the
/// hardware lock on the host device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockTransition {
    Engaged,
    Released,
}

/// Merge a successful lock poll into the local mirror.
///
/// The server owns `is_locked` outright. `remaining_seconds` is only
/// overwritten when the poll carries it; otherwise the locally ticking
/// countdown survives until the next authoritative value arrives.
pub fn reconcile(local: LockState, poll: LockState) -> (LockState, Option<LockTransition>) {
    let next = LockState {
        is_locked: poll.is_locked,
        remaining_seconds: poll.remaining_seconds.or(local.remaining_seconds),
    };

    let transition = match (local.is_locked, next.is_locked) {
        (false, true) => Some(LockTransition::Engaged),
        (true, false) => Some(LockTransition::Released),
        _ => None,
    };

    (next, transition)
}

/// Advance the local countdown by one second.
///
/// The countdown is the time until a scheduled lock engages, so it only
/// runs while the device is unlocked. It floors at zero and never
/// increases locally; only a poll can raise it.
pub fn tick(state: LockState) -> LockState {
    if state.is_locked {
        return state;
    }

    match state.remaining_seconds {
        Some(seconds) if seconds > 0 => LockState {
            remaining_seconds: Some(seconds - 1),
            ..state
        },
        _ => state,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unlocked_with(remaining: u64) -> LockState {
        LockState {
            is_locked: false,
            remaining_seconds: Some(remaining),
        }
    }

    #[test]
    fn poll_overwrites_lock_flag() {
        let (next, transition) = reconcile(
            LockState::unlocked(),
            LockState {
                is_locked: true,
                remaining_seconds: None,
            },
        );
        assert!(next.is_locked);
        assert_eq!(transition, Some(LockTransition::Engaged));

        let (next, transition) = reconcile(next, LockState::unlocked());
        assert!(!next.is_locked);
        assert_eq!(transition, Some(LockTransition::Released));
    }

    #[test]
    fn unchanged_flag_yields_no_transition() {
        let (_, transition) = reconcile(LockState::unlocked(), LockState::unlocked());
        assert_eq!(transition, None);

        let locked = LockState {
            is_locked: true,
            remaining_seconds: None,
        };
        let (_, transition) = reconcile(locked, locked);
        assert_eq!(transition, None);
    }

    #[test]
    fn poll_without_remaining_keeps_local_countdown() {
        let (next, _) = reconcile(unlocked_with(25), LockState::unlocked());
        assert_eq!(next.remaining_seconds, Some(25));
    }

    #[test]
    fn poll_with_remaining_overwrites_local_countdown() {
        let (next, _) = reconcile(unlocked_with(3), unlocked_with(120));
        assert_eq!(next.remaining_seconds, Some(120));
    }

    #[test]
    fn countdown_reaches_zero_and_stays() {
        // Scenario: remaining 30, unlocked, no poll for 35 seconds
        let mut state = unlocked_with(30);
        for _ in 0..35 {
            state = tick(state);
        }
        assert_eq!(state.remaining_seconds, Some(0));
        assert!(!state.is_locked);

        // Further ticks never go negative
        state = tick(state);
        assert_eq!(state.remaining_seconds, Some(0));
    }

    #[test]
    fn tick_never_increases() {
        let state = unlocked_with(10);
        let next = tick(state);
        assert!(next.remaining_seconds.unwrap() < state.remaining_seconds.unwrap());
    }

    #[test]
    fn locked_state_halts_countdown() {
        let state = LockState {
            is_locked: true,
            remaining_seconds: Some(10),
        };
        assert_eq!(tick(state), state);
    }

    #[test]
    fn engaging_lock_halts_countdown_in_one_update() {
        let local = unlocked_with(10);
        let (next, transition) = reconcile(
            local,
            LockState {
                is_locked: true,
                remaining_seconds: None,
            },
        );
        assert!(next.is_locked);
        assert_eq!(transition, Some(LockTransition::Engaged));
        // The very next tick no longer decrements
        assert_eq!(tick(next), next);
    }

    #[test]
    fn tick_without_countdown_is_noop() {
        let state = LockState::unlocked();
        assert_eq!(tick(state), state);
    }
}
