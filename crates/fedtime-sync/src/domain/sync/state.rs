//! Sync-point lifecycle states.
//!
//! ```text
//!   EXISTS ──► REGISTERED ──► ANNOUNCED ──► ACHIEVED
//!      │                         ▲
//!      └─────────────────────────┘   (announced by another federate)
//!
//!   any ──► ERROR
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a synchronization point.
///
/// The discriminants are the persisted codes.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncPntState {
    /// Failed; see the point's error reason.
    Error = 0,
    /// Known locally, not yet registered.
    Exists = 1,
    /// Registration accepted by the federation runtime.
    Registered = 2,
    /// Announced to every participating federate.
    Announced = 3,
    /// Rendezvous complete.
    Achieved = 4,
}

impl SyncPntState {
    /// Persisted numeric code.
    #[inline]
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// State for a persisted numeric code.
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(SyncPntState::Error),
            1 => Some(SyncPntState::Exists),
            2 => Some(SyncPntState::Registered),
            3 => Some(SyncPntState::Announced),
            4 => Some(SyncPntState::Achieved),
            _ => None,
        }
    }

    /// Diagnostic name, e.g. `SYNC_PT_STATE_ANNOUNCED`.
    pub const fn name(self) -> &'static str {
        match self {
            SyncPntState::Error => "SYNC_PT_STATE_ERROR",
            SyncPntState::Exists => "SYNC_PT_STATE_EXISTS",
            SyncPntState::Registered => "SYNC_PT_STATE_REGISTERED",
            SyncPntState::Announced => "SYNC_PT_STATE_ANNOUNCED",
            SyncPntState::Achieved => "SYNC_PT_STATE_ACHIEVED",
        }
    }

    /// True if `self -> next` is an edge of the state machine.
    pub const fn can_transition_to(self, next: SyncPntState) -> bool {
        matches!(
            (self, next),
            (_, SyncPntState::Error)
                | (SyncPntState::Exists, SyncPntState::Registered)
                | (SyncPntState::Exists, SyncPntState::Announced)
                | (SyncPntState::Registered, SyncPntState::Announced)
                | (SyncPntState::Announced, SyncPntState::Achieved)
        )
    }

    /// True for a registration in flight or an announced, unfinished
    /// rendezvous.
    pub const fn is_pending(self) -> bool {
        matches!(self, SyncPntState::Registered | SyncPntState::Announced)
    }
}

impl fmt::Display for SyncPntState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [SyncPntState; 5] = [
        SyncPntState::Error,
        SyncPntState::Exists,
        SyncPntState::Registered,
        SyncPntState::Announced,
        SyncPntState::Achieved,
    ];

    #[test]
    fn test_codes_round_trip() {
        for state in ALL {
            assert_eq!(SyncPntState::from_code(state.code()), Some(state));
        }
        assert_eq!(SyncPntState::from_code(5), None);
        assert_eq!(SyncPntState::from_code(-1), None);
    }

    #[test]
    fn test_error_reachable_from_everywhere() {
        for state in ALL {
            assert!(state.can_transition_to(SyncPntState::Error));
        }
    }

    #[test]
    fn test_achieved_only_through_announced() {
        for state in ALL {
            let allowed = state.can_transition_to(SyncPntState::Achieved);
            assert_eq!(allowed, state == SyncPntState::Announced, "{state}");
        }
    }

    #[test]
    fn test_no_backward_edges() {
        assert!(!SyncPntState::Registered.can_transition_to(SyncPntState::Exists));
        assert!(!SyncPntState::Announced.can_transition_to(SyncPntState::Registered));
        assert!(!SyncPntState::Achieved.can_transition_to(SyncPntState::Announced));
        assert!(!SyncPntState::Error.can_transition_to(SyncPntState::Exists));
    }

    #[test]
    fn test_names() {
        assert_eq!(SyncPntState::Announced.to_string(), "SYNC_PT_STATE_ANNOUNCED");
        assert_eq!(SyncPntState::Error.name(), "SYNC_PT_STATE_ERROR");
    }
}
