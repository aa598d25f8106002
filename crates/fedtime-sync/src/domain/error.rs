//! # Synchronization Error Types
//!
//! One error enum for the whole sync layer. State-machine failures are
//! recorded on the affected point (it moves to ERROR) and also returned to
//! the caller whose call triggered them.

use fedtime_core::TimeError;

use super::rendezvous::RtiError;
use super::sync::SyncPntState;

/// Errors raised by sync points, the rendezvous manager and the executive.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SyncError {
    /// No sync point with this label is known.
    #[error("unknown sync-point label '{0}'")]
    UnknownLabel(String),

    /// The label is already in use locally.
    #[error("sync-point label '{0}' already exists")]
    DuplicateLabel(String),

    /// The label cannot be stored (empty, too long or contains NUL).
    #[error("invalid sync-point label '{label}': {reason}")]
    InvalidLabel {
        /// Offending label
        label: String,
        /// What is wrong with it
        reason: &'static str,
    },

    /// A persisted state code does not name a state.
    #[error("invalid sync-point state code {0}")]
    InvalidStateCode(i32),

    /// No sync-point list with this name exists.
    #[error("unknown sync-point list '{0}'")]
    UnknownList(String),

    /// The requested state change is not an edge of the state machine.
    #[error("sync point '{label}' cannot move from {from} to {to}")]
    InvalidTransition {
        /// Point label
        label: String,
        /// Current state
        from: SyncPntState,
        /// Requested state
        to: SyncPntState,
    },

    /// The point is part of a rendezvous that has not completed; it must be
    /// abandoned before it can be removed.
    #[error("sync point '{label}' is {state} and still pending")]
    PendingRendezvous {
        /// Point label
        label: String,
        /// Current state
        state: SyncPntState,
    },

    /// Two parties disagree about the point (timed vs untimed, or different
    /// freeze times). The local point is now ERROR.
    #[error("conflicting registration of sync point '{label}': {detail}")]
    RegistrationConflict {
        /// Point label
        label: String,
        /// Human-readable description of the mismatch
        detail: String,
    },

    /// The federation runtime refused the registration. The local point is
    /// now ERROR.
    #[error("registration of sync point '{label}' rejected: {reason}")]
    RegistrationRejected {
        /// Point label
        label: String,
        /// Reason reported by the runtime
        reason: String,
    },

    /// The rendezvous was withdrawn or declared invalid. The local point is
    /// now ERROR.
    #[error("rendezvous on sync point '{label}' abandoned: {reason}")]
    RendezvousAbandoned {
        /// Point label
        label: String,
        /// Why it was abandoned
        reason: String,
    },

    /// Snapshot conversion between mismatched kinds. Reported as a
    /// diagnostic; the copy itself still happens.
    #[error("sync point '{label}' converted from {from} into a {to} record; the freeze time was dropped")]
    ConversionMismatch {
        /// Point label
        label: String,
        /// Source kind
        from: &'static str,
        /// Target record kind
        to: &'static str,
    },

    /// The federation runtime is gone. Not recoverable locally.
    #[error("federation runtime lost while handling sync point '{label}': {source}")]
    CollaboratorLost {
        /// Point label
        label: String,
        /// Underlying runtime error
        source: RtiError,
    },

    /// The host granted a logical time earlier than the current one.
    #[error("granted time {granted} precedes current time {current}")]
    NonMonotonicGrant {
        /// Current granted time, in ticks
        current: i64,
        /// Newly granted time, in ticks
        granted: i64,
    },

    /// Logical time arithmetic or conversion failure.
    #[error(transparent)]
    Time(#[from] TimeError),
}

impl SyncError {
    /// True when the federation runtime can no longer be reached.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SyncError::CollaboratorLost { .. })
    }
}

/// Result alias for the sync layer.
pub type SyncResult<T> = Result<T, SyncError>;
