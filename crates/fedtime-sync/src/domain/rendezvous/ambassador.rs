//! Federation Runtime Seam
//!
//! Outbound calls go through [`RtiAmbassador`]; inbound notifications are
//! [`FederateCallback`] values queued by the runtime and handed to the
//! manager by the host between calls. The manager owns its ambassador and
//! is only mutated through `&mut self`, so an outbound call can never
//! re-enter it.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::error::SyncResult;

use super::manager::SyncPntManager;

/// Opaque federate identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FederateHandle(u64);

impl FederateHandle {
    /// Wrap a raw id.
    pub const fn new(id: u64) -> Self {
        FederateHandle(id)
    }

    /// Raw id.
    pub const fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for FederateHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "F{}", self.0)
    }
}

/// Federates a registration is restricted to.
pub type FederateHandleSet = BTreeSet<FederateHandle>;

/// Errors returned by the federation runtime.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RtiError {
    /// No connection to the runtime.
    #[error("not connected to the federation runtime")]
    NotConnected,

    /// This federate has not joined (or has resigned from) the execution.
    #[error("federate is not an execution member")]
    NotExecutionMember,

    /// Achieve on a label the runtime never announced to this federate.
    #[error("synchronization point '{0}' was not announced")]
    LabelNotAnnounced(String),

    /// A federation save is running; retry later.
    #[error("federation save in progress")]
    SaveInProgress,

    /// A federation restore is running; retry later.
    #[error("federation restore in progress")]
    RestoreInProgress,

    /// Anything else the runtime reports.
    #[error("federation runtime error: {0}")]
    Internal(String),
}

impl RtiError {
    /// The runtime is unreachable; nothing local can recover.
    pub fn is_fatal(&self) -> bool {
        matches!(self, RtiError::NotConnected | RtiError::NotExecutionMember)
    }

    /// The call may succeed if repeated later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RtiError::SaveInProgress | RtiError::RestoreInProgress)
    }
}

/// Why the runtime refused a registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncFailureReason {
    /// Another federate already registered the label. Benign: the
    /// announcement follows.
    LabelNotUnique,
    /// A federate in the restricting handle set has not joined.
    SetMemberNotJoined,
    /// Other runtime-specific reason.
    Other(String),
}

impl fmt::Display for SyncFailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncFailureReason::LabelNotUnique => f.write_str("label not unique"),
            SyncFailureReason::SetMemberNotJoined => f.write_str("synchronization set member not joined"),
            SyncFailureReason::Other(reason) => f.write_str(reason),
        }
    }
}

/// Outbound calls to the federation runtime.
pub trait RtiAmbassador {
    /// Register a synchronization point. `tag` is empty for untimed points
    /// and the 8-byte encoded freeze time for timed ones. `federates`
    /// restricts the rendezvous; `None` means every joined federate.
    ///
    /// # Errors
    /// Runtime failure; see [`RtiError`].
    fn register_sync_point(&mut self, label: &str, tag: &[u8], federates: Option<&FederateHandleSet>)
        -> Result<(), RtiError>;

    /// Tell the runtime this federate reached the point.
    ///
    /// # Errors
    /// Runtime failure; see [`RtiError`].
    fn achieve_sync_point(&mut self, label: &str) -> Result<(), RtiError>;

    /// Withdraw this federate from a pending rendezvous.
    ///
    /// # Errors
    /// Runtime failure; see [`RtiError`].
    fn abandon_sync_point(&mut self, label: &str, reason: &str) -> Result<(), RtiError> {
        let _ = (label, reason);
        Ok(())
    }
}

impl<R: RtiAmbassador + ?Sized> RtiAmbassador for Box<R> {
    fn register_sync_point(
        &mut self,
        label: &str,
        tag: &[u8],
        federates: Option<&FederateHandleSet>,
    ) -> Result<(), RtiError> {
        (**self).register_sync_point(label, tag, federates)
    }

    fn achieve_sync_point(&mut self, label: &str) -> Result<(), RtiError> {
        (**self).achieve_sync_point(label)
    }

    fn abandon_sync_point(&mut self, label: &str, reason: &str) -> Result<(), RtiError> {
        (**self).abandon_sync_point(label, reason)
    }
}

/// Inbound notification from the federation runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FederateCallback {
    /// The registration was accepted.
    RegistrationSucceeded(String),
    /// The registration was refused.
    RegistrationFailed(String, SyncFailureReason),
    /// The point was announced, with the registering federate's tag.
    Announced {
        /// Point label
        label: String,
        /// User-supplied tag
        tag: Vec<u8>,
    },
    /// Every participant achieved the point.
    FederationSynchronized(String),
}

impl FederateCallback {
    /// Label the callback is about.
    pub fn label(&self) -> &str {
        match self {
            FederateCallback::RegistrationSucceeded(label)
            | FederateCallback::RegistrationFailed(label, _)
            | FederateCallback::Announced { label, .. }
            | FederateCallback::FederationSynchronized(label) => label,
        }
    }

    /// Hand the callback to the manager.
    ///
    /// # Errors
    /// Whatever the corresponding `on_*` manager method returns.
    pub fn dispatch<R: RtiAmbassador>(self, manager: &mut SyncPntManager<R>) -> SyncResult<()> {
        match self {
            FederateCallback::RegistrationSucceeded(label) => manager.on_registration_succeeded(&label),
            FederateCallback::RegistrationFailed(label, reason) => manager.on_registration_failed(&label, reason),
            FederateCallback::Announced { label, tag } => manager.on_announced(&label, &tag),
            FederateCallback::FederationSynchronized(label) => manager.on_federation_synchronized(&label).map(|_| ()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classes() {
        assert!(RtiError::NotConnected.is_fatal());
        assert!(RtiError::NotExecutionMember.is_fatal());
        assert!(!RtiError::SaveInProgress.is_fatal());
        assert!(RtiError::RestoreInProgress.is_retryable());
        assert!(!RtiError::Internal("x".into()).is_retryable());
    }

    #[test]
    fn test_handle_display_and_order() {
        let set: FederateHandleSet = [FederateHandle::new(3), FederateHandle::new(1)].into_iter().collect();
        let ids: Vec<String> = set.iter().map(ToString::to_string).collect();
        assert_eq!(ids, ["F1", "F3"]);
    }

    #[test]
    fn test_callback_label() {
        let cb = FederateCallback::Announced {
            label: "FREEZE".into(),
            tag: vec![],
        };
        assert_eq!(cb.label(), "FREEZE");
        assert_eq!(SyncFailureReason::LabelNotUnique.to_string(), "label not unique");
    }
}
