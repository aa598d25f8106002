//! Synchronization Point State Machine
//!
//! # Invariants
//! - States only move forward along
//!   EXISTS → REGISTERED → ANNOUNCED → ACHIEVED; ERROR is reachable from
//!   any state.
//! - ACHIEVED is never reached without passing through ANNOUNCED.
//! - ACHIEVED requires both a local achieve request and the federation's
//!   confirmation that every participant achieved the point.
//! - A rejected transition leaves the point untouched.

use std::fmt;

use tracing::debug;

use crate::domain::error::{SyncError, SyncResult};

use super::loggable::{encode_label, Conversion, LoggableRecord};
use super::state::SyncPntState;

/// An untimed synchronization point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncPnt {
    label: String,
    state: SyncPntState,
    generation: u32,
    achieve_requested: bool,
    federation_synchronized: bool,
    error_reason: Option<String>,
}

impl SyncPnt {
    /// New point in EXISTS.
    pub fn new(label: impl Into<String>) -> Self {
        Self::with_state(label, SyncPntState::Exists)
    }

    /// Point in an arbitrary state, as restored from a checkpoint.
    pub fn with_state(label: impl Into<String>, state: SyncPntState) -> Self {
        Self {
            label: label.into(),
            state,
            generation: 0,
            achieve_requested: false,
            federation_synchronized: false,
            error_reason: None,
        }
    }

    /// Set the generation counter of a re-added label.
    pub fn with_generation(mut self, generation: u32) -> Self {
        self.generation = generation;
        self
    }

    /// Unique label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Current state.
    pub fn state(&self) -> SyncPntState {
        self.state
    }

    /// How many times this label has been re-added after removal.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Reason recorded when the point moved to ERROR.
    pub fn error_reason(&self) -> Option<&str> {
        self.error_reason.as_deref()
    }

    /// True unless the point is in ERROR.
    pub fn is_valid(&self) -> bool {
        self.state != SyncPntState::Error
    }

    /// True in EXISTS.
    pub fn exists(&self) -> bool {
        self.state == SyncPntState::Exists
    }

    /// True in REGISTERED.
    pub fn is_registered(&self) -> bool {
        self.state == SyncPntState::Registered
    }

    /// True in ANNOUNCED.
    pub fn is_announced(&self) -> bool {
        self.state == SyncPntState::Announced
    }

    /// True in ACHIEVED.
    pub fn is_achieved(&self) -> bool {
        self.state == SyncPntState::Achieved
    }

    /// True in ERROR.
    pub fn is_error(&self) -> bool {
        self.state == SyncPntState::Error
    }

    /// True once this federate asked to achieve the point.
    pub fn achieve_requested(&self) -> bool {
        self.achieve_requested
    }

    /// True once the federation confirmed every participant achieved it.
    pub fn is_federation_synchronized(&self) -> bool {
        self.federation_synchronized
    }

    fn transition(&mut self, to: SyncPntState) -> SyncResult<()> {
        if !self.state.can_transition_to(to) {
            return Err(SyncError::InvalidTransition {
                label: self.label.clone(),
                from: self.state,
                to,
            });
        }
        debug!(label = %self.label, from = %self.state, to = %to, "sync point transition");
        self.state = to;
        Ok(())
    }

    /// EXISTS → REGISTERED.
    ///
    /// # Errors
    /// [`SyncError::InvalidTransition`] from any other state.
    pub fn register(&mut self) -> SyncResult<()> {
        self.transition(SyncPntState::Registered)
    }

    /// EXISTS | REGISTERED → ANNOUNCED.
    ///
    /// # Errors
    /// [`SyncError::InvalidTransition`] from any other state.
    pub fn announce(&mut self) -> SyncResult<()> {
        self.transition(SyncPntState::Announced)
    }

    /// Record local readiness. Only meaningful while ANNOUNCED; repeating it
    /// is harmless.
    ///
    /// # Errors
    /// [`SyncError::InvalidTransition`] unless ANNOUNCED.
    pub fn request_achieve(&mut self) -> SyncResult<()> {
        self.require_announced()?;
        self.achieve_requested = true;
        Ok(())
    }

    /// Record the federation's confirmation.
    ///
    /// # Errors
    /// [`SyncError::InvalidTransition`] unless ANNOUNCED.
    pub fn confirm_synchronized(&mut self) -> SyncResult<()> {
        self.require_announced()?;
        self.federation_synchronized = true;
        Ok(())
    }

    fn require_announced(&self) -> SyncResult<()> {
        if self.state == SyncPntState::Announced {
            Ok(())
        } else {
            Err(SyncError::InvalidTransition {
                label: self.label.clone(),
                from: self.state,
                to: SyncPntState::Achieved,
            })
        }
    }

    /// ANNOUNCED → ACHIEVED once requested and confirmed.
    ///
    /// Returns `true` only for the call that performs the transition.
    pub fn try_achieve(&mut self) -> bool {
        if self.state == SyncPntState::Announced && self.achieve_requested && self.federation_synchronized {
            self.state = SyncPntState::Achieved;
            debug!(label = %self.label, "sync point achieved");
            true
        } else {
            false
        }
    }

    /// Any → ERROR, recording why.
    pub fn fail(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        debug!(label = %self.label, from = %self.state, %reason, "sync point failed");
        self.state = SyncPntState::Error;
        self.error_reason = Some(reason);
    }

    /// Copy label and state into `target`.
    ///
    /// Always exact for an untimed source: a timed target keeps its time
    /// at whatever it held (zero for a fresh record).
    pub fn convert(&self, target: &mut LoggableRecord) -> Conversion {
        let label = encode_label(&self.label);
        match target {
            LoggableRecord::Plain(record) => {
                record.label = label;
                record.state = self.state.code();
            }
            LoggableRecord::Timed(record) => {
                record.label = label;
                record.state = self.state.code();
            }
        }
        Conversion::Exact
    }

    pub(crate) fn fmt_with_head(&self, f: &mut fmt::Formatter<'_>, head: &dyn fmt::Display) -> fmt::Result {
        write!(f, "[{head}] -- {}", self.state)?;
        if let (SyncPntState::Error, Some(reason)) = (self.state, &self.error_reason) {
            write!(f, " ({reason})")?;
        }
        Ok(())
    }
}

impl fmt::Display for SyncPnt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_with_head(f, &self.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn announced(label: &str) -> SyncPnt {
        let mut p = SyncPnt::new(label);
        p.register().unwrap();
        p.announce().unwrap();
        p
    }

    #[test]
    fn test_new_point_exists() {
        let p = SyncPnt::new("startup");
        assert!(p.exists());
        assert!(p.is_valid());
        assert_eq!(p.generation(), 0);
        assert_eq!(p.to_string(), "[startup] -- SYNC_PT_STATE_EXISTS");
    }

    #[test]
    fn test_full_lifecycle() {
        let mut p = announced("sim_config");
        assert!(p.is_announced());
        assert!(!p.try_achieve());
        p.request_achieve().unwrap();
        assert!(!p.try_achieve());
        p.confirm_synchronized().unwrap();
        assert!(p.try_achieve());
        assert!(p.is_achieved());
        assert!(!p.try_achieve(), "achieved exactly once");
    }

    #[test]
    fn test_confirmation_before_request() {
        let mut p = announced("a");
        p.confirm_synchronized().unwrap();
        assert!(!p.try_achieve());
        p.request_achieve().unwrap();
        assert!(p.try_achieve());
    }

    #[test]
    fn test_announce_without_local_registration() {
        let mut p = SyncPnt::new("remote");
        p.announce().unwrap();
        assert!(p.is_announced());
    }

    #[test]
    fn test_illegal_transitions_leave_state() {
        let mut p = SyncPnt::new("a");
        assert!(p.request_achieve().is_err());
        assert!(p.confirm_synchronized().is_err());
        assert!(p.exists());

        let mut p = announced("b");
        let err = p.register().unwrap_err();
        assert!(matches!(
            err,
            SyncError::InvalidTransition {
                from: SyncPntState::Announced,
                to: SyncPntState::Registered,
                ..
            }
        ));
        assert!(p.is_announced());
    }

    #[test]
    fn test_no_skip_to_achieved() {
        let mut p = SyncPnt::new("a");
        p.register().unwrap();
        assert!(!p.try_achieve());
        assert!(p.is_registered());
    }

    #[test]
    fn test_fail_from_any_state() {
        let mut p = announced("a");
        p.fail("collaborator withdrew");
        assert!(p.is_error());
        assert_eq!(p.error_reason(), Some("collaborator withdrew"));
        assert_eq!(p.to_string(), "[a] -- SYNC_PT_STATE_ERROR (collaborator withdrew)");
        assert!(p.announce().is_err());
    }

    #[test]
    fn test_convert_into_plain_record() {
        let p = announced("FREEZE");
        let mut record = LoggableRecord::plain();
        assert!(p.convert(&mut record).is_exact());
        assert_eq!(record.label().unwrap(), "FREEZE");
        assert_eq!(record.state().unwrap(), SyncPntState::Announced);
    }

    #[test]
    fn test_convert_into_timed_record_leaves_time_unset() {
        let p = announced("FREEZE");
        let mut record = LoggableRecord::timed();
        let outcome = p.convert(&mut record);
        assert!(outcome.is_exact());
        assert_eq!(record.label().unwrap(), "FREEZE");
        assert_eq!(record.state_code(), SyncPntState::Announced.code());
        assert_eq!(record.time(), Some(0));
    }
}
