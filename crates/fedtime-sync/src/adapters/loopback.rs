//! In-process Federation Runtime
//!
//! Connects several federates' managers inside one process. Outbound calls
//! update a shared federation table and queue callbacks per federate; the
//! host hands them to each manager with [`deliver_callbacks`] between
//! frames, which is how a real runtime's callback pump behaves.
//!
//! ```text
//!   SyncPntManager<LoopbackRti> ─┐
//!   SyncPntManager<LoopbackRti> ─┼─► Rc<RefCell<FederationState>> ─► per-federate queues
//!   SyncPntManager<LoopbackRti> ─┘
//! ```

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

use tracing::{debug, info, warn};

use crate::domain::error::SyncError;
use crate::domain::rendezvous::{
    FederateCallback, FederateHandle, FederateHandleSet, RtiAmbassador, RtiError, SyncFailureReason, SyncPntManager,
};

#[derive(Debug)]
struct PendingPoint {
    members: FederateHandleSet,
    achieved: FederateHandleSet,
}

#[derive(Debug)]
struct FederationState {
    connected: bool,
    save_in_progress: bool,
    next_handle: u64,
    joined: FederateHandleSet,
    points: BTreeMap<String, PendingPoint>,
    queues: BTreeMap<FederateHandle, VecDeque<FederateCallback>>,
}

impl FederationState {
    fn post(&mut self, to: FederateHandle, callback: FederateCallback) {
        if let Some(queue) = self.queues.get_mut(&to) {
            queue.push_back(callback);
        }
    }

    fn guard(&self, handle: FederateHandle) -> Result<(), RtiError> {
        if !self.connected {
            return Err(RtiError::NotConnected);
        }
        if !self.joined.contains(&handle) {
            return Err(RtiError::NotExecutionMember);
        }
        Ok(())
    }

    /// Complete the rendezvous on `label` if every member achieved it.
    fn check_synchronized(&mut self, label: &str) {
        let complete = self
            .points
            .get(label)
            .is_some_and(|p| !p.members.is_empty() && p.members.is_subset(&p.achieved));
        if !complete {
            return;
        }
        if let Some(point) = self.points.remove(label) {
            info!(label, federates = point.members.len(), "🤝 loopback federation synchronized");
            for member in point.members {
                self.post(member, FederateCallback::FederationSynchronized(label.to_owned()));
            }
        }
    }

    fn withdraw(&mut self, handle: FederateHandle, label: &str) {
        let now_empty = match self.points.get_mut(label) {
            Some(point) => {
                point.members.remove(&handle);
                point.achieved.remove(&handle);
                point.members.is_empty()
            }
            None => return,
        };
        if now_empty {
            self.points.remove(label);
        } else {
            self.check_synchronized(label);
        }
    }
}

/// Shared federation table. Cloning shares the same federation.
#[derive(Debug, Clone)]
pub struct LoopbackFederation {
    state: Rc<RefCell<FederationState>>,
}

impl LoopbackFederation {
    /// Connected, empty federation.
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(FederationState {
                connected: true,
                save_in_progress: false,
                next_handle: 1,
                joined: FederateHandleSet::new(),
                points: BTreeMap::new(),
                queues: BTreeMap::new(),
            })),
        }
    }

    /// Join a new federate.
    pub fn join(&self) -> LoopbackRti {
        let mut state = self.state.borrow_mut();
        let handle = FederateHandle::new(state.next_handle);
        state.next_handle += 1;
        state.joined.insert(handle);
        state.queues.insert(handle, VecDeque::new());
        info!(federate = %handle, "federate joined loopback federation");
        LoopbackRti {
            handle,
            federation: Rc::clone(&self.state),
        }
    }

    /// Drop the connection; every further call fails with
    /// [`RtiError::NotConnected`].
    pub fn disconnect(&self) {
        self.state.borrow_mut().connected = false;
        warn!("loopback federation disconnected");
    }

    /// Simulate a federation save: achieves fail with
    /// [`RtiError::SaveInProgress`] while set.
    pub fn set_save_in_progress(&self, in_progress: bool) {
        self.state.borrow_mut().save_in_progress = in_progress;
    }

    /// Currently joined federates.
    pub fn joined(&self) -> FederateHandleSet {
        self.state.borrow().joined.clone()
    }

    /// True while a rendezvous on `label` is open.
    pub fn is_pending(&self, label: &str) -> bool {
        self.state.borrow().points.contains_key(label)
    }
}

impl Default for LoopbackFederation {
    fn default() -> Self {
        Self::new()
    }
}

/// One federate's connection to a [`LoopbackFederation`].
#[derive(Debug)]
pub struct LoopbackRti {
    handle: FederateHandle,
    federation: Rc<RefCell<FederationState>>,
}

impl LoopbackRti {
    /// This federate's handle.
    pub fn handle(&self) -> FederateHandle {
        self.handle
    }

    /// Number of callbacks waiting for delivery.
    pub fn pending_callbacks(&self) -> usize {
        self.federation
            .borrow()
            .queues
            .get(&self.handle)
            .map_or(0, VecDeque::len)
    }

    /// Drain this federate's callback queue.
    pub fn take_callbacks(&mut self) -> Vec<FederateCallback> {
        self.federation
            .borrow_mut()
            .queues
            .get_mut(&self.handle)
            .map(|queue| queue.drain(..).collect())
            .unwrap_or_default()
    }

    /// Leave the federation, withdrawing from every open rendezvous.
    pub fn resign(&mut self) {
        let mut state = self.federation.borrow_mut();
        state.joined.remove(&self.handle);
        state.queues.remove(&self.handle);
        let labels: Vec<String> = state.points.keys().cloned().collect();
        for label in labels {
            state.withdraw(self.handle, &label);
        }
        info!(federate = %self.handle, "federate resigned from loopback federation");
    }
}

impl RtiAmbassador for LoopbackRti {
    fn register_sync_point(
        &mut self,
        label: &str,
        tag: &[u8],
        federates: Option<&FederateHandleSet>,
    ) -> Result<(), RtiError> {
        let mut state = self.federation.borrow_mut();
        state.guard(self.handle)?;

        if state.points.contains_key(label) {
            state.post(
                self.handle,
                FederateCallback::RegistrationFailed(label.to_owned(), SyncFailureReason::LabelNotUnique),
            );
            return Ok(());
        }
        let members = match federates {
            Some(set) if !set.is_subset(&state.joined) => {
                state.post(
                    self.handle,
                    FederateCallback::RegistrationFailed(label.to_owned(), SyncFailureReason::SetMemberNotJoined),
                );
                return Ok(());
            }
            Some(set) => set.clone(),
            None => state.joined.clone(),
        };

        debug!(label, federate = %self.handle, members = members.len(), "loopback registration");
        state.post(self.handle, FederateCallback::RegistrationSucceeded(label.to_owned()));
        for &member in &members {
            state.post(
                member,
                FederateCallback::Announced {
                    label: label.to_owned(),
                    tag: tag.to_vec(),
                },
            );
        }
        state.points.insert(
            label.to_owned(),
            PendingPoint {
                members,
                achieved: FederateHandleSet::new(),
            },
        );
        Ok(())
    }

    fn achieve_sync_point(&mut self, label: &str) -> Result<(), RtiError> {
        let mut state = self.federation.borrow_mut();
        state.guard(self.handle)?;
        if state.save_in_progress {
            return Err(RtiError::SaveInProgress);
        }

        let handle = self.handle;
        match state.points.get_mut(label) {
            Some(point) if point.members.contains(&handle) => {
                point.achieved.insert(handle);
            }
            _ => return Err(RtiError::LabelNotAnnounced(label.to_owned())),
        }
        debug!(label, federate = %handle, "loopback achieve");
        state.check_synchronized(label);
        Ok(())
    }

    fn abandon_sync_point(&mut self, label: &str, reason: &str) -> Result<(), RtiError> {
        let mut state = self.federation.borrow_mut();
        state.guard(self.handle)?;
        debug!(label, federate = %self.handle, reason, "loopback withdraw");
        state.withdraw(self.handle, label);
        Ok(())
    }
}

/// Deliver every queued callback to `manager`, including callbacks queued
/// while delivering. Returns the errors the callbacks produced; the
/// affected points already reflect them.
pub fn deliver_callbacks(manager: &mut SyncPntManager<LoopbackRti>) -> Vec<SyncError> {
    let mut errors = Vec::new();
    loop {
        let batch = manager.rti_mut().take_callbacks();
        if batch.is_empty() {
            return errors;
        }
        for callback in batch {
            let label = callback.label().to_owned();
            if let Err(e) = callback.dispatch(manager) {
                warn!(label = %label, error = %e, "callback failed");
                errors.push(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sync::SyncPntState;

    fn federates(n: usize) -> (LoopbackFederation, Vec<SyncPntManager<LoopbackRti>>) {
        let federation = LoopbackFederation::new();
        let managers = (0..n).map(|_| SyncPntManager::new(federation.join())).collect();
        (federation, managers)
    }

    fn pump(managers: &mut [SyncPntManager<LoopbackRti>]) {
        for manager in managers.iter_mut() {
            assert!(deliver_callbacks(manager).is_empty());
        }
    }

    #[test]
    fn test_plain_rendezvous_across_three() {
        let (federation, mut managers) = federates(3);
        managers[0].add_sync_point("sim_config", "init").unwrap();
        managers[0].register_sync_point("sim_config").unwrap();
        pump(&mut managers);

        for manager in &managers {
            assert_eq!(manager.state_of("sim_config"), Some(SyncPntState::Announced));
        }
        assert_eq!(managers[1].list_of("sim_config"), Some(crate::domain::rendezvous::UNKNOWN_SYNC_PNT_LIST));

        managers[0].achieve_sync_point("sim_config").unwrap();
        managers[1].achieve_sync_point("sim_config").unwrap();
        pump(&mut managers);
        assert!(!managers[0].is_sync_point_achieved("sim_config"));
        assert!(federation.is_pending("sim_config"));

        managers[2].achieve_sync_point("sim_config").unwrap();
        pump(&mut managers);
        for manager in &managers {
            assert!(manager.is_sync_point_achieved("sim_config"));
        }
        assert!(!federation.is_pending("sim_config"));
    }

    #[test]
    fn test_second_registration_is_benign() {
        let (_federation, mut managers) = federates(2);
        for manager in managers.iter_mut() {
            manager.add_sync_point("startup", "init").unwrap();
            manager.register_sync_point("startup").unwrap();
        }
        pump(&mut managers);
        for manager in &managers {
            assert_eq!(manager.state_of("startup"), Some(SyncPntState::Announced));
        }
    }

    #[test]
    fn test_restricted_registration() {
        let (federation, mut managers) = federates(3);
        let set: FederateHandleSet = [managers[0].rti().handle(), managers[1].rti().handle()]
            .into_iter()
            .collect();
        managers[0].add_sync_point("pair", "init").unwrap();
        managers[0].register_sync_point_with("pair", &set).unwrap();
        pump(&mut managers);
        assert!(managers[1].is_sync_point_announced("pair"));
        assert!(!managers[2].contains_sync_point("pair"));

        managers[0].achieve_sync_point("pair").unwrap();
        managers[1].achieve_sync_point("pair").unwrap();
        pump(&mut managers);
        assert!(managers[0].is_sync_point_achieved("pair"));
        assert!(!federation.is_pending("pair"));
    }

    #[test]
    fn test_set_member_not_joined() {
        let (_federation, mut managers) = federates(1);
        let set: FederateHandleSet = [FederateHandle::new(99)].into_iter().collect();
        managers[0].add_sync_point("x", "init").unwrap();
        managers[0].register_sync_point_with("x", &set).unwrap();
        let errors = deliver_callbacks(&mut managers[0]);
        assert_eq!(errors.len(), 1);
        assert_eq!(managers[0].state_of("x"), Some(SyncPntState::Error));
    }

    #[test]
    fn test_withdraw_completes_for_remaining() {
        let (federation, mut managers) = federates(2);
        managers[0].add_sync_point("a", "init").unwrap();
        managers[0].register_sync_point("a").unwrap();
        pump(&mut managers);

        managers[0].achieve_sync_point("a").unwrap();
        managers[1].abandon_sync_point("a", "leaving").unwrap();
        pump(&mut managers);
        assert!(managers[0].is_sync_point_achieved("a"));
        assert_eq!(managers[1].state_of("a"), Some(SyncPntState::Error));
        assert!(!federation.is_pending("a"));
    }

    #[test]
    fn test_resign_completes_for_remaining() {
        let (_federation, mut managers) = federates(2);
        managers[0].add_sync_point("a", "init").unwrap();
        managers[0].register_sync_point("a").unwrap();
        pump(&mut managers);
        managers[0].achieve_sync_point("a").unwrap();
        managers[1].rti_mut().resign();
        pump(&mut managers[..1]);
        assert!(managers[0].is_sync_point_achieved("a"));
        assert_eq!(
            managers[1].register_sync_point("a"),
            Ok(false),
            "nothing to register for an announced point"
        );
    }

    #[test]
    fn test_disconnected_is_fatal() {
        let (federation, mut managers) = federates(1);
        managers[0].add_sync_point("a", "init").unwrap();
        federation.disconnect();
        let err = managers[0].register_sync_point("a").unwrap_err();
        assert!(matches!(
            err,
            SyncError::CollaboratorLost {
                source: RtiError::NotConnected,
                ..
            }
        ));
        assert_eq!(managers[0].state_of("a"), Some(SyncPntState::Exists));
    }

    #[test]
    fn test_save_in_progress_defers_achieve() {
        let (federation, mut managers) = federates(1);
        managers[0].add_sync_point("a", "init").unwrap();
        managers[0].register_sync_point("a").unwrap();
        pump(&mut managers);

        federation.set_save_in_progress(true);
        assert!(!managers[0].achieve_sync_point("a").unwrap());
        federation.set_save_in_progress(false);
        assert!(managers[0].achieve_sync_point("a").unwrap());
        pump(&mut managers);
        assert!(managers[0].is_sync_point_achieved("a"));
    }
}
