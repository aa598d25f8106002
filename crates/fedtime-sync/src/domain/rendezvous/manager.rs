//! Synchronization Point Manager
//!
//! Owns every sync point this federate knows about, grouped into named
//! lists, and drives them through the rendezvous protocol:
//!
//! ```text
//!   add ──► register ──(runtime)──► on_announced ──► achieve ──(runtime)──►
//!   on_federation_synchronized ──► [freeze time reached] ──► ACHIEVED
//! ```
//!
//! # Invariants
//! - Labels are unique across all lists.
//! - A point is announced at most once; duplicate announcements are ignored.
//! - ACHIEVED requires local readiness, federation confirmation and, for
//!   timed points, the current logical time at or past the freeze time.
//! - Every transition into ACHIEVED is reported exactly once by
//!   [`update`](SyncPntManager::update).
//! - Pending rendezvous are never dropped silently: removal requires a
//!   settled state, withdrawal goes through
//!   [`abandon_sync_point`](SyncPntManager::abandon_sync_point).
//!
//! # Concurrency
//! Single-threaded. The manager owns its [`RtiAmbassador`] and is mutated
//! only through `&mut self`; inbound callbacks are delivered by the host
//! between calls.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use fedtime_core::{BaseTime, Int64Time};
use tracing::{debug, error, info, warn};

use crate::domain::error::{SyncError, SyncResult};
use crate::domain::sync::{validate_label, SyncPnt, SyncPntState, SyncPoint, TimedSyncPnt};

use super::ambassador::{FederateHandleSet, RtiAmbassador, SyncFailureReason};
use super::checkpoint::{ListCheckpoint, SyncPntCheckpoint};

/// List that receives points first learned from a remote announcement.
pub const UNKNOWN_SYNC_PNT_LIST: &str = "UNKNOWN_SYNC_PNT_LIST";

#[derive(Debug)]
struct Entry {
    list: String,
    point: SyncPoint,
}

/// Per-state counts for one list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListStatus {
    /// Points in the list
    pub total: usize,
    /// Points in EXISTS
    pub exists: usize,
    /// Points in REGISTERED
    pub registered: usize,
    /// Points in ANNOUNCED
    pub announced: usize,
    /// Points in ACHIEVED
    pub achieved: usize,
    /// Points in ERROR
    pub errored: usize,
}

impl ListStatus {
    fn count(&mut self, state: SyncPntState) {
        self.total += 1;
        match state {
            SyncPntState::Exists => self.exists += 1,
            SyncPntState::Registered => self.registered += 1,
            SyncPntState::Announced => self.announced += 1,
            SyncPntState::Achieved => self.achieved += 1,
            SyncPntState::Error => self.errored += 1,
        }
    }

    /// Every point is at least ANNOUNCED.
    pub fn all_announced(&self) -> bool {
        self.total > 0 && self.announced + self.achieved == self.total
    }

    /// Every point is ACHIEVED.
    pub fn all_achieved(&self) -> bool {
        self.total > 0 && self.achieved == self.total
    }

    /// At least one point is in ERROR.
    pub fn has_errors(&self) -> bool {
        self.errored > 0
    }
}

fn describe(time: Option<Int64Time>, base: BaseTime) -> String {
    match time {
        None => "untimed point".to_owned(),
        Some(t) => format!("freeze time {}", t.display_in(base)),
    }
}

/// Rendezvous coordinator for one federate.
pub struct SyncPntManager<R: RtiAmbassador> {
    rti: R,
    points: BTreeMap<String, Entry>,
    lists: BTreeMap<String, Vec<String>>,
    generations: BTreeMap<String, u32>,
    newly_achieved: Vec<String>,
    now: Int64Time,
    base_time: BaseTime,
}

impl<R: RtiAmbassador> SyncPntManager<R> {
    /// Empty manager talking to `rti`, rendering times at the default base.
    pub fn new(rti: R) -> Self {
        Self::with_base_time(rti, BaseTime::default())
    }

    /// Empty manager whose freeze times are ticks of `base_time`.
    pub fn with_base_time(rti: R, base_time: BaseTime) -> Self {
        Self {
            rti,
            points: BTreeMap::new(),
            lists: BTreeMap::new(),
            generations: BTreeMap::new(),
            newly_achieved: Vec::new(),
            now: Int64Time::ZERO,
            base_time,
        }
    }

    /// Tick resolution of every freeze time this manager holds.
    pub fn base_time(&self) -> BaseTime {
        self.base_time
    }

    /// Federation runtime.
    pub fn rti(&self) -> &R {
        &self.rti
    }

    /// Federation runtime, mutably (e.g. to drain queued callbacks).
    pub fn rti_mut(&mut self) -> &mut R {
        &mut self.rti
    }

    /// Logical time of the last [`update`](Self::update).
    pub fn now(&self) -> Int64Time {
        self.now
    }

    /// Number of sync points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True with no sync points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// `(list name, point)` pairs in list order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SyncPoint)> {
        self.lists.iter().flat_map(move |(name, labels)| {
            labels
                .iter()
                .filter_map(move |label| self.points.get(label))
                .map(move |entry| (name.as_str(), &entry.point))
        })
    }

    // ========================================================================
    // Lists
    // ========================================================================

    /// Create an empty list. Returns `false` if it already exists.
    pub fn add_sync_point_list(&mut self, name: &str) -> bool {
        if self.lists.contains_key(name) {
            return false;
        }
        self.lists.insert(name.to_owned(), Vec::new());
        debug!(list = name, "sync point list added");
        true
    }

    /// True if a list with this name exists.
    pub fn contains_sync_point_list_name(&self, name: &str) -> bool {
        self.lists.contains_key(name)
    }

    /// Points of a list in insertion order; empty for unknown lists.
    pub fn get_sync_point_list(&self, name: &str) -> Vec<&SyncPoint> {
        self.lists
            .get(name)
            .map(|labels| {
                labels
                    .iter()
                    .filter_map(|label| self.points.get(label))
                    .map(|entry| &entry.point)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Names of all lists.
    pub fn list_names(&self) -> impl Iterator<Item = &str> {
        self.lists.keys().map(String::as_str)
    }

    /// Remove a list with all of its points.
    ///
    /// # Errors
    /// - [`SyncError::UnknownList`] if the list does not exist.
    /// - [`SyncError::PendingRendezvous`] if any point is REGISTERED or
    ///   ANNOUNCED; nothing is removed.
    pub fn remove_sync_point_list(&mut self, name: &str) -> SyncResult<Vec<SyncPoint>> {
        let labels = self
            .lists
            .get(name)
            .ok_or_else(|| SyncError::UnknownList(name.to_owned()))?;
        if let Some(pending) = labels
            .iter()
            .filter_map(|label| self.points.get(label))
            .find(|entry| entry.point.state().is_pending())
        {
            return Err(SyncError::PendingRendezvous {
                label: pending.point.label().to_owned(),
                state: pending.point.state(),
            });
        }

        let labels = self.lists.remove(name).unwrap_or_default();
        debug!(list = name, points = labels.len(), "sync point list removed");
        Ok(labels
            .into_iter()
            .filter_map(|label| self.points.remove(&label))
            .map(|entry| entry.point)
            .collect())
    }

    /// Per-state counts for a list; `None` for unknown lists.
    ///
    /// Non-blocking: the host polls this between cycles instead of spinning
    /// on the runtime.
    pub fn list_status(&self, name: &str) -> Option<ListStatus> {
        let labels = self.lists.get(name)?;
        let mut status = ListStatus::default();
        for entry in labels.iter().filter_map(|label| self.points.get(label)) {
            status.count(entry.point.state());
        }
        Some(status)
    }

    // ========================================================================
    // Points
    // ========================================================================

    /// Add an untimed point to `list`, creating the list if needed.
    ///
    /// # Errors
    /// - [`SyncError::InvalidLabel`] if the label cannot be stored.
    /// - [`SyncError::DuplicateLabel`] if an identical point exists.
    /// - [`SyncError::RegistrationConflict`] if a point of the other kind
    ///   exists; that point moves to ERROR.
    pub fn add_sync_point(&mut self, label: &str, list: &str) -> SyncResult<()> {
        self.insert_local(label, list, None)
    }

    /// Add a timed point to `list`, creating the list if needed.
    ///
    /// # Errors
    /// Same as [`add_sync_point`](Self::add_sync_point); a different freeze
    /// time also counts as a conflict.
    pub fn add_timed_sync_point(&mut self, label: &str, list: &str, time: Int64Time) -> SyncResult<()> {
        self.insert_local(label, list, Some(time))
    }

    fn insert_local(&mut self, label: &str, list: &str, time: Option<Int64Time>) -> SyncResult<()> {
        validate_label(label)?;
        if let Some(entry) = self.points.get(label) {
            let existing = entry.point.freeze_time();
            if existing == time {
                return Err(SyncError::DuplicateLabel(label.to_owned()));
            }
            let detail = format!(
                "existing {} re-added as {}",
                describe(existing, self.base_time),
                describe(time, self.base_time)
            );
            error!(label, %detail, "conflicting sync point definition");
            self.fail_point(label, &detail, true)?;
            return Err(SyncError::RegistrationConflict {
                label: label.to_owned(),
                detail,
            });
        }

        let point = self.new_point(label, time);
        debug!(label, list, kind = point.kind_name(), "sync point added");
        self.insert_entry(list, point);
        Ok(())
    }

    fn new_point(&mut self, label: &str, time: Option<Int64Time>) -> SyncPoint {
        let generation = match self.generations.get_mut(label) {
            Some(generation) => {
                *generation = generation.saturating_add(1);
                *generation
            }
            None => {
                self.generations.insert(label.to_owned(), 0);
                0
            }
        };
        let base = SyncPnt::new(label).with_generation(generation);
        match time {
            None => SyncPoint::Plain(base),
            Some(time) => SyncPoint::Timed(TimedSyncPnt::from_point(base, time).with_base_time(self.base_time)),
        }
    }

    fn insert_entry(&mut self, list: &str, point: SyncPoint) {
        let label = point.label().to_owned();
        self.lists.entry(list.to_owned()).or_default().push(label.clone());
        self.points.insert(
            label,
            Entry {
                list: list.to_owned(),
                point,
            },
        );
    }

    /// True if a point with this label exists.
    pub fn contains_sync_point(&self, label: &str) -> bool {
        self.points.contains_key(label)
    }

    /// Point by label.
    pub fn get_sync_point(&self, label: &str) -> Option<&SyncPoint> {
        self.points.get(label).map(|entry| &entry.point)
    }

    /// Name of the list holding `label`.
    pub fn list_of(&self, label: &str) -> Option<&str> {
        self.points.get(label).map(|entry| entry.list.as_str())
    }

    /// State of `label`.
    pub fn state_of(&self, label: &str) -> Option<SyncPntState> {
        self.points.get(label).map(|entry| entry.point.state())
    }

    /// Remove a settled point (EXISTS, ACHIEVED or ERROR).
    ///
    /// # Errors
    /// - [`SyncError::UnknownLabel`] if the label does not exist.
    /// - [`SyncError::PendingRendezvous`] if the point is REGISTERED or
    ///   ANNOUNCED.
    pub fn remove_sync_point(&mut self, label: &str) -> SyncResult<SyncPoint> {
        let state = self
            .state_of(label)
            .ok_or_else(|| SyncError::UnknownLabel(label.to_owned()))?;
        if state.is_pending() {
            return Err(SyncError::PendingRendezvous {
                label: label.to_owned(),
                state,
            });
        }
        let entry = self
            .points
            .remove(label)
            .ok_or_else(|| SyncError::UnknownLabel(label.to_owned()))?;
        if let Some(labels) = self.lists.get_mut(&entry.list) {
            labels.retain(|l| l != label);
        }
        debug!(label, list = %entry.list, "sync point removed");
        Ok(entry.point)
    }

    /// Remove `label` if it is ACHIEVED; otherwise leave it in place.
    pub fn clear_sync_point(&mut self, label: &str) -> Option<SyncPoint> {
        if self.state_of(label) != Some(SyncPntState::Achieved) {
            return None;
        }
        self.remove_sync_point(label).ok()
    }

    /// Point has been registered with the federation (REGISTERED or later).
    pub fn is_sync_point_registered(&self, label: &str) -> bool {
        matches!(
            self.state_of(label),
            Some(SyncPntState::Registered | SyncPntState::Announced | SyncPntState::Achieved)
        )
    }

    /// Point has been announced (ANNOUNCED or ACHIEVED).
    pub fn is_sync_point_announced(&self, label: &str) -> bool {
        matches!(
            self.state_of(label),
            Some(SyncPntState::Announced | SyncPntState::Achieved)
        )
    }

    /// Point is ACHIEVED.
    pub fn is_sync_point_achieved(&self, label: &str) -> bool {
        self.state_of(label) == Some(SyncPntState::Achieved)
    }

    /// Move `label` to ERROR. Withdraws from the runtime when the
    /// rendezvous was pending and `withdraw` is set.
    fn fail_point(&mut self, label: &str, reason: &str, withdraw: bool) -> SyncResult<()> {
        let entry = self
            .points
            .get_mut(label)
            .ok_or_else(|| SyncError::UnknownLabel(label.to_owned()))?;
        let pending = entry.point.state().is_pending();
        entry.point.fail(reason);
        if pending && withdraw {
            self.withdraw(label, reason)
        } else {
            Ok(())
        }
    }

    /// Tell the runtime this federate leaves the rendezvous on `label`.
    fn withdraw(&mut self, label: &str, reason: &str) -> SyncResult<()> {
        match self.rti.abandon_sync_point(label, reason) {
            Ok(()) => Ok(()),
            Err(source) if source.is_fatal() => Err(SyncError::CollaboratorLost {
                label: label.to_owned(),
                source,
            }),
            Err(e) => {
                warn!(label, error = %e, "runtime refused to abandon sync point");
                Ok(())
            }
        }
    }

    // ========================================================================
    // Registration
    // ========================================================================

    /// Register `label` with every joined federate. Returns `false` if the
    /// point is not in EXISTS (nothing to do).
    ///
    /// # Errors
    /// - [`SyncError::UnknownLabel`] if the label does not exist.
    /// - [`SyncError::RegistrationRejected`] if the runtime refuses; the
    ///   point moves to ERROR.
    /// - [`SyncError::CollaboratorLost`] if the runtime is gone; the point
    ///   is left untouched.
    pub fn register_sync_point(&mut self, label: &str) -> SyncResult<bool> {
        self.register_inner(label, None)
    }

    /// Register `label` with a restricted set of federates.
    ///
    /// # Errors
    /// Same as [`register_sync_point`](Self::register_sync_point).
    pub fn register_sync_point_with(&mut self, label: &str, federates: &FederateHandleSet) -> SyncResult<bool> {
        self.register_inner(label, Some(federates))
    }

    fn register_inner(&mut self, label: &str, federates: Option<&FederateHandleSet>) -> SyncResult<bool> {
        let entry = self
            .points
            .get_mut(label)
            .ok_or_else(|| SyncError::UnknownLabel(label.to_owned()))?;
        if !entry.point.base().exists() {
            debug!(label, state = %entry.point.state(), "registration skipped");
            return Ok(false);
        }

        let tag = entry
            .point
            .freeze_time()
            .map(|time| time.to_tag().to_vec())
            .unwrap_or_default();
        match self.rti.register_sync_point(label, &tag, federates) {
            Ok(()) => {
                entry.point.register()?;
                info!(label, kind = entry.point.kind_name(), "📍 sync point registered");
                Ok(true)
            }
            Err(source) if source.is_fatal() => Err(SyncError::CollaboratorLost {
                label: label.to_owned(),
                source,
            }),
            Err(e) => {
                let reason = e.to_string();
                entry.point.fail(reason.as_str());
                error!(label, %reason, "sync point registration rejected");
                Err(SyncError::RegistrationRejected {
                    label: label.to_owned(),
                    reason,
                })
            }
        }
    }

    /// Register every EXISTS point of `list`. Returns `true` if at least
    /// one registration was sent. Rejected points are left in ERROR and
    /// the remaining points are still registered.
    ///
    /// # Errors
    /// - [`SyncError::UnknownList`] if the list does not exist.
    /// - [`SyncError::CollaboratorLost`] as soon as the runtime is gone.
    pub fn register_all_sync_points(&mut self, list: &str) -> SyncResult<bool> {
        let labels = self
            .lists
            .get(list)
            .ok_or_else(|| SyncError::UnknownList(list.to_owned()))?
            .clone();

        let mut any = false;
        for label in labels {
            if self.state_of(&label) != Some(SyncPntState::Exists) {
                continue;
            }
            match self.register_inner(&label, None) {
                Ok(sent) => any |= sent,
                Err(e) if e.is_fatal() => return Err(e),
                // recorded on the point
                Err(_) => {}
            }
        }
        Ok(any)
    }

    // ========================================================================
    // Achieve
    // ========================================================================

    /// Signal local readiness for an ANNOUNCED point. Returns `true` once
    /// readiness has reached the runtime (or the point is already
    /// ACHIEVED), `false` if the runtime asked to retry later.
    ///
    /// The point itself becomes ACHIEVED only when the federation confirms
    /// and, for timed points, the freeze time is reached.
    ///
    /// # Errors
    /// - [`SyncError::UnknownLabel`] if the label does not exist.
    /// - [`SyncError::InvalidTransition`] unless ANNOUNCED or ACHIEVED.
    /// - [`SyncError::RendezvousAbandoned`] if the runtime rejects the
    ///   achieve; the point moves to ERROR.
    /// - [`SyncError::CollaboratorLost`] if the runtime is gone.
    pub fn achieve_sync_point(&mut self, label: &str) -> SyncResult<bool> {
        let now = self.now;
        let entry = self
            .points
            .get_mut(label)
            .ok_or_else(|| SyncError::UnknownLabel(label.to_owned()))?;
        match entry.point.state() {
            SyncPntState::Announced => {}
            SyncPntState::Achieved => {
                debug!(label, "sync point already achieved");
                return Ok(true);
            }
            from => {
                return Err(SyncError::InvalidTransition {
                    label: label.to_owned(),
                    from,
                    to: SyncPntState::Achieved,
                })
            }
        }

        if !entry.point.base().achieve_requested() {
            match self.rti.achieve_sync_point(label) {
                Ok(()) => {
                    entry.point.request_achieve()?;
                    info!(label, "✋ sync point achieve requested");
                }
                Err(source) if source.is_fatal() => {
                    return Err(SyncError::CollaboratorLost {
                        label: label.to_owned(),
                        source,
                    })
                }
                Err(e) if e.is_retryable() => {
                    warn!(label, error = %e, "sync point achieve deferred");
                    return Ok(false);
                }
                Err(e) => {
                    let reason = e.to_string();
                    entry.point.fail(reason.as_str());
                    error!(label, %reason, "sync point achieve rejected");
                    return Err(SyncError::RendezvousAbandoned {
                        label: label.to_owned(),
                        reason,
                    });
                }
            }
        }

        if entry.point.try_achieve(now) {
            info!(label, time = %now.display_in(self.base_time), "🏁 sync point achieved");
            self.newly_achieved.push(label.to_owned());
        }
        Ok(true)
    }

    /// Achieve every ANNOUNCED point of `list`. Returns `true` if any
    /// readiness signal reached the runtime.
    ///
    /// # Errors
    /// - [`SyncError::UnknownList`] if the list does not exist.
    /// - [`SyncError::CollaboratorLost`] as soon as the runtime is gone.
    pub fn achieve_all_sync_points(&mut self, list: &str) -> SyncResult<bool> {
        let labels = self
            .lists
            .get(list)
            .ok_or_else(|| SyncError::UnknownList(list.to_owned()))?
            .clone();

        let mut any = false;
        for label in labels {
            if self.state_of(&label) != Some(SyncPntState::Announced) {
                continue;
            }
            match self.achieve_sync_point(&label) {
                Ok(sent) => any |= sent,
                Err(e) if e.is_fatal() => return Err(e),
                // recorded on the point
                Err(_) => {}
            }
        }
        Ok(any)
    }

    /// Withdraw from a rendezvous: the point moves to ERROR and, if it was
    /// pending, the runtime is told.
    ///
    /// # Errors
    /// - [`SyncError::UnknownLabel`] if the label does not exist.
    /// - [`SyncError::CollaboratorLost`] if the runtime is gone (the point
    ///   is ERROR regardless).
    pub fn abandon_sync_point(&mut self, label: &str, reason: &str) -> SyncResult<()> {
        let reason = format!("abandoned: {reason}");
        warn!(label, %reason, "sync point abandoned");
        self.fail_point(label, &reason, true)
    }

    // ========================================================================
    // Callbacks from the federation runtime
    // ========================================================================

    /// The runtime accepted a registration.
    ///
    /// # Errors
    /// [`SyncError::UnknownLabel`] if the label does not exist.
    pub fn on_registration_succeeded(&mut self, label: &str) -> SyncResult<()> {
        match self.state_of(label) {
            Some(state) => {
                debug!(label, %state, "sync point registration confirmed");
                Ok(())
            }
            None => {
                warn!(label, "registration confirmed for unknown sync point");
                Err(SyncError::UnknownLabel(label.to_owned()))
            }
        }
    }

    /// The runtime refused a registration.
    ///
    /// [`SyncFailureReason::LabelNotUnique`] is benign: another federate
    /// registered first and the announcement follows.
    ///
    /// # Errors
    /// - [`SyncError::UnknownLabel`] if the label does not exist.
    /// - [`SyncError::RegistrationRejected`] for any other reason; the point
    ///   moves to ERROR.
    pub fn on_registration_failed(&mut self, label: &str, reason: SyncFailureReason) -> SyncResult<()> {
        if !self.points.contains_key(label) {
            warn!(label, %reason, "registration failure for unknown sync point");
            return Err(SyncError::UnknownLabel(label.to_owned()));
        }
        if reason == SyncFailureReason::LabelNotUnique {
            warn!(label, "sync point already registered by another federate; awaiting announcement");
            return Ok(());
        }

        let reason = reason.to_string();
        error!(label, %reason, "sync point registration failed");
        self.fail_point(label, &reason, false)?;
        Err(SyncError::RegistrationRejected {
            label: label.to_owned(),
            reason,
        })
    }

    /// The runtime announced a point. An 8-byte tag carries a freeze time.
    ///
    /// Unknown labels are added to [`UNKNOWN_SYNC_PNT_LIST`]. Duplicate
    /// announcements are ignored.
    ///
    /// # Errors
    /// - [`SyncError::InvalidLabel`] if an unknown label cannot be stored.
    /// - [`SyncError::RegistrationConflict`] if the announced kind or freeze
    ///   time differs from the local point; the local point moves to ERROR.
    pub fn on_announced(&mut self, label: &str, tag: &[u8]) -> SyncResult<()> {
        let announced_time = Int64Time::from_tag(tag);

        let Some((state, local_time)) = self
            .points
            .get(label)
            .map(|entry| (entry.point.state(), entry.point.freeze_time()))
        else {
            validate_label(label)?;
            let mut point = self.new_point(label, announced_time);
            point.announce()?;
            info!(
                label,
                list = UNKNOWN_SYNC_PNT_LIST,
                kind = point.kind_name(),
                "📣 sync point announced by another federate"
            );
            self.insert_entry(UNKNOWN_SYNC_PNT_LIST, point);
            return Ok(());
        };

        if state == SyncPntState::Error {
            warn!(label, "announcement for failed sync point ignored");
            return Ok(());
        }
        if local_time != announced_time {
            let detail = format!(
                "local {} announced as {}",
                describe(local_time, self.base_time),
                describe(announced_time, self.base_time)
            );
            error!(label, %detail, "conflicting sync point announcement");
            // the runtime counts us as a member once it announced
            self.fail_point(label, &detail, false)?;
            self.withdraw(label, &detail)?;
            return Err(SyncError::RegistrationConflict {
                label: label.to_owned(),
                detail,
            });
        }
        if matches!(state, SyncPntState::Announced | SyncPntState::Achieved) {
            warn!(label, %state, "duplicate announcement ignored");
            return Ok(());
        }

        let entry = self
            .points
            .get_mut(label)
            .ok_or_else(|| SyncError::UnknownLabel(label.to_owned()))?;
        entry.point.announce()?;
        info!(label, "📣 sync point announced");
        Ok(())
    }

    /// Every participant achieved `label`. Returns `true` if the point
    /// became ACHIEVED immediately; timed points may wait for their freeze
    /// time in [`update`](Self::update).
    ///
    /// # Errors
    /// - [`SyncError::UnknownLabel`] if the label does not exist.
    /// - [`SyncError::InvalidTransition`] if the point was never announced.
    pub fn on_federation_synchronized(&mut self, label: &str) -> SyncResult<bool> {
        let now = self.now;
        let entry = self
            .points
            .get_mut(label)
            .ok_or_else(|| SyncError::UnknownLabel(label.to_owned()))?;
        match entry.point.state() {
            SyncPntState::Announced => {
                entry.point.confirm_synchronized()?;
                info!(label, "🤝 federation synchronized");
                if entry.point.try_achieve(now) {
                    info!(label, time = %now.display_in(self.base_time), "🏁 sync point achieved");
                    self.newly_achieved.push(label.to_owned());
                    Ok(true)
                } else {
                    debug!(
                        label,
                        achieve_requested = entry.point.base().achieve_requested(),
                        freeze_time = ?entry.point.freeze_time(),
                        "sync point waiting for local conditions"
                    );
                    Ok(false)
                }
            }
            SyncPntState::Achieved | SyncPntState::Error => {
                warn!(label, state = %entry.point.state(), "synchronization notice ignored");
                Ok(false)
            }
            from => Err(SyncError::InvalidTransition {
                label: label.to_owned(),
                from,
                to: SyncPntState::Achieved,
            }),
        }
    }

    // ========================================================================
    // Per-cycle update
    // ========================================================================

    /// Advance to logical time `now` and return the labels that became
    /// ACHIEVED since the previous update, each exactly once.
    pub fn update(&mut self, now: Int64Time) -> Vec<String> {
        if now < self.now {
            warn!(
                previous = %self.now.display_in(self.base_time),
                now = %now.display_in(self.base_time),
                "logical time moved backwards"
            );
        }
        self.now = now;
        for (label, entry) in self.points.iter_mut() {
            if entry.point.try_achieve(now) {
                info!(label = %label, time = %now.display_in(self.base_time), "🏁 sync point achieved");
                self.newly_achieved.push(label.clone());
            }
        }
        std::mem::take(&mut self.newly_achieved)
    }

    // ========================================================================
    // Checkpoint / restore
    // ========================================================================

    /// Snapshot of every list. Timed points produce timed records.
    ///
    /// Local achieve requests and federation confirmations are transient
    /// and not part of the snapshot.
    pub fn checkpoint(&self) -> SyncPntCheckpoint {
        SyncPntCheckpoint {
            lists: self
                .lists
                .iter()
                .map(|(name, labels)| ListCheckpoint {
                    name: name.clone(),
                    records: labels
                        .iter()
                        .filter_map(|label| self.points.get(label))
                        .map(|entry| entry.point.to_record())
                        .collect(),
                })
                .collect(),
        }
    }

    /// Replace every list and point with the checkpoint's content.
    ///
    /// All-or-nothing: on error the manager is unchanged.
    ///
    /// # Errors
    /// - [`SyncError::InvalidLabel`] or [`SyncError::InvalidStateCode`] for
    ///   corrupt records.
    /// - [`SyncError::DuplicateLabel`] if a label appears twice.
    pub fn restore(&mut self, checkpoint: &SyncPntCheckpoint) -> SyncResult<()> {
        let mut points = BTreeMap::new();
        let mut lists: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for list in &checkpoint.lists {
            let labels = lists.entry(list.name.clone()).or_default();
            for record in &list.records {
                let point = SyncPoint::from_record(record, self.base_time)?;
                let label = point.label().to_owned();
                if points.contains_key(&label) {
                    return Err(SyncError::DuplicateLabel(label));
                }
                labels.push(label.clone());
                points.insert(
                    label,
                    Entry {
                        list: list.name.clone(),
                        point,
                    },
                );
            }
        }

        for label in points.keys() {
            self.generations.entry(label.clone()).or_insert(0);
        }
        self.points = points;
        self.lists = lists;
        self.newly_achieved.clear();
        info!(lists = self.lists.len(), points = self.points.len(), "💾 sync points restored");
        Ok(())
    }

    /// Multi-line rendering of every list and point.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        for (name, labels) in &self.lists {
            let _ = writeln!(out, "{name}:");
            for entry in labels.iter().filter_map(|label| self.points.get(label)) {
                let _ = writeln!(out, "  {}", entry.point);
            }
        }
        out
    }
}
