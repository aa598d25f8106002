//! Timed Synchronization Point
//!
//! A sync point bound to a freeze time. Achieving it additionally requires
//! the local logical time to have reached that freeze time, so no federate
//! leaves the rendezvous before the agreed instant.

use std::fmt;

use fedtime_core::{BaseTime, Int64Time};
use tracing::warn;

use crate::domain::error::{SyncError, SyncResult};

use super::loggable::{encode_label, Conversion, LoggableRecord};
use super::point::SyncPnt;
use super::state::SyncPntState;

/// Sync point with a freeze time.
///
/// The base time only affects rendering; ordering and gating compare ticks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimedSyncPnt {
    point: SyncPnt,
    time: Int64Time,
    base_time: BaseTime,
}

impl TimedSyncPnt {
    /// New timed point in EXISTS.
    pub fn new(label: impl Into<String>, time: Int64Time) -> Self {
        Self::from_point(SyncPnt::new(label), time)
    }

    /// Wrap an existing point with a freeze time.
    pub fn from_point(point: SyncPnt, time: Int64Time) -> Self {
        Self {
            point,
            time,
            base_time: BaseTime::default(),
        }
    }

    /// Render the freeze time at `base_time`.
    pub fn with_base_time(mut self, base_time: BaseTime) -> Self {
        self.base_time = base_time;
        self
    }

    /// Freeze time.
    pub fn time(&self) -> Int64Time {
        self.time
    }

    /// Base time the freeze time is expressed in.
    pub fn base_time(&self) -> BaseTime {
        self.base_time
    }

    /// Untimed state machine.
    pub fn point(&self) -> &SyncPnt {
        &self.point
    }

    /// Unique label.
    pub fn label(&self) -> &str {
        self.point.label()
    }

    /// Current state.
    pub fn state(&self) -> SyncPntState {
        self.point.state()
    }

    /// True once `now` has reached the freeze time.
    pub fn is_time_reached(&self, now: Int64Time) -> bool {
        now >= self.time
    }

    /// See [`SyncPnt::register`].
    ///
    /// # Errors
    /// [`SyncError::InvalidTransition`] unless EXISTS.
    pub fn register(&mut self) -> SyncResult<()> {
        self.point.register()
    }

    /// See [`SyncPnt::announce`].
    ///
    /// # Errors
    /// [`SyncError::InvalidTransition`] unless EXISTS or REGISTERED.
    pub fn announce(&mut self) -> SyncResult<()> {
        self.point.announce()
    }

    /// See [`SyncPnt::request_achieve`].
    ///
    /// # Errors
    /// [`SyncError::InvalidTransition`] unless ANNOUNCED.
    pub fn request_achieve(&mut self) -> SyncResult<()> {
        self.point.request_achieve()
    }

    /// See [`SyncPnt::confirm_synchronized`].
    ///
    /// # Errors
    /// [`SyncError::InvalidTransition`] unless ANNOUNCED.
    pub fn confirm_synchronized(&mut self) -> SyncResult<()> {
        self.point.confirm_synchronized()
    }

    /// ANNOUNCED → ACHIEVED once requested, confirmed and `now >= time`.
    pub fn try_achieve(&mut self, now: Int64Time) -> bool {
        self.is_time_reached(now) && self.point.try_achieve()
    }

    /// Any → ERROR.
    pub fn fail(&mut self, reason: impl Into<String>) {
        self.point.fail(reason);
    }

    /// Copy label, state and time into `target`.
    ///
    /// A plain target cannot hold the freeze time: the label and state are
    /// still copied and the result is [`Conversion::Degraded`].
    pub fn convert(&self, target: &mut LoggableRecord) -> Conversion {
        match target {
            LoggableRecord::Timed(record) => {
                record.label = encode_label(self.label());
                record.state = self.state().code();
                record.time = self.time.base_time();
                Conversion::Exact
            }
            LoggableRecord::Plain(_) => {
                warn!(
                    label = %self.label(),
                    time = %self.time.display_in(self.base_time),
                    "timed sync point written to a plain record; freeze time dropped"
                );
                self.point.convert(target);
                Conversion::Degraded(SyncError::ConversionMismatch {
                    label: self.label().to_owned(),
                    from: "timed",
                    to: "plain",
                })
            }
        }
    }
}

impl fmt::Display for TimedSyncPnt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let head = format!("{}/{}", self.label(), self.time.display_in(self.base_time));
        self.point.fmt_with_head(f, &head)
    }
}
