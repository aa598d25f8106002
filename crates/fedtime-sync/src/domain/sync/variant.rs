//! Plain-or-timed sync point, as stored by the rendezvous manager.

use std::fmt;

use fedtime_core::{BaseTime, Int64Time};

use crate::domain::error::SyncResult;

use super::loggable::{Conversion, LoggableRecord};
use super::point::SyncPnt;
use super::state::SyncPntState;
use super::timed::TimedSyncPnt;

/// A sync point of either kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncPoint {
    /// Untimed point
    Plain(SyncPnt),
    /// Point with a freeze time
    Timed(TimedSyncPnt),
}

impl SyncPoint {
    /// Untimed state machine (shared by both kinds).
    pub fn base(&self) -> &SyncPnt {
        match self {
            SyncPoint::Plain(p) => p,
            SyncPoint::Timed(t) => t.point(),
        }
    }

    /// Unique label.
    pub fn label(&self) -> &str {
        self.base().label()
    }

    /// Current state.
    pub fn state(&self) -> SyncPntState {
        self.base().state()
    }

    /// Freeze time of timed points.
    pub fn freeze_time(&self) -> Option<Int64Time> {
        match self {
            SyncPoint::Plain(_) => None,
            SyncPoint::Timed(t) => Some(t.time()),
        }
    }

    /// True for the timed kind.
    pub fn is_timed(&self) -> bool {
        matches!(self, SyncPoint::Timed(_))
    }

    /// `"plain"` or `"timed"`.
    pub fn kind_name(&self) -> &'static str {
        match self {
            SyncPoint::Plain(_) => "plain",
            SyncPoint::Timed(_) => "timed",
        }
    }

    /// EXISTS → REGISTERED.
    ///
    /// # Errors
    /// See [`SyncPnt::register`].
    pub fn register(&mut self) -> SyncResult<()> {
        match self {
            SyncPoint::Plain(p) => p.register(),
            SyncPoint::Timed(t) => t.register(),
        }
    }

    /// EXISTS | REGISTERED → ANNOUNCED.
    ///
    /// # Errors
    /// See [`SyncPnt::announce`].
    pub fn announce(&mut self) -> SyncResult<()> {
        match self {
            SyncPoint::Plain(p) => p.announce(),
            SyncPoint::Timed(t) => t.announce(),
        }
    }

    /// Record local readiness.
    ///
    /// # Errors
    /// See [`SyncPnt::request_achieve`].
    pub fn request_achieve(&mut self) -> SyncResult<()> {
        match self {
            SyncPoint::Plain(p) => p.request_achieve(),
            SyncPoint::Timed(t) => t.request_achieve(),
        }
    }

    /// Record the federation's confirmation.
    ///
    /// # Errors
    /// See [`SyncPnt::confirm_synchronized`].
    pub fn confirm_synchronized(&mut self) -> SyncResult<()> {
        match self {
            SyncPoint::Plain(p) => p.confirm_synchronized(),
            SyncPoint::Timed(t) => t.confirm_synchronized(),
        }
    }

    /// ANNOUNCED → ACHIEVED when every condition of the kind holds at `now`.
    pub fn try_achieve(&mut self, now: Int64Time) -> bool {
        match self {
            SyncPoint::Plain(p) => p.try_achieve(),
            SyncPoint::Timed(t) => t.try_achieve(now),
        }
    }

    /// Any → ERROR.
    pub fn fail(&mut self, reason: impl Into<String>) {
        match self {
            SyncPoint::Plain(p) => p.fail(reason),
            SyncPoint::Timed(t) => t.fail(reason),
        }
    }

    /// Copy into a loggable record of any kind.
    pub fn convert(&self, target: &mut LoggableRecord) -> Conversion {
        match self {
            SyncPoint::Plain(p) => p.convert(target),
            SyncPoint::Timed(t) => t.convert(target),
        }
    }

    /// Snapshot into a record of the matching kind.
    pub fn to_record(&self) -> LoggableRecord {
        let mut record = match self {
            SyncPoint::Plain(_) => LoggableRecord::plain(),
            SyncPoint::Timed(_) => LoggableRecord::timed(),
        };
        self.convert(&mut record);
        record
    }

    /// Rebuild a point from a record. Timed records yield timed points
    /// rendered at `base_time`.
    ///
    /// # Errors
    /// [`SyncError::InvalidLabel`](crate::SyncError::InvalidLabel) or
    /// [`SyncError::InvalidStateCode`](crate::SyncError::InvalidStateCode)
    /// for corrupt records.
    pub fn from_record(record: &LoggableRecord, base_time: BaseTime) -> SyncResult<Self> {
        let point = SyncPnt::with_state(record.label()?, record.state()?);
        Ok(match record.time() {
            None => SyncPoint::Plain(point),
            Some(ticks) => SyncPoint::Timed(
                TimedSyncPnt::from_point(point, Int64Time::from_base_time(ticks)).with_base_time(base_time),
            ),
        })
    }
}

impl From<SyncPnt> for SyncPoint {
    fn from(point: SyncPnt) -> Self {
        SyncPoint::Plain(point)
    }
}

impl From<TimedSyncPnt> for SyncPoint {
    fn from(point: TimedSyncPnt) -> Self {
        SyncPoint::Timed(point)
    }
}

impl fmt::Display for SyncPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncPoint::Plain(p) => fmt::Display::fmt(p, f),
            SyncPoint::Timed(t) => fmt::Display::fmt(t, f),
        }
    }
}
