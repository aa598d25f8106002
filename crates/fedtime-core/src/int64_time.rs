//! Fixed-precision logical time.
//!
//! [`Int64Time`] is the federation's logical time (HLT): an immutable, signed
//! 64-bit count of base-time ticks. It is the only time representation used
//! for ordering and synchronization; floating-point seconds exist only at
//! the edges (see `ScenarioTimeline` in `fedtime-sync`).
//!
//! # Invariants
//! - Conversions round to the nearest tick, never truncate.
//! - `to_seconds(from_seconds(v)) == v` for tick-aligned `v`.
//! - Arithmetic never wraps; leaving the `i64` range is a [`TimeError::Overflow`].

use std::fmt;
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

use crate::base_time::{BaseTime, Seconds};
use crate::error::{TimeError, TimeResult};
use crate::int64_interval::Int64Interval;

/// Size in bytes of the encoded user-supplied tag form.
pub const TAG_LEN: usize = 8;

/// Logical time as a base-time tick count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Int64Time(i64);

impl Int64Time {
    /// The logical time origin.
    pub const ZERO: Int64Time = Int64Time(0);

    /// Latest representable logical time.
    pub const MAX: Int64Time = Int64Time(i64::MAX);

    /// Earliest representable logical time.
    pub const MIN: Int64Time = Int64Time(i64::MIN);

    /// Wrap a raw tick count.
    #[inline]
    pub const fn from_base_time(ticks: i64) -> Self {
        Int64Time(ticks)
    }

    /// Raw tick count.
    #[inline]
    pub const fn base_time(self) -> i64 {
        self.0
    }

    /// Logical time from seconds at the default (microsecond) base time.
    ///
    /// # Errors
    /// [`TimeError::Range`] if `seconds` is not finite or out of range.
    pub fn from_seconds(seconds: f64) -> TimeResult<Self> {
        Self::from_seconds_in(seconds, BaseTime::default())
    }

    /// Logical time from seconds at an explicit base time.
    ///
    /// # Errors
    /// [`TimeError::Range`] if `seconds` is not finite or out of range.
    pub fn from_seconds_in(seconds: f64, base: BaseTime) -> TimeResult<Self> {
        base.to_ticks(seconds).map(Int64Time)
    }

    /// Seconds at the default base time.
    pub fn to_seconds(self) -> f64 {
        self.to_seconds_in(BaseTime::default())
    }

    /// Seconds at an explicit base time.
    pub fn to_seconds_in(self, base: BaseTime) -> f64 {
        base.to_seconds(self.0)
    }

    /// Seconds rendering at an explicit base time. `Display` assumes the
    /// default base; use this wherever the base is configurable.
    pub const fn display_in(self, base: BaseTime) -> Seconds {
        Seconds::new(self.0, base)
    }

    /// True at the logical time origin.
    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// `self + interval`.
    ///
    /// # Errors
    /// [`TimeError::Overflow`] if the result leaves the `i64` range.
    pub fn checked_add(self, interval: Int64Interval) -> TimeResult<Self> {
        self.0
            .checked_add(interval.base_time())
            .map(Int64Time)
            .ok_or_else(|| TimeError::overflow("+", self.0, interval.base_time()))
    }

    /// `self - interval`.
    ///
    /// # Errors
    /// [`TimeError::Overflow`] if the result leaves the `i64` range.
    pub fn checked_sub(self, interval: Int64Interval) -> TimeResult<Self> {
        self.0
            .checked_sub(interval.base_time())
            .map(Int64Time)
            .ok_or_else(|| TimeError::overflow("-", self.0, interval.base_time()))
    }

    /// Signed distance `self - earlier`.
    ///
    /// # Errors
    /// [`TimeError::Overflow`] if the distance leaves the `i64` range.
    pub fn interval_since(self, earlier: Int64Time) -> TimeResult<Int64Interval> {
        self.0
            .checked_sub(earlier.0)
            .map(Int64Interval::from_base_time)
            .ok_or_else(|| TimeError::overflow("-", self.0, earlier.0))
    }

    /// Big-endian encoding carried in a sync-point registration tag.
    pub fn to_tag(self) -> [u8; TAG_LEN] {
        self.0.to_be_bytes()
    }

    /// Decode a registration tag. Anything other than exactly eight bytes
    /// means the tag does not carry a time.
    pub fn from_tag(tag: &[u8]) -> Option<Self> {
        let bytes: [u8; TAG_LEN] = tag.try_into().ok()?;
        Some(Int64Time(i64::from_be_bytes(bytes)))
    }
}

impl Add<Int64Interval> for Int64Time {
    type Output = TimeResult<Int64Time>;

    fn add(self, rhs: Int64Interval) -> Self::Output {
        self.checked_add(rhs)
    }
}

impl Sub<Int64Interval> for Int64Time {
    type Output = TimeResult<Int64Time>;

    fn sub(self, rhs: Int64Interval) -> Self::Output {
        self.checked_sub(rhs)
    }
}

impl Sub for Int64Time {
    type Output = TimeResult<Int64Interval>;

    fn sub(self, rhs: Int64Time) -> Self::Output {
        self.interval_since(rhs)
    }
}

impl fmt::Display for Int64Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_seconds())
    }
}
