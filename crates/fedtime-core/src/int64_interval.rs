//! Signed logical time interval.
//!
//! Same representation as [`Int64Time`](crate::Int64Time) but semantically a
//! duration: lookahead windows, timeline offsets, the distance between two
//! logical times. May be negative.

use std::fmt;
use std::ops::{Add, Neg, Sub};

use serde::{Deserialize, Serialize};

use crate::base_time::{BaseTime, Seconds};
use crate::error::{TimeError, TimeResult};

/// A signed duration in base-time ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Int64Interval(i64);

impl Int64Interval {
    /// Zero-length interval.
    pub const ZERO: Int64Interval = Int64Interval(0);

    /// Largest positive interval.
    pub const MAX: Int64Interval = Int64Interval(i64::MAX);

    /// Largest negative interval.
    pub const MIN: Int64Interval = Int64Interval(i64::MIN);

    /// Wrap a raw tick count.
    #[inline]
    pub const fn from_base_time(ticks: i64) -> Self {
        Int64Interval(ticks)
    }

    /// Raw tick count.
    #[inline]
    pub const fn base_time(self) -> i64 {
        self.0
    }

    /// Interval from seconds at the default (microsecond) base time.
    ///
    /// # Errors
    /// [`TimeError::Range`] if the value is not representable.
    pub fn from_seconds(seconds: f64) -> TimeResult<Self> {
        Self::from_seconds_in(seconds, BaseTime::default())
    }

    /// Interval from seconds at an explicit base time.
    ///
    /// # Errors
    /// [`TimeError::Range`] if the value is not representable.
    pub fn from_seconds_in(seconds: f64, base: BaseTime) -> TimeResult<Self> {
        base.to_ticks(seconds).map(Int64Interval)
    }

    /// Interval in seconds at the default base time.
    pub fn to_seconds(self) -> f64 {
        self.to_seconds_in(BaseTime::default())
    }

    /// Interval in seconds at an explicit base time.
    pub fn to_seconds_in(self, base: BaseTime) -> f64 {
        base.to_seconds(self.0)
    }

    /// Seconds rendering at an explicit base time. `Display` assumes the
    /// default base; use this wherever the base is configurable.
    pub const fn display_in(self, base: BaseTime) -> Seconds {
        Seconds::new(self.0, base)
    }

    /// True for a zero-length interval.
    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// True for a strictly negative interval.
    #[inline]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Sum of two intervals.
    ///
    /// # Errors
    /// [`TimeError::Overflow`] if the result leaves the `i64` range.
    pub fn checked_add(self, rhs: Int64Interval) -> TimeResult<Self> {
        self.0
            .checked_add(rhs.0)
            .map(Int64Interval)
            .ok_or_else(|| TimeError::overflow("+", self.0, rhs.0))
    }

    /// Difference of two intervals.
    ///
    /// # Errors
    /// [`TimeError::Overflow`] if the result leaves the `i64` range.
    pub fn checked_sub(self, rhs: Int64Interval) -> TimeResult<Self> {
        self.0
            .checked_sub(rhs.0)
            .map(Int64Interval)
            .ok_or_else(|| TimeError::overflow("-", self.0, rhs.0))
    }

    /// Negated interval. Fails only for [`Int64Interval::MIN`].
    ///
    /// # Errors
    /// [`TimeError::Overflow`] when negating `i64::MIN`.
    pub fn checked_neg(self) -> TimeResult<Self> {
        self.0
            .checked_neg()
            .map(Int64Interval)
            .ok_or_else(|| TimeError::overflow("neg", 0, self.0))
    }
}

impl Add for Int64Interval {
    type Output = TimeResult<Int64Interval>;

    fn add(self, rhs: Int64Interval) -> Self::Output {
        self.checked_add(rhs)
    }
}

impl Sub for Int64Interval {
    type Output = TimeResult<Int64Interval>;

    fn sub(self, rhs: Int64Interval) -> Self::Output {
        self.checked_sub(rhs)
    }
}

impl Neg for Int64Interval {
    type Output = TimeResult<Int64Interval>;

    fn neg(self) -> Self::Output {
        self.checked_neg()
    }
}

impl fmt::Display for Int64Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_seconds())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_and_sign() {
        assert!(Int64Interval::ZERO.is_zero());
        assert!(Int64Interval::from_base_time(-5).is_negative());
        assert!(!Int64Interval::from_base_time(5).is_negative());
    }

    #[test]
    fn test_seconds_conversion() {
        let lookahead = Int64Interval::from_seconds(0.25).unwrap();
        assert_eq!(lookahead.base_time(), 250_000);
        assert_eq!(lookahead.to_seconds(), 0.25);

        let negative = Int64Interval::from_seconds(-1.5).unwrap();
        assert_eq!(negative.base_time(), -1_500_000);
    }

    #[test]
    fn test_arithmetic() {
        let a = Int64Interval::from_base_time(30);
        let b = Int64Interval::from_base_time(12);
        assert_eq!((a + b).unwrap().base_time(), 42);
        assert_eq!((b - a).unwrap().base_time(), -18);
        assert_eq!((-a).unwrap().base_time(), -30);
    }

    #[test]
    fn test_overflow_is_reported() {
        let err = (Int64Interval::MAX + Int64Interval::from_base_time(1)).unwrap_err();
        assert!(err.is_overflow());
        assert!((Int64Interval::MIN - Int64Interval::from_base_time(1)).is_err());
        assert!((-Int64Interval::MIN).is_err());
    }

    #[test]
    fn test_display_in_explicit_base() {
        let lookahead = Int64Interval::from_seconds_in(0.25, BaseTime::Milliseconds).unwrap();
        assert_eq!(lookahead.to_string(), "0.00025");
        assert_eq!(lookahead.display_in(BaseTime::Milliseconds).to_string(), "0.25");
    }

    #[test]
    fn test_ordering() {
        assert!(Int64Interval::from_base_time(-1) < Int64Interval::ZERO);
        assert!(Int64Interval::MAX > Int64Interval::from_base_time(1));
    }
}
