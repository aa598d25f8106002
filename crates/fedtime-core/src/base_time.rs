//! # Base Time Resolution
//!
//! Logical time is an integer count of base-time ticks. The base time is a
//! federation-wide agreement: every federate must use the same unit or their
//! logical timestamps will not line up.
//!
//! ```text
//!   seconds (f64) ──round(s × ticks_per_second)──▶ ticks (i64)
//!   ticks (i64)   ──ticks ÷ ticks_per_second────▶ seconds (f64)
//! ```
//!
//! Conversion rounds to the nearest tick, so any tick-aligned seconds value
//! whose tick count fits in 52 bits converts back to exactly the same `f64`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{TimeError, TimeResult};

/// Smallest `f64` that is out of the `i64` range on the positive side (2^63).
const I64_UPPER_EXCLUSIVE: f64 = 9_223_372_036_854_775_808.0;

/// Smallest `f64` in the `i64` range (-2^63).
const I64_LOWER_INCLUSIVE: f64 = -9_223_372_036_854_775_808.0;

/// Integer resolution of logical time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseTime {
    /// 1 tick = 1 s
    Seconds,
    /// 1 tick = 1 ms
    Milliseconds,
    /// 1 tick = 1 µs (federation default)
    #[default]
    Microseconds,
    /// 1 tick = 1 ns
    Nanoseconds,
    /// 1 tick = 1 ps
    Picoseconds,
    /// 1 tick = 1 fs
    Femtoseconds,
    /// 1 tick = 1 as
    Attoseconds,
}

impl BaseTime {
    /// All supported resolutions, coarsest first.
    pub const ALL: [BaseTime; 7] = [
        BaseTime::Seconds,
        BaseTime::Milliseconds,
        BaseTime::Microseconds,
        BaseTime::Nanoseconds,
        BaseTime::Picoseconds,
        BaseTime::Femtoseconds,
        BaseTime::Attoseconds,
    ];

    /// Number of ticks in one second.
    #[inline]
    pub const fn ticks_per_second(self) -> i64 {
        match self {
            BaseTime::Seconds => 1,
            BaseTime::Milliseconds => 1_000,
            BaseTime::Microseconds => 1_000_000,
            BaseTime::Nanoseconds => 1_000_000_000,
            BaseTime::Picoseconds => 1_000_000_000_000,
            BaseTime::Femtoseconds => 1_000_000_000_000_000,
            BaseTime::Attoseconds => 1_000_000_000_000_000_000,
        }
    }

    /// Duration of one tick in seconds.
    pub fn resolution(self) -> f64 {
        1.0 / self.ticks_per_second() as f64
    }

    /// Largest representable time in seconds at this resolution.
    pub fn max_seconds(self) -> f64 {
        self.to_seconds(i64::MAX)
    }

    /// Convert seconds to the nearest tick count.
    ///
    /// # Errors
    /// [`TimeError::Range`] when `seconds` is not finite or the rounded tick
    /// count does not fit in an `i64`.
    pub fn to_ticks(self, seconds: f64) -> TimeResult<i64> {
        if !seconds.is_finite() {
            return Err(TimeError::Range { seconds, base: self });
        }
        let scaled = (seconds * self.ticks_per_second() as f64).round();
        if !(I64_LOWER_INCLUSIVE..I64_UPPER_EXCLUSIVE).contains(&scaled) {
            return Err(TimeError::Range { seconds, base: self });
        }
        Ok(scaled as i64)
    }

    /// Convert a tick count to seconds.
    #[inline]
    pub fn to_seconds(self, ticks: i64) -> f64 {
        ticks as f64 / self.ticks_per_second() as f64
    }

    /// Lower-case unit name, as used in configuration files.
    pub const fn name(self) -> &'static str {
        match self {
            BaseTime::Seconds => "seconds",
            BaseTime::Milliseconds => "milliseconds",
            BaseTime::Microseconds => "microseconds",
            BaseTime::Nanoseconds => "nanoseconds",
            BaseTime::Picoseconds => "picoseconds",
            BaseTime::Femtoseconds => "femtoseconds",
            BaseTime::Attoseconds => "attoseconds",
        }
    }
}

/// A tick count rendered in seconds at an explicit base time.
///
/// Returned by `Int64Time::display_in` and `Int64Interval::display_in`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seconds {
    ticks: i64,
    base: BaseTime,
}

impl Seconds {
    /// Render `ticks` of `base`.
    pub const fn new(ticks: i64, base: BaseTime) -> Self {
        Self { ticks, base }
    }
}

impl fmt::Display for Seconds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base.to_seconds(self.ticks))
    }
}

impl fmt::Display for BaseTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BaseTime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        BaseTime::ALL
            .into_iter()
            .find(|base| base.name() == lowered)
            .ok_or_else(|| format!("unknown base time unit '{s}'"))
    }
}
