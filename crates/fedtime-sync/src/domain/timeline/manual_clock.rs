//! Stepped Clock Backend
//!
//! Deterministic clock advanced explicitly by the host scheduler. Interior
//! mutability lets the host keep stepping the clock while a `SimTimeline`
//! reads it through a shared reference.

use std::cell::Cell;

use super::source::ClockSource;

/// Clock advanced only by explicit calls.
///
/// Single-threaded (`!Sync`), like the verification backends it is modeled
/// on: suitable for tests and frame-stepped executives.
#[derive(Debug, Default)]
pub struct ManualClock {
    seconds: Cell<f64>,
}

impl ManualClock {
    /// Clock at zero elapsed seconds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clock starting at `seconds`.
    pub fn starting_at(seconds: f64) -> Self {
        Self {
            seconds: Cell::new(seconds),
        }
    }

    /// Jump to `seconds`. Going backwards is ignored.
    pub fn set(&self, seconds: f64) {
        if seconds >= self.seconds.get() {
            self.seconds.set(seconds);
        }
    }

    /// Advance by `delta` seconds. Negative steps are ignored.
    pub fn advance(&self, delta: f64) {
        if delta > 0.0 {
            self.seconds.set(self.seconds.get() + delta);
        }
    }
}

impl ClockSource for ManualClock {
    #[inline]
    fn elapsed_seconds(&self) -> f64 {
        self.seconds.get()
    }
}
