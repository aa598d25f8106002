//! Wall Clock Backend
//!
//! # Design
//! Monotonic real-time clock built on `Instant`, with freeze/resume so a
//! federate can hold simulation time while paused at a sync point.
//!
//! # Thread Safety
//! State sits behind a `parking_lot::RwLock`: readers (timeline queries) run
//! concurrently, `freeze()`/`resume()` take the write lock.

use std::time::{Duration, Instant};

use parking_lot::RwLock;

use super::source::ClockSource;

/// Freezable monotonic wall clock.
#[derive(Debug)]
pub struct WallClock {
    state: RwLock<WallState>,
}

#[derive(Debug)]
struct WallState {
    /// Time accumulated across completed running intervals
    accumulated: Duration,
    /// Start of the current running interval, `None` while frozen
    running_since: Option<Instant>,
}

impl WallClock {
    /// Running clock starting now.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(WallState {
                accumulated: Duration::ZERO,
                running_since: Some(Instant::now()),
            }),
        }
    }

    /// Frozen clock; call [`resume`](Self::resume) to start it.
    pub fn frozen() -> Self {
        Self {
            state: RwLock::new(WallState {
                accumulated: Duration::ZERO,
                running_since: None,
            }),
        }
    }

    /// Stop accumulating time. Idempotent.
    pub fn freeze(&self) {
        let mut state = self.state.write();
        if let Some(since) = state.running_since.take() {
            state.accumulated += since.elapsed();
        }
    }

    /// Resume accumulating time. Idempotent.
    pub fn resume(&self) {
        let mut state = self.state.write();
        if state.running_since.is_none() {
            state.running_since = Some(Instant::now());
        }
    }

    /// True while frozen.
    pub fn is_frozen(&self) -> bool {
        self.state.read().running_since.is_none()
    }

    /// Total running time.
    pub fn elapsed(&self) -> Duration {
        let state = self.state.read();
        match state.running_since {
            Some(since) => state.accumulated + since.elapsed(),
            None => state.accumulated,
        }
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockSource for WallClock {
    fn elapsed_seconds(&self) -> f64 {
        self.elapsed().as_secs_f64()
    }
}
