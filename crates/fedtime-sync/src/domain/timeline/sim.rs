//! Simulation Timeline
//!
//! Elapsed simulation seconds: `epoch + clock.elapsed_seconds()`.

use super::source::ClockSource;
use super::Timeline;

/// Simulation timeline driven by a host clock.
///
/// Owns its clock source. Generic over the backend so the clock read is
/// statically dispatched.
#[derive(Debug)]
pub struct SimTimeline<C: ClockSource> {
    epoch: f64,
    clock: C,
}

impl<C: ClockSource> SimTimeline<C> {
    /// Timeline with a zero epoch.
    pub fn new(clock: C) -> Self {
        Self::with_epoch(clock, 0.0)
    }

    /// Timeline with an explicit epoch in seconds.
    pub fn with_epoch(clock: C, epoch: f64) -> Self {
        Self { epoch, clock }
    }

    /// Underlying host clock.
    pub fn clock(&self) -> &C {
        &self.clock
    }
}

impl<C: ClockSource> Timeline for SimTimeline<C> {
    fn epoch(&self) -> f64 {
        self.epoch
    }

    fn get_time(&self) -> f64 {
        self.epoch + self.clock.elapsed_seconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::timeline::ManualClock;

    #[test]
    fn test_tracks_clock() {
        let clock = ManualClock::new();
        let sim = SimTimeline::new(&clock);
        assert_eq!(sim.get_time(), 0.0);
        clock.advance(10.0);
        assert_eq!(sim.get_time(), 10.0);
    }

    #[test]
    fn test_epoch_offsets_clock() {
        let sim = SimTimeline::with_epoch(ManualClock::starting_at(2.0), 3.0);
        assert_eq!(sim.epoch(), 3.0);
        assert_eq!(sim.get_time(), 5.0);
        assert_eq!(sim.clock().elapsed_seconds(), 2.0);
    }
}
