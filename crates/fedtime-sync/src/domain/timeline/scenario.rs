//! Scenario Timeline
//!
//! Maps between scenario time, simulation time and the federation's
//! logical time (HLT):
//!
//! ```text
//!   scenario  = epoch + sim_offset + sim_timeline.get_time()
//!   sim       = scenario - (epoch + sim_offset)
//!   hlt       = Int64Time(scenario - epoch) - hlt_offset
//!   scenario  = hlt.seconds + hlt_offset.seconds + epoch
//! ```
//!
//! # Invariants
//! - `time_from_simulation_time(compute_simulation_time(x)) == x` whenever
//!   `x - (epoch + sim_offset)` is exact in binary floating point (values on
//!   a common dyadic grid, which covers frame-aligned scenario times).
//! - `time_from_hlt(compute_hlt(x))` is within one base-time tick of `x`.
//!
//! # Lifetime
//! A `ScenarioTimeline` borrows the `SimTimeline` it derives from. The
//! borrow checker guarantees the SimTimeline outlives every view of it.

use fedtime_core::{BaseTime, Int64Interval, Int64Time, TimeResult};

use super::sim::SimTimeline;
use super::source::ClockSource;
use super::{Timeline, TimelineConfig};

/// Scenario time view over a borrowed simulation timeline.
#[derive(Debug)]
pub struct ScenarioTimeline<'a, C: ClockSource> {
    sim_timeline: &'a SimTimeline<C>,
    epoch: f64,
    sim_offset: f64,
    hlt_offset: Int64Interval,
    base_time: BaseTime,
}

impl<'a, C: ClockSource> Clone for ScenarioTimeline<'a, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, C: ClockSource> Copy for ScenarioTimeline<'a, C> {}

impl<'a, C: ClockSource> ScenarioTimeline<'a, C> {
    /// Scenario timeline with a zero HLT offset at the default base time.
    pub fn new(sim_timeline: &'a SimTimeline<C>, epoch: f64, sim_offset: f64) -> Self {
        Self {
            sim_timeline,
            epoch,
            sim_offset,
            hlt_offset: Int64Interval::ZERO,
            base_time: BaseTime::default(),
        }
    }

    /// Scenario timeline from configuration.
    ///
    /// # Errors
    /// [`TimeError::Range`](fedtime_core::TimeError::Range) if the HLT offset
    /// is not representable at the configured base time.
    pub fn from_config(sim_timeline: &'a SimTimeline<C>, config: &TimelineConfig) -> TimeResult<Self> {
        let hlt_offset = Int64Interval::from_seconds_in(config.hlt_offset, config.base_time)?;
        Ok(Self {
            sim_timeline,
            epoch: config.scenario_epoch,
            sim_offset: config.sim_offset,
            hlt_offset,
            base_time: config.base_time,
        })
    }

    /// Replace the logical time offset.
    pub fn with_hlt_offset(mut self, hlt_offset: Int64Interval) -> Self {
        self.hlt_offset = hlt_offset;
        self
    }

    /// Replace the logical time resolution.
    pub fn with_base_time(mut self, base_time: BaseTime) -> Self {
        self.base_time = base_time;
        self
    }

    /// Simulation timeline this view derives from.
    pub fn sim_timeline(&self) -> &'a SimTimeline<C> {
        self.sim_timeline
    }

    /// Offset between scenario and simulation time.
    pub fn sim_offset(&self) -> f64 {
        self.sim_offset
    }

    /// Set the offset between scenario and simulation time.
    pub fn set_sim_offset(&mut self, sim_offset: f64) {
        self.sim_offset = sim_offset;
    }

    /// Logical time offset.
    pub fn hlt_offset(&self) -> Int64Interval {
        self.hlt_offset
    }

    /// Set the logical time offset.
    pub fn set_hlt_offset(&mut self, hlt_offset: Int64Interval) {
        self.hlt_offset = hlt_offset;
    }

    /// Logical time resolution used for HLT conversions.
    pub fn base_time(&self) -> BaseTime {
        self.base_time
    }

    /// Simulation time corresponding to a scenario time.
    pub fn compute_simulation_time(&self, scenario_time: f64) -> f64 {
        scenario_time - (self.epoch + self.sim_offset)
    }

    /// Scenario time corresponding to a simulation time.
    pub fn time_from_simulation_time(&self, sim_time: f64) -> f64 {
        sim_time + (self.epoch + self.sim_offset)
    }

    /// Logical time corresponding to a scenario time.
    ///
    /// # Errors
    /// [`TimeError`](fedtime_core::TimeError) if the scenario time is out of
    /// range or subtracting the HLT offset overflows.
    pub fn compute_hlt(&self, scenario_time: f64) -> TimeResult<Int64Time> {
        Int64Time::from_seconds_in(scenario_time - self.epoch, self.base_time)?.checked_sub(self.hlt_offset)
    }

    /// Scenario time corresponding to a logical time.
    pub fn time_from_hlt(&self, hlt: Int64Time) -> f64 {
        hlt.to_seconds_in(self.base_time) + self.hlt_offset.to_seconds_in(self.base_time) + self.epoch
    }

    /// Logical time of the current scenario time.
    ///
    /// # Errors
    /// Same as [`compute_hlt`](Self::compute_hlt).
    pub fn current_hlt(&self) -> TimeResult<Int64Time> {
        self.compute_hlt(self.get_time())
    }
}

impl<'a, C: ClockSource> Timeline for ScenarioTimeline<'a, C> {
    fn epoch(&self) -> f64 {
        self.epoch
    }

    fn get_time(&self) -> f64 {
        self.epoch + self.sim_offset + self.sim_timeline.get_time()
    }
}
