//! Timeline Family
//!
//! Every federate keeps three views of time:
//!
//! ```text
//!   ClockSource ──► SimTimeline ──► ScenarioTimeline ──► Int64Time (HLT)
//!   (host clock)    epoch + clock   + epoch + offsets    fixed-precision
//!        │               │                 │
//!   ManualClock     owns its clock    borrows &SimTimeline
//!   WallClock
//! ```
//!
//! - **SimTimeline**: elapsed simulation seconds since the simulation epoch.
//! - **ScenarioTimeline**: scenario seconds (e.g. a TT or UTC epoch), derived
//!   from a SimTimeline plus fixed offsets, convertible to and from the
//!   federation's logical time.
//!
//! # Design
//! `Timeline` is a capability trait with static dispatch. The host clock is
//! a `ClockSource` backend selected at construction: `ManualClock` for
//! stepped, deterministic execution and `WallClock` for real time.

mod manual_clock;
mod scenario;
mod sim;
mod source;
mod wall_clock;

use fedtime_core::BaseTime;
use serde::{Deserialize, Serialize};

pub use manual_clock::ManualClock;
pub use scenario::ScenarioTimeline;
pub use sim::SimTimeline;
pub use source::ClockSource;
pub use wall_clock::WallClock;

/// Something that can report a time in seconds relative to an epoch.
pub trait Timeline {
    /// Epoch of this timeline, in seconds. Fixed at construction.
    fn epoch(&self) -> f64;

    /// Current time on this timeline, in seconds.
    fn get_time(&self) -> f64;
}

/// Construction parameters for a federate's timelines.
///
/// Loaded from JSON by the CLI; every field has a default so partial
/// documents are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    /// SimTimeline epoch, in seconds.
    pub sim_epoch: f64,
    /// ScenarioTimeline epoch, in seconds of the scenario time scale.
    pub scenario_epoch: f64,
    /// Offset between scenario and simulation time, in seconds.
    pub sim_offset: f64,
    /// Logical time offset, in seconds. Converted to an
    /// [`Int64Interval`](fedtime_core::Int64Interval) at `base_time`.
    pub hlt_offset: f64,
    /// Logical time resolution.
    pub base_time: BaseTime,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            sim_epoch: 0.0,
            scenario_epoch: 0.0,
            sim_offset: 0.0,
            hlt_offset: 0.0,
            base_time: BaseTime::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = TimelineConfig::default();
        assert_eq!(config.scenario_epoch, 0.0);
        assert_eq!(config.base_time, BaseTime::Microseconds);
    }

    #[test]
    fn test_config_partial_json() {
        let config: TimelineConfig =
            serde_json::from_str(r#"{ "scenario_epoch": 100.0, "sim_offset": 5.0 }"#).unwrap();
        assert_eq!(config.scenario_epoch, 100.0);
        assert_eq!(config.sim_offset, 5.0);
        assert_eq!(config.hlt_offset, 0.0);
        assert_eq!(config.base_time, BaseTime::Microseconds);
    }

    #[test]
    fn test_config_base_time_by_name() {
        let config: TimelineConfig =
            serde_json::from_str(r#"{ "base_time": "nanoseconds" }"#).unwrap();
        assert_eq!(config.base_time, BaseTime::Nanoseconds);
    }
}
