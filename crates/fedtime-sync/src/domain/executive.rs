//! Federate Time Executive
//!
//! Top-level coordinator driven by the host scheduler once per frame:
//!
//! ```text
//!   initialize ──► loop { pre_advance ──(runtime grants)──► post_advance } ──► shutdown
//!                          │                                   │
//!                   granted + lookahead              SyncPntManager::update
//!                                                    PausePointList::check_state
//! ```

use fedtime_core::{Int64Interval, Int64Time, TimeError};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::domain::error::{SyncError, SyncResult};
use crate::domain::pause::PausePointList;
use crate::domain::rendezvous::{RtiAmbassador, SyncPntCheckpoint, SyncPntManager};
use crate::domain::timeline::{ClockSource, ScenarioTimeline, SimTimeline, TimelineConfig};

/// Default name of the pause-point list.
pub const DEFAULT_PAUSE_LIST: &str = "PAUSE_POINTS";

/// Executive construction parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutiveConfig {
    /// Timeline epochs and offsets
    pub timeline: TimelineConfig,
    /// Lookahead in seconds; must not be negative
    pub lookahead: f64,
    /// Sync-point list interpreted as pause points
    pub pause_list: String,
}

impl Default for ExecutiveConfig {
    fn default() -> Self {
        Self {
            timeline: TimelineConfig::default(),
            lookahead: 0.25,
            pause_list: DEFAULT_PAUSE_LIST.to_owned(),
        }
    }
}

/// Lifecycle of an executive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutivePhase {
    /// Built, not yet initialized
    Constructed,
    /// Advancing time
    Running,
    /// Shut down
    Shutdown,
}

/// Owns one federate's timelines, logical time and rendezvous state.
pub struct FederateExecutive<C: ClockSource, R: RtiAmbassador> {
    config: ExecutiveConfig,
    sim: SimTimeline<C>,
    hlt_offset: Int64Interval,
    lookahead: Int64Interval,
    granted: Int64Time,
    sync: SyncPntManager<R>,
    pause: PausePointList,
    phase: ExecutivePhase,
}

impl<C: ClockSource, R: RtiAmbassador> FederateExecutive<C, R> {
    /// Build an executive over a host clock and a federation runtime.
    ///
    /// # Errors
    /// [`SyncError::Time`] if the lookahead or HLT offset is not
    /// representable at the configured base time, or the lookahead is
    /// negative.
    pub fn new(config: ExecutiveConfig, clock: C, rti: R) -> SyncResult<Self> {
        let base = config.timeline.base_time;
        let lookahead = Int64Interval::from_seconds_in(config.lookahead, base)?;
        if lookahead.is_negative() {
            return Err(TimeError::Range {
                seconds: config.lookahead,
                base,
            }
            .into());
        }
        let hlt_offset = Int64Interval::from_seconds_in(config.timeline.hlt_offset, base)?;

        Ok(Self {
            sim: SimTimeline::with_epoch(clock, config.timeline.sim_epoch),
            pause: PausePointList::new(config.pause_list.clone()),
            sync: SyncPntManager::with_base_time(rti, base),
            hlt_offset,
            lookahead,
            granted: Int64Time::ZERO,
            phase: ExecutivePhase::Constructed,
            config,
        })
    }

    /// Configuration the executive was built with.
    pub fn config(&self) -> &ExecutiveConfig {
        &self.config
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> ExecutivePhase {
        self.phase
    }

    /// Simulation timeline.
    pub fn sim_timeline(&self) -> &SimTimeline<C> {
        &self.sim
    }

    /// Scenario view over the simulation timeline.
    pub fn scenario_timeline(&self) -> ScenarioTimeline<'_, C> {
        let timeline = &self.config.timeline;
        ScenarioTimeline::new(&self.sim, timeline.scenario_epoch, timeline.sim_offset)
            .with_hlt_offset(self.hlt_offset)
            .with_base_time(timeline.base_time)
    }

    /// Last logical time granted by the runtime.
    pub fn granted(&self) -> Int64Time {
        self.granted
    }

    /// Lookahead interval.
    pub fn lookahead(&self) -> Int64Interval {
        self.lookahead
    }

    /// Rendezvous manager.
    pub fn sync(&self) -> &SyncPntManager<R> {
        &self.sync
    }

    /// Rendezvous manager, mutably.
    pub fn sync_mut(&mut self) -> &mut SyncPntManager<R> {
        &mut self.sync
    }

    /// Pause-point view.
    pub fn pause(&self) -> &PausePointList {
        &self.pause
    }

    /// True while frozen at a pause point.
    pub fn is_frozen(&self) -> bool {
        self.pause.is_frozen()
    }

    /// Prepare for the first advance. Idempotent.
    ///
    /// # Errors
    /// Currently infallible; reserved for runtime handshakes.
    pub fn initialize(&mut self) -> SyncResult<()> {
        if self.phase != ExecutivePhase::Constructed {
            debug!(phase = ?self.phase, "initialize ignored");
            return Ok(());
        }
        self.sync.add_sync_point_list(&self.config.pause_list);
        self.pause.begin();
        self.phase = ExecutivePhase::Running;
        info!(
            lookahead = %self.lookahead.display_in(self.config.timeline.base_time),
            base_time = %self.config.timeline.base_time,
            pause_list = %self.config.pause_list,
            "🚀 federate executive initialized"
        );
        Ok(())
    }

    /// Next time-advance request: granted + lookahead.
    ///
    /// # Errors
    /// [`SyncError::Time`] on logical time overflow.
    pub fn pre_advance(&self) -> SyncResult<Int64Time> {
        Ok(self.granted.checked_add(self.lookahead)?)
    }

    /// Record a grant, evaluate sync points at the new time and refresh the
    /// pause state. Returns labels that became ACHIEVED.
    ///
    /// # Errors
    /// [`SyncError::NonMonotonicGrant`] if `granted` precedes the current
    /// grant; nothing changes.
    pub fn post_advance(&mut self, granted: Int64Time) -> SyncResult<Vec<String>> {
        if granted < self.granted {
            return Err(SyncError::NonMonotonicGrant {
                current: self.granted.base_time(),
                granted: granted.base_time(),
            });
        }
        self.granted = granted;
        let achieved = self.sync.update(granted);
        let state = self.pause.check_state(&self.sync);
        debug!(
            granted = %granted.display_in(self.config.timeline.base_time),
            pause = %state,
            achieved = achieved.len(),
            "time advance granted"
        );
        Ok(achieved)
    }

    /// Add a timed pause point at `time` and register it.
    ///
    /// # Errors
    /// Anything [`SyncPntManager::add_timed_sync_point`] or
    /// [`SyncPntManager::register_sync_point`] returns.
    pub fn add_pause_point(&mut self, label: &str, time: Int64Time) -> SyncResult<bool> {
        self.sync.add_timed_sync_point(label, &self.config.pause_list, time)?;
        self.sync.register_sync_point(label)
    }

    /// Clear an achieved pause point and apply its command.
    pub fn clear_pause_point(&mut self, label: &str) -> bool {
        self.pause.clear_sync_point(&mut self.sync, label)
    }

    /// Leave Freeze once every achieved pause point was cleared.
    pub fn resume(&mut self) -> bool {
        self.pause.resume(&self.sync)
    }

    /// Replace rendezvous state from a checkpoint and resume at `granted`.
    /// Returns labels that became ACHIEVED at `granted`, as
    /// [`post_advance`](Self::post_advance) does.
    ///
    /// # Errors
    /// Anything [`SyncPntManager::restore`] returns.
    pub fn restore(&mut self, checkpoint: &SyncPntCheckpoint, granted: Int64Time) -> SyncResult<Vec<String>> {
        self.sync.restore(checkpoint)?;
        self.granted = granted;
        let achieved = self.sync.update(granted);
        let state = self.pause.check_state(&self.sync);
        info!(
            granted = %granted.display_in(self.config.timeline.base_time),
            points = self.sync.len(),
            pause = %state,
            achieved = achieved.len(),
            "♻️ rendezvous state restored"
        );
        Ok(achieved)
    }

    /// Withdraw from every pending rendezvous and return the final
    /// checkpoint.
    pub fn shutdown(&mut self) -> SyncPntCheckpoint {
        let pending: Vec<String> = self
            .sync
            .iter()
            .filter(|(_, point)| point.state().is_pending())
            .map(|(_, point)| point.label().to_owned())
            .collect();
        for label in pending {
            if let Err(e) = self.sync.abandon_sync_point(&label, "federate shutdown") {
                warn!(label = %label, error = %e, "could not withdraw from rendezvous");
            }
        }
        self.phase = ExecutivePhase::Shutdown;
        info!(
            granted = %self.granted.display_in(self.config.timeline.base_time),
            points = self.sync.len(),
            "🛑 federate executive shut down"
        );
        self.sync.checkpoint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fedtime_core::BaseTime;
    use crate::domain::pause::PausePointState;
    use crate::domain::rendezvous::{FederateHandleSet, RtiError};
    use crate::domain::sync::SyncPntState;
    use crate::domain::timeline::{ManualClock, Timeline};

    #[derive(Default)]
    struct CountingRti {
        abandoned: usize,
    }

    impl RtiAmbassador for CountingRti {
        fn register_sync_point(&mut self, _: &str, _: &[u8], _: Option<&FederateHandleSet>) -> Result<(), RtiError> {
            Ok(())
        }

        fn achieve_sync_point(&mut self, _: &str) -> Result<(), RtiError> {
            Ok(())
        }

        fn abandon_sync_point(&mut self, _: &str, _: &str) -> Result<(), RtiError> {
            self.abandoned += 1;
            Ok(())
        }
    }

    fn config() -> ExecutiveConfig {
        ExecutiveConfig {
            timeline: TimelineConfig {
                scenario_epoch: 100.0,
                sim_offset: 5.0,
                ..TimelineConfig::default()
            },
            lookahead: 0.5,
            ..ExecutiveConfig::default()
        }
    }

    #[test]
    fn test_scenario_view() {
        let clock = ManualClock::starting_at(10.0);
        let exec = FederateExecutive::new(config(), &clock, CountingRti::default()).unwrap();
        assert_eq!(exec.scenario_timeline().get_time(), 115.0);
        assert_eq!(exec.scenario_timeline().compute_simulation_time(115.0), 10.0);
        clock.advance(1.0);
        assert_eq!(exec.scenario_timeline().get_time(), 116.0);
    }

    #[test]
    fn test_advance_cycle() {
        let mut exec = FederateExecutive::new(config(), ManualClock::new(), CountingRti::default()).unwrap();
        exec.initialize().unwrap();
        assert_eq!(exec.phase(), ExecutivePhase::Running);
        assert_eq!(exec.pause().state(), &PausePointState::Run);

        let request = exec.pre_advance().unwrap();
        assert_eq!(request.base_time(), 500_000);
        assert!(exec.post_advance(request).unwrap().is_empty());
        assert_eq!(exec.granted(), request);
        assert_eq!(exec.pre_advance().unwrap().base_time(), 1_000_000);
    }

    #[test]
    fn test_grant_must_not_go_backwards() {
        let mut exec = FederateExecutive::new(config(), ManualClock::new(), CountingRti::default()).unwrap();
        exec.initialize().unwrap();
        exec.post_advance(Int64Time::from_base_time(10)).unwrap();
        let err = exec.post_advance(Int64Time::from_base_time(5)).unwrap_err();
        assert!(matches!(err, SyncError::NonMonotonicGrant { current: 10, granted: 5 }));
        assert_eq!(exec.granted().base_time(), 10);
    }

    #[test]
    fn test_negative_lookahead_rejected() {
        let config = ExecutiveConfig {
            lookahead: -1.0,
            ..ExecutiveConfig::default()
        };
        let err = FederateExecutive::new(config, ManualClock::new(), CountingRti::default())
            .err()
            .unwrap();
        assert!(matches!(err, SyncError::Time(TimeError::Range { .. })));
    }

    #[test]
    fn test_pause_point_freezes_at_grant() {
        let mut exec = FederateExecutive::new(config(), ManualClock::new(), CountingRti::default()).unwrap();
        exec.initialize().unwrap();
        let at = Int64Time::from_base_time(1_000_000);
        assert!(exec.add_pause_point("hold", at).unwrap());
        exec.sync_mut().on_announced("hold", &at.to_tag()).unwrap();
        exec.sync_mut().achieve_sync_point("hold").unwrap();
        exec.sync_mut().on_federation_synchronized("hold").unwrap();

        assert!(exec.post_advance(Int64Time::from_base_time(500_000)).unwrap().is_empty());
        assert!(!exec.is_frozen());
        assert_eq!(exec.post_advance(at).unwrap(), ["hold"]);
        assert!(exec.is_frozen());

        assert!(exec.clear_pause_point("hold"));
        assert!(exec.resume());
        assert!(!exec.is_frozen());
    }

    #[test]
    fn test_shutdown_withdraws_pending() {
        let mut exec = FederateExecutive::new(config(), ManualClock::new(), CountingRti::default()).unwrap();
        exec.initialize().unwrap();
        exec.sync_mut().add_sync_point("a", "mtr").unwrap();
        exec.sync_mut().register_sync_point("a").unwrap();
        exec.sync_mut().add_sync_point("b", "mtr").unwrap();

        let checkpoint = exec.shutdown();
        assert_eq!(exec.phase(), ExecutivePhase::Shutdown);
        assert_eq!(exec.sync().rti().abandoned, 1);
        assert_eq!(exec.sync().state_of("a"), Some(SyncPntState::Error));
        assert_eq!(checkpoint.record_count(), 2);
    }

    #[test]
    fn test_restore_resumes_at_grant() {
        let mut source = FederateExecutive::new(config(), ManualClock::new(), CountingRti::default()).unwrap();
        source.initialize().unwrap();
        source
            .sync_mut()
            .add_timed_sync_point("FREEZE", "mtr", Int64Time::from_base_time(50))
            .unwrap();
        let checkpoint = source.sync().checkpoint();

        let mut restored = FederateExecutive::new(config(), ManualClock::new(), CountingRti::default()).unwrap();
        restored.initialize().unwrap();
        let achieved = restored.restore(&checkpoint, Int64Time::from_base_time(40)).unwrap();
        assert!(achieved.is_empty(), "federation confirmations are not persisted");
        assert_eq!(restored.granted().base_time(), 40);
        assert_eq!(restored.sync().now().base_time(), 40);
        assert_eq!(
            restored.sync().get_sync_point("FREEZE").unwrap().freeze_time(),
            Some(Int64Time::from_base_time(50))
        );
    }

    #[test]
    fn test_config_from_json() {
        let config: ExecutiveConfig = serde_json::from_str(
            r#"{ "timeline": { "scenario_epoch": 100.0 }, "lookahead": 1.0 }"#,
        )
        .unwrap();
        assert_eq!(config.timeline.scenario_epoch, 100.0);
        assert_eq!(config.lookahead, 1.0);
        assert_eq!(config.pause_list, DEFAULT_PAUSE_LIST);
    }

    #[test]
    fn test_pause_point_renders_at_configured_base() {
        let config = ExecutiveConfig {
            timeline: TimelineConfig {
                base_time: BaseTime::Milliseconds,
                ..TimelineConfig::default()
            },
            ..ExecutiveConfig::default()
        };
        let mut exec = FederateExecutive::new(config, ManualClock::new(), CountingRti::default()).unwrap();
        exec.initialize().unwrap();
        assert_eq!(exec.lookahead().display_in(BaseTime::Milliseconds).to_string(), "0.25");

        let at = Int64Time::from_seconds_in(2.0, BaseTime::Milliseconds).unwrap();
        assert_eq!(at.base_time(), 2_000);
        exec.add_pause_point("FREEZE", at).unwrap();
        assert_eq!(exec.sync().base_time(), BaseTime::Milliseconds);
        assert!(exec.sync().summary().contains("[FREEZE/2] -- SYNC_PT_STATE_REGISTERED"));

        let checkpoint = exec.sync().checkpoint();
        exec.restore(&checkpoint, Int64Time::ZERO).unwrap();
        assert_eq!(exec.sync().get_sync_point("FREEZE").unwrap().to_string(), "[FREEZE/2] -- SYNC_PT_STATE_REGISTERED");
    }
}
