//! Rendezvous Integration Tests
//!
//! Several federates' executives joined to one loopback federation, driven
//! frame by frame the way a host scheduler would.

use fedtime_core::{BaseTime, Int64Time};
use fedtime_sync::adapters::{deliver_callbacks, LoopbackFederation, LoopbackRti};
use fedtime_sync::{
    Conversion, ExecutiveConfig, FederateExecutive, LoggableRecord, ManualClock, PausePointState, SyncError, SyncPnt,
    SyncPntState, SyncPoint, TimedSyncPnt, DEFAULT_PAUSE_LIST, UNKNOWN_SYNC_PNT_LIST,
};

type Federate = FederateExecutive<ManualClock, LoopbackRti>;

fn federation(n: usize) -> (LoopbackFederation, Vec<Federate>) {
    let federation = LoopbackFederation::new();
    let federates = (0..n)
        .map(|_| {
            let mut exec =
                FederateExecutive::new(ExecutiveConfig::default(), ManualClock::new(), federation.join()).unwrap();
            exec.initialize().unwrap();
            exec
        })
        .collect();
    (federation, federates)
}

fn pump(federates: &mut [Federate]) {
    for exec in federates.iter_mut() {
        let errors = deliver_callbacks(exec.sync_mut());
        assert!(errors.is_empty(), "{errors:?}");
    }
}

fn advance_all(federates: &mut [Federate], ticks: i64) -> Vec<Vec<String>> {
    federates
        .iter_mut()
        .map(|exec| exec.post_advance(Int64Time::from_base_time(ticks)).unwrap())
        .collect()
}

/// Every federate knows the pause point; the first one registers it.
fn schedule_freeze(federates: &mut [Federate], at: Int64Time) {
    let (first, rest) = federates.split_first_mut().unwrap();
    assert!(first.add_pause_point("FREEZE", at).unwrap());
    for exec in rest {
        exec.sync_mut().add_timed_sync_point("FREEZE", DEFAULT_PAUSE_LIST, at).unwrap();
    }
    pump(federates);
}

mod freeze_tests {
    use super::*;

    #[test]
    fn test_freeze_waits_for_freeze_time() {
        let (federation, mut federates) = federation(3);
        let freeze = Int64Time::from_base_time(50);
        schedule_freeze(&mut federates, freeze);
        for exec in &federates {
            assert_eq!(exec.sync().state_of("FREEZE"), Some(SyncPntState::Announced));
        }

        advance_all(&mut federates, 40);
        for exec in federates.iter_mut() {
            assert!(exec.sync_mut().achieve_sync_point("FREEZE").unwrap());
        }
        pump(&mut federates);
        assert!(!federation.is_pending("FREEZE"));

        for exec in &federates {
            let point = exec.sync().get_sync_point("FREEZE").unwrap();
            assert!(point.base().is_federation_synchronized());
            assert_eq!(point.state(), SyncPntState::Announced);
            assert!(!exec.is_frozen());
        }

        assert!(advance_all(&mut federates, 45).iter().all(Vec::is_empty));
        for achieved in advance_all(&mut federates, 50) {
            assert_eq!(achieved, ["FREEZE"]);
        }
        for achieved in advance_all(&mut federates, 60) {
            assert!(achieved.is_empty());
        }
        for exec in &federates {
            assert_eq!(exec.sync().state_of("FREEZE"), Some(SyncPntState::Achieved));
            assert!(exec.is_frozen());
        }
    }

    #[test]
    fn test_freeze_needs_every_federate() {
        let (federation, mut federates) = federation(3);
        schedule_freeze(&mut federates, Int64Time::from_base_time(50));

        advance_all(&mut federates, 40);
        federates[0].sync_mut().achieve_sync_point("FREEZE").unwrap();
        federates[1].sync_mut().achieve_sync_point("FREEZE").unwrap();
        pump(&mut federates);

        assert!(advance_all(&mut federates, 55).iter().all(Vec::is_empty));
        assert!(federation.is_pending("FREEZE"));

        federates[2].sync_mut().achieve_sync_point("FREEZE").unwrap();
        pump(&mut federates);
        for achieved in advance_all(&mut federates, 55) {
            assert_eq!(achieved, ["FREEZE"]);
        }
    }

    #[test]
    fn test_clear_and_resume() {
        let (_federation, mut federates) = federation(2);
        schedule_freeze(&mut federates, Int64Time::from_base_time(10));
        for exec in federates.iter_mut() {
            exec.sync_mut().achieve_sync_point("FREEZE").unwrap();
        }
        pump(&mut federates);
        advance_all(&mut federates, 10);

        for exec in federates.iter_mut() {
            assert!(exec.is_frozen());
            assert!(exec.clear_pause_point("FREEZE"));
            assert!(exec.resume());
            assert_eq!(exec.pause().state(), &PausePointState::Run);
            assert!(!exec.sync().contains_sync_point("FREEZE"));
        }
    }

    #[test]
    fn test_stop_point_ends_execution() {
        let (_federation, mut federates) = federation(2);
        let at = Int64Time::from_base_time(5);
        let (first, rest) = federates.split_first_mut().unwrap();
        first.add_pause_point("stop_mission", at).unwrap();
        rest[0]
            .sync_mut()
            .add_timed_sync_point("stop_mission", DEFAULT_PAUSE_LIST, at)
            .unwrap();
        pump(&mut federates);
        for exec in federates.iter_mut() {
            exec.sync_mut().achieve_sync_point("stop_mission").unwrap();
        }
        pump(&mut federates);
        advance_all(&mut federates, 5);

        for exec in federates.iter_mut() {
            assert!(exec.clear_pause_point("stop_mission"));
            assert_eq!(exec.pause().state(), &PausePointState::Exit);
            assert!(!exec.resume());
        }
    }
}

mod state_machine_tests {
    use super::*;

    fn rank(state: SyncPntState) -> i32 {
        state.code()
    }

    fn observe(federates: &[Federate], history: &mut [Vec<SyncPntState>]) {
        for (exec, seen) in federates.iter().zip(history.iter_mut()) {
            if let Some(state) = exec.sync().state_of("FREEZE") {
                seen.push(state);
            }
        }
    }

    #[test]
    fn test_observed_states_never_go_backwards() {
        let (_federation, mut federates) = federation(3);
        let mut history: Vec<Vec<SyncPntState>> = vec![Vec::new(); 3];

        federates[0]
            .sync_mut()
            .add_timed_sync_point("FREEZE", DEFAULT_PAUSE_LIST, Int64Time::from_base_time(30))
            .unwrap();
        observe(&federates, &mut history);
        federates[0].sync_mut().register_sync_point("FREEZE").unwrap();
        observe(&federates, &mut history);
        pump(&mut federates);
        observe(&federates, &mut history);
        for tick in [10, 20, 30, 40] {
            for exec in federates.iter_mut() {
                if exec.sync().state_of("FREEZE") == Some(SyncPntState::Announced) {
                    exec.sync_mut().achieve_sync_point("FREEZE").unwrap();
                }
            }
            pump(&mut federates);
            advance_all(&mut federates, tick);
            observe(&federates, &mut history);
        }

        for seen in &history {
            assert!(seen.windows(2).all(|w| rank(w[0]) <= rank(w[1])), "{seen:?}");
            assert_eq!(seen.last(), Some(&SyncPntState::Achieved));
            let first_achieved = seen.iter().position(|s| *s == SyncPntState::Achieved).unwrap();
            assert!(seen[..first_achieved].contains(&SyncPntState::Announced));
        }
        assert_eq!(history[0][0], SyncPntState::Exists);
        assert_eq!(history[1][0], SyncPntState::Announced);
    }

    #[test]
    fn test_duplicate_announce_does_not_reannounce() {
        let (_federation, mut federates) = federation(2);
        federates[0].sync_mut().add_sync_point("mtr_start", "MTR").unwrap();
        federates[0].sync_mut().register_sync_point("mtr_start").unwrap();
        pump(&mut federates);

        federates[1].sync_mut().achieve_sync_point("mtr_start").unwrap();
        federates[1].sync_mut().on_announced("mtr_start", &[]).unwrap();
        let point = federates[1].sync().get_sync_point("mtr_start").unwrap();
        assert_eq!(point.state(), SyncPntState::Announced);
        assert!(point.base().achieve_requested());
        assert_eq!(federates[1].sync().list_of("mtr_start"), Some(UNKNOWN_SYNC_PNT_LIST));
    }

    #[test]
    fn test_conflicting_kinds_fail_the_point() {
        let (federation, mut federates) = federation(2);
        federates[0].sync_mut().add_sync_point("init", "MTR").unwrap();
        federates[1]
            .sync_mut()
            .add_timed_sync_point("init", "MTR", Int64Time::from_base_time(100))
            .unwrap();
        federates[0].sync_mut().register_sync_point("init").unwrap();

        let errors = deliver_callbacks(federates[1].sync_mut());
        assert!(matches!(errors.as_slice(), [SyncError::RegistrationConflict { .. }]));
        assert_eq!(federates[1].sync().state_of("init"), Some(SyncPntState::Error));

        pump(&mut federates[..1]);
        federates[0].sync_mut().achieve_sync_point("init").unwrap();
        pump(&mut federates[..1]);
        assert!(federates[0].sync().is_sync_point_achieved("init"));
        assert!(!federation.is_pending("init"));
    }
}

mod lossy_copy_tests {
    use super::*;

    #[test]
    fn test_plain_into_timed_record_leaves_time_unset() {
        let mut point = SyncPnt::new("mtr_start");
        point.register().unwrap();
        let mut target = LoggableRecord::timed();
        assert!(point.convert(&mut target).is_exact());
        assert_eq!(target.time(), Some(0));
        assert_eq!(target.state().unwrap(), SyncPntState::Registered);
        assert_eq!(target.label().unwrap(), "mtr_start");
    }

    #[test]
    fn test_timed_into_plain_record_degrades() {
        let point = TimedSyncPnt::new("FREEZE", Int64Time::from_base_time(50));
        let mut target = LoggableRecord::plain();
        let outcome = point.convert(&mut target);
        assert!(matches!(
            outcome,
            Conversion::Degraded(SyncError::ConversionMismatch { .. })
        ));
        assert_eq!(target.label().unwrap(), "FREEZE");
        assert_eq!(target.state().unwrap(), SyncPntState::Exists);
        assert_eq!(target.time(), None);
    }

    #[test]
    fn test_record_round_trip_keeps_kind() {
        let timed = SyncPoint::from(TimedSyncPnt::new("FREEZE", Int64Time::from_base_time(50)));
        let plain = SyncPoint::from(SyncPnt::new("mtr_start"));
        for point in [timed, plain] {
            let back = SyncPoint::from_record(&point.to_record(), BaseTime::default()).unwrap();
            assert_eq!(back.is_timed(), point.is_timed());
            assert_eq!(back.freeze_time(), point.freeze_time());
            assert_eq!(back.label(), point.label());
        }
    }
}
