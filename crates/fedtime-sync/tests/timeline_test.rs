//! Timeline Integration Tests
//!
//! Conversions between scenario time, simulation time and logical time
//! through the public API, against both clock backends.

use fedtime_core::{BaseTime, Int64Interval, Int64Time};
use fedtime_sync::{ManualClock, ScenarioTimeline, SimTimeline, Timeline, TimelineConfig, WallClock};

mod scenario_tests {
    use super::*;

    #[test]
    fn test_scenario_time_from_sim_time() {
        let sim = SimTimeline::new(ManualClock::starting_at(10.0));
        let scenario = ScenarioTimeline::new(&sim, 100.0, 5.0);
        assert_eq!(scenario.get_time(), 115.0);
    }

    #[test]
    fn test_sim_time_from_scenario_time() {
        let sim = SimTimeline::new(ManualClock::starting_at(10.0));
        let scenario = ScenarioTimeline::new(&sim, 100.0, 5.0);
        assert_eq!(scenario.compute_simulation_time(115.0), 10.0);
        assert_eq!(scenario.time_from_simulation_time(10.0), 115.0);
    }

    #[test]
    fn test_views_follow_the_clock() {
        let clock = ManualClock::new();
        let sim = SimTimeline::new(&clock);
        let scenario = ScenarioTimeline::new(&sim, 100.0, 5.0);
        for frame in 1..=10 {
            clock.advance(0.5);
            assert_eq!(scenario.get_time(), 105.0 + 0.5 * f64::from(frame));
        }
    }

    #[test]
    fn test_several_views_share_one_sim_timeline() {
        let sim = SimTimeline::new(ManualClock::starting_at(2.0));
        let a = ScenarioTimeline::new(&sim, 0.0, 0.0);
        let b = ScenarioTimeline::new(&sim, 1_000.0, -10.0);
        assert_eq!(a.get_time(), 2.0);
        assert_eq!(b.get_time(), 992.0);
    }
}

mod inverse_law_tests {
    use super::*;

    #[test]
    fn test_simulation_time_inverse_on_frame_grid() {
        let sim = SimTimeline::new(ManualClock::new());
        let scenario = ScenarioTimeline::new(&sim, 100.0, 5.0);
        for step in -64_000..64_000_i32 {
            if step % 37 != 0 {
                continue;
            }
            let x = f64::from(step) / 64.0;
            let back = scenario.time_from_simulation_time(scenario.compute_simulation_time(x));
            assert_eq!(back, x, "scenario time {x}");
        }
    }

    #[test]
    fn test_hlt_inverse_within_one_tick() {
        let sim = SimTimeline::new(ManualClock::new());
        for base in [BaseTime::Milliseconds, BaseTime::Microseconds, BaseTime::Nanoseconds] {
            let scenario = ScenarioTimeline::new(&sim, 100.0, 5.0)
                .with_base_time(base)
                .with_hlt_offset(Int64Interval::from_seconds_in(2.0, base).unwrap());
            for x in [100.0, 115.0, 115.123_456_789, 250.000_000_4, 1_234.5678, 99.999_999] {
                let hlt = scenario.compute_hlt(x).unwrap();
                let back = scenario.time_from_hlt(hlt);
                assert!(
                    (back - x).abs() <= base.resolution(),
                    "{x} -> {hlt:?} -> {back} at {base}"
                );
            }
        }
    }

    #[test]
    fn test_hlt_offset_shifts_logical_time() {
        let sim = SimTimeline::new(ManualClock::new());
        let scenario =
            ScenarioTimeline::new(&sim, 100.0, 0.0).with_hlt_offset(Int64Interval::from_seconds(10.0).unwrap());
        assert_eq!(scenario.compute_hlt(115.0).unwrap(), Int64Time::from_seconds(5.0).unwrap());
        assert_eq!(scenario.time_from_hlt(Int64Time::from_seconds(5.0).unwrap()), 115.0);
    }
}

mod config_tests {
    use super::*;

    #[test]
    fn test_timeline_from_json_config() {
        let config: TimelineConfig = serde_json::from_str(
            r#"{ "scenario_epoch": 100.0, "sim_offset": 5.0, "hlt_offset": 0.5, "base_time": "milliseconds" }"#,
        )
        .unwrap();
        let sim = SimTimeline::with_epoch(ManualClock::starting_at(10.0), config.sim_epoch);
        let scenario = ScenarioTimeline::from_config(&sim, &config).unwrap();

        assert_eq!(scenario.get_time(), 115.0);
        assert_eq!(scenario.base_time(), BaseTime::Milliseconds);
        assert_eq!(scenario.current_hlt().unwrap().base_time(), 14_500);
    }

    #[test]
    fn test_unrepresentable_offset_rejected() {
        let config = TimelineConfig {
            hlt_offset: 1e300,
            ..TimelineConfig::default()
        };
        let sim = SimTimeline::new(ManualClock::new());
        assert!(ScenarioTimeline::from_config(&sim, &config).unwrap_err().is_range());
    }
}

mod wall_clock_tests {
    use super::*;

    #[test]
    fn test_frozen_wall_clock_holds_scenario_time() {
        let clock = WallClock::frozen();
        let sim = SimTimeline::new(&clock);
        let scenario = ScenarioTimeline::new(&sim, 100.0, 5.0);
        let before = scenario.get_time();
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert_eq!(scenario.get_time(), before);
        assert_eq!(before, 105.0);
    }

    #[test]
    fn test_running_wall_clock_moves_forward() {
        let clock = WallClock::new();
        let sim = SimTimeline::new(&clock);
        let first = sim.get_time();
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(sim.get_time() > first);
    }
}
