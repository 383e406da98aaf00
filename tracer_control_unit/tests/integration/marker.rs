//! Integration test: blue-marker detection and the maneuver table.
//!
//! Validates: every detection runs the maneuver registered for its count,
//! slow mode latches on the first detection, tracking re-arms after each
//! maneuver, and the fallback entry halts the robot for good.

use tracer_common::tracer::maneuver::{ManeuverStep, MoveCommand};
use tracer_common::tracer::state::MarkerPhase;
use tracer_control_unit::config::load_config_from_str;
use tracer_control_unit::control::speed::WheelPowers;
use tracer_control_unit::diagnostics::DiagnosticEvent;
use tracer_control_unit::state::marker::MarkerOutcome;
use tracer_control_unit::tick::TickOutcome;

use super::{BLACK, BLUE, LINE, rig, skip_config};

const RACE_R_TOML: &str = include_str!("../../../config/tracer_race_r.toml");

fn marker(count: u32, halted: bool) -> TickOutcome {
    TickOutcome::Marker(MarkerOutcome { count, halted })
}

#[test]
fn first_marker_runs_table_entry_and_engages_slow_mode() {
    let (mut t, h, sink) = rig(skip_config());
    t.tick();
    h.sensor.push_all([BLUE, LINE]);

    assert_eq!(t.tick(), marker(1, false));
    assert_eq!(t.state().base_speed, 30);
    assert_eq!(t.state().marker_phase, MarkerPhase::Idle);
    assert!(t.state().line_trace_enabled);
    assert!(t.state().blue_detection_enabled);

    // straight 20, right 3 @ 6, straight 14 at slow speed
    assert_eq!(h.left.history(), vec![30, 0, 30, 0, 30, 0]);
    assert_eq!(h.right.history(), vec![30, 0, 8, 0, 30, 0]);
    assert_eq!(
        sink.count(|e| matches!(e, DiagnosticEvent::MoveFinished { reached: true, .. })),
        3
    );

    // Slow mode persists for the rest of the run.
    let TickOutcome::Traced(s) = t.tick() else {
        panic!("expected line trace");
    };
    assert_eq!(s.powers, WheelPowers::even(30));
}

#[test]
fn default_table_end_to_end() {
    let (mut t, h, sink) = rig(skip_config());
    t.tick();
    h.sensor.push_all([
        BLUE, LINE, // 1
        BLUE, LINE, // 2
        BLUE, LINE, // 3
        BLUE, BLACK, LINE, // 4: the creep consumes the black frame
        BLUE, LINE, // 5: ignored
        BLUE, // 6: fallback
    ]);

    for count in 1..=5 {
        assert_eq!(t.tick(), marker(count, false), "marker {count}");
        assert!(matches!(t.tick(), TickOutcome::Traced(_)), "after {count}");
    }
    assert_eq!(t.tick(), marker(6, true));
    assert_eq!(t.state().marker_phase, MarkerPhase::Halted);
    assert!(!t.state().line_trace_enabled);
    assert!(!t.state().blue_detection_enabled);

    h.left.clear_history();
    let reads = h.sensor.reads();
    for _ in 0..5 {
        assert_eq!(t.tick(), TickOutcome::Stopped);
    }
    assert_eq!(h.left.history(), vec![0; 5]);
    assert_eq!(h.sensor.reads(), reads);

    assert_eq!(
        sink.count(|e| matches!(e, DiagnosticEvent::CreepFinished { found: true, .. })),
        1
    );
    assert_eq!(
        sink.count(|e| matches!(e, DiagnosticEvent::SlowModeEngaged { .. })),
        1
    );
    assert_eq!(
        sink.count(|e| matches!(e, DiagnosticEvent::MoveFinished { reached: false, .. })),
        0
    );
    assert_eq!(t.state().blue_detection_count, 6);
}

#[test]
fn maneuver_runs_between_detection_and_rearm() {
    let (mut t, h, sink) = rig(skip_config());
    t.tick();
    h.sensor.push_all([BLUE, LINE]);
    t.tick();

    let events = sink.events();
    let detected = events
        .iter()
        .position(|e| *e == DiagnosticEvent::MarkerDetected { count: 1 })
        .unwrap();
    let finished = events
        .iter()
        .position(|e| {
            *e == DiagnosticEvent::ManeuverFinished {
                count: 1,
                halted: false,
            }
        })
        .unwrap();
    let moves = events[detected..finished]
        .iter()
        .filter(|e| matches!(e, DiagnosticEvent::MoveFinished { .. }))
        .count();
    assert_eq!(moves, 3);
    assert!(t.state().blue_detection_enabled);
}

#[test]
fn reset_clears_halt() {
    let mut cfg = skip_config();
    cfg.maneuvers.occurrence.clear();
    let (mut t, h, _sink) = rig(cfg);
    t.tick();
    h.sensor.push_all([BLUE, LINE]);

    assert_eq!(t.tick(), marker(1, true));
    assert_eq!(t.tick(), TickOutcome::Stopped);

    t.reset();
    assert_eq!(t.tick(), TickOutcome::AlignmentCompleted);
    assert!(matches!(t.tick(), TickOutcome::Traced(_)));
    assert_eq!(t.state().blue_detection_count, 0);
    assert_eq!(t.state().base_speed, 50);
}

#[test]
fn race_r_table_parses_and_runs() {
    let mut cfg = load_config_from_str(RACE_R_TOML).unwrap();
    cfg.drive.poll_interval_us = 0;
    assert_eq!(cfg.shared.service_name, "tracer-race-r");
    assert_eq!(cfg.maneuvers.lookup(2).steps[1], ManeuverStep::CompleteStop);
    assert_eq!(
        cfg.maneuvers.lookup(1).steps[0],
        ManeuverStep::Move(MoveCommand::straight(13.0))
    );

    let (mut t, h, _sink) = rig(cfg);
    assert_eq!(t.tick(), TickOutcome::AlignmentCompleted);
    h.sensor.push_all([BLUE, LINE, BLUE, LINE]);

    assert_eq!(t.tick(), marker(1, false));
    assert!(matches!(t.tick(), TickOutcome::Traced(_)));

    h.left.clear_history();
    h.right.clear_history();
    assert_eq!(t.tick(), marker(2, true));

    // The move after the first complete stop still runs.
    assert_eq!(h.left.history(), vec![30, 0, 0, 5, 0, 0]);
    assert_eq!(h.right.history(), vec![21, 0, 0, 30, 0, 0]);
    assert_eq!(t.tick(), TickOutcome::Stopped);
}
