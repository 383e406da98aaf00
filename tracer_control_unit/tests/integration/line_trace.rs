//! Integration test: steady-state PD line following on the scripted bench.

use tracer_common::hal::types::Reading;
use tracer_control_unit::control::speed::WheelPowers;
use tracer_control_unit::diagnostics::DiagnosticEvent;
use tracer_control_unit::tick::TickOutcome;

use super::{LINE, rig, skip_config};

#[test]
fn on_target_drives_straight_at_base_speed() {
    let (mut t, h, _sink) = rig(skip_config());
    assert_eq!(t.tick(), TickOutcome::AlignmentCompleted);

    for _ in 0..10 {
        let TickOutcome::Traced(s) = t.tick() else {
            panic!("expected line trace");
        };
        assert_eq!(s.error, 0);
        assert_eq!(s.turn, 0.0);
        assert_eq!(s.speed, 50);
        assert_eq!(s.powers, WheelPowers::even(50));
    }
    assert_eq!(h.left.history(), vec![50; 10]);
    assert_eq!(h.right.history(), vec![50; 10]);
}

#[test]
fn constant_error_settles_into_gentle_band() {
    let (mut t, h, _sink) = rig(skip_config());
    t.tick();
    h.sensor.push_all([Reading::new(35, LINE.rgb); 3]);

    let mut turns = Vec::new();
    let mut speeds = Vec::new();
    for _ in 0..3 {
        let TickOutcome::Traced(s) = t.tick() else {
            panic!("expected line trace");
        };
        turns.push(s.turn);
        speeds.push(s.speed);
    }

    // First tick carries the derivative kick from a zero previous error.
    assert!((turns[0] - 10.0).abs() < 1e-9);
    assert!((turns[1] - 8.0).abs() < 1e-9);
    assert!((turns[2] - 8.0).abs() < 1e-9);
    assert_eq!(speeds, vec![35, 50, 50]);
    assert_eq!(h.left.power(), 42);
    assert_eq!(h.right.power(), 58);
}

#[test]
fn sharp_error_drops_to_minimum_speed() {
    let (mut t, h, _sink) = rig(skip_config());
    t.tick();
    h.sensor.push(Reading::new(60, LINE.rgb));

    let TickOutcome::Traced(s) = t.tick() else {
        panic!("expected line trace");
    };
    // 0.8 * 35 + 0.2 * 35
    assert!((s.turn - 35.0).abs() < 1e-9);
    assert_eq!(s.speed, 25);
    assert_eq!(s.powers, WheelPowers { left: -10, right: 60 });
}

#[test]
fn out_of_range_reflectance_is_clamped() {
    let (mut t, h, _sink) = rig(skip_config());
    t.tick();
    h.sensor.push(Reading::new(250, LINE.rgb));

    let TickOutcome::Traced(s) = t.tick() else {
        panic!("expected line trace");
    };
    assert_eq!(s.error, 75);
}

#[test]
fn sensor_fault_stops_wheels_and_recovers() {
    let (mut t, h, sink) = rig(skip_config());
    t.tick();
    assert!(matches!(t.tick(), TickOutcome::Traced(_)));

    h.sensor.push_fault();
    h.sensor.push(LINE);
    assert_eq!(t.tick(), TickOutcome::SensorFault);
    assert_eq!(h.left.power(), 0);
    assert_eq!(h.right.power(), 0);
    assert_eq!(
        sink.count(|e| matches!(e, DiagnosticEvent::SensorFault { .. })),
        1
    );

    assert!(matches!(t.tick(), TickOutcome::Traced(_)));
    assert_eq!(h.left.power(), 50);
}
