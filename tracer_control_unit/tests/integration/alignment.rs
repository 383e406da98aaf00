//! Integration test: choreographed startup alignment through the tick.

use tracer_common::tracer::config::TracerConfig;
use tracer_common::tracer::state::AlignmentStep;
use tracer_control_unit::diagnostics::DiagnosticEvent;
use tracer_control_unit::tick::TickOutcome;

use super::{BLACK, BLUE, LINE, rig};

fn choreographed() -> TracerConfig {
    let mut cfg = TracerConfig::default();
    cfg.drive.poll_interval_us = 0;
    cfg
}

#[test]
fn sequence_reaches_await_black_on_schedule() {
    let (mut t, h, sink) = rig(choreographed());

    let mut ticks = 0;
    let mut seen = Vec::new();
    loop {
        ticks += 1;
        let TickOutcome::Aligning(step) = t.tick() else {
            panic!("alignment left early at tick {ticks}");
        };
        if seen.last() != Some(&step) {
            seen.push(step);
        }
        if step == AlignmentStep::AwaitBlack {
            break;
        }
        assert!(ticks < 100, "stuck in {step:?}");
    }

    // 20 forward + stop, 5 settle, two moves, 5 settle, one move
    assert_eq!(ticks, 36);
    assert_eq!(
        seen,
        vec![
            AlignmentStep::ForwardTimed,
            AlignmentStep::Settle1,
            AlignmentStep::CurveRight,
            AlignmentStep::Straight,
            AlignmentStep::Settle2,
            AlignmentStep::CurveLeft,
            AlignmentStep::AwaitBlack,
        ]
    );
    assert_eq!(h.sensor.reads(), 0);
    assert_eq!(
        sink.count(|e| matches!(e, DiagnosticEvent::MoveFinished { reached: true, .. })),
        3
    );
}

#[test]
fn await_black_never_completes_without_black() {
    let (mut t, h, sink) = rig(choreographed());
    while t.tick() != TickOutcome::Aligning(AlignmentStep::AwaitBlack) {}

    for _ in 0..500 {
        assert_eq!(t.tick(), TickOutcome::Aligning(AlignmentStep::AwaitBlack));
    }
    assert!(!t.state().alignment.completed);
    assert!(!t.state().line_trace_enabled);
    assert_eq!(h.left.power(), 30);
    assert_eq!(h.right.power(), 30);
    assert_eq!(
        sink.count(|e| matches!(e, DiagnosticEvent::AlignmentCompleted { .. })),
        0
    );

    h.sensor.push_all([BLACK, LINE]);
    assert_eq!(t.tick(), TickOutcome::AlignmentCompleted);
    assert_eq!(h.left.power(), 0);
    assert_eq!(h.right.power(), 0);
    assert_eq!(
        sink.count(|e| matches!(e, DiagnosticEvent::AlignmentStep { .. })),
        7
    );

    // Steady state resumes at the default speed on the next tick.
    let TickOutcome::Traced(s) = t.tick() else {
        panic!("expected line trace");
    };
    assert_eq!(s.speed, 50);
}

#[test]
fn trace_lead_in_ignores_markers() {
    let mut cfg = choreographed();
    cfg.alignment.trace_ticks = 3;
    let (mut t, h, _sink) = rig(cfg);
    h.sensor.push_all([LINE, BLUE, LINE]);

    for _ in 0..3 {
        assert_eq!(t.tick(), TickOutcome::Aligning(AlignmentStep::TraceTimed));
        assert_eq!(h.left.power(), 50);
    }
    assert_eq!(t.tick(), TickOutcome::Aligning(AlignmentStep::ForwardTimed));
    assert_eq!(t.state().blue_detection_count, 0);
    assert!(!t.state().blue_detection_enabled);
}
