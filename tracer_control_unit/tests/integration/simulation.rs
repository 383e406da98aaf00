//! Integration test: closed loop against the simulated track.
//!
//! The world runs on a manual clock and is stepped once per controller
//! period, so the run is deterministic.

use std::time::Duration;

use tracer_common::hal::driver::HalDriver;
use tracer_control_unit::diagnostics::NullSink;
use tracer_control_unit::tick::{TickOutcome, Tracer};
use tracer_hal::drivers::simulation::{SimulationDriver, Track};

use super::skip_config;

#[test]
fn pd_loop_recovers_lateral_offset() {
    let cfg = skip_config();
    let period = Duration::from_millis(u64::from(cfg.cycle_time_ms));
    let track = Track {
        markers: Vec::new(),
        landmarks: Vec::new(),
        ..Track::default()
    };

    let mut driver = SimulationDriver::new()
        .with_track(track)
        .with_manual_clock();
    let devices = driver.init(&cfg).unwrap();
    let world = driver.world().unwrap();
    world.lock().set_lateral_cm(1.0);

    let mut tracer = Tracer::new(cfg, devices, Box::new(NullSink));
    assert_eq!(tracer.tick(), TickOutcome::AlignmentCompleted);

    let mut worst = 0.0_f64;
    for _ in 0..300 {
        assert!(matches!(tracer.tick(), TickOutcome::Traced(_)));
        let mut w = world.lock();
        w.step(period);
        worst = worst.max(w.lateral_cm().abs());
    }

    let w = world.lock();
    assert!(worst < 1.5, "overshoot {worst}");
    assert!(w.lateral_cm().abs() < 0.5, "final offset {}", w.lateral_cm());
    assert!(w.travelled_cm() > 500.0, "travelled {}", w.travelled_cm());
    let reflectance = w.reading().reflectance;
    assert!((23..=27).contains(&reflectance), "reflectance {reflectance}");
}
