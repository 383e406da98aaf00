//! Integration test: startup path.
//!
//! Validates: config file loading → driver lookup → device init → cycle
//! runner with a cycle limit → wheels stopped on exit.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use tracer_common::hal::driver::{HalDriver, HalError};
use tracer_common::tracer::config::AlignmentMode;
use tracer_control_unit::config::{ConfigError, load_config, load_config_from_str};
use tracer_control_unit::cycle::CycleRunner;
use tracer_control_unit::diagnostics::{NullSink, RecordingSink};
use tracer_control_unit::tick::Tracer;
use tracer_hal::driver_registry::DriverRegistry;
use tracer_hal::drivers::scripted::{BenchSetup, ScriptedDriver};

fn config_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../config")
        .join(name)
}

#[test]
fn shipped_configs_load() {
    let l = load_config(&config_path("tracer.toml")).unwrap();
    assert_eq!(l.alignment.mode, AlignmentMode::Choreographed);
    assert_eq!(l.maneuvers.occurrence.len(), 5);
    assert!(l.maneuvers.fallback.stops_permanently());

    let r = load_config(&config_path("tracer_race_r.toml")).unwrap();
    assert_eq!(r.alignment.mode, AlignmentMode::Skip);
    assert_eq!(r.maneuvers.occurrence.len(), 4);
    assert!(r.maneuvers.fallback.is_empty());
}

#[test]
fn missing_config_is_io_error() {
    let err = load_config(&config_path("does_not_exist.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::IoError(_)));
}

#[test]
fn invalid_move_in_table_rejected() {
    let text = r#"
[[maneuvers.occurrence]]
steps = [{ action = "move", distance_cm = -4.0 }]
"#;
    let err = load_config_from_str(text).unwrap_err();
    assert!(err.to_string().contains("maneuvers.occurrence[0]"), "{err}");
}

#[test]
fn registry_resolves_builtin_drivers() {
    let registry = DriverRegistry::with_builtin();
    assert_eq!(registry.list_drivers(), vec!["scripted", "simulation"]);
    assert!(matches!(
        registry.create_driver("ev3"),
        Err(HalError::DriverNotFound(_))
    ));

    let mut driver = registry.create_driver("scripted").unwrap();
    let cfg = load_config_from_str("").unwrap();
    assert!(driver.init(&cfg).is_ok());
    assert!(driver.shutdown().is_ok());
}

#[test]
fn runner_ticks_tracer_to_cycle_limit() {
    let mut cfg = load_config(&config_path("tracer_race_r.toml")).unwrap();
    cfg.cycle_time_ms = 1;

    let mut driver = ScriptedDriver::with_setup(BenchSetup::default());
    let devices = driver.init(&cfg).unwrap();
    let handles = driver.handles().unwrap();

    let sink = RecordingSink::new();
    let tracer = Tracer::new(cfg, devices, Box::new(sink.clone()));
    let mut runner =
        CycleRunner::new(tracer, Arc::new(AtomicBool::new(true))).with_max_cycles(Some(20));

    let stats = runner.run().unwrap();
    assert_eq!(stats.cycle_count, 20);
    assert!(stats.min_cycle_ns <= stats.max_cycle_ns);

    assert!(runner.tracer().state().alignment.completed);
    assert_eq!(handles.left.history().len(), 20);
    assert_eq!(handles.left.power(), 0);
    assert_eq!(handles.right.power(), 0);
    assert!(!sink.events().is_empty());
}

#[test]
fn null_sink_tracer_runs() {
    let mut cfg = load_config_from_str("").unwrap();
    cfg.alignment.mode = AlignmentMode::Skip;
    let mut driver = ScriptedDriver::new();
    let devices = driver.init(&cfg).unwrap();
    let mut tracer = Tracer::new(cfg, devices, Box::new(NullSink));
    for _ in 0..10 {
        tracer.tick();
    }
    tracer.terminate();
    assert_eq!(tracer.state().tick, 10);
}
