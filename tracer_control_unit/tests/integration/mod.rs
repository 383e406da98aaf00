//! Shared rig for the integration tests.

pub mod alignment;
pub mod line_trace;
pub mod marker;
pub mod simulation;
pub mod startup;

use tracer_common::hal::types::{Reading, Rgb};
use tracer_common::tracer::config::{AlignmentMode, TracerConfig};
use tracer_control_unit::diagnostics::RecordingSink;
use tracer_control_unit::tick::Tracer;
use tracer_hal::drivers::scripted::{BenchHandles, BenchSetup, bench};

/// On the edge, gray.
pub const LINE: Reading = Reading::new(25, Rgb::gray(50));
/// Strong blue marker.
pub const BLUE: Reading = Reading::new(25, Rgb::new(10, 10, 200));
/// Black landmark.
pub const BLACK: Reading = Reading::new(5, Rgb::gray(10));

/// Default configuration with alignment skipped and no poll sleeps.
pub fn skip_config() -> TracerConfig {
    let mut cfg = TracerConfig::default();
    cfg.alignment.mode = AlignmentMode::Skip;
    cfg.drive.poll_interval_us = 0;
    cfg
}

/// Tracer on a scripted bench, plus handles and a recording sink.
pub fn rig(cfg: TracerConfig) -> (Tracer, BenchHandles, RecordingSink) {
    let (devices, handles) = bench(BenchSetup::default());
    let sink = RecordingSink::new();
    let tracer = Tracer::new(cfg, devices, Box::new(sink.clone()));
    (tracer, handles, sink)
}
