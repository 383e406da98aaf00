//! Blue-marker state machine.
//!
//! ```text
//! Idle ──blue──► Handling ──maneuver done──► Idle
//!                    │
//!                    └──complete stop latched──► Halted
//! ```
//!
//! Every detection bumps the count and runs the maneuver registered for it.
//! The first detection also drops the base speed to the slow level for the
//! rest of the run. There is no debouncing: one blue reading is a detection.

use tracer_common::hal::driver::HalDevices;
use tracer_common::hal::types::Rgb;
use tracer_common::tracer::config::{ColorConfig, TracerConfig};
use tracer_common::tracer::maneuver::ManeuverStep;
use tracer_common::tracer::state::MarkerPhase;

use crate::diagnostics::{DiagnosticEvent, DiagnosticsSink};
use crate::motion::scripted::{Drivetrain, run_creep, run_move};

use super::controller::ControllerState;

/// `b > BLUE ∧ b > r + DIFF ∧ b > g + DIFF`.
#[inline]
pub fn is_blue(rgb: Rgb, color: &ColorConfig) -> bool {
    let (r, g, b) = (u32::from(rgb.r), u32::from(rgb.g), u32::from(rgb.b));
    let diff = u32::from(color.color_diff_threshold);
    b > u32::from(color.blue_threshold) && b > r + diff && b > g + diff
}

/// Reflectance below the black threshold.
#[inline]
pub fn is_black(reflectance: i32, color: &ColorConfig) -> bool {
    reflectance < color.black_threshold
}

/// Result of handling one detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerOutcome {
    /// Detection count this maneuver belonged to.
    pub count: u32,
    /// Permanent stop latched.
    pub halted: bool,
}

/// Register a detection and enter `Handling`. Returns the new count.
pub fn begin_marker(
    state: &mut ControllerState,
    config: &TracerConfig,
    sink: &dyn DiagnosticsSink,
) -> u32 {
    state.blue_detection_count += 1;
    let count = state.blue_detection_count;
    sink.emit(DiagnosticEvent::MarkerDetected { count });

    if count == 1 {
        state.base_speed = config.speed.slow;
        sink.emit(DiagnosticEvent::SlowModeEngaged {
            speed: state.base_speed,
        });
    }

    state.set_tracking(false);
    state.marker_phase = MarkerPhase::Handling;
    count
}

/// Run every step of the maneuver registered for `count`, in order.
///
/// A `CompleteStop` latches the stop flag but does not cut the list short.
pub fn execute_maneuver(
    state: &mut ControllerState,
    devices: &mut HalDevices,
    config: &TracerConfig,
    sink: &dyn DiagnosticsSink,
    count: u32,
) {
    let maneuver = config.maneuvers.lookup(count);
    sink.emit(DiagnosticEvent::ManeuverStarted {
        count,
        steps: maneuver.len(),
    });

    for step in &maneuver.steps {
        match step {
            ManeuverStep::Move(cmd) => {
                run_move(devices, cmd, state.base_speed, &config.drive, sink);
            }
            ManeuverStep::CompleteStop => {
                state.manual_stop = true;
                Drivetrain::of(devices).stop();
                sink.emit(DiagnosticEvent::CompleteStop);
            }
            ManeuverStep::CreepUntilBlack => {
                run_creep(
                    devices,
                    config.speed.slow,
                    config.color.black_threshold,
                    &config.drive,
                    sink,
                );
            }
        }
    }
}

/// Leave `Handling`: re-arm tracking, or stay halted if a stop was latched.
pub fn finish_marker(
    state: &mut ControllerState,
    sink: &dyn DiagnosticsSink,
    count: u32,
) -> MarkerOutcome {
    let halted = state.manual_stop;
    if halted {
        state.marker_phase = MarkerPhase::Halted;
    } else {
        state.set_tracking(true);
        state.marker_phase = MarkerPhase::Idle;
    }
    sink.emit(DiagnosticEvent::ManeuverFinished { count, halted });
    MarkerOutcome { count, halted }
}

/// Full detection handling: begin, run the maneuver, finish.
pub fn handle_marker(
    state: &mut ControllerState,
    devices: &mut HalDevices,
    config: &TracerConfig,
    sink: &dyn DiagnosticsSink,
) -> MarkerOutcome {
    let count = begin_marker(state, config, sink);
    execute_maneuver(state, devices, config, sink, count);
    finish_marker(state, sink, count)
}

// ─── Tests ──────────────────────────────────────────────────────────
