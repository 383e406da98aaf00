//! Startup alignment state machine.
//!
//! Runs once before steady-state line following:
//!
//! ```text
//! TraceTimed → ForwardTimed → Settle1 → CurveRight → Straight
//!            → Settle2 → CurveLeft → AwaitBlack → Done
//! ```
//!
//! Timed steps count controller ticks from the tick they were entered on.
//! `TraceTimed` only runs when `trace_ticks > 0`. `AwaitBlack` is the only
//! sensor-gated transition and waits indefinitely. In `skip` mode the first
//! tick completes the alignment without moving.

use tracer_common::hal::driver::HalDevices;
use tracer_common::tracer::config::{AlignmentConfig, AlignmentMode, TracerConfig};
use tracer_common::tracer::state::AlignmentStep;

use crate::diagnostics::{DiagnosticEvent, DiagnosticsSink};
use crate::motion::scripted::{Drivetrain, run_move};

use super::controller::{ControllerState, sanitize};

/// Alignment progress, owned by [`ControllerState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlignmentState {
    /// Reached `Done`.
    pub completed: bool,
    /// Current step.
    pub step: AlignmentStep,
    /// Controller tick on which the current step was entered.
    pub step_start_tick: Option<u64>,
}

impl AlignmentState {
    /// Initial state for the configured sequence.
    pub fn new(cfg: &AlignmentConfig) -> Self {
        let step = if cfg.trace_ticks > 0 {
            AlignmentStep::TraceTimed
        } else {
            AlignmentStep::ForwardTimed
        };
        Self {
            completed: false,
            step,
            step_start_tick: None,
        }
    }
}

/// Result of one alignment tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignmentTick {
    /// Still aligning; the step current after this tick.
    Running(AlignmentStep),
    /// Alignment finished on this tick.
    Completed,
    /// Sensor read failed; wheels stopped, step unchanged.
    SensorFault,
}

/// Advance the alignment by one controller tick.
pub fn alignment_tick(
    state: &mut ControllerState,
    devices: &mut HalDevices,
    config: &TracerConfig,
    sink: &dyn DiagnosticsSink,
) -> AlignmentTick {
    let al = &config.alignment;
    if al.mode == AlignmentMode::Skip {
        complete(state, sink, al.mode);
        return AlignmentTick::Completed;
    }

    let now = state.tick;
    let entered = state.alignment.step_start_tick.is_none();
    let start = *state.alignment.step_start_tick.get_or_insert(now);
    let elapsed = now.saturating_sub(start);

    match state.alignment.step {
        AlignmentStep::TraceTimed => {
            if entered {
                state.line_trace_enabled = true;
                state.blue_detection_enabled = false;
            }
            if elapsed >= u64::from(al.trace_ticks) {
                Drivetrain::of(devices).stop();
                advance(state, sink);
            } else {
                let reading = match devices.color.read() {
                    Ok(r) => sanitize(r),
                    Err(e) => return fault(devices, sink, e.to_string()),
                };
                let steering = state.steer(config, reading.reflectance);
                Drivetrain::of(devices).set_powers(steering.powers.left, steering.powers.right);
            }
        }
        AlignmentStep::ForwardTimed => {
            if entered {
                state.set_tracking(false);
            }
            if elapsed >= u64::from(al.forward_ticks) {
                Drivetrain::of(devices).stop();
                advance(state, sink);
            } else {
                Drivetrain::of(devices).set_powers(state.base_speed, state.base_speed);
            }
        }
        AlignmentStep::Settle1 | AlignmentStep::Settle2 => {
            if elapsed >= u64::from(al.settle_ticks) {
                advance(state, sink);
            }
        }
        AlignmentStep::CurveRight => {
            run_move(devices, &al.curve_right, state.base_speed, &config.drive, sink);
            advance(state, sink);
        }
        AlignmentStep::Straight => {
            run_move(devices, &al.straight, state.base_speed, &config.drive, sink);
            advance(state, sink);
        }
        AlignmentStep::CurveLeft => {
            run_move(devices, &al.curve_left, state.base_speed, &config.drive, sink);
            advance(state, sink);
        }
        AlignmentStep::AwaitBlack => {
            let reading = match devices.color.read() {
                Ok(r) => sanitize(r),
                Err(e) => return fault(devices, sink, e.to_string()),
            };
            if reading.reflectance < config.color.black_threshold {
                Drivetrain::of(devices).stop();
                advance(state, sink);
                complete(state, sink, al.mode);
                return AlignmentTick::Completed;
            }
            let slow = config.speed.slow;
            Drivetrain::of(devices).set_powers(slow, slow);
        }
        AlignmentStep::Done => {
            complete(state, sink, al.mode);
            return AlignmentTick::Completed;
        }
    }

    AlignmentTick::Running(state.alignment.step)
}

fn advance(state: &mut ControllerState, sink: &dyn DiagnosticsSink) {
    let from = state.alignment.step;
    let to = from.next();
    state.alignment.step = to;
    state.alignment.step_start_tick = None;
    sink.emit(DiagnosticEvent::AlignmentStep { from, to });
}

fn complete(state: &mut ControllerState, sink: &dyn DiagnosticsSink, mode: AlignmentMode) {
    state.alignment.completed = true;
    state.alignment.step = AlignmentStep::Done;
    state.alignment.step_start_tick = None;
    state.set_tracking(true);
    sink.emit(DiagnosticEvent::AlignmentCompleted { mode });
}

fn fault(devices: &mut HalDevices, sink: &dyn DiagnosticsSink, error: String) -> AlignmentTick {
    Drivetrain::of(devices).stop();
    sink.emit(DiagnosticEvent::SensorFault { error });
    AlignmentTick::SensorFault
}

// ─── Tests ──────────────────────────────────────────────────────────
