//! Controller tick: the per-cycle entry point.
//!
//! Order of precedence on every tick:
//!
//! 1. First tick only: reset both encoders.
//! 2. Alignment incomplete: advance the alignment and return.
//! 3. Permanent stop latched: hold both wheels stopped.
//! 4. Read the sensor; a failed read stops the wheels for this tick.
//! 5. Blue detected while armed: run the marker maneuver.
//! 6. Line trace disabled: do nothing.
//! 7. Otherwise: PD steering and adaptive speed.

use tracer_common::hal::driver::HalDevices;
use tracer_common::tracer::config::TracerConfig;
use tracer_common::tracer::state::AlignmentStep;

use crate::diagnostics::{DiagnosticEvent, DiagnosticsSink};
use crate::motion::scripted::Drivetrain;
use crate::state::alignment::{AlignmentTick, alignment_tick};
use crate::state::controller::{ControllerState, Steering, sanitize};
use crate::state::marker::{MarkerOutcome, handle_marker, is_blue};

/// What a tick did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Alignment in progress at the given step.
    Aligning(AlignmentStep),
    /// Alignment finished on this tick.
    AlignmentCompleted,
    /// Permanent stop held.
    Stopped,
    /// Sensor read failed; wheels stopped.
    SensorFault,
    /// A marker maneuver ran to completion within this tick.
    Marker(MarkerOutcome),
    /// Line trace disabled; nothing commanded.
    Idle,
    /// PD line following commanded the wheels.
    Traced(Steering),
}

/// The line-trace controller: owned state, devices and configuration.
pub struct Tracer {
    config: TracerConfig,
    state: ControllerState,
    devices: HalDevices,
    sink: Box<dyn DiagnosticsSink>,
}

impl Tracer {
    /// Controller over `devices`, reporting to `sink`.
    pub fn new(config: TracerConfig, devices: HalDevices, sink: Box<dyn DiagnosticsSink>) -> Self {
        let state = ControllerState::new(&config);
        Self {
            config,
            state,
            devices,
            sink,
        }
    }

    /// Run one control cycle.
    pub fn tick(&mut self) -> TickOutcome {
        self.state.tick += 1;

        if !self.state.initialized {
            self.devices.left.reset_count();
            self.devices.right.reset_count();
            self.state.initialized = true;
            self.sink.emit(DiagnosticEvent::Initialized);
        }

        if !self.state.alignment.completed {
            return match alignment_tick(
                &mut self.state,
                &mut self.devices,
                &self.config,
                self.sink.as_ref(),
            ) {
                AlignmentTick::Running(step) => TickOutcome::Aligning(step),
                AlignmentTick::Completed => TickOutcome::AlignmentCompleted,
                AlignmentTick::SensorFault => TickOutcome::SensorFault,
            };
        }

        if self.state.manual_stop {
            Drivetrain::of(&mut self.devices).stop();
            return TickOutcome::Stopped;
        }

        let reading = match self.devices.color.read() {
            Ok(r) => sanitize(r),
            Err(e) => {
                Drivetrain::of(&mut self.devices).stop();
                self.sink.emit(DiagnosticEvent::SensorFault {
                    error: e.to_string(),
                });
                return TickOutcome::SensorFault;
            }
        };

        if self.state.blue_detection_enabled && is_blue(reading.rgb, &self.config.color) {
            return TickOutcome::Marker(handle_marker(
                &mut self.state,
                &mut self.devices,
                &self.config,
                self.sink.as_ref(),
            ));
        }

        if !self.state.line_trace_enabled {
            return TickOutcome::Idle;
        }

        let steering = self.state.steer(&self.config, reading.reflectance);
        Drivetrain::of(&mut self.devices).set_powers(steering.powers.left, steering.powers.right);
        TickOutcome::Traced(steering)
    }

    /// Stop both wheels.
    pub fn terminate(&mut self) {
        Drivetrain::of(&mut self.devices).stop();
    }

    /// Discard all state, including a latched stop. Alignment runs again.
    pub fn reset(&mut self) {
        self.state = ControllerState::new(&self.config);
    }

    /// Current controller state.
    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    /// Active configuration.
    pub fn config(&self) -> &TracerConfig {
        &self.config
    }

    /// Device bundle, e.g. for the start gate.
    pub fn devices_mut(&mut self) -> &mut HalDevices {
        &mut self.devices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracer_common::hal::types::{Reading, Rgb};
    use tracer_common::tracer::config::AlignmentMode;
    use tracer_hal::drivers::scripted::{BenchHandles, BenchSetup, bench};

    use crate::control::speed::WheelPowers;
    use crate::diagnostics::RecordingSink;

    fn skip_config() -> TracerConfig {
        let mut cfg = TracerConfig::default();
        cfg.alignment.mode = AlignmentMode::Skip;
        cfg.drive.poll_interval_us = 0;
        cfg
    }

    fn tracer(cfg: TracerConfig) -> (Tracer, BenchHandles, RecordingSink) {
        let (devices, handles) = bench(BenchSetup::default());
        let sink = RecordingSink::new();
        (Tracer::new(cfg, devices, Box::new(sink.clone())), handles, sink)
    }

    #[test]
    fn first_tick_resets_encoders() {
        let (mut t, h, sink) = tracer(skip_config());
        h.left.set_count(123);
        h.right.set_count(-7);
        assert_eq!(t.tick(), TickOutcome::AlignmentCompleted);
        assert_eq!(h.left.count(), 0);
        assert_eq!(h.right.count(), 0);
        assert!(t.state().initialized);
        assert_eq!(sink.events()[0], DiagnosticEvent::Initialized);

        h.left.set_count(50);
        t.tick();
        assert_eq!(h.left.count(), 50);
    }

    #[test]
    fn on_target_drives_straight() {
        let (mut t, h, _) = tracer(skip_config());
        t.tick();
        let out = t.tick();
        let TickOutcome::Traced(st) = out else {
            panic!("expected trace, got {out:?}");
        };
        assert_eq!(st.powers, WheelPowers::even(50));
        assert_eq!(h.left.power(), 50);
        assert_eq!(h.right.power(), 50);
    }

    #[test]
    fn manual_stop_holds_wheels() {
        let (mut t, h, _) = tracer(skip_config());
        t.tick();
        t.state.manual_stop = true;
        h.sensor.push(Reading::new(25, Rgb::new(10, 10, 200)));
        assert_eq!(t.tick(), TickOutcome::Stopped);
        assert_eq!(h.left.power(), 0);
        assert_eq!(h.sensor.reads(), 0);
    }

    #[test]
    fn sensor_fault_stops_for_one_tick() {
        let (mut t, h, sink) = tracer(skip_config());
        t.tick();
        h.sensor.push_fault();
        h.sensor.push(Reading::new(25, Rgb::gray(50)));
        assert_eq!(t.tick(), TickOutcome::SensorFault);
        assert_eq!(h.left.power(), 0);
        assert!(matches!(t.tick(), TickOutcome::Traced(_)));
        assert_eq!(
            sink.count(|e| matches!(e, DiagnosticEvent::SensorFault { .. })),
            1
        );
    }

    #[test]
    fn out_of_range_reflectance_is_clamped() {
        let (mut t, h, _) = tracer(skip_config());
        t.tick();
        h.sensor.push(Reading::new(250, Rgb::gray(200)));
        let TickOutcome::Traced(st) = t.tick() else {
            panic!("expected trace");
        };
        assert_eq!(st.error, 75);
    }

    #[test]
    fn blue_runs_marker_then_resumes() {
        let (mut t, h, _) = tracer(skip_config());
        t.tick();
        h.sensor.push(Reading::new(25, Rgb::new(10, 10, 200)));
        h.sensor.push(Reading::new(25, Rgb::gray(50)));
        let out = t.tick();
        assert_eq!(
            out,
            TickOutcome::Marker(MarkerOutcome {
                count: 1,
                halted: false
            })
        );
        assert_eq!(t.state().base_speed, 30);
        let resumed = Steering {
            error: 0,
            turn: 0.0,
            speed: 30,
            powers: WheelPowers::even(30),
        };
        assert_eq!(t.tick(), TickOutcome::Traced(resumed));
    }

    #[test]
    fn disabled_line_trace_is_idle() {
        let (mut t, h, _) = tracer(skip_config());
        t.tick();
        t.state.line_trace_enabled = false;
        h.left.clear_history();
        assert_eq!(t.tick(), TickOutcome::Idle);
        assert!(h.left.history().is_empty());
    }

    #[test]
    fn reset_clears_latched_stop() {
        let (mut t, _h, _) = tracer(skip_config());
        t.tick();
        t.state.manual_stop = true;
        t.reset();
        assert!(!t.state().manual_stop);
        assert!(!t.state().initialized);
        assert_eq!(t.tick(), TickOutcome::AlignmentCompleted);
    }

    #[test]
    fn terminate_stops_wheels() {
        let (mut t, h, _) = tracer(skip_config());
        t.tick();
        t.tick();
        t.terminate();
        assert_eq!(h.left.power(), 0);
        assert_eq!(h.right.stop_count(), 1);
    }
}
