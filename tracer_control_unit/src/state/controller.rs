//! Owned controller state.
//!
//! Exactly one instance per controller, mutated only by the tick and the
//! state machines it calls. Step counters that a cyclic task would keep in
//! statics live here instead.

use tracer_common::consts::REFLECTANCE_MAX;
use tracer_common::hal::types::Reading;
use tracer_common::tracer::config::TracerConfig;
use tracer_common::tracer::state::MarkerPhase;

use crate::control::pd::{PdGains, PdState, pd_compute, reflectance_error};
use crate::control::speed::{WheelPowers, adaptive_speed, wheel_powers};

use super::alignment::AlignmentState;

/// Mutable controller state.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerState {
    /// Encoders reset; flips on the first tick.
    pub initialized: bool,
    /// PD line following active.
    pub line_trace_enabled: bool,
    /// Blue detection armed.
    pub blue_detection_enabled: bool,
    /// Blue markers seen so far.
    pub blue_detection_count: u32,
    /// Current base speed level.
    pub base_speed: i32,
    /// Permanent stop latched by a maneuver.
    pub manual_stop: bool,
    /// PD derivative memory.
    pub pd: PdState,
    /// Startup alignment progress.
    pub alignment: AlignmentState,
    /// Marker handling phase.
    pub marker_phase: MarkerPhase,
    /// Ticks executed.
    pub tick: u64,
}

impl ControllerState {
    /// Fresh state: not initialized, alignment pending, base speed at default.
    pub fn new(config: &TracerConfig) -> Self {
        Self {
            initialized: false,
            line_trace_enabled: true,
            blue_detection_enabled: true,
            blue_detection_count: 0,
            base_speed: config.speed.default,
            manual_stop: false,
            pd: PdState::default(),
            alignment: AlignmentState::new(&config.alignment),
            marker_phase: MarkerPhase::Idle,
            tick: 0,
        }
    }

    /// Arm or disarm both line following and blue detection.
    pub fn set_tracking(&mut self, enabled: bool) {
        self.line_trace_enabled = enabled;
        self.blue_detection_enabled = enabled;
    }

    /// Run the PD law and speed policy for one reading.
    pub fn steer(&mut self, config: &TracerConfig, reflectance: i32) -> Steering {
        let error = reflectance_error(reflectance, config.pd.target);
        let turn = pd_compute(&mut self.pd, &PdGains::from(&config.pd), error);
        let speed = adaptive_speed(turn, self.base_speed, config.speed.minimum);
        Steering {
            error,
            turn,
            speed,
            powers: wheel_powers(speed, turn),
        }
    }
}

/// Result of one PD computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Steering {
    /// Reflectance error.
    pub error: i32,
    /// Steering correction.
    pub turn: f64,
    /// Forward speed after the curvature policy.
    pub speed: i32,
    /// Wheel commands.
    pub powers: WheelPowers,
}

/// Clamp a raw reading's reflectance into the sensor range.
pub fn sanitize(reading: Reading) -> Reading {
    Reading {
        reflectance: reading.reflectance.clamp(0, REFLECTANCE_MAX),
        ..reading
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracer_common::hal::types::Rgb;
    use tracer_common::tracer::state::AlignmentStep;

    #[test]
    fn new_state_is_armed_but_uninitialized() {
        let cfg = TracerConfig::default();
        let s = ControllerState::new(&cfg);
        assert!(!s.initialized);
        assert!(!s.alignment.completed);
        assert!(s.line_trace_enabled && s.blue_detection_enabled);
        assert_eq!(s.base_speed, cfg.speed.default);
        assert_eq!(s.pd.prev_error(), 0);
        assert_eq!(s.alignment.step, AlignmentStep::ForwardTimed);
    }

    #[test]
    fn steer_on_target_goes_straight() {
        let cfg = TracerConfig::default();
        let mut s = ControllerState::new(&cfg);
        let st = s.steer(&cfg, cfg.pd.target);
        assert_eq!(st.turn, 0.0);
        assert_eq!(st.speed, s.base_speed);
        assert_eq!(st.powers, WheelPowers::even(s.base_speed));
    }

    #[test]
    fn steer_uses_current_base_speed() {
        let cfg = TracerConfig::default();
        let mut s = ControllerState::new(&cfg);
        s.base_speed = cfg.speed.slow;
        let st = s.steer(&cfg, cfg.pd.target + 5);
        // 0.8·5 + 0.2·5 = 5
        assert_eq!(st.speed, cfg.speed.slow);
        assert_eq!(st.powers.left, cfg.speed.slow - 5);
        assert_eq!(st.powers.right, cfg.speed.slow + 5);
    }

    #[test]
    fn sanitize_clamps_reflectance_only() {
        let r = sanitize(Reading::new(140, Rgb::new(1, 2, 3)));
        assert_eq!(r, Reading::new(100, Rgb::new(1, 2, 3)));
        assert_eq!(sanitize(Reading::new(-3, Rgb::gray(0))).reflectance, 0);
    }
}
