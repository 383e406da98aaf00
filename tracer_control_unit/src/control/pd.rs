//! PD steering law on the reflectance error.
//!
//! `turn = Kp·e + Kd·(e − e_prev) + bias`, where `e = reflectance − target`.
//! The output is unbounded; wheel power clamping belongs to the device.

use tracer_common::tracer::config::PdConfig;

/// Derivative memory of the steering law.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PdState {
    /// Error seen on the previous computation.
    prev_error: i32,
}

impl PdState {
    /// Reset the derivative memory to zero.
    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Error stored by the last [`pd_compute`] call.
    #[inline]
    pub fn prev_error(&self) -> i32 {
        self.prev_error
    }
}

/// PD gains.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PdGains {
    /// Proportional gain.
    pub kp: f64,
    /// Derivative gain (0 = disabled).
    pub kd: f64,
    /// Constant offset added to every output.
    pub bias: f64,
}

impl From<&PdConfig> for PdGains {
    fn from(cfg: &PdConfig) -> Self {
        Self {
            kp: cfg.kp,
            kd: cfg.kd,
            bias: cfg.bias,
        }
    }
}

/// Reflectance error relative to the line-edge target.
#[inline]
pub fn reflectance_error(reflectance: i32, target: i32) -> i32 {
    reflectance - target
}

/// Compute one steering correction and store `error` as the new previous error.
#[inline]
pub fn pd_compute(state: &mut PdState, gains: &PdGains, error: i32) -> f64 {
    let e = f64::from(error);
    let de = f64::from(error) - f64::from(state.prev_error);
    state.prev_error = error;
    gains.kp * e + gains.kd * de + gains.bias
}

// ─── Tests ──────────────────────────────────────────────────────────
