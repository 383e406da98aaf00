//! Configuration structures for the line tracer.
//!
//! All config types use `serde::Deserialize` for TOML loading. Every field
//! defaults to the constants in [`crate::consts`], so an empty file is a
//! complete configuration. Numeric parameters are bounds-checked by
//! [`TracerConfig::validate`].

use serde::{Deserialize, Serialize};

use crate::config::SharedConfig;
use crate::consts::{
    ALIGN_FORWARD_TICKS, ALIGN_SETTLE_TICKS, BIAS, BLACK_THRESHOLD, BLUE_THRESHOLD,
    COLOR_DIFF_THRESHOLD, CYCLE_TIME_MS, CYCLE_TIME_MS_MAX, CYCLE_TIME_MS_MIN, DEFAULT_BASE_SPEED,
    INNER_MIN_POWER, INNER_REDUCTION_BASE, INNER_REDUCTION_MAX, INNER_REDUCTION_PER_INTENSITY, KD,
    KP, MAX_POLLS, MIN_SPEED, OUTER_GAIN, POLL_INTERVAL_US, POWER_MAX, REFLECTANCE_MAX,
    SLOW_BASE_SPEED, TARGET_REFLECTANCE, WHEEL_DIAMETER_CM,
};

use super::maneuver::{ManeuverTable, MoveCommand};

// ─── Top-Level Config ───────────────────────────────────────────────

/// Top-level tracer configuration.
///
/// Loaded from TOML at startup and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TracerConfig {
    /// Service name and log level.
    pub shared: SharedConfig,
    /// Controller cycle period [ms].
    pub cycle_time_ms: u32,
    /// PD steering law.
    pub pd: PdConfig,
    /// Speed levels.
    pub speed: SpeedConfig,
    /// Color classification thresholds.
    pub color: ColorConfig,
    /// Wheel geometry and scripted-move tuning.
    pub drive: DriveConfig,
    /// Startup alignment sequence.
    pub alignment: AlignmentConfig,
    /// Marker maneuvers.
    pub maneuvers: ManeuverTable,
}

impl Default for TracerConfig {
    fn default() -> Self {
        Self {
            shared: SharedConfig::default(),
            cycle_time_ms: CYCLE_TIME_MS,
            pd: PdConfig::default(),
            speed: SpeedConfig::default(),
            color: ColorConfig::default(),
            drive: DriveConfig::default(),
            alignment: AlignmentConfig::default(),
            maneuvers: ManeuverTable::default(),
        }
    }
}

impl TracerConfig {
    /// Validate scalar parameter bounds.
    ///
    /// Move commands inside the alignment and maneuver sections are checked
    /// by the control unit's loader.
    pub fn validate(&self) -> Result<(), String> {
        self.shared.validate().map_err(|e| e.to_string())?;

        if self.cycle_time_ms < CYCLE_TIME_MS_MIN || self.cycle_time_ms > CYCLE_TIME_MS_MAX {
            return Err(format!(
                "cycle_time_ms {} out of range [{}, {}]",
                self.cycle_time_ms, CYCLE_TIME_MS_MIN, CYCLE_TIME_MS_MAX
            ));
        }
        self.pd.validate()?;
        self.speed.validate()?;
        self.color.validate()?;
        self.drive.validate()?;
        Ok(())
    }
}

// ─── PD ─────────────────────────────────────────────────────────────

/// PD steering gains and set point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PdConfig {
    /// Proportional gain.
    pub kp: f64,
    /// Derivative gain.
    pub kd: f64,
    /// Constant turn offset.
    pub bias: f64,
    /// Reflectance set point (line edge).
    pub target: i32,
}

impl Default for PdConfig {
    fn default() -> Self {
        Self {
            kp: KP,
            kd: KD,
            bias: BIAS,
            target: TARGET_REFLECTANCE,
        }
    }
}

impl PdConfig {
    fn validate(&self) -> Result<(), String> {
        if !self.kp.is_finite() || !self.kd.is_finite() || !self.bias.is_finite() {
            return Err("pd gains must be finite".to_string());
        }
        if !(0..=REFLECTANCE_MAX).contains(&self.target) {
            return Err(format!(
                "pd.target {} out of range [0, {}]",
                self.target, REFLECTANCE_MAX
            ));
        }
        Ok(())
    }
}

// ─── Speed ──────────────────────────────────────────────────────────

/// Base speed tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpeedConfig {
    /// Base speed before the first marker.
    pub default: i32,
    /// Base speed after the first marker.
    pub slow: i32,
    /// Sharp-curve speed.
    pub minimum: i32,
}

impl Default for SpeedConfig {
    fn default() -> Self {
        Self {
            default: DEFAULT_BASE_SPEED,
            slow: SLOW_BASE_SPEED,
            minimum: MIN_SPEED,
        }
    }
}

impl SpeedConfig {
    fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("default", self.default),
            ("slow", self.slow),
            ("minimum", self.minimum),
        ] {
            if !(0..=POWER_MAX).contains(&value) {
                return Err(format!(
                    "speed.{name} {value} out of range [0, {POWER_MAX}]"
                ));
            }
        }
        if self.slow > self.default {
            return Err(format!(
                "speed.slow {} exceeds speed.default {}",
                self.slow, self.default
            ));
        }
        Ok(())
    }
}

// ─── Color ──────────────────────────────────────────────────────────

/// Thresholds for marker and landmark classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    /// Minimum blue channel value.
    pub blue_threshold: u16,
    /// Required margin of blue over red and green.
    pub color_diff_threshold: u16,
    /// Reflectance below this is black.
    pub black_threshold: i32,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            blue_threshold: BLUE_THRESHOLD,
            color_diff_threshold: COLOR_DIFF_THRESHOLD,
            black_threshold: BLACK_THRESHOLD,
        }
    }
}

impl ColorConfig {
    fn validate(&self) -> Result<(), String> {
        if !(0..=REFLECTANCE_MAX).contains(&self.black_threshold) {
            return Err(format!(
                "color.black_threshold {} out of range [0, {}]",
                self.black_threshold, REFLECTANCE_MAX
            ));
        }
        Ok(())
    }
}

// ─── Drive ──────────────────────────────────────────────────────────

/// Wheel geometry and scripted-move tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DriveConfig {
    /// Wheel diameter [cm].
    pub wheel_diameter_cm: f64,
    /// Outer-wheel distance gain per unit of intensity.
    pub outer_gain: f64,
    /// Inner-wheel power reduction at zero intensity.
    pub inner_reduction_base: f64,
    /// Inner-wheel power reduction per unit of intensity.
    pub inner_reduction_per_intensity: f64,
    /// Cap on inner-wheel power reduction.
    pub inner_reduction_max: f64,
    /// Inner-wheel power floor.
    pub inner_min_power: i32,
    /// Encoder poll interval [µs]. Zero polls back-to-back.
    pub poll_interval_us: u64,
    /// Poll budget per scripted move.
    pub max_polls: u32,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            wheel_diameter_cm: WHEEL_DIAMETER_CM,
            outer_gain: OUTER_GAIN,
            inner_reduction_base: INNER_REDUCTION_BASE,
            inner_reduction_per_intensity: INNER_REDUCTION_PER_INTENSITY,
            inner_reduction_max: INNER_REDUCTION_MAX,
            inner_min_power: INNER_MIN_POWER,
            poll_interval_us: POLL_INTERVAL_US,
            max_polls: MAX_POLLS,
        }
    }
}

impl DriveConfig {
    fn validate(&self) -> Result<(), String> {
        if !(self.wheel_diameter_cm.is_finite() && self.wheel_diameter_cm > 0.0) {
            return Err(format!(
                "drive.wheel_diameter_cm {} must be positive",
                self.wheel_diameter_cm
            ));
        }
        if !(self.outer_gain.is_finite() && self.outer_gain >= 0.0) {
            return Err(format!("drive.outer_gain {} must be >= 0", self.outer_gain));
        }
        for (name, value) in [
            ("inner_reduction_base", self.inner_reduction_base),
            ("inner_reduction_per_intensity", self.inner_reduction_per_intensity),
            ("inner_reduction_max", self.inner_reduction_max),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("drive.{name} {value} out of range [0, 1]"));
            }
        }
        if !(0..=POWER_MAX).contains(&self.inner_min_power) {
            return Err(format!(
                "drive.inner_min_power {} out of range [0, {POWER_MAX}]",
                self.inner_min_power
            ));
        }
        if self.max_polls == 0 {
            return Err("drive.max_polls must be at least 1".to_string());
        }
        Ok(())
    }
}

// ─── Alignment ──────────────────────────────────────────────────────

/// Whether the startup alignment actually moves the robot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignmentMode {
    /// Full timed/scripted sequence ending on the black landmark.
    #[default]
    Choreographed,
    /// Mark alignment complete on the first tick without moving.
    Skip,
}

impl std::fmt::Display for AlignmentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Choreographed => f.write_str("choreographed"),
            Self::Skip => f.write_str("skip"),
        }
    }
}

/// Startup alignment timing and moves. Tick counts are controller cycles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AlignmentConfig {
    /// Choreographed or skipped.
    pub mode: AlignmentMode,
    /// Line-trace lead-in before the forward run (0 disables it).
    pub trace_ticks: u32,
    /// Timed forward run at base speed.
    pub forward_ticks: u32,
    /// Standstill before each curve.
    pub settle_ticks: u32,
    /// First curve.
    pub curve_right: MoveCommand,
    /// Straight segment between the curves.
    pub straight: MoveCommand,
    /// Second curve.
    pub curve_left: MoveCommand,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            mode: AlignmentMode::default(),
            trace_ticks: 0,
            forward_ticks: ALIGN_FORWARD_TICKS,
            settle_ticks: ALIGN_SETTLE_TICKS,
            curve_right: MoveCommand::right(6.0, 3.0),
            straight: MoveCommand::straight(20.0),
            curve_left: MoveCommand::left(7.0, 3.0),
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
