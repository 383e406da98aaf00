//! System-wide defaults for the line tracer workspace.
//!
//! Single source of truth for tuning defaults and validation bounds.
//! Config structs use these as serde defaults.

// ─── Cycle ──────────────────────────────────────────────────────────

/// Default controller cycle period [ms].
pub const CYCLE_TIME_MS: u32 = 100;

/// Shortest accepted controller cycle period [ms].
pub const CYCLE_TIME_MS_MIN: u32 = 1;

/// Longest accepted controller cycle period [ms].
pub const CYCLE_TIME_MS_MAX: u32 = 1000;

// ─── PD Steering ────────────────────────────────────────────────────

/// Proportional gain.
pub const KP: f64 = 0.8;

/// Derivative gain.
pub const KD: f64 = 0.2;

/// Constant turn offset.
pub const BIAS: f64 = 0.0;

/// Target reflectance (midpoint between line and floor).
pub const TARGET_REFLECTANCE: i32 = 25;

/// Upper bound of the sensor-native reflectance scale.
pub const REFLECTANCE_MAX: i32 = 100;

// ─── Speed Levels ───────────────────────────────────────────────────

/// Base speed before the first marker.
pub const DEFAULT_BASE_SPEED: i32 = 50;

/// Base speed after the first marker ("slow mode").
pub const SLOW_BASE_SPEED: i32 = 30;

/// Speed used on sharp curves regardless of base speed.
pub const MIN_SPEED: i32 = 25;

/// Largest power magnitude accepted in config.
pub const POWER_MAX: i32 = 100;

// ─── Color Thresholds ───────────────────────────────────────────────

/// Minimum blue channel value for a marker.
pub const BLUE_THRESHOLD: u16 = 120;

/// Required margin of blue over red and green.
pub const COLOR_DIFF_THRESHOLD: u16 = 50;

/// Reflectance below this counts as black.
pub const BLACK_THRESHOLD: i32 = 15;

// ─── Drive Geometry ─────────────────────────────────────────────────

/// Wheel diameter [cm].
pub const WHEEL_DIAMETER_CM: f64 = 5.4;

/// Outer-wheel distance gain per unit of curve intensity.
pub const OUTER_GAIN: f64 = 0.2;

/// Inner-wheel power reduction at zero intensity.
pub const INNER_REDUCTION_BASE: f64 = 0.1;

/// Inner-wheel power reduction added per unit of curve intensity.
pub const INNER_REDUCTION_PER_INTENSITY: f64 = 0.1;

/// Cap on inner-wheel power reduction.
pub const INNER_REDUCTION_MAX: f64 = 0.8;

/// Floor for the inner wheel's power during a curve.
pub const INNER_MIN_POWER: i32 = 5;

/// Encoder poll interval inside a scripted move [µs].
pub const POLL_INTERVAL_US: u64 = 1000;

/// Poll budget for one scripted move (≈5 s at 1 ms polls).
pub const MAX_POLLS: u32 = 5000;

// ─── Alignment Timing ───────────────────────────────────────────────

/// Ticks spent driving straight at base speed.
pub const ALIGN_FORWARD_TICKS: u32 = 20;

/// Ticks spent standing still between alignment moves.
pub const ALIGN_SETTLE_TICKS: u32 = 5;

/// Upper bound on any single maneuver's step list.
pub const MAX_MANEUVER_STEPS: usize = 8;
