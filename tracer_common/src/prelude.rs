//! Prelude module for common re-exports.
//!
//! ```rust
//! use tracer_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};
pub use crate::tracer::config::{AlignmentMode, TracerConfig};

// ─── Maneuvers ──────────────────────────────────────────────────────
pub use crate::tracer::maneuver::{
    Maneuver, ManeuverStep, ManeuverTable, MoveCommand, TurnDirection,
};
pub use crate::tracer::state::{AlignmentStep, MarkerPhase};

// ─── HAL ────────────────────────────────────────────────────────────
pub use crate::hal::driver::{
    ColorSensor, ForceSensor, HalDevices, HalDriver, HalError, WheelMotor,
};
pub use crate::hal::types::{Reading, Rgb, Side};
