//! HAL data types.
//!
//! This module defines the values exchanged with the device layer:
//! - `Rgb` - Raw color triple from the color sensor
//! - `Reading` - One sensor sample (reflectance + color) per controller tick
//! - `Side` - Which wheel a command or count refers to

use serde::{Deserialize, Serialize};

/// Raw RGB triple in sensor-native units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    /// Red channel
    pub r: u16,
    /// Green channel
    pub g: u16,
    /// Blue channel
    pub b: u16,
}

impl Rgb {
    /// Construct from channel values.
    pub const fn new(r: u16, g: u16, b: u16) -> Self {
        Self { r, g, b }
    }

    /// Neutral gray of the given level on every channel.
    pub const fn gray(level: u16) -> Self {
        Self::new(level, level, level)
    }
}

/// One color sensor sample.
///
/// Produced fresh every tick and never cached across ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    /// Reflected light intensity, 0–100
    pub reflectance: i32,
    /// Color triple
    pub rgb: Rgb,
}

impl Reading {
    /// Construct from parts.
    pub const fn new(reflectance: i32, rgb: Rgb) -> Self {
        Self { reflectance, rgb }
    }
}

/// Wheel side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Left wheel
    Left,
    /// Right wheel
    Right,
}
