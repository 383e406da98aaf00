//! HAL driver traits and error types.
//!
//! This module defines:
//! - `WheelMotor`, `ColorSensor`, `ForceSensor` - Per-device interfaces
//! - `HalDevices` - The device bundle a driver hands to the controller
//! - `HalDriver` trait - Interface for pluggable HAL drivers
//! - `HalError` enum - Error types for HAL operations
//! - `DriverFactory` type alias - Factory function type

use crate::hal::types::{Reading, Rgb};
use crate::tracer::config::TracerConfig;
use thiserror::Error;

/// Error types for HAL operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HalError {
    /// Driver initialization failed
    #[error("Initialization failed: {0}")]
    InitFailed(String),

    /// Driver not found
    #[error("Driver not found: {0}")]
    DriverNotFound(String),

    /// Sensor did not deliver a value
    #[error("Sensor read failed: {0}")]
    SensorRead(String),
}

/// Factory function type for creating driver instances.
pub type DriverFactory = fn() -> Box<dyn HalDriver>;

/// One drive wheel: signed power output plus a cumulative encoder.
pub trait WheelMotor: Send {
    /// Command a signed duty. Clamping to the device range is the driver's job.
    fn set_power(&mut self, power: i32);

    /// Stop the wheel.
    fn stop(&mut self);

    /// Cumulative rotation since the last reset [degrees].
    fn count(&mut self) -> i32;

    /// Zero the encoder.
    fn reset_count(&mut self);
}

/// Reflectance / color sensor.
pub trait ColorSensor: Send {
    /// Reflected light intensity, 0–100.
    fn reflectance(&mut self) -> Result<i32, HalError>;

    /// Raw RGB triple.
    fn rgb(&mut self) -> Result<Rgb, HalError>;

    /// Sample both channels for one controller tick.
    fn read(&mut self) -> Result<Reading, HalError> {
        let reflectance = self.reflectance()?;
        let rgb = self.rgb()?;
        Ok(Reading { reflectance, rgb })
    }
}

/// Touch/force sensor used as the start button.
pub trait ForceSensor: Send {
    /// Whether the sensor is currently pressed.
    fn is_touched(&mut self) -> bool;
}

/// Devices produced by a driver at init.
pub struct HalDevices {
    /// Left drive wheel
    pub left: Box<dyn WheelMotor>,
    /// Right drive wheel
    pub right: Box<dyn WheelMotor>,
    /// Line / marker sensor
    pub color: Box<dyn ColorSensor>,
    /// Start button
    pub force: Box<dyn ForceSensor>,
}

impl std::fmt::Debug for HalDevices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HalDevices").finish_non_exhaustive()
    }
}

/// Trait defining the interface for HAL drivers.
///
/// # Lifecycle
///
/// 1. `init()` - Called once before the cycle loop; returns the devices
/// 2. devices are driven by the controller every cycle
/// 3. `shutdown()` - Called when the process is stopping
pub trait HalDriver: Send {
    /// Returns the driver's unique identifier (e.g., "simulation").
    fn name(&self) -> &'static str;

    /// Returns the driver's semantic version.
    fn version(&self) -> &'static str;

    /// Build the device bundle for this configuration.
    ///
    /// # Errors
    /// Return `HalError::InitFailed` if the devices cannot be brought up.
    fn init(&mut self, config: &TracerConfig) -> Result<HalDevices, HalError>;

    /// Graceful shutdown of the driver.
    fn shutdown(&mut self) -> Result<(), HalError>;
}
