//! Scripted bench driver.
//!
//! Builds [`ScriptedWheel`]s and a [`ScriptedColorSensor`] and keeps their
//! handles so a test, or an operator at the bench, can feed readings and
//! inspect the commanded powers.

use tracer_common::consts::TARGET_REFLECTANCE;
use tracer_common::hal::driver::{HalDevices, HalDriver, HalError};
use tracer_common::hal::types::{Reading, Rgb};
use tracer_common::tracer::config::TracerConfig;
use tracing::info;

use super::devices::{
    ButtonHandle, ScriptedColorSensor, ScriptedForceSensor, ScriptedWheel, SensorHandle,
    WheelHandle,
};

/// Handles onto one set of scripted devices.
#[derive(Clone)]
pub struct BenchHandles {
    /// Left wheel observer
    pub left: WheelHandle,
    /// Right wheel observer
    pub right: WheelHandle,
    /// Sensor frame feed
    pub sensor: SensorHandle,
    /// Start button
    pub button: ButtonHandle,
}

/// Options for a scripted device set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BenchSetup {
    /// Encoder degrees per poll per unit of power.
    pub ratio: f64,
    /// Reading repeated until frames are queued.
    pub idle_reading: Reading,
    /// Initial start button state.
    pub pressed: bool,
}

impl Default for BenchSetup {
    fn default() -> Self {
        Self {
            ratio: 1.0,
            idle_reading: Reading::new(TARGET_REFLECTANCE, Rgb::gray(50)),
            pressed: true,
        }
    }
}

/// Build scripted devices together with their handles.
pub fn bench(setup: BenchSetup) -> (HalDevices, BenchHandles) {
    let (left, left_handle) = ScriptedWheel::new(setup.ratio);
    let (right, right_handle) = ScriptedWheel::new(setup.ratio);
    let (color, sensor) = ScriptedColorSensor::new(setup.idle_reading);
    let (force, button) = ScriptedForceSensor::new(setup.pressed);
    (
        HalDevices {
            left: Box::new(left),
            right: Box::new(right),
            color: Box::new(color),
            force: Box::new(force),
        },
        BenchHandles {
            left: left_handle,
            right: right_handle,
            sensor,
            button,
        },
    )
}

/// Driver handing out scripted devices.
pub struct ScriptedDriver {
    setup: BenchSetup,
    handles: Option<BenchHandles>,
}

impl ScriptedDriver {
    /// Driver with the default bench setup.
    pub fn new() -> Self {
        Self::with_setup(BenchSetup::default())
    }

    /// Driver with a custom bench setup.
    pub fn with_setup(setup: BenchSetup) -> Self {
        Self {
            setup,
            handles: None,
        }
    }

    /// Handles for the devices built by the last `init`.
    pub fn handles(&self) -> Option<BenchHandles> {
        self.handles.clone()
    }
}

impl Default for ScriptedDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl HalDriver for ScriptedDriver {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    fn init(&mut self, _config: &TracerConfig) -> Result<HalDevices, HalError> {
        info!(ratio = self.setup.ratio, "Initializing scripted driver");
        let (devices, handles) = bench(self.setup);
        self.handles = Some(handles);
        Ok(devices)
    }

    fn shutdown(&mut self) -> Result<(), HalError> {
        self.handles = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_exposes_handles() {
        let mut driver = ScriptedDriver::new();
        assert!(driver.handles().is_none());

        let mut devices = driver.init(&TracerConfig::default()).unwrap();
        let handles = driver.handles().unwrap();

        devices.left.set_power(33);
        assert_eq!(handles.left.power(), 33);
        assert_eq!(devices.color.reflectance().unwrap(), TARGET_REFLECTANCE);
        assert!(devices.force.is_touched());

        driver.shutdown().unwrap();
        assert!(driver.handles().is_none());
    }

    #[test]
    fn bench_honours_setup() {
        let (mut devices, handles) = bench(BenchSetup {
            ratio: 2.0,
            pressed: false,
            ..BenchSetup::default()
        });
        devices.right.set_power(10);
        assert_eq!(devices.right.count(), 20);
        assert!(!devices.force.is_touched());
        handles.button.set(true);
        assert!(devices.force.is_touched());
    }
}
