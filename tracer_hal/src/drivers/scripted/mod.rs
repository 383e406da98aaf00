//! Scripted bench driver module.
//!
//! Deterministic devices for integration tests and bench runs.

mod devices;
mod driver;

pub use devices::{
    ButtonHandle, Frame, HISTORY_LIMIT, ScriptedColorSensor, ScriptedForceSensor, ScriptedWheel,
    SensorHandle, WheelHandle,
};
pub use driver::{BenchHandles, BenchSetup, ScriptedDriver, bench};

use tracer_common::hal::driver::HalDriver;

/// Factory function to create a scripted driver instance.
pub fn create_driver() -> Box<dyn HalDriver> {
    Box::new(ScriptedDriver::new())
}
