//! Simulation driver module.
//!
//! Software model of the robot on a virtual track, for development and
//! testing without physical hardware.

mod devices;
mod driver;
mod world;

pub use devices::{SimColorSensor, SimForceSensor, SimWheel};
pub use driver::SimulationDriver;
pub use world::{
    AXLE_WIDTH_CM, DEG_PER_SEC_PER_POWER, LANDMARK_REFLECTANCE, MARKER_RGB, SharedWorld, Span,
    Track, World,
};

use tracer_common::hal::driver::HalDriver;

/// Factory function to create a simulation driver instance.
pub fn create_driver() -> Box<dyn HalDriver> {
    Box::new(SimulationDriver::new())
}
