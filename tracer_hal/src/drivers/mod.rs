//! HAL driver implementations.
//!
//! - [`simulation`] - Virtual track with differential-drive kinematics
//! - [`scripted`] - Deterministic bench devices fed from a sensor script
//!
//! # Adding New Drivers
//!
//! 1. Create a new submodule under `drivers/`
//! 2. Implement the `HalDriver` trait from `tracer_common::hal::driver`
//! 3. Register the factory in [`register_builtin`]

pub mod scripted;
pub mod simulation;

use crate::driver_registry::DriverRegistry;

/// Register all built-in drivers.
pub fn register_builtin(registry: &mut DriverRegistry) {
    registry.register("simulation", simulation::create_driver);
    registry.register("scripted", scripted::create_driver);
}
