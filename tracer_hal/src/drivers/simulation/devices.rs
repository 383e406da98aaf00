//! Device views onto the shared simulated world.

use std::time::{Duration, Instant};

use tracer_common::hal::driver::{ColorSensor, ForceSensor, HalError, WheelMotor};
use tracer_common::hal::types::{Reading, Rgb, Side};

use super::world::SharedWorld;

/// One simulated drive wheel.
pub struct SimWheel {
    world: SharedWorld,
    side: Side,
}

impl SimWheel {
    /// Wheel on `side` of `world`.
    pub fn new(world: SharedWorld, side: Side) -> Self {
        Self { world, side }
    }
}

impl WheelMotor for SimWheel {
    fn set_power(&mut self, power: i32) {
        let mut w = self.world.lock();
        w.sync(Instant::now());
        w.set_power(self.side, power);
    }

    fn stop(&mut self) {
        self.set_power(0);
    }

    fn count(&mut self) -> i32 {
        let mut w = self.world.lock();
        w.sync(Instant::now());
        w.count(self.side)
    }

    fn reset_count(&mut self) {
        let mut w = self.world.lock();
        w.sync(Instant::now());
        w.reset_count(self.side);
    }
}

/// Simulated reflectance / color sensor.
pub struct SimColorSensor {
    world: SharedWorld,
}

impl SimColorSensor {
    /// Sensor looking at `world`.
    pub fn new(world: SharedWorld) -> Self {
        Self { world }
    }
}

impl ColorSensor for SimColorSensor {
    fn reflectance(&mut self) -> Result<i32, HalError> {
        Ok(self.read()?.reflectance)
    }

    fn rgb(&mut self) -> Result<Rgb, HalError> {
        Ok(self.read()?.rgb)
    }

    fn read(&mut self) -> Result<Reading, HalError> {
        let mut w = self.world.lock();
        w.sync(Instant::now());
        Ok(w.reading())
    }
}

/// Start button pressed once `delay` of simulated time has passed.
pub struct SimForceSensor {
    world: SharedWorld,
    delay: Duration,
}

impl SimForceSensor {
    /// Button that reads pressed after `delay`.
    pub fn new(world: SharedWorld, delay: Duration) -> Self {
        Self { world, delay }
    }
}

impl ForceSensor for SimForceSensor {
    fn is_touched(&mut self) -> bool {
        let mut w = self.world.lock();
        w.sync(Instant::now());
        w.elapsed() >= self.delay
    }
}
