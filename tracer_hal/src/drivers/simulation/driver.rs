//! Simulation driver implementation.
//!
//! The `SimulationDriver` implements the `HalDriver` trait by building a
//! [`World`] and handing out devices that read and drive it.

use std::time::Duration;

use tracer_common::hal::driver::{HalDevices, HalDriver, HalError};
use tracer_common::hal::types::Side;
use tracer_common::tracer::config::TracerConfig;
use tracing::{debug, info};

use super::devices::{SimColorSensor, SimForceSensor, SimWheel};
use super::world::{SharedWorld, Track, World};

/// Simulation driver implementing the HalDriver trait.
pub struct SimulationDriver {
    name: &'static str,
    version: &'static str,
    track: Track,
    touch_delay: Duration,
    manual_clock: bool,
    world: Option<SharedWorld>,
}

impl SimulationDriver {
    /// Driver on the default track, running in wall-clock time.
    pub fn new() -> Self {
        Self {
            name: "simulation",
            version: env!("CARGO_PKG_VERSION"),
            track: Track::default(),
            touch_delay: Duration::ZERO,
            manual_clock: false,
            world: None,
        }
    }

    /// Use a custom track layout.
    pub fn with_track(mut self, track: Track) -> Self {
        self.track = track;
        self
    }

    /// Delay before the simulated start button reads pressed.
    pub fn with_touch_delay(mut self, delay: Duration) -> Self {
        self.touch_delay = delay;
        self
    }

    /// Only advance the world through [`World::step`].
    pub fn with_manual_clock(mut self) -> Self {
        self.manual_clock = true;
        self
    }

    /// World created by the last `init`, if any.
    pub fn world(&self) -> Option<SharedWorld> {
        self.world.clone()
    }
}

impl Default for SimulationDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl HalDriver for SimulationDriver {
    fn name(&self) -> &'static str {
        self.name
    }

    fn version(&self) -> &'static str {
        self.version
    }

    fn init(&mut self, config: &TracerConfig) -> Result<HalDevices, HalError> {
        let diameter = config.drive.wheel_diameter_cm;
        if !(diameter.is_finite() && diameter > 0.0) {
            return Err(HalError::InitFailed(format!(
                "wheel diameter must be positive, got {diameter}"
            )));
        }

        info!(
            markers = self.track.markers.len(),
            landmarks = self.track.landmarks.len(),
            wheel_diameter_cm = diameter,
            "Initializing simulation driver"
        );

        let world = if self.manual_clock {
            World::manual(self.track.clone(), diameter)
        } else {
            World::realtime(self.track.clone(), diameter)
        }
        .shared();
        self.world = Some(world.clone());

        Ok(HalDevices {
            left: Box::new(SimWheel::new(world.clone(), Side::Left)),
            right: Box::new(SimWheel::new(world.clone(), Side::Right)),
            color: Box::new(SimColorSensor::new(world.clone())),
            force: Box::new(SimForceSensor::new(world, self.touch_delay)),
        })
    }

    fn shutdown(&mut self) -> Result<(), HalError> {
        if let Some(world) = self.world.take() {
            let mut w = world.lock();
            w.set_power(Side::Left, 0);
            w.set_power(Side::Right, 0);
            debug!(travelled_cm = w.travelled_cm(), "Simulation driver shutdown");
        }
        Ok(())
    }
}
