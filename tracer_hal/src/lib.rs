//! # Tracer HAL Library
//!
//! Hardware Abstraction Layer drivers for the line tracer.
//! Drivers implement the `HalDriver` trait defined in `tracer_common::hal::driver`
//! and hand the controller a [`HalDevices`](tracer_common::hal::driver::HalDevices)
//! bundle: two wheels, the color sensor and the start button.
//!
//! # Module Structure
//!
//! - [`driver_registry`] - Driver factory registration
//! - [`drivers`] - HAL driver implementations
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         tracer_hal                           │
//! │  ┌────────────────────┐        ┌──────────────────────────┐  │
//! │  │  DriverRegistry    │───────►│  HalDriver (trait obj)   │  │
//! │  │  name → factory    │        │  simulation | scripted   │  │
//! │  └────────────────────┘        └────────────┬─────────────┘  │
//! │                                             │ init()         │
//! │                                             ▼                │
//! │                                   ┌──────────────────┐       │
//! │                                   │   HalDevices     │       │
//! │                                   └──────────────────┘       │
//! └──────────────────────────────────────────────────────────────┘
//! ```

#![deny(missing_docs)]

pub mod driver_registry;
pub mod drivers;

pub use crate::driver_registry::DriverRegistry;
