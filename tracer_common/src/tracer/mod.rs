//! Line tracer domain types shared by the control unit and the HAL.
//!
//! - [`config`] - Tracer configuration (gains, speeds, thresholds, geometry)
//! - [`maneuver`] - Scripted move commands and the marker maneuver table
//! - [`state`] - State enums reported by the controller

pub mod config;
pub mod maneuver;
pub mod state;
