//! # Tracer Control Unit Library
//!
//! Line-trace controller for a two-wheeled robot with one color sensor.
//! Every cycle reads the sensor, runs the startup alignment or the
//! blue-marker maneuvers when they apply, and otherwise steers along the
//! line edge with a PD law and adaptive speed.
//!
//! ## Layers
//!
//! 1. **Tick** ([`tick::Tracer`]): per-cycle precedence of the behaviors
//! 2. **State** ([`state`]): alignment sequence, marker handling, counters
//! 3. **Motion** ([`motion`]): blocking encoder-tracked scripted moves
//! 4. **Control** ([`control`]): PD steering law and speed bands
//! 5. **Cycle** ([`cycle::CycleRunner`]): fixed-period scheduling
//!
//! Devices come from `tracer_hal` through the `HalDevices` bundle, so the
//! whole controller runs unchanged against the simulation and scripted
//! bench drivers.

pub mod config;
pub mod control;
pub mod cycle;
pub mod diagnostics;
pub mod motion;
pub mod state;
pub mod tick;
