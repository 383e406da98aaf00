//! Tracer Common Library
//!
//! Shared constants, configuration and device traits for all crates of the
//! line tracer workspace.
//!
//! # Module Structure
//!
//! - [`consts`] - Tuning defaults and validation bounds
//! - [`config`] - Configuration loading trait and shared config
//! - [`hal`] - Device traits and sensor data types
//! - [`tracer`] - Tracer configuration, maneuver table, state enums
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use tracer_common::prelude::*;
//!
//! let cfg = TracerConfig::default();
//! assert!(cfg.validate().is_ok());
//! ```

pub mod config;
pub mod consts;
pub mod hal;
pub mod prelude;
pub mod tracer;
