//! Hardware abstraction layer types and traits.
//!
//! Device interfaces the controller drives, and the data they exchange.
//! Driver implementations live in the `tracer_hal` crate.

pub mod driver;
pub mod types;
