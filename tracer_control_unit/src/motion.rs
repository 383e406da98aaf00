//! Blocking motion primitives.
//!
//! These own the wheels for their whole duration and are only ever called
//! from inside a controller tick.

pub mod scripted;
