//! Controller state and the state machines that mutate it.
//!
//! - [`controller`] - The single owned `ControllerState`
//! - [`alignment`] - One-shot startup alignment sequence
//! - [`marker`] - Blue-marker detection and maneuver execution

pub mod alignment;
pub mod controller;
pub mod marker;
