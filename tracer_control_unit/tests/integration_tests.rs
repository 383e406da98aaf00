//! Integration tests for the Tracer Control Unit.
//!
//! These tests drive the full controller tick against the scripted and
//! simulation HAL drivers, covering line following, marker maneuvers,
//! startup alignment and configuration loading together.

mod integration;
