//! TOML configuration loader with validation.
//!
//! Parses a [`TracerConfig`], checks scalar bounds, then checks every move
//! command in the alignment sequence and the maneuver table.

use std::path::Path;

use thiserror::Error;
use tracer_common::tracer::config::TracerConfig;
use tracer_common::tracer::maneuver::{ManeuverStep, MoveCommand};

// ─── Error Type ─────────────────────────────────────────────────────

/// Configuration loading/validation error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// File could not be read.
    #[error("config I/O error: {0}")]
    IoError(String),
    /// TOML syntax or schema error.
    #[error("config parse error: {0}")]
    ParseError(String),
    /// Parameter out of bounds.
    #[error("config validation: {0}")]
    ValidationError(String),
}

// ─── Loading Functions ──────────────────────────────────────────────

/// Load and validate the tracer configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<TracerConfig, ConfigError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::IoError(format!("failed to read {}: {e}", path.display())))?;
    load_config_from_str(&text)
}

/// Parse and validate the tracer configuration from TOML text.
pub fn load_config_from_str(text: &str) -> Result<TracerConfig, ConfigError> {
    let config: TracerConfig =
        toml::from_str(text).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Run every validation rule.
pub fn validate_config(config: &TracerConfig) -> Result<(), ConfigError> {
    config.validate().map_err(ConfigError::ValidationError)?;

    let al = &config.alignment;
    validate_move("alignment.curve_right", &al.curve_right)?;
    validate_move("alignment.straight", &al.straight)?;
    validate_move("alignment.curve_left", &al.curve_left)?;

    for (i, maneuver) in config.maneuvers.occurrence.iter().enumerate() {
        validate_steps(&format!("maneuvers.occurrence[{i}]"), &maneuver.steps)?;
    }
    validate_steps("maneuvers.fallback", &config.maneuvers.fallback.steps)?;
    Ok(())
}

fn validate_steps(ctx: &str, steps: &[ManeuverStep]) -> Result<(), ConfigError> {
    for (j, step) in steps.iter().enumerate() {
        if let ManeuverStep::Move(cmd) = step {
            validate_move(&format!("{ctx}.steps[{j}]"), cmd)?;
        }
    }
    Ok(())
}

/// Distance must be positive and intensity non-negative, both finite.
pub fn validate_move(ctx: &str, cmd: &MoveCommand) -> Result<(), ConfigError> {
    if !(cmd.distance_cm.is_finite() && cmd.distance_cm > 0.0) {
        return Err(ConfigError::ValidationError(format!(
            "{ctx}: distance_cm must be > 0, got {}",
            cmd.distance_cm
        )));
    }
    if !(cmd.intensity.is_finite() && cmd.intensity >= 0.0) {
        return Err(ConfigError::ValidationError(format!(
            "{ctx}: intensity must be >= 0, got {}",
            cmd.intensity
        )));
    }
    Ok(())
}

// ─── Tests ──────────────────────────────────────────────────────────
