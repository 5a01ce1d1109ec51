// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Range and consistency checks on a loaded [`CritterConfig`]. All problems are
//! collected and reported together.

use crate::{ConfigError, ConfigResult, CritterConfig};

/// Neuron model names accepted by `ensemble.neuron_type` (case-insensitive)
pub const KNOWN_NEURON_TYPES: &[&str] = &[
    "lif_rate",
    "lif",
    "lifrate",
    "rectified_linear",
    "relu",
    "sigmoid",
];

/// Output formats accepted by `logging.format`
pub const KNOWN_LOG_FORMATS: &[&str] = &["text", "json"];

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    InvalidValue { field: String, reason: String },
    InvalidRange { low_field: String, high_field: String, low: f64, high: f64 },
    UnknownChoice { field: String, value: String, allowed: &'static [&'static str] },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
            Self::InvalidRange {
                low_field,
                high_field,
                low,
                high,
            } => write!(
                f,
                "{} = {} must not exceed {} = {}",
                low_field, low, high_field, high
            ),
            Self::UnknownChoice {
                field,
                value,
                allowed,
            } => write!(
                f,
                "Unknown {} '{}' (expected one of: {})",
                field,
                value,
                allowed.join(", ")
            ),
        }
    }
}

/// Validate the complete configuration
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every problem found
pub fn validate_config(config: &CritterConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_simulation(config, &mut errors);
    validate_decoder(config, &mut errors);
    validate_ensemble(config, &mut errors);
    validate_logging(config, &mut errors);
    validate_scene(config, &mut errors);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigValidationError {
    ConfigValidationError::InvalidValue {
        field: field.to_string(),
        reason: reason.into(),
    }
}

fn validate_simulation(config: &CritterConfig, errors: &mut Vec<ConfigValidationError>) {
    let sim = &config.simulation;
    if !(sim.dt.is_finite() && sim.dt > 0.0) {
        errors.push(invalid("simulation.dt", format!("{} must be positive and finite", sim.dt)));
    }
    if !(sim.duration.is_finite() && sim.duration >= 0.0) {
        errors.push(invalid(
            "simulation.duration",
            format!("{} must be non-negative and finite", sim.duration),
        ));
    }
}

fn validate_decoder(config: &CritterConfig, errors: &mut Vec<ConfigValidationError>) {
    let dec = &config.decoder;
    if !(dec.regularization.is_finite() && dec.regularization >= 0.0) {
        errors.push(invalid(
            "decoder.regularization",
            format!("{} must be non-negative", dec.regularization),
        ));
    }
    if dec.eval_points_per_neuron == 0 {
        errors.push(invalid("decoder.eval_points_per_neuron", "must be at least 1"));
    }
    if dec.min_eval_points == 0 {
        errors.push(invalid("decoder.min_eval_points", "must be at least 1"));
    }
}

fn validate_ensemble(config: &CritterConfig, errors: &mut Vec<ConfigValidationError>) {
    let ens = &config.ensemble;

    if !KNOWN_NEURON_TYPES.contains(&ens.neuron_type.to_lowercase().as_str()) {
        errors.push(ConfigValidationError::UnknownChoice {
            field: "ensemble.neuron_type".to_string(),
            value: ens.neuron_type.clone(),
            allowed: KNOWN_NEURON_TYPES,
        });
    }

    if !(ens.max_rate_low.is_finite() && ens.max_rate_low > 0.0) {
        errors.push(invalid(
            "ensemble.max_rate_low",
            format!("{} must be positive", ens.max_rate_low),
        ));
    }
    if !ens.max_rate_high.is_finite() {
        errors.push(invalid("ensemble.max_rate_high", "must be finite"));
    }
    if ens.max_rate_low > ens.max_rate_high {
        errors.push(ConfigValidationError::InvalidRange {
            low_field: "ensemble.max_rate_low".to_string(),
            high_field: "ensemble.max_rate_high".to_string(),
            low: ens.max_rate_low,
            high: ens.max_rate_high,
        });
    }

    for (field, value) in [
        ("ensemble.intercept_low", ens.intercept_low),
        ("ensemble.intercept_high", ens.intercept_high),
    ] {
        if !(-1.0..1.0).contains(&value) {
            errors.push(invalid(field, format!("{} must lie in [-1, 1)", value)));
        }
    }
    if ens.intercept_low > ens.intercept_high {
        errors.push(ConfigValidationError::InvalidRange {
            low_field: "ensemble.intercept_low".to_string(),
            high_field: "ensemble.intercept_high".to_string(),
            low: ens.intercept_low,
            high: ens.intercept_high,
        });
    }
}

fn validate_logging(config: &CritterConfig, errors: &mut Vec<ConfigValidationError>) {
    let format = config.logging.format.to_lowercase();
    if !KNOWN_LOG_FORMATS.contains(&format.as_str()) {
        errors.push(ConfigValidationError::UnknownChoice {
            field: "logging.format".to_string(),
            value: config.logging.format.clone(),
            allowed: KNOWN_LOG_FORMATS,
        });
    }
    if config.logging.level.trim().is_empty() {
        errors.push(invalid("logging.level", "must not be empty"));
    }
}

fn validate_scene(config: &CritterConfig, errors: &mut Vec<ConfigValidationError>) {
    let scene = &config.critter;
    for (field, value) in [
        ("critter.food_x", scene.food_x),
        ("critter.food_y", scene.food_y),
        ("critter.light", scene.light),
    ] {
        if !value.is_finite() {
            errors.push(invalid(field, "must be finite"));
        }
    }
    if let Some(onset) = scene.light_onset {
        if !(onset.is_finite() && onset >= 0.0) {
            errors.push(invalid(
                "critter.light_onset",
                format!("{} must be non-negative", onset),
            ));
        }
    }
    if scene.probe_every == 0 {
        errors.push(invalid("critter.probe_every", "must be at least 1"));
    }
}
