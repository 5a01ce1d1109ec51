// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! Each struct maps to a section of `critter_configuration.toml`. Every
//! section and field has a default, so an empty file is a valid config.

use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CritterConfig {
    pub simulation: SimulationConfig,
    pub decoder: DecoderConfig,
    pub ensemble: EnsembleConfig,
    pub logging: LoggingConfig,
    pub critter: CritterSceneConfig,
}

/// Time stepping and seeding
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Tick length in seconds
    pub dt: f64,
    /// Seeds population tuning and evaluation points
    pub seed: u64,
    /// Run length for the runner, in seconds
    pub duration: f64,
    pub parallel_decoder_solve: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            dt: 0.001,
            seed: 0,
            duration: 10.0,
            parallel_decoder_solve: true,
        }
    }
}

/// Decoder solving
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DecoderConfig {
    pub eval_points_per_neuron: usize,
    pub min_eval_points: usize,
    /// Noise level relative to peak activity
    pub regularization: f64,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            eval_points_per_neuron: 5,
            min_eval_points: 750,
            regularization: 0.1,
        }
    }
}

/// Defaults applied to every population the topology creates
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EnsembleConfig {
    /// "lif_rate", "rectified_linear" or "sigmoid"
    pub neuron_type: String,
    pub max_rate_low: f64,
    pub max_rate_high: f64,
    pub intercept_low: f64,
    pub intercept_high: f64,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            neuron_type: "lif_rate".to_string(),
            max_rate_low: 200.0,
            max_rate_high: 400.0,
            intercept_low: -1.0,
            intercept_high: 0.9,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// "text" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

/// Stimulus schedule for the critter scenario
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CritterSceneConfig {
    pub food_x: f64,
    pub food_y: f64,
    /// Light level once the light is on
    pub light: f64,
    /// Time the light switches on; absent means from t = 0
    pub light_onset: Option<f64>,
    /// Record every N ticks
    pub probe_every: usize,
}

impl Default for CritterSceneConfig {
    fn default() -> Self {
        Self {
            food_x: 0.5,
            food_y: 0.5,
            light: 0.0,
            light_onset: None,
            probe_every: 10,
        }
    }
}
