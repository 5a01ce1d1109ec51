// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! Three tiers, later wins:
//! 1. TOML file (base values; missing fields take defaults)
//! 2. Environment variables
//! 3. CLI arguments

use crate::{ConfigError, ConfigResult, CritterConfig};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "critter_configuration.toml";

/// Find the critter configuration file
///
/// Search order:
/// 1. `CRITTER_CONFIG_PATH` environment variable
/// 2. Current working directory
/// 3. Parent directories (up to 5 levels)
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("CRITTER_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by CRITTER_CONFIG_PATH not found: {}",
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));
        let mut current = cwd.clone();
        for _ in 0..5 {
            if let Some(parent) = current.parent() {
                search_paths.push(parent.join(CONFIG_FILE_NAME));
                current = parent.to_path_buf();
            }
        }
    }

    for path in &search_paths {
        if path.exists() {
            return Ok(path.clone());
        }
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "'{}' not found in any of these locations:\n{}\n\nSet CRITTER_CONFIG_PATH environment variable to specify custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load configuration from TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, will search for config file.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if config file is not found or contains invalid TOML.
/// Values are not range-checked here; see [`crate::validate_config`].
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<CritterConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: CritterConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config);
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli)?;
    }

    Ok(config)
}

fn parse_bool(value: &str) -> bool {
    let value = value.to_lowercase();
    value == "true" || value == "1" || value == "yes"
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `CRITTER_DT` -> `simulation.dt`
/// - `CRITTER_SEED` -> `simulation.seed`
/// - `CRITTER_DURATION` -> `simulation.duration`
/// - `CRITTER_LOG_LEVEL` -> `logging.level`
/// - `CRITTER_NEURON_TYPE` -> `ensemble.neuron_type`
/// - `CRITTER_REGULARIZATION` -> `decoder.regularization`
///
/// Unparseable numeric values are ignored.
pub fn apply_environment_overrides(config: &mut CritterConfig) {
    if let Ok(value) = env::var("CRITTER_DT") {
        if let Ok(dt) = value.parse::<f64>() {
            config.simulation.dt = dt;
        }
    }
    if let Ok(value) = env::var("CRITTER_SEED") {
        if let Ok(seed) = value.parse::<u64>() {
            config.simulation.seed = seed;
        }
    }
    if let Ok(value) = env::var("CRITTER_DURATION") {
        if let Ok(duration) = value.parse::<f64>() {
            config.simulation.duration = duration;
        }
    }
    if let Ok(value) = env::var("CRITTER_LOG_LEVEL") {
        config.logging.level = value;
    }
    if let Ok(value) = env::var("CRITTER_NEURON_TYPE") {
        config.ensemble.neuron_type = value;
    }
    if let Ok(value) = env::var("CRITTER_REGULARIZATION") {
        if let Ok(reg) = value.parse::<f64>() {
            config.decoder.regularization = reg;
        }
    }
}

/// Apply CLI argument overrides to configuration
///
/// Keys: `dt`, `seed`, `duration`, `parallel_decoder_solve`,
/// `eval_points_per_neuron`, `min_eval_points`, `regularization`,
/// `neuron_type`, `log_level`, `log_format`, `food_x`, `food_y`, `light`,
/// `light_onset`, `probe_every`. Unknown keys are ignored.
///
/// # Errors
///
/// Unlike environment overrides, a value the user typed that does not parse
/// is an error (`ConfigError::InvalidValue`).
pub fn apply_cli_overrides(
    config: &mut CritterConfig,
    cli_args: &HashMap<String, String>,
) -> ConfigResult<()> {
    fn parse<T: std::str::FromStr>(key: &str, value: &str) -> ConfigResult<T> {
        value
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidValue(format!("{} = '{}'", key, value)))
    }

    for (key, value) in cli_args {
        match key.as_str() {
            "dt" => config.simulation.dt = parse(key, value)?,
            "seed" => config.simulation.seed = parse(key, value)?,
            "duration" => config.simulation.duration = parse(key, value)?,
            "parallel_decoder_solve" => config.simulation.parallel_decoder_solve = parse_bool(value),
            "eval_points_per_neuron" => config.decoder.eval_points_per_neuron = parse(key, value)?,
            "min_eval_points" => config.decoder.min_eval_points = parse(key, value)?,
            "regularization" => config.decoder.regularization = parse(key, value)?,
            "neuron_type" => config.ensemble.neuron_type = value.clone(),
            "log_level" => config.logging.level = value.clone(),
            "log_format" => config.logging.format = value.clone(),
            "food_x" => config.critter.food_x = parse(key, value)?,
            "food_y" => config.critter.food_y = parse(key, value)?,
            "light" => config.critter.light = parse(key, value)?,
            "light_onset" => config.critter.light_onset = Some(parse(key, value)?),
            "probe_every" => config.critter.probe_every = parse(key, value)?,
            _ => {}
        }
    }
    Ok(())
}
