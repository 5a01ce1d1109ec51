// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Run the critter and print its sampled trajectory as CSV.
//!
//! Configuration comes from `critter_configuration.toml` (or built-in
//! defaults when none is found), then `CRITTER_*` environment variables, then
//! `key=value` arguments.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use tracing::{info, warn};

use critter::config::{
    apply_cli_overrides, apply_environment_overrides, load_config, validate_config, ConfigError,
    CritterConfig,
};
use critter::observability::{
    debug_flags_help, init_logging, parse_debug_flags, LogFormat, LoggingConfig,
};
use critter::{critter_network, RunSettings};

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: run_critter [--config <path>] [key=value ...] [--debug-<crate> ...]\n\n\
         Keys: dt, seed, duration, parallel_decoder_solve, eval_points_per_neuron,\n\
         \x20     min_eval_points, regularization, neuron_type, log_level, log_format,\n\
         \x20     food_x, food_y, light, light_onset, probe_every\n\n\
         {}",
        debug_flags_help()
    );
    process::exit(2);
}

fn parse_args() -> (Option<PathBuf>, HashMap<String, String>) {
    let mut config_path = None;
    let mut overrides = HashMap::new();

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let v = args.next().unwrap_or_else(|| usage_and_exit());
                config_path = Some(PathBuf::from(v));
            }
            "-h" | "--help" => usage_and_exit(),
            other if other.starts_with("--debug-") => {}
            other => match other.split_once('=') {
                Some((key, value)) => {
                    overrides.insert(key.to_string(), value.to_string());
                }
                None => {
                    eprintln!("Unknown argument: {other}");
                    usage_and_exit();
                }
            },
        }
    }

    (config_path, overrides)
}

/// File + env + CLI, or defaults + env + CLI when no file exists and none was named
fn resolve_config(
    config_path: Option<PathBuf>,
    overrides: &HashMap<String, String>,
) -> Result<(CritterConfig, bool)> {
    let explicit = config_path.is_some();
    match load_config(config_path.as_deref(), Some(overrides)) {
        Ok(config) => Ok((config, true)),
        Err(ConfigError::FileNotFound(_)) if !explicit => {
            let mut config = CritterConfig::default();
            apply_environment_overrides(&mut config);
            apply_cli_overrides(&mut config, overrides)?;
            Ok((config, false))
        }
        Err(err) => Err(err).context("Failed to load configuration"),
    }
}

fn main() -> Result<()> {
    let (config_path, overrides) = parse_args();
    let (config, from_file) = resolve_config(config_path, &overrides)?;
    validate_config(&config)?;

    let format = config
        .logging
        .format
        .parse::<LogFormat>()
        .context("Invalid logging.format")?;
    init_logging(
        &parse_debug_flags(),
        &LoggingConfig::new(config.logging.level.clone(), format),
    )?;
    if !from_file {
        warn!(target: "critter", "No configuration file found; using built-in defaults");
    }

    let settings = RunSettings::from_config(&config)?;
    let (net, critter) = critter_network(&settings).context("Failed to wire the critter")?;
    let mut sim = net
        .build(settings.simulator)
        .context("Failed to build the simulator")?;

    info!(
        target: "critter",
        "Running {:.3}s at dt = {}s (seed {})",
        settings.duration,
        settings.simulator.dt,
        settings.network.seed
    );
    sim.run(settings.duration).context("Simulation halted")?;

    let stats = sim.stats();
    info!(
        target: "critter",
        "Finished {} tick(s); build {:.1}ms, stepping {:.1}ms",
        stats.ticks,
        stats.build_time.as_secs_f64() * 1000.0,
        stats.step_time.as_secs_f64() * 1000.0
    );

    println!("time,position_x,position_y,motor_x,motor_y,light");
    for row in critter.trajectory(&sim)? {
        println!(
            "{:.4},{:.5},{:.5},{:.5},{:.5},{:.5}",
            row.time, row.position[0], row.position[1], row.motor[0], row.motor[1], row.light
        );
    }

    Ok(())
}
