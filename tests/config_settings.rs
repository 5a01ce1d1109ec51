// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file through to engine settings

use std::collections::HashMap;
use std::fs;

use critter::config::{load_config, validate_config, CONFIG_FILE_NAME};
use critter::RunSettings;
use tempfile::tempdir;

#[test]
fn test_file_and_cli_reach_run_settings() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    fs::write(
        &path,
        r#"
[simulation]
seed = 5
dt = 0.002

[ensemble]
neuron_type = "sigmoid"
max_rate_low = 100.0
max_rate_high = 200.0

[critter]
light = 1.0
light_onset = 0.5
"#,
    )
    .unwrap();

    let mut cli = HashMap::new();
    cli.insert("food_x".to_string(), "-0.25".to_string());

    let config = load_config(Some(&path), Some(&cli)).unwrap();
    validate_config(&config).unwrap();
    let settings = RunSettings::from_config(&config).unwrap();

    assert_eq!(settings.simulator.dt, 0.002);
    assert_eq!(settings.ensemble.neuron_type.to_string(), "sigmoid");
    assert_eq!(settings.ensemble.max_rates, (100.0, 200.0));
    assert_eq!(settings.scene.food_x, -0.25);
    assert_eq!(settings.scene.light_onset, Some(0.5));

    // Sigmoid populations with these rates pass network validation
    let (net, _critter) = critter::critter_network(&settings).unwrap();
    assert!(net.validate(settings.simulator.dt).is_empty());
}

#[test]
fn test_shipped_configuration_is_valid() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join(CONFIG_FILE_NAME);
    let config = load_config(Some(&path), None).unwrap();
    validate_config(&config).unwrap();
    assert!(RunSettings::from_config(&config).is_ok());
}
