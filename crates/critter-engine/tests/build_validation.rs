// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration errors surface at add/connect/build time, never while stepping

use std::sync::Arc;

use critter_engine::{
    ConnectionSpec, Network, NetworkSettings, NodeSpec, ProbeSpec, ProbeTarget, SimulatorConfig,
};
use critter_neural::types::error::SliceSide;
use critter_neural::{
    ConfigurationError, FnSignal, FunctionId, PopulationParams, SimError, Transform,
};
use ndarray::Array2;

fn network() -> Network {
    Network::new(NetworkSettings::with_seed(1))
}

fn build_issues(net: &Network) -> Vec<ConfigurationError> {
    match net.build(SimulatorConfig::default()) {
        Ok(_) => panic!("build should fail"),
        Err(err) => {
            assert!(err.is_configuration(), "unexpected error kind: {}", err);
            err.configuration_issues().to_vec()
        }
    }
}

#[test]
fn test_function_output_vs_transform_input_mismatch() {
    let mut net = network();
    let a = net.add_population(PopulationParams::new("a", 40, 2)).unwrap();
    let b = net.add_population(PopulationParams::new("b", 40, 1)).unwrap();
    let pair = net
        .add_function(Arc::new(FnSignal::new("pair", 2, |x: &[f64]| vec![x[0], x[1]])))
        .unwrap();
    // Transform expects 3 inputs, function produces 2
    net.connect(
        ConnectionSpec::new(a, b)
            .label("a->b")
            .function(pair)
            .transform(Transform::from_rows(&[&[1.0, 1.0, 1.0]]).unwrap()),
    )
    .unwrap();

    let issues = build_issues(&net);
    assert_eq!(issues.len(), 1);
    match &issues[0] {
        ConfigurationError::TransformShape {
            connection,
            rows,
            cols,
            expected_rows,
            expected_cols,
        } => {
            assert!(connection.contains("a->b"));
            assert_eq!((*rows, *cols), (1, 3));
            assert_eq!((*expected_rows, *expected_cols), (1, 2));
        }
        other => panic!("unexpected issue: {}", other),
    }
}

#[test]
fn test_function_returning_wrong_length_fails_build() {
    let mut net = network();
    let a = net.add_population(PopulationParams::new("a", 40, 1)).unwrap();
    let b = net.add_population(PopulationParams::new("b", 40, 2)).unwrap();
    // Declares 2 outputs, returns 3
    let liar = net
        .add_function(Arc::new(FnSignal::new("liar", 2, |x: &[f64]| {
            vec![x[0], x[0], x[0]]
        })))
        .unwrap();
    net.connect(ConnectionSpec::new(a, b).function(liar)).unwrap();

    let issues = build_issues(&net);
    assert!(matches!(
        issues[0],
        ConfigurationError::DimensionMismatch {
            expected: 2,
            actual: 3,
            ..
        }
    ));
}

#[test]
fn test_node_function_is_probed_at_build() {
    let mut net = network();
    let stim = net.add_node(NodeSpec::constant("stim", vec![0.1, 0.2])).unwrap();
    let b = net.add_population(PopulationParams::new("b", 40, 1)).unwrap();
    let liar = net
        .add_function(Arc::new(FnSignal::new("liar", 1, |x: &[f64]| x.to_vec())))
        .unwrap();
    net.connect(ConnectionSpec::new(stim, b).function(liar)).unwrap();

    let issues = net.validate(0.001);
    assert!(issues
        .iter()
        .any(|i| matches!(i, ConfigurationError::DimensionMismatch { expected: 1, actual: 2, .. })));
}

#[test]
fn test_all_problems_reported_together() {
    let mut net = network();
    let stim = net.add_node(NodeSpec::constant("stim", vec![0.5, 0.5])).unwrap();
    let a = net.add_population(PopulationParams::new("a", 40, 3)).unwrap();
    net.connect(ConnectionSpec::new(stim, a).destination_slice([0, 5]))
        .unwrap();
    net.connect(ConnectionSpec::new(stim, a).destination_slice([1, 1]))
        .unwrap();
    net.connect(
        ConnectionSpec::new(stim, a)
            .destination_slice([0, 1])
            .synapse(0.0005),
    )
    .unwrap();

    let issues = build_issues(&net);
    assert!(issues.iter().any(|i| matches!(
        i,
        ConfigurationError::SliceOutOfRange {
            side: SliceSide::Destination,
            index: 5,
            dims: 3,
            ..
        }
    )));
    assert!(issues
        .iter()
        .any(|i| matches!(i, ConfigurationError::DuplicateSliceIndex { index: 1, .. })));
    assert!(issues
        .iter()
        .any(|i| matches!(i, ConfigurationError::InvalidSynapse { .. })));
}

#[test]
fn test_source_slice_out_of_range() {
    let mut net = network();
    let a = net.add_population(PopulationParams::new("a", 40, 2)).unwrap();
    let b = net.add_population(PopulationParams::new("b", 40, 1)).unwrap();
    net.connect(ConnectionSpec::new(a, b).source_slice(2)).unwrap();
    let issues = build_issues(&net);
    assert!(matches!(
        issues[0],
        ConfigurationError::SliceOutOfRange {
            side: SliceSide::Source,
            ..
        }
    ));
}

#[test]
fn test_pinned_function_input_dims() {
    let mut net = network();
    let a = net.add_population(PopulationParams::new("a", 40, 3)).unwrap();
    let b = net.add_population(PopulationParams::new("b", 40, 1)).unwrap();
    let sum3 = net
        .add_function(
            FnSignal::new("sum3", 1, |x: &[f64]| vec![x[0] + x[1] + x[2]])
                .with_input_dims(3)
                .shared(),
        )
        .unwrap();
    net.connect(ConnectionSpec::new(a, b).source_slice([0, 1]).function(sum3))
        .unwrap();
    let issues = build_issues(&net);
    assert!(matches!(
        issues[0],
        ConfigurationError::FunctionInputMismatch {
            expected: 3,
            actual: 2,
            ..
        }
    ));
}

#[test]
fn test_samples_need_population_source_and_matching_rows() {
    let mut net = network();
    let stim = net.add_node(NodeSpec::constant("stim", vec![0.0])).unwrap();
    let a = net.add_population(PopulationParams::new("a", 40, 1)).unwrap();
    let b = net.add_population(PopulationParams::new("b", 40, 1)).unwrap();
    net.connect(
        ConnectionSpec::new(stim, b).samples(Array2::zeros((4, 1)), Array2::zeros((4, 1))),
    )
    .unwrap();
    net.connect(ConnectionSpec::new(a, b).samples(Array2::zeros((4, 1)), Array2::zeros((3, 1))))
        .unwrap();

    let issues = build_issues(&net);
    let samples = issues
        .iter()
        .filter(|i| matches!(i, ConfigurationError::InvalidSamples { .. }))
        .count();
    assert_eq!(samples, 2);
}

#[test]
fn test_invalid_timestep_and_probe() {
    let mut net = network();
    let a = net.add_population(PopulationParams::new("a", 20, 1)).unwrap();
    net.probe(ProbeSpec::new(ProbeTarget::Decoded(a)).sample_every(0))
        .unwrap();

    let issues = net.validate(0.0);
    assert!(issues
        .iter()
        .any(|i| matches!(i, ConfigurationError::InvalidTimestep { .. })));
    assert!(issues
        .iter()
        .any(|i| matches!(i, ConfigurationError::InvalidProbe { .. })));
}

#[test]
fn test_unknown_references_rejected_on_connect() {
    let mut net = network();
    let a = net.add_population(PopulationParams::new("a", 20, 1)).unwrap();
    let err = net
        .connect(ConnectionSpec::new(a, a).function(FunctionId(9)))
        .unwrap_err();
    assert!(matches!(
        err,
        SimError::Configuration(ConfigurationError::UnknownObject(_))
    ));
    assert_eq!(net.n_connections(), 0);
}

#[test]
fn test_invalid_population_rejected_on_add() {
    let mut net = network();
    let err = net
        .add_population(PopulationParams::new("empty", 0, 1))
        .unwrap_err();
    assert!(err.is_configuration());
    assert_eq!(net.n_populations(), 0);
}
