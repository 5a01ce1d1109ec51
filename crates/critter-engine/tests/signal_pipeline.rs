// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Connection pipeline scenarios
//!
//! - Constant input settles on the represented value
//! - Disjoint destination slices never interfere
//! - Contributions into the same slot sum
//! - A branching function gates its output on one input dimension
//! - Sample-defined decoders
//! - Probes and their sample period

use std::sync::Arc;

use critter_engine::{
    ConnectionSpec, Network, NetworkSettings, NodeSpec, ProbeSpec, ProbeTarget, Simulator,
    SimulatorConfig,
};
use critter_neural::{FnSignal, PopulationParams, SignalFunction};
use ndarray::Array2;

// ============================================================================
// Helper Functions
// ============================================================================

fn network(seed: u64) -> Network {
    Network::new(NetworkSettings::with_seed(seed))
}

fn build(net: &Network) -> Simulator {
    net.build(SimulatorConfig::default()).expect("network should build")
}

fn assert_close(actual: &[f64], expected: &[f64], tolerance: f64) {
    assert_eq!(actual.len(), expected.len());
    for (a, e) in actual.iter().zip(expected) {
        assert!(
            (a - e).abs() < tolerance,
            "expected {:?}, got {:?} (tolerance {})",
            expected,
            actual,
            tolerance
        );
    }
}

// ============================================================================
// Steady state
// ============================================================================

#[test]
fn test_constant_input_settles_and_stays() {
    let mut net = network(7);
    let stim = net.add_node(NodeSpec::constant("stim", vec![0.5])).unwrap();
    let ens = net.add_population(PopulationParams::new("ens", 100, 1)).unwrap();
    net.connect(ConnectionSpec::new(stim, ens)).unwrap();

    let mut sim = build(&net);
    sim.run_steps(5).unwrap();
    let settled = sim.decoded(ens).unwrap().to_vec();
    assert_close(&settled, &[0.5], 0.08);

    // Unfiltered constant input: every later tick is identical
    for _ in 0..100 {
        sim.step().unwrap();
        assert_eq!(sim.decoded(ens).unwrap(), settled.as_slice());
    }
}

#[test]
fn test_filtered_input_converges() {
    let mut net = network(7);
    let stim = net.add_node(NodeSpec::constant("stim", vec![-0.4])).unwrap();
    let ens = net.add_population(PopulationParams::new("ens", 100, 1)).unwrap();
    let conn = net.connect(ConnectionSpec::new(stim, ens).synapse(0.01)).unwrap();

    let mut sim = build(&net);
    sim.step().unwrap();
    // One tick of a 10 ms filter at dt = 1 ms moves 10% of the way
    assert_close(sim.connection_state(conn).unwrap(), &[-0.04], 1e-12);

    sim.run(0.1).unwrap();
    assert_close(sim.decoded(ens).unwrap(), &[-0.4], 0.08);
}

// ============================================================================
// Destination slicing and summation
// ============================================================================

/// Two 2-D and 1-D populations feed disjoint slices of a 3-D population
fn sliced_network(with_second: bool) -> (Simulator, critter_neural::PopulationId) {
    let mut net = network(11);
    let stim_a = net.add_node(NodeSpec::constant("a", vec![0.5, -0.3])).unwrap();
    let stim_b = net.add_node(NodeSpec::constant("b", vec![0.7])).unwrap();
    let pa = net.add_population(PopulationParams::new("pa", 80, 2)).unwrap();
    let pb = net.add_population(PopulationParams::new("pb", 50, 1)).unwrap();
    let target = net.add_population(PopulationParams::new("target", 150, 3)).unwrap();

    net.connect(ConnectionSpec::new(stim_a, pa)).unwrap();
    net.connect(ConnectionSpec::new(stim_b, pb)).unwrap();
    net.connect(ConnectionSpec::new(pa, target).destination_slice([0, 1]))
        .unwrap();
    if with_second {
        net.connect(ConnectionSpec::new(pb, target).destination_slice(2))
            .unwrap();
    }
    (build(&net), target)
}

#[test]
fn test_disjoint_slices_do_not_interfere() {
    let (mut alone, target) = sliced_network(false);
    let (mut both, _) = sliced_network(true);

    for _ in 0..20 {
        alone.step().unwrap();
        both.step().unwrap();
        let a = alone.input(target).unwrap();
        let b = both.input(target).unwrap();
        assert_eq!(a[..2], b[..2]);
        assert_eq!(a[2], 0.0);
    }
    // Second connection lands only in slot 2
    assert!((both.input(target).unwrap()[2] - 0.7).abs() < 0.1);
}

#[test]
fn test_contributions_to_same_slot_sum() {
    let mut net = network(3);
    let a = net.add_node(NodeSpec::constant("a", vec![0.2])).unwrap();
    let b = net.add_node(NodeSpec::constant("b", vec![0.3, 0.9])).unwrap();
    let ens = net.add_population(PopulationParams::new("ens", 60, 2)).unwrap();
    net.connect(ConnectionSpec::new(a, ens).destination_slice(0)).unwrap();
    net.connect(
        ConnectionSpec::new(b, ens)
            .source_slice(0)
            .destination_slice(0)
            .transform(2.0),
    )
    .unwrap();

    let mut sim = build(&net);
    sim.step().unwrap();
    assert_close(sim.input(ens).unwrap(), &[0.8, 0.0], 1e-12);
}

// ============================================================================
// Branching function
// ============================================================================

fn gate_network(light: f64) -> (Simulator, critter_neural::PopulationId) {
    let mut net = network(5);
    let stim = net
        .add_node(NodeSpec::constant("senses", vec![0.5, -0.5, light]))
        .unwrap();
    let do_food = net
        .add_population(PopulationParams::new("do_food", 300, 3).radius(1.7))
        .unwrap();
    let motor = net.add_population(PopulationParams::new("motor", 200, 2)).unwrap();

    let food_func: Arc<dyn SignalFunction> = FnSignal::new("food_func", 2, |x: &[f64]| {
        if x[2] < 0.5 {
            vec![x[0], x[1]]
        } else {
            vec![0.0, 0.0]
        }
    })
    .with_input_dims(3)
    .shared();
    let gate = net.add_function(food_func).unwrap();

    net.connect(ConnectionSpec::new(stim, do_food)).unwrap();
    net.connect(ConnectionSpec::new(do_food, motor).function(gate))
        .unwrap();
    (build(&net), motor)
}

#[test]
fn test_branching_function_zeroes_output_when_light_is_on() {
    let (mut sim, motor) = gate_network(1.0);
    sim.run_steps(10).unwrap();
    assert_close(sim.decoded(motor).unwrap(), &[0.0, 0.0], 0.2);
}

#[test]
fn test_branching_function_passes_food_in_darkness() {
    let (mut sim, motor) = gate_network(0.0);
    sim.run_steps(10).unwrap();
    assert_close(sim.decoded(motor).unwrap(), &[0.5, -0.5], 0.25);
}

// ============================================================================
// Sample-defined decoders
// ============================================================================

#[test]
fn test_sample_defined_decoder_fits_given_pairs() {
    let mut net = network(9);
    let stim = net.add_node(NodeSpec::constant("stim", vec![0.5])).unwrap();
    let source = net.add_population(PopulationParams::new("source", 100, 1)).unwrap();
    let sink = net.add_population(PopulationParams::new("sink", 100, 1)).unwrap();

    let m = 101;
    let points = Array2::from_shape_fn((m, 1), |(i, _)| -1.0 + 2.0 * i as f64 / (m - 1) as f64);
    let targets = points.mapv(|x| -x);

    net.connect(ConnectionSpec::new(stim, source)).unwrap();
    net.connect(ConnectionSpec::new(source, sink).samples(points, targets))
        .unwrap();

    let mut sim = build(&net);
    sim.run_steps(5).unwrap();
    assert_close(sim.decoded(sink).unwrap(), &[-0.5], 0.15);
}

// ============================================================================
// Probes
// ============================================================================

#[test]
fn test_probe_sample_period_and_reset() {
    let mut net = network(1);
    let stim = net
        .add_node(NodeSpec::time_function("ramp", 1, |t| vec![t]))
        .unwrap();
    let ens = net.add_population(PopulationParams::new("ens", 50, 1)).unwrap();
    net.connect(ConnectionSpec::new(stim, ens)).unwrap();
    let every_tenth = net
        .probe(ProbeSpec::new(ProbeTarget::Node(stim)).sample_every(10))
        .unwrap();
    let activity = net.probe(ProbeSpec::new(ProbeTarget::Activation(ens))).unwrap();

    let mut sim = build(&net);
    sim.run_steps(100).unwrap();

    let times = sim.probe_times(every_tenth).unwrap();
    let data = sim.probe_data(every_tenth).unwrap();
    assert_eq!(times.len(), 10);
    assert!((times[0] - 0.010).abs() < 1e-12);
    // Node evaluated at the start of tick 10 (t = 0.009)
    assert!((data[0][0] - 0.009).abs() < 1e-12);
    assert_eq!(sim.probe_data(activity).unwrap().len(), 100);
    assert_eq!(sim.probe_data(activity).unwrap()[0].len(), 50);

    sim.reset();
    assert!(sim.probe_data(every_tenth).unwrap().is_empty());
    assert_eq!(sim.time(), 0.0);
}
