// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Simulator step microbenchmarks
//!
//! Notes:
//! - Decoders are solved once outside the measured loop.
//! - Network shape mirrors a small sensorimotor loop: input, recurrent
//!   memory, and a 3-D function population feeding a 2-D motor population.

use std::sync::Arc;
use std::time::Duration;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use critter_engine::{ConnectionSpec, Network, NetworkSettings, NodeSpec, SimulatorConfig};
use critter_neural::{FnSignal, PopulationParams};

fn loop_network(scale: usize) -> Network {
    let mut net = Network::new(NetworkSettings::with_seed(1));
    let stim = net
        .add_node(NodeSpec::time_function("stim", 3, |t| vec![t.sin(), t.cos(), 0.2]))
        .unwrap();
    let sense = net
        .add_population(PopulationParams::new("sense", 100 * scale, 3).radius(1.7))
        .unwrap();
    let memory = net
        .add_population(PopulationParams::new("memory", 200 * scale, 2).radius(2.0))
        .unwrap();
    let motor = net
        .add_population(PopulationParams::new("motor", 100 * scale, 2))
        .unwrap();
    let gate = net
        .add_function(Arc::new(FnSignal::new("gate", 2, |x: &[f64]| {
            if x[2] < 0.5 {
                vec![x[0], x[1]]
            } else {
                vec![0.0, 0.0]
            }
        })))
        .unwrap();

    net.connect(ConnectionSpec::new(stim, sense)).unwrap();
    net.connect(ConnectionSpec::new(sense, motor).function(gate)).unwrap();
    net.connect(ConnectionSpec::new(motor, memory).synapse(0.1).transform(0.1))
        .unwrap();
    net.connect(ConnectionSpec::new(memory, memory).synapse(0.1))
        .unwrap();
    net
}

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulator_step");
    group.sample_size(20);
    group.warm_up_time(Duration::from_millis(500));
    group.measurement_time(Duration::from_secs(2));

    for &scale in &[1usize, 2, 4] {
        let net = loop_network(scale);
        let mut sim = net.build(SimulatorConfig::default()).unwrap();
        group.throughput(Throughput::Elements((400 * scale) as u64));
        group.bench_with_input(BenchmarkId::new("tick", 400 * scale), &scale, |b, _| {
            b.iter(|| sim.step().unwrap());
        });
    }

    group.finish();
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("network_build");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(5));

    for parallel in [false, true] {
        let config = SimulatorConfig {
            parallel_decoder_solve: parallel,
            ..SimulatorConfig::default()
        };
        group.bench_with_input(
            BenchmarkId::new("cold_build", if parallel { "parallel" } else { "sequential" }),
            &parallel,
            |b, _| {
                // Fresh network each iteration so the decoder cache starts empty
                b.iter(|| loop_network(2).build(config).unwrap());
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_step, bench_build);
criterion_main!(benches);
