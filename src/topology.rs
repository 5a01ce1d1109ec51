// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! The critter: a two-dimensional agent that walks toward food in the dark
//! and retreats home (the origin) when a light comes on.
//!
//! ```text
//!  stim_food ─→ food ─────────┐[0,1]
//!                             ├─→ do_food ──food_func──┐
//!  stim_light ─→ light ──[2]──┤                        ├─→ motor ──×0.1,τ──→ position ⟲ τ
//!                       └─[2]─┐                        │                        │
//!                             ├─→ do_home ──home_func──┘                        │
//!               position ─────┘[0,1] ←──────────────────────────────────────────┘
//! ```
//!
//! `position` integrates `motor`: its recurrent connection and the motor
//! input share the 0.1 s filter, and the 0.1 transform cancels the filter's
//! 1/τ gain.

use critter_config::CritterSceneConfig;
use critter_engine::{ConnectionSpec, Network, NodeSpec, ProbeSpec, ProbeTarget, Simulator};
use critter_neural::{FnSignal, FunctionId, NodeId, PopulationId, ProbeId, SimResult};
use tracing::info;

use crate::settings::{EnsembleDefaults, RunSettings};

/// Synaptic time constant of the integrator connections (s)
pub const INTEGRATOR_TAU: f64 = 0.1;
/// Radius of the 3-D gating populations; covers |(1, 1, 1)| with margin
pub const GATE_RADIUS: f64 = 1.7;
/// Radius of the position population
pub const POSITION_RADIUS: f64 = 5.0;
/// Low-pass applied to recorded trajectories (s)
pub const PROBE_TAU: f64 = 0.01;

/// Light level above which the critter heads home
const LIGHT_THRESHOLD: f64 = 0.5;

/// Approach food while dark: `(food_x, food_y, light) -> (food_x, food_y)` or zero
pub fn food_func(x: &[f64]) -> Vec<f64> {
    match x {
        [food_x, food_y, light] if *light < LIGHT_THRESHOLD => vec![*food_x, *food_y],
        _ => vec![0.0, 0.0],
    }
}

/// Head home while lit: `(pos_x, pos_y, light) -> (-pos_x, -pos_y)` or zero
pub fn home_func(x: &[f64]) -> Vec<f64> {
    match x {
        [pos_x, pos_y, light] if *light > LIGHT_THRESHOLD => vec![-pos_x, -pos_y],
        _ => vec![0.0, 0.0],
    }
}

/// Recorders attached to the critter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CritterProbes {
    pub position: ProbeId,
    pub motor: ProbeId,
    pub food: ProbeId,
    pub light: ProbeId,
}

/// Handles to every object the critter adds to a network
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Critter {
    pub stim_food: NodeId,
    pub stim_light: NodeId,
    pub food: PopulationId,
    pub light: PopulationId,
    pub motor: PopulationId,
    pub position: PopulationId,
    pub do_food: PopulationId,
    pub do_home: PopulationId,
    pub food_func: FunctionId,
    pub home_func: FunctionId,
    pub probes: CritterProbes,
}

fn light_stimulus(scene: &CritterSceneConfig) -> NodeSpec {
    let level = scene.light;
    match scene.light_onset {
        None => NodeSpec::constant("stim_light", vec![level]),
        Some(onset) => NodeSpec::time_function("stim_light", 1, move |t| {
            vec![if t >= onset { level } else { 0.0 }]
        }),
    }
}

/// Add the critter to `net`
///
/// # Errors
///
/// Propagates population or connection rejections from the network (for
/// example invalid ensemble defaults).
pub fn build_critter(
    net: &mut Network,
    scene: &CritterSceneConfig,
    ensemble: &EnsembleDefaults,
) -> SimResult<Critter> {
    let stim_food = net.add_node(NodeSpec::constant(
        "stim_food",
        vec![scene.food_x, scene.food_y],
    ))?;
    let food = net.add_population(ensemble.population("food", 200, 2))?;
    let motor = net.add_population(ensemble.population("motor", 200, 2))?;
    net.connect(ConnectionSpec::new(stim_food, food).label("stim_food->food"))?;

    let position = net.add_population(
        ensemble
            .population("position", 500, 2)
            .radius(POSITION_RADIUS),
    )?;
    net.connect(
        ConnectionSpec::new(position, position)
            .label("position->position")
            .synapse(INTEGRATOR_TAU),
    )?;
    net.connect(
        ConnectionSpec::new(motor, position)
            .label("motor->position")
            .synapse(INTEGRATOR_TAU)
            .transform(0.1),
    )?;

    let stim_light = net.add_node(light_stimulus(scene))?;
    let light = net.add_population(ensemble.population("light", 100, 1))?;
    net.connect(ConnectionSpec::new(stim_light, light).label("stim_light->light"))?;

    let do_food = net.add_population(ensemble.population("do_food", 300, 3).radius(GATE_RADIUS))?;
    net.connect(
        ConnectionSpec::new(food, do_food)
            .label("food->do_food")
            .destination_slice([0, 1]),
    )?;
    net.connect(
        ConnectionSpec::new(light, do_food)
            .label("light->do_food")
            .destination_slice([2]),
    )?;
    let food_rule = net.add_function(
        FnSignal::new("food_func", 2, food_func)
            .with_input_dims(3)
            .shared(),
    )?;
    net.connect(
        ConnectionSpec::new(do_food, motor)
            .label("do_food->motor")
            .function(food_rule),
    )?;

    let do_home = net.add_population(ensemble.population("do_home", 300, 3).radius(GATE_RADIUS))?;
    net.connect(
        ConnectionSpec::new(position, do_home)
            .label("position->do_home")
            .destination_slice([0, 1]),
    )?;
    net.connect(
        ConnectionSpec::new(light, do_home)
            .label("light->do_home")
            .destination_slice([2]),
    )?;
    let home_rule = net.add_function(
        FnSignal::new("home_func", 2, home_func)
            .with_input_dims(3)
            .shared(),
    )?;
    net.connect(
        ConnectionSpec::new(do_home, motor)
            .label("do_home->motor")
            .function(home_rule),
    )?;

    let every = scene.probe_every;
    let mut probe = |label: &str, population: PopulationId| {
        net.probe(
            ProbeSpec::new(ProbeTarget::Decoded(population))
                .label(label)
                .synapse(PROBE_TAU)
                .sample_every(every),
        )
    };
    let probes = CritterProbes {
        position: probe("position", position)?,
        motor: probe("motor", motor)?,
        food: probe("food", food)?,
        light: probe("light", light)?,
    };

    info!(
        target: "critter",
        "[TOPOLOGY] critter wired: food at ({}, {}), light {} from t = {}",
        scene.food_x,
        scene.food_y,
        scene.light,
        scene.light_onset.unwrap_or(0.0)
    );

    Ok(Critter {
        stim_food,
        stim_light,
        food,
        light,
        motor,
        position,
        do_food,
        do_home,
        food_func: food_rule,
        home_func: home_rule,
        probes,
    })
}

/// A fresh network holding only the critter
pub fn critter_network(settings: &RunSettings) -> SimResult<(Network, Critter)> {
    let mut net = Network::new(settings.network);
    let critter = build_critter(&mut net, &settings.scene, &settings.ensemble)?;
    Ok((net, critter))
}

/// One recorded row of a critter run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectorySample {
    pub time: f64,
    pub position: [f64; 2],
    pub motor: [f64; 2],
    pub light: f64,
}

impl Critter {
    /// Probed position, motor and light rows recorded so far
    pub fn trajectory(&self, sim: &Simulator) -> SimResult<Vec<TrajectorySample>> {
        let times = sim.probe_times(self.probes.position)?;
        let position = sim.probe_data(self.probes.position)?;
        let motor = sim.probe_data(self.probes.motor)?;
        let light = sim.probe_data(self.probes.light)?;

        Ok(times
            .iter()
            .zip(position)
            .zip(motor)
            .zip(light)
            .map(|(((&time, p), m), l)| TrajectorySample {
                time,
                position: [p[0], p[1]],
                motor: [m[0], m[1]],
                light: l[0],
            })
            .collect())
    }
}
