// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Simulator
//!
//! Advances a compiled network in ticks of `dt`:
//!
//! 1. Evaluate every node at the current time `t`
//! 2. Decode each population's *previous* activation through each outgoing
//!    connection's decoder (one-tick delay around every cycle)
//! 3. Transform, filter and scatter-add into destination input slots
//! 4. Encode every population's summed input into this tick's activation
//! 5. Commit, then `t += dt`
//!
//! A tick is computed into a scratch state and committed by swapping buffers.
//! A runtime failure discards the scratch state and stops the simulator.
//!
//! ## States
//! `Built` → `Running` on the first step → `Stopped` on [`Simulator::stop`] or
//! a runtime error. [`Simulator::reset`] returns to `Built` from any state.

use std::sync::Arc;
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use tracing::{error, info, trace};

use critter_neural::slice::{gather, scatter_add};
use critter_neural::{
    ConfigurationError, ConnectionId, Decoder, LowPass, NodeId, Population, PopulationId, ProbeId,
    SignalFunction, SimError, SimResult, Transform,
};

use crate::node::NodeSpec;
use crate::probe::{ProbeRecorder, ProbeTarget};
use crate::state::SimulationState;

/// Runtime-gated per-tick tracing.
/// Enable with CRITTER_TRACE_TICKS=1
fn tick_trace_enabled() -> bool {
    static ENABLED: OnceLock<bool> = OnceLock::new();
    *ENABLED.get_or_init(|| {
        std::env::var("CRITTER_TRACE_TICKS")
            .ok()
            .as_deref()
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulatorConfig {
    /// Tick length in seconds
    pub dt: f64,
    /// Solve decoders for distinct keys on the rayon pool
    pub parallel_decoder_solve: bool,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            dt: 0.001,
            parallel_decoder_solve: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulatorStatus {
    /// Compiled, no tick taken yet
    Built,
    Running,
    /// Terminal until reset
    Stopped,
}

impl std::fmt::Display for SimulatorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimulatorStatus::Built => write!(f, "built"),
            SimulatorStatus::Running => write!(f, "running"),
            SimulatorStatus::Stopped => write!(f, "stopped"),
        }
    }
}

/// Build and stepping statistics
#[derive(Debug, Clone, Default)]
pub struct SimulatorStats {
    /// Ticks committed since build (not cleared by reset)
    pub ticks: u64,
    /// Ticks discarded by a runtime error
    pub failed_ticks: u64,
    pub decoders_solved: u64,
    pub decoders_reused: u64,
    pub build_time: Duration,
    pub step_time: Duration,
}

#[derive(Debug)]
pub(crate) enum CompiledSource {
    Population {
        index: usize,
        decoder: Arc<Decoder>,
    },
    Node {
        index: usize,
        indices: Vec<usize>,
        function: Option<Arc<dyn SignalFunction>>,
    },
}

#[derive(Debug)]
pub(crate) struct CompiledConnection {
    pub(crate) id: ConnectionId,
    pub(crate) name: String,
    pub(crate) source: CompiledSource,
    pub(crate) destination: usize,
    pub(crate) destination_indices: Vec<usize>,
    pub(crate) transform: Transform,
    pub(crate) filter: Option<LowPass>,
    /// Addressed destination dimensions
    pub(crate) width: usize,
}

/// Everything a simulator needs, resolved by `Network::build`
#[derive(Debug)]
pub(crate) struct CompiledNetwork {
    pub(crate) populations: Vec<Arc<Population>>,
    pub(crate) identity_decoders: Vec<Arc<Decoder>>,
    pub(crate) nodes: Vec<NodeSpec>,
    pub(crate) connections: Vec<CompiledConnection>,
    pub(crate) probes: Vec<ProbeRecorder>,
    pub(crate) decoders_solved: u64,
    pub(crate) decoders_reused: u64,
    pub(crate) build_time: Duration,
}

#[derive(Debug)]
pub struct Simulator {
    dt: f64,
    status: SimulatorStatus,
    populations: Vec<Arc<Population>>,
    identity_decoders: Vec<Arc<Decoder>>,
    nodes: Vec<NodeSpec>,
    connections: Vec<CompiledConnection>,
    probes: Vec<ProbeRecorder>,
    /// State restored by reset (carries seeded filter values)
    initial: SimulationState,
    current: SimulationState,
    scratch: SimulationState,
    stats: SimulatorStats,
}

impl Simulator {
    pub(crate) fn new(compiled: CompiledNetwork, dt: f64) -> Self {
        let node_dims: Vec<usize> = compiled.nodes.iter().map(|n| n.dimensions).collect();
        let population_shapes: Vec<(usize, usize)> = compiled
            .populations
            .iter()
            .map(|p| (p.dimensions(), p.n_neurons()))
            .collect();
        let widths: Vec<usize> = compiled.connections.iter().map(|c| c.width).collect();
        let initial = SimulationState::zeroed(&node_dims, &population_shapes, &widths);

        Self {
            dt,
            status: SimulatorStatus::Built,
            populations: compiled.populations,
            identity_decoders: compiled.identity_decoders,
            nodes: compiled.nodes,
            connections: compiled.connections,
            probes: compiled.probes,
            current: initial.clone(),
            scratch: initial.clone(),
            initial,
            stats: SimulatorStats {
                decoders_solved: compiled.decoders_solved,
                decoders_reused: compiled.decoders_reused,
                build_time: compiled.build_time,
                ..SimulatorStats::default()
            },
        }
    }

    // ═══════════════════════════════════════════════════════════
    // State machine
    // ═══════════════════════════════════════════════════════════

    pub fn status(&self) -> SimulatorStatus {
        self.status
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Simulation time of the last committed tick
    pub fn time(&self) -> f64 {
        self.current.time
    }

    pub fn tick(&self) -> u64 {
        self.current.tick
    }

    pub fn stats(&self) -> &SimulatorStats {
        &self.stats
    }

    /// Advance one tick
    pub fn step(&mut self) -> SimResult<()> {
        match self.status {
            SimulatorStatus::Stopped => {
                return Err(SimError::InvalidState {
                    operation: "step",
                    state: self.status.to_string(),
                })
            }
            SimulatorStatus::Built => self.status = SimulatorStatus::Running,
            SimulatorStatus::Running => {}
        }

        let started = Instant::now();
        if let Err(err) = self.compute_tick() {
            self.status = SimulatorStatus::Stopped;
            self.stats.failed_ticks += 1;
            error!(
                target: "critter-engine",
                "[SIM] run halted at t={:.6} (tick {}): {}",
                self.current.time,
                self.current.tick + 1,
                err
            );
            return Err(err);
        }

        std::mem::swap(&mut self.current, &mut self.scratch);
        self.record_probes();
        self.stats.ticks += 1;
        self.stats.step_time += started.elapsed();

        if tick_trace_enabled() {
            trace!(
                target: "critter-engine",
                "[SIM] tick {} t={:.6} decoded={:?}",
                self.current.tick,
                self.current.time,
                self.current.decoded
            );
        }
        Ok(())
    }

    /// Take `steps` ticks, stopping at the first error
    pub fn run_steps(&mut self, steps: u64) -> SimResult<()> {
        for _ in 0..steps {
            self.step()?;
        }
        Ok(())
    }

    /// Run for `duration` seconds (rounded to whole ticks)
    pub fn run(&mut self, duration: f64) -> SimResult<()> {
        if !duration.is_finite() || duration < 0.0 {
            return Err(SimError::InvalidState {
                operation: "run for a negative or non-finite duration",
                state: self.status.to_string(),
            });
        }
        let steps = (duration / self.dt).round() as u64;
        self.run_steps(steps)
    }

    /// Enter `Stopped`; only [`Simulator::reset`] leaves it
    pub fn stop(&mut self) {
        if self.status != SimulatorStatus::Stopped {
            info!(
                target: "critter-engine",
                "[SIM] stopped at t={:.6} after {} tick(s)",
                self.current.time,
                self.current.tick
            );
        }
        self.status = SimulatorStatus::Stopped;
    }

    /// Back to `Built` at t = 0 with the initial state; probe data is cleared
    pub fn reset(&mut self) {
        self.current.clone_from(&self.initial);
        self.scratch.clone_from(&self.initial);
        for probe in &mut self.probes {
            probe.clear();
        }
        self.status = SimulatorStatus::Built;
    }

    /// Seed a connection's filter state before the first tick
    ///
    /// Only filtered connections carry state between ticks. The value is part of the initial state, so it survives [`Simulator::reset`].
    pub fn set_filter_state(&mut self, connection: ConnectionId, value: &[f64]) -> SimResult<()> {
        if self.status != SimulatorStatus::Built {
            return Err(SimError::InvalidState {
                operation: "set filter state",
                state: self.status.to_string(),
            });
        }
        let compiled = self
            .connections
            .get(connection.index())
            .ok_or_else(|| SimError::UnknownObject(connection.to_string()))?;
        if compiled.filter.is_none() {
            // An unfiltered connection overwrites its state every tick
            return Err(ConfigurationError::InvalidSynapse {
                connection: compiled.name.clone(),
                tau: 0.0,
                reason: "unfiltered connection has no state to seed".to_string(),
            }
            .into());
        }
        if value.len() != compiled.width {
            return Err(ConfigurationError::DimensionMismatch {
                connection: compiled.name.clone(),
                what: "initial filter state".to_string(),
                expected: compiled.width,
                actual: value.len(),
            }
            .into());
        }
        let index = compiled.id.index();
        self.initial.filters[index].copy_from_slice(value);
        self.current.filters[index].copy_from_slice(value);
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════
    // Tick
    // ═══════════════════════════════════════════════════════════

    fn compute_tick(&mut self) -> SimResult<()> {
        let dt = self.dt;
        let prev = &self.current;
        let next = &mut self.scratch;
        let t = prev.time;

        next.tick = prev.tick + 1;
        next.time = next.tick as f64 * dt;

        // 1. Nodes at time t
        for (slot, node) in next.node_outputs.iter_mut().zip(&self.nodes) {
            let output = node.evaluate(t).map_err(|message| SimError::NodeEvaluation {
                node: node.label.clone(),
                time: t,
                message,
            })?;
            if output.len() != node.dimensions {
                return Err(SimError::NodeOutputShape {
                    node: node.label.clone(),
                    expected: node.dimensions,
                    actual: output.len(),
                });
            }
            *slot = output;
        }

        // 2-4. Decode previous activation, transform, filter, accumulate
        for input in next.inputs.iter_mut() {
            input.fill(0.0);
        }
        for (c, connection) in self.connections.iter().enumerate() {
            let raw = match &connection.source {
                CompiledSource::Population { index, decoder } => {
                    decoder.decode(&prev.activations[*index])
                }
                CompiledSource::Node {
                    index,
                    indices,
                    function,
                } => {
                    let x = gather(&next.node_outputs[*index], indices);
                    match function {
                        None => x,
                        Some(function) => {
                            let y = function.evaluate(&x);
                            if y.len() != function.output_dims() {
                                return Err(SimError::FunctionOutputShape {
                                    function: function.name().to_string(),
                                    connection: connection.name.clone(),
                                    expected: function.output_dims(),
                                    actual: y.len(),
                                });
                            }
                            y
                        }
                    }
                }
            };
            let projected = connection.transform.apply(&raw);

            let state = &mut next.filters[c];
            match connection.filter {
                Some(filter) => {
                    state.copy_from_slice(&prev.filters[c]);
                    filter.step(dt, state, &projected);
                }
                None => state.copy_from_slice(&projected),
            }
            scatter_add(
                &mut next.inputs[connection.destination],
                &connection.destination_indices,
                &next.filters[c],
            );
        }

        // 5. Encode
        for (p, population) in self.populations.iter().enumerate() {
            population.encode_into(&next.inputs[p], &mut next.activations[p]);
            next.decoded[p] = self.identity_decoders[p].decode(&next.activations[p]);
        }
        Ok(())
    }

    fn record_probes(&mut self) {
        let state = &self.current;
        for probe in &mut self.probes {
            let value: &[f64] = match probe.target {
                ProbeTarget::Decoded(id) => &state.decoded[id.index()],
                ProbeTarget::Activation(id) => &state.activations[id.index()],
                ProbeTarget::Input(id) => &state.inputs[id.index()],
                ProbeTarget::Node(id) => &state.node_outputs[id.index()],
                ProbeTarget::Connection(id) => &state.filters[id.index()],
            };
            probe.observe(state.tick, state.time, self.dt, value);
        }
    }

    // ═══════════════════════════════════════════════════════════
    // Read access
    // ═══════════════════════════════════════════════════════════

    /// Committed state of the last tick
    pub fn state(&self) -> &SimulationState {
        &self.current
    }

    fn population_slot<'a>(
        &self,
        values: &'a [Vec<f64>],
        id: PopulationId,
    ) -> SimResult<&'a [f64]> {
        values
            .get(id.index())
            .map(Vec::as_slice)
            .ok_or_else(|| SimError::UnknownObject(id.to_string()))
    }

    /// Identity-decoded value of a population
    pub fn decoded(&self, id: PopulationId) -> SimResult<&[f64]> {
        self.population_slot(&self.current.decoded, id)
    }

    pub fn activation(&self, id: PopulationId) -> SimResult<&[f64]> {
        self.population_slot(&self.current.activations, id)
    }

    /// Summed input a population encoded on the last tick
    pub fn input(&self, id: PopulationId) -> SimResult<&[f64]> {
        self.population_slot(&self.current.inputs, id)
    }

    pub fn node_output(&self, id: NodeId) -> SimResult<&[f64]> {
        self.current
            .node_outputs
            .get(id.index())
            .map(Vec::as_slice)
            .ok_or_else(|| SimError::UnknownObject(id.to_string()))
    }

    /// Filtered contribution of a connection (destination-slice coordinates)
    pub fn connection_state(&self, id: ConnectionId) -> SimResult<&[f64]> {
        self.current
            .filters
            .get(id.index())
            .map(Vec::as_slice)
            .ok_or_else(|| SimError::UnknownObject(id.to_string()))
    }

    pub fn probe_data(&self, id: ProbeId) -> SimResult<&[Vec<f64>]> {
        self.probes
            .get(id.index())
            .map(|p| p.data())
            .ok_or_else(|| SimError::UnknownObject(id.to_string()))
    }

    pub fn probe_times(&self, id: ProbeId) -> SimResult<&[f64]> {
        self.probes
            .get(id.index())
            .map(|p| p.times())
            .ok_or_else(|| SimError::UnknownObject(id.to_string()))
    }
}
