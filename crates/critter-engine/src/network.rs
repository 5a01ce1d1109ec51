// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Network Graph
//!
//! Populations, nodes, functions, connections and probes, plus the build step
//! that validates the whole graph and compiles it into a [`Simulator`].
//!
//! Cycles are legal: a self-connection is how a population holds a value.
//! Every dimension and index invariant is checked by [`Network::validate`]
//! before any decoder is solved; all problems are reported together.
//!
//! Population tuning and evaluation points are drawn when the population is
//! added, each from its own stream derived from `(seed, population index)`,
//! so adding objects never perturbs draws already made.

use std::sync::Arc;
use std::time::Instant;

use ndarray::Array2;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use critter_neural::rng::StreamKind;
use critter_neural::sampling::{eval_point_count, function_targets, sample_eval_points};
use critter_neural::types::error::SliceSide;
use critter_neural::{
    ConfigurationError, ConnectionId, Decoder, DecoderSolver, FunctionId, LowPass, NodeId,
    Population, PopulationId, PopulationParams, ProbeId, SeededStream, SignalFunction, SimError,
    SimResult, SolverParams,
};

use crate::connection::{ConnectionSpec, DecodeTarget, Source};
use crate::decoder_cache::{DecoderCache, DecoderKey, TargetKey};
use crate::node::NodeSpec;
use crate::probe::{ProbeRecorder, ProbeSpec, ProbeTarget};
use crate::simulator::{
    CompiledConnection, CompiledNetwork, CompiledSource, Simulator, SimulatorConfig,
};

/// Seed and decoder-solving parameters fixed for the life of a network
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NetworkSettings {
    /// Seeds tuning draws and evaluation points
    pub seed: u64,
    pub solver: SolverParams,
    pub eval_points_per_neuron: usize,
    pub min_eval_points: usize,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            seed: 0,
            solver: SolverParams::default(),
            eval_points_per_neuron: 5,
            min_eval_points: 750,
        }
    }
}

impl NetworkSettings {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }
}

#[derive(Debug)]
struct PopulationEntry {
    population: Arc<Population>,
    eval_points: Array2<f64>,
}

/// One decoder to solve during build
struct DecoderJob<'a> {
    key: DecoderKey,
    entry: &'a PopulationEntry,
    function: Option<Arc<dyn SignalFunction>>,
    samples: Option<(&'a Array2<f64>, &'a Array2<f64>)>,
    owner: String,
}

#[derive(Debug)]
pub struct Network {
    settings: NetworkSettings,
    populations: Vec<PopulationEntry>,
    nodes: Vec<NodeSpec>,
    functions: Vec<Arc<dyn SignalFunction>>,
    connections: Vec<ConnectionSpec>,
    probes: Vec<ProbeSpec>,
    decoder_cache: Arc<DecoderCache>,
}

impl Default for Network {
    fn default() -> Self {
        Self::new(NetworkSettings::default())
    }
}

/// `Ok` for no issues, the lone issue, or all of them
fn reject(mut issues: Vec<ConfigurationError>) -> SimResult<()> {
    match issues.len() {
        0 => Ok(()),
        1 => Err(issues.remove(0).into()),
        _ => Err(SimError::InvalidNetwork(issues)),
    }
}

impl Network {
    pub fn new(settings: NetworkSettings) -> Self {
        Self {
            settings,
            populations: Vec::new(),
            nodes: Vec::new(),
            functions: Vec::new(),
            connections: Vec::new(),
            probes: Vec::new(),
            decoder_cache: Arc::new(DecoderCache::new()),
        }
    }

    pub fn settings(&self) -> &NetworkSettings {
        &self.settings
    }

    pub fn decoder_cache(&self) -> &Arc<DecoderCache> {
        &self.decoder_cache
    }

    // ═══════════════════════════════════════════════════════════
    // Graph construction
    // ═══════════════════════════════════════════════════════════

    /// Add a population, drawing its tuning and evaluation points
    pub fn add_population(&mut self, params: PopulationParams) -> SimResult<PopulationId> {
        reject(params.validate())?;

        let id = PopulationId(self.populations.len() as u32);
        let seed = self.settings.seed;
        let population = Population::new(
            id,
            &params,
            &mut SeededStream::derive(seed, StreamKind::Tuning, id.0),
        );
        let count = eval_point_count(
            params.n_neurons,
            self.settings.eval_points_per_neuron,
            self.settings.min_eval_points,
        );
        let eval_points = sample_eval_points(
            &mut SeededStream::derive(seed, StreamKind::EvalPoints, id.0),
            count,
            params.dimensions,
            params.radius,
        );

        debug!(
            target: "critter-engine",
            "[NETWORK] added {} '{}': {} units, {}-D, radius {}, {} eval points",
            id,
            params.label,
            params.n_neurons,
            params.dimensions,
            params.radius,
            count
        );

        self.populations.push(PopulationEntry {
            population: Arc::new(population),
            eval_points,
        });
        Ok(id)
    }

    pub fn add_node(&mut self, node: NodeSpec) -> SimResult<NodeId> {
        reject(node.validate())?;
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        Ok(id)
    }

    /// Register a function connections can reference by id
    pub fn add_function(&mut self, function: Arc<dyn SignalFunction>) -> SimResult<FunctionId> {
        reject(Self::validate_function(function.as_ref()))?;
        let id = FunctionId(self.functions.len() as u32);
        self.functions.push(function);
        Ok(id)
    }

    /// Swap a registered function; only decoders computed for it are dropped
    pub fn replace_function(
        &mut self,
        id: FunctionId,
        function: Arc<dyn SignalFunction>,
    ) -> SimResult<()> {
        if id.index() >= self.functions.len() {
            return Err(SimError::UnknownObject(id.to_string()));
        }
        reject(Self::validate_function(function.as_ref()))?;
        self.functions[id.index()] = function;
        let removed = self.decoder_cache.invalidate_function(id);
        info!(
            target: "critter-engine",
            "[NETWORK] replaced {}; {} cached decoder(s) invalidated",
            id,
            removed
        );
        Ok(())
    }

    fn validate_function(function: &dyn SignalFunction) -> Vec<ConfigurationError> {
        let mut issues = Vec::new();
        if function.output_dims() == 0 {
            issues.push(ConfigurationError::InvalidFunction {
                function: function.name().to_string(),
                reason: "output dimensionality must be > 0".to_string(),
            });
        }
        if function.input_dims() == Some(0) {
            issues.push(ConfigurationError::InvalidFunction {
                function: function.name().to_string(),
                reason: "input dimensionality must be > 0".to_string(),
            });
        }
        issues
    }

    /// Add a connection; unknown references are rejected here, shapes at build
    pub fn connect(&mut self, spec: ConnectionSpec) -> SimResult<ConnectionId> {
        let id = ConnectionId(self.connections.len() as u32);
        let name = spec.display_name(id);
        let mut issues = Vec::new();

        if self.source_dims(spec.source).is_none() {
            issues.push(ConfigurationError::UnknownObject(format!(
                "{}: source {}",
                name, spec.source
            )));
        }
        if spec.destination.index() >= self.populations.len() {
            issues.push(ConfigurationError::UnknownObject(format!(
                "{}: destination {}",
                name, spec.destination
            )));
        }
        if let DecodeTarget::Function(function) = spec.target {
            if function.index() >= self.functions.len() {
                issues.push(ConfigurationError::UnknownObject(format!(
                    "{}: {}",
                    name, function
                )));
            }
        }
        reject(issues)?;

        self.connections.push(spec);
        Ok(id)
    }

    pub fn probe(&mut self, spec: ProbeSpec) -> SimResult<ProbeId> {
        let id = ProbeId(self.probes.len() as u32);
        if self.probe_width(spec.target).is_none() {
            return Err(ConfigurationError::UnknownObject(format!(
                "probe {}: target {:?}",
                id, spec.target
            ))
            .into());
        }
        self.probes.push(spec);
        Ok(id)
    }

    // ═══════════════════════════════════════════════════════════
    // Lookups
    // ═══════════════════════════════════════════════════════════

    pub fn population(&self, id: PopulationId) -> Option<&Population> {
        self.populations.get(id.index()).map(|e| e.population.as_ref())
    }

    pub fn population_id(&self, label: &str) -> Option<PopulationId> {
        self.populations
            .iter()
            .position(|e| e.population.label() == label)
            .map(|i| PopulationId(i as u32))
    }

    pub fn node(&self, id: NodeId) -> Option<&NodeSpec> {
        self.nodes.get(id.index())
    }

    pub fn node_id(&self, label: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|n| n.label == label)
            .map(|i| NodeId(i as u32))
    }

    pub fn function(&self, id: FunctionId) -> Option<&Arc<dyn SignalFunction>> {
        self.functions.get(id.index())
    }

    pub fn connection(&self, id: ConnectionId) -> Option<&ConnectionSpec> {
        self.connections.get(id.index())
    }

    pub fn n_populations(&self) -> usize {
        self.populations.len()
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn n_connections(&self) -> usize {
        self.connections.len()
    }

    fn source_dims(&self, source: Source) -> Option<usize> {
        match source {
            Source::Population(id) => self.population(id).map(|p| p.dimensions()),
            Source::Node(id) => self.node(id).map(|n| n.dimensions),
        }
    }

    /// Width of the vector a probe target records
    fn probe_width(&self, target: ProbeTarget) -> Option<usize> {
        match target {
            ProbeTarget::Decoded(id) | ProbeTarget::Input(id) => {
                self.population(id).map(|p| p.dimensions())
            }
            ProbeTarget::Activation(id) => self.population(id).map(|p| p.n_neurons()),
            ProbeTarget::Node(id) => self.node(id).map(|n| n.dimensions),
            ProbeTarget::Connection(id) => self.connection(id).and_then(|c| {
                self.population(c.destination)
                    .map(|p| c.destination_slice.len(p.dimensions()))
            }),
        }
    }

    // ═══════════════════════════════════════════════════════════
    // Validation
    // ═══════════════════════════════════════════════════════════

    /// Every configuration problem that would prevent a build at `dt`
    pub fn validate(&self, dt: f64) -> Vec<ConfigurationError> {
        let mut issues = Vec::new();
        if !(dt.is_finite() && dt > 0.0) {
            issues.push(ConfigurationError::InvalidTimestep { dt });
        }
        for (index, spec) in self.connections.iter().enumerate() {
            issues.extend(self.validate_connection(ConnectionId(index as u32), spec, dt));
        }
        for (index, spec) in self.probes.iter().enumerate() {
            issues.extend(self.validate_probe(ProbeId(index as u32), spec, dt));
        }
        issues
    }

    fn validate_connection(
        &self,
        id: ConnectionId,
        spec: &ConnectionSpec,
        dt: f64,
    ) -> Vec<ConfigurationError> {
        let name = spec.display_name(id);
        let mut issues = Vec::new();

        let Some(source_dims) = self.source_dims(spec.source) else {
            issues.push(ConfigurationError::UnknownObject(format!(
                "{}: source {}",
                name, spec.source
            )));
            return issues;
        };
        let Some(destination) = self.population(spec.destination) else {
            issues.push(ConfigurationError::UnknownObject(format!(
                "{}: destination {}",
                name, spec.destination
            )));
            return issues;
        };

        let source_issues = spec
            .source_slice
            .validate(source_dims, SliceSide::Source, &name);
        let source_ok = source_issues.is_empty();
        issues.extend(source_issues);
        issues.extend(spec.destination_slice.validate(
            destination.dimensions(),
            SliceSide::Destination,
            &name,
        ));

        let sliced = spec.source_slice.len(source_dims);
        let addressed = spec.destination_slice.len(destination.dimensions());

        let produced = match &spec.target {
            DecodeTarget::Identity => Some((sliced, "source value".to_string())),
            DecodeTarget::Function(function_id) => match self.function(*function_id) {
                None => {
                    issues.push(ConfigurationError::UnknownObject(format!(
                        "{}: {}",
                        name, function_id
                    )));
                    None
                }
                Some(function) => {
                    let pinned_ok = match function.input_dims() {
                        Some(expected) if expected != sliced => {
                            issues.push(ConfigurationError::FunctionInputMismatch {
                                connection: name.clone(),
                                function: function.name().to_string(),
                                expected,
                                actual: sliced,
                            });
                            false
                        }
                        _ => true,
                    };
                    // Population sources are checked against every evaluation
                    // point during the solve; node sources are probed here.
                    if pinned_ok && source_ok && matches!(spec.source, Source::Node(_)) {
                        let actual = function.evaluate(&vec![0.0; sliced]).len();
                        if actual != function.output_dims() {
                            issues.push(ConfigurationError::DimensionMismatch {
                                connection: name.clone(),
                                what: format!("function {}", function.name()),
                                expected: function.output_dims(),
                                actual,
                            });
                        }
                    }
                    Some((
                        function.output_dims(),
                        format!("function {} output", function.name()),
                    ))
                }
            },
            DecodeTarget::Samples { points, targets } => {
                let mut problem = |reason: String| {
                    issues.push(ConfigurationError::InvalidSamples {
                        connection: name.clone(),
                        reason,
                    })
                };
                if matches!(spec.source, Source::Node(_)) {
                    problem("sample-defined decoders need a population source".to_string());
                }
                if !spec.source_slice.is_all() {
                    problem("sample points span the full source; source slice must be all".to_string());
                }
                if points.nrows() == 0 {
                    problem("no sample points".to_string());
                }
                if points.ncols() != source_dims {
                    problem(format!(
                        "points have {} column(s), source has {} dimension(s)",
                        points.ncols(),
                        source_dims
                    ));
                }
                if targets.nrows() != points.nrows() {
                    problem(format!(
                        "{} target row(s) for {} point(s)",
                        targets.nrows(),
                        points.nrows()
                    ));
                }
                if targets.ncols() == 0 {
                    problem("targets have no columns".to_string());
                }
                if points.iter().chain(targets.iter()).any(|v| !v.is_finite()) {
                    problem("non-finite sample value".to_string());
                }
                Some((targets.ncols(), "sample targets".to_string()))
            }
        };

        if let Some((output_dims, what)) = produced {
            issues.extend(spec.transform.validate(output_dims, addressed, &what, &name));
        }
        if let Some(issue) = LowPass::validate(spec.synapse, dt, &name) {
            issues.push(issue);
        }
        issues
    }

    fn validate_probe(&self, id: ProbeId, spec: &ProbeSpec, dt: f64) -> Vec<ConfigurationError> {
        let name = match &spec.label {
            Some(label) => format!("{} ({})", label, id),
            None => id.to_string(),
        };
        let mut issues = Vec::new();
        if self.probe_width(spec.target).is_none() {
            issues.push(ConfigurationError::UnknownObject(format!(
                "probe {}: target {:?}",
                name, spec.target
            )));
        }
        if spec.sample_every == 0 {
            issues.push(ConfigurationError::InvalidProbe {
                probe: name.clone(),
                reason: "sample period must be >= 1 tick".to_string(),
            });
        }
        if let Some(ConfigurationError::InvalidSynapse { tau, reason, .. }) =
            LowPass::validate(spec.synapse, dt, &name)
        {
            issues.push(ConfigurationError::InvalidProbe {
                probe: name,
                reason: format!("synapse tau {}: {}", tau, reason),
            });
        }
        issues
    }

    // ═══════════════════════════════════════════════════════════
    // Build
    // ═══════════════════════════════════════════════════════════

    /// Validate, solve (or reuse) every decoder, and compile a simulator
    pub fn build(&self, config: SimulatorConfig) -> SimResult<Simulator> {
        let started = Instant::now();

        let issues = self.validate(config.dt);
        if !issues.is_empty() {
            warn!(
                target: "critter-engine",
                "[BUILD] network rejected with {} configuration problem(s)",
                issues.len()
            );
            return Err(SimError::InvalidNetwork(issues));
        }

        let (jobs, connection_jobs) = self.decoder_jobs();
        let before = self.decoder_cache.stats();

        let results: Vec<Result<Arc<Decoder>, ConfigurationError>> =
            if config.parallel_decoder_solve {
                jobs.par_iter().map(|job| self.solve_job(job)).collect()
            } else {
                jobs.iter().map(|job| self.solve_job(job)).collect()
            };

        let mut decoders = Vec::with_capacity(results.len());
        let mut issues = Vec::new();
        for result in results {
            match result {
                Ok(decoder) => decoders.push(decoder),
                Err(issue) => issues.push(issue),
            }
        }
        if !issues.is_empty() {
            warn!(
                target: "critter-engine",
                "[BUILD] decoder solving failed with {} problem(s)",
                issues.len()
            );
            return Err(SimError::InvalidNetwork(issues));
        }

        let identity_decoders = decoders[..self.populations.len()].to_vec();
        let connections = self
            .connections
            .iter()
            .enumerate()
            .map(|(index, spec)| self.compile_connection(index, spec, &connection_jobs, &decoders))
            .collect::<SimResult<Vec<_>>>()?;

        let probes = self
            .probes
            .iter()
            .map(|spec| ProbeRecorder::new(spec, self.probe_width(spec.target).unwrap_or(0)))
            .collect();

        let after = self.decoder_cache.stats();
        let build_time = started.elapsed();
        info!(
            target: "critter-engine",
            "[BUILD] {} population(s), {} node(s), {} connection(s), {} probe(s); {} decoder(s) solved, {} reused in {:.1}ms",
            self.populations.len(),
            self.nodes.len(),
            self.connections.len(),
            self.probes.len(),
            after.solves - before.solves,
            after.hits - before.hits,
            build_time.as_secs_f64() * 1000.0
        );

        Ok(Simulator::new(
            CompiledNetwork {
                populations: self.populations.iter().map(|e| Arc::clone(&e.population)).collect(),
                identity_decoders,
                nodes: self.nodes.clone(),
                connections,
                probes,
                decoders_solved: after.solves - before.solves,
                decoders_reused: after.hits - before.hits,
                build_time,
            },
            config.dt,
        ))
    }

    /// Identity decoders for every population first (in order), then one job
    /// per population-sourced connection. The second vector maps connection
    /// index to job index.
    fn decoder_jobs(&self) -> (Vec<DecoderJob<'_>>, Vec<Option<usize>>) {
        let mut jobs: Vec<DecoderJob<'_>> = self
            .populations
            .iter()
            .map(|entry| DecoderJob {
                key: DecoderKey {
                    population: entry.population.id(),
                    target: TargetKey::Identity,
                    source_slice: (0..entry.population.dimensions()).collect(),
                },
                entry,
                function: None,
                samples: None,
                owner: entry.population.label().to_string(),
            })
            .collect();

        let mut connection_jobs = Vec::with_capacity(self.connections.len());
        for (index, spec) in self.connections.iter().enumerate() {
            let id = ConnectionId(index as u32);
            let Source::Population(population) = spec.source else {
                connection_jobs.push(None);
                continue;
            };
            let entry = &self.populations[population.index()];
            let source_slice = spec.source_slice.resolve(entry.population.dimensions());
            let (target, function, samples) = match &spec.target {
                DecodeTarget::Identity => (TargetKey::Identity, None, None),
                DecodeTarget::Function(function) => (
                    TargetKey::Function(*function),
                    Some(Arc::clone(&self.functions[function.index()])),
                    None,
                ),
                DecodeTarget::Samples { points, targets } => {
                    (TargetKey::Samples(id), None, Some((points, targets)))
                }
            };
            connection_jobs.push(Some(jobs.len()));
            jobs.push(DecoderJob {
                key: DecoderKey {
                    population,
                    target,
                    source_slice,
                },
                entry,
                function,
                samples,
                owner: spec.display_name(id),
            });
        }
        (jobs, connection_jobs)
    }

    fn solve_job(&self, job: &DecoderJob<'_>) -> Result<Arc<Decoder>, ConfigurationError> {
        let solver = DecoderSolver::new(self.settings.solver);
        self.decoder_cache.get_or_solve(&job.key, || {
            let population = job.entry.population.as_ref();
            if let Some((points, targets)) = job.samples {
                let system = solver.prepare(population, points.clone());
                return Ok(solver.solve(&system, targets));
            }
            let system = self.decoder_cache.system_or_prepare(population.id(), || {
                solver.prepare(population, job.entry.eval_points.clone())
            });
            let targets = function_targets(
                system.eval_points(),
                &job.key.source_slice,
                job.function.as_deref(),
            )
            .map_err(|(expected, actual)| ConfigurationError::DimensionMismatch {
                connection: job.owner.clone(),
                what: match &job.function {
                    Some(function) => format!("function {} (declared output)", function.name()),
                    None => "identity decode".to_string(),
                },
                expected,
                actual,
            })?;
            Ok(solver.solve(&system, &targets))
        })
    }

    fn compile_connection(
        &self,
        index: usize,
        spec: &ConnectionSpec,
        connection_jobs: &[Option<usize>],
        decoders: &[Arc<Decoder>],
    ) -> SimResult<CompiledConnection> {
        let id = ConnectionId(index as u32);
        let destination_dims = self.populations[spec.destination.index()]
            .population
            .dimensions();

        let source = match spec.source {
            Source::Population(population) => {
                let job = connection_jobs[index].ok_or_else(|| {
                    SimError::UnknownObject(format!("decoder for {}", spec.display_name(id)))
                })?;
                CompiledSource::Population {
                    index: population.index(),
                    decoder: Arc::clone(&decoders[job]),
                }
            }
            Source::Node(node) => CompiledSource::Node {
                index: node.index(),
                indices: spec
                    .source_slice
                    .resolve(self.nodes[node.index()].dimensions),
                function: match spec.target {
                    DecodeTarget::Function(function) => {
                        Some(Arc::clone(&self.functions[function.index()]))
                    }
                    _ => None,
                },
            },
        };

        Ok(CompiledConnection {
            id,
            name: spec.display_name(id),
            source,
            destination: spec.destination.index(),
            destination_indices: spec.destination_slice.resolve(destination_dims),
            transform: spec.transform.clone(),
            filter: LowPass::from_tau(spec.synapse),
            width: spec.destination_slice.len(destination_dims),
        })
    }
}
