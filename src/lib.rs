// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # critter
//!
//! Neural-ensemble simulation of a small agent: populations of rate neurons
//! represent continuous signals, connections compose decoding, an optional
//! function, a linear transform and a synaptic filter, and a fixed-step
//! simulator integrates the whole network deterministically.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use critter::prelude::*;
//!
//! let settings = RunSettings::default();
//! let (net, critter) = critter_network(&settings)?;
//! let mut sim = net.build(settings.simulator)?;
//! sim.run(1.0)?;
//! for row in critter.trajectory(&sim)? {
//!     println!("{:.3} {:?}", row.time, row.position);
//! }
//! # Ok::<(), critter::neural::SimError>(())
//! ```
//!
//! ## Feature Flags
//!
//! - **`parallel-solve`** (default): solve decoders for distinct populations
//!   and functions on the rayon pool during `build`
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Foundation: critter-config, critter-observability      │
//! │  (TOML + overrides, tracing subscriber setup)           │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Numerics: critter-neural                               │
//! │  (populations, decoders, transforms, filters)           │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Engine: critter-engine                                 │
//! │  (network graph, decoder cache, simulator, probes)      │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  This crate: settings mapping, critter topology         │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub use critter_config as config;
pub use critter_engine as engine;
pub use critter_neural as neural;
pub use critter_observability as observability;

pub mod settings;
pub mod topology;

pub use settings::{EnsembleDefaults, RunSettings};
pub use topology::{build_critter, critter_network, Critter, CritterProbes, TrajectorySample};

/// Prelude - commonly used types and traits
pub mod prelude {
    pub use crate::engine::{
        ConnectionSpec, Network, NetworkSettings, NodeSpec, ProbeSpec, ProbeTarget, Simulator,
        SimulatorConfig, SimulatorStatus,
    };
    pub use crate::neural::{
        DimensionSlice, FnSignal, NeuronType, PopulationParams, SignalFunction, SimError,
        SimResult, Transform,
    };
    pub use crate::settings::{EnsembleDefaults, RunSettings};
    pub use crate::topology::{build_critter, critter_network, Critter, TrajectorySample};
}
