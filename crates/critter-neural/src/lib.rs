// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Critter Neural Computation
//!
//! All of the numerics behind ensemble simulation in one place:
//! - **Types**: identifiers and the shared error enum
//! - **Models**: rate response models (LIF rate, rectified linear, sigmoid)
//! - **Population**: per-unit tuning and encoding of a vector into activity
//! - **Sampling**: evaluation points drawn inside a population's radius
//! - **Decoder**: regularized least-squares readouts of represented values
//! - **Function / Transform / Slice**: the pieces a connection composes
//! - **Synapse**: exponential low-pass filtering of projected signals
//!
//! Nothing in this crate knows about network topology; the engine crate wires
//! these pieces into a simulator.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod types;

pub mod rng;
pub mod sampling;

pub mod models;
pub mod population;

pub mod decoder;

pub mod function;
pub mod slice;
pub mod transform;

pub mod synapse;

pub use types::{
    ConnectionId, ConfigurationError, FunctionId, NodeId, PopulationId, ProbeId, Result,
    SimError, SimResult,
};

pub use decoder::{Decoder, DecoderSolver, RegressionSystem, SolverParams};
pub use function::{FnSignal, SignalFunction};
pub use models::{LifRate, NeuronType, RectifiedLinear, ResponseModel, Sigmoid};
pub use population::{Population, PopulationParams};
pub use rng::SeededStream;
pub use slice::DimensionSlice;
pub use synapse::LowPass;
pub use transform::Transform;
