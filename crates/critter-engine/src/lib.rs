// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

//! # Critter Engine
//!
//! Network graph and step-driven simulator for neural ensembles.
//!
//! ## Architecture
//! - [`Network`]: populations, nodes, functions, connections, probes
//! - [`Network::build`]: validates the graph, solves decoders (in parallel
//!   across distinct keys, deduplicated through the [`DecoderCache`])
//! - [`Simulator`]: single-threaded, double-buffered ticks
//!
//! ```text
//! Node ──► Connection ──► Population.encode ──► activation
//!              ▲                                    │
//!              └── filter ◄── transform ◄── decode ◄┘  (previous tick)
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod connection;
pub mod decoder_cache;
pub mod network;
pub mod node;
pub mod probe;
pub mod simulator;
pub mod state;

pub use connection::{ConnectionSpec, DecodeTarget, Source};
pub use decoder_cache::{DecoderCache, DecoderCacheStats, DecoderKey, TargetKey};
pub use network::{Network, NetworkSettings};
pub use node::{NodeOutput, NodeSpec, TimeFunction};
pub use probe::{ProbeSpec, ProbeTarget};
pub use simulator::{Simulator, SimulatorConfig, SimulatorStats, SimulatorStatus};
pub use state::SimulationState;
