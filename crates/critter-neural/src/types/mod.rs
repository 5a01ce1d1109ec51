// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Neural Types Module
//!
//! Identifiers for network objects and the crate-wide error type.

pub mod error;
pub mod ids;

pub use error::{ConfigurationError, Result, SimError, SimResult};
pub use ids::{ConnectionId, FunctionId, NodeId, PopulationId, ProbeId};
