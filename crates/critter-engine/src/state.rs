// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Per-tick simulation state
//!
//! The simulator keeps two of these: the committed state of the last tick and
//! a scratch copy the next tick is computed into. A tick is committed by
//! swapping the two, so a failing tick never leaks partial values.

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationState {
    pub(crate) tick: u64,
    pub(crate) time: f64,
    pub(crate) node_outputs: Vec<Vec<f64>>,
    /// Summed contributions per population (input accumulator)
    pub(crate) inputs: Vec<Vec<f64>>,
    pub(crate) activations: Vec<Vec<f64>>,
    /// Identity-decoded value per population
    pub(crate) decoded: Vec<Vec<f64>>,
    /// Filtered value per connection, in destination-slice coordinates
    pub(crate) filters: Vec<Vec<f64>>,
}

impl SimulationState {
    /// All-zero state at t = 0
    ///
    /// `populations` is `(dimensions, n_neurons)` per population.
    pub(crate) fn zeroed(
        node_dims: &[usize],
        populations: &[(usize, usize)],
        connection_widths: &[usize],
    ) -> Self {
        Self {
            tick: 0,
            time: 0.0,
            node_outputs: node_dims.iter().map(|&d| vec![0.0; d]).collect(),
            inputs: populations.iter().map(|&(d, _)| vec![0.0; d]).collect(),
            activations: populations.iter().map(|&(_, n)| vec![0.0; n]).collect(),
            decoded: populations.iter().map(|&(d, _)| vec![0.0; d]).collect(),
            filters: connection_widths.iter().map(|&w| vec![0.0; w]).collect(),
        }
    }

    /// Number of committed ticks
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn node_outputs(&self) -> &[Vec<f64>] {
        &self.node_outputs
    }

    pub fn inputs(&self) -> &[Vec<f64>] {
        &self.inputs
    }

    pub fn activations(&self) -> &[Vec<f64>] {
        &self.activations
    }

    pub fn decoded(&self) -> &[Vec<f64>] {
        &self.decoded
    }

    pub fn filters(&self) -> &[Vec<f64>] {
        &self.filters
    }
}
