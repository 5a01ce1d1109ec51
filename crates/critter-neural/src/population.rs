// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Population (encoding)
//!
//! A fixed set of rate units that together represent a vector in `R^D`.
//!
//! ```text
//! activation_i(x) = rate(gain_i * dot(encoder_i, x / radius) + bias_i)
//! ```
//!
//! Tuning (unit-norm encoders, gains, biases) is drawn once from a seeded
//! stream and never changes. Inputs beyond the radius are NOT clipped: the
//! units keep responding and only decoding accuracy degrades.

use ndarray::{Array1, Array2, ArrayView1};

use crate::models::{NeuronType, ResponseModel};
use crate::rng::SeededStream;
use crate::types::error::ConfigurationError;
use crate::types::ids::PopulationId;

/// Construction parameters for a population
#[derive(Debug, Clone, PartialEq)]
pub struct PopulationParams {
    pub label: String,
    pub n_neurons: usize,
    pub dimensions: usize,
    pub radius: f64,
    pub neuron_type: NeuronType,
    /// Uniform range for each unit's rate at normalized input 1 (Hz)
    pub max_rates: (f64, f64),
    /// Uniform range for each unit's x-intercept (normalized)
    pub intercepts: (f64, f64),
}

impl PopulationParams {
    pub fn new(label: impl Into<String>, n_neurons: usize, dimensions: usize) -> Self {
        Self {
            label: label.into(),
            n_neurons,
            dimensions,
            radius: 1.0,
            neuron_type: NeuronType::default(),
            max_rates: (200.0, 400.0),
            intercepts: (-1.0, 0.9),
        }
    }

    pub fn radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    pub fn neuron_type(mut self, neuron_type: NeuronType) -> Self {
        self.neuron_type = neuron_type;
        self
    }

    pub fn max_rates(mut self, low: f64, high: f64) -> Self {
        self.max_rates = (low, high);
        self
    }

    pub fn intercepts(mut self, low: f64, high: f64) -> Self {
        self.intercepts = (low, high);
        self
    }

    /// All parameter problems, empty when valid
    pub fn validate(&self) -> Vec<ConfigurationError> {
        let mut reasons = Vec::new();
        if self.n_neurons == 0 {
            reasons.push("n_neurons must be > 0".to_string());
        }
        if self.dimensions == 0 {
            reasons.push("dimensions must be > 0".to_string());
        }
        if !(self.radius.is_finite() && self.radius > 0.0) {
            reasons.push(format!("radius {} must be finite and > 0", self.radius));
        }
        let (lo, hi) = self.intercepts;
        if !(lo >= -1.0 && lo <= hi && hi < 1.0) {
            reasons.push(format!(
                "intercepts [{}, {}] must satisfy -1 <= low <= high < 1",
                lo, hi
            ));
        }
        if let Err(reason) = self
            .neuron_type
            .check_max_rates(self.max_rates.0, self.max_rates.1)
        {
            reasons.push(reason);
        }
        reasons
            .into_iter()
            .map(|reason| ConfigurationError::InvalidPopulation {
                population: self.label.clone(),
                reason,
            })
            .collect()
    }
}

/// Tuned population of rate units
#[derive(Debug, Clone)]
pub struct Population {
    id: PopulationId,
    label: String,
    radius: f64,
    neuron_type: NeuronType,
    /// Unit-norm preferred directions, one row per unit (N x D)
    encoders: Array2<f64>,
    gains: Array1<f64>,
    biases: Array1<f64>,
}

impl Population {
    /// Draw tuning for `params` from `stream`
    ///
    /// Callers validate `params` first; invalid parameters yield a population
    /// whose rates are meaningless but never panic.
    pub fn new(id: PopulationId, params: &PopulationParams, stream: &mut SeededStream) -> Self {
        let n = params.n_neurons;
        let d = params.dimensions;

        let mut encoders = Array2::<f64>::zeros((n, d));
        for i in 0..n {
            for (j, v) in stream.unit_vector(d).into_iter().enumerate() {
                encoders[[i, j]] = v;
            }
        }

        let mut gains = Array1::<f64>::zeros(n);
        let mut biases = Array1::<f64>::zeros(n);
        for i in 0..n {
            let max_rate = stream.uniform(params.max_rates.0, params.max_rates.1);
            let intercept = stream.uniform(params.intercepts.0, params.intercepts.1);
            let (gain, bias) = params.neuron_type.gain_bias(max_rate, intercept);
            gains[i] = gain;
            biases[i] = bias;
        }

        Self {
            id,
            label: params.label.clone(),
            radius: params.radius,
            neuron_type: params.neuron_type,
            encoders,
            gains,
            biases,
        }
    }

    pub fn id(&self) -> PopulationId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn n_neurons(&self) -> usize {
        self.encoders.nrows()
    }

    pub fn dimensions(&self) -> usize {
        self.encoders.ncols()
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn neuron_type(&self) -> NeuronType {
        self.neuron_type
    }

    pub fn encoders(&self) -> &Array2<f64> {
        &self.encoders
    }

    pub fn gains(&self) -> &Array1<f64> {
        &self.gains
    }

    pub fn biases(&self) -> &Array1<f64> {
        &self.biases
    }

    /// Activation of every unit for a represented vector
    pub fn encode(&self, x: &[f64]) -> Vec<f64> {
        let mut out = vec![0.0; self.n_neurons()];
        self.encode_into(x, &mut out);
        out
    }

    /// Allocation-free [`Population::encode`]
    pub fn encode_into(&self, x: &[f64], out: &mut [f64]) {
        debug_assert_eq!(x.len(), self.dimensions());
        debug_assert_eq!(out.len(), self.n_neurons());
        let projected = self.encoders.dot(&ArrayView1::from(x));
        let inv_radius = 1.0 / self.radius;
        for (i, slot) in out.iter_mut().enumerate() {
            let current = self.gains[i] * projected[i] * inv_radius + self.biases[i];
            *slot = self.neuron_type.rate(current);
        }
    }

    /// Activity matrix for a batch of points (rows) -> (points x units)
    pub fn activities(&self, points: &Array2<f64>) -> Array2<f64> {
        let scaled_gains = &self.gains / self.radius;
        let mut currents = points.dot(&self.encoders.t());
        currents *= &scaled_gains;
        currents += &self.biases;
        let model = self.neuron_type;
        currents.mapv_into(|j| model.rate(j))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RectifiedLinear;
    use proptest::prelude::*;

    fn population(n: usize, d: usize, seed: u64) -> Population {
        let params = PopulationParams::new("p", n, d);
        Population::new(PopulationId(0), &params, &mut SeededStream::new(seed))
    }

    #[test]
    fn test_shapes() {
        let p = population(40, 3, 1);
        assert_eq!(p.n_neurons(), 40);
        assert_eq!(p.dimensions(), 3);
        assert_eq!(p.encode(&[0.1, 0.2, 0.3]).len(), 40);
    }

    #[test]
    fn test_same_seed_same_tuning() {
        let a = population(30, 2, 9);
        let b = population(30, 2, 9);
        assert_eq!(a.encoders(), b.encoders());
        assert_eq!(a.gains(), b.gains());
        assert_eq!(a.biases(), b.biases());
    }

    #[test]
    fn test_batch_matches_single() {
        let p = population(25, 2, 4);
        let points = ndarray::arr2(&[[0.3, -0.4], [1.5, 0.0], [0.0, 0.0]]);
        let batch = p.activities(&points);
        for (row, point) in batch.rows().into_iter().zip(points.rows()) {
            let single = p.encode(point.as_slice().unwrap());
            for (a, b) in row.iter().zip(&single) {
                assert!((a - b).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_no_clipping_beyond_radius() {
        // A rectified-linear unit keeps growing past the radius
        let params = PopulationParams::new("relu", 50, 1)
            .neuron_type(NeuronType::RectifiedLinear(RectifiedLinear::default()));
        let p = Population::new(PopulationId(0), &params, &mut SeededStream::new(2));
        let at_radius: f64 = p.encode(&[1.0]).iter().sum();
        let beyond: f64 = p.encode(&[3.0]).iter().sum();
        assert!(beyond > at_radius);
    }

    #[test]
    fn test_validate_params() {
        assert!(PopulationParams::new("ok", 10, 1).validate().is_empty());
        let bad = PopulationParams::new("bad", 0, 0).radius(-1.0).intercepts(0.5, 1.0);
        assert_eq!(bad.validate().len(), 4);
        let bad_rates = PopulationParams::new("fast", 10, 1).max_rates(100.0, 600.0);
        assert_eq!(bad_rates.validate().len(), 1);
    }

    proptest! {
        #[test]
        fn prop_encoders_are_unit_norm(seed in any::<u64>(), n in 1usize..40, d in 1usize..5) {
            let p = population(n, d, seed);
            for row in p.encoders().rows() {
                let norm = row.dot(&row).sqrt();
                prop_assert!((norm - 1.0).abs() < 1e-9);
            }
        }
    }
}
