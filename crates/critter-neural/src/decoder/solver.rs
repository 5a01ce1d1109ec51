// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Regularized least-squares decoder solving

use ndarray::{Array2, ArrayView1};
use tracing::{debug, warn};

use super::cholesky::{cholesky, cholesky_solve};
use crate::function::SignalFunction;
use crate::population::Population;
use crate::sampling::function_targets;
use crate::types::ids::PopulationId;

/// Attempts to factor the Gram matrix, multiplying lambda by 10 each time
const MAX_RIDGE_ATTEMPTS: usize = 6;

/// Ridge floor (per evaluation point) when `reg = 0`
const MIN_RIDGE_PER_POINT: f64 = 1e-10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverParams {
    /// Noise level relative to the largest activity (L2 regularization)
    pub regularization: f64,
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            regularization: 0.1,
        }
    }
}

/// Factored regression problem for one population and point set
#[derive(Debug, Clone)]
pub struct RegressionSystem {
    population: PopulationId,
    eval_points: Array2<f64>,
    activities: Array2<f64>,
    /// `None` when factorization failed at every ridge level
    factor: Option<Array2<f64>>,
    lambda: f64,
}

impl RegressionSystem {
    pub fn population(&self) -> PopulationId {
        self.population
    }

    pub fn eval_points(&self) -> &Array2<f64> {
        &self.eval_points
    }

    pub fn activities(&self) -> &Array2<f64> {
        &self.activities
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    pub fn is_factored(&self) -> bool {
        self.factor.is_some()
    }
}

/// Linear readout from activation to a decoded vector
#[derive(Debug, Clone, PartialEq)]
pub struct Decoder {
    /// Dm x N
    weights: Array2<f64>,
    /// Residual RMSE over the evaluation points
    rmse: f64,
}

impl Decoder {
    pub fn zeros(output_dims: usize, n_neurons: usize) -> Self {
        Self {
            weights: Array2::zeros((output_dims, n_neurons)),
            rmse: 0.0,
        }
    }

    pub fn weights(&self) -> &Array2<f64> {
        &self.weights
    }

    pub fn output_dims(&self) -> usize {
        self.weights.nrows()
    }

    pub fn n_neurons(&self) -> usize {
        self.weights.ncols()
    }

    pub fn rmse(&self) -> f64 {
        self.rmse
    }

    /// Decoded vector for one activation snapshot
    #[inline]
    pub fn decode(&self, activation: &[f64]) -> Vec<f64> {
        debug_assert_eq!(activation.len(), self.n_neurons());
        self.weights.dot(&ArrayView1::from(activation)).to_vec()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DecoderSolver {
    params: SolverParams,
}

impl DecoderSolver {
    pub fn new(params: SolverParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> SolverParams {
        self.params
    }

    /// Compute activities on `eval_points` and factor the ridge Gram matrix
    pub fn prepare(&self, population: &Population, eval_points: Array2<f64>) -> RegressionSystem {
        let activities = population.activities(&eval_points);
        let m = activities.nrows() as f64;
        let max_activity = activities.iter().copied().fold(0.0f64, f64::max);

        let reg = self.params.regularization;
        let mut lambda = m * (reg * max_activity).powi(2);
        if !(lambda > 0.0) || !lambda.is_finite() {
            // Silent population: regularize as if max activity were 1
            lambda = (m * reg * reg).max(m * MIN_RIDGE_PER_POINT);
        }

        let gram = activities.t().dot(&activities);
        let mut factor = None;
        for attempt in 0..MAX_RIDGE_ATTEMPTS {
            let mut regularized = gram.clone();
            regularized.diag_mut().mapv_inplace(|v| v + lambda);
            if let Some(l) = cholesky(&regularized) {
                factor = Some(l);
                break;
            }
            warn!(
                target: "critter-neural",
                "[DECODER] {} ({}): Gram matrix not positive definite at lambda={:.3e} (attempt {}), increasing regularization",
                population.label(),
                population.id(),
                lambda,
                attempt + 1
            );
            lambda *= 10.0;
        }
        if factor.is_none() {
            warn!(
                target: "critter-neural",
                "[DECODER] {} ({}): factorization failed, decoders fall back to zero",
                population.label(),
                population.id()
            );
        }

        RegressionSystem {
            population: population.id(),
            eval_points,
            activities,
            factor,
            lambda,
        }
    }

    /// Best-fit decoder for `targets` (one row per evaluation point)
    ///
    /// Rank deficiency is never an error: the ridge term keeps the solution
    /// unique and the residual shows up in [`Decoder::rmse`].
    pub fn solve(&self, system: &RegressionSystem, targets: &Array2<f64>) -> Decoder {
        debug_assert_eq!(targets.nrows(), system.activities.nrows());
        let n_neurons = system.activities.ncols();
        let output_dims = targets.ncols();

        let Some(factor) = system.factor.as_ref() else {
            return Decoder::zeros(output_dims, n_neurons);
        };

        let rhs = system.activities.t().dot(targets);
        let solution = cholesky_solve(factor, &rhs); // N x Dm

        let residual = system.activities.dot(&solution) - targets;
        let count = residual.len().max(1) as f64;
        let rmse = (residual.iter().map(|r| r * r).sum::<f64>() / count).sqrt();

        debug!(
            target: "critter-neural",
            "[DECODER] {}: solved {}x{} decoder, lambda={:.3e}, rmse={:.5}",
            system.population,
            output_dims,
            n_neurons,
            system.lambda,
            rmse
        );

        Decoder {
            weights: solution.t().to_owned(),
            rmse,
        }
    }

    /// Decoder for `function(x[slice])` over `eval_points`
    ///
    /// Errors with `(declared, produced)` if the function's output length
    /// disagrees with its declared dimensionality.
    pub fn solve_function(
        &self,
        population: &Population,
        eval_points: Array2<f64>,
        slice: &[usize],
        function: Option<&dyn SignalFunction>,
    ) -> Result<Decoder, (usize, usize)> {
        let targets = function_targets(&eval_points, slice, function)?;
        let system = self.prepare(population, eval_points);
        Ok(self.solve(&system, &targets))
    }
}
