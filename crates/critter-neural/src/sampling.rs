// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Evaluation points and regression targets for decoder solving

use ndarray::Array2;

use crate::function::SignalFunction;
use crate::rng::SeededStream;
use crate::slice::gather;

/// Number of evaluation points for a population of `n_neurons`
pub fn eval_point_count(n_neurons: usize, per_neuron: usize, minimum: usize) -> usize {
    (n_neurons * per_neuron).max(minimum).max(1)
}

/// `count` points drawn uniformly from the `dims`-ball of `radius`
pub fn sample_eval_points(
    stream: &mut SeededStream,
    count: usize,
    dims: usize,
    radius: f64,
) -> Array2<f64> {
    let mut points = Array2::<f64>::zeros((count, dims));
    for mut row in points.rows_mut() {
        for (slot, v) in row.iter_mut().zip(stream.point_in_ball(dims, radius)) {
            *slot = v;
        }
    }
    points
}

/// Regression targets for decoding `function(x[slice])` (or `x[slice]`)
///
/// Returns `Err((expected, actual))` if the function's output length
/// disagrees with its declared dimensionality at any point.
pub fn function_targets(
    points: &Array2<f64>,
    slice: &[usize],
    function: Option<&dyn SignalFunction>,
) -> Result<Array2<f64>, (usize, usize)> {
    let out_dims = function.map(|f| f.output_dims()).unwrap_or(slice.len());
    let mut targets = Array2::<f64>::zeros((points.nrows(), out_dims));
    for (point, mut target) in points.rows().into_iter().zip(targets.rows_mut()) {
        let full: Vec<f64> = point.iter().copied().collect();
        let x = gather(&full, slice);
        let y = match function {
            Some(f) => f.evaluate(&x),
            None => x,
        };
        if y.len() != out_dims {
            return Err((out_dims, y.len()));
        }
        for (slot, v) in target.iter_mut().zip(y) {
            *slot = v;
        }
    }
    Ok(targets)
}
