// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Linear transform applied after a connection's function
//!
//! `Identity` and `Scalar` preserve dimensionality; a bare scalar is
//! broadcast as `scalar * I`. `Matrix` maps `cols` inputs onto `rows`
//! addressed destination dimensions.

use ndarray::{Array2, ArrayView1};

use crate::types::error::ConfigurationError;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Transform {
    #[default]
    Identity,
    Scalar(f64),
    Matrix(Array2<f64>),
}

impl Transform {
    /// Build a matrix transform from row slices
    ///
    /// Every row must have the length of the first.
    pub fn from_rows(rows: &[&[f64]]) -> Result<Self, ConfigurationError> {
        let n_cols = rows.first().map_or(0, |r| r.len());
        let mut m = Array2::<f64>::zeros((rows.len(), n_cols));
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n_cols {
                return Err(ConfigurationError::RaggedTransform {
                    row: i,
                    expected: n_cols,
                    actual: row.len(),
                });
            }
            for (j, &v) in row.iter().enumerate() {
                m[[i, j]] = v;
            }
        }
        Ok(Transform::Matrix(m))
    }

    /// Output dimensionality for a given input dimensionality
    pub fn output_dims(&self, input_dims: usize) -> usize {
        match self {
            Transform::Identity | Transform::Scalar(_) => input_dims,
            Transform::Matrix(m) => m.nrows(),
        }
    }

    /// Check the transform maps `input_dims` onto exactly `output_dims`
    pub fn validate(
        &self,
        input_dims: usize,
        output_dims: usize,
        input_name: &str,
        connection: &str,
    ) -> Vec<ConfigurationError> {
        let mut issues = Vec::new();
        match self {
            Transform::Identity => {
                if input_dims != output_dims {
                    issues.push(ConfigurationError::DimensionMismatch {
                        connection: connection.to_string(),
                        what: input_name.to_string(),
                        expected: output_dims,
                        actual: input_dims,
                    });
                }
            }
            Transform::Scalar(s) => {
                if !s.is_finite() {
                    issues.push(ConfigurationError::NonFiniteTransform {
                        connection: connection.to_string(),
                    });
                }
                if input_dims != output_dims {
                    issues.push(ConfigurationError::DimensionMismatch {
                        connection: connection.to_string(),
                        what: format!("scalar transform of {}", input_name),
                        expected: output_dims,
                        actual: input_dims,
                    });
                }
            }
            Transform::Matrix(m) => {
                if m.ncols() != input_dims || m.nrows() != output_dims {
                    issues.push(ConfigurationError::TransformShape {
                        connection: connection.to_string(),
                        rows: m.nrows(),
                        cols: m.ncols(),
                        expected_rows: output_dims,
                        expected_cols: input_dims,
                    });
                }
                if m.iter().any(|v| !v.is_finite()) {
                    issues.push(ConfigurationError::NonFiniteTransform {
                        connection: connection.to_string(),
                    });
                }
            }
        }
        issues
    }

    /// Apply to a vector whose length has already been validated
    pub fn apply(&self, x: &[f64]) -> Vec<f64> {
        match self {
            Transform::Identity => x.to_vec(),
            Transform::Scalar(s) => x.iter().map(|v| s * v).collect(),
            Transform::Matrix(m) => m.dot(&ArrayView1::from(x)).to_vec(),
        }
    }
}

impl From<f64> for Transform {
    fn from(scalar: f64) -> Self {
        Transform::Scalar(scalar)
    }
}

impl From<Array2<f64>> for Transform {
    fn from(matrix: Array2<f64>) -> Self {
        Transform::Matrix(matrix)
    }
}
