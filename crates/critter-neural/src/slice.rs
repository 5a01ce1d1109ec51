// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Dimension subsets on either end of a connection
//!
//! A destination slice is an index-set view over the destination's fixed-size
//! input accumulator: contributions land only in the addressed slots.

use core::ops::Range;

use crate::types::error::{ConfigurationError, SliceSide};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum DimensionSlice {
    /// Every dimension, in order
    #[default]
    All,
    /// Explicit indices, in the order given
    Indices(Vec<usize>),
}

impl DimensionSlice {
    /// Concrete indices for an object with `dims` dimensions
    pub fn resolve(&self, dims: usize) -> Vec<usize> {
        match self {
            DimensionSlice::All => (0..dims).collect(),
            DimensionSlice::Indices(indices) => indices.clone(),
        }
    }

    /// Number of addressed dimensions
    pub fn len(&self, dims: usize) -> usize {
        match self {
            DimensionSlice::All => dims,
            DimensionSlice::Indices(indices) => indices.len(),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, DimensionSlice::All)
    }

    /// Check indices against `dims`. Destination slices must also be
    /// duplicate-free; a repeated source index is a legal fan-out.
    pub fn validate(
        &self,
        dims: usize,
        side: SliceSide,
        connection: &str,
    ) -> Vec<ConfigurationError> {
        let mut issues = Vec::new();
        let indices = match self {
            DimensionSlice::All => return issues,
            DimensionSlice::Indices(indices) => indices,
        };

        if indices.is_empty() {
            issues.push(ConfigurationError::EmptySlice {
                connection: connection.to_string(),
                side,
            });
            return issues;
        }

        let mut seen = vec![false; dims];
        for &index in indices {
            if index >= dims {
                issues.push(ConfigurationError::SliceOutOfRange {
                    connection: connection.to_string(),
                    side,
                    index,
                    dims,
                });
                continue;
            }
            if side == SliceSide::Destination {
                if seen[index] {
                    issues.push(ConfigurationError::DuplicateSliceIndex {
                        connection: connection.to_string(),
                        index,
                    });
                }
                seen[index] = true;
            }
        }
        issues
    }
}

/// Gather `indices` out of `values`
#[inline]
pub fn gather(values: &[f64], indices: &[usize]) -> Vec<f64> {
    indices.iter().map(|&i| values[i]).collect()
}

/// Add `values` into `target` at `indices`
#[inline]
pub fn scatter_add(target: &mut [f64], indices: &[usize], values: &[f64]) {
    debug_assert_eq!(indices.len(), values.len());
    for (&i, &v) in indices.iter().zip(values) {
        target[i] += v;
    }
}

impl From<Vec<usize>> for DimensionSlice {
    fn from(indices: Vec<usize>) -> Self {
        DimensionSlice::Indices(indices)
    }
}

impl<const N: usize> From<[usize; N]> for DimensionSlice {
    fn from(indices: [usize; N]) -> Self {
        DimensionSlice::Indices(indices.to_vec())
    }
}

impl From<&[usize]> for DimensionSlice {
    fn from(indices: &[usize]) -> Self {
        DimensionSlice::Indices(indices.to_vec())
    }
}

impl From<Range<usize>> for DimensionSlice {
    fn from(range: Range<usize>) -> Self {
        DimensionSlice::Indices(range.collect())
    }
}

impl From<usize> for DimensionSlice {
    fn from(index: usize) -> Self {
        DimensionSlice::Indices(vec![index])
    }
}
