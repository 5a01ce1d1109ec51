// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! External input nodes
//!
//! A node has no state: its output is a constant vector or a pure function
//! of simulation time. Time functions may fail; a failure halts the run.

use std::fmt;
use std::sync::Arc;

use critter_neural::ConfigurationError;

/// Fallible function of simulation time
pub type TimeFunction = Arc<dyn Fn(f64) -> Result<Vec<f64>, String> + Send + Sync>;

#[derive(Clone)]
pub enum NodeOutput {
    Constant(Vec<f64>),
    Time(TimeFunction),
}

impl fmt::Debug for NodeOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeOutput::Constant(values) => f.debug_tuple("Constant").field(values).finish(),
            NodeOutput::Time(_) => f.write_str("Time(<fn>)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NodeSpec {
    pub label: String,
    pub dimensions: usize,
    pub output: NodeOutput,
}

impl NodeSpec {
    pub fn constant(label: impl Into<String>, values: impl Into<Vec<f64>>) -> Self {
        let values = values.into();
        Self {
            label: label.into(),
            dimensions: values.len(),
            output: NodeOutput::Constant(values),
        }
    }

    /// Infallible time function producing `dimensions` values
    pub fn time_function<F>(label: impl Into<String>, dimensions: usize, f: F) -> Self
    where
        F: Fn(f64) -> Vec<f64> + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            dimensions,
            output: NodeOutput::Time(Arc::new(move |t| Ok(f(t)))),
        }
    }

    /// Time function that may reject a time value
    pub fn try_time_function<F>(label: impl Into<String>, dimensions: usize, f: F) -> Self
    where
        F: Fn(f64) -> Result<Vec<f64>, String> + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            dimensions,
            output: NodeOutput::Time(Arc::new(f)),
        }
    }

    /// Output at time `t`; length is checked by the caller
    #[inline]
    pub fn evaluate(&self, t: f64) -> Result<Vec<f64>, String> {
        match &self.output {
            NodeOutput::Constant(values) => Ok(values.clone()),
            NodeOutput::Time(f) => f(t),
        }
    }

    pub fn validate(&self) -> Vec<ConfigurationError> {
        let mut issues = Vec::new();
        let invalid = |reason: String| ConfigurationError::InvalidNode {
            node: self.label.clone(),
            reason,
        };
        if self.dimensions == 0 {
            issues.push(invalid("dimensions must be > 0".to_string()));
        }
        if let NodeOutput::Constant(values) = &self.output {
            if values.iter().any(|v| !v.is_finite()) {
                issues.push(invalid("constant output contains a non-finite value".to_string()));
            }
        }
        issues
    }
}
