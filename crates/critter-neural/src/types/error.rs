// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for ensemble simulation
//!
//! Two families:
//! - [`ConfigurationError`]: shape or parameter problems found while adding
//!   objects or building a network. Never raised while stepping.
//! - [`SimError`]: everything a caller can see, including runtime failures
//!   that halt a run.

use thiserror::Error;

/// Which end of a connection a slice belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceSide {
    Source,
    Destination,
}

impl core::fmt::Display for SliceSide {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SliceSide::Source => write!(f, "source"),
            SliceSide::Destination => write!(f, "destination"),
        }
    }
}

/// A single configuration problem, naming the offending object
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("population {population}: {reason}")]
    InvalidPopulation { population: String, reason: String },

    #[error("node {node}: {reason}")]
    InvalidNode { node: String, reason: String },

    #[error("function {function}: {reason}")]
    InvalidFunction { function: String, reason: String },

    #[error("unknown object referenced: {0}")]
    UnknownObject(String),

    #[error("connection {connection}: {side} index {index} out of range for {dims} dimension(s)")]
    SliceOutOfRange {
        connection: String,
        side: SliceSide,
        index: usize,
        dims: usize,
    },

    #[error("connection {connection}: destination index {index} addressed more than once")]
    DuplicateSliceIndex { connection: String, index: usize },

    #[error("connection {connection}: {side} slice is empty")]
    EmptySlice { connection: String, side: SliceSide },

    #[error("connection {connection}: function {function} expects {expected} input dimension(s), source provides {actual}")]
    FunctionInputMismatch {
        connection: String,
        function: String,
        expected: usize,
        actual: usize,
    },

    #[error("connection {connection}: transform is {rows}x{cols}, expected {expected_rows}x{expected_cols}")]
    TransformShape {
        connection: String,
        rows: usize,
        cols: usize,
        expected_rows: usize,
        expected_cols: usize,
    },

    #[error("transform row {row} has {actual} column(s), expected {expected}")]
    RaggedTransform {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("connection {connection}: {what} produces {actual} dimension(s) but {expected} are addressed")]
    DimensionMismatch {
        connection: String,
        what: String,
        expected: usize,
        actual: usize,
    },

    #[error("connection {connection}: transform contains a non-finite entry")]
    NonFiniteTransform { connection: String },

    #[error("connection {connection}: synapse tau {tau}: {reason}")]
    InvalidSynapse {
        connection: String,
        tau: f64,
        reason: String,
    },

    #[error("connection {connection}: decode samples: {reason}")]
    InvalidSamples { connection: String, reason: String },

    #[error("probe {probe}: {reason}")]
    InvalidProbe { probe: String, reason: String },

    #[error("timestep dt = {dt} must be finite and > 0")]
    InvalidTimestep { dt: f64 },
}

/// Errors surfaced by the neural and engine crates
#[derive(Debug, Clone, Error)]
pub enum SimError {
    /// One or more problems found while validating a network for build
    #[error("invalid network ({} problem(s)):\n{}", .0.len(), format_issues(.0))]
    InvalidNetwork(Vec<ConfigurationError>),

    /// A problem detected while adding an object to the network
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// A node's time function failed during a tick; the run is halted
    #[error("node {node} failed at t={time:.6}: {message}")]
    NodeEvaluation {
        node: String,
        time: f64,
        message: String,
    },

    /// A node's time function returned a vector of the wrong length
    #[error("node {node} returned {actual} value(s), declared {expected}")]
    NodeOutputShape {
        node: String,
        expected: usize,
        actual: usize,
    },

    /// A connection function returned a vector of the wrong length at run time
    #[error("function {function} on connection {connection} returned {actual} value(s), declared {expected}")]
    FunctionOutputShape {
        function: String,
        connection: String,
        expected: usize,
        actual: usize,
    },

    /// Operation not permitted in the simulator's current state
    #[error("cannot {operation} while simulator is {state}")]
    InvalidState {
        operation: &'static str,
        state: String,
    },

    #[error("unknown object: {0}")]
    UnknownObject(String),
}

impl SimError {
    /// Configuration problems carried by this error, if any
    pub fn configuration_issues(&self) -> &[ConfigurationError] {
        match self {
            SimError::InvalidNetwork(issues) => issues,
            SimError::Configuration(issue) => core::slice::from_ref(issue),
            _ => &[],
        }
    }

    /// True for build/construction-time errors
    pub fn is_configuration(&self) -> bool {
        matches!(self, SimError::InvalidNetwork(_) | SimError::Configuration(_))
    }
}

fn format_issues(issues: &[ConfigurationError]) -> String {
    issues
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}

pub type SimResult<T> = core::result::Result<T, SimError>;
pub type Result<T> = SimResult<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_network_lists_every_issue() {
        let err = SimError::InvalidNetwork(vec![
            ConfigurationError::EmptySlice {
                connection: "a (Connection(0))".to_string(),
                side: SliceSide::Destination,
            },
            ConfigurationError::InvalidTimestep { dt: 0.0 },
        ]);
        let msg = err.to_string();
        assert!(msg.contains("2 problem(s)"));
        assert!(msg.contains("destination slice is empty"));
        assert!(msg.contains("dt = 0"));
        assert_eq!(err.configuration_issues().len(), 2);
        assert!(err.is_configuration());
    }

    #[test]
    fn test_runtime_errors_are_not_configuration() {
        let err = SimError::NodeEvaluation {
            node: "stim".to_string(),
            time: 0.5,
            message: "boom".to_string(),
        };
        assert!(!err.is_configuration());
        assert!(err.configuration_issues().is_empty());
    }
}
