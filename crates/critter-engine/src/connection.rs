// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Connection specifications
//!
//! A connection composes, in order: decode (or raw node output), optional
//! function, linear transform, synaptic filter, then a scatter-add into the
//! addressed destination dimensions.

use ndarray::Array2;

use critter_neural::{ConnectionId, DimensionSlice, FunctionId, NodeId, PopulationId, Transform};

/// What feeds a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    Population(PopulationId),
    Node(NodeId),
}

impl From<PopulationId> for Source {
    fn from(id: PopulationId) -> Self {
        Source::Population(id)
    }
}

impl From<NodeId> for Source {
    fn from(id: NodeId) -> Self {
        Source::Node(id)
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Population(id) => write!(f, "{}", id),
            Source::Node(id) => write!(f, "{}", id),
        }
    }
}

/// What a connection computes from its (sliced) source value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DecodeTarget {
    /// The sliced source value itself
    #[default]
    Identity,
    /// A registered function of the sliced source value
    Function(FunctionId),
    /// Decoders fit to explicit `(points, targets)` rows; population sources only.
    /// `points` spans the full source dimensionality.
    Samples {
        points: Array2<f64>,
        targets: Array2<f64>,
    },
}

#[derive(Debug, Clone)]
pub struct ConnectionSpec {
    pub label: Option<String>,
    pub source: Source,
    pub source_slice: DimensionSlice,
    pub destination: PopulationId,
    pub destination_slice: DimensionSlice,
    pub target: DecodeTarget,
    pub transform: Transform,
    /// Synaptic time constant in seconds; `None` or `0` means unfiltered
    pub synapse: Option<f64>,
}

impl ConnectionSpec {
    pub fn new(source: impl Into<Source>, destination: PopulationId) -> Self {
        Self {
            label: None,
            source: source.into(),
            source_slice: DimensionSlice::All,
            destination,
            destination_slice: DimensionSlice::All,
            target: DecodeTarget::Identity,
            transform: Transform::Identity,
            synapse: None,
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn source_slice(mut self, slice: impl Into<DimensionSlice>) -> Self {
        self.source_slice = slice.into();
        self
    }

    pub fn destination_slice(mut self, slice: impl Into<DimensionSlice>) -> Self {
        self.destination_slice = slice.into();
        self
    }

    pub fn function(mut self, function: FunctionId) -> Self {
        self.target = DecodeTarget::Function(function);
        self
    }

    pub fn samples(mut self, points: Array2<f64>, targets: Array2<f64>) -> Self {
        self.target = DecodeTarget::Samples { points, targets };
        self
    }

    pub fn transform(mut self, transform: impl Into<Transform>) -> Self {
        self.transform = transform.into();
        self
    }

    pub fn synapse(mut self, tau: f64) -> Self {
        self.synapse = Some(tau);
        self
    }

    /// Name used in error messages: `label (Connection(n))` or `Connection(n)`
    pub fn display_name(&self, id: ConnectionId) -> String {
        match &self.label {
            Some(label) => format!("{} ({})", label, id),
            None => id.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let spec = ConnectionSpec::new(NodeId(0), PopulationId(1));
        assert_eq!(spec.source, Source::Node(NodeId(0)));
        assert!(spec.source_slice.is_all());
        assert!(spec.destination_slice.is_all());
        assert_eq!(spec.target, DecodeTarget::Identity);
        assert_eq!(spec.transform, Transform::Identity);
        assert_eq!(spec.synapse, None);
    }

    #[test]
    fn test_builder_chain() {
        let spec = ConnectionSpec::new(PopulationId(0), PopulationId(2))
            .label("food->do_food")
            .destination_slice([0, 1])
            .function(FunctionId(3))
            .transform(0.1)
            .synapse(0.1);
        assert_eq!(spec.destination_slice, DimensionSlice::Indices(vec![0, 1]));
        assert_eq!(spec.target, DecodeTarget::Function(FunctionId(3)));
        assert_eq!(spec.transform, Transform::Scalar(0.1));
        assert_eq!(spec.synapse, Some(0.1));
        assert_eq!(
            spec.display_name(ConnectionId(4)),
            "food->do_food (Connection(4))"
        );
    }
}
