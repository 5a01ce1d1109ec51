// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Probes: recorders attached to simulator state
//!
//! A probe samples one state vector after every committed tick (or every
//! `sample_every` ticks), optionally through its own low-pass filter. The
//! filter runs every tick regardless of the sample period.

use critter_neural::{ConnectionId, LowPass, NodeId, PopulationId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeTarget {
    /// Identity-decoded value of a population
    Decoded(PopulationId),
    /// Raw per-unit activation
    Activation(PopulationId),
    /// Summed input accumulator of a population
    Input(PopulationId),
    Node(NodeId),
    /// Filtered contribution of a connection
    Connection(ConnectionId),
}

#[derive(Debug, Clone)]
pub struct ProbeSpec {
    pub label: Option<String>,
    pub target: ProbeTarget,
    pub synapse: Option<f64>,
    pub sample_every: usize,
}

impl ProbeSpec {
    pub fn new(target: ProbeTarget) -> Self {
        Self {
            label: None,
            target,
            synapse: None,
            sample_every: 1,
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn synapse(mut self, tau: f64) -> Self {
        self.synapse = Some(tau);
        self
    }

    pub fn sample_every(mut self, ticks: usize) -> Self {
        self.sample_every = ticks;
        self
    }
}

/// Recorded samples for one probe
#[derive(Debug, Clone)]
pub(crate) struct ProbeRecorder {
    pub(crate) target: ProbeTarget,
    filter: Option<LowPass>,
    filter_state: Vec<f64>,
    every: u64,
    times: Vec<f64>,
    data: Vec<Vec<f64>>,
}

impl ProbeRecorder {
    pub(crate) fn new(spec: &ProbeSpec, width: usize) -> Self {
        Self {
            target: spec.target,
            filter: LowPass::from_tau(spec.synapse),
            filter_state: vec![0.0; width],
            every: spec.sample_every.max(1) as u64,
            times: Vec::new(),
            data: Vec::new(),
        }
    }

    /// Feed the committed value for `tick` (1-based) at time `time`
    pub(crate) fn observe(&mut self, tick: u64, time: f64, dt: f64, value: &[f64]) {
        match self.filter {
            Some(filter) => filter.step(dt, &mut self.filter_state, value),
            None => self.filter_state.copy_from_slice(value),
        }
        if tick % self.every == 0 {
            self.times.push(time);
            self.data.push(self.filter_state.clone());
        }
    }

    pub(crate) fn times(&self) -> &[f64] {
        &self.times
    }

    pub(crate) fn data(&self) -> &[Vec<f64>] {
        &self.data
    }

    pub(crate) fn clear(&mut self) {
        self.filter_state.iter_mut().for_each(|v| *v = 0.0);
        self.times.clear();
        self.data.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_sample_period() {
        let spec = ProbeSpec::new(ProbeTarget::Node(NodeId(0))).sample_every(3);
        let mut recorder = ProbeRecorder::new(&spec, 1);
        for tick in 1..=9u64 {
            recorder.observe(tick, tick as f64 * 0.001, 0.001, &[tick as f64]);
        }
        assert_eq!(recorder.data(), &[vec![3.0], vec![6.0], vec![9.0]]);
        assert_eq!(recorder.times().len(), 3);
    }

    #[test]
    fn test_filtered_probe_runs_every_tick() {
        let spec = ProbeSpec::new(ProbeTarget::Node(NodeId(0)))
            .synapse(0.01)
            .sample_every(2);
        let mut recorder = ProbeRecorder::new(&spec, 1);
        recorder.observe(1, 0.001, 0.001, &[1.0]);
        recorder.observe(2, 0.002, 0.001, &[1.0]);
        // Two updates of 0.1 toward 1.0: 0.1, then 0.19
        assert!((recorder.data()[0][0] - 0.19).abs() < 1e-12);

        recorder.clear();
        assert!(recorder.data().is_empty());
    }

    proptest! {
        #[test]
        fn prop_sample_count_and_times(every in 1usize..20, ticks in 0u64..200) {
            let spec = ProbeSpec::new(ProbeTarget::Node(NodeId(0))).sample_every(every);
            let mut recorder = ProbeRecorder::new(&spec, 2);
            for tick in 1..=ticks {
                recorder.observe(tick, tick as f64 * 0.001, 0.001, &[1.0, -1.0]);
            }
            let expected = ticks / every as u64;
            prop_assert_eq!(recorder.times().len() as u64, expected);
            prop_assert_eq!(recorder.data().len() as u64, expected);
            prop_assert!(recorder.times().windows(2).all(|w| w[0] < w[1]));
        }
    }
}
