// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Seeded random streams.

Every random draw in the simulation (population tuning, evaluation points)
comes from an explicit [`SeededStream`]. Streams are derived from the master
seed plus a purpose tag and an object index, so drawing for one population
never shifts the draws of another and builds are reproducible regardless of
the order (or thread) in which objects are processed.

ChaCha8 is used rather than `StdRng` because its output is stable across
`rand` releases and platforms.
*/

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;

/// Purpose tag for a derived stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum StreamKind {
    /// Encoders, max rates and intercepts
    Tuning = 1,
    /// Decoder evaluation points
    EvalPoints = 2,
}

/// Deterministic random stream
#[derive(Debug, Clone)]
pub struct SeededStream {
    rng: ChaCha8Rng,
}

impl SeededStream {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Independent stream for `(kind, index)` under a master seed
    pub fn derive(seed: u64, kind: StreamKind, index: u32) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        rng.set_stream(((kind as u64) << 32) | index as u64);
        Self { rng }
    }

    /// Uniform draw in `[low, high)`; returns `low` for an empty range
    #[inline]
    pub fn uniform(&mut self, low: f64, high: f64) -> f64 {
        if high <= low {
            return low;
        }
        self.rng.gen_range(low..high)
    }

    #[inline]
    pub fn standard_normal(&mut self) -> f64 {
        self.rng.sample(StandardNormal)
    }

    /// Direction drawn uniformly on the unit sphere in `dims` dimensions
    pub fn unit_vector(&mut self, dims: usize) -> Vec<f64> {
        loop {
            let v: Vec<f64> = (0..dims).map(|_| self.standard_normal()).collect();
            let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
            if norm > 1e-12 {
                return v.into_iter().map(|x| x / norm).collect();
            }
        }
    }

    /// Point drawn uniformly from the ball of the given radius
    pub fn point_in_ball(&mut self, dims: usize, radius: f64) -> Vec<f64> {
        let direction = self.unit_vector(dims);
        let scale = radius * self.uniform(0.0, 1.0).powf(1.0 / dims as f64);
        direction.into_iter().map(|x| x * scale).collect()
    }
}
