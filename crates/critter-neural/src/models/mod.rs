// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Response Model Architecture
//!
//! A population's units share one nonlinear response model. Models are
//! rate-based: they map an input current to a steady-state firing rate, and
//! they know how to turn a desired (max rate, x-intercept) pair into the
//! per-unit gain and bias that produce it.
//!
//! ## Adding a New Response Model
//!
//! 1. Create `src/models/your_model.rs`
//! 2. Implement `ResponseModel`
//! 3. Add a `NeuronType` variant and dispatch arm
//! 4. Add tests

pub mod lif_rate;
pub mod rectified_linear;
pub mod sigmoid;
pub mod traits;

use core::fmt;
use core::str::FromStr;

pub use lif_rate::LifRate;
pub use rectified_linear::RectifiedLinear;
pub use sigmoid::Sigmoid;
pub use traits::ResponseModel;

/// Response model chosen for a population at construction
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum NeuronType {
    LifRate(LifRate),
    RectifiedLinear(RectifiedLinear),
    Sigmoid(Sigmoid),
}

impl Default for NeuronType {
    fn default() -> Self {
        NeuronType::LifRate(LifRate::default())
    }
}

/// Dispatch a `ResponseModel` method to the wrapped model
macro_rules! dispatch {
    ($self:expr, $model:ident => $body:expr) => {
        match $self {
            NeuronType::LifRate($model) => $body,
            NeuronType::RectifiedLinear($model) => $body,
            NeuronType::Sigmoid($model) => $body,
        }
    };
}

impl ResponseModel for NeuronType {
    fn model_name(&self) -> &'static str {
        dispatch!(self, m => m.model_name())
    }

    #[inline]
    fn rate(&self, current: f64) -> f64 {
        dispatch!(self, m => m.rate(current))
    }

    fn gain_bias(&self, max_rate: f64, intercept: f64) -> (f64, f64) {
        dispatch!(self, m => m.gain_bias(max_rate, intercept))
    }

    fn check_max_rates(&self, low: f64, high: f64) -> Result<(), String> {
        dispatch!(self, m => m.check_max_rates(low, high))
    }
}

impl fmt::Display for NeuronType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NeuronType::LifRate(_) => "lif_rate",
            NeuronType::RectifiedLinear(_) => "rectified_linear",
            NeuronType::Sigmoid(_) => "sigmoid",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for NeuronType {
    type Err = String;

    /// Parse a model name with default parameters
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lif_rate" | "lifrate" | "lif" => Ok(NeuronType::LifRate(LifRate::default())),
            "rectified_linear" | "relu" => {
                Ok(NeuronType::RectifiedLinear(RectifiedLinear::default()))
            }
            "sigmoid" => Ok(NeuronType::Sigmoid(Sigmoid::default())),
            other => Err(format!(
                "unknown neuron type '{}' (expected lif_rate, rectified_linear or sigmoid)",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        assert!(matches!("lif".parse::<NeuronType>(), Ok(NeuronType::LifRate(_))));
        assert!(matches!(
            "ReLU".parse::<NeuronType>(),
            Ok(NeuronType::RectifiedLinear(_))
        ));
        assert!(matches!("sigmoid".parse::<NeuronType>(), Ok(NeuronType::Sigmoid(_))));
        assert!("izhikevich".parse::<NeuronType>().is_err());
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for t in [
            NeuronType::default(),
            NeuronType::RectifiedLinear(RectifiedLinear::default()),
            NeuronType::Sigmoid(Sigmoid::default()),
        ] {
            let parsed: NeuronType = t.to_string().parse().unwrap();
            assert_eq!(parsed, t);
        }
    }
}
