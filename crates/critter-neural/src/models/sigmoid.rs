// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Sigmoid response saturating at `1 / tau_ref`
//!
//! The intercept is where the unit reaches half its ceiling, so a requested
//! max rate must lie strictly between `0.5 / tau_ref` and `1 / tau_ref`.

use super::traits::ResponseModel;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sigmoid {
    pub tau_ref: f64,
}

impl Default for Sigmoid {
    fn default() -> Self {
        Self { tau_ref: 0.0025 }
    }
}

impl ResponseModel for Sigmoid {
    fn model_name(&self) -> &'static str {
        "Sigmoid"
    }

    #[inline]
    fn rate(&self, current: f64) -> f64 {
        (1.0 / self.tau_ref) / (1.0 + (-current).exp())
    }

    fn gain_bias(&self, max_rate: f64, intercept: f64) -> (f64, f64) {
        let limit = 1.0 / self.tau_ref;
        let inverse = -(limit / max_rate - 1.0).ln();
        let gain = inverse / (1.0 - intercept);
        let bias = inverse - gain;
        (gain, bias)
    }

    fn check_max_rates(&self, low: f64, high: f64) -> Result<(), String> {
        let limit = 1.0 / self.tau_ref;
        if !(low > 0.5 * limit && low <= high && high < limit) {
            return Err(format!(
                "sigmoid max rates [{}, {}] must lie in ({}, {})",
                low,
                high,
                0.5 * limit,
                limit
            ));
        }
        Ok(())
    }
}
