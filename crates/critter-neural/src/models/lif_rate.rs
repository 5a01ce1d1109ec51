// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # LIF Rate Model
//!
//! Steady-state firing rate of a leaky integrate-and-fire unit driven by a
//! constant current. This is the default model.
//!
//! ```text
//! rate(J) = 1 / (tau_ref + tau_rc * ln(1 + 1 / (J - 1)))   for J > 1
//!         = 0                                              otherwise
//! ```
//!
//! The firing threshold sits at J = 1, so the bias places the threshold at
//! the unit's intercept and the gain sets the slope to hit `max_rate` at 1.

use super::traits::ResponseModel;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LifRate {
    /// Membrane RC time constant (seconds)
    pub tau_rc: f64,
    /// Absolute refractory period (seconds)
    pub tau_ref: f64,
}

impl Default for LifRate {
    fn default() -> Self {
        Self {
            tau_rc: 0.02,
            tau_ref: 0.002,
        }
    }
}

impl LifRate {
    pub fn new(tau_rc: f64, tau_ref: f64) -> Self {
        Self { tau_rc, tau_ref }
    }
}

impl ResponseModel for LifRate {
    fn model_name(&self) -> &'static str {
        "Leaky Integrate-and-Fire rate (LIF rate)"
    }

    #[inline]
    fn rate(&self, current: f64) -> f64 {
        if current > 1.0 {
            1.0 / (self.tau_ref + self.tau_rc * (1.0 / (current - 1.0)).ln_1p())
        } else {
            0.0
        }
    }

    fn gain_bias(&self, max_rate: f64, intercept: f64) -> (f64, f64) {
        // Current that yields max_rate
        let x = 1.0 / (1.0 - ((self.tau_ref - 1.0 / max_rate) / self.tau_rc).exp());
        let gain = (1.0 - x) / (intercept - 1.0);
        let bias = 1.0 - gain * intercept;
        (gain, bias)
    }

    fn check_max_rates(&self, low: f64, high: f64) -> Result<(), String> {
        if !(low > 0.0 && low <= high) {
            return Err(format!("max rates [{}, {}] must satisfy 0 < low <= high", low, high));
        }
        let limit = 1.0 / self.tau_ref;
        if high >= limit {
            return Err(format!(
                "max rate {} is not reachable with tau_ref = {} (limit {} Hz)",
                high, self.tau_ref, limit
            ));
        }
        Ok(())
    }
}
