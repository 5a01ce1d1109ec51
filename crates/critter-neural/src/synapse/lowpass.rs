// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Exponential low-pass synapse
//!
//! ```text
//! filtered_t = filtered_{t-1} + (dt / tau) * (raw_t - filtered_{t-1})
//! ```
//!
//! An unset or zero `tau` means no filter: the projected value passes
//! straight through with no delay.

use crate::types::error::ConfigurationError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LowPass {
    tau: f64,
}

impl LowPass {
    /// `None` for an unset or zero time constant
    pub fn from_tau(tau: Option<f64>) -> Option<Self> {
        match tau {
            Some(tau) if tau > 0.0 => Some(Self { tau }),
            _ => None,
        }
    }

    pub fn tau(&self) -> f64 {
        self.tau
    }

    /// Per-tick update fraction
    #[inline]
    pub fn alpha(&self, dt: f64) -> f64 {
        dt / self.tau
    }

    /// Advance `state` one tick toward `raw`
    #[inline]
    pub fn step(&self, dt: f64, state: &mut [f64], raw: &[f64]) {
        debug_assert_eq!(state.len(), raw.len());
        let alpha = self.alpha(dt);
        for (s, &r) in state.iter_mut().zip(raw) {
            *s += alpha * (r - *s);
        }
    }

    /// Reject time constants the Euler update cannot integrate at `dt`
    pub fn validate(tau: Option<f64>, dt: f64, owner: &str) -> Option<ConfigurationError> {
        let tau = tau?;
        let reason = if !tau.is_finite() || tau < 0.0 {
            "must be finite and >= 0"
        } else if tau > 0.0 && tau < dt {
            "is shorter than the timestep; the update would overshoot"
        } else {
            return None;
        };
        Some(ConfigurationError::InvalidSynapse {
            connection: owner.to_string(),
            tau,
            reason: reason.to_string(),
        })
    }
}
