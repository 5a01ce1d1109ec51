// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Response model trait

/// Monotonic, saturating (or at least monotonic) rate response
///
/// Input current for unit `i` representing `x` is
/// `J_i = gain_i * dot(encoder_i, x / radius) + bias_i`.
pub trait ResponseModel {
    /// Human-readable model name
    fn model_name(&self) -> &'static str;

    /// Steady-state firing rate (Hz) for an input current
    fn rate(&self, current: f64) -> f64;

    /// Gain and bias so that the unit starts responding at `intercept` and
    /// reaches `max_rate` when the normalized input along its encoder is 1
    fn gain_bias(&self, max_rate: f64, intercept: f64) -> (f64, f64);

    /// Reject max-rate ranges the model cannot produce
    fn check_max_rates(&self, low: f64, high: f64) -> Result<(), String> {
        if !(low > 0.0 && low <= high && high.is_finite()) {
            return Err(format!(
                "max rates [{}, {}] must satisfy 0 < low <= high < inf",
                low, high
            ));
        }
        Ok(())
    }
}
