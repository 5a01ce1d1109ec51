// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Rectified linear response: `rate(J) = amplitude * max(J, 0)`

use super::traits::ResponseModel;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RectifiedLinear {
    pub amplitude: f64,
}

impl Default for RectifiedLinear {
    fn default() -> Self {
        Self { amplitude: 1.0 }
    }
}

impl ResponseModel for RectifiedLinear {
    fn model_name(&self) -> &'static str {
        "Rectified linear"
    }

    #[inline]
    fn rate(&self, current: f64) -> f64 {
        self.amplitude * current.max(0.0)
    }

    fn gain_bias(&self, max_rate: f64, intercept: f64) -> (f64, f64) {
        let gain = max_rate / (self.amplitude * (1.0 - intercept));
        let bias = -intercept * gain;
        (gain, bias)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gain_bias() {
        let m = RectifiedLinear::default();
        let (gain, bias) = m.gain_bias(300.0, 0.25);
        assert_eq!(m.rate(gain * 0.25 + bias), 0.0);
        assert!((m.rate(gain + bias) - 300.0).abs() < 1e-9);
        assert_eq!(m.rate(gain * -1.0 + bias), 0.0);
    }
}
