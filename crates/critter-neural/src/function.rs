// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Signal functions applied by connections
//!
//! A connection may compute an arbitrary function of its source's value.
//! Functions are registered with the network once and referenced by id, so
//! the decoder cache can key on function identity.

use std::sync::Arc;

/// Callable from `R^Ds` to `R^Dm`
pub trait SignalFunction: Send + Sync {
    /// Name used in logs and error messages
    fn name(&self) -> &str;

    /// Required input dimensionality, if the function fixes one
    fn input_dims(&self) -> Option<usize> {
        None
    }

    /// Output dimensionality (Dm)
    fn output_dims(&self) -> usize;

    fn evaluate(&self, x: &[f64]) -> Vec<f64>;
}

/// Closure-backed [`SignalFunction`]
pub struct FnSignal<F>
where
    F: Fn(&[f64]) -> Vec<f64> + Send + Sync,
{
    name: String,
    input_dims: Option<usize>,
    output_dims: usize,
    f: F,
}

impl<F> FnSignal<F>
where
    F: Fn(&[f64]) -> Vec<f64> + Send + Sync,
{
    pub fn new(name: impl Into<String>, output_dims: usize, f: F) -> Self {
        Self {
            name: name.into(),
            input_dims: None,
            output_dims,
            f,
        }
    }

    /// Pin the expected input dimensionality (checked at build)
    pub fn with_input_dims(mut self, dims: usize) -> Self {
        self.input_dims = Some(dims);
        self
    }

    pub fn shared(self) -> Arc<dyn SignalFunction>
    where
        F: 'static,
    {
        Arc::new(self)
    }
}

impl<F> SignalFunction for FnSignal<F>
where
    F: Fn(&[f64]) -> Vec<f64> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn input_dims(&self) -> Option<usize> {
        self.input_dims
    }

    fn output_dims(&self) -> usize {
        self.output_dims
    }

    #[inline]
    fn evaluate(&self, x: &[f64]) -> Vec<f64> {
        (self.f)(x)
    }
}

impl core::fmt::Debug for dyn SignalFunction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SignalFunction")
            .field("name", &self.name())
            .field("input_dims", &self.input_dims())
            .field("output_dims", &self.output_dims())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_function() {
        let f = FnSignal::new("swap", 2, |x: &[f64]| vec![x[1], x[0]]).with_input_dims(2);
        assert_eq!(f.name(), "swap");
        assert_eq!(f.input_dims(), Some(2));
        assert_eq!(f.output_dims(), 2);
        assert_eq!(f.evaluate(&[1.0, 2.0]), vec![2.0, 1.0]);
    }

    #[test]
    fn test_shared_debug() {
        let f = FnSignal::new("zero", 1, |_: &[f64]| vec![0.0]).shared();
        let s = format!("{:?}", f);
        assert!(s.contains("zero"));
    }
}
