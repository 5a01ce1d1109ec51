// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Decoder Solver
//!
//! Linear readouts of a function of a population's represented value.
//!
//! ```text
//! A  = activities(X)                       (m x N)
//! Y  = target(X)                           (m x Dm)
//! W  = argmin ||A W - Y||^2 + lambda ||W||^2
//!    = (A^T A + lambda I)^-1 A^T Y         (N x Dm)
//! lambda = m * (reg * max(A))^2
//! ```
//!
//! The factorization of `A^T A + lambda I` depends only on the population
//! and its evaluation points, so it is computed once per population
//! ([`RegressionSystem`]) and reused for every target decoded from it.

mod cholesky;
pub mod solver;

pub use solver::{Decoder, DecoderSolver, RegressionSystem, SolverParams};
