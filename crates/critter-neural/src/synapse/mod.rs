// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! Synaptic filtering
//!
//! Pure functions over filter state; the simulator owns the state buffers.

pub mod lowpass;

pub use lowpass::LowPass;
