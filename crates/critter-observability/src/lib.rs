// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # critter-observability
//!
//! Logging setup shared by every critter binary and test harness.
//!
//! Library crates only emit `tracing` events under their crate name as the
//! target (`critter-engine`, `critter-neural`, ...). This crate turns those
//! into output: a `tracing-subscriber` registry whose `EnvFilter` is built
//! from per-crate debug flags, formatted as text or JSON.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod init;

pub use cli::*;
pub use config::*;
pub use init::*;

/// Known critter crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &[
    "critter",
    "critter-neural",
    "critter-engine",
    "critter-config",
];
