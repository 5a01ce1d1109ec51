// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Unified logging initialization for critter binaries

use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::cli::CrateDebugFlags;
use crate::config::{LogFormat, LoggingConfig};

/// Build the `EnvFilter` for a run
///
/// `RUST_LOG`, when set, replaces the computed directives entirely.
pub fn build_env_filter(debug_flags: &CrateDebugFlags, config: &LoggingConfig) -> Result<EnvFilter> {
    if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        return EnvFilter::try_from_default_env().context("Invalid RUST_LOG directive");
    }
    let directives = debug_flags.to_filter_string(&config.level);
    EnvFilter::try_new(&directives)
        .with_context(|| format!("Invalid log filter directives: {}", directives))
}

/// Initialize console logging
///
/// Installs a global `tracing` subscriber writing to stderr so that stdout
/// stays free for trajectory output.
///
/// # Errors
///
/// Fails on an unparseable level / `RUST_LOG`, or when a global subscriber is
/// already installed.
pub fn init_logging(debug_flags: &CrateDebugFlags, config: &LoggingConfig) -> Result<()> {
    let env_filter = build_env_filter(debug_flags, config)?;

    for name in debug_flags.unknown_crates() {
        eprintln!("Warning: --debug-{} does not name a known crate", name);
    }

    let layer = match config.format {
        LogFormat::Text => tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(config.with_target)
            .with_file(false)
            .with_line_number(false)
            .with_filter(env_filter)
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .json()
            .with_filter(env_filter)
            .boxed(),
    };

    Registry::default()
        .with(layer)
        .try_init()
        .context("Failed to install global tracing subscriber")?;

    Ok(())
}

/// Initialize logging from process arguments, `CRITTER_DEBUG` and defaults
pub fn init_logging_default() -> Result<()> {
    init_logging(&crate::cli::parse_debug_flags(), &LoggingConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_rejects_bad_level() {
        if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
            return;
        }
        let config = LoggingConfig::new("critter=verbose", LogFormat::Text);
        assert!(build_env_filter(&CrateDebugFlags::default(), &config).is_err());
    }

    #[test]
    fn test_filter_from_flags() {
        if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
            return;
        }
        let flags = CrateDebugFlags::from_args(vec!["--debug-critter-engine".to_string()]);
        let filter = build_env_filter(&flags, &LoggingConfig::default()).unwrap();
        let rendered = filter.to_string();
        assert!(rendered.contains("critter-engine=debug"));
    }
}
