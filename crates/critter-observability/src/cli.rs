//! CLI argument parsing for per-crate debug flags
//!
//! Supports flags like `--debug-critter-engine`, `--debug-critter-neural`, etc.

use std::collections::BTreeSet;
use std::env;

use crate::KNOWN_CRATES;

/// Crates with debug logging switched on
///
/// # Example
/// ```rust
/// use critter_observability::CrateDebugFlags;
///
/// let flags = CrateDebugFlags::from_args(vec!["--debug-critter-engine".to_string()]);
/// assert!(flags.is_enabled("critter-engine"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrateDebugFlags {
    pub enabled_crates: BTreeSet<String>,
}

impl CrateDebugFlags {
    /// Parse debug flags from command-line arguments
    ///
    /// Looks for arguments matching `--debug-{crate-name}`.
    /// `--debug-all` enables all known crates.
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut flags = CrateDebugFlags::default();

        for arg in args {
            if arg == "--debug-all" {
                flags.enable_all();
                continue;
            }
            if let Some(crate_name) = arg.strip_prefix("--debug-") {
                flags.enable(crate_name);
            }
        }

        flags
    }

    /// Merge a `CRITTER_DEBUG` style value: `all` or comma-separated crate names
    pub fn merge_env_value(&mut self, value: &str) {
        if value.trim() == "all" {
            self.enable_all();
            return;
        }
        for crate_name in value.split(',') {
            let crate_name = crate_name.trim();
            if !crate_name.is_empty() {
                self.enable(crate_name);
            }
        }
    }

    pub fn enable(&mut self, crate_name: &str) {
        self.enabled_crates.insert(crate_name.to_string());
    }

    fn enable_all(&mut self) {
        for crate_name in KNOWN_CRATES {
            self.enable(crate_name);
        }
    }

    /// Check if debug is enabled for a specific crate
    pub fn is_enabled(&self, crate_name: &str) -> bool {
        self.enabled_crates.contains(crate_name)
    }

    /// Check if debug is enabled for any crate
    pub fn any_enabled(&self) -> bool {
        !self.enabled_crates.is_empty()
    }

    /// Flags naming crates outside [`KNOWN_CRATES`]; usually a typo
    pub fn unknown_crates(&self) -> Vec<&str> {
        self.enabled_crates
            .iter()
            .map(String::as_str)
            .filter(|name| !KNOWN_CRATES.contains(name))
            .collect()
    }

    /// Log level for a crate: `DEBUG` if enabled, `INFO` otherwise
    pub fn log_level(&self, crate_name: &str) -> tracing::Level {
        if self.is_enabled(crate_name) {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Build an `EnvFilter` directive string
    ///
    /// Format: `"critter-engine=debug,critter-neural=debug,{default_level}"`.
    pub fn to_filter_string(&self, default_level: &str) -> String {
        let mut filters: Vec<String> = self
            .enabled_crates
            .iter()
            .map(|crate_name| format!("{}=debug", crate_name))
            .collect();
        filters.push(default_level.to_string());
        filters.join(",")
    }
}

/// Parse debug flags from process arguments and the `CRITTER_DEBUG` variable
pub fn parse_debug_flags() -> CrateDebugFlags {
    let mut flags = CrateDebugFlags::from_args(env::args());
    if let Ok(env_var) = env::var("CRITTER_DEBUG") {
        flags.merge_env_value(&env_var);
    }
    flags
}

/// Generate help text for debug flags
pub fn debug_flags_help() -> String {
    format!(
        r#"Debug Flags:
  --debug-all                    Enable debug logging for all crates
  --debug-{{crate-name}}          Enable debug logging for specific crate

Available crates:
  {}

Environment Variables:
  CRITTER_DEBUG={{crate-name}}[,{{crate-name}}]  Enable debug for crates (comma-separated)
  CRITTER_DEBUG=all                               Enable debug for all crates
  CRITTER_TRACE_TICKS=1                           Per-tick trace events from the simulator
"#,
        KNOWN_CRATES.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_crate_flag() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-critter-engine".to_string()]);
        assert!(flags.is_enabled("critter-engine"));
        assert!(!flags.is_enabled("critter-neural"));
    }

    #[test]
    fn test_non_debug_args_ignored() {
        let flags = CrateDebugFlags::from_args(vec![
            "run_critter".to_string(),
            "light=1".to_string(),
        ]);
        assert!(!flags.any_enabled());
    }

    #[test]
    fn test_debug_all() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-all".to_string()]);
        for crate_name in KNOWN_CRATES {
            assert!(flags.is_enabled(crate_name), "{} should be enabled", crate_name);
        }
        assert!(flags.unknown_crates().is_empty());
    }

    #[test]
    fn test_env_value() {
        let mut flags = CrateDebugFlags::default();
        flags.merge_env_value("critter-neural, critter-config,,");
        assert!(flags.is_enabled("critter-neural"));
        assert!(flags.is_enabled("critter-config"));
        assert_eq!(flags.enabled_crates.len(), 2);
    }

    #[test]
    fn test_filter_string() {
        let flags = CrateDebugFlags::from_args(vec![
            "--debug-critter-neural".to_string(),
            "--debug-critter-engine".to_string(),
        ]);
        assert_eq!(
            flags.to_filter_string("warn"),
            "critter-engine=debug,critter-neural=debug,warn"
        );
        assert_eq!(CrateDebugFlags::default().to_filter_string("info"), "info");
    }

    #[test]
    fn test_log_level_and_unknown() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-critter-engin".to_string()]);
        assert_eq!(flags.log_level("critter-engine"), tracing::Level::INFO);
        assert_eq!(flags.unknown_crates(), vec!["critter-engin"]);
    }
}
