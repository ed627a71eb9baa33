/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Scheduler configuration loading.
//!
//! The expected YAML structure is:
//! ```yaml
//! max_nodes: 512           # largest graph accepted
//! max_processors: 64       # largest processor count accepted
//! default_processors: 3    # used when neither CLI nor graph file names one
//! default_heuristic: hlfet
//! deadline_ms: 10000       # deadline for comparisons and exhaustive searches
//! ```
//! Every key is optional; missing keys keep their defaults.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

use crate::scheduler::Heuristic;

pub const DEFAULT_MAX_NODES: usize = 512;
pub const DEFAULT_MAX_PROCESSORS: u32 = 64;
pub const DEFAULT_PROCESSORS: u32 = 3;
pub const DEFAULT_DEADLINE_MS: u64 = 10_000;

// ── Private YAML deserialization type ─────────────────────────────────────────

/// Maps directly onto the YAML file layout.  Kept private; callers work with
/// [`SchedulerConfig`].
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SchedulerConfigFile {
    max_nodes: Option<usize>,
    max_processors: Option<u32>,
    default_processors: Option<u32>,
    default_heuristic: Option<String>,
    deadline_ms: Option<u64>,
}

// ── SchedulerConfig ───────────────────────────────────────────────────────────

/// Limits and defaults applied to every scheduling request.
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerConfig {
    /// Graphs with more nodes are rejected before scheduling.  Bounds the
    /// size of the recorded trace.
    pub max_nodes: usize,
    pub max_processors: u32,
    pub default_processors: u32,
    pub default_heuristic: Heuristic,
    /// Deadline for a comparison run or an exhaustive search, in milliseconds.
    pub deadline_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_nodes: DEFAULT_MAX_NODES,
            max_processors: DEFAULT_MAX_PROCESSORS,
            default_processors: DEFAULT_PROCESSORS,
            default_heuristic: Heuristic::Hlfet,
            deadline_ms: DEFAULT_DEADLINE_MS,
        }
    }
}

impl SchedulerConfig {
    /// Parse a YAML document; see the module docs for the layout.
    ///
    /// # Errors
    /// Returns an error if the YAML is invalid, names an unknown heuristic,
    /// or sets a limit to zero.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        // An empty document deserializes to unit, not to a mapping.
        let file: SchedulerConfigFile = if content.trim().is_empty() {
            SchedulerConfigFile::default()
        } else {
            serde_yaml::from_str(content).context("Failed to parse scheduler configuration")?
        };

        let defaults = Self::default();
        let default_heuristic = match file.default_heuristic {
            Some(name) => name
                .parse::<Heuristic>()
                .with_context(|| format!("Invalid default_heuristic '{}'", name))?,
            None => defaults.default_heuristic,
        };

        let config = Self {
            max_nodes: file.max_nodes.unwrap_or(defaults.max_nodes),
            max_processors: file.max_processors.unwrap_or(defaults.max_processors),
            default_processors: file.default_processors.unwrap_or(defaults.default_processors),
            default_heuristic,
            deadline_ms: file.deadline_ms.unwrap_or(defaults.deadline_ms),
        };
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or fails
    /// [`from_yaml_str`](Self::from_yaml_str).
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading scheduler configuration from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open configuration file: {}", path.display()))?;
        let config = Self::from_yaml_str(&content)
            .with_context(|| format!("Invalid configuration file: {}", path.display()))?;

        debug!(
            max_nodes = config.max_nodes,
            max_processors = config.max_processors,
            default_processors = config.default_processors,
            default_heuristic = %config.default_heuristic,
            deadline_ms = config.deadline_ms,
            "scheduler configuration loaded"
        );
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.max_nodes == 0 {
            bail!("max_nodes must be at least 1");
        }
        if self.max_processors == 0 {
            bail!("max_processors must be at least 1");
        }
        if self.default_processors == 0 || self.default_processors > self.max_processors {
            bail!(
                "default_processors must be between 1 and max_processors ({}), got {}",
                self.max_processors,
                self.default_processors
            );
        }
        if self.deadline_ms == 0 {
            bail!("deadline_ms must be at least 1");
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn yaml_tempfile(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn demo_config_loads() {
        let f = yaml_tempfile(include_str!("../../demos/scheduler.yaml"));
        let cfg = SchedulerConfig::load_from_file(f.path()).unwrap();
        assert_eq!(cfg, SchedulerConfig::default());
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let cfg = SchedulerConfig::from_yaml_str("default_heuristic: MCP\nmax_nodes: 20\n").unwrap();
        assert_eq!(cfg.default_heuristic, Heuristic::Mcp);
        assert_eq!(cfg.max_nodes, 20);
        assert_eq!(cfg.max_processors, DEFAULT_MAX_PROCESSORS);
        assert_eq!(cfg.deadline_ms, DEFAULT_DEADLINE_MS);
    }

    #[test]
    fn empty_file_is_all_defaults() {
        let f = yaml_tempfile("");
        let cfg = SchedulerConfig::load_from_file(f.path()).unwrap();
        assert_eq!(cfg, SchedulerConfig::default());
    }

    #[test]
    fn unknown_heuristic_is_rejected() {
        let err = SchedulerConfig::from_yaml_str("default_heuristic: heft\n").unwrap_err();
        assert!(format!("{err:#}").contains("heft"));
    }

    #[test]
    fn unknown_key_is_rejected() {
        assert!(SchedulerConfig::from_yaml_str("max_cpus: 4\n").is_err());
    }

    #[test]
    fn zero_limits_are_rejected() {
        assert!(SchedulerConfig::from_yaml_str("max_nodes: 0\n").is_err());
        assert!(SchedulerConfig::from_yaml_str("max_processors: 0\n").is_err());
        assert!(
            SchedulerConfig::from_yaml_str("max_processors: 2\ndefault_processors: 3\n").is_err()
        );
    }

    #[test]
    fn missing_file_returns_error() {
        let result = SchedulerConfig::load_from_file(Path::new("/nonexistent/path/scheduler.yaml"));
        assert!(result.is_err());
    }

    #[test]
    fn malformed_yaml_returns_error() {
        let f = yaml_tempfile("this is: not: valid: yaml: content:::");
        assert!(SchedulerConfig::load_from_file(f.path()).is_err());
    }
}
