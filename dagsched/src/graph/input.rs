/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Graph file loading.
//!
//! The accepted layout is the request body of the scheduling API:
//! ```json
//! {
//!   "num_processors": 3,
//!   "nodes": [{ "id": "1", "weight": 20 }, { "id": "2", "weight": 20 }],
//!   "edges": [{ "source": "1", "target": "2", "cost": 8 }]
//! }
//! ```
//! `num_processors` is optional.  Unknown node fields (e.g. the `pos`
//! coordinates a front end stores for drawing) are ignored.  The same
//! structure may be written as YAML.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{Edge, Node, TaskGraph};
use crate::scheduler::SchedulerError;

/// Raw graph description as read from a file or request body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_processors: Option<u32>,
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl GraphSpec {
    /// Parse the JSON request layout.
    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Failed to parse graph JSON")
    }

    /// Parse the YAML variant of the request layout.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("Failed to parse graph YAML")
    }

    /// Load a graph file, choosing the parser from the extension.
    ///
    /// `.yaml` / `.yml` use YAML; everything else is parsed as JSON.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or does not parse.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading task graph from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open graph file: {}", path.display()))?;

        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        let spec = if is_yaml {
            Self::from_yaml_str(&content)
        } else {
            Self::from_json_str(&content)
        }
        .with_context(|| format!("Invalid graph file: {}", path.display()))?;

        debug!(
            nodes = spec.nodes.len(),
            edges = spec.edges.len(),
            num_processors = ?spec.num_processors,
            "graph file parsed"
        );
        Ok(spec)
    }

    /// Validate and freeze into a [`TaskGraph`].
    pub fn build(&self) -> Result<TaskGraph, SchedulerError> {
        TaskGraph::build(self.nodes.clone(), self.edges.clone())
    }
}
