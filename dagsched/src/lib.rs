/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! dagsched – static list scheduling of task DAGs with explainable traces
//!
//! Module layout:
//!
//! ```text
//! lib.rs
//! ├── graph/          – immutable TaskGraph + JSON/YAML graph files
//! ├── attributes/     – SL, T-Level, EST, LST, B-Level and their derivations
//! ├── scheduler/      – HLFET, MCP, ETF, DLS, verifier, exhaustive baseline
//! ├── trace.rs        – per-step record of a heuristic run
//! └── config/         – YAML scheduler limits and defaults
//! ```
//!
//! The library emits `tracing` events but never installs a subscriber; that
//! is left to the binary or the embedding service.

pub mod attributes;
pub mod config;
pub mod graph;
pub mod scheduler;
pub mod trace;

pub use attributes::{Attribute, PriorityAttributes};
pub use graph::{Edge, Node, TaskGraph, Time};
pub use scheduler::{Heuristic, ListScheduler, SchedulerError};
pub use trace::Trace;

/// All five priority attributes of `graph`.
pub fn compute_attributes(graph: &TaskGraph) -> PriorityAttributes {
    PriorityAttributes::compute(graph)
}

/// One attribute of `graph`, indexed by node position.
pub fn compute_attribute(graph: &TaskGraph, attribute: Attribute) -> Vec<Time> {
    attribute.compute(graph)
}

/// Run `heuristic` with the default limits.
///
/// # Errors
/// See [`ListScheduler::schedule`].
pub fn run_heuristic(
    graph: &TaskGraph,
    num_processors: u32,
    heuristic: Heuristic,
) -> Result<Trace, SchedulerError> {
    ListScheduler::default().schedule(graph, num_processors, heuristic)
}
