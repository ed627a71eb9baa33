/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Shared graphs for unit tests.

use super::input::GraphSpec;
use super::{Edge, Node, TaskGraph};
use crate::scheduler::SchedulerError;

/// Build a graph from `(id, weight)` and `(source, target, cost)` tuples.
pub fn build(
    nodes: &[(&str, f64)],
    edges: &[(&str, &str, f64)],
) -> Result<TaskGraph, SchedulerError> {
    TaskGraph::build(
        nodes.iter().map(|&(id, w)| Node::new(id, w)).collect(),
        edges
            .iter()
            .map(|&(s, t, c)| Edge::new(s, t, c))
            .collect(),
    )
}

/// The ten-node diamond DAG shipped in `demos/diamond.json`.
pub fn diamond() -> TaskGraph {
    GraphSpec::from_json_str(include_str!("../../demos/diamond.json"))
        .unwrap()
        .build()
        .unwrap()
}
