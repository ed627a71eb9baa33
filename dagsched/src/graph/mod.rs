/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Immutable task graph model.
//!
//! ```text
//! graph file ──(GraphSpec)──►  Vec<Node> + Vec<Edge>  ──(TaskGraph::build)──►  TaskGraph
//!                                ↑ raw input                                   ↑ validated, frozen
//! ```
//!
//! # Ownership model
//! A [`TaskGraph`] is built once per request and never mutated afterwards.
//! Every derived view (priority attributes, schedules, traces) borrows it, so
//! a single graph can be shared across threads behind an `Arc` while several
//! heuristics run on it in parallel.
//!
//! Internally nodes are addressed by their position in the input list
//! (`usize`).  The position is also the deterministic tie-breaker used by the
//! topological sort and by every heuristic.

pub mod input;

#[cfg(test)]
pub(crate) mod fixtures;

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::scheduler::{MalformedReason, SchedulerError};

/// Scheduling time unit.  Weights, costs and start/end times share it.
pub type Time = f64;

// ── Raw input types ───────────────────────────────────────────────────────────

/// A task with its execution duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique, stable identifier.
    pub id: String,
    /// Execution duration, finite and non-negative.
    pub weight: Time,
}

impl Node {
    pub fn new(id: impl Into<String>, weight: Time) -> Self {
        Self {
            id: id.into(),
            weight,
        }
    }
}

/// A precedence constraint between two tasks.
///
/// `cost` is only paid when `source` and `target` run on different
/// processors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub cost: Time,
}

impl Edge {
    pub fn new(source: impl Into<String>, target: impl Into<String>, cost: Time) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            cost,
        }
    }
}

/// One adjacency entry: the neighbouring node and the communication cost of
/// the connecting edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Link {
    pub node: usize,
    pub cost: Time,
}

// ── TaskGraph ─────────────────────────────────────────────────────────────────

/// Validated, acyclic task graph.
#[derive(Debug, Clone)]
pub struct TaskGraph {
    nodes: Vec<Node>,
    index: HashMap<String, usize>,
    predecessors: Vec<Vec<Link>>,
    successors: Vec<Vec<Link>>,
    topo_order: Vec<usize>,
    edge_count: usize,
}

impl TaskGraph {
    /// Validate `nodes` / `edges` and freeze them into a [`TaskGraph`].
    ///
    /// Checks, in order: node weights and duplicate ids, then for each edge
    /// self-loops, dangling endpoints, cost, and duplicate pairs, and finally
    /// acyclicity.  The first failure is returned.
    ///
    /// # Errors
    /// [`SchedulerError::MalformedGraph`] or [`SchedulerError::CycleDetected`].
    pub fn build(nodes: Vec<Node>, edges: Vec<Edge>) -> Result<Self, SchedulerError> {
        let mut index = HashMap::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            if !node.weight.is_finite() || node.weight < 0.0 {
                return Err(MalformedReason::InvalidWeight {
                    node: node.id.clone(),
                    weight: node.weight,
                }
                .into());
            }
            if index.insert(node.id.clone(), i).is_some() {
                return Err(MalformedReason::DuplicateNode {
                    id: node.id.clone(),
                }
                .into());
            }
        }

        let mut predecessors: Vec<Vec<Link>> = vec![Vec::new(); nodes.len()];
        let mut successors: Vec<Vec<Link>> = vec![Vec::new(); nodes.len()];
        let mut seen: HashSet<(usize, usize)> = HashSet::with_capacity(edges.len());

        for edge in &edges {
            if edge.source == edge.target {
                return Err(MalformedReason::SelfLoop {
                    node: edge.source.clone(),
                }
                .into());
            }
            let lookup = |id: &String| {
                index
                    .get(id)
                    .copied()
                    .ok_or_else(|| MalformedReason::DanglingEdge {
                        source: edge.source.clone(),
                        target: edge.target.clone(),
                        missing: id.clone(),
                    })
            };
            let src = lookup(&edge.source)?;
            let dst = lookup(&edge.target)?;

            if !edge.cost.is_finite() || edge.cost < 0.0 {
                return Err(MalformedReason::InvalidCost {
                    source: edge.source.clone(),
                    target: edge.target.clone(),
                    cost: edge.cost,
                }
                .into());
            }
            if !seen.insert((src, dst)) {
                return Err(MalformedReason::DuplicateEdge {
                    source: edge.source.clone(),
                    target: edge.target.clone(),
                }
                .into());
            }

            successors[src].push(Link {
                node: dst,
                cost: edge.cost,
            });
            predecessors[dst].push(Link {
                node: src,
                cost: edge.cost,
            });
        }

        // Adjacency in input order regardless of edge order.
        for links in predecessors.iter_mut().chain(successors.iter_mut()) {
            links.sort_unstable_by_key(|l| l.node);
        }

        let topo_order = kahn_order(&nodes, &predecessors, &successors)?;

        debug!(
            nodes = nodes.len(),
            edges = edges.len(),
            "task graph built"
        );

        Ok(Self {
            nodes,
            index,
            predecessors,
            successors,
            topo_order,
            edge_count: edges.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// All nodes in input order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn id(&self, node: usize) -> &str {
        &self.nodes[node].id
    }

    pub fn weight(&self, node: usize) -> Time {
        self.nodes[node].weight
    }

    /// Position of the node with identifier `id`, if any.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Incoming edges of `node`, ordered by predecessor position.
    pub fn predecessors(&self, node: usize) -> &[Link] {
        &self.predecessors[node]
    }

    /// Outgoing edges of `node`, ordered by successor position.
    pub fn successors(&self, node: usize) -> &[Link] {
        &self.successors[node]
    }

    /// Communication cost of the edge `source -> target`, if it exists.
    pub fn edge_cost(&self, source: usize, target: usize) -> Option<Time> {
        self.successors[source]
            .iter()
            .find(|l| l.node == target)
            .map(|l| l.cost)
    }

    pub fn is_source(&self, node: usize) -> bool {
        self.predecessors[node].is_empty()
    }

    pub fn is_sink(&self, node: usize) -> bool {
        self.successors[node].is_empty()
    }

    /// Entry nodes (no predecessors) in input order.
    pub fn sources(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len()).filter(|&n| self.is_source(n))
    }

    /// Exit nodes (no successors) in input order.
    pub fn sinks(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len()).filter(|&n| self.is_sink(n))
    }

    /// Deterministic topological order, computed once at construction.
    ///
    /// Among nodes that become ready at the same time, the one declared first
    /// in the input comes first.
    pub fn topological_order(&self) -> &[usize] {
        &self.topo_order
    }
}

/// Kahn's algorithm with a min-heap on input position.
fn kahn_order(
    nodes: &[Node],
    predecessors: &[Vec<Link>],
    successors: &[Vec<Link>],
) -> Result<Vec<usize>, SchedulerError> {
    let mut in_degree: Vec<usize> = predecessors.iter().map(Vec::len).collect();
    let mut ready: BinaryHeap<Reverse<usize>> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, &d)| d == 0)
        .map(|(n, _)| Reverse(n))
        .collect();

    let mut order = Vec::with_capacity(nodes.len());
    while let Some(Reverse(n)) = ready.pop() {
        order.push(n);
        for link in &successors[n] {
            in_degree[link.node] -= 1;
            if in_degree[link.node] == 0 {
                ready.push(Reverse(link.node));
            }
        }
    }

    if order.len() != nodes.len() {
        let stuck: Vec<String> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, &d)| d > 0)
            .map(|(n, _)| nodes[n].id.clone())
            .collect();
        return Err(SchedulerError::CycleDetected { nodes: stuck });
    }

    Ok(order)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
