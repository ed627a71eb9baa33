/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Structured error types for dagsched.
//!
//! Two reason enums carry the exact offending input so the caller can point
//! at it without parsing a message:
//!
//! * [`MalformedReason`]: why a graph was rejected at construction.
//! * [`ConfigurationReason`]: why a request was rejected before scheduling.
//!
//! Both are wrapped by the top-level [`SchedulerError`], which is what every
//! fallible library entry point returns.
//!
//! | Variant | Suggested transport mapping |
//! |---|---|
//! | `MalformedGraph` | `400 Bad Request` / `InvalidArgument` |
//! | `CycleDetected` | `400 Bad Request` / `InvalidArgument` |
//! | `InvalidConfiguration` | `400 Bad Request` / `InvalidArgument` |
//! | `InvariantViolation` | `500 Internal Server Error` / `Internal` |

use thiserror::Error;

// ── Graph construction ────────────────────────────────────────────────────────

/// Detailed reason why [`TaskGraph::build`](crate::graph::TaskGraph::build)
/// rejected its input.
#[derive(Debug, Clone, PartialEq)]
pub enum MalformedReason {
    /// Two nodes share the same id.
    DuplicateNode { id: String },

    /// An edge references a node id that was never declared.
    DanglingEdge {
        source: String,
        target: String,
        missing: String,
    },

    /// An edge connects a node to itself.
    SelfLoop { node: String },

    /// The same ordered pair appears twice in the edge list.
    DuplicateEdge { source: String, target: String },

    /// A node weight is negative, NaN or infinite.
    InvalidWeight { node: String, weight: f64 },

    /// An edge cost is negative, NaN or infinite.
    InvalidCost {
        source: String,
        target: String,
        cost: f64,
    },
}

impl std::fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MalformedReason::DuplicateNode { id } => {
                write!(f, "node '{}' is declared more than once", id)
            }

            MalformedReason::DanglingEdge {
                source,
                target,
                missing,
            } => write!(
                f,
                "edge '{}' -> '{}' references unknown node '{}'",
                source, target, missing
            ),

            MalformedReason::SelfLoop { node } => {
                write!(f, "edge '{}' -> '{}' is a self-loop", node, node)
            }

            MalformedReason::DuplicateEdge { source, target } => write!(
                f,
                "edge '{}' -> '{}' is declared more than once",
                source, target
            ),

            MalformedReason::InvalidWeight { node, weight } => write!(
                f,
                "node '{}' has weight {} (must be finite and non-negative)",
                node, weight
            ),

            MalformedReason::InvalidCost {
                source,
                target,
                cost,
            } => write!(
                f,
                "edge '{}' -> '{}' has cost {} (must be finite and non-negative)",
                source, target, cost
            ),
        }
    }
}

// ── Request configuration ─────────────────────────────────────────────────────

/// Detailed reason why a request was rejected before any scheduling ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationReason {
    /// `num_processors` was zero.
    NoProcessors,

    /// `num_processors` exceeds the configured maximum.
    TooManyProcessors { requested: u32, limit: u32 },

    /// The graph has more nodes than the configured maximum.  Bounds the size
    /// of the recorded trace, which grows with `nodes × candidates`.
    GraphTooLarge { nodes: usize, limit: usize },

    /// The heuristic name is not one of HLFET, MCP, ETF, DLS.
    UnknownHeuristic(String),

    /// The attribute name is not one of SL, T-Level, EST, LST, B-Level.
    UnknownAttribute(String),
}

impl std::fmt::Display for ConfigurationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigurationReason::NoProcessors => {
                write!(f, "at least one processor is required")
            }
            ConfigurationReason::TooManyProcessors { requested, limit } => write!(
                f,
                "{} processors requested but at most {} are allowed",
                requested, limit
            ),
            ConfigurationReason::GraphTooLarge { nodes, limit } => write!(
                f,
                "graph has {} nodes but at most {} are allowed",
                nodes, limit
            ),
            ConfigurationReason::UnknownHeuristic(name) => write!(
                f,
                "unknown heuristic '{}' (valid: HLFET, MCP, ETF, DLS)",
                name
            ),
            ConfigurationReason::UnknownAttribute(name) => write!(
                f,
                "unknown attribute '{}' (valid: SL, T-Level, EST, LST, B-Level)",
                name
            ),
        }
    }
}

// ── Top-level errors ──────────────────────────────────────────────────────────

/// Top-level error type returned by graph construction and by every
/// scheduling entry point.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The input graph is structurally invalid.
    #[error("malformed task graph: {0}")]
    MalformedGraph(MalformedReason),

    /// Topological sorting failed.  `nodes` lists every node that sits on or
    /// behind a cycle, in input order.
    #[error("task graph contains a cycle involving nodes [{}]", .nodes.join(", "))]
    CycleDetected { nodes: Vec<String> },

    /// The request parameters are unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(ConfigurationReason),

    /// A heuristic broke one of its own ordering guarantees (for example it
    /// evaluated a node whose predecessor was not yet scheduled).
    ///
    /// This is a programming error, never a property of the input, and must
    /// not be retried.
    #[error("internal invariant violated: {0}")]
    InvariantViolation(String),
}

impl From<MalformedReason> for SchedulerError {
    fn from(reason: MalformedReason) -> Self {
        SchedulerError::MalformedGraph(reason)
    }
}

impl From<ConfigurationReason> for SchedulerError {
    fn from(reason: ConfigurationReason) -> Self {
        SchedulerError::InvalidConfiguration(reason)
    }
}
