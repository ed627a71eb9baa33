/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! List scheduler for task DAGs.
//!
//! [`ListScheduler`] runs one of four classical list-scheduling heuristics on
//! a validated [`TaskGraph`] and returns a [`Trace`]: one step per committed
//! node, each with every (node, processor) candidate that was compared.
//!
//! | Heuristic | Priority | Node choice | Processor choice |
//! |---|---|---|---|
//! | HLFET | SL, fixed | first ready node by SL | earliest finish |
//! | MCP | LST, fixed | first ready node by LST | earliest start |
//! | ETF | SL (ties only) | best (node, processor) pair | minimal start |
//! | DLS | SL | best (node, processor) pair | maximal `SL - start` |
//!
//! # Design decisions
//!
//! | Topic | Choice |
//! |---|---|
//! | State | Stateless `schedule()`; all per-run state lives in a [`ScheduleState`] local to the call |
//! | Readiness | HLFET and MCP only pick nodes whose predecessors are all scheduled |
//! | Ties | Lowest processor index, then earliest node in the input |
//! | Dispatch | Closed [`Heuristic`] enum through a lookup table; names are parsed once at the boundary |
//! | Thread safety | `Send + Sync`; the graph and the attributes are only borrowed |
//! | Post-check | Every finished schedule is re-verified by [`feasibility::verify`] |
//!
//! # Example
//! ```rust,ignore
//! let scheduler = ListScheduler::new(Arc::new(SchedulerConfig::default()));
//! let trace = scheduler.schedule(&graph, 3, Heuristic::Mcp)?;
//! println!("makespan = {}", trace.makespan());
//! ```

pub mod dynamic_list;
pub mod error;
pub mod exhaustive;
pub mod feasibility;
pub mod simulator;
pub mod state;
pub mod static_list;

pub use error::{ConfigurationReason, MalformedReason, SchedulerError};
pub use exhaustive::{ExhaustiveSchedule, EXHAUSTIVE_NODE_LIMIT};
pub(crate) use exhaustive::optimal_schedule;
pub use state::{Placement, ProcessorId, ScheduleState};

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info};

use crate::attributes::PriorityAttributes;
use crate::config::SchedulerConfig;
use crate::graph::TaskGraph;
use crate::trace::Trace;

// ── Heuristic enumeration ─────────────────────────────────────────────────────

/// The four list-scheduling heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Heuristic {
    Hlfet,
    Mcp,
    Etf,
    Dls,
}

type HeuristicFn = fn(&TaskGraph, &PriorityAttributes, u32) -> Result<Trace, SchedulerError>;

struct HeuristicEntry {
    heuristic: Heuristic,
    name: &'static str,
    title: &'static str,
    run: HeuristicFn,
}

/// Same order as the enum.
static HEURISTICS: [HeuristicEntry; 4] = [
    HeuristicEntry {
        heuristic: Heuristic::Hlfet,
        name: "HLFET",
        title: "Highest Level First with Estimated Times",
        run: static_list::hlfet,
    },
    HeuristicEntry {
        heuristic: Heuristic::Mcp,
        name: "MCP",
        title: "Modified Critical Path",
        run: static_list::mcp,
    },
    HeuristicEntry {
        heuristic: Heuristic::Etf,
        name: "ETF",
        title: "Earliest Time First",
        run: dynamic_list::etf,
    },
    HeuristicEntry {
        heuristic: Heuristic::Dls,
        name: "DLS",
        title: "Dynamic Level Scheduling",
        run: dynamic_list::dls,
    },
];

impl Heuristic {
    pub const ALL: [Heuristic; 4] = [
        Heuristic::Hlfet,
        Heuristic::Mcp,
        Heuristic::Etf,
        Heuristic::Dls,
    ];

    fn entry(self) -> &'static HeuristicEntry {
        &HEURISTICS[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.entry().name
    }

    /// Long form, e.g. "Modified Critical Path".
    pub fn title(self) -> &'static str {
        self.entry().title
    }

    /// Run the heuristic with no limit checks and no post-verification.
    /// Callers go through [`ListScheduler`], which does both.
    pub(crate) fn run(
        self,
        graph: &TaskGraph,
        attrs: &PriorityAttributes,
        num_processors: u32,
    ) -> Result<Trace, SchedulerError> {
        if num_processors == 0 {
            return Err(ConfigurationReason::NoProcessors.into());
        }
        (self.entry().run)(graph, attrs, num_processors)
    }
}

impl fmt::Display for Heuristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Heuristic {
    type Err = SchedulerError;

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        HEURISTICS
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(wanted))
            .map(|e| e.heuristic)
            .ok_or_else(|| ConfigurationReason::UnknownHeuristic(s.to_string()).into())
    }
}

// ── ListScheduler ─────────────────────────────────────────────────────────────

/// Entry point for scheduling requests.
///
/// Holds only the shared, read-only configuration.  All per-run state is
/// allocated inside [`schedule`](Self::schedule) and dropped at the end of the
/// call, so one scheduler can serve concurrent requests.
#[derive(Debug, Clone, Default)]
pub struct ListScheduler {
    config: Arc<SchedulerConfig>,
}

impl ListScheduler {
    pub fn new(config: Arc<SchedulerConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    // ── Public entry points ───────────────────────────────────────────────────

    /// Schedule `graph` on `num_processors` with `heuristic`.
    ///
    /// # Errors
    /// * [`SchedulerError::InvalidConfiguration`] if the processor count is
    ///   zero or above the configured maximum, or the graph exceeds the
    ///   configured node limit.
    /// * [`SchedulerError::InvariantViolation`] if the heuristic misbehaves;
    ///   no partial trace is returned.
    pub fn schedule(
        &self,
        graph: &TaskGraph,
        num_processors: u32,
        heuristic: Heuristic,
    ) -> Result<Trace, SchedulerError> {
        // ── Preconditions ─────────────────────────────────────────────────────
        self.check_request(graph, num_processors)?;

        info!(
            heuristic = %heuristic,
            nodes = graph.len(),
            edges = graph.edge_count(),
            num_processors,
            "=== ListScheduler::schedule() ==="
        );

        // ── Priorities + dispatch ─────────────────────────────────────────────
        let attrs = PriorityAttributes::compute(graph);
        let trace = heuristic.run(graph, &attrs, num_processors)?;

        // ── Post-schedule verification ────────────────────────────────────────
        let violations = feasibility::verify(graph, num_processors, &trace.assignments());
        if !violations.is_empty() {
            for v in &violations {
                error!(heuristic = %heuristic, violation = %v, "infeasible schedule");
            }
            return Err(SchedulerError::InvariantViolation(format!(
                "{} produced an infeasible schedule: {}",
                heuristic, violations[0]
            )));
        }

        info!(
            heuristic = %heuristic,
            steps = trace.steps().len(),
            makespan = trace.makespan(),
            "=== Scheduling complete ==="
        );
        Ok(trace)
    }

    /// Like [`schedule`](Self::schedule), with the heuristic given by name.
    pub fn schedule_named(
        &self,
        graph: &TaskGraph,
        num_processors: u32,
        heuristic: &str,
    ) -> Result<Trace, SchedulerError> {
        self.schedule(graph, num_processors, heuristic.parse()?)
    }

    /// Exhaustive baseline; see [`exhaustive`].
    ///
    /// # Errors
    /// The limits of [`schedule`](Self::schedule), plus
    /// [`ConfigurationReason::GraphTooLarge`] above [`EXHAUSTIVE_NODE_LIMIT`].
    pub fn optimal(
        &self,
        graph: &TaskGraph,
        num_processors: u32,
    ) -> Result<ExhaustiveSchedule, SchedulerError> {
        self.check_request(graph, num_processors)?;
        optimal_schedule(graph, num_processors)
    }

    fn check_request(&self, graph: &TaskGraph, num_processors: u32) -> Result<(), SchedulerError> {
        if num_processors == 0 {
            return Err(ConfigurationReason::NoProcessors.into());
        }
        if num_processors > self.config.max_processors {
            return Err(ConfigurationReason::TooManyProcessors {
                requested: num_processors,
                limit: self.config.max_processors,
            }
            .into());
        }
        if graph.len() > self.config.max_nodes {
            return Err(ConfigurationReason::GraphTooLarge {
                nodes: graph.len(),
                limit: self.config.max_nodes,
            }
            .into());
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
