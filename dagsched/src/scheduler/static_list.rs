/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Static-priority list scheduling: HLFET and MCP.
//!
//! Both rank every node once, before the first decision, and then repeatedly
//! take the highest-ranked node whose predecessors are all scheduled.  They
//! differ in the ranking and in how the processor is picked:
//!
//! | Heuristic | Ranking | Processor |
//! |---|---|---|
//! | HLFET | SL descending, ties by input order | earliest finish |
//! | MCP | LST ascending, then the sorted LST key of the node and its successors, then input order | earliest start |
//!
//! Processor ties go to the lowest index.

use std::cmp::Ordering;

use tracing::debug;

use super::simulator::evaluate_all;
use super::state::ScheduleState;
use super::{Heuristic, SchedulerError};
use crate::attributes::{Attribute, PriorityAttributes};
use crate::graph::{TaskGraph, Time};
use crate::trace::{Assignment, Candidate, NodePriority, Trace, TraceRecorder};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProcessorRule {
    EarliestFinish,
    EarliestStart,
}

impl ProcessorRule {
    fn key(self, c: &Candidate) -> Time {
        match self {
            ProcessorRule::EarliestFinish => c.end,
            ProcessorRule::EarliestStart => c.start,
        }
    }

    fn label(self) -> &'static str {
        match self {
            ProcessorRule::EarliestFinish => "earliest finish",
            ProcessorRule::EarliestStart => "earliest start",
        }
    }
}

/// Highest Level First with Estimated Times.
pub(crate) fn hlfet(
    graph: &TaskGraph,
    attrs: &PriorityAttributes,
    num_processors: u32,
) -> Result<Trace, SchedulerError> {
    let sl = attrs.get(Attribute::StaticLevel);
    let mut order: Vec<usize> = (0..graph.len()).collect();
    // Stable sort keeps input order among equal levels.
    order.sort_by(|&a, &b| sl[b].total_cmp(&sl[a]));

    run(
        graph,
        num_processors,
        Heuristic::Hlfet,
        Attribute::StaticLevel,
        sl,
        order,
        ProcessorRule::EarliestFinish,
    )
}

/// Modified Critical Path.
pub(crate) fn mcp(
    graph: &TaskGraph,
    attrs: &PriorityAttributes,
    num_processors: u32,
) -> Result<Trace, SchedulerError> {
    let lst = attrs.get(Attribute::Lst);
    let keys: Vec<Vec<Time>> = (0..graph.len())
        .map(|n| mcp_key(graph, lst, n))
        .collect();

    let mut order: Vec<usize> = (0..graph.len()).collect();
    order.sort_by(|&a, &b| {
        lst[a]
            .total_cmp(&lst[b])
            .then_with(|| compare_keys(&keys[a], &keys[b]))
    });

    run(
        graph,
        num_processors,
        Heuristic::Mcp,
        Attribute::Lst,
        lst,
        order,
        ProcessorRule::EarliestStart,
    )
}

/// `[LST(n)] + [LST(s) for s in successors(n)]`, ascending.
fn mcp_key(graph: &TaskGraph, lst: &[Time], node: usize) -> Vec<Time> {
    let mut key: Vec<Time> = std::iter::once(lst[node])
        .chain(graph.successors(node).iter().map(|l| lst[l.node]))
        .collect();
    key.sort_by(|a, b| a.total_cmp(b));
    key
}

/// Lexicographic; a proper prefix sorts first.
fn compare_keys(a: &[Time], b: &[Time]) -> Ordering {
    a.iter()
        .zip(b)
        .map(|(x, y)| x.total_cmp(y))
        .find(|o| o.is_ne())
        .unwrap_or_else(|| a.len().cmp(&b.len()))
}

fn run(
    graph: &TaskGraph,
    num_processors: u32,
    heuristic: Heuristic,
    attribute: Attribute,
    priority: &[Time],
    order: Vec<usize>,
    rule: ProcessorRule,
) -> Result<Trace, SchedulerError> {
    let priorities = order
        .iter()
        .map(|&n| NodePriority {
            node: graph.id(n).to_string(),
            value: priority[n],
        })
        .collect();
    let mut recorder = TraceRecorder::new(heuristic, num_processors, attribute, priorities);
    let mut state = ScheduleState::new(graph, num_processors);

    while !state.is_complete() {
        let ready: Vec<usize> = order
            .iter()
            .copied()
            .filter(|&n| state.is_ready(n))
            .collect();
        let node = *ready.first().ok_or_else(|| {
            SchedulerError::InvariantViolation(format!(
                "{}: no ready node with {} of {} scheduled",
                heuristic,
                state.scheduled_count(),
                graph.len()
            ))
        })?;

        let candidates = evaluate_all(graph, &state, node)?;
        let best = candidates
            .iter()
            .reduce(|best, c| if rule.key(c) < rule.key(best) { c } else { best })
            .ok_or_else(|| SchedulerError::InvariantViolation("no processors".into()))?;
        let (processor, start) = (best.processor, best.start);

        let (placement, _) = state.commit(graph, node, processor, start)?;
        debug!(
            heuristic = %heuristic,
            node = graph.id(node),
            processor,
            start = placement.start,
            end = placement.end,
            "node committed"
        );

        let ready_ids: Vec<String> = ready.iter().map(|&n| graph.id(n).to_string()).collect();
        let description = format!(
            "Node {} ({} {}) is the first ready node in {} order {:?}; P{} gives the {} ({} → {}).",
            graph.id(node),
            attribute,
            priority[node],
            attribute,
            ready_ids,
            processor,
            rule.label(),
            placement.start,
            placement.end,
        );

        recorder.record(
            description,
            priority[node],
            ready_ids,
            Assignment {
                node: graph.id(node).to_string(),
                processor,
                start: placement.start,
                end: placement.end,
            },
            candidates,
        );
    }

    Ok(recorder.finish())
}
