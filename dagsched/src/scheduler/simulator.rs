/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Earliest-start computation shared by every heuristic.
//!
//! ```text
//! start = available(p)
//! for each predecessor q of n:
//!     arrival = end(q)              if q ran on p
//!             = end(q) + cost(q, n) otherwise
//!     start   = max(start, arrival)
//! end = start + weight(n)
//! ```
//!
//! Every predecessor of `n` must already be placed.  Asking for a node whose
//! predecessor is still unscheduled means a heuristic broke its readiness
//! ordering and is reported as [`SchedulerError::InvariantViolation`].

use tracing::trace;

use super::state::{Placement, ProcessorId, ScheduleState};
use super::SchedulerError;
use crate::graph::{TaskGraph, Time};
use crate::trace::{Candidate, PredecessorDetail};

fn placed(
    graph: &TaskGraph,
    state: &ScheduleState,
    node: usize,
    pred: usize,
) -> Result<Placement, SchedulerError> {
    state.placement(pred).ok_or_else(|| {
        SchedulerError::InvariantViolation(format!(
            "node '{}' evaluated before its predecessor '{}' was scheduled",
            graph.id(node),
            graph.id(pred)
        ))
    })
}

/// Earliest start of `node` on `processor`, without the breakdown.
pub fn earliest_start(
    graph: &TaskGraph,
    state: &ScheduleState,
    node: usize,
    processor: ProcessorId,
) -> Result<Time, SchedulerError> {
    let mut start = state.available(processor);
    for link in graph.predecessors(node) {
        let q = placed(graph, state, node, link.node)?;
        let arrival = if q.processor == processor {
            q.end
        } else {
            q.end + link.cost
        };
        start = start.max(arrival);
    }
    Ok(start)
}

/// Evaluate `node` on `processor` and keep the per-predecessor breakdown.
pub fn evaluate(
    graph: &TaskGraph,
    state: &ScheduleState,
    node: usize,
    processor: ProcessorId,
) -> Result<Candidate, SchedulerError> {
    let available_time = state.available(processor);
    let mut bound = available_time;
    let mut limiting = None;
    let mut predecessors = Vec::with_capacity(graph.predecessors(node).len());

    for link in graph.predecessors(node) {
        let q = placed(graph, state, node, link.node)?;
        let same_processor = q.processor == processor;
        let comm_cost = if same_processor { 0.0 } else { link.cost };
        let arrival = q.end + comm_cost;
        if arrival > bound {
            bound = arrival;
            limiting = Some(link.node);
        }
        predecessors.push(PredecessorDetail {
            predecessor: graph.id(link.node).to_string(),
            processor: q.processor,
            same_processor,
            pred_start: q.start,
            pred_end: q.end,
            comm_cost,
            arrival,
            bound,
        });
    }

    let weight = graph.weight(node);
    trace!(
        node = graph.id(node),
        processor,
        start = bound,
        end = bound + weight,
        "candidate evaluated"
    );

    Ok(Candidate {
        node: graph.id(node).to_string(),
        processor,
        start: bound,
        end: bound + weight,
        weight,
        available_time,
        limiting_predecessor: limiting.map(|n| graph.id(n).to_string()),
        dynamic_level: None,
        predecessors,
    })
}

/// Evaluate `node` on every processor, `P1` first.
pub fn evaluate_all(
    graph: &TaskGraph,
    state: &ScheduleState,
    node: usize,
) -> Result<Vec<Candidate>, SchedulerError> {
    state
        .processors()
        .map(|p| evaluate(graph, state, node, p))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::fixtures::{build, diamond};

    #[test]
    fn source_starts_when_processor_frees() {
        let g = diamond();
        let s = ScheduleState::new(&g, 3);
        let c = evaluate(&g, &s, 0, 2).unwrap();
        assert_eq!((c.start, c.end), (0.0, 20.0));
        assert!(c.predecessors.is_empty());
        assert!(c.limiting_predecessor.is_none());
    }

    #[test]
    fn communication_cost_only_applies_across_processors() {
        let g = diamond();
        let mut s = ScheduleState::new(&g, 3);
        s.commit(&g, 0, 1, 0.0).unwrap();

        let node2 = g.index_of("2").unwrap();
        let local = evaluate(&g, &s, node2, 1).unwrap();
        assert_eq!(local.start, 20.0);
        assert!(local.predecessors[0].same_processor);
        assert_eq!(local.predecessors[0].comm_cost, 0.0);
        // P1 is busy until 20 as well, so the predecessor does not move the bound.
        assert!(local.limiting_predecessor.is_none());

        let remote = evaluate(&g, &s, node2, 2).unwrap();
        assert_eq!(remote.start, 28.0);
        assert_eq!(remote.end, 48.0);
        assert_eq!(remote.predecessors[0].comm_cost, 8.0);
        assert_eq!(remote.predecessors[0].arrival, 28.0);
        assert_eq!(remote.limiting_predecessor.as_deref(), Some("1"));
    }

    #[test]
    fn latest_arrival_wins() {
        let g = build(
            &[("a", 5.0), ("b", 2.0), ("c", 1.0)],
            &[("a", "c", 1.0), ("b", "c", 10.0)],
        )
        .unwrap();
        let mut s = ScheduleState::new(&g, 3);
        s.commit(&g, 0, 1, 0.0).unwrap();
        s.commit(&g, 1, 2, 0.0).unwrap();

        let on_p1 = evaluate(&g, &s, 2, 1).unwrap();
        assert_eq!(on_p1.start, 12.0);
        assert_eq!(on_p1.limiting_predecessor.as_deref(), Some("b"));

        let on_p2 = evaluate(&g, &s, 2, 2).unwrap();
        assert_eq!(on_p2.start, 6.0);
        assert_eq!(on_p2.limiting_predecessor.as_deref(), Some("a"));

        assert_eq!(earliest_start(&g, &s, 2, 3).unwrap(), 12.0);
    }

    #[test]
    fn evaluate_all_covers_every_processor() {
        let g = diamond();
        let s = ScheduleState::new(&g, 3);
        let all = evaluate_all(&g, &s, 0).unwrap();
        assert_eq!(
            all.iter().map(|c| c.processor).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn unscheduled_predecessor_is_an_invariant_violation() {
        let g = diamond();
        let s = ScheduleState::new(&g, 3);
        let node2 = g.index_of("2").unwrap();
        assert!(matches!(
            evaluate(&g, &s, node2, 1),
            Err(SchedulerError::InvariantViolation(_))
        ));
        assert!(earliest_start(&g, &s, node2, 1).is_err());
    }
}
