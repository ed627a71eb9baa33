/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Dynamic list scheduling: ETF and DLS.
//!
//! At every decision point both heuristics evaluate each (ready node,
//! processor) pair and commit the best pair overall.  Only the selection key
//! differs:
//!
//! * ETF: minimal start time.
//! * DLS: maximal dynamic level `SL(node) - start`.
//!
//! Remaining ties go to the higher SL, then the lower processor index, then
//! the node that appears first in the input.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use tracing::debug;

use super::simulator::evaluate;
use super::state::ScheduleState;
use super::{Heuristic, SchedulerError};
use crate::attributes::{Attribute, PriorityAttributes};
use crate::graph::{TaskGraph, Time};
use crate::trace::{Assignment, Candidate, NodePriority, Trace, TraceRecorder};

/// Earliest Time First.
pub(crate) fn etf(
    graph: &TaskGraph,
    attrs: &PriorityAttributes,
    num_processors: u32,
) -> Result<Trace, SchedulerError> {
    run(graph, attrs, num_processors, Heuristic::Etf)
}

/// Dynamic Level Scheduling.
pub(crate) fn dls(
    graph: &TaskGraph,
    attrs: &PriorityAttributes,
    num_processors: u32,
) -> Result<Trace, SchedulerError> {
    run(graph, attrs, num_processors, Heuristic::Dls)
}

/// A candidate together with the node position it belongs to.
struct Pair {
    node: usize,
    candidate: Candidate,
}

/// `Less` means `a` is preferred.
fn compare(heuristic: Heuristic, sl: &[Time], a: &Pair, b: &Pair) -> Ordering {
    let primary = match heuristic {
        Heuristic::Dls => {
            let dl = |p: &Pair| p.candidate.dynamic_level.unwrap_or(f64::NEG_INFINITY);
            dl(b).total_cmp(&dl(a))
        }
        _ => a.candidate.start.total_cmp(&b.candidate.start),
    };
    primary
        .then_with(|| sl[b.node].total_cmp(&sl[a.node]))
        .then_with(|| a.candidate.processor.cmp(&b.candidate.processor))
        .then_with(|| a.node.cmp(&b.node))
}

fn run(
    graph: &TaskGraph,
    attrs: &PriorityAttributes,
    num_processors: u32,
    heuristic: Heuristic,
) -> Result<Trace, SchedulerError> {
    let sl = attrs.get(Attribute::StaticLevel);

    let mut ranked: Vec<usize> = (0..graph.len()).collect();
    ranked.sort_by(|&a, &b| sl[b].total_cmp(&sl[a]));
    let priorities = ranked
        .iter()
        .map(|&n| NodePriority {
            node: graph.id(n).to_string(),
            value: sl[n],
        })
        .collect();

    let mut recorder =
        TraceRecorder::new(heuristic, num_processors, Attribute::StaticLevel, priorities);
    let mut state = ScheduleState::new(graph, num_processors);
    let mut ready: BTreeSet<usize> = graph.sources().collect();

    while !ready.is_empty() {
        let mut pairs = Vec::with_capacity(ready.len() * num_processors as usize);
        for &node in &ready {
            for processor in state.processors() {
                let mut candidate = evaluate(graph, &state, node, processor)?;
                if heuristic == Heuristic::Dls {
                    candidate.dynamic_level = Some(sl[node] - candidate.start);
                }
                pairs.push(Pair { node, candidate });
            }
        }

        let best = pairs
            .iter()
            .min_by(|a, b| compare(heuristic, sl, a, b))
            .ok_or_else(|| SchedulerError::InvariantViolation("no processors".into()))?;
        let (node, processor, start) = (best.node, best.candidate.processor, best.candidate.start);
        let dynamic_level = best.candidate.dynamic_level;

        let ready_ids: Vec<String> = ready.iter().map(|&n| graph.id(n).to_string()).collect();
        let (placement, released) = state.commit(graph, node, processor, start)?;
        ready.remove(&node);
        ready.extend(released);

        debug!(
            heuristic = %heuristic,
            node = graph.id(node),
            processor,
            start = placement.start,
            end = placement.end,
            "node committed"
        );

        let description = match dynamic_level {
            Some(dl) => format!(
                "Among {} pair(s) of ready nodes {:?} × {} processor(s), node {} on P{} has the highest dynamic level SL {} - start {} = {}.",
                pairs.len(),
                ready_ids,
                num_processors,
                graph.id(node),
                processor,
                sl[node],
                placement.start,
                dl,
            ),
            None => format!(
                "Among {} pair(s) of ready nodes {:?} × {} processor(s), node {} on P{} starts earliest at {} (SL {}).",
                pairs.len(),
                ready_ids,
                num_processors,
                graph.id(node),
                processor,
                placement.start,
                sl[node],
            ),
        };

        recorder.record(
            description,
            sl[node],
            ready_ids,
            Assignment {
                node: graph.id(node).to_string(),
                processor,
                start: placement.start,
                end: placement.end,
            },
            pairs.into_iter().map(|p| p.candidate).collect(),
        );
    }

    if !state.is_complete() {
        return Err(SchedulerError::InvariantViolation(format!(
            "{}: ready set drained with {} of {} node(s) scheduled",
            heuristic,
            state.scheduled_count(),
            graph.len()
        )));
    }

    Ok(recorder.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::fixtures::{build, diamond};

    fn order(trace: &Trace) -> Vec<(&str, u32, Time)> {
        trace
            .steps()
            .iter()
            .map(|s| (s.assignment.node.as_str(), s.assignment.processor, s.assignment.start))
            .collect()
    }

    #[test]
    fn etf_on_diamond() {
        let g = diamond();
        let trace = etf(&g, &PriorityAttributes::compute(&g), 3).unwrap();
        assert_eq!(
            order(&trace),
            vec![
                ("1", 1, 0.0),
                ("2", 1, 20.0),
                ("4", 2, 22.0),
                ("3", 3, 24.0),
                ("5", 2, 37.0),
                ("6", 1, 40.0),
                ("7", 3, 44.0),
                ("8", 1, 45.0),
                ("9", 2, 48.0),
                ("10", 2, 68.0),
            ]
        );
        assert_eq!(trace.makespan(), 88.0);
    }

    #[test]
    fn dls_on_diamond() {
        let g = diamond();
        let trace = dls(&g, &PriorityAttributes::compute(&g), 3).unwrap();
        assert_eq!(
            order(&trace),
            vec![
                ("1", 1, 0.0),
                ("2", 1, 20.0),
                ("4", 2, 22.0),
                ("3", 3, 24.0),
                ("5", 2, 37.0),
                ("6", 1, 40.0),
                ("9", 2, 48.0),
                ("8", 1, 45.0),
                ("7", 3, 44.0),
                ("10", 2, 68.0),
            ]
        );
        assert_eq!(trace.makespan(), 88.0);
        for step in trace.steps() {
            assert!(step.candidates.iter().all(|c| c.dynamic_level.is_some()));
        }
    }

    #[test]
    fn candidate_set_is_every_ready_node_on_every_processor() {
        let g = diamond();
        let trace = etf(&g, &PriorityAttributes::compute(&g), 3).unwrap();
        let second = &trace.steps()[1];
        assert_eq!(second.ready, vec!["2", "3", "4", "5", "6"]);
        assert_eq!(second.candidates.len(), 15);
        assert!(second.candidates.iter().all(|c| c.dynamic_level.is_none()));
    }

    #[test]
    fn equal_start_prefers_higher_static_level() {
        let g = build(&[("short", 1.0), ("long", 9.0)], &[]).unwrap();
        let trace = etf(&g, &PriorityAttributes::compute(&g), 1).unwrap();
        assert_eq!(trace.steps()[0].assignment.node, "long");
    }

    #[test]
    fn equal_dynamic_level_prefers_higher_static_level() {
        // After "a", both "v" on P2 at 0 and "u" on P1 at 3 reach
        // DL 2; "u" has SL 5 against 2 and wins despite its input position.
        let g = build(&[("a", 3.0), ("v", 2.0), ("u", 5.0)], &[("a", "u", 0.0)]).unwrap();
        let trace = dls(&g, &PriorityAttributes::compute(&g), 2).unwrap();
        assert_eq!(order(&trace), vec![("a", 1, 0.0), ("u", 1, 3.0), ("v", 2, 0.0)]);

        let second = &trace.steps()[1];
        let level = |node: &str, processor: u32| {
            second
                .candidates
                .iter()
                .find(|c| c.node == node && c.processor == processor)
                .and_then(|c| c.dynamic_level)
        };
        assert_eq!(level("u", 1), Some(2.0));
        assert_eq!(level("v", 2), Some(2.0));
    }

    #[test]
    fn ready_list_is_in_input_order() {
        let g = build(&[("a", 1.0), ("b", 5.0), ("c", 3.0)], &[]).unwrap();
        let trace = dls(&g, &PriorityAttributes::compute(&g), 1).unwrap();
        assert_eq!(trace.steps()[0].ready, vec!["a", "b", "c"]);
        assert_eq!(trace.steps()[0].assignment.node, "b");
    }

    #[test]
    fn independent_nodes_spread_over_processors() {
        let g = build(&[("a", 4.0), ("b", 4.0)], &[]).unwrap();
        for trace in [
            etf(&g, &PriorityAttributes::compute(&g), 2).unwrap(),
            dls(&g, &PriorityAttributes::compute(&g), 2).unwrap(),
        ] {
            let a = trace.assignment_of("a").unwrap();
            let b = trace.assignment_of("b").unwrap();
            assert_ne!(a.processor, b.processor);
            assert_eq!((a.start, b.start), (0.0, 0.0));
        }
    }
}
