/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Exhaustive baseline for very small graphs.
//!
//! Depth-first branch and bound over every (ready node, processor) choice,
//! placing each node at its earliest start on the chosen processor exactly
//! as the heuristics do.  The result is therefore the best schedule any list
//! heuristic could have produced, which makes it a fair yardstick for them.
//!
//! * The incumbent is seeded with the best of the four heuristics.
//! * A branch is cut once its lower bound reaches the incumbent.  The bound
//!   is the largest of the makespan so far, `min-start(n) + SL(n)` over the
//!   ready nodes, and the total work spread evenly over all processors.
//! * Processors that are still empty are interchangeable, so only the first
//!   one is tried.
//! * Committing independent nodes in either order reaches the same partial
//!   schedule.  Each partial schedule is expanded once, keyed on its
//!   signature.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, info};

use super::simulator::earliest_start;
use super::state::ScheduleState;
use super::{ConfigurationReason, Heuristic, SchedulerError};
use crate::attributes::{Attribute, PriorityAttributes};
use crate::graph::{TaskGraph, Time};
use crate::trace::Assignment;

/// Largest graph the search accepts.
pub const EXHAUSTIVE_NODE_LIMIT: usize = 12;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExhaustiveSchedule {
    pub makespan: Time,
    /// In placement order.
    pub assignments: Vec<Assignment>,
    /// Partial schedules visited, repeats included.
    pub explored: u64,
    /// Heuristic whose schedule seeded the incumbent.
    pub seed: Heuristic,
    pub seed_makespan: Time,
}

impl ExhaustiveSchedule {
    /// `true` when the search found nothing better than the seed.
    pub fn seed_is_optimal(&self) -> bool {
        self.makespan >= self.seed_makespan
    }
}

/// Optimal append-only list schedule of `graph` on `num_processors`.
///
/// Processor limits are checked by [`ListScheduler::optimal`](super::ListScheduler::optimal).
///
/// # Errors
/// [`SchedulerError::InvalidConfiguration`] for zero processors or more than
/// [`EXHAUSTIVE_NODE_LIMIT`] nodes.
pub(crate) fn optimal_schedule(
    graph: &TaskGraph,
    num_processors: u32,
) -> Result<ExhaustiveSchedule, SchedulerError> {
    if num_processors == 0 {
        return Err(ConfigurationReason::NoProcessors.into());
    }
    if graph.len() > EXHAUSTIVE_NODE_LIMIT {
        return Err(ConfigurationReason::GraphTooLarge {
            nodes: graph.len(),
            limit: EXHAUSTIVE_NODE_LIMIT,
        }
        .into());
    }

    let attrs = PriorityAttributes::compute(graph);

    let mut seed: Option<(Heuristic, Time, Vec<Assignment>)> = None;
    for heuristic in Heuristic::ALL {
        let trace = heuristic.run(graph, &attrs, num_processors)?;
        let makespan = trace.makespan();
        if seed.as_ref().map_or(true, |(_, best, _)| makespan < *best) {
            seed = Some((heuristic, makespan, trace.assignments()));
        }
    }
    let (seed_heuristic, seed_makespan, seed_assignments) = seed.ok_or_else(|| {
        SchedulerError::InvariantViolation("no heuristic available to seed the search".into())
    })?;

    info!(
        nodes = graph.len(),
        num_processors,
        seed = %seed_heuristic,
        seed_makespan,
        "exhaustive search started"
    );

    let mut search = Search {
        graph,
        sl: attrs.get(Attribute::StaticLevel),
        num_processors,
        best_makespan: seed_makespan,
        best: seed_assignments,
        path: Vec::with_capacity(graph.len()),
        expanded: HashSet::new(),
        explored: 0,
    };
    search.descend(&ScheduleState::new(graph, num_processors))?;

    info!(
        makespan = search.best_makespan,
        explored = search.explored,
        distinct = search.expanded.len(),
        "exhaustive search finished"
    );

    Ok(ExhaustiveSchedule {
        makespan: search.best_makespan,
        assignments: search.best,
        explored: search.explored,
        seed: seed_heuristic,
        seed_makespan,
    })
}

/// A partial schedule up to relabelling of the processors: the scheduled
/// set, and per processor its availability plus the end times of its nodes
/// that still feed an unscheduled successor.  Times are stored as bits.
#[derive(Debug, PartialEq, Eq, Hash)]
struct Signature {
    scheduled: u64,
    processors: Vec<(u64, Vec<(usize, u64)>)>,
}

struct Search<'a> {
    graph: &'a TaskGraph,
    sl: &'a [Time],
    num_processors: u32,
    best_makespan: Time,
    best: Vec<Assignment>,
    path: Vec<Assignment>,
    expanded: HashSet<Signature>,
    explored: u64,
}

impl Search<'_> {
    fn descend(&mut self, state: &ScheduleState) -> Result<(), SchedulerError> {
        self.explored += 1;

        if state.is_complete() {
            let makespan = state.makespan();
            if makespan < self.best_makespan {
                debug!(makespan, explored = self.explored, "better schedule found");
                self.best_makespan = makespan;
                self.best = self.path.clone();
            }
            return Ok(());
        }

        // The incumbent only improves, so a signature cut once stays cut.
        if !self.expanded.insert(self.signature(state)) {
            return Ok(());
        }

        let mut bound = state.makespan().max(self.work_bound(state));
        let mut options = Vec::new();
        for node in state.ready_nodes() {
            let mut soonest = f64::INFINITY;
            let mut tried_empty = false;
            for processor in state.processors() {
                let empty = state.is_empty_processor(processor);
                if empty && tried_empty {
                    continue;
                }
                tried_empty |= empty;
                let start = earliest_start(self.graph, state, node, processor)?;
                soonest = soonest.min(start);
                options.push((node, processor, start));
            }
            bound = bound.max(soonest + self.sl[node]);
        }
        if bound >= self.best_makespan {
            return Ok(());
        }

        for (node, processor, start) in options {
            let mut next = state.clone();
            let (placement, _) = next.commit(self.graph, node, processor, start)?;
            self.path.push(Assignment {
                node: self.graph.id(node).to_string(),
                processor,
                start: placement.start,
                end: placement.end,
            });
            self.descend(&next)?;
            self.path.pop();
        }
        Ok(())
    }

    /// Busy time so far plus the remaining work, spread over every processor.
    fn work_bound(&self, state: &ScheduleState) -> Time {
        let busy: Time = state.processors().map(|p| state.available(p)).sum();
        let remaining: Time = (0..self.graph.len())
            .filter(|&n| !state.is_scheduled(n))
            .map(|n| self.graph.weight(n))
            .sum();
        (busy + remaining) / f64::from(self.num_processors)
    }

    fn signature(&self, state: &ScheduleState) -> Signature {
        let mut scheduled = 0u64;
        let mut processors: Vec<(u64, Vec<(usize, u64)>)> = state
            .processors()
            .map(|p| (state.available(p).to_bits(), Vec::new()))
            .collect();
        for node in 0..self.graph.len() {
            if let Some(placement) = state.placement(node) {
                scheduled |= 1 << node;
                let feeds_pending = self
                    .graph
                    .successors(node)
                    .iter()
                    .any(|l| !state.is_scheduled(l.node));
                if feeds_pending {
                    processors[placement.processor as usize - 1]
                        .1
                        .push((node, placement.end.to_bits()));
                }
            }
        }
        processors.sort_unstable();
        Signature {
            scheduled,
            processors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::fixtures::{build, diamond};
    use crate::scheduler::feasibility::verify;

    #[test]
    fn search_beats_every_heuristic_on_a_small_fork() {
        // Keeping "c" next to "a" and sending "d" away finishes at 7; every
        // heuristic keeps "d" local instead and finishes at 8.
        let g = build(
            &[("a", 1.0), ("b", 1.0), ("c", 4.0), ("d", 5.0)],
            &[("a", "c", 3.0), ("a", "d", 1.0)],
        )
        .unwrap();
        let result = optimal_schedule(&g, 3).unwrap();
        assert_eq!(result.seed_makespan, 8.0);
        assert_eq!(result.makespan, 7.0);
        assert!(!result.seed_is_optimal());
        assert!(verify(&g, 3, &result.assignments).is_empty());
    }

    #[test]
    fn diamond_optimum_matches_mcp() {
        let g = diamond();
        let result = optimal_schedule(&g, 3).unwrap();
        assert_eq!(result.makespan, 85.0);
        assert_eq!(result.seed, Heuristic::Mcp);
        assert!(result.seed_is_optimal());
        assert_eq!(result.assignments.len(), 10);
        assert!(result.explored > 1);
    }

    fn independent(weights: &[f64]) -> TaskGraph {
        let ids: Vec<String> = (0..weights.len()).map(|i| format!("t{i}")).collect();
        let nodes: Vec<(&str, f64)> = ids
            .iter()
            .map(String::as_str)
            .zip(weights.iter().copied())
            .collect();
        build(&nodes, &[]).unwrap()
    }

    #[test]
    fn nine_independent_tasks_reach_the_work_bound() {
        // 96 units of work on 3 processors; every heuristic finishes at 33.
        let g = independent(&[15.0, 20.0, 12.0, 9.0, 5.0, 6.0, 1.0, 11.0, 17.0]);
        let result = optimal_schedule(&g, 3).unwrap();
        assert_eq!(result.seed_makespan, 33.0);
        assert_eq!(result.makespan, 32.0);
        assert!(verify(&g, 3, &result.assignments).is_empty());
    }

    #[test]
    fn ten_independent_tasks_complete() {
        let weights: Vec<f64> = (1..=10).map(f64::from).collect();
        let g = independent(&weights);
        let result = optimal_schedule(&g, 3).unwrap();
        assert_eq!(result.makespan, 19.0);
        assert!(result.seed_is_optimal());
    }

    #[test]
    fn tight_seed_is_accepted_at_the_root() {
        // 78 units on 3 processors: the seed already meets the work bound.
        let weights: Vec<f64> = (1..=EXHAUSTIVE_NODE_LIMIT as u32).map(f64::from).collect();
        let g = independent(&weights);
        let result = optimal_schedule(&g, 3).unwrap();
        assert_eq!(result.makespan, 26.0);
        assert_eq!(result.explored, 1);
        assert_eq!(result.assignments.len(), EXHAUSTIVE_NODE_LIMIT);
    }

    #[test]
    fn commuted_placements_share_a_signature() {
        let g = independent(&[2.0, 3.0]);
        let search = Search {
            graph: &g,
            sl: &[2.0, 3.0],
            num_processors: 2,
            best_makespan: f64::INFINITY,
            best: Vec::new(),
            path: Vec::new(),
            expanded: HashSet::new(),
            explored: 0,
        };
        let mut first = ScheduleState::new(&g, 2);
        first.commit(&g, 0, 1, 0.0).unwrap();
        first.commit(&g, 1, 2, 0.0).unwrap();
        let mut second = ScheduleState::new(&g, 2);
        second.commit(&g, 1, 1, 0.0).unwrap();
        second.commit(&g, 0, 2, 0.0).unwrap();
        assert_eq!(search.signature(&first), search.signature(&second));
        assert_eq!(search.work_bound(&ScheduleState::new(&g, 2)), 2.5);
    }

    #[test]
    fn empty_graph_has_zero_makespan() {
        let g = build(&[], &[]).unwrap();
        let result = optimal_schedule(&g, 2).unwrap();
        assert_eq!(result.makespan, 0.0);
        assert!(result.assignments.is_empty());
    }

    #[test]
    fn large_graph_is_refused() {
        let nodes: Vec<(String, f64)> = (0..=EXHAUSTIVE_NODE_LIMIT)
            .map(|i| (format!("n{i}"), 1.0))
            .collect();
        let refs: Vec<(&str, f64)> = nodes.iter().map(|(id, w)| (id.as_str(), *w)).collect();
        let g = build(&refs, &[]).unwrap();
        assert!(matches!(
            optimal_schedule(&g, 2),
            Err(SchedulerError::InvalidConfiguration(
                ConfigurationReason::GraphTooLarge { limit: EXHAUSTIVE_NODE_LIMIT, .. }
            ))
        ));
    }

    #[test]
    fn zero_processors_is_refused() {
        let g = build(&[("a", 1.0)], &[]).unwrap();
        assert!(matches!(
            optimal_schedule(&g, 0),
            Err(SchedulerError::InvalidConfiguration(ConfigurationReason::NoProcessors))
        ));
    }
}
