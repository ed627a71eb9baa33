/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Mutable per-run scheduling state.
//!
//! A [`ScheduleState`] is created at the start of a heuristic run and owned
//! by it alone.  Nodes are only ever appended to the end of a processor's
//! timeline, so the per-processor availability is monotonically
//! non-decreasing and tasks on one processor can never overlap.

use serde::Serialize;

use super::SchedulerError;
use crate::graph::{TaskGraph, Time};

/// 1-based processor index.
pub type ProcessorId = u32;

/// Where and when a node runs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement {
    pub processor: ProcessorId,
    pub start: Time,
    pub end: Time,
}

#[derive(Debug, Clone)]
pub struct ScheduleState {
    /// Next free time per processor, index `p - 1`.
    available: Vec<Time>,
    /// Task count per processor, index `p - 1`.
    tasks_on: Vec<usize>,
    placements: Vec<Option<Placement>>,
    /// Unscheduled predecessors left per node.
    pending: Vec<usize>,
    scheduled: usize,
}

impl ScheduleState {
    pub fn new(graph: &TaskGraph, num_processors: u32) -> Self {
        let p = num_processors as usize;
        Self {
            available: vec![0.0; p],
            tasks_on: vec![0; p],
            placements: vec![None; graph.len()],
            pending: (0..graph.len())
                .map(|n| graph.predecessors(n).len())
                .collect(),
            scheduled: 0,
        }
    }

    pub fn num_processors(&self) -> u32 {
        self.available.len() as u32
    }

    /// `1..=P`.
    pub fn processors(&self) -> impl Iterator<Item = ProcessorId> {
        1..=self.num_processors()
    }

    /// Next free time on `processor`.
    ///
    /// # Panics
    /// If `processor` is outside `1..=P`.
    pub fn available(&self, processor: ProcessorId) -> Time {
        self.available[processor as usize - 1]
    }

    /// `true` while nothing has been placed on `processor`.
    pub fn is_empty_processor(&self, processor: ProcessorId) -> bool {
        self.tasks_on[processor as usize - 1] == 0
    }

    pub fn placement(&self, node: usize) -> Option<Placement> {
        self.placements[node]
    }

    pub fn is_scheduled(&self, node: usize) -> bool {
        self.placements[node].is_some()
    }

    /// Unscheduled with every predecessor scheduled.
    pub fn is_ready(&self, node: usize) -> bool {
        !self.is_scheduled(node) && self.pending[node] == 0
    }

    /// Ready nodes in input order.
    pub fn ready_nodes(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.placements.len()).filter(|&n| self.is_ready(n))
    }

    pub fn scheduled_count(&self) -> usize {
        self.scheduled
    }

    pub fn is_complete(&self) -> bool {
        self.scheduled == self.placements.len()
    }

    /// Latest end time of any placed node.
    pub fn makespan(&self) -> Time {
        self.available.iter().copied().fold(0.0, f64::max)
    }

    /// Place `node` on `processor` at `start`.
    ///
    /// Returns the placement and the nodes that became ready because of it
    /// (in input order).
    ///
    /// # Errors
    /// [`SchedulerError::InvariantViolation`] if the node is already placed or
    /// not ready, the processor is out of range, or `start` lies before the
    /// processor's availability.
    pub fn commit(
        &mut self,
        graph: &TaskGraph,
        node: usize,
        processor: ProcessorId,
        start: Time,
    ) -> Result<(Placement, Vec<usize>), SchedulerError> {
        let id = graph.id(node);
        if self.is_scheduled(node) {
            return Err(SchedulerError::InvariantViolation(format!(
                "node '{}' committed twice",
                id
            )));
        }
        if self.pending[node] != 0 {
            return Err(SchedulerError::InvariantViolation(format!(
                "node '{}' committed with {} unscheduled predecessor(s)",
                id, self.pending[node]
            )));
        }
        if processor == 0 || processor > self.num_processors() {
            return Err(SchedulerError::InvariantViolation(format!(
                "node '{}' committed to P{} but only {} processor(s) exist",
                id,
                processor,
                self.num_processors()
            )));
        }
        let slot = processor as usize - 1;
        if start.is_nan() || start < self.available[slot] {
            return Err(SchedulerError::InvariantViolation(format!(
                "node '{}' starts at {} on P{} which is busy until {}",
                id, start, processor, self.available[slot]
            )));
        }

        let placement = Placement {
            processor,
            start,
            end: start + graph.weight(node),
        };
        self.placements[node] = Some(placement);
        self.available[slot] = placement.end;
        self.tasks_on[slot] += 1;
        self.scheduled += 1;

        let mut released = Vec::new();
        for link in graph.successors(node) {
            self.pending[link.node] -= 1;
            if self.pending[link.node] == 0 {
                released.push(link.node);
            }
        }
        Ok((placement, released))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::fixtures::build;

    fn chain() -> TaskGraph {
        build(
            &[("a", 2.0), ("b", 3.0), ("c", 1.0)],
            &[("a", "b", 1.0), ("a", "c", 1.0)],
        )
        .unwrap()
    }

    #[test]
    fn fresh_state_has_sources_ready() {
        let g = chain();
        let s = ScheduleState::new(&g, 2);
        assert_eq!(s.processors().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(s.ready_nodes().collect::<Vec<_>>(), vec![0]);
        assert_eq!(s.makespan(), 0.0);
        assert!(s.is_empty_processor(1));
    }

    #[test]
    fn commit_advances_processor_and_releases_successors() {
        let g = chain();
        let mut s = ScheduleState::new(&g, 2);
        let (placement, released) = s.commit(&g, 0, 2, 0.0).unwrap();
        assert_eq!(
            placement,
            Placement {
                processor: 2,
                start: 0.0,
                end: 2.0
            }
        );
        assert_eq!(released, vec![1, 2]);
        assert_eq!(s.available(2), 2.0);
        assert_eq!(s.available(1), 0.0);
        assert!(!s.is_empty_processor(2));
        assert_eq!(s.scheduled_count(), 1);
        assert!(!s.is_complete());
    }

    #[test]
    fn double_commit_is_an_invariant_violation() {
        let g = chain();
        let mut s = ScheduleState::new(&g, 1);
        s.commit(&g, 0, 1, 0.0).unwrap();
        assert!(matches!(
            s.commit(&g, 0, 1, 5.0),
            Err(SchedulerError::InvariantViolation(_))
        ));
    }

    #[test]
    fn commit_before_predecessors_is_rejected() {
        let g = chain();
        let mut s = ScheduleState::new(&g, 1);
        assert!(matches!(
            s.commit(&g, 1, 1, 0.0),
            Err(SchedulerError::InvariantViolation(_))
        ));
    }

    #[test]
    fn commit_into_busy_slot_or_bad_processor_is_rejected() {
        let g = chain();
        let mut s = ScheduleState::new(&g, 1);
        s.commit(&g, 0, 1, 0.0).unwrap();
        assert!(s.commit(&g, 1, 1, 1.0).is_err());
        assert!(s.commit(&g, 1, 0, 5.0).is_err());
        assert!(s.commit(&g, 1, 2, 5.0).is_err());
        assert!(s.commit(&g, 1, 1, 2.0).is_ok());
    }
}
