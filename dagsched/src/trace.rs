/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Step-by-step record of one heuristic run.
//!
//! A [`Trace`] is what every heuristic returns.  It holds the priority list
//! computed up front and one [`Step`] per committed node, each with the full
//! set of [`Candidate`]s that were compared.  Traces are built through a
//! [`TraceRecorder`] and are immutable once [`TraceRecorder::finish`] returns.
//!
//! Every type here derives `Serialize` so a trace can be handed unchanged to a
//! visualisation front end as JSON.

use std::fmt;

use serde::Serialize;

use crate::attributes::Attribute;
use crate::graph::Time;
use crate::scheduler::{Heuristic, ProcessorId};

// ── Step contents ─────────────────────────────────────────────────────────────

/// Final placement of one node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assignment {
    pub node: String,
    pub processor: ProcessorId,
    pub start: Time,
    pub end: Time,
}

/// How one predecessor constrained a candidate's start time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredecessorDetail {
    pub predecessor: String,
    /// Processor the predecessor ran on.
    pub processor: ProcessorId,
    pub same_processor: bool,
    pub pred_start: Time,
    pub pred_end: Time,
    /// Communication cost actually paid (0 on the same processor).
    pub comm_cost: Time,
    /// `pred_end + comm_cost`: when the predecessor's data is available.
    pub arrival: Time,
    /// Running start bound after taking this predecessor into account.
    pub bound: Time,
}

/// One evaluated (node, processor) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub node: String,
    pub processor: ProcessorId,
    pub start: Time,
    pub end: Time,
    pub weight: Time,
    /// When the processor became free.
    pub available_time: Time,
    /// Predecessor whose data arrived last and pushed the start past
    /// `available_time`; `None` when the processor itself was the bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limiting_predecessor: Option<String>,
    /// `SL(node) - start`; only filled in by DLS.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dynamic_level: Option<Time>,
    pub predecessors: Vec<PredecessorDetail>,
}

/// One scheduling decision.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Step {
    /// 1-based position in the trace.
    pub index: usize,
    pub description: String,
    /// Priority value of the chosen node under the heuristic's attribute.
    pub priority: Time,
    /// Ready nodes at decision time.  HLFET and MCP list them in ranking
    /// order; ETF and DLS weigh every pair, so they list them in input order.
    pub ready: Vec<String>,
    pub assignment: Assignment,
    pub candidates: Vec<Candidate>,
}

/// A node and its priority value, as listed before the first step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodePriority {
    pub node: String,
    pub value: Time,
}

// ── Trace ─────────────────────────────────────────────────────────────────────

/// Complete, ordered record of one heuristic run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    heuristic: Heuristic,
    num_processors: u32,
    priority_attribute: Attribute,
    priorities: Vec<NodePriority>,
    steps: Vec<Step>,
}

impl Trace {
    pub fn heuristic(&self) -> Heuristic {
        self.heuristic
    }

    pub fn num_processors(&self) -> u32 {
        self.num_processors
    }

    /// Attribute the priority list is expressed in (SL or LST).
    pub fn priority_attribute(&self) -> Attribute {
        self.priority_attribute
    }

    /// Priority list in the heuristic's ranking order.
    pub fn priorities(&self) -> &[NodePriority] {
        &self.priorities
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Latest end time over all assignments; 0 for an empty graph.
    pub fn makespan(&self) -> Time {
        self.steps
            .iter()
            .map(|s| s.assignment.end)
            .fold(0.0, f64::max)
    }

    /// Assignments in commit order.
    pub fn assignments(&self) -> Vec<Assignment> {
        self.steps.iter().map(|s| s.assignment.clone()).collect()
    }

    pub fn assignment_of(&self, node: &str) -> Option<&Assignment> {
        self.steps
            .iter()
            .map(|s| &s.assignment)
            .find(|a| a.node == node)
    }
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} on {} processor(s)",
            self.heuristic, self.num_processors
        )?;
        let ranked: Vec<String> = self
            .priorities
            .iter()
            .map(|p| format!("{}={}", p.node, p.value))
            .collect();
        writeln!(f, "{} order: {}", self.priority_attribute, ranked.join(", "))?;
        for step in &self.steps {
            let a = &step.assignment;
            writeln!(
                f,
                "{:>3}. node {} -> P{} [{}, {}]  {}",
                step.index, a.node, a.processor, a.start, a.end, step.description
            )?;
        }
        write!(f, "makespan: {}", self.makespan())
    }
}

// ── Recorder ──────────────────────────────────────────────────────────────────

/// Append-only builder for a [`Trace`].
///
/// The recorder makes no decisions; heuristics hand it finished steps.
#[derive(Debug)]
pub struct TraceRecorder {
    trace: Trace,
}

impl TraceRecorder {
    pub fn new(
        heuristic: Heuristic,
        num_processors: u32,
        priority_attribute: Attribute,
        priorities: Vec<NodePriority>,
    ) -> Self {
        Self {
            trace: Trace {
                heuristic,
                num_processors,
                priority_attribute,
                priorities,
                steps: Vec::new(),
            },
        }
    }

    /// Append a step; its index is assigned here.
    pub fn record(
        &mut self,
        description: String,
        priority: Time,
        ready: Vec<String>,
        assignment: Assignment,
        candidates: Vec<Candidate>,
    ) {
        let index = self.trace.steps.len() + 1;
        self.trace.steps.push(Step {
            index,
            description,
            priority,
            ready,
            assignment,
            candidates,
        });
    }

    pub fn len(&self) -> usize {
        self.trace.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trace.steps.is_empty()
    }

    pub fn finish(self) -> Trace {
        self.trace
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assignment(node: &str, processor: ProcessorId, start: Time, end: Time) -> Assignment {
        Assignment {
            node: node.into(),
            processor,
            start,
            end,
        }
    }

    fn recorder() -> TraceRecorder {
        TraceRecorder::new(
            Heuristic::Hlfet,
            2,
            Attribute::StaticLevel,
            vec![
                NodePriority {
                    node: "a".into(),
                    value: 7.0,
                },
                NodePriority {
                    node: "b".into(),
                    value: 4.0,
                },
            ],
        )
    }

    #[test]
    fn steps_are_numbered_from_one() {
        let mut rec = recorder();
        rec.record("first".into(), 7.0, vec!["a".into()], assignment("a", 1, 0.0, 3.0), vec![]);
        rec.record("second".into(), 4.0, vec!["b".into()], assignment("b", 2, 0.0, 4.0), vec![]);
        assert_eq!(rec.len(), 2);
        let trace = rec.finish();
        let indices: Vec<usize> = trace.steps().iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![1, 2]);
    }

    #[test]
    fn makespan_is_latest_end() {
        let mut rec = recorder();
        rec.record(String::new(), 7.0, vec![], assignment("a", 1, 0.0, 3.0), vec![]);
        rec.record(String::new(), 4.0, vec![], assignment("b", 2, 0.0, 4.0), vec![]);
        let trace = rec.finish();
        assert_eq!(trace.makespan(), 4.0);
        assert_eq!(trace.assignment_of("a").map(|a| a.processor), Some(1));
        assert!(trace.assignment_of("zz").is_none());
    }

    #[test]
    fn empty_trace_has_zero_makespan() {
        let rec = recorder();
        assert!(rec.is_empty());
        assert_eq!(rec.finish().makespan(), 0.0);
    }

    #[test]
    fn trace_serializes_heuristic_and_attribute_names() {
        let mut rec = recorder();
        rec.record("x".into(), 7.0, vec!["a".into()], assignment("a", 1, 0.0, 3.0), vec![]);
        let json = serde_json::to_value(rec.finish()).unwrap();
        assert_eq!(json["heuristic"], "HLFET");
        assert_eq!(json["priority_attribute"], "SL");
        assert_eq!(json["steps"][0]["assignment"]["processor"], 1);
    }

    #[test]
    fn display_ends_with_makespan() {
        let mut rec = recorder();
        rec.record("x".into(), 7.0, vec![], assignment("a", 1, 0.0, 3.0), vec![]);
        let text = rec.finish().to_string();
        assert!(text.starts_with("HLFET on 2 processor(s)"));
        assert!(text.contains("SL order: a=7, b=4"));
        assert!(text.ends_with("makespan: 3"));
    }
}
