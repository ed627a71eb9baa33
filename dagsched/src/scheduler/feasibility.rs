/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Post-schedule feasibility check.
//!
//! Run after every heuristic.  A finished schedule is feasible when:
//!
//! 1. every node is assigned exactly once, to a processor in `1..=P`;
//! 2. `start >= 0` and `end == start + weight`;
//! 3. for every edge `(p, n)`, `start(n) >= end(p)` on the same processor and
//!    `start(n) >= end(p) + cost(p, n)` across processors;
//! 4. the `[start, end)` intervals on one processor are disjoint.
//!
//! Any violation means a heuristic is wrong, never that the input is.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::graph::{TaskGraph, Time};
use crate::trace::Assignment;

/// Absolute slack allowed when comparing times.
const TOLERANCE: Time = 1e-9;

/// One broken feasibility rule.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Violation {
    #[error("assignment for unknown node '{node}'")]
    UnknownNode { node: String },

    #[error("node '{node}' is assigned more than once")]
    Duplicate { node: String },

    #[error("node '{node}' is never assigned")]
    Missing { node: String },

    #[error("node '{node}' is on P{processor}, outside 1..={num_processors}")]
    InvalidProcessor {
        node: String,
        processor: u32,
        num_processors: u32,
    },

    #[error("node '{node}' starts at {start}")]
    NegativeStart { node: String, start: Time },

    #[error("node '{node}' runs {start}..{end} but its weight is {weight}")]
    WrongDuration {
        node: String,
        start: Time,
        end: Time,
        weight: Time,
    },

    #[error("node '{node}' starts at {start} before its data from '{predecessor}' arrives at {required}")]
    Precedence {
        predecessor: String,
        node: String,
        start: Time,
        required: Time,
    },

    #[error("nodes '{first}' and '{second}' overlap on P{processor}")]
    Overlap {
        processor: u32,
        first: String,
        second: String,
    },
}

/// Check `assignments` against `graph`.  An empty result means feasible.
pub fn verify(
    graph: &TaskGraph,
    num_processors: u32,
    assignments: &[Assignment],
) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut by_node: Vec<Option<&Assignment>> = vec![None; graph.len()];

    for a in assignments {
        let Some(n) = graph.index_of(&a.node) else {
            violations.push(Violation::UnknownNode {
                node: a.node.clone(),
            });
            continue;
        };
        if by_node[n].is_some() {
            violations.push(Violation::Duplicate {
                node: a.node.clone(),
            });
            continue;
        }
        by_node[n] = Some(a);

        if a.processor == 0 || a.processor > num_processors {
            violations.push(Violation::InvalidProcessor {
                node: a.node.clone(),
                processor: a.processor,
                num_processors,
            });
        }
        if a.start.is_nan() || a.start < 0.0 {
            violations.push(Violation::NegativeStart {
                node: a.node.clone(),
                start: a.start,
            });
        }
        let weight = graph.weight(n);
        if (a.end - (a.start + weight)).abs() > TOLERANCE {
            violations.push(Violation::WrongDuration {
                node: a.node.clone(),
                start: a.start,
                end: a.end,
                weight,
            });
        }
    }

    for (n, slot) in by_node.iter().enumerate() {
        if slot.is_none() {
            violations.push(Violation::Missing {
                node: graph.id(n).to_string(),
            });
        }
    }

    // ── Precedence ────────────────────────────────────────────────────────────
    for (n, slot) in by_node.iter().enumerate() {
        let Some(a) = slot else { continue };
        for link in graph.predecessors(n) {
            let Some(q) = by_node[link.node] else {
                continue;
            };
            let required = if q.processor == a.processor {
                q.end
            } else {
                q.end + link.cost
            };
            if a.start + TOLERANCE < required {
                violations.push(Violation::Precedence {
                    predecessor: q.node.clone(),
                    node: a.node.clone(),
                    start: a.start,
                    required,
                });
            }
        }
    }

    // ── Overlap ───────────────────────────────────────────────────────────────
    let mut timelines: BTreeMap<u32, Vec<&Assignment>> = BTreeMap::new();
    for a in by_node.iter().flatten() {
        timelines.entry(a.processor).or_default().push(a);
    }
    for (processor, mut tasks) in timelines {
        tasks.sort_by(|x, y| x.start.total_cmp(&y.start).then(x.end.total_cmp(&y.end)));
        for pair in tasks.windows(2) {
            if pair[1].start + TOLERANCE < pair[0].end {
                violations.push(Violation::Overlap {
                    processor,
                    first: pair[0].node.clone(),
                    second: pair[1].node.clone(),
                });
            }
        }
    }

    violations
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::fixtures::build;

    fn a(node: &str, processor: u32, start: Time, end: Time) -> Assignment {
        Assignment {
            node: node.into(),
            processor,
            start,
            end,
        }
    }

    fn pair() -> TaskGraph {
        build(&[("x", 2.0), ("y", 3.0)], &[("x", "y", 4.0)]).unwrap()
    }

    #[test]
    fn feasible_schedule_has_no_violations() {
        let g = pair();
        assert!(verify(&g, 2, &[a("x", 1, 0.0, 2.0), a("y", 1, 2.0, 5.0)]).is_empty());
        assert!(verify(&g, 2, &[a("x", 1, 0.0, 2.0), a("y", 2, 6.0, 9.0)]).is_empty());
    }

    #[test]
    fn communication_delay_is_enforced_across_processors() {
        let g = pair();
        let v = verify(&g, 2, &[a("x", 1, 0.0, 2.0), a("y", 2, 5.0, 8.0)]);
        assert_eq!(
            v,
            vec![Violation::Precedence {
                predecessor: "x".into(),
                node: "y".into(),
                start: 5.0,
                required: 6.0,
            }]
        );
    }

    #[test]
    fn overlap_on_one_processor_is_reported() {
        let g = build(&[("p", 3.0), ("q", 3.0)], &[]).unwrap();
        let v = verify(&g, 1, &[a("p", 1, 0.0, 3.0), a("q", 1, 2.0, 5.0)]);
        assert!(matches!(v.as_slice(), [Violation::Overlap { processor: 1, .. }]));
    }

    #[test]
    fn missing_duplicate_and_unknown_nodes_are_reported() {
        let g = pair();
        let v = verify(
            &g,
            2,
            &[a("x", 1, 0.0, 2.0), a("x", 2, 0.0, 2.0), a("ghost", 1, 9.0, 9.0)],
        );
        assert!(v.contains(&Violation::Duplicate { node: "x".into() }));
        assert!(v.contains(&Violation::UnknownNode {
            node: "ghost".into()
        }));
        assert!(v.contains(&Violation::Missing { node: "y".into() }));
    }

    #[test]
    fn bad_processor_start_and_duration_are_reported() {
        let g = build(&[("solo", 2.0)], &[]).unwrap();
        let v = verify(&g, 1, &[a("solo", 3, -1.0, 4.0)]);
        assert_eq!(v.len(), 3, "{v:?}");
        assert!(v[0].to_string().contains("P3"));
    }
}
