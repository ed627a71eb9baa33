/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Per-node priority attributes used by the list-scheduling heuristics.
//!
//! | Attribute | Pass | Definition |
//! |---|---|---|
//! | SL (static level) | reverse | `w(n) + max SL(s)`; sinks `w(n)` |
//! | T-Level | forward | `max(T(p) + w(p) + c(p,n))`; sources `0` |
//! | EST | forward | `T-Level(n)` |
//! | LST | reverse, after T-Level | `min(LST(s) - c(n,s)) - w(n)`; sinks `T-Level(n)` |
//! | B-Level | reverse | `w(n) + max(B(s) + c(n,s))`; sinks `w(n)` |
//!
//! Every attribute is a pure function of the [`TaskGraph`] and is computed in
//! a single pass over its topological order.  Values are stored in `Vec`s
//! indexed by node position.

pub mod explain;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::graph::{TaskGraph, Time};
use crate::scheduler::{ConfigurationReason, SchedulerError};

// ── Attribute enumeration ─────────────────────────────────────────────────────

/// The five priority attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Attribute {
    #[serde(rename = "SL")]
    StaticLevel,
    #[serde(rename = "T-Level")]
    TLevel,
    #[serde(rename = "EST")]
    Est,
    #[serde(rename = "LST")]
    Lst,
    #[serde(rename = "B-Level")]
    BLevel,
}

type Calculator = fn(&TaskGraph) -> Vec<Time>;

struct AttributeEntry {
    attribute: Attribute,
    name: &'static str,
    aliases: &'static [&'static str],
    compute: Calculator,
}

/// Name and calculator for every attribute.  Parsing and dispatch both go
/// through this table.
static ATTRIBUTES: [AttributeEntry; 5] = [
    AttributeEntry {
        attribute: Attribute::StaticLevel,
        name: "SL",
        aliases: &["static-level", "static_level", "staticlevel"],
        compute: static_level,
    },
    AttributeEntry {
        attribute: Attribute::TLevel,
        name: "T-Level",
        aliases: &["tlevel", "t_level"],
        compute: t_level,
    },
    AttributeEntry {
        attribute: Attribute::Est,
        name: "EST",
        aliases: &["earliest-start", "earliest_start"],
        compute: earliest_start,
    },
    AttributeEntry {
        attribute: Attribute::Lst,
        name: "LST",
        aliases: &["latest-start", "latest_start"],
        compute: latest_start,
    },
    AttributeEntry {
        attribute: Attribute::BLevel,
        name: "B-Level",
        aliases: &["blevel", "b_level"],
        compute: b_level,
    },
];

impl Attribute {
    /// All attributes in display order.
    pub const ALL: [Attribute; 5] = [
        Attribute::StaticLevel,
        Attribute::TLevel,
        Attribute::Est,
        Attribute::Lst,
        Attribute::BLevel,
    ];

    fn entry(self) -> &'static AttributeEntry {
        // ATTRIBUTES is declared in the same order as the enum.
        &ATTRIBUTES[self as usize]
    }

    /// Canonical short name (`"SL"`, `"T-Level"`, ...).
    pub fn name(self) -> &'static str {
        self.entry().name
    }

    /// Compute this attribute alone for every node of `graph`.
    pub fn compute(self, graph: &TaskGraph) -> Vec<Time> {
        (self.entry().compute)(graph)
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Attribute {
    type Err = SchedulerError;

    /// Case-insensitive; accepts the canonical names and a few aliases.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ATTRIBUTES
            .iter()
            .find(|e| {
                e.name.eq_ignore_ascii_case(wanted)
                    || e.aliases.iter().any(|a| a.eq_ignore_ascii_case(wanted))
            })
            .map(|e| e.attribute)
            .ok_or_else(|| ConfigurationReason::UnknownAttribute(s.to_string()).into())
    }
}

// ── Single-attribute calculators ──────────────────────────────────────────────

/// Longest weight-only path from each node to a sink, inclusive.
pub fn static_level(graph: &TaskGraph) -> Vec<Time> {
    let mut sl = vec![0.0; graph.len()];
    for &n in graph.topological_order().iter().rev() {
        let below = graph
            .successors(n)
            .iter()
            .map(|l| sl[l.node])
            .fold(0.0, f64::max);
        sl[n] = graph.weight(n) + below;
    }
    sl
}

/// Earliest start ignoring processor contention, communication included.
pub fn t_level(graph: &TaskGraph) -> Vec<Time> {
    let mut tl = vec![0.0; graph.len()];
    for &n in graph.topological_order() {
        tl[n] = graph
            .predecessors(n)
            .iter()
            .map(|l| tl[l.node] + graph.weight(l.node) + l.cost)
            .fold(0.0, f64::max);
    }
    tl
}

/// EST is the t-level under another name.
pub fn earliest_start(graph: &TaskGraph) -> Vec<Time> {
    t_level(graph)
}

/// Latest start time; needs the t-level of the sinks.
pub fn latest_start(graph: &TaskGraph) -> Vec<Time> {
    latest_start_from(graph, &t_level(graph))
}

fn latest_start_from(graph: &TaskGraph, tl: &[Time]) -> Vec<Time> {
    let mut lst = vec![0.0; graph.len()];
    for &n in graph.topological_order().iter().rev() {
        lst[n] = if graph.is_sink(n) {
            tl[n]
        } else {
            let tightest = graph
                .successors(n)
                .iter()
                .map(|l| lst[l.node] - l.cost)
                .fold(f64::INFINITY, f64::min);
            tightest - graph.weight(n)
        };
    }
    lst
}

/// Longest path to a sink including communication cost.
pub fn b_level(graph: &TaskGraph) -> Vec<Time> {
    let mut bl = vec![0.0; graph.len()];
    for &n in graph.topological_order().iter().rev() {
        let below = graph
            .successors(n)
            .iter()
            .map(|l| bl[l.node] + l.cost)
            .fold(0.0, f64::max);
        bl[n] = graph.weight(n) + below;
    }
    bl
}

// ── PriorityAttributes ────────────────────────────────────────────────────────

/// All five attributes for one graph, computed together.
///
/// Read-only once built; heuristics only borrow it.
#[derive(Debug, Clone, PartialEq)]
pub struct PriorityAttributes {
    static_level: Vec<Time>,
    t_level: Vec<Time>,
    est: Vec<Time>,
    lst: Vec<Time>,
    b_level: Vec<Time>,
}

impl PriorityAttributes {
    pub fn compute(graph: &TaskGraph) -> Self {
        let t_level = t_level(graph);
        let lst = latest_start_from(graph, &t_level);
        Self {
            static_level: static_level(graph),
            est: t_level.clone(),
            t_level,
            lst,
            b_level: b_level(graph),
        }
    }

    /// Values of `attribute`, indexed by node position.
    pub fn get(&self, attribute: Attribute) -> &[Time] {
        match attribute {
            Attribute::StaticLevel => &self.static_level,
            Attribute::TLevel => &self.t_level,
            Attribute::Est => &self.est,
            Attribute::Lst => &self.lst,
            Attribute::BLevel => &self.b_level,
        }
    }

    pub fn value(&self, attribute: Attribute, node: usize) -> Time {
        self.get(attribute)[node]
    }

    /// `attribute` as a node id → value map.
    pub fn to_map(&self, graph: &TaskGraph, attribute: Attribute) -> BTreeMap<String, Time> {
        self.get(attribute)
            .iter()
            .enumerate()
            .map(|(n, &v)| (graph.id(n).to_string(), v))
            .collect()
    }

    /// Every attribute keyed by name, each as a node id → value map.
    pub fn to_maps(&self, graph: &TaskGraph) -> BTreeMap<Attribute, BTreeMap<String, Time>> {
        Attribute::ALL
            .iter()
            .map(|&a| (a, self.to_map(graph, a)))
            .collect()
    }

    /// One row per node, in input order.
    pub fn report(&self, graph: &TaskGraph) -> AttributeReport {
        let rows = (0..graph.len())
            .map(|n| AttributeRow {
                node: graph.id(n).to_string(),
                static_level: self.static_level[n],
                t_level: self.t_level[n],
                est: self.est[n],
                lst: self.lst[n],
                b_level: self.b_level[n],
            })
            .collect();
        AttributeReport { rows }
    }
}

// ── Tabular report ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeRow {
    pub node: String,
    #[serde(rename = "SL")]
    pub static_level: Time,
    #[serde(rename = "T-Level")]
    pub t_level: Time,
    #[serde(rename = "EST")]
    pub est: Time,
    #[serde(rename = "LST")]
    pub lst: Time,
    #[serde(rename = "B-Level")]
    pub b_level: Time,
}

/// Attribute table, one row per node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeReport {
    pub rows: Vec<AttributeRow>,
}

impl fmt::Display for AttributeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .rows
            .iter()
            .map(|r| r.node.len())
            .max()
            .unwrap_or(0)
            .max(4);
        write!(f, "{:<width$}", "node")?;
        for a in Attribute::ALL {
            write!(f, " {:>8}", a.name())?;
        }
        writeln!(f)?;
        for r in &self.rows {
            writeln!(
                f,
                "{:<width$} {:>8} {:>8} {:>8} {:>8} {:>8}",
                r.node, r.static_level, r.t_level, r.est, r.lst, r.b_level
            )?;
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
