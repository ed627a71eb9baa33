/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Step-by-step derivation of attribute values.
//!
//! For each node, in the order the attribute is evaluated, a [`Derivation`]
//! lists the neighbour terms that were compared and marks the one that
//! decided the value.  Used for teaching-style output next to the scheduling
//! trace.

use serde::Serialize;

use super::{Attribute, PriorityAttributes};
use crate::graph::{TaskGraph, Time};

/// One neighbour's contribution to a node's value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivationTerm {
    pub neighbor: String,
    pub contribution: Time,
    /// `true` for the (first) term that produced the max/min.
    pub decisive: bool,
}

/// How one node's value was obtained.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Derivation {
    pub node: String,
    pub attribute: Attribute,
    pub value: Time,
    pub terms: Vec<DerivationTerm>,
    pub description: String,
}

/// Derivation steps for `attribute`, in evaluation order (forward topological
/// for T-Level/EST, reverse for SL, LST and B-Level).
pub fn explain(graph: &TaskGraph, attribute: Attribute) -> Vec<Derivation> {
    let attrs = PriorityAttributes::compute(graph);
    let values = attrs.get(attribute);

    let forward = matches!(attribute, Attribute::TLevel | Attribute::Est);
    let order: Vec<usize> = if forward {
        graph.topological_order().to_vec()
    } else {
        graph.topological_order().iter().rev().copied().collect()
    };

    order
        .into_iter()
        .map(|n| derive(graph, &attrs, attribute, values, n))
        .collect()
}

fn derive(
    graph: &TaskGraph,
    attrs: &PriorityAttributes,
    attribute: Attribute,
    values: &[Time],
    n: usize,
) -> Derivation {
    let id = graph.id(n);
    let weight = graph.weight(n);
    let name = attribute.name();

    let (contributions, pick_min): (Vec<(usize, Time)>, bool) = match attribute {
        Attribute::StaticLevel => (
            graph
                .successors(n)
                .iter()
                .map(|l| (l.node, values[l.node]))
                .collect(),
            false,
        ),
        Attribute::TLevel | Attribute::Est => (
            graph
                .predecessors(n)
                .iter()
                .map(|l| (l.node, values[l.node] + graph.weight(l.node) + l.cost))
                .collect(),
            false,
        ),
        Attribute::Lst => (
            graph
                .successors(n)
                .iter()
                .map(|l| (l.node, values[l.node] - l.cost))
                .collect(),
            true,
        ),
        Attribute::BLevel => (
            graph
                .successors(n)
                .iter()
                .map(|l| (l.node, values[l.node] + l.cost))
                .collect(),
            false,
        ),
    };

    let decisive = contributions
        .iter()
        .enumerate()
        .reduce(|best, cur| {
            let better = if pick_min {
                cur.1 .1 < best.1 .1
            } else {
                cur.1 .1 > best.1 .1
            };
            if better {
                cur
            } else {
                best
            }
        })
        .map(|(i, &(_, v))| (i, v));

    let neighbours: Vec<&str> = contributions.iter().map(|&(m, _)| graph.id(m)).collect();
    let value = values[n];

    let description = match (attribute, decisive) {
        (Attribute::StaticLevel, None) => {
            format!("Node {id} has no successors; {name} is its weight {weight}.")
        }
        (Attribute::StaticLevel, Some((_, best))) => format!(
            "Node {id} has successors {neighbours:?}; {name} = weight {weight} + max successor {name} {best} = {value}."
        ),
        (Attribute::TLevel | Attribute::Est, None) => {
            format!("Node {id} has no predecessors; {name} is 0.")
        }
        (Attribute::TLevel | Attribute::Est, Some(_)) => format!(
            "Node {id} has predecessors {neighbours:?}; {name} = max({name}(p) + weight(p) + cost(p, {id})) = {value}."
        ),
        (Attribute::Lst, None) => format!(
            "Node {id} is an exit node; {name} is its EST {}.",
            attrs.value(Attribute::Est, n)
        ),
        (Attribute::Lst, Some((_, best))) => format!(
            "Node {id} has successors {neighbours:?}; {name} = min({name}(s) - cost({id}, s)) {best} - weight {weight} = {value}."
        ),
        (Attribute::BLevel, None) => {
            format!("Node {id} has no successors; {name} is its weight {weight}.")
        }
        (Attribute::BLevel, Some((_, best))) => format!(
            "Node {id} has successors {neighbours:?}; {name} = weight {weight} + max({name}(s) + cost({id}, s)) {best} = {value}."
        ),
    };

    let terms = contributions
        .iter()
        .enumerate()
        .map(|(i, &(m, contribution))| DerivationTerm {
            neighbor: graph.id(m).to_string(),
            contribution,
            decisive: decisive.map(|(d, _)| d) == Some(i),
        })
        .collect();

    Derivation {
        node: id.to_string(),
        attribute,
        value,
        terms,
        description,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::fixtures::diamond;

    #[test]
    fn one_derivation_per_node() {
        let g = diamond();
        for a in Attribute::ALL {
            assert_eq!(explain(&g, a).len(), g.len(), "{a}");
        }
    }

    #[test]
    fn static_level_is_explained_from_the_sink_up() {
        let g = diamond();
        let steps = explain(&g, Attribute::StaticLevel);
        assert_eq!(steps[0].node, "10");
        assert!(steps[0].terms.is_empty());
        assert!(steps[0].description.contains("no successors"));
        assert_eq!(steps.last().unwrap().node, "1");
        assert_eq!(steps.last().unwrap().value, 80.0);
    }

    #[test]
    fn t_level_marks_the_binding_predecessor() {
        let g = diamond();
        let steps = explain(&g, Attribute::TLevel);
        let sink = steps.iter().find(|d| d.node == "10").unwrap();
        assert_eq!(sink.value, 84.0);
        let decisive: Vec<&DerivationTerm> = sink.terms.iter().filter(|t| t.decisive).collect();
        assert_eq!(decisive.len(), 1);
        assert_eq!(decisive[0].neighbor, "9");
        assert_eq!(decisive[0].contribution, 84.0);
    }

    #[test]
    fn lst_uses_the_tightest_successor() {
        let g = diamond();
        let steps = explain(&g, Attribute::Lst);
        let two = steps.iter().find(|d| d.node == "2").unwrap();
        assert_eq!(two.value, 28.0);
        let decisive = two.terms.iter().find(|t| t.decisive).unwrap();
        assert_eq!(decisive.neighbor, "9");
        assert_eq!(decisive.contribution, 48.0);
    }

    #[test]
    fn exit_node_lst_mentions_est() {
        let g = diamond();
        let steps = explain(&g, Attribute::Lst);
        assert_eq!(steps[0].node, "10");
        assert!(steps[0].description.contains("EST 84"), "{}", steps[0].description);
    }
}
