//! Cycle detection over the blocks graph.
//!
//! Cycles are found with Tarjan's strongly connected components algorithm
//! from `petgraph`. Every component with more than one member is a cycle;
//! a single-member component is a cycle only when it blocks itself.

use crate::graph::DependencyGraph;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// A closed sequence of display keys, e.g. `[A, B, C, A]`.
///
/// The last key always repeats the first. A self-loop is `[A, A]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Cycle(Vec<String>);

impl Cycle {
    fn closed(mut members: Vec<String>) -> Self {
        if let Some(first) = members.first().cloned() {
            members.push(first);
        }
        Self(members)
    }

    /// The full closed sequence, including the repeated first key.
    pub fn keys(&self) -> &[String] {
        &self.0
    }

    /// Distinct members of the cycle, without the closing repeat.
    pub fn members(&self) -> &[String] {
        &self.0[..self.0.len().saturating_sub(1)]
    }

    /// Join the closed sequence with `separator`.
    pub fn join(&self, separator: &str) -> String {
        self.0.join(separator)
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.join(" → "))
    }
}

/// Find every cycle in the graph.
///
/// The result is deterministic for identical input: members are listed in
/// depth-first order from the smallest key of their component, following
/// successors in key order, and cycles are sorted by their first key.
pub fn detect_cycles(graph: &DependencyGraph) -> Vec<Cycle> {
    let mut digraph: DiGraph<&str, ()> = DiGraph::new();
    let mut node_map: HashMap<&str, NodeIndex> = HashMap::new();

    for key in graph.keys() {
        node_map.insert(key, digraph.add_node(key));
    }

    for edge in graph.edges() {
        if let (Some(&from), Some(&to)) = (
            node_map.get(edge.from.as_str()),
            node_map.get(edge.to.as_str()),
        ) {
            digraph.add_edge(from, to, ());
        }
    }

    let mut cycles: Vec<Cycle> = tarjan_scc(&digraph)
        .into_iter()
        .filter_map(|component| match component.as_slice() {
            [] => None,
            [single] => digraph
                .contains_edge(*single, *single)
                .then(|| Cycle::closed(vec![digraph[*single].to_string()])),
            _ => {
                let members: BTreeSet<&str> = component.iter().map(|&idx| digraph[idx]).collect();
                Some(Cycle::closed(walk_component(graph, &members)))
            }
        })
        .collect();

    cycles.sort_by(|a, b| a.keys().cmp(b.keys()));
    cycles
}

/// Order the members of one strongly connected component.
///
/// Starts at the smallest key and walks depth-first along edges that stay
/// inside the component. Every member is reachable from every other, so the
/// walk visits all of them.
fn walk_component(graph: &DependencyGraph, members: &BTreeSet<&str>) -> Vec<String> {
    let Some(&start) = members.first() else {
        return Vec::new();
    };

    let mut order = Vec::with_capacity(members.len());
    let mut visited: BTreeSet<&str> = BTreeSet::new();
    let mut stack = vec![start];

    while let Some(key) = stack.pop() {
        if !visited.insert(key) {
            continue;
        }
        order.push(key.to_string());

        // Reverse so the smallest successor is popped first.
        for next in graph.successors(key).into_iter().rev() {
            if members.contains(next) && !visited.contains(next) {
                stack.push(next);
            }
        }
    }

    order
}
