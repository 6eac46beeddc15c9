// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Background knowledge orientation.
//!
//! Knowledge is applied before any other rule. Only existing edges are
//! touched; knowledge about non-adjacent pairs is ignored here.

use crate::graph::{Endpoint, Graph};
use crate::knowledge::KnowledgeIndex;
use tracing::trace;

/// CPDAG form: forbidden `from -> to` becomes `to --> from`, then required
/// `from -> to` becomes `from --> to`. Returns the number of edges oriented.
pub fn pc_orient_bk(knowledge: &KnowledgeIndex, graph: &mut Graph) -> usize {
    let mut oriented = 0;
    for (from, to) in knowledge.forbidden_pairs() {
        if graph.is_adjacent(from, to) {
            graph.set_directed(to, from);
            trace!(from = to, to = from, "knowledge orientation");
            oriented += 1;
        }
    }
    for (from, to) in knowledge.required_pairs() {
        if graph.is_adjacent(from, to) {
            graph.set_directed(from, to);
            trace!(from, to, "knowledge orientation");
            oriented += 1;
        }
    }
    oriented
}

/// PAG form: forbidden `from -> to` becomes `from <-o to`, then required
/// `from -> to` becomes `from --> to`. Returns the number of edges oriented.
pub fn fci_orient_bk(knowledge: &KnowledgeIndex, graph: &mut Graph) -> usize {
    let mut oriented = 0;
    for (from, to) in knowledge.forbidden_pairs() {
        if graph.is_adjacent(from, to) {
            graph.set_endpoint(to, from, Endpoint::Arrow);
            graph.set_endpoint(from, to, Endpoint::Circle);
            oriented += 1;
        }
    }
    for (from, to) in knowledge.required_pairs() {
        if graph.is_adjacent(from, to) {
            graph.set_endpoint(to, from, Endpoint::Tail);
            graph.set_endpoint(from, to, Endpoint::Arrow);
            oriented += 1;
        }
    }
    oriented
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::continuous_variables;
    use crate::knowledge::Knowledge;

    fn setup() -> (Graph, KnowledgeIndex) {
        let vars = continuous_variables(&["A", "B", "C"]);
        let mut graph = Graph::new(vars.clone());
        graph.add_nondirected_edge(0, 1).unwrap();
        graph.add_nondirected_edge(1, 2).unwrap();
        let mut knowledge = Knowledge::new();
        knowledge.add_forbidden("A", "B").unwrap();
        knowledge.add_required("B", "C").unwrap();
        knowledge.add_required("A", "C").unwrap();
        (graph, knowledge.bind(&vars).unwrap())
    }

    #[test]
    fn test_pc_form() {
        let (mut graph, index) = setup();
        assert_eq!(pc_orient_bk(&index, &mut graph), 2);
        assert!(graph.has_edge_str("B --> A"));
        assert!(graph.has_edge_str("B --> C"));
        assert!(!graph.is_adjacent(0, 2));
    }

    #[test]
    fn test_fci_form() {
        let (mut graph, index) = setup();
        assert_eq!(fci_orient_bk(&index, &mut graph), 2);
        assert!(graph.has_edge_str("A <-o B"));
        assert!(graph.has_edge_str("B --> C"));
    }
}
