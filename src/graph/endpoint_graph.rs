// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! The endpoint graph.
//!
//! Nodes are indices into the graph's variable list. Edges are stored as an
//! n×n matrix of optional endpoint marks: `marks[a][b]` is the mark at `b` on
//! the edge between `a` and `b`. An edge exists iff both marks are present,
//! so "at most one edge per unordered pair" and "no self-loops" hold by
//! construction.

use crate::error::GraphError;
use crate::graph::{Edge, Endpoint, NodeSet, Triple, Variable};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A graph whose edges carry a pair of endpoint marks.
#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    variables: Vec<Variable>,
    marks: Vec<Option<Endpoint>>,
    ambiguous: BTreeSet<Triple>,
    underlines: BTreeSet<Triple>,
    pag: bool,
    attributes: BTreeMap<String, f64>,
}

impl Graph {
    /// Create a graph with the given nodes and no edges.
    pub fn new(variables: Vec<Variable>) -> Self {
        let n = variables.len();
        Self {
            variables,
            marks: vec![None; n * n],
            ambiguous: BTreeSet::new(),
            underlines: BTreeSet::new(),
            pag: false,
            attributes: BTreeMap::new(),
        }
    }

    /// Create a complete undirected graph over the given nodes.
    pub fn complete(variables: Vec<Variable>, mark: Endpoint) -> Self {
        let mut graph = Self::new(variables);
        let n = graph.num_nodes();
        for a in 0..n {
            for b in a + 1..n {
                graph.put(a, b, mark, mark);
            }
        }
        graph
    }

    pub fn num_nodes(&self) -> usize {
        self.variables.len()
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn variable(&self, node: usize) -> &Variable {
        &self.variables[node]
    }

    pub fn name(&self, node: usize) -> &str {
        self.variables[node].name()
    }

    /// Look up a node by variable name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.variables.iter().position(|v| v.name() == name)
    }

    #[inline]
    fn slot(&self, a: usize, b: usize) -> usize {
        a * self.variables.len() + b
    }

    fn check(&self, node: usize) -> Result<(), GraphError> {
        if node < self.num_nodes() {
            Ok(())
        } else {
            Err(GraphError::UnknownNode {
                index: node,
                len: self.num_nodes(),
            })
        }
    }

    fn put(&mut self, a: usize, b: usize, at_a: Endpoint, at_b: Endpoint) {
        let ab = self.slot(a, b);
        let ba = self.slot(b, a);
        self.marks[ab] = Some(at_b);
        self.marks[ba] = Some(at_a);
    }

    /// Add an edge with the given marks at `a` and `b`.
    pub fn add_edge(
        &mut self,
        a: usize,
        b: usize,
        at_a: Endpoint,
        at_b: Endpoint,
    ) -> Result<(), GraphError> {
        self.check(a)?;
        self.check(b)?;
        if a == b {
            return Err(GraphError::SelfLoop(a));
        }
        if self.is_adjacent(a, b) {
            return Err(GraphError::AlreadyAdjacent(a, b));
        }
        self.put(a, b, at_a, at_b);
        Ok(())
    }

    /// Add an edge from an edge record.
    pub fn add(&mut self, edge: Edge) -> Result<(), GraphError> {
        self.add_edge(edge.node1, edge.node2, edge.endpoint1, edge.endpoint2)
    }

    /// Add `from --> to`.
    pub fn add_directed_edge(&mut self, from: usize, to: usize) -> Result<(), GraphError> {
        self.add_edge(from, to, Endpoint::Tail, Endpoint::Arrow)
    }

    /// Add `a --- b`.
    pub fn add_undirected_edge(&mut self, a: usize, b: usize) -> Result<(), GraphError> {
        self.add_edge(a, b, Endpoint::Tail, Endpoint::Tail)
    }

    /// Add `a o-o b`.
    pub fn add_nondirected_edge(&mut self, a: usize, b: usize) -> Result<(), GraphError> {
        self.add_edge(a, b, Endpoint::Circle, Endpoint::Circle)
    }

    /// Add `a <-> b`.
    pub fn add_bidirected_edge(&mut self, a: usize, b: usize) -> Result<(), GraphError> {
        self.add_edge(a, b, Endpoint::Arrow, Endpoint::Arrow)
    }

    /// Replace whatever edge joins `a` and `b` with `from --> to`.
    pub fn set_directed(&mut self, from: usize, to: usize) {
        if from != to {
            self.put(from, to, Endpoint::Tail, Endpoint::Arrow);
        }
    }

    /// Remove the edge between `a` and `b`. Returns true if there was one.
    pub fn remove_edge(&mut self, a: usize, b: usize) -> bool {
        if !self.is_adjacent(a, b) {
            return false;
        }
        let ab = self.slot(a, b);
        let ba = self.slot(b, a);
        self.marks[ab] = None;
        self.marks[ba] = None;
        true
    }

    /// Remove every edge, keeping the nodes.
    pub fn remove_all_edges(&mut self) {
        self.marks.iter_mut().for_each(|m| *m = None);
    }

    pub fn is_adjacent(&self, a: usize, b: usize) -> bool {
        a < self.num_nodes() && b < self.num_nodes() && self.marks[self.slot(a, b)].is_some()
    }

    /// The mark at `b` on the edge `a - b`.
    pub fn endpoint(&self, a: usize, b: usize) -> Option<Endpoint> {
        if a < self.num_nodes() && b < self.num_nodes() {
            self.marks[self.slot(a, b)]
        } else {
            None
        }
    }

    /// Set the mark at `b` on the existing edge `a - b`. Returns false if
    /// `a` and `b` are not adjacent.
    pub fn set_endpoint(&mut self, a: usize, b: usize, mark: Endpoint) -> bool {
        if !self.is_adjacent(a, b) {
            return false;
        }
        let ab = self.slot(a, b);
        self.marks[ab] = Some(mark);
        true
    }

    /// The edge between `a` and `b`, with `a` as `node1`.
    pub fn edge(&self, a: usize, b: usize) -> Option<Edge> {
        let at_b = self.endpoint(a, b)?;
        let at_a = self.endpoint(b, a)?;
        Some(Edge::new(a, b, at_a, at_b))
    }

    /// All edges, each reported once with `node1 < node2`.
    pub fn edges(&self) -> Vec<Edge> {
        let n = self.num_nodes();
        let mut edges = Vec::new();
        for a in 0..n {
            for b in a + 1..n {
                if let Some(edge) = self.edge(a, b) {
                    edges.push(edge);
                }
            }
        }
        edges
    }

    pub fn num_edges(&self) -> usize {
        self.marks.iter().filter(|m| m.is_some()).count() / 2
    }

    /// Nodes adjacent to `node`, ascending.
    pub fn adjacent_nodes(&self, node: usize) -> Vec<usize> {
        (0..self.num_nodes())
            .filter(|&other| self.is_adjacent(node, other))
            .collect()
    }

    pub fn degree(&self, node: usize) -> usize {
        (0..self.num_nodes())
            .filter(|&other| self.is_adjacent(node, other))
            .count()
    }

    /// True if the edge is exactly `from --> to`.
    pub fn is_parent_of(&self, from: usize, to: usize) -> bool {
        self.endpoint(to, from) == Some(Endpoint::Tail)
            && self.endpoint(from, to) == Some(Endpoint::Arrow)
    }

    /// True if the edge is `a --- b`.
    pub fn is_undirected(&self, a: usize, b: usize) -> bool {
        self.endpoint(a, b) == Some(Endpoint::Tail) && self.endpoint(b, a) == Some(Endpoint::Tail)
    }

    pub fn parents(&self, node: usize) -> NodeSet {
        (0..self.num_nodes())
            .filter(|&other| self.is_parent_of(other, node))
            .collect()
    }

    pub fn children(&self, node: usize) -> NodeSet {
        (0..self.num_nodes())
            .filter(|&other| self.is_parent_of(node, other))
            .collect()
    }

    /// True if both `a *-> b` and `c *-> b`.
    pub fn is_def_collider(&self, a: usize, b: usize, c: usize) -> bool {
        self.endpoint(a, b) == Some(Endpoint::Arrow) && self.endpoint(c, b) == Some(Endpoint::Arrow)
    }

    /// True if `b` is definitely not a collider on `a - b - c`: a tail at `b` on
    /// either edge, or an underlined triple.
    pub fn is_def_noncollider(&self, a: usize, b: usize, c: usize) -> bool {
        self.endpoint(a, b) == Some(Endpoint::Tail)
            || self.endpoint(c, b) == Some(Endpoint::Tail)
            || self.underlines.contains(&Triple::new(a, b, c))
    }

    /// Set every endpoint on every edge to `mark`.
    pub fn reorient_all_with(&mut self, mark: Endpoint) {
        for m in self.marks.iter_mut().filter(|m| m.is_some()) {
            *m = Some(mark);
        }
    }

    /// A copy with every edge made undirected (`---`).
    pub fn undirected_copy(&self) -> Graph {
        let mut graph = self.clone();
        graph.reorient_all_with(Endpoint::Tail);
        graph
    }

    pub fn is_pag(&self) -> bool {
        self.pag
    }

    pub fn set_pag(&mut self, pag: bool) {
        self.pag = pag;
    }

    pub fn attribute(&self, key: &str) -> Option<f64> {
        self.attributes.get(key).copied()
    }

    pub fn set_attribute(&mut self, key: impl Into<String>, value: f64) {
        self.attributes.insert(key.into(), value);
    }

    pub fn remove_attribute(&mut self, key: &str) -> Option<f64> {
        self.attributes.remove(key)
    }

    pub fn attributes(&self) -> &BTreeMap<String, f64> {
        &self.attributes
    }

    pub fn add_ambiguous_triple(&mut self, x: usize, y: usize, z: usize) {
        self.ambiguous.insert(Triple::new(x, y, z));
    }

    pub fn remove_ambiguous_triple(&mut self, x: usize, y: usize, z: usize) {
        self.ambiguous.remove(&Triple::new(x, y, z));
    }

    pub fn is_ambiguous_triple(&self, x: usize, y: usize, z: usize) -> bool {
        self.ambiguous.contains(&Triple::new(x, y, z))
    }

    pub fn ambiguous_triples(&self) -> impl Iterator<Item = &Triple> {
        self.ambiguous.iter()
    }

    pub fn add_underline_triple(&mut self, x: usize, y: usize, z: usize) {
        self.underlines.insert(Triple::new(x, y, z));
    }

    pub fn remove_underline_triple(&mut self, x: usize, y: usize, z: usize) {
        self.underlines.remove(&Triple::new(x, y, z));
    }

    pub fn is_underline_triple(&self, x: usize, y: usize, z: usize) -> bool {
        self.underlines.contains(&Triple::new(x, y, z))
    }

    pub fn underline_triples(&self) -> impl Iterator<Item = &Triple> {
        self.underlines.iter()
    }

    /// Render one edge with node names.
    pub fn edge_string(&self, edge: &Edge) -> String {
        edge.display_with(self.name(edge.node1), self.name(edge.node2))
    }

    /// Find an edge by its display form, e.g. `"A o-> B"`.
    pub fn has_edge_str(&self, text: &str) -> bool {
        self.edges().iter().any(|e| {
            self.edge_string(e) == text || self.edge_string(&e.reversed()) == text
        })
    }

    /// True if the two graphs have the same adjacencies over the same node names.
    pub fn same_skeleton(&self, other: &Graph) -> bool {
        if self.num_nodes() != other.num_nodes() {
            return false;
        }
        let n = self.num_nodes();
        let map: Option<Vec<usize>> = (0..n).map(|i| other.index_of(self.name(i))).collect();
        let Some(map) = map else {
            return false;
        };
        (0..n).all(|a| (a + 1..n).all(|b| self.is_adjacent(a, b) == other.is_adjacent(map[a], map[b])))
    }
}

impl fmt::Display for Graph {
    /// One edge per line, `1. A --> B`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.variables.iter().map(Variable::name).collect();
        writeln!(f, "Graph Nodes:")?;
        writeln!(f, "{}", names.join(";"))?;
        writeln!(f)?;
        writeln!(f, "Graph Edges:")?;
        for (i, edge) in self.edges().iter().enumerate() {
            writeln!(f, "{}. {}", i + 1, self.edge_string(edge))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::continuous_variables;

    fn abc() -> Graph {
        Graph::new(continuous_variables(&["A", "B", "C"]))
    }

    #[test]
    fn test_add_and_query() {
        let mut g = abc();
        g.add_directed_edge(0, 1).unwrap();
        assert!(g.is_adjacent(0, 1));
        assert!(g.is_adjacent(1, 0));
        assert!(g.is_parent_of(0, 1));
        assert!(!g.is_parent_of(1, 0));
        assert_eq!(g.endpoint(0, 1), Some(Endpoint::Arrow));
        assert_eq!(g.endpoint(1, 0), Some(Endpoint::Tail));
        assert_eq!(g.num_edges(), 1);
        assert_eq!(g.parents(1).to_vec(), vec![0]);
        assert_eq!(g.children(0).to_vec(), vec![1]);
    }

    #[test]
    fn test_structural_errors() {
        let mut g = abc();
        assert_eq!(g.add_directed_edge(1, 1), Err(GraphError::SelfLoop(1)));
        g.add_directed_edge(0, 1).unwrap();
        assert_eq!(
            g.add_undirected_edge(1, 0),
            Err(GraphError::AlreadyAdjacent(1, 0))
        );
        assert!(matches!(
            g.add_directed_edge(0, 9),
            Err(GraphError::UnknownNode { index: 9, len: 3 })
        ));
    }

    #[test]
    fn test_set_endpoint_requires_edge() {
        let mut g = abc();
        assert!(!g.set_endpoint(0, 2, Endpoint::Arrow));
        g.add_nondirected_edge(0, 2).unwrap();
        assert!(g.set_endpoint(0, 2, Endpoint::Arrow));
        assert!(g.has_edge_str("A o-> C"));
        assert!(g.has_edge_str("C <-o A"));
    }

    #[test]
    fn test_def_collider() {
        let mut g = abc();
        g.add_directed_edge(0, 1).unwrap();
        g.add_edge(2, 1, Endpoint::Circle, Endpoint::Arrow).unwrap();
        assert!(g.is_def_collider(0, 1, 2));
        assert!(!g.is_def_noncollider(0, 1, 2));
    }

    #[test]
    fn test_reorient_and_display() {
        let mut g = abc();
        g.add_directed_edge(0, 1).unwrap();
        g.add_directed_edge(1, 2).unwrap();
        g.reorient_all_with(Endpoint::Circle);
        let text = g.to_string();
        assert!(text.contains("1. A o-o B"));
        assert!(text.contains("2. B o-o C"));
    }

    #[test]
    fn test_same_skeleton_ignores_marks() {
        let mut g = abc();
        g.add_directed_edge(0, 1).unwrap();
        let mut h = abc();
        h.add_bidirected_edge(1, 0).unwrap();
        assert!(g.same_skeleton(&h));
        h.add_undirected_edge(1, 2).unwrap();
        assert!(!g.same_skeleton(&h));
    }

    #[test]
    fn test_attributes() {
        let mut g = abc();
        g.set_attribute("BIC", -12.5);
        assert_eq!(g.attribute("BIC"), Some(-12.5));
        assert_eq!(g.remove_attribute("BIC"), Some(-12.5));
        assert_eq!(g.attribute("BIC"), None);
    }
}
