// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Edge endpoints and edge records.
//!
//! Every edge carries one endpoint mark per side. The three marks are enough to
//! express DAGs (`-->`), CPDAGs (`---`), and PAGs (`o->`, `o-o`, `<->`)
//! uniformly.

use serde::{Deserialize, Serialize};

/// The mark at one end of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Endpoint {
    Tail,
    Arrow,
    Circle,
}

impl Endpoint {
    /// Symbol when the endpoint sits at the left-hand node.
    fn left_symbol(self) -> char {
        match self {
            Endpoint::Tail => '-',
            Endpoint::Arrow => '<',
            Endpoint::Circle => 'o',
        }
    }

    /// Symbol when the endpoint sits at the right-hand node.
    fn right_symbol(self) -> char {
        match self {
            Endpoint::Tail => '-',
            Endpoint::Arrow => '>',
            Endpoint::Circle => 'o',
        }
    }
}

/// An edge record `(node1, node2, endpoint1, endpoint2)`.
///
/// `endpoint1` is the mark at `node1`, `endpoint2` the mark at `node2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub node1: usize,
    pub node2: usize,
    pub endpoint1: Endpoint,
    pub endpoint2: Endpoint,
}

impl Edge {
    pub fn new(node1: usize, node2: usize, endpoint1: Endpoint, endpoint2: Endpoint) -> Self {
        Self {
            node1,
            node2,
            endpoint1,
            endpoint2,
        }
    }

    /// `from --> to`
    pub fn directed(from: usize, to: usize) -> Self {
        Self::new(from, to, Endpoint::Tail, Endpoint::Arrow)
    }

    /// `a --- b`
    pub fn undirected(a: usize, b: usize) -> Self {
        Self::new(a, b, Endpoint::Tail, Endpoint::Tail)
    }

    /// `a o-o b`
    pub fn nondirected(a: usize, b: usize) -> Self {
        Self::new(a, b, Endpoint::Circle, Endpoint::Circle)
    }

    /// `a <-> b`
    pub fn bidirected(a: usize, b: usize) -> Self {
        Self::new(a, b, Endpoint::Arrow, Endpoint::Arrow)
    }

    /// `from o-> to`
    pub fn partially_oriented(from: usize, to: usize) -> Self {
        Self::new(from, to, Endpoint::Circle, Endpoint::Arrow)
    }

    /// The mark at `node`, if `node` is an end of this edge.
    pub fn endpoint_at(&self, node: usize) -> Option<Endpoint> {
        if node == self.node1 {
            Some(self.endpoint1)
        } else if node == self.node2 {
            Some(self.endpoint2)
        } else {
            None
        }
    }

    /// The other end of the edge.
    pub fn distal(&self, node: usize) -> Option<usize> {
        if node == self.node1 {
            Some(self.node2)
        } else if node == self.node2 {
            Some(self.node1)
        } else {
            None
        }
    }

    /// True for `-->` in either direction.
    pub fn is_directed(&self) -> bool {
        matches!(
            (self.endpoint1, self.endpoint2),
            (Endpoint::Tail, Endpoint::Arrow) | (Endpoint::Arrow, Endpoint::Tail)
        )
    }

    /// True if this is a directed edge into `node`.
    pub fn points_towards(&self, node: usize) -> bool {
        self.is_directed() && self.endpoint_at(node) == Some(Endpoint::Arrow)
    }

    /// Render the edge with the given node names, e.g. `A o-> B`.
    pub fn display_with(&self, name1: &str, name2: &str) -> String {
        format!(
            "{name1} {}-{} {name2}",
            self.endpoint1.left_symbol(),
            self.endpoint2.right_symbol()
        )
    }

    /// The same edge with its ends swapped.
    pub fn reversed(&self) -> Self {
        Self::new(self.node2, self.node1, self.endpoint2, self.endpoint1)
    }
}
