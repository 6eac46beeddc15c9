// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Path queries over a [`Graph`]: ancestry, directed paths, topological order
//! and m-separation.
//!
//! Directed reachability only follows `-->` edges. M-separation follows every
//! edge and decides colliders from the arrowheads at the middle node, so it
//! reduces to ordinary d-separation on a DAG.

use crate::graph::{Endpoint, Graph, NodeSet};
use std::collections::VecDeque;

impl Graph {
    /// Nodes with a directed path into some member of `nodes`, including
    /// `nodes` themselves.
    pub fn ancestors_of(&self, nodes: &NodeSet) -> NodeSet {
        let mut seen = nodes.clone();
        let mut queue: VecDeque<usize> = nodes.iter().collect();
        while let Some(node) = queue.pop_front() {
            for parent in self.parents(node).iter() {
                if seen.insert(parent) {
                    queue.push_back(parent);
                }
            }
        }
        seen
    }

    /// Nodes reachable from `node` along directed edges, including `node`.
    pub fn descendants_of(&self, node: usize) -> NodeSet {
        let mut seen = NodeSet::singleton(node);
        let mut queue = VecDeque::from([node]);
        while let Some(current) = queue.pop_front() {
            for child in self.children(current).iter() {
                if seen.insert(child) {
                    queue.push_back(child);
                }
            }
        }
        seen
    }

    /// True if `a` is an ancestor of `b` (every node is its own ancestor).
    pub fn is_ancestor_of(&self, a: usize, b: usize) -> bool {
        self.descendants_of(a).contains(b)
    }

    /// True if there is a directed path of length at least one from `from` to `to`.
    pub fn exists_directed_path(&self, from: usize, to: usize) -> bool {
        let mut seen = NodeSet::new();
        let mut queue = VecDeque::from([from]);
        while let Some(current) = queue.pop_front() {
            for child in self.children(current).iter() {
                if child == to {
                    return true;
                }
                if seen.insert(child) {
                    queue.push_back(child);
                }
            }
        }
        false
    }

    /// True if every edge is directed and there is no directed cycle.
    pub fn is_dag(&self) -> bool {
        self.edges().iter().all(|e| e.is_directed()) && self.topological_order().is_some()
    }

    /// A topological order of the directed part of the graph, or `None` if the
    /// directed edges contain a cycle. Ties are broken by node index.
    pub fn topological_order(&self) -> Option<Vec<usize>> {
        let n = self.num_nodes();
        let mut in_degree: Vec<usize> = (0..n).map(|v| self.parents(v).len()).collect();
        let mut ready: std::collections::BTreeSet<usize> =
            (0..n).filter(|&v| in_degree[v] == 0).collect();
        let mut order = Vec::with_capacity(n);
        while let Some(node) = ready.pop_first() {
            order.push(node);
            for child in self.children(node).iter() {
                in_degree[child] -= 1;
                if in_degree[child] == 0 {
                    ready.insert(child);
                }
            }
        }
        (order.len() == n).then_some(order)
    }

    /// True if `x` and `y` are m-separated given `z`.
    ///
    /// A walk is open when every collider on it (arrowheads into the node from
    /// both sides) is an ancestor of `z` and every non-collider is outside `z`.
    pub fn is_m_separated(&self, x: usize, y: usize, z: &NodeSet) -> bool {
        !self.is_m_connected(x, y, z)
    }

    /// True if some open walk joins `x` and `y` given `z`.
    pub fn is_m_connected(&self, x: usize, y: usize, z: &NodeSet) -> bool {
        if x == y {
            return true;
        }
        if z.contains(x) || z.contains(y) {
            return false;
        }
        let ancestors = self.ancestors_of(z);
        let n = self.num_nodes();
        // One state per traversed edge direction (prev, node).
        let mut visited = vec![false; n * n];
        let mut queue = VecDeque::new();
        for next in self.adjacent_nodes(x) {
            visited[x * n + next] = true;
            queue.push_back((x, next));
        }
        while let Some((prev, node)) = queue.pop_front() {
            if node == y {
                return true;
            }
            let into = self.endpoint(prev, node) == Some(Endpoint::Arrow);
            for next in self.adjacent_nodes(node) {
                if next == prev || visited[node * n + next] {
                    continue;
                }
                let collider = into && self.endpoint(next, node) == Some(Endpoint::Arrow);
                let passable = if collider {
                    ancestors.contains(node)
                } else {
                    !z.contains(node)
                };
                if passable {
                    visited[node * n + next] = true;
                    queue.push_back((node, next));
                }
            }
        }
        false
    }
}
