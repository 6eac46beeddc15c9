// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Meek's orientation rules for patterns.
//!
//! Given a graph whose colliders are oriented, the rules direct every
//! undirected edge whose orientation is implied:
//!
//! - **R1** `a --> b --- c`, `a` and `c` not adjacent: `b --> c`.
//! - **R2** `a --> b --> c` and `a --- c`: `a --> c`.
//! - **R3** `a --- c --> b`, `a --- d --> b`, `c` and `d` not adjacent,
//!   `a --- b`: `a --> b`.
//! - **R4** `a --- b`, `d --> c --> b`, `a --- d`, `a` adjacent to `c`,
//!   `b` and `d` not adjacent: `a --> b`.
//!
//! No edge is directed against the knowledge, and with cycle prevention on
//! (the default) no edge `x --> y` is added when `y` already reaches `x`.

use crate::context::SearchContext;
use crate::engine::{Rule, RuleResult};
use crate::error::Result;
use crate::graph::Graph;
use crate::knowledge::KnowledgeIndex;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct MeekRules<'k> {
    knowledge: &'k KnowledgeIndex,
    prevent_cycles: bool,
}

impl<'k> MeekRules<'k> {
    pub fn new(knowledge: &'k KnowledgeIndex) -> Self {
        Self {
            knowledge,
            prevent_cycles: true,
        }
    }

    pub fn with_cycle_prevention(mut self, prevent_cycles: bool) -> Self {
        self.prevent_cycles = prevent_cycles;
        self
    }

    /// Apply R1-R4 until nothing changes. Returns the number of edges
    /// directed.
    pub fn orient_implied(&self, graph: &mut Graph) -> usize {
        let mut total = 0;
        loop {
            let directed = self.round(graph);
            if directed == 0 {
                break;
            }
            total += directed;
        }
        debug!(directed = total, "implied orientations done");
        total
    }

    /// One pass of each rule.
    fn round(&self, graph: &mut Graph) -> usize {
        self.rule1(graph) + self.rule2(graph) + self.rule3(graph) + self.rule4(graph)
    }

    fn direct(&self, graph: &mut Graph, from: usize, to: usize) -> bool {
        if !graph.is_undirected(from, to) || !self.knowledge.allows_directed(from, to) {
            return false;
        }
        if self.prevent_cycles && graph.exists_directed_path(to, from) {
            return false;
        }
        graph.set_directed(from, to);
        true
    }

    fn undirected_neighbours(graph: &Graph, node: usize) -> Vec<usize> {
        graph
            .adjacent_nodes(node)
            .into_iter()
            .filter(|&other| graph.is_undirected(node, other))
            .collect()
    }

    fn rule1(&self, graph: &mut Graph) -> usize {
        let mut directed = 0;
        for b in 0..graph.num_nodes() {
            for a in graph.parents(b).to_vec() {
                for c in Self::undirected_neighbours(graph, b) {
                    if c == a || graph.is_adjacent(a, c) || graph.is_ambiguous_triple(a, b, c) {
                        continue;
                    }
                    if self.direct(graph, b, c) {
                        directed += 1;
                    }
                }
            }
        }
        directed
    }

    fn rule2(&self, graph: &mut Graph) -> usize {
        let mut directed = 0;
        for a in 0..graph.num_nodes() {
            for c in Self::undirected_neighbours(graph, a) {
                let through = graph
                    .children(a)
                    .iter()
                    .any(|b| graph.is_parent_of(b, c));
                if through && self.direct(graph, a, c) {
                    directed += 1;
                }
            }
        }
        directed
    }

    fn rule3(&self, graph: &mut Graph) -> usize {
        let mut directed = 0;
        for a in 0..graph.num_nodes() {
            for b in Self::undirected_neighbours(graph, a) {
                let sides: Vec<usize> = Self::undirected_neighbours(graph, a)
                    .into_iter()
                    .filter(|&c| c != b && graph.is_parent_of(c, b))
                    .collect();
                let found = sides.iter().enumerate().any(|(i, &c)| {
                    sides[i + 1..].iter().any(|&d| !graph.is_adjacent(c, d))
                });
                if found && self.direct(graph, a, b) {
                    directed += 1;
                }
            }
        }
        directed
    }

    fn rule4(&self, graph: &mut Graph) -> usize {
        let mut directed = 0;
        for a in 0..graph.num_nodes() {
            for b in Self::undirected_neighbours(graph, a) {
                let found = graph.parents(b).iter().any(|c| {
                    c != a
                        && graph.is_adjacent(a, c)
                        && graph.parents(c).iter().any(|d| {
                            d != b
                                && d != a
                                && graph.is_undirected(a, d)
                                && !graph.is_adjacent(b, d)
                        })
                });
                if found && self.direct(graph, a, b) {
                    directed += 1;
                }
            }
        }
        directed
    }
}

impl Rule for MeekRules<'_> {
    fn apply(&mut self, graph: &mut Graph, _ctx: &mut SearchContext) -> Result<RuleResult> {
        Ok(RuleResult::from(self.round(graph) > 0))
    }

    fn name(&self) -> &str {
        "Meek"
    }
}
