// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! The discriminating path rule (FCI R4).
//!
//! A path `<θ, ..., α, β, γ>` discriminates for `β` when it has at least
//! three edges, `θ` is not adjacent to `γ`, and every node strictly between
//! `θ` and `β` is a collider on the path and a parent of `γ`. If in addition
//! the mark at `β` on `β - γ` is a circle, then:
//!
//! - `β` in the sepset of `θ, γ`: orient `β --> γ`;
//! - otherwise: orient `α <-> β <-> γ`.
//!
//! Paths are found by a breadth-first search backwards from `α` through
//! colliders that are parents of `γ`. The search is bounded by the maximum
//! path length (edges from `θ` to `γ`).

use super::set_arrowhead;
use crate::context::SearchContext;
use crate::engine::{Rule, RuleResult};
use crate::error::Result;
use crate::graph::{Endpoint, Graph, NodeSet};
use crate::knowledge::KnowledgeIndex;
use crate::skeleton::SepsetProducer;
use std::collections::VecDeque;
use tracing::trace;

pub struct DiscriminatingPathRule<'a, S: SepsetProducer + ?Sized> {
    sepsets: &'a mut S,
    knowledge: &'a KnowledgeIndex,
    max_path_length: Option<usize>,
}

impl<'a, S: SepsetProducer + ?Sized> DiscriminatingPathRule<'a, S> {
    pub fn new(
        sepsets: &'a mut S,
        knowledge: &'a KnowledgeIndex,
        max_path_length: Option<usize>,
    ) -> Self {
        Self {
            sepsets,
            knowledge,
            max_path_length,
        }
    }

    /// The far end `θ` of a discriminating path ending `α, β, γ`, with the
    /// path's nodes from `θ` to `α`.
    fn find(&self, graph: &Graph, a: usize, b: usize, c: usize) -> Option<Vec<usize>> {
        let n = graph.num_nodes();
        let mut previous: Vec<Option<usize>> = vec![None; n];
        previous[a] = Some(b);
        let mut visited = NodeSet::new();
        visited.insert(a);
        visited.insert(b);
        visited.insert(c);
        // Path length in edges from the queued node to `γ`.
        let mut queue = VecDeque::from([(a, 2usize)]);

        while let Some((t, length)) = queue.pop_front() {
            let Some(p) = previous[t] else { continue };
            for d in graph.adjacent_nodes(t) {
                if visited.contains(d) || graph.endpoint(d, t) != Some(Endpoint::Arrow) {
                    continue;
                }
                if !graph.is_def_collider(d, t, p) {
                    continue;
                }
                if self.max_path_length.is_some_and(|max| length + 1 > max) {
                    continue;
                }
                previous[d] = Some(t);
                if !graph.is_adjacent(d, c) {
                    let mut path = vec![d];
                    let mut node = d;
                    while node != a {
                        match previous[node] {
                            Some(next) => {
                                path.push(next);
                                node = next;
                            }
                            None => break,
                        }
                    }
                    return Some(path);
                }
                visited.insert(d);
                if graph.is_parent_of(d, c) {
                    queue.push_back((d, length + 1));
                }
            }
        }
        None
    }

    fn orient(
        &mut self,
        graph: &mut Graph,
        path: &[usize],
        b: usize,
        c: usize,
        ctx: &mut SearchContext,
    ) -> bool {
        let theta = path[0];
        let a = path[path.len() - 1];
        let Some(sepset) = self.sepsets.sepset(theta, c) else {
            return false;
        };
        if ctx.is_verbose() {
            let names: Vec<&str> = path
                .iter()
                .chain([b, c].iter())
                .map(|&v| graph.name(v))
                .collect();
            ctx.trace(format_args!("Discriminating path: {}", names.join(" ")));
        }
        if sepset.contains(b) {
            if !self.knowledge.allows_arrowhead(b, c) {
                return false;
            }
            let mut changed = set_arrowhead(graph, self.knowledge, b, c);
            if graph.endpoint(c, b) != Some(Endpoint::Tail) {
                graph.set_endpoint(c, b, Endpoint::Tail);
                changed = true;
            }
            trace!(b, c, "discriminating path: tail");
            changed
        } else {
            let mut changed = false;
            for (from, to) in [(a, b), (c, b), (b, a), (b, c)] {
                changed |= set_arrowhead(graph, self.knowledge, from, to);
            }
            trace!(a, b, c, "discriminating path: bidirected");
            changed
        }
    }
}

impl<S: SepsetProducer + ?Sized> Rule for DiscriminatingPathRule<'_, S> {
    fn apply(&mut self, graph: &mut Graph, ctx: &mut SearchContext) -> Result<RuleResult> {
        let mut result = RuleResult::Unchanged;
        for b in 0..graph.num_nodes() {
            for c in graph.adjacent_nodes(b) {
                if graph.endpoint(c, b) != Some(Endpoint::Circle) {
                    continue;
                }
                for a in graph.adjacent_nodes(b) {
                    if a == c
                        || graph.endpoint(b, a) != Some(Endpoint::Arrow)
                        || !graph.is_parent_of(a, c)
                    {
                        continue;
                    }
                    if let Some(path) = self.find(graph, a, b, c) {
                        if self.orient(graph, &path, b, c, ctx) {
                            result = RuleResult::Changed;
                        }
                    }
                    if graph.endpoint(c, b) != Some(Endpoint::Circle) {
                        break;
                    }
                }
            }
        }
        Ok(result)
    }

    fn name(&self) -> &str {
        "R4"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::continuous_variables;
    use crate::skeleton::SepsetMap;

    /// θ *-> α <-> β o-o γ with α --> γ and θ not adjacent to γ.
    ///
    /// Nodes: T(θ)=0, A(α)=1, B(β)=2, C(γ)=3.
    fn discriminating() -> Graph {
        let mut g = Graph::new(continuous_variables(&["T", "A", "B", "C"]));
        g.add_edge(0, 1, Endpoint::Circle, Endpoint::Arrow).unwrap();
        g.add_bidirected_edge(1, 2).unwrap();
        g.add_directed_edge(1, 3).unwrap();
        g.add_nondirected_edge(2, 3).unwrap();
        g
    }

    #[test]
    fn test_noncollider_orients_tail() {
        let mut graph = discriminating();
        let mut sepsets = SepsetMap::new();
        sepsets.set(0, 3, [1, 2].into_iter().collect());
        let knowledge = KnowledgeIndex::empty(4);
        let mut ctx = SearchContext::new();
        let mut rule = DiscriminatingPathRule::new(&mut sepsets, &knowledge, None);
        assert!(rule.apply(&mut graph, &mut ctx).unwrap().changed());
        assert!(graph.has_edge_str("B --> C"));
    }

    #[test]
    fn test_collider_orients_bidirected() {
        let mut graph = discriminating();
        let mut sepsets = SepsetMap::new();
        sepsets.set(0, 3, NodeSet::singleton(1));
        let knowledge = KnowledgeIndex::empty(4);
        let mut ctx = SearchContext::new();
        DiscriminatingPathRule::new(&mut sepsets, &knowledge, None)
            .apply(&mut graph, &mut ctx)
            .unwrap();
        assert!(graph.has_edge_str("B <-> C"));
        assert!(graph.has_edge_str("A <-> B"));
    }

    #[test]
    fn test_path_length_bound() {
        let mut graph = discriminating();
        let mut sepsets = SepsetMap::new();
        sepsets.set(0, 3, [1, 2].into_iter().collect());
        let knowledge = KnowledgeIndex::empty(4);
        let mut ctx = SearchContext::new();
        let mut rule = DiscriminatingPathRule::new(&mut sepsets, &knowledge, Some(2));
        assert!(!rule.apply(&mut graph, &mut ctx).unwrap().changed());
        assert!(graph.has_edge_str("B o-o C"));
    }

    #[test]
    fn test_trace_names_the_path() {
        let mut graph = discriminating();
        let mut sepsets = SepsetMap::new();
        sepsets.set(0, 3, NodeSet::singleton(1));
        let knowledge = KnowledgeIndex::empty(4);
        let sink = crate::context::MemorySink::new();
        let mut ctx = SearchContext::with_sink(Box::new(sink.clone()));
        ctx.set_verbose(true);
        DiscriminatingPathRule::new(&mut sepsets, &knowledge, None)
            .apply(&mut graph, &mut ctx)
            .unwrap();
        assert!(sink.lines().iter().any(|l| l == "Discriminating path: T A B C"));
    }
}
