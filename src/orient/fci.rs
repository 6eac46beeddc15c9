// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! FCI orientation of partial ancestral graphs.
//!
//! Notation: `*` is any mark. `a *-> b` means the mark at `b` on `a - b` is
//! an arrowhead; `a o-* b` means the mark at `a` is a circle.
//!
//! - **R0** unshielded `a *-* b *-* c` with `b` outside the sepset of
//!   `a, c`: `a *-> b <-* c`.
//! - **R1** `a *-> b o-* c`, `a, c` not adjacent: `b --> c`.
//! - **R2** `a --> b *-> c` or `a *-> b --> c`, with `a *-o c`: `a *-> c`.
//! - **R3** `a *-> b <-* c`, `a *-o d o-* c`, `a, c` not adjacent,
//!   `d *-o b`: `d *-> b`.
//! - **R4** discriminating paths, see [`DiscriminatingPathRule`].
//!
//! With the complete rule set, Zhang's tail rules follow:
//!
//! - **R5** `a o-o b` on an uncovered circle path `a, c, ..., d, b` with
//!   `a, d` and `b, c` not adjacent: the edge and the path become `---`.
//! - **R6** `a --- b o-* c`: `b --* c`.
//! - **R7** `a --o b o-* c`, `a, c` not adjacent: `b --* c`.
//! - **R8** `a --> b --> c` or `a --o b --> c`, with `a o-> c`: `a --> c`.
//! - **R9** `a o-> c` and an uncovered potentially directed path
//!   `a, b, ..., c` with `b, c` not adjacent: `a --> c`.
//! - **R10** `a o-> c`, `b --> c <-- d`, uncovered potentially directed
//!   paths from `a` to `b` and to `d` whose second nodes differ and are not
//!   adjacent: `a --> c`.
//!
//! No arrowhead is placed where the knowledge requires the reverse
//! direction.

use super::discriminating::DiscriminatingPathRule;
use super::knowledge::fci_orient_bk;
use super::set_arrowhead;
use crate::context::SearchContext;
use crate::engine::{Rule, RuleEngine, RuleResult};
use crate::error::Result;
use crate::graph::{Endpoint, Graph, NodeSet};
use crate::knowledge::KnowledgeIndex;
use crate::skeleton::SepsetProducer;
use strum_macros::{Display, EnumIter};
use tracing::debug;

use Endpoint::{Arrow, Circle, Tail};

/// The tail and arrowhead rules other than R4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum FciRule {
    R1,
    R2,
    R3,
    R5,
    R6,
    R7,
    R8,
    R9,
    R10,
}

struct KnowledgeRule<'k> {
    rule: FciRule,
    label: String,
    knowledge: &'k KnowledgeIndex,
}

impl<'k> KnowledgeRule<'k> {
    fn boxed(rule: FciRule, knowledge: &'k KnowledgeIndex) -> Box<dyn Rule + 'k> {
        Box::new(Self {
            rule,
            label: rule.to_string(),
            knowledge,
        })
    }
}

impl Rule for KnowledgeRule<'_> {
    fn apply(&mut self, graph: &mut Graph, _ctx: &mut SearchContext) -> Result<RuleResult> {
        let k = self.knowledge;
        let changed = match self.rule {
            FciRule::R1 => rule_r1(graph, k),
            FciRule::R2 => rule_r2(graph, k),
            FciRule::R3 => rule_r3(graph, k),
            FciRule::R5 => rule_r5(graph),
            FciRule::R6 => rule_r6(graph),
            FciRule::R7 => rule_r7(graph),
            FciRule::R8 => rule_r8(graph),
            FciRule::R9 => rule_r9(graph),
            FciRule::R10 => rule_r10(graph),
        };
        Ok(changed.into())
    }

    fn name(&self) -> &str {
        &self.label
    }
}

fn mark(graph: &Graph, from: usize, at: usize) -> Option<Endpoint> {
    graph.endpoint(from, at)
}

/// Set the mark at `at` on `other - at` to a tail.
fn set_tail(graph: &mut Graph, other: usize, at: usize) -> bool {
    if mark(graph, other, at) == Some(Tail) {
        return false;
    }
    graph.set_endpoint(other, at, Tail)
}

/// `from --> to` exactly.
fn is_directed(graph: &Graph, from: usize, to: usize) -> bool {
    graph.is_parent_of(from, to)
}

/// `a o-o b`.
fn is_nondirected(graph: &Graph, a: usize, b: usize) -> bool {
    mark(graph, a, b) == Some(Circle) && mark(graph, b, a) == Some(Circle)
}

/// `a o-> c`.
fn is_partially_oriented(graph: &Graph, a: usize, c: usize) -> bool {
    mark(graph, c, a) == Some(Circle) && mark(graph, a, c) == Some(Arrow)
}

/// An edge that can be read as pointing from `from` to `to`: no arrowhead
/// at `from` and no tail at `to`.
fn potentially_directed(graph: &Graph, from: usize, to: usize) -> bool {
    graph.is_adjacent(from, to)
        && mark(graph, to, from) != Some(Arrow)
        && mark(graph, from, to) != Some(Tail)
}

fn rule_r1(graph: &mut Graph, knowledge: &KnowledgeIndex) -> bool {
    let mut changed = false;
    for b in 0..graph.num_nodes() {
        for a in graph.adjacent_nodes(b) {
            if mark(graph, a, b) != Some(Arrow) {
                continue;
            }
            for c in graph.adjacent_nodes(b) {
                if c == a || graph.is_adjacent(a, c) || mark(graph, c, b) != Some(Circle) {
                    continue;
                }
                if !knowledge.allows_arrowhead(b, c) {
                    continue;
                }
                graph.set_endpoint(c, b, Tail);
                graph.set_endpoint(b, c, Arrow);
                debug!(b, c, "R1");
                changed = true;
            }
        }
    }
    changed
}

fn rule_r2(graph: &mut Graph, knowledge: &KnowledgeIndex) -> bool {
    let mut changed = false;
    for a in 0..graph.num_nodes() {
        for c in graph.adjacent_nodes(a) {
            if mark(graph, a, c) != Some(Circle) {
                continue;
            }
            let through = graph.adjacent_nodes(a).into_iter().any(|b| {
                b != c
                    && graph.is_adjacent(b, c)
                    && ((is_directed(graph, a, b) && mark(graph, b, c) == Some(Arrow))
                        || (mark(graph, a, b) == Some(Arrow) && is_directed(graph, b, c)))
            });
            if through && set_arrowhead(graph, knowledge, a, c) {
                debug!(a, c, "R2");
                changed = true;
            }
        }
    }
    changed
}

fn rule_r3(graph: &mut Graph, knowledge: &KnowledgeIndex) -> bool {
    let mut changed = false;
    for b in 0..graph.num_nodes() {
        let into: Vec<usize> = graph
            .adjacent_nodes(b)
            .into_iter()
            .filter(|&x| mark(graph, x, b) == Some(Arrow))
            .collect();
        for (i, &a) in into.iter().enumerate() {
            for &c in &into[i + 1..] {
                if graph.is_adjacent(a, c) {
                    continue;
                }
                for d in graph.adjacent_nodes(b) {
                    if d == a || d == c || mark(graph, d, b) != Some(Circle) {
                        continue;
                    }
                    if mark(graph, a, d) == Some(Circle)
                        && mark(graph, c, d) == Some(Circle)
                        && set_arrowhead(graph, knowledge, d, b)
                    {
                        debug!(d, b, "R3");
                        changed = true;
                    }
                }
            }
        }
    }
    changed
}

/// Depth-first extension of an uncovered path from `prev, current` to
/// `target`, following edges accepted by `step`.
fn extend_uncovered(
    graph: &Graph,
    prev: usize,
    current: usize,
    target: usize,
    visited: &mut NodeSet,
    step: &dyn Fn(&Graph, usize, usize) -> bool,
    path: &mut Vec<usize>,
) -> bool {
    for next in graph.adjacent_nodes(current) {
        if visited.contains(next) || graph.is_adjacent(prev, next) || !step(graph, current, next) {
            continue;
        }
        path.push(next);
        if next == target {
            return true;
        }
        visited.insert(next);
        if extend_uncovered(graph, current, next, target, visited, step, path) {
            return true;
        }
        visited.remove(next);
        path.pop();
    }
    false
}

/// An uncovered path `start, first, ..., target` whose every edge satisfies
/// `step`, or `None`.
fn uncovered_path(
    graph: &Graph,
    start: usize,
    first: usize,
    target: usize,
    step: &dyn Fn(&Graph, usize, usize) -> bool,
) -> Option<Vec<usize>> {
    if !step(graph, start, first) {
        return None;
    }
    let mut path = vec![start, first];
    if first == target {
        return Some(path);
    }
    let mut visited: NodeSet = [start, first].into_iter().collect();
    extend_uncovered(graph, start, first, target, &mut visited, step, &mut path).then_some(path)
}

fn rule_r5(graph: &mut Graph) -> bool {
    let mut changed = false;
    for a in 0..graph.num_nodes() {
        for b in graph.adjacent_nodes(a) {
            if b < a || !is_nondirected(graph, a, b) {
                continue;
            }
            let circle_step = |g: &Graph, x: usize, y: usize| is_nondirected(g, x, y);
            let mut found = None;
            for c in graph.adjacent_nodes(a) {
                if c == b || graph.is_adjacent(b, c) {
                    continue;
                }
                let mut without_ab = graph.clone();
                without_ab.remove_edge(a, b);
                if let Some(path) = uncovered_path(&without_ab, a, c, b, &circle_step) {
                    let d = path[path.len() - 2];
                    if d != c && !graph.is_adjacent(a, d) {
                        found = Some(path);
                        break;
                    }
                }
            }
            if let Some(path) = found {
                set_tail(graph, b, a);
                set_tail(graph, a, b);
                for pair in path.windows(2) {
                    set_tail(graph, pair[0], pair[1]);
                    set_tail(graph, pair[1], pair[0]);
                }
                debug!(a, b, "R5");
                changed = true;
            }
        }
    }
    changed
}

fn rule_r6(graph: &mut Graph) -> bool {
    let mut changed = false;
    for b in 0..graph.num_nodes() {
        let undirected = graph
            .adjacent_nodes(b)
            .into_iter()
            .any(|a| graph.is_undirected(a, b));
        if !undirected {
            continue;
        }
        for c in graph.adjacent_nodes(b) {
            if mark(graph, c, b) == Some(Circle) && set_tail(graph, c, b) {
                debug!(b, c, "R6");
                changed = true;
            }
        }
    }
    changed
}

fn rule_r7(graph: &mut Graph) -> bool {
    let mut changed = false;
    for b in 0..graph.num_nodes() {
        for a in graph.adjacent_nodes(b) {
            if mark(graph, b, a) != Some(Tail) || mark(graph, a, b) != Some(Circle) {
                continue;
            }
            for c in graph.adjacent_nodes(b) {
                if c == a || graph.is_adjacent(a, c) || mark(graph, c, b) != Some(Circle) {
                    continue;
                }
                if set_tail(graph, c, b) {
                    debug!(b, c, "R7");
                    changed = true;
                }
            }
        }
    }
    changed
}

fn rule_r8(graph: &mut Graph) -> bool {
    let mut changed = false;
    for a in 0..graph.num_nodes() {
        for c in graph.adjacent_nodes(a) {
            if !is_partially_oriented(graph, a, c) {
                continue;
            }
            let through = graph.adjacent_nodes(a).into_iter().any(|b| {
                b != c
                    && mark(graph, b, a) == Some(Tail)
                    && matches!(mark(graph, a, b), Some(Arrow) | Some(Circle))
                    && is_directed(graph, b, c)
            });
            if through && set_tail(graph, c, a) {
                debug!(a, c, "R8");
                changed = true;
            }
        }
    }
    changed
}

fn rule_r9(graph: &mut Graph) -> bool {
    let mut changed = false;
    for a in 0..graph.num_nodes() {
        for c in graph.adjacent_nodes(a) {
            if !is_partially_oriented(graph, a, c) {
                continue;
            }
            let found = graph.adjacent_nodes(a).into_iter().any(|b| {
                b != c
                    && !graph.is_adjacent(b, c)
                    && uncovered_path(graph, a, b, c, &potentially_directed).is_some()
            });
            if found && set_tail(graph, c, a) {
                debug!(a, c, "R9");
                changed = true;
            }
        }
    }
    changed
}

/// Second nodes of uncovered potentially directed paths from `a` to
/// `target` that avoid `skip`.
fn first_steps(graph: &Graph, a: usize, target: usize, skip: usize) -> Vec<usize> {
    graph
        .adjacent_nodes(a)
        .into_iter()
        .filter(|&m| m != skip)
        .filter(|&m| uncovered_path(graph, a, m, target, &potentially_directed).is_some())
        .collect()
}

fn rule_r10(graph: &mut Graph) -> bool {
    let mut changed = false;
    for a in 0..graph.num_nodes() {
        for c in graph.adjacent_nodes(a) {
            if !is_partially_oriented(graph, a, c) {
                continue;
            }
            let into_c: Vec<usize> = graph
                .parents(c)
                .iter()
                .filter(|&x| x != a)
                .collect();
            let mut found = false;
            'pairs: for (i, &b) in into_c.iter().enumerate() {
                let from_b = first_steps(graph, a, b, c);
                if from_b.is_empty() {
                    continue;
                }
                for &d in &into_c[i + 1..] {
                    let from_d = first_steps(graph, a, d, c);
                    for &m in &from_b {
                        for &w in &from_d {
                            if m != w && !graph.is_adjacent(m, w) {
                                found = true;
                                break 'pairs;
                            }
                        }
                    }
                }
            }
            if found && set_tail(graph, c, a) {
                debug!(a, c, "R10");
                changed = true;
            }
        }
    }
    changed
}

/// FCI orientation driver over a source of separating sets.
pub struct FciOrient<S: SepsetProducer> {
    sepsets: S,
    knowledge: KnowledgeIndex,
    complete_rule_set_used: bool,
    discriminating_path_rule: bool,
    max_path_length: Option<usize>,
}

impl<S: SepsetProducer> FciOrient<S> {
    pub fn new(sepsets: S, knowledge: KnowledgeIndex) -> Self {
        Self {
            sepsets,
            knowledge,
            complete_rule_set_used: true,
            discriminating_path_rule: true,
            max_path_length: None,
        }
    }

    /// Use R5-R10 as well as R1-R4.
    pub fn with_complete_rule_set(mut self, complete: bool) -> Self {
        self.complete_rule_set_used = complete;
        self
    }

    pub fn with_discriminating_path_rule(mut self, enabled: bool) -> Self {
        self.discriminating_path_rule = enabled;
        self
    }

    /// Longest discriminating path considered, in edges; `None` is unlimited.
    pub fn with_max_path_length(mut self, max_path_length: Option<usize>) -> Self {
        self.max_path_length = max_path_length;
        self
    }

    pub fn knowledge(&self) -> &KnowledgeIndex {
        &self.knowledge
    }

    pub fn into_sepsets(self) -> S {
        self.sepsets
    }

    /// Reset every mark to a circle, apply the knowledge, then R0 and the
    /// final orientation.
    pub fn orient(&mut self, graph: &mut Graph, ctx: &mut SearchContext) -> Result<()> {
        graph.reorient_all_with(Circle);
        fci_orient_bk(&self.knowledge, graph);
        self.rule_r0(graph, ctx);
        self.do_final_orientation(graph, ctx)
    }

    /// Orient unshielded colliders from the sepsets. Returns the number of
    /// colliders.
    pub fn rule_r0(&mut self, graph: &mut Graph, ctx: &mut SearchContext) -> usize {
        let mut colliders = 0;
        for b in 0..graph.num_nodes() {
            let adjacent = graph.adjacent_nodes(b);
            for (i, &a) in adjacent.iter().enumerate() {
                for &c in &adjacent[i + 1..] {
                    if graph.is_adjacent(a, c) {
                        continue;
                    }
                    if !self.knowledge.allows_arrowhead(a, b) || !self.knowledge.allows_arrowhead(c, b) {
                        continue;
                    }
                    if self.sepsets.is_unshielded_collider(a, b, c) {
                        graph.set_endpoint(a, b, Arrow);
                        graph.set_endpoint(c, b, Arrow);
                        if ctx.is_verbose() {
                            ctx.trace(format_args!(
                                "Collider: {} *-> {} <-* {}",
                                graph.name(a),
                                graph.name(b),
                                graph.name(c)
                            ));
                        }
                        colliders += 1;
                    }
                }
            }
        }
        debug!(colliders, "R0");
        colliders
    }

    fn phase<'a>(
        rules: Vec<Box<dyn Rule + 'a>>,
        graph: &mut Graph,
        ctx: &mut SearchContext,
    ) -> Result<usize> {
        RuleEngine::new(rules).run(graph, ctx)
    }

    /// Apply R1-R4 to a fixed point; with the complete rule set, then R5,
    /// then R6-R7, then R1-R4 with R8-R10, each to a fixed point.
    pub fn do_final_orientation(&mut self, graph: &mut Graph, ctx: &mut SearchContext) -> Result<()> {
        let knowledge = &self.knowledge;
        let sepsets = &mut self.sepsets;
        let discriminating = self.discriminating_path_rule;
        let max_path_length = self.max_path_length;

        let mut arrow_rules: Vec<Box<dyn Rule + '_>> = vec![
            KnowledgeRule::boxed(FciRule::R1, knowledge),
            KnowledgeRule::boxed(FciRule::R2, knowledge),
            KnowledgeRule::boxed(FciRule::R3, knowledge),
        ];
        if discriminating {
            arrow_rules.push(Box::new(DiscriminatingPathRule::new(
                &mut *sepsets,
                knowledge,
                max_path_length,
            )));
        }
        Self::phase(arrow_rules, graph, ctx)?;

        if !self.complete_rule_set_used {
            return Ok(());
        }

        Self::phase(vec![KnowledgeRule::boxed(FciRule::R5, knowledge)], graph, ctx)?;
        Self::phase(
            vec![
                KnowledgeRule::boxed(FciRule::R6, knowledge),
                KnowledgeRule::boxed(FciRule::R7, knowledge),
            ],
            graph,
            ctx,
        )?;

        let mut rules: Vec<Box<dyn Rule + '_>> = vec![
            KnowledgeRule::boxed(FciRule::R1, knowledge),
            KnowledgeRule::boxed(FciRule::R2, knowledge),
            KnowledgeRule::boxed(FciRule::R3, knowledge),
        ];
        if discriminating {
            rules.push(Box::new(DiscriminatingPathRule::new(
                &mut *sepsets,
                knowledge,
                max_path_length,
            )));
        }
        for rule in [FciRule::R8, FciRule::R9, FciRule::R10] {
            rules.push(KnowledgeRule::boxed(rule, knowledge));
        }
        Self::phase(rules, graph, ctx)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::continuous_variables;
    use crate::knowledge::Knowledge;
    use crate::oracle::{DSeparationTest, Oracle};
    use crate::skeleton::{Fas, SepsetMap};

    fn graph(names: &[&str]) -> Graph {
        Graph::new(continuous_variables(names))
    }

    fn fci_pag(dag: &Graph) -> Graph {
        let oracle: Oracle = DSeparationTest::new(dag.clone()).unwrap().into();
        let mut ctx = SearchContext::new();
        let (mut skeleton, sepsets) = Fas::new(&oracle).search(&mut ctx).unwrap();
        let knowledge = KnowledgeIndex::empty(dag.num_nodes());
        FciOrient::new(sepsets, knowledge)
            .orient(&mut skeleton, &mut ctx)
            .unwrap();
        skeleton
    }

    #[test]
    fn test_r1_away_from_collider() {
        // A *-> B o-o C, A and C not adjacent.
        let mut g = graph(&["A", "B", "C"]);
        g.add_edge(0, 1, Circle, Arrow).unwrap();
        g.add_nondirected_edge(1, 2).unwrap();
        assert!(rule_r1(&mut g, &KnowledgeIndex::empty(3)));
        assert!(g.has_edge_str("B --> C"));
    }

    #[test]
    fn test_r2_closes_triangle() {
        // A --> B o-> C, A o-o C
        let mut g = graph(&["A", "B", "C"]);
        g.add_directed_edge(0, 1).unwrap();
        g.add_edge(1, 2, Circle, Arrow).unwrap();
        g.add_nondirected_edge(0, 2).unwrap();
        assert!(rule_r2(&mut g, &KnowledgeIndex::empty(3)));
        assert!(g.has_edge_str("A o-> C"));
    }

    #[test]
    fn test_r3() {
        // A *-> B <-* C, A o-o D o-o C, D o-o B
        let mut g = graph(&["A", "B", "C", "D"]);
        g.add_edge(0, 1, Circle, Arrow).unwrap();
        g.add_edge(2, 1, Circle, Arrow).unwrap();
        g.add_nondirected_edge(0, 3).unwrap();
        g.add_nondirected_edge(2, 3).unwrap();
        g.add_nondirected_edge(3, 1).unwrap();
        assert!(rule_r3(&mut g, &KnowledgeIndex::empty(4)));
        assert!(g.has_edge_str("D o-> B"));
    }

    #[test]
    fn test_r6_and_r7() {
        // A --- B o-o C
        let mut g = graph(&["A", "B", "C"]);
        g.add_undirected_edge(0, 1).unwrap();
        g.add_nondirected_edge(1, 2).unwrap();
        assert!(rule_r6(&mut g));
        assert!(g.has_edge_str("B --o C"));

        // A --o B o-o C
        let mut g = graph(&["A", "B", "C"]);
        g.add_edge(0, 1, Tail, Circle).unwrap();
        g.add_nondirected_edge(1, 2).unwrap();
        assert!(rule_r7(&mut g));
        assert!(g.has_edge_str("B --o C"));
    }

    #[test]
    fn test_r8() {
        // A --> B --> C, A o-> C
        let mut g = graph(&["A", "B", "C"]);
        g.add_directed_edge(0, 1).unwrap();
        g.add_directed_edge(1, 2).unwrap();
        g.add_edge(0, 2, Circle, Arrow).unwrap();
        assert!(rule_r8(&mut g));
        assert!(g.has_edge_str("A --> C"));
    }

    #[test]
    fn test_r9() {
        // A o-> C, A o-o B --> D --> C, B and C not adjacent.
        let mut g = graph(&["A", "B", "C", "D"]);
        g.add_edge(0, 2, Circle, Arrow).unwrap();
        g.add_nondirected_edge(0, 1).unwrap();
        g.add_directed_edge(1, 3).unwrap();
        g.add_directed_edge(3, 2).unwrap();
        assert!(rule_r9(&mut g));
        assert!(g.has_edge_str("A --> C"));
    }

    #[test]
    fn test_r10() {
        // A o-> C, B --> C <-- D, A o-> B, A o-> D, B and D not adjacent.
        let mut g = graph(&["A", "B", "C", "D"]);
        g.add_edge(0, 2, Circle, Arrow).unwrap();
        g.add_directed_edge(1, 2).unwrap();
        g.add_directed_edge(3, 2).unwrap();
        g.add_edge(0, 1, Circle, Arrow).unwrap();
        g.add_edge(0, 3, Circle, Arrow).unwrap();
        assert!(rule_r10(&mut g));
        assert!(g.has_edge_str("A --> C"));
    }

    #[test]
    fn test_r5_circle_cycle() {
        // A o-o B, A o-o C o-o D o-o B, a chordless cycle.
        let mut g = graph(&["A", "B", "C", "D"]);
        g.add_nondirected_edge(0, 1).unwrap();
        g.add_nondirected_edge(0, 2).unwrap();
        g.add_nondirected_edge(2, 3).unwrap();
        g.add_nondirected_edge(3, 1).unwrap();
        assert!(rule_r5(&mut g));
        assert!(g.edges().iter().all(|e| g.is_undirected(e.node1, e.node2)));
    }

    #[test]
    fn test_collider_and_away() {
        // A -> C <- B, C -> D
        let mut dag = graph(&["A", "B", "C", "D"]);
        dag.add_directed_edge(0, 2).unwrap();
        dag.add_directed_edge(1, 2).unwrap();
        dag.add_directed_edge(2, 3).unwrap();
        let pag = fci_pag(&dag);
        assert!(pag.has_edge_str("A o-> C"));
        assert!(pag.has_edge_str("B o-> C"));
        assert!(pag.has_edge_str("C --> D"));
    }

    #[test]
    fn test_final_orientation_is_idempotent() {
        // A -> C <- B, C -> D, B -> D
        let mut dag = graph(&["A", "B", "C", "D"]);
        dag.add_directed_edge(0, 2).unwrap();
        dag.add_directed_edge(1, 2).unwrap();
        dag.add_directed_edge(2, 3).unwrap();
        dag.add_directed_edge(1, 3).unwrap();
        let pag = fci_pag(&dag);
        let mut again = pag.clone();
        let mut ctx = SearchContext::new();
        FciOrient::new(SepsetMap::new(), KnowledgeIndex::empty(4))
            .do_final_orientation(&mut again, &mut ctx)
            .unwrap();
        assert_eq!(again, pag);
    }

    #[test]
    fn test_knowledge_blocks_arrowhead() {
        // A *-> B o-o C, with C -> B required.
        let mut g = graph(&["A", "B", "C"]);
        g.add_edge(0, 1, Circle, Arrow).unwrap();
        g.add_nondirected_edge(1, 2).unwrap();
        let mut knowledge = Knowledge::new();
        knowledge.add_required("C", "B").unwrap();
        let index = knowledge.bind(g.variables()).unwrap();
        assert!(!rule_r1(&mut g, &index));
        assert!(g.has_edge_str("B o-o C"));
    }
}
