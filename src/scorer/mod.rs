// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Incremental permutation scorer.
//!
//! The scorer holds a causal order of the variables. For each position it
//! keeps the parents chosen by Grow-Shrink among the variables before it,
//! together with the local score of those parents. The total score is the sum
//! of local scores; higher is better.
//!
//! Moving a variable only changes the prefix sets of the positions it passes
//! over, so [`PermutationScorer::move_to`] recomputes just that range.
//! Parent selection depends only on `(node, prefix set)`, and the optional
//! per-run cache is keyed on exactly that pair, so cached and uncached runs
//! give identical results.
//!
//! # Bookmarks
//!
//! Every change to a position is recorded on a [`Trail`]. A bookmark is a
//! trail position under a small integer key. Several bookmarks may be live
//! at once and each stays restorable until it is replaced or cleared. When a
//! later bookmark is live, restoring an earlier one appends the reversing
//! entries instead of truncating, so the later state can still be reached.
//!
//! ```
//! use causal_search::graph::{continuous_variables, Graph};
//! use causal_search::oracle::{DSeparationTest, Oracle};
//! use causal_search::scorer::PermutationScorer;
//!
//! // A -> B -> C
//! let mut dag = Graph::new(continuous_variables(&["A", "B", "C"]));
//! dag.add_directed_edge(0, 1).unwrap();
//! dag.add_directed_edge(1, 2).unwrap();
//! let oracle = Oracle::from(DSeparationTest::new(dag).unwrap());
//!
//! let mut scorer = PermutationScorer::new(&oracle);
//! assert_eq!(scorer.num_edges(), 2);
//! scorer.bookmark(0);
//! scorer.evaluate(&[0, 2, 1]).unwrap();
//! assert_eq!(scorer.num_edges(), 3);
//! scorer.restore_bookmark(0).unwrap();
//! assert_eq!(scorer.order(), &[0, 1, 2]);
//! ```

mod grow_shrink;

use crate::context::{Counter, Statistics};
use crate::error::{Result, SearchError};
use crate::graph::{Graph, NodeSet, Variable};
use crate::oracle::Oracle;
use crate::orient::cpdag_from_dag;
use crate::trail::Trail;
use grow_shrink::{select_parents, Local};
use rand::seq::SliceRandom;
use rand::Rng;
use rustc_hash::FxHashMap;
use tracing::trace;

/// Old contents of one position.
#[derive(Debug, Clone)]
enum Undo {
    Node { position: usize, node: usize },
    Local { position: usize, local: Local },
}

#[derive(Debug, Clone)]
pub struct PermutationScorer<'a> {
    oracle: &'a Oracle,
    order: Vec<usize>,
    /// Position of each node in `order`.
    positions: Vec<usize>,
    /// Parents and local score, by position.
    locals: Vec<Local>,
    caching: bool,
    /// Bound on the parents of every node.
    max_parents: Option<usize>,
    cache: FxHashMap<(usize, NodeSet), Local>,
    trail: Trail<Undo>,
    bookmarks: FxHashMap<usize, usize>,
    statistics: Statistics,
}

impl<'a> PermutationScorer<'a> {
    /// A caching scorer over the oracle's variables in data order.
    pub fn new(oracle: &'a Oracle) -> Self {
        let n = oracle.num_variables();
        let mut scorer = Self {
            oracle,
            order: (0..n).collect(),
            positions: (0..n).collect(),
            locals: Vec::with_capacity(n),
            caching: true,
            max_parents: None,
            cache: FxHashMap::default(),
            trail: Trail::new(),
            bookmarks: FxHashMap::default(),
            statistics: Statistics::new(),
        };
        let mut prefix = NodeSet::new();
        for node in 0..n {
            let local = scorer.compute(node, &prefix);
            scorer.locals.push(local);
            prefix.insert(node);
        }
        scorer
    }

    /// Enable or disable the per-run cache. Disabling clears it.
    pub fn set_caching(&mut self, caching: bool) {
        self.caching = caching;
        if !caching {
            self.cache.clear();
        }
    }

    /// Bound the number of parents Grow-Shrink may select, and rescore the
    /// current order under the new bound.
    pub fn set_max_parents(&mut self, max_parents: Option<usize>) {
        if max_parents == self.max_parents {
            return;
        }
        self.max_parents = max_parents;
        self.cache.clear();
        if self.size() > 0 {
            self.update(0, self.size() - 1);
        }
    }

    pub fn oracle(&self) -> &'a Oracle {
        self.oracle
    }

    pub fn variables(&self) -> &[Variable] {
        self.oracle.variables()
    }

    pub fn size(&self) -> usize {
        self.order.len()
    }

    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Node at a position.
    pub fn get(&self, position: usize) -> usize {
        self.order[position]
    }

    pub fn index_of(&self, node: usize) -> usize {
        self.positions[node]
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    /// Total score of the current order.
    pub fn score(&self) -> f64 {
        self.locals.iter().map(|l| l.score).sum()
    }

    /// Replace the order and recompute every position.
    pub fn evaluate(&mut self, order: &[usize]) -> Result<()> {
        let n = self.size();
        if order.len() != n {
            return Err(SearchError::InvalidOrder {
                expected: n,
                reason: format!("got {} entries", order.len()),
            });
        }
        let mut seen = NodeSet::new();
        for &node in order {
            if node >= n {
                return Err(SearchError::InvalidOrder {
                    expected: n,
                    reason: format!("variable {node} is out of range"),
                });
            }
            if !seen.insert(node) {
                return Err(SearchError::InvalidOrder {
                    expected: n,
                    reason: format!("variable {node} appears twice"),
                });
            }
        }
        self.reorder(order);
        Ok(())
    }

    /// Move `node` to `index`, shifting the nodes in between. An `index` past
    /// the end leaves the order unchanged.
    ///
    /// # Panics
    ///
    /// If `node` is not a variable of the oracle.
    pub fn move_to(&mut self, node: usize, index: usize) {
        self.check_node(node);
        let from = self.positions[node];
        if from == index || index >= self.size() {
            return;
        }
        self.statistics.increment(Counter::Moves);
        if from < index {
            for position in from..index {
                let next = self.order[position + 1];
                self.place(position, next);
            }
        } else {
            for position in (index + 1..=from).rev() {
                let previous = self.order[position - 1];
                self.place(position, previous);
            }
        }
        self.place(index, node);
        self.update(from.min(index), from.max(index));
    }

    /// Exchange the positions of two nodes.
    ///
    /// # Panics
    ///
    /// If either node is not a variable of the oracle.
    pub fn swap(&mut self, a: usize, b: usize) {
        self.check_node(a);
        self.check_node(b);
        let (i, j) = (self.positions[a], self.positions[b]);
        if i == j {
            return;
        }
        self.statistics.increment(Counter::Moves);
        self.place(i, b);
        self.place(j, a);
        self.update(i.min(j), i.max(j));
    }

    /// Move `node` one position left. False if it is already first.
    pub fn move_left(&mut self, node: usize) -> bool {
        let position = self.positions[node];
        if position == 0 {
            return false;
        }
        self.move_to(node, position - 1);
        true
    }

    /// Move `node` one position right. False if it is already last.
    pub fn move_right(&mut self, node: usize) -> bool {
        let position = self.positions[node];
        if position + 1 >= self.size() {
            return false;
        }
        self.move_to(node, position + 1);
        true
    }

    /// Shuffle the order.
    pub fn shuffle<R: Rng>(&mut self, rng: &mut R) {
        let mut order = self.order.clone();
        order.shuffle(rng);
        self.reorder(&order);
    }

    /// Remember the current state under `key`, replacing any earlier bookmark
    /// with that key.
    pub fn bookmark(&mut self, key: usize) {
        self.bookmarks.insert(key, self.trail.position());
        self.freeze_unreachable();
    }

    /// Return exactly to the state bookmarked under `key`. Every live
    /// bookmark, including this one, stays valid.
    pub fn restore_bookmark(&mut self, key: usize) -> Result<()> {
        let Some(&target) = self.bookmarks.get(&key) else {
            return Err(SearchError::config(format!("no bookmark {key}")));
        };
        self.statistics.increment(Counter::BookmarkRestores);
        let later_live = self.bookmarks.values().any(|&position| position > target);
        let Self {
            trail,
            order,
            positions,
            locals,
            ..
        } = self;
        let restored = if later_live {
            trail.revert_to(target, |undo| match undo {
                Undo::Node { position, node } => {
                    let displaced = std::mem::replace(&mut order[*position], *node);
                    positions[*node] = *position;
                    Undo::Node {
                        position: *position,
                        node: displaced,
                    }
                }
                Undo::Local { position, local } => Undo::Local {
                    position: *position,
                    local: std::mem::replace(&mut locals[*position], local.clone()),
                },
            })
        } else {
            trail.rewind_to(target, |undo| match undo {
                Undo::Node { position, node } => {
                    order[position] = node;
                    positions[node] = position;
                }
                Undo::Local { position, local } => locals[position] = local,
            })
        };
        if restored {
            Ok(())
        } else {
            Err(SearchError::config(format!(
                "bookmark {key} is older than the retained history"
            )))
        }
    }

    /// Drop a bookmark.
    pub fn clear_bookmark(&mut self, key: usize) {
        self.bookmarks.remove(&key);
        self.freeze_unreachable();
    }

    pub fn parents(&self, node: usize) -> &NodeSet {
        &self.locals[self.positions[node]].parents
    }

    /// Parents, children and the children's other parents.
    pub fn markov_blanket(&self, node: usize) -> NodeSet {
        let mut blanket = self.parents(node).clone();
        for local in &self.locals {
            if local.parents.contains(node) {
                blanket = blanket.union(&local.parents);
            }
        }
        for (position, local) in self.locals.iter().enumerate() {
            if local.parents.contains(node) {
                blanket.insert(self.order[position]);
            }
        }
        blanket.remove(node);
        blanket
    }

    pub fn adjacent(&self, a: usize, b: usize) -> bool {
        self.parents(a).contains(b) || self.parents(b).contains(a)
    }

    /// `a -> b <- c`.
    pub fn collider(&self, a: usize, b: usize, c: usize) -> bool {
        let parents = self.parents(b);
        parents.contains(a) && parents.contains(c)
    }

    pub fn triangle(&self, a: usize, b: usize, c: usize) -> bool {
        self.adjacent(a, b) && self.adjacent(b, c) && self.adjacent(a, c)
    }

    /// Whether the edge `v -> w` (in either direction) is covered: the two
    /// endpoints have the same parents apart from each other.
    pub fn covered(&self, v: usize, w: usize) -> bool {
        self.adjacent(v, w) && self.parents(w).without(v) == self.parents(v).without(w)
    }

    pub fn num_edges(&self) -> usize {
        self.locals.iter().map(|l| l.parents.len()).sum()
    }

    /// The DAG implied by the current order, or its CPDAG.
    pub fn get_graph(&self, cpdag: bool) -> Graph {
        let mut dag = Graph::new(self.variables().to_vec());
        for (position, local) in self.locals.iter().enumerate() {
            for parent in local.parents.iter() {
                dag.set_directed(parent, self.order[position]);
            }
        }
        if cpdag {
            cpdag_from_dag(&dag)
        } else {
            dag
        }
    }

    /// Replace the order with a permutation of the variables and rescore
    /// from the first changed position.
    fn reorder(&mut self, order: &[usize]) {
        let first_change = order.iter().zip(&self.order).position(|(a, b)| a != b);
        if let Some(first) = first_change {
            for (position, &node) in order.iter().enumerate().skip(first) {
                self.place(position, node);
            }
            self.update(first, self.size() - 1);
        }
    }

    fn check_node(&self, node: usize) {
        assert!(
            node < self.size(),
            "variable {node} is out of range for a scorer over {} variables",
            self.size()
        );
    }

    /// Put `node` at `position`, recording the old node if a bookmark could
    /// need it. Parents are left for [`Self::update`].
    fn place(&mut self, position: usize, node: usize) {
        if !self.bookmarks.is_empty() {
            self.trail.record(Undo::Node {
                position,
                node: self.order[position],
            });
        }
        self.order[position] = node;
        self.positions[node] = position;
    }

    /// Recompute parents for positions `from..=to`.
    fn update(&mut self, from: usize, to: usize) {
        let mut prefix: NodeSet = self.order[..from].iter().copied().collect();
        for position in from..=to {
            let node = self.order[position];
            let local = self.compute(node, &prefix);
            if local != self.locals[position] {
                let old = std::mem::replace(&mut self.locals[position], local);
                if !self.bookmarks.is_empty() {
                    self.trail.record(Undo::Local {
                        position,
                        local: old,
                    });
                }
            }
            prefix.insert(node);
        }
        trace!(from, to, score = self.score(), "rescored positions");
    }

    fn compute(&mut self, node: usize, prefix: &NodeSet) -> Local {
        if self.caching {
            if let Some(local) = self.cache.get(&(node, prefix.clone())) {
                self.statistics.increment(Counter::CacheHits);
                return local.clone();
            }
        }
        let (local, effort) = select_parents(self.oracle, node, prefix, self.max_parents);
        self.statistics.add(Counter::LocalScores, effort.local_scores);
        self.statistics.add(Counter::IndependenceTests, effort.tests);
        if self.caching {
            self.cache.insert((node, prefix.clone()), local.clone());
        }
        local
    }

    /// History older than every live bookmark can be dropped.
    fn freeze_unreachable(&mut self) {
        let oldest = self
            .bookmarks
            .values()
            .min()
            .copied()
            .unwrap_or_else(|| self.trail.position());
        self.trail.freeze(oldest);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::continuous_variables;
    use crate::oracle::DSeparationTest;

    /// The diamond A -> B, A -> C, B -> D, C -> D.
    fn diamond() -> Oracle {
        let mut g = Graph::new(continuous_variables(&["A", "B", "C", "D"]));
        g.add_directed_edge(0, 1).unwrap();
        g.add_directed_edge(0, 2).unwrap();
        g.add_directed_edge(1, 3).unwrap();
        g.add_directed_edge(2, 3).unwrap();
        DSeparationTest::new(g).unwrap().into()
    }

    #[test]
    fn test_true_order_recovers_dag() {
        let oracle = diamond();
        let scorer = PermutationScorer::new(&oracle);
        assert_eq!(scorer.num_edges(), 4);
        assert_eq!(scorer.score(), -4.0);
        assert_eq!(scorer.parents(3).to_vec(), vec![1, 2]);
        assert!(scorer.collider(1, 3, 2));
        assert!(!scorer.adjacent(1, 2));
        assert_eq!(scorer.markov_blanket(1).to_vec(), vec![0, 2, 3]);
    }

    #[test]
    fn test_covered_edges_in_diamond() {
        let oracle = diamond();
        let scorer = PermutationScorer::new(&oracle);
        // P(B) = {A}, P(A) = {}: A -> B is covered only if P(B)\A == P(A).
        assert!(scorer.covered(0, 1));
        assert!(scorer.covered(0, 2));
        // P(D) \ B = {C} but P(B) = {A}.
        assert!(!scorer.covered(1, 3));
        assert!(!scorer.covered(1, 2));
    }

    #[test]
    fn test_bad_orders_rejected() {
        let oracle = diamond();
        let mut scorer = PermutationScorer::new(&oracle);
        assert!(matches!(
            scorer.evaluate(&[0, 1, 2]),
            Err(SearchError::InvalidOrder { expected: 4, .. })
        ));
        assert!(scorer.evaluate(&[0, 1, 1, 3]).is_err());
        assert!(scorer.evaluate(&[0, 1, 2, 7]).is_err());
        assert_eq!(scorer.order(), &[0, 1, 2, 3]);
    }

    #[test]
    fn test_move_to_and_back() {
        let oracle = diamond();
        let mut scorer = PermutationScorer::new(&oracle);
        let before = scorer.score();
        scorer.move_to(3, 0);
        assert_eq!(scorer.order(), &[3, 0, 1, 2]);
        assert!(scorer.score() < before);
        scorer.move_to(3, 3);
        assert_eq!(scorer.order(), &[0, 1, 2, 3]);
        assert_eq!(scorer.score(), before);
    }

    #[test]
    fn test_swap_matches_evaluate() {
        let oracle = diamond();
        let mut scorer = PermutationScorer::new(&oracle);
        scorer.swap(0, 3);
        assert_eq!(scorer.order(), &[3, 1, 2, 0]);
        let swapped = scorer.score();
        let mut fresh = PermutationScorer::new(&oracle);
        fresh.set_caching(false);
        fresh.evaluate(&[3, 1, 2, 0]).unwrap();
        assert_eq!(fresh.score(), swapped);
        assert_eq!(fresh.get_graph(false), scorer.get_graph(false));
    }

    #[test]
    fn test_nested_bookmarks() {
        let oracle = diamond();
        let mut scorer = PermutationScorer::new(&oracle);
        scorer.bookmark(0);
        scorer.move_to(2, 0);
        scorer.bookmark(1);
        let at_one = (scorer.order().to_vec(), scorer.score());
        scorer.move_to(3, 0);
        scorer.restore_bookmark(1).unwrap();
        assert_eq!((scorer.order().to_vec(), scorer.score()), at_one);
        scorer.restore_bookmark(0).unwrap();
        assert_eq!(scorer.order(), &[0, 1, 2, 3]);
        assert!(scorer.restore_bookmark(7).is_err());
    }

    #[test]
    fn test_earlier_restore_keeps_later_bookmark() {
        let oracle = diamond();
        let mut scorer = PermutationScorer::new(&oracle);
        let start = scorer.score();
        scorer.bookmark(0);
        scorer.move_to(3, 0);
        scorer.bookmark(1);
        let at_one = (scorer.order().to_vec(), scorer.score());
        scorer.move_to(2, 0);

        scorer.restore_bookmark(0).unwrap();
        assert_eq!(scorer.order(), &[0, 1, 2, 3]);
        assert_eq!(scorer.score(), start);

        scorer.restore_bookmark(1).unwrap();
        assert_eq!((scorer.order().to_vec(), scorer.score()), at_one);
        for v in 0..4 {
            assert_eq!(scorer.get(scorer.index_of(v)), v);
        }

        scorer.restore_bookmark(0).unwrap();
        assert_eq!(scorer.order(), &[0, 1, 2, 3]);
        assert_eq!(scorer.score(), start);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_move_of_unknown_variable_panics() {
        let oracle = diamond();
        let mut scorer = PermutationScorer::new(&oracle);
        scorer.move_to(9, 0);
    }

    #[test]
    fn test_move_left_and_right_at_ends() {
        let oracle = diamond();
        let mut scorer = PermutationScorer::new(&oracle);
        assert!(!scorer.move_left(0));
        assert!(!scorer.move_right(3));
        assert!(scorer.move_right(0));
        assert_eq!(scorer.index_of(0), 1);
    }

    #[test]
    fn test_cache_hits_counted() {
        let oracle = diamond();
        let mut scorer = PermutationScorer::new(&oracle);
        scorer.move_to(3, 0);
        scorer.move_to(3, 3);
        assert!(scorer.statistics().get(Counter::CacheHits) > 0);
    }

    #[test]
    fn test_cpdag_of_diamond() {
        let oracle = diamond();
        let scorer = PermutationScorer::new(&oracle);
        let cpdag = scorer.get_graph(true);
        assert!(cpdag.has_edge_str("B --> D"));
        assert!(cpdag.has_edge_str("C --> D"));
        assert!(cpdag.has_edge_str("A --- B"));
    }

    #[test]
    fn test_parent_bound_rescores() {
        let oracle = diamond();
        let mut scorer = PermutationScorer::new(&oracle);
        scorer.set_max_parents(Some(1));
        assert_eq!(scorer.parents(3).len(), 1);
        assert_eq!(scorer.num_edges(), 3);
        scorer.set_max_parents(None);
        assert_eq!(scorer.num_edges(), 4);
    }
}
