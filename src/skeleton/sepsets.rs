// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Separating sets.
//!
//! Orientation needs, for a non-adjacent pair, a set that renders the pair
//! independent. [`SepsetMap`] is the record left behind by the adjacency
//! search; [`SepsetSearch`] finds sets on demand among the adjacents of a
//! reference graph.

use super::choose::Combinations;
use crate::graph::{Graph, NodeSet};
use crate::oracle::Oracle;
use rustc_hash::FxHashMap;
use tracing::trace;

/// A source of separating sets.
pub trait SepsetProducer {
    /// A set separating `a` and `b`, or `None` if none is known.
    fn sepset(&mut self, a: usize, b: usize) -> Option<NodeSet>;

    /// Independence tests run so far.
    fn tests_run(&self) -> u64 {
        0
    }

    /// `a *-> b <-* c` is a collider if `b` is outside the sepset of `a, c`.
    /// Unknown sepsets give `false`.
    fn is_unshielded_collider(&mut self, a: usize, b: usize, c: usize) -> bool {
        self.sepset(a, c).is_some_and(|s| !s.contains(b))
    }
}

/// Unordered pair to separating set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SepsetMap {
    sets: FxHashMap<(usize, usize), NodeSet>,
}

impl SepsetMap {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(a: usize, b: usize) -> (usize, usize) {
        (a.min(b), a.max(b))
    }

    pub fn set(&mut self, a: usize, b: usize, sepset: NodeSet) {
        self.sets.insert(Self::key(a, b), sepset);
    }

    pub fn get(&self, a: usize, b: usize) -> Option<&NodeSet> {
        self.sets.get(&Self::key(a, b))
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Pairs with a recorded sepset, as `(min, max)`.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.sets.keys().copied()
    }
}

impl SepsetProducer for SepsetMap {
    fn sepset(&mut self, a: usize, b: usize) -> Option<NodeSet> {
        self.get(a, b).cloned()
    }
}

impl<T: SepsetProducer + ?Sized> SepsetProducer for &mut T {
    fn sepset(&mut self, a: usize, b: usize) -> Option<NodeSet> {
        (**self).sepset(a, b)
    }

    fn tests_run(&self) -> u64 {
        (**self).tests_run()
    }
}

/// Finds sepsets among the adjacents of a reference graph, smallest sets
/// first, testing adjacents of `a` before adjacents of `b`. Results are
/// memoized per pair.
#[derive(Debug, Clone)]
pub struct SepsetSearch<'a> {
    reference: Graph,
    oracle: &'a Oracle,
    max_degree: Option<usize>,
    found: FxHashMap<(usize, usize), Option<NodeSet>>,
    tests: u64,
}

impl<'a> SepsetSearch<'a> {
    /// `max_degree` bounds the size of candidate sets; `None` is unlimited.
    pub fn new(reference: Graph, oracle: &'a Oracle, max_degree: Option<usize>) -> Self {
        Self {
            reference,
            oracle,
            max_degree,
            found: FxHashMap::default(),
            tests: 0,
        }
    }

    fn search(&mut self, a: usize, b: usize) -> Option<NodeSet> {
        for (x, y) in [(a, b), (b, a)] {
            let candidates: Vec<usize> = self
                .reference
                .adjacent_nodes(x)
                .into_iter()
                .filter(|&v| v != y)
                .collect();
            let max = self
                .max_degree
                .unwrap_or(candidates.len())
                .min(candidates.len());
            for size in 0..=max {
                for subset in Combinations::new(&candidates, size) {
                    self.tests += 1;
                    if self.oracle.is_independent(a, b, &subset) {
                        trace!(a, b, sepset = %subset, "sepset found");
                        return Some(subset);
                    }
                }
            }
        }
        None
    }
}

impl SepsetProducer for SepsetSearch<'_> {
    fn sepset(&mut self, a: usize, b: usize) -> Option<NodeSet> {
        let key = (a.min(b), a.max(b));
        if let Some(known) = self.found.get(&key) {
            return known.clone();
        }
        let result = self.search(key.0, key.1);
        self.found.insert(key, result.clone());
        result
    }

    fn tests_run(&self) -> u64 {
        self.tests
    }
}
