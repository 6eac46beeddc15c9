// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! NodeSet type for representing sets of node indices as bitsets.
//!
//! A NodeSet is a growable bitset where bit i represents the presence of node i.
//! Trailing zero words are always trimmed, so two sets with the same members
//! compare (and hash) equal regardless of how they were built. This makes
//! NodeSet usable directly as a cache key.
//!
//! # Examples
//!
//! ```
//! use causal_search::graph::NodeSet;
//!
//! let mut set = NodeSet::new();
//! set.insert(0);
//! set.insert(2);
//! set.insert(70);
//!
//! assert_eq!(set.len(), 3);
//! assert_eq!(set.iter().collect::<Vec<_>>(), vec![0, 2, 70]);
//! assert_eq!(format!("{}", set), "{0, 2, 70}");
//! ```

use std::fmt;

const WORD_BITS: usize = 64;

/// A set of node indices represented as a bitset.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeSet {
    words: Vec<u64>,
}

impl NodeSet {
    /// Create an empty set.
    pub const fn new() -> Self {
        Self { words: Vec::new() }
    }

    /// Create a set containing a single node.
    pub fn singleton(node: usize) -> Self {
        let mut set = Self::new();
        set.insert(node);
        set
    }

    /// Create a set containing every node in `0..n`.
    pub fn full(n: usize) -> Self {
        (0..n).collect()
    }

    /// Check if the set contains a node.
    pub fn contains(&self, node: usize) -> bool {
        self.words
            .get(node / WORD_BITS)
            .is_some_and(|w| (w >> (node % WORD_BITS)) & 1 != 0)
    }

    /// Insert a node. Returns true if it was not already present.
    pub fn insert(&mut self, node: usize) -> bool {
        let word = node / WORD_BITS;
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        let mask = 1 << (node % WORD_BITS);
        let fresh = self.words[word] & mask == 0;
        self.words[word] |= mask;
        fresh
    }

    /// Remove a node. Returns true if it was present.
    pub fn remove(&mut self, node: usize) -> bool {
        let word = node / WORD_BITS;
        let Some(bits) = self.words.get_mut(word) else {
            return false;
        };
        let mask = 1 << (node % WORD_BITS);
        let present = *bits & mask != 0;
        *bits &= !mask;
        self.trim();
        present
    }

    /// Number of nodes in the set.
    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Remove every node.
    pub fn clear(&mut self) {
        self.words.clear();
    }

    /// Iterate over the nodes in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(i, &word)| {
            let mut bits = word;
            std::iter::from_fn(move || {
                if bits == 0 {
                    return None;
                }
                let bit = bits.trailing_zeros() as usize;
                bits &= bits - 1;
                Some(i * WORD_BITS + bit)
            })
        })
    }

    /// Copy the members into a sorted vector.
    pub fn to_vec(&self) -> Vec<usize> {
        self.iter().collect()
    }

    /// Set union.
    pub fn union(&self, other: &NodeSet) -> NodeSet {
        let (long, short) = if self.words.len() >= other.words.len() {
            (self, other)
        } else {
            (other, self)
        };
        let mut words = long.words.clone();
        for (w, o) in words.iter_mut().zip(&short.words) {
            *w |= o;
        }
        NodeSet { words }
    }

    /// Set intersection.
    pub fn intersection(&self, other: &NodeSet) -> NodeSet {
        let words = self
            .words
            .iter()
            .zip(&other.words)
            .map(|(a, b)| a & b)
            .collect();
        let mut set = NodeSet { words };
        set.trim();
        set
    }

    /// Members of `self` that are not in `other`.
    pub fn difference(&self, other: &NodeSet) -> NodeSet {
        let mut words = self.words.clone();
        for (w, o) in words.iter_mut().zip(&other.words) {
            *w &= !o;
        }
        let mut set = NodeSet { words };
        set.trim();
        set
    }

    /// True if every member of `self` is in `other`.
    pub fn is_subset(&self, other: &NodeSet) -> bool {
        self.words.iter().enumerate().all(|(i, &w)| {
            let o = other.words.get(i).copied().unwrap_or(0);
            w & !o == 0
        })
    }

    /// Copy of this set with `node` added.
    pub fn with(&self, node: usize) -> NodeSet {
        let mut set = self.clone();
        set.insert(node);
        set
    }

    /// Copy of this set with `node` removed.
    pub fn without(&self, node: usize) -> NodeSet {
        let mut set = self.clone();
        set.remove(node);
        set
    }

    fn trim(&mut self) {
        while self.words.last() == Some(&0) {
            self.words.pop();
        }
    }
}

impl FromIterator<usize> for NodeSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut set = NodeSet::new();
        for node in iter {
            set.insert(node);
        }
        set
    }
}

impl Extend<usize> for NodeSet {
    fn extend<I: IntoIterator<Item = usize>>(&mut self, iter: I) {
        for node in iter {
            self.insert(node);
        }
    }
}

impl fmt::Display for NodeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, node) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{node}")?;
        }
        write!(f, "}}")
    }
}

impl fmt::Debug for NodeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeSet{self}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        let set = NodeSet::new();
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
        assert!(!set.contains(5));
    }

    #[test]
    fn test_insert_remove() {
        let mut set = NodeSet::new();
        assert!(set.insert(3));
        assert!(!set.insert(3));
        assert!(set.contains(3));
        assert!(set.remove(3));
        assert!(!set.remove(3));
        assert!(set.is_empty());
    }

    #[test]
    fn test_canonical_equality_after_remove() {
        let mut a = NodeSet::new();
        a.insert(1);
        a.insert(100);
        a.remove(100);
        let b = NodeSet::singleton(1);
        assert_eq!(a, b);

        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};
        let hash = |s: &NodeSet| {
            let mut h = DefaultHasher::new();
            s.hash(&mut h);
            h.finish()
        };
        assert_eq!(hash(&a), hash(&b));
    }

    #[test]
    fn test_set_algebra() {
        let a: NodeSet = [0, 1, 2, 65].into_iter().collect();
        let b: NodeSet = [2, 3, 65].into_iter().collect();

        assert_eq!(a.union(&b).to_vec(), vec![0, 1, 2, 3, 65]);
        assert_eq!(a.intersection(&b).to_vec(), vec![2, 65]);
        assert_eq!(a.difference(&b).to_vec(), vec![0, 1]);
        assert!(NodeSet::singleton(65).is_subset(&a));
        assert!(!b.is_subset(&a));
    }

    #[test]
    fn test_difference_trims() {
        let a = NodeSet::singleton(80);
        assert_eq!(a.difference(&a), NodeSet::new());
    }

    #[test]
    fn test_display() {
        let set: NodeSet = [4, 1].into_iter().collect();
        assert_eq!(set.to_string(), "{1, 4}");
        assert_eq!(NodeSet::new().to_string(), "{}");
    }

    #[test]
    fn test_full() {
        assert_eq!(NodeSet::full(3).to_vec(), vec![0, 1, 2]);
        assert!(NodeSet::full(0).is_empty());
    }
}
