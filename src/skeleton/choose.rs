// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Conditioning-set enumeration.

use crate::graph::NodeSet;

/// All `k`-element subsets of `items`, in lexicographic order of positions.
#[derive(Debug, Clone)]
pub struct Combinations<'a> {
    items: &'a [usize],
    indices: Vec<usize>,
    done: bool,
}

impl<'a> Combinations<'a> {
    pub fn new(items: &'a [usize], k: usize) -> Self {
        Self {
            items,
            indices: (0..k).collect(),
            done: k > items.len(),
        }
    }
}

impl Iterator for Combinations<'_> {
    type Item = NodeSet;

    fn next(&mut self) -> Option<NodeSet> {
        if self.done {
            return None;
        }
        let subset = self.indices.iter().map(|&i| self.items[i]).collect();

        let n = self.items.len();
        let k = self.indices.len();
        match (0..k).rev().find(|&i| self.indices[i] < n - k + i) {
            Some(i) => {
                self.indices[i] += 1;
                for j in i + 1..k {
                    self.indices[j] = self.indices[j - 1] + 1;
                }
            }
            None => self.done = true,
        }
        Some(subset)
    }
}

/// Subsets of every size from 0 up to `max_size`, smallest first.
pub fn subsets_up_to(items: &[usize], max_size: usize) -> impl Iterator<Item = NodeSet> + '_ {
    (0..=max_size.min(items.len())).flat_map(move |k| Combinations::new(items, k))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combination_counts() {
        let items = [3, 5, 7, 9];
        assert_eq!(Combinations::new(&items, 0).count(), 1);
        assert_eq!(Combinations::new(&items, 2).count(), 6);
        assert_eq!(Combinations::new(&items, 4).count(), 1);
        assert_eq!(Combinations::new(&items, 5).count(), 0);
        assert_eq!(subsets_up_to(&items, 10).count(), 16);
    }

    #[test]
    fn test_lexicographic() {
        let items = [1, 2, 3];
        let pairs: Vec<Vec<usize>> = Combinations::new(&items, 2).map(|s| s.to_vec()).collect();
        assert_eq!(pairs, vec![vec![1, 2], vec![1, 3], vec![2, 3]]);
    }
}
