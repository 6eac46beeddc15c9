// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Background knowledge: required and forbidden directed edges.
//!
//! [`Knowledge`] is the user-facing form, keyed by variable name and
//! serde-loadable. Searches bind it to their variable list once, producing a
//! [`KnowledgeIndex`] that answers pair queries by node index.
//!
//! As orders, `required(X, Y)` means X must precede Y and `forbidden(X, Y)`
//! (unless `forbidden(Y, X)` too) means Y must precede X.
//!
//! ```
//! use causal_search::knowledge::Knowledge;
//! use causal_search::graph::continuous_variables;
//!
//! let mut knowledge = Knowledge::new();
//! knowledge.add_forbidden("B", "A").unwrap();
//! assert!(knowledge.add_required("B", "A").is_err());
//!
//! let index = knowledge.bind(&continuous_variables(&["A", "B"])).unwrap();
//! assert!(index.satisfies(&[0, 1]));
//! assert!(!index.satisfies(&[1, 0]));
//! ```

use crate::error::{Result, SearchError};
use crate::graph::Variable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Required and forbidden edges by variable name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Knowledge {
    required: BTreeSet<(String, String)>,
    forbidden: BTreeSet<(String, String)>,
}

impl Knowledge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require the edge `from --> to`.
    ///
    /// Fails if the same edge is already forbidden.
    pub fn add_required(&mut self, from: &str, to: &str) -> Result<()> {
        Self::check_pair(from, to)?;
        let pair = (from.to_string(), to.to_string());
        if self.forbidden.contains(&pair) {
            return Err(SearchError::config(format!(
                "{from} --> {to} cannot be both required and forbidden"
            )));
        }
        self.required.insert(pair);
        Ok(())
    }

    /// Forbid the edge `from --> to`.
    ///
    /// Fails if the same edge is already required.
    pub fn add_forbidden(&mut self, from: &str, to: &str) -> Result<()> {
        Self::check_pair(from, to)?;
        let pair = (from.to_string(), to.to_string());
        if self.required.contains(&pair) {
            return Err(SearchError::config(format!(
                "{from} --> {to} cannot be both required and forbidden"
            )));
        }
        self.forbidden.insert(pair);
        Ok(())
    }

    fn check_pair(from: &str, to: &str) -> Result<()> {
        if from == to {
            Err(SearchError::config(format!(
                "knowledge edge from {from} to itself"
            )))
        } else {
            Ok(())
        }
    }

    pub fn remove_required(&mut self, from: &str, to: &str) {
        self.required.remove(&(from.to_string(), to.to_string()));
    }

    pub fn remove_forbidden(&mut self, from: &str, to: &str) {
        self.forbidden.remove(&(from.to_string(), to.to_string()));
    }

    pub fn is_required(&self, from: &str, to: &str) -> bool {
        self.required.contains(&(from.to_string(), to.to_string()))
    }

    pub fn is_forbidden(&self, from: &str, to: &str) -> bool {
        self.forbidden.contains(&(from.to_string(), to.to_string()))
    }

    pub fn is_empty(&self) -> bool {
        self.required.is_empty() && self.forbidden.is_empty()
    }

    pub fn required_edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.required.iter().map(|(a, b)| (a.as_str(), b.as_str()))
    }

    pub fn forbidden_edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.forbidden.iter().map(|(a, b)| (a.as_str(), b.as_str()))
    }

    /// Parse knowledge from JSON, re-checking every pair.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: Knowledge = serde_json::from_str(json)
            .map_err(|e| SearchError::config(format!("cannot parse knowledge: {e}")))?;
        let mut knowledge = Knowledge::new();
        for (from, to) in raw.required_edges() {
            knowledge.add_required(from, to)?;
        }
        for (from, to) in raw.forbidden_edges() {
            knowledge.add_forbidden(from, to)?;
        }
        Ok(knowledge)
    }

    /// Resolve names against a variable list.
    pub fn bind(&self, variables: &[Variable]) -> Result<KnowledgeIndex> {
        let n = variables.len();
        let lookup = |name: &str| {
            variables
                .iter()
                .position(|v| v.name() == name)
                .ok_or_else(|| SearchError::UnknownVariable(name.to_string()))
        };
        let mut index = KnowledgeIndex::empty(n);
        for (from, to) in self.required_edges() {
            let (a, b) = (lookup(from)?, lookup(to)?);
            index.required[a * n + b] = true;
            index.is_empty = false;
        }
        for (from, to) in self.forbidden_edges() {
            let (a, b) = (lookup(from)?, lookup(to)?);
            index.forbidden[a * n + b] = true;
            index.is_empty = false;
        }
        Ok(index)
    }
}

/// Knowledge bound to node indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnowledgeIndex {
    n: usize,
    required: Vec<bool>,
    forbidden: Vec<bool>,
    is_empty: bool,
}

impl KnowledgeIndex {
    /// No constraints over `n` nodes.
    pub fn empty(n: usize) -> Self {
        Self {
            n,
            required: vec![false; n * n],
            forbidden: vec![false; n * n],
            is_empty: true,
        }
    }

    pub fn num_nodes(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.is_empty
    }

    pub fn is_required(&self, from: usize, to: usize) -> bool {
        from < self.n && to < self.n && self.required[from * self.n + to]
    }

    pub fn is_forbidden(&self, from: usize, to: usize) -> bool {
        from < self.n && to < self.n && self.forbidden[from * self.n + to]
    }

    /// Every required pair `(from, to)`.
    pub fn required_pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.pairs(&self.required)
    }

    /// Every forbidden pair `(from, to)`.
    pub fn forbidden_pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.pairs(&self.forbidden)
    }

    fn pairs<'a>(&'a self, flags: &'a [bool]) -> impl Iterator<Item = (usize, usize)> + 'a {
        flags
            .iter()
            .enumerate()
            .filter(|(_, &f)| f)
            .map(move |(i, _)| (i / self.n, i % self.n))
    }

    /// True if `earlier` must come after `later` in any valid order.
    fn must_precede(&self, earlier: usize, later: usize) -> bool {
        self.is_required(earlier, later)
            || (self.is_forbidden(later, earlier) && !self.is_forbidden(earlier, later))
    }

    /// True if no pair in `order` violates a constraint.
    pub fn satisfies(&self, order: &[usize]) -> bool {
        if self.is_empty {
            return true;
        }
        for (i, &a) in order.iter().enumerate() {
            for &b in &order[i + 1..] {
                if self.must_precede(b, a) {
                    return false;
                }
            }
        }
        true
    }

    /// Reorder `order` to satisfy the constraints, moving as little as possible.
    ///
    /// This is a topological sort of the precedence constraints that prefers
    /// the earliest node of `order` whenever there is a choice, so an order
    /// that already satisfies the constraints is returned unchanged.
    pub fn valid_order(&self, order: &[usize]) -> Result<Vec<usize>> {
        if self.is_empty {
            return Ok(order.to_vec());
        }
        let len = order.len();
        let mut blocked_by = vec![0usize; len];
        for (i, &a) in order.iter().enumerate() {
            for (j, &b) in order.iter().enumerate() {
                if i != j && self.must_precede(b, a) {
                    blocked_by[i] += 1;
                }
            }
        }
        let mut placed = vec![false; len];
        let mut result = Vec::with_capacity(len);
        while result.len() < len {
            let next = (0..len).find(|&i| !placed[i] && blocked_by[i] == 0);
            let Some(i) = next else {
                return Err(SearchError::config(
                    "background knowledge admits no valid order (cyclic constraints)",
                ));
            };
            placed[i] = true;
            result.push(order[i]);
            for (j, &b) in order.iter().enumerate() {
                if !placed[j] && self.must_precede(order[i], b) {
                    blocked_by[j] -= 1;
                }
            }
        }
        Ok(result)
    }

    /// True if `from --> to` is compatible with the knowledge.
    pub fn allows_directed(&self, from: usize, to: usize) -> bool {
        !self.is_required(to, from) && !self.is_forbidden(from, to)
    }

    /// True if an arrowhead at `to` on an edge from `from` is compatible with
    /// the knowledge (an arrowhead at `to` denies that `to` causes `from`).
    pub fn allows_arrowhead(&self, from: usize, to: usize) -> bool {
        !self.is_required(to, from)
    }
}
