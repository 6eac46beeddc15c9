// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Grow-Shrink parent selection.
//!
//! Given a node and the set of nodes preceding it, pick the parents:
//! - **grow**: add the candidate that most improves the local score, until
//!   nothing improves it;
//! - **shrink**: drop the parent whose removal most improves the local score,
//!   until nothing does.
//!
//! With an independence test instead of a score, grow adds every candidate
//! dependent on the node given the current parents (repeating until stable)
//! and shrink drops every parent independent of the node given the others.
//! The local score is then `-|parents|`.
//!
//! An optional bound caps the number of parents grow may add, which also
//! caps the size of every conditioning set the test variant uses.

use crate::graph::NodeSet;
use crate::oracle::Oracle;
use tracing::warn;

/// Parents and local score of one node for one prefix.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Local {
    pub parents: NodeSet,
    pub score: f64,
}

/// Work done by one selection, for the run statistics.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Effort {
    pub local_scores: u64,
    pub tests: u64,
}

pub(crate) fn select_parents(
    oracle: &Oracle,
    node: usize,
    prefix: &NodeSet,
    max_parents: Option<usize>,
) -> (Local, Effort) {
    if oracle.is_score() {
        by_score(oracle, node, prefix, max_parents)
    } else {
        by_test(oracle, node, prefix, max_parents)
    }
}

fn full(parents: &NodeSet, max_parents: Option<usize>) -> bool {
    max_parents.is_some_and(|m| parents.len() >= m)
}

fn by_score(
    oracle: &Oracle,
    node: usize,
    prefix: &NodeSet,
    max_parents: Option<usize>,
) -> (Local, Effort) {
    let mut effort = Effort::default();
    let mut score_of = |parents: &NodeSet| {
        effort.local_scores += 1;
        match oracle.local_score(node, parents) {
            Ok(score) if score.is_finite() => score,
            Ok(_) => {
                warn!(node, ?parents, "non-finite local score; excluding this parent set");
                f64::NEG_INFINITY
            }
            Err(error) => {
                warn!(node, %error, "local score failed; excluding this parent set");
                f64::NEG_INFINITY
            }
        }
    };

    let mut parents = NodeSet::new();
    let mut current = score_of(&parents);

    while !full(&parents, max_parents) {
        let mut best: Option<(usize, f64)> = None;
        for candidate in prefix.difference(&parents).iter() {
            let s = score_of(&parents.with(candidate));
            if s > best.map_or(current, |(_, b)| b) {
                best = Some((candidate, s));
            }
        }
        match best {
            Some((candidate, s)) => {
                parents.insert(candidate);
                current = s;
            }
            None => break,
        }
    }

    loop {
        let mut best: Option<(usize, f64)> = None;
        for parent in parents.iter() {
            let s = score_of(&parents.without(parent));
            if s > best.map_or(current, |(_, b)| b) {
                best = Some((parent, s));
            }
        }
        match best {
            Some((parent, s)) => {
                parents.remove(parent);
                current = s;
            }
            None => break,
        }
    }

    (
        Local {
            parents,
            score: current,
        },
        effort,
    )
}

fn by_test(
    oracle: &Oracle,
    node: usize,
    prefix: &NodeSet,
    max_parents: Option<usize>,
) -> (Local, Effort) {
    let mut effort = Effort::default();
    let mut parents = NodeSet::new();

    let mut changed = true;
    while changed {
        changed = false;
        for candidate in prefix.difference(&parents).iter() {
            if full(&parents, max_parents) {
                break;
            }
            effort.tests += 1;
            if !oracle.is_independent(candidate, node, &parents) {
                parents.insert(candidate);
                changed = true;
            }
        }
    }

    for parent in parents.to_vec() {
        let others = parents.without(parent);
        effort.tests += 1;
        if oracle.is_independent(parent, node, &others) {
            parents.remove(parent);
        }
    }

    let score = -(parents.len() as f64);
    (Local { parents, score }, effort)
}
