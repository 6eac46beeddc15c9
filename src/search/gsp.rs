// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Greedy Sparsest Permutation.
//!
//! A depth-first walk over covered-edge reversals. Reversing a covered edge
//! never changes the Markov equivalence class, so moves that keep the score
//! are explored (up to the depth bound) in the hope that they lead to a move
//! that improves it. Each edge is used at most once along a path.

use crate::context::SearchContext;
use crate::error::Result;
use crate::knowledge::KnowledgeIndex;
use crate::scorer::PermutationScorer;
use std::collections::BTreeSet;
use tracing::debug;

pub(crate) fn gsp(
    scorer: &mut PermutationScorer<'_>,
    knowledge: &KnowledgeIndex,
    depth: Option<usize>,
    ctx: &mut SearchContext,
) -> Result<()> {
    let limit = depth.unwrap_or(usize::MAX);
    loop {
        let s0 = scorer.score();
        let start = scorer.order().to_vec();
        let mut path = BTreeSet::new();
        let order = visit(scorer, knowledge, &start, &mut path, limit)?;
        scorer.evaluate(&order)?;
        ctx.trace(format_args!(
            "# Edges = {} Score = {} (GSP)",
            scorer.num_edges(),
            scorer.score()
        ));
        if scorer.score() <= s0 {
            break;
        }
    }
    Ok(())
}

/// Best order reachable from `order` by covered-edge reversals not already
/// on `path`.
fn visit(
    scorer: &mut PermutationScorer<'_>,
    knowledge: &KnowledgeIndex,
    order: &[usize],
    path: &mut BTreeSet<(usize, usize)>,
    limit: usize,
) -> Result<Vec<usize>> {
    scorer.evaluate(order)?;
    let mut best_order = order.to_vec();
    let mut best_score = scorer.score();

    let mut edges = Vec::new();
    for (i, &x) in order.iter().enumerate() {
        for &y in &order[i + 1..] {
            if scorer.adjacent(x, y) {
                edges.push((x.min(y), x.max(y)));
            }
        }
    }

    for edge in edges {
        if path.contains(&edge) {
            continue;
        }
        scorer.evaluate(order)?;
        let (x, y) = edge;
        if !scorer.covered(x, y) {
            continue;
        }
        flip(scorer, x, y);
        if scorer.score() >= best_score && path.len() < limit {
            path.insert(edge);
            let here = scorer.order().to_vec();
            let reached = visit(scorer, knowledge, &here, path, limit)?;
            path.remove(&edge);

            scorer.evaluate(&reached)?;
            if scorer.score() > best_score && knowledge.satisfies(&reached) {
                debug!(score = scorer.score(), depth = path.len(), "covered reversal improved score");
                best_score = scorer.score();
                best_order = reached;
            }
        }
    }
    Ok(best_order)
}

/// Reverse the edge between `x` and `y` by moving the child to the parent's
/// index.
fn flip(scorer: &mut PermutationScorer<'_>, x: usize, y: usize) {
    if scorer.parents(x).contains(y) {
        scorer.move_to(x, scorer.index_of(y));
    } else if scorer.parents(y).contains(x) {
        scorer.move_to(y, scorer.index_of(x));
    }
}
