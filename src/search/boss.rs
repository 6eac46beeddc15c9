// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Best Order Score Search.
//!
//! Alternates two phases until neither improves the score:
//!
//! 1. **Single moves.** Each variable in turn is tried at every index, from
//!    the last to the first, and left at the best-scoring index seen (the
//!    first one seen wins ties). Passes repeat while the score improves.
//! 2. **Triangles.** For each adjacent pair `x, y`, the edges to every `z`
//!    forming a triangle with them are reversed by swaps, recursively up to
//!    the configured depth. The first configuration that improves the score
//!    is kept; otherwise the order is put back.

use super::keys;
use crate::context::SearchContext;
use crate::error::Result;
use crate::knowledge::KnowledgeIndex;
use crate::scorer::PermutationScorer;
use std::collections::BTreeSet;
use tracing::debug;

pub(crate) fn boss(
    scorer: &mut PermutationScorer<'_>,
    knowledge: &KnowledgeIndex,
    depth: Option<usize>,
    ctx: &mut SearchContext,
) -> Result<()> {
    ctx.trace(format_args!(
        "# Edges = {} Score = {} (Initial)",
        scorer.num_edges(),
        scorer.score()
    ));
    loop {
        boss_loop(scorer, knowledge, ctx)?;
        let s = scorer.score();
        triangle_loop(scorer, knowledge, depth, ctx)?;
        if scorer.score() <= s {
            break;
        }
    }
    scorer.clear_bookmark(keys::BEST);
    Ok(())
}

/// Single-move passes until a pass no longer improves the score.
pub(crate) fn boss_loop(
    scorer: &mut PermutationScorer<'_>,
    knowledge: &KnowledgeIndex,
    ctx: &mut SearchContext,
) -> Result<()> {
    scorer.bookmark(keys::BEST);
    let mut passes = 0;
    loop {
        let s0 = scorer.score();
        let mut best = f64::NEG_INFINITY;
        for v in scorer.order().to_vec() {
            for i in (0..scorer.size()).rev() {
                scorer.move_to(v, i);
                if scorer.score() > best && knowledge.satisfies(scorer.order()) {
                    best = scorer.score();
                    scorer.bookmark(keys::BEST);
                }
            }
            scorer.restore_bookmark(keys::BEST)?;
        }
        passes += 1;
        if scorer.score() <= s0 {
            break;
        }
    }
    debug!(passes, score = scorer.score(), "single moves converged");
    ctx.trace(format_args!(
        "# Edges = {} Score = {} (Single Moves)",
        scorer.num_edges(),
        scorer.score()
    ));
    Ok(())
}

fn triangle_loop(
    scorer: &mut PermutationScorer<'_>,
    knowledge: &KnowledgeIndex,
    depth: Option<usize>,
    ctx: &mut SearchContext,
) -> Result<()> {
    if depth == Some(0) {
        return Ok(());
    }
    let depth = depth.unwrap_or(usize::MAX);
    let mut path = BTreeSet::new();
    let s = scorer.score();

    for i in (0..scorer.size()).rev() {
        for j in (0..i).rev() {
            let x = scorer.get(i);
            let y = scorer.get(j);
            if !scorer.adjacent(x, y) {
                continue;
            }
            let mut pairs = Vec::new();
            for &z in scorer.order() {
                if scorer.triangle(x, y, z) {
                    pairs.push((x, z));
                    pairs.push((y, z));
                }
            }
            let order = scorer.order().to_vec();
            triangle_visit(scorer, knowledge, &pairs, &mut path, depth)?;
            if scorer.score() > s && knowledge.satisfies(scorer.order()) {
                debug!(score = scorer.score(), "triangle move improved score");
                ctx.trace(format_args!(
                    "# Edges = {} Score = {} (Triangle)",
                    scorer.num_edges(),
                    scorer.score()
                ));
                return Ok(());
            }
            scorer.evaluate(&order)?;
        }
    }
    ctx.trace(format_args!(
        "# Edges = {} Score = {} (Triangle)",
        scorer.num_edges(),
        scorer.score()
    ));
    Ok(())
}

fn triangle_visit(
    scorer: &mut PermutationScorer<'_>,
    knowledge: &KnowledgeIndex,
    pairs: &[(usize, usize)],
    path: &mut BTreeSet<(usize, usize)>,
    depth: usize,
) -> Result<()> {
    if path.len() > depth {
        return Ok(());
    }
    let score = scorer.score();
    let order = scorer.order().to_vec();

    for &pair in pairs {
        if path.contains(&pair) {
            continue;
        }
        scorer.swap(pair.0, pair.1);
        path.insert(pair);
        triangle_visit(scorer, knowledge, pairs, path, depth)?;
        path.remove(&pair);

        if scorer.score() > score && knowledge.satisfies(scorer.order()) {
            return Ok(());
        }
        scorer.evaluate(&order)?;
    }
    Ok(())
}
