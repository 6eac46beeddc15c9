// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Exhaustive and transposition-based order search.
//!
//! [`sp`] scores every permutation and keeps the first best one in
//! lexicographic order of positions. It is exact, and only usable for small
//! problems. [`esp`] walks adjacent transpositions, following any that
//! improves the score.

use crate::error::{Result, SearchError};
use crate::knowledge::KnowledgeIndex;
use crate::scorer::PermutationScorer;
use tracing::debug;

/// Largest variable count accepted by [`sp`]. 9! is about 360 000 orders.
pub const MAX_SP_VARIABLES: usize = 9;

pub(crate) fn sp(scorer: &mut PermutationScorer<'_>, knowledge: &KnowledgeIndex) -> Result<()> {
    let n = scorer.size();
    if n > MAX_SP_VARIABLES {
        return Err(SearchError::config(format!(
            "SP enumerates every order and is limited to {MAX_SP_VARIABLES} variables, got {n}"
        )));
    }
    let base = scorer.order().to_vec();
    let mut indices: Vec<usize> = (0..n).collect();
    let mut best: Option<(f64, Vec<usize>)> = None;
    let mut visited = 0u64;
    loop {
        let order: Vec<usize> = indices.iter().map(|&i| base[i]).collect();
        if knowledge.satisfies(&order) {
            scorer.evaluate(&order)?;
            visited += 1;
            let score = scorer.score();
            if best.as_ref().map_or(true, |(b, _)| score > *b) {
                best = Some((score, order));
            }
        }
        if !next_permutation(&mut indices) {
            break;
        }
    }
    debug!(visited, "exhaustive search done");
    if let Some((_, order)) = best {
        scorer.evaluate(&order)?;
    }
    Ok(())
}

/// Advance to the next permutation in lexicographic order. False (leaving
/// the slice sorted) after the last one.
fn next_permutation(items: &mut [usize]) -> bool {
    let n = items.len();
    if n < 2 {
        return false;
    }
    let Some(i) = (0..n - 1).rev().find(|&i| items[i] < items[i + 1]) else {
        items.reverse();
        return false;
    };
    let j = (i + 1..n)
        .rev()
        .find(|&j| items[j] > items[i])
        .unwrap_or(i + 1);
    items.swap(i, j);
    items[i + 1..].reverse();
    true
}

pub(crate) fn esp(scorer: &mut PermutationScorer<'_>, knowledge: &KnowledgeIndex) -> Result<()> {
    loop {
        let s0 = scorer.score();
        let start = scorer.order().to_vec();
        let (order, score) = esp_visit(scorer, knowledge, start)?;
        scorer.evaluate(&order)?;
        debug!(score, "transposition pass done");
        if score <= s0 {
            break;
        }
    }
    Ok(())
}

fn esp_visit(
    scorer: &mut PermutationScorer<'_>,
    knowledge: &KnowledgeIndex,
    order: Vec<usize>,
) -> Result<(Vec<usize>, f64)> {
    scorer.evaluate(&order)?;
    let mut best = (order.clone(), scorer.score());
    for i in 1..order.len() {
        scorer.evaluate(&order)?;
        scorer.swap(order[i - 1], order[i]);
        if scorer.score() > best.1 && knowledge.satisfies(scorer.order()) {
            let here = scorer.order().to_vec();
            best = esp_visit(scorer, knowledge, here)?;
        }
    }
    Ok(best)
}
