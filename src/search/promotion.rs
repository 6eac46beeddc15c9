// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Single-variable relocation searches.
//!
//! Both methods visit each variable in turn and leave it where the score is
//! best, repeating until a full pass brings no strict improvement.
//!
//! - [`promotion`] walks the variable left one position at a time, accepting
//!   ties, so that among equally good positions the earliest wins.
//! - [`all_indices`] starts the variable at index 0 and walks it right,
//!   accepting only strict improvements, so the earliest best index wins.

use super::keys;
use crate::error::Result;
use crate::knowledge::KnowledgeIndex;
use crate::scorer::PermutationScorer;

pub(crate) fn promotion(
    scorer: &mut PermutationScorer<'_>,
    knowledge: &KnowledgeIndex,
) -> Result<()> {
    let mut overall = f64::NEG_INFINITY;
    while scorer.score() > overall {
        overall = scorer.score();
        for v in scorer.order().to_vec() {
            let mut best = scorer.score();
            scorer.bookmark(keys::CANDIDATE);
            loop {
                if scorer.score() >= best && knowledge.satisfies(scorer.order()) {
                    best = scorer.score();
                    scorer.bookmark(keys::CANDIDATE);
                }
                if !scorer.move_left(v) {
                    break;
                }
            }
            scorer.restore_bookmark(keys::CANDIDATE)?;
        }
    }
    scorer.clear_bookmark(keys::CANDIDATE);
    Ok(())
}

pub(crate) fn all_indices(
    scorer: &mut PermutationScorer<'_>,
    knowledge: &KnowledgeIndex,
) -> Result<()> {
    let mut overall = f64::NEG_INFINITY;
    while scorer.score() > overall {
        overall = scorer.score();
        for v in scorer.order().to_vec() {
            // Falls back to the starting position if no index satisfies the
            // knowledge.
            scorer.bookmark(keys::CANDIDATE);
            let mut best: Option<f64> = None;
            scorer.move_to(v, 0);
            loop {
                let improves = best.map_or(true, |b| scorer.score() > b);
                if improves && knowledge.satisfies(scorer.order()) {
                    best = Some(scorer.score());
                    scorer.bookmark(keys::CANDIDATE);
                }
                if !scorer.move_right(v) {
                    break;
                }
            }
            scorer.restore_bookmark(keys::CANDIDATE)?;
        }
    }
    scorer.clear_bookmark(keys::CANDIDATE);
    Ok(())
}
