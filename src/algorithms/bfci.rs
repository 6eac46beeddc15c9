// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! BOSS-FCI.
//!
//! 1. An order search gives a best order and its CPDAG.
//! 2. The CPDAG's adjacencies become a circle graph; knowledge is applied and
//!    the CPDAG's unshielded colliders are copied over.
//! 3. Each collider `a --> b <-- c` is re-examined with the scorer: if some
//!    `d` adjacent to `b` and `c` makes the configuration reappear, as
//!    `d --> c <-- b`, after swapping `b` and `c` at equal score, the edge
//!    `b - d` is taken to be induced by a latent and removed, and `c`
//!    becomes a collider between `b` and `d`.
//! 4. The FCI final orientation runs with sepsets searched among the
//!    CPDAG's adjacencies.

use crate::config::{bound_to_limit, SearchParameters};
use crate::context::SearchContext;
use crate::error::{Result, SearchError};
use crate::graph::{Endpoint, Graph};
use crate::knowledge::Knowledge;
use crate::oracle::Oracle;
use crate::orient::{fci_orient_bk, FciOrient};
use crate::scorer::PermutationScorer;
use crate::search::OrderSearch;
use crate::skeleton::SepsetSearch;
use tracing::{debug, info};

/// Bookmark key for the swap test.
const SWAP: usize = 2;

/// Scores closer than this are equal.
const SCORE_TOLERANCE: f64 = 1e-8;

#[derive(Debug, Clone)]
pub struct Bfci<'a> {
    score: &'a Oracle,
    test: &'a Oracle,
    knowledge: Knowledge,
    params: SearchParameters,
}

impl<'a> Bfci<'a> {
    /// `oracle` drives both the order search and the sepset search.
    pub fn new(oracle: &'a Oracle, params: &SearchParameters) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            score: oracle,
            test: oracle,
            knowledge: Knowledge::new(),
            params: params.clone(),
        })
    }

    /// Use a separate oracle for sepsets. It must cover the same variables.
    pub fn with_test(mut self, test: &'a Oracle) -> Result<Self> {
        if test.variables() != self.score.variables() {
            return Err(SearchError::config(
                "the test and the score must have the same variables",
            ));
        }
        self.test = test;
        Ok(self)
    }

    pub fn with_knowledge(mut self, knowledge: Knowledge) -> Self {
        self.knowledge = knowledge;
        self
    }

    /// The PAG.
    pub fn search(&self, ctx: &mut SearchContext) -> Result<Graph> {
        if self.params.verbose {
            ctx.set_verbose(true);
        }
        let search = OrderSearch::new(self.score, &self.params)?.with_knowledge(&self.knowledge)?;
        let knowledge = search.knowledge().clone();
        let best = search.best_order(ctx)?;
        let perm = best.order().to_vec();
        let cpdag = search.graph(&best, true);
        info!(edges = cpdag.num_edges(), "BFCI order search done");

        let mut graph = cpdag.clone();
        graph.reorient_all_with(Endpoint::Circle);
        fci_orient_bk(&knowledge, &mut graph);
        copy_colliders(&cpdag, &mut graph, &perm);

        let mut scorer = PermutationScorer::new(self.score);
        scorer.set_caching(self.params.caching_scores);
        scorer.set_max_parents(bound_to_limit(self.params.depth));
        scorer.evaluate(&perm)?;
        let triples = latent_triples(&mut scorer, &perm)?;
        debug!(triples = triples.len(), "collider re-examination done");

        for &(b, _, d) in &triples {
            graph.remove_edge(b, d);
        }
        for &(b, c, d) in &triples {
            if graph.is_adjacent(b, c) && graph.is_adjacent(d, c) {
                graph.set_endpoint(b, c, Endpoint::Arrow);
                graph.set_endpoint(d, c, Endpoint::Arrow);
                ctx.trace(format_args!(
                    "Removed {} --- {}; collider at {}",
                    graph.name(b),
                    graph.name(d),
                    graph.name(c)
                ));
            }
        }

        let sepsets = SepsetSearch::new(cpdag, self.test, bound_to_limit(self.params.max_degree));
        FciOrient::new(sepsets, knowledge)
            .with_complete_rule_set(self.params.complete_rule_set_used)
            .with_max_path_length(bound_to_limit(self.params.max_path_length))
            .do_final_orientation(&mut graph, ctx)?;

        graph.set_pag(true);
        graph.remove_attribute("BIC");
        Ok(graph)
    }
}

/// Copy the unshielded colliders of `cpdag` onto the circle graph, visiting
/// middle nodes in `perm` order.
fn copy_colliders(cpdag: &Graph, graph: &mut Graph, perm: &[usize]) {
    for &b in perm {
        let adjacent = graph.adjacent_nodes(b);
        for (i, &a) in adjacent.iter().enumerate() {
            for &c in &adjacent[i + 1..] {
                if !graph.is_adjacent(a, c) && cpdag.is_def_collider(a, b, c) {
                    graph.set_endpoint(a, b, Endpoint::Arrow);
                    graph.set_endpoint(c, b, Endpoint::Arrow);
                }
            }
        }
    }
}

/// `a --> b <-- c` with `a, c` not adjacent, and `d` adjacent to `b` and `c`.
fn configuration(scorer: &PermutationScorer<'_>, a: usize, b: usize, c: usize, d: usize) -> bool {
    let nodes = [a, b, c, d];
    let distinct = (0..4).all(|i| (i + 1..4).all(|j| nodes[i] != nodes[j]));
    distinct
        && scorer.adjacent(a, b)
        && scorer.adjacent(b, c)
        && scorer.adjacent(c, d)
        && scorer.adjacent(b, d)
        && !scorer.adjacent(a, c)
        && scorer.collider(a, b, c)
}

/// Triples `(b, c, d)` whose edge `b - d` a swap of `b` and `c` explains
/// away at no cost in score.
fn latent_triples(scorer: &mut PermutationScorer<'_>, perm: &[usize]) -> Result<Vec<(usize, usize, usize)>> {
    let mut triples = Vec::new();
    for &b in perm {
        let into = scorer.parents(b).to_vec();
        for &a in &into {
            for &c in &into {
                for &d in perm {
                    if !configuration(scorer, a, b, c, d) {
                        continue;
                    }
                    scorer.bookmark(SWAP);
                    let score = scorer.score();
                    scorer.swap(b, c);
                    if configuration(scorer, d, c, b, a)
                        && (score - scorer.score()).abs() < SCORE_TOLERANCE
                    {
                        triples.push((b, c, d));
                    }
                    scorer.restore_bookmark(SWAP)?;
                }
            }
        }
    }
    scorer.clear_bookmark(SWAP);
    Ok(triples)
}
