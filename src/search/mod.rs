// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Order search.
//!
//! Every method searches over causal orders with a [`PermutationScorer`] and
//! stops at a local optimum of the total score (higher is better). None of
//! them guarantees the global optimum except [`Method::Sp`], which tries
//! every order and is only feasible for a handful of variables.
//!
//! | method | moves |
//! |---|---|
//! | `BOSS` | best single relocation of each variable, then triangle swaps |
//! | `GSP` | covered-edge reversals, depth-first with path tracking |
//! | `SP` | exhaustive |
//! | `ESP` | adjacent transpositions, recursively on improvement |
//! | `PROMOTION` | move each variable left, accepting ties |
//! | `ALL_INDICES` | try each variable at every index |
//!
//! With `num_starts > 1` the search restarts from shuffled orders and keeps
//! the best result. Knowledge is honoured throughout: starting orders are made
//! consistent with it and no move that breaks it is accepted.
//!
//! ```
//! use causal_search::config::SearchParameters;
//! use causal_search::context::SearchContext;
//! use causal_search::graph::{continuous_variables, Graph};
//! use causal_search::oracle::{DSeparationTest, Oracle};
//! use causal_search::search::OrderSearch;
//!
//! // A -> C <- B
//! let mut dag = Graph::new(continuous_variables(&["A", "B", "C"]));
//! dag.add_directed_edge(0, 2).unwrap();
//! dag.add_directed_edge(1, 2).unwrap();
//! let oracle = Oracle::from(DSeparationTest::new(dag).unwrap());
//!
//! let params = SearchParameters { seed: Some(1), ..Default::default() };
//! let search = OrderSearch::new(&oracle, &params).unwrap();
//! let mut ctx = SearchContext::new();
//! let scorer = search.best_order(&mut ctx).unwrap();
//! assert_eq!(scorer.num_edges(), 2);
//! let cpdag = search.graph(&scorer, true);
//! assert!(cpdag.has_edge_str("A --> C"));
//! assert!(cpdag.has_edge_str("B --> C"));
//! ```

mod boss;
mod exhaustive;
mod gsp;
mod promotion;

use crate::config::{bound_to_limit, SearchParameters};
use crate::context::SearchContext;
use crate::error::Result;
use crate::graph::Graph;
use crate::knowledge::{Knowledge, KnowledgeIndex};
use crate::oracle::Oracle;
use crate::scorer::PermutationScorer;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};
use tracing::{debug, info};

pub use exhaustive::MAX_SP_VARIABLES;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Method {
    Promotion,
    AllIndices,
    Sp,
    Esp,
    Gsp,
    Boss,
}

/// Bookmark keys used by the methods. Callers of the scorer may use any
/// other key.
pub(crate) mod keys {
    pub const BEST: usize = 0;
    pub const CANDIDATE: usize = 1;
}

/// Order search over one oracle.
#[derive(Debug, Clone)]
pub struct OrderSearch<'a> {
    oracle: &'a Oracle,
    knowledge: KnowledgeIndex,
    params: SearchParameters,
}

impl<'a> OrderSearch<'a> {
    /// Validates the parameters.
    pub fn new(oracle: &'a Oracle, params: &SearchParameters) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            oracle,
            knowledge: KnowledgeIndex::empty(oracle.num_variables()),
            params: params.clone(),
        })
    }

    /// Bind knowledge to the oracle's variables. Contradictory required
    /// edges are rejected here, before any search.
    pub fn with_knowledge(mut self, knowledge: &Knowledge) -> Result<Self> {
        let index = knowledge.bind(self.oracle.variables())?;
        let identity: Vec<usize> = (0..self.oracle.num_variables()).collect();
        index.valid_order(&identity)?;
        self.knowledge = index;
        Ok(self)
    }

    pub fn parameters(&self) -> &SearchParameters {
        &self.params
    }

    pub fn knowledge(&self) -> &KnowledgeIndex {
        &self.knowledge
    }

    /// Run the configured method from `num_starts` starting orders and
    /// return the scorer positioned at the best order found.
    pub fn best_order(&self, ctx: &mut SearchContext) -> Result<PermutationScorer<'a>> {
        let mut scorer = PermutationScorer::new(self.oracle);
        scorer.set_caching(self.params.caching_scores);
        scorer.set_max_parents(bound_to_limit(self.params.depth));
        if scorer.size() == 0 {
            return Ok(scorer);
        }
        let mut rng = match self.params.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut best: Option<(f64, Vec<usize>)> = None;
        for start in 0..self.params.num_starts {
            if !(self.params.first_run_use_data_order && start == 0) {
                scorer.shuffle(&mut rng);
            }
            let initial = self.knowledge.valid_order(scorer.order())?;
            scorer.evaluate(&initial)?;
            debug!(start, method = %self.params.method, score = scorer.score(), "starting order search");

            self.run_method(&mut scorer, ctx)?;

            let score = scorer.score();
            ctx.trace(format_args!(
                "Start {} # Edges = {} Score = {}",
                start + 1,
                scorer.num_edges(),
                score
            ));
            if best.as_ref().map_or(true, |(b, _)| score > *b) {
                best = Some((score, scorer.order().to_vec()));
            }
        }

        if let Some((_, order)) = best {
            scorer.evaluate(&order)?;
        }
        info!(
            score = scorer.score(),
            edges = scorer.num_edges(),
            "order search finished"
        );
        ctx.trace(format_args!("Final order = {:?}", self.names(scorer.order())));
        ctx.statistics.merge(scorer.statistics());
        Ok(scorer)
    }

    /// The DAG or CPDAG of the scorer's current order. For a BIC score the
    /// graph carries its total score under the attribute `"BIC"`.
    pub fn graph(&self, scorer: &PermutationScorer<'_>, cpdag: bool) -> Graph {
        let mut graph = scorer.get_graph(cpdag);
        if matches!(self.oracle, Oracle::SemBic(_)) {
            graph.set_attribute("BIC", scorer.score());
        }
        graph
    }

    /// Best order, then its CPDAG.
    pub fn search(&self, ctx: &mut SearchContext) -> Result<Graph> {
        let scorer = self.best_order(ctx)?;
        Ok(self.graph(&scorer, true))
    }

    fn run_method(&self, scorer: &mut PermutationScorer<'_>, ctx: &mut SearchContext) -> Result<()> {
        let knowledge = &self.knowledge;
        match self.params.method {
            Method::Boss => {
                let depth = bound_to_limit(self.params.depth);
                boss::boss(scorer, knowledge, depth, ctx)
            }
            Method::Gsp => gsp::gsp(scorer, knowledge, bound_to_limit(self.params.gsp_depth), ctx),
            Method::Sp => exhaustive::sp(scorer, knowledge),
            Method::Esp => exhaustive::esp(scorer, knowledge),
            Method::Promotion => promotion::promotion(scorer, knowledge),
            Method::AllIndices => promotion::all_indices(scorer, knowledge),
        }
    }

    fn names(&self, order: &[usize]) -> Vec<&str> {
        order
            .iter()
            .map(|&v| self.oracle.variables()[v].name())
            .collect()
    }
}
