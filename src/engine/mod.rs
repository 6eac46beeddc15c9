// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Fixed-point rule engine.
//!
//! The engine owns a sequence of [`Rule`]s and applies them to a graph in
//! rounds. Within a round the rules run in order; the engine stops after the
//! first round in which no rule changed the graph, or after `max_rounds`.
//!
//! The graph is borrowed mutably for the whole run, so one stage of an
//! orientation pipeline has exclusive use of it.
//!
//! # Example
//!
//! ```
//! use causal_search::context::SearchContext;
//! use causal_search::engine::{Rule, RuleEngine, RuleResult};
//! use causal_search::error::Result;
//! use causal_search::graph::{continuous_variables, Endpoint, Graph};
//!
//! /// Turns one circle into a tail per application.
//! struct OneTail;
//!
//! impl Rule for OneTail {
//!     fn apply(&mut self, graph: &mut Graph, _ctx: &mut SearchContext) -> Result<RuleResult> {
//!         for edge in graph.edges() {
//!             if edge.endpoint1 == Endpoint::Circle {
//!                 graph.set_endpoint(edge.node2, edge.node1, Endpoint::Tail);
//!                 return Ok(RuleResult::Changed);
//!             }
//!         }
//!         Ok(RuleResult::Unchanged)
//!     }
//!
//!     fn name(&self) -> &str {
//!         "OneTail"
//!     }
//! }
//!
//! let mut graph = Graph::complete(continuous_variables(&["A", "B", "C"]), Endpoint::Circle);
//! let mut ctx = SearchContext::new();
//! let mut engine = RuleEngine::new(vec![Box::new(OneTail)]);
//! let rounds = engine.run(&mut graph, &mut ctx).unwrap();
//! assert_eq!(rounds, 4); // three firings, then a quiet round
//! assert_eq!(engine.statistics(), (4, 3));
//! ```

pub mod rule;

pub use rule::{Rule, RuleResult};

use crate::context::{Counter, SearchContext};
use crate::error::Result;
use crate::graph::Graph;
use tracing::{debug, trace};

/// Runs rules to a fixed point.
pub struct RuleEngine<'a> {
    rules: Vec<Box<dyn Rule + 'a>>,

    /// Upper bound on rounds. `None` runs until quiet.
    max_rounds: Option<usize>,

    /// Statistics: number of rule applications.
    try_count: u64,

    /// Statistics: number of applications that changed the graph.
    fire_count: u64,
}

impl<'a> RuleEngine<'a> {
    pub fn new(rules: Vec<Box<dyn Rule + 'a>>) -> Self {
        Self {
            rules,
            max_rounds: None,
            try_count: 0,
            fire_count: 0,
        }
    }

    /// Stop after `rounds` rounds even if the graph is still changing.
    pub fn with_max_rounds(mut self, rounds: usize) -> Self {
        self.max_rounds = Some(rounds);
        self
    }

    /// Apply the rules until a round changes nothing. Returns the number of
    /// rounds run, including the final quiet one.
    pub fn run(&mut self, graph: &mut Graph, ctx: &mut SearchContext) -> Result<usize> {
        let mut rounds = 0;
        loop {
            if self.max_rounds.is_some_and(|max| rounds >= max) {
                debug!(rounds, "rule engine stopped at round limit");
                break;
            }
            rounds += 1;
            let mut changed = false;
            for rule in self.rules.iter_mut() {
                self.try_count += 1;
                if rule.apply(graph, ctx)?.changed() {
                    self.fire_count += 1;
                    ctx.count(Counter::RuleFirings);
                    trace!(rule = rule.name(), round = rounds, "rule fired");
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
        Ok(rounds)
    }

    /// Get statistics about the runs so far.
    ///
    /// Returns (try_count, fire_count): how many times rules were applied and
    /// how many of those applications changed the graph.
    pub fn statistics(&self) -> (u64, u64) {
        (self.try_count, self.fire_count)
    }
}
