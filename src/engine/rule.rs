// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Rule trait for fixed-point orientation.
//!
//! A rule inspects the graph and changes some endpoint marks, or leaves the
//! graph alone. Rules never remove edges; the engine relies on that to
//! guarantee termination, since each firing sets at least one mark that no
//! rule in the same run resets.
//!
//! # Example
//!
//! ```
//! use causal_search::context::SearchContext;
//! use causal_search::engine::{Rule, RuleResult};
//! use causal_search::error::Result;
//! use causal_search::graph::{Endpoint, Graph};
//!
//! /// Puts an arrowhead at the higher-numbered end of every `o-o` edge.
//! struct ArrowsUp;
//!
//! impl Rule for ArrowsUp {
//!     fn apply(&mut self, graph: &mut Graph, _ctx: &mut SearchContext) -> Result<RuleResult> {
//!         let mut result = RuleResult::Unchanged;
//!         for edge in graph.edges() {
//!             if edge.endpoint2 == Endpoint::Circle {
//!                 graph.set_endpoint(edge.node1, edge.node2, Endpoint::Arrow);
//!                 result = RuleResult::Changed;
//!             }
//!         }
//!         Ok(result)
//!     }
//!
//!     fn name(&self) -> &str {
//!         "ArrowsUp"
//!     }
//! }
//! ```

use crate::context::SearchContext;
use crate::error::Result;
use crate::graph::Graph;

/// Result of applying a rule once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleResult {
    /// No mark was changed.
    Unchanged,

    /// At least one mark was changed. The engine will run another round.
    Changed,
}

impl RuleResult {
    pub fn changed(self) -> bool {
        self == RuleResult::Changed
    }

    /// `Changed` if either is.
    pub fn or(self, other: RuleResult) -> RuleResult {
        if self.changed() || other.changed() {
            RuleResult::Changed
        } else {
            RuleResult::Unchanged
        }
    }
}

impl From<bool> for RuleResult {
    fn from(changed: bool) -> Self {
        if changed {
            RuleResult::Changed
        } else {
            RuleResult::Unchanged
        }
    }
}

/// An orientation rule.
///
/// Rules hold whatever they need beyond the graph (knowledge, sepsets, an
/// oracle) as borrowed fields, and are applied repeatedly by
/// [`super::RuleEngine`] until none of them changes the graph.
pub trait Rule {
    /// Apply the rule everywhere it matches.
    fn apply(&mut self, graph: &mut Graph, ctx: &mut SearchContext) -> Result<RuleResult>;

    /// Name used in logs and traces.
    fn name(&self) -> &str;
}
