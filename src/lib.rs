// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Causal structure search over observational data.
//!
//! Two families of search share one graph model and one oracle:
//!
//! - **Order search** (BOSS, GSP, SP, ESP and simpler moves) looks for a
//!   causal order whose implied DAG scores best, using an incremental
//!   [`PermutationScorer`](scorer::PermutationScorer).
//! - **Constraint search** (PC, FCI) removes edges by conditional
//!   independence and orients what is left, into a CPDAG or a PAG.
//!
//! BOSS-FCI ([`algorithms::Bfci`]) combines the two.
//!
//! # Architecture
//!
//! ## Inputs
//!
//! - [`data`]: typed tabular data and covariance matrices.
//! - [`oracle`]: the closed set of scores and independence tests, behind a
//!   single [`Oracle`](oracle::Oracle) enum.
//! - [`knowledge`]: required and forbidden edges.
//! - [`config`]: [`SearchParameters`](config::SearchParameters).
//!
//! ## Search state
//!
//! - [`trail`]: the undo log behind the scorer's bookmarks.
//! - [`scorer`]: orders, cached parent sets and local scores.
//! - [`search`]: the order-search methods.
//! - [`skeleton`]: adjacency search and sepsets.
//!
//! ## Orientation
//!
//! - [`graph`]: endpoint-marked graphs covering DAGs, CPDAGs and PAGs.
//! - [`engine`]: runs orientation rules to a fixed point.
//! - [`orient`]: knowledge, colliders, Meek rules and the FCI rules.
//! - [`algorithms`]: the composed searches.
//!
//! Every search takes a [`SearchContext`], which carries the verbose trace
//! sink and the run statistics. Scores are oriented so that higher is
//! better throughout.
//!
//! # References
//!
//! - Andrews, B., Ramsey, J., Sanchez-Romero, R., Camchong, J., Kummerfeld, E.
//!   (2023). "Fast scalable and accurate discovery of DAGs using the best
//!   order score search and grow-shrink trees."
//! - Zhang, J. (2008). "On the completeness of orientation rules for causal
//!   discovery in the presence of latent confounders and selection bias."

pub mod algorithms;
pub mod config;
pub mod context;
pub mod data;
pub mod engine;
pub mod error;
pub mod graph;
pub mod knowledge;
pub mod oracle;
pub mod orient;
pub mod scorer;
pub mod search;
pub mod skeleton;
pub mod trail;

// Re-export commonly used types
pub use config::SearchParameters;
pub use context::SearchContext;
pub use engine::{Rule, RuleEngine, RuleResult};
pub use error::{Result, SearchError};
pub use graph::Graph;
pub use trail::Trail;
