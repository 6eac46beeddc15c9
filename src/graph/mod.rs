// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Graph representation shared by every search.
//!
//! - [`Variable`]: named node with a continuous/discrete tag
//! - [`NodeSet`]: bitset of node indices, used for parent sets and cache keys
//! - [`Endpoint`] and [`Edge`]: per-side edge marks
//! - [`Graph`]: DAG, CPDAG, and PAG in one representation
//! - [`Triple`]: collider / ambiguous / underline judgments

pub mod endpoint;
mod endpoint_graph;
pub mod node_set;
mod paths;
pub mod triple;
pub mod variable;

pub use endpoint_graph::Graph;
pub use endpoint::{Edge, Endpoint};
pub use node_set::NodeSet;
pub use triple::{Triple, TripleType};
pub use variable::{continuous_variables, Variable, VariableKind};
