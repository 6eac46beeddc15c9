// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Error types for causal search.
//!
//! Errors fall into three families:
//! - **Configuration**: invalid or contradictory parameters, detected at setup
//!   before any search work starts.
//! - **Numerical**: degenerate inputs that make a score or test meaningless
//!   (for example a covariance matrix built from too few rows).
//! - **Unsupported**: an operation that a particular oracle or search variant
//!   does not provide.
//!
//! Numerical problems *inside* a single independence test are not surfaced as
//! errors. The test reports independence instead (see [`crate::oracle`]).

use thiserror::Error;

/// Errors raised by structural graph operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// An edge from a node to itself was requested.
    #[error("self-loop on node {0}")]
    SelfLoop(usize),

    /// The two nodes already share an edge.
    #[error("nodes {0} and {1} are already adjacent")]
    AlreadyAdjacent(usize, usize),

    /// A node index outside the graph was referenced.
    #[error("node index {index} out of range (graph has {len} nodes)")]
    UnknownNode {
        /// The offending index.
        index: usize,
        /// Number of nodes in the graph.
        len: usize,
    },
}

/// Errors raised by searches, scores and tests.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    /// Invalid or contradictory parameter.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Degenerate numerical input.
    #[error("numerical error: {0}")]
    Numerical(String),

    /// The operation is not implemented for this variant.
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// A variable name did not resolve.
    #[error("unknown variable: {0}")]
    UnknownVariable(String),

    /// An order was not a permutation of the scorer's variables.
    #[error("invalid order: expected a permutation of {expected} variables, {reason}")]
    InvalidOrder {
        /// Number of variables the scorer knows about.
        expected: usize,
        /// What was wrong with the order.
        reason: String,
    },

    /// Structural graph misuse.
    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl SearchError {
    /// Shorthand for a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        SearchError::Configuration(message.into())
    }

    /// Shorthand for a numerical error.
    pub fn numerical(message: impl Into<String>) -> Self {
        SearchError::Numerical(message.into())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SearchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = SearchError::config("depth must be >= -1");
        assert_eq!(err.to_string(), "configuration error: depth must be >= -1");

        let err: SearchError = GraphError::SelfLoop(3).into();
        assert_eq!(err.to_string(), "self-loop on node 3");
    }

    #[test]
    fn test_invalid_order_message() {
        let err = SearchError::InvalidOrder {
            expected: 4,
            reason: "variable 2 appears twice".to_string(),
        };
        assert!(err.to_string().contains("permutation of 4 variables"));
    }
}
