// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Composed searches.
//!
//! | search | pipeline | output |
//! |---|---|---|
//! | [`PcAll`] | adjacency search, collider orientation, Meek rules, optional Markov loop | CPDAG |
//! | [`Fci`] | adjacency search, FCI rules over the sepsets | PAG |
//! | [`Bfci`] | order search, collider re-examination by swaps, FCI rules | PAG |
//!
//! ```
//! use causal_search::algorithms::Fci;
//! use causal_search::config::SearchParameters;
//! use causal_search::context::SearchContext;
//! use causal_search::graph::{continuous_variables, Graph};
//! use causal_search::oracle::{DSeparationTest, Oracle};
//!
//! // A -> C <- B
//! let mut dag = Graph::new(continuous_variables(&["A", "B", "C"]));
//! dag.add_directed_edge(0, 2).unwrap();
//! dag.add_directed_edge(1, 2).unwrap();
//! let oracle = Oracle::from(DSeparationTest::new(dag).unwrap());
//!
//! let pag = Fci::new(&oracle, &SearchParameters::default())
//!     .unwrap()
//!     .search(&mut SearchContext::new())
//!     .unwrap();
//! assert!(pag.is_pag());
//! assert!(pag.has_edge_str("A o-> C"));
//! ```

mod bfci;
mod fci;
mod pc_all;

pub use bfci::Bfci;
pub use fci::Fci;
pub use pc_all::{PcAll, MAX_MARKOV_ROUNDS};
