// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Edge orientation.
//!
//! - [`pc_orient_bk`] and [`fci_orient_bk`] apply background knowledge.
//! - [`OrientColliders`] classifies and orients unshielded triples.
//! - [`MeekRules`] completes a pattern.
//! - [`FciOrient`] runs the FCI rules R0-R10 on a partial ancestral graph.
//!
//! ```
//! use causal_search::graph::{continuous_variables, Graph};
//! use causal_search::orient::cpdag_from_dag;
//!
//! // A -> C <- B, C -> D
//! let mut dag = Graph::new(continuous_variables(&["A", "B", "C", "D"]));
//! dag.add_directed_edge(0, 2).unwrap();
//! dag.add_directed_edge(1, 2).unwrap();
//! dag.add_directed_edge(2, 3).unwrap();
//!
//! let cpdag = cpdag_from_dag(&dag);
//! assert!(cpdag.has_edge_str("A --> C"));
//! assert!(cpdag.has_edge_str("C --> D"));
//! ```

mod colliders;
mod discriminating;
mod fci;
mod knowledge;
mod meek;

pub use colliders::{ColliderMethod, ConflictRule, OrientColliders};
pub use discriminating::DiscriminatingPathRule;
pub use fci::{FciOrient, FciRule};
pub use knowledge::{fci_orient_bk, pc_orient_bk};
pub use meek::MeekRules;

use crate::graph::{Endpoint, Graph};
use crate::knowledge::KnowledgeIndex;

/// Put an arrowhead at `to` on the edge `from - to` unless it is there
/// already or the knowledge requires `to -> from`.
pub(crate) fn set_arrowhead(
    graph: &mut Graph,
    knowledge: &KnowledgeIndex,
    from: usize,
    to: usize,
) -> bool {
    if graph.endpoint(from, to) == Some(Endpoint::Arrow) || !knowledge.allows_arrowhead(from, to) {
        return false;
    }
    graph.set_endpoint(from, to, Endpoint::Arrow)
}

/// The Markov equivalence class of a DAG: its skeleton, its unshielded
/// colliders, and every orientation Meek's rules then imply.
pub fn cpdag_from_dag(dag: &Graph) -> Graph {
    let mut cpdag = dag.undirected_copy();
    for b in 0..dag.num_nodes() {
        let parents = dag.parents(b).to_vec();
        for (i, &a) in parents.iter().enumerate() {
            for &c in &parents[i + 1..] {
                if !dag.is_adjacent(a, c) {
                    cpdag.set_directed(a, b);
                    cpdag.set_directed(c, b);
                }
            }
        }
    }
    let knowledge = KnowledgeIndex::empty(dag.num_nodes());
    MeekRules::new(&knowledge).orient_implied(&mut cpdag);
    cpdag
}
