// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Fast adjacency search.
//!
//! Starting from a complete undirected graph (or a supplied initial graph),
//! edges are removed by conditional independence tests at increasing
//! conditioning-set size. At size `d`, an edge `x --- y` is tested against
//! every `d`-subset of the adjacents of `x` (other than `y`), then of `y`.
//! The first separating set found is recorded in the [`SepsetMap`].
//!
//! [`FasType::Stable`] takes the adjacency sets at the start of each depth,
//! so the result does not depend on the order in which pairs are visited.
//! [`FasType::Regular`] uses the adjacencies as they shrink.
//!
//! Knowledge: pairs forbidden in both directions start non-adjacent;
//! required pairs are never removed.
//!
//! ```
//! use causal_search::context::SearchContext;
//! use causal_search::graph::{continuous_variables, Graph};
//! use causal_search::oracle::{DSeparationTest, Oracle};
//! use causal_search::skeleton::Fas;
//!
//! // A -> B -> C
//! let mut dag = Graph::new(continuous_variables(&["A", "B", "C"]));
//! dag.add_directed_edge(0, 1).unwrap();
//! dag.add_directed_edge(1, 2).unwrap();
//! let oracle = Oracle::from(DSeparationTest::new(dag.clone()).unwrap());
//!
//! let mut ctx = SearchContext::new();
//! let (skeleton, sepsets) = Fas::new(&oracle).search(&mut ctx).unwrap();
//! assert!(skeleton.same_skeleton(&dag));
//! assert_eq!(sepsets.get(0, 2).unwrap().to_vec(), vec![1]);
//! ```

mod choose;
mod sepsets;

pub use choose::{subsets_up_to, Combinations};
pub use sepsets::{SepsetMap, SepsetProducer, SepsetSearch};

use crate::context::{Counter, SearchContext};
use crate::error::{Result, SearchError};
use crate::graph::{Endpoint, Graph};
use crate::knowledge::KnowledgeIndex;
use crate::oracle::Oracle;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};
use tracing::debug;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum FasType {
    #[default]
    Regular,
    Stable,
}

#[derive(Debug, Clone)]
pub struct Fas<'a> {
    oracle: &'a Oracle,
    knowledge: KnowledgeIndex,
    initial: Option<Graph>,
    depth: Option<usize>,
    fas_type: FasType,
}

impl<'a> Fas<'a> {
    pub fn new(oracle: &'a Oracle) -> Self {
        Self {
            oracle,
            knowledge: KnowledgeIndex::empty(oracle.num_variables()),
            initial: None,
            depth: None,
            fas_type: FasType::Regular,
        }
    }

    pub fn with_knowledge(mut self, knowledge: KnowledgeIndex) -> Result<Self> {
        if knowledge.num_nodes() != self.oracle.num_variables() {
            return Err(SearchError::config(format!(
                "knowledge covers {} variables, the test has {}",
                knowledge.num_nodes(),
                self.oracle.num_variables()
            )));
        }
        self.knowledge = knowledge;
        Ok(self)
    }

    /// Search only among the adjacencies of `graph`. Its endpoint marks are
    /// ignored.
    pub fn with_initial_graph(mut self, graph: Graph) -> Result<Self> {
        if graph.variables() != self.oracle.variables() {
            return Err(SearchError::config(
                "initial graph must have the same variables as the test",
            ));
        }
        self.initial = Some(graph);
        Ok(self)
    }

    /// Largest conditioning set size; `None` is unlimited.
    pub fn with_depth(mut self, depth: Option<usize>) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_type(mut self, fas_type: FasType) -> Self {
        self.fas_type = fas_type;
        self
    }

    /// The skeleton and the sepsets of every removed edge.
    pub fn search(&self, ctx: &mut SearchContext) -> Result<(Graph, SepsetMap)> {
        let n = self.oracle.num_variables();
        let mut graph = match &self.initial {
            Some(initial) => initial.undirected_copy(),
            None => Graph::complete(self.oracle.variables().to_vec(), Endpoint::Tail),
        };
        for (from, to) in self.knowledge.forbidden_pairs() {
            if self.knowledge.is_forbidden(to, from) && !self.is_required_pair(from, to) {
                graph.remove_edge(from, to);
            }
        }

        let mut sepsets = SepsetMap::new();
        let mut depth = 0;
        loop {
            if self.depth.is_some_and(|max| depth > max) {
                break;
            }
            let snapshot: Option<Vec<Vec<usize>>> = (self.fas_type == FasType::Stable)
                .then(|| (0..n).map(|v| graph.adjacent_nodes(v)).collect());

            for x in 0..n {
                for y in graph.adjacent_nodes(x) {
                    if y < x || self.is_required_pair(x, y) {
                        continue;
                    }
                    self.try_remove(&mut graph, &mut sepsets, snapshot.as_deref(), x, y, depth, ctx);
                }
            }

            let max_degree = (0..n).map(|v| graph.degree(v)).max().unwrap_or(0);
            debug!(depth, edges = graph.num_edges(), "adjacency search depth done");
            ctx.trace(format_args!(
                "Depth {} # Edges = {}",
                depth,
                graph.num_edges()
            ));
            if max_degree <= depth + 1 {
                break;
            }
            depth += 1;
        }
        Ok((graph, sepsets))
    }

    fn is_required_pair(&self, a: usize, b: usize) -> bool {
        self.knowledge.is_required(a, b) || self.knowledge.is_required(b, a)
    }

    #[allow(clippy::too_many_arguments)]
    fn try_remove(
        &self,
        graph: &mut Graph,
        sepsets: &mut SepsetMap,
        snapshot: Option<&[Vec<usize>]>,
        x: usize,
        y: usize,
        depth: usize,
        ctx: &mut SearchContext,
    ) {
        for (u, v) in [(x, y), (y, x)] {
            let adjacent: Vec<usize> = match snapshot {
                Some(adjacency) => adjacency[u].clone(),
                None => graph.adjacent_nodes(u),
            }
            .into_iter()
            .filter(|&w| w != v)
            .collect();
            for subset in Combinations::new(&adjacent, depth) {
                ctx.count(Counter::IndependenceTests);
                if self.oracle.is_independent(x, y, &subset) {
                    if ctx.is_verbose() {
                        let names = self.oracle.variables();
                        let given: Vec<&str> = subset.iter().map(|s| names[s].name()).collect();
                        ctx.trace(format_args!(
                            "{} _||_ {} | {:?}",
                            names[x].name(),
                            names[y].name(),
                            given
                        ));
                    }
                    graph.remove_edge(x, y);
                    sepsets.set(x, y, subset);
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::continuous_variables;
    use crate::knowledge::Knowledge;
    use crate::oracle::DSeparationTest;

    /// A -> C <- B, C -> D
    fn dag() -> Graph {
        let mut g = Graph::new(continuous_variables(&["A", "B", "C", "D"]));
        g.add_directed_edge(0, 2).unwrap();
        g.add_directed_edge(1, 2).unwrap();
        g.add_directed_edge(2, 3).unwrap();
        g
    }

    #[test]
    fn test_recovers_skeleton_both_types() {
        let dag = dag();
        let oracle: Oracle = DSeparationTest::new(dag.clone()).unwrap().into();
        for fas_type in [FasType::Regular, FasType::Stable] {
            let mut ctx = SearchContext::new();
            let (skeleton, sepsets) = Fas::new(&oracle).with_type(fas_type).search(&mut ctx).unwrap();
            assert!(skeleton.same_skeleton(&dag), "{fas_type}");
            assert!(sepsets.get(0, 1).unwrap().is_empty());
            assert_eq!(sepsets.get(0, 3).unwrap().to_vec(), vec![2]);
            assert!(ctx.statistics.get(Counter::IndependenceTests) > 0);
        }
    }

    #[test]
    fn test_depth_zero_keeps_conditional_dependencies() {
        let dag = dag();
        let oracle: Oracle = DSeparationTest::new(dag).unwrap().into();
        let mut ctx = SearchContext::new();
        let (skeleton, _) = Fas::new(&oracle).with_depth(Some(0)).search(&mut ctx).unwrap();
        assert!(!skeleton.is_adjacent(0, 1));
        // A and D need C to separate them.
        assert!(skeleton.is_adjacent(0, 3));
    }

    #[test]
    fn test_knowledge() {
        let dag = dag();
        let oracle: Oracle = DSeparationTest::new(dag).unwrap().into();
        let mut knowledge = Knowledge::new();
        knowledge.add_required("A", "B").unwrap();
        knowledge.add_forbidden("C", "D").unwrap();
        knowledge.add_forbidden("D", "C").unwrap();
        let index = knowledge.bind(oracle.variables()).unwrap();
        let mut ctx = SearchContext::new();
        let (skeleton, _) = Fas::new(&oracle)
            .with_knowledge(index)
            .unwrap()
            .search(&mut ctx)
            .unwrap();
        assert!(skeleton.is_adjacent(0, 1));
        assert!(!skeleton.is_adjacent(2, 3));
    }

    #[test]
    fn test_initial_graph_limits_adjacencies() {
        let dag = dag();
        let oracle: Oracle = DSeparationTest::new(dag.clone()).unwrap().into();
        let mut initial = dag.undirected_copy();
        initial.remove_edge(2, 3);
        let mut ctx = SearchContext::new();
        let (skeleton, _) = Fas::new(&oracle)
            .with_initial_graph(initial)
            .unwrap()
            .search(&mut ctx)
            .unwrap();
        assert_eq!(skeleton.num_edges(), 2);
    }
}
