// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! FCI without the possible-d-separation step: adjacency search, then R0
//! and the final orientation over the recorded sepsets.

use crate::config::{bound_to_limit, SearchParameters};
use crate::context::SearchContext;
use crate::error::Result;
use crate::graph::Graph;
use crate::knowledge::{Knowledge, KnowledgeIndex};
use crate::oracle::Oracle;
use crate::orient::FciOrient;
use crate::skeleton::{Fas, FasType};
use tracing::info;

#[derive(Debug, Clone)]
pub struct Fci<'a> {
    oracle: &'a Oracle,
    knowledge: KnowledgeIndex,
    fas_type: FasType,
    params: SearchParameters,
}

impl<'a> Fci<'a> {
    pub fn new(oracle: &'a Oracle, params: &SearchParameters) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            oracle,
            knowledge: KnowledgeIndex::empty(oracle.num_variables()),
            fas_type: FasType::Stable,
            params: params.clone(),
        })
    }

    pub fn with_knowledge(mut self, knowledge: &Knowledge) -> Result<Self> {
        self.knowledge = knowledge.bind(self.oracle.variables())?;
        Ok(self)
    }

    pub fn with_fas_type(mut self, fas_type: FasType) -> Self {
        self.fas_type = fas_type;
        self
    }

    pub fn search(&self, ctx: &mut SearchContext) -> Result<Graph> {
        if self.params.verbose {
            ctx.set_verbose(true);
        }
        let (mut graph, sepsets) = Fas::new(self.oracle)
            .with_knowledge(self.knowledge.clone())?
            .with_depth(bound_to_limit(self.params.depth))
            .with_type(self.fas_type)
            .search(ctx)?;
        info!(edges = graph.num_edges(), "FCI adjacency search done");

        FciOrient::new(sepsets, self.knowledge.clone())
            .with_complete_rule_set(self.params.complete_rule_set_used)
            .with_max_path_length(bound_to_limit(self.params.max_path_length))
            .orient(&mut graph, ctx)?;
        graph.set_pag(true);
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::continuous_variables;
    use crate::oracle::DSeparationTest;

    #[test]
    fn test_latent_confounder_is_bidirected() {
        // A -> B <- L -> C <- D with L hidden.
        let mut dag = Graph::new(continuous_variables(&["A", "B", "L", "C", "D"]));
        dag.add_directed_edge(0, 1).unwrap();
        dag.add_directed_edge(2, 1).unwrap();
        dag.add_directed_edge(2, 3).unwrap();
        dag.add_directed_edge(4, 3).unwrap();
        let oracle: Oracle = DSeparationTest::with_observed(dag, &["A", "B", "C", "D"])
            .unwrap()
            .into();
        let fci = Fci::new(&oracle, &SearchParameters::default()).unwrap();
        let pag = fci.search(&mut SearchContext::new()).unwrap();
        assert!(pag.is_pag());
        assert_eq!(pag.num_edges(), 3);
        assert!(pag.has_edge_str("A o-> B"));
        assert!(pag.has_edge_str("B <-> C"));
        assert!(pag.has_edge_str("C <-o D"));
    }

    #[test]
    fn test_required_edge_is_kept() {
        let mut dag = Graph::new(continuous_variables(&["A", "B", "C"]));
        dag.add_directed_edge(0, 1).unwrap();
        dag.add_directed_edge(1, 2).unwrap();
        let oracle: Oracle = DSeparationTest::new(dag).unwrap().into();
        let mut knowledge = Knowledge::new();
        knowledge.add_required("A", "B").unwrap();
        let pag = Fci::new(&oracle, &SearchParameters::default())
            .unwrap()
            .with_knowledge(&knowledge)
            .unwrap()
            .search(&mut SearchContext::new())
            .unwrap();
        assert!(pag.has_edge_str("A --> B"));
        assert!(pag.has_edge_str("B --> C"));
    }
}
