// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Graphical independence oracle.
//!
//! Answers `x ⊥ y | z` by d-separation in a known DAG. The DAG may contain
//! latent nodes; the oracle exposes only the observed ones, indexed in the
//! order given at construction.

use crate::error::{Result, SearchError};
use crate::graph::{Graph, NodeSet, Variable};
use crate::oracle::TestResult;

#[derive(Debug, Clone)]
pub struct DSeparationTest {
    dag: Graph,
    /// Graph node of each observed variable.
    observed: Vec<usize>,
    variables: Vec<Variable>,
}

impl DSeparationTest {
    /// Every node of the DAG is observed.
    pub fn new(dag: Graph) -> Result<Self> {
        let names: Vec<String> = dag.variables().iter().map(|v| v.name().to_string()).collect();
        Self::with_observed(dag, &names)
    }

    /// Only the named nodes are observed; the rest are latent.
    pub fn with_observed<S: AsRef<str>>(dag: Graph, observed: &[S]) -> Result<Self> {
        if !dag.is_dag() {
            return Err(SearchError::config(
                "the d-separation oracle needs a directed acyclic graph",
            ));
        }
        let mut indices = Vec::with_capacity(observed.len());
        for name in observed {
            let name = name.as_ref();
            let index = dag
                .index_of(name)
                .ok_or_else(|| SearchError::UnknownVariable(name.to_string()))?;
            indices.push(index);
        }
        let variables = indices.iter().map(|&i| dag.variable(i).clone()).collect();
        Ok(Self {
            dag,
            observed: indices,
            variables,
        })
    }

    pub fn graph(&self) -> &Graph {
        &self.dag
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn is_d_separated(&self, x: usize, y: usize, z: &NodeSet) -> bool {
        let z: NodeSet = z.iter().map(|v| self.observed[v]).collect();
        self.dag.is_m_separated(self.observed[x], self.observed[y], &z)
    }

    pub fn test(&self, x: usize, y: usize, z: &NodeSet) -> TestResult {
        let independent = self.is_d_separated(x, y, z);
        TestResult {
            independent,
            p_value: if independent { 1.0 } else { 0.0 },
            statistic: f64::NAN,
        }
    }
}
