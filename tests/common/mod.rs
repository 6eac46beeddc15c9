// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use causal_search::data::{CovarianceMatrix, DataSet, LinearSemSimulation};
use causal_search::graph::{continuous_variables, Graph};
use causal_search::oracle::{DSeparationTest, Oracle, SemBicScore};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// `names[0] -> names[1] -> ... -> names[n-1]`.
pub fn chain(names: &[&str]) -> Graph {
    let mut dag = Graph::new(continuous_variables(names));
    for i in 1..names.len() {
        dag.add_directed_edge(i - 1, i).unwrap();
    }
    dag
}

/// A graph over `names` with the given directed edges, by name.
pub fn dag(names: &[&str], edges: &[(&str, &str)]) -> Graph {
    let mut dag = Graph::new(continuous_variables(names));
    for (from, to) in edges {
        let from = dag.index_of(from).unwrap();
        let to = dag.index_of(to).unwrap();
        dag.add_directed_edge(from, to).unwrap();
    }
    dag
}

pub fn dsep(dag: &Graph) -> Oracle {
    DSeparationTest::new(dag.clone()).unwrap().into()
}

/// Unit-coefficient, unit-noise data from `dag`.
pub fn simulate(dag: &Graph, sample_size: usize, seed: u64) -> DataSet {
    let mut rng = StdRng::seed_from_u64(seed);
    LinearSemSimulation::new(dag.clone())
        .unwrap()
        .simulate(sample_size, &mut rng)
        .unwrap()
}

pub fn sem_bic(data: &DataSet) -> Oracle {
    SemBicScore::new(CovarianceMatrix::from_data(data).unwrap()).into()
}

/// Unordered adjacencies as sorted `(low, high)` pairs.
pub fn skeleton(graph: &Graph) -> Vec<(usize, usize)> {
    let mut pairs: Vec<(usize, usize)> = graph
        .edges()
        .iter()
        .map(|e| (e.node1.min(e.node2), e.node1.max(e.node2)))
        .collect();
    pairs.sort_unstable();
    pairs
}
