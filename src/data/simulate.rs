// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Linear-Gaussian structural equation simulation over a DAG.
//!
//! Each variable is a weighted sum of its parents plus independent Gaussian
//! noise, generated in topological order.

use crate::data::DataSet;
use crate::error::{Result, SearchError};
use crate::graph::Graph;
use nalgebra::DMatrix;
use rand::distributions::Uniform;
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// A linear SEM with one coefficient per DAG edge and one noise scale per node.
#[derive(Debug, Clone)]
pub struct LinearSemSimulation {
    dag: Graph,
    order: Vec<usize>,
    coefficients: DMatrix<f64>,
    noise_std: Vec<f64>,
}

impl LinearSemSimulation {
    /// Unit coefficients on every edge and unit noise.
    pub fn new(dag: Graph) -> Result<Self> {
        if !dag.is_dag() {
            return Err(SearchError::config("simulation graph must be a DAG"));
        }
        let n = dag.num_nodes();
        let order = dag.topological_order().unwrap_or_default();
        let mut coefficients = DMatrix::zeros(n, n);
        for edge in dag.edges() {
            let (from, to) = if edge.points_towards(edge.node2) {
                (edge.node1, edge.node2)
            } else {
                (edge.node2, edge.node1)
            };
            coefficients[(from, to)] = 1.0;
        }
        Ok(Self {
            dag,
            order,
            coefficients,
            noise_std: vec![1.0; n],
        })
    }

    /// Draw every edge coefficient uniformly from `[low, high]` with a random sign.
    pub fn with_random_coefficients<R: Rng>(mut self, rng: &mut R, low: f64, high: f64) -> Result<Self> {
        if !(low > 0.0 && low <= high) {
            return Err(SearchError::config(format!(
                "coefficient range [{low}, {high}] must be positive and ordered"
            )));
        }
        let magnitude = Uniform::new_inclusive(low, high);
        for (from, to) in self.edge_pairs() {
            let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
            self.coefficients[(from, to)] = sign * magnitude.sample(rng);
        }
        Ok(self)
    }

    fn edge_pairs(&self) -> Vec<(usize, usize)> {
        let n = self.dag.num_nodes();
        (0..n)
            .flat_map(|from| (0..n).map(move |to| (from, to)))
            .filter(|&(from, to)| self.dag.is_parent_of(from, to))
            .collect()
    }

    /// Override one edge coefficient.
    pub fn set_coefficient(&mut self, from: usize, to: usize, value: f64) -> Result<()> {
        if !self.dag.is_parent_of(from, to) {
            return Err(SearchError::config(format!(
                "{} --> {} is not an edge of the simulation graph",
                self.dag.name(from),
                self.dag.name(to)
            )));
        }
        self.coefficients[(from, to)] = value;
        Ok(())
    }

    pub fn set_noise_std(&mut self, node: usize, std: f64) -> Result<()> {
        if !(std > 0.0) {
            return Err(SearchError::config(format!("noise std {std} must be positive")));
        }
        self.noise_std[node] = std;
        Ok(())
    }

    pub fn graph(&self) -> &Graph {
        &self.dag
    }

    /// Draw `sample_size` rows.
    pub fn simulate<R: Rng>(&self, sample_size: usize, rng: &mut R) -> Result<DataSet> {
        let n = self.dag.num_nodes();
        let mut data = DMatrix::zeros(sample_size, n);
        let noise: Vec<Normal<f64>> = self
            .noise_std
            .iter()
            .map(|&s| Normal::new(0.0, s))
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| SearchError::config(format!("bad noise distribution: {e}")))?;
        for row in 0..sample_size {
            for &node in &self.order {
                let mut value = noise[node].sample(rng);
                for parent in self.dag.parents(node).iter() {
                    value += self.coefficients[(parent, node)] * data[(row, parent)];
                }
                data[(row, node)] = value;
            }
        }
        DataSet::new(self.dag.variables().to_vec(), data)
    }
}
