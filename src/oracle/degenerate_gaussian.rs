// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Degenerate-Gaussian likelihood-ratio test.
//!
//! Discrete variables are embedded as indicator columns (one per observed
//! level, minus the highest observed level to avoid collinearity); continuous
//! variables keep their single column. All likelihoods are then Gaussian over
//! the covariance of the embedded matrix.
//!
//! For a variable `i` with embedded columns `A_i` and a conditioning set with
//! embedded columns `B`:
//!
//! ```text
//! lik(i | B) = n (ln|Σ_B| - ln|Σ_{A_i ∪ B}| - ln(2πe) |A_i|)
//! dof(i | B) = (|A_i ∪ B| (|A_i ∪ B| + 1) - |B| (|B| + 1)) / 2
//! ```
//!
//! The test is run in both directions (`y` given `x ∪ z` against `y` given
//! `z`, and symmetrically for `x`) and the smaller p-value is kept.

use crate::data::{sample_covariance, DataSet};
use crate::error::{Result, SearchError};
use crate::graph::{NodeSet, Variable};
use crate::oracle::linalg::{chi_square_sf, log_det, select, LN_2PI_E};
use crate::oracle::{check_alpha, TestResult};
use nalgebra::DMatrix;

#[derive(Debug, Clone)]
pub struct DegenerateGaussianTest {
    variables: Vec<Variable>,
    /// Covariance of the embedded data.
    covariance: DMatrix<f64>,
    /// Embedded column indices of each original variable.
    embedding: Vec<Vec<usize>>,
    sample_size: usize,
    alpha: f64,
}

impl DegenerateGaussianTest {
    pub fn new(data: &DataSet, alpha: f64) -> Result<Self> {
        check_alpha(alpha)?;
        let n = data.num_rows();
        if n < 2 {
            return Err(SearchError::config(
                "the degenerate Gaussian test needs at least two rows",
            ));
        }
        let mut columns: Vec<Vec<f64>> = Vec::new();
        let mut embedding = Vec::with_capacity(data.num_columns());
        for j in 0..data.num_columns() {
            let mut indices = Vec::new();
            if data.is_discrete(j) {
                let mut levels: Vec<usize> = (0..n).map(|r| data.code(r, j)).collect();
                levels.sort_unstable();
                levels.dedup();
                levels.pop();
                for level in levels {
                    indices.push(columns.len());
                    columns.push(
                        (0..n)
                            .map(|r| if data.code(r, j) == level { 1.0 } else { 0.0 })
                            .collect(),
                    );
                }
            } else {
                indices.push(columns.len());
                columns.push((0..n).map(|r| data.value(r, j)).collect());
            }
            embedding.push(indices);
        }
        let embedded = DMatrix::from_fn(n, columns.len(), |r, c| columns[c][r]);
        let covariance = sample_covariance(&embedded)?;
        Ok(Self {
            variables: data.variables().to_vec(),
            covariance,
            embedding,
            sample_size: n,
            alpha,
        })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// Number of embedded columns for a variable.
    pub fn embedded_width(&self, variable: usize) -> usize {
        self.embedding[variable].len()
    }

    fn embed(&self, set: &NodeSet) -> Vec<usize> {
        set.iter()
            .flat_map(|v| self.embedding[v].iter().copied())
            .collect()
    }

    /// `(lik, dof)` of `variable` given `conditioning`; `lik` is NaN or
    /// infinite when a covariance block is singular.
    fn likelihood(&self, variable: usize, conditioning: &NodeSet) -> (f64, i64) {
        let b = self.embed(conditioning);
        let mut a = self.embedding[variable].clone();
        a.extend(b.iter().copied());
        let ldet = |cols: &[usize]| {
            log_det(&select(&self.covariance, cols, cols)).unwrap_or(f64::NAN)
        };
        let n = self.sample_size as f64;
        let width = self.embedding[variable].len() as f64;
        let lik = n * (ldet(&b) - ldet(&a) - LN_2PI_E * width);
        let (la, lb) = (a.len() as i64, b.len() as i64);
        let dof = (la * (la + 1) - lb * (lb + 1)) / 2;
        (lik, dof)
    }

    /// One direction of the test: does adding `x` to `z` explain `y`?
    fn directed_p_value(&self, x: usize, y: usize, z: &NodeSet) -> Option<(f64, f64)> {
        let (with_x, dof_with) = self.likelihood(y, &z.with(x));
        let (without_x, dof_without) = self.likelihood(y, z);
        let statistic = with_x - without_x;
        if !statistic.is_finite() {
            return None;
        }
        let dof = (dof_with - dof_without).max(1);
        Some((chi_square_sf(statistic, dof as f64), statistic))
    }

    pub fn test(&self, x: usize, y: usize, z: &NodeSet) -> TestResult {
        let forward = self.directed_p_value(x, y, z);
        let backward = self.directed_p_value(y, x, z);
        let (Some((p0, s0)), Some((p1, s1))) = (forward, backward) else {
            return TestResult::fail_open("degenerate Gaussian", "non-finite likelihood");
        };
        if p0 <= p1 {
            TestResult::from_p_value(p0, s0, self.alpha)
        } else {
            TestResult::from_p_value(p1, s1, self.alpha)
        }
    }
}
