// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

use crate::data::DataSet;
use crate::error::{Result, SearchError};
use crate::graph::Variable;
use nalgebra::DMatrix;

/// A covariance matrix plus the sample size it was estimated from.
#[derive(Debug, Clone)]
pub struct CovarianceMatrix {
    variables: Vec<Variable>,
    matrix: DMatrix<f64>,
    sample_size: usize,
}

impl CovarianceMatrix {
    /// Wrap a precomputed matrix.
    pub fn new(variables: Vec<Variable>, matrix: DMatrix<f64>, sample_size: usize) -> Result<Self> {
        let n = variables.len();
        if matrix.nrows() != n || matrix.ncols() != n {
            return Err(SearchError::config(format!(
                "covariance matrix is {}x{} for {n} variables",
                matrix.nrows(),
                matrix.ncols()
            )));
        }
        if sample_size < 2 {
            return Err(SearchError::numerical(format!(
                "sample size {sample_size} is too small for a covariance matrix"
            )));
        }
        for i in 0..n {
            for j in 0..i {
                let (a, b) = (matrix[(i, j)], matrix[(j, i)]);
                if (a - b).abs() > 1e-9 * (1.0 + a.abs().max(b.abs())) {
                    return Err(SearchError::config(format!(
                        "covariance matrix is not symmetric at ({i}, {j})"
                    )));
                }
            }
        }
        Ok(Self {
            variables,
            matrix,
            sample_size,
        })
    }

    /// Unbiased sample covariance of every column.
    pub fn from_data(data: &DataSet) -> Result<Self> {
        let matrix = sample_covariance(data.matrix())?;
        Self::new(data.variables().to_vec(), matrix, data.num_rows())
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    pub fn dimension(&self) -> usize {
        self.variables.len()
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.matrix[(i, j)]
    }

    /// The submatrix over `rows` × `columns`.
    pub fn submatrix(&self, rows: &[usize], columns: &[usize]) -> DMatrix<f64> {
        DMatrix::from_fn(rows.len(), columns.len(), |r, c| {
            self.matrix[(rows[r], columns[c])]
        })
    }

    /// The correlation matrix with the same variables and sample size.
    pub fn correlation(&self) -> Result<Self> {
        let n = self.dimension();
        let sd: Vec<f64> = (0..n).map(|i| self.matrix[(i, i)].sqrt()).collect();
        if let Some(i) = sd.iter().position(|&s| !(s > 0.0)) {
            return Err(SearchError::numerical(format!(
                "variable {} has zero variance",
                self.variables[i]
            )));
        }
        let matrix = DMatrix::from_fn(n, n, |i, j| self.matrix[(i, j)] / (sd[i] * sd[j]));
        Self::new(self.variables.clone(), matrix, self.sample_size)
    }
}

/// Unbiased (n - 1) sample covariance of the columns of `data`.
pub fn sample_covariance(data: &DMatrix<f64>) -> Result<DMatrix<f64>> {
    let rows = data.nrows();
    if rows < 2 {
        return Err(SearchError::numerical(format!(
            "{rows} rows are too few for a covariance matrix"
        )));
    }
    let means = data.row_mean();
    let centered = DMatrix::from_fn(rows, data.ncols(), |r, c| data[(r, c)] - means[c]);
    Ok(centered.transpose() * &centered / (rows as f64 - 1.0))
}
