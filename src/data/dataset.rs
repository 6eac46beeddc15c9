// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

use crate::error::{Result, SearchError};
use crate::graph::{NodeSet, Variable};
use nalgebra::DMatrix;
use rustc_hash::FxHashMap;

/// Tabular data: rows × named, typed columns.
///
/// Discrete columns hold category codes `0, 1, 2, ...` stored as `f64`.
#[derive(Debug, Clone)]
pub struct DataSet {
    variables: Vec<Variable>,
    data: DMatrix<f64>,
    categories: Vec<Option<usize>>,
}

impl DataSet {
    /// Wrap a data matrix. Values must be finite; discrete columns must hold
    /// non-negative integer codes.
    pub fn new(variables: Vec<Variable>, data: DMatrix<f64>) -> Result<Self> {
        if variables.len() != data.ncols() {
            return Err(SearchError::config(format!(
                "{} variables for {} columns",
                variables.len(),
                data.ncols()
            )));
        }
        if let Some(bad) = data.iter().find(|v| !v.is_finite()) {
            return Err(SearchError::numerical(format!("non-finite data value {bad}")));
        }
        let mut categories = Vec::with_capacity(variables.len());
        for (j, variable) in variables.iter().enumerate() {
            if !variable.is_discrete() {
                categories.push(None);
                continue;
            }
            let column = data.column(j);
            if column.iter().any(|&v| v < 0.0 || v.fract() != 0.0) {
                return Err(SearchError::config(format!(
                    "discrete column {variable} must hold non-negative integer codes"
                )));
            }
            let max = column.iter().fold(0.0_f64, |m, &v| m.max(v));
            categories.push(Some(max as usize + 1));
        }
        Ok(Self {
            variables,
            data,
            categories,
        })
    }

    /// Build from row-major values.
    pub fn from_rows(variables: Vec<Variable>, rows: &[Vec<f64>]) -> Result<Self> {
        let ncols = variables.len();
        if let Some(row) = rows.iter().find(|r| r.len() != ncols) {
            return Err(SearchError::config(format!(
                "row of length {} for {ncols} variables",
                row.len()
            )));
        }
        let data = DMatrix::from_fn(rows.len(), ncols, |r, c| rows[r][c]);
        Self::new(variables, data)
    }

    pub fn num_rows(&self) -> usize {
        self.data.nrows()
    }

    pub fn num_columns(&self) -> usize {
        self.data.ncols()
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.data
    }

    pub fn value(&self, row: usize, column: usize) -> f64 {
        self.data[(row, column)]
    }

    pub fn is_discrete(&self, column: usize) -> bool {
        self.categories[column].is_some()
    }

    /// Category code of a discrete cell.
    pub fn code(&self, row: usize, column: usize) -> usize {
        self.data[(row, column)] as usize
    }

    /// Number of categories of a discrete column (max code + 1).
    pub fn num_categories(&self, column: usize) -> Option<usize> {
        self.categories[column]
    }

    pub fn all_continuous(&self) -> bool {
        self.categories.iter().all(Option::is_none)
    }

    pub fn all_discrete(&self) -> bool {
        self.categories.iter().all(Option::is_some)
    }

    /// Row indices grouped by the category codes of the given discrete
    /// columns, in ascending order of configuration.
    pub fn strata(&self, columns: &NodeSet) -> Vec<Vec<usize>> {
        let columns = columns.to_vec();
        let mut groups: FxHashMap<Vec<usize>, Vec<usize>> = FxHashMap::default();
        for row in 0..self.num_rows() {
            let key: Vec<usize> = columns.iter().map(|&c| self.code(row, c)).collect();
            groups.entry(key).or_default().push(row);
        }
        let mut strata: Vec<(Vec<usize>, Vec<usize>)> = groups.into_iter().collect();
        strata.sort();
        strata.into_iter().map(|(_, rows)| rows).collect()
    }

    /// Column index of a variable name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.variables.iter().position(|v| v.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_and_categories() {
        let vars = vec![Variable::continuous("X"), Variable::discrete("D")];
        let data = DataSet::from_rows(vars, &[vec![0.5, 0.0], vec![1.5, 2.0]]).unwrap();
        assert_eq!(data.num_rows(), 2);
        assert_eq!(data.num_categories(0), None);
        assert_eq!(data.num_categories(1), Some(3));
        assert_eq!(data.code(1, 1), 2);
        assert!(!data.all_continuous());
    }

    #[test]
    fn test_rejects_bad_values() {
        let vars = vec![Variable::continuous("X")];
        assert!(matches!(
            DataSet::from_rows(vars, &[vec![f64::NAN]]),
            Err(SearchError::Numerical(_))
        ));
        let vars = vec![Variable::discrete("D")];
        assert!(matches!(
            DataSet::from_rows(vars, &[vec![0.5]]),
            Err(SearchError::Configuration(_))
        ));
    }

    #[test]
    fn test_strata() {
        let vars = vec![Variable::discrete("D"), Variable::continuous("X")];
        let rows = [vec![1.0, 0.1], vec![0.0, 0.2], vec![1.0, 0.3]];
        let data = DataSet::from_rows(vars, &rows).unwrap();
        assert_eq!(data.strata(&NodeSet::singleton(0)), vec![vec![1], vec![0, 2]]);
        assert_eq!(data.strata(&NodeSet::new()), vec![vec![0, 1, 2]]);
    }

    #[test]
    fn test_rejects_ragged_rows() {
        let vars = vec![Variable::continuous("X"), Variable::continuous("Y")];
        assert!(DataSet::from_rows(vars, &[vec![1.0]]).is_err());
    }
}
