// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Stratified Pearson chi-square test for discrete data.
//!
//! Rows are grouped by the values of the conditioning variables. Each stratum
//! contributes its own Pearson statistic over the x × y table, and degrees of
//! freedom `(rows - 1)(columns - 1)` counted over non-empty margins only.

use crate::data::DataSet;
use crate::error::{Result, SearchError};
use crate::graph::NodeSet;
use crate::oracle::linalg::chi_square_sf;
use crate::oracle::{check_alpha, TestResult};

#[derive(Debug, Clone)]
pub struct ChiSquareTest {
    data: DataSet,
    alpha: f64,
}

impl ChiSquareTest {
    /// Every column must be discrete.
    pub fn new(data: DataSet, alpha: f64) -> Result<Self> {
        check_alpha(alpha)?;
        if !data.all_discrete() {
            return Err(SearchError::config(
                "the chi-square test requires all variables to be discrete",
            ));
        }
        Ok(Self { data, alpha })
    }

    pub fn data(&self) -> &DataSet {
        &self.data
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn test(&self, x: usize, y: usize, z: &NodeSet) -> TestResult {
        let (Some(nx), Some(ny)) = (self.data.num_categories(x), self.data.num_categories(y)) else {
            return TestResult::fail_open("chi-square", "non-discrete variable");
        };
        let mut statistic = 0.0;
        let mut dof = 0usize;
        for rows in self.data.strata(z) {
            let mut table = vec![0.0_f64; nx * ny];
            for &row in &rows {
                table[self.data.code(row, x) * ny + self.data.code(row, y)] += 1.0;
            }
            let total = rows.len() as f64;
            let row_sums: Vec<f64> = (0..nx).map(|i| (0..ny).map(|j| table[i * ny + j]).sum()).collect();
            let col_sums: Vec<f64> = (0..ny).map(|j| (0..nx).map(|i| table[i * ny + j]).sum()).collect();
            let nonzero_rows = row_sums.iter().filter(|&&s| s > 0.0).count();
            let nonzero_cols = col_sums.iter().filter(|&&s| s > 0.0).count();
            if nonzero_rows < 2 || nonzero_cols < 2 {
                continue;
            }
            dof += (nonzero_rows - 1) * (nonzero_cols - 1);
            for i in 0..nx {
                for j in 0..ny {
                    let expected = row_sums[i] * col_sums[j] / total;
                    if expected > 0.0 {
                        let diff = table[i * ny + j] - expected;
                        statistic += diff * diff / expected;
                    }
                }
            }
        }
        if dof == 0 {
            return TestResult {
                independent: true,
                p_value: 1.0,
                statistic: 0.0,
            };
        }
        TestResult::from_p_value(chi_square_sf(statistic, dof as f64), statistic, self.alpha)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Variable;

    fn data(rows: &[[f64; 3]]) -> DataSet {
        let vars = vec![
            Variable::discrete("X"),
            Variable::discrete("Y"),
            Variable::discrete("Z"),
        ];
        let rows: Vec<Vec<f64>> = rows.iter().map(|r| r.to_vec()).collect();
        DataSet::from_rows(vars, &rows).unwrap()
    }

    #[test]
    fn test_perfect_dependence() {
        let rows: Vec<[f64; 3]> = (0..200)
            .map(|i| {
                let v = (i % 2) as f64;
                [v, v, 0.0]
            })
            .collect();
        let t = ChiSquareTest::new(data(&rows), 0.05).unwrap();
        let result = t.test(0, 1, &NodeSet::new());
        assert!(!result.independent);
        assert!((result.statistic - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_balanced_independence() {
        let rows: Vec<[f64; 3]> = (0..400)
            .map(|i| [(i % 2) as f64, ((i / 2) % 2) as f64, 0.0])
            .collect();
        let t = ChiSquareTest::new(data(&rows), 0.05).unwrap();
        let result = t.test(0, 1, &NodeSet::new());
        assert!(result.independent);
        assert!(result.statistic.abs() < 1e-9);
    }

    #[test]
    fn test_conditioning_on_common_cause() {
        // X = Z and Y = Z: dependent marginally, independent given Z.
        let rows: Vec<[f64; 3]> = (0..300)
            .map(|i| {
                let z = (i % 3) as f64;
                [z, z, z]
            })
            .collect();
        let t = ChiSquareTest::new(data(&rows), 0.05).unwrap();
        assert!(!t.test(0, 1, &NodeSet::new()).independent);
        let given_z = t.test(0, 1, &NodeSet::singleton(2));
        assert!(given_z.independent);
        assert_eq!(given_z.p_value, 1.0);
    }

    #[test]
    fn test_requires_discrete() {
        let vars = vec![Variable::continuous("X")];
        let d = DataSet::from_rows(vars, &[vec![0.5], vec![1.0]]).unwrap();
        assert!(ChiSquareTest::new(d, 0.05).is_err());
    }
}
