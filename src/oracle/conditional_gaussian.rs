// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Likelihood-ratio test for mixed discrete/continuous data.
//!
//! Each variable set `S` is modelled conditional-Gaussian: the discrete
//! members of `S` split the rows into cells; inside a cell the continuous
//! members are jointly Gaussian. Cells too small to estimate their own
//! covariance borrow the covariance pooled over all rows.
//!
//! The statistic compares `y | x, z` against `y | z`:
//!
//! ```text
//! 2 [ll(x y z) - ll(x z) - ll(y z) + ll(z)]
//! ```
//!
//! with degrees of freedom differenced the same way.

use crate::data::{sample_covariance, DataSet};
use crate::error::{Result, SearchError};
use crate::graph::NodeSet;
use crate::oracle::linalg::{chi_square_sf, log_det, LN_2PI_E};
use crate::oracle::{check_alpha, TestResult};
use nalgebra::DMatrix;

#[derive(Debug, Clone)]
pub struct ConditionalGaussianTest {
    data: DataSet,
    alpha: f64,
}

/// Log-likelihood and parameter count of one variable set.
struct Fit {
    log_likelihood: f64,
    parameters: f64,
}

impl ConditionalGaussianTest {
    pub fn new(data: DataSet, alpha: f64) -> Result<Self> {
        check_alpha(alpha)?;
        if data.num_rows() < 2 {
            return Err(SearchError::config(
                "the conditional Gaussian test needs at least two rows",
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

    fn fit(&self, set: &NodeSet) -> Option<Fit> {
        let discrete: NodeSet = set.iter().filter(|&v| self.data.is_discrete(v)).collect();
        let continuous: Vec<usize> = set.iter().filter(|&v| !self.data.is_discrete(v)).collect();
        let k = continuous.len();
        let n = self.data.num_rows() as f64;
        let cells = self.data.strata(&discrete);

        let columns = |rows: &[usize]| {
            DMatrix::from_fn(rows.len(), k, |r, c| self.data.value(rows[r], continuous[c]))
        };
        let all_rows: Vec<usize> = (0..self.data.num_rows()).collect();
        let pooled = if k > 0 {
            Some(mle_log_det(&columns(&all_rows))?)
        } else {
            None
        };

        let mut log_likelihood = 0.0;
        for rows in &cells {
            let nc = rows.len() as f64;
            log_likelihood += nc * (nc / n).ln();
            if k == 0 {
                continue;
            }
            let ldet = if rows.len() >= k + 2 {
                mle_log_det(&columns(rows)).or(pooled)?
            } else {
                pooled?
            };
            log_likelihood -= nc / 2.0 * (ldet + k as f64 * LN_2PI_E);
        }

        let m = cells.len() as f64;
        let kf = k as f64;
        let parameters = (m - 1.0) + m * (kf + kf * (kf + 1.0) / 2.0);
        Some(Fit {
            log_likelihood,
            parameters,
        })
    }

    pub fn test(&self, x: usize, y: usize, z: &NodeSet) -> TestResult {
        let xz = z.with(x);
        let yz = z.with(y);
        let xyz = xz.with(y);
        let (Some(full), Some(fx), Some(fy), Some(fz)) =
            (self.fit(&xyz), self.fit(&xz), self.fit(&yz), self.fit(z))
        else {
            return TestResult::fail_open("conditional Gaussian", "singular covariance");
        };
        let statistic = 2.0
            * (full.log_likelihood - fx.log_likelihood - fy.log_likelihood + fz.log_likelihood);
        if !statistic.is_finite() {
            return TestResult::fail_open("conditional Gaussian", "non-finite likelihood");
        }
        let dof = (full.parameters - fx.parameters - fy.parameters + fz.parameters).max(1.0);
        TestResult::from_p_value(chi_square_sf(statistic, dof), statistic, self.alpha)
    }
}

/// Log-determinant of the maximum-likelihood covariance of the columns.
fn mle_log_det(columns: &DMatrix<f64>) -> Option<f64> {
    let rows = columns.nrows() as f64;
    let unbiased = sample_covariance(columns).ok()?;
    log_det(&(unbiased * ((rows - 1.0) / rows)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Variable;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use rand_distr::{Distribution, Normal};

    /// D discrete in {0, 1}; X = 2 D + e; Y = X + e; W independent noise.
    fn mixed(n: usize) -> DataSet {
        let mut rng = StdRng::seed_from_u64(7);
        let noise = Normal::new(0.0, 1.0).unwrap();
        let rows: Vec<Vec<f64>> = (0..n)
            .map(|_| {
                let d = if rng.gen_bool(0.5) { 1.0 } else { 0.0 };
                let x = 2.0 * d + noise.sample(&mut rng);
                let y = x + noise.sample(&mut rng);
                let w = noise.sample(&mut rng);
                vec![d, x, y, w]
            })
            .collect();
        let vars = vec![
            Variable::discrete("D"),
            Variable::continuous("X"),
            Variable::continuous("Y"),
            Variable::continuous("W"),
        ];
        DataSet::from_rows(vars, &rows).unwrap()
    }

    #[test]
    fn test_discrete_continuous_dependence() {
        let t = ConditionalGaussianTest::new(mixed(1000), 0.01).unwrap();
        assert!(!t.test(0, 1, &NodeSet::new()).independent);
        assert!(!t.test(1, 0, &NodeSet::new()).independent);
        assert!(t.test(0, 3, &NodeSet::new()).independent);
    }

    #[test]
    fn test_mediated_dependence_vanishes() {
        let t = ConditionalGaussianTest::new(mixed(1000), 0.01).unwrap();
        assert!(!t.test(0, 2, &NodeSet::new()).independent);
        assert!(t.test(0, 2, &NodeSet::singleton(1)).independent);
    }

    #[test]
    fn test_statistic_is_symmetric() {
        let t = ConditionalGaussianTest::new(mixed(300), 0.01).unwrap();
        let a = t.test(0, 2, &NodeSet::singleton(3));
        let b = t.test(2, 0, &NodeSet::singleton(3));
        assert!((a.statistic - b.statistic).abs() < 1e-8);
    }
}
