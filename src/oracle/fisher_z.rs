// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Fisher Z test of vanishing partial correlation.

use crate::data::CovarianceMatrix;
use crate::error::Result;
use crate::graph::NodeSet;
use crate::oracle::linalg::select;
use crate::oracle::{check_alpha, TestResult};
use statrs::function::erf::erfc;
use std::f64::consts::SQRT_2;

#[derive(Debug, Clone)]
pub struct FisherZTest {
    covariance: CovarianceMatrix,
    alpha: f64,
}

impl FisherZTest {
    pub fn new(covariance: CovarianceMatrix, alpha: f64) -> Result<Self> {
        check_alpha(alpha)?;
        Ok(Self { covariance, alpha })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn covariance(&self) -> &CovarianceMatrix {
        &self.covariance
    }

    /// Partial correlation of `x` and `y` given `z`, `None` if the
    /// covariance over `{x, y} ∪ z` is singular.
    pub fn partial_correlation(&self, x: usize, y: usize, z: &NodeSet) -> Option<f64> {
        let mut indices = vec![x, y];
        indices.extend(z.iter());
        let sub = select(self.covariance.matrix(), &indices, &indices);
        let precision = sub.try_inverse()?;
        let denominator = (precision[(0, 0)] * precision[(1, 1)]).sqrt();
        let r = -precision[(0, 1)] / denominator;
        r.is_finite().then_some(r)
    }

    pub fn test(&self, x: usize, y: usize, z: &NodeSet) -> TestResult {
        let n = self.covariance.sample_size() as f64;
        let dof = n - z.len() as f64 - 3.0;
        if dof <= 0.0 {
            return TestResult::fail_open("Fisher Z", "too few samples for conditioning set");
        }
        let Some(r) = self.partial_correlation(x, y, z) else {
            return TestResult::fail_open("Fisher Z", "singular covariance");
        };
        let r = r.clamp(-1.0 + 1e-15, 1.0 - 1e-15);
        let statistic = dof.sqrt() * 0.5 * ((1.0 + r) / (1.0 - r)).ln();
        let p_value = erfc(statistic.abs() / SQRT_2);
        TestResult::from_p_value(p_value, statistic, self.alpha)
    }
}
