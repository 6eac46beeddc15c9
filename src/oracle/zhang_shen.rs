// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Risk-bounded linear score (Zhang & Shen).
//!
//! `score(y | P) = -(n σ²(y | P) + λ |P| σ²(y) c)` where λ is chosen so that the
//! probability of selecting a wrong model is bounded by the risk bound. λ is
//! found by bisection on `[0, 100000]` and depends only on the number of
//! variables, so it is computed once at construction and the score stays a
//! pure function of `(y, P)`.

use crate::data::CovarianceMatrix;
use crate::error::{Result, SearchError};
use crate::graph::NodeSet;
use crate::oracle::linalg::residual_variance;

#[derive(Debug, Clone)]
pub struct ZhangShenBoundScore {
    covariance: CovarianceMatrix,
    risk_bound: f64,
    lambda: f64,
    penalty_discount: f64,
}

impl ZhangShenBoundScore {
    /// Fails if the risk bound is outside `[0, 1]` or some absolute
    /// correlation exceeds `correlation_threshold`.
    pub fn new(
        covariance: CovarianceMatrix,
        risk_bound: f64,
        correlation_threshold: f64,
    ) -> Result<Self> {
        if !(0.0..=1.0).contains(&risk_bound) {
            return Err(SearchError::config(format!(
                "risk bound should be in [0, 1]: {risk_bound}"
            )));
        }
        let correlation = covariance.correlation()?;
        let n = correlation.dimension();
        for i in 0..n {
            for j in 0..n {
                let r = correlation.get(i, j);
                if i != j && r.abs() > correlation_threshold {
                    return Err(SearchError::config(format!(
                        "correlation {r} between {} and {} exceeds {correlation_threshold} in absolute value",
                        covariance.variables()[i],
                        covariance.variables()[j]
                    )));
                }
            }
        }
        let lambda = zhang_shen_lambda(n.max(1), 0, risk_bound)?;
        Ok(Self {
            covariance,
            risk_bound,
            lambda,
            penalty_discount: 1.0,
        })
    }

    pub fn with_penalty_discount(mut self, c: f64) -> Result<Self> {
        if !(c >= 0.0 && c.is_finite()) {
            return Err(SearchError::config(format!(
                "penalty discount must be finite and non-negative: {c}"
            )));
        }
        self.penalty_discount = c;
        Ok(self)
    }

    pub fn covariance(&self) -> &CovarianceMatrix {
        &self.covariance
    }

    pub fn risk_bound(&self) -> f64 {
        self.risk_bound
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    pub fn local_score(&self, node: usize, parents: &NodeSet) -> f64 {
        let n = self.covariance.sample_size() as f64;
        let parents = parents.to_vec();
        let Some(variance) = residual_variance(self.covariance.matrix(), node, &parents) else {
            return f64::NEG_INFINITY;
        };
        let marginal = self.covariance.get(node, node);
        -(n * variance + self.lambda * parents.len() as f64 * marginal * self.penalty_discount)
    }
}

/// `p(λ) = 2 - (1 + e^{-(λ-1)/2} √λ)^(pn - m0)`
pub fn zhang_shen_p(pn: usize, m0: usize, lambda: f64) -> f64 {
    let base = 1.0 + (-(lambda - 1.0) / 2.0).exp() * lambda.sqrt();
    2.0 - base.powi((pn - m0) as i32)
}

/// Smallest λ in `[0, 100000]` (by bisection) with `p(λ) >= 1 - risk_bound`.
pub fn zhang_shen_lambda(pn: usize, m0: usize, risk_bound: f64) -> Result<f64> {
    if pn <= m0 {
        return Err(SearchError::config(format!(
            "m0 ({m0}) must be less than the number of variables ({pn})"
        )));
    }
    let (mut low, mut high) = (0.0_f64, 100_000.0_f64);
    while high - low > 1e-10 {
        let lambda = (high + low) / 2.0;
        if zhang_shen_p(pn, m0, lambda) < 1.0 - risk_bound {
            low = lambda;
        } else {
            high = lambda;
        }
    }
    Ok((high + low) / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::continuous_variables;
    use nalgebra::DMatrix;

    fn cov(r: f64) -> CovarianceMatrix {
        let m = DMatrix::from_row_slice(2, 2, &[1.0, r, r, 1.0]);
        CovarianceMatrix::new(continuous_variables(&["A", "B"]), m, 500).unwrap()
    }

    #[test]
    fn test_risk_bound_range() {
        assert!(matches!(
            ZhangShenBoundScore::new(cov(0.5), 1.5, 1.0),
            Err(SearchError::Configuration(_))
        ));
        assert!(ZhangShenBoundScore::new(cov(0.5), -0.1, 1.0).is_err());
    }

    #[test]
    fn test_correlation_threshold() {
        assert!(ZhangShenBoundScore::new(cov(0.95), 0.1, 0.9).is_err());
        assert!(ZhangShenBoundScore::new(cov(0.5), 0.1, 0.9).is_ok());
    }

    #[test]
    fn test_lambda_meets_risk_bound() {
        let lambda = zhang_shen_lambda(10, 0, 0.1).unwrap();
        assert!(lambda > 1.0);
        assert!(zhang_shen_p(10, 0, lambda + 1e-6) >= 0.9 - 1e-9);
        assert!(zhang_shen_lambda(3, 3, 0.1).is_err());
    }

    #[test]
    fn test_lambda_grows_with_dimension() {
        let small = zhang_shen_lambda(5, 0, 0.1).unwrap();
        let large = zhang_shen_lambda(50, 0, 0.1).unwrap();
        assert!(large > small);
    }

    #[test]
    fn test_score_is_pure() {
        let s = ZhangShenBoundScore::new(cov(0.6), 0.1, 1.0).unwrap();
        let p = NodeSet::singleton(0);
        let first = s.local_score(1, &p);
        let _ = s.local_score(1, &NodeSet::new());
        assert_eq!(first, s.local_score(1, &p));
        assert!(first > s.local_score(1, &NodeSet::new()));
    }
}
