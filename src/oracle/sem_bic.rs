// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Linear-Gaussian BIC score.

use crate::data::CovarianceMatrix;
use crate::error::{Result, SearchError};
use crate::graph::NodeSet;
use crate::oracle::linalg::residual_variance;

/// `score(y | P) = -n ln σ²(y | P) - c |P| ln n`, higher is better.
///
/// A singular parent covariance or a non-positive residual variance gives
/// negative infinity, so such parent sets are never preferred.
#[derive(Debug, Clone)]
pub struct SemBicScore {
    covariance: CovarianceMatrix,
    penalty_discount: f64,
}

impl SemBicScore {
    pub fn new(covariance: CovarianceMatrix) -> Self {
        Self {
            covariance,
            penalty_discount: 1.0,
        }
    }

    /// Multiply the complexity penalty by `c`.
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

    pub fn penalty_discount(&self) -> f64 {
        self.penalty_discount
    }

    pub fn local_score(&self, node: usize, parents: &NodeSet) -> f64 {
        let n = self.covariance.sample_size() as f64;
        let parents = parents.to_vec();
        match residual_variance(self.covariance.matrix(), node, &parents) {
            Some(variance) if variance > 0.0 => {
                -n * variance.ln() - self.penalty_discount * parents.len() as f64 * n.ln()
            }
            _ => f64::NEG_INFINITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::continuous_variables;
    use nalgebra::DMatrix;

    fn score() -> SemBicScore {
        // B = A + e with var(A) = 1, var(e) = 1; C independent.
        let m = DMatrix::from_row_slice(3, 3, &[1.0, 1.0, 0.0, 1.0, 2.0, 0.0, 0.0, 0.0, 1.0]);
        let cov = CovarianceMatrix::new(continuous_variables(&["A", "B", "C"]), m, 1000).unwrap();
        SemBicScore::new(cov)
    }

    #[test]
    fn test_true_parent_improves_score() {
        let s = score();
        let empty = s.local_score(1, &NodeSet::new());
        let with_a = s.local_score(1, &NodeSet::singleton(0));
        assert!(with_a > empty);
    }

    #[test]
    fn test_irrelevant_parent_is_penalized() {
        let s = score();
        let empty = s.local_score(2, &NodeSet::new());
        let with_a = s.local_score(2, &NodeSet::singleton(0));
        assert!((empty - with_a - 1000_f64.ln()).abs() < 1e-9);
    }

    #[test]
    fn test_singular_parents_score_negative_infinity() {
        let m = DMatrix::from_row_slice(3, 3, &[1.0, 1.0, 0.5, 1.0, 1.0, 0.5, 0.5, 0.5, 1.0]);
        let cov = CovarianceMatrix::new(continuous_variables(&["A", "B", "C"]), m, 100).unwrap();
        let s = SemBicScore::new(cov);
        let parents: NodeSet = [0, 1].into_iter().collect();
        assert_eq!(s.local_score(2, &parents), f64::NEG_INFINITY);
    }

    #[test]
    fn test_penalty_discount_validation() {
        assert!(score().with_penalty_discount(-1.0).is_err());
        assert_eq!(score().with_penalty_discount(2.0).unwrap().penalty_discount(), 2.0);
    }
}
