// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Small dense linear-algebra helpers over covariance matrices.

use nalgebra::linalg::Cholesky;
use nalgebra::{DMatrix, DVector};
use statrs::distribution::{ChiSquared, ContinuousCDF};

/// ln(2πe), the per-dimension constant of a Gaussian entropy.
pub(crate) const LN_2PI_E: f64 = 2.837_877_066_409_345_3;

/// The submatrix of `m` over `rows` × `columns`.
pub(crate) fn select(m: &DMatrix<f64>, rows: &[usize], columns: &[usize]) -> DMatrix<f64> {
    DMatrix::from_fn(rows.len(), columns.len(), |r, c| m[(rows[r], columns[c])])
}

/// Log-determinant of a symmetric positive-definite matrix, `None` if it is not.
/// The empty matrix has log-determinant 0.
pub(crate) fn log_det(m: &DMatrix<f64>) -> Option<f64> {
    if m.nrows() == 0 {
        return Some(0.0);
    }
    let chol = Cholesky::new(m.clone())?;
    let l = chol.l_dirty();
    let half: f64 = (0..m.nrows()).map(|i| l[(i, i)].ln()).sum();
    let value = 2.0 * half;
    value.is_finite().then_some(value)
}

/// Variance of `y` after linear regression on `parents`:
/// `Σyy - Σyp Σpp⁻¹ Σpy`. `None` when `Σpp` is singular.
pub(crate) fn residual_variance(cov: &DMatrix<f64>, y: usize, parents: &[usize]) -> Option<f64> {
    let syy = cov[(y, y)];
    if parents.is_empty() {
        return Some(syy);
    }
    let spp = select(cov, parents, parents);
    let spy = DVector::from_fn(parents.len(), |i, _| cov[(parents[i], y)]);
    let chol = Cholesky::new(spp)?;
    let b = chol.solve(&spy);
    Some(syy - spy.dot(&b))
}

/// Upper tail of the chi-square distribution, NaN if `dof` is not positive.
pub(crate) fn chi_square_sf(statistic: f64, dof: f64) -> f64 {
    match ChiSquared::new(dof) {
        Ok(dist) => dist.sf(statistic.max(0.0)),
        Err(_) => f64::NAN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_det_diagonal() {
        let m = DMatrix::from_diagonal(&DVector::from_vec(vec![2.0, 3.0]));
        assert!((log_det(&m).unwrap() - 6.0_f64.ln()).abs() < 1e-12);
        assert_eq!(log_det(&DMatrix::zeros(0, 0)), Some(0.0));
    }

    #[test]
    fn test_log_det_singular() {
        let m = DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 1.0, 1.0]);
        assert_eq!(log_det(&m), None);
    }

    #[test]
    fn test_residual_variance() {
        // y = x + e, var(x) = 1, var(e) = 1.
        let cov = DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 1.0, 2.0]);
        assert!((residual_variance(&cov, 1, &[0]).unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(residual_variance(&cov, 1, &[]), Some(2.0));
    }

    #[test]
    fn test_chi_square_sf() {
        // Median of chi-square(2) is 2 ln 2.
        assert!((chi_square_sf(2.0 * 2.0_f64.ln(), 2.0) - 0.5).abs() < 1e-9);
        assert!(chi_square_sf(1.0, 0.0).is_nan());
    }

    #[test]
    fn test_entropy_constant() {
        let expected = (2.0 * std::f64::consts::PI * std::f64::consts::E).ln();
        assert!((LN_2PI_E - expected).abs() < 1e-12);
    }
}
