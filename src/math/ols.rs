//! Least squares solver.
//!
//! Every per-bin fit solves a tiny dense problem
//!
//! ```text
//! minimize ||M c - z||_2
//! ```
//!
//! with at most six columns. We use an SVD so that rank-deficient design
//! matrices (e.g. all samples at the same pressure) still produce the
//! minimum-norm solution, and so the rank and singular values can be reported
//! as fit diagnostics.

use nalgebra::{DMatrix, DVector};

use crate::error::XsecError;

/// Solution of a least squares problem plus solve diagnostics.
#[derive(Debug, Clone)]
pub struct LeastSquares {
    pub coefficients: Vec<f64>,
    /// Sum of squared residuals `||M c - z||²`.
    pub residual: f64,
    /// Number of singular values above the cutoff.
    pub rank: usize,
    /// Singular values of `M`, descending.
    pub singular_values: Vec<f64>,
}

/// Solve a least squares problem using SVD.
///
/// Singular values below `max(m, n) * eps * s_max` are treated as zero, both
/// for the solve and for the reported rank.
pub fn solve_least_squares(m: &DMatrix<f64>, z: &DVector<f64>) -> Result<LeastSquares, XsecError> {
    let (rows, columns) = m.shape();
    if z.len() != rows {
        return Err(XsecError::LengthMismatch {
            what: "least-squares right-hand side",
            expected: rows,
            found: z.len(),
        });
    }
    if rows < columns {
        return Err(XsecError::Underdetermined { rows, columns });
    }

    let svd = m.clone().svd(true, true);

    let mut singular_values: Vec<f64> = svd.singular_values.iter().copied().collect();
    singular_values.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));

    let s_max = singular_values.first().copied().unwrap_or(0.0);
    let cutoff = s_max * f64::EPSILON * rows.max(columns) as f64;
    let rank = singular_values.iter().filter(|&&s| s > cutoff).count();

    let beta = svd.solve(z, cutoff).map_err(|e| XsecError::Solve(e.to_string()))?;
    if !beta.iter().all(|v| v.is_finite()) {
        return Err(XsecError::Solve("non-finite coefficients".to_string()));
    }

    let residual = (m * &beta - z).norm_squared();

    Ok(LeastSquares {
        coefficients: beta.iter().copied().collect(),
        residual,
        rank,
        singular_values,
    })
}
