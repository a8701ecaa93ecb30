//! Polynomial basis in transformed coordinates.
//!
//! The surface fitted per frequency bin is
//!
//! ```text
//! z = p00 + p10*x + p01*y + p20*x^2 + p11*x*y + p02*y^2
//! ```
//!
//! with `x = T` [K], `y = log10(P)` [log10 Pa] and `z = sqrt(Xsec)`.
//! Lower-order sub-models use a subset of these columns; see
//! `ModelKind::slots`.

use nalgebra::DMatrix;

use crate::domain::{COEFF_LEN, ModelKind};
use crate::error::XsecError;

/// Full basis vector `[1, x, y, x², xy, y²]` at one point.
pub fn basis_vector(x: f64, y: f64) -> [f64; COEFF_LEN] {
    [1.0, x, y, x * x, x * y, y * y]
}

/// Fill a design row for the given model kind.
///
/// # Panics
/// Panics if `out` is shorter than `model.coeff_count()`.
pub fn fill_design_row(model: ModelKind, x: f64, y: f64, out: &mut [f64]) {
    let full = basis_vector(x, y);
    for (dst, &slot) in out.iter_mut().zip(model.slots()) {
        *dst = full[slot];
    }
}

/// Build the `n × k` design matrix for `model` from paired samples.
pub fn design_matrix(model: ModelKind, x: &[f64], y: &[f64]) -> Result<DMatrix<f64>, XsecError> {
    if x.len() != y.len() {
        return Err(XsecError::LengthMismatch {
            what: "design matrix y samples",
            expected: x.len(),
            found: y.len(),
        });
    }

    let k = model.coeff_count();
    let mut m = DMatrix::zeros(x.len(), k);
    let mut row = [0.0; COEFF_LEN];
    for (i, (&xi, &yi)) in x.iter().zip(y).enumerate() {
        fill_design_row(model, xi, yi, &mut row[..k]);
        for j in 0..k {
            m[(i, j)] = row[j];
        }
    }
    Ok(m)
}
