//! Piecewise-linear interpolation onto a target grid.

use crate::error::XsecError;

/// Linearly interpolate `(xp, fp)` at each `x`, returning `fill` outside
/// `[xp[0], xp[last]]` (both ends inclusive).
///
/// `xp` must be strictly increasing. A single-point table only matches its
/// own abscissa.
pub fn interp_linear(xp: &[f64], fp: &[f64], x: &[f64], fill: f64) -> Result<Vec<f64>, XsecError> {
    if xp.len() != fp.len() {
        return Err(XsecError::LengthMismatch {
            what: "interpolation table values",
            expected: xp.len(),
            found: fp.len(),
        });
    }
    Ok(x.iter().map(|&xi| interp_one(xp, fp, xi, fill)).collect())
}

fn interp_one(xp: &[f64], fp: &[f64], x: f64, fill: f64) -> f64 {
    let (Some(&lo), Some(&hi)) = (xp.first(), xp.last()) else {
        return fill;
    };
    if !(x >= lo && x <= hi) {
        return fill;
    }
    if xp.len() == 1 {
        return fp[0];
    }

    // First index with xp[i] >= x; x == lo maps to the first segment.
    let i = xp.partition_point(|&v| v < x).max(1);
    let (x0, x1) = (xp[i - 1], xp[i]);
    let (f0, f1) = (fp[i - 1], fp[i]);
    let alpha = (x - x0) / (x1 - x0);
    f0 + alpha * (f1 - f0)
}
