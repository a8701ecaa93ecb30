//! NaN-aware reductions and the adjusted R² fit statistic.

use crate::error::XsecError;

/// Mean of the non-NaN values; NaN if there are none.
pub fn nan_mean(values: &[f64]) -> f64 {
    let (sum, n) = values
        .iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(s, n), &v| (s + v, n + 1));
    if n == 0 { f64::NAN } else { sum / n as f64 }
}

/// `(min, max)` of a slice, or `None` when empty. Callers filter NaN first.
pub fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let first = *values.first()?;
    Some(
        values[1..]
            .iter()
            .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))),
    )
}

/// Adjusted coefficient of determination.
///
/// ```text
/// R²_adj = 1 - SSE (n - 1) / (SST (n - k))
/// ```
///
/// Pairs where either value is NaN are ignored. Returns NaN when the
/// statistic is undefined (`SST == 0` or `n == k`).
pub fn adjusted_r_squared(y: &[f64], yfit: &[f64], num_coefficients: usize) -> Result<f64, XsecError> {
    if y.len() != yfit.len() {
        return Err(XsecError::LengthMismatch {
            what: "fitted values",
            expected: y.len(),
            found: yfit.len(),
        });
    }

    let (y, yfit): (Vec<f64>, Vec<f64>) = y
        .iter()
        .zip(yfit)
        .filter(|(a, b)| !a.is_nan() && !b.is_nan())
        .map(|(&a, &b)| (a, b))
        .unzip();

    let n = y.len();
    let mean = nan_mean(&y);
    let sse: f64 = y.iter().zip(&yfit).map(|(a, b)| (a - b).powi(2)).sum();
    let sst: f64 = y.iter().map(|a| (a - mean).powi(2)).sum();

    if sst == 0.0 || n == num_coefficients || n == 0 {
        return Ok(f64::NAN);
    }

    let n = n as f64;
    let k = num_coefficients as f64;
    Ok(1.0 - sse * (n - 1.0) / (sst * (n - k)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_fit_has_unit_r_squared() {
        let y = [1.0, 2.0, 3.0, 4.0];
        let r2 = adjusted_r_squared(&y, &y, 2).unwrap();
        assert!((r2 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn matches_hand_computed_value() {
        // mean = 2.5, SST = 5, SSE = 0.04 + 0.01 + 0.01 + 0.04 = 0.1
        let y = [1.0, 2.0, 3.0, 4.0];
        let yfit = [1.2, 1.9, 3.1, 3.8];
        let r2 = adjusted_r_squared(&y, &yfit, 2).unwrap();
        let expected = 1.0 - 0.1 * 3.0 / (5.0 * 2.0);
        assert!((r2 - expected).abs() < 1e-12);
    }

    #[test]
    fn undefined_cases_are_nan() {
        let flat = [2.0, 2.0, 2.0];
        assert!(adjusted_r_squared(&flat, &flat, 1).unwrap().is_nan());

        let y = [1.0, 2.0, 3.0];
        assert!(adjusted_r_squared(&y, &y, 3).unwrap().is_nan());
    }

    #[test]
    fn nan_pairs_are_skipped() {
        let y = [1.0, f64::NAN, 2.0, 3.0, 4.0];
        let yfit = [1.2, 0.0, 1.9, 3.1, 3.8];
        let with_nan = adjusted_r_squared(&y, &yfit, 2).unwrap();
        let clean = adjusted_r_squared(&[1.0, 2.0, 3.0, 4.0], &[1.2, 1.9, 3.1, 3.8], 2).unwrap();
        assert_eq!(with_nan, clean);
    }

    #[test]
    fn mismatched_lengths_fail() {
        assert!(adjusted_r_squared(&[1.0, 2.0], &[1.0], 1).is_err());
    }

    #[test]
    fn nan_reductions_skip_nan() {
        assert_eq!(nan_mean(&[1.0, f64::NAN, 3.0]), 2.0);
        assert!(nan_mean(&[f64::NAN]).is_nan());
        assert_eq!(min_max(&[3.0, -1.0, 2.0]), Some((-1.0, 3.0)));
        assert_eq!(min_max(&[]), None);
    }
}
