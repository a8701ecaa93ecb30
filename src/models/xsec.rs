//! Cross-section reconstruction from fitted coefficients.
//!
//! The fitted quantity is `z = sqrt(Xsec)` as a polynomial in `x = T` and
//! `y = log10(P)`; reconstruction squares it back, which keeps every value
//! inside the fitted envelope non-negative.
//!
//! Outside the envelope the quadratic surface is not trusted. Instead we
//! clamp `(T, P)` onto the envelope and extrapolate linearly from there
//! using the analytic gradient:
//!
//! ```text
//! Xsec(T, P) ≈ Xsec(T0, P0) + dXsec/dT * (T - T0) + dXsec/dP * (P - P0)
//! ```

use std::f64::consts::LN_10;

use crate::domain::{Coefficients, Envelope};
use crate::error::XsecError;
use crate::math::basis_vector;

fn check_pressure(pressure: f64) -> Result<(), XsecError> {
    if pressure > 0.0 && !pressure.is_infinite() {
        Ok(())
    } else {
        Err(XsecError::NonPositivePressure(pressure))
    }
}

/// `z = c · [1, T, logP, T², T·logP, logP²]`.
fn sqrt_xsec(temperature: f64, log_p: f64, coeffs: &Coefficients) -> f64 {
    basis_vector(temperature, log_p)
        .iter()
        .zip(coeffs.as_slice())
        .map(|(b, c)| b * c)
        .sum()
}

/// Cross-section [m²] at `(T, P)` from one bin's coefficients.
pub fn evaluate(temperature: f64, pressure: f64, coeffs: &Coefficients) -> Result<f64, XsecError> {
    check_pressure(pressure)?;
    let z = sqrt_xsec(temperature, pressure.log10(), coeffs);
    Ok(z * z)
}

/// Partial derivatives `(dXsec/dT, dXsec/dP)` at `(T, P)`.
pub fn derivative(temperature: f64, pressure: f64, coeffs: &Coefficients) -> Result<(f64, f64), XsecError> {
    check_pressure(pressure)?;

    let log_p = pressure.ln() / LN_10;
    let z = sqrt_xsec(temperature, log_p, coeffs);

    let dz_dt = coeffs.p10() + 2.0 * coeffs.p20() * temperature + coeffs.p11() * log_p;
    let dz_dp = (coeffs.p01() + coeffs.p11() * temperature + 2.0 * coeffs.p02() * log_p) / (pressure * LN_10);

    Ok((2.0 * z * dz_dt, 2.0 * z * dz_dp))
}

/// Cross-section at `(T, P)`, linearly extrapolated from the nearest point of
/// `envelope` when `(T, P)` lies outside it.
///
/// Extrapolated values are not clamped and may be negative far outside the
/// envelope. An empty envelope has no region to clamp onto, so the surface
/// is evaluated directly.
pub fn evaluate_with_extrapolation(
    temperature: f64,
    pressure: f64,
    coeffs: &Coefficients,
    envelope: &Envelope,
) -> Result<f64, XsecError> {
    check_pressure(pressure)?;

    if envelope.is_empty() || envelope.contains(temperature, pressure) {
        return evaluate(temperature, pressure, coeffs);
    }

    let (t0, p0) = envelope.clamp(temperature, pressure);
    let xsec_0 = evaluate(t0, p0, coeffs)?;
    let (d_dt, d_dp) = derivative(t0, p0, coeffs)?;

    Ok(xsec_0 + d_dt * (temperature - t0) + d_dp * (pressure - p0))
}
