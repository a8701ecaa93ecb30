//! Fitting routines for a single frequency bin and for a whole band.
//!
//! Given:
//! - temperatures `T_i` [K]
//! - pressures `P_i` [Pa]
//! - cross-sections `Xsec_i` [m²]
//!
//! we transform to `x = T`, `y = log10(P)`, `z = sqrt(Xsec)`, drop samples
//! that are not finite after the transform, select a model by the spread of
//! the remaining samples (see `selection`) and solve for its coefficients.

use nalgebra::DVector;
use rayon::prelude::*;

use crate::domain::{BandRecord, Coefficients, Envelope, FitConfig, FitResult, ModelKind};
use crate::error::XsecError;
use crate::fit::selection::select_model;
use crate::math::{adjusted_r_squared, basis_vector, design_matrix, min_max, nan_mean, solve_least_squares};

/// Valid samples in transformed coordinates.
#[derive(Debug, Clone, Default)]
struct Transformed {
    x: Vec<f64>,
    y: Vec<f64>,
    z: Vec<f64>,
}

fn transform(temperature: &[f64], pressure: &[f64], xsec: &[f64]) -> Transformed {
    let mut out = Transformed::default();
    for ((&t, &p), &s) in temperature.iter().zip(pressure).zip(xsec) {
        let (x, y, z) = (t, p.log10(), s.sqrt());
        if x.is_finite() && y.is_finite() && z.is_finite() {
            out.x.push(x);
            out.y.push(y);
            out.z.push(z);
        }
    }
    out
}

fn check_len(what: &'static str, expected: usize, found: usize) -> Result<(), XsecError> {
    if expected == found {
        Ok(())
    } else {
        Err(XsecError::LengthMismatch { what, expected, found })
    }
}

/// Fit one frequency bin.
///
/// Never fails on bad data: invalid samples are dropped, sparse data falls
/// back to simpler models, and a bin without valid samples yields
/// `FitResult::degenerate()`. Only mismatched input lengths are errors.
pub fn fit_band(
    temperature: &[f64],
    pressure: &[f64],
    xsec: &[f64],
    config: &FitConfig,
) -> Result<FitResult, XsecError> {
    check_len("pressure samples", temperature.len(), pressure.len())?;
    check_len("cross-section samples", temperature.len(), xsec.len())?;
    config.validate()?;

    let data = transform(temperature, pressure, xsec);
    let (Some((t_min, t_max)), Some((y_min, y_max))) = (min_max(&data.x), min_max(&data.y)) else {
        log::debug!("no valid samples out of {}; emitting degenerate fit", temperature.len());
        return Ok(FitResult::degenerate());
    };

    let n = data.z.len();
    let model = select_model(n, y_max - y_min, t_max - t_min, config);

    let (coefficients, residual, rank, singular_values) = match model {
        ModelKind::Constant => {
            let mean = nan_mean(&data.z);
            let residual = data.z.iter().map(|z| (z - mean).powi(2)).sum();
            (Coefficients::from_model(model, &[mean])?, residual, None, None)
        }
        _ => {
            let m = design_matrix(model, &data.x, &data.y)?;
            let z = DVector::from_column_slice(&data.z);
            let sol = solve_least_squares(&m, &z)?;
            (
                Coefficients::from_model(model, &sol.coefficients)?,
                sol.residual,
                Some(sol.rank),
                Some(sol.singular_values),
            )
        }
    };

    let fitted: Vec<f64> = data
        .x
        .iter()
        .zip(&data.y)
        .map(|(&x, &y)| {
            basis_vector(x, y)
                .iter()
                .zip(coefficients.as_slice())
                .map(|(b, c)| b * c)
                .sum()
        })
        .collect();
    let adjusted_r_squared = adjusted_r_squared(&data.z, &fitted, model.coeff_count())?;

    log::debug!(
        "fitted {} to {n} samples (dlogP={:.3}, dT={:.1})",
        model.display_name(),
        y_max - y_min,
        t_max - t_min
    );

    Ok(FitResult {
        coefficients,
        model,
        residual,
        rank,
        singular_values,
        adjusted_r_squared,
        envelope: Envelope::new(t_min, t_max, 10f64.powf(y_min), 10f64.powf(y_max)),
        sample_count: n,
    })
}

/// A fitted band plus the per-bin fit diagnostics that produced it.
#[derive(Debug, Clone)]
pub struct BandFit {
    pub record: BandRecord,
    pub bins: Vec<FitResult>,
}

impl BandFit {
    /// Number of bins for which each model was selected.
    pub fn model_counts(&self) -> Vec<(ModelKind, usize)> {
        let mut counts: Vec<(ModelKind, usize)> = Vec::new();
        for bin in &self.bins {
            match counts.iter_mut().find(|(kind, _)| *kind == bin.model) {
                Some((_, c)) => *c += 1,
                None => counts.push((bin.model, 1)),
            }
        }
        counts
    }

    /// Bins without a single valid sample.
    pub fn degenerate_bins(&self) -> usize {
        self.bins.iter().filter(|b| b.sample_count == 0).count()
    }
}

/// Fit every frequency bin of a band.
///
/// `spectra[i]` is the spectrum measured at `(temperature[i], pressure[i])`,
/// sampled on `frequencies` [Hz]. Bins are independent and fitted in
/// parallel. The band envelope is the union of the non-empty bin envelopes.
pub fn fit_band_record(
    frequencies: &[f64],
    temperature: &[f64],
    pressure: &[f64],
    spectra: &[Vec<f64>],
    config: &FitConfig,
) -> Result<BandFit, XsecError> {
    check_len("pressure samples", temperature.len(), pressure.len())?;
    check_len("spectra", temperature.len(), spectra.len())?;
    for spectrum in spectra {
        check_len("spectrum bins", frequencies.len(), spectrum.len())?;
    }
    config.validate()?;

    let bins: Vec<FitResult> = (0..frequencies.len())
        .into_par_iter()
        .map(|j| {
            let column: Vec<f64> = spectra.iter().map(|s| s[j]).collect();
            fit_band(temperature, pressure, &column, config)
        })
        .collect::<Result<_, _>>()?;

    let envelope = bins
        .iter()
        .filter(|b| b.sample_count > 0)
        .fold(Envelope::empty(), |acc, b| acc.union(&b.envelope));

    let record = BandRecord {
        frequencies: frequencies.to_vec(),
        coefficients: bins.iter().map(|b| b.coefficients).collect(),
        envelope,
    };
    record.validate(0)?;

    Ok(BandFit { record, bins })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn grid() -> (Vec<f64>, Vec<f64>) {
        let mut t = Vec::new();
        let mut p = Vec::new();
        for &ti in &[200.0, 225.0, 250.0, 275.0, 300.0] {
            for &pi in &[1e3, 5e3, 2e4, 6e4, 1e5] {
                t.push(ti);
                p.push(pi);
            }
        }
        (t, p)
    }

    #[test]
    fn recovers_exact_surface() {
        let (t, p) = grid();
        let xsec: Vec<f64> = t
            .iter()
            .zip(&p)
            .map(|(&ti, &pi)| (1.0 + 0.01 * ti + 0.5 * pi.log10()).powi(2))
            .collect();

        let fit = fit_band(&t, &p, &xsec, &FitConfig::default()).unwrap();
        assert_eq!(fit.model, ModelKind::Poly22);
        let c = fit.coefficients;
        assert_abs_diff_eq!(c.p00(), 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(c.p10(), 0.01, epsilon = 1e-7);
        assert_abs_diff_eq!(c.p01(), 0.5, epsilon = 1e-5);
        assert_abs_diff_eq!(c.p20(), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(c.p11(), 0.0, epsilon = 1e-7);
        assert_abs_diff_eq!(c.p02(), 0.0, epsilon = 1e-6);
        assert!(fit.residual < 1e-10);
        assert_eq!(fit.rank, Some(6));
        assert_eq!(fit.singular_values.as_ref().map(Vec::len), Some(6));
        assert_abs_diff_eq!(fit.adjusted_r_squared, 1.0, epsilon = 1e-9);
        assert_eq!(fit.sample_count, 25);
        assert_abs_diff_eq!(fit.min_pressure(), 1e3, epsilon = 1e-6);
        assert_abs_diff_eq!(fit.max_pressure(), 1e5, epsilon = 1e-4);
        assert_eq!(fit.min_temperature(), 200.0);
        assert_eq!(fit.max_temperature(), 300.0);
    }

    #[test]
    fn constant_pressure_selects_temperature_quadratic() {
        let t = [200.0, 210.0, 220.0, 230.0, 240.0, 250.0];
        let p = [1000.0; 6];
        let xsec = [1e-22, 2e-22, 1.5e-22, 3e-22, 2.5e-22, 4e-22];

        let fit = fit_band(&t, &p, &xsec, &FitConfig::default()).unwrap();
        assert_eq!(fit.model, ModelKind::Poly2T);
        assert_eq!(fit.coefficients.p01(), 0.0);
        assert_eq!(fit.coefficients.p11(), 0.0);
        assert_eq!(fit.coefficients.p02(), 0.0);
        assert_eq!(fit.coefficients.as_slice().len(), 6);
    }

    #[test]
    fn all_nan_temperatures_give_degenerate_result() {
        let t = [f64::NAN; 10];
        let p = [1e4; 10];
        let xsec = [1e-22; 10];

        let fit = fit_band(&t, &p, &xsec, &FitConfig::default()).unwrap();
        assert_eq!(fit.sample_count, 0);
        assert_eq!(fit.min_temperature(), f64::INFINITY);
        assert_eq!(fit.max_temperature(), f64::NEG_INFINITY);
        assert_eq!(fit.min_pressure(), f64::INFINITY);
        assert_eq!(fit.max_pressure(), f64::NEG_INFINITY);
        assert_eq!(fit.coefficients, Coefficients::ZERO);
        assert!(fit.residual.is_nan());
        assert_eq!(fit.rank, None);
        assert_eq!(fit.singular_values, None);
    }

    #[test]
    fn constant_fallback_uses_mean_of_sqrt() {
        // Same (T, P) everywhere: no spread on either axis.
        let t = [250.0; 4];
        let p = [1e4; 4];
        let xsec = [1.0, 4.0, 9.0, 16.0];

        let fit = fit_band(&t, &p, &xsec, &FitConfig::default()).unwrap();
        assert_eq!(fit.model, ModelKind::Constant);
        assert_eq!(fit.coefficients, Coefficients([2.5, 0.0, 0.0, 0.0, 0.0, 0.0]));
        // (1-2.5)^2 + (2-2.5)^2 + (3-2.5)^2 + (4-2.5)^2
        assert_abs_diff_eq!(fit.residual, 5.0, epsilon = 1e-12);
        assert_eq!(fit.rank, None);
        assert_eq!(fit.singular_values, None);
    }

    #[test]
    fn invalid_samples_are_dropped_but_do_not_fail() {
        let t = [200.0, 250.0, f64::INFINITY, 300.0];
        let p = [1e4, 0.0, 1e4, 1e4];
        let xsec = [1.0, 4.0, 9.0, -1.0];

        let fit = fit_band(&t, &p, &xsec, &FitConfig::default()).unwrap();
        // Only the first sample survives: P=0, T=inf and Xsec<0 are all invalid.
        assert_eq!(fit.sample_count, 1);
        assert_eq!(fit.model, ModelKind::Constant);
        assert_eq!(fit.min_temperature(), 200.0);
        assert_eq!(fit.max_temperature(), 200.0);
        assert_abs_diff_eq!(fit.min_pressure(), 1e4, epsilon = 1e-8);
        assert_abs_diff_eq!(fit.max_pressure(), 1e4, epsilon = 1e-8);
    }

    #[test]
    fn unused_slots_are_exactly_zero_for_every_model() {
        let cases: [(&[f64], &[f64]); 3] = [
            (&[200.0, 260.0, 300.0], &[1e4, 1e4, 1e4]),
            (&[250.0, 250.0, 250.0], &[1e3, 1e4, 1e5]),
            (&[200.0, 300.0, 250.0], &[1e3, 1e4, 1e5]),
        ];
        for (t, p) in cases {
            let xsec = [2.0, 3.0, 5.0];
            let fit = fit_band(t, p, &xsec, &FitConfig::default()).unwrap();
            let used = fit.model.slots();
            for (slot, &value) in fit.coefficients.as_slice().iter().enumerate() {
                if !used.contains(&slot) {
                    assert_eq!(value, 0.0, "slot {slot} of {:?}", fit.model);
                }
            }
        }
    }

    #[test]
    fn mismatched_lengths_are_errors() {
        let err = fit_band(&[1.0, 2.0], &[1.0], &[1.0, 2.0], &FitConfig::default()).unwrap_err();
        assert!(matches!(err, XsecError::LengthMismatch { .. }));
    }

    #[test]
    fn band_record_fits_each_bin() {
        let (t, p) = grid();
        let frequencies = [1.0e13, 1.1e13, 1.2e13];
        let spectra: Vec<Vec<f64>> = t
            .iter()
            .zip(&p)
            .map(|(&ti, &pi)| {
                let z = 1.0 + 0.01 * ti + 0.5 * pi.log10();
                vec![z * z, 4.0 * z * z, f64::NAN]
            })
            .collect();

        let band = fit_band_record(&frequencies, &t, &p, &spectra, &FitConfig::default()).unwrap();
        assert_eq!(band.record.coefficients.len(), 3);
        assert_abs_diff_eq!(band.record.coefficients[1].p10(), 0.02, epsilon = 1e-7);
        assert_eq!(band.degenerate_bins(), 1);
        assert_eq!(band.record.coefficients[2], Coefficients::ZERO);
        assert_eq!(band.record.envelope.min_temperature, 200.0);
        assert_eq!(band.record.envelope.max_temperature, 300.0);

        let counts = band.model_counts();
        assert!(counts.contains(&(ModelKind::Poly22, 2)));
        assert!(counts.contains(&(ModelKind::Constant, 1)));
    }

    #[test]
    fn band_record_rejects_short_spectra() {
        let err = fit_band_record(&[1.0, 2.0], &[250.0], &[1e4], &[vec![1.0]], &FitConfig::default())
            .unwrap_err();
        assert!(matches!(err, XsecError::LengthMismatch { .. }));
    }
}
