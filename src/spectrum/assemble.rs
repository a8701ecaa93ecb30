//! Evaluate species records onto a target wavenumber grid.

use crate::domain::{BandRecord, SpeciesRecord, wavenumber_to_frequency};
use crate::error::XsecError;
use crate::math::interp_linear;
use crate::models::evaluate_with_extrapolation;

/// Cross-section of every bin of `band` at `(T, P)`, on the band's native grid.
pub fn evaluate_band(band: &BandRecord, temperature: f64, pressure: f64) -> Result<Vec<f64>, XsecError> {
    band.validate(0)?;
    band.coefficients
        .iter()
        .map(|c| evaluate_with_extrapolation(temperature, pressure, c, &band.envelope))
        .collect()
}

/// Contribution of one band on `target_frequencies` [Hz]; zero outside the
/// band's native frequency range.
pub fn band_contribution(
    band: &BandRecord,
    target_frequencies: &[f64],
    temperature: f64,
    pressure: f64,
) -> Result<Vec<f64>, XsecError> {
    let native = evaluate_band(band, temperature, pressure)?;
    interp_linear(&band.frequencies, &native, target_frequencies, 0.0)
}

/// Cross-section spectrum [m²] of `record` at `(T, P)` on
/// `target_wavenumbers` [cm⁻¹]. Overlapping bands add up.
pub fn assemble_spectrum(
    target_wavenumbers: &[f64],
    record: &SpeciesRecord,
    temperature: f64,
    pressure: f64,
) -> Result<Vec<f64>, XsecError> {
    let target_frequencies: Vec<f64> = target_wavenumbers.iter().map(|&w| wavenumber_to_frequency(w)).collect();

    let mut out = vec![0.0; target_wavenumbers.len()];
    for (index, band) in record.bands.iter().enumerate() {
        band.validate(index)?;
        let contribution = band_contribution(band, &target_frequencies, temperature, pressure)?;
        for (acc, v) in out.iter_mut().zip(contribution) {
            *acc += v;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Coefficients, Envelope};
    use approx::assert_relative_eq;

    /// Band on `[wvn_lo, wvn_hi]` cm⁻¹ whose bins carry a constant `sqrt(Xsec)`
    /// of `level + slope * i`.
    fn band(wvn_lo: f64, wvn_hi: f64, bins: usize, level: f64, slope: f64) -> BandRecord {
        let step = (wvn_hi - wvn_lo) / (bins - 1) as f64;
        BandRecord {
            frequencies: (0..bins)
                .map(|i| wavenumber_to_frequency(wvn_lo + step * i as f64))
                .collect(),
            coefficients: (0..bins)
                .map(|i| Coefficients([level + slope * i as f64, 1e-3, 0.0, 0.0, 0.0, 0.0]))
                .collect(),
            envelope: Envelope::new(200.0, 300.0, 1e3, 1e5),
        }
    }

    fn record(bands: Vec<BandRecord>) -> SpeciesRecord {
        SpeciesRecord {
            species: "TEST".to_string(),
            bands,
        }
    }

    #[test]
    fn band_contributes_nothing_outside_its_range() {
        let rec = record(vec![band(800.0, 900.0, 11, 1.0, 0.1)]);
        let target = [500.0, 700.0, 799.9, 900.1, 1200.0];
        let out = assemble_spectrum(&target, &rec, 250.0, 5e4).unwrap();
        assert!(out.iter().all(|&v| v == 0.0), "{out:?}");
    }

    #[test]
    fn native_grid_points_are_reproduced() {
        let b = band(800.0, 900.0, 11, 1.0, 0.1);
        let native = evaluate_band(&b, 250.0, 5e4).unwrap();
        let rec = record(vec![b]);
        let out = assemble_spectrum(&[800.0, 850.0, 900.0], &rec, 250.0, 5e4).unwrap();
        assert_relative_eq!(out[0], native[0], max_relative = 1e-9);
        assert_relative_eq!(out[1], native[5], max_relative = 1e-9);
        assert_relative_eq!(out[2], native[10], max_relative = 1e-9);
    }

    #[test]
    fn overlapping_bands_add() {
        let a = band(800.0, 900.0, 11, 1.0, 0.1);
        let b = band(850.0, 1000.0, 7, 2.0, -0.05);
        let target = [820.0, 875.0, 890.0, 950.0];
        let freqs: Vec<f64> = target.iter().map(|&w| wavenumber_to_frequency(w)).collect();

        let ca = band_contribution(&a, &freqs, 230.0, 2e4).unwrap();
        let cb = band_contribution(&b, &freqs, 230.0, 2e4).unwrap();
        let out = assemble_spectrum(&target, &record(vec![a, b]), 230.0, 2e4).unwrap();

        for i in 0..target.len() {
            assert_eq!(out[i], ca[i] + cb[i]);
        }
        assert!(ca[1] > 0.0 && cb[1] > 0.0);
        assert_eq!(cb[0], 0.0);
        assert_eq!(ca[3], 0.0);
    }

    #[test]
    fn bands_are_extrapolated_outside_their_envelope() {
        let b = band(800.0, 900.0, 3, 1.0, 0.0);
        let hot = evaluate_band(&b, 400.0, 5e4).unwrap();
        let edge = evaluate_band(&b, 300.0, 5e4).unwrap();
        // z = 1 + 1e-3*T, so d(z^2)/dT = 2z*1e-3 at the edge.
        let expected = edge[0] + 2.0 * 1.3 * 1e-3 * 100.0;
        assert_relative_eq!(hot[0], expected, max_relative = 1e-12);
    }

    #[test]
    fn empty_record_gives_zero_spectrum() {
        let out = assemble_spectrum(&[1.0, 2.0], &record(vec![]), 250.0, 1e4).unwrap();
        assert_eq!(out, vec![0.0, 0.0]);
    }

    #[test]
    fn invalid_band_layout_is_rejected() {
        let mut b = band(800.0, 900.0, 5, 1.0, 0.0);
        b.coefficients.pop();
        let err = assemble_spectrum(&[850.0], &record(vec![b]), 250.0, 1e4).unwrap_err();
        assert!(matches!(err, XsecError::LengthMismatch { .. }));
    }

    #[test]
    fn short_coefficient_list_is_a_length_error() {
        let mut b = band(800.0, 808.0, 5, 1.0, 0.0);
        b.coefficients.pop();
        let target = [wavenumber_to_frequency(803.5)];

        let err = band_contribution(&b, &target, 250.0, 1e4).unwrap_err();
        assert_eq!(
            err,
            XsecError::LengthMismatch {
                what: "band coefficients",
                expected: 5,
                found: 4,
            }
        );
        assert!(evaluate_band(&b, 250.0, 1e4).is_err());
    }

    #[test]
    fn unsorted_band_grid_is_rejected() {
        let mut b = band(800.0, 900.0, 3, 1.0, 0.0);
        b.frequencies.swap(0, 1);
        let err = band_contribution(&b, &[wavenumber_to_frequency(850.0)], 250.0, 1e4).unwrap_err();
        assert!(matches!(err, XsecError::UnsortedGrid { .. }));
    }

    #[test]
    fn non_positive_pressure_propagates() {
        let rec = record(vec![band(800.0, 900.0, 3, 1.0, 0.0)]);
        assert!(assemble_spectrum(&[850.0], &rec, 250.0, 0.0).is_err());
    }
}
