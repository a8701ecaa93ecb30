//! Synthetic cross-section observations from a known coefficient surface.
//!
//! Every bin of every band carries its own polynomial surface
//! `sqrt(Xsec) = poly22(T, log10(P))`. Spectra are drawn at random
//! `(T, P)` conditions and multiplied by log-normal noise, so a noiseless
//! set is reproduced exactly by the fitter.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{Coefficients, SpeciesRecord, BandRecord, Envelope, wavenumber_to_frequency};
use crate::error::AppError;
use crate::io::ingest::ObservationRow;
use crate::math::basis_vector;

const TEMPERATURE_RANGE: (f64, f64) = (190.0, 300.0);
const LOG10_PRESSURE_RANGE: (f64, f64) = (2.0, 5.0);

/// Band layout: name and wavenumber range [cm⁻¹].
const BANDS: [(&str, f64, f64); 2] = [("band1", 750.0, 800.0), ("band2", 1200.0, 1260.0)];

/// Base `sqrt(Xsec)` level, i.e. a cross-section around 1e-22 m².
const BASE_LEVEL: f64 = 1e-11;

/// Shape of the surface relative to the base level. Positive over the
/// sampled `(T, log10 P)` rectangle.
const SHAPE: [f64; 6] = [0.5, 1.0e-3, 0.05, -1.0e-6, 1.0e-4, -0.01];

#[derive(Debug, Clone)]
pub struct SynthConfig {
    pub seed: u64,
    /// Spectra per band.
    pub spectra: usize,
    /// Bins per band.
    pub bins: usize,
    /// Standard deviation of the log-normal noise factor (0 = noiseless).
    pub noise: f64,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            spectra: 20,
            bins: 50,
            noise: 0.01,
        }
    }
}

/// The surface one band was generated from.
#[derive(Debug, Clone)]
pub struct SyntheticBand {
    pub name: String,
    /// Native grid [cm⁻¹].
    pub wavenumbers: Vec<f64>,
    pub coefficients: Vec<Coefficients>,
}

#[derive(Debug, Clone)]
pub struct SyntheticSet {
    pub rows: Vec<ObservationRow>,
    pub bands: Vec<SyntheticBand>,
}

impl SyntheticSet {
    /// The generating surfaces as a species record with an unbounded
    /// envelope, so evaluation never extrapolates.
    pub fn truth(&self, species: &str) -> SpeciesRecord {
        SpeciesRecord {
            species: species.to_string(),
            bands: self
                .bands
                .iter()
                .map(|b| BandRecord {
                    frequencies: b.wavenumbers.iter().map(|&w| wavenumber_to_frequency(w)).collect(),
                    coefficients: b.coefficients.clone(),
                    envelope: Envelope::unbounded(),
                })
                .collect(),
        }
    }
}

/// Noiseless cross-section of a surface at `(T, P)`.
pub fn surface_xsec(coefficients: &Coefficients, temperature: f64, pressure: f64) -> f64 {
    let z: f64 = basis_vector(temperature, pressure.log10())
        .iter()
        .zip(coefficients.as_slice())
        .map(|(b, c)| b * c)
        .sum();
    z * z
}

fn bin_coefficients(band_index: usize, bin: usize, bins: usize) -> Coefficients {
    // Smooth band profile between 0.5 and 1.5 times the base level.
    let phase = (bin as f64 + 0.5) / bins as f64 + band_index as f64 * 0.25;
    let level = BASE_LEVEL * (1.0 + 0.5 * (std::f64::consts::PI * phase).sin());
    Coefficients(SHAPE.map(|s| s * level))
}

pub fn generate_observations(config: &SynthConfig) -> Result<SyntheticSet, AppError> {
    if config.spectra == 0 {
        return Err(AppError::new(2, "Spectrum count must be > 0."));
    }
    if config.bins < 2 {
        return Err(AppError::new(2, "Bin count must be >= 2."));
    }
    let normal = Normal::new(0.0, config.noise)
        .map_err(|e| AppError::new(2, format!("Invalid noise level {}: {e}", config.noise)))?;
    let mut rng = StdRng::seed_from_u64(config.seed);

    let mut rows = Vec::with_capacity(BANDS.len() * config.spectra * config.bins);
    let mut bands = Vec::with_capacity(BANDS.len());

    for (band_index, &(name, wvn_lo, wvn_hi)) in BANDS.iter().enumerate() {
        let step = (wvn_hi - wvn_lo) / (config.bins - 1) as f64;
        let wavenumbers: Vec<f64> = (0..config.bins).map(|j| wvn_lo + step * j as f64).collect();
        let coefficients: Vec<Coefficients> = (0..config.bins)
            .map(|j| bin_coefficients(band_index, j, config.bins))
            .collect();

        for i in 0..config.spectra {
            let temperature = rng.gen_range(TEMPERATURE_RANGE.0..=TEMPERATURE_RANGE.1);
            let pressure = 10f64.powf(rng.gen_range(LOG10_PRESSURE_RANGE.0..=LOG10_PRESSURE_RANGE.1));
            let spectrum = format!("{name}-{:03}", i + 1);

            for (&wavenumber, c) in wavenumbers.iter().zip(&coefficients) {
                let noise = normal.sample(&mut rng);
                rows.push(ObservationRow {
                    band: name.to_string(),
                    spectrum: spectrum.clone(),
                    temperature,
                    pressure,
                    wavenumber,
                    xsec: surface_xsec(c, temperature, pressure) * noise.exp(),
                });
            }
        }

        bands.push(SyntheticBand {
            name: name.to_string(),
            wavenumbers,
            coefficients,
        });
    }

    log::debug!(
        "generated {} observation rows ({} bands x {} spectra x {} bins)",
        rows.len(),
        bands.len(),
        config.spectra,
        config.bins
    );

    Ok(SyntheticSet { rows, bands })
}
