//! Shared pipeline logic behind the `fit` and `eval` subcommands.
//!
//! fit:  observation CSV -> per-band fits -> species record -> record store
//! eval: record store -> band selection -> assembled spectrum
//!
//! The front-end (`app`) only turns arguments into requests and prints.

use std::path::{Path, PathBuf};

use crate::domain::{FitConfig, SpeciesRecord, wavenumber_to_frequency};
use crate::error::AppError;
use crate::fit::{BandFit, fit_band_record};
use crate::io::ingest::{IngestedObservations, load_observations};
use crate::io::{load_species_record, save_species_record, write_diagnostics_json};
use crate::species::{select_bands, species_info};
use crate::spectrum::assemble_spectrum;

/// All computed outputs of a single `xsec fit` run.
#[derive(Debug, Clone)]
pub struct FitRun {
    pub ingest: IngestedObservations,
    pub record: SpeciesRecord,
    /// Per-band fits, in record order.
    pub bands: Vec<(String, BandFit)>,
    pub record_path: PathBuf,
}

/// Fit every band of `ingest` into a species record.
pub fn fit_observations(
    ingest: &IngestedObservations,
    species: &str,
    config: &FitConfig,
) -> Result<(SpeciesRecord, Vec<(String, BandFit)>), AppError> {
    if ingest.bands.is_empty() {
        return Err(AppError::new(3, "No usable observations to fit."));
    }

    let mut bands = Vec::with_capacity(ingest.bands.len());
    for obs in &ingest.bands {
        let frequencies: Vec<f64> = obs.wavenumbers.iter().map(|&w| wavenumber_to_frequency(w)).collect();
        let fit = fit_band_record(&frequencies, &obs.temperature, &obs.pressure, &obs.spectra, config)
            .map_err(|e| AppError::from(e).with_context(&format!("band '{}'", obs.band)))?;

        log::info!(
            "band '{}': {} bins from {} spectra ({} degenerate)",
            obs.band,
            obs.wavenumbers.len(),
            obs.spectra.len(),
            fit.degenerate_bins()
        );
        bands.push((obs.band.clone(), fit));
    }

    let record = SpeciesRecord {
        species: species.to_string(),
        bands: bands.iter().map(|(_, fit)| fit.record.clone()).collect(),
    };
    Ok((record, bands))
}

/// Execute `xsec fit`: ingest, fit, store, and optionally write diagnostics.
pub fn run_fit(
    input: &Path,
    species: &str,
    output: &Path,
    config: &FitConfig,
    diagnostics: Option<&Path>,
) -> Result<FitRun, AppError> {
    config.validate()?;
    if species_info(species).is_none() {
        log::warn!("species '{species}' is not in the species table");
    }

    let ingest = load_observations(input)?;
    log::info!(
        "read {} rows from '{}' ({} used, {} rejected)",
        ingest.rows_read,
        input.display(),
        ingest.rows_used,
        ingest.row_errors.len()
    );
    for err in &ingest.row_errors {
        log::warn!("line {}: {}", err.line, err.message);
    }

    let (record, bands) = fit_observations(&ingest, species, config)?;
    let record_path = save_species_record(output, &record, Some(*config))?;
    log::info!("wrote '{}'", record_path.display());

    if let Some(path) = diagnostics {
        write_diagnostics_json(path, &bands)?;
        log::info!("wrote diagnostics '{}'", path.display());
    }

    Ok(FitRun {
        ingest,
        record,
        bands,
        record_path,
    })
}

/// One `xsec eval` request.
#[derive(Debug, Clone)]
pub struct EvalRequest {
    pub temperature: f64,
    pub pressure: f64,
    /// Target grid [cm⁻¹].
    pub wavenumbers: Vec<f64>,
    /// Skip band selection by the species table.
    pub all_bands: bool,
}

#[derive(Debug, Clone)]
pub struct EvalRun {
    pub species: String,
    /// Indices of the record bands that were summed.
    pub used_bands: Vec<usize>,
    pub total_bands: usize,
    pub wavenumbers: Vec<f64>,
    pub xsec: Vec<f64>,
}

/// Keep the bands of `record` that the species table asks for.
pub fn restrict_to_species_bands(record: SpeciesRecord) -> (SpeciesRecord, Vec<usize>) {
    let Some(info) = species_info(&record.species) else {
        let all = (0..record.bands.len()).collect();
        return (record, all);
    };
    let keep = select_bands(info, &record);
    let bands = keep.iter().map(|&i| record.bands[i].clone()).collect();
    (
        SpeciesRecord {
            species: record.species,
            bands,
        },
        keep,
    )
}

/// Execute `xsec eval`: load the record and assemble the spectrum.
pub fn run_eval(coeffs: &Path, species: &str, request: &EvalRequest) -> Result<EvalRun, AppError> {
    let record = load_species_record(coeffs, species)?;
    let total_bands = record.bands.len();

    let (record, used_bands) = if request.all_bands {
        let all = (0..total_bands).collect();
        (record, all)
    } else {
        restrict_to_species_bands(record)
    };
    if used_bands.len() < total_bands {
        log::info!("using {} of {total_bands} bands of '{species}'", used_bands.len());
    }

    let xsec = assemble_spectrum(&request.wavenumbers, &record, request.temperature, request.pressure)?;

    Ok(EvalRun {
        species: species.to_string(),
        used_bands,
        total_bands,
        wavenumbers: request.wavenumbers.clone(),
        xsec,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{SynthConfig, generate_observations};
    use crate::io::ingest::read_observations;
    use crate::io::write_observations_csv;
    use crate::domain::{BandRecord, Coefficients, Envelope};

    fn synthetic_ingest(spectra: usize, bins: usize) -> IngestedObservations {
        let set = generate_observations(&SynthConfig {
            spectra,
            bins,
            noise: 0.0,
            ..SynthConfig::default()
        })
        .unwrap();
        let mut buf = Vec::new();
        {
            let mut writer = csv::Writer::from_writer(&mut buf);
            for row in &set.rows {
                writer.serialize(row).unwrap();
            }
            writer.flush().unwrap();
        }
        read_observations(buf.as_slice()).unwrap()
    }

    #[test]
    fn fits_every_band() {
        let ingest = synthetic_ingest(12, 6);
        let (record, bands) = fit_observations(&ingest, "TEST", &FitConfig::default()).unwrap();
        assert_eq!(record.bands.len(), 2);
        assert_eq!(bands.len(), 2);
        assert_eq!(record.bands[0].frequencies.len(), 6);
        assert_eq!(bands[0].1.degenerate_bins(), 0);
    }

    #[test]
    fn empty_ingest_is_a_data_error() {
        let ingest = IngestedObservations {
            bands: vec![],
            row_errors: vec![],
            rows_read: 0,
            rows_used: 0,
        };
        let err = fit_observations(&ingest, "TEST", &FitConfig::default()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn fit_then_eval_through_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("obs.csv");
        let coeffs = dir.path().join("coeffs");
        let diag = dir.path().join("diag.json");

        let set = generate_observations(&SynthConfig {
            spectra: 10,
            bins: 5,
            noise: 0.0,
            ..SynthConfig::default()
        })
        .unwrap();
        write_observations_csv(&input, &set.rows).unwrap();

        let run = run_fit(&input, "TEST", &coeffs, &FitConfig::default(), Some(&diag)).unwrap();
        assert_eq!(run.record_path, coeffs.join("TEST.json"));
        assert!(diag.exists());

        let request = EvalRequest {
            temperature: 250.0,
            pressure: 1e4,
            wavenumbers: vec![700.0, 775.0, 1230.0, 1500.0],
            all_bands: false,
        };
        let eval = run_eval(&coeffs, "TEST", &request).unwrap();
        assert_eq!(eval.used_bands, vec![0, 1]);
        assert_eq!(eval.xsec[0], 0.0);
        assert!(eval.xsec[1] > 0.0);
        assert!(eval.xsec[2] > 0.0);
        assert_eq!(eval.xsec[3], 0.0);
    }

    #[test]
    fn species_table_restricts_bands() {
        let band = |lo: f64, hi: f64| BandRecord {
            frequencies: vec![wavenumber_to_frequency(lo), wavenumber_to_frequency(hi)],
            coefficients: vec![Coefficients::ZERO; 2],
            envelope: Envelope::empty(),
        };
        // CCl4 keeps 700-860 cm-1 only.
        let record = SpeciesRecord {
            species: "CCl4".to_string(),
            bands: vec![band(750.0, 812.0), band(1500.0, 1600.0)],
        };
        let (kept, indices) = restrict_to_species_bands(record);
        assert_eq!(indices, vec![0]);
        assert_eq!(kept.bands.len(), 1);
    }

    #[test]
    fn eval_of_missing_species_fails() {
        let dir = tempfile::tempdir().unwrap();
        let request = EvalRequest {
            temperature: 250.0,
            pressure: 1e4,
            wavenumbers: vec![800.0],
            all_bands: true,
        };
        assert!(run_eval(dir.path(), "NOPE", &request).is_err());
    }
}
