//! Exports: assembled spectra (CSV), per-bin fit diagnostics (JSON) and
//! observation tables (CSV, the same schema `ingest` reads).
//!
//! The CSV exports are meant to be easy to consume in spreadsheets or
//! downstream scripts.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::domain::{FitResult, frequency_to_wavenumber};
use crate::error::AppError;
use crate::fit::BandFit;
use crate::io::ingest::ObservationRow;

#[derive(Serialize)]
struct SpectrumRow {
    wavenumber_cm1: f64,
    temperature_k: f64,
    pressure_pa: f64,
    xsec_m2: f64,
}

/// Write an assembled spectrum to CSV.
pub fn write_spectrum_csv(
    path: &Path,
    wavenumbers: &[f64],
    xsec: &[f64],
    temperature: f64,
    pressure: f64,
) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create spectrum CSV '{}': {e}", path.display())))?;

    for (&wavenumber_cm1, &xsec_m2) in wavenumbers.iter().zip(xsec) {
        writer
            .serialize(SpectrumRow {
                wavenumber_cm1,
                temperature_k: temperature,
                pressure_pa: pressure,
                xsec_m2,
            })
            .map_err(|e| AppError::new(2, format!("Failed to write spectrum CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to write spectrum CSV: {e}")))
}

/// Write observation rows to CSV.
pub fn write_observations_csv(path: &Path, rows: &[ObservationRow]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create observation CSV '{}': {e}", path.display())))?;
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| AppError::new(2, format!("Failed to write observation CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to write observation CSV: {e}")))
}

#[derive(Serialize)]
struct BinDiagnostics<'a> {
    wavenumber_cm1: f64,
    #[serde(flatten)]
    fit: &'a FitResult,
}

#[derive(Serialize)]
struct BandDiagnostics<'a> {
    band: &'a str,
    bins: Vec<BinDiagnostics<'a>>,
}

/// Write per-bin fit diagnostics of every band to a JSON file.
pub fn write_diagnostics_json(path: &Path, bands: &[(String, BandFit)]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create diagnostics JSON '{}': {e}", path.display())))?;

    let payload: Vec<BandDiagnostics<'_>> = bands
        .iter()
        .map(|(name, fit)| BandDiagnostics {
            band: name,
            bins: fit
                .record
                .frequencies
                .iter()
                .zip(&fit.bins)
                .map(|(&f, bin)| BinDiagnostics {
                    wavenumber_cm1: frequency_to_wavenumber(f),
                    fit: bin,
                })
                .collect(),
        })
        .collect();

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &payload)
        .map_err(|e| AppError::new(2, format!("Failed to write diagnostics JSON: {e}")))?;
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to write diagnostics JSON: {e}")))
}
