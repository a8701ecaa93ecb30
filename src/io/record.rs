//! Read/write species record JSON files.
//!
//! A record file is the portable representation of a fitted species:
//! - the fitted bands (frequency grid, coefficients, envelope)
//! - the selection thresholds used to produce them
//! - a small header (tool, timestamp, formula) for provenance
//!
//! Files live in a coefficients directory as `<species>.json`.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{COEFF_NAMES, FIT_FORMULA, FitConfig, SpeciesRecord};
use crate::error::AppError;

const RECORD_EXT: &str = "json";

/// On-disk layout of a species record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordFile {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub formula: String,
    pub coeff_names: Vec<String>,
    pub fit_config: Option<FitConfig>,
    pub record: SpeciesRecord,
}

impl RecordFile {
    pub fn new(record: SpeciesRecord, fit_config: Option<FitConfig>) -> Self {
        Self {
            tool: "xsec".to_string(),
            generated_at: Utc::now(),
            formula: FIT_FORMULA.to_string(),
            coeff_names: COEFF_NAMES.iter().map(|s| s.to_string()).collect(),
            fit_config,
            record,
        }
    }
}

/// Path of the record file for `species` inside `dir`.
pub fn record_path(dir: &Path, species: &str) -> PathBuf {
    dir.join(format!("{species}.{RECORD_EXT}"))
}

/// Write `record` to `<dir>/<species>.json`, creating `dir` if needed.
pub fn save_species_record(
    dir: &Path,
    record: &SpeciesRecord,
    fit_config: Option<FitConfig>,
) -> Result<PathBuf, AppError> {
    fs::create_dir_all(dir)
        .map_err(|e| AppError::new(2, format!("Failed to create directory '{}': {e}", dir.display())))?;

    let path = record_path(dir, &record.species);
    let file = File::create(&path)
        .map_err(|e| AppError::new(2, format!("Failed to create record '{}': {e}", path.display())))?;

    let contents = RecordFile::new(record.clone(), fit_config);
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &contents)
        .map_err(|e| AppError::new(2, format!("Failed to write record JSON: {e}")))?;
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to write record JSON: {e}")))?;

    Ok(path)
}

/// Read a record file from an explicit path.
pub fn read_record_file(path: &Path) -> Result<RecordFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open record '{}': {e}", path.display())))?;
    serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid record JSON '{}': {e}", path.display())))
}

/// Load the record of `species` from `dir`.
pub fn load_species_record(dir: &Path, species: &str) -> Result<SpeciesRecord, AppError> {
    let file = read_record_file(&record_path(dir, species))?;
    if file.record.species != species {
        return Err(AppError::new(
            3,
            format!(
                "Record file for '{species}' contains species '{}'.",
                file.record.species
            ),
        ));
    }
    Ok(file.record)
}

/// Sorted species names with a record file in `dir`.
pub fn list_species(dir: &Path) -> Result<Vec<String>, AppError> {
    let entries = fs::read_dir(dir)
        .map_err(|e| AppError::new(2, format!("Failed to read directory '{}': {e}", dir.display())))?;

    let mut species: Vec<String> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == RECORD_EXT))
        .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(str::to_string))
        .collect();
    species.sort();
    species.dedup();
    Ok(species)
}
