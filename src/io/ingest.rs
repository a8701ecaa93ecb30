//! CSV ingest of harmonized cross-section spectra.
//!
//! This module is responsible for turning a long-format observation CSV
//!
//! ```text
//! band,spectrum,temperature,pressure,wavenumber,xsec
//! ```
//!
//! into per-band `(T, P, spectrum)` tables that the fitter can consume.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Shared grids**: every spectrum of a band must use the same wavenumbers
//! - **Separation of concerns**: no fitting logic here; a missing or
//!   non-finite `xsec` is kept as NaN and handled by the fitter

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

const REQUIRED_COLUMNS: [&str; 6] = ["band", "spectrum", "temperature", "pressure", "wavenumber", "xsec"];

/// Relative tolerance when comparing wavenumber grids of two spectra.
const GRID_RTOL: f64 = 1e-9;

/// One CSV row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationRow {
    pub band: String,
    pub spectrum: String,
    /// Temperature [K].
    pub temperature: f64,
    /// Pressure [Pa].
    pub pressure: f64,
    /// Wavenumber [cm⁻¹].
    pub wavenumber: f64,
    /// Cross-section [m²].
    pub xsec: f64,
}

/// All spectra of one band on a shared wavenumber grid.
#[derive(Debug, Clone)]
pub struct BandObservations {
    pub band: String,
    /// Shared grid [cm⁻¹], strictly increasing.
    pub wavenumbers: Vec<f64>,
    pub spectrum_ids: Vec<String>,
    pub temperature: Vec<f64>,
    pub pressure: Vec<f64>,
    /// `spectra[i][j]`: spectrum `i` at `wavenumbers[j]`.
    pub spectra: Vec<Vec<f64>>,
}

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: grouped bands + row errors.
#[derive(Debug, Clone)]
pub struct IngestedObservations {
    pub bands: Vec<BandObservations>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

/// Load an observation CSV from disk.
pub fn load_observations(path: &Path) -> Result<IngestedObservations, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    read_observations(file)
}

#[derive(Debug)]
struct SpectrumRows {
    id: String,
    temperature: f64,
    pressure: f64,
    points: Vec<(f64, f64)>,
}

#[derive(Debug)]
struct BandRows {
    name: String,
    spectra: Vec<SpectrumRows>,
    index: HashMap<String, usize>,
}

/// Parse observations from any reader (see module docs for the schema).
pub fn read_observations<R: Read>(input: R) -> Result<IngestedObservations, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);
    for name in REQUIRED_COLUMNS {
        if !header_map.contains_key(name) {
            return Err(AppError::new(2, format!("Missing required column: `{name}`")));
        }
    }

    let mut bands: Vec<BandRows> = Vec::new();
    let mut band_index: HashMap<String, usize> = HashMap::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;
    let mut rows_used = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header line, and lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let row = match result
            .map_err(|e| format!("CSV parse error: {e}"))
            .and_then(|record| parse_row(&record, &header_map))
        {
            Ok(row) => row,
            Err(message) => {
                row_errors.push(RowError { line, message });
                continue;
            }
        };

        let b = *band_index.entry(row.band.clone()).or_insert_with(|| {
            bands.push(BandRows {
                name: row.band.clone(),
                spectra: Vec::new(),
                index: HashMap::new(),
            });
            bands.len() - 1
        });
        let band = &mut bands[b];

        let s = match band.index.get(&row.spectrum) {
            Some(&s) => s,
            None => {
                band.spectra.push(SpectrumRows {
                    id: row.spectrum.clone(),
                    temperature: row.temperature,
                    pressure: row.pressure,
                    points: Vec::new(),
                });
                band.index.insert(row.spectrum.clone(), band.spectra.len() - 1);
                band.spectra.len() - 1
            }
        };
        let spectrum = &mut band.spectra[s];

        if !same_value(spectrum.temperature, row.temperature) || !same_value(spectrum.pressure, row.pressure) {
            row_errors.push(RowError {
                line,
                message: format!(
                    "Spectrum '{}' of band '{}' changes temperature/pressure mid-spectrum.",
                    row.spectrum, row.band
                ),
            });
            continue;
        }

        spectrum.points.push((row.wavenumber, row.xsec));
        rows_used += 1;
    }

    if rows_used == 0 {
        return Err(AppError::new(3, "No valid observation rows found."));
    }

    let bands = bands.into_iter().map(finish_band).collect::<Result<Vec<_>, _>>()?;

    Ok(IngestedObservations {
        bands,
        row_errors,
        rows_read,
        rows_used,
    })
}

fn finish_band(band: BandRows) -> Result<BandObservations, AppError> {
    let mut wavenumbers: Option<Vec<f64>> = None;
    let mut out = BandObservations {
        band: band.name.clone(),
        wavenumbers: Vec::new(),
        spectrum_ids: Vec::new(),
        temperature: Vec::new(),
        pressure: Vec::new(),
        spectra: Vec::new(),
    };

    for mut spectrum in band.spectra {
        spectrum
            .points
            .sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        let grid: Vec<f64> = spectrum.points.iter().map(|p| p.0).collect();

        if grid.windows(2).any(|w| w[1] <= w[0]) {
            return Err(AppError::new(
                3,
                format!(
                    "Band '{}': spectrum '{}' repeats a wavenumber.",
                    band.name, spectrum.id
                ),
            ));
        }

        match &wavenumbers {
            None => wavenumbers = Some(grid),
            Some(shared) => {
                let matches = shared.len() == grid.len()
                    && shared.iter().zip(&grid).all(|(a, b)| (a - b).abs() <= GRID_RTOL * a.abs().max(1.0));
                if !matches {
                    return Err(AppError::new(
                        3,
                        format!(
                            "Band '{}': spectrum '{}' does not share the band's wavenumber grid.",
                            band.name, spectrum.id
                        ),
                    ));
                }
            }
        }

        out.spectrum_ids.push(spectrum.id);
        out.temperature.push(spectrum.temperature);
        out.pressure.push(spectrum.pressure);
        out.spectra.push(spectrum.points.iter().map(|p| p.1).collect());
    }

    out.wavenumbers = wavenumbers.unwrap_or_default();
    Ok(out)
}

fn same_value(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn parse_row(record: &StringRecord, header_map: &HashMap<String, usize>) -> Result<ObservationRow, String> {
    let band = get_required(record, header_map, "band")?.to_string();
    let spectrum = get_required(record, header_map, "spectrum")?.to_string();
    let wavenumber = parse_finite(get_required(record, header_map, "wavenumber")?, "wavenumber")?;

    // T/P/Xsec may legitimately be NaN; the fitter drops such samples.
    let temperature = parse_f64(get_required(record, header_map, "temperature")?, "temperature")?;
    let pressure = parse_f64(get_required(record, header_map, "pressure")?, "pressure")?;
    let xsec = match get_optional(record, header_map, "xsec") {
        Some(s) => parse_f64(s, "xsec")?,
        None => f64::NAN,
    };

    Ok(ObservationRow {
        band,
        spectrum,
        temperature,
        pressure,
        wavenumber,
        xsec,
    })
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn get_optional<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

fn parse_f64(s: &str, name: &str) -> Result<f64, String> {
    s.parse::<f64>()
        .map_err(|_| format!("Invalid `{name}` value: '{s}'"))
}

fn parse_finite(s: &str, name: &str) -> Result<f64, String> {
    let v = parse_f64(s, name)?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(format!("Non-finite `{name}` value: '{s}'"))
    }
}
