//! Command-line parsing for the cross-section surrogate fitter.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the fitting/evaluation code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{DEFAULT_MIN_DELTA_LOG_P, DEFAULT_MIN_DELTA_T};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "xsec",
    version,
    about = "Polynomial surrogate models for trace-gas absorption cross-sections"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit coefficients for every band of an observation CSV and store the species record.
    Fit(FitArgs),
    /// Evaluate a stored species record at one (T, P) on a wavenumber grid.
    Eval(EvalArgs),
    /// Show the species table, one species, or the records stored in a coefficients directory.
    Species(SpeciesArgs),
    /// Write a synthetic observation CSV generated from a known surface.
    Synth(SynthArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// Observation CSV (band,spectrum,temperature,pressure,wavenumber,xsec).
    #[arg(short = 'i', long, value_name = "CSV")]
    pub input: PathBuf,

    /// Species name the record is stored under.
    #[arg(short = 's', long)]
    pub species: String,

    /// Coefficients directory; the record is written to `<DIR>/<species>.json`.
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output: PathBuf,

    /// Minimum log10(P) spread required for pressure terms.
    #[arg(long = "min-delta-logp", default_value_t = DEFAULT_MIN_DELTA_LOG_P)]
    pub min_delta_log_p: f64,

    /// Minimum temperature spread [K] required for temperature terms.
    #[arg(long = "min-delta-t", default_value_t = DEFAULT_MIN_DELTA_T)]
    pub min_delta_t: f64,

    /// Write per-bin fit diagnostics to this JSON file.
    #[arg(long, value_name = "JSON")]
    pub diagnostics: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
pub struct EvalArgs {
    /// Coefficients directory written by `xsec fit`.
    #[arg(short = 'c', long, value_name = "DIR")]
    pub coeffs: PathBuf,

    #[arg(short = 's', long)]
    pub species: String,

    /// Temperature [K].
    #[arg(short = 't', long)]
    pub temperature: f64,

    /// Pressure [Pa].
    #[arg(short = 'p', long)]
    pub pressure: f64,

    #[command(flatten)]
    pub grid: GridArgs,

    /// Use every band of the record, not only those overlapping the species' known bands.
    #[arg(long)]
    pub all_bands: bool,

    /// Export the spectrum to CSV instead of printing it.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,
}

/// Target wavenumber grid: an explicit list, or an evenly spaced range.
#[derive(Debug, Args, Clone)]
#[group(required = true, multiple = true)]
pub struct GridArgs {
    /// Comma-separated wavenumbers [cm⁻¹].
    #[arg(
        long,
        value_delimiter = ',',
        conflicts_with_all = ["wvn_min", "wvn_max", "steps"]
    )]
    pub wavenumbers: Option<Vec<f64>>,

    /// Lower end of the range [cm⁻¹].
    #[arg(long, requires_all = ["wvn_max", "steps"])]
    pub wvn_min: Option<f64>,

    /// Upper end of the range [cm⁻¹].
    #[arg(long, requires_all = ["wvn_min", "steps"])]
    pub wvn_max: Option<f64>,

    /// Number of grid points in the range.
    #[arg(long, requires_all = ["wvn_min", "wvn_max"])]
    pub steps: Option<usize>,
}

#[derive(Debug, Parser, Clone)]
pub struct SpeciesArgs {
    /// Species (or RFMIP) name; omit to list the whole table.
    pub name: Option<String>,

    /// List the members of a named group instead (`reference` or `rfmip`).
    #[arg(long, conflicts_with = "name")]
    pub group: Option<String>,

    /// List the species with a stored record in this coefficients directory.
    #[arg(long, value_name = "DIR", conflicts_with_all = ["name", "group"])]
    pub coeffs: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
pub struct SynthArgs {
    /// Output CSV path.
    #[arg(short = 'o', long, value_name = "CSV")]
    pub output: PathBuf,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Spectra per band.
    #[arg(long, default_value_t = 20)]
    pub spectra: usize,

    /// Bins per band.
    #[arg(long, default_value_t = 50)]
    pub bins: usize,

    /// Standard deviation of the log-normal noise factor.
    #[arg(long, default_value_t = 0.01)]
    pub noise: f64,
}
