//! `xsec-fit` library crate.
//!
//! Polynomial surrogate models of trace-gas absorption cross-sections:
//! fit `sqrt(Xsec)` per frequency bin as a low-order polynomial in
//! temperature and log10(pressure), then evaluate and assemble spectra.
//!
//! The binary (`xsec`) is a thin wrapper around this library so that the
//! core logic is testable without spawning processes.

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod report;
pub mod species;
pub mod spectrum;
