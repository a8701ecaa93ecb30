//! Reporting: formatted terminal output for fits, spectra and species.

pub mod format;

pub use format::*;
