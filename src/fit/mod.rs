//! Coefficient fitting.
//!
//! Responsibilities:
//!
//! - choose a polynomial model per frequency bin from the data spread
//! - solve for its coefficients and diagnostics
//! - fit all bins of a band (parallel) into a `BandRecord`

pub mod fitter;
pub mod selection;

pub use fitter::*;
pub use selection::*;
