//! Multi-band spectrum assembly.
//!
//! A species record holds several independently fitted bands. To obtain a
//! spectrum on a caller's wavenumber grid, each band is evaluated on its own
//! frequency grid, interpolated onto the target grid (zero outside the band)
//! and all contributions are summed.

pub mod assemble;

pub use assemble::*;
