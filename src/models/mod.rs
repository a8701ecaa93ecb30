//! Cross-section model evaluation.
//!
//! Models are implemented as small, pure functions of `(T, P, coefficients)`
//! so that the fitter, the assembler and reports can share them.

pub mod xsec;

pub use xsec::*;
