//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - polynomial model kinds and six-slot coefficient sets
//! - per-bin fit outputs (`FitResult`) and their `(T, P)` envelope
//! - fitted band and species records consumed by the evaluator

pub mod nonfinite;
pub mod types;

pub use types::*;
