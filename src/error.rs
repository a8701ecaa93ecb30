//! Error types.
//!
//! - `XsecError`: failures of the numerical core (programmer-error class
//!   conditions such as mismatched lengths or non-positive pressure).
//! - `AppError`: what the `xsec` binary reports, carrying a process exit code.
//!
//! Expected data irregularities (NaN samples, too little spread to fit a
//! richer model) are never errors; they degrade into simpler fits.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum XsecError {
    #[error("Length mismatch: {what} has {found} entries, expected {expected}.")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Pressure must be positive and finite, got {0} Pa.")]
    NonPositivePressure(f64),

    #[error("A coefficient set needs exactly 6 entries (p00..p02), got {0}.")]
    CoefficientCount(usize),

    #[error("Underdetermined least-squares system: {rows} samples for {columns} columns.")]
    Underdetermined { rows: usize, columns: usize },

    #[error("Least-squares solve failed: {0}")]
    Solve(String),

    #[error("Frequency grid of band {band} is not strictly increasing at index {index}.")]
    UnsortedGrid { band: usize, index: usize },

    #[error("Invalid fit threshold {name}={value}: must be finite and non-negative.")]
    InvalidThreshold { name: &'static str, value: f64 },
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    /// Prefix the message with where the failure happened.
    pub fn with_context(self, context: &str) -> Self {
        Self {
            exit_code: self.exit_code,
            message: format!("{context}: {}", self.message),
        }
    }
}

impl From<XsecError> for AppError {
    fn from(err: XsecError) -> Self {
        let exit_code = match err {
            XsecError::InvalidThreshold { .. } => 2,
            XsecError::LengthMismatch { .. }
            | XsecError::NonPositivePressure(_)
            | XsecError::CoefficientCount(_)
            | XsecError::UnsortedGrid { .. } => 3,
            XsecError::Underdetermined { .. } | XsecError::Solve(_) => 4,
        };
        AppError::new(exit_code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
