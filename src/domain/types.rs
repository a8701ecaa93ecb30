//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - produced by the fitter and consumed by the evaluator in-memory
//! - persisted to JSON as species records
//! - reported as per-bin diagnostics

use serde::{Deserialize, Serialize};

use crate::error::XsecError;

/// Speed of light in vacuum [m/s].
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

/// Default minimum spread of `log10(P)` (log10 Pa) needed to fit a pressure term.
pub const DEFAULT_MIN_DELTA_LOG_P: f64 = 0.2;

/// Default minimum spread of `T` (K) needed to fit a temperature term.
pub const DEFAULT_MIN_DELTA_T: f64 = 20.0;

/// Number of slots in a coefficient set.
pub const COEFF_LEN: usize = 6;

/// Names of the coefficient slots, in storage order.
pub const COEFF_NAMES: [&str; COEFF_LEN] = ["p00", "p10", "p01", "p20", "p11", "p02"];

/// Human-readable form of the fitted surface.
pub const FIT_FORMULA: &str = "p00 + p10*x + p01*y + p20*x**2 + p11*x*y + p02*y**2";

/// Convert a wavenumber [cm⁻¹] to a frequency [Hz].
pub fn wavenumber_to_frequency(wavenumber: f64) -> f64 {
    wavenumber * SPEED_OF_LIGHT * 100.0
}

/// Convert a frequency [Hz] to a wavenumber [cm⁻¹].
pub fn frequency_to_wavenumber(frequency: f64) -> f64 {
    frequency / (SPEED_OF_LIGHT * 100.0)
}

/// Concrete polynomial sub-model chosen for a frequency bin.
///
/// `x = T` and `y = log10(P)`; every kind stores its coefficients in the same
/// six-slot layout, with the slots it does not use left at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// Quadratic in both `x` and `y`.
    Poly22,
    /// Linear in both `x` and `y`.
    Poly11,
    /// Quadratic in temperature only.
    Poly2T,
    /// Linear in temperature only.
    Poly1T,
    /// Quadratic in pressure only.
    Poly2P,
    /// Linear in pressure only.
    Poly1P,
    /// Mean of the data, no solve.
    Constant,
}

impl ModelKind {
    pub const ALL: [ModelKind; 7] = [
        ModelKind::Poly22,
        ModelKind::Poly11,
        ModelKind::Poly2T,
        ModelKind::Poly1T,
        ModelKind::Poly2P,
        ModelKind::Poly1P,
        ModelKind::Constant,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            ModelKind::Poly22 => "quadratic(T, logP)",
            ModelKind::Poly11 => "linear(T, logP)",
            ModelKind::Poly2T => "quadratic(T)",
            ModelKind::Poly1T => "linear(T)",
            ModelKind::Poly2P => "quadratic(logP)",
            ModelKind::Poly1P => "linear(logP)",
            ModelKind::Constant => "constant",
        }
    }

    /// Coefficient slots this model fills, in design-matrix column order.
    pub fn slots(self) -> &'static [usize] {
        match self {
            ModelKind::Poly22 => &[0, 1, 2, 3, 4, 5],
            ModelKind::Poly11 => &[0, 1, 2],
            ModelKind::Poly2T => &[0, 1, 3],
            ModelKind::Poly1T => &[0, 1],
            ModelKind::Poly2P => &[0, 2, 5],
            ModelKind::Poly1P => &[0, 2],
            ModelKind::Constant => &[0],
        }
    }

    /// Number of fitted coefficients.
    pub fn coeff_count(self) -> usize {
        self.slots().len()
    }
}

/// The six polynomial coefficients `p00, p10, p01, p20, p11, p02` of one bin.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Coefficients(pub [f64; COEFF_LEN]);

impl Coefficients {
    pub const ZERO: Coefficients = Coefficients([0.0; COEFF_LEN]);

    pub fn p00(&self) -> f64 {
        self.0[0]
    }
    pub fn p10(&self) -> f64 {
        self.0[1]
    }
    pub fn p01(&self) -> f64 {
        self.0[2]
    }
    pub fn p20(&self) -> f64 {
        self.0[3]
    }
    pub fn p11(&self) -> f64 {
        self.0[4]
    }
    pub fn p02(&self) -> f64 {
        self.0[5]
    }

    /// Scatter a sub-model's solved coefficients into the six-slot layout.
    pub fn from_model(model: ModelKind, solved: &[f64]) -> Result<Self, XsecError> {
        let slots = model.slots();
        if solved.len() != slots.len() {
            return Err(XsecError::LengthMismatch {
                what: "solved coefficients",
                expected: slots.len(),
                found: solved.len(),
            });
        }
        let mut out = [0.0; COEFF_LEN];
        for (&slot, &value) in slots.iter().zip(solved) {
            out[slot] = value;
        }
        Ok(Coefficients(out))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

impl TryFrom<&[f64]> for Coefficients {
    type Error = XsecError;

    fn try_from(values: &[f64]) -> Result<Self, Self::Error> {
        let arr: [f64; COEFF_LEN] = values
            .try_into()
            .map_err(|_| XsecError::CoefficientCount(values.len()))?;
        Ok(Coefficients(arr))
    }
}

/// Rectangular `(T, P)` region spanned by the samples of a fit.
///
/// An envelope built from zero samples uses the sentinels `min = +inf`,
/// `max = -inf` on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(with = "crate::domain::nonfinite")]
    pub min_temperature: f64,
    #[serde(with = "crate::domain::nonfinite")]
    pub max_temperature: f64,
    #[serde(with = "crate::domain::nonfinite")]
    pub min_pressure: f64,
    #[serde(with = "crate::domain::nonfinite")]
    pub max_pressure: f64,
}

impl Envelope {
    pub fn new(min_temperature: f64, max_temperature: f64, min_pressure: f64, max_pressure: f64) -> Self {
        Self {
            min_temperature,
            max_temperature,
            min_pressure,
            max_pressure,
        }
    }

    /// Envelope of zero samples.
    pub fn empty() -> Self {
        Self::new(f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY)
    }

    /// Envelope that never triggers extrapolation.
    pub fn unbounded() -> Self {
        Self::new(0.0, f64::INFINITY, 0.0, f64::INFINITY)
    }

    pub fn is_empty(&self) -> bool {
        !(self.min_temperature <= self.max_temperature && self.min_pressure <= self.max_pressure)
    }

    /// Closed-rectangle membership test.
    pub fn contains(&self, temperature: f64, pressure: f64) -> bool {
        temperature >= self.min_temperature
            && temperature <= self.max_temperature
            && pressure >= self.min_pressure
            && pressure <= self.max_pressure
    }

    /// Clamp each axis independently onto the rectangle.
    pub fn clamp(&self, temperature: f64, pressure: f64) -> (f64, f64) {
        (
            clamp_axis(temperature, self.min_temperature, self.max_temperature),
            clamp_axis(pressure, self.min_pressure, self.max_pressure),
        )
    }

    /// Smallest envelope covering both inputs. Empty envelopes are neutral.
    pub fn union(&self, other: &Envelope) -> Envelope {
        Envelope::new(
            self.min_temperature.min(other.min_temperature),
            self.max_temperature.max(other.max_temperature),
            self.min_pressure.min(other.min_pressure),
            self.max_pressure.max(other.max_pressure),
        )
    }
}

// NaN passes through unchanged.
fn clamp_axis(value: f64, min: f64, max: f64) -> f64 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Thresholds controlling model selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitConfig {
    /// Minimum `max(log10 P) - min(log10 P)` for a pressure term.
    pub min_delta_log_p: f64,
    /// Minimum `max(T) - min(T)` for a temperature term [K].
    pub min_delta_t: f64,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            min_delta_log_p: DEFAULT_MIN_DELTA_LOG_P,
            min_delta_t: DEFAULT_MIN_DELTA_T,
        }
    }
}

impl FitConfig {
    pub fn validate(&self) -> Result<(), XsecError> {
        if !(self.min_delta_log_p.is_finite() && self.min_delta_log_p >= 0.0) {
            return Err(XsecError::InvalidThreshold {
                name: "min_delta_log_p",
                value: self.min_delta_log_p,
            });
        }
        if !(self.min_delta_t.is_finite() && self.min_delta_t >= 0.0) {
            return Err(XsecError::InvalidThreshold {
                name: "min_delta_t",
                value: self.min_delta_t,
            });
        }
        Ok(())
    }
}

/// Fit output for a single frequency bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    pub coefficients: Coefficients,
    pub model: ModelKind,
    /// Sum of squared residuals in `sqrt(Xsec)` space. NaN for the degenerate result.
    #[serde(with = "crate::domain::nonfinite")]
    pub residual: f64,
    /// Effective rank of the design matrix; `None` when no solve was run.
    pub rank: Option<usize>,
    /// Singular values of the design matrix (descending); `None` when no solve was run.
    pub singular_values: Option<Vec<f64>>,
    /// Adjusted R² of the fit in `sqrt(Xsec)` space; NaN when undefined.
    #[serde(with = "crate::domain::nonfinite")]
    pub adjusted_r_squared: f64,
    pub envelope: Envelope,
    pub sample_count: usize,
}

impl FitResult {
    /// Result for a bin without a single usable sample.
    pub fn degenerate() -> Self {
        Self {
            coefficients: Coefficients::ZERO,
            model: ModelKind::Constant,
            residual: f64::NAN,
            rank: None,
            singular_values: None,
            adjusted_r_squared: f64::NAN,
            envelope: Envelope::empty(),
            sample_count: 0,
        }
    }

    pub fn min_temperature(&self) -> f64 {
        self.envelope.min_temperature
    }
    pub fn max_temperature(&self) -> f64 {
        self.envelope.max_temperature
    }
    pub fn min_pressure(&self) -> f64 {
        self.envelope.min_pressure
    }
    pub fn max_pressure(&self) -> f64 {
        self.envelope.max_pressure
    }
}

/// One fitted band: a native frequency grid with one coefficient set per
/// grid point and a shared `(T, P)` envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandRecord {
    /// Native frequency grid [Hz], strictly increasing.
    pub frequencies: Vec<f64>,
    pub coefficients: Vec<Coefficients>,
    pub envelope: Envelope,
}

impl BandRecord {
    /// Check the grid/coefficient layout. `index` is the band's position in
    /// its species record (for error messages).
    pub fn validate(&self, index: usize) -> Result<(), XsecError> {
        if self.coefficients.len() != self.frequencies.len() {
            return Err(XsecError::LengthMismatch {
                what: "band coefficients",
                expected: self.frequencies.len(),
                found: self.coefficients.len(),
            });
        }
        if let Some(i) = self.frequencies.windows(2).position(|w| !(w[1] > w[0])) {
            return Err(XsecError::UnsortedGrid {
                band: index,
                index: i + 1,
            });
        }
        Ok(())
    }

    /// Wavenumber range covered by the band [cm⁻¹].
    pub fn wavenumber_range(&self) -> Option<(f64, f64)> {
        let first = *self.frequencies.first()?;
        let last = *self.frequencies.last()?;
        Some((frequency_to_wavenumber(first), frequency_to_wavenumber(last)))
    }
}

/// All fitted bands of one species.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesRecord {
    pub species: String,
    pub bands: Vec<BandRecord>,
}
