//! Model selection by data spread.
//!
//! Which polynomial can be fitted to a bin depends on how much the valid
//! samples spread along each axis. The rules below are checked in order and
//! the first match wins: a richer 2D model when both axes are well covered,
//! a 1D model when only one axis is, and the mean otherwise.
//!
//! | # | ΔlogP            | ΔT              | N    | model    |
//! |---|------------------|-----------------|------|----------|
//! | 1 | `>= min_dlogp`   | `> min_dt`      | `>5` | Poly22   |
//! | 2 | `>= min_dlogp`   | `> min_dt`      | `>2` | Poly11   |
//! | 3 | `<  min_dlogp`   | `> min_dt`      | `>2` | Poly2T   |
//! | 4 | `<  min_dlogp`   | `> min_dt`      | `>1` | Poly1T   |
//! | 5 | `>  min_dlogp`   | `< min_dt`      | `>2` | Poly2P   |
//! | 6 | `>  min_dlogp`   | `< min_dt`      | `>1` | Poly1P   |
//! | 7 | otherwise        |                 |      | Constant |
//!
//! The sample gates guarantee that a solve is never attempted with fewer rows
//! than columns.

use crate::domain::{FitConfig, ModelKind};

/// Comparison of an observed spread against its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Spread {
    AtLeast,
    Above,
    Below,
}

impl Spread {
    fn holds(self, delta: f64, threshold: f64) -> bool {
        match self {
            Spread::AtLeast => delta >= threshold,
            Spread::Above => delta > threshold,
            Spread::Below => delta < threshold,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct SelectionRule {
    log_p: Spread,
    temperature: Spread,
    /// The rule needs strictly more valid samples than this.
    more_than: usize,
    model: ModelKind,
}

const SELECTION_RULES: [SelectionRule; 6] = [
    SelectionRule {
        log_p: Spread::AtLeast,
        temperature: Spread::Above,
        more_than: 5,
        model: ModelKind::Poly22,
    },
    SelectionRule {
        log_p: Spread::AtLeast,
        temperature: Spread::Above,
        more_than: 2,
        model: ModelKind::Poly11,
    },
    SelectionRule {
        log_p: Spread::Below,
        temperature: Spread::Above,
        more_than: 2,
        model: ModelKind::Poly2T,
    },
    SelectionRule {
        log_p: Spread::Below,
        temperature: Spread::Above,
        more_than: 1,
        model: ModelKind::Poly1T,
    },
    SelectionRule {
        log_p: Spread::Above,
        temperature: Spread::Below,
        more_than: 2,
        model: ModelKind::Poly2P,
    },
    SelectionRule {
        log_p: Spread::Above,
        temperature: Spread::Below,
        more_than: 1,
        model: ModelKind::Poly1P,
    },
];

/// Pick the model for `n` valid samples spanning `delta_log_p` in log10 Pa
/// and `delta_t` in K.
pub fn select_model(n: usize, delta_log_p: f64, delta_t: f64, config: &FitConfig) -> ModelKind {
    SELECTION_RULES
        .iter()
        .find(|rule| {
            rule.log_p.holds(delta_log_p, config.min_delta_log_p)
                && rule.temperature.holds(delta_t, config.min_delta_t)
                && n > rule.more_than
        })
        .map(|rule| rule.model)
        .unwrap_or(ModelKind::Constant)
}
