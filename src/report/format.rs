//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the fitting/evaluation code stays clean and testable
//! - output changes are localized

use std::path::Path;

use crate::domain::{Envelope, FitConfig, ModelKind};
use crate::fit::BandFit;
use crate::io::ingest::IngestedObservations;
use crate::species::{SpeciesInfo, species_info};

/// Summary of a fit run: input stats, then one block per band.
pub fn format_fit_summary(
    species: &str,
    ingest: &IngestedObservations,
    bands: &[(String, BandFit)],
    config: &FitConfig,
) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== xsec - cross-section fit: {species} ===\n"));
    out.push_str(&format!(
        "Rows: read={} used={} rejected={}\n",
        ingest.rows_read,
        ingest.rows_used,
        ingest.row_errors.len()
    ));
    out.push_str(&format!(
        "Thresholds: min dlog10(P)={} | min dT={} K\n",
        config.min_delta_log_p, config.min_delta_t
    ));

    for (name, fit) in bands {
        out.push('\n');
        let bins = fit.bins.len();
        let range = fit
            .record
            .wavenumber_range()
            .map(|(lo, hi)| format!("{lo:.3}-{hi:.3} cm-1"))
            .unwrap_or_else(|| "empty".to_string());
        out.push_str(&format!("Band {name}: {bins} bins, {range}\n"));
        out.push_str(&format!("  envelope: {}\n", fmt_envelope(&fit.record.envelope)));
        if fit.degenerate_bins() > 0 {
            out.push_str(&format!("  degenerate bins: {}\n", fit.degenerate_bins()));
        }

        let mut counts = fit.model_counts();
        counts.sort_by_key(|(kind, _)| model_order(*kind));
        for (kind, count) in counts {
            out.push_str(&format!("  {:<18} {count:>6}\n", kind.display_name()));
        }

        let r2: Vec<f64> = fit
            .bins
            .iter()
            .map(|b| b.adjusted_r_squared)
            .filter(|v| v.is_finite())
            .collect();
        if !r2.is_empty() {
            let mean = r2.iter().sum::<f64>() / r2.len() as f64;
            let min = r2.iter().copied().fold(f64::INFINITY, f64::min);
            out.push_str(&format!("  adj. R2: mean={mean:.4} min={min:.4}\n"));
        }
    }

    out
}

fn model_order(kind: ModelKind) -> usize {
    ModelKind::ALL.iter().position(|k| *k == kind).unwrap_or(usize::MAX)
}

fn fmt_envelope(env: &Envelope) -> String {
    if env.is_empty() {
        return "none".to_string();
    }
    format!(
        "T=[{:.1}, {:.1}] K | P=[{:.4e}, {:.4e}] Pa",
        env.min_temperature, env.max_temperature, env.min_pressure, env.max_pressure
    )
}

/// Two-column spectrum table.
pub fn format_spectrum(
    species: &str,
    temperature: f64,
    pressure: f64,
    wavenumbers: &[f64],
    xsec: &[f64],
) -> String {
    let mut out = String::new();
    out.push_str(&format!("# {species} at T={temperature} K, P={pressure} Pa\n"));
    out.push_str(&format!("{:>14} {:>14}\n", "wavenumber", "xsec"));
    out.push_str(&format!("{:>14} {:>14}\n", "[cm-1]", "[m2]"));
    for (w, x) in wavenumbers.iter().zip(xsec) {
        out.push_str(&format!("{w:>14.4} {x:>14.6e}\n"));
    }
    out
}

/// One line per species.
pub fn format_species_table<'a>(species: impl IntoIterator<Item = &'a SpeciesInfo>) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<16} {:<12} {:<18} {:<6} {:>5}\n",
        "name", "altname", "rfmip", "active", "bands"
    ));
    out.push_str(&format!("{:-<16} {:-<12} {:-<18} {:-<6} {:->5}\n", "", "", "", "", ""));
    for info in species {
        out.push_str(
            format!(
                "{:<16} {:<12} {:<18} {:<6} {:>5}\n",
                truncate(info.name, 16),
                truncate(info.altname.unwrap_or("-"), 12),
                truncate(info.rfmip.unwrap_or("-"), 18),
                if info.active { "yes" } else { "no" },
                info.arts_bands.len(),
            )
            .trim_end(),
        );
        out.push('\n');
    }
    out
}

pub fn format_species_detail(info: &SpeciesInfo) -> String {
    let mut out = String::new();
    out.push_str(&format!("Species: {}\n", info.name));
    if let Some(alt) = info.altname {
        out.push_str(&format!("Alt name: {alt}\n"));
    }
    if let Some(rfmip) = info.rfmip {
        out.push_str(&format!("RFMIP: {rfmip}\n"));
    }
    out.push_str(&format!("Active: {}\n", if info.active { "yes" } else { "no" }));
    if let Some(t) = info.reftemp {
        out.push_str(&format!("Reference temperature: {t} K\n"));
    }
    if info.use_average {
        out.push_str("Uses averaged cross-sections\n");
    }
    if info.arts_bands.is_empty() {
        out.push_str("Bands: all\n");
    } else {
        out.push_str("Bands:\n");
        for (lo, hi) in info.arts_bands {
            out.push_str(&format!("  {lo:.1}-{hi:.1} cm-1\n"));
        }
    }
    out
}

/// Species with a record in a coefficients directory, flagged when the
/// species table does not know them.
pub fn format_stored_species(dir: &Path, species: &[String]) -> String {
    let mut out = format!("Records in {}: {}\n", dir.display(), species.len());
    for name in species {
        match species_info(name) {
            Some(info) if info.active => out.push_str(&format!("  {name}\n")),
            Some(_) => out.push_str(&format!("  {name} (inactive)\n")),
            None => out.push_str(&format!("  {name} (not in species table)\n")),
        }
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}
