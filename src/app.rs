//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - turns them into fit/eval requests
//! - runs the pipeline
//! - prints reports and writes optional exports

use clap::Parser;

use crate::cli::{Command, EvalArgs, FitArgs, GridArgs, SpeciesArgs, SynthArgs};
use crate::data::{SynthConfig, generate_observations};
use crate::domain::FitConfig;
use crate::error::AppError;
use crate::io::{list_species, write_observations_csv, write_spectrum_csv};
use crate::species::{all_species, lookup_rfmip, species_group, species_info};

pub mod pipeline;

/// Entry point for the `xsec` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Eval(args) => handle_eval(args),
        Command::Species(args) => handle_species(args),
        Command::Synth(args) => handle_synth(args),
    }
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(&args);
    let run = pipeline::run_fit(
        &args.input,
        &args.species,
        &args.output,
        &config,
        args.diagnostics.as_deref(),
    )?;

    println!(
        "{}",
        crate::report::format_fit_summary(&args.species, &run.ingest, &run.bands, &config)
    );
    println!("Record: {}", run.record_path.display());
    Ok(())
}

fn handle_eval(args: EvalArgs) -> Result<(), AppError> {
    let request = pipeline::EvalRequest {
        temperature: args.temperature,
        pressure: args.pressure,
        wavenumbers: target_grid(&args.grid)?,
        all_bands: args.all_bands,
    };
    let run = pipeline::run_eval(&args.coeffs, &args.species, &request)?;

    match &args.export {
        Some(path) => {
            write_spectrum_csv(path, &run.wavenumbers, &run.xsec, request.temperature, request.pressure)?;
            println!("Wrote {} points to {}", run.xsec.len(), path.display());
        }
        None => print!(
            "{}",
            crate::report::format_spectrum(
                &run.species,
                request.temperature,
                request.pressure,
                &run.wavenumbers,
                &run.xsec
            )
        ),
    }
    Ok(())
}

fn handle_species(args: SpeciesArgs) -> Result<(), AppError> {
    if let Some(dir) = &args.coeffs {
        let stored = list_species(dir)?;
        print!("{}", crate::report::format_stored_species(dir, &stored));
        return Ok(());
    }

    if let Some(group) = &args.group {
        let members = species_group(group)
            .ok_or_else(|| AppError::new(2, format!("Unknown species group '{group}' (expected reference or rfmip).")))?;
        for name in members {
            println!("{name}");
        }
        return Ok(());
    }

    match &args.name {
        None => print!("{}", crate::report::format_species_table(all_species())),
        Some(name) => {
            let info = species_info(name)
                .or_else(|| lookup_rfmip(name))
                .ok_or_else(|| AppError::new(2, format!("Unknown species '{name}'.")))?;
            print!("{}", crate::report::format_species_detail(info));
        }
    }
    Ok(())
}

fn handle_synth(args: SynthArgs) -> Result<(), AppError> {
    let config = SynthConfig {
        seed: args.seed,
        spectra: args.spectra,
        bins: args.bins,
        noise: args.noise,
    };
    let set = generate_observations(&config)?;
    write_observations_csv(&args.output, &set.rows)?;
    println!(
        "Wrote {} rows ({} bands) to {}",
        set.rows.len(),
        set.bands.len(),
        args.output.display()
    );
    Ok(())
}

pub fn fit_config_from_args(args: &FitArgs) -> FitConfig {
    FitConfig {
        min_delta_log_p: args.min_delta_log_p,
        min_delta_t: args.min_delta_t,
    }
}

/// Target wavenumber grid [cm⁻¹] from either an explicit list or a range.
pub fn target_grid(grid: &GridArgs) -> Result<Vec<f64>, AppError> {
    if let Some(list) = &grid.wavenumbers {
        if list.iter().any(|w| !w.is_finite()) {
            return Err(AppError::new(2, "Wavenumbers must be finite."));
        }
        return Ok(list.clone());
    }

    let (Some(lo), Some(hi), Some(steps)) = (grid.wvn_min, grid.wvn_max, grid.steps) else {
        return Err(AppError::new(2, "Provide --wavenumbers or --wvn-min/--wvn-max/--steps."));
    };
    if !(lo.is_finite() && hi.is_finite() && hi > lo) {
        return Err(AppError::new(2, format!("Invalid wavenumber range [{lo}, {hi}].")));
    }
    match steps {
        0 => Err(AppError::new(2, "Steps must be > 0.")),
        1 => Ok(vec![lo]),
        n => {
            let step = (hi - lo) / (n - 1) as f64;
            Ok((0..n).map(|i| lo + step * i as f64).collect())
        }
    }
}
