use approx::assert_relative_eq;
use xsec_fit::app::pipeline::{EvalRequest, run_eval, run_fit};
use xsec_fit::data::{SynthConfig, generate_observations, surface_xsec};
use xsec_fit::domain::{FitConfig, ModelKind, wavenumber_to_frequency};
use xsec_fit::io::{load_species_record, write_observations_csv};
use xsec_fit::models::evaluate_with_extrapolation;
use xsec_fit::spectrum::assemble_spectrum;

fn noiseless(spectra: usize, bins: usize) -> SynthConfig {
    SynthConfig {
        spectra,
        bins,
        noise: 0.0,
        ..SynthConfig::default()
    }
}

#[test]
fn noiseless_observations_reproduce_the_generating_surface() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("obs.csv");
    let coeffs = dir.path().join("coeffs");

    let set = generate_observations(&noiseless(20, 8)).unwrap();
    write_observations_csv(&input, &set.rows).unwrap();
    let run = run_fit(&input, "SYN", &coeffs, &FitConfig::default(), None).unwrap();

    for (_, fit) in &run.bands {
        assert!(fit.bins.iter().all(|b| b.model == ModelKind::Poly22));
        assert!(fit.bins.iter().all(|b| b.rank == Some(6)));
    }

    let record = load_species_record(&coeffs, "SYN").unwrap();
    assert_eq!(record, run.record);

    let (temperature, pressure) = (245.0, 10f64.powf(3.5));
    for band in &set.bands {
        let out = assemble_spectrum(&band.wavenumbers, &record, temperature, pressure).unwrap();
        for (value, c) in out.iter().zip(&band.coefficients) {
            assert_relative_eq!(*value, surface_xsec(c, temperature, pressure), max_relative = 1e-6);
        }
    }

    let truth = set.truth("SYN");
    let target: Vec<f64> = (0..50).map(|i| 740.0 + 12.0 * i as f64).collect();
    let fitted = assemble_spectrum(&target, &record, temperature, pressure).unwrap();
    let expected = assemble_spectrum(&target, &truth, temperature, pressure).unwrap();
    for (f, e) in fitted.iter().zip(&expected) {
        if *e == 0.0 {
            assert_eq!(*f, 0.0);
        } else {
            assert_relative_eq!(*f, *e, max_relative = 1e-6);
        }
    }
}

#[test]
fn noisy_fit_stays_close_and_reports_quality() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("obs.csv");
    let coeffs = dir.path().join("coeffs");
    let diag = dir.path().join("diag.json");

    let set = generate_observations(&SynthConfig {
        spectra: 40,
        bins: 6,
        noise: 0.01,
        seed: 11,
    })
    .unwrap();
    write_observations_csv(&input, &set.rows).unwrap();
    let run = run_fit(&input, "SYN", &coeffs, &FitConfig::default(), Some(&diag)).unwrap();

    for (_, fit) in &run.bands {
        for bin in &fit.bins {
            assert_eq!(bin.sample_count, 40);
            assert!(bin.adjusted_r_squared.is_finite());
            assert!(bin.residual >= 0.0);
        }
    }

    let request = EvalRequest {
        temperature: 245.0,
        pressure: 10f64.powf(3.5),
        wavenumbers: set.bands[0].wavenumbers.clone(),
        all_bands: true,
    };
    let eval = run_eval(&coeffs, "SYN", &request).unwrap();
    for (value, c) in eval.xsec.iter().zip(&set.bands[0].coefficients) {
        assert_relative_eq!(*value, surface_xsec(c, request.temperature, request.pressure), max_relative = 0.02);
    }

    let diagnostics: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&diag).unwrap()).unwrap();
    let bands = diagnostics.as_array().unwrap();
    assert_eq!(bands.len(), 2);
    assert_eq!(bands[0]["band"], "band1");
    assert_eq!(bands[0]["bins"].as_array().unwrap().len(), 6);
    assert_eq!(bands[0]["bins"][0]["model"], "poly22");
}

#[test]
fn evaluation_outside_the_envelope_is_continuous() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("obs.csv");
    let coeffs = dir.path().join("coeffs");

    let set = generate_observations(&noiseless(15, 3)).unwrap();
    write_observations_csv(&input, &set.rows).unwrap();
    run_fit(&input, "SYN", &coeffs, &FitConfig::default(), None).unwrap();
    let record = load_species_record(&coeffs, "SYN").unwrap();

    let band = &record.bands[0];
    let env = band.envelope;
    let c = &band.coefficients[1];
    let p = (env.min_pressure * env.max_pressure).sqrt();

    let at_edge = evaluate_with_extrapolation(env.max_temperature, p, c, &env).unwrap();
    let just_past = evaluate_with_extrapolation(env.max_temperature + 1e-6, p, c, &env).unwrap();
    assert_relative_eq!(at_edge, just_past, max_relative = 1e-6);

    let far = evaluate_with_extrapolation(env.max_temperature + 100.0, p, c, &env).unwrap();
    assert!(far.is_finite());
    assert_eq!(band.frequencies[0], wavenumber_to_frequency(set.bands[0].wavenumbers[0]));
}
