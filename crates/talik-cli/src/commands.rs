//! CLI command implementations.

use std::path::Path;

use talik_coupling::{build_driver, Termination};
use talik_io::{load_coupled_input, read_frames, validate_coupled_input, CouplingFile, ModelInput};
use talik_telemetry::TracingSink;

/// Run a coupled simulation from a config file.
pub fn simulate(config_path: &str, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    println!("Talik Coupled Simulation");
    println!("────────────────────────");
    println!("Config: {config_path}");
    println!();

    let input = load_coupled_input(Path::new(config_path))?;
    let mut driver = build_driver(&input)?;

    if verbose {
        tracing_subscriber::fmt::init();
        driver
            .bus_mut()
            .add_sink(Box::new(TracingSink::new(tracing::Level::INFO)));
    }

    let summary = driver.run()?;

    println!("Steps accepted:  {}", summary.steps_accepted);
    println!("Final time:      {:.6e}", summary.final_time);
    println!("Final step size: {:.6e}", summary.final_time_step);
    println!(
        "Last loop:       {} iterations, converged: {}",
        summary.iterations,
        if summary.converged { "yes" } else { "no" }
    );

    match summary.termination {
        Termination::MaxSteps => {
            println!("Stopped at the configured maximum number of steps.");
            Ok(())
        }
        Termination::FinalTime => {
            println!("Reached the configured final time.");
            Ok(())
        }
        Termination::StepTooSmall => {
            Err("simulation stopped early: step size at minimum with no room to reduce".into())
        }
    }
}

/// Validate a coupled or model config.
pub fn validate(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    println!("Talik Validator");
    println!("───────────────");
    println!();

    let text = std::fs::read_to_string(path)?;

    // A coupled file carries a [coupling] table; anything else is
    // treated as a single-subdomain model file.
    if let Ok(_file) = CouplingFile::from_toml(&text) {
        println!("Validating coupled config: {path}");
        let input = load_coupled_input(Path::new(path))?;
        validate_coupled_input(&input)?;
        talik_coupling::CouplingConfig::from_settings(&input.settings)?;
        println!(
            "✅ Coupled config is valid ({} subdomains).",
            input.models.len()
        );
        return Ok(());
    }

    println!("Validating model config: {path}");
    let model = ModelInput::from_toml(&text)?;
    match model.problem_kind() {
        Some(kind) => println!(
            "✅ Model config is valid ('{}' resolves to {kind}).",
            model.problem.name
        ),
        None => println!(
            "❌ Problem name '{}' resolves to neither 'Mechanics' nor 'ACE Thermal'.",
            model.problem.name
        ),
    }

    Ok(())
}

/// Inspect a results file.
pub fn inspect(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    println!("Talik Results Inspector");
    println!("───────────────────────");
    println!();

    let frames = read_frames(Path::new(path))?;
    if frames.is_empty() {
        println!("No frames in {path}.");
        return Ok(());
    }

    let first = &frames[0];
    let last = &frames[frames.len() - 1];

    println!("Frames:       {}", frames.len());
    println!("Time range:   [{:.6e}, {:.6e}]", first.time, last.time);
    println!("Step range:   [{}, {}]", first.step, last.step);
    println!("Field size:   {} dofs", last.solution.len());
    println!(
        "Acceleration: {}",
        if last.acceleration.is_some() {
            "present"
        } else {
            "absent"
        }
    );

    // Quick stats over the final frame.
    let min = last.solution.iter().copied().fold(f64::INFINITY, f64::min);
    let max = last
        .solution
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);
    println!("Final field:  [{min:.6e}, {max:.6e}]");

    Ok(())
}
