//! Coupled-input validation.
//!
//! Validates a loaded configuration before any subdomain is built,
//! catching configuration-level errors early with clear diagnostics.
//! Everything rejected here is fatal at startup and never recoverable.

use talik_types::{ProblemKind, TalikError, TalikResult};

use crate::contract::{CoupledInput, ModelInput};

/// Validates a complete coupled input.
///
/// Checks:
/// - exactly 2 model input files are named and loaded
/// - each problem name resolves to a supported problem kind
/// - both a Mechanics and an ACE Thermal problem are present
/// - all subdomains use the same solution-method category
/// - transient subdomains use constant internal stepping
/// - unsupported sections are absent
/// - the discretizations are sane and match across subdomains
pub fn validate_coupled_input(input: &CoupledInput) -> TalikResult<()> {
    let n = input.models.len();
    if n != 2 {
        return Err(TalikError::InvalidConfig(format!(
            "Sequential thermo-mechanical coupling requires exactly 2 model input files, got {n}"
        )));
    }
    if input.settings.model_input_files.len() != n {
        return Err(TalikError::InvalidConfig(format!(
            "Loaded {} models for {} configured model input files",
            n,
            input.settings.model_input_files.len()
        )));
    }

    let mut mechanics_found = false;
    let mut thermal_found = false;

    for model in &input.models {
        match model.problem_kind() {
            Some(ProblemKind::Mechanics) => mechanics_found = true,
            Some(ProblemKind::Thermal) => thermal_found = true,
            None => {
                return Err(TalikError::InvalidConfig(format!(
                    "Problem name '{}' must resolve to 'Mechanics' or 'ACE Thermal'",
                    model.problem.name
                )));
            }
        }
        validate_model(model)?;
    }

    if !mechanics_found {
        return Err(TalikError::InvalidConfig(
            "'Mechanics' needs to be one of the coupled problems, but it is not found".into(),
        ));
    }
    if !thermal_found {
        return Err(TalikError::InvalidConfig(
            "'ACE Thermal' needs to be one of the coupled problems, but it is not found".into(),
        ));
    }

    // All subdomains must share one solution-method category.
    let first_method = method_category(&input.models[0])?;
    for model in &input.models[1..] {
        if method_category(model)? != first_method {
            return Err(TalikError::InvalidConfig(
                "All subdomains must use the same solution method (newton or transient)".into(),
            ));
        }
    }

    // The coupling field exchange assumes a matching interface
    // discretization.
    let nodes = input.models[0].mesh.nodes;
    for model in &input.models[1..] {
        if model.mesh.nodes != nodes {
            return Err(TalikError::InvalidConfig(format!(
                "Subdomain grids must agree on node count, got {} and {}",
                nodes, model.mesh.nodes
            )));
        }
    }

    Ok(())
}

/// The two supported solution-method categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodCategory {
    /// Static Newton solve per step.
    Newton,
    /// Transient time integration per step.
    Transient,
}

/// Resolves and checks one model's solution method.
pub fn method_category(model: &ModelInput) -> TalikResult<MethodCategory> {
    match model.solver.method.to_lowercase().as_str() {
        "newton" => Ok(MethodCategory::Newton),
        "transient" => {
            if !model.solver.transient.step_type.eq_ignore_ascii_case("constant") {
                return Err(TalikError::InvalidConfig(format!(
                    "Non-constant integrator stepping ('{}') is not supported: \
                     variable time-stepping is handled by the coupling loop. \
                     Use step_type = \"constant\"",
                    model.solver.transient.step_type
                )));
            }
            Ok(MethodCategory::Transient)
        }
        other => Err(TalikError::InvalidConfig(format!(
            "Unknown solution method '{other}' (expected 'newton' or 'transient')"
        ))),
    }
}

fn validate_model(model: &ModelInput) -> TalikResult<()> {
    if model.parameters.is_some() {
        return Err(TalikError::InvalidConfig(
            "Parameters not supported".into(),
        ));
    }
    if model.response_functions.is_some() {
        return Err(TalikError::InvalidConfig(
            "Response Functions not supported".into(),
        ));
    }

    if model.mesh.nodes < 2 {
        return Err(TalikError::InvalidConfig(format!(
            "Mesh needs at least 2 nodes, got {}",
            model.mesh.nodes
        )));
    }
    if model.mesh.length <= 0.0 {
        return Err(TalikError::InvalidConfig(format!(
            "Mesh length must be positive, got {}",
            model.mesh.length
        )));
    }

    if model.output.enabled && model.output.path.is_none() {
        return Err(TalikError::InvalidConfig(
            "Output is enabled but no output path is configured".into(),
        ));
    }

    Ok(())
}
