//! Builds a runnable coupled driver from validated input.
//!
//! Wires the two subdomains together: each integrator persists into its
//! own mesh database and reads coupling data from the peer's, which is
//! why the databases are created before either integrator.

use talik_io::{
    method_category, validate_coupled_input, CoupledInput, MethodCategory, ModelInput,
    ResultsWriter,
};
use talik_mesh::{LineGrid, MeshDatabase, SharedDatabase};
use talik_solver::{
    ElastodynamicsIntegrator, ThermalConductionIntegrator, TransientIntegrator,
};
use talik_types::{ProblemKind, TalikError, TalikResult};

use crate::config::CouplingConfig;
use crate::driver::CouplingDriver;
use crate::subdomain::{NormWeights, Subdomain};

/// Default uniform initial temperature when the model file leaves it
/// unset (cold permafrost).
const DEFAULT_INITIAL_TEMPERATURE: f64 = 265.15;

/// Builds the coupled driver for a loaded input.
///
/// Validates the input first; a statically configured pair is rejected
/// here because only the transient coupling mode is executable.
pub fn build_driver(input: &CoupledInput) -> TalikResult<CouplingDriver<Subdomain>> {
    validate_coupled_input(input)?;
    let config = CouplingConfig::from_settings(&input.settings)?;

    if method_category(&input.models[0])? != MethodCategory::Transient {
        return Err(TalikError::InvalidConfig(
            "Sequential thermo-mechanical coupling currently supports transient (dynamic) \
             solves only"
                .into(),
        ));
    }

    let kinds: Vec<ProblemKind> = input
        .models
        .iter()
        .map(|model| {
            model.problem_kind().ok_or_else(|| {
                TalikError::InvalidConfig(format!(
                    "Problem name '{}' must resolve to 'Mechanics' or 'ACE Thermal'",
                    model.problem.name
                ))
            })
        })
        .collect::<TalikResult<_>>()?;

    // Databases first: each integrator holds its own and its peer's.
    let databases: Vec<SharedDatabase> = input
        .models
        .iter()
        .zip(&kinds)
        .map(|(model, kind)| {
            talik_mesh::shared(MeshDatabase::new(
                model.mesh.nodes,
                kind.has_acceleration(),
            ))
        })
        .collect();

    let weights = NormWeights {
        velocity: config.tolerance_factor_velocity,
        acceleration: config.tolerance_factor_acceleration,
    };

    let mut subdomains = Vec::with_capacity(input.models.len());
    for (i, (model, kind)) in input.models.iter().zip(&kinds).enumerate() {
        let peer = databases[input.models.len() - 1 - i].clone();
        let integrator = build_integrator(model, *kind, databases[i].clone(), peer)?;

        let writer = if model.output.enabled {
            let name = model.output.path.as_ref().ok_or_else(|| {
                TalikError::InvalidConfig(
                    "Output is enabled but no output path is configured".into(),
                )
            })?;
            Some(ResultsWriter::create(&input.base_dir.join(name))?)
        } else {
            None
        };

        subdomains.push(Subdomain::new(
            model.problem.name.clone(),
            *kind,
            integrator,
            databases[i].clone(),
            writer,
            weights,
        ));
    }

    CouplingDriver::new(config, subdomains)
}

fn build_integrator(
    model: &ModelInput,
    kind: ProblemKind,
    database: SharedDatabase,
    peer: SharedDatabase,
) -> TalikResult<Box<dyn TransientIntegrator>> {
    let grid = LineGrid::new(model.mesh.nodes, model.mesh.length)?;
    let nonlinear = model.solver.nonlinear.clone();

    match kind {
        ProblemKind::Thermal => {
            let settings = &model.thermal;
            let integrator = ThermalConductionIntegrator::new(
                grid,
                settings.material.clone(),
                settings.boundary.clone(),
                settings
                    .initial_temperature
                    .unwrap_or(DEFAULT_INITIAL_TEMPERATURE),
                nonlinear,
                database,
                Some(peer),
            )?;
            Ok(Box::new(integrator))
        }
        ProblemKind::Mechanics => {
            let settings = &model.mechanics;
            let integrator = ElastodynamicsIntegrator::new(
                grid,
                settings.material.clone(),
                settings.boundary.clone(),
                nonlinear,
                database,
                Some(peer),
            )?;
            Ok(Box::new(integrator))
        }
    }
}
