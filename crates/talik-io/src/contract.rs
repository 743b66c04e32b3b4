//! Simulation input contract types.
//!
//! These types define the I/O boundary of the coupling engine. A run is
//! configured by one coupled TOML file (the `[coupling]` table) naming
//! exactly two model TOML files, one per subdomain.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use talik_solver::{
    MechanicsBoundary, MechanicsMaterial, NonlinearSettings, ThermalBoundary, ThermalMaterial,
};
use talik_types::{ProblemKind, TalikError, TalikResult};

/// Top-level structure of a coupled configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouplingFile {
    /// The `[coupling]` table.
    pub coupling: CouplingSettings,
}

/// Raw coupling options as written in the configuration file.
///
/// Numeric firewalls and enum parsing happen when these settings are
/// resolved into the driver's configuration; this type only fixes the
/// schema and the defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouplingSettings {
    /// Ordered model input files, one per subdomain. Must name exactly 2.
    pub model_input_files: Vec<String>,

    /// Inner-loop iteration floor.
    #[serde(default = "default_min_iterations")]
    pub minimum_iterations: u32,

    /// Inner-loop iteration cap.
    #[serde(default = "default_max_iterations")]
    pub maximum_iterations: u32,

    /// Relative convergence tolerance.
    #[serde(default = "default_rel_tolerance")]
    pub relative_tolerance: f64,

    /// Absolute convergence tolerance.
    #[serde(default = "default_abs_tolerance")]
    pub absolute_tolerance: f64,

    /// Outer time-step cap.
    pub maximum_steps: u32,

    /// Simulation start time.
    #[serde(default)]
    pub initial_time: f64,

    /// Simulation end time.
    pub final_time: f64,

    /// First candidate step size.
    pub initial_time_step: f64,

    /// Smallest admissible step size; defaults to the initial step.
    pub minimum_time_step: Option<f64>,

    /// Largest admissible step size; defaults to the initial step.
    pub maximum_time_step: Option<f64>,

    /// Step shrink factor applied on rejection, in (0, 1].
    #[serde(default = "default_factor")]
    pub reduction_factor: f64,

    /// Step growth factor applied on acceptance, ≥ 1.
    #[serde(default = "default_factor")]
    pub amplification_factor: f64,

    /// Write results every this many accepted steps.
    #[serde(default = "default_write_interval")]
    pub output_write_interval: u32,

    /// Use the integrator's own initial guess instead of warm-starting
    /// from the previous Schwarz iterate.
    #[serde(default)]
    pub standard_initial_guess: bool,

    /// Convergence criterion: ABSOLUTE, RELATIVE or BOTH (any case).
    #[serde(default = "default_criterion")]
    pub convergence_criterion: String,

    /// Convergence operator for BOTH: AND or OR (any case).
    #[serde(default = "default_operator")]
    pub convergence_operator: String,

    /// Weight of rate norms in the convergence metric; defaults to the
    /// initial step size.
    pub tolerance_factor_velocity: Option<f64>,

    /// Weight of acceleration norms in the convergence metric; defaults
    /// to the squared initial step size.
    pub tolerance_factor_acceleration: Option<f64>,
}

fn default_min_iterations() -> u32 {
    talik_types::constants::DEFAULT_MIN_ITERATIONS
}

fn default_max_iterations() -> u32 {
    talik_types::constants::DEFAULT_MAX_ITERATIONS
}

fn default_rel_tolerance() -> f64 {
    talik_types::constants::DEFAULT_REL_TOLERANCE
}

fn default_abs_tolerance() -> f64 {
    talik_types::constants::DEFAULT_ABS_TOLERANCE
}

fn default_factor() -> f64 {
    1.0
}

fn default_write_interval() -> u32 {
    talik_types::constants::DEFAULT_WRITE_INTERVAL
}

fn default_criterion() -> String {
    "BOTH".to_string()
}

fn default_operator() -> String {
    "AND".to_string()
}

impl CouplingFile {
    /// Parses a coupled configuration from TOML text.
    pub fn from_toml(text: &str) -> TalikResult<Self> {
        toml::from_str(text).map_err(|e| TalikError::InvalidConfig(e.to_string()))
    }
}

/// One subdomain's model configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInput {
    /// The `[problem]` section.
    pub problem: ProblemSettings,
    /// The `[solver]` section.
    pub solver: SolverSettings,
    /// The `[mesh]` section.
    pub mesh: MeshSettings,
    /// Thermal model parameters; meaningful for thermal subdomains.
    #[serde(default)]
    pub thermal: ThermalSettings,
    /// Mechanics model parameters; meaningful for mechanics subdomains.
    #[serde(default)]
    pub mechanics: MechanicsSettings,
    /// The `[output]` section.
    #[serde(default)]
    pub output: OutputSettings,
    /// Sensitivity parameters are not supported in coupled runs; the
    /// validator rejects configurations that carry this section.
    pub parameters: Option<toml::Value>,
    /// Response functions are not supported in coupled runs; the
    /// validator rejects configurations that carry this section.
    pub response_functions: Option<toml::Value>,
}

/// Problem identification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemSettings {
    /// Problem name carrying a 3-character dimension suffix,
    /// e.g. `"Mechanics 1D"` or `"ACE Thermal 1D"`.
    pub name: String,
}

/// Solution-method selection for one subdomain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverSettings {
    /// `"newton"` (static) or `"transient"` (dynamic). All subdomains
    /// must agree on the category.
    pub method: String,
    /// Settings for the transient method.
    #[serde(default)]
    pub transient: TransientSettings,
    /// Nonlinear iteration settings forwarded to the integrator.
    #[serde(default)]
    pub nonlinear: NonlinearSettings,
}

/// Transient-integrator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransientSettings {
    /// Internal stepping mode. Only `"constant"` is accepted: step
    /// adaptation is owned by the coupling loop, not the integrator.
    pub step_type: String,
}

impl Default for TransientSettings {
    fn default() -> Self {
        Self {
            step_type: "constant".to_string(),
        }
    }
}

/// Discretization of the subdomain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshSettings {
    /// Number of grid nodes.
    pub nodes: usize,
    /// Physical length of the rod (meters).
    pub length: f64,
}

/// Thermal model configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ThermalSettings {
    /// Material parameters.
    pub material: ThermalMaterial,
    /// Boundary conditions.
    pub boundary: ThermalBoundary,
    /// Uniform initial temperature (K).
    pub initial_temperature: Option<f64>,
}

/// Mechanics model configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MechanicsSettings {
    /// Material parameters.
    pub material: MechanicsMaterial,
    /// Boundary conditions.
    pub boundary: MechanicsBoundary,
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Whether this subdomain writes results at all.
    pub enabled: bool,
    /// Results file path; required when output is enabled.
    pub path: Option<String>,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            path: None,
        }
    }
}

impl ModelInput {
    /// Parses a model configuration from TOML text.
    pub fn from_toml(text: &str) -> TalikResult<Self> {
        toml::from_str(text).map_err(|e| TalikError::InvalidConfig(e.to_string()))
    }

    /// Resolves the problem kind from the configured problem name, or
    /// `None` if the name resolves to neither supported problem.
    pub fn problem_kind(&self) -> Option<ProblemKind> {
        match base_name(&self.problem.name) {
            "Mechanics" => Some(ProblemKind::Mechanics),
            "ACE Thermal" => Some(ProblemKind::Thermal),
            _ => None,
        }
    }
}

/// In "Mechanics 1D", extract "Mechanics".
///
/// Problem names carry a fixed 3-character dimension suffix; names
/// shorter than that are returned unchanged.
pub fn base_name(name: &str) -> &str {
    if name.len() < 3 {
        return name;
    }
    &name[..name.len() - 3]
}

/// One coupled run's fully loaded inputs.
#[derive(Debug, Clone)]
pub struct CoupledInput {
    /// The `[coupling]` table of the coupled file.
    pub settings: CouplingSettings,
    /// The parsed model files, in `model_input_files` order.
    pub models: Vec<ModelInput>,
    /// Directory the coupled file was loaded from; output paths are
    /// resolved against it.
    pub base_dir: PathBuf,
}

/// Loads a coupled configuration and the model files it names.
///
/// Model paths are resolved relative to the coupled file's directory.
pub fn load_coupled_input(path: &Path) -> TalikResult<CoupledInput> {
    let text = std::fs::read_to_string(path)?;
    let file = CouplingFile::from_toml(&text)?;

    let base_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    let mut models = Vec::with_capacity(file.coupling.model_input_files.len());
    for name in &file.coupling.model_input_files {
        let model_path = base_dir.join(name);
        let model_text = std::fs::read_to_string(&model_path).map_err(|e| {
            TalikError::InvalidConfig(format!(
                "cannot read model input file '{}': {e}",
                model_path.display()
            ))
        })?;
        models.push(ModelInput::from_toml(&model_text)?);
    }

    Ok(CoupledInput {
        settings: file.coupling,
        models,
        base_dir,
    })
}
