//! Reference thermal subdomain: 1-D transient heat conduction with a
//! freezing front.
//!
//! Implicit Euler in time; the latent heat of the phase change enters
//! through an apparent heat capacity inside the mushy zone, which makes
//! each sub-step a fixed-point iteration that can genuinely fail for
//! over-large steps. Element conductivity is scaled by the mechanical
//! strain read from the peer subdomain's mesh database — the coupling
//! path the alternating driver synchronizes.

use serde::{Deserialize, Serialize};
use talik_math::norms::{l2, l2_diff};
use talik_math::{CsrMatrix, FaerSolver, SparseSolver};
use talik_mesh::{LineGrid, SharedDatabase};
use talik_types::{TalikError, TalikResult};

use crate::integrator::{IntegratorStatus, NonlinearSettings, TransientIntegrator};
use crate::state::{InternalState, SolutionHistory, SolutionState, StateVectors};

/// Internal-state field name for the per-node ice saturation.
pub const ICE_SATURATION: &str = "ice_saturation";

/// Thermal material parameters (per unit cross-section).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThermalMaterial {
    /// Thermal conductivity (W/(m·K)).
    pub conductivity: f64,
    /// Bulk density (kg/m³).
    pub density: f64,
    /// Specific heat capacity (J/(kg·K)).
    pub specific_heat: f64,
    /// Effective latent heat released over the freezing range (J/kg).
    pub latent_heat: f64,
    /// Freezing point (K).
    pub freeze_temperature: f64,
    /// Width of the mushy zone below the freezing point (K).
    pub freezing_range: f64,
    /// Sensitivity of conductivity to mechanical strain from the peer
    /// subdomain; 0 decouples the thermal problem.
    pub strain_coupling: f64,
}

impl Default for ThermalMaterial {
    fn default() -> Self {
        Self {
            conductivity: 2.2,
            density: 1700.0,
            specific_heat: 900.0,
            latent_heat: 6.0e4,
            freeze_temperature: 273.15,
            freezing_range: 1.0,
            strain_coupling: 0.5,
        }
    }
}

/// Boundary conditions for the thermal rod.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThermalBoundary {
    /// Prescribed temperature at the surface node (K).
    pub surface_temperature: f64,
    /// Heat flux into the base node (W/m²).
    pub base_flux: f64,
}

impl Default for ThermalBoundary {
    fn default() -> Self {
        Self {
            surface_temperature: 253.15,
            base_flux: 0.05,
        }
    }
}

/// 1-D transient heat conduction integrator.
pub struct ThermalConductionIntegrator {
    grid: LineGrid,
    material: ThermalMaterial,
    boundary: ThermalBoundary,
    nonlinear: NonlinearSettings,
    /// Nominal (initial-condition) values.
    nominal: StateVectors,
    /// Mesh database this subdomain persists its solution into.
    database: SharedDatabase,
    /// Peer (mechanics) database the strain coupling is read from.
    peer: Option<SharedDatabase>,
    start_time: f64,
    final_time: f64,
    time_step: f64,
    /// Initial condition for the current window.
    state: StateVectors,
    /// Nonlinear initial guess for the first sub-step, if any.
    guess: Option<Vec<f64>>,
    history: SolutionHistory,
    /// Per-node ice saturation — the opaque internal state.
    ice_saturation: Vec<f64>,
}

impl ThermalConductionIntegrator {
    /// Creates the integrator with a uniform initial temperature.
    pub fn new(
        grid: LineGrid,
        material: ThermalMaterial,
        boundary: ThermalBoundary,
        initial_temperature: f64,
        nonlinear: NonlinearSettings,
        database: SharedDatabase,
        peer: Option<SharedDatabase>,
    ) -> TalikResult<Self> {
        let n = grid.n_nodes;
        {
            let db = database.read().expect("mesh database lock poisoned");
            if db.n_nodes() != n {
                return Err(TalikError::InvalidMesh(format!(
                    "thermal database has {} nodes, grid has {}",
                    db.n_nodes(),
                    n
                )));
            }
        }
        if material.freezing_range <= 0.0 {
            return Err(TalikError::InvalidConfig(
                "freezing_range must be positive".into(),
            ));
        }

        let mut nominal = StateVectors::zeros(n, false);
        nominal.x.fill(initial_temperature);

        let ice_saturation = nominal
            .x
            .iter()
            .map(|&t| saturation(&material, t))
            .collect();

        Ok(Self {
            grid,
            material,
            boundary,
            nonlinear,
            state: nominal.clone(),
            nominal,
            database,
            peer,
            start_time: 0.0,
            final_time: 0.0,
            time_step: 0.0,
            guess: None,
            history: SolutionHistory::new(),
            ice_saturation,
        })
    }

    /// Per-element conductivities, scaled by the peer subdomain's strain.
    fn element_conductivities(&self) -> Vec<f64> {
        let n_elem = self.grid.n_elements();
        let base = self.material.conductivity;
        let mut k = vec![base; n_elem];

        if self.material.strain_coupling != 0.0 {
            if let Some(peer) = &self.peer {
                let db = peer.read().expect("mesh database lock poisoned");
                let u = db.solution();
                if u.len() == self.grid.n_nodes {
                    let h = self.grid.spacing();
                    for (e, ke) in k.iter_mut().enumerate() {
                        let strain = (u[e + 1] - u[e]) / h;
                        // Dilation opens pore space and degrades contact
                        // conduction; clamp keeps the operator SPD.
                        let factor =
                            (1.0 - self.material.strain_coupling * strain).clamp(0.1, 10.0);
                        *ke = base * factor;
                    }
                }
            }
        }
        k
    }

    /// Apparent heat capacity: latent heat smeared over the mushy zone.
    fn apparent_capacity(&self, temperature: f64) -> f64 {
        let m = &self.material;
        let lower = m.freeze_temperature - m.freezing_range;
        if temperature > lower && temperature < m.freeze_temperature {
            m.specific_heat + m.latent_heat / m.freezing_range
        } else {
            m.specific_heat
        }
    }

    /// Assembles the implicit-Euler system for one sub-step.
    ///
    /// Lumped capacity, two-point conduction, symmetric elimination of
    /// the surface Dirichlet node. The capacity is evaluated at the
    /// current iterate, which is the fixed-point nonlinearity.
    fn assemble(
        &self,
        t_old: &[f64],
        iterate: &[f64],
        dt: f64,
        k_elems: &[f64],
    ) -> (CsrMatrix, Vec<f64>) {
        let n = self.grid.n_nodes;
        let h = self.grid.spacing();
        let ts = self.boundary.surface_temperature;

        let mut triplets: Vec<(usize, usize, f64)> = Vec::with_capacity(3 * n);
        let mut rhs = vec![0.0; n];

        // Surface node: Dirichlet.
        triplets.push((0, 0, 1.0));
        rhs[0] = ts;

        for i in 1..n {
            let vol = if i == n - 1 { 0.5 * h } else { h };
            let m = self.material.density * self.apparent_capacity(iterate[i]) * vol / dt;
            let mut diag = m;
            rhs[i] = m * t_old[i];

            // Element to the left connects i-1 and i.
            let g_left = k_elems[i - 1] / h;
            diag += g_left;
            if i - 1 == 0 {
                rhs[i] += g_left * ts;
            } else {
                triplets.push((i, i - 1, -g_left));
            }

            // Element to the right, if any.
            if i < n - 1 {
                let g_right = k_elems[i] / h;
                diag += g_right;
                triplets.push((i, i + 1, -g_right));
            }

            triplets.push((i, i, diag));
        }

        rhs[n - 1] += self.boundary.base_flux;

        (CsrMatrix::from_triplets(n, n, &triplets), rhs)
    }
}

/// Ice saturation as a function of temperature: fully frozen below the
/// mushy zone, fully thawed at the freezing point, linear between.
fn saturation(material: &ThermalMaterial, temperature: f64) -> f64 {
    ((material.freeze_temperature - temperature) / material.freezing_range).clamp(0.0, 1.0)
}

impl TransientIntegrator for ThermalConductionIntegrator {
    fn set_start_time(&mut self, time: f64) {
        self.start_time = time;
    }

    fn set_final_time(&mut self, time: f64) {
        self.final_time = time;
    }

    fn set_initial_time_step(&mut self, dt: f64) {
        self.time_step = dt;
    }

    fn set_initial_state(&mut self, _time: f64, state: &StateVectors) -> TalikResult<()> {
        if state.has_acceleration() {
            return Err(TalikError::InvariantViolation(
                "thermal subdomain state must not carry an acceleration channel".into(),
            ));
        }
        self.state.overwrite_from(state)
    }

    fn set_initial_guess(&mut self, guess: &[f64]) -> TalikResult<()> {
        if guess.len() != self.grid.n_nodes {
            return Err(TalikError::Solver(format!(
                "initial guess has {} dofs, expected {}",
                guess.len(),
                self.grid.n_nodes
            )));
        }
        self.guess = Some(guess.to_vec());
        Ok(())
    }

    fn nominal_values(&self) -> StateVectors {
        self.nominal.clone()
    }

    fn integrate(&mut self) -> TalikResult<IntegratorStatus> {
        let window = self.final_time - self.start_time;
        if !(window > 0.0) {
            return Err(TalikError::Solver(format!(
                "integration window must be positive, got [{}, {}]",
                self.start_time, self.final_time
            )));
        }

        let dt_request = if self.time_step > 0.0 {
            self.time_step.min(window)
        } else {
            window
        };
        let n_steps = (window / dt_request).round().max(1.0) as usize;
        let dt = window / n_steps as f64;

        let n = self.grid.n_nodes;
        let k_elems = self.element_conductivities();

        self.history.clear();

        let mut temperature = self.state.x.clone();
        let mut rate = self.state.xdot.clone();

        for step in 0..n_steps {
            let t_old = temperature.clone();
            let mut iterate = if step == 0 {
                self.guess.take().unwrap_or_else(|| t_old.clone())
            } else {
                t_old.clone()
            };

            // Fixed point on the apparent heat capacity.
            let mut converged = false;
            for _ in 0..self.nonlinear.max_iterations {
                let (matrix, rhs) = self.assemble(&t_old, &iterate, dt, &k_elems);
                let mut next = vec![0.0; n];
                let mut solver = FaerSolver::new();
                solver.factorize(&matrix)?;
                solver.solve(&rhs, &mut next)?;

                let delta = l2_diff(&next, &iterate);
                iterate = next;
                if !delta.is_finite() {
                    return Ok(IntegratorStatus::Failed);
                }
                if delta <= self.nonlinear.tolerance * (1.0 + l2(&iterate)) {
                    converged = true;
                    break;
                }
            }
            if !converged {
                return Ok(IntegratorStatus::Failed);
            }
            if l2_diff(&iterate, &t_old) > self.nonlinear.max_increment {
                return Ok(IntegratorStatus::Failed);
            }

            for i in 0..n {
                rate[i] = (iterate[i] - t_old[i]) / dt;
            }
            temperature = iterate;

            self.history.push(SolutionState {
                time: self.start_time + (step + 1) as f64 * dt,
                vectors: StateVectors {
                    x: temperature.clone(),
                    xdot: rate.clone(),
                    xdotdot: None,
                },
            });
        }

        // Accepted: update internal state and persist to the mesh
        // database so the peer's next solve sees this solution.
        self.ice_saturation = temperature
            .iter()
            .map(|&t| saturation(&self.material, t))
            .collect();
        self.state.x = temperature;
        self.state.xdot = rate;

        self.database
            .write()
            .expect("mesh database lock poisoned")
            .write_solution(&self.state.x, &self.state.xdot, None, self.final_time)?;

        Ok(IntegratorStatus::Converged)
    }

    fn solution_history(&self) -> &SolutionHistory {
        &self.history
    }

    fn internal_state(&self) -> InternalState {
        let mut state = InternalState::new();
        state.set(ICE_SATURATION, self.ice_saturation.clone());
        state
    }

    fn restore_internal_state(&mut self, state: &InternalState) -> TalikResult<()> {
        let saturation = state.require(ICE_SATURATION)?;
        if saturation.len() != self.grid.n_nodes {
            return Err(TalikError::InvariantViolation(format!(
                "ice saturation has {} entries, expected {}",
                saturation.len(),
                self.grid.n_nodes
            )));
        }
        self.ice_saturation.fill(0.0);
        self.ice_saturation.copy_from_slice(saturation);
        Ok(())
    }

    fn name(&self) -> &str {
        "ThermalConduction"
    }
}
