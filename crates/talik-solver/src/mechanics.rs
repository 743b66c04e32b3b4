//! Reference mechanics subdomain: 1-D elastodynamics of a rod.
//!
//! Newmark average-acceleration in time. The element modulus stiffens
//! with the frozen fraction and softens with strain through a secant
//! fixed point, which can genuinely fail for over-large steps. Thermal
//! expansion loads and the frozen fraction are read from the peer
//! subdomain's mesh database — the coupling path the alternating driver
//! synchronizes.

use serde::{Deserialize, Serialize};
use talik_math::norms::{l2, l2_diff};
use talik_math::{CsrMatrix, FaerSolver, SparseSolver};
use talik_mesh::{LineGrid, SharedDatabase};
use talik_types::{TalikError, TalikResult};

use crate::integrator::{IntegratorStatus, NonlinearSettings, TransientIntegrator};
use crate::state::{InternalState, SolutionHistory, SolutionState, StateVectors};

/// Internal-state field name for the per-element peak strain history.
pub const PEAK_STRAIN: &str = "peak_strain";

/// Newmark average-acceleration parameters.
const BETA: f64 = 0.25;
const GAMMA: f64 = 0.5;

/// Mechanics material parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MechanicsMaterial {
    /// Young's modulus of the thawed material (Pa).
    pub youngs_modulus: f64,
    /// Bulk density (kg/m³).
    pub density: f64,
    /// Rod cross-section (m²).
    pub cross_section: f64,
    /// Linear thermal expansion coefficient (1/K).
    pub thermal_expansion: f64,
    /// Temperature at which thermal strain vanishes (K).
    pub reference_temperature: f64,
    /// Freezing point used to stiffen frozen elements (K).
    pub freeze_temperature: f64,
    /// Width of the freeze transition (K).
    pub freezing_range: f64,
    /// Relative modulus gain at full freeze.
    pub frozen_stiffening: f64,
    /// Strain scale of the secant softening law.
    pub softening_strain: f64,
}

impl Default for MechanicsMaterial {
    fn default() -> Self {
        Self {
            youngs_modulus: 5.0e7,
            density: 1700.0,
            cross_section: 1.0,
            thermal_expansion: 5.0e-5,
            reference_temperature: 273.15,
            freeze_temperature: 273.15,
            freezing_range: 1.0,
            frozen_stiffening: 4.0,
            softening_strain: 5.0e-3,
        }
    }
}

/// Boundary conditions for the mechanics rod.
///
/// The surface node is pinned; the base node carries a traction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MechanicsBoundary {
    /// Axial force applied at the free end (N).
    pub end_traction: f64,
}

impl Default for MechanicsBoundary {
    fn default() -> Self {
        Self { end_traction: 0.0 }
    }
}

/// 1-D elastodynamics integrator.
pub struct ElastodynamicsIntegrator {
    grid: LineGrid,
    material: MechanicsMaterial,
    boundary: MechanicsBoundary,
    nonlinear: NonlinearSettings,
    /// Nominal (initial-condition) values: rod at rest.
    nominal: StateVectors,
    /// Mesh database this subdomain persists its solution into.
    database: SharedDatabase,
    /// Peer (thermal) database the temperature field is read from.
    peer: Option<SharedDatabase>,
    start_time: f64,
    final_time: f64,
    time_step: f64,
    /// Initial condition for the current window.
    state: StateVectors,
    /// Nonlinear initial guess for the first sub-step, if any.
    guess: Option<Vec<f64>>,
    history: SolutionHistory,
    /// Per-element peak strain — the opaque internal state.
    peak_strain: Vec<f64>,
}

impl ElastodynamicsIntegrator {
    /// Creates the integrator with the rod at rest.
    pub fn new(
        grid: LineGrid,
        material: MechanicsMaterial,
        boundary: MechanicsBoundary,
        nonlinear: NonlinearSettings,
        database: SharedDatabase,
        peer: Option<SharedDatabase>,
    ) -> TalikResult<Self> {
        let n = grid.n_nodes;
        {
            let db = database.read().expect("mesh database lock poisoned");
            if db.n_nodes() != n {
                return Err(TalikError::InvalidMesh(format!(
                    "mechanics database has {} nodes, grid has {}",
                    db.n_nodes(),
                    n
                )));
            }
            if db.acceleration().is_none() {
                return Err(TalikError::InvalidMesh(
                    "mechanics database must carry an acceleration field".into(),
                ));
            }
        }
        if material.softening_strain <= 0.0 || material.freezing_range <= 0.0 {
            return Err(TalikError::InvalidConfig(
                "softening_strain and freezing_range must be positive".into(),
            ));
        }

        let nominal = StateVectors::zeros(n, true);
        let peak_strain = vec![0.0; grid.n_elements()];

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
            peak_strain,
        })
    }

    /// Per-element temperatures from the peer database; `None` when no
    /// matching thermal field is available (decoupled run).
    fn peer_temperatures(&self) -> Option<Vec<f64>> {
        let peer = self.peer.as_ref()?;
        let db = peer.read().expect("mesh database lock poisoned");
        let t = db.solution();
        if t.len() != self.grid.n_nodes {
            return None;
        }
        Some(
            (0..self.grid.n_elements())
                .map(|e| 0.5 * (t[e] + t[e + 1]))
                .collect(),
        )
    }

    /// Element modulus: frozen stiffening times secant strain softening.
    fn element_modulus(&self, elem_temp: Option<f64>, strain: f64) -> f64 {
        let m = &self.material;
        let frozen = match elem_temp {
            Some(t) => ((m.freeze_temperature - t) / m.freezing_range).clamp(0.0, 1.0),
            None => 0.0,
        };
        let stiffened = m.youngs_modulus * (1.0 + m.frozen_stiffening * frozen);
        stiffened / (1.0 + strain.abs() / m.softening_strain)
    }

    /// Assembles the Newmark effective system for one sub-step.
    ///
    /// `iterate` supplies the strains the secant moduli are evaluated
    /// at, which is the fixed-point nonlinearity.
    fn assemble(
        &self,
        iterate: &[f64],
        u_pred: &[f64],
        elem_temps: Option<&[f64]>,
        masses: &[f64],
        c0: f64,
    ) -> (CsrMatrix, Vec<f64>) {
        let n = self.grid.n_nodes;
        let h = self.grid.spacing();
        let area = self.material.cross_section;
        let m = &self.material;

        // Element moduli and thermal forces at the current iterate.
        let n_elem = self.grid.n_elements();
        let mut stiffness = vec![0.0; n_elem];
        let mut thermal_force = vec![0.0; n_elem];
        for e in 0..n_elem {
            let strain = (iterate[e + 1] - iterate[e]) / h;
            let temp = elem_temps.map(|t| t[e]);
            let modulus = self.element_modulus(temp, strain);
            stiffness[e] = modulus * area / h;
            let dt_thermal = temp.map_or(0.0, |t| t - m.reference_temperature);
            thermal_force[e] = modulus * area * m.thermal_expansion * dt_thermal;
        }

        let mut triplets: Vec<(usize, usize, f64)> = Vec::with_capacity(3 * n);
        let mut rhs = vec![0.0; n];

        // Surface node: pinned.
        triplets.push((0, 0, 1.0));
        rhs[0] = 0.0;

        for i in 1..n {
            let mut diag = masses[i] * c0;
            rhs[i] = masses[i] * c0 * u_pred[i];

            let k_left = stiffness[i - 1];
            diag += k_left;
            if i - 1 > 0 {
                triplets.push((i, i - 1, -k_left));
            }
            // The pinned neighbor contributes nothing to the right-hand
            // side (u = 0 there).

            if i < n - 1 {
                let k_right = stiffness[i];
                diag += k_right;
                triplets.push((i, i + 1, -k_right));
            }

            triplets.push((i, i, diag));

            // Thermal expansion loads: element e pushes its end nodes apart.
            rhs[i] += thermal_force[i - 1];
            if i < n - 1 {
                rhs[i] -= thermal_force[i];
            }
        }

        rhs[n - 1] += self.boundary.end_traction;

        (CsrMatrix::from_triplets(n, n, &triplets), rhs)
    }
}

impl TransientIntegrator for ElastodynamicsIntegrator {
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
        if !state.has_acceleration() {
            return Err(TalikError::InvariantViolation(
                "mechanics subdomain state must carry an acceleration channel".into(),
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
        let h = self.grid.spacing();
        let rho_a = self.material.density * self.material.cross_section;
        let masses: Vec<f64> = (0..n)
            .map(|i| {
                let vol = if i == 0 || i == n - 1 { 0.5 * h } else { h };
                rho_a * vol
            })
            .collect();

        let elem_temps = self.peer_temperatures();
        let c0 = 1.0 / (BETA * dt * dt);

        self.history.clear();

        let mut u = self.state.x.clone();
        let mut v = self.state.xdot.clone();
        let mut a = self
            .state
            .xdotdot
            .clone()
            .expect("mechanics state always carries acceleration");

        for step in 0..n_steps {
            let u_old = u.clone();
            let v_old = v.clone();
            let a_old = a.clone();

            // Newmark predictor.
            let u_pred: Vec<f64> = (0..n)
                .map(|i| u_old[i] + dt * v_old[i] + dt * dt * (0.5 - BETA) * a_old[i])
                .collect();

            let mut iterate = if step == 0 {
                self.guess.take().unwrap_or_else(|| u_old.clone())
            } else {
                u_old.clone()
            };

            // Secant fixed point on the strain-dependent moduli.
            let mut converged = false;
            for _ in 0..self.nonlinear.max_iterations {
                let (matrix, rhs) =
                    self.assemble(&iterate, &u_pred, elem_temps.as_deref(), &masses, c0);
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
            if l2_diff(&iterate, &u_old) > self.nonlinear.max_increment {
                return Ok(IntegratorStatus::Failed);
            }

            // Newmark corrector.
            let mut a_new = vec![0.0; n];
            let mut v_new = vec![0.0; n];
            for i in 1..n {
                a_new[i] = c0 * (iterate[i] - u_pred[i]);
                v_new[i] = v_old[i] + dt * ((1.0 - GAMMA) * a_old[i] + GAMMA * a_new[i]);
            }

            u = iterate;
            v = v_new;
            a = a_new;

            self.history.push(SolutionState {
                time: self.start_time + (step + 1) as f64 * dt,
                vectors: StateVectors {
                    x: u.clone(),
                    xdot: v.clone(),
                    xdotdot: Some(a.clone()),
                },
            });
        }

        // Accepted: update strain history and persist to the mesh
        // database so the peer's next solve sees this solution.
        for e in 0..self.grid.n_elements() {
            let strain = ((u[e + 1] - u[e]) / h).abs();
            if strain > self.peak_strain[e] {
                self.peak_strain[e] = strain;
            }
        }
        self.state.x = u;
        self.state.xdot = v;
        self.state.xdotdot = Some(a);

        self.database
            .write()
            .expect("mesh database lock poisoned")
            .write_solution(
                &self.state.x,
                &self.state.xdot,
                self.state.xdotdot.as_deref(),
                self.final_time,
            )?;

        Ok(IntegratorStatus::Converged)
    }

    fn solution_history(&self) -> &SolutionHistory {
        &self.history
    }

    fn internal_state(&self) -> InternalState {
        let mut state = InternalState::new();
        state.set(PEAK_STRAIN, self.peak_strain.clone());
        state
    }

    fn restore_internal_state(&mut self, state: &InternalState) -> TalikResult<()> {
        let peak = state.require(PEAK_STRAIN)?;
        if peak.len() != self.grid.n_elements() {
            return Err(TalikError::InvariantViolation(format!(
                "peak strain has {} entries, expected {}",
                peak.len(),
                self.grid.n_elements()
            )));
        }
        self.peak_strain.fill(0.0);
        self.peak_strain.copy_from_slice(peak);
        Ok(())
    }

    fn name(&self) -> &str {
        "Elastodynamics"
    }
}
