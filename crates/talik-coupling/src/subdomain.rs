//! Per-subdomain advance protocol.
//!
//! The driver is parametrized over the [`CoupledSubdomain`] capability
//! so the identical loop machinery serves the production subdomains and
//! any test double. The production [`Subdomain`] implements one advance
//! protocol for both problem kinds; they differ only in state-vector
//! arity and internal-state content.

use talik_io::{FieldFrame, ResultsWriter};
use talik_math::norms::{l2, l2_diff};
use talik_mesh::SharedDatabase;
use talik_solver::{IntegratorStatus, StateVectors, TransientIntegrator};
use talik_types::{ProblemKind, TalikError, TalikResult};

use crate::cache::Snapshot;
use crate::convergence::StateNorms;

/// The sub-interval one Schwarz sweep advances every subdomain over.
///
/// The same window is reused for every subdomain and every inner
/// iteration within one outer step; the step size is fixed while the
/// Schwarz loop iterates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeWindow {
    /// Window start (current simulation time).
    pub start: f64,
    /// Window end (candidate next time).
    pub end: f64,
    /// Candidate step size (`end - start`).
    pub step: f64,
}

/// How the advance seeds its previous-iterate state.
#[derive(Debug, Clone, Copy)]
pub struct IterationSeed {
    /// True only on the very first inner iteration of the very first
    /// outer step: seed from the integrator's nominal values instead of
    /// a previous iterate.
    pub first_ever: bool,
    /// Skip the previous-iterate warm start of the nonlinear solve.
    pub standard_guess: bool,
}

/// Outcome of one subdomain advance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AdvanceResult {
    /// The transient solve failed; no state was mutated.
    Failed,
    /// The solve succeeded; the sweep's convergence norms for this
    /// subdomain.
    Advanced(StateNorms),
}

/// The per-subdomain capability the coupling driver is written against.
pub trait CoupledSubdomain: Send {
    /// This subdomain's problem kind.
    fn kind(&self) -> ProblemKind;

    /// Human-readable label for diagnostics.
    fn label(&self) -> &str;

    /// Seeds initial conditions at `time` and writes the initial output.
    /// Called once before the first time step.
    fn initialize(&mut self, time: f64) -> TalikResult<()>;

    /// Captures step-start solution and internal state for rollback.
    fn checkpoint(&self) -> TalikResult<Snapshot>;

    /// Advances this subdomain over the window. Returns the failure flag
    /// or the sweep norms; a failed advance mutates no state the caller
    /// may rely on.
    fn advance(
        &mut self,
        window: TimeWindow,
        seed: IterationSeed,
        checkpoint: &Snapshot,
    ) -> TalikResult<AdvanceResult>;

    /// Rolls live state back to a snapshot, including the push into the
    /// mesh-resident database at the given (un-advanced) time.
    fn restore(&mut self, snapshot: &Snapshot, time: f64) -> TalikResult<()>;

    /// Accepts the step at `time`: refresh initial-condition vectors
    /// from the mesh database and optionally write output.
    fn accept_step(&mut self, step_index: u32, time: f64, write_output: bool) -> TalikResult<()>;

    /// Whether this subdomain writes output at all.
    fn output_enabled(&self) -> bool;
}

/// Weights applied to derivative norms in the convergence metric.
#[derive(Debug, Clone, Copy)]
pub struct NormWeights {
    /// Weight of the rate norm.
    pub velocity: f64,
    /// Weight of the acceleration norm.
    pub acceleration: f64,
}

/// A production subdomain: one transient integrator, its mesh database,
/// and optional results output.
pub struct Subdomain {
    label: String,
    kind: ProblemKind,
    integrator: Box<dyn TransientIntegrator>,
    database: SharedDatabase,
    writer: Option<ResultsWriter>,
    weights: NormWeights,
    /// Step-start initial conditions; refreshed on every accepted step.
    ics: Option<StateVectors>,
    /// Most recent Schwarz iterate.
    current: Option<StateVectors>,
}

impl Subdomain {
    /// Assembles a subdomain from its parts.
    pub fn new(
        label: impl Into<String>,
        kind: ProblemKind,
        integrator: Box<dyn TransientIntegrator>,
        database: SharedDatabase,
        writer: Option<ResultsWriter>,
        weights: NormWeights,
    ) -> Self {
        Self {
            label: label.into(),
            kind,
            integrator,
            database,
            writer,
            weights,
            ics: None,
            current: None,
        }
    }

    fn ics(&self) -> TalikResult<&StateVectors> {
        self.ics.as_ref().ok_or_else(|| {
            TalikError::InvariantViolation(format!(
                "subdomain '{}' used before initialize()",
                self.label
            ))
        })
    }

    fn write_frame(&mut self, step_index: u32, time: f64, state: &StateVectors) -> TalikResult<()> {
        if let Some(writer) = self.writer.as_mut() {
            writer.append(&FieldFrame {
                step: step_index,
                time,
                solution: state.x.clone(),
                rate: state.xdot.clone(),
                acceleration: state.xdotdot.clone(),
            })?;
        }
        Ok(())
    }

    fn push_to_database(&self, state: &StateVectors, time: f64) -> TalikResult<()> {
        self.database
            .write()
            .expect("mesh database lock poisoned")
            .write_solution(&state.x, &state.xdot, state.xdotdot.as_deref(), time)
    }
}

impl CoupledSubdomain for Subdomain {
    fn kind(&self) -> ProblemKind {
        self.kind
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn initialize(&mut self, time: f64) -> TalikResult<()> {
        let nominal = self.integrator.nominal_values();
        if nominal.has_acceleration() != self.kind.has_acceleration() {
            return Err(TalikError::InvariantViolation(format!(
                "integrator '{}' state arity does not match problem kind {}",
                self.integrator.name(),
                self.kind
            )));
        }

        // Seed the mesh database so the peer's first solve reads sound
        // boundary data, then record the initial configuration.
        self.push_to_database(&nominal, time)?;
        self.write_frame(0, time, &nominal)?;
        self.ics = Some(nominal);
        self.current = None;
        Ok(())
    }

    fn checkpoint(&self) -> TalikResult<Snapshot> {
        Ok(Snapshot {
            solution: self.ics()?.clone(),
            internal: self.integrator.internal_state(),
        })
    }

    fn advance(
        &mut self,
        window: TimeWindow,
        seed: IterationSeed,
        checkpoint: &Snapshot,
    ) -> TalikResult<AdvanceResult> {
        let ics = self.ics()?.clone();

        // RESTORE_PRIOR_STATE: nominal values on the first-ever
        // iteration, the previous iterate afterwards.
        let prev = if seed.first_ever {
            self.integrator.nominal_values()
        } else {
            self.current.clone().ok_or_else(|| {
                TalikError::InvariantViolation(format!(
                    "subdomain '{}' has no previous iterate to restore",
                    self.label
                ))
            })?
        };

        // The step-start internal state seeds every solve attempt in
        // this step, including Schwarz re-iterations.
        self.integrator.restore_internal_state(&checkpoint.internal)?;

        self.integrator.set_start_time(window.start);
        self.integrator.set_final_time(window.end);
        self.integrator.set_initial_time_step(window.step);
        self.integrator.set_initial_state(window.start, &ics)?;
        if !seed.standard_guess {
            self.integrator.set_initial_guess(&prev.x)?;
        }

        // SOLVE
        match self.integrator.integrate()? {
            IntegratorStatus::Failed => return Ok(AdvanceResult::Failed),
            IntegratorStatus::Converged => {}
        }

        // EXTRACT_STATE
        let state = self
            .integrator
            .solution_history()
            .current_state()
            .ok_or_else(|| {
                TalikError::Solver(format!(
                    "integrator '{}' reported success with an empty solution history",
                    self.integrator.name()
                ))
            })?;
        let current = state.vectors.clone();
        if current.has_acceleration() != self.kind.has_acceleration() {
            return Err(TalikError::InvariantViolation(format!(
                "integrator '{}' returned a state of the wrong arity",
                self.integrator.name()
            )));
        }

        let norms = weighted_norms(&prev, &current, self.weights);
        self.current = Some(current);
        Ok(AdvanceResult::Advanced(norms))
    }

    fn restore(&mut self, snapshot: &Snapshot, time: f64) -> TalikResult<()> {
        match self.current.as_mut() {
            Some(current) => current.overwrite_from(&snapshot.solution)?,
            None => self.current = Some(snapshot.solution.clone()),
        }
        if let Some(ics) = self.ics.as_mut() {
            ics.overwrite_from(&snapshot.solution)?;
        } else {
            self.ics = Some(snapshot.solution.clone());
        }

        self.integrator.restore_internal_state(&snapshot.internal)?;

        // Push the rolled-back solution into the mesh database: the
        // peer's boundary conditions are read from there, so a stale
        // value would silently corrupt the retried step.
        self.push_to_database(&snapshot.solution, time)
    }

    fn accept_step(&mut self, step_index: u32, time: f64, write_output: bool) -> TalikResult<()> {
        let accepted = {
            let db = self.database.read().expect("mesh database lock poisoned");
            StateVectors {
                x: db.solution().to_vec(),
                xdot: db.rate().to_vec(),
                xdotdot: if self.kind.has_acceleration() {
                    db.acceleration().map(<[f64]>::to_vec)
                } else {
                    None
                },
            }
        };

        if self.kind.has_acceleration() && accepted.xdotdot.is_none() {
            return Err(TalikError::InvariantViolation(format!(
                "mesh database for subdomain '{}' lost its acceleration field",
                self.label
            )));
        }

        if write_output {
            self.write_frame(step_index, time, &accepted)?;
        }

        self.ics = Some(accepted);
        Ok(())
    }

    fn output_enabled(&self) -> bool {
        self.writer.is_some()
    }
}

/// Derivative-weighted norms of the previous iterate, the new iterate,
/// and their difference.
fn weighted_norms(prev: &StateVectors, current: &StateVectors, weights: NormWeights) -> StateNorms {
    let mut norm_initial = l2(&prev.x) + weights.velocity * l2(&prev.xdot);
    let mut norm_final = l2(&current.x) + weights.velocity * l2(&current.xdot);
    let mut norm_difference =
        l2_diff(&current.x, &prev.x) + weights.velocity * l2_diff(&current.xdot, &prev.xdot);

    if let (Some(prev_acc), Some(cur_acc)) = (prev.xdotdot.as_ref(), current.xdotdot.as_ref()) {
        norm_initial += weights.acceleration * l2(prev_acc);
        norm_final += weights.acceleration * l2(cur_acc);
        norm_difference += weights.acceleration * l2_diff(cur_acc, prev_acc);
    }

    StateNorms {
        norm_initial,
        norm_final,
        norm_difference,
    }
}
