//! Transient-integrator interface — the seam between the coupling
//! driver and whatever solves a single subdomain.
//!
//! The driver requires exactly this capability set from a subdomain's
//! solver, so the trait carries exactly these operations; subdomain
//! solvers are constructed behind it rather than downcast from a
//! generic handle.

use serde::{Deserialize, Serialize};
use talik_types::TalikResult;

use crate::state::{InternalState, SolutionHistory, StateVectors};

/// Outcome of one blocking integration over a sub-interval.
///
/// `Failed` is the *recoverable* signal (the integrator could not
/// converge over the requested window); the coupling driver reacts by
/// rolling back and reducing the step. Hard errors — contract misuse,
/// broken configuration — are `Err` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegratorStatus {
    /// The window was integrated successfully.
    Converged,
    /// The integrator gave up within the window.
    Failed,
}

/// Settings for the nonlinear iteration inside a reference integrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NonlinearSettings {
    /// Cap on fixed-point iterations per sub-step.
    pub max_iterations: u32,
    /// Relative increment tolerance for the fixed point.
    pub tolerance: f64,
    /// Largest admissible solution increment per sub-step; steps that
    /// move further are rejected as failed rather than accepted blindly.
    pub max_increment: f64,
}

impl Default for NonlinearSettings {
    fn default() -> Self {
        Self {
            max_iterations: talik_types::constants::DEFAULT_NONLINEAR_ITERATIONS,
            tolerance: talik_types::constants::DEFAULT_NONLINEAR_TOLERANCE,
            max_increment: 1.0e6,
        }
    }
}

/// The capability set the coupling driver requires from a subdomain
/// solver.
///
/// Call order per advance:
///
/// ```text
/// integrator.set_start_time(t);
/// integrator.set_final_time(t + dt);
/// integrator.set_initial_time_step(dt);
/// integrator.set_initial_state(t, &ics)?;
/// integrator.set_initial_guess(&prev.x)?;   // unless standard guess
/// match integrator.integrate()? {
///     IntegratorStatus::Converged => { /* read solution_history() */ }
///     IntegratorStatus::Failed => { /* roll back, reduce step */ }
/// }
/// ```
///
/// An `integrate` call is fully blocking; the driver never runs two
/// subdomain solves concurrently.
pub trait TransientIntegrator: Send {
    /// Sets the start of the integration window.
    fn set_start_time(&mut self, time: f64);

    /// Sets the end of the integration window.
    fn set_final_time(&mut self, time: f64);

    /// Sets the (constant) internal step size. The coupling loop owns
    /// step adaptation; integrators never adapt internally.
    fn set_initial_time_step(&mut self, dt: f64);

    /// Sets the initial condition for the window. The state's arity must
    /// match the integrator's problem kind.
    fn set_initial_state(&mut self, time: f64, state: &StateVectors) -> TalikResult<()>;

    /// Seeds the nonlinear iteration with a solution guess.
    fn set_initial_guess(&mut self, guess: &[f64]) -> TalikResult<()>;

    /// The integrator's nominal (initial-condition) values, used to seed
    /// the very first Schwarz iteration of the very first time step.
    fn nominal_values(&self) -> StateVectors;

    /// Integrates the configured window. Blocking.
    fn integrate(&mut self) -> TalikResult<IntegratorStatus>;

    /// Solution history of the last successful `integrate` call.
    fn solution_history(&self) -> &SolutionHistory;

    /// Captures the integrator's opaque internal state (history
    /// variables) for checkpointing.
    fn internal_state(&self) -> InternalState;

    /// Overwrites the integrator's internal state from a checkpoint.
    fn restore_internal_state(&mut self, state: &InternalState) -> TalikResult<()>;

    /// Human-readable integrator name for diagnostics.
    fn name(&self) -> &str;
}
