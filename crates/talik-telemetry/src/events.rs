//! Coupling event types.
//!
//! Structured events emitted by the coupling driver at various points
//! of each outer time step. Events are lightweight value types that
//! carry just enough data to be useful for monitoring and debugging.

use serde::{Deserialize, Serialize};

/// A coupling event emitted by the driver.
///
/// Events are tagged with the outer step index and carry domain-specific data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouplingEvent {
    /// Outer time-step index (0-indexed).
    pub step: u32,
    /// Event payload.
    pub kind: EventKind,
}

/// Event payload variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventKind {
    /// An outer time step started.
    TimeStepBegin {
        /// Simulation time at the start of the step (seconds).
        time: f64,
        /// Candidate step size (seconds).
        time_step: f64,
    },

    /// A subdomain's transient solve failed within the step.
    SolveFailed {
        /// Index of the failing subdomain.
        subdomain: u32,
        /// Schwarz iteration the failure occurred in.
        iteration: u32,
    },

    /// Convergence check after a complete Schwarz sweep.
    Convergence {
        /// Schwarz iterations performed so far this step.
        iteration: u32,
        /// Aggregate absolute error.
        abs_error: f64,
        /// Aggregate relative error.
        rel_error: f64,
        /// Whether the convergence predicate is satisfied.
        converged: bool,
    },

    /// The step was accepted and time advanced.
    StepAccepted {
        /// Simulation time after the step (seconds).
        time: f64,
        /// Step size that was accepted (seconds).
        time_step: f64,
    },

    /// The step was rejected and will be retried smaller.
    StepReduced {
        /// Rejected step size.
        from: f64,
        /// Step size for the retry.
        to: f64,
    },

    /// The accepted step was grown for the next attempt.
    StepIncreased {
        /// Previous step size.
        from: f64,
        /// New step size.
        to: f64,
    },

    /// The run finished.
    RunEnd {
        /// Final simulation time reached.
        time: f64,
        /// Number of accepted steps.
        steps: u32,
        /// Whether the last Schwarz loop converged.
        converged: bool,
    },
}

impl CouplingEvent {
    /// Creates a new event for the given outer step.
    pub fn new(step: u32, kind: EventKind) -> Self {
        Self { step, kind }
    }
}
