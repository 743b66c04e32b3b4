//! Resolved coupling configuration.
//!
//! [`CouplingConfig`] is the validated, fully defaulted form of the raw
//! TOML settings: enum strings parsed, optional bounds resolved, every
//! firewall checked. The driver only ever sees this type, so a running
//! simulation cannot encounter a malformed option.

use std::str::FromStr;

use talik_io::CouplingSettings;
use talik_types::{TalikError, TalikResult};

use crate::convergence::{ConvergenceCriterion, ConvergenceOperator};

/// Validated configuration of the outer coupling loop.
#[derive(Debug, Clone)]
pub struct CouplingConfig {
    /// Inner-loop iteration floor (≥ 1).
    pub minimum_iterations: u32,
    /// Inner-loop iteration cap (≥ minimum).
    pub maximum_iterations: u32,
    /// Absolute convergence tolerance (≥ 0).
    pub absolute_tolerance: f64,
    /// Relative convergence tolerance (≥ 0).
    pub relative_tolerance: f64,
    /// Outer time-step cap (≥ 1).
    pub maximum_steps: u32,
    /// Simulation start time.
    pub initial_time: f64,
    /// Simulation end time (≥ start).
    pub final_time: f64,
    /// First candidate step size (> 0).
    pub initial_time_step: f64,
    /// Smallest admissible step size (> 0).
    pub minimum_time_step: f64,
    /// Largest admissible step size (≥ minimum).
    pub maximum_time_step: f64,
    /// Step shrink factor on rejection, in (0, 1].
    pub reduction_factor: f64,
    /// Step growth factor on acceptance, ≥ 1.
    pub amplification_factor: f64,
    /// Write results every this many accepted steps (≥ 1).
    pub output_write_interval: u32,
    /// Skip the previous-iterate warm start.
    pub standard_initial_guess: bool,
    /// Parsed convergence criterion.
    pub criterion: ConvergenceCriterion,
    /// Parsed convergence operator (used when the criterion is `Both`).
    pub operator: ConvergenceOperator,
    /// Weight of rate norms in the convergence metric.
    pub tolerance_factor_velocity: f64,
    /// Weight of acceleration norms in the convergence metric.
    pub tolerance_factor_acceleration: f64,
}

impl CouplingConfig {
    /// Resolves raw settings into a validated configuration.
    pub fn from_settings(settings: &CouplingSettings) -> TalikResult<Self> {
        let criterion = ConvergenceCriterion::from_str(&settings.convergence_criterion)?;
        let operator = ConvergenceOperator::from_str(&settings.convergence_operator)?;

        let dt = settings.initial_time_step;
        let config = Self {
            minimum_iterations: settings.minimum_iterations,
            maximum_iterations: settings.maximum_iterations,
            absolute_tolerance: settings.absolute_tolerance,
            relative_tolerance: settings.relative_tolerance,
            maximum_steps: settings.maximum_steps,
            initial_time: settings.initial_time,
            final_time: settings.final_time,
            initial_time_step: dt,
            minimum_time_step: settings.minimum_time_step.unwrap_or(dt),
            maximum_time_step: settings.maximum_time_step.unwrap_or(dt),
            reduction_factor: settings.reduction_factor,
            amplification_factor: settings.amplification_factor,
            output_write_interval: settings.output_write_interval,
            standard_initial_guess: settings.standard_initial_guess,
            criterion,
            operator,
            tolerance_factor_velocity: settings.tolerance_factor_velocity.unwrap_or(dt),
            tolerance_factor_acceleration: settings
                .tolerance_factor_acceleration
                .unwrap_or(dt * dt),
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks every invariant the driver depends on.
    pub fn validate(&self) -> TalikResult<()> {
        fn fail(msg: String) -> TalikResult<()> {
            Err(TalikError::InvalidConfig(msg))
        }

        if self.minimum_iterations < 1 {
            return fail("minimum_iterations must be >= 1".into());
        }
        if self.maximum_iterations < 1 {
            return fail("maximum_iterations must be >= 1".into());
        }
        if self.maximum_iterations < self.minimum_iterations {
            return fail(format!(
                "maximum_iterations ({}) must be >= minimum_iterations ({})",
                self.maximum_iterations, self.minimum_iterations
            ));
        }
        if self.relative_tolerance < 0.0 {
            return fail("relative_tolerance must be >= 0".into());
        }
        if self.absolute_tolerance < 0.0 {
            return fail("absolute_tolerance must be >= 0".into());
        }
        if self.maximum_steps < 1 {
            return fail("maximum_steps must be >= 1".into());
        }
        if self.final_time < self.initial_time {
            return fail(format!(
                "final_time ({}) must be >= initial_time ({})",
                self.final_time, self.initial_time
            ));
        }
        if self.initial_time_step <= 0.0 {
            return fail("initial_time_step must be positive".into());
        }
        if self.minimum_time_step <= 0.0 {
            return fail("minimum_time_step must be positive".into());
        }
        if self.maximum_time_step <= 0.0 {
            return fail("maximum_time_step must be positive".into());
        }
        if self.maximum_time_step < self.minimum_time_step {
            return fail(format!(
                "maximum_time_step ({}) must be >= minimum_time_step ({})",
                self.maximum_time_step, self.minimum_time_step
            ));
        }
        if self.initial_time_step < self.minimum_time_step
            || self.initial_time_step > self.maximum_time_step
        {
            return fail(format!(
                "initial_time_step ({}) must lie within [{}, {}]",
                self.initial_time_step, self.minimum_time_step, self.maximum_time_step
            ));
        }
        if self.reduction_factor <= 0.0 || self.reduction_factor > 1.0 {
            return fail(format!(
                "reduction_factor ({}) must lie in (0, 1]",
                self.reduction_factor
            ));
        }
        if self.amplification_factor < 1.0 {
            return fail(format!(
                "amplification_factor ({}) must be >= 1",
                self.amplification_factor
            ));
        }
        if self.output_write_interval < 1 {
            return fail("output_write_interval must be >= 1".into());
        }
        if self.tolerance_factor_velocity < 0.0 || self.tolerance_factor_acceleration < 0.0 {
            return fail("tolerance factors must be >= 0".into());
        }

        Ok(())
    }
}
