//! Simulation defaults shared across crates.

use crate::scalar::Scalar;

/// Default minimum Schwarz iterations per time step.
pub const DEFAULT_MIN_ITERATIONS: u32 = 1;

/// Default maximum Schwarz iterations per time step.
pub const DEFAULT_MAX_ITERATIONS: u32 = 1024;

/// Default absolute convergence tolerance.
pub const DEFAULT_ABS_TOLERANCE: Scalar = 1.0e-8;

/// Default relative convergence tolerance.
pub const DEFAULT_REL_TOLERANCE: Scalar = 1.0e-8;

/// Default output write interval (every accepted step).
pub const DEFAULT_WRITE_INTERVAL: u32 = 1;

/// Default cap on nonlinear iterations inside a reference integrator.
pub const DEFAULT_NONLINEAR_ITERATIONS: u32 = 25;

/// Default nonlinear residual tolerance for the reference integrators.
pub const DEFAULT_NONLINEAR_TOLERANCE: Scalar = 1.0e-10;
