//! Scalar type alias for the simulation.
//!
//! Coupling norms, tolerances and adaptive step sizes are
//! precision-sensitive, so the engine runs in `f64` throughout.

/// The floating-point type used throughout the engine.
pub type Scalar = f64;
