//! Error types for the Talik engine.
//!
//! All crates return `TalikResult<T>` from fallible operations.

use thiserror::Error;

/// Unified error type for the Talik engine.
#[derive(Debug, Error)]
pub enum TalikError {
    /// Configuration value is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Mesh or discretization data is malformed or inconsistent.
    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),

    /// A solver was driven outside its contract (missing initial state,
    /// mismatched vector lengths, unfactorized system).
    #[error("Solver error: {0}")]
    Solver(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A simulation invariant was violated.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

/// Convenience alias for `Result<T, TalikError>`.
pub type TalikResult<T> = Result<T, TalikError>;
