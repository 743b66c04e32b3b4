//! # talik-types
//!
//! Shared types, identifiers, error types, and simulation defaults
//! for the Talik coupled thermo-mechanical simulation engine.
//!
//! This crate has zero domain logic — it defines the vocabulary
//! that all other Talik crates share.

pub mod constants;
pub mod error;
pub mod ids;
pub mod problem;
pub mod scalar;

pub use error::{TalikError, TalikResult};
pub use ids::SubdomainId;
pub use problem::ProblemKind;
pub use scalar::Scalar;
