//! # talik-math
//!
//! Sparse linear algebra for the reference integrators and norm
//! utilities for the convergence machinery.
//!
//! ## Key Types
//!
//! - [`CsrMatrix`] — f64 compressed-sparse-row matrix
//! - [`SparseSolver`] — trait for SPD direct solvers
//! - [`FaerSolver`] — sparse Cholesky (LLᵀ) backed by `faer`
//! - [`norms`] — Euclidean norms of vectors and differences

pub mod faer_solver;
pub mod norms;
pub mod sparse;

pub use faer_solver::FaerSolver;
pub use sparse::{CsrMatrix, SparseSolver};
