//! # talik-coupling
//!
//! The sequential thermo-mechanical coupling core: a Schwarz
//! alternating inner loop with a convergence-criterion state machine,
//! wrapped in an adaptive time-stepping outer loop with
//! checkpoint/rollback failure recovery.
//!
//! ## Key Types
//!
//! - [`CouplingDriver`] — the outer loop / step-size controller,
//!   parametrized over the per-subdomain advance capability
//! - [`CoupledSubdomain`] / [`Subdomain`] — the advance protocol
//! - [`ConvergenceEvaluator`] — norm aggregation and the convergence
//!   predicate
//! - [`StateCache`] / [`Snapshot`] — step rollback storage
//! - [`CouplingConfig`] — validated loop configuration
//! - [`builder::build_driver`] — wires a loaded input into a runnable
//!   driver

pub mod builder;
pub mod cache;
pub mod config;
pub mod convergence;
pub mod driver;
pub mod report;
pub mod subdomain;

pub use builder::build_driver;
pub use cache::{Snapshot, StateCache};
pub use config::CouplingConfig;
pub use convergence::{
    ConvergenceCriterion, ConvergenceEvaluator, ConvergenceOperator, ConvergenceReport, StateNorms,
};
pub use driver::{continue_schwarz, CouplingDriver, RunSummary, Termination};
pub use report::Reporter;
pub use subdomain::{
    AdvanceResult, CoupledSubdomain, IterationSeed, NormWeights, Subdomain, TimeWindow,
};
