//! # talik-solver
//!
//! The transient-integrator interface the coupling driver is written
//! against, plus the reference subdomain models that implement it.
//!
//! ## Key Types
//!
//! - [`TransientIntegrator`] — the capability set a coupled subdomain's
//!   solver must expose (interval setup, initial state/guess, blocking
//!   integrate, status, solution history, opaque internal state)
//! - [`StateVectors`] / [`InternalState`] / [`SolutionHistory`] — the
//!   state containers exchanged across that seam
//! - [`ThermalConductionIntegrator`] — 1-D transient heat conduction with
//!   a freezing-front internal state
//! - [`ElastodynamicsIntegrator`] — 1-D elastodynamics with
//!   thermal-expansion loading and a strain-history internal state

pub mod integrator;
pub mod mechanics;
pub mod state;
pub mod thermal;

pub use integrator::{IntegratorStatus, NonlinearSettings, TransientIntegrator};
pub use mechanics::{ElastodynamicsIntegrator, MechanicsBoundary, MechanicsMaterial};
pub use state::{InternalState, SolutionHistory, SolutionState, StateVectors};
pub use thermal::{ThermalBoundary, ThermalConductionIntegrator, ThermalMaterial};
