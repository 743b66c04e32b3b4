//! # talik-mesh
//!
//! Discretization and mesh-resident field storage.
//!
//! ## Key Types
//!
//! - [`LineGrid`] — 1-D line discretization for the reference models
//! - [`MeshDatabase`] — persisted per-subdomain solution fields; the
//!   coupling boundary data is read from here, and checkpoint restores
//!   are pushed back here
//! - [`SharedDatabase`] — shared handle linking a subdomain's integrator,
//!   its peer, and the coupling driver to the same database

pub mod database;
pub mod grid;

pub use database::{shared, MeshDatabase, SharedDatabase};
pub use grid::{line_grid, LineGrid};
