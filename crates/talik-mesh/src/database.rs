//! Mesh-resident solution database.
//!
//! Each subdomain persists its solution fields here after every solve.
//! The peer subdomain's boundary/coupling data is *read from this
//! database*, not from in-memory solver state — which is why a
//! checkpoint restore must push the rolled-back solution into the
//! database before the next solve is attempted. An inconsistency here
//! silently corrupts the next step.

use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use talik_types::{TalikError, TalikResult};

/// Persisted per-subdomain solution fields.
///
/// Holds the solution, its first time derivative, and (for mechanics)
/// its second time derivative, stamped with the time they were written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshDatabase {
    /// Number of nodes in the owning discretization.
    n_nodes: usize,
    /// Solution field (temperature or displacement).
    solution: Vec<f64>,
    /// First time derivative of the solution.
    rate: Vec<f64>,
    /// Second time derivative; `None` for thermal subdomains.
    acceleration: Option<Vec<f64>>,
    /// Time the fields were last written at.
    time: f64,
}

impl MeshDatabase {
    /// Creates a zero-initialized database for `n_nodes` nodes.
    ///
    /// `with_acceleration` selects the mechanics layout (second
    /// derivative present).
    pub fn new(n_nodes: usize, with_acceleration: bool) -> Self {
        Self {
            n_nodes,
            solution: vec![0.0; n_nodes],
            rate: vec![0.0; n_nodes],
            acceleration: with_acceleration.then(|| vec![0.0; n_nodes]),
            time: 0.0,
        }
    }

    /// Number of nodes.
    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.n_nodes
    }

    /// Time of the last write.
    #[inline]
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Writes solution fields into the database.
    ///
    /// Target vectors are zero-filled before copying. Lengths must match
    /// the discretization; an acceleration field may only be written to a
    /// database constructed with one.
    pub fn write_solution(
        &mut self,
        solution: &[f64],
        rate: &[f64],
        acceleration: Option<&[f64]>,
        time: f64,
    ) -> TalikResult<()> {
        self.check_len("solution", solution)?;
        self.check_len("rate", rate)?;

        overwrite(&mut self.solution, solution);
        overwrite(&mut self.rate, rate);

        match (self.acceleration.as_mut(), acceleration) {
            (Some(dst), Some(src)) => {
                if src.len() != self.n_nodes {
                    return Err(TalikError::InvalidMesh(format!(
                        "acceleration field length ({}) != node count ({})",
                        src.len(),
                        self.n_nodes
                    )));
                }
                overwrite(dst, src);
            }
            (Some(dst), None) => dst.fill(0.0),
            (None, Some(_)) => {
                return Err(TalikError::InvalidMesh(
                    "acceleration field written to a database without one".into(),
                ));
            }
            (None, None) => {}
        }

        self.time = time;
        Ok(())
    }

    /// Read access to the persisted solution field.
    #[inline]
    pub fn solution(&self) -> &[f64] {
        &self.solution
    }

    /// Read access to the persisted rate field.
    #[inline]
    pub fn rate(&self) -> &[f64] {
        &self.rate
    }

    /// Read access to the persisted acceleration field, if present.
    #[inline]
    pub fn acceleration(&self) -> Option<&[f64]> {
        self.acceleration.as_deref()
    }

    fn check_len(&self, what: &str, field: &[f64]) -> TalikResult<()> {
        if field.len() != self.n_nodes {
            return Err(TalikError::InvalidMesh(format!(
                "{what} field length ({}) != node count ({})",
                field.len(),
                self.n_nodes
            )));
        }
        Ok(())
    }
}

/// Zero-fill then copy, the write discipline every restore path uses.
fn overwrite(dst: &mut [f64], src: &[f64]) {
    dst.fill(0.0);
    dst.copy_from_slice(src);
}

/// Shared handle to a subdomain's mesh database.
///
/// The coupling driver, the owning integrator, and the peer integrator
/// all hold clones of this handle. The driver is single-threaded, so the
/// lock is never contended; it exists to satisfy the sharing, not as a
/// concurrency discipline.
pub type SharedDatabase = Arc<RwLock<MeshDatabase>>;

/// Creates a [`SharedDatabase`].
pub fn shared(database: MeshDatabase) -> SharedDatabase {
    Arc::new(RwLock::new(database))
}
