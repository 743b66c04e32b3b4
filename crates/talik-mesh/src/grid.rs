//! 1-D line grid used by the reference subdomain models.

use serde::{Deserialize, Serialize};
use talik_types::{TalikError, TalikResult};

/// Uniform 1-D discretization of a rod of given length.
///
/// Nodes are numbered left to right; element `e` connects nodes
/// `e` and `e + 1`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineGrid {
    /// Number of nodes.
    pub n_nodes: usize,
    /// Physical length of the rod (meters).
    pub length: f64,
}

impl LineGrid {
    /// Creates a grid, validating the discretization.
    pub fn new(n_nodes: usize, length: f64) -> TalikResult<Self> {
        if n_nodes < 2 {
            return Err(TalikError::InvalidMesh(format!(
                "Line grid needs at least 2 nodes, got {n_nodes}"
            )));
        }
        if length <= 0.0 {
            return Err(TalikError::InvalidMesh(format!(
                "Line grid length must be positive, got {length}"
            )));
        }
        Ok(Self { n_nodes, length })
    }

    /// Number of elements.
    #[inline]
    pub fn n_elements(&self) -> usize {
        self.n_nodes - 1
    }

    /// Uniform element length.
    #[inline]
    pub fn spacing(&self) -> f64 {
        self.length / self.n_elements() as f64
    }

    /// Node coordinates, left to right.
    pub fn coords(&self) -> Vec<f64> {
        let h = self.spacing();
        (0..self.n_nodes).map(|i| i as f64 * h).collect()
    }
}

/// Convenience constructor mirroring the grid-generator style used
/// elsewhere in the workspace.
pub fn line_grid(n_nodes: usize, length: f64) -> TalikResult<LineGrid> {
    LineGrid::new(n_nodes, length)
}
