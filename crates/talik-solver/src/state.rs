//! State containers exchanged across the integrator seam.
//!
//! The coupling driver never looks inside a solver; it moves these
//! containers between integrators, the checkpoint cache, and the
//! mesh-resident database.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use talik_types::{TalikError, TalikResult};

/// Solution-derivative vectors for one subdomain.
///
/// Thermal subdomains carry solution + rate; mechanics additionally
/// carries an acceleration channel. The arity is fixed by the problem
/// kind at construction and never changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateVectors {
    /// Solution (temperature or displacement).
    pub x: Vec<f64>,
    /// First time derivative.
    pub xdot: Vec<f64>,
    /// Second time derivative; `None` for thermal subdomains.
    pub xdotdot: Option<Vec<f64>>,
}

impl StateVectors {
    /// Zero-initialized state of the given arity.
    pub fn zeros(n: usize, with_acceleration: bool) -> Self {
        Self {
            x: vec![0.0; n],
            xdot: vec![0.0; n],
            xdotdot: with_acceleration.then(|| vec![0.0; n]),
        }
    }

    /// Number of degrees of freedom.
    #[inline]
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Returns true if the state holds no degrees of freedom.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Returns true if the state carries an acceleration channel.
    #[inline]
    pub fn has_acceleration(&self) -> bool {
        self.xdotdot.is_some()
    }

    /// Zero-fills this state, then copies `other` into it.
    ///
    /// Length and arity must match; a mismatch means the caller mixed up
    /// subdomains and is reported as an invariant violation.
    pub fn overwrite_from(&mut self, other: &StateVectors) -> TalikResult<()> {
        if self.len() != other.len() || self.has_acceleration() != other.has_acceleration() {
            return Err(TalikError::InvariantViolation(format!(
                "state overwrite with mismatched layout: {} dofs (accel: {}) vs {} dofs (accel: {})",
                self.len(),
                self.has_acceleration(),
                other.len(),
                other.has_acceleration()
            )));
        }

        self.x.fill(0.0);
        self.x.copy_from_slice(&other.x);
        self.xdot.fill(0.0);
        self.xdot.copy_from_slice(&other.xdot);
        if let (Some(dst), Some(src)) = (self.xdotdot.as_mut(), other.xdotdot.as_ref()) {
            dst.fill(0.0);
            dst.copy_from_slice(src);
        }
        Ok(())
    }
}

/// Opaque internal-state blob for one subdomain.
///
/// Holds whatever history variables the owning integrator needs to
/// resume exactly (ice saturation, strain history). The coupling driver
/// snapshots and restores these without interpreting them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InternalState {
    fields: BTreeMap<String, Vec<f64>>,
}

impl InternalState {
    /// Empty internal state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a named field, replacing any previous value.
    pub fn set(&mut self, name: impl Into<String>, values: Vec<f64>) {
        self.fields.insert(name.into(), values);
    }

    /// Looks up a named field.
    pub fn get(&self, name: &str) -> Option<&[f64]> {
        self.fields.get(name).map(Vec::as_slice)
    }

    /// Looks up a named field, reporting its absence as an invariant
    /// violation (a snapshot is only ever restored into the integrator
    /// that produced it).
    pub fn require(&self, name: &str) -> TalikResult<&[f64]> {
        self.get(name).ok_or_else(|| {
            TalikError::InvariantViolation(format!(
                "internal state is missing the '{name}' field"
            ))
        })
    }

    /// Returns true if no fields are stored.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// One accepted solver state, stamped with its time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionState {
    /// Simulation time of this state.
    pub time: f64,
    /// Solution vectors at this time.
    pub vectors: StateVectors,
}

/// History of accepted solver states for one integration call.
///
/// The driver only ever consumes the current (most recent) state, but
/// integrators append every accepted sub-step for inspection.
#[derive(Debug, Clone, Default)]
pub struct SolutionHistory {
    states: Vec<SolutionState>,
}

impl SolutionHistory {
    /// Empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an accepted state.
    pub fn push(&mut self, state: SolutionState) {
        self.states.push(state);
    }

    /// The most recently accepted state, if any integration has run.
    pub fn current_state(&self) -> Option<&SolutionState> {
        self.states.last()
    }

    /// Number of recorded states.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Returns true if no states are recorded.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Drops all recorded states.
    pub fn clear(&mut self) {
        self.states.clear();
    }
}
