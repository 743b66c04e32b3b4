//! Per-subdomain snapshot storage for step rollback.
//!
//! At the top of every outer time step the driver checkpoints each
//! subdomain here; a rejected step restores from these snapshots. The
//! cache is the sole cross-iteration shared mutable state of the
//! coupling machinery, driver-owned and never touched concurrently.

use talik_solver::{InternalState, StateVectors};
use talik_types::SubdomainId;

/// Everything needed to exactly roll one subdomain back to the start of
/// the current time step: solution-derivative vectors plus the opaque
/// internal-state blob.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Step-start solution vectors.
    pub solution: StateVectors,
    /// Step-start internal state (history variables).
    pub internal: InternalState,
}

/// Fixed-size snapshot store, one slot per subdomain.
///
/// Sized once at construction and never resized.
pub struct StateCache {
    slots: Vec<Option<Snapshot>>,
}

impl StateCache {
    /// Creates an empty cache for `n_subdomains` subdomains.
    pub fn new(n_subdomains: usize) -> Self {
        Self {
            slots: (0..n_subdomains).map(|_| None).collect(),
        }
    }

    /// Stores the checkpoint for a subdomain, replacing any previous one.
    pub fn store(&mut self, id: SubdomainId, snapshot: Snapshot) {
        self.slots[id.index()] = Some(snapshot);
    }

    /// Returns the checkpoint for a subdomain.
    ///
    /// # Panics
    ///
    /// Reading a checkpoint that was never written is a caller contract
    /// violation (the driver checkpoints every subdomain before any
    /// sweep can fail), so this panics rather than reporting a runtime
    /// error.
    pub fn get(&self, id: SubdomainId) -> &Snapshot {
        self.slots[id.index()]
            .as_ref()
            .unwrap_or_else(|| panic!("no checkpoint stored for subdomain {id}; checkpoint() must precede restore"))
    }

    /// Returns true if a checkpoint is stored for the subdomain.
    pub fn contains(&self, id: SubdomainId) -> bool {
        self.slots
            .get(id.index())
            .is_some_and(|slot| slot.is_some())
    }

    /// Number of subdomain slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if the cache has no slots.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
