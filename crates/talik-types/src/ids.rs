//! Strongly-typed identifiers for simulation entities.
//!
//! Newtype wrappers prevent accidental mixing of subdomain indices
//! with node or step indices.

use serde::{Deserialize, Serialize};

/// Index of a subdomain within the coupled system.
///
/// Subdomain storage is sized once at construction and never resized;
/// a `SubdomainId` handed out by the driver is valid for the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubdomainId(pub u32);

impl SubdomainId {
    /// Returns the raw index as `usize` for array indexing.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for SubdomainId {
    fn from(val: u32) -> Self {
        Self(val)
    }
}

impl std::fmt::Display for SubdomainId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
