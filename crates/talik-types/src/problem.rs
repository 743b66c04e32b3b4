//! Physical problem kinds for coupled subdomains.

use serde::{Deserialize, Serialize};

/// The physics solved on one subdomain.
///
/// Exactly one subdomain of each kind participates in a coupled run.
/// The kind fixes the state-vector arity: mechanics carries an
/// acceleration channel, thermal does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProblemKind {
    /// Solid mechanics (displacement, velocity, acceleration).
    Mechanics,
    /// Heat conduction (temperature, temperature rate).
    Thermal,
}

impl ProblemKind {
    /// Returns true if this kind carries a second-derivative channel.
    #[inline]
    pub fn has_acceleration(self) -> bool {
        matches!(self, ProblemKind::Mechanics)
    }
}

impl std::fmt::Display for ProblemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProblemKind::Mechanics => write!(f, "Mechanics"),
            ProblemKind::Thermal => write!(f, "Thermal"),
        }
    }
}
