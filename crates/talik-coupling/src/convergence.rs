//! Convergence evaluation for the Schwarz loop.
//!
//! After every complete sweep the driver aggregates per-subdomain state
//! norms into absolute and relative error measures and applies the
//! configured convergence predicate. Criterion and operator strings are
//! parsed at construction time; evaluation itself cannot fail.

use serde::{Deserialize, Serialize};
use talik_types::{TalikError, TalikResult};

/// Which error measure drives convergence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConvergenceCriterion {
    /// Absolute error only.
    Absolute,
    /// Relative error only.
    Relative,
    /// Both errors, combined by a [`ConvergenceOperator`].
    Both,
}

impl std::str::FromStr for ConvergenceCriterion {
    type Err = TalikError;

    fn from_str(s: &str) -> TalikResult<Self> {
        match s.to_uppercase().as_str() {
            "ABSOLUTE" => Ok(Self::Absolute),
            "RELATIVE" => Ok(Self::Relative),
            "BOTH" => Ok(Self::Both),
            _ => Err(TalikError::InvalidConfig(format!(
                "Unknown convergence criterion '{s}' (expected ABSOLUTE, RELATIVE or BOTH)"
            ))),
        }
    }
}

/// How the two error checks combine when the criterion is `Both`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConvergenceOperator {
    /// Both checks must pass.
    And,
    /// Either check passing suffices.
    Or,
}

impl std::str::FromStr for ConvergenceOperator {
    type Err = TalikError;

    fn from_str(s: &str) -> TalikResult<Self> {
        match s.to_uppercase().as_str() {
            "AND" => Ok(Self::And),
            "OR" => Ok(Self::Or),
            _ => Err(TalikError::InvalidConfig(format!(
                "Unknown convergence operator '{s}' (expected AND or OR)"
            ))),
        }
    }
}

/// Derivative-weighted state norms for one subdomain after one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StateNorms {
    /// Norm of the previous iterate.
    pub norm_initial: f64,
    /// Norm of the new iterate.
    pub norm_final: f64,
    /// Norm of the difference between the two.
    pub norm_difference: f64,
}

/// Aggregate error measures and the convergence verdict for one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConvergenceReport {
    /// Euclidean aggregate of the per-subdomain initial norms.
    pub norm_initial: f64,
    /// Euclidean aggregate of the per-subdomain final norms.
    pub norm_final: f64,
    /// Euclidean aggregate of the per-subdomain difference norms.
    pub norm_difference: f64,
    /// Absolute error (the aggregate difference norm).
    pub abs_error: f64,
    /// Relative error (difference over final, or absolute when the
    /// final norm vanishes).
    pub rel_error: f64,
    /// Whether the configured predicate is satisfied.
    pub converged: bool,
}

/// Applies the configured convergence predicate to sweep norms.
#[derive(Debug, Clone)]
pub struct ConvergenceEvaluator {
    criterion: ConvergenceCriterion,
    operator: ConvergenceOperator,
    abs_tol: f64,
    rel_tol: f64,
}

impl ConvergenceEvaluator {
    /// Creates an evaluator. Tolerances are validated by the coupling
    /// configuration before they reach this point.
    pub fn new(
        criterion: ConvergenceCriterion,
        operator: ConvergenceOperator,
        abs_tol: f64,
        rel_tol: f64,
    ) -> Self {
        Self {
            criterion,
            operator,
            abs_tol,
            rel_tol,
        }
    }

    /// Evaluates one complete sweep.
    ///
    /// Aggregates are the Euclidean norm of the per-subdomain norm
    /// vector, not a component-wise sum.
    pub fn evaluate(&self, norms: &[StateNorms]) -> ConvergenceReport {
        let norm_initial = euclidean(norms, |n| n.norm_initial);
        let norm_final = euclidean(norms, |n| n.norm_final);
        let norm_difference = euclidean(norms, |n| n.norm_difference);

        let abs_error = norm_difference;
        let rel_error = if norm_final > 0.0 {
            norm_difference / norm_final
        } else {
            norm_difference
        };

        let converged_absolute = abs_error <= self.abs_tol;
        let converged_relative = rel_error <= self.rel_tol;

        let converged = match self.criterion {
            ConvergenceCriterion::Absolute => converged_absolute,
            ConvergenceCriterion::Relative => converged_relative,
            ConvergenceCriterion::Both => match self.operator {
                ConvergenceOperator::And => converged_absolute && converged_relative,
                ConvergenceOperator::Or => converged_absolute || converged_relative,
            },
        };

        ConvergenceReport {
            norm_initial,
            norm_final,
            norm_difference,
            abs_error,
            rel_error,
            converged,
        }
    }
}

fn euclidean(norms: &[StateNorms], select: impl Fn(&StateNorms) -> f64) -> f64 {
    norms
        .iter()
        .map(|n| {
            let v = select(n);
            v * v
        })
        .sum::<f64>()
        .sqrt()
}
