//! Euclidean norms for convergence metrics.
//!
//! The coupling driver aggregates per-subdomain state norms into the
//! error measures its convergence criterion is built on.

/// Euclidean (L2) norm of a vector.
pub fn l2(v: &[f64]) -> f64 {
    v.iter().map(|&x| x * x).sum::<f64>().sqrt()
}

/// Euclidean norm of the element-wise difference `a - b`.
///
/// # Panics
///
/// Panics if the slices differ in length; difference vectors are always
/// taken between iterates of the same discretization.
pub fn l2_diff(a: &[f64], b: &[f64]) -> f64 {
    assert_eq!(
        a.len(),
        b.len(),
        "difference norm requires equal-length vectors"
    );
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}
