//! Integration tests for talik-types.

use talik_types::{ProblemKind, SubdomainId, TalikError};

// ─── Identifier Tests ─────────────────────────────────────────

#[test]
fn subdomain_id_index_and_display() {
    let id = SubdomainId(1);
    assert_eq!(id.index(), 1);
    assert_eq!(format!("{id}"), "1");
    assert_eq!(SubdomainId::from(3u32), SubdomainId(3));
}

// ─── ProblemKind Tests ────────────────────────────────────────

#[test]
fn problem_kind_arity() {
    assert!(ProblemKind::Mechanics.has_acceleration());
    assert!(!ProblemKind::Thermal.has_acceleration());
}

#[test]
fn problem_kind_display() {
    assert_eq!(format!("{}", ProblemKind::Mechanics), "Mechanics");
    assert_eq!(format!("{}", ProblemKind::Thermal), "Thermal");
}

// ─── Error Tests ──────────────────────────────────────────────

#[test]
fn error_display_carries_context() {
    let err = TalikError::InvalidConfig("reduction_factor (1.5) must lie in (0, 1]".into());
    let msg = format!("{err}");
    assert!(msg.contains("Invalid configuration"));
    assert!(msg.contains("reduction_factor"));
}

#[test]
fn io_error_converts() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
    let err: TalikError = io.into();
    assert!(matches!(err, TalikError::Io(_)));
}
