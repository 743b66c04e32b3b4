//! Integration tests for talik-solver.

use talik_mesh::{shared, LineGrid, MeshDatabase, SharedDatabase};
use talik_solver::{
    ElastodynamicsIntegrator, IntegratorStatus, MechanicsBoundary, MechanicsMaterial,
    NonlinearSettings, StateVectors, ThermalBoundary, ThermalConductionIntegrator,
    ThermalMaterial, TransientIntegrator,
};

const INITIAL_TEMPERATURE: f64 = 265.15;

fn thermal_database(n: usize) -> SharedDatabase {
    shared(MeshDatabase::new(n, false))
}

fn mechanics_database(n: usize) -> SharedDatabase {
    shared(MeshDatabase::new(n, true))
}

fn thermal_integrator(db: SharedDatabase, peer: Option<SharedDatabase>) -> ThermalConductionIntegrator {
    ThermalConductionIntegrator::new(
        LineGrid::new(5, 1.0).unwrap(),
        ThermalMaterial::default(),
        ThermalBoundary::default(),
        INITIAL_TEMPERATURE,
        NonlinearSettings::default(),
        db,
        peer,
    )
    .unwrap()
}

fn mechanics_integrator(
    db: SharedDatabase,
    peer: Option<SharedDatabase>,
    traction: f64,
) -> ElastodynamicsIntegrator {
    ElastodynamicsIntegrator::new(
        LineGrid::new(5, 1.0).unwrap(),
        MechanicsMaterial::default(),
        MechanicsBoundary {
            end_traction: traction,
        },
        NonlinearSettings::default(),
        db,
        peer,
    )
    .unwrap()
}

// ─── State Container Tests ────────────────────────────────────

#[test]
fn state_vectors_arity() {
    let thermal = StateVectors::zeros(4, false);
    assert!(!thermal.has_acceleration());
    let mechanics = StateVectors::zeros(4, true);
    assert!(mechanics.has_acceleration());
    assert_eq!(mechanics.len(), 4);
}

#[test]
fn state_vectors_overwrite_rejects_mismatch() {
    let mut a = StateVectors::zeros(4, false);
    let b = StateVectors::zeros(4, true);
    assert!(a.overwrite_from(&b).is_err());

    let c = StateVectors::zeros(5, false);
    assert!(a.overwrite_from(&c).is_err());
}

#[test]
fn state_vectors_overwrite_copies() {
    let mut a = StateVectors::zeros(2, true);
    let mut b = StateVectors::zeros(2, true);
    b.x = vec![1.0, 2.0];
    b.xdot = vec![3.0, 4.0];
    b.xdotdot = Some(vec![5.0, 6.0]);

    a.overwrite_from(&b).unwrap();
    assert_eq!(a, b);
}

// ─── Thermal Integrator Tests ─────────────────────────────────

#[test]
fn thermal_nominal_values_are_uniform() {
    let integrator = thermal_integrator(thermal_database(5), None);
    let nominal = integrator.nominal_values();
    assert!(nominal.x.iter().all(|&t| (t - INITIAL_TEMPERATURE).abs() < 1e-12));
    assert!(nominal.xdot.iter().all(|&v| v == 0.0));
    assert!(nominal.xdotdot.is_none());
}

#[test]
fn thermal_cools_toward_surface() {
    let db = thermal_database(5);
    let mut integrator = thermal_integrator(db.clone(), None);

    let nominal = integrator.nominal_values();
    integrator.set_start_time(0.0);
    integrator.set_final_time(5000.0);
    integrator.set_initial_time_step(5000.0);
    integrator.set_initial_state(0.0, &nominal).unwrap();

    let status = integrator.integrate().unwrap();
    assert_eq!(status, IntegratorStatus::Converged);

    let state = integrator.solution_history().current_state().unwrap();
    // Surface node pinned to the boundary temperature.
    assert!((state.vectors.x[0] - 253.15).abs() < 1e-9);
    // The node next to the surface has started cooling.
    assert!(state.vectors.x[1] < INITIAL_TEMPERATURE);
    assert!(state.vectors.x.iter().all(|t| t.is_finite()));

    // The solution was persisted to the mesh database.
    let persisted = db.read().unwrap();
    assert!((persisted.solution()[0] - 253.15).abs() < 1e-9);
    assert!((persisted.time() - 5000.0).abs() < 1e-12);
}

#[test]
fn thermal_ice_saturation_tracks_temperature() {
    let mut integrator = thermal_integrator(thermal_database(5), None);
    let nominal = integrator.nominal_values();
    integrator.set_start_time(0.0);
    integrator.set_final_time(1000.0);
    integrator.set_initial_time_step(1000.0);
    integrator.set_initial_state(0.0, &nominal).unwrap();
    integrator.integrate().unwrap();

    // Everything stays well below the freezing point, so the rod is
    // fully frozen.
    let internal = integrator.internal_state();
    let saturation = internal.get("ice_saturation").unwrap();
    assert!(saturation.iter().all(|&s| (s - 1.0).abs() < 1e-12));
}

#[test]
fn thermal_internal_state_round_trip() {
    let mut integrator = thermal_integrator(thermal_database(5), None);
    let before = integrator.internal_state();
    integrator.restore_internal_state(&before).unwrap();
    assert_eq!(integrator.internal_state(), before);
}

#[test]
fn thermal_fails_when_iteration_capped() {
    let db = thermal_database(5);
    let mut integrator = ThermalConductionIntegrator::new(
        LineGrid::new(5, 1.0).unwrap(),
        ThermalMaterial::default(),
        ThermalBoundary::default(),
        INITIAL_TEMPERATURE,
        NonlinearSettings {
            max_iterations: 1,
            ..Default::default()
        },
        db,
        None,
    )
    .unwrap();

    let nominal = integrator.nominal_values();
    integrator.set_start_time(0.0);
    integrator.set_final_time(5000.0);
    integrator.set_initial_time_step(5000.0);
    integrator.set_initial_state(0.0, &nominal).unwrap();

    assert_eq!(integrator.integrate().unwrap(), IntegratorStatus::Failed);
}

#[test]
fn thermal_rejects_empty_window() {
    let mut integrator = thermal_integrator(thermal_database(5), None);
    let nominal = integrator.nominal_values();
    integrator.set_start_time(1.0);
    integrator.set_final_time(1.0);
    integrator.set_initial_state(1.0, &nominal).unwrap();
    assert!(integrator.integrate().is_err());
}

#[test]
fn thermal_rejects_acceleration_state() {
    let mut integrator = thermal_integrator(thermal_database(5), None);
    let wrong = StateVectors::zeros(5, true);
    assert!(integrator.set_initial_state(0.0, &wrong).is_err());
}

#[test]
fn thermal_rejects_bad_guess_length() {
    let mut integrator = thermal_integrator(thermal_database(5), None);
    assert!(integrator.set_initial_guess(&[1.0, 2.0]).is_err());
}

// ─── Mechanics Integrator Tests ───────────────────────────────

#[test]
fn mechanics_nominal_values_at_rest() {
    let integrator = mechanics_integrator(mechanics_database(5), None, 0.0);
    let nominal = integrator.nominal_values();
    assert!(nominal.x.iter().all(|&u| u == 0.0));
    assert!(nominal.xdotdot.is_some());
}

#[test]
fn mechanics_traction_pulls_free_end() {
    let db = mechanics_database(5);
    let mut integrator = mechanics_integrator(db.clone(), None, 1000.0);

    let nominal = integrator.nominal_values();
    integrator.set_start_time(0.0);
    integrator.set_final_time(0.005);
    integrator.set_initial_time_step(0.005);
    integrator.set_initial_state(0.0, &nominal).unwrap();

    let status = integrator.integrate().unwrap();
    assert_eq!(status, IntegratorStatus::Converged);

    let state = integrator.solution_history().current_state().unwrap();
    assert_eq!(state.vectors.x[0], 0.0, "pinned node must not move");
    assert!(
        state.vectors.x[4] > 0.0,
        "free end should move toward the traction, got {}",
        state.vectors.x[4]
    );
    assert!(state.vectors.xdotdot.is_some());

    let persisted = db.read().unwrap();
    assert!(persisted.acceleration().is_some());
}

#[test]
fn mechanics_warm_peer_expands_rod() {
    // Peer temperatures above the reference make the rod expand even
    // without any traction.
    let peer = thermal_database(5);
    peer.write()
        .unwrap()
        .write_solution(&[283.15; 5], &[0.0; 5], None, 0.0)
        .unwrap();

    let db = mechanics_database(5);
    let mut integrator = mechanics_integrator(db, Some(peer), 0.0);

    let nominal = integrator.nominal_values();
    integrator.set_start_time(0.0);
    integrator.set_final_time(0.005);
    integrator.set_initial_time_step(0.005);
    integrator.set_initial_state(0.0, &nominal).unwrap();
    integrator.integrate().unwrap();

    let state = integrator.solution_history().current_state().unwrap();
    assert!(
        state.vectors.x[4] > 0.0,
        "free end should expand outward, got {}",
        state.vectors.x[4]
    );

    // Expansion leaves a strain history behind.
    let internal = integrator.internal_state();
    let peak = internal.get("peak_strain").unwrap();
    assert!(peak.iter().any(|&s| s > 0.0));
}

#[test]
fn mechanics_fails_when_iteration_capped() {
    let db = mechanics_database(5);
    let mut integrator = ElastodynamicsIntegrator::new(
        LineGrid::new(5, 1.0).unwrap(),
        MechanicsMaterial::default(),
        MechanicsBoundary {
            end_traction: 1000.0,
        },
        NonlinearSettings {
            max_iterations: 1,
            ..Default::default()
        },
        db,
        None,
    )
    .unwrap();

    let nominal = integrator.nominal_values();
    integrator.set_start_time(0.0);
    integrator.set_final_time(0.005);
    integrator.set_initial_time_step(0.005);
    integrator.set_initial_state(0.0, &nominal).unwrap();

    assert_eq!(integrator.integrate().unwrap(), IntegratorStatus::Failed);
}

#[test]
fn mechanics_rejects_thermal_arity_state() {
    let mut integrator = mechanics_integrator(mechanics_database(5), None, 0.0);
    let wrong = StateVectors::zeros(5, false);
    assert!(integrator.set_initial_state(0.0, &wrong).is_err());
}

#[test]
fn mechanics_requires_acceleration_database() {
    let db = shared(MeshDatabase::new(5, false));
    let result = ElastodynamicsIntegrator::new(
        LineGrid::new(5, 1.0).unwrap(),
        MechanicsMaterial::default(),
        MechanicsBoundary::default(),
        NonlinearSettings::default(),
        db,
        None,
    );
    assert!(result.is_err());
}

#[test]
fn internal_state_rejects_foreign_blob() {
    let mut thermal = thermal_integrator(thermal_database(5), None);
    let mechanics = mechanics_integrator(mechanics_database(5), None, 0.0);
    // A mechanics snapshot has no ice saturation field.
    assert!(thermal
        .restore_internal_state(&mechanics.internal_state())
        .is_err());
}
