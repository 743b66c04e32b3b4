//! Integration tests for talik-coupling.
//!
//! The driver is exercised two ways: through scripted subdomains that
//! let the loop-control, rollback and step-size behavior be pinned
//! exactly, and through the production build path with the reference
//! integrators.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use talik_coupling::{
    build_driver, continue_schwarz, AdvanceResult, ConvergenceCriterion, ConvergenceEvaluator,
    ConvergenceOperator, CoupledSubdomain, CouplingConfig, CouplingDriver, IterationSeed,
    NormWeights, Reporter, Snapshot, StateCache, StateNorms, Subdomain, Termination, TimeWindow,
};
use talik_io::{load_coupled_input, read_frames};
use talik_mesh::{shared, LineGrid, MeshDatabase, SharedDatabase};
use talik_solver::{
    InternalState, NonlinearSettings, StateVectors, ThermalBoundary, ThermalConductionIntegrator,
    ThermalMaterial,
};
use talik_telemetry::{CouplingEvent, EventKind, EventSink};
use talik_types::{ProblemKind, SubdomainId, TalikResult};

// ─── Scripted subdomain ───────────────────────────────────────

#[derive(Clone, Copy)]
enum Action {
    Fail,
    Norms(StateNorms),
}

#[derive(Default)]
struct Probe {
    advances: u32,
    restores: u32,
    accepts: u32,
    /// Snapshot solutions handed to restore().
    restored_snapshots: Vec<StateVectors>,
    /// Live state right after each restore().
    states_after_restore: Vec<StateVectors>,
}

/// A subdomain whose advances follow a script; state is a small vector
/// the fake mutates on every successful advance so rollback has
/// something real to undo.
struct ScriptedSubdomain {
    kind: ProblemKind,
    state: StateVectors,
    internal: InternalState,
    script: VecDeque<Action>,
    default_norms: StateNorms,
    probe: Arc<Mutex<Probe>>,
}

impl ScriptedSubdomain {
    fn new(kind: ProblemKind, default_norms: StateNorms) -> (Self, Arc<Mutex<Probe>>) {
        let probe = Arc::new(Mutex::new(Probe::default()));
        let subdomain = Self {
            kind,
            state: StateVectors::zeros(3, kind.has_acceleration()),
            internal: InternalState::new(),
            script: VecDeque::new(),
            default_norms,
            probe: probe.clone(),
        };
        (subdomain, probe)
    }

    fn with_script(mut self, actions: &[Action]) -> Self {
        self.script = actions.iter().copied().collect();
        self
    }
}

impl CoupledSubdomain for ScriptedSubdomain {
    fn kind(&self) -> ProblemKind {
        self.kind
    }

    fn label(&self) -> &str {
        "scripted"
    }

    fn initialize(&mut self, _time: f64) -> TalikResult<()> {
        Ok(())
    }

    fn checkpoint(&self) -> TalikResult<Snapshot> {
        Ok(Snapshot {
            solution: self.state.clone(),
            internal: self.internal.clone(),
        })
    }

    fn advance(
        &mut self,
        _window: TimeWindow,
        _seed: IterationSeed,
        _checkpoint: &Snapshot,
    ) -> TalikResult<AdvanceResult> {
        self.probe.lock().unwrap().advances += 1;
        match self.script.pop_front() {
            Some(Action::Fail) => Ok(AdvanceResult::Failed),
            Some(Action::Norms(norms)) => {
                self.state.x[0] += 1.0;
                Ok(AdvanceResult::Advanced(norms))
            }
            None => {
                self.state.x[0] += 1.0;
                Ok(AdvanceResult::Advanced(self.default_norms))
            }
        }
    }

    fn restore(&mut self, snapshot: &Snapshot, _time: f64) -> TalikResult<()> {
        self.state.overwrite_from(&snapshot.solution)?;
        self.internal = snapshot.internal.clone();

        let mut probe = self.probe.lock().unwrap();
        probe.restores += 1;
        probe.restored_snapshots.push(snapshot.solution.clone());
        probe.states_after_restore.push(self.state.clone());
        Ok(())
    }

    fn accept_step(&mut self, _step_index: u32, _time: f64, _write_output: bool) -> TalikResult<()> {
        self.probe.lock().unwrap().accepts += 1;
        Ok(())
    }

    fn output_enabled(&self) -> bool {
        false
    }
}

struct SharedSink(Arc<Mutex<Vec<CouplingEvent>>>);

impl EventSink for SharedSink {
    fn handle(&mut self, event: &CouplingEvent) {
        self.0.lock().unwrap().push(event.clone());
    }

    fn name(&self) -> &str {
        "shared_sink"
    }
}

// ─── Fixtures ─────────────────────────────────────────────────

fn base_config() -> CouplingConfig {
    CouplingConfig {
        minimum_iterations: 1,
        maximum_iterations: 8,
        absolute_tolerance: 1.0e-8,
        relative_tolerance: 1.0e-8,
        maximum_steps: 4,
        initial_time: 0.0,
        final_time: 1.0e9,
        initial_time_step: 1.0,
        minimum_time_step: 0.25,
        maximum_time_step: 2.0,
        reduction_factor: 0.5,
        amplification_factor: 1.0,
        output_write_interval: 1,
        standard_initial_guess: false,
        criterion: ConvergenceCriterion::Absolute,
        operator: ConvergenceOperator::And,
        tolerance_factor_velocity: 1.0,
        tolerance_factor_acceleration: 1.0,
    }
}

fn norms(difference: f64) -> StateNorms {
    StateNorms {
        norm_initial: 1.0,
        norm_final: 1.0,
        norm_difference: difference,
    }
}

/// Norms that converge immediately but are not exactly zero.
fn converging_norms() -> StateNorms {
    norms(1.0e-12)
}

/// Norms that never satisfy the absolute tolerance.
fn diverging_norms() -> StateNorms {
    norms(1.0)
}

// ─── Continuation predicate (properties 2–4) ──────────────────

#[test]
fn predicate_failure_stops_first() {
    assert!(!continue_schwarz(true, 1.0, false, 0, 3, 8));
}

#[test]
fn predicate_zero_error_stops_despite_min_iters() {
    assert!(!continue_schwarz(false, 0.0, true, 1, 5, 8));
}

#[test]
fn predicate_min_iters_overrides_convergence() {
    assert!(continue_schwarz(false, 1.0e-14, true, 1, 3, 8));
    assert!(continue_schwarz(false, 1.0e-14, true, 2, 3, 8));
    assert!(!continue_schwarz(false, 1.0e-14, true, 3, 3, 8));
}

#[test]
fn predicate_max_iters_overrides_nonconvergence() {
    assert!(continue_schwarz(false, 1.0, false, 7, 1, 8));
    assert!(!continue_schwarz(false, 1.0, false, 8, 1, 8));
}

#[test]
fn predicate_continues_until_converged() {
    assert!(continue_schwarz(false, 1.0, false, 2, 1, 8));
    assert!(!continue_schwarz(false, 1.0, true, 2, 1, 8));
}

// ─── Convergence evaluator (property 1) ───────────────────────

fn single(difference: f64, final_norm: f64) -> Vec<StateNorms> {
    vec![StateNorms {
        norm_initial: 1.0,
        norm_final: final_norm,
        norm_difference: difference,
    }]
}

#[test]
fn both_and_requires_both_checks() {
    let eval = ConvergenceEvaluator::new(
        ConvergenceCriterion::Both,
        ConvergenceOperator::And,
        1.0,
        0.1,
    );

    // abs pass (0.5 <= 1.0), rel pass (0.05 <= 0.1)
    assert!(eval.evaluate(&single(0.5, 10.0)).converged);
    // abs pass, rel fail (0.5 > 0.1)
    assert!(!eval.evaluate(&single(0.5, 1.0)).converged);
    // abs fail (2.0 > 1.0), rel pass (0.02)
    assert!(!eval.evaluate(&single(2.0, 100.0)).converged);
    // both fail
    assert!(!eval.evaluate(&single(2.0, 2.0)).converged);
}

#[test]
fn both_or_accepts_either_check() {
    let eval = ConvergenceEvaluator::new(
        ConvergenceCriterion::Both,
        ConvergenceOperator::Or,
        1.0,
        0.1,
    );

    assert!(eval.evaluate(&single(0.5, 10.0)).converged);
    assert!(eval.evaluate(&single(0.5, 1.0)).converged); // abs passes
    assert!(eval.evaluate(&single(2.0, 100.0)).converged); // rel passes
    assert!(!eval.evaluate(&single(2.0, 2.0)).converged);
}

#[test]
fn absolute_and_relative_criteria_ignore_the_other_error() {
    let abs_only = ConvergenceEvaluator::new(
        ConvergenceCriterion::Absolute,
        ConvergenceOperator::And,
        1.0,
        1.0e-30,
    );
    assert!(abs_only.evaluate(&single(0.5, 1.0)).converged);

    let rel_only = ConvergenceEvaluator::new(
        ConvergenceCriterion::Relative,
        ConvergenceOperator::And,
        1.0e-30,
        0.1,
    );
    assert!(rel_only.evaluate(&single(0.5, 100.0)).converged);
}

#[test]
fn relative_error_falls_back_when_final_norm_vanishes() {
    let eval = ConvergenceEvaluator::new(
        ConvergenceCriterion::Relative,
        ConvergenceOperator::And,
        1.0,
        1.0,
    );
    let report = eval.evaluate(&single(0.5, 0.0));
    assert!((report.rel_error - 0.5).abs() < 1e-15);
}

#[test]
fn aggregation_is_euclidean_not_summed() {
    let eval = ConvergenceEvaluator::new(
        ConvergenceCriterion::Absolute,
        ConvergenceOperator::And,
        1.0e-8,
        1.0e-8,
    );
    let norms = vec![
        StateNorms {
            norm_initial: 0.0,
            norm_final: 0.0,
            norm_difference: 3.0,
        },
        StateNorms {
            norm_initial: 0.0,
            norm_final: 0.0,
            norm_difference: 4.0,
        },
    ];
    let report = eval.evaluate(&norms);
    assert!((report.abs_error - 5.0).abs() < 1e-12);
}

// ─── Configuration firewalls ──────────────────────────────────

#[test]
fn config_accepts_base() {
    assert!(base_config().validate().is_ok());
}

#[test]
fn config_rejects_bad_iteration_bounds() {
    let mut config = base_config();
    config.minimum_iterations = 5;
    config.maximum_iterations = 2;
    assert!(config.validate().is_err());

    let mut config = base_config();
    config.minimum_iterations = 0;
    assert!(config.validate().is_err());
}

#[test]
fn config_rejects_bad_step_bounds() {
    let mut config = base_config();
    config.minimum_time_step = 0.0;
    assert!(config.validate().is_err());

    let mut config = base_config();
    config.maximum_time_step = 0.1; // below minimum
    assert!(config.validate().is_err());

    let mut config = base_config();
    config.initial_time_step = 5.0; // above maximum
    assert!(config.validate().is_err());
}

#[test]
fn config_rejects_bad_factors() {
    let mut config = base_config();
    config.reduction_factor = 0.0;
    assert!(config.validate().is_err());

    let mut config = base_config();
    config.reduction_factor = 1.5;
    assert!(config.validate().is_err());

    let mut config = base_config();
    config.amplification_factor = 0.9;
    assert!(config.validate().is_err());
}

#[test]
fn config_rejects_reversed_times() {
    let mut config = base_config();
    config.final_time = -1.0;
    assert!(config.validate().is_err());
}

#[test]
fn criterion_strings_parse_case_insensitively() {
    use std::str::FromStr;
    assert_eq!(
        ConvergenceCriterion::from_str("both").unwrap(),
        ConvergenceCriterion::Both
    );
    assert_eq!(
        ConvergenceCriterion::from_str("Absolute").unwrap(),
        ConvergenceCriterion::Absolute
    );
    assert!(ConvergenceCriterion::from_str("sometimes").is_err());

    assert_eq!(
        ConvergenceOperator::from_str("oR").unwrap(),
        ConvergenceOperator::Or
    );
    assert!(ConvergenceOperator::from_str("xor").is_err());
}

// ─── Driver construction ──────────────────────────────────────

#[test]
fn driver_requires_one_subdomain_of_each_kind() {
    let (a, _) = ScriptedSubdomain::new(ProblemKind::Thermal, converging_norms());
    let (b, _) = ScriptedSubdomain::new(ProblemKind::Thermal, converging_norms());
    assert!(CouplingDriver::new(base_config(), vec![a, b]).is_err());

    let (only, _) = ScriptedSubdomain::new(ProblemKind::Mechanics, converging_norms());
    assert!(CouplingDriver::new(base_config(), vec![only]).is_err());
}

// ─── Driver loop behavior (properties 2–5, 7) ─────────────────

fn driver_with(
    config: CouplingConfig,
    thermal: ScriptedSubdomain,
    mechanics: ScriptedSubdomain,
) -> CouplingDriver<ScriptedSubdomain> {
    CouplingDriver::new(config, vec![thermal, mechanics])
        .unwrap()
        .with_reporter(Reporter::silent())
}

#[test]
fn zero_error_ends_loop_after_one_sweep_despite_min_iters() {
    let mut config = base_config();
    config.minimum_iterations = 3;
    config.maximum_steps = 2;

    let (thermal, t_probe) = ScriptedSubdomain::new(ProblemKind::Thermal, StateNorms::default());
    let (mechanics, _) = ScriptedSubdomain::new(ProblemKind::Mechanics, StateNorms::default());

    let summary = driver_with(config, thermal, mechanics).run().unwrap();

    assert_eq!(summary.steps_accepted, 2);
    assert_eq!(summary.iterations, 1, "zero error must end the loop immediately");
    assert!(summary.converged);
    // One sweep per step.
    assert_eq!(t_probe.lock().unwrap().advances, 2);
}

#[test]
fn loop_never_ends_before_min_iters() {
    let mut config = base_config();
    config.minimum_iterations = 3;
    config.maximum_steps = 1;

    let (thermal, t_probe) = ScriptedSubdomain::new(ProblemKind::Thermal, converging_norms());
    let (mechanics, m_probe) =
        ScriptedSubdomain::new(ProblemKind::Mechanics, converging_norms());

    let summary = driver_with(config, thermal, mechanics).run().unwrap();

    assert_eq!(summary.iterations, 3);
    assert!(summary.converged);
    assert_eq!(t_probe.lock().unwrap().advances, 3);
    assert_eq!(m_probe.lock().unwrap().advances, 3);
}

#[test]
fn loop_stops_not_converged_exactly_at_max_iters() {
    let mut config = base_config();
    config.minimum_iterations = 1;
    config.maximum_iterations = 5;
    config.maximum_steps = 1;

    let (thermal, t_probe) = ScriptedSubdomain::new(ProblemKind::Thermal, diverging_norms());
    let (mechanics, _) = ScriptedSubdomain::new(ProblemKind::Mechanics, diverging_norms());

    let summary = driver_with(config, thermal, mechanics).run().unwrap();

    assert_eq!(summary.iterations, 5);
    assert!(!summary.converged);
    // A non-converged loop still accepts the step; only solver failure
    // rejects it.
    assert_eq!(summary.steps_accepted, 1);
    assert_eq!(t_probe.lock().unwrap().advances, 5);
}

#[test]
fn reduction_cascade_then_terminal_abort() {
    // Mechanics fails on iteration 2 at step 1.0 with reduction 0.5 and
    // minimum 0.25: expect retries at 0.5 and 0.25, then the terminal.
    let mut config = base_config();
    config.maximum_time_step = 1.0;
    config.maximum_steps = 10;
    config.final_time = 100.0;

    let (thermal, t_probe) = ScriptedSubdomain::new(ProblemKind::Thermal, diverging_norms());
    let (mechanics, m_probe) = ScriptedSubdomain::new(ProblemKind::Mechanics, diverging_norms());
    let mechanics = mechanics.with_script(&[
        Action::Norms(diverging_norms()),
        Action::Fail,
        Action::Fail,
        Action::Fail,
    ]);

    let events = Arc::new(Mutex::new(Vec::new()));
    let mut driver = driver_with(config, thermal, mechanics);
    driver.bus_mut().add_sink(Box::new(SharedSink(events.clone())));

    let summary = driver.run().unwrap();

    assert_eq!(summary.termination, Termination::StepTooSmall);
    assert_eq!(summary.steps_accepted, 0);
    assert!((summary.final_time_step - 0.25).abs() < 1e-12);
    assert!((summary.final_time - 0.0).abs() < 1e-15, "time must not advance");

    // Two rollbacks (1.0 → 0.5 → 0.25); the third failure is terminal.
    assert_eq!(t_probe.lock().unwrap().restores, 2);
    assert_eq!(m_probe.lock().unwrap().restores, 2);
    assert_eq!(t_probe.lock().unwrap().accepts, 0);

    let reductions: Vec<(f64, f64)> = events
        .lock()
        .unwrap()
        .iter()
        .filter_map(|e| match e.kind {
            EventKind::StepReduced { from, to } => Some((from, to)),
            _ => None,
        })
        .collect();
    assert_eq!(reductions, vec![(1.0, 0.5), (0.5, 0.25)]);
}

#[test]
fn rollback_restores_presweep_state_exactly() {
    // Property 6 at the loop level: the state handed back by restore()
    // is bit-identical to the checkpoint taken at the start of the step,
    // no matter how many sweeps mutated the live state in between.
    let mut config = base_config();
    config.maximum_steps = 10;

    let (thermal, t_probe) = ScriptedSubdomain::new(ProblemKind::Thermal, diverging_norms());
    let (mechanics, _) = ScriptedSubdomain::new(ProblemKind::Mechanics, diverging_norms());
    // Three successful sweeps mutate state, then a failure rolls back.
    let thermal = thermal.with_script(&[
        Action::Norms(diverging_norms()),
        Action::Norms(diverging_norms()),
        Action::Norms(diverging_norms()),
        Action::Fail,
    ]);

    let summary = driver_with(config, thermal, mechanics).run().unwrap();
    assert!(summary.steps_accepted > 0 || summary.termination == Termination::StepTooSmall);

    let probe = t_probe.lock().unwrap();
    assert!(probe.restores >= 1);
    // The checkpoint was taken before any sweep: the scripted state
    // starts at zero and only advance() mutates it.
    let expected = StateVectors::zeros(3, false);
    assert_eq!(probe.restored_snapshots[0], expected);
    assert_eq!(probe.states_after_restore[0], expected);
}

#[test]
fn accepted_steps_keep_step_size_within_bounds() {
    let mut config = base_config();
    config.initial_time_step = 0.5;
    config.minimum_time_step = 0.25;
    config.maximum_time_step = 1.0;
    config.amplification_factor = 1.5;
    config.maximum_steps = 5;

    let (thermal, _) = ScriptedSubdomain::new(ProblemKind::Thermal, converging_norms());
    let (mechanics, _) = ScriptedSubdomain::new(ProblemKind::Mechanics, converging_norms());

    let events = Arc::new(Mutex::new(Vec::new()));
    let mut driver = driver_with(config, thermal, mechanics);
    driver.bus_mut().add_sink(Box::new(SharedSink(events.clone())));

    let summary = driver.run().unwrap();
    assert_eq!(summary.steps_accepted, 5);
    assert!(summary.final_time_step >= 0.25 && summary.final_time_step <= 1.0);

    for event in events.lock().unwrap().iter() {
        match event.kind {
            EventKind::TimeStepBegin { time_step, .. } => {
                assert!(
                    (0.25..=1.0).contains(&time_step),
                    "step {time_step} escaped its bounds"
                );
            }
            EventKind::StepIncreased { to, .. } => assert!(to <= 1.0),
            _ => {}
        }
    }

    // 0.5 → 0.75 → 1.0, then pinned at the cap.
    assert!((summary.final_time_step - 1.0).abs() < 1e-12);
}

// ─── State cache contract ─────────────────────────────────────

#[test]
fn cache_round_trip() {
    let mut cache = StateCache::new(2);
    let id = SubdomainId(1);
    assert!(!cache.contains(id));

    let snapshot = Snapshot {
        solution: StateVectors::zeros(3, true),
        internal: InternalState::new(),
    };
    cache.store(id, snapshot.clone());
    assert!(cache.contains(id));
    assert_eq!(*cache.get(id), snapshot);
}

#[test]
#[should_panic(expected = "checkpoint() must precede restore")]
fn cache_read_before_write_is_a_contract_violation() {
    let cache = StateCache::new(2);
    let _ = cache.get(SubdomainId(0));
}

// ─── Production subdomain: checkpoint/restore (properties 6, 10) ──

fn production_thermal(db: SharedDatabase) -> Subdomain {
    let integrator = ThermalConductionIntegrator::new(
        LineGrid::new(5, 1.0).unwrap(),
        ThermalMaterial::default(),
        ThermalBoundary::default(),
        265.15,
        NonlinearSettings::default(),
        db.clone(),
        None,
    )
    .unwrap();
    Subdomain::new(
        "ACE Thermal 1D",
        ProblemKind::Thermal,
        Box::new(integrator),
        db,
        None,
        NormWeights {
            velocity: 1.0,
            acceleration: 1.0,
        },
    )
}

#[test]
fn checkpoint_then_restore_is_bit_identical() {
    let db = shared(MeshDatabase::new(5, false));
    let mut subdomain = production_thermal(db.clone());
    subdomain.initialize(0.0).unwrap();

    let snapshot = subdomain.checkpoint().unwrap();
    subdomain.restore(&snapshot, 0.0).unwrap();

    assert_eq!(subdomain.checkpoint().unwrap(), snapshot);
    assert_eq!(db.read().unwrap().solution(), snapshot.solution.x.as_slice());
}

#[test]
fn rollback_after_real_solve_recovers_checkpoint() {
    let db = shared(MeshDatabase::new(5, false));
    let mut subdomain = production_thermal(db.clone());
    subdomain.initialize(0.0).unwrap();

    let snapshot = subdomain.checkpoint().unwrap();

    let window = TimeWindow {
        start: 0.0,
        end: 2000.0,
        step: 2000.0,
    };
    let seed = IterationSeed {
        first_ever: true,
        standard_guess: false,
    };
    let result = subdomain.advance(window, seed, &snapshot).unwrap();
    assert!(matches!(result, AdvanceResult::Advanced(_)));

    // The solve moved the persisted solution away from the checkpoint.
    assert_ne!(db.read().unwrap().solution(), snapshot.solution.x.as_slice());

    subdomain.restore(&snapshot, 0.0).unwrap();

    assert_eq!(subdomain.checkpoint().unwrap(), snapshot);
    assert_eq!(db.read().unwrap().solution(), snapshot.solution.x.as_slice());
}

// ─── End-to-end production run ────────────────────────────────

#[test]
fn coupled_run_end_to_end() {
    let dir = std::env::temp_dir().join("talik_coupling_e2e");
    std::fs::create_dir_all(&dir).unwrap();

    std::fs::write(
        dir.join("coupled.toml"),
        r#"
[coupling]
model_input_files = ["thermal.toml", "mechanics.toml"]
maximum_iterations = 25
maximum_steps = 3
final_time = 1.0e6
initial_time_step = 10.0
minimum_time_step = 1.0
maximum_time_step = 50.0
reduction_factor = 0.5
amplification_factor = 1.5
absolute_tolerance = 1.0e-2
relative_tolerance = 1.0e-4
convergence_criterion = "both"
convergence_operator = "or"
"#,
    )
    .unwrap();

    std::fs::write(
        dir.join("thermal.toml"),
        r#"
[problem]
name = "ACE Thermal 1D"

[solver]
method = "transient"

[mesh]
nodes = 5
length = 1.0

[thermal]
initial_temperature = 265.15

[output]
enabled = true
path = "thermal.res"
"#,
    )
    .unwrap();

    std::fs::write(
        dir.join("mechanics.toml"),
        r#"
[problem]
name = "Mechanics 1D"

[solver]
method = "transient"

[mesh]
nodes = 5
length = 1.0
"#,
    )
    .unwrap();

    let input = load_coupled_input(&dir.join("coupled.toml")).unwrap();
    let mut driver = build_driver(&input)
        .unwrap()
        .with_reporter(Reporter::silent());

    let summary = driver.run().unwrap();

    assert_eq!(summary.termination, Termination::MaxSteps);
    assert_eq!(summary.steps_accepted, 3);
    assert!(summary.converged);
    assert!(summary.final_time > 0.0);
    assert!(
        summary.final_time_step >= 1.0 && summary.final_time_step <= 50.0,
        "step {} escaped its bounds",
        summary.final_time_step
    );

    // Initial configuration plus one frame per accepted step.
    let frames = read_frames(&dir.join("thermal.res")).unwrap();
    assert_eq!(frames.len() as u32, summary.steps_accepted + 1);
    assert!(frames[0].time < frames[frames.len() - 1].time);
    // The surface cools toward the boundary temperature over the run.
    let last = &frames[frames.len() - 1];
    assert!(last.solution[0] < 265.15);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn build_rejects_static_method_pair() {
    let dir = std::env::temp_dir().join("talik_coupling_static");
    std::fs::create_dir_all(&dir).unwrap();

    std::fs::write(
        dir.join("coupled.toml"),
        r#"
[coupling]
model_input_files = ["thermal.toml", "mechanics.toml"]
maximum_steps = 1
final_time = 1.0
initial_time_step = 1.0
"#,
    )
    .unwrap();
    for (name, problem) in [("thermal.toml", "ACE Thermal 1D"), ("mechanics.toml", "Mechanics 1D")] {
        std::fs::write(
            dir.join(name),
            format!(
                r#"
[problem]
name = "{problem}"

[solver]
method = "newton"

[mesh]
nodes = 5
length = 1.0
"#
            ),
        )
        .unwrap();
    }

    let input = load_coupled_input(&dir.join("coupled.toml")).unwrap();
    let err = build_driver(&input).unwrap_err();
    assert!(format!("{err}").contains("transient"), "{err}");

    let _ = std::fs::remove_dir_all(&dir);
}
