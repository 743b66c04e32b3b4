//! Outer coupling loop and adaptive step-size controller.
//!
//! Drives the time-stepping loop: checkpoint every subdomain, run the
//! Schwarz loop to convergence or failure, then either accept the step
//! (refresh initial conditions, write output, grow the step) or roll
//! back and retry smaller. The loop is implemented once, parametrized
//! over the per-subdomain advance capability.

use talik_telemetry::{CouplingEvent, EventBus, EventKind};
use talik_types::{ProblemKind, SubdomainId, TalikError, TalikResult};

use crate::cache::StateCache;
use crate::config::CouplingConfig;
use crate::convergence::{ConvergenceEvaluator, ConvergenceReport, StateNorms};
use crate::report::Reporter;
use crate::subdomain::{AdvanceResult, CoupledSubdomain, IterationSeed, TimeWindow};

/// Why the outer loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The configured step cap was reached.
    MaxSteps,
    /// The configured final time was reached.
    FinalTime,
    /// A step was rejected at the minimum step size — there is no room
    /// left to reduce, so the run ends early.
    StepTooSmall,
}

/// Final state of a coupled run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    /// Number of accepted time steps.
    pub steps_accepted: u32,
    /// Simulation time when the run ended.
    pub final_time: f64,
    /// Step size in effect when the run ended.
    pub final_time_step: f64,
    /// Schwarz iterations of the last completed loop.
    pub iterations: u32,
    /// Whether the last Schwarz loop converged.
    pub converged: bool,
    /// Why the loop stopped.
    pub termination: Termination,
}

/// Continuation predicate for the Schwarz loop, evaluated after every
/// complete sweep, in strict precedence order:
///
/// 1. a failure this sweep stops the loop;
/// 2. an exactly-zero absolute error stops the loop, converged;
/// 3. below the iteration floor the loop always continues;
/// 4. at the iteration cap the loop stops, not converged;
/// 5. otherwise it continues iff not yet converged.
pub fn continue_schwarz(
    failed: bool,
    abs_error: f64,
    converged: bool,
    iterations: u32,
    min_iterations: u32,
    max_iterations: u32,
) -> bool {
    if failed {
        return false;
    }

    // Regardless of other criteria, a zero error means there is nothing
    // left to iterate on.
    let zero_error = !(abs_error > 0.0);
    if zero_error {
        return false;
    }

    // Minimum iterations takes precedence over maximum iterations and
    // convergence.
    if iterations < min_iterations {
        return true;
    }

    // Maximum iterations takes precedence over convergence.
    if iterations >= max_iterations {
        return false;
    }

    !converged
}

/// Outcome of one Schwarz loop (all sweeps for one step attempt).
struct LoopOutcome {
    failed: Option<SubdomainId>,
    iterations: u32,
    report: ConvergenceReport,
}

/// The coupling driver: outer time-stepping loop plus step controller.
pub struct CouplingDriver<S: CoupledSubdomain> {
    config: CouplingConfig,
    evaluator: ConvergenceEvaluator,
    subdomains: Vec<S>,
    cache: StateCache,
    reporter: Reporter,
    bus: EventBus,
}

impl<S: CoupledSubdomain> std::fmt::Debug for CouplingDriver<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CouplingDriver")
            .field("config", &self.config)
            .field("evaluator", &self.evaluator)
            .field("subdomains", &self.subdomains.len())
            .finish_non_exhaustive()
    }
}

impl<S: CoupledSubdomain> CouplingDriver<S> {
    /// Builds a driver over the given subdomains.
    ///
    /// Exactly two subdomains — one mechanics, one thermal — must be
    /// supplied; anything else is a configuration error.
    pub fn new(config: CouplingConfig, subdomains: Vec<S>) -> TalikResult<Self> {
        config.validate()?;

        let n = subdomains.len();
        if n != 2 {
            return Err(TalikError::InvalidConfig(format!(
                "Sequential thermo-mechanical coupling requires exactly 2 subdomains, got {n}"
            )));
        }
        let mechanics = subdomains
            .iter()
            .filter(|s| s.kind() == ProblemKind::Mechanics)
            .count();
        let thermal = subdomains
            .iter()
            .filter(|s| s.kind() == ProblemKind::Thermal)
            .count();
        if mechanics != 1 || thermal != 1 {
            return Err(TalikError::InvalidConfig(format!(
                "Exactly one Mechanics and one Thermal subdomain are required, \
                 got {mechanics} mechanics and {thermal} thermal"
            )));
        }

        let evaluator = ConvergenceEvaluator::new(
            config.criterion,
            config.operator,
            config.absolute_tolerance,
            config.relative_tolerance,
        );
        let cache = StateCache::new(n);

        Ok(Self {
            config,
            evaluator,
            subdomains,
            cache,
            reporter: Reporter::stdout(),
            bus: EventBus::new(),
        })
    }

    /// Replaces the progress reporter.
    pub fn with_reporter(mut self, reporter: Reporter) -> Self {
        self.reporter = reporter;
        self
    }

    /// Access to the telemetry bus, e.g. to register sinks.
    pub fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    /// The resolved configuration this driver runs with.
    pub fn config(&self) -> &CouplingConfig {
        &self.config
    }

    /// Runs the coupled simulation to completion.
    ///
    /// Returns `Ok` for every controlled ending, including the
    /// step-too-small terminal (reported in the summary); `Err` is
    /// reserved for contract and I/O failures.
    pub fn run(&mut self) -> TalikResult<RunSummary> {
        let mut time_step = self.config.initial_time_step;
        let mut current_time = self.config.initial_time;
        let mut step_index: u32 = 0;
        let mut last_iterations: u32 = 0;
        let mut last_converged = false;

        // Seed initial conditions and write the initial configuration.
        for subdomain in &mut self.subdomains {
            subdomain.initialize(current_time)?;
        }

        // Time-stepping loop. Termination is checked here only; a step
        // already in progress always runs to acceptance or rejection.
        while step_index < self.config.maximum_steps && current_time < self.config.final_time {
            self.reporter.step_header(step_index, current_time, time_step);
            self.bus.emit(CouplingEvent::new(
                step_index,
                EventKind::TimeStepBegin {
                    time: current_time,
                    time_step,
                },
            ));

            // The rollback point: checkpoint every subdomain before the
            // inner loop begins.
            for (i, subdomain) in self.subdomains.iter().enumerate() {
                let snapshot = subdomain.checkpoint()?;
                self.cache.store(SubdomainId(i as u32), snapshot);
            }

            let window = TimeWindow {
                start: current_time,
                end: current_time + time_step,
                step: time_step,
            };

            let outcome = self.schwarz_loop(step_index, window)?;

            if outcome.failed.is_some() {
                let reduced = self.config.reduction_factor * time_step;

                if time_step <= self.config.minimum_time_step {
                    // Terminal: no more room to reduce.
                    self.reporter
                        .step_too_small(reduced, self.config.minimum_time_step);
                    let summary = RunSummary {
                        steps_accepted: step_index,
                        final_time: current_time,
                        final_time_step: time_step,
                        iterations: outcome.iterations,
                        converged: false,
                        termination: Termination::StepTooSmall,
                    };
                    self.finish(step_index, &summary);
                    return Ok(summary);
                }

                let new_step = if reduced > self.config.minimum_time_step {
                    reduced
                } else {
                    self.config.minimum_time_step
                };
                self.reporter.step_reduced(time_step, new_step);
                self.bus.emit(CouplingEvent::new(
                    step_index,
                    EventKind::StepReduced {
                        from: time_step,
                        to: new_step,
                    },
                ));

                // Restore every subdomain from its pre-sweep checkpoint,
                // including the mesh-database push, without advancing
                // time. Retry the same step body with the smaller step.
                for (i, subdomain) in self.subdomains.iter_mut().enumerate() {
                    let snapshot = self.cache.get(SubdomainId(i as u32));
                    subdomain.restore(snapshot, current_time)?;
                }

                time_step = new_step;
                self.bus.flush();
                continue;
            }

            last_iterations = outcome.iterations;
            last_converged = outcome.report.converged;
            self.reporter
                .report_finals(outcome.iterations, &outcome.report, &self.config);

            // ACCEPT_STEP: refresh initial conditions from the mesh
            // database, write gated output, advance time.
            let next_time = current_time + time_step;
            let write_step = (step_index + 1) % self.config.output_write_interval == 0;
            for subdomain in self.subdomains.iter_mut() {
                let write_output = subdomain.output_enabled() && write_step;
                subdomain.accept_step(step_index, next_time, write_output)?;
            }
            self.bus.emit(CouplingEvent::new(
                step_index,
                EventKind::StepAccepted {
                    time: next_time,
                    time_step,
                },
            ));

            step_index += 1;
            current_time = next_time;

            // Step successful; try to grow the step.
            let increased = (self.config.amplification_factor * time_step)
                .min(self.config.maximum_time_step);
            if increased > time_step {
                self.reporter.step_increased(time_step, increased);
                self.bus.emit(CouplingEvent::new(
                    step_index,
                    EventKind::StepIncreased {
                        from: time_step,
                        to: increased,
                    },
                ));
                time_step = increased;
            } else {
                self.reporter.cannot_increase(time_step);
            }

            self.bus.flush();
        }

        let termination = if step_index >= self.config.maximum_steps {
            Termination::MaxSteps
        } else {
            Termination::FinalTime
        };
        let summary = RunSummary {
            steps_accepted: step_index,
            final_time: current_time,
            final_time_step: time_step,
            iterations: last_iterations,
            converged: last_converged,
            termination,
        };
        self.finish(step_index, &summary);
        Ok(summary)
    }

    /// Runs one Schwarz loop: repeated fixed-order sweeps until the
    /// continuation predicate stops them.
    fn schwarz_loop(&mut self, step_index: u32, window: TimeWindow) -> TalikResult<LoopOutcome> {
        let mut iterations: u32 = 0;
        let mut report = ConvergenceReport::default();

        loop {
            let seed = IterationSeed {
                first_ever: step_index == 0 && iterations == 0,
                standard_guess: self.config.standard_initial_guess,
            };

            // One sweep over all subdomains, in fixed order, aborted on
            // the first failure.
            let mut norms = vec![StateNorms::default(); self.subdomains.len()];
            let mut failed: Option<SubdomainId> = None;
            for (i, subdomain) in self.subdomains.iter_mut().enumerate() {
                let id = SubdomainId(i as u32);
                self.reporter
                    .subdomain_header(iterations, id, subdomain.kind(), &window);

                let snapshot = self.cache.get(id);
                match subdomain.advance(window, seed, snapshot)? {
                    AdvanceResult::Advanced(n) => norms[i] = n,
                    AdvanceResult::Failed => {
                        self.reporter.solve_failed(subdomain.kind(), id);
                        self.bus.emit(CouplingEvent::new(
                            step_index,
                            EventKind::SolveFailed {
                                subdomain: id.0,
                                iteration: iterations,
                            },
                        ));
                        failed = Some(id);
                        break;
                    }
                }
            }

            if let Some(id) = failed {
                self.reporter.sweep_aborted(iterations);
                return Ok(LoopOutcome {
                    failed: Some(id),
                    iterations,
                    report,
                });
            }

            report = self.evaluator.evaluate(&norms);
            self.reporter
                .iteration_table(iterations, &norms, &report, &self.config);

            iterations += 1;
            self.bus.emit(CouplingEvent::new(
                step_index,
                EventKind::Convergence {
                    iteration: iterations,
                    abs_error: report.abs_error,
                    rel_error: report.rel_error,
                    converged: report.converged,
                },
            ));

            if !continue_schwarz(
                false,
                report.abs_error,
                report.converged,
                iterations,
                self.config.minimum_iterations,
                self.config.maximum_iterations,
            ) {
                return Ok(LoopOutcome {
                    failed: None,
                    iterations,
                    report,
                });
            }
        }
    }

    fn finish(&mut self, step_index: u32, summary: &RunSummary) {
        self.bus.emit(CouplingEvent::new(
            step_index,
            EventKind::RunEnd {
                time: summary.final_time,
                steps: summary.steps_accepted,
                converged: summary.converged,
            },
        ));
        self.bus.flush();
    }
}
