//! Formatted progress reporting for the coupling loop.
//!
//! Emits the step headers, the per-iteration norm table, the INFO lines
//! of the step-size controller, and the final convergence summary. The
//! reporter writes to any `io::Write`, so tests can capture output; a
//! write failure never interrupts a running simulation.

use std::io::Write;

use talik_types::{ProblemKind, SubdomainId};

use crate::config::CouplingConfig;
use crate::convergence::{ConvergenceReport, StateNorms};
use crate::subdomain::TimeWindow;

const RULE_WIDTH: usize = 72;

/// Pads a string to `width`, centered.
fn centered(text: &str, width: usize) -> String {
    let length = text.len();
    if length >= width {
        return text.to_string();
    }
    let padding = width - length;
    let left = padding / 2;
    let right = padding - left;
    format!("{}{}{}", " ".repeat(left), text, " ".repeat(right))
}

/// Progress reporter for one coupled run.
pub struct Reporter {
    out: Option<Box<dyn Write + Send>>,
}

impl Reporter {
    /// Reports to standard output.
    pub fn stdout() -> Self {
        Self {
            out: Some(Box::new(std::io::stdout())),
        }
    }

    /// Reports into the given writer.
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self { out: Some(out) }
    }

    /// Discards all output.
    pub fn silent() -> Self {
        Self { out: None }
    }

    fn line(&mut self, text: &str) {
        if let Some(out) = self.out.as_mut() {
            let _ = writeln!(out, "{text}");
        }
    }

    fn rule(&mut self, ch: char) {
        self.line(&ch.to_string().repeat(RULE_WIDTH));
    }

    /// Header printed at the top of every time-step attempt.
    pub fn step_header(&mut self, step_index: u32, time: f64, time_step: f64) {
        self.rule('=');
        self.line(&format!("Time step          :{step_index}"));
        self.line(&format!("Time               :{time:.6e}"));
        self.line(&format!("Step size          :{time_step:.6e}"));
        self.rule('=');
    }

    /// Header printed before each subdomain solve.
    pub fn subdomain_header(
        &mut self,
        iteration: u32,
        id: SubdomainId,
        kind: ProblemKind,
        window: &TimeWindow,
    ) {
        self.rule('=');
        self.line(&format!("Schwarz iteration  :{iteration}"));
        self.line(&format!("Subdomain          :{id}"));
        self.line(&format!("Problem            :{kind}"));
        self.line(&format!("Initial time       :{:.6e}", window.start));
        self.line(&format!("Final time         :{:.6e}", window.end));
        self.line(&format!("Step size          :{:.6e}", window.step));
        self.rule('=');
    }

    /// A subdomain's transient solve failed.
    pub fn solve_failed(&mut self, kind: ProblemKind, id: SubdomainId) {
        self.line("");
        self.line(&format!(
            "INFO: Unable to solve {kind} problem for subdomain {id}"
        ));
    }

    /// The sweep was aborted before completing.
    pub fn sweep_aborted(&mut self, iteration: u32) {
        self.line(&format!(
            "INFO: Unable to continue Schwarz iteration {iteration}"
        ));
    }

    /// Per-iteration norm table after a complete sweep.
    pub fn iteration_table(
        &mut self,
        iteration: u32,
        norms: &[StateNorms],
        report: &ConvergenceReport,
        config: &CouplingConfig,
    ) {
        self.rule('=');
        self.line(&format!("Schwarz iteration         :{iteration}"));
        self.rule('-');

        self.line(&format!(
            "{}{}{}{}",
            centered("Sub", 6),
            centered("Initial norm", 22),
            centered("Final norm", 22),
            centered("Difference norm", 22)
        ));
        self.line(&format!(
            "{}{}{}{}",
            centered("dom", 6),
            centered("||X0||", 22),
            centered("||Xf||", 22),
            centered("||Xf-X0||", 22)
        ));
        self.rule('-');

        for (i, n) in norms.iter().enumerate() {
            self.line(&format!(
                "{:>6}{:>22.12e}{:>22.12e}{:>22.12e}",
                i, n.norm_initial, n.norm_final, n.norm_difference
            ));
        }

        self.rule('-');
        self.line(&format!(
            "{}{:>22.12e}{:>22.12e}{:>22.12e}",
            centered("Norm", 6),
            report.norm_initial,
            report.norm_final,
            report.norm_difference
        ));
        self.rule('-');
        self.line(&format!("Absolute error     :{:.12e}", report.abs_error));
        self.line(&format!(
            "Absolute tolerance :{:.12e}",
            config.absolute_tolerance
        ));
        self.line(&format!("Relative error     :{:.12e}", report.rel_error));
        self.line(&format!(
            "Relative tolerance :{:.12e}",
            config.relative_tolerance
        ));
        self.rule('=');
    }

    /// Final convergence summary for one accepted step.
    pub fn report_finals(
        &mut self,
        iterations: u32,
        report: &ConvergenceReport,
        config: &CouplingConfig,
    ) {
        let conv_str = if report.converged { "YES" } else { "NO" };
        self.line("");
        self.line(&format!(
            "Sequential thermo-mechanical coupling converged: {conv_str}"
        ));
        self.line(&format!("Minimum iterations :{}", config.minimum_iterations));
        self.line(&format!("Maximum iterations :{}", config.maximum_iterations));
        self.line(&format!("Total iterations   :{iterations}"));
        self.line(&format!("Last absolute error:{:.12e}", report.abs_error));
        self.line(&format!(
            "Absolute tolerance :{:.12e}",
            config.absolute_tolerance
        ));
        self.line(&format!("Last relative error:{:.12e}", report.rel_error));
        self.line(&format!(
            "Relative tolerance :{:.12e}",
            config.relative_tolerance
        ));
        self.line("");
    }

    /// The step was rejected and will be retried smaller.
    pub fn step_reduced(&mut self, from: f64, to: f64) {
        self.line(&format!("INFO: Reducing step from {from:.6e} to {to:.6e}"));
    }

    /// The step cannot be reduced further; the run stops.
    pub fn step_too_small(&mut self, requested: f64, minimum: f64) {
        self.line("ERROR: Cannot reduce step. Stopping execution.");
        self.line(&format!("INFO: Requested step    :{requested:.6e}"));
        self.line(&format!("INFO: Minimum time step :{minimum:.6e}"));
    }

    /// The accepted step was grown.
    pub fn step_increased(&mut self, from: f64, to: f64) {
        self.line("");
        self.line(&format!(
            "INFO: Increasing step from {from:.6e} to {to:.6e}"
        ));
    }

    /// The accepted step is already at its cap.
    pub fn cannot_increase(&mut self, time_step: f64) {
        self.line("");
        self.line(&format!("INFO: Cannot increase step. Using {time_step:.6e}"));
    }
}
