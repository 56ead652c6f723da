//! External CBC backend.
//!
//! Writes [`Model::to_lp`] into a temporary directory, runs
//!
//! ```text
//! cbc model.lp sec <budget> solve printingOptions all solu solution.txt
//! ```
//!
//! and reads the solution file back. The first line carries the status
//! (`Optimal - objective value ...`, `Stopped on time - ...`,
//! `Infeasible - ...`); every further line is `[**] index name value [cost]`.
//! Rows and columns share that layout; only names known to the registry are
//! read. Every registry variable must be present.
//!
//! A process still running `kill_grace` after the budget is killed.

use std::fs::File;
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::{Assignment, InfeasibleReason, Solver, SolverResult};
use crate::error::{Result, ShiftError};
use crate::model::{Model, VariableRegistry};

/// Extra wall time granted to `cbc` beyond its `sec` limit before it is killed.
pub const DEFAULT_KILL_GRACE: Duration = Duration::from_secs(2);

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Runs the `cbc` executable.
///
/// The child process never outlives `time_budget + kill_grace`: `cbc` only
/// checks its `sec` limit between nodes, so an overrunning process is killed
/// and reported as a backend failure.
#[derive(Debug, Clone)]
pub struct CbcSolver {
    executable: PathBuf,
    kill_grace: Duration,
}

impl Default for CbcSolver {
    fn default() -> Self {
        Self {
            executable: PathBuf::from("cbc"),
            kill_grace: DEFAULT_KILL_GRACE,
        }
    }
}

impl CbcSolver {
    /// Uses `cbc` from `PATH`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a specific executable.
    pub fn with_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.executable = path.into();
        self
    }

    /// Sets the wall time allowed beyond the budget before the process is killed.
    pub fn with_kill_grace(mut self, grace: Duration) -> Self {
        self.kill_grace = grace;
        self
    }
}

impl Solver for CbcSolver {
    fn name(&self) -> &'static str {
        "cbc"
    }

    fn solve(&self, model: &Model, time_budget: Duration) -> Result<SolverResult> {
        let dir = tempfile::tempdir()?;
        let lp_path = dir.path().join("model.lp");
        let solution_path = dir.path().join("solution.txt");
        let log_path = dir.path().join("cbc.log");
        std::fs::write(&lp_path, model.to_lp())?;
        let log = File::create(&log_path)?;

        let seconds = time_budget.as_secs_f64().ceil().max(1.0);
        debug!(
            executable = %self.executable.display(),
            seconds,
            variables = model.variable_count(),
            "running cbc"
        );
        let mut child = Command::new(&self.executable)
            .arg(&lp_path)
            .arg("sec")
            .arg(format!("{seconds:.0}"))
            .arg("solve")
            .arg("printingOptions")
            .arg("all")
            .arg("solu")
            .arg(&solution_path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(log)
            .spawn()
            .map_err(|e| {
                ShiftError::Backend(format!(
                    "failed to run '{}': {e}",
                    self.executable.display()
                ))
            })?;

        let limit = time_budget.saturating_add(self.kill_grace);
        let Some(status) = wait_or_kill(&mut child, limit)? else {
            warn!(?limit, "cbc overran its budget and was killed");
            return Err(ShiftError::Backend(format!(
                "cbc still running after {limit:?}; process killed"
            )));
        };
        if !status.success() {
            let stderr = std::fs::read_to_string(&log_path).unwrap_or_default();
            return Err(ShiftError::Backend(format!(
                "cbc exited with {status}: {}",
                stderr.trim()
            )));
        }

        let text = std::fs::read_to_string(&solution_path).map_err(|e| {
            ShiftError::Backend(format!("cbc wrote no solution file: {e}"))
        })?;
        let result = parse_cbc_solution(&text, model.registry())?;
        if matches!(result, SolverResult::Feasible(_)) {
            warn!(budget = ?time_budget, "cbc stopped on time limit with a non-proven solution");
        }
        Ok(result)
    }
}

/// Waits for `child` up to `limit`. Returns `None` after killing it.
fn wait_or_kill(child: &mut Child, limit: Duration) -> std::io::Result<Option<ExitStatus>> {
    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if start.elapsed() >= limit {
            child.kill()?;
            child.wait()?;
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Parses a CBC solution file against the model's variables.
///
/// # Errors
/// - [`ShiftError::Backend`] for an unknown status or an unreadable value
/// - [`ShiftError::IncompleteAssignment`] if a variable has no value
pub fn parse_cbc_solution(text: &str, registry: &VariableRegistry) -> Result<SolverResult> {
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());
    let status = lines
        .next()
        .ok_or_else(|| ShiftError::Backend("empty cbc solution".to_string()))?
        .trim()
        .to_lowercase();

    let proven = if status.starts_with("optimal") {
        true
    } else if status.starts_with("stopped") {
        if status.contains("no integer") || status.contains("no solution") {
            return Ok(SolverResult::Infeasible(InfeasibleReason::TimeLimit));
        }
        false
    } else if status.contains("infeasible") {
        return Ok(SolverResult::Infeasible(InfeasibleReason::Proven));
    } else {
        return Err(ShiftError::Backend(format!("unrecognized cbc status '{status}'")));
    };

    let mut assignment = Assignment::new();
    for line in lines {
        let mut tokens = line.split_whitespace().peekable();
        if tokens.peek() == Some(&"**") {
            tokens.next();
        }
        let (Some(_index), Some(name), Some(value)) = (tokens.next(), tokens.next(), tokens.next())
        else {
            continue;
        };
        if registry.lookup(name).is_none() {
            continue;
        }
        let value: f64 = value.parse().map_err(|_| {
            ShiftError::Backend(format!("unreadable value '{value}' for variable '{name}'"))
        })?;
        assignment.insert(name, value > 0.5);
    }

    // strict: every declared variable must be present
    assignment.to_values(registry)?;

    Ok(if proven {
        SolverResult::Optimal(assignment)
    } else {
        SolverResult::Feasible(assignment)
    })
}
