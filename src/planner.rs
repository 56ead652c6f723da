//! End-to-end planning pipeline.
//!
//! # Pipeline
//!
//! 1. Validate the configuration and resolve it into a policy.
//! 2. Compile the policy into a model.
//! 3. Solve on a worker thread, waiting at most `time_budget + grace`.
//! 4. Decode the assignment into a shift calendar and summarize it.
//!
//! Every request builds its own model; nothing is shared between requests.
//! Infeasibility is reported, never retried.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, info_span, warn};

use crate::decode::decode;
use crate::error::{Result, ShiftError};
use crate::kpi::ShiftKpi;
use crate::model::Model;
use crate::models::{Configuration, ShiftSchedule};
use crate::rules::{self, Policy};
use crate::solver::{solver_for, SolveStatus, Solver, SolverResult};
use crate::validation::validate_config;

/// Extra wait beyond the solver budget before giving up on it.
pub const DEFAULT_GRACE: Duration = Duration::from_secs(5);

/// A solved request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    /// The shift calendar.
    pub schedule: ShiftSchedule,
    /// Optimal or feasible.
    pub status: SolveStatus,
    /// Minimized objective value (negative work days when maximizing work).
    pub objective_value: i64,
    /// Summary metrics.
    pub kpi: ShiftKpi,
}

/// Runs configurations through validate → compile → solve → decode.
///
/// # Example
///
/// ```
/// use u_shift::models::{Configuration, RuleConfig, ScopedBlock, Weekday};
/// use u_shift::planner::ShiftPlanner;
///
/// let config = Configuration::new(2, 10, Weekday::Mon)
///     .with_time_budget_secs(10.0)
///     .with_rules(RuleConfig {
///         consecutive_work: ScopedBlock::all(5),
///         ..RuleConfig::default()
///     });
///
/// let plan = ShiftPlanner::new().plan(&config).unwrap();
/// assert_eq!(plan.schedule.num_workers(), 2);
/// assert!(plan.kpi.longest_streak_by_worker.iter().all(|&s| s <= 5));
/// ```
#[derive(Clone)]
pub struct ShiftPlanner {
    solver: Option<Arc<dyn Solver>>,
    grace: Duration,
}

impl Default for ShiftPlanner {
    fn default() -> Self {
        Self {
            solver: None,
            grace: DEFAULT_GRACE,
        }
    }
}

impl std::fmt::Debug for ShiftPlanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShiftPlanner")
            .field("solver", &self.solver.as_ref().map(|s| s.name()))
            .field("grace", &self.grace)
            .finish()
    }
}

impl ShiftPlanner {
    /// Creates a planner that picks the solver from each configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses this solver for every request, ignoring `Configuration::backend`.
    pub fn with_solver<S: Solver + 'static>(mut self, solver: S) -> Self {
        self.solver = Some(Arc::new(solver));
        self
    }

    /// Sets the extra wait beyond the solver budget.
    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    /// Validates and compiles without solving.
    pub fn compile(&self, config: &Configuration) -> Result<Model> {
        let policy = validate_config(config).map_err(ShiftError::Configuration)?;
        Ok(rules::compile(&policy)?)
    }

    /// Plans one request.
    ///
    /// # Errors
    /// - [`ShiftError::Configuration`] if validation fails
    /// - [`ShiftError::Infeasible`] if no schedule was found
    /// - [`ShiftError::SolverTimeout`] if the solver overran its budget plus grace
    /// - [`ShiftError::IncompleteAssignment`], [`ShiftError::Backend`] on solver faults,
    ///   including an assignment that breaks any compiled constraint
    pub fn plan(&self, config: &Configuration) -> Result<Plan> {
        let span = info_span!("plan", workers = config.num_workers, days = config.num_days);
        let _guard = span.enter();

        let policy = validate_config(config).map_err(ShiftError::Configuration)?;
        info!(rules = policy.rules.len(), "validated configuration");

        let model = Arc::new(rules::compile(&policy)?);
        let solver = self
            .solver
            .clone()
            .unwrap_or_else(|| solver_for(policy.backend));

        let solver_name = solver.name();
        let result = self.solve(solver, Arc::clone(&model), &policy)?;
        let (status, assignment) = match result {
            SolverResult::Optimal(a) => (SolveStatus::Optimal, a),
            SolverResult::Feasible(a) => (SolveStatus::Feasible, a),
            SolverResult::Infeasible(reason) => {
                info!(%reason, "no feasible schedule");
                return Err(ShiftError::Infeasible { reason });
            }
        };

        let values = assignment.to_values(model.registry())?;
        let violated = model.violated_constraints(&values);
        if let Some(first) = violated.first() {
            warn!(
                count = violated.len(),
                first = first.label(),
                "solver assignment violates the model"
            );
            return Err(ShiftError::Backend(format!(
                "{} returned an assignment violating {} constraint(s), first '{}'",
                solver_name,
                violated.len(),
                first.label()
            )));
        }
        let objective_value = model.objective_value(&values);
        info!(?status, objective = objective_value, "solved");

        let schedule = decode(&model, &assignment, &policy.display)?;
        let kpi = ShiftKpi::calculate(&schedule);
        Ok(Plan {
            schedule,
            status,
            objective_value,
            kpi,
        })
    }

    fn solve(&self, solver: Arc<dyn Solver>, model: Arc<Model>, policy: &Policy) -> Result<SolverResult> {
        let budget = policy.time_budget;
        let wait = budget.saturating_add(self.grace);
        info!(solver = solver.name(), ?budget, "solving");

        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("shift-solver".to_string())
            .spawn(move || {
                // the receiver may have given up already
                let _ = tx.send(solver.solve(&model, budget));
            })?;

        match rx.recv_timeout(wait) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                warn!(?wait, "solver did not answer in time");
                Err(ShiftError::SolverTimeout { waited: wait })
            }
            Err(RecvTimeoutError::Disconnected) => Err(ShiftError::Backend(
                "solver thread stopped without an answer".to_string(),
            )),
        }
    }
}
