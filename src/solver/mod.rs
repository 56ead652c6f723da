//! Solver boundary.
//!
//! A [`Solver`] takes a compiled [`Model`] and a time budget and answers
//! with a [`SolverResult`]. The budget is a soft cap: a backend may stop on
//! it with its best incumbent ([`SolverResult::Feasible`]) or with nothing
//! ([`InfeasibleReason::TimeLimit`]). Backends are interchangeable; the
//! model is all they see.
//!
//! # Backends
//! - [`BranchAndBoundSolver`]: built-in exact search
//! - [`CbcSolver`]: external `cbc` executable fed with LP text

mod bnb;
mod cbc;

pub use bnb::{BnbStatistics, BranchAndBoundSolver};
pub use cbc::{parse_cbc_solution, CbcSolver, DEFAULT_KILL_GRACE};

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShiftError};
use crate::model::{Model, VariableRegistry};
use crate::models::SolverBackend;

/// Why no assignment was returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfeasibleReason {
    /// The search space was exhausted: no assignment exists.
    Proven,
    /// The budget ran out before any assignment was found.
    TimeLimit,
}

impl fmt::Display for InfeasibleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InfeasibleReason::Proven => f.write_str("proven infeasible"),
            InfeasibleReason::TimeLimit => f.write_str("time limit reached"),
        }
    }
}

/// Outcome of one solve call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolverResult {
    /// Proven optimal.
    Optimal(Assignment),
    /// Feasible, optimality not proven.
    Feasible(Assignment),
    /// No assignment.
    Infeasible(InfeasibleReason),
}

impl SolverResult {
    /// The assignment, if any.
    pub fn assignment(&self) -> Option<&Assignment> {
        match self {
            SolverResult::Optimal(a) | SolverResult::Feasible(a) => Some(a),
            SolverResult::Infeasible(_) => None,
        }
    }

    /// Status without the payload.
    pub fn status(&self) -> SolveStatus {
        match self {
            SolverResult::Optimal(_) => SolveStatus::Optimal,
            SolverResult::Feasible(_) => SolveStatus::Feasible,
            SolverResult::Infeasible(_) => SolveStatus::Infeasible,
        }
    }
}

/// Solve status reported with a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    Optimal,
    Feasible,
    Infeasible,
}

/// Variable values keyed by variable name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    values: BTreeMap<String, bool>,
}

impl Assignment {
    /// Empty assignment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a variable.
    pub fn insert(&mut self, name: impl Into<String>, value: bool) {
        self.values.insert(name.into(), value);
    }

    /// Value of a variable.
    pub fn get(&self, name: &str) -> Option<bool> {
        self.values.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Names an id-indexed value vector.
    pub fn from_values(registry: &VariableRegistry, values: &[bool]) -> Self {
        let values = registry
            .iter()
            .zip(values)
            .map(|((_, var), &v)| (var.name.clone(), v))
            .collect();
        Self { values }
    }

    /// Id-indexed values for every registry variable.
    ///
    /// # Errors
    /// [`ShiftError::IncompleteAssignment`] naming the first missing variable.
    pub fn to_values(&self, registry: &VariableRegistry) -> Result<Vec<bool>> {
        registry
            .iter()
            .map(|(_, var)| {
                self.get(&var.name)
                    .ok_or_else(|| ShiftError::IncompleteAssignment {
                        variable: var.name.clone(),
                    })
            })
            .collect()
    }
}

/// A solver backend.
pub trait Solver: Send + Sync {
    /// Backend name.
    fn name(&self) -> &'static str;

    /// Solves `model` within `time_budget`.
    ///
    /// # Errors
    /// Backend failures only; infeasibility is a [`SolverResult`].
    fn solve(&self, model: &Model, time_budget: Duration) -> Result<SolverResult>;
}

/// Default solver for a backend choice.
pub fn solver_for(backend: SolverBackend) -> Arc<dyn Solver> {
    match backend {
        SolverBackend::BranchAndBound => Arc::new(BranchAndBoundSolver::new()),
        SolverBackend::Cbc => Arc::new(CbcSolver::new()),
    }
}
