//! Error types for shift-policy compilation and solving.

use std::time::Duration;

use thiserror::Error;

use crate::solver::InfeasibleReason;
use crate::validation::ValidationErrors;

/// Errors surfaced to callers of the crate.
#[derive(Error, Debug)]
pub enum ShiftError {
    /// The configuration references workers, days or weekdays outside the
    /// declared workforce/horizon, or a parameter is out of range.
    #[error("invalid configuration: {0}")]
    Configuration(ValidationErrors),

    /// No assignment satisfies every active rule (or none was found in time).
    #[error(
        "no feasible schedule ({reason}); widen the time budget or relax rule parameters"
    )]
    Infeasible { reason: InfeasibleReason },

    /// The solver answered without a value for a declared variable.
    #[error("solver returned no value for variable '{variable}'")]
    IncompleteAssignment { variable: String },

    /// A defect in rule compilation.
    #[error(transparent)]
    Internal(#[from] InternalError),

    /// An external solver could not be run or its answer could not be read.
    #[error("solver backend failed: {0}")]
    Backend(String),

    /// The caller-side wait bound expired before the solver answered.
    #[error("solver did not answer within {waited:?}")]
    SolverTimeout { waited: Duration },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Violated compiler invariants. Always fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InternalError {
    /// A rule asked for a variable outside the declared ranges.
    #[error("internal compiler error: unknown variable {family}[{worker}, {index}]")]
    UnknownVariable {
        family: &'static str,
        worker: usize,
        index: usize,
    },
}

pub type Result<T> = std::result::Result<T, ShiftError>;
