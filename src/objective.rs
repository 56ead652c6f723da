//! Objective builder.
//!
//! Every model minimizes `sign * sum(work[w, d])` over the whole horizon.
//! `sign = -1` maximizes attendance, `sign = +1` maximizes days off.

use crate::model::{LinearExpr, VariableRegistry};
use crate::models::ObjectiveSense;

/// The single linear objective of a model (minimized).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Objective {
    expr: LinearExpr,
}

impl Objective {
    /// Zero objective (any feasible assignment is optimal).
    pub fn zero() -> Self {
        Self::default()
    }

    /// Minimizes `expr`.
    pub fn new(expr: LinearExpr) -> Self {
        Self { expr }
    }

    /// Expression being minimized.
    pub fn expr(&self) -> &LinearExpr {
        &self.expr
    }
}

/// Builds `sense.sign() * sum(work)`.
pub fn build_objective(registry: &VariableRegistry, sense: ObjectiveSense) -> Objective {
    let sign = sense.sign();
    let mut expr = LinearExpr::zero();
    for var in registry.work_vars() {
        expr.add_term(var, sign);
    }
    Objective::new(expr)
}
