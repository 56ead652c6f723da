//! Binary linear model handed to the solver boundary.
//!
//! A [`Model`] is a variable registry, an append-only list of linear
//! constraints and exactly one objective (always minimized). It is built
//! fresh for every request by [`compile`](crate::rules::compile) and never
//! shared between requests.

mod expr;
mod lp;
mod registry;

pub use expr::{Constraint, LinearExpr, Relation, VarId};
pub use registry::{VarKind, Variable, VariableRegistry};

use crate::models::Horizon;
use crate::objective::Objective;

/// Variables + constraints + objective.
#[derive(Debug, Clone)]
pub struct Model {
    horizon: Horizon,
    registry: VariableRegistry,
    constraints: Vec<Constraint>,
    objective: Objective,
}

impl Model {
    /// Creates a model with no constraints and a zero objective.
    pub fn new(horizon: Horizon, registry: VariableRegistry) -> Self {
        Self {
            horizon,
            registry,
            constraints: Vec::new(),
            objective: Objective::zero(),
        }
    }

    /// Appends a constraint.
    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    /// Replaces the objective.
    pub fn set_objective(&mut self, objective: Objective) {
        self.objective = objective;
    }

    pub fn horizon(&self) -> &Horizon {
        &self.horizon
    }

    pub fn registry(&self) -> &VariableRegistry {
        &self.registry
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    /// Number of variables.
    pub fn variable_count(&self) -> usize {
        self.registry.len()
    }

    /// Number of constraints.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Constraints whose label starts with `prefix`.
    pub fn constraints_labelled<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = &'a Constraint> + 'a {
        self.constraints
            .iter()
            .filter(move |c| c.label().starts_with(prefix))
    }

    /// Constraints violated by a full 0/1 vector indexed by `VarId`.
    ///
    /// Missing entries count as 0.
    pub fn violated_constraints(&self, values: &[bool]) -> Vec<&Constraint> {
        let value = |v: VarId| values.get(v.index()).map_or(0, |&b| i64::from(b));
        self.constraints
            .iter()
            .filter(|c| !c.is_satisfied(value))
            .collect()
    }

    /// Whether a 0/1 vector satisfies every constraint.
    pub fn is_feasible(&self, values: &[bool]) -> bool {
        self.violated_constraints(values).is_empty()
    }

    /// Objective value of a 0/1 vector.
    pub fn objective_value(&self, values: &[bool]) -> i64 {
        self.objective
            .expr()
            .evaluate(|v| values.get(v.index()).map_or(0, |&b| i64::from(b)))
    }
}
