//! Built-in exact branch-and-bound over binary variables.
//!
//! Depth-first search with:
//! - **Bound propagation**: every constraint is normalized to rows
//!   `sum(c * x) <= b`. Each row tracks its minimum reachable activity; a row
//!   whose minimum exceeds `b` is a conflict, and an open variable whose
//!   coefficient exceeds the row slack is forced to the value that keeps the
//!   row satisfiable.
//! - **Objective pruning**: the objective lower bound (fixed terms plus every
//!   negative open coefficient) is compared against the incumbent.
//! - **Trail-based undo**: assignments are pushed on a trail and rolled back
//!   on backtrack.
//! - **Time limit**: the clock is checked every `check_interval` nodes; the
//!   budget is a soft cap.
//!
//! Suitable for small and medium instances. Large months with weak bounds
//! usually stop on the budget with a feasible incumbent.
//!
//! # Reference
//! - Achterberg (2007), "Constraint Integer Programming", Ch. 7 (domain propagation)

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::{Assignment, InfeasibleReason, Solver, SolverResult};
use crate::error::Result;
use crate::model::{Model, Relation};

/// Nodes between clock checks.
const DEFAULT_CHECK_INTERVAL: u64 = 1_024;

/// Search counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BnbStatistics {
    /// Nodes visited.
    pub nodes_explored: u64,
    /// Dead ends (conflicts) hit.
    pub backtracks: u64,
    /// Subtrees cut by the objective bound.
    pub prunings_bound: u64,
    /// Improving solutions found.
    pub solutions_found: u64,
    /// Wall time spent searching.
    pub time_total: Duration,
}

/// Exact depth-first branch-and-bound solver.
#[derive(Debug, Clone)]
pub struct BranchAndBoundSolver {
    check_interval: u64,
}

impl Default for BranchAndBoundSolver {
    fn default() -> Self {
        Self {
            check_interval: DEFAULT_CHECK_INTERVAL,
        }
    }
}

impl BranchAndBoundSolver {
    /// Creates a solver with the default clock check interval.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of nodes between clock checks (at least 1).
    pub fn with_check_interval(mut self, nodes: u64) -> Self {
        self.check_interval = nodes.max(1);
        self
    }

    /// Solves and also returns the search counters.
    pub fn solve_with_stats(&self, model: &Model, time_budget: Duration) -> (SolverResult, BnbStatistics) {
        let start = Instant::now();
        let mut search = Search::new(model, TimeLimit::new(time_budget, self.check_interval));
        let completed = search.run();
        search.stats.time_total = start.elapsed();

        let result = match (completed, search.incumbent.take()) {
            (true, Some((_, values))) => {
                SolverResult::Optimal(Assignment::from_values(model.registry(), &values))
            }
            (true, None) => SolverResult::Infeasible(InfeasibleReason::Proven),
            (false, Some((_, values))) => {
                warn!(
                    budget = ?time_budget,
                    "branch-and-bound stopped on time limit with a non-proven incumbent"
                );
                SolverResult::Feasible(Assignment::from_values(model.registry(), &values))
            }
            (false, None) => {
                warn!(budget = ?time_budget, "branch-and-bound stopped on time limit without a solution");
                SolverResult::Infeasible(InfeasibleReason::TimeLimit)
            }
        };
        debug!(
            nodes = search.stats.nodes_explored,
            backtracks = search.stats.backtracks,
            prunings = search.stats.prunings_bound,
            solutions = search.stats.solutions_found,
            elapsed = ?search.stats.time_total,
            "branch-and-bound finished"
        );
        (result, search.stats)
    }
}

impl Solver for BranchAndBoundSolver {
    fn name(&self) -> &'static str {
        "branch-and-bound"
    }

    fn solve(&self, model: &Model, time_budget: Duration) -> Result<SolverResult> {
        Ok(self.solve_with_stats(model, time_budget).0)
    }
}

/// Stops the search once the budget has elapsed, checking every
/// `check_interval` nodes.
struct TimeLimit {
    start: Instant,
    limit: Duration,
    check_interval: u64,
    ops_since_last_check: u64,
}

impl TimeLimit {
    fn new(limit: Duration, check_interval: u64) -> Self {
        Self {
            start: Instant::now(),
            limit,
            check_interval,
            ops_since_last_check: 0,
        }
    }

    fn expired(&mut self) -> bool {
        self.ops_since_last_check += 1;
        if self.ops_since_last_check < self.check_interval {
            return false;
        }
        self.ops_since_last_check = 0;
        self.start.elapsed() > self.limit
    }
}

/// `sum(c * x) <= rhs`.
struct Row {
    terms: Vec<(usize, i64)>,
    rhs: i64,
}

struct Search {
    rows: Vec<Row>,
    /// Per variable: `(row, coeff)`.
    occurs: Vec<Vec<(usize, i64)>>,
    min_activity: Vec<i64>,
    objective: Vec<i64>,
    objective_bound: i64,
    values: Vec<Option<bool>>,
    trail: Vec<usize>,
    incumbent: Option<(i64, Vec<bool>)>,
    limit: TimeLimit,
    stats: BnbStatistics,
}

impl Search {
    fn new(model: &Model, limit: TimeLimit) -> Self {
        let n = model.variable_count();

        let mut rows = Vec::with_capacity(model.constraint_count());
        for c in model.constraints() {
            let terms: Vec<(usize, i64)> = c
                .terms()
                .iter()
                .filter(|&&(_, k)| k != 0)
                .map(|&(v, k)| (v.index(), k))
                .collect();
            let negated = || -> Vec<(usize, i64)> { terms.iter().map(|&(v, k)| (v, -k)).collect() };
            match c.relation() {
                Relation::Le => rows.push(Row {
                    terms: terms.clone(),
                    rhs: c.rhs(),
                }),
                Relation::Ge => rows.push(Row {
                    terms: negated(),
                    rhs: -c.rhs(),
                }),
                Relation::Eq => {
                    rows.push(Row {
                        terms: terms.clone(),
                        rhs: c.rhs(),
                    });
                    rows.push(Row {
                        terms: negated(),
                        rhs: -c.rhs(),
                    });
                }
            }
        }

        let mut occurs = vec![Vec::new(); n];
        let mut min_activity = Vec::with_capacity(rows.len());
        for (r, row) in rows.iter().enumerate() {
            for &(v, k) in &row.terms {
                occurs[v].push((r, k));
            }
            min_activity.push(row.terms.iter().map(|&(_, k)| k.min(0)).sum::<i64>());
        }

        let mut objective = vec![0; n];
        let expr = model.objective().expr();
        for &(v, k) in expr.terms() {
            objective[v.index()] += k;
        }
        let objective_bound =
            expr.constant_part() + objective.iter().map(|&k: &i64| k.min(0)).sum::<i64>();

        Self {
            rows,
            occurs,
            min_activity,
            objective,
            objective_bound,
            values: vec![None; n],
            trail: Vec::with_capacity(n),
            incumbent: None,
            limit,
            stats: BnbStatistics::default(),
        }
    }

    /// Runs the search. Returns `false` if it stopped on the time limit.
    fn run(&mut self) -> bool {
        let mut queue: Vec<usize> = (0..self.rows.len()).collect();
        if !self.propagate(&mut queue) {
            return true;
        }
        self.dfs()
    }

    fn dfs(&mut self) -> bool {
        self.stats.nodes_explored += 1;
        if self.limit.expired() {
            return false;
        }
        if let Some((best, _)) = &self.incumbent {
            if self.objective_bound >= *best {
                self.stats.prunings_bound += 1;
                return true;
            }
        }

        let Some(var) = self.values.iter().position(Option::is_none) else {
            self.record_solution();
            return true;
        };

        let first = self.objective[var] < 0;
        for value in [first, !first] {
            let mark = self.trail.len();
            let mut queue = Vec::new();
            self.assign(var, value, &mut queue);
            let keep_going = if self.propagate(&mut queue) {
                self.dfs()
            } else {
                self.stats.backtracks += 1;
                true
            };
            self.undo(mark);
            if !keep_going {
                return false;
            }
        }
        true
    }

    fn record_solution(&mut self) {
        // every variable is fixed: the bound is the exact objective value
        let value = self.objective_bound;
        let values = self.values.iter().map(|v| v.unwrap_or(false)).collect();
        self.incumbent = Some((value, values));
        self.stats.solutions_found += 1;
        debug!(objective = value, nodes = self.stats.nodes_explored, "new incumbent");
    }

    fn assign(&mut self, var: usize, value: bool, queue: &mut Vec<usize>) {
        self.values[var] = Some(value);
        self.trail.push(var);
        let x = i64::from(value);
        let k = self.objective[var];
        self.objective_bound += k * x - k.min(0);
        for &(r, c) in &self.occurs[var] {
            self.min_activity[r] += c * x - c.min(0);
            queue.push(r);
        }
    }

    fn undo(&mut self, mark: usize) {
        while self.trail.len() > mark {
            let Some(var) = self.trail.pop() else {
                break;
            };
            let x = self.values[var].take().map_or(0, i64::from);
            let k = self.objective[var];
            self.objective_bound -= k * x - k.min(0);
            for &(r, c) in &self.occurs[var] {
                self.min_activity[r] -= c * x - c.min(0);
            }
        }
    }

    /// Drains `queue`, forcing variables until a fixpoint or a conflict.
    fn propagate(&mut self, queue: &mut Vec<usize>) -> bool {
        while let Some(r) = queue.pop() {
            let slack = self.rows[r].rhs - self.min_activity[r];
            if slack < 0 {
                return false;
            }
            for i in 0..self.rows[r].terms.len() {
                let (v, c) = self.rows[r].terms[i];
                if self.values[v].is_none() && c.abs() > slack {
                    // the forced value keeps this row at its minimum
                    self.assign(v, c < 0, queue);
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Constraint, LinearExpr, VariableRegistry};
    use crate::models::{Horizon, ObjectiveSense, Weekday};
    use crate::objective::build_objective;
    use crate::rules::{compile, Policy, Rule, Scoped};

    const BUDGET: Duration = Duration::from_secs(10);

    #[test]
    fn test_unconstrained_maximize_work() {
        let model = compile(&Policy::new(2, Horizon::new(3, Weekday::Mon))).unwrap();
        let solver = BranchAndBoundSolver::new();
        let (result, stats) = solver.solve_with_stats(&model, BUDGET);
        let SolverResult::Optimal(a) = result else {
            panic!("expected optimal, got {result:?}");
        };
        assert!(a.to_values(model.registry()).unwrap().iter().all(|&v| v));
        assert!(stats.solutions_found >= 1);
    }

    #[test]
    fn test_maximize_off() {
        let model = compile(
            &Policy::new(2, Horizon::new(7, Weekday::Mon))
                .with_objective(ObjectiveSense::MaximizeOff)
                .with_rule(Rule::MonthlyWorkDays(Scoped::new().with_all(4))),
        )
        .unwrap();
        let result = BranchAndBoundSolver::new().solve(&model, BUDGET).unwrap();
        let SolverResult::Optimal(a) = result else {
            panic!("expected optimal");
        };
        let values = a.to_values(model.registry()).unwrap();
        assert_eq!(model.objective_value(&values), 8);
        assert!(model.is_feasible(&values));
    }

    #[test]
    fn test_streak_optimum() {
        let model = compile(
            &Policy::new(2, Horizon::new(10, Weekday::Mon))
                .with_rule(Rule::ConsecutiveWork(Scoped::new().with_all(5))),
        )
        .unwrap();
        let result = BranchAndBoundSolver::new().solve(&model, BUDGET).unwrap();
        let SolverResult::Optimal(a) = result else {
            panic!("expected optimal");
        };
        let values = a.to_values(model.registry()).unwrap();
        assert!(model.is_feasible(&values));
        // one day off per worker covers both 6-day windows
        assert_eq!(model.objective_value(&values), -18);
    }

    #[test]
    fn test_weekend_flags_follow_work() {
        let model = compile(
            &Policy::new(1, Horizon::new(14, Weekday::Mon))
                .with_rule(Rule::WeekendOffQuota(Scoped::new().with_all(1))),
        )
        .unwrap();
        let result = BranchAndBoundSolver::new().solve(&model, BUDGET).unwrap();
        let SolverResult::Optimal(a) = result else {
            panic!("expected optimal");
        };
        let values = a.to_values(model.registry()).unwrap();
        assert!(model.is_feasible(&values));
        assert_eq!(model.objective_value(&values), -12);
    }

    #[test]
    fn test_proven_infeasible() {
        let model = compile(
            &Policy::new(1, Horizon::new(7, Weekday::Mon))
                .with_rule(Rule::MonthlyDaysOff(Scoped::new().with_all(10))),
        )
        .unwrap();
        let result = BranchAndBoundSolver::new().solve(&model, BUDGET).unwrap();
        assert_eq!(result, SolverResult::Infeasible(InfeasibleReason::Proven));
    }

    #[test]
    fn test_infeasible_by_search() {
        // x0 + x1 == 1, x0 == x1: no single row fails up front
        let h = Horizon::new(2, Weekday::Mon);
        let reg = VariableRegistry::new(1, &h, false);
        let (a, b) = (reg.work_vars().next().unwrap(), reg.work_vars().nth(1).unwrap());
        let mut model = Model::new(h, reg);
        model.add_constraint(Constraint::new(
            "one",
            LinearExpr::from(a) + b,
            Relation::Eq,
            LinearExpr::constant(1),
        ));
        model.add_constraint(Constraint::new("same", a, Relation::Eq, b));
        let objective = build_objective(model.registry(), ObjectiveSense::MaximizeWork);
        model.set_objective(objective);

        let result = BranchAndBoundSolver::new().solve(&model, BUDGET).unwrap();
        assert_eq!(result, SolverResult::Infeasible(InfeasibleReason::Proven));
    }

    #[test]
    fn test_zero_budget_stops_early() {
        let model = compile(
            &Policy::new(6, Horizon::new(28, Weekday::Mon))
                .with_rule(Rule::ConsecutiveWork(Scoped::new().with_all(3)))
                .with_rule(Rule::DailyStaffing {
                    weekday_min: Some(4),
                    weekend_min: Some(2),
                }),
        )
        .unwrap();
        let solver = BranchAndBoundSolver::new().with_check_interval(1);
        let (result, stats) = solver.solve_with_stats(&model, Duration::ZERO);
        assert_eq!(result, SolverResult::Infeasible(InfeasibleReason::TimeLimit));
        assert_eq!(stats.nodes_explored, 1);
    }

    #[test]
    fn test_undo_restores_state() {
        let model = compile(
            &Policy::new(2, Horizon::new(7, Weekday::Mon))
                .with_rule(Rule::NoSteppingStone(Scoped::new().with_all(()))),
        )
        .unwrap();
        let mut search = Search::new(&model, TimeLimit::new(BUDGET, 1_000));
        let before = (search.min_activity.clone(), search.objective_bound);
        let mut queue = Vec::new();
        search.assign(0, false, &mut queue);
        search.assign(1, true, &mut queue);
        assert!(search.propagate(&mut queue));
        search.undo(0);
        assert!(search.trail.is_empty());
        assert!(search.values.iter().all(Option::is_none));
        assert_eq!((search.min_activity, search.objective_bound), before);
    }
}
