//! Rule compiler: scheduling policy → binary linear model.
//!
//! A validated [`Policy`] carries a [`RuleSet`], a fixed table with one slot
//! per [`RuleKind`]. [`compile`] walks the enabled slots in kind order and
//! lets each rule emit constraints into its own buffer through a
//! [`RuleContext`]; the buffers are appended to the model in that same
//! order, so the encoding is reproducible. Rules never see each other's
//! output and never touch the objective.
//!
//! # Rule families
//!
//! | # | Kind | Constraint |
//! |---|------|-----------|
//! | 1 | `ConsecutiveWork` | every `k+1`-day window: `sum(work) <= k` |
//! | 2 | `WeekendOffQuota` | `sum(weekend_off) >= m` (+ AND linkage) |
//! | 3 | `WeekendsOff` | Sat/Sun: `work == 0` |
//! | 4 | `MonthlyDaysOff` | `sum(work) <= num_days - m` |
//! | 5 | `NoSteppingStone` | `work[d] - work[d+1] + work[d+2] >= 0` |
//! | 6 | `WeeklyDaysOff` | per week: `sum(work) <= 7 - m` |
//! | 7 | `DailyStaffing` | per day: `sum over workers >= m` |
//! | 8 | `MonthlyWorkDays` | `sum(work) >= m` |
//! | 9 | `WeeklyWorkDays` | per week: `sum(work) >= m` |
//! | 10 | `WorkTogether` | pairs in a group: `work[a,d] == work[b,d]` |
//! | 11 | `WorkApart` | pairs in a group: `work[a,d] + work[b,d] <= 1` |
//! | 12 | `FixedDatesOff` | listed days: `work == 0` |
//! | 13 | `FixedWeekdaysOff` | listed weekdays: `work == 0` |
//!
//! # Scope
//! Per-worker rules hold a [`Scoped`] parameter: an `All` scope, a
//! `Selected` scope, or both. A selected worker is governed by the selected
//! parameter only; `All` is the fallback for everyone else.

mod fixed;
mod grouping;
mod quota;
mod sequence;
mod staffing;
mod weekend;

use std::collections::BTreeSet;
use std::time::Duration;

use tracing::{debug, info};

use crate::error::InternalError;
use crate::model::{Constraint, LinearExpr, Model, Relation, VarId, VariableRegistry};
use crate::models::{
    workforce, DisplayOptions, Horizon, ObjectiveSense, SolverBackend, Weekday, WorkerId,
};
use crate::objective::build_objective;

/// Which workers a parameter applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope<P> {
    /// Every worker.
    All(P),
    /// Only the listed workers.
    Selected {
        workers: BTreeSet<WorkerId>,
        params: P,
    },
}

/// The scopes of one rule, resolved per worker with selection first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scoped<P> {
    scopes: Vec<Scope<P>>,
}

impl<P> Default for Scoped<P> {
    fn default() -> Self {
        Self { scopes: Vec::new() }
    }
}

impl<P> Scoped<P> {
    /// No scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an `All` scope.
    pub fn with_all(mut self, params: P) -> Self {
        self.scopes.push(Scope::All(params));
        self
    }

    /// Adds a `Selected` scope.
    pub fn with_selected<I: IntoIterator<Item = WorkerId>>(mut self, workers: I, params: P) -> Self {
        self.scopes.push(Scope::Selected {
            workers: workers.into_iter().collect(),
            params,
        });
        self
    }

    /// The parameter governing `worker`, if any.
    ///
    /// A `Selected` scope containing the worker wins over `All`.
    pub fn resolve(&self, worker: WorkerId) -> Option<&P> {
        self.scopes
            .iter()
            .find_map(|s| match s {
                Scope::Selected { workers, params } if workers.contains(&worker) => Some(params),
                _ => None,
            })
            .or_else(|| {
                self.scopes.iter().find_map(|s| match s {
                    Scope::All(params) => Some(params),
                    _ => None,
                })
            })
    }

    /// Whether no scope is set.
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Scopes in insertion order.
    pub fn scopes(&self) -> &[Scope<P>] {
        &self.scopes
    }
}

/// The thirteen rule families, in compilation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RuleKind {
    ConsecutiveWork,
    WeekendOffQuota,
    WeekendsOff,
    MonthlyDaysOff,
    NoSteppingStone,
    WeeklyDaysOff,
    DailyStaffing,
    MonthlyWorkDays,
    WeeklyWorkDays,
    WorkTogether,
    WorkApart,
    FixedDatesOff,
    FixedWeekdaysOff,
}

impl RuleKind {
    /// Number of rule families.
    pub const COUNT: usize = 13;

    /// Every kind, in compilation order.
    pub const ALL: [RuleKind; RuleKind::COUNT] = [
        RuleKind::ConsecutiveWork,
        RuleKind::WeekendOffQuota,
        RuleKind::WeekendsOff,
        RuleKind::MonthlyDaysOff,
        RuleKind::NoSteppingStone,
        RuleKind::WeeklyDaysOff,
        RuleKind::DailyStaffing,
        RuleKind::MonthlyWorkDays,
        RuleKind::WeeklyWorkDays,
        RuleKind::WorkTogether,
        RuleKind::WorkApart,
        RuleKind::FixedDatesOff,
        RuleKind::FixedWeekdaysOff,
    ];

    /// Slot index (0..13).
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Identifier used in constraint labels and configuration keys.
    pub fn name(self) -> &'static str {
        match self {
            RuleKind::ConsecutiveWork => "consecutive_work",
            RuleKind::WeekendOffQuota => "weekend_off_quota",
            RuleKind::WeekendsOff => "weekends_off",
            RuleKind::MonthlyDaysOff => "monthly_days_off",
            RuleKind::NoSteppingStone => "no_stepping_stone",
            RuleKind::WeeklyDaysOff => "weekly_days_off",
            RuleKind::DailyStaffing => "daily_staffing",
            RuleKind::MonthlyWorkDays => "monthly_work_days",
            RuleKind::WeeklyWorkDays => "weekly_work_days",
            RuleKind::WorkTogether => "work_together",
            RuleKind::WorkApart => "work_apart",
            RuleKind::FixedDatesOff => "fixed_dates_off",
            RuleKind::FixedWeekdaysOff => "fixed_weekdays_off",
        }
    }

    /// Human-readable description.
    pub fn description(self) -> &'static str {
        match self {
            RuleKind::ConsecutiveWork => "Bounded run of consecutive work days",
            RuleKind::WeekendOffQuota => "Minimum number of fully free weekends",
            RuleKind::WeekendsOff => "Saturdays and Sundays always off",
            RuleKind::MonthlyDaysOff => "Minimum days off over the horizon",
            RuleKind::NoSteppingStone => "No single work day between two days off",
            RuleKind::WeeklyDaysOff => "Minimum days off per week",
            RuleKind::DailyStaffing => "Minimum staff on duty per day",
            RuleKind::MonthlyWorkDays => "Minimum work days over the horizon",
            RuleKind::WeeklyWorkDays => "Minimum work days per week",
            RuleKind::WorkTogether => "Group members share their work days",
            RuleKind::WorkApart => "At most one group member works per day",
            RuleKind::FixedDatesOff => "Fixed dates off",
            RuleKind::FixedWeekdaysOff => "Fixed weekdays off",
        }
    }
}

/// A rule with its resolved, id-based parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// Longest run of work days.
    ConsecutiveWork(Scoped<u32>),
    /// Minimum weekend blocks fully off.
    WeekendOffQuota(Scoped<u32>),
    /// Saturdays and Sundays off.
    WeekendsOff(Scoped<()>),
    /// Minimum days off over the horizon.
    MonthlyDaysOff(Scoped<u32>),
    /// No single work day between two days off.
    NoSteppingStone(Scoped<()>),
    /// Minimum days off per complete week.
    WeeklyDaysOff(Scoped<u32>),
    /// Minimum staff per day; `None` leaves that day type free.
    DailyStaffing {
        weekday_min: Option<u32>,
        weekend_min: Option<u32>,
    },
    /// Minimum work days over the horizon.
    MonthlyWorkDays(Scoped<u32>),
    /// Minimum work days per complete week.
    WeeklyWorkDays(Scoped<u32>),
    /// Groups whose members share every work day.
    WorkTogether(Vec<BTreeSet<WorkerId>>),
    /// Groups of which at most one member works a day.
    WorkApart(Vec<BTreeSet<WorkerId>>),
    /// Days are 0-based.
    FixedDatesOff {
        workers: BTreeSet<WorkerId>,
        days: BTreeSet<usize>,
    },
    /// Recurring weekdays off.
    FixedWeekdaysOff {
        workers: BTreeSet<WorkerId>,
        weekdays: BTreeSet<Weekday>,
    },
}

impl Rule {
    /// Family of this rule.
    pub fn kind(&self) -> RuleKind {
        match self {
            Rule::ConsecutiveWork(_) => RuleKind::ConsecutiveWork,
            Rule::WeekendOffQuota(_) => RuleKind::WeekendOffQuota,
            Rule::WeekendsOff(_) => RuleKind::WeekendsOff,
            Rule::MonthlyDaysOff(_) => RuleKind::MonthlyDaysOff,
            Rule::NoSteppingStone(_) => RuleKind::NoSteppingStone,
            Rule::WeeklyDaysOff(_) => RuleKind::WeeklyDaysOff,
            Rule::DailyStaffing { .. } => RuleKind::DailyStaffing,
            Rule::MonthlyWorkDays(_) => RuleKind::MonthlyWorkDays,
            Rule::WeeklyWorkDays(_) => RuleKind::WeeklyWorkDays,
            Rule::WorkTogether(_) => RuleKind::WorkTogether,
            Rule::WorkApart(_) => RuleKind::WorkApart,
            Rule::FixedDatesOff { .. } => RuleKind::FixedDatesOff,
            Rule::FixedWeekdaysOff { .. } => RuleKind::FixedWeekdaysOff,
        }
    }

    /// Emits this rule's constraints.
    fn compile(&self, ctx: &mut RuleContext<'_>) -> Result<(), InternalError> {
        match self {
            Rule::ConsecutiveWork(scope) => sequence::consecutive_work(ctx, scope),
            Rule::WeekendOffQuota(scope) => weekend::weekend_off_quota(ctx, scope),
            Rule::WeekendsOff(scope) => weekend::weekends_off(ctx, scope),
            Rule::MonthlyDaysOff(scope) => quota::monthly_days_off(ctx, scope),
            Rule::NoSteppingStone(scope) => sequence::no_stepping_stone(ctx, scope),
            Rule::WeeklyDaysOff(scope) => quota::weekly_days_off(ctx, scope),
            Rule::DailyStaffing {
                weekday_min,
                weekend_min,
            } => staffing::daily_staffing(ctx, *weekday_min, *weekend_min),
            Rule::MonthlyWorkDays(scope) => quota::monthly_work_days(ctx, scope),
            Rule::WeeklyWorkDays(scope) => quota::weekly_work_days(ctx, scope),
            Rule::WorkTogether(groups) => grouping::work_together(ctx, groups),
            Rule::WorkApart(groups) => grouping::work_apart(ctx, groups),
            Rule::FixedDatesOff { workers, days } => fixed::fixed_dates_off(ctx, workers, days),
            Rule::FixedWeekdaysOff { workers, weekdays } => {
                fixed::fixed_weekdays_off(ctx, workers, weekdays)
            }
        }
    }
}

/// One slot per rule family; an empty slot is a disabled rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    slots: [Option<Rule>; RuleKind::COUNT],
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
        }
    }
}

impl RuleSet {
    /// All rules disabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables a rule, returning the one it replaces.
    pub fn insert(&mut self, rule: Rule) -> Option<Rule> {
        let slot = rule.kind().index();
        self.slots[slot].replace(rule)
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, rule: Rule) -> Self {
        self.insert(rule);
        self
    }

    /// The rule in a slot.
    pub fn get(&self, kind: RuleKind) -> Option<&Rule> {
        self.slots[kind.index()].as_ref()
    }

    /// Whether a family is enabled.
    pub fn is_enabled(&self, kind: RuleKind) -> bool {
        self.get(kind).is_some()
    }

    /// Enabled rules in kind order.
    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.slots.iter().flatten()
    }

    /// Number of enabled rules.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Whether every rule is disabled.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `weekend_off` variables are needed.
    pub fn needs_weekend_vars(&self) -> bool {
        self.is_enabled(RuleKind::WeekendOffQuota)
    }
}

/// A validated, id-based solve request.
#[derive(Debug, Clone, PartialEq)]
pub struct Policy {
    pub num_workers: usize,
    pub horizon: Horizon,
    pub objective: ObjectiveSense,
    pub time_budget: Duration,
    pub backend: SolverBackend,
    pub display: DisplayOptions,
    pub rules: RuleSet,
}

impl Policy {
    /// A policy with no rules, maximizing work, with a 60 s budget.
    pub fn new(num_workers: usize, horizon: Horizon) -> Self {
        Self {
            num_workers,
            horizon,
            objective: ObjectiveSense::default(),
            time_budget: Duration::from_secs(60),
            backend: SolverBackend::default(),
            display: DisplayOptions::default(),
            rules: RuleSet::new(),
        }
    }

    /// Enables a rule.
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.insert(rule);
        self
    }

    /// Sets the objective direction.
    pub fn with_objective(mut self, objective: ObjectiveSense) -> Self {
        self.objective = objective;
        self
    }

    /// Sets the solver time budget.
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = budget;
        self
    }
}

/// What a rule sees while compiling: read-only variables and horizon, plus
/// its own constraint buffer.
pub struct RuleContext<'a> {
    registry: &'a VariableRegistry,
    horizon: &'a Horizon,
    num_workers: usize,
    kind: RuleKind,
    constraints: Vec<Constraint>,
}

impl<'a> RuleContext<'a> {
    fn new(registry: &'a VariableRegistry, horizon: &'a Horizon, kind: RuleKind) -> Self {
        Self {
            registry,
            horizon,
            num_workers: registry.num_workers(),
            kind,
            constraints: Vec::new(),
        }
    }

    /// The planning horizon.
    pub fn horizon(&self) -> &Horizon {
        self.horizon
    }

    /// Days in the horizon.
    pub fn num_days(&self) -> usize {
        self.horizon.num_days()
    }

    /// Every worker id.
    pub fn workers(&self) -> impl Iterator<Item = WorkerId> {
        workforce(self.num_workers)
    }

    /// `work[worker, day]`.
    pub fn work(&self, worker: WorkerId, day: usize) -> Result<VarId, InternalError> {
        self.registry.work(worker, day)
    }

    /// `sum(work[worker, d])` over `days`.
    pub fn work_sum<I>(&self, worker: WorkerId, days: I) -> Result<LinearExpr, InternalError>
    where
        I: IntoIterator<Item = usize>,
    {
        let mut expr = LinearExpr::zero();
        for d in days {
            expr.add_term(self.registry.work(worker, d)?, 1);
        }
        Ok(expr)
    }

    /// `weekend_off[worker, block]`.
    pub fn weekend_off(&self, worker: WorkerId, block: usize) -> Result<VarId, InternalError> {
        self.registry.weekend_off(worker, block)
    }

    /// Appends `lhs (op) rhs`, labelled `{rule}_{n}`.
    pub fn emit(
        &mut self,
        lhs: impl Into<LinearExpr>,
        relation: Relation,
        rhs: impl Into<LinearExpr>,
    ) {
        let label = format!("{}_{}", self.kind.name(), self.constraints.len());
        self.constraints
            .push(Constraint::new(label, lhs, relation, rhs));
    }

    fn into_constraints(self) -> Vec<Constraint> {
        self.constraints
    }
}

/// Compiles a policy into a model.
///
/// # Errors
/// Only [`InternalError`]: a rule addressed a variable outside the
/// registry, which is a compiler defect.
pub fn compile(policy: &Policy) -> Result<Model, InternalError> {
    let registry = VariableRegistry::new(
        policy.num_workers,
        &policy.horizon,
        policy.rules.needs_weekend_vars(),
    );
    let mut model = Model::new(policy.horizon, registry);

    for rule in policy.rules.iter() {
        let constraints = {
            let mut ctx = RuleContext::new(model.registry(), &policy.horizon, rule.kind());
            rule.compile(&mut ctx)?;
            ctx.into_constraints()
        };
        debug!(
            rule = rule.kind().name(),
            constraints = constraints.len(),
            "compiled rule"
        );
        for c in constraints {
            model.add_constraint(c);
        }
    }

    let objective = build_objective(model.registry(), policy.objective);
    model.set_objective(objective);

    info!(
        workers = policy.num_workers,
        days = policy.horizon.num_days(),
        rules = policy.rules.len(),
        variables = model.variable_count(),
        constraints = model.constraint_count(),
        "compiled shift model"
    );
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(ws: &[usize]) -> Vec<WorkerId> {
        ws.iter().map(|&w| WorkerId(w)).collect()
    }

    #[test]
    fn test_scope_all_only() {
        let s = Scoped::new().with_all(5);
        assert_eq!(s.resolve(WorkerId(0)), Some(&5));
        assert_eq!(s.resolve(WorkerId(9)), Some(&5));
    }

    #[test]
    fn test_scope_selected_only() {
        let s = Scoped::new().with_selected(ids(&[1, 2]), 3);
        assert_eq!(s.resolve(WorkerId(1)), Some(&3));
        assert_eq!(s.resolve(WorkerId(0)), None);
    }

    #[test]
    fn test_scope_selected_wins_regardless_of_order() {
        let a = Scoped::new().with_all(6).with_selected(ids(&[0]), 3);
        let b = Scoped::new().with_selected(ids(&[0]), 3).with_all(6);
        for s in [a, b] {
            assert_eq!(s.resolve(WorkerId(0)), Some(&3));
            assert_eq!(s.resolve(WorkerId(1)), Some(&6));
        }
    }

    #[test]
    fn test_rule_kind_table() {
        for (i, kind) in RuleKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
            assert!(!kind.name().is_empty());
        }
    }

    #[test]
    fn test_rule_set_slots() {
        let mut set = RuleSet::new();
        assert!(set.is_empty());
        assert!(set
            .insert(Rule::ConsecutiveWork(Scoped::new().with_all(5)))
            .is_none());
        set.insert(Rule::WeekendsOff(Scoped::new().with_all(())));
        let replaced = set.insert(Rule::ConsecutiveWork(Scoped::new().with_all(4)));
        assert_eq!(replaced, Some(Rule::ConsecutiveWork(Scoped::new().with_all(5))));
        assert_eq!(set.len(), 2);
        let kinds: Vec<_> = set.iter().map(Rule::kind).collect();
        assert_eq!(kinds, vec![RuleKind::ConsecutiveWork, RuleKind::WeekendsOff]);
        assert!(!set.needs_weekend_vars());
    }

    #[test]
    fn test_compile_without_rules() {
        let policy = Policy::new(3, Horizon::new(10, Weekday::Mon));
        let model = compile(&policy).unwrap();
        assert_eq!(model.variable_count(), 30);
        assert_eq!(model.constraint_count(), 0);
        assert_eq!(model.objective().expr().terms().len(), 30);
    }

    #[test]
    fn test_compile_is_deterministic() {
        let policy = Policy::new(4, Horizon::new(28, Weekday::Thu))
            .with_rule(Rule::FixedDatesOff {
                workers: ids(&[1]).into_iter().collect(),
                days: [2].into_iter().collect(),
            })
            .with_rule(Rule::ConsecutiveWork(Scoped::new().with_all(5)))
            .with_rule(Rule::WeekendOffQuota(Scoped::new().with_all(1)))
            .with_rule(Rule::WorkApart(vec![ids(&[0, 2]).into_iter().collect()]));
        let a = compile(&policy).unwrap();
        let b = compile(&policy).unwrap();
        assert_eq!(a.constraints(), b.constraints());
        assert_eq!(a.to_lp(), b.to_lp());

        // Kind order: consecutive work first, fixed dates last.
        assert!(a.constraints()[0].label().starts_with("consecutive_work_"));
        assert!(a
            .constraints()
            .last()
            .unwrap()
            .label()
            .starts_with("fixed_dates_off_"));
    }

    #[test]
    fn test_rule_order_does_not_change_model() {
        let h = Horizon::new(14, Weekday::Mon);
        let r1 = Rule::MonthlyDaysOff(Scoped::new().with_all(4));
        let r2 = Rule::NoSteppingStone(Scoped::new().with_all(()));
        let a = Policy::new(2, h).with_rule(r1.clone()).with_rule(r2.clone());
        let b = Policy::new(2, h).with_rule(r2).with_rule(r1);
        assert_eq!(
            compile(&a).unwrap().constraints(),
            compile(&b).unwrap().constraints()
        );
    }

    #[test]
    fn test_weekend_vars_only_with_quota() {
        let h = Horizon::new(28, Weekday::Mon);
        let without = compile(&Policy::new(2, h).with_rule(Rule::WeekendsOff(
            Scoped::new().with_all(()),
        )))
        .unwrap();
        assert_eq!(without.variable_count(), 56);

        let with = compile(
            &Policy::new(2, h).with_rule(Rule::WeekendOffQuota(Scoped::new().with_all(2))),
        )
        .unwrap();
        assert_eq!(with.variable_count(), 56 + 8);
    }
}
