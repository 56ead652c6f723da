//! Counting rules: days off and work days per horizon or per week.
//!
//! Weekly rules only look at complete 7-day blocks `[7k, 7k + 7)`; a trailing
//! partial week is unconstrained.

use super::{RuleContext, Scoped};
use crate::error::InternalError;
use crate::model::{LinearExpr, Relation};

/// `sum(work) <= num_days - m`.
pub(super) fn monthly_days_off(
    ctx: &mut RuleContext<'_>,
    scope: &Scoped<u32>,
) -> Result<(), InternalError> {
    let num_days = ctx.num_days() as i64;
    per_worker(ctx, scope, |m| (Relation::Le, num_days - i64::from(m)))
}

/// `sum(work) >= m`.
pub(super) fn monthly_work_days(
    ctx: &mut RuleContext<'_>,
    scope: &Scoped<u32>,
) -> Result<(), InternalError> {
    per_worker(ctx, scope, |m| (Relation::Ge, i64::from(m)))
}

/// Per complete week: `sum(work) <= 7 - m`.
pub(super) fn weekly_days_off(
    ctx: &mut RuleContext<'_>,
    scope: &Scoped<u32>,
) -> Result<(), InternalError> {
    per_week(ctx, scope, |m| (Relation::Le, 7 - i64::from(m)))
}

/// Per complete week: `sum(work) >= m`.
pub(super) fn weekly_work_days(
    ctx: &mut RuleContext<'_>,
    scope: &Scoped<u32>,
) -> Result<(), InternalError> {
    per_week(ctx, scope, |m| (Relation::Ge, i64::from(m)))
}

fn per_worker<F>(ctx: &mut RuleContext<'_>, scope: &Scoped<u32>, bound: F) -> Result<(), InternalError>
where
    F: Fn(u32) -> (Relation, i64),
{
    let days = ctx.horizon().days();
    for worker in ctx.workers() {
        let Some(&m) = scope.resolve(worker) else {
            continue;
        };
        let (relation, rhs) = bound(m);
        let total = ctx.work_sum(worker, days.clone())?;
        ctx.emit(total, relation, LinearExpr::constant(rhs));
    }
    Ok(())
}

fn per_week<F>(ctx: &mut RuleContext<'_>, scope: &Scoped<u32>, bound: F) -> Result<(), InternalError>
where
    F: Fn(u32) -> (Relation, i64),
{
    let weeks: Vec<_> = ctx.horizon().week_blocks().collect();
    for worker in ctx.workers() {
        let Some(&m) = scope.resolve(worker) else {
            continue;
        };
        let (relation, rhs) = bound(m);
        for week in &weeks {
            let total = ctx.work_sum(worker, week.clone())?;
            ctx.emit(total, relation, LinearExpr::constant(rhs));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::model::Relation;
    use crate::models::{Horizon, Weekday, WorkerId};
    use crate::rules::{compile, Policy, Rule, Scoped};

    #[test]
    fn test_monthly_days_off() {
        let policy = Policy::new(2, Horizon::new(30, Weekday::Mon))
            .with_rule(Rule::MonthlyDaysOff(Scoped::new().with_all(8)));
        let model = compile(&policy).unwrap();
        assert_eq!(model.constraint_count(), 2);
        let c = &model.constraints()[0];
        assert_eq!(c.terms().len(), 30);
        assert_eq!(c.relation(), Relation::Le);
        assert_eq!(c.rhs(), 22);
    }

    #[test]
    fn test_monthly_days_off_longer_than_horizon() {
        let policy = Policy::new(1, Horizon::new(5, Weekday::Mon))
            .with_rule(Rule::MonthlyDaysOff(Scoped::new().with_all(8)));
        let model = compile(&policy).unwrap();
        assert_eq!(model.constraints()[0].rhs(), -3);
        assert!(!model.is_feasible(&[false; 5]));
    }

    #[test]
    fn test_monthly_work_days_selected() {
        let policy = Policy::new(3, Horizon::new(10, Weekday::Mon)).with_rule(
            Rule::MonthlyWorkDays(
                Scoped::new()
                    .with_all(4)
                    .with_selected([WorkerId(2)], 7),
            ),
        );
        let model = compile(&policy).unwrap();
        let rhs: Vec<_> = model.constraints().iter().map(|c| c.rhs()).collect();
        assert_eq!(rhs, vec![4, 4, 7]);
        assert!(model
            .constraints()
            .iter()
            .all(|c| c.relation() == Relation::Ge));
    }

    #[test]
    fn test_weekly_days_off_complete_weeks_only() {
        let policy = Policy::new(1, Horizon::new(30, Weekday::Wed))
            .with_rule(Rule::WeeklyDaysOff(Scoped::new().with_all(2)));
        let model = compile(&policy).unwrap();
        assert_eq!(model.constraint_count(), 4);
        for (k, c) in model.constraints().iter().enumerate() {
            assert_eq!(c.rhs(), 5);
            let days: Vec<_> = c.terms().iter().map(|&(v, _)| v.index()).collect();
            assert_eq!(days, (k * 7..k * 7 + 7).collect::<Vec<_>>());
        }

        // days 28, 29 are free of the weekly rule
        let mut values = vec![false; 30];
        values[28] = true;
        values[29] = true;
        for week in 0..4 {
            for d in 0..5 {
                values[week * 7 + d] = true;
            }
        }
        assert!(model.is_feasible(&values));
    }

    #[test]
    fn test_weekly_work_days() {
        let policy = Policy::new(1, Horizon::new(14, Weekday::Mon))
            .with_rule(Rule::WeeklyWorkDays(Scoped::new().with_all(3)));
        let model = compile(&policy).unwrap();
        assert_eq!(model.constraint_count(), 2);
        let mut values = vec![false; 14];
        values[..3].fill(true);
        assert!(!model.is_feasible(&values));
        values[7..10].fill(true);
        assert!(model.is_feasible(&values));
    }

    #[test]
    fn test_short_horizon_has_no_weeks() {
        let policy = Policy::new(2, Horizon::new(6, Weekday::Mon))
            .with_rule(Rule::WeeklyWorkDays(Scoped::new().with_all(3)));
        assert_eq!(compile(&policy).unwrap().constraint_count(), 0);
    }
}
