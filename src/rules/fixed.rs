//! Fixed days off: explicit dates or recurring weekdays.

use std::collections::BTreeSet;

use super::RuleContext;
use crate::error::InternalError;
use crate::model::{LinearExpr, Relation};
use crate::models::{Weekday, WorkerId};

/// `work[w, d] == 0` for every listed worker and 0-based day.
pub(super) fn fixed_dates_off(
    ctx: &mut RuleContext<'_>,
    workers: &BTreeSet<WorkerId>,
    days: &BTreeSet<usize>,
) -> Result<(), InternalError> {
    for &worker in workers {
        for &d in days {
            let var = ctx.work(worker, d)?;
            ctx.emit(var, Relation::Eq, LinearExpr::zero());
        }
    }
    Ok(())
}

/// `work[w, d] == 0` for every listed worker and every day falling on a
/// listed weekday.
pub(super) fn fixed_weekdays_off(
    ctx: &mut RuleContext<'_>,
    workers: &BTreeSet<WorkerId>,
    weekdays: &BTreeSet<Weekday>,
) -> Result<(), InternalError> {
    let days: Vec<usize> = ctx
        .horizon()
        .days()
        .filter(|&d| weekdays.contains(&ctx.horizon().weekday(d)))
        .collect();
    fixed_dates_off(ctx, workers, &days.into_iter().collect())
}
