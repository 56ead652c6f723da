//! Minimum staff on duty per day.

use super::RuleContext;
use crate::error::InternalError;
use crate::model::{LinearExpr, Relation};

/// `sum over workers of work[w, d] >= min`, with separate minimums for
/// weekdays and Saturday/Sunday. A missing minimum leaves those days free.
pub(super) fn daily_staffing(
    ctx: &mut RuleContext<'_>,
    weekday_min: Option<u32>,
    weekend_min: Option<u32>,
) -> Result<(), InternalError> {
    for d in ctx.horizon().days() {
        let min = if ctx.horizon().is_weekend(d) {
            weekend_min
        } else {
            weekday_min
        };
        let Some(min) = min else {
            continue;
        };
        let mut on_duty = LinearExpr::zero();
        for worker in ctx.workers() {
            on_duty.add_term(ctx.work(worker, d)?, 1);
        }
        ctx.emit(on_duty, Relation::Ge, LinearExpr::constant(i64::from(min)));
    }
    Ok(())
}
