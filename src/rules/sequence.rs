//! Rules over runs of consecutive days: streak limit and stepping stones.

use super::{RuleContext, Scoped};
use crate::error::InternalError;
use crate::model::{LinearExpr, Relation};

/// Every window of `k + 1` consecutive days holds at most `k` work days.
///
/// Horizons shorter than `k + 1` days emit nothing for that worker.
pub(super) fn consecutive_work(
    ctx: &mut RuleContext<'_>,
    scope: &Scoped<u32>,
) -> Result<(), InternalError> {
    let num_days = ctx.num_days();
    for worker in ctx.workers() {
        let Some(&k) = scope.resolve(worker) else {
            continue;
        };
        let k = k as usize;
        if num_days <= k {
            continue;
        }
        for start in 0..num_days - k {
            let window = ctx.work_sum(worker, start..=start + k)?;
            ctx.emit(window, Relation::Le, LinearExpr::constant(k as i64));
        }
    }
    Ok(())
}

/// `work[d] - work[d+1] + work[d+2] >= 0`: no off/work/off pattern.
pub(super) fn no_stepping_stone(
    ctx: &mut RuleContext<'_>,
    scope: &Scoped<()>,
) -> Result<(), InternalError> {
    let num_days = ctx.num_days();
    if num_days < 3 {
        return Ok(());
    }
    for worker in ctx.workers() {
        if scope.resolve(worker).is_none() {
            continue;
        }
        for d in 0..num_days - 2 {
            let lhs = LinearExpr::from(ctx.work(worker, d)?) - ctx.work(worker, d + 1)?
                + ctx.work(worker, d + 2)?;
            ctx.emit(lhs, Relation::Ge, LinearExpr::zero());
        }
    }
    Ok(())
}
