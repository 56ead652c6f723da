//! Weekend rules.
//!
//! `weekend_off[w, we]` is the AND of "Saturday off" and "Sunday off",
//! linearized with two inequalities:
//!
//! ```text
//! 2 * weekend_off <= (1 - work[sat]) + (1 - work[sun])
//!     (1 - weekend_off) <= work[sat] + work[sun]
//! ```
//!
//! Linkage is emitted for every worker; only the quota is scoped.

use super::{RuleContext, Scoped};
use crate::error::InternalError;
use crate::model::{LinearExpr, Relation};

/// At least `m` complete weekend blocks fully off.
pub(super) fn weekend_off_quota(
    ctx: &mut RuleContext<'_>,
    scope: &Scoped<u32>,
) -> Result<(), InternalError> {
    let blocks: Vec<_> = ctx.horizon().weekend_blocks().collect();
    for worker in ctx.workers() {
        let mut flags = LinearExpr::zero();
        for &(we, sat, sun) in &blocks {
            let off = ctx.weekend_off(worker, we)?;
            let sat = ctx.work(worker, sat)?;
            let sun = ctx.work(worker, sun)?;

            ctx.emit(
                LinearExpr::term(off, 2),
                Relation::Le,
                (LinearExpr::constant(1) - sat) + (LinearExpr::constant(1) - sun),
            );
            ctx.emit(
                LinearExpr::constant(1) - off,
                Relation::Le,
                LinearExpr::from(sat) + sun,
            );
            flags.add_term(off, 1);
        }

        if let Some(&m) = scope.resolve(worker) {
            ctx.emit(flags, Relation::Ge, LinearExpr::constant(i64::from(m)));
        }
    }
    Ok(())
}

/// Every Saturday and Sunday off.
pub(super) fn weekends_off(
    ctx: &mut RuleContext<'_>,
    scope: &Scoped<()>,
) -> Result<(), InternalError> {
    let weekend_days: Vec<usize> = ctx
        .horizon()
        .days()
        .filter(|&d| ctx.horizon().is_weekend(d))
        .collect();
    for worker in ctx.workers() {
        if scope.resolve(worker).is_none() {
            continue;
        }
        for &d in &weekend_days {
            let var = ctx.work(worker, d)?;
            ctx.emit(var, Relation::Eq, LinearExpr::zero());
        }
    }
    Ok(())
}
