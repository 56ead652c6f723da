//! Pairwise group rules.
//!
//! A group is a set of worker ids; constraints are emitted for every day and
//! every unordered pair `(a, b)` with `a < b`. Groups with fewer than two
//! members emit nothing.

use std::collections::BTreeSet;

use super::RuleContext;
use crate::error::InternalError;
use crate::model::{LinearExpr, Relation, VarId};
use crate::models::WorkerId;

/// `work[a, d] == work[b, d]`.
pub(super) fn work_together(
    ctx: &mut RuleContext<'_>,
    groups: &[BTreeSet<WorkerId>],
) -> Result<(), InternalError> {
    for_each_pair(ctx, groups, |ctx, a, b| {
        ctx.emit(a, Relation::Eq, b);
    })
}

/// `work[a, d] + work[b, d] <= 1`.
pub(super) fn work_apart(
    ctx: &mut RuleContext<'_>,
    groups: &[BTreeSet<WorkerId>],
) -> Result<(), InternalError> {
    for_each_pair(ctx, groups, |ctx, a, b| {
        ctx.emit(LinearExpr::from(a) + b, Relation::Le, LinearExpr::constant(1));
    })
}

fn for_each_pair<F>(
    ctx: &mut RuleContext<'_>,
    groups: &[BTreeSet<WorkerId>],
    mut emit: F,
) -> Result<(), InternalError>
where
    F: FnMut(&mut RuleContext<'_>, VarId, VarId),
{
    for group in groups {
        let members: Vec<WorkerId> = group.iter().copied().collect();
        if members.len() < 2 {
            continue;
        }
        for d in ctx.horizon().days() {
            for (i, &a) in members.iter().enumerate() {
                for &b in &members[i + 1..] {
                    let (va, vb) = (ctx.work(a, d)?, ctx.work(b, d)?);
                    emit(ctx, va, vb);
                }
            }
        }
    }
    Ok(())
}
