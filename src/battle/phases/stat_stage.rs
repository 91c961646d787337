use schema::BattleStat;

use crate::battle::conditions::stat_drop_block;
use crate::battle::context::BattleCtx;
use crate::battle::state::{BattleEvent, BattlerRef};
use crate::errors::BattleResult;

use super::stale;

pub(super) fn run(
    ctx: &mut BattleCtx,
    target: BattlerRef,
    source: Option<BattlerRef>,
    stats: &[BattleStat],
    stages: i8,
) -> BattleResult<()> {
    if !ctx.is_able(target) {
        return stale("StatStageChange", target);
    }
    if let Some(by) = stat_drop_block(ctx.state, ctx.catalog, target, source, stages) {
        ctx.emit(BattleEvent::StatChangeBlocked { target, by });
        return Ok(());
    }
    for stat in stats {
        ctx.change_stat_stage(target, *stat, stages)?;
    }
    Ok(())
}
