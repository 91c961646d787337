//! Gaining a non-volatile status, and the end-of-turn damage it deals.

use schema::StatusEffect;

use crate::battle::conditions::status_block;
use crate::battle::context::BattleCtx;
use crate::battle::state::{BattlerRef, DamageSource};
use crate::errors::BattleResult;

use super::stale;

pub(super) fn run_obtain_status(
    ctx: &mut BattleCtx,
    target: BattlerRef,
    source: Option<BattlerRef>,
    effect: StatusEffect,
) -> BattleResult<()> {
    if !ctx.is_able(target) {
        return stale("ObtainStatus", target);
    }
    if let Some(block) = status_block(ctx.state, ctx.catalog, target, effect, source) {
        tracing::debug!(?target, ?effect, ?block, "status blocked");
        return Ok(());
    }
    // Sleep lasts one to three move attempts.
    let counter = match effect {
        StatusEffect::Sleep => ctx.roll(1, 4) as u8,
        _ => 0,
    };
    ctx.set_status(target, effect, counter)?;
    Ok(())
}

pub(super) fn run_status_tick(ctx: &mut BattleCtx, battler: BattlerRef) -> BattleResult<()> {
    if !ctx.is_able(battler) {
        return stale("StatusTick", battler);
    }
    let combatant = ctx.combatant(battler)?;
    let max_hp = combatant.max_hp();
    let Some(status) = combatant.status() else {
        return Ok(());
    };

    let amount = match status.effect {
        StatusEffect::Poison => max_hp / 8,
        StatusEffect::Burn => max_hp / 16,
        StatusEffect::Toxic => {
            let ticks = status.counter.saturating_add(1);
            if let Some(c) = ctx.live_combatant_mut(battler)? {
                if let Some(s) = c.status_mut() {
                    s.counter = ticks;
                }
            }
            ((max_hp as u32 * ticks as u32) / 16) as u16
        }
        StatusEffect::Sleep | StatusEffect::Freeze | StatusEffect::Paralysis => return Ok(()),
    };
    ctx.damage(battler, amount.max(1), DamageSource::Status(status.effect))?;
    Ok(())
}
