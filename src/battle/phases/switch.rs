//! Leaving and entering the field.

use crate::battle::attributes::{apply_ability_attrs, AbilityCtx, AbilityEvent};
use crate::battle::context::BattleCtx;
use crate::battle::state::{BattleEvent, BattleOutcome, BattlerRef, Side};
use crate::battle::tags::apply_entry_hazards;
use crate::errors::BattleResult;
use crate::sinks::AnimationRef;

use super::{stale, Phase, SwitchReason};

pub(super) fn run_switch(
    ctx: &mut BattleCtx,
    side: Side,
    to_slot: usize,
    reason: SwitchReason,
) -> BattleResult<()> {
    let outgoing = ctx.state.active_ref(side);
    let incoming = BattlerRef::new(side, to_slot);
    if outgoing == incoming || ctx.combatant(incoming)?.is_fainted() {
        return stale("Switch", incoming);
    }
    // A voluntary switch made stale by a faint replacement earlier in the turn.
    if reason == SwitchReason::Voluntary && ctx.combatant(outgoing)?.is_fainted() {
        return stale("Switch", outgoing);
    }

    if let Some(c) = ctx.live_combatant_mut(outgoing)? {
        c.clear_summon_data();
    }
    if reason != SwitchReason::Replacement {
        ctx.emit(BattleEvent::Withdrawn { battler: outgoing });
    }
    ctx.set_active(side, to_slot)?;
    ctx.emit(BattleEvent::SentOut { battler: incoming });
    ctx.play_animation(AnimationRef::SendOut(incoming));
    ctx.unshift_phase(Phase::PostSummon { battler: incoming });
    Ok(())
}

pub(super) fn run_post_summon(ctx: &mut BattleCtx, battler: BattlerRef) -> BattleResult<()> {
    if !ctx.is_able(battler) {
        return stale("PostSummon", battler);
    }
    apply_entry_hazards(ctx, battler)?;
    if !ctx.is_able(battler) {
        return Ok(());
    }
    apply_ability_attrs(
        ctx,
        AbilityEvent::PostSummon,
        &mut AbilityCtx {
            holder: battler,
            other: None,
            move_data: None,
            scratch: None,
        },
    )?;
    Ok(())
}

pub(super) fn run_forfeit(ctx: &mut BattleCtx, side: Side) -> BattleResult<()> {
    tracing::info!(?side, "side forfeited");
    ctx.unshift_phase(Phase::BattleEnd {
        forced: Some(BattleOutcome::won_by(side.opponent())),
    });
    Ok(())
}
