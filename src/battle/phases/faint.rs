//! Fainting, replacement and the end of the battle.

use crate::battle::attributes::{apply_ability_attrs, AbilityCtx, AbilityEvent};
use crate::battle::context::BattleCtx;
use crate::battle::state::{BattleEvent, BattleOutcome, BattlerRef, GameState};
use crate::errors::BattleResult;

use super::{stale, Phase, SwitchReason};

pub(super) fn run_faint(
    ctx: &mut BattleCtx,
    battler: BattlerRef,
    cause: Option<(BattlerRef, bool)>,
) -> BattleResult<()> {
    let combatant = ctx.combatant(battler)?;
    if combatant.fainted || !combatant.is_fainted() {
        return stale("Faint", battler);
    }

    if let Some(c) = ctx.live_combatant_mut(battler)? {
        c.fainted = true;
    }
    ctx.emit(BattleEvent::Fainted { battler });
    ctx.show_faint(battler);

    let removed = ctx.remove_phases_where(|p| p.subject() == Some(battler));
    if removed > 0 {
        tracing::debug!(?battler, removed, "dropped queued phases of fainted combatant");
    }

    let contact_attacker = cause.and_then(|(attacker, contact)| contact.then_some(attacker));
    apply_ability_attrs(
        ctx,
        AbilityEvent::Faint,
        &mut AbilityCtx {
            holder: battler,
            other: contact_attacker,
            move_data: None,
            scratch: None,
        },
    )?;

    if !ctx.state.is_active(battler) {
        return Ok(());
    }
    match ctx.state.player(battler.side).first_healthy_bench() {
        Some(to_slot) => ctx.unshift_phase(Phase::Switch {
            side: battler.side,
            to_slot,
            reason: SwitchReason::Replacement,
        }),
        None => ctx.unshift_phase(Phase::BattleEnd { forced: None }),
    }
    Ok(())
}

pub(super) fn run_battle_end(ctx: &mut BattleCtx, forced: Option<BattleOutcome>) -> BattleResult<()> {
    if ctx.state.is_over() {
        tracing::debug!("battle already over");
        return Ok(());
    }
    let outcome = match forced {
        Some(outcome) => outcome,
        None => {
            let player_alive = ctx.state.players[0].has_healthy_members();
            let enemy_alive = ctx.state.players[1].has_healthy_members();
            match (player_alive, enemy_alive) {
                (true, false) => BattleOutcome::Victory,
                (false, true) => BattleOutcome::Defeat,
                (false, false) => BattleOutcome::Draw,
                (true, true) => {
                    tracing::debug!("both sides can still battle");
                    return Ok(());
                }
            }
        }
    };

    tracing::info!(?outcome, turn = ctx.state.turn_number, "battle ended");
    ctx.set_game_state(GameState::Finished(outcome));
    ctx.clear_queue();
    ctx.emit(BattleEvent::BattleEnded { outcome });
    Ok(())
}
