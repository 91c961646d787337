//! Move use: status checks, the per-hit pipeline and after-move tag lapse.

use schema::{
    BattleStat, BattlerTagType, LapsePoint, MoveData, MoveId, MoveTarget, StatusEffect,
    TerrainType,
};

use crate::battle::attributes::{
    apply_ability_attrs, apply_move_attrs, prepare_move, AbilityCtx, AbilityEvent, CritOverride,
    HitScratch, MoveAttrCtx, MoveAttrFamily, MoveScratch,
};
use crate::battle::context::BattleCtx;
use crate::battle::damage::{hit_damage, type_multiplier, HitOutcome};
use crate::battle::state::{BattleEvent, BattlerRef, DamageSource, FailureReason};
use crate::battle::stats::{accuracy_stage_multiplier, is_grounded, move_priority};
use crate::battle::tags::lapse_battler_tags;
use crate::errors::{BattleResult, BattleStateError};
use crate::sinks::AnimationRef;

use super::{stale, MoveEffectPhase, Phase};

/// Percent chance to thaw before each move attempt.
const THAW_CHANCE: u8 = 20;
/// Percent chance paralysis stops a move.
const FULL_PARALYSIS_CHANCE: u8 = 25;

/// Whether another hit of the same move follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitProgress {
    NextHit,
    Finished,
}

fn move_target(ctx: &BattleCtx, user: BattlerRef, move_data: &MoveData) -> BattlerRef {
    match move_data.target {
        MoveTarget::User => user,
        _ => ctx.state.opponent_of(user),
    }
}

/// Sleep, freeze and paralysis checks. Returns `true` when the move is stopped.
fn status_prevents_move(ctx: &mut BattleCtx, user: BattlerRef) -> BattleResult<bool> {
    let Some(status) = ctx.combatant(user)?.status() else {
        return Ok(false);
    };
    let reason = match status.effect {
        StatusEffect::Sleep if status.counter == 0 => {
            ctx.cure_status(user)?;
            return Ok(false);
        }
        StatusEffect::Sleep => {
            if let Some(c) = ctx.live_combatant_mut(user)? {
                if let Some(s) = c.status_mut() {
                    s.counter -= 1;
                }
            }
            FailureReason::Asleep
        }
        StatusEffect::Freeze => {
            if ctx.chance(THAW_CHANCE) {
                ctx.cure_status(user)?;
                return Ok(false);
            }
            FailureReason::Frozen
        }
        StatusEffect::Paralysis if ctx.chance(FULL_PARALYSIS_CHANCE) => {
            FailureReason::FullyParalyzed
        }
        _ => return Ok(false),
    };
    ctx.emit(BattleEvent::MoveFailed { user, reason });
    Ok(true)
}

pub(super) fn run_move(ctx: &mut BattleCtx, user: BattlerRef, move_index: usize) -> BattleResult<()> {
    if !ctx.is_able(user) {
        return stale("Move", user);
    }
    if let Some(c) = ctx.live_combatant_mut(user)? {
        c.turn.acted = true;
    }

    let lapse = lapse_battler_tags(ctx, user, LapsePoint::PreMove)?;
    if lapse.cancel_move || !ctx.is_able(user) {
        return Ok(());
    }
    if status_prevents_move(ctx, user)? {
        return Ok(());
    }

    let slot = ctx
        .combatant(user)?
        .move_slot(move_index)
        .cloned()
        .ok_or_else(|| {
            BattleStateError::QueueCorrupted(format!("{:?} has no move in slot {}", user, move_index))
        })?;
    if slot.pp == 0 {
        ctx.emit(BattleEvent::MoveFailed {
            user,
            reason: FailureReason::NoPp,
        });
        return Ok(());
    }

    let move_data = ctx.move_data(slot.id)?;
    if let Some(c) = ctx.live_combatant_mut(user)? {
        c.use_pp(move_index);
        c.turn.move_used = Some(slot.id);
    }
    ctx.emit(BattleEvent::MoveUsed {
        user,
        move_id: slot.id,
        move_name: move_data.name.clone(),
    });
    ctx.play_animation(AnimationRef::Move {
        user,
        move_id: slot.id,
    });

    let target = move_target(ctx, user, move_data);
    let scratch = prepare_move(ctx, user, target, move_data)?;
    ctx.unshift_phase(Phase::MoveEffect(Box::new(MoveEffectPhase {
        user,
        target,
        move_id: slot.id,
        hit: 1,
        scratch,
    })));
    ctx.unshift_phase(Phase::MoveEnd {
        user,
        move_id: slot.id,
    });
    Ok(())
}

pub(super) fn run_move_effect(ctx: &mut BattleCtx, effect: MoveEffectPhase) -> BattleResult<()> {
    let MoveEffectPhase {
        user,
        target,
        move_id,
        hit,
        mut scratch,
    } = effect;
    if !ctx.is_able(user) {
        return stale("MoveEffect", user);
    }
    let move_data = ctx.move_data(move_id)?;
    if move_data.target.aims_at_opponent() && !ctx.is_able(target) {
        return stale("MoveEffect", target);
    }

    if resolve_hit(ctx, user, target, move_data, &mut scratch, hit)? == HitProgress::NextHit {
        ctx.unshift_phase(Phase::MoveEffect(Box::new(MoveEffectPhase {
            user,
            target,
            move_id,
            hit: hit + 1,
            scratch,
        })));
    }
    Ok(())
}

pub(super) fn run_move_end(ctx: &mut BattleCtx, user: BattlerRef, move_id: MoveId) -> BattleResult<()> {
    if !ctx.is_able(user) {
        return stale("MoveEnd", user);
    }
    tracing::trace!(?user, ?move_id, "move finished");
    lapse_battler_tags(ctx, user, LapsePoint::AfterMove)?;
    Ok(())
}

fn roll_crit(ctx: &mut BattleCtx, scratch: &MoveScratch) -> bool {
    match scratch.crit {
        CritOverride::Always => true,
        CritOverride::Never => false,
        CritOverride::Roll => {
            let denominator = ctx.config.crit_denominator(scratch.crit_stage);
            denominator <= 1 || ctx.roll(0, denominator as i32) == 0
        }
    }
}

fn accuracy_check(
    ctx: &mut BattleCtx,
    user: BattlerRef,
    target: BattlerRef,
    move_data: &MoveData,
    scratch: &mut MoveScratch,
) -> BattleResult<bool> {
    apply_move_attrs(
        ctx,
        MoveAttrFamily::Accuracy,
        &mut MoveAttrCtx {
            user,
            target,
            move_data,
            scratch: &mut *scratch,
        },
    )?;
    let Some(accuracy) = scratch.accuracy else {
        return Ok(true);
    };
    if scratch.always_hit {
        return Ok(true);
    }
    let bound = ctx.config.stage_bound;
    let stage = (ctx.combatant(user)?.stage(BattleStat::Accuracy) as i16
        - ctx.combatant(target)?.stage(BattleStat::Evasion) as i16)
        .clamp(-(bound as i16), bound as i16) as i8;
    let threshold =
        accuracy as f64 * accuracy_stage_multiplier(stage) * scratch.accuracy_multiplier;
    Ok((ctx.roll(0, 100) as f64) < threshold)
}

/// Resolves one hit of a move against `target`, then its secondary effects once the
/// last hit has landed.
///
/// Protection, terrain and accuracy are only checked on the first hit. In simulated
/// mode the first hit is treated as the last so a preview covers the whole move.
pub fn resolve_hit(
    ctx: &mut BattleCtx,
    user: BattlerRef,
    target: BattlerRef,
    move_data: &MoveData,
    scratch: &mut MoveScratch,
    hit: u8,
) -> BattleResult<HitProgress> {
    scratch.hit = HitScratch::default();

    if hit == 1 && move_data.target.aims_at_opponent() {
        if ctx.combatant(target)?.has_tag(BattlerTagType::Protected) {
            ctx.emit(BattleEvent::Protected { target });
            scratch.cancelled = true;
            return Ok(HitProgress::Finished);
        }
        if ctx.state.arena.terrain_is(TerrainType::Psychic)
            && move_priority(ctx.state, ctx.catalog, user, move_data) > 0
            && is_grounded(ctx.state, ctx.catalog, target)
        {
            ctx.emit(BattleEvent::MoveFailed {
                user,
                reason: FailureReason::BlockedByTerrain,
            });
            scratch.cancelled = true;
            return Ok(HitProgress::Finished);
        }
        if !accuracy_check(ctx, user, target, move_data, scratch)? {
            ctx.emit(BattleEvent::MoveMissed { user, target });
            scratch.cancelled = true;
            apply_move_attrs(
                ctx,
                MoveAttrFamily::Miss,
                &mut MoveAttrCtx {
                    user,
                    target,
                    move_data,
                    scratch: &mut *scratch,
                },
            )?;
            return Ok(HitProgress::Finished);
        }
    }

    if move_data.target.aims_at_opponent() && !move_data.is_damaging() && hit == 1 {
        if !check_matchup(ctx, user, target, move_data, scratch)? {
            return Ok(HitProgress::Finished);
        }
        if scratch.respect_type_immunity && scratch.hit.type_multiplier == 0.0 {
            ctx.emit(BattleEvent::NoEffect { target });
            scratch.hit.outcome = Some(HitOutcome::NoEffect);
            scratch.cancelled = true;
            return Ok(HitProgress::Finished);
        }
    }

    if move_data.is_damaging() {
        if land_hit(ctx, user, target, move_data, scratch, hit)? == HitProgress::NextHit {
            return Ok(HitProgress::NextHit);
        }
        if scratch.cancelled {
            return Ok(HitProgress::Finished);
        }
        if scratch.hit_count > 1 {
            ctx.emit(BattleEvent::HitCount {
                hits: scratch.hits_landed,
            });
        }
    }

    let applied = apply_move_attrs(
        ctx,
        MoveAttrFamily::Effect,
        &mut MoveAttrCtx {
            user,
            target,
            move_data,
            scratch: &mut *scratch,
        },
    )?;
    if !move_data.is_damaging() && !applied {
        ctx.emit(BattleEvent::MoveFailed {
            user,
            reason: FailureReason::NothingHappened,
        });
    }
    Ok(HitProgress::Finished)
}

/// Records the type matchup against `target` and runs its pre-defend abilities.
/// Returns `false` when an ability cancelled the move.
fn check_matchup(
    ctx: &mut BattleCtx,
    user: BattlerRef,
    target: BattlerRef,
    move_data: &MoveData,
    scratch: &mut MoveScratch,
) -> BattleResult<bool> {
    let defender_types = ctx.combatant(target)?.current_types().to_vec();
    scratch.hit.type_multiplier = type_multiplier(
        scratch.move_type,
        &defender_types,
        &scratch.type_overrides,
        scratch.ignore_immunity,
    );

    apply_ability_attrs(
        ctx,
        AbilityEvent::PreDefend,
        &mut AbilityCtx {
            holder: target,
            other: Some(user),
            move_data: Some(move_data),
            scratch: Some(&mut *scratch),
        },
    )?;
    Ok(!scratch.cancelled)
}

/// Type matchup, defender abilities, damage and on-hit abilities for one hit.
fn land_hit(
    ctx: &mut BattleCtx,
    user: BattlerRef,
    target: BattlerRef,
    move_data: &MoveData,
    scratch: &mut MoveScratch,
    hit: u8,
) -> BattleResult<HitProgress> {
    if !check_matchup(ctx, user, target, move_data, scratch)? {
        return Ok(HitProgress::Finished);
    }

    scratch.hit.critical = scratch.fixed_damage.is_none()
        && scratch.hit.type_multiplier != 0.0
        && roll_crit(ctx, scratch);
    let result = hit_damage(ctx, user, target, move_data, scratch)?;
    if result.outcome == HitOutcome::NoEffect {
        ctx.emit(BattleEvent::NoEffect { target });
        scratch.hit.outcome = Some(HitOutcome::NoEffect);
        scratch.cancelled = true;
        return Ok(HitProgress::Finished);
    }

    let (current_hp, endure_tag) = {
        let defender = ctx.combatant(target)?;
        (defender.current_hp(), defender.has_tag(BattlerTagType::Endure))
    };
    let survives = endure_tag || scratch.hit.survive_lethal;
    let endured = survives && current_hp > 0 && result.damage >= current_hp;
    let amount = if endured {
        current_hp - 1
    } else {
        result.damage
    };

    if let Some(defender) = ctx.live_combatant_mut(target)? {
        defender.turn.last_hit_by = Some((user, move_data.contact));
    }
    let dealt = ctx.damage(target, amount, DamageSource::Move(move_data.id))?;
    if endured {
        ctx.emit(BattleEvent::Endured { target });
    }
    if scratch.hit.critical {
        ctx.emit(BattleEvent::CriticalHit { target });
    }
    if hit == 1 && scratch.hit.type_multiplier != 1.0 {
        ctx.emit(BattleEvent::Effectiveness {
            target,
            multiplier: scratch.hit.type_multiplier,
        });
    }

    scratch.hit.damage = dealt;
    scratch.hit.outcome = Some(HitOutcome::Hit);
    scratch.hits_landed = scratch.hits_landed.saturating_add(1);
    scratch.total_damage = scratch.total_damage.saturating_add(dealt);

    apply_ability_attrs(
        ctx,
        AbilityEvent::PostDefend,
        &mut AbilityCtx {
            holder: target,
            other: Some(user),
            move_data: Some(move_data),
            scratch: Some(&mut *scratch),
        },
    )?;

    let target_down = if ctx.simulated {
        dealt >= current_hp
    } else {
        ctx.combatant(target)?.is_fainted()
    };
    let more_hits = hit < scratch.hit_count && !target_down && ctx.is_able(user);
    if more_hits && !ctx.simulated {
        return Ok(HitProgress::NextHit);
    }
    Ok(HitProgress::Finished)
}

/// Dry run of a move's first hit and effects. `ctx` must be simulated.
pub fn preview_hit(
    ctx: &mut BattleCtx,
    user: BattlerRef,
    move_data: &MoveData,
) -> BattleResult<MoveScratch> {
    let target = move_target(ctx, user, move_data);
    let mut scratch = prepare_move(ctx, user, target, move_data)?;
    resolve_hit(ctx, user, target, move_data, &mut scratch, 1)?;
    Ok(scratch)
}
