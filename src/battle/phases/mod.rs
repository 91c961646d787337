//! Discrete units of battle resolution.
//!
//! Each [`Phase`] checks its own preconditions when it runs. A phase whose subject has
//! left the field or fainted ends without effect; that is logged, not reported as an
//! error.

mod faint;
mod move_phase;
mod stat_stage;
mod status;
mod switch;
mod turn_end;

use schema::{BattleStat, BattlerTagType, LapsePoint, MoveId, StatusEffect, TagTurns};

use crate::battle::attributes::MoveScratch;
use crate::battle::context::BattleCtx;
use crate::battle::state::{BattleOutcome, BattlerRef, Side};
use crate::battle::tags::add_battler_tag;
use crate::errors::BattleResult;

pub use move_phase::{preview_hit, resolve_hit, HitProgress};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchReason {
    Voluntary,
    /// Replaces a fainted combatant.
    Replacement,
    /// Dragged out by an opponent's move.
    Forced,
}

/// One hit of a move in flight. Multi-hit moves queue one of these per hit, each
/// carrying the same scratch forward.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveEffectPhase {
    pub user: BattlerRef,
    pub target: BattlerRef,
    pub move_id: MoveId,
    pub hit: u8,
    pub scratch: MoveScratch,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    /// A combatant tries to use the move in the given slot.
    Move { user: BattlerRef, move_index: usize },
    MoveEffect(Box<MoveEffectPhase>),
    MoveEnd { user: BattlerRef, move_id: MoveId },
    StatStageChange {
        target: BattlerRef,
        source: Option<BattlerRef>,
        stats: Vec<BattleStat>,
        stages: i8,
    },
    ObtainStatus {
        target: BattlerRef,
        source: Option<BattlerRef>,
        effect: StatusEffect,
    },
    AddBattlerTag {
        target: BattlerRef,
        tag: BattlerTagType,
        turns: TagTurns,
        source: Option<BattlerRef>,
    },
    Switch {
        side: Side,
        to_slot: usize,
        reason: SwitchReason,
    },
    /// Entry hazards and on-summon abilities for a combatant that just arrived.
    PostSummon { battler: BattlerRef },
    Faint {
        battler: BattlerRef,
        /// Who landed the knockout and whether it made contact.
        cause: Option<(BattlerRef, bool)>,
    },
    Forfeit { side: Side },
    StatusTick { battler: BattlerRef },
    /// Weather and terrain countdown and their end-of-turn effects.
    FieldTick,
    TagLapse { battler: BattlerRef, point: LapsePoint },
    TurnEndAbilities { battler: BattlerRef },
    ArenaTagLapse,
    TurnEnd,
    /// `forced` is set for forfeits and turn limits. Otherwise the result is read off
    /// the teams.
    BattleEnd { forced: Option<BattleOutcome> },
}

impl Phase {
    /// The combatant this phase acts for or upon.
    pub fn subject(&self) -> Option<BattlerRef> {
        match self {
            Phase::Move { user, .. } | Phase::MoveEnd { user, .. } => Some(*user),
            Phase::MoveEffect(effect) => Some(effect.user),
            Phase::StatStageChange { target, .. }
            | Phase::ObtainStatus { target, .. }
            | Phase::AddBattlerTag { target, .. } => Some(*target),
            Phase::PostSummon { battler }
            | Phase::StatusTick { battler }
            | Phase::TagLapse { battler, .. }
            | Phase::TurnEndAbilities { battler } => Some(*battler),
            Phase::Switch { .. }
            | Phase::Faint { .. }
            | Phase::Forfeit { .. }
            | Phase::FieldTick
            | Phase::ArenaTagLapse
            | Phase::TurnEnd
            | Phase::BattleEnd { .. } => None,
        }
    }

    pub fn set_subject(&mut self, to: BattlerRef) {
        match self {
            Phase::Move { user, .. } | Phase::MoveEnd { user, .. } => *user = to,
            Phase::MoveEffect(effect) => effect.user = to,
            Phase::StatStageChange { target, .. }
            | Phase::ObtainStatus { target, .. }
            | Phase::AddBattlerTag { target, .. } => *target = to,
            Phase::PostSummon { battler }
            | Phase::StatusTick { battler }
            | Phase::TagLapse { battler, .. }
            | Phase::TurnEndAbilities { battler } => *battler = to,
            _ => {}
        }
    }

    /// End-of-turn work that follows whoever holds the field slot, not a specific
    /// combatant.
    pub fn is_residual(&self) -> bool {
        matches!(
            self,
            Phase::StatusTick { .. }
                | Phase::TurnEndAbilities { .. }
                | Phase::TagLapse {
                    point: LapsePoint::TurnEnd,
                    ..
                }
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            Phase::Move { .. } => "Move",
            Phase::MoveEffect(_) => "MoveEffect",
            Phase::MoveEnd { .. } => "MoveEnd",
            Phase::StatStageChange { .. } => "StatStageChange",
            Phase::ObtainStatus { .. } => "ObtainStatus",
            Phase::AddBattlerTag { .. } => "AddBattlerTag",
            Phase::Switch { .. } => "Switch",
            Phase::PostSummon { .. } => "PostSummon",
            Phase::Faint { .. } => "Faint",
            Phase::Forfeit { .. } => "Forfeit",
            Phase::StatusTick { .. } => "StatusTick",
            Phase::FieldTick => "FieldTick",
            Phase::TagLapse { .. } => "TagLapse",
            Phase::TurnEndAbilities { .. } => "TurnEndAbilities",
            Phase::ArenaTagLapse => "ArenaTagLapse",
            Phase::TurnEnd => "TurnEnd",
            Phase::BattleEnd { .. } => "BattleEnd",
        }
    }

    pub fn execute(self, ctx: &mut BattleCtx) -> BattleResult<()> {
        tracing::debug!(phase = self.name(), subject = ?self.subject(), "executing phase");
        match self {
            Phase::Move { user, move_index } => move_phase::run_move(ctx, user, move_index),
            Phase::MoveEffect(effect) => move_phase::run_move_effect(ctx, *effect),
            Phase::MoveEnd { user, move_id } => move_phase::run_move_end(ctx, user, move_id),
            Phase::StatStageChange {
                target,
                source,
                stats,
                stages,
            } => stat_stage::run(ctx, target, source, &stats, stages),
            Phase::ObtainStatus {
                target,
                source,
                effect,
            } => status::run_obtain_status(ctx, target, source, effect),
            Phase::AddBattlerTag {
                target,
                tag,
                turns,
                source,
            } => {
                if !ctx.is_able(target) {
                    return stale("AddBattlerTag", target);
                }
                add_battler_tag(ctx, target, tag, turns, None, source)?;
                Ok(())
            }
            Phase::Switch {
                side,
                to_slot,
                reason,
            } => switch::run_switch(ctx, side, to_slot, reason),
            Phase::PostSummon { battler } => switch::run_post_summon(ctx, battler),
            Phase::Faint { battler, cause } => faint::run_faint(ctx, battler, cause),
            Phase::Forfeit { side } => switch::run_forfeit(ctx, side),
            Phase::StatusTick { battler } => status::run_status_tick(ctx, battler),
            Phase::FieldTick => turn_end::run_field_tick(ctx),
            Phase::TagLapse { battler, point } => turn_end::run_tag_lapse(ctx, battler, point),
            Phase::TurnEndAbilities { battler } => turn_end::run_turn_end_abilities(ctx, battler),
            Phase::ArenaTagLapse => turn_end::run_arena_tag_lapse(ctx),
            Phase::TurnEnd => turn_end::run_turn_end(ctx),
            Phase::BattleEnd { forced } => faint::run_battle_end(ctx, forced),
        }
    }
}

/// Logs a phase that found its precondition gone and ends it.
fn stale(phase: &'static str, subject: BattlerRef) -> BattleResult<()> {
    tracing::debug!(phase, ?subject, "skipping stale phase");
    Ok(())
}
