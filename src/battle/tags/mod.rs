//! Tag registry: time-boxed conditions on combatants (battler tags) and on the field
//! (arena tags).
//!
//! A holder keeps at most one tag of a given type. Re-applying a type follows that type's
//! [`StackRule`]. Tags are lapsed in insertion order at each lapse point.

pub mod arena_tags;
pub mod battler_tags;

use schema::{
    AbilityAttr, ArenaTagSide, ArenaTagType, BattlerTagType, LapsePoint, MoveId, PokemonType,
    TagTurns,
};
use serde::{Deserialize, Serialize};

use crate::battle::context::BattleCtx;
use crate::battle::state::{BattleEvent, BattleState, BattlerRef};
use crate::battle::stats::active_ability_attrs;
use crate::catalog::Catalog;
use crate::errors::BattleResult;

pub use arena_tags::{
    add_arena_tag, apply_entry_hazards, lapse_arena_tags, remove_arena_tags, screen_multiplier,
};

/// What happens when a tag type is applied to a holder that already has it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackRule {
    /// Keep the single instance and reset its duration.
    Refresh,
    /// Add a layer, up to `max`. Further applications fail.
    Layers { max: u8 },
    /// Further applications fail while the tag is held.
    Reject,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BattlerTag {
    pub tag_type: BattlerTagType,
    /// `None` for tags that last until their own lapse behaviour removes them.
    pub turns_left: Option<u8>,
    pub source_move: Option<MoveId>,
    pub source: Option<BattlerRef>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ArenaTag {
    pub tag_type: ArenaTagType,
    pub side: ArenaTagSide,
    pub turns_left: Option<u8>,
    pub layers: u8,
    pub source_move: Option<MoveId>,
    pub source: Option<BattlerRef>,
}

pub fn battler_tag_rule(tag_type: BattlerTagType) -> StackRule {
    match tag_type {
        BattlerTagType::Flinched
        | BattlerTagType::Protected
        | BattlerTagType::Endure
        | BattlerTagType::Recharging
        | BattlerTagType::Charged
        | BattlerTagType::StatusGuard(_) => StackRule::Refresh,
        BattlerTagType::Confused
        | BattlerTagType::Seeded
        | BattlerTagType::Bound
        | BattlerTagType::PerishSong
        | BattlerTagType::Drowsy
        | BattlerTagType::Focused => StackRule::Reject,
    }
}

/// Lapse points at which a battler tag type does anything.
pub fn battler_tag_lapse_points(tag_type: BattlerTagType) -> &'static [LapsePoint] {
    match tag_type {
        BattlerTagType::Flinched => &[LapsePoint::PreMove, LapsePoint::TurnEnd],
        BattlerTagType::Confused | BattlerTagType::Recharging => &[LapsePoint::PreMove],
        BattlerTagType::Charged => &[LapsePoint::AfterMove],
        BattlerTagType::Focused => &[],
        BattlerTagType::Protected
        | BattlerTagType::Endure
        | BattlerTagType::Seeded
        | BattlerTagType::Bound
        | BattlerTagType::PerishSong
        | BattlerTagType::Drowsy
        | BattlerTagType::StatusGuard(_) => &[LapsePoint::TurnEnd],
    }
}

/// Lapse point at which a timed tag's duration counts down.
fn countdown_point(tag_type: BattlerTagType) -> LapsePoint {
    match tag_type {
        BattlerTagType::Confused => LapsePoint::PreMove,
        _ => LapsePoint::TurnEnd,
    }
}

/// Whether the holder cannot receive this tag type at all.
pub fn tag_immune(
    state: &BattleState,
    catalog: &dyn Catalog,
    target: BattlerRef,
    tag_type: BattlerTagType,
) -> bool {
    let Ok(combatant) = state.combatant(target) else {
        return true;
    };
    if tag_type == BattlerTagType::Seeded && combatant.has_type(PokemonType::Grass) {
        return true;
    }
    active_ability_attrs(state, catalog, target)
        .iter()
        .any(|a| matches!(a, AbilityAttr::TagImmunity(tags) if tags.contains(&tag_type)))
}

pub(crate) fn resolve_turns(ctx: &mut BattleCtx, turns: TagTurns) -> Option<u8> {
    match turns {
        TagTurns::Indefinite => None,
        TagTurns::Fixed(n) => Some(n),
        TagTurns::Between(lo, hi) => Some(ctx.roll(lo as i32, hi as i32 + 1) as u8),
    }
}

/// Applies a battler tag. Returns `false` without mutating anything when the target is
/// fainted, immune, or already holds a tag of this type that does not refresh.
pub fn add_battler_tag(
    ctx: &mut BattleCtx,
    target: BattlerRef,
    tag_type: BattlerTagType,
    turns: TagTurns,
    source_move: Option<MoveId>,
    source: Option<BattlerRef>,
) -> BattleResult<bool> {
    let combatant = ctx.combatant(target)?;
    if combatant.is_fainted() || tag_immune(ctx.state, ctx.catalog, target, tag_type) {
        return Ok(false);
    }
    let already_held = combatant.has_tag(tag_type);
    if already_held && battler_tag_rule(tag_type) != StackRule::Refresh {
        return Ok(false);
    }

    let turns_left = resolve_turns(ctx, turns);
    let Some(combatant) = ctx.live_combatant_mut(target)? else {
        return Ok(true);
    };

    if let Some(existing) = combatant
        .summon
        .tags
        .iter_mut()
        .find(|t| t.tag_type == tag_type)
    {
        existing.turns_left = turns_left;
        return Ok(true);
    }

    combatant.summon.tags.push(BattlerTag {
        tag_type,
        turns_left,
        source_move,
        source,
    });
    ctx.emit(BattleEvent::TagAdded {
        target,
        tag: tag_type,
    });
    Ok(true)
}

/// Removes a battler tag if held. Returns whether one was (or would be) removed.
pub fn remove_battler_tag(
    ctx: &mut BattleCtx,
    target: BattlerRef,
    tag_type: BattlerTagType,
) -> BattleResult<bool> {
    if !ctx.combatant(target)?.has_tag(tag_type) {
        return Ok(false);
    }
    let Some(combatant) = ctx.live_combatant_mut(target)? else {
        return Ok(true);
    };
    combatant.summon.tags.retain(|t| t.tag_type != tag_type);
    ctx.emit(BattleEvent::TagRemoved {
        target,
        tag: tag_type,
    });
    Ok(true)
}

/// What a lapse pass decided about the holder's pending move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LapseOutcome {
    pub cancel_move: bool,
}

/// Runs every held tag's behaviour for `point`, in insertion order.
///
/// The tag list is snapshotted first; a tag removed by an earlier tag in the same pass is
/// skipped. Tags that count down at this point lose a turn afterwards and are removed at
/// zero.
pub fn lapse_battler_tags(
    ctx: &mut BattleCtx,
    target: BattlerRef,
    point: LapsePoint,
) -> BattleResult<LapseOutcome> {
    let snapshot: Vec<BattlerTagType> = ctx
        .combatant(target)?
        .summon
        .tags
        .iter()
        .map(|t| t.tag_type)
        .filter(|t| battler_tag_lapse_points(*t).contains(&point))
        .collect();

    let mut outcome = LapseOutcome::default();
    for tag_type in snapshot {
        if ctx.combatant(target)?.is_fainted() {
            break;
        }
        let Some(tag) = ctx.combatant(target)?.tag(tag_type).cloned() else {
            continue;
        };

        let result = battler_tags::lapse(ctx, target, &tag, point)?;
        outcome.cancel_move |= result.cancel_move;

        if !result.keep {
            remove_battler_tag(ctx, target, tag_type)?;
        } else if countdown_point(tag_type) == point {
            tick_down(ctx, target, tag_type)?;
        }

        if result.suppress_rest {
            break;
        }
    }
    Ok(outcome)
}

fn tick_down(ctx: &mut BattleCtx, target: BattlerRef, tag_type: BattlerTagType) -> BattleResult<()> {
    let expired = {
        let Some(combatant) = ctx.live_combatant_mut(target)? else {
            return Ok(());
        };
        let Some(tag) = combatant
            .summon
            .tags
            .iter_mut()
            .find(|t| t.tag_type == tag_type)
        else {
            return Ok(());
        };
        match tag.turns_left.as_mut() {
            Some(turns) => {
                *turns = turns.saturating_sub(1);
                *turns == 0
            }
            None => false,
        }
    };
    if expired {
        remove_battler_tag(ctx, target, tag_type)?;
    }
    Ok(())
}
