//! Lapse behaviour of each battler tag type.

use schema::{BattlerTagType, LapsePoint, MoveCategory, PokemonType, StatusEffect};

use crate::battle::context::BattleCtx;
use crate::battle::damage::{calculate_damage, DamageInput, DamageRolls};
use crate::battle::phases::Phase;
use crate::battle::state::{BattleEvent, BattlerRef, DamageSource, FailureReason};
use crate::battle::stats::attack_and_defense;
use crate::errors::BattleResult;

use super::BattlerTag;

/// Percent chance a confused combatant hits itself.
const CONFUSION_SELF_HIT_CHANCE: u8 = 33;
const CONFUSION_SELF_HIT_POWER: u16 = 40;

/// Result of one tag's lapse behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagLapse {
    /// `false` removes the tag.
    pub keep: bool,
    pub cancel_move: bool,
    /// Skip the remaining tags at this lapse point.
    pub suppress_rest: bool,
}

impl TagLapse {
    fn keep() -> Self {
        Self {
            keep: true,
            cancel_move: false,
            suppress_rest: false,
        }
    }

    fn remove() -> Self {
        Self {
            keep: false,
            ..Self::keep()
        }
    }
}

pub fn lapse(
    ctx: &mut BattleCtx,
    holder: BattlerRef,
    tag: &BattlerTag,
    point: LapsePoint,
) -> BattleResult<TagLapse> {
    match (tag.tag_type, point) {
        (BattlerTagType::Flinched, LapsePoint::PreMove) => {
            ctx.emit(BattleEvent::MoveFailed {
                user: holder,
                reason: FailureReason::Flinched,
            });
            Ok(TagLapse {
                cancel_move: true,
                ..TagLapse::remove()
            })
        }
        (BattlerTagType::Recharging, LapsePoint::PreMove) => {
            ctx.emit(BattleEvent::MoveFailed {
                user: holder,
                reason: FailureReason::Recharging,
            });
            Ok(TagLapse {
                keep: false,
                cancel_move: true,
                suppress_rest: true,
            })
        }
        (BattlerTagType::Confused, LapsePoint::PreMove) => lapse_confusion(ctx, holder, tag),

        (BattlerTagType::Seeded, LapsePoint::TurnEnd) => {
            let max_hp = ctx.combatant(holder)?.max_hp();
            let drained = ctx.damage(
                holder,
                (max_hp / 8).max(1),
                DamageSource::Tag(BattlerTagType::Seeded),
            )?;
            let recipient = ctx.state.opponent_of(holder);
            if ctx.is_able(recipient) {
                ctx.heal(recipient, drained)?;
            }
            Ok(TagLapse::keep())
        }
        (BattlerTagType::Bound, LapsePoint::TurnEnd) => {
            let max_hp = ctx.combatant(holder)?.max_hp();
            ctx.damage(
                holder,
                (max_hp / 8).max(1),
                DamageSource::Tag(BattlerTagType::Bound),
            )?;
            Ok(TagLapse::keep())
        }
        (BattlerTagType::PerishSong, LapsePoint::TurnEnd) => {
            let count = tag.turns_left.unwrap_or(1).saturating_sub(1);
            ctx.emit(BattleEvent::PerishCount {
                target: holder,
                count,
            });
            if count == 0 {
                let hp = ctx.combatant(holder)?.current_hp();
                ctx.damage(holder, hp, DamageSource::Tag(BattlerTagType::PerishSong))?;
                return Ok(TagLapse::remove());
            }
            Ok(TagLapse::keep())
        }
        (BattlerTagType::Drowsy, LapsePoint::TurnEnd) => {
            if tag.turns_left.unwrap_or(1) <= 1 {
                ctx.unshift_phase(Phase::ObtainStatus {
                    target: holder,
                    source: tag.source,
                    effect: StatusEffect::Sleep,
                });
                return Ok(TagLapse::remove());
            }
            Ok(TagLapse::keep())
        }
        (BattlerTagType::Charged, LapsePoint::AfterMove) => {
            // Only a damaging Electric move spends the charge.
            let spent = match ctx.combatant(holder)?.turn.move_used {
                Some(id) => {
                    let move_data = ctx.move_data(id)?;
                    move_data.is_damaging() && move_data.move_type == PokemonType::Electric
                }
                None => false,
            };
            Ok(if spent {
                TagLapse::remove()
            } else {
                TagLapse::keep()
            })
        }
        (BattlerTagType::Flinched, LapsePoint::TurnEnd)
        | (BattlerTagType::Protected, LapsePoint::TurnEnd)
        | (BattlerTagType::Endure, LapsePoint::TurnEnd) => Ok(TagLapse::remove()),

        _ => Ok(TagLapse::keep()),
    }
}

fn lapse_confusion(ctx: &mut BattleCtx, holder: BattlerRef, tag: &BattlerTag) -> BattleResult<TagLapse> {
    if tag.turns_left.unwrap_or(1) <= 1 {
        return Ok(TagLapse::remove());
    }
    ctx.emit(BattleEvent::ConfusionActive { target: holder });
    if !ctx.chance(CONFUSION_SELF_HIT_CHANCE) {
        return Ok(TagLapse::keep());
    }

    let (attack, defense) = attack_and_defense(
        ctx.state,
        ctx.config,
        holder,
        holder,
        MoveCategory::Physical,
        false,
    );
    let random_percent = ctx.roll(
        ctx.config.random_min as i32,
        ctx.config.random_max as i32 + 1,
    ) as u16;
    let input = DamageInput {
        level: ctx.combatant(holder)?.level,
        power: CONFUSION_SELF_HIT_POWER,
        attack,
        defense,
        type_multiplier: 1.0,
        stab: 1.0,
        critical: false,
        crit_multiplier: ctx.config.crit_multiplier,
        modifiers: Vec::new(),
        fixed_damage: None,
        minimum_damage: ctx.config.minimum_damage,
    };
    let result = calculate_damage(&input, DamageRolls { random_percent });
    ctx.damage(holder, result.damage, DamageSource::Confusion)?;
    Ok(TagLapse {
        cancel_move: true,
        ..TagLapse::keep()
    })
}
