//! Behaviour of ability attributes.
//!
//! Attributes that only answer questions (speed, priority, immunities) are read directly
//! by the stat and condition queries and never run through a chain; their `event` is
//! `None`.

use schema::{AbilityAttr, AbilityCondition, EffectTarget, MoveData, PokemonType};

use crate::battle::conditions::{ability_conditions_hold, status_block};
use crate::battle::context::BattleCtx;
use crate::battle::damage::HitOutcome;
use crate::battle::phases::Phase;
use crate::battle::state::{BattleEvent, BattlerRef, DamageSource};
use crate::errors::BattleResult;

use super::{CritOverride, MoveScratch};

/// The trigger points at which ability chains run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AbilityEvent {
    /// Holder is about to use a move. Shapes the move's scratch.
    PreAttack,
    /// Holder is about to be hit.
    PreDefend,
    /// Holder was just hit.
    PostDefend,
    PostSummon,
    TurnEnd,
    /// Holder fainted. `other` is set when the knockout came from a contact move.
    Faint,
}

pub struct AbilityCtx<'m> {
    pub holder: BattlerRef,
    pub other: Option<BattlerRef>,
    pub move_data: Option<&'m MoveData>,
    pub scratch: Option<&'m mut MoveScratch>,
}

pub trait AbilityAttrExt {
    fn event(&self) -> Option<AbilityEvent>;

    fn apply(&self, ctx: &mut BattleCtx, actx: &mut AbilityCtx) -> BattleResult<bool>;
}

/// Runs the holder's ability attributes for `event` in list order.
pub fn apply_ability_attrs(
    ctx: &mut BattleCtx,
    event: AbilityEvent,
    actx: &mut AbilityCtx,
) -> BattleResult<bool> {
    let ability = ctx.ability_of(actx.holder)?;
    let mut activated = false;
    for attr in ability.attrs.iter().filter(|a| a.event() == Some(event)) {
        if actx.scratch.as_deref().map(|s| s.cancelled).unwrap_or(false) {
            break;
        }
        activated |= attr.apply(ctx, actx)?;
    }
    Ok(activated)
}

/// Shows the holder's ability name before its effect.
fn announce(ctx: &mut BattleCtx, holder: BattlerRef) -> BattleResult<()> {
    let ability = ctx.ability_of(holder)?.name.clone();
    ctx.emit(BattleEvent::AbilityActivated {
        battler: holder,
        ability,
    });
    Ok(())
}

fn conditions_hold(
    ctx: &BattleCtx,
    conditions: &[AbilityCondition],
    actx: &AbilityCtx,
) -> bool {
    ability_conditions_hold(
        ctx.state,
        conditions,
        actx.holder,
        actx.move_data,
        actx.scratch.as_deref(),
    )
}

impl AbilityAttrExt for AbilityAttr {
    fn event(&self) -> Option<AbilityEvent> {
        match self {
            AbilityAttr::PowerBoost { .. }
            | AbilityAttr::TypeConversion { .. }
            | AbilityAttr::StabBoost { .. }
            | AbilityAttr::IgnoreTypeImmunity { .. }
            | AbilityAttr::AlwaysHit
            | AbilityAttr::CritDamage { .. } => Some(AbilityEvent::PreAttack),
            AbilityAttr::TypeImmunity { .. }
            | AbilityAttr::Airborne
            | AbilityAttr::DamageReduction { .. }
            | AbilityAttr::BlockCrit
            | AbilityAttr::SurviveAtFullHp => Some(AbilityEvent::PreDefend),
            AbilityAttr::ContactStatus { .. } | AbilityAttr::PostDefendStatChange { .. } => {
                Some(AbilityEvent::PostDefend)
            }
            AbilityAttr::AftermathOnFaint { .. } => Some(AbilityEvent::Faint),
            AbilityAttr::PostSummonStatChange { .. }
            | AbilityAttr::PostSummonWeather(_)
            | AbilityAttr::PostSummonTerrain(_) => Some(AbilityEvent::PostSummon),
            AbilityAttr::TurnEndStatChange { .. } | AbilityAttr::TurnEndHeal { .. } => {
                Some(AbilityEvent::TurnEnd)
            }
            AbilityAttr::StatusImmunity(_)
            | AbilityAttr::TagImmunity(_)
            | AbilityAttr::BlockStatDrops
            | AbilityAttr::WeatherDamageImmunity
            | AbilityAttr::WeatherSpeed { .. }
            | AbilityAttr::PriorityBoost { .. }
            | AbilityAttr::BypassSpeed => None,
        }
    }

    fn apply(&self, ctx: &mut BattleCtx, actx: &mut AbilityCtx) -> BattleResult<bool> {
        let holder = actx.holder;
        match self {
            // --- Attacking ---
            AbilityAttr::PowerBoost {
                multiplier,
                conditions,
            } => {
                if !conditions_hold(ctx, conditions, actx) {
                    return Ok(false);
                }
                let Some(scratch) = actx.scratch.as_deref_mut() else {
                    return Ok(false);
                };
                scratch.power_multiplier *= multiplier;
                Ok(true)
            }
            AbilityAttr::TypeConversion {
                from,
                to,
                multiplier,
            } => {
                let Some(scratch) = actx.scratch.as_deref_mut() else {
                    return Ok(false);
                };
                if scratch.move_type != *from {
                    return Ok(false);
                }
                scratch.move_type = *to;
                scratch.power_multiplier *= multiplier;
                Ok(true)
            }
            AbilityAttr::StabBoost { multiplier } => {
                let Some(scratch) = actx.scratch.as_deref_mut() else {
                    return Ok(false);
                };
                scratch.stab_multiplier = *multiplier;
                Ok(true)
            }
            AbilityAttr::IgnoreTypeImmunity { types } => {
                let Some(scratch) = actx.scratch.as_deref_mut() else {
                    return Ok(false);
                };
                if !types.contains(&scratch.move_type) {
                    return Ok(false);
                }
                scratch.ignore_immunity = true;
                Ok(true)
            }
            AbilityAttr::AlwaysHit => {
                let Some(scratch) = actx.scratch.as_deref_mut() else {
                    return Ok(false);
                };
                scratch.always_hit = true;
                Ok(true)
            }
            AbilityAttr::CritDamage { multiplier } => {
                let Some(scratch) = actx.scratch.as_deref_mut() else {
                    return Ok(false);
                };
                scratch.crit_multiplier *= multiplier;
                Ok(true)
            }

            // --- Defending ---
            AbilityAttr::TypeImmunity {
                move_type,
                heal_percent,
                stat_boost,
            } => {
                let from_opponent = actx.other.map(|o| o.is_opponent_of(holder)).unwrap_or(false);
                let matches = actx
                    .scratch
                    .as_deref()
                    .map(|s| s.move_type == *move_type)
                    .unwrap_or(false);
                if !from_opponent || !matches {
                    return Ok(false);
                }
                announce(ctx, holder)?;
                if let Some(scratch) = actx.scratch.as_deref_mut() {
                    scratch.cancelled = true;
                    scratch.hit.outcome = Some(HitOutcome::NoEffect);
                }
                let mut absorbed = false;
                if *heal_percent > 0 {
                    let max_hp = ctx.combatant(holder)?.max_hp();
                    let amount = ((max_hp as u32 * *heal_percent as u32) / 100).max(1) as u16;
                    absorbed |= ctx.heal(holder, amount)? > 0;
                }
                if let Some((stat, stages)) = stat_boost {
                    ctx.unshift_phase(Phase::StatStageChange {
                        target: holder,
                        source: Some(holder),
                        stats: vec![*stat],
                        stages: *stages,
                    });
                    absorbed = true;
                }
                if !absorbed {
                    ctx.emit(BattleEvent::NoEffect { target: holder });
                }
                Ok(true)
            }
            AbilityAttr::Airborne => {
                let Some(scratch) = actx.scratch.as_deref_mut() else {
                    return Ok(false);
                };
                let damaging = actx.move_data.map(|m| m.is_damaging()).unwrap_or(false);
                if scratch.move_type != PokemonType::Ground || !damaging || scratch.ignore_immunity {
                    return Ok(false);
                }
                scratch.cancelled = true;
                scratch.hit.outcome = Some(HitOutcome::NoEffect);
                announce(ctx, holder)?;
                ctx.emit(BattleEvent::NoEffect { target: holder });
                Ok(true)
            }
            AbilityAttr::DamageReduction {
                multiplier,
                conditions,
            } => {
                if !conditions_hold(ctx, conditions, actx) {
                    return Ok(false);
                }
                let Some(scratch) = actx.scratch.as_deref_mut() else {
                    return Ok(false);
                };
                scratch.hit.damage_multiplier *= multiplier;
                Ok(true)
            }
            AbilityAttr::BlockCrit => {
                let Some(scratch) = actx.scratch.as_deref_mut() else {
                    return Ok(false);
                };
                scratch.crit = CritOverride::Never;
                Ok(true)
            }
            AbilityAttr::SurviveAtFullHp => {
                if !ctx.combatant(holder)?.is_full_hp() {
                    return Ok(false);
                }
                let Some(scratch) = actx.scratch.as_deref_mut() else {
                    return Ok(false);
                };
                scratch.hit.survive_lethal = true;
                Ok(true)
            }

            // --- After being hit ---
            AbilityAttr::ContactStatus { effect, chance } => {
                let contact = actx.move_data.map(|m| m.contact).unwrap_or(false);
                let Some(attacker) = actx.other else {
                    return Ok(false);
                };
                if !contact || !ctx.is_able(attacker) {
                    return Ok(false);
                }
                if status_block(ctx.state, ctx.catalog, attacker, *effect, Some(holder)).is_some() {
                    return Ok(false);
                }
                if !ctx.chance(*chance) {
                    return Ok(false);
                }
                announce(ctx, holder)?;
                ctx.unshift_phase(Phase::ObtainStatus {
                    target: attacker,
                    source: Some(holder),
                    effect: *effect,
                });
                Ok(true)
            }
            AbilityAttr::PostDefendStatChange {
                stat,
                stages,
                conditions,
            } => {
                if !ctx.is_able(holder) || !conditions_hold(ctx, conditions, actx) {
                    return Ok(false);
                }
                announce(ctx, holder)?;
                ctx.unshift_phase(Phase::StatStageChange {
                    target: holder,
                    source: Some(holder),
                    stats: vec![*stat],
                    stages: *stages,
                });
                Ok(true)
            }

            // --- Fainting ---
            AbilityAttr::AftermathOnFaint { divisor } => {
                let Some(attacker) = actx.other else {
                    return Ok(false);
                };
                if !ctx.is_able(attacker) {
                    return Ok(false);
                }
                announce(ctx, holder)?;
                let max_hp = ctx.combatant(attacker)?.max_hp();
                ctx.damage(attacker, (max_hp / (*divisor).max(1)).max(1), DamageSource::Ability)?;
                Ok(true)
            }

            // --- Summon ---
            AbilityAttr::PostSummonStatChange {
                stat,
                stages,
                target,
            } => {
                let who = match target {
                    EffectTarget::User => holder,
                    EffectTarget::Target => ctx.state.opponent_of(holder),
                };
                if !ctx.is_able(who) {
                    return Ok(false);
                }
                announce(ctx, holder)?;
                ctx.unshift_phase(Phase::StatStageChange {
                    target: who,
                    source: Some(holder),
                    stats: vec![*stat],
                    stages: *stages,
                });
                Ok(true)
            }
            AbilityAttr::PostSummonWeather(weather) => {
                if ctx.state.arena.weather_is(*weather) {
                    return Ok(false);
                }
                announce(ctx, holder)?;
                Ok(ctx.set_weather(*weather))
            }
            AbilityAttr::PostSummonTerrain(terrain) => {
                if ctx.state.arena.terrain_is(*terrain) {
                    return Ok(false);
                }
                announce(ctx, holder)?;
                Ok(ctx.set_terrain(*terrain))
            }

            // --- End of turn ---
            AbilityAttr::TurnEndStatChange { stat, stages } => {
                if !ctx.is_able(holder) {
                    return Ok(false);
                }
                announce(ctx, holder)?;
                ctx.unshift_phase(Phase::StatStageChange {
                    target: holder,
                    source: Some(holder),
                    stats: vec![*stat],
                    stages: *stages,
                });
                Ok(true)
            }
            AbilityAttr::TurnEndHeal { percent, weather } => {
                let weather_ok = weather.map(|w| ctx.state.arena.weather_is(w)).unwrap_or(true);
                let combatant = ctx.combatant(holder)?;
                if !weather_ok || combatant.is_full_hp() || !ctx.is_able(holder) {
                    return Ok(false);
                }
                let amount = ((combatant.max_hp() as u32 * *percent as u32) / 100).max(1) as u16;
                announce(ctx, holder)?;
                Ok(ctx.heal(holder, amount)? > 0)
            }

            AbilityAttr::StatusImmunity(_)
            | AbilityAttr::TagImmunity(_)
            | AbilityAttr::BlockStatDrops
            | AbilityAttr::WeatherDamageImmunity
            | AbilityAttr::WeatherSpeed { .. }
            | AbilityAttr::PriorityBoost { .. }
            | AbilityAttr::BypassSpeed => Ok(false),
        }
    }
}
