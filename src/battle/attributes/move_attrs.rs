//! Behaviour of move attributes.

use schema::{
    ArenaTagSide, BattlerTagType, EffectSide, EffectTarget, MoveAttr, MoveCondition, MoveData,
    MultiHitKind, PokemonType, TagTurns, WeatherType,
};

use crate::battle::conditions::{move_condition_holds, stat_drop_block, status_block};
use crate::battle::context::BattleCtx;
use crate::battle::phases::{Phase, SwitchReason};
use crate::battle::state::{BattleEvent, BattlerRef, DamageSource};
use crate::battle::tags::{add_arena_tag, add_battler_tag, remove_arena_tags};
use crate::errors::BattleResult;

use super::{CritOverride, MoveScratch};

/// When in a move's resolution an attribute runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveAttrFamily {
    /// Changes the move's type before anything reads it.
    Type,
    Power,
    Accuracy,
    /// Overrides the type chart for this move.
    Matchup,
    Priority,
    Crit,
    HitCount,
    FixedDamage,
    /// Secondary effects, run once after the last hit lands.
    Effect,
    /// Runs only when the move misses.
    Miss,
}

pub struct MoveAttrCtx<'m> {
    pub user: BattlerRef,
    pub target: BattlerRef,
    pub move_data: &'m MoveData,
    pub scratch: &'m mut MoveScratch,
}

impl MoveAttrCtx<'_> {
    fn resolve(&self, target: EffectTarget) -> BattlerRef {
        match target {
            EffectTarget::User => self.user,
            EffectTarget::Target => self.target,
        }
    }

    fn arena_side(&self, side: EffectSide) -> ArenaTagSide {
        match side {
            EffectSide::User => self.user.side.arena_side(),
            EffectSide::Target => self.target.side.arena_side(),
            EffectSide::Both => ArenaTagSide::Both,
        }
    }
}

pub trait MoveAttrExt {
    fn family(&self) -> MoveAttrFamily;

    /// Applies the attribute and reports whether it activated. An attribute whose
    /// condition does not hold returns `false` and changes nothing.
    fn apply(&self, ctx: &mut BattleCtx, mctx: &mut MoveAttrCtx) -> BattleResult<bool>;
}

/// Walks the move's attributes of one family in list order. Stops once the move is
/// cancelled, except for the miss family which only runs on a cancelled move.
pub fn apply_move_attrs(
    ctx: &mut BattleCtx,
    family: MoveAttrFamily,
    mctx: &mut MoveAttrCtx,
) -> BattleResult<bool> {
    let move_data = mctx.move_data;
    let mut activated = false;
    for attr in move_data.attrs.iter().filter(|a| a.family() == family) {
        if mctx.scratch.cancelled && family != MoveAttrFamily::Miss {
            break;
        }
        let applied = attr.apply(ctx, mctx)?;
        if applied && family == MoveAttrFamily::Effect {
            mctx.scratch.effects_applied = mctx.scratch.effects_applied.saturating_add(1);
        }
        activated |= applied;
    }
    Ok(activated)
}

fn condition_holds(ctx: &BattleCtx, condition: &Option<MoveCondition>, mctx: &MoveAttrCtx) -> bool {
    match condition {
        Some(c) => move_condition_holds(ctx.state, ctx.catalog, c, mctx.user, mctx.target),
        None => true,
    }
}

fn weather_type(weather: WeatherType) -> PokemonType {
    match weather {
        WeatherType::Sunny => PokemonType::Fire,
        WeatherType::Rain => PokemonType::Water,
        WeatherType::Sandstorm => PokemonType::Rock,
        WeatherType::Hail => PokemonType::Ice,
    }
}

/// 35% two hits, 35% three, 15% four, 15% five.
fn roll_two_to_five(ctx: &mut BattleCtx) -> u8 {
    match ctx.roll(0, 100) {
        r if r < 35 => 2,
        r if r < 70 => 3,
        r if r < 85 => 4,
        _ => 5,
    }
}

impl MoveAttrExt for MoveAttr {
    fn family(&self) -> MoveAttrFamily {
        match self {
            MoveAttr::PowerMultiplier { .. }
            | MoveAttr::HpScaledPower { .. }
            | MoveAttr::StagePower { .. } => MoveAttrFamily::Power,
            MoveAttr::AlwaysHit { .. } | MoveAttr::WeatherAccuracy { .. } => {
                MoveAttrFamily::Accuracy
            }
            MoveAttr::WeatherBall => MoveAttrFamily::Type,
            MoveAttr::SuperEffectiveAgainst(_)
            | MoveAttr::NoEffectAgainst(_)
            | MoveAttr::IgnoreImmunity
            | MoveAttr::RespectTypeImmunity => MoveAttrFamily::Matchup,
            MoveAttr::PriorityIf { .. } => MoveAttrFamily::Priority,
            MoveAttr::HighCritRatio { .. } | MoveAttr::AlwaysCrit => MoveAttrFamily::Crit,
            MoveAttr::MultiHit(_) => MoveAttrFamily::HitCount,
            MoveAttr::FixedDamage(_) | MoveAttr::LevelDamage | MoveAttr::TargetHalfHp => {
                MoveAttrFamily::FixedDamage
            }
            MoveAttr::CrashOnMiss { .. } => MoveAttrFamily::Miss,
            MoveAttr::StatStageChange { .. }
            | MoveAttr::InflictStatus { .. }
            | MoveAttr::Flinch { .. }
            | MoveAttr::AddBattlerTag { .. }
            | MoveAttr::AddArenaTag { .. }
            | MoveAttr::ClearArenaTags { .. }
            | MoveAttr::SetWeather(_)
            | MoveAttr::SetTerrain(_)
            | MoveAttr::SetType { .. }
            | MoveAttr::Recoil { .. }
            | MoveAttr::Drain { .. }
            | MoveAttr::HealUser { .. }
            | MoveAttr::ForceSwitch
            | MoveAttr::Recharge
            | MoveAttr::SacrificeUser => MoveAttrFamily::Effect,
        }
    }

    fn apply(&self, ctx: &mut BattleCtx, mctx: &mut MoveAttrCtx) -> BattleResult<bool> {
        let user = mctx.user;
        let target = mctx.target;
        let move_id = mctx.move_data.id;

        match self {
            // --- Power ---
            MoveAttr::PowerMultiplier {
                multiplier,
                condition,
            } => {
                if !condition_holds(ctx, condition, mctx) {
                    return Ok(false);
                }
                mctx.scratch.power_multiplier *= multiplier;
                Ok(true)
            }
            MoveAttr::HpScaledPower { max_power } => {
                let c = ctx.combatant(user)?;
                let scaled = (*max_power as u32 * c.current_hp() as u32) / c.max_hp().max(1) as u32;
                mctx.scratch.power = (scaled as u16).max(1);
                Ok(true)
            }
            MoveAttr::StagePower { per_stage } => {
                let boosts = ctx.combatant(user)?.summon.stages.positive_total();
                mctx.scratch.power = mctx
                    .scratch
                    .power
                    .saturating_add(per_stage.saturating_mul(boosts));
                Ok(boosts > 0)
            }

            // --- Accuracy ---
            MoveAttr::AlwaysHit { condition } => {
                if !condition_holds(ctx, condition, mctx) {
                    return Ok(false);
                }
                mctx.scratch.always_hit = true;
                Ok(true)
            }
            MoveAttr::WeatherAccuracy { weather, accuracy } => {
                if !ctx.state.arena.weather_is(*weather) {
                    return Ok(false);
                }
                match accuracy {
                    Some(value) => mctx.scratch.accuracy = Some(*value),
                    None => mctx.scratch.always_hit = true,
                }
                Ok(true)
            }

            // --- Type ---
            MoveAttr::WeatherBall => {
                let Some(weather) = ctx.state.arena.weather else {
                    return Ok(false);
                };
                mctx.scratch.move_type = weather_type(weather.kind);
                mctx.scratch.power_multiplier *= 2.0;
                Ok(true)
            }

            // --- Matchup ---
            MoveAttr::SuperEffectiveAgainst(pokemon_type) => {
                if !ctx.combatant(target)?.has_type(*pokemon_type) {
                    return Ok(false);
                }
                mctx.scratch.type_overrides.push((*pokemon_type, 2.0));
                Ok(true)
            }
            MoveAttr::NoEffectAgainst(pokemon_type) => {
                if !ctx.combatant(target)?.has_type(*pokemon_type) {
                    return Ok(false);
                }
                mctx.scratch.type_overrides.push((*pokemon_type, 0.0));
                Ok(true)
            }
            MoveAttr::IgnoreImmunity => {
                mctx.scratch.ignore_immunity = true;
                Ok(true)
            }
            MoveAttr::RespectTypeImmunity => {
                mctx.scratch.respect_type_immunity = true;
                Ok(true)
            }

            // --- Priority ---
            MoveAttr::PriorityIf { condition, .. } => Ok(move_condition_holds(
                ctx.state,
                ctx.catalog,
                condition,
                user,
                target,
            )),

            // --- Crit ---
            MoveAttr::HighCritRatio { stages } => {
                mctx.scratch.crit_stage = mctx.scratch.crit_stage.saturating_add(*stages);
                Ok(true)
            }
            MoveAttr::AlwaysCrit => {
                if mctx.scratch.crit == CritOverride::Never {
                    return Ok(false);
                }
                mctx.scratch.crit = CritOverride::Always;
                Ok(true)
            }

            // --- Hit count ---
            MoveAttr::MultiHit(kind) => {
                mctx.scratch.hit_count = match kind {
                    MultiHitKind::TwoToFive => roll_two_to_five(ctx),
                    MultiHitKind::Fixed(n) => (*n).max(1),
                };
                Ok(true)
            }

            // --- Fixed damage ---
            MoveAttr::FixedDamage(amount) => {
                mctx.scratch.fixed_damage = Some(*amount);
                Ok(true)
            }
            MoveAttr::LevelDamage => {
                mctx.scratch.fixed_damage = Some(ctx.combatant(user)?.level as u16);
                Ok(true)
            }
            MoveAttr::TargetHalfHp => {
                let hp = ctx.combatant(target)?.current_hp();
                mctx.scratch.fixed_damage = Some((hp / 2).max(1));
                Ok(true)
            }

            // --- Effects ---
            MoveAttr::StatStageChange {
                target: who,
                stats,
                stages,
                chance,
            } => {
                let who = mctx.resolve(*who);
                if !ctx.is_able(who) || !ctx.chance(*chance) {
                    return Ok(false);
                }
                if let Some(by) = stat_drop_block(ctx.state, ctx.catalog, who, Some(user), *stages) {
                    ctx.emit(BattleEvent::StatChangeBlocked { target: who, by });
                    return Ok(false);
                }
                let bound = ctx.config.stage_bound;
                let mut preview = ctx.combatant(who)?.summon.stages;
                let would_change = stats
                    .iter()
                    .any(|stat| preview.change(*stat, *stages, bound) != 0);
                ctx.unshift_phase(Phase::StatStageChange {
                    target: who,
                    source: Some(user),
                    stats: stats.clone(),
                    stages: *stages,
                });
                Ok(would_change)
            }
            MoveAttr::InflictStatus { effect, chance } => {
                if !ctx.is_able(target)
                    || status_block(ctx.state, ctx.catalog, target, *effect, Some(user)).is_some()
                    || !ctx.chance(*chance)
                {
                    return Ok(false);
                }
                ctx.unshift_phase(Phase::ObtainStatus {
                    target,
                    source: Some(user),
                    effect: *effect,
                });
                Ok(true)
            }
            MoveAttr::Flinch { chance } => {
                if !ctx.is_able(target) || !ctx.chance(*chance) {
                    return Ok(false);
                }
                add_battler_tag(
                    ctx,
                    target,
                    BattlerTagType::Flinched,
                    TagTurns::Indefinite,
                    Some(move_id),
                    Some(user),
                )
            }
            MoveAttr::AddBattlerTag {
                tag,
                target: who,
                turns,
                chance,
            } => {
                let who = mctx.resolve(*who);
                if !ctx.is_able(who) || !ctx.chance(*chance) {
                    return Ok(false);
                }
                add_battler_tag(ctx, who, *tag, *turns, Some(move_id), Some(user))
            }
            MoveAttr::AddArenaTag { tag, side, turns } => {
                let side = mctx.arena_side(*side);
                add_arena_tag(ctx, *tag, side, *turns, Some(move_id), Some(user))
            }
            MoveAttr::ClearArenaTags { tags, side } => {
                let side = mctx.arena_side(*side);
                remove_arena_tags(ctx, tags, side)
            }
            MoveAttr::SetWeather(weather) => Ok(ctx.set_weather(*weather)),
            MoveAttr::SetTerrain(terrain) => Ok(ctx.set_terrain(*terrain)),
            MoveAttr::SetType { target: who, types } => {
                let who = mctx.resolve(*who);
                if !ctx.is_able(who) {
                    return Ok(false);
                }
                ctx.set_types(who, types)
            }
            MoveAttr::Recoil { divisor } => {
                let dealt = mctx.scratch.total_damage;
                if dealt == 0 || !ctx.is_able(user) {
                    return Ok(false);
                }
                let recoil = (dealt / (*divisor).max(1)).max(1);
                ctx.damage(user, recoil, DamageSource::Recoil)?;
                Ok(true)
            }
            MoveAttr::Drain { percent } => {
                let dealt = mctx.scratch.total_damage;
                if dealt == 0 {
                    return Ok(false);
                }
                let amount = ((dealt as u32 * *percent as u32) / 100).max(1) as u16;
                Ok(ctx.heal(user, amount)? > 0)
            }
            MoveAttr::HealUser { percent } => {
                let max_hp = ctx.combatant(user)?.max_hp();
                let amount = ((max_hp as u32 * *percent as u32) / 100).max(1) as u16;
                Ok(ctx.heal(user, amount)? > 0)
            }
            MoveAttr::ForceSwitch => {
                if !ctx.is_able(target) {
                    return Ok(false);
                }
                let bench = ctx.state.player(target.side).bench_indices();
                if bench.is_empty() {
                    return Ok(false);
                }
                let pick = ctx.roll(0, bench.len() as i32) as usize;
                let to_slot = bench[pick.min(bench.len() - 1)];
                ctx.unshift_phase(Phase::Switch {
                    side: target.side,
                    to_slot,
                    reason: SwitchReason::Forced,
                });
                Ok(true)
            }
            MoveAttr::Recharge => {
                // Takes hold after this turn's remaining actions.
                ctx.push_phase(Phase::AddBattlerTag {
                    target: user,
                    tag: BattlerTagType::Recharging,
                    turns: TagTurns::Indefinite,
                    source: Some(user),
                });
                Ok(true)
            }
            MoveAttr::SacrificeUser => {
                let hp = ctx.combatant(user)?.current_hp();
                ctx.damage(user, hp, DamageSource::Sacrifice)?;
                Ok(hp > 0)
            }

            // --- Miss ---
            MoveAttr::CrashOnMiss { divisor } => {
                if !ctx.is_able(user) {
                    return Ok(false);
                }
                let max_hp = ctx.combatant(user)?.max_hp();
                ctx.damage(user, (max_hp / (*divisor).max(1)).max(1), DamageSource::Crash)?;
                Ok(true)
            }
        }
    }
}
