//! End-of-turn residuals: field countdown, tag lapse, ability procs and the turn limit.

use schema::{AbilityAttr, LapsePoint, PokemonType, TerrainType, WeatherType};

use crate::battle::attributes::{apply_ability_attrs, AbilityCtx, AbilityEvent};
use crate::battle::context::BattleCtx;
use crate::battle::state::{
    BattleEvent, BattleOutcome, BattlerRef, DamageSource, Side, Terrain, Weather,
};
use crate::battle::stats::{active_ability_attrs, is_grounded};
use crate::battle::tags::{lapse_arena_tags, lapse_battler_tags};
use crate::errors::BattleResult;

use super::{stale, Phase};

fn immune_to_weather(ctx: &BattleCtx, battler: BattlerRef, weather: WeatherType) -> bool {
    let Ok(combatant) = ctx.combatant(battler) else {
        return true;
    };
    let immune_types: &[PokemonType] = match weather {
        WeatherType::Sandstorm => &[PokemonType::Rock, PokemonType::Ground, PokemonType::Steel],
        WeatherType::Hail => &[PokemonType::Ice],
        WeatherType::Sunny | WeatherType::Rain => return true,
    };
    immune_types.iter().any(|t| combatant.has_type(*t))
        || active_ability_attrs(ctx.state, ctx.catalog, battler)
            .iter()
            .any(|a| matches!(a, AbilityAttr::WeatherDamageImmunity))
}

pub(super) fn run_field_tick(ctx: &mut BattleCtx) -> BattleResult<()> {
    let actives: Vec<BattlerRef> = Side::BOTH
        .iter()
        .map(|side| ctx.state.active_ref(*side))
        .collect();

    if let Some(weather) = ctx.state.arena.weather {
        let turns_left = weather.turns_left.saturating_sub(1);
        if let Some(arena) = ctx.live_arena_mut() {
            arena.weather = (turns_left > 0).then_some(Weather {
                kind: weather.kind,
                turns_left,
            });
        }
        if turns_left == 0 {
            ctx.emit(BattleEvent::WeatherEnded {
                weather: weather.kind,
            });
        } else {
            ctx.emit(BattleEvent::WeatherContinues {
                weather: weather.kind,
            });
            for battler in &actives {
                if ctx.is_able(*battler) && !immune_to_weather(ctx, *battler, weather.kind) {
                    let amount = (ctx.combatant(*battler)?.max_hp() / 16).max(1);
                    ctx.damage(*battler, amount, DamageSource::Weather(weather.kind))?;
                }
            }
        }
    }

    if let Some(terrain) = ctx.state.arena.terrain {
        if terrain.kind == TerrainType::Grassy {
            for battler in &actives {
                if ctx.is_able(*battler) && is_grounded(ctx.state, ctx.catalog, *battler) {
                    let amount = (ctx.combatant(*battler)?.max_hp() / 16).max(1);
                    ctx.heal(*battler, amount)?;
                }
            }
        }
        let turns_left = terrain.turns_left.saturating_sub(1);
        if let Some(arena) = ctx.live_arena_mut() {
            arena.terrain = (turns_left > 0).then_some(Terrain {
                kind: terrain.kind,
                turns_left,
            });
        }
        if turns_left == 0 {
            ctx.emit(BattleEvent::TerrainEnded {
                terrain: terrain.kind,
            });
        }
    }
    Ok(())
}

pub(super) fn run_tag_lapse(
    ctx: &mut BattleCtx,
    battler: BattlerRef,
    point: LapsePoint,
) -> BattleResult<()> {
    if !ctx.is_able(battler) {
        return stale("TagLapse", battler);
    }
    lapse_battler_tags(ctx, battler, point)?;
    Ok(())
}

pub(super) fn run_turn_end_abilities(ctx: &mut BattleCtx, battler: BattlerRef) -> BattleResult<()> {
    if !ctx.is_able(battler) {
        return stale("TurnEndAbilities", battler);
    }
    apply_ability_attrs(
        ctx,
        AbilityEvent::TurnEnd,
        &mut AbilityCtx {
            holder: battler,
            other: None,
            move_data: None,
            scratch: None,
        },
    )?;
    Ok(())
}

pub(super) fn run_arena_tag_lapse(ctx: &mut BattleCtx) -> BattleResult<()> {
    lapse_arena_tags(ctx)
}

pub(super) fn run_turn_end(ctx: &mut BattleCtx) -> BattleResult<()> {
    let turn_number = ctx.state.turn_number;
    ctx.emit(BattleEvent::TurnEnded { turn_number });
    if let Some(limit) = ctx.config.max_turns {
        if turn_number >= limit && !ctx.state.is_over() {
            tracing::info!(turn_number, limit, "turn limit reached");
            ctx.unshift_phase(Phase::BattleEnd {
                forced: Some(BattleOutcome::Draw),
            });
        }
    }
    Ok(())
}
