//! Pure predicates over battle state: attribute gates and status immunity.

use schema::{
    AbilityAttr, AbilityCondition, ArenaTagType, BattlerTagType, MoveCondition, MoveData,
    PokemonType, StatusEffect, TerrainType,
};

use crate::battle::attributes::MoveScratch;
use crate::battle::state::{BattleState, BattlerRef};
use crate::battle::stats::{active_ability_attrs, is_grounded};
use crate::catalog::Catalog;

pub fn move_condition_holds(
    state: &BattleState,
    catalog: &dyn Catalog,
    condition: &MoveCondition,
    user: BattlerRef,
    target: BattlerRef,
) -> bool {
    let (Ok(user_c), Ok(target_c)) = (state.combatant(user), state.combatant(target)) else {
        return false;
    };
    match condition {
        MoveCondition::Weather(weather) => state.arena.weather_is(*weather),
        MoveCondition::Terrain(terrain) => state.arena.terrain_is(*terrain),
        MoveCondition::UserHpBelowPercent(pct) => user_c.hp_percent() < *pct,
        MoveCondition::TargetHpBelowPercent(pct) => target_c.hp_percent() < *pct,
        MoveCondition::TargetHasStatus => target_c.status().is_some(),
        MoveCondition::TargetStatus(effect) => target_c.has_status(*effect),
        MoveCondition::TargetType(pokemon_type) => target_c.has_type(*pokemon_type),
        MoveCondition::TargetActed => target_c.turn.acted,
        MoveCondition::UserGrounded => is_grounded(state, catalog, user),
    }
}

/// All conditions must hold. An empty list always holds.
pub fn ability_conditions_hold(
    state: &BattleState,
    conditions: &[AbilityCondition],
    holder: BattlerRef,
    move_data: Option<&MoveData>,
    scratch: Option<&MoveScratch>,
) -> bool {
    let Ok(holder_c) = state.combatant(holder) else {
        return false;
    };
    conditions.iter().all(|condition| match condition {
        AbilityCondition::Weather(weather) => state.arena.weather_is(*weather),
        AbilityCondition::HolderHpBelowPercent(pct) => holder_c.hp_percent() < *pct,
        AbilityCondition::HolderAtFullHp => holder_c.is_full_hp(),
        AbilityCondition::MoveType(pokemon_type) => match scratch {
            Some(s) => s.move_type == *pokemon_type,
            None => move_data.map(|m| m.move_type == *pokemon_type).unwrap_or(false),
        },
        AbilityCondition::MoveCategory(category) => {
            move_data.map(|m| m.category == *category).unwrap_or(false)
        }
        AbilityCondition::Contact => move_data.map(|m| m.contact).unwrap_or(false),
        AbilityCondition::SuperEffective => {
            scratch.map(|s| s.hit.type_multiplier > 1.0).unwrap_or(false)
        }
    })
}

/// Why a status could not be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusBlock {
    Fainted,
    AlreadyAfflicted,
    TypeImmune(PokemonType),
    Guarded,
    Safeguard,
    Terrain(TerrainType),
    Ability(String),
}

/// Checks every rule that keeps `effect` off `target`. `None` means it can be applied.
pub fn status_block(
    state: &BattleState,
    catalog: &dyn Catalog,
    target: BattlerRef,
    effect: StatusEffect,
    source: Option<BattlerRef>,
) -> Option<StatusBlock> {
    let Ok(combatant) = state.combatant(target) else {
        return Some(StatusBlock::Fainted);
    };
    if combatant.is_fainted() {
        return Some(StatusBlock::Fainted);
    }
    if combatant.status().is_some() {
        return Some(StatusBlock::AlreadyAfflicted);
    }

    let immune_types: &[PokemonType] = match effect {
        StatusEffect::Burn => &[PokemonType::Fire],
        StatusEffect::Paralysis => &[PokemonType::Electric],
        StatusEffect::Poison | StatusEffect::Toxic => &[PokemonType::Poison, PokemonType::Steel],
        StatusEffect::Freeze => &[PokemonType::Ice],
        StatusEffect::Sleep => &[],
    };
    if let Some(t) = immune_types.iter().find(|t| combatant.has_type(**t)) {
        return Some(StatusBlock::TypeImmune(*t));
    }

    if combatant.has_tag(BattlerTagType::StatusGuard(effect)) {
        return Some(StatusBlock::Guarded);
    }

    let from_opponent = source.map(|s| s.is_opponent_of(target)).unwrap_or(false);
    if from_opponent
        && state
            .arena
            .has_tag(ArenaTagType::Safeguard, target.side.arena_side())
    {
        return Some(StatusBlock::Safeguard);
    }

    if is_grounded(state, catalog, target) {
        if state.arena.terrain_is(TerrainType::Misty) {
            return Some(StatusBlock::Terrain(TerrainType::Misty));
        }
        if effect == StatusEffect::Sleep && state.arena.terrain_is(TerrainType::Electric) {
            return Some(StatusBlock::Terrain(TerrainType::Electric));
        }
    }

    let blocked_by_ability = active_ability_attrs(state, catalog, target)
        .iter()
        .any(|a| matches!(a, AbilityAttr::StatusImmunity(effects) if effects.contains(&effect)));
    if blocked_by_ability {
        let name = catalog
            .ability_data(combatant.active_ability())
            .map(|a| a.name.clone())
            .unwrap_or_default();
        return Some(StatusBlock::Ability(name));
    }

    None
}

/// Name of whatever stops an opponent from lowering `target`'s stages, if anything.
pub fn stat_drop_block(
    state: &BattleState,
    catalog: &dyn Catalog,
    target: BattlerRef,
    source: Option<BattlerRef>,
    stages: i8,
) -> Option<String> {
    if stages >= 0 || !source.map(|s| s.is_opponent_of(target)).unwrap_or(false) {
        return None;
    }
    if state
        .arena
        .has_tag(ArenaTagType::Mist, target.side.arena_side())
    {
        return Some(ArenaTagType::Mist.to_string());
    }
    let blocks = active_ability_attrs(state, catalog, target)
        .iter()
        .any(|a| matches!(a, AbilityAttr::BlockStatDrops));
    if blocks {
        let name = state
            .combatant(target)
            .ok()
            .and_then(|c| catalog.ability_data(c.active_ability()))
            .map(|a| a.name.clone())
            .unwrap_or_default();
        return Some(name);
    }
    None
}
