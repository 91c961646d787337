//! Damage pipeline.
//!
//! [`calculate_damage`] is pure: every random decision arrives through [`DamageRolls`] and
//! every contextual modifier through [`DamageInput`]. [`hit_damage`] gathers those inputs
//! from a live battle.

use schema::{
    BattlerTagType, MoveCategory, MoveData, PokemonType, StatusEffect, TerrainType, WeatherType,
};

use crate::battle::attributes::MoveScratch;
use crate::battle::context::BattleCtx;
use crate::battle::state::{BattleState, BattlerRef};
use crate::battle::stats::{attack_and_defense, is_grounded};
use crate::battle::tags::screen_multiplier;
use crate::catalog::Catalog;
use crate::config::BattleConfig;
use crate::errors::BattleResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HitOutcome {
    #[default]
    Hit,
    /// A multiplier in the chain was exactly zero. Distinct from a hit that dealt 0.
    NoEffect,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DamageInput {
    pub level: u8,
    pub power: u16,
    pub attack: u16,
    pub defense: u16,
    pub type_multiplier: f64,
    pub stab: f64,
    pub critical: bool,
    pub crit_multiplier: f64,
    /// Weather, terrain, screen, burn and ability terms, applied in order.
    pub modifiers: Vec<f64>,
    /// Set for moves whose damage ignores stats entirely.
    pub fixed_damage: Option<u16>,
    pub minimum_damage: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageRolls {
    /// Percentage from the configured random band.
    pub random_percent: u16,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageResult {
    pub outcome: HitOutcome,
    pub damage: u16,
    /// Damage from the level/power/stat formula before any multiplier.
    pub base_damage: u16,
    /// Product of every multiplier that was applied.
    pub multiplier: f64,
}

impl DamageResult {
    fn no_effect() -> Self {
        Self {
            outcome: HitOutcome::NoEffect,
            damage: 0,
            base_damage: 0,
            multiplier: 0.0,
        }
    }
}

/// Effectiveness of `move_type` against every defending type, after move and ability
/// overrides. `ignore_immunity` turns a 0× matchup into 1×.
pub fn type_multiplier(
    move_type: PokemonType,
    defender_types: &[PokemonType],
    overrides: &[(PokemonType, f64)],
    ignore_immunity: bool,
) -> f64 {
    defender_types
        .iter()
        .map(|defending| {
            let base = overrides
                .iter()
                .rev()
                .find(|(t, _)| t == defending)
                .map(|(_, m)| *m)
                .unwrap_or_else(|| PokemonType::type_effectiveness(move_type, *defending));
            if base == 0.0 && ignore_immunity {
                1.0
            } else {
                base
            }
        })
        .product()
}

pub fn calculate_damage(input: &DamageInput, rolls: DamageRolls) -> DamageResult {
    if input.type_multiplier == 0.0 {
        return DamageResult::no_effect();
    }

    if let Some(fixed) = input.fixed_damage {
        return DamageResult {
            outcome: HitOutcome::Hit,
            damage: fixed,
            base_damage: fixed,
            multiplier: 1.0,
        };
    }

    // Level, power and attack at their maxima overflow u32.
    let level_term = (2 * input.level as u64) / 5 + 2;
    let defense = input.defense.max(1) as u64;
    let base = (level_term * input.power as u64 * input.attack as u64 / defense) / 50 + 2;

    let mut damage = base as f64;
    let mut multiplier = 1.0;
    let mut apply = |damage: &mut f64, m: f64| {
        *damage = (*damage * m).floor();
        multiplier *= m;
    };

    if input.critical {
        apply(&mut damage, input.crit_multiplier);
    }
    apply(&mut damage, rolls.random_percent as f64 / 100.0);
    apply(&mut damage, input.stab);
    apply(&mut damage, input.type_multiplier);
    for &m in &input.modifiers {
        if m == 0.0 {
            return DamageResult::no_effect();
        }
        apply(&mut damage, m);
    }

    let damage = (damage.max(0.0) as u64).min(u16::MAX as u64) as u16;
    DamageResult {
        outcome: HitOutcome::Hit,
        damage: damage.max(input.minimum_damage),
        base_damage: base.min(u16::MAX as u64) as u16,
        multiplier,
    }
}

/// Weather multiplier on a move of `move_type`.
fn weather_modifier(state: &BattleState, move_type: PokemonType) -> f64 {
    match (state.arena.weather.map(|w| w.kind), move_type) {
        (Some(WeatherType::Sunny), PokemonType::Fire) => 1.5,
        (Some(WeatherType::Sunny), PokemonType::Water) => 0.5,
        (Some(WeatherType::Rain), PokemonType::Water) => 1.5,
        (Some(WeatherType::Rain), PokemonType::Fire) => 0.5,
        _ => 1.0,
    }
}

fn terrain_modifier(
    state: &BattleState,
    catalog: &dyn Catalog,
    user: BattlerRef,
    target: BattlerRef,
    move_type: PokemonType,
) -> f64 {
    let Some(terrain) = state.arena.terrain.map(|t| t.kind) else {
        return 1.0;
    };
    let boosted = match terrain {
        TerrainType::Electric => PokemonType::Electric,
        TerrainType::Grassy => PokemonType::Grass,
        TerrainType::Psychic => PokemonType::Psychic,
        TerrainType::Misty => {
            return if move_type == PokemonType::Dragon && is_grounded(state, catalog, target) {
                0.5
            } else {
                1.0
            };
        }
    };
    if move_type == boosted && is_grounded(state, catalog, user) {
        1.3
    } else {
        1.0
    }
}

/// Every contextual multiplier for one hit, in application order.
pub fn damage_modifiers(
    state: &BattleState,
    catalog: &dyn Catalog,
    config: &BattleConfig,
    user: BattlerRef,
    target: BattlerRef,
    move_data: &MoveData,
    scratch: &MoveScratch,
) -> Vec<f64> {
    let mut modifiers = vec![
        scratch.power_multiplier,
        weather_modifier(state, scratch.move_type),
        terrain_modifier(state, catalog, user, target, scratch.move_type),
    ];

    if let Ok(attacker) = state.combatant(user) {
        if move_data.category == MoveCategory::Physical && attacker.has_status(StatusEffect::Burn) {
            modifiers.push(0.5);
        }
        if scratch.move_type == PokemonType::Electric && attacker.has_tag(BattlerTagType::Charged) {
            modifiers.push(2.0);
        }
    }

    modifiers.push(screen_multiplier(
        state,
        config,
        target,
        move_data.category,
        scratch.hit.critical,
    ));

    if move_data.category == MoveCategory::Special
        && state.arena.weather_is(WeatherType::Sandstorm)
        && state
            .combatant(target)
            .map(|c| c.has_type(PokemonType::Rock))
            .unwrap_or(false)
    {
        modifiers.push(1.0 / 1.5);
    }

    modifiers.push(scratch.hit.damage_multiplier);
    modifiers.retain(|m| *m != 1.0);
    modifiers
}

/// Damage of the current hit in `scratch`, drawing the random roll from `ctx`.
pub fn hit_damage(
    ctx: &mut BattleCtx,
    user: BattlerRef,
    target: BattlerRef,
    move_data: &MoveData,
    scratch: &MoveScratch,
) -> BattleResult<DamageResult> {
    let critical = scratch.hit.critical;
    let (attack, defense) = attack_and_defense(
        ctx.state,
        ctx.config,
        user,
        target,
        move_data.category,
        critical,
    );
    let attacker = ctx.combatant(user)?;
    let level = attacker.level;
    let stab = if attacker.has_type(scratch.move_type) {
        scratch.stab_multiplier
    } else {
        1.0
    };
    let modifiers = damage_modifiers(
        ctx.state,
        ctx.catalog,
        ctx.config,
        user,
        target,
        move_data,
        scratch,
    );

    let input = DamageInput {
        level,
        power: scratch.power,
        attack,
        defense,
        type_multiplier: scratch.hit.type_multiplier,
        stab,
        critical,
        crit_multiplier: scratch.crit_multiplier,
        modifiers,
        fixed_damage: scratch.fixed_damage,
        minimum_damage: ctx.config.minimum_damage,
    };
    let random_percent = if input.fixed_damage.is_some() || input.type_multiplier == 0.0 {
        100
    } else {
        ctx.roll(
            ctx.config.random_min as i32,
            ctx.config.random_max as i32 + 1,
        ) as u16
    };
    Ok(calculate_damage(&input, DamageRolls { random_percent }))
}
