use schema::{
    AbilityAttr, ArenaTagType, BattleStat, BattlerTagType, MoveAttr, MoveCategory, MoveData,
    PokemonType, Stat, StatusEffect,
};

use crate::battle::conditions::move_condition_holds;
use crate::battle::state::{BattleState, BattlerRef};
use crate::catalog::Catalog;
use crate::config::BattleConfig;

/// Stat stage multiplier: `(2 + stage) / 2` when positive, `2 / (2 - stage)` when negative.
pub fn stage_multiplier(stage: i8) -> f64 {
    if stage >= 0 {
        (2.0 + stage as f64) / 2.0
    } else {
        2.0 / (2.0 - stage as f64)
    }
}

/// Accuracy/evasion stage multiplier: `(3 + stage) / 3` when positive, `3 / (3 - stage)` when negative.
pub fn accuracy_stage_multiplier(stage: i8) -> f64 {
    if stage >= 0 {
        (3.0 + stage as f64) / 3.0
    } else {
        3.0 / (3.0 - stage as f64)
    }
}

/// Apply stat stage multipliers, clamping the stage to `bound` first.
pub fn apply_stat_stage_multiplier(base_stat: u16, stage: i8, bound: i8) -> u16 {
    let clamped_stage = stage.clamp(-bound, bound);
    if clamped_stage == 0 {
        return base_stat;
    }
    ((base_stat as f64) * stage_multiplier(clamped_stage)).round() as u16
}

/// Attributes of the ability currently active on `battler`. Empty if the battler or the
/// ability cannot be found.
pub fn active_ability_attrs<'c>(
    state: &BattleState,
    catalog: &'c dyn Catalog,
    battler: BattlerRef,
) -> &'c [AbilityAttr] {
    state
        .combatant(battler)
        .ok()
        .and_then(|c| catalog.ability_data(c.active_ability()))
        .map(|a| a.attrs.as_slice())
        .unwrap_or(&[])
}

/// Grounded combatants are affected by Ground moves, entry hazards and terrain.
pub fn is_grounded(state: &BattleState, catalog: &dyn Catalog, battler: BattlerRef) -> bool {
    let Ok(combatant) = state.combatant(battler) else {
        return false;
    };
    if combatant.has_type(PokemonType::Flying) {
        return false;
    }
    !active_ability_attrs(state, catalog, battler)
        .iter()
        .any(|a| matches!(a, AbilityAttr::Airborne))
}

/// Stat after stage modifiers. HP is returned unmodified.
pub fn staged_stat(state: &BattleState, config: &BattleConfig, battler: BattlerRef, stat: Stat) -> u16 {
    let Ok(combatant) = state.combatant(battler) else {
        return 0;
    };
    let base = combatant.stats[stat.index()];
    let stage = match stat {
        Stat::Hp => return base,
        Stat::Attack => combatant.stage(BattleStat::Attack),
        Stat::Defense => combatant.stage(BattleStat::Defense),
        Stat::SpecialAttack => combatant.stage(BattleStat::SpecialAttack),
        Stat::SpecialDefense => combatant.stage(BattleStat::SpecialDefense),
        Stat::Speed => combatant.stage(BattleStat::Speed),
    };
    apply_stat_stage_multiplier(base, stage, config.stage_bound)
}

/// Calculate effective speed including stat stages, paralysis, tailwind and abilities.
pub fn effective_speed(
    state: &BattleState,
    catalog: &dyn Catalog,
    config: &BattleConfig,
    battler: BattlerRef,
) -> u32 {
    let Ok(combatant) = state.combatant(battler) else {
        return 0;
    };
    let mut speed = staged_stat(state, config, battler, Stat::Speed) as f64;

    if combatant.has_status(StatusEffect::Paralysis) {
        speed *= config.paralysis_speed_multiplier;
    }
    if state
        .arena
        .has_tag(ArenaTagType::Tailwind, battler.side.arena_side())
    {
        speed *= 2.0;
    }
    for attr in active_ability_attrs(state, catalog, battler) {
        if let AbilityAttr::WeatherSpeed { weather, multiplier } = attr {
            if state.arena.weather_is(*weather) {
                speed *= multiplier;
            }
        }
    }

    speed.floor() as u32
}

/// Priority bracket of a move for this user, after move and ability adjustments.
pub fn move_priority(
    state: &BattleState,
    catalog: &dyn Catalog,
    user: BattlerRef,
    move_data: &MoveData,
) -> i8 {
    let target = state.opponent_of(user);
    let mut priority = move_data.priority;
    for attr in &move_data.attrs {
        if let MoveAttr::PriorityIf { condition, delta } = attr {
            if move_condition_holds(state, catalog, condition, user, target) {
                priority = priority.saturating_add(*delta);
            }
        }
    }
    for attr in active_ability_attrs(state, catalog, user) {
        if let AbilityAttr::PriorityBoost { category, delta } = attr {
            if *category == move_data.category {
                priority = priority.saturating_add(*delta);
            }
        }
    }
    priority
}

/// Whether the battler always acts first within its priority bracket.
pub fn bypasses_speed(state: &BattleState, catalog: &dyn Catalog, battler: BattlerRef) -> bool {
    active_ability_attrs(state, catalog, battler)
        .iter()
        .any(|a| matches!(a, AbilityAttr::BypassSpeed))
}

/// Crit stage contributed by the user's own state. Move attributes add to this.
pub fn base_crit_stage(state: &BattleState, battler: BattlerRef) -> u8 {
    match state.combatant(battler) {
        Ok(c) if c.has_tag(BattlerTagType::Focused) => 2,
        _ => 0,
    }
}

/// Attack and defense stats a move reads, after stages. Critical hits ignore the
/// attacker's drops and the defender's boosts.
pub fn attack_and_defense(
    state: &BattleState,
    config: &BattleConfig,
    user: BattlerRef,
    target: BattlerRef,
    category: MoveCategory,
    critical: bool,
) -> (u16, u16) {
    let (atk_stat, def_stat, atk_stage, def_stage) = match category {
        MoveCategory::Special => (
            Stat::SpecialAttack,
            Stat::SpecialDefense,
            BattleStat::SpecialAttack,
            BattleStat::SpecialDefense,
        ),
        _ => (Stat::Attack, Stat::Defense, BattleStat::Attack, BattleStat::Defense),
    };
    let (Ok(attacker), Ok(defender)) = (state.combatant(user), state.combatant(target)) else {
        return (0, 0);
    };
    let bound = config.stage_bound;
    let mut a_stage = attacker.stage(atk_stage);
    let mut d_stage = defender.stage(def_stage);
    if critical {
        a_stage = a_stage.max(0);
        d_stage = d_stage.min(0);
    }
    (
        apply_stat_stage_multiplier(attacker.stats[atk_stat.index()], a_stage, bound),
        apply_stat_stage_multiplier(defender.stats[def_stat.index()], d_stage, bound),
    )
}
