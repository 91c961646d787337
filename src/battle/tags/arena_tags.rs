//! Arena tags: hazards, screens and other side- or field-wide conditions.

use schema::{ArenaTagSide, ArenaTagType, MoveCategory, MoveId, PokemonType, StatusEffect};

use crate::battle::context::BattleCtx;
use crate::battle::phases::Phase;
use crate::battle::state::{BattleEvent, BattleState, BattlerRef, DamageSource};
use crate::battle::stats::is_grounded;
use crate::config::BattleConfig;
use crate::errors::BattleResult;

use super::{ArenaTag, StackRule};

pub fn arena_tag_rule(tag_type: ArenaTagType) -> StackRule {
    match tag_type {
        ArenaTagType::Spikes => StackRule::Layers { max: 3 },
        ArenaTagType::ToxicSpikes => StackRule::Layers { max: 2 },
        ArenaTagType::StealthRock => StackRule::Layers { max: 1 },
        ArenaTagType::Reflect
        | ArenaTagType::LightScreen
        | ArenaTagType::Mist
        | ArenaTagType::Safeguard
        | ArenaTagType::Tailwind
        | ArenaTagType::TrickRoom => StackRule::Reject,
    }
}

/// Duration used when the applying effect does not name one. Hazards never expire.
pub fn default_arena_turns(tag_type: ArenaTagType) -> Option<u8> {
    match tag_type {
        ArenaTagType::Spikes | ArenaTagType::ToxicSpikes | ArenaTagType::StealthRock => None,
        ArenaTagType::Tailwind => Some(4),
        ArenaTagType::Reflect
        | ArenaTagType::LightScreen
        | ArenaTagType::Mist
        | ArenaTagType::Safeguard
        | ArenaTagType::TrickRoom => Some(5),
    }
}

fn position(state: &BattleState, tag_type: ArenaTagType, side: ArenaTagSide) -> Option<usize> {
    state
        .arena
        .tags
        .iter()
        .position(|t| t.tag_type == tag_type && t.side == side)
}

/// Places an arena tag on `side`, or adds a layer to an existing one.
///
/// Returns `false` without mutating anything when the tag is already at its layer cap or
/// does not stack.
pub fn add_arena_tag(
    ctx: &mut BattleCtx,
    tag_type: ArenaTagType,
    side: ArenaTagSide,
    turns: Option<u8>,
    source_move: Option<MoveId>,
    source: Option<BattlerRef>,
) -> BattleResult<bool> {
    let existing = position(ctx.state, tag_type, side);
    let turns_left = turns.or_else(|| default_arena_turns(tag_type));

    let layers = match (existing, arena_tag_rule(tag_type)) {
        (Some(i), StackRule::Layers { max }) => {
            let layers = ctx.state.arena.tags[i].layers;
            if layers >= max {
                return Ok(false);
            }
            layers + 1
        }
        (Some(_), StackRule::Reject) => return Ok(false),
        (Some(_), StackRule::Refresh) | (None, _) => 1,
    };

    let Some(arena) = ctx.live_arena_mut() else {
        return Ok(true);
    };
    match existing {
        Some(i) => {
            let tag = &mut arena.tags[i];
            tag.layers = layers;
            tag.turns_left = turns_left;
        }
        None => arena.tags.push(ArenaTag {
            tag_type,
            side,
            turns_left,
            layers,
            source_move,
            source,
        }),
    }
    ctx.emit(BattleEvent::ArenaTagAdded {
        tag: tag_type,
        side,
        layers,
    });
    Ok(true)
}

/// Removes every listed tag type from `side`. `Both` clears the types wherever they are.
/// Returns whether anything was (or would be) removed.
pub fn remove_arena_tags(
    ctx: &mut BattleCtx,
    tag_types: &[ArenaTagType],
    side: ArenaTagSide,
) -> BattleResult<bool> {
    let matches = |tag: &ArenaTag| {
        tag_types.contains(&tag.tag_type) && (side == ArenaTagSide::Both || tag.side == side)
    };
    let removed: Vec<(ArenaTagType, ArenaTagSide)> = ctx
        .state
        .arena
        .tags
        .iter()
        .filter(|t| matches(t))
        .map(|t| (t.tag_type, t.side))
        .collect();
    if removed.is_empty() {
        return Ok(false);
    }
    let Some(arena) = ctx.live_arena_mut() else {
        return Ok(true);
    };
    arena.tags.retain(|t| !matches(t));
    for (tag, side) in removed {
        ctx.emit(BattleEvent::ArenaTagRemoved { tag, side });
    }
    Ok(true)
}

/// Counts down timed arena tags at the end of a turn and removes the expired ones.
pub fn lapse_arena_tags(ctx: &mut BattleCtx) -> BattleResult<()> {
    let Some(arena) = ctx.live_arena_mut() else {
        return Ok(());
    };
    let mut expired = Vec::new();
    for tag in arena.tags.iter_mut() {
        if let Some(turns) = tag.turns_left.as_mut() {
            *turns = turns.saturating_sub(1);
            if *turns == 0 {
                expired.push((tag.tag_type, tag.side));
            }
        }
    }
    arena.tags.retain(|t| t.turns_left != Some(0));
    for (tag, side) in expired {
        ctx.emit(BattleEvent::ArenaTagRemoved { tag, side });
    }
    Ok(())
}

/// Spikes damage as a fraction of max HP, by layer count.
fn spikes_damage(max_hp: u16, layers: u8) -> u16 {
    let divisor = match layers {
        0 => return 0,
        1 => 8,
        2 => 6,
        _ => 4,
    };
    (max_hp / divisor).max(1)
}

/// Triggers the hazards on the side `battler` was just sent out to.
pub fn apply_entry_hazards(ctx: &mut BattleCtx, battler: BattlerRef) -> BattleResult<()> {
    let side = battler.side.arena_side();
    let grounded = is_grounded(ctx.state, ctx.catalog, battler);

    if ctx.state.arena.has_tag(ArenaTagType::StealthRock, side) {
        let combatant = ctx.combatant(battler)?;
        let effectiveness =
            PokemonType::effectiveness_against(PokemonType::Rock, combatant.current_types());
        let amount = ((combatant.max_hp() as f64 * effectiveness) / 8.0).floor() as u16;
        if amount > 0 {
            ctx.damage(battler, amount, DamageSource::Hazard(ArenaTagType::StealthRock))?;
        }
    }

    if !grounded || ctx.combatant(battler)?.is_fainted() {
        return Ok(());
    }

    if let Some(layers) = ctx.state.arena.tag(ArenaTagType::Spikes, side).map(|t| t.layers) {
        let amount = spikes_damage(ctx.combatant(battler)?.max_hp(), layers);
        ctx.damage(battler, amount, DamageSource::Hazard(ArenaTagType::Spikes))?;
    }

    if let Some(layers) = ctx
        .state
        .arena
        .tag(ArenaTagType::ToxicSpikes, side)
        .map(|t| t.layers)
    {
        if ctx.combatant(battler)?.has_type(PokemonType::Poison) {
            remove_arena_tags(ctx, &[ArenaTagType::ToxicSpikes], side)?;
        } else if !ctx.combatant(battler)?.is_fainted() {
            let effect = if layers >= 2 {
                StatusEffect::Toxic
            } else {
                StatusEffect::Poison
            };
            ctx.unshift_phase(Phase::ObtainStatus {
                target: battler,
                source: None,
                effect,
            });
        }
    }
    Ok(())
}

/// Damage multiplier from Reflect or Light Screen on the defender's side. Critical hits
/// ignore screens.
pub fn screen_multiplier(
    state: &BattleState,
    config: &BattleConfig,
    defender: BattlerRef,
    category: MoveCategory,
    critical: bool,
) -> f64 {
    if critical {
        return 1.0;
    }
    let screen = match category {
        MoveCategory::Physical => ArenaTagType::Reflect,
        MoveCategory::Special => ArenaTagType::LightScreen,
        MoveCategory::Status => return 1.0,
    };
    if state.arena.has_tag(screen, defender.side.arena_side()) {
        config.screen_multiplier
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::tests::common::{battle_state, enemy_lead, TestCombatantBuilder};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_screens_match_category_and_yield_to_crits() {
        let mut state = battle_state(
            vec![TestCombatantBuilder::new("Lead").moves(&["Tackle"]).build()],
            vec![TestCombatantBuilder::new("Foe").moves(&["Tackle"]).build()],
        );
        state.arena.tags.push(ArenaTag {
            tag_type: ArenaTagType::Reflect,
            side: ArenaTagSide::Enemy,
            turns_left: Some(5),
            layers: 1,
            source_move: None,
            source: None,
        });
        let config = BattleConfig::default();

        let multiplier = |category, critical| {
            screen_multiplier(&state, &config, enemy_lead(), category, critical)
        };
        assert_eq!(multiplier(MoveCategory::Physical, false), 0.5);
        assert_eq!(multiplier(MoveCategory::Physical, true), 1.0);
        assert_eq!(multiplier(MoveCategory::Special, false), 1.0);
    }

    #[test]
    fn test_spikes_damage_scales_with_layers() {
        assert_eq!(spikes_damage(240, 1), 30);
        assert_eq!(spikes_damage(240, 2), 40);
        assert_eq!(spikes_damage(240, 3), 60);
        assert_eq!(spikes_damage(5, 1), 1);
    }
}
