use std::sync::{Arc, OnceLock};

use schema::{AbilityId, MoveId, PokemonType, StatusEffect};

use crate::battle::engine::Battle;
use crate::battle::state::{BattleEvent, BattleState, BattlerRef, Side};
use crate::catalog::MoveCatalog;
use crate::config::BattleConfig;
use crate::player::BattlePlayer;
use crate::pokemon::{Combatant, MoveSlot};
use crate::rng::ScriptedRng;

const DEMO_CATALOG: &str = include_str!("../../../data/demo_catalog.ron");

/// The demo catalog, parsed once per test binary.
pub fn test_catalog() -> Arc<MoveCatalog> {
    static CATALOG: OnceLock<Arc<MoveCatalog>> = OnceLock::new();
    CATALOG
        .get_or_init(|| {
            Arc::new(MoveCatalog::from_ron_str(DEMO_CATALOG).expect("demo catalog parses"))
        })
        .clone()
}

pub fn move_id(name: &str) -> MoveId {
    test_catalog()
        .find_move(name)
        .unwrap_or_else(|| panic!("no move named {name}"))
        .id
}

pub fn ability_id(name: &str) -> AbilityId {
    test_catalog()
        .find_ability(name)
        .unwrap_or_else(|| panic!("no ability named {name}"))
        .id
}

/// A builder for creating test combatants with common defaults.
///
/// # Example
/// ```ignore
/// let lead = TestCombatantBuilder::new("Sparky")
///     .types(&[PokemonType::Electric])
///     .moves(&["Thunderbolt", "Quick Attack"])
///     .speed(90)
///     .build();
/// ```
pub struct TestCombatantBuilder {
    name: String,
    level: u8,
    types: Vec<PokemonType>,
    stats: [u16; 6],
    ability: String,
    moves: Vec<String>,
    hp: Option<u16>,
    status: Option<(StatusEffect, u8)>,
}

impl TestCombatantBuilder {
    /// Level 50 Normal type with 100 HP and 50 in every other stat.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            level: 50,
            types: vec![PokemonType::Normal],
            stats: [100, 50, 50, 50, 50, 50],
            ability: "No Ability".to_string(),
            moves: Vec::new(),
            hp: None,
            status: None,
        }
    }

    pub fn level(mut self, level: u8) -> Self {
        self.level = level;
        self
    }

    pub fn types(mut self, types: &[PokemonType]) -> Self {
        self.types = types.to_vec();
        self
    }

    /// HP, Attack, Defense, Sp. Atk, Sp. Def, Speed
    pub fn stats(mut self, stats: [u16; 6]) -> Self {
        self.stats = stats;
        self
    }

    pub fn speed(mut self, speed: u16) -> Self {
        self.stats[5] = speed;
        self
    }

    pub fn ability(mut self, name: &str) -> Self {
        self.ability = name.to_string();
        self
    }

    pub fn moves(mut self, names: &[&str]) -> Self {
        self.moves = names.iter().map(|n| n.to_string()).collect();
        self
    }

    /// Current HP. If not set, HP will be max.
    pub fn hp(mut self, hp: u16) -> Self {
        self.hp = Some(hp);
        self
    }

    pub fn status(mut self, effect: StatusEffect, counter: u8) -> Self {
        self.status = Some((effect, counter));
        self
    }

    pub fn build(self) -> Combatant {
        let catalog = test_catalog();
        let moves = self
            .moves
            .iter()
            .map(|name| {
                let data = catalog
                    .find_move(name)
                    .unwrap_or_else(|| panic!("no move named {name}"));
                MoveSlot::new(data.id, data.pp)
            })
            .collect();
        let mut combatant = Combatant::new(
            self.name,
            self.level,
            self.types,
            self.stats,
            ability_id(&self.ability),
            moves,
        );
        if let Some(hp) = self.hp {
            combatant.set_hp(hp);
        }
        if let Some((effect, counter)) = self.status {
            combatant.set_status(effect, counter);
        }
        combatant
    }
}

pub fn battle_state(player_team: Vec<Combatant>, enemy_team: Vec<Combatant>) -> BattleState {
    BattleState::new(
        "test_battle",
        BattlePlayer::new("p1", "Player", player_team),
        BattlePlayer::new("p2", "Rival", enemy_team),
    )
}

/// A battle over the demo catalog with the default config.
pub fn demo_battle(player_team: Vec<Combatant>, enemy_team: Vec<Combatant>) -> Battle {
    Battle::new(
        battle_state(player_team, enemy_team),
        test_catalog(),
        BattleConfig::default(),
    )
    .expect("test battle is valid")
}

/// Fallback draw for scripted battles: accuracy checks pass, crits and secondary effects
/// with a chance of 50% or less do not trigger, and damage takes the lowest random roll.
pub const NEUTRAL_ROLL: i32 = 50;

/// Same as [`demo_battle`] with real draws taken from `script`, then [`NEUTRAL_ROLL`].
pub fn scripted_battle(
    player_team: Vec<Combatant>,
    enemy_team: Vec<Combatant>,
    script: Vec<i32>,
) -> Battle {
    demo_battle(player_team, enemy_team).with_rng(ScriptedRng::with_fallback(script, NEUTRAL_ROLL))
}

/// A battle that has sent out both leads and is waiting for the first turn.
pub fn started_battle(
    player_team: Vec<Combatant>,
    enemy_team: Vec<Combatant>,
    script: Vec<i32>,
) -> Battle {
    let mut battle = scripted_battle(player_team, enemy_team, script);
    battle.start().expect("battle starts");
    battle
}

pub fn player_lead() -> BattlerRef {
    BattlerRef::new(Side::Player, 0)
}

pub fn enemy_lead() -> BattlerRef {
    BattlerRef::new(Side::Enemy, 0)
}

/// Returns true if any event in the list matches the predicate.
pub fn has_event<F>(events: &[BattleEvent], predicate: F) -> bool
where
    F: Fn(&BattleEvent) -> bool,
{
    events.iter().any(predicate)
}
