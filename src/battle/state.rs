use schema::{
    ArenaTagSide, ArenaTagType, BattleStat, BattlerTagType, MoveId, PokemonType, StatusEffect,
    TerrainType, WeatherType,
};
use serde::{Deserialize, Serialize};

use crate::battle::tags::ArenaTag;
use crate::errors::{BattleResult, BattleStateError};
use crate::player::BattlePlayer;
use crate::pokemon::Combatant;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    Player,
    Enemy,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Player, Side::Enemy];

    pub fn index(self) -> usize {
        match self {
            Side::Player => 0,
            Side::Enemy => 1,
        }
    }

    pub fn opponent(self) -> Side {
        match self {
            Side::Player => Side::Enemy,
            Side::Enemy => Side::Player,
        }
    }

    pub fn arena_side(self) -> ArenaTagSide {
        match self {
            Side::Player => ArenaTagSide::Player,
            Side::Enemy => ArenaTagSide::Enemy,
        }
    }
}

/// Identifies one team member of one side. Stays valid after the member leaves the field,
/// which lets queued work notice that its subject is no longer active.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BattlerRef {
    pub side: Side,
    pub slot: usize,
}

impl BattlerRef {
    pub fn new(side: Side, slot: usize) -> Self {
        Self { side, slot }
    }

    pub fn is_opponent_of(&self, other: BattlerRef) -> bool {
        self.side != other.side
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Weather {
    pub kind: WeatherType,
    pub turns_left: u8,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Terrain {
    pub kind: TerrainType,
    pub turns_left: u8,
}

/// Field-wide state shared by both sides.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Arena {
    pub weather: Option<Weather>,
    pub terrain: Option<Terrain>,
    /// Held arena tags, in the order they were applied.
    pub tags: Vec<ArenaTag>,
}

impl Arena {
    pub fn weather_is(&self, kind: WeatherType) -> bool {
        matches!(self.weather, Some(w) if w.kind == kind)
    }

    pub fn terrain_is(&self, kind: TerrainType) -> bool {
        matches!(self.terrain, Some(t) if t.kind == kind)
    }

    /// Finds a tag of the given type that covers `side`. A tag placed on `Both` covers
    /// either side.
    pub fn tag(&self, tag_type: ArenaTagType, side: ArenaTagSide) -> Option<&ArenaTag> {
        self.tags.iter().find(|t| {
            t.tag_type == tag_type && (t.side == side || t.side == ArenaTagSide::Both)
        })
    }

    pub fn has_tag(&self, tag_type: ArenaTagType, side: ArenaTagSide) -> bool {
        self.tag(tag_type, side).is_some()
    }
}

/// Result of a finished battle, from the player's point of view.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleOutcome {
    Victory,
    Defeat,
    Draw,
}

impl BattleOutcome {
    pub fn won_by(side: Side) -> Self {
        match side {
            Side::Player => BattleOutcome::Victory,
            Side::Enemy => BattleOutcome::Defeat,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    NotStarted,
    WaitingForActions,
    TurnInProgress,
    Finished(BattleOutcome),
    /// An unrecoverable error ended the battle.
    Aborted,
}

/// Where a chunk of damage came from.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageSource {
    Move(MoveId),
    Recoil,
    Crash,
    Sacrifice,
    Confusion,
    Status(StatusEffect),
    Weather(WeatherType),
    Hazard(ArenaTagType),
    Tag(BattlerTagType),
    Ability,
}

/// Why a combatant could not carry out its move.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    Asleep,
    Frozen,
    FullyParalyzed,
    Flinched,
    Recharging,
    NoPp,
    BlockedByTerrain,
    /// The move ran but nothing it tried to do applied.
    NothingHappened,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum BattleEvent {
    // Turn management
    TurnStarted { turn_number: u32 },
    TurnEnded { turn_number: u32 },

    // Field presence
    SentOut { battler: BattlerRef },
    Withdrawn { battler: BattlerRef },
    Fainted { battler: BattlerRef },

    // Moves
    MoveUsed { user: BattlerRef, move_id: MoveId, move_name: String },
    MoveFailed { user: BattlerRef, reason: FailureReason },
    MoveMissed { user: BattlerRef, target: BattlerRef },
    Protected { target: BattlerRef },
    NoEffect { target: BattlerRef },
    CriticalHit { target: BattlerRef },
    Effectiveness { target: BattlerRef, multiplier: f64 },
    HitCount { hits: u8 },

    // HP
    DamageDealt {
        target: BattlerRef,
        amount: u16,
        remaining_hp: u16,
        source: DamageSource,
    },
    Endured { target: BattlerRef },
    Healed { target: BattlerRef, amount: u16, remaining_hp: u16 },

    // Stats
    StatStageChanged {
        target: BattlerRef,
        stat: BattleStat,
        delta: i8,
        new_stage: i8,
    },
    StatStageAtLimit { target: BattlerRef, stat: BattleStat, rising: bool },
    StatChangeBlocked { target: BattlerRef, by: String },
    TypeChanged { target: BattlerRef, types: Vec<PokemonType> },

    // Status
    StatusApplied { target: BattlerRef, effect: StatusEffect },
    StatusCured { target: BattlerRef, effect: StatusEffect },

    // Tags
    TagAdded { target: BattlerRef, tag: BattlerTagType },
    TagRemoved { target: BattlerRef, tag: BattlerTagType },
    ConfusionActive { target: BattlerRef },
    PerishCount { target: BattlerRef, count: u8 },
    ArenaTagAdded { tag: ArenaTagType, side: ArenaTagSide, layers: u8 },
    ArenaTagRemoved { tag: ArenaTagType, side: ArenaTagSide },

    // Field
    WeatherStarted { weather: WeatherType },
    WeatherContinues { weather: WeatherType },
    WeatherEnded { weather: WeatherType },
    TerrainStarted { terrain: TerrainType },
    TerrainEnded { terrain: TerrainType },

    // Abilities
    AbilityActivated { battler: BattlerRef, ability: String },

    // Battle end
    BattleEnded { outcome: BattleOutcome },
}

impl BattleEvent {
    /// Formats the event into a human-readable string using battle context.
    /// Returns None for silent events that should not produce user-visible text.
    pub fn format(&self, state: &BattleState) -> Option<String> {
        let name = |battler: &BattlerRef| Self::battler_name(state, *battler);
        match self {
            BattleEvent::TurnStarted { turn_number } => Some(format!("=== Turn {} ===", turn_number)),
            BattleEvent::TurnEnded { .. } => None,

            BattleEvent::SentOut { battler } => {
                let trainer = &state.player(battler.side).player_name;
                Some(format!("{} sent out {}!", trainer, name(battler)))
            }
            BattleEvent::Withdrawn { battler } => Some(format!("{}, come back!", name(battler))),
            BattleEvent::Fainted { battler } => Some(format!("{} fainted!", name(battler))),

            BattleEvent::MoveUsed { user, move_name, .. } => {
                Some(format!("{} used {}!", name(user), move_name))
            }
            BattleEvent::MoveFailed { user, reason } => Some(Self::format_failure(&name(user), *reason)),
            BattleEvent::MoveMissed { user, .. } => Some(format!("{}'s attack missed!", name(user))),
            BattleEvent::Protected { target } => Some(format!("{} protected itself!", name(target))),
            BattleEvent::NoEffect { target } => Some(format!("It doesn't affect {}...", name(target))),
            BattleEvent::CriticalHit { .. } => Some("A critical hit!".to_string()),
            BattleEvent::Effectiveness { multiplier, .. } => match *multiplier {
                m if m > 1.0 => Some("It's super effective!".to_string()),
                m if m > 0.0 && m < 1.0 => Some("It's not very effective...".to_string()),
                _ => None,
            },
            BattleEvent::HitCount { hits } => {
                Some(format!("Hit {} time{}!", hits, if *hits == 1 { "" } else { "s" }))
            }

            BattleEvent::DamageDealt { target, amount, source, .. } => {
                Some(Self::format_damage(&name(target), *amount, source))
            }
            BattleEvent::Endured { target } => Some(format!("{} endured the hit!", name(target))),
            BattleEvent::Healed { target, amount, .. } => {
                Some(format!("{} recovered {} HP!", name(target), amount))
            }

            BattleEvent::StatStageChanged { target, stat, delta, .. } => {
                Some(format!("{}'s {} {}", name(target), stat, Self::format_stage_delta(*delta)))
            }
            BattleEvent::StatStageAtLimit { target, stat, rising } => Some(format!(
                "{}'s {} won't go any {}!",
                name(target),
                stat,
                if *rising { "higher" } else { "lower" }
            )),
            BattleEvent::StatChangeBlocked { target, by } => {
                Some(format!("{}'s stats were protected by {}!", name(target), by))
            }
            BattleEvent::TypeChanged { target, types } => {
                let types: Vec<String> = types.iter().map(|t| t.to_string()).collect();
                Some(format!("{} transformed into the {} type!", name(target), types.join("/")))
            }

            BattleEvent::StatusApplied { target, effect } => {
                Some(format!("{} {}", name(target), Self::format_status_applied(*effect)))
            }
            BattleEvent::StatusCured { target, effect } => {
                Some(format!("{} {}", name(target), Self::format_status_cured(*effect)))
            }

            BattleEvent::TagAdded { target, tag } => {
                Self::format_tag_added(*tag).map(|text| format!("{} {}", name(target), text))
            }
            BattleEvent::TagRemoved { target, tag } => {
                Self::format_tag_removed(*tag).map(|text| format!("{} {}", name(target), text))
            }
            BattleEvent::ConfusionActive { target } => Some(format!("{} is confused!", name(target))),
            BattleEvent::PerishCount { target, count } => {
                Some(format!("{}'s perish count fell to {}.", name(target), count))
            }
            BattleEvent::ArenaTagAdded { tag, side, layers } => Some(match (tag.is_entry_hazard(), layers) {
                (true, n) if *n > 1 => format!("{} piles up around {}! ({} layers)", tag, Self::side_name(state, *side), n),
                (true, _) => format!("{} scattered around {}!", tag, Self::side_name(state, *side)),
                (false, _) => format!("{} took effect on {}!", tag, Self::side_name(state, *side)),
            }),
            BattleEvent::ArenaTagRemoved { tag, side } => {
                Some(format!("{} wore off on {}.", tag, Self::side_name(state, *side)))
            }

            BattleEvent::WeatherStarted { weather } => Some(Self::format_weather_started(*weather)),
            BattleEvent::WeatherContinues { .. } => None,
            BattleEvent::WeatherEnded { weather } => Some(format!("The {} subsided.", weather)),
            BattleEvent::TerrainStarted { terrain } => Some(format!("{} spread across the field!", terrain)),
            BattleEvent::TerrainEnded { terrain } => Some(format!("The {} faded.", terrain)),

            BattleEvent::AbilityActivated { battler, ability } => {
                Some(format!("[{}'s {}]", name(battler), ability))
            }

            BattleEvent::BattleEnded { outcome } => Some(match outcome {
                BattleOutcome::Victory => format!("{} won the battle!", state.players[0].player_name),
                BattleOutcome::Defeat => format!("{} won the battle!", state.players[1].player_name),
                BattleOutcome::Draw => "The battle ended in a draw!".to_string(),
            }),
        }
    }

    fn battler_name(state: &BattleState, battler: BattlerRef) -> String {
        let owner = match battler.side {
            Side::Player => "",
            Side::Enemy => "The opposing ",
        };
        match state.combatant(battler) {
            Ok(c) => format!("{}{}", owner, c.name),
            Err(_) => format!("{}???", owner),
        }
    }

    fn side_name(state: &BattleState, side: ArenaTagSide) -> String {
        match side {
            ArenaTagSide::Player => format!("{}'s side", state.players[0].player_name),
            ArenaTagSide::Enemy => format!("{}'s side", state.players[1].player_name),
            ArenaTagSide::Both => "the whole field".to_string(),
        }
    }

    fn format_failure(name: &str, reason: FailureReason) -> String {
        match reason {
            FailureReason::Asleep => format!("{} is fast asleep.", name),
            FailureReason::Frozen => format!("{} is frozen solid!", name),
            FailureReason::FullyParalyzed => format!("{} is paralyzed! It can't move!", name),
            FailureReason::Flinched => format!("{} flinched and couldn't move!", name),
            FailureReason::Recharging => format!("{} must recharge!", name),
            FailureReason::NoPp => format!("{} has no PP left for that move!", name),
            FailureReason::BlockedByTerrain => format!("{} is protected by the terrain!", name),
            FailureReason::NothingHappened => "But it failed!".to_string(),
        }
    }

    fn format_damage(name: &str, amount: u16, source: &DamageSource) -> String {
        match source {
            DamageSource::Move(_) => format!("{} took {} damage!", name, amount),
            DamageSource::Recoil => format!("{} was damaged by the recoil!", name),
            DamageSource::Crash => format!("{} kept going and crashed!", name),
            DamageSource::Sacrifice => format!("{} gave everything it had!", name),
            DamageSource::Confusion => format!("{} hurt itself in its confusion!", name),
            DamageSource::Status(effect) => match effect {
                StatusEffect::Burn => format!("{} was hurt by its burn!", name),
                _ => format!("{} was hurt by poison!", name),
            },
            DamageSource::Weather(weather) => format!("{} is buffeted by the {}!", name, weather),
            DamageSource::Hazard(tag) => format!("{} was hurt by the {}!", name, tag),
            DamageSource::Tag(tag) => format!("{} was hurt by {}!", name, tag),
            DamageSource::Ability => format!("{} was hurt!", name),
        }
    }

    fn format_stage_delta(delta: i8) -> &'static str {
        match delta {
            d if d >= 3 => "rose drastically!",
            2 => "rose sharply!",
            1 => "rose!",
            -1 => "fell!",
            -2 => "harshly fell!",
            d if d <= -3 => "severely fell!",
            _ => "didn't change.",
        }
    }

    fn format_status_applied(effect: StatusEffect) -> &'static str {
        match effect {
            StatusEffect::Poison => "was poisoned!",
            StatusEffect::Toxic => "was badly poisoned!",
            StatusEffect::Paralysis => "is paralyzed! It may be unable to move!",
            StatusEffect::Sleep => "fell asleep!",
            StatusEffect::Freeze => "was frozen solid!",
            StatusEffect::Burn => "was burned!",
        }
    }

    fn format_status_cured(effect: StatusEffect) -> &'static str {
        match effect {
            StatusEffect::Poison | StatusEffect::Toxic => "was cured of its poisoning.",
            StatusEffect::Paralysis => "was cured of paralysis.",
            StatusEffect::Sleep => "woke up!",
            StatusEffect::Freeze => "thawed out!",
            StatusEffect::Burn => "was cured of its burn!",
        }
    }

    fn format_tag_added(tag: BattlerTagType) -> Option<&'static str> {
        match tag {
            BattlerTagType::Confused => Some("became confused!"),
            BattlerTagType::Protected => Some("protected itself!"),
            BattlerTagType::Endure => Some("braced itself!"),
            BattlerTagType::Seeded => Some("was seeded!"),
            BattlerTagType::Bound => Some("was trapped!"),
            BattlerTagType::PerishSong => Some("heard the perish song!"),
            BattlerTagType::Drowsy => Some("grew drowsy!"),
            BattlerTagType::Charged => Some("began charging power!"),
            BattlerTagType::Focused => Some("is getting pumped!"),
            BattlerTagType::StatusGuard(_) => Some("is protected from status!"),
            BattlerTagType::Flinched | BattlerTagType::Recharging => None,
        }
    }

    fn format_tag_removed(tag: BattlerTagType) -> Option<&'static str> {
        match tag {
            BattlerTagType::Confused => Some("snapped out of its confusion!"),
            BattlerTagType::Bound => Some("was freed!"),
            BattlerTagType::StatusGuard(_) => Some("is no longer protected from status."),
            _ => None,
        }
    }

    fn format_weather_started(weather: WeatherType) -> String {
        match weather {
            WeatherType::Sunny => "The sunlight turned harsh!".to_string(),
            WeatherType::Rain => "It started to rain!".to_string(),
            WeatherType::Sandstorm => "A sandstorm kicked up!".to_string(),
            WeatherType::Hail => "It started to hail!".to_string(),
        }
    }
}

/// Ordered log of everything that happened in a battle.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EventBus {
    events: Vec<BattleEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: BattleEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[BattleEvent] {
        &self.events
    }

    /// Events pushed at or after `index`.
    pub fn since(&self, index: usize) -> &[BattleEvent] {
        self.events.get(index..).unwrap_or(&[])
    }

    /// Formatted text of every non-silent event.
    pub fn formatted(&self, state: &BattleState) -> Vec<String> {
        self.events.iter().filter_map(|e| e.format(state)).collect()
    }

    /// Return true if the event bus contains no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Return the number of events in the bus.
    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl std::fmt::Display for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for event in &self.events {
            writeln!(f, "  {:?}", event)?;
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BattleState {
    pub battle_id: String,
    pub players: [BattlePlayer; 2],
    pub arena: Arena,
    pub turn_number: u32,
    pub game_state: GameState,
}

impl BattleState {
    pub fn new(id: impl Into<String>, player: BattlePlayer, enemy: BattlePlayer) -> Self {
        Self {
            battle_id: id.into(),
            players: [player, enemy],
            arena: Arena::default(),
            turn_number: 0,
            game_state: GameState::NotStarted,
        }
    }

    pub fn player(&self, side: Side) -> &BattlePlayer {
        &self.players[side.index()]
    }

    pub fn player_mut(&mut self, side: Side) -> &mut BattlePlayer {
        &mut self.players[side.index()]
    }

    pub fn combatant(&self, battler: BattlerRef) -> BattleResult<&Combatant> {
        self.players[battler.side.index()]
            .team
            .get(battler.slot)
            .ok_or_else(|| BattleStateError::NoSuchCombatant(battler).into())
    }

    pub fn combatant_mut(&mut self, battler: BattlerRef) -> BattleResult<&mut Combatant> {
        self.players[battler.side.index()]
            .team
            .get_mut(battler.slot)
            .ok_or_else(|| BattleStateError::NoSuchCombatant(battler).into())
    }

    pub fn active_ref(&self, side: Side) -> BattlerRef {
        BattlerRef::new(side, self.player(side).active_index)
    }

    pub fn active(&self, side: Side) -> BattleResult<&Combatant> {
        self.combatant(self.active_ref(side))
    }

    /// The opposing combatant currently on the field.
    pub fn opponent_of(&self, battler: BattlerRef) -> BattlerRef {
        self.active_ref(battler.side.opponent())
    }

    pub fn is_active(&self, battler: BattlerRef) -> bool {
        self.player(battler.side).active_index == battler.slot
    }

    /// On the field and still standing.
    pub fn is_able(&self, battler: BattlerRef) -> bool {
        self.is_active(battler)
            && self
                .combatant(battler)
                .map(|c| !c.is_fainted())
                .unwrap_or(false)
    }

    pub fn is_over(&self) -> bool {
        matches!(self.game_state, GameState::Finished(_) | GameState::Aborted)
    }
}
