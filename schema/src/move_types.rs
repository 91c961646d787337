use serde::{Deserialize, Serialize};
use strum::Display;

use crate::battle_data::{
    ArenaTagType, BattleStat, BattlerTagType, EffectSide, EffectTarget, StatusEffect, TagTurns,
    TerrainType, WeatherType,
};
use crate::pokemon_types::PokemonType;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct MoveId(pub u16);

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum MoveCategory {
    Physical,
    Special,
    Status,
}

/// Who a move is aimed at in a singles battle.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MoveTarget {
    #[default]
    Opponent,
    User,
    UserSide,
    OpponentSide,
    Field,
}

impl MoveTarget {
    /// Moves aimed at the opposing combatant go through accuracy and protection checks.
    pub fn aims_at_opponent(self) -> bool {
        matches!(self, MoveTarget::Opponent)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MultiHitKind {
    /// Two to five hits, weighted 35/35/15/15.
    TwoToFive,
    Fixed(u8),
}

/// Predicates that gate a move attribute, evaluated against the battle at use time.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveCondition {
    Weather(WeatherType),
    Terrain(TerrainType),
    UserHpBelowPercent(u8),
    TargetHpBelowPercent(u8),
    TargetHasStatus,
    TargetStatus(StatusEffect),
    TargetType(PokemonType),
    /// The target already acted this turn.
    TargetActed,
    UserGrounded,
}

/// One composable unit of move behaviour. Parameters are fixed when the catalog is authored.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum MoveAttr {
    // Power
    PowerMultiplier {
        multiplier: f64,
        #[serde(default)]
        condition: Option<MoveCondition>,
    },
    /// Power scales with the user's remaining HP fraction.
    HpScaledPower { max_power: u16 },
    /// Adds power for every positive stage the user holds.
    StagePower { per_stage: u16 },

    // Accuracy
    AlwaysHit {
        #[serde(default)]
        condition: Option<MoveCondition>,
    },
    /// Replaces accuracy while the given weather is active. `None` means never misses.
    WeatherAccuracy {
        weather: WeatherType,
        accuracy: Option<u8>,
    },

    // Type
    /// Takes the type of the active weather and doubles power while any weather is up.
    WeatherBall,

    // Type matchup
    SuperEffectiveAgainst(PokemonType),
    NoEffectAgainst(PokemonType),
    IgnoreImmunity,
    /// Status move that fails against a target the move's type cannot affect.
    RespectTypeImmunity,

    // Priority
    PriorityIf { condition: MoveCondition, delta: i8 },

    // Critical hits
    HighCritRatio { stages: u8 },
    AlwaysCrit,

    // Hit count
    MultiHit(MultiHitKind),

    // Fixed damage
    FixedDamage(u16),
    LevelDamage,
    TargetHalfHp,

    // Effects applied after the hit lands
    StatStageChange {
        target: EffectTarget,
        stats: Vec<BattleStat>,
        stages: i8,
        #[serde(default = "always")]
        chance: u8,
    },
    InflictStatus {
        effect: StatusEffect,
        #[serde(default = "always")]
        chance: u8,
    },
    Flinch { chance: u8 },
    AddBattlerTag {
        tag: BattlerTagType,
        target: EffectTarget,
        #[serde(default)]
        turns: TagTurns,
        #[serde(default = "always")]
        chance: u8,
    },
    AddArenaTag {
        tag: ArenaTagType,
        side: EffectSide,
        #[serde(default)]
        turns: Option<u8>,
    },
    ClearArenaTags {
        tags: Vec<ArenaTagType>,
        side: EffectSide,
    },
    SetWeather(WeatherType),
    SetTerrain(TerrainType),
    /// Replaces the target's types until it leaves the field.
    SetType {
        target: EffectTarget,
        types: Vec<PokemonType>,
    },
    /// User takes `1/divisor` of the damage it dealt.
    Recoil { divisor: u16 },
    /// User recovers `percent` of the damage it dealt.
    Drain { percent: u8 },
    /// User recovers `percent` of its max HP.
    HealUser { percent: u8 },
    ForceSwitch,
    Recharge,
    SacrificeUser,

    // On miss
    /// User takes `1/divisor` of its max HP when the move misses.
    CrashOnMiss { divisor: u16 },
}

fn always() -> u8 {
    100
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MoveData {
    pub id: MoveId,
    pub name: String,
    pub move_type: PokemonType,
    pub category: MoveCategory,
    #[serde(default)]
    pub power: Option<u16>,
    #[serde(default)]
    pub accuracy: Option<u8>,
    pub pp: u8,
    #[serde(default)]
    pub priority: i8,
    #[serde(default)]
    pub target: MoveTarget,
    #[serde(default)]
    pub contact: bool,
    #[serde(default)]
    pub attrs: Vec<MoveAttr>,
}

impl MoveData {
    pub fn is_damaging(&self) -> bool {
        self.category != MoveCategory::Status
    }
}
