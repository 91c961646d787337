use serde::{Deserialize, Serialize};

use crate::battle_data::{BattleStat, BattlerTagType, EffectTarget, StatusEffect, TerrainType, WeatherType};
use crate::move_types::MoveCategory;
use crate::pokemon_types::PokemonType;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct AbilityId(pub u16);

/// Predicates that gate an ability attribute. All listed conditions must hold.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AbilityCondition {
    Weather(WeatherType),
    HolderHpBelowPercent(u8),
    HolderAtFullHp,
    MoveType(PokemonType),
    MoveCategory(MoveCategory),
    Contact,
    SuperEffective,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum AbilityAttr {
    // Attacking
    PowerBoost {
        multiplier: f64,
        #[serde(default)]
        conditions: Vec<AbilityCondition>,
    },
    /// Moves of type `from` become `to` and gain a power multiplier.
    TypeConversion {
        from: PokemonType,
        to: PokemonType,
        multiplier: f64,
    },
    StabBoost { multiplier: f64 },
    IgnoreTypeImmunity { types: Vec<PokemonType> },
    AlwaysHit,
    CritDamage { multiplier: f64 },

    // Defending
    /// Absorbs moves of a type, optionally healing or raising a stat.
    TypeImmunity {
        move_type: PokemonType,
        #[serde(default)]
        heal_percent: u8,
        #[serde(default)]
        stat_boost: Option<(BattleStat, i8)>,
    },
    /// Not grounded: immune to Ground moves, hazards and terrain.
    Airborne,
    DamageReduction {
        multiplier: f64,
        #[serde(default)]
        conditions: Vec<AbilityCondition>,
    },
    BlockCrit,
    SurviveAtFullHp,
    ContactStatus { effect: StatusEffect, chance: u8 },
    PostDefendStatChange {
        stat: BattleStat,
        stages: i8,
        #[serde(default)]
        conditions: Vec<AbilityCondition>,
    },
    StatusImmunity(Vec<StatusEffect>),
    TagImmunity(Vec<BattlerTagType>),
    BlockStatDrops,
    WeatherDamageImmunity,
    /// Damages a contact attacker by `1/divisor` of its max HP when the holder faints.
    AftermathOnFaint { divisor: u16 },

    // Summon
    PostSummonStatChange {
        stat: BattleStat,
        stages: i8,
        target: EffectTarget,
    },
    PostSummonWeather(WeatherType),
    PostSummonTerrain(TerrainType),

    // End of turn
    TurnEndStatChange { stat: BattleStat, stages: i8 },
    TurnEndHeal {
        percent: u8,
        #[serde(default)]
        weather: Option<WeatherType>,
    },

    // Turn order
    WeatherSpeed { weather: WeatherType, multiplier: f64 },
    PriorityBoost { category: MoveCategory, delta: i8 },
    /// Always acts first within its priority bracket.
    BypassSpeed,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AbilityData {
    pub id: AbilityId,
    pub name: String,
    #[serde(default)]
    pub attrs: Vec<AbilityAttr>,
}
