use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Permanent stats, in the order they are stored on a combatant.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum Stat {
    #[strum(to_string = "HP")]
    Hp,
    Attack,
    Defense,
    #[strum(to_string = "Sp. Atk")]
    SpecialAttack,
    #[strum(to_string = "Sp. Def")]
    SpecialDefense,
    Speed,
}

impl Stat {
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Stats that carry an in-battle stage modifier.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum BattleStat {
    Attack,
    Defense,
    #[strum(to_string = "Sp. Atk")]
    SpecialAttack,
    #[strum(to_string = "Sp. Def")]
    SpecialDefense,
    Speed,
    Accuracy,
    Evasion,
}

impl BattleStat {
    pub const COUNT: usize = 7;

    pub fn index(self) -> usize {
        self as usize
    }

    /// The permanent stat this stage scales, if any.
    pub fn base_stat(self) -> Option<Stat> {
        match self {
            BattleStat::Attack => Some(Stat::Attack),
            BattleStat::Defense => Some(Stat::Defense),
            BattleStat::SpecialAttack => Some(Stat::SpecialAttack),
            BattleStat::SpecialDefense => Some(Stat::SpecialDefense),
            BattleStat::Speed => Some(Stat::Speed),
            BattleStat::Accuracy | BattleStat::Evasion => None,
        }
    }
}

/// Non-volatile status conditions. A combatant holds at most one.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum StatusEffect {
    Poison,
    #[strum(to_string = "Bad Poison")]
    Toxic,
    Paralysis,
    Sleep,
    Freeze,
    Burn,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum WeatherType {
    #[strum(to_string = "Harsh Sunlight")]
    Sunny,
    Rain,
    Sandstorm,
    Hail,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum TerrainType {
    #[strum(to_string = "Electric Terrain")]
    Electric,
    #[strum(to_string = "Grassy Terrain")]
    Grassy,
    #[strum(to_string = "Psychic Terrain")]
    Psychic,
    #[strum(to_string = "Misty Terrain")]
    Misty,
}

/// Volatile conditions attached to a single combatant. Cleared on switch-out.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum BattlerTagType {
    Flinched,
    Confused,
    Protected,
    Endure,
    Recharging,
    Seeded,
    Bound,
    #[strum(to_string = "Perish Song")]
    PerishSong,
    Drowsy,
    Charged,
    Focused,
    /// Immunity to one non-volatile status.
    StatusGuard(StatusEffect),
}

/// Conditions attached to a side of the field, or to the whole field.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum ArenaTagType {
    Spikes,
    #[strum(to_string = "Toxic Spikes")]
    ToxicSpikes,
    #[strum(to_string = "Stealth Rock")]
    StealthRock,
    Reflect,
    #[strum(to_string = "Light Screen")]
    LightScreen,
    Mist,
    Safeguard,
    Tailwind,
    #[strum(to_string = "Trick Room")]
    TrickRoom,
}

impl ArenaTagType {
    pub fn is_entry_hazard(self) -> bool {
        matches!(
            self,
            ArenaTagType::Spikes | ArenaTagType::ToxicSpikes | ArenaTagType::StealthRock
        )
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ArenaTagSide {
    Player,
    Enemy,
    Both,
}

/// Named moments in a turn at which held tags are evaluated.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum LapsePoint {
    PreMove,
    AfterMove,
    TurnEnd,
}

/// Which combatant an effect lands on, relative to whoever owns it.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectTarget {
    User,
    Target,
}

/// Which side of the field an effect lands on, relative to whoever owns it.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectSide {
    User,
    Target,
    Both,
}

/// How long a newly applied tag lasts.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TagTurns {
    /// Lasts until removed by its own lapse behaviour or by an explicit remover.
    #[default]
    Indefinite,
    Fixed(u8),
    /// Inclusive range, rolled when the tag is applied.
    Between(u8, u8),
}
