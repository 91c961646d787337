use schema::{AbilityId, BattleStat, BattlerTagType, MoveId, PokemonType, Stat, StatusEffect};
use serde::{Deserialize, Serialize};

use crate::battle::state::BattlerRef;
use crate::battle::tags::BattlerTag;

/// One learned move and its remaining PP.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MoveSlot {
    pub id: MoveId,
    pub pp: u8,
    pub max_pp: u8,
}

impl MoveSlot {
    pub fn new(id: MoveId, max_pp: u8) -> Self {
        Self {
            id,
            pp: max_pp,
            max_pp,
        }
    }
}

/// A non-volatile status plus its counter.
///
/// The counter means "turns of sleep left" for `Sleep` and "ticks so far" for `Toxic`;
/// other effects ignore it.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    pub effect: StatusEffect,
    pub counter: u8,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbilitySlot {
    Primary,
    Secondary,
    Hidden,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AbilitySlots {
    pub primary: AbilityId,
    pub secondary: Option<AbilityId>,
    pub hidden: Option<AbilityId>,
    pub active: AbilitySlot,
}

impl AbilitySlots {
    pub fn single(primary: AbilityId) -> Self {
        Self {
            primary,
            secondary: None,
            hidden: None,
            active: AbilitySlot::Primary,
        }
    }

    /// The ability in the active slot, falling back to the primary one if that slot is empty.
    pub fn active(&self) -> AbilityId {
        match self.active {
            AbilitySlot::Primary => self.primary,
            AbilitySlot::Secondary => self.secondary.unwrap_or(self.primary),
            AbilitySlot::Hidden => self.hidden.unwrap_or(self.primary),
        }
    }

    pub fn all(&self) -> impl Iterator<Item = AbilityId> + '_ {
        std::iter::once(self.primary)
            .chain(self.secondary)
            .chain(self.hidden)
    }
}

/// Stage modifiers for every battle stat.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatStages([i8; BattleStat::COUNT]);

impl StatStages {
    pub fn get(&self, stat: BattleStat) -> i8 {
        self.0[stat.index()]
    }

    /// Applies `delta` and clamps to `-bound..=bound`. Returns the change that actually stuck.
    pub fn change(&mut self, stat: BattleStat, delta: i8, bound: i8) -> i8 {
        if delta.unsigned_abs() as i16 > 2 * bound as i16 {
            tracing::warn!(
                ?stat,
                delta,
                bound,
                "stage delta exceeds twice the bound, clamping"
            );
        }
        let old = self.get(stat);
        let new = (old as i16 + delta as i16).clamp(-(bound as i16), bound as i16) as i8;
        self.0[stat.index()] = new;
        new - old
    }

    /// Sum of all positive stages, used by moves that grow with boosts.
    pub fn positive_total(&self) -> u16 {
        self.0.iter().filter(|&&s| s > 0).map(|&s| s as u16).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = i8> + '_ {
        self.0.iter().copied()
    }
}

/// State that only lives while the combatant is on the field.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct SummonData {
    pub stages: StatStages,
    /// Held volatile tags, in the order they were applied.
    pub tags: Vec<BattlerTag>,
    pub type_override: Option<Vec<PokemonType>>,
}

/// Per-turn transient record, reset at the start of every turn.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct TurnData {
    pub acted: bool,
    pub move_used: Option<MoveId>,
    pub hits_taken: u8,
    pub damage_taken: u16,
    /// Last move hit taken this turn: who landed it and whether it made contact.
    pub last_hit_by: Option<(BattlerRef, bool)>,
}

/// One creature taking part in a battle.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Combatant {
    pub name: String,
    pub level: u8,
    pub types: Vec<PokemonType>,
    /// HP, Attack, Defense, Sp. Atk, Sp. Def, Speed
    pub stats: [u16; 6],
    hp: u16,
    pub abilities: AbilitySlots,
    pub moves: Vec<MoveSlot>,
    status: Option<Status>,
    pub summon: SummonData,
    pub turn: TurnData,
    /// Set once the faint has been fully processed by the scheduler.
    pub fainted: bool,
}

impl Combatant {
    pub fn new(
        name: impl Into<String>,
        level: u8,
        types: Vec<PokemonType>,
        stats: [u16; 6],
        ability: AbilityId,
        moves: Vec<MoveSlot>,
    ) -> Self {
        Self {
            name: name.into(),
            level,
            types,
            stats,
            hp: stats[Stat::Hp.index()],
            abilities: AbilitySlots::single(ability),
            moves,
            status: None,
            summon: SummonData::default(),
            turn: TurnData::default(),
            fainted: false,
        }
    }

    pub fn max_hp(&self) -> u16 {
        self.stats[Stat::Hp.index()]
    }

    pub fn current_hp(&self) -> u16 {
        self.hp
    }

    pub fn is_fainted(&self) -> bool {
        self.hp == 0
    }

    pub fn is_full_hp(&self) -> bool {
        self.hp == self.max_hp()
    }

    pub fn set_hp(&mut self, hp: u16) {
        self.hp = hp.min(self.max_hp());
    }

    /// HP as a percentage of max, rounded down.
    pub fn hp_percent(&self) -> u8 {
        if self.max_hp() == 0 {
            return 0;
        }
        ((self.hp as u32 * 100) / self.max_hp() as u32) as u8
    }

    /// Removes up to `amount` HP and returns how much was actually lost.
    pub fn take_damage(&mut self, amount: u16) -> u16 {
        let dealt = amount.min(self.hp);
        self.hp -= dealt;
        dealt
    }

    /// Restores up to `amount` HP and returns how much was actually gained.
    /// A fainted combatant cannot be healed.
    pub fn heal(&mut self, amount: u16) -> u16 {
        if self.is_fainted() {
            return 0;
        }
        let healed = amount.min(self.max_hp() - self.hp);
        self.hp += healed;
        healed
    }

    pub fn status(&self) -> Option<Status> {
        self.status
    }

    pub fn has_status(&self, effect: StatusEffect) -> bool {
        matches!(self.status, Some(s) if s.effect == effect)
    }

    /// Sets a status if none is held. Returns `false` if one already was.
    pub fn set_status(&mut self, effect: StatusEffect, counter: u8) -> bool {
        if self.status.is_some() {
            return false;
        }
        self.status = Some(Status { effect, counter });
        true
    }

    pub fn cure_status(&mut self) -> Option<StatusEffect> {
        self.status.take().map(|s| s.effect)
    }

    pub fn status_mut(&mut self) -> Option<&mut Status> {
        self.status.as_mut()
    }

    pub fn current_types(&self) -> &[PokemonType] {
        self.summon.type_override.as_deref().unwrap_or(&self.types)
    }

    pub fn has_type(&self, pokemon_type: PokemonType) -> bool {
        self.current_types().contains(&pokemon_type)
    }

    pub fn active_ability(&self) -> AbilityId {
        self.abilities.active()
    }

    pub fn stage(&self, stat: BattleStat) -> i8 {
        self.summon.stages.get(stat)
    }

    pub fn tag(&self, tag_type: BattlerTagType) -> Option<&BattlerTag> {
        self.summon.tags.iter().find(|t| t.tag_type == tag_type)
    }

    pub fn has_tag(&self, tag_type: BattlerTagType) -> bool {
        self.tag(tag_type).is_some()
    }

    pub fn move_slot(&self, index: usize) -> Option<&MoveSlot> {
        self.moves.get(index)
    }

    /// Spends one PP. Returns `false` if the slot is missing or empty.
    pub fn use_pp(&mut self, index: usize) -> bool {
        match self.moves.get_mut(index) {
            Some(slot) if slot.pp > 0 => {
                slot.pp -= 1;
                true
            }
            _ => false,
        }
    }

    /// Forgets everything tied to being on the field.
    pub fn clear_summon_data(&mut self) {
        self.summon = SummonData::default();
    }

    pub fn reset_turn_data(&mut self) {
        self.turn = TurnData::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Combatant {
        Combatant::new(
            "Sample",
            50,
            vec![PokemonType::Normal],
            [100, 50, 50, 50, 50, 50],
            AbilityId(0),
            vec![MoveSlot::new(MoveId(1), 2)],
        )
    }

    #[test]
    fn test_hp_never_goes_negative() {
        let mut c = sample();
        assert_eq!(c.take_damage(30), 30);
        assert_eq!(c.take_damage(500), 70);
        assert_eq!(c.current_hp(), 0);
        assert!(c.is_fainted());
        assert_eq!(c.heal(50), 0);
    }

    #[test]
    fn test_heal_caps_at_max() {
        let mut c = sample();
        c.set_hp(90);
        assert_eq!(c.heal(50), 10);
        assert!(c.is_full_hp());
    }

    #[test]
    fn test_only_one_status_at_a_time() {
        let mut c = sample();
        assert!(c.set_status(StatusEffect::Burn, 0));
        assert!(!c.set_status(StatusEffect::Paralysis, 0));
        assert!(c.has_status(StatusEffect::Burn));
        assert_eq!(c.cure_status(), Some(StatusEffect::Burn));
        assert!(c.set_status(StatusEffect::Paralysis, 0));
    }

    #[test]
    fn test_stage_changes_clamp_to_bound() {
        let mut stages = StatStages::default();
        assert_eq!(stages.change(BattleStat::Attack, 4, 6), 4);
        assert_eq!(stages.change(BattleStat::Attack, 4, 6), 2);
        assert_eq!(stages.change(BattleStat::Attack, 1, 6), 0);
        assert_eq!(stages.get(BattleStat::Attack), 6);
        assert_eq!(stages.change(BattleStat::Attack, -20, 6), -12);
        assert_eq!(stages.get(BattleStat::Attack), -6);
    }

    #[test]
    fn test_positive_total_ignores_drops() {
        let mut stages = StatStages::default();
        stages.change(BattleStat::Attack, 2, 6);
        stages.change(BattleStat::Speed, 1, 6);
        stages.change(BattleStat::Defense, -3, 6);
        assert_eq!(stages.positive_total(), 3);
    }

    #[test]
    fn test_pp_runs_out() {
        let mut c = sample();
        assert!(c.use_pp(0));
        assert!(c.use_pp(0));
        assert!(!c.use_pp(0));
        assert!(!c.use_pp(3));
    }

    #[test]
    fn test_type_override_replaces_types() {
        let mut c = sample();
        c.summon.type_override = Some(vec![PokemonType::Ghost]);
        assert!(c.has_type(PokemonType::Ghost));
        assert!(!c.has_type(PokemonType::Normal));
        c.clear_summon_data();
        assert!(c.has_type(PokemonType::Normal));
    }
}
