use serde::{Deserialize, Serialize};

use crate::pokemon::Combatant;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerAction {
    // The index refers to the move's position in the active combatant's move list.
    UseMove { move_index: usize },

    // The index refers to the combatant's position in the player's team.
    SwitchPokemon { team_index: usize },

    Forfeit,
}

impl PlayerAction {
    /// Action bracket: forfeits resolve before switches, switches before moves.
    pub fn action_priority(&self) -> i8 {
        match self {
            PlayerAction::Forfeit => 10,
            PlayerAction::SwitchPokemon { .. } => 6,
            PlayerAction::UseMove { .. } => 0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BattlePlayer {
    pub player_id: String,
    pub player_name: String,
    pub team: Vec<Combatant>,
    // Index into `team` of the combatant currently on the field.
    pub active_index: usize,
}

impl BattlePlayer {
    pub fn new(player_id: impl Into<String>, player_name: impl Into<String>, team: Vec<Combatant>) -> Self {
        BattlePlayer {
            player_id: player_id.into(),
            player_name: player_name.into(),
            team,
            active_index: 0,
        }
    }

    pub fn active(&self) -> Option<&Combatant> {
        self.team.get(self.active_index)
    }

    pub fn active_mut(&mut self) -> Option<&mut Combatant> {
        self.team.get_mut(self.active_index)
    }

    /// Whether any team member can still battle.
    pub fn has_healthy_members(&self) -> bool {
        self.team.iter().any(|c| !c.is_fainted())
    }

    /// Team indices that could be switched in right now.
    pub fn bench_indices(&self) -> Vec<usize> {
        self.team
            .iter()
            .enumerate()
            .filter(|(i, c)| *i != self.active_index && !c.is_fainted())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn first_healthy_bench(&self) -> Option<usize> {
        self.bench_indices().into_iter().next()
    }

    pub fn valid_moves(&self) -> Vec<PlayerAction> {
        match self.active() {
            Some(active) if !active.is_fainted() => active
                .moves
                .iter()
                .enumerate()
                .filter(|(_, slot)| slot.pp > 0)
                .map(|(move_index, _)| PlayerAction::UseMove { move_index })
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn valid_switches(&self) -> Vec<PlayerAction> {
        self.bench_indices()
            .into_iter()
            .map(|team_index| PlayerAction::SwitchPokemon { team_index })
            .collect()
    }
}
