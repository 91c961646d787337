use tracing::debug;

use crate::battle::ai::Behavior;
use crate::battle::engine::{Battle, RunStatus};
use crate::battle::state::{BattleEvent, BattleOutcome, BattleState, GameState, Side};
use crate::errors::{ActionError, BattleResult};
use crate::player::PlayerAction;
use crate::sinks::AnimationTicket;

/// High-level battle management interface.
/// Collects one action per side, validates it, and runs the turn once both are in.
pub struct BattleRunner {
    battle: Battle,
    pending_actions: [Option<PlayerAction>; 2],
}

/// Result of executing a battle turn or resuming one
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionResult {
    /// Events raised by this call, in order.
    pub events: Vec<BattleEvent>,
    pub game_state: GameState,
    pub status: RunStatus,
}

impl ExecutionResult {
    pub fn outcome(&self) -> Option<BattleOutcome> {
        match self.game_state {
            GameState::Finished(outcome) => Some(outcome),
            _ => None,
        }
    }
}

impl BattleRunner {
    pub fn new(battle: Battle) -> Self {
        Self {
            battle,
            pending_actions: [None, None],
        }
    }

    pub fn battle(&self) -> &Battle {
        &self.battle
    }

    pub fn battle_mut(&mut self) -> &mut Battle {
        &mut self.battle
    }

    pub fn state(&self) -> &BattleState {
        self.battle.state()
    }

    pub fn game_state(&self) -> GameState {
        self.battle.state().game_state
    }

    pub fn is_battle_ended(&self) -> bool {
        self.battle.state().is_over()
    }

    /// Sends out both leads.
    pub fn start(&mut self) -> BattleResult<ExecutionResult> {
        self.execute(|battle| battle.start())
    }

    /// Submit an action for a side.
    /// Runs the turn as soon as both sides have an action in.
    pub fn submit_action(
        &mut self,
        side: Side,
        action: PlayerAction,
    ) -> BattleResult<Option<ExecutionResult>> {
        if self.battle.awaiting().is_some()
            || self.game_state() != GameState::WaitingForActions
        {
            return Err(ActionError::NotAcceptingActions.into());
        }
        if self.pending_actions[side.index()].is_some() {
            return Err(ActionError::AlreadySubmitted(side).into());
        }
        validate_action(self.battle.state(), side, &action)?;
        debug!(?side, ?action, "action accepted");
        self.pending_actions[side.index()] = Some(action);

        if !self.players_needing_actions().is_empty() {
            return Ok(None);
        }
        let actions: Vec<(Side, PlayerAction)> = [Side::Player, Side::Enemy]
            .into_iter()
            .filter_map(|side| self.pending_actions[side.index()].take().map(|a| (side, a)))
            .collect();
        self.execute(|battle| battle.play_turn(&actions)).map(Some)
    }

    /// Sides that still owe an action this turn.
    pub fn players_needing_actions(&self) -> Vec<Side> {
        if self.game_state() != GameState::WaitingForActions {
            return Vec::new();
        }
        [Side::Player, Side::Enemy]
            .into_iter()
            .filter(|side| self.pending_actions[side.index()].is_none())
            .collect()
    }

    /// Lets `behavior` choose for every side that still needs an action.
    pub fn auto_submit(
        &mut self,
        behavior: &dyn Behavior,
    ) -> BattleResult<Option<ExecutionResult>> {
        let mut result = None;
        for side in self.players_needing_actions() {
            let action = behavior.decide_action(side, &mut self.battle)?;
            result = self.submit_action(side, action)?;
        }
        Ok(result)
    }

    pub fn resume(&mut self, ticket: AnimationTicket) -> BattleResult<ExecutionResult> {
        self.execute(|battle| battle.resume(ticket))
    }

    pub fn events(&self) -> &[BattleEvent] {
        self.battle.events().events()
    }

    /// Events since a certain index, for incremental updates.
    pub fn events_since(&self, index: usize) -> &[BattleEvent] {
        self.battle.events().since(index)
    }

    fn execute<F>(&mut self, run: F) -> BattleResult<ExecutionResult>
    where
        F: FnOnce(&mut Battle) -> BattleResult<RunStatus>,
    {
        let first_event = self.battle.events().len();
        let status = run(&mut self.battle)?;
        Ok(ExecutionResult {
            events: self.battle.events().since(first_event).to_vec(),
            game_state: self.battle.state().game_state,
            status,
        })
    }
}

/// Detailed action validation against the submitting side's team.
pub fn validate_action(
    state: &BattleState,
    side: Side,
    action: &PlayerAction,
) -> Result<(), ActionError> {
    let player = state.player(side);
    match action {
        PlayerAction::UseMove { move_index } => {
            let slot = player
                .active()
                .and_then(|active| active.move_slot(*move_index))
                .ok_or(ActionError::InvalidMoveIndex(*move_index))?;
            if slot.pp == 0 {
                return Err(ActionError::NoPpLeft(*move_index));
            }
            Ok(())
        }
        PlayerAction::SwitchPokemon { team_index } => {
            let member = player
                .team
                .get(*team_index)
                .ok_or(ActionError::InvalidTeamIndex(*team_index))?;
            if *team_index == player.active_index || member.is_fainted() {
                return Err(ActionError::CannotSwitchTo(*team_index));
            }
            Ok(())
        }
        PlayerAction::Forfeit => Ok(()),
    }
}
