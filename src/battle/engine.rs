//! The battle scheduler: owns the state and queue and runs phases one at a time.

use std::collections::VecDeque;
use std::sync::Arc;

use schema::LapsePoint;
use tracing::{debug, error, info};

use crate::battle::attributes::MoveScratch;
use crate::battle::context::{BattleCtx, PresentationCue};
use crate::battle::phase_queue::PhaseQueue;
use crate::battle::phases::{preview_hit, Phase, SwitchReason};
use crate::battle::runner::validate_action;
use crate::battle::state::{
    BattleEvent, BattleOutcome, BattleState, BattlerRef, EventBus, GameState, Side,
};
use crate::battle::stats::effective_speed;
use crate::battle::turn_order::order_actions;
use crate::catalog::Catalog;
use crate::config::BattleConfig;
use crate::errors::{ActionError, BattleEngineError, BattleResult, BattleStateError, CatalogError};
use crate::player::PlayerAction;
use crate::rng::{BattleRng, SeededRng};
use crate::sinks::{
    AnimationRef, AnimationTicket, Completion, HeadlessSink, PersistenceSink, PresentationSink,
};

/// Where a call to [`Battle::run`] stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// The queue drained and the battle is waiting for the next turn's actions.
    TurnComplete,
    /// A presentation callback is outstanding; call [`Battle::resume`] with the ticket.
    Suspended(AnimationTicket),
    BattleOver(BattleOutcome),
}

/// Result of a single [`Battle::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Ran(&'static str),
    Idle,
    Suspended(AnimationTicket),
    Finished(BattleOutcome),
}

pub struct Battle {
    state: BattleState,
    queue: PhaseQueue,
    bus: EventBus,
    rng: Box<dyn BattleRng>,
    catalog: Arc<dyn Catalog>,
    config: BattleConfig,
    presentation: Box<dyn PresentationSink>,
    persistence: Box<dyn PersistenceSink>,
    cues: Vec<PresentationCue>,
    pending_cues: VecDeque<PresentationCue>,
    awaiting: Option<AnimationTicket>,
    // How many events have been handed to the presentation sink.
    forwarded: usize,
    outcome_recorded: bool,
}

impl Battle {
    /// Validates the configuration and that every move and ability on both teams exists
    /// in the catalog. The random stream defaults to one seeded from `config.seed`.
    pub fn new(
        state: BattleState,
        catalog: Arc<dyn Catalog>,
        config: BattleConfig,
    ) -> BattleResult<Self> {
        config.validate()?;
        for side in [Side::Player, Side::Enemy] {
            let player = state.player(side);
            if player.team.is_empty() {
                return Err(BattleStateError::EmptyTeam(side).into());
            }
            for combatant in &player.team {
                for slot in &combatant.moves {
                    catalog
                        .move_data(slot.id)
                        .ok_or(CatalogError::MoveNotFound(slot.id))?;
                }
                for ability in combatant.abilities.all() {
                    catalog
                        .ability_data(ability)
                        .ok_or(CatalogError::AbilityNotFound(ability))?;
                }
            }
        }

        Ok(Self {
            rng: Box::new(SeededRng::new(config.seed)),
            state,
            queue: PhaseQueue::new(),
            bus: EventBus::new(),
            catalog,
            config,
            presentation: Box::new(HeadlessSink),
            persistence: Box::new(HeadlessSink),
            cues: Vec::new(),
            pending_cues: VecDeque::new(),
            awaiting: None,
            forwarded: 0,
            outcome_recorded: false,
        })
    }

    pub fn with_rng(mut self, rng: impl BattleRng + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    pub fn with_presentation(mut self, sink: impl PresentationSink + 'static) -> Self {
        self.presentation = Box::new(sink);
        self
    }

    pub fn with_persistence(mut self, sink: impl PersistenceSink + 'static) -> Self {
        self.persistence = Box::new(sink);
        self
    }

    pub fn state(&self) -> &BattleState {
        &self.state
    }

    pub fn events(&self) -> &EventBus {
        &self.bus
    }

    pub fn queue(&self) -> &PhaseQueue {
        &self.queue
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn catalog(&self) -> &dyn Catalog {
        self.catalog.as_ref()
    }

    pub fn awaiting(&self) -> Option<AnimationTicket> {
        self.awaiting
    }

    /// Test hook for putting a combatant into a specific situation before a turn runs.
    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut BattleState {
        &mut self.state
    }

    #[cfg(test)]
    pub(crate) fn queue_mut(&mut self) -> &mut PhaseQueue {
        &mut self.queue
    }

    /// Runs `f` against a context over the live battle, for tests that drive a single
    /// operation directly.
    #[cfg(test)]
    pub(crate) fn with_ctx<R>(&mut self, simulated: bool, f: impl FnOnce(&mut BattleCtx) -> R) -> R {
        let mut ctx = BattleCtx {
            state: &mut self.state,
            queue: &mut self.queue,
            bus: &mut self.bus,
            rng: self.rng.as_mut(),
            catalog: self.catalog.as_ref(),
            config: &self.config,
            cues: &mut self.cues,
            simulated,
        };
        let out = f(&mut ctx);
        self.queue.flush_prepended();
        out
    }

    fn ensure_usable(&self) -> BattleResult<()> {
        if self.state.game_state == GameState::Aborted {
            return Err(BattleEngineError::Aborted);
        }
        Ok(())
    }

    fn abort(&mut self, err: BattleEngineError) -> BattleEngineError {
        error!(battle = %self.state.battle_id, error = %err, "battle aborted");
        self.state.game_state = GameState::Aborted;
        self.queue.clear();
        self.pending_cues.clear();
        self.awaiting = None;
        err
    }

    /// Sends out both leads and resolves their arrival effects.
    pub fn start(&mut self) -> BattleResult<RunStatus> {
        self.ensure_usable()?;
        if self.state.game_state != GameState::NotStarted {
            return Err(ActionError::NotAcceptingActions.into());
        }
        info!(battle = %self.state.battle_id, "battle starting");

        for side in [Side::Player, Side::Enemy] {
            let player = self.state.player(side);
            let lead_ok = player.active().map(|c| !c.is_fainted()).unwrap_or(false);
            if !lead_ok {
                let healthy = player.team.iter().position(|c| !c.is_fainted());
                match healthy {
                    Some(slot) => self.state.player_mut(side).active_index = slot,
                    None => {
                        let err = BattleStateError::NoActiveCombatant(side).into();
                        return Err(self.abort(err));
                    }
                }
            }
        }

        let leads = self.sides_by_speed();
        for side in leads {
            let battler = self.state.active_ref(side);
            self.bus.push(BattleEvent::SentOut { battler });
            self.cues
                .push(PresentationCue::Animation(AnimationRef::SendOut(battler)));
            self.queue.push_back(Phase::PostSummon { battler });
        }
        self.state.game_state = GameState::TurnInProgress;
        self.run()
    }

    /// Both sides in effective speed order. The player goes first on a tie.
    fn sides_by_speed(&self) -> [Side; 2] {
        let speed = |side: Side| {
            effective_speed(
                &self.state,
                self.catalog.as_ref(),
                &self.config,
                self.state.active_ref(side),
            )
        };
        if speed(Side::Enemy) > speed(Side::Player) {
            [Side::Enemy, Side::Player]
        } else {
            [Side::Player, Side::Enemy]
        }
    }

    /// Seeds a new turn from one action per side and runs it.
    pub fn play_turn(&mut self, actions: &[(Side, PlayerAction)]) -> BattleResult<RunStatus> {
        self.ensure_usable()?;
        if let Some(ticket) = self.awaiting {
            debug!(?ticket, "turn submitted while suspended");
            return Err(self.abort(BattleStateError::Suspended.into()));
        }
        if self.state.game_state != GameState::WaitingForActions {
            return Err(ActionError::NotAcceptingActions.into());
        }
        // Rejected actions leave the battle waiting for a corrected submission.
        for (side, action) in actions {
            validate_action(&self.state, *side, action)?;
        }

        self.state.turn_number += 1;
        let turn_number = self.state.turn_number;
        info!(battle = %self.state.battle_id, turn_number, "turn started");
        self.bus.push(BattleEvent::TurnStarted { turn_number });
        for player in self.state.players.iter_mut() {
            for combatant in player.team.iter_mut() {
                combatant.reset_turn_data();
            }
        }

        let ordered = match order_actions(
            &self.state,
            self.catalog.as_ref(),
            &self.config,
            self.rng.as_mut(),
            actions,
        ) {
            Ok(ordered) => ordered,
            Err(err) => return Err(self.abort(err)),
        };
        for (side, action) in ordered {
            let phase = match action {
                PlayerAction::UseMove { move_index } => Phase::Move {
                    user: self.state.active_ref(side),
                    move_index,
                },
                PlayerAction::SwitchPokemon { team_index } => Phase::Switch {
                    side,
                    to_slot: team_index,
                    reason: SwitchReason::Voluntary,
                },
                PlayerAction::Forfeit => Phase::Forfeit { side },
            };
            self.queue.push_back(phase);
        }
        self.queue_residuals();

        self.state.game_state = GameState::TurnInProgress;
        self.run()
    }

    /// End-of-turn phases. They name the combatants active now and are retargeted by
    /// any switch that happens before they run.
    fn queue_residuals(&mut self) {
        self.queue.push_back(Phase::FieldTick);
        for side in self.sides_by_speed() {
            let battler = self.state.active_ref(side);
            self.queue.push_back(Phase::StatusTick { battler });
            self.queue.push_back(Phase::TagLapse {
                battler,
                point: LapsePoint::TurnEnd,
            });
            self.queue.push_back(Phase::TurnEndAbilities { battler });
        }
        self.queue.push_back(Phase::ArenaTagLapse);
        self.queue.push_back(Phase::TurnEnd);
    }

    /// Runs phases until the turn completes, the battle ends, or presentation asks the
    /// battle to wait.
    pub fn run(&mut self) -> BattleResult<RunStatus> {
        loop {
            match self.step()? {
                StepOutcome::Ran(_) => continue,
                StepOutcome::Idle => return Ok(RunStatus::TurnComplete),
                StepOutcome::Suspended(ticket) => return Ok(RunStatus::Suspended(ticket)),
                StepOutcome::Finished(outcome) => return Ok(RunStatus::BattleOver(outcome)),
            }
        }
    }

    /// Runs exactly one phase.
    pub fn step(&mut self) -> BattleResult<StepOutcome> {
        self.ensure_usable()?;
        if let Some(ticket) = self.awaiting {
            return Ok(StepOutcome::Suspended(ticket));
        }
        if let GameState::Finished(outcome) = self.state.game_state {
            return Ok(StepOutcome::Finished(outcome));
        }
        let Some(phase) = self.queue.pop_front() else {
            if self.state.game_state == GameState::TurnInProgress {
                self.state.game_state = GameState::WaitingForActions;
            }
            return Ok(StepOutcome::Idle);
        };

        let name = phase.name();
        let result = {
            let mut ctx = BattleCtx {
                state: &mut self.state,
                queue: &mut self.queue,
                bus: &mut self.bus,
                rng: self.rng.as_mut(),
                catalog: self.catalog.as_ref(),
                config: &self.config,
                cues: &mut self.cues,
                simulated: false,
            };
            phase.execute(&mut ctx)
        };
        if let Err(err) = result {
            return Err(self.abort(err));
        }
        self.queue.flush_prepended();
        self.forward_messages();

        if let GameState::Finished(outcome) = self.state.game_state {
            if !self.outcome_recorded {
                info!(battle = %self.state.battle_id, ?outcome, "battle finished");
                self.persistence.record_outcome(&outcome);
                self.outcome_recorded = true;
            }
        }
        if let Some(ticket) = self.deliver_cues() {
            return Ok(StepOutcome::Suspended(ticket));
        }
        if let GameState::Finished(outcome) = self.state.game_state {
            return Ok(StepOutcome::Finished(outcome));
        }
        Ok(StepOutcome::Ran(name))
    }

    fn forward_messages(&mut self) {
        for event in self.bus.since(self.forwarded) {
            if let Some(text) = event.format(&self.state) {
                self.presentation.queue_message(&text);
            }
        }
        self.forwarded = self.bus.len();
    }

    /// Hands queued cues to presentation until one completes later.
    fn deliver_cues(&mut self) -> Option<AnimationTicket> {
        self.pending_cues.extend(self.cues.drain(..));
        while let Some(cue) = self.pending_cues.pop_front() {
            let completion = match cue {
                PresentationCue::Animation(animation) => {
                    self.presentation.play_animation(animation)
                }
                PresentationCue::Faint(battler) => self.presentation.show_faint_animation(battler),
            };
            if let Completion::Pending(ticket) = completion {
                debug!(?ticket, "waiting on presentation");
                self.awaiting = Some(ticket);
                return Some(ticket);
            }
        }
        None
    }

    /// Continues after presentation finished the animation behind `ticket`.
    pub fn resume(&mut self, ticket: AnimationTicket) -> BattleResult<RunStatus> {
        self.ensure_usable()?;
        match self.awaiting {
            Some(expected) if expected == ticket => {
                self.awaiting = None;
                if let Some(next) = self.deliver_cues() {
                    return Ok(RunStatus::Suspended(next));
                }
                self.run()
            }
            expected => {
                let err = BattleStateError::UnexpectedResume {
                    expected,
                    got: ticket,
                };
                Err(self.abort(err.into()))
            }
        }
    }

    /// Predicts the first hit of the move in `move_index` for `side`'s active combatant
    /// against its current opponent, without changing anything the real battle sees.
    pub fn preview_move(&mut self, side: Side, move_index: usize) -> BattleResult<MoveScratch> {
        self.ensure_usable()?;
        let user: BattlerRef = self.state.active_ref(side);
        let move_id = self
            .state
            .combatant(user)?
            .move_slot(move_index)
            .map(|slot| slot.id)
            .ok_or(ActionError::InvalidMoveIndex(move_index))?;
        let catalog = self.catalog.as_ref();
        let move_data = catalog
            .move_data(move_id)
            .ok_or(CatalogError::MoveNotFound(move_id))?;

        let mut queue = PhaseQueue::new();
        let mut bus = EventBus::new();
        let mut cues = Vec::new();
        let mut ctx = BattleCtx {
            state: &mut self.state,
            queue: &mut queue,
            bus: &mut bus,
            rng: self.rng.as_mut(),
            catalog,
            config: &self.config,
            cues: &mut cues,
            simulated: true,
        };
        preview_hit(&mut ctx, user, move_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::tests::common::{player_lead, started_battle, TestCombatantBuilder};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn two_member_battle() -> Battle {
        started_battle(
            vec![
                TestCombatantBuilder::new("Lead").moves(&["Tackle"]).build(),
                TestCombatantBuilder::new("Bench").moves(&["Tackle"]).build(),
            ],
            vec![TestCombatantBuilder::new("Foe").moves(&["Tackle"]).build()],
            vec![],
        )
    }

    #[rstest]
    #[case(PlayerAction::UseMove { move_index: 3 }, ActionError::InvalidMoveIndex(3))]
    #[case(PlayerAction::SwitchPokemon { team_index: 5 }, ActionError::InvalidTeamIndex(5))]
    #[case(PlayerAction::SwitchPokemon { team_index: 0 }, ActionError::CannotSwitchTo(0))]
    fn test_invalid_action_is_rejected_without_aborting(
        #[case] action: PlayerAction,
        #[case] expected: ActionError,
    ) {
        // Arrange
        let mut battle = two_member_battle();
        let events_before = battle.events().len();

        // Act
        let err = battle
            .play_turn(&[
                (Side::Player, action),
                (Side::Enemy, PlayerAction::UseMove { move_index: 0 }),
            ])
            .unwrap_err();

        // Assert: nothing ran and the battle still takes actions
        assert_eq!(err, BattleEngineError::Action(expected));
        assert_eq!(battle.state().game_state, GameState::WaitingForActions);
        assert_eq!(battle.state().turn_number, 0);
        assert_eq!(battle.events().len(), events_before);

        let status = battle
            .play_turn(&[
                (Side::Player, PlayerAction::UseMove { move_index: 0 }),
                (Side::Enemy, PlayerAction::UseMove { move_index: 0 }),
            ])
            .unwrap();
        assert_eq!(status, RunStatus::TurnComplete);
        assert_eq!(battle.state().turn_number, 1);
    }

    #[test]
    fn test_move_without_pp_is_rejected() {
        let mut battle = two_member_battle();
        battle
            .state_mut()
            .combatant_mut(player_lead())
            .unwrap()
            .moves[0]
            .pp = 0;

        let err = battle
            .play_turn(&[(Side::Player, PlayerAction::UseMove { move_index: 0 })])
            .unwrap_err();

        assert_eq!(err, BattleEngineError::Action(ActionError::NoPpLeft(0)));
        assert_ne!(battle.state().game_state, GameState::Aborted);
    }

    #[test]
    fn test_second_start_is_refused() {
        let mut battle = two_member_battle();

        let err = battle.start().unwrap_err();

        assert_eq!(err, BattleEngineError::Action(ActionError::NotAcceptingActions));
        assert_eq!(battle.state().game_state, GameState::WaitingForActions);
    }
}
