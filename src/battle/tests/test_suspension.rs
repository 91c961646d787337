#[cfg(test)]
mod tests {
    use crate::battle::engine::{Battle, RunStatus, StepOutcome};
    use crate::battle::state::{GameState, Side};
    use crate::battle::tests::common::{demo_battle, TestCombatantBuilder};
    use crate::errors::{BattleEngineError, BattleStateError};
    use crate::player::PlayerAction;
    use crate::sinks::{AnimationRef, AnimationTicket, RecordingSink};
    use pretty_assertions::assert_eq;

    fn deferred_battle(sink: &RecordingSink) -> Battle {
        demo_battle(
            vec![TestCombatantBuilder::new("Lead").moves(&["Tackle"]).speed(90).build()],
            vec![TestCombatantBuilder::new("Foe").moves(&["Tackle"]).speed(10).build()],
        )
        .with_presentation(sink.clone())
    }

    /// Resumes every outstanding ticket until the battle stops waiting.
    fn drain(battle: &mut Battle, mut status: RunStatus) -> (RunStatus, usize) {
        let mut resumes = 0;
        while let RunStatus::Suspended(ticket) = status {
            status = battle.resume(ticket).unwrap();
            resumes += 1;
        }
        (status, resumes)
    }

    #[test]
    fn test_deferred_animation_suspends_start() {
        // Arrange
        let sink = RecordingSink::deferring();
        let mut battle = deferred_battle(&sink);

        // Act
        let status = battle.start().unwrap();

        // Assert: the first send-out is outstanding and nothing runs until it completes
        assert_eq!(status, RunStatus::Suspended(AnimationTicket(1)));
        assert_eq!(battle.awaiting(), Some(AnimationTicket(1)));
        assert_eq!(battle.step().unwrap(), StepOutcome::Suspended(AnimationTicket(1)));
        assert_eq!(sink.log().animations.len(), 1);
    }

    #[test]
    fn test_resuming_each_ticket_completes_the_turn() {
        // Arrange
        let sink = RecordingSink::deferring();
        let mut battle = deferred_battle(&sink);
        let status = battle.start().unwrap();

        // Act
        let (status, resumes) = drain(&mut battle, status);

        // Assert
        assert_eq!(status, RunStatus::TurnComplete);
        assert_eq!(resumes, 2);
        assert_eq!(battle.state().game_state, GameState::WaitingForActions);
        let log = sink.log();
        assert_eq!(
            log.animations,
            vec![
                AnimationRef::SendOut(battle.state().active_ref(Side::Player)),
                AnimationRef::SendOut(battle.state().active_ref(Side::Enemy)),
            ]
        );
        assert_eq!(log.tickets_issued, vec![AnimationTicket(1), AnimationTicket(2)]);
        assert_eq!(log.messages, battle.events().formatted(battle.state()));

        // A full turn also runs to completion once every animation is acknowledged.
        let status = battle
            .play_turn(&[
                (Side::Player, PlayerAction::UseMove { move_index: 0 }),
                (Side::Enemy, PlayerAction::UseMove { move_index: 0 }),
            ])
            .unwrap();
        let (status, resumes) = drain(&mut battle, status);
        assert_eq!(status, RunStatus::TurnComplete);
        assert!(resumes >= 2, "both attacks animate");
    }

    #[test]
    fn test_wrong_ticket_aborts_the_battle() {
        // Arrange
        let sink = RecordingSink::deferring();
        let mut battle = deferred_battle(&sink);
        battle.start().unwrap();

        // Act
        let err = battle.resume(AnimationTicket(99)).unwrap_err();

        // Assert
        assert_eq!(
            err,
            BattleEngineError::from(BattleStateError::UnexpectedResume {
                expected: Some(AnimationTicket(1)),
                got: AnimationTicket(99),
            })
        );
        assert_eq!(battle.state().game_state, GameState::Aborted);
        assert!(battle.queue().is_empty());
        assert_eq!(battle.resume(AnimationTicket(1)).unwrap_err(), BattleEngineError::Aborted);
        assert_eq!(battle.step().unwrap_err(), BattleEngineError::Aborted);
    }

    #[test]
    fn test_turn_submitted_while_suspended_aborts() {
        let sink = RecordingSink::deferring();
        let mut battle = deferred_battle(&sink);
        battle.start().unwrap();

        let err = battle
            .play_turn(&[(Side::Player, PlayerAction::UseMove { move_index: 0 })])
            .unwrap_err();

        assert_eq!(err, BattleEngineError::from(BattleStateError::Suspended));
        assert_eq!(battle.state().game_state, GameState::Aborted);
    }

    #[test]
    fn test_recording_sink_without_deferral_never_suspends() {
        let sink = RecordingSink::new();
        let mut battle = deferred_battle(&sink);

        let status = battle.start().unwrap();

        assert_eq!(status, RunStatus::TurnComplete);
        assert!(sink.log().tickets_issued.is_empty());
        assert_eq!(sink.log().animations.len(), 2);
    }
}
