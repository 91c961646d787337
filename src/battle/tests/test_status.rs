#[cfg(test)]
mod tests {
    use crate::battle::engine::Battle;
    use crate::battle::state::{BattleEvent, DamageSource, FailureReason, Side};
    use crate::battle::tests::common::{
        enemy_lead, has_event, player_lead, started_battle, TestCombatantBuilder,
    };
    use crate::player::PlayerAction;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use schema::{PokemonType, StatusEffect};

    fn pass_turn(battle: &mut Battle) {
        battle
            .play_turn(&[
                (Side::Player, PlayerAction::UseMove { move_index: 0 }),
                (Side::Enemy, PlayerAction::UseMove { move_index: 0 }),
            ])
            .unwrap();
    }

    fn status_damage(battle: &Battle, turn_start: usize) -> Vec<u16> {
        battle
            .events()
            .since(turn_start)
            .iter()
            .filter_map(|e| match e {
                BattleEvent::DamageDealt {
                    target,
                    amount,
                    source: DamageSource::Status(_),
                    ..
                } if *target == player_lead() => Some(*amount),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_sleep_counter_counts_down_then_wakes() {
        // Arrange: one more move attempt lost to sleep
        let mut battle = started_battle(
            vec![TestCombatantBuilder::new("Sleeper")
                .moves(&["Tackle"])
                .status(StatusEffect::Sleep, 1)
                .speed(90)
                .build()],
            vec![TestCombatantBuilder::new("Foe").moves(&["Recover"]).speed(10).build()],
            vec![],
        );

        // Act & Assert: first attempt fails
        pass_turn(&mut battle);
        assert!(battle.events().events().contains(&BattleEvent::MoveFailed {
            user: player_lead(),
            reason: FailureReason::Asleep,
        }));
        let sleeper = battle.state().combatant(player_lead()).unwrap();
        assert_eq!(sleeper.status().map(|s| s.counter), Some(0));

        // Act & Assert: second attempt wakes up and acts
        let turn_start = battle.events().len();
        pass_turn(&mut battle);
        let events = battle.events().since(turn_start);
        assert!(events.contains(&BattleEvent::StatusCured {
            target: player_lead(),
            effect: StatusEffect::Sleep,
        }));
        assert!(has_event(events, |e| matches!(
            e,
            BattleEvent::MoveUsed { user, .. } if *user == player_lead()
        )));
    }

    #[test]
    fn test_sleep_lasts_one_to_three_attempts() {
        // Arrange: the sleep duration draw is the second real draw after accuracy
        let mut battle = started_battle(
            vec![TestCombatantBuilder::new("Spore")
                .moves(&["Sleep Powder"])
                .speed(90)
                .build()],
            vec![TestCombatantBuilder::new("Foe").moves(&["Recover"]).speed(10).build()],
            vec![0, 99],
        );

        pass_turn(&mut battle);

        let foe = battle.state().combatant(enemy_lead()).unwrap();
        let status = foe.status().expect("asleep");
        assert_eq!(status.effect, StatusEffect::Sleep);
        // 99 clamps to the top of 1..=3; the foe's own move attempt already used one.
        assert_eq!(status.counter, 2);
    }

    #[rstest]
    #[case(StatusEffect::Poison, vec![12, 12, 12])]
    #[case(StatusEffect::Burn, vec![6, 6, 6])]
    #[case(StatusEffect::Toxic, vec![6, 12, 18])]
    fn test_residual_status_damage(#[case] effect: StatusEffect, #[case] expected: Vec<u16>) {
        let mut battle = started_battle(
            vec![TestCombatantBuilder::new("Sufferer")
                .types(&[PokemonType::Water])
                .moves(&["Recover"])
                .stats([100, 50, 50, 50, 50, 90])
                .hp(100)
                .status(effect, 0)
                .build()],
            vec![TestCombatantBuilder::new("Foe").moves(&["Protect"]).speed(10).build()],
            vec![],
        );

        let mut ticks = Vec::new();
        for _ in 0..3 {
            let turn_start = battle.events().len();
            pass_turn(&mut battle);
            ticks.extend(status_damage(&battle, turn_start));
        }

        assert_eq!(ticks, expected);
    }

    #[test]
    fn test_only_one_status_at_a_time() {
        let mut battle = started_battle(
            vec![TestCombatantBuilder::new("Lead").moves(&["Toxic"]).speed(90).build()],
            vec![TestCombatantBuilder::new("Foe")
                .moves(&["Recover"])
                .status(StatusEffect::Paralysis, 0)
                .speed(10)
                .build()],
            vec![0],
        );

        pass_turn(&mut battle);

        let foe = battle.state().combatant(enemy_lead()).unwrap();
        assert_eq!(foe.status().map(|s| s.effect), Some(StatusEffect::Paralysis));
        assert!(!has_event(battle.events().events(), |e| matches!(
            e,
            BattleEvent::StatusApplied { .. }
        )));
    }

    #[rstest]
    #[case(PokemonType::Electric, StatusEffect::Paralysis, "Thunder Wave")]
    #[case(PokemonType::Poison, StatusEffect::Toxic, "Toxic")]
    fn test_type_immunity_to_status(
        #[case] foe_type: PokemonType,
        #[case] effect: StatusEffect,
        #[case] move_name: &str,
    ) {
        let mut battle = started_battle(
            vec![TestCombatantBuilder::new("Lead").moves(&[move_name]).speed(90).build()],
            vec![TestCombatantBuilder::new("Foe")
                .types(&[foe_type])
                .moves(&["Recover"])
                .speed(10)
                .build()],
            vec![0],
        );

        pass_turn(&mut battle);

        let foe = battle.state().combatant(enemy_lead()).unwrap();
        assert!(!foe.has_status(effect));
        assert_eq!(foe.status(), None);
    }

    #[test]
    fn test_insomnia_prevents_sleep() {
        let mut battle = started_battle(
            vec![TestCombatantBuilder::new("Spore")
                .moves(&["Sleep Powder"])
                .speed(90)
                .build()],
            vec![TestCombatantBuilder::new("Foe")
                .moves(&["Recover"])
                .ability("Insomnia")
                .speed(10)
                .build()],
            vec![0],
        );

        pass_turn(&mut battle);

        assert_eq!(battle.state().combatant(enemy_lead()).unwrap().status(), None);
    }
}
