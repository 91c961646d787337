#[cfg(test)]
mod tests {
    use crate::battle::engine::{Battle, RunStatus};
    use crate::battle::state::{BattleEvent, BattlerRef, DamageSource, Side};
    use crate::battle::tests::common::{
        enemy_lead, has_event, move_id, player_lead, started_battle, TestCombatantBuilder,
    };
    use crate::player::PlayerAction;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use schema::{BattlerTagType, PokemonType, StatusEffect};

    fn use_moves(battle: &mut Battle, player_move: usize, enemy_move: usize) -> RunStatus {
        battle
            .play_turn(&[
                (Side::Player, PlayerAction::UseMove { move_index: player_move }),
                (Side::Enemy, PlayerAction::UseMove { move_index: enemy_move }),
            ])
            .unwrap()
    }

    fn holds(battle: &Battle, battler: BattlerRef, tag: BattlerTagType) -> bool {
        battle.state().combatant(battler).unwrap().has_tag(tag)
    }

    fn tag_damage(battle: &Battle, tag: BattlerTagType) -> Vec<u16> {
        battle
            .events()
            .events()
            .iter()
            .filter_map(|e| match e {
                BattleEvent::DamageDealt { amount, source: DamageSource::Tag(t), .. } if *t == tag => {
                    Some(*amount)
                }
                _ => None,
            })
            .collect()
    }

    #[rstest]
    #[case(0, 102)]
    #[case(2, 51)]
    fn test_charge_doubles_the_next_electric_hit(#[case] first_move: usize, #[case] expected: u16) {
        // Arrange
        let mut battle = started_battle(
            vec![TestCombatantBuilder::new("Sparky")
                .types(&[PokemonType::Electric])
                .moves(&["Charge", "Thunderbolt", "Growl"])
                .speed(90)
                .build()],
            vec![TestCombatantBuilder::new("Foe")
                .moves(&["Growl"])
                .stats([300, 50, 50, 50, 50, 10])
                .build()],
            vec![],
        );

        // Act: charge (or not), then Thunderbolt on the following turn
        use_moves(&mut battle, first_move, 0);
        let charged_between_turns = holds(&battle, player_lead(), BattlerTagType::Charged);
        use_moves(&mut battle, 1, 0);

        // Assert
        assert_eq!(charged_between_turns, first_move == 0);
        let thunderbolt = move_id("Thunderbolt");
        let dealt = battle
            .events()
            .events()
            .iter()
            .find_map(|e| match e {
                BattleEvent::DamageDealt { target, amount, source: DamageSource::Move(id), .. }
                    if *target == enemy_lead() && *id == thunderbolt => Some(*amount),
                _ => None,
            })
            .expect("thunderbolt hit");
        assert_eq!(dealt, expected);
        assert!(!holds(&battle, player_lead(), BattlerTagType::Charged));
    }

    #[test]
    fn test_confused_holder_can_hit_itself() {
        // Arrange: accuracy, confusion length 5, self-hit roll, full damage roll
        let mut battle = started_battle(
            vec![TestCombatantBuilder::new("Lead")
                .moves(&["Confuse Ray"])
                .speed(90)
                .build()],
            vec![TestCombatantBuilder::new("Foe").moves(&["Tackle"]).speed(10).build()],
            vec![0, 5, 0, 100],
        );

        // Act
        use_moves(&mut battle, 0, 0);

        // Assert
        let events = battle.events().events();
        assert!(events.contains(&BattleEvent::ConfusionActive { target: enemy_lead() }));
        assert!(events.contains(&BattleEvent::DamageDealt {
            target: enemy_lead(),
            amount: 19,
            remaining_hp: 81,
            source: DamageSource::Confusion,
        }));
        assert!(!has_event(events, |e| matches!(
            e,
            BattleEvent::MoveUsed { user, .. } if *user == enemy_lead()
        )));
        assert!(battle.state().combatant(player_lead()).unwrap().is_full_hp());
        let confusion = battle
            .state()
            .combatant(enemy_lead())
            .unwrap()
            .tag(BattlerTagType::Confused)
            .and_then(|t| t.turns_left);
        assert_eq!(confusion, Some(4));
    }

    #[test]
    fn test_leech_seed_drains_into_the_opponent() {
        let mut battle = started_battle(
            vec![TestCombatantBuilder::new("Seeder")
                .moves(&["Leech Seed"])
                .hp(50)
                .speed(90)
                .build()],
            vec![TestCombatantBuilder::new("Foe").moves(&["Growl"]).speed(10).build()],
            vec![],
        );

        use_moves(&mut battle, 0, 0);

        let events = battle.events().events();
        assert!(events.contains(&BattleEvent::DamageDealt {
            target: enemy_lead(),
            amount: 12,
            remaining_hp: 88,
            source: DamageSource::Tag(BattlerTagType::Seeded),
        }));
        assert!(events.contains(&BattleEvent::Healed {
            target: player_lead(),
            amount: 12,
            remaining_hp: 62,
        }));
        assert!(holds(&battle, enemy_lead(), BattlerTagType::Seeded));
    }

    #[test]
    fn test_bound_chips_every_turn_until_released() {
        // Arrange: accuracy, no crit, lowest damage roll, bound for 4 turns
        let mut battle = started_battle(
            vec![TestCombatantBuilder::new("Wrapper")
                .moves(&["Wrap", "Growl"])
                .speed(90)
                .build()],
            vec![TestCombatantBuilder::new("Foe").moves(&["Growl"]).speed(10).build()],
            vec![0, 23, 85, 4],
        );

        // Act
        use_moves(&mut battle, 0, 0);
        for _ in 0..3 {
            use_moves(&mut battle, 1, 0);
        }
        let released_after_four = !holds(&battle, enemy_lead(), BattlerTagType::Bound);
        use_moves(&mut battle, 1, 0);

        // Assert: 9 from Wrap itself, then 12 per turn for four turns
        assert!(released_after_four);
        assert_eq!(tag_damage(&battle, BattlerTagType::Bound), vec![12; 4]);
        assert_eq!(battle.state().combatant(enemy_lead()).unwrap().current_hp(), 100 - 9 - 48);
        assert!(battle.events().events().contains(&BattleEvent::TagRemoved {
            target: enemy_lead(),
            tag: BattlerTagType::Bound,
        }));
    }

    #[test]
    fn test_perish_song_knocks_out_both_leads_on_the_third_turn() {
        // Arrange
        let mut battle = started_battle(
            vec![
                TestCombatantBuilder::new("Singer")
                    .moves(&["Perish Song", "Growl"])
                    .speed(90)
                    .build(),
                TestCombatantBuilder::new("Bench").moves(&["Tackle"]).build(),
            ],
            vec![
                TestCombatantBuilder::new("Foe").moves(&["Growl"]).speed(10).build(),
                TestCombatantBuilder::new("Backup").moves(&["Tackle"]).build(),
            ],
            vec![],
        );

        // Act
        use_moves(&mut battle, 0, 0);
        use_moves(&mut battle, 1, 0);
        let standing_after_two = battle.state().is_able(player_lead()) && battle.state().is_able(enemy_lead());
        let status = use_moves(&mut battle, 1, 0);

        // Assert
        assert!(standing_after_two);
        assert_eq!(status, RunStatus::TurnComplete);
        let counts: Vec<u8> = battle
            .events()
            .events()
            .iter()
            .filter_map(|e| match e {
                BattleEvent::PerishCount { target, count } if *target == player_lead() => Some(*count),
                _ => None,
            })
            .collect();
        assert_eq!(counts, vec![2, 1, 0]);
        let events = battle.events().events();
        assert!(events.contains(&BattleEvent::Fainted { battler: player_lead() }));
        assert!(events.contains(&BattleEvent::Fainted { battler: enemy_lead() }));
        assert_eq!(battle.state().player(Side::Player).active_index, 1);
        assert_eq!(battle.state().player(Side::Enemy).active_index, 1);
    }

    #[test]
    fn test_yawn_puts_the_target_to_sleep_at_the_end_of_the_next_turn() {
        let mut battle = started_battle(
            vec![TestCombatantBuilder::new("Yawner")
                .moves(&["Yawn", "Growl"])
                .speed(90)
                .build()],
            vec![TestCombatantBuilder::new("Foe").moves(&["Growl"]).speed(10).build()],
            vec![],
        );

        use_moves(&mut battle, 0, 0);
        let foe = battle.state().combatant(enemy_lead()).unwrap();
        assert!(foe.has_tag(BattlerTagType::Drowsy));
        assert_eq!(foe.status(), None);

        use_moves(&mut battle, 1, 0);
        let foe = battle.state().combatant(enemy_lead()).unwrap();
        assert!(!foe.has_tag(BattlerTagType::Drowsy));
        assert_eq!(foe.status().map(|s| s.effect), Some(StatusEffect::Sleep));
    }

    #[rstest]
    #[case(0, true)]
    #[case(2, false)]
    fn test_focus_energy_raises_the_crit_stage(#[case] first_move: usize, #[case] crits: bool) {
        // Arrange: Slash adds one stage, focus adds two more
        let mut battle = started_battle(
            vec![TestCombatantBuilder::new("Slasher")
                .moves(&["Focus Energy", "Slash", "Growl"])
                .speed(90)
                .build()],
            vec![TestCombatantBuilder::new("Foe").moves(&["Growl"]).speed(10).build()],
            vec![],
        );

        // Act
        use_moves(&mut battle, first_move, 0);
        use_moves(&mut battle, 1, 0);

        // Assert
        assert_eq!(holds(&battle, player_lead(), BattlerTagType::Focused), first_move == 0);
        assert_eq!(
            battle
                .events()
                .events()
                .contains(&BattleEvent::CriticalHit { target: enemy_lead() }),
            crits
        );
    }

    #[test]
    fn test_recharge_turn_skips_the_move() {
        let mut battle = started_battle(
            vec![TestCombatantBuilder::new("Beamer")
                .moves(&["Hyper Beam"])
                .speed(90)
                .build()],
            vec![TestCombatantBuilder::new("Foe")
                .moves(&["Growl"])
                .stats([400, 50, 50, 50, 50, 10])
                .build()],
            vec![],
        );

        use_moves(&mut battle, 0, 0);
        assert!(holds(&battle, player_lead(), BattlerTagType::Recharging));
        let hp_after_beam = battle.state().combatant(enemy_lead()).unwrap().current_hp();

        use_moves(&mut battle, 0, 0);

        assert!(battle.events().events().contains(&BattleEvent::MoveFailed {
            user: player_lead(),
            reason: crate::battle::state::FailureReason::Recharging,
        }));
        assert!(!holds(&battle, player_lead(), BattlerTagType::Recharging));
        assert_eq!(
            battle.state().combatant(enemy_lead()).unwrap().current_hp(),
            hp_after_beam
        );
    }
}
