#[cfg(test)]
mod tests {
    use crate::battle::attributes::{MoveAttrCtx, MoveAttrExt, MoveScratch};
    use crate::battle::state::{BattleEvent, DamageSource, Side};
    use crate::battle::tests::common::{
        enemy_lead, move_id, player_lead, started_battle, TestCombatantBuilder,
    };
    use crate::player::PlayerAction;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use schema::{BattleStat, BattlerTagType, MoveAttr};

    fn use_moves(battle: &mut crate::battle::engine::Battle, player_move: usize, enemy_move: usize) {
        battle
            .play_turn(&[
                (Side::Player, PlayerAction::UseMove { move_index: player_move }),
                (Side::Enemy, PlayerAction::UseMove { move_index: enemy_move }),
            ])
            .unwrap();
    }

    #[rstest]
    #[case(29, true)]
    #[case(30, false)]
    fn test_flinch_chance_threshold(#[case] roll: i32, #[case] flinches: bool) {
        // Arrange
        let mut battle = started_battle(
            vec![TestCombatantBuilder::new("Biter").moves(&["Bite"]).build()],
            vec![TestCombatantBuilder::new("Foe").moves(&["Tackle"]).build()],
            vec![roll],
        );

        // Act: apply the flinch attribute of a 30% move directly
        let applied = battle.with_ctx(false, |ctx| {
            let move_data = ctx.move_data(move_id("Bite")).unwrap();
            let mut scratch = MoveScratch::new(move_data, ctx.config);
            let mut mctx = MoveAttrCtx {
                user: player_lead(),
                target: enemy_lead(),
                move_data,
                scratch: &mut scratch,
            };
            MoveAttr::Flinch { chance: 30 }.apply(ctx, &mut mctx).unwrap()
        });

        // Assert
        assert_eq!(applied, flinches);
        let target = battle.state().combatant(enemy_lead()).unwrap();
        assert_eq!(target.has_tag(BattlerTagType::Flinched), flinches);
    }

    #[test]
    fn test_flinch_stops_slower_target() {
        // Arrange: 0 passes the accuracy check and the flinch roll
        let mut battle = started_battle(
            vec![TestCombatantBuilder::new("Biter").moves(&["Bite"]).speed(90).build()],
            vec![TestCombatantBuilder::new("Foe").moves(&["Tackle"]).speed(10).build()],
            vec![0, 50, 50, 0],
        );

        // Act
        use_moves(&mut battle, 0, 0);

        // Assert
        let events = battle.events().events();
        assert!(events.contains(&BattleEvent::MoveFailed {
            user: enemy_lead(),
            reason: crate::battle::state::FailureReason::Flinched,
        }));
        assert!(battle.state().combatant(player_lead()).unwrap().is_full_hp());
        // Flinch only lasts for the turn it was applied.
        assert!(!battle
            .state()
            .combatant(enemy_lead())
            .unwrap()
            .has_tag(BattlerTagType::Flinched));
    }

    #[test]
    fn test_stat_stages_stop_at_bound() {
        // Arrange
        let mut battle = started_battle(
            vec![TestCombatantBuilder::new("Dancer")
                .moves(&["Swords Dance"])
                .speed(90)
                .build()],
            vec![TestCombatantBuilder::new("Foe").moves(&["Recover"]).speed(10).build()],
            vec![],
        );

        // Act: +2 four times against a bound of 6
        for _ in 0..4 {
            use_moves(&mut battle, 0, 0);
        }

        // Assert
        let dancer = battle.state().combatant(player_lead()).unwrap();
        assert_eq!(dancer.stage(BattleStat::Attack), 6);
        assert!(battle.events().events().contains(&BattleEvent::StatStageAtLimit {
            target: player_lead(),
            stat: BattleStat::Attack,
            rising: true,
        }));
    }

    #[test]
    fn test_multi_hit_rolls_count_before_accuracy() {
        // Arrange: hit count draw 0 gives two hits, then accuracy 0 hits
        let mut battle = started_battle(
            vec![TestCombatantBuilder::new("Slapper")
                .moves(&["Double Slap"])
                .speed(90)
                .build()],
            vec![TestCombatantBuilder::new("Foe")
                .moves(&["Recover"])
                .stats([300, 50, 50, 50, 50, 10])
                .build()],
            vec![0, 0],
        );

        // Act
        use_moves(&mut battle, 0, 0);

        // Assert
        let events = battle.events().events();
        let hits = events
            .iter()
            .filter(|e| matches!(
                e,
                BattleEvent::DamageDealt { target, source: DamageSource::Move(_), .. } if *target == enemy_lead()
            ))
            .count();
        assert_eq!(hits, 2);
        assert!(events.contains(&BattleEvent::HitCount { hits: 2 }));
    }

    #[test]
    fn test_recoil_is_a_share_of_damage_dealt() {
        let mut battle = started_battle(
            vec![TestCombatantBuilder::new("Rammer")
                .moves(&["Double-Edge"])
                .speed(90)
                .build()],
            vec![TestCombatantBuilder::new("Foe").moves(&["Recover"]).speed(10).build()],
            vec![],
        );

        use_moves(&mut battle, 0, 0);

        let events = battle.events().events();
        let dealt = events
            .iter()
            .find_map(|e| match e {
                BattleEvent::DamageDealt { target, amount, source: DamageSource::Move(_), .. }
                    if *target == enemy_lead() => Some(*amount),
                _ => None,
            })
            .expect("double-edge hit");
        let recoil = events
            .iter()
            .find_map(|e| match e {
                BattleEvent::DamageDealt { target, amount, source: DamageSource::Recoil, .. }
                    if *target == player_lead() => Some(*amount),
                _ => None,
            })
            .expect("recoil taken");
        assert_eq!(recoil, (dealt / 3).max(1));
    }

    #[test]
    fn test_crash_damage_on_miss() {
        // Arrange: 95 misses a 90% move
        let mut battle = started_battle(
            vec![TestCombatantBuilder::new("Kicker")
                .moves(&["High Jump Kick"])
                .speed(90)
                .build()],
            vec![TestCombatantBuilder::new("Foe").moves(&["Recover"]).speed(10).build()],
            vec![95],
        );

        use_moves(&mut battle, 0, 0);

        let events = battle.events().events();
        assert!(events.contains(&BattleEvent::MoveMissed {
            user: player_lead(),
            target: enemy_lead(),
        }));
        assert!(events.contains(&BattleEvent::DamageDealt {
            target: player_lead(),
            amount: 50,
            remaining_hp: 50,
            source: DamageSource::Crash,
        }));
    }

    #[test]
    fn test_protect_blocks_attacks_for_the_turn() {
        let mut battle = started_battle(
            vec![TestCombatantBuilder::new("Lead").moves(&["Tackle"]).speed(10).build()],
            vec![TestCombatantBuilder::new("Foe").moves(&["Protect"]).speed(90).build()],
            vec![],
        );

        use_moves(&mut battle, 0, 0);

        assert!(battle
            .events()
            .events()
            .contains(&BattleEvent::Protected { target: enemy_lead() }));
        let foe = battle.state().combatant(enemy_lead()).unwrap();
        assert!(foe.is_full_hp());
        assert!(!foe.has_tag(BattlerTagType::Protected));
    }

    #[test]
    fn test_thunder_wave_cannot_touch_ground_types() {
        let mut battle = started_battle(
            vec![TestCombatantBuilder::new("Lead")
                .moves(&["Thunder Wave"])
                .speed(90)
                .build()],
            vec![TestCombatantBuilder::new("Digger")
                .types(&[schema::PokemonType::Ground])
                .moves(&["Growl"])
                .speed(10)
                .build()],
            vec![],
        );

        use_moves(&mut battle, 0, 0);

        assert!(battle
            .events()
            .events()
            .contains(&BattleEvent::NoEffect { target: enemy_lead() }));
        assert_eq!(battle.state().combatant(enemy_lead()).unwrap().status(), None);
    }

    #[test]
    fn test_status_moves_ignore_the_chart_unless_marked() {
        // Growl is Normal, yet still lowers a Ghost type's Attack.
        let mut battle = started_battle(
            vec![TestCombatantBuilder::new("Lead").moves(&["Growl"]).speed(90).build()],
            vec![TestCombatantBuilder::new("Spirit")
                .types(&[schema::PokemonType::Ghost])
                .moves(&["Recover"])
                .speed(10)
                .build()],
            vec![],
        );

        use_moves(&mut battle, 0, 0);

        let spirit = battle.state().combatant(enemy_lead()).unwrap();
        assert_eq!(spirit.stage(BattleStat::Attack), -1);
    }

    #[test]
    fn test_status_move_with_nothing_to_do_fails() {
        // Arrange: the target already holds a status
        let mut battle = started_battle(
            vec![TestCombatantBuilder::new("Lead")
                .moves(&["Thunder Wave"])
                .speed(90)
                .build()],
            vec![TestCombatantBuilder::new("Foe")
                .moves(&["Recover"])
                .status(schema::StatusEffect::Burn, 0)
                .speed(10)
                .build()],
            vec![0],
        );

        use_moves(&mut battle, 0, 0);

        assert!(battle.events().events().contains(&BattleEvent::MoveFailed {
            user: player_lead(),
            reason: crate::battle::state::FailureReason::NothingHappened,
        }));
        let foe = battle.state().combatant(enemy_lead()).unwrap();
        assert_eq!(foe.status().map(|s| s.effect), Some(schema::StatusEffect::Burn));
    }
}
