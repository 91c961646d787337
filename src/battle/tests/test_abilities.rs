#[cfg(test)]
mod tests {
    use crate::battle::attributes::{AbilityAttrExt, AbilityCtx};
    use crate::battle::state::{BattleEvent, DamageSource, Side};
    use crate::battle::tags::add_battler_tag;
    use crate::battle::tests::common::{
        enemy_lead, has_event, move_id, player_lead, started_battle, TestCombatantBuilder,
    };
    use crate::player::PlayerAction;
    use pretty_assertions::assert_eq;
    use schema::{AbilityAttr, BattleStat, BattlerTagType, StatusEffect, TagTurns};

    fn static_contact(battle: &mut crate::battle::engine::Battle) -> bool {
        battle.with_ctx(false, |ctx| {
            let tackle = ctx.move_data(move_id("Tackle")).unwrap();
            let mut actx = AbilityCtx {
                holder: enemy_lead(),
                other: Some(player_lead()),
                move_data: Some(tackle),
                scratch: None,
            };
            AbilityAttr::ContactStatus {
                effect: StatusEffect::Paralysis,
                chance: 30,
            }
            .apply(ctx, &mut actx)
            .unwrap()
        })
    }

    #[test]
    fn test_status_guard_blocks_contact_status() {
        // Arrange: the attacker is guarded against paralysis
        let mut battle = started_battle(
            vec![TestCombatantBuilder::new("Attacker").moves(&["Tackle"]).build()],
            vec![TestCombatantBuilder::new("Holder")
                .moves(&["Tackle"])
                .ability("Static")
                .build()],
            vec![0],
        );
        let guarded = battle.with_ctx(false, |ctx| {
            add_battler_tag(
                ctx,
                player_lead(),
                BattlerTagType::StatusGuard(StatusEffect::Paralysis),
                TagTurns::Indefinite,
                None,
                None,
            )
            .unwrap()
        });
        assert!(guarded);
        let events_before = battle.events().len();

        // Act
        let applied = static_contact(&mut battle);

        // Assert: nothing happened and nothing was queued
        assert!(!applied);
        assert!(battle.queue().is_empty());
        assert_eq!(battle.events().len(), events_before);
        let attacker = battle.state().combatant(player_lead()).unwrap();
        assert_eq!(attacker.status(), None);
        assert_eq!(
            attacker.summon.tags.len(),
            1,
            "only the guard tag is held"
        );
    }

    #[test]
    fn test_contact_status_paralyzes_attacker() {
        let mut battle = started_battle(
            vec![TestCombatantBuilder::new("Attacker").moves(&["Tackle"]).build()],
            vec![TestCombatantBuilder::new("Holder")
                .moves(&["Tackle"])
                .ability("Static")
                .build()],
            vec![0],
        );

        let applied = static_contact(&mut battle);
        assert!(applied);
        // The status lands when the queued phase runs.
        battle.step().unwrap();

        let attacker = battle.state().combatant(player_lead()).unwrap();
        assert_eq!(attacker.status().map(|s| s.effect), Some(StatusEffect::Paralysis));
        assert!(has_event(battle.events().events(), |e| matches!(
            e,
            BattleEvent::AbilityActivated { battler, ability } if *battler == enemy_lead() && ability == "Static"
        )));
    }

    #[test]
    fn test_volt_absorb_absorbs_thunder_wave() {
        // Arrange
        let mut battle = started_battle(
            vec![TestCombatantBuilder::new("Lead")
                .moves(&["Thunder Wave"])
                .speed(90)
                .build()],
            vec![TestCombatantBuilder::new("Absorber")
                .moves(&["Growl"])
                .ability("Volt Absorb")
                .speed(10)
                .build()],
            vec![],
        );

        // Act
        battle
            .play_turn(&[
                (Side::Player, PlayerAction::UseMove { move_index: 0 }),
                (Side::Enemy, PlayerAction::UseMove { move_index: 0 }),
            ])
            .unwrap();

        // Assert
        let events = battle.events().events();
        assert!(events.contains(&BattleEvent::AbilityActivated {
            battler: enemy_lead(),
            ability: "Volt Absorb".to_string(),
        }));
        assert!(!has_event(events, |e| matches!(e, BattleEvent::StatusApplied { .. })));
        assert_eq!(battle.state().combatant(enemy_lead()).unwrap().status(), None);
    }

    #[test]
    fn test_levitate_avoids_ground_moves() {
        let mut battle = started_battle(
            vec![TestCombatantBuilder::new("Digger")
                .moves(&["Earthquake"])
                .speed(90)
                .build()],
            vec![TestCombatantBuilder::new("Floater")
                .moves(&["Recover"])
                .ability("Levitate")
                .speed(10)
                .build()],
            vec![],
        );

        battle
            .play_turn(&[
                (Side::Player, PlayerAction::UseMove { move_index: 0 }),
                (Side::Enemy, PlayerAction::UseMove { move_index: 0 }),
            ])
            .unwrap();

        let events = battle.events().events();
        assert!(events.contains(&BattleEvent::NoEffect { target: enemy_lead() }));
        assert!(battle.state().combatant(enemy_lead()).unwrap().is_full_hp());
    }

    #[test]
    fn test_intimidate_lowers_attack_on_entry() {
        let battle = started_battle(
            vec![TestCombatantBuilder::new("Lead").moves(&["Tackle"]).build()],
            vec![TestCombatantBuilder::new("Scary")
                .moves(&["Tackle"])
                .ability("Intimidate")
                .build()],
            vec![],
        );

        let lead = battle.state().combatant(player_lead()).unwrap();
        assert_eq!(lead.stage(BattleStat::Attack), -1);
    }

    #[test]
    fn test_clear_body_blocks_intimidate() {
        let battle = started_battle(
            vec![TestCombatantBuilder::new("Lead")
                .moves(&["Tackle"])
                .ability("Clear Body")
                .build()],
            vec![TestCombatantBuilder::new("Scary")
                .moves(&["Tackle"])
                .ability("Intimidate")
                .build()],
            vec![],
        );

        let lead = battle.state().combatant(player_lead()).unwrap();
        assert_eq!(lead.stage(BattleStat::Attack), 0);
        assert!(battle.events().events().contains(&BattleEvent::StatChangeBlocked {
            target: player_lead(),
            by: "Clear Body".to_string(),
        }));
    }

    #[test]
    fn test_volt_absorb_heals_instead_of_taking_damage() {
        let mut battle = started_battle(
            vec![TestCombatantBuilder::new("Zapper")
                .moves(&["Thunderbolt"])
                .speed(90)
                .build()],
            vec![TestCombatantBuilder::new("Sponge")
                .moves(&["Recover"])
                .ability("Volt Absorb")
                .hp(50)
                .speed(10)
                .build()],
            vec![],
        );

        battle
            .play_turn(&[
                (Side::Player, PlayerAction::UseMove { move_index: 0 }),
                (Side::Enemy, PlayerAction::UseMove { move_index: 0 }),
            ])
            .unwrap();

        let events = battle.events().events();
        assert!(!has_event(events, |e| matches!(
            e,
            BattleEvent::DamageDealt { target, source: DamageSource::Move(_), .. } if *target == enemy_lead()
        )));
        assert!(has_event(events, |e| matches!(
            e,
            BattleEvent::Healed { target, amount: 25, .. } if *target == enemy_lead()
        )));
    }

    #[test]
    fn test_sturdy_survives_from_full_hp() {
        let mut battle = started_battle(
            vec![TestCombatantBuilder::new("Bomber")
                .moves(&["Explosion"])
                .stats([100, 200, 50, 50, 50, 90])
                .build()],
            vec![
                TestCombatantBuilder::new("Wall")
                    .moves(&["Recover"])
                    .ability("Sturdy")
                    .speed(10)
                    .build(),
            ],
            vec![],
        );

        battle
            .play_turn(&[
                (Side::Player, PlayerAction::UseMove { move_index: 0 }),
                (Side::Enemy, PlayerAction::UseMove { move_index: 0 }),
            ])
            .unwrap();

        assert!(battle
            .events()
            .events()
            .contains(&BattleEvent::Endured { target: enemy_lead() }));
        assert_eq!(battle.state().combatant(enemy_lead()).unwrap().current_hp(), 1);
    }
}
