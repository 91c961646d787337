//! A module for defining AI behaviors for battle opponents.

use ordered_float::OrderedFloat;
use schema::MoveCategory;
use tracing::debug;

use crate::battle::damage::HitOutcome;
use crate::battle::engine::Battle;
use crate::battle::state::Side;
use crate::errors::BattleResult;
use crate::player::PlayerAction;

/// A trait for any system that can decide on a battle action.
/// This provides a common interface for different AI difficulties or strategies.
pub trait Behavior {
    /// Decides on the next action for `side`. Implementations may run simulated
    /// previews through the battle, which never change what the real battle sees.
    fn decide_action(&self, side: Side, battle: &mut Battle) -> BattleResult<PlayerAction>;
}

/// Picks the move whose simulated first hit looks best.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScoringAI;

impl ScoringAI {
    pub fn new() -> Self {
        Self
    }

    fn score_move(&self, side: Side, move_index: usize, battle: &mut Battle) -> BattleResult<f64> {
        let target = battle.state().active(side.opponent())?;
        let target_hp = target.current_hp().max(1) as f64;
        let preview = battle.preview_move(side, move_index)?;

        if preview.hit.outcome == Some(HitOutcome::NoEffect) {
            return Ok(-1.0);
        }
        if preview.cancelled {
            // Missed, protected against, or stopped by an ability.
            return Ok(0.0);
        }

        let utility = preview.effects_applied as f64 * 0.1;
        let score = match preview.category {
            MoveCategory::Physical | MoveCategory::Special => {
                let expected = preview.hit.damage as f64 * preview.hit_count.max(1) as f64;
                (expected / target_hp).min(1.0) + utility
            }
            MoveCategory::Status if preview.effects_applied > 0 => 0.3 + utility,
            MoveCategory::Status => -0.5,
        };
        Ok(score)
    }

    fn score_switch(&self, side: Side, battle: &Battle) -> BattleResult<f64> {
        // Only worth it when the current combatant is nearly down.
        let active = battle.state().active(side)?;
        Ok(if active.hp_percent() < 25 { 0.2 } else { -0.2 })
    }
}

impl Behavior for ScoringAI {
    fn decide_action(&self, side: Side, battle: &mut Battle) -> BattleResult<PlayerAction> {
        let player = battle.state().player(side);
        let valid_moves = player.valid_moves();
        let valid_switches = player.valid_switches();

        let mut best_move = None;
        for action in valid_moves {
            if let PlayerAction::UseMove { move_index } = action {
                let score = self.score_move(side, move_index, battle)?;
                debug!(?side, move_index, score, "scored move");
                if best_move.map_or(true, |(_, best)| OrderedFloat(score) > best) {
                    best_move = Some((action, OrderedFloat(score)));
                }
            }
        }

        let switch_score = OrderedFloat(self.score_switch(side, battle)?);
        let best_switch = valid_switches.first().copied();

        let action = match (best_move, best_switch) {
            (Some((move_action, move_score)), Some(switch_action)) => {
                if switch_score > move_score {
                    switch_action
                } else {
                    move_action
                }
            }
            (Some((move_action, _)), None) => move_action,
            (None, Some(switch_action)) => switch_action,
            // Nothing left to do.
            (None, None) => PlayerAction::Forfeit,
        };
        Ok(action)
    }
}
