//! Orders a batch of submitted actions.
//!
//! Keys, highest first: action bracket (forfeit, switch, move), move priority, "always
//! first in bracket" abilities, then effective speed. Trick Room reverses the speed key.
//! Exact ties are shuffled with the battle's random stream.

use std::cmp::Ordering;

use schema::{ArenaTagSide, ArenaTagType};

use crate::battle::state::{BattleState, Side};
use crate::battle::stats::{bypasses_speed, effective_speed, move_priority};
use crate::catalog::Catalog;
use crate::config::BattleConfig;
use crate::errors::{BattleResult, CatalogError};
use crate::player::PlayerAction;
use crate::rng::{traced_roll, BattleRng};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OrderKey {
    bracket: i8,
    priority: i8,
    bypass: bool,
    speed: i64,
}

impl Ord for OrderKey {
    fn cmp(&self, other: &Self) -> Ordering {
        // Descending: larger keys act first.
        other
            .bracket
            .cmp(&self.bracket)
            .then(other.priority.cmp(&self.priority))
            .then(other.bypass.cmp(&self.bypass))
            .then(other.speed.cmp(&self.speed))
    }
}

impl PartialOrd for OrderKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn order_key(
    state: &BattleState,
    catalog: &dyn Catalog,
    config: &BattleConfig,
    side: Side,
    action: &PlayerAction,
) -> BattleResult<OrderKey> {
    let battler = state.active_ref(side);
    let priority = match action {
        PlayerAction::UseMove { move_index } => {
            let id = state
                .combatant(battler)?
                .move_slot(*move_index)
                .map(|slot| slot.id);
            match id {
                Some(id) => {
                    let move_data = catalog.move_data(id).ok_or(CatalogError::MoveNotFound(id))?;
                    move_priority(state, catalog, battler, move_data)
                }
                None => 0,
            }
        }
        _ => 0,
    };
    let speed = effective_speed(state, catalog, config, battler) as i64;
    let trick_room = state.arena.has_tag(ArenaTagType::TrickRoom, ArenaTagSide::Both);
    Ok(OrderKey {
        bracket: action.action_priority(),
        priority,
        bypass: bypasses_speed(state, catalog, battler),
        speed: if trick_room { -speed } else { speed },
    })
}

/// Sorts `actions` into execution order.
pub fn order_actions(
    state: &BattleState,
    catalog: &dyn Catalog,
    config: &BattleConfig,
    rng: &mut dyn BattleRng,
    actions: &[(Side, PlayerAction)],
) -> BattleResult<Vec<(Side, PlayerAction)>> {
    let mut keyed = actions
        .iter()
        .map(|(side, action)| Ok((order_key(state, catalog, config, *side, action)?, *side, *action)))
        .collect::<BattleResult<Vec<_>>>()?;
    keyed.sort_by(|a, b| a.0.cmp(&b.0));

    // Fisher-Yates within each run of equal keys.
    let mut start = 0;
    while start < keyed.len() {
        let mut end = start + 1;
        while end < keyed.len() && keyed[end].0 == keyed[start].0 {
            end += 1;
        }
        for i in (start + 1..end).rev() {
            let j = start + traced_roll(rng, 0, (i - start + 1) as i32, false) as usize;
            keyed.swap(i, j);
        }
        start = end;
    }

    tracing::debug!(order = ?keyed.iter().map(|(_, side, _)| *side).collect::<Vec<_>>(), "turn order");
    Ok(keyed.into_iter().map(|(_, side, action)| (side, action)).collect())
}
