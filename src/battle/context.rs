//! The explicit handle every phase, attribute and tag operation receives.
//!
//! All state mutation goes through this context. In simulated mode the mutating helpers
//! compute their result and return it without touching the battle, and raw mutable
//! access (`live_combatant_mut`, `live_arena_mut`) yields `None`.

use schema::{
    AbilityData, BattleStat, MoveData, MoveId, PokemonType, StatusEffect, TerrainType,
    WeatherType,
};

use crate::battle::phase_queue::PhaseQueue;
use crate::battle::phases::Phase;
use crate::battle::state::{
    Arena, BattleEvent, BattleState, BattlerRef, DamageSource, EventBus, GameState, Side,
    Terrain, Weather,
};
use crate::catalog::Catalog;
use crate::config::BattleConfig;
use crate::errors::{BattleResult, CatalogError};
use crate::pokemon::Combatant;
use crate::rng::{traced_roll, BattleRng};
use crate::sinks::AnimationRef;

/// A presentation request raised while a phase runs, delivered once it finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentationCue {
    Animation(AnimationRef),
    Faint(BattlerRef),
}

pub struct BattleCtx<'a> {
    pub state: &'a mut BattleState,
    pub queue: &'a mut PhaseQueue,
    pub bus: &'a mut EventBus,
    pub rng: &'a mut dyn BattleRng,
    pub catalog: &'a dyn Catalog,
    pub config: &'a BattleConfig,
    pub cues: &'a mut Vec<PresentationCue>,
    pub simulated: bool,
}

impl<'a> BattleCtx<'a> {
    // --- Randomness ---

    /// Draws from the real stream, or from the simulated one in simulated mode.
    pub fn roll(&mut self, min: i32, max_exclusive: i32) -> i32 {
        traced_roll(&mut *self.rng, min, max_exclusive, self.simulated)
    }

    /// Percentage check using a strict less-than: `chance(30)` passes on rolls 0..=29.
    /// Certain and impossible checks do not consume a draw.
    pub fn chance(&mut self, percent: u8) -> bool {
        if percent >= 100 {
            return true;
        }
        if percent == 0 {
            return false;
        }
        self.roll(0, 100) < percent as i32
    }

    // --- Catalog ---

    pub fn move_data(&self, id: MoveId) -> BattleResult<&'a MoveData> {
        let catalog = self.catalog;
        catalog
            .move_data(id)
            .ok_or_else(|| CatalogError::MoveNotFound(id).into())
    }

    /// The definition of the ability currently active on `battler`.
    pub fn ability_of(&self, battler: BattlerRef) -> BattleResult<&'a AbilityData> {
        let id = self.state.combatant(battler)?.active_ability();
        let catalog = self.catalog;
        catalog
            .ability_data(id)
            .ok_or_else(|| CatalogError::AbilityNotFound(id).into())
    }

    // --- Read access ---

    pub fn combatant(&self, battler: BattlerRef) -> BattleResult<&Combatant> {
        self.state.combatant(battler)
    }

    pub fn is_able(&self, battler: BattlerRef) -> bool {
        self.state.is_able(battler)
    }

    // --- Guarded write access ---

    /// Mutable access to a combatant, or `None` in simulated mode.
    pub(crate) fn live_combatant_mut(
        &mut self,
        battler: BattlerRef,
    ) -> BattleResult<Option<&mut Combatant>> {
        if self.simulated {
            // Still validate the reference so simulated and real runs fail alike.
            self.state.combatant(battler)?;
            return Ok(None);
        }
        self.state.combatant_mut(battler).map(Some)
    }

    /// Mutable access to the field, or `None` in simulated mode.
    pub(crate) fn live_arena_mut(&mut self) -> Option<&mut Arena> {
        if self.simulated {
            None
        } else {
            Some(&mut self.state.arena)
        }
    }

    pub fn emit(&mut self, event: BattleEvent) {
        if !self.simulated {
            self.bus.push(event);
        }
    }

    /// Queues a phase to run before anything already queued.
    pub fn unshift_phase(&mut self, phase: Phase) {
        if !self.simulated {
            self.queue.unshift(phase);
        }
    }

    /// Queues a phase to run after everything already queued.
    pub fn push_phase(&mut self, phase: Phase) {
        if !self.simulated {
            self.queue.push_back(phase);
        }
    }

    /// Drops queued phases matching `predicate`. Returns how many were (or would be)
    /// removed.
    pub fn remove_phases_where<F>(&mut self, predicate: F) -> usize
    where
        F: FnMut(&Phase) -> bool,
    {
        if self.simulated {
            let mut predicate = predicate;
            return self.queue.iter().filter(|p| predicate(p)).count();
        }
        self.queue.remove_where(predicate)
    }

    pub fn clear_queue(&mut self) {
        if !self.simulated {
            self.queue.clear();
        }
    }

    /// Puts `slot` on the field for `side` and hands the outgoing combatant's queued
    /// end-of-turn phases to it.
    pub fn set_active(&mut self, side: Side, slot: usize) -> BattleResult<()> {
        let incoming = BattlerRef::new(side, slot);
        self.state.combatant(incoming)?;
        if self.simulated {
            return Ok(());
        }
        let outgoing = self.state.active_ref(side);
        self.state.player_mut(side).active_index = slot;
        let moved = self.queue.retarget_residuals(outgoing, incoming);
        tracing::debug!(?outgoing, ?incoming, moved, "active combatant changed");
        Ok(())
    }

    pub fn set_game_state(&mut self, game_state: GameState) {
        if !self.simulated {
            self.state.game_state = game_state;
        }
    }

    pub fn play_animation(&mut self, animation: AnimationRef) {
        if !self.simulated {
            self.cues.push(PresentationCue::Animation(animation));
        }
    }

    pub fn show_faint(&mut self, battler: BattlerRef) {
        if !self.simulated {
            self.cues.push(PresentationCue::Faint(battler));
        }
    }

    // --- HP ---

    /// Removes HP and reports the amount that would be or was lost. Dropping a combatant
    /// to zero queues its faint ahead of everything else.
    pub fn damage(
        &mut self,
        target: BattlerRef,
        amount: u16,
        source: DamageSource,
    ) -> BattleResult<u16> {
        let (dealt, cause) = {
            let combatant = self.state.combatant(target)?;
            let cause = match source {
                DamageSource::Move(_) => combatant.turn.last_hit_by,
                _ => None,
            };
            (amount.min(combatant.current_hp()), cause)
        };
        let Some(combatant) = self.live_combatant_mut(target)? else {
            return Ok(dealt);
        };
        if dealt == 0 {
            return Ok(0);
        }
        combatant.take_damage(dealt);
        if matches!(source, DamageSource::Move(_)) {
            combatant.turn.hits_taken = combatant.turn.hits_taken.saturating_add(1);
            combatant.turn.damage_taken = combatant.turn.damage_taken.saturating_add(dealt);
        }
        let remaining_hp = combatant.current_hp();
        self.emit(BattleEvent::DamageDealt {
            target,
            amount: dealt,
            remaining_hp,
            source,
        });
        if remaining_hp == 0 {
            self.unshift_phase(Phase::Faint {
                battler: target,
                cause,
            });
        }
        Ok(dealt)
    }

    /// Restores HP and reports the amount that would be or was gained.
    pub fn heal(&mut self, target: BattlerRef, amount: u16) -> BattleResult<u16> {
        let healable = {
            let c = self.state.combatant(target)?;
            if c.is_fainted() {
                0
            } else {
                amount.min(c.max_hp() - c.current_hp())
            }
        };
        let Some(combatant) = self.live_combatant_mut(target)? else {
            return Ok(healable);
        };
        if healable == 0 {
            return Ok(0);
        }
        combatant.heal(healable);
        let remaining_hp = combatant.current_hp();
        self.emit(BattleEvent::Healed {
            target,
            amount: healable,
            remaining_hp,
        });
        Ok(healable)
    }

    // --- Status ---

    /// Sets a status if none is held. Callers check immunities first.
    pub fn set_status(
        &mut self,
        target: BattlerRef,
        effect: StatusEffect,
        counter: u8,
    ) -> BattleResult<bool> {
        if self.state.combatant(target)?.status().is_some() {
            return Ok(false);
        }
        let Some(combatant) = self.live_combatant_mut(target)? else {
            return Ok(true);
        };
        combatant.set_status(effect, counter);
        self.emit(BattleEvent::StatusApplied { target, effect });
        self.play_animation(AnimationRef::Status { target, effect });
        Ok(true)
    }

    pub fn cure_status(&mut self, target: BattlerRef) -> BattleResult<Option<StatusEffect>> {
        let held = self.state.combatant(target)?.status().map(|s| s.effect);
        let Some(combatant) = self.live_combatant_mut(target)? else {
            return Ok(held);
        };
        if let Some(effect) = combatant.cure_status() {
            self.emit(BattleEvent::StatusCured { target, effect });
        }
        Ok(held)
    }

    /// Replaces the target's types until it leaves the field. Returns `false` when it
    /// already has exactly these types.
    pub fn set_types(&mut self, target: BattlerRef, types: &[PokemonType]) -> BattleResult<bool> {
        if types.is_empty() || self.state.combatant(target)?.current_types() == types {
            return Ok(false);
        }
        let Some(combatant) = self.live_combatant_mut(target)? else {
            return Ok(true);
        };
        combatant.summon.type_override = Some(types.to_vec());
        self.emit(BattleEvent::TypeChanged {
            target,
            types: types.to_vec(),
        });
        Ok(true)
    }

    // --- Stat stages ---

    /// Applies a stage delta clamped to the configured bound. Returns the change that
    /// stuck (or would stick), which is zero when the stage is already at its limit.
    pub fn change_stat_stage(
        &mut self,
        target: BattlerRef,
        stat: BattleStat,
        delta: i8,
    ) -> BattleResult<i8> {
        let bound = self.config.stage_bound;
        let mut preview = self.state.combatant(target)?.summon.stages;
        let applied = preview.change(stat, delta, bound);
        let Some(combatant) = self.live_combatant_mut(target)? else {
            return Ok(applied);
        };
        combatant.summon.stages = preview;
        let new_stage = preview.get(stat);
        if applied == 0 {
            self.emit(BattleEvent::StatStageAtLimit {
                target,
                stat,
                rising: delta > 0,
            });
        } else {
            self.emit(BattleEvent::StatStageChanged {
                target,
                stat,
                delta: applied,
                new_stage,
            });
        }
        Ok(applied)
    }

    // --- Field ---

    pub fn set_weather(&mut self, kind: WeatherType) -> bool {
        if self.state.arena.weather_is(kind) {
            return false;
        }
        let turns_left = self.config.weather_turns;
        let Some(arena) = self.live_arena_mut() else {
            return true;
        };
        arena.weather = Some(Weather { kind, turns_left });
        self.emit(BattleEvent::WeatherStarted { weather: kind });
        self.play_animation(AnimationRef::Weather(kind));
        true
    }

    pub fn set_terrain(&mut self, kind: TerrainType) -> bool {
        if self.state.arena.terrain_is(kind) {
            return false;
        }
        let turns_left = self.config.terrain_turns;
        let Some(arena) = self.live_arena_mut() else {
            return true;
        };
        arena.terrain = Some(Terrain { kind, turns_left });
        self.emit(BattleEvent::TerrainStarted { terrain: kind });
        self.play_animation(AnimationRef::Terrain(kind));
        true
    }
}
