//! Attribute chain engine.
//!
//! Move and ability definitions carry ordered lists of attribute variants (see the
//! `schema` crate). The extension traits here give those variants behaviour: each
//! attribute belongs to one family, and a chain walks a definition's attributes of one
//! family in list order, calling `apply` on each.
//!
//! Attributes talk to each other and to the damage pipeline only through the typed
//! [`MoveScratch`]. An attribute that cancels the move sets `scratch.cancelled`; later
//! attributes in dependent chains stop instead of re-testing the condition.

pub mod ability_attrs;
pub mod move_attrs;

use schema::{MoveCategory, MoveData, MoveId, PokemonType};

use crate::battle::context::BattleCtx;
use crate::battle::damage::HitOutcome;
use crate::battle::state::BattlerRef;
use crate::battle::stats::base_crit_stage;
use crate::config::BattleConfig;
use crate::errors::BattleResult;

pub use ability_attrs::{apply_ability_attrs, AbilityAttrExt, AbilityCtx, AbilityEvent};
pub use move_attrs::{apply_move_attrs, MoveAttrCtx, MoveAttrExt, MoveAttrFamily};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CritOverride {
    #[default]
    Roll,
    Always,
    Never,
}

/// Values that only live for one hit of a move.
#[derive(Debug, Clone, PartialEq)]
pub struct HitScratch {
    /// Defender-side multiplier contributed by abilities.
    pub damage_multiplier: f64,
    pub type_multiplier: f64,
    pub critical: bool,
    pub damage: u16,
    pub outcome: Option<HitOutcome>,
    /// The hit leaves the defender at 1 HP instead of fainting it.
    pub survive_lethal: bool,
}

impl Default for HitScratch {
    fn default() -> Self {
        Self {
            damage_multiplier: 1.0,
            type_multiplier: 1.0,
            critical: false,
            damage: 0,
            outcome: None,
            survive_lethal: false,
        }
    }
}

/// Shared mutable state of one move use, threaded through every chain and hit.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveScratch {
    pub move_id: MoveId,
    pub move_type: PokemonType,
    pub category: MoveCategory,
    pub power: u16,
    pub power_multiplier: f64,
    pub accuracy: Option<u8>,
    pub accuracy_multiplier: f64,
    pub always_hit: bool,
    pub stab_multiplier: f64,
    pub crit: CritOverride,
    pub crit_stage: u8,
    pub crit_multiplier: f64,
    /// Per-defending-type matchups that replace the type chart. Later entries win.
    pub type_overrides: Vec<(PokemonType, f64)>,
    pub ignore_immunity: bool,
    /// A status move that fails against a 0× matchup.
    pub respect_type_immunity: bool,
    pub fixed_damage: Option<u16>,
    pub hit_count: u8,
    pub hits_landed: u8,
    pub total_damage: u16,
    /// Effect-family attributes that activated.
    pub effects_applied: u8,
    pub cancelled: bool,
    pub hit: HitScratch,
}

impl MoveScratch {
    pub fn new(move_data: &MoveData, config: &BattleConfig) -> Self {
        Self {
            move_id: move_data.id,
            move_type: move_data.move_type,
            category: move_data.category,
            power: move_data.power.unwrap_or(0),
            power_multiplier: 1.0,
            accuracy: move_data.accuracy,
            accuracy_multiplier: 1.0,
            always_hit: false,
            stab_multiplier: config.stab_multiplier,
            crit: CritOverride::Roll,
            crit_stage: 0,
            crit_multiplier: config.crit_multiplier,
            type_overrides: Vec::new(),
            ignore_immunity: false,
            respect_type_immunity: false,
            fixed_damage: None,
            hit_count: 1,
            hits_landed: 0,
            total_damage: 0,
            effects_applied: 0,
            cancelled: false,
            hit: HitScratch::default(),
        }
    }
}

/// Runs every chain that shapes a move before its first hit.
///
/// Cross-family order is fixed here: type changes, then the user's pre-attack ability
/// attributes, then power, matchup, crit, fixed damage and hit count.
pub fn prepare_move(
    ctx: &mut BattleCtx,
    user: BattlerRef,
    target: BattlerRef,
    move_data: &MoveData,
) -> BattleResult<MoveScratch> {
    let mut scratch = MoveScratch::new(move_data, ctx.config);
    scratch.crit_stage = base_crit_stage(ctx.state, user);

    let mut mctx = MoveAttrCtx {
        user,
        target,
        move_data,
        scratch: &mut scratch,
    };
    apply_move_attrs(ctx, MoveAttrFamily::Type, &mut mctx)?;

    apply_ability_attrs(
        ctx,
        AbilityEvent::PreAttack,
        &mut AbilityCtx {
            holder: user,
            other: Some(target),
            move_data: Some(move_data),
            scratch: Some(&mut *mctx.scratch),
        },
    )?;

    for family in [
        MoveAttrFamily::Power,
        MoveAttrFamily::Matchup,
        MoveAttrFamily::Crit,
        MoveAttrFamily::FixedDamage,
        MoveAttrFamily::HitCount,
    ] {
        apply_move_attrs(ctx, family, &mut mctx)?;
    }
    Ok(scratch)
}
