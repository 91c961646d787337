use schema::{AbilityId, MoveId};
use thiserror::Error;

use crate::battle::state::{BattlerRef, Side};
use crate::sinks::AnimationTicket;

/// Main error type for the battle engine.
///
/// Catalog and battle-state errors raised while resolving a turn are fatal for the battle
/// they came from: it is marked aborted and refuses further work. Action errors only
/// reject the submission. Effects that simply do not apply are reported as `false`, never
/// as errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BattleEngineError {
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("battle state error: {0}")]
    BattleState(#[from] BattleStateError),
    #[error("action error: {0}")]
    Action(#[from] ActionError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    /// The battle was aborted by an earlier fatal error.
    #[error("battle was aborted and can no longer be simulated")]
    Aborted,
}

/// Errors related to catalog lookups and loading
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("move not found: {0:?}")]
    MoveNotFound(MoveId),
    #[error("ability not found: {0:?}")]
    AbilityNotFound(AbilityId),
    #[error("duplicate move id: {0:?}")]
    DuplicateMove(MoveId),
    #[error("duplicate ability id: {0:?}")]
    DuplicateAbility(AbilityId),
    #[error("malformed catalog data: {0}")]
    MalformedData(String),
}

/// Errors related to battle state validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BattleStateError {
    #[error("no combatant at {0:?}")]
    NoSuchCombatant(BattlerRef),
    #[error("{0:?} has no team")]
    EmptyTeam(Side),
    #[error("{0:?} has no combatant able to battle")]
    NoActiveCombatant(Side),
    #[error("phase queue corrupted: {0}")]
    QueueCorrupted(String),
    #[error("resumed with ticket {got:?} while waiting on {expected:?}")]
    UnexpectedResume {
        expected: Option<AnimationTicket>,
        got: AnimationTicket,
    },
    #[error("battle is suspended on a presentation callback")]
    Suspended,
}

/// Errors related to player actions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("invalid move index: {0}")]
    InvalidMoveIndex(usize),
    #[error("move at index {0} has no PP left")]
    NoPpLeft(usize),
    #[error("invalid team index: {0}")]
    InvalidTeamIndex(usize),
    #[error("team member {0} cannot be switched in")]
    CannotSwitchTo(usize),
    #[error("{0:?} already submitted an action")]
    AlreadySubmitted(Side),
    #[error("battle is not accepting actions")]
    NotAcceptingActions,
}

/// Errors related to loading and validating a battle configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("could not parse config: {0}")]
    Parse(String),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Type alias for Results using BattleEngineError
pub type BattleResult<T> = Result<T, BattleEngineError>;

/// Type alias for Results using CatalogError
pub type CatalogResult<T> = Result<T, CatalogError>;
