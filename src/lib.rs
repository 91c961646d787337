// In: src/lib.rs

//! Battle Engine
//!
//! A turn-based creature battle engine driven by a phase queue. Moves and abilities are
//! catalog data made of ordered attribute lists; the engine gives those attributes their
//! behaviour. Presentation and persistence sit behind sink traits so the same battle runs
//! headless, under a UI that animates asynchronously, or inside AI lookahead.

// --- MODULE DECLARATIONS ---
pub mod battle;
pub mod catalog;
pub mod config;
pub mod errors;
pub mod player;
pub mod pokemon;
pub mod rng;
pub mod sinks;

// --- PUBLIC API RE-EXPORTS ---

// --- From the `schema` crate ---
// Catalog vocabulary: identifiers, definitions and the attribute sets.
pub use schema::{
    AbilityAttr, AbilityData, AbilityId, ArenaTagSide, ArenaTagType, BattleStat,
    BattlerTagType, CatalogFile, MoveAttr, MoveCategory, MoveData, MoveId, MoveTarget,
    PokemonType, StatusEffect, TerrainType, WeatherType,
};

// --- From this crate's modules (`src/`) ---

// The scheduler and the turn-level front end.
pub use battle::ai::{Behavior, ScoringAI};
pub use battle::engine::{Battle, RunStatus, StepOutcome};
pub use battle::runner::{BattleRunner, ExecutionResult};
pub use battle::state::{
    BattleEvent, BattleOutcome, BattleState, BattlerRef, EventBus, GameState, Side,
};

// Runtime types for a battle.
pub use player::{BattlePlayer, PlayerAction};
pub use pokemon::{Combatant, MoveSlot};

// Data, configuration and the boundaries to the outside.
pub use catalog::{Catalog, MoveCatalog};
pub use config::BattleConfig;
pub use rng::{BattleRng, ScriptedRng, SeededRng};
pub use sinks::{
    AnimationRef, AnimationTicket, Completion, HeadlessSink, PersistenceSink,
    PresentationSink, RecordingSink,
};

// Crate-specific error and result types.
pub use errors::{
    ActionError, BattleEngineError, BattleResult, BattleStateError, CatalogError, ConfigError,
};
