//! Runs one AI-versus-AI battle over the bundled demo catalog and prints the log.
//!
//! Usage: `battle-sim [--json] [config.ron]`. `--json` prints the raw event log instead
//! of the rendered messages. Set `RUST_LOG=battle_engine=debug` for scheduler tracing
//! on stderr.

use std::error::Error;
use std::sync::Arc;

use battle_engine::{
    Battle, BattleConfig, BattlePlayer, BattleRunner, BattleState, Combatant, MoveCatalog,
    MoveSlot, PokemonType, ScoringAI,
};
use tracing::info;

const DEMO_CATALOG: &str = include_str!("../data/demo_catalog.ron");

struct Blueprint {
    name: &'static str,
    types: &'static [PokemonType],
    stats: [u16; 6],
    ability: &'static str,
    moves: &'static [&'static str],
}

const PLAYER_TEAM: &[Blueprint] = &[
    Blueprint {
        name: "Voltmouse",
        types: &[PokemonType::Electric],
        stats: [125, 75, 55, 70, 65, 110],
        ability: "Static",
        moves: &["Thunderbolt", "Quick Attack", "Thunder Wave", "Double Slap"],
    },
    Blueprint {
        name: "Emberpup",
        types: &[PokemonType::Fire],
        stats: [140, 95, 65, 80, 65, 80],
        ability: "Intimidate",
        moves: &["Ember", "Bite", "Swords Dance", "Double-Edge"],
    },
    Blueprint {
        name: "Pebblemite",
        types: &[PokemonType::Rock, PokemonType::Ground],
        stats: [135, 100, 120, 40, 50, 40],
        ability: "Sturdy",
        moves: &["Earthquake", "Stealth Rock", "Explosion", "Tackle"],
    },
];

const ENEMY_TEAM: &[Blueprint] = &[
    Blueprint {
        name: "Tidecrab",
        types: &[PokemonType::Water],
        stats: [130, 90, 100, 60, 60, 75],
        ability: "Swift Swim",
        moves: &["Water Gun", "Slash", "Protect", "Toxic"],
    },
    Blueprint {
        name: "Sporeling",
        types: &[PokemonType::Grass, PokemonType::Poison],
        stats: [135, 60, 80, 95, 90, 65],
        ability: "Overcoat",
        moves: &["Giga Drain", "Sleep Powder", "Toxic Spikes", "Recover"],
    },
    Blueprint {
        name: "Mindmoth",
        types: &[PokemonType::Psychic],
        stats: [120, 50, 60, 110, 95, 90],
        ability: "Levitate",
        moves: &["Psychic", "Trick Room", "Reflect", "Seismic Toss"],
    },
];

fn build_team(catalog: &MoveCatalog, blueprints: &[Blueprint]) -> Result<Vec<Combatant>, String> {
    blueprints
        .iter()
        .map(|bp| {
            let moves = bp
                .moves
                .iter()
                .map(|name| {
                    catalog
                        .find_move(name)
                        .map(|m| MoveSlot::new(m.id, m.pp))
                        .ok_or_else(|| format!("no move named {name}"))
                })
                .collect::<Result<Vec<_>, _>>()?;
            let ability = catalog
                .find_ability(bp.ability)
                .map(|a| a.id)
                .ok_or_else(|| format!("no ability named {}", bp.ability))?;
            Ok(Combatant::new(bp.name, 50, bp.types.to_vec(), bp.stats, ability, moves))
        })
        .collect()
}

fn run() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let json = args.iter().any(|a| a == "--json");
    let config = match args.iter().find(|a| !a.starts_with("--")) {
        Some(path) => BattleConfig::from_ron_str(&std::fs::read_to_string(path)?)?,
        None => BattleConfig {
            max_turns: Some(100),
            ..BattleConfig::default()
        },
    };
    let catalog = Arc::new(MoveCatalog::from_ron_str(DEMO_CATALOG)?);
    info!(seed = config.seed, moves = catalog.moves().count(), "catalog loaded");

    let state = BattleState::new(
        "demo",
        BattlePlayer::new("p1", "Red", build_team(&catalog, PLAYER_TEAM)?),
        BattlePlayer::new("p2", "Blue", build_team(&catalog, ENEMY_TEAM)?),
    );
    let mut runner = BattleRunner::new(Battle::new(state, catalog, config)?);

    let ai = ScoringAI::new();
    runner.start()?;
    while !runner.is_battle_ended() {
        runner.auto_submit(&ai)?;
    }

    if json {
        println!("{}", serde_json::to_string_pretty(runner.events())?);
    } else {
        for line in runner.battle().events().formatted(runner.state()) {
            println!("{line}");
        }
    }
    info!(state = ?runner.game_state(), turns = runner.state().turn_number, "battle over");
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
