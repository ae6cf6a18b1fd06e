//! MTG Sim - Main Binary
//!
//! Plays a deck (Player 1) against one or more opponents many times and
//! reports whether it wins, loses or draws.

use clap::{CommandFactory, Parser};
use mtg_sim::{
    config::SimulationConfig,
    error::ErrorCategory,
    game::{GameLogger, VerbosityLevel},
    loader::load_decks,
    matches::{Match, MatchOptions, MatchType},
    simulation::{EarlyExit, SimulationHarness, SimulationReport},
    Result, SimError,
};
use std::path::PathBuf;
use std::sync::Arc;

/// Exit status for a configuration error
const EXIT_CONFIG: i32 = 10;
/// Exit status for unreadable decks or unknown cards
const EXIT_HARNESS: i32 = 11;
/// Exit status when any simulated game failed
const EXIT_SIMULATION_FAILURE: i32 = 20;

#[derive(Parser, Debug)]
#[command(name = "simulate")]
#[command(about = "Headless Magic: The Gathering match simulator", long_about = None)]
struct Cli {
    /// Game type: duel or commander (or a game type named in the config)
    #[arg(value_name = "MODE")]
    mode: Option<String>,

    /// Deck file (.dck or .txt); the first deck belongs to Player 1
    #[arg(short = 'd', long = "deck", value_name = "PATH")]
    decks: Vec<PathBuf>,

    /// Number of games to simulate
    #[arg(short = 'm', long, default_value_t = 1)]
    matches: usize,

    /// Simulation config file (JSON)
    #[arg(short = 'c', long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Base random seed; game i uses seed + i
    #[arg(long)]
    seed: Option<u64>,

    /// Output verbosity: silent/0, minimal/1, normal/2, verbose/3
    #[arg(short = 'v', long, default_value = "normal")]
    verbosity: VerbosityLevel,

    /// Run games in parallel (no early exit)
    #[arg(long)]
    parallel: bool,

    /// When to stop before all games are played: wins, any, never
    #[arg(long, default_value = "wins")]
    early_exit: EarlyExit,

    /// Player type for every seat (defaults to the config's)
    #[arg(long, value_name = "NAME")]
    player_type: Option<String>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let Some(mode) = cli.mode.clone() else {
        // No game type: show how to call us and leave successfully
        let _ = Cli::command().print_help();
        println!();
        std::process::exit(0);
    };

    let code = match run(cli, &mode).await {
        Ok(report) => {
            if report.has_failures() {
                EXIT_SIMULATION_FAILURE
            } else {
                report.verdict.exit_code()
            }
        }
        Err(e) => {
            eprintln!("Error: {e}");
            match e.category() {
                ErrorCategory::Configuration => EXIT_CONFIG,
                ErrorCategory::Harness => EXIT_HARNESS,
                ErrorCategory::Invariant => EXIT_SIMULATION_FAILURE,
            }
        }
    };
    std::process::exit(code);
}

async fn run(cli: Cli, mode: &str) -> Result<SimulationReport> {
    let config = SimulationConfig::load_or_default(cli.config.as_deref())?;
    let match_type = config.game_type_registry().get(mode)?;
    let player_type = cli
        .player_type
        .as_deref()
        .unwrap_or(&config.default_player_type);
    let controller = config.player_type_registry().get(player_type)?;
    let logger = GameLogger::with_verbosity(cli.verbosity);

    let options = match match_type {
        MatchType::TwoPlayerDuel => {
            if cli.decks.len() != 2 {
                return Err(SimError::Config(format!(
                    "duel needs exactly 2 decks, got {}",
                    cli.decks.len()
                )));
            }
            MatchOptions::duel()
        }
        MatchType::CommanderFreeForAll => {
            if cli.decks.len() < 2 {
                return Err(SimError::Config(format!(
                    "commander needs at least 2 decks, got {}",
                    cli.decks.len()
                )));
            }
            MatchOptions::commander(cli.decks.len())
        }
    }
    .with_free_mulligans(config.free_mulligans);

    logger.normal("Loading deck files...");
    let (lists, duration) = load_decks(&cli.decks).await?;
    logger.verbose(&format!("  (Loading time: {:.2}ms)", duration.as_secs_f64() * 1000.0));
    let registry = config.card_registry()?;

    let mut game_match = Match::new(options)?;
    for (i, list) in lists.iter().enumerate() {
        let deck = list.resolve(&registry)?;
        logger.normal(&format!(
            "  Player {}: {} ({} cards)",
            i + 1,
            deck.name,
            deck.len()
        ));
        game_match.add_player(format!("Player {}", i + 1), Arc::new(deck), controller)?;
    }

    let mut template = game_match.create_game(false)?;
    template.options_mut().max_turns = config.max_turns;
    template.state_mut().logger.set_verbosity(cli.verbosity);

    let base_seed = cli.seed.or(config.seed).unwrap_or_else(rand::random);
    template.reseed(base_seed);
    let starting_player = match match_type {
        MatchType::TwoPlayerDuel => template
            .state()
            .players
            .first()
            .map(|p| p.id)
            .ok_or_else(|| SimError::Config("game has no players".to_string()))?,
        MatchType::CommanderFreeForAll => template.choose_random_starting_player()?,
    };
    logger.normal(&format!(
        "Simulating {} game(s) of {} with seed {base_seed}",
        cli.matches,
        match_type.game_type_name()
    ));

    let harness = SimulationHarness::new(cli.matches)
        .with_seed(base_seed)
        .with_early_exit(cli.early_exit)
        .with_logger(logger);
    let parallel = cli.parallel;
    tokio::task::spawn_blocking(move || {
        if parallel {
            harness.run_parallel(&template, starting_player)
        } else {
            harness.run(&template, starting_player)
        }
    })
    .await?
}
