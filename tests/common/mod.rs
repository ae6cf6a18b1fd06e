//! Shared fixtures for the integration tests

#![allow(dead_code)]

use mtg_sim::game::{Game, OutputMode, VerbosityLevel};
use mtg_sim::loader::{Deck, DeckLoader};
use mtg_sim::matches::{Match, MatchOptions};
use mtg_sim::registry::{CardRegistry, ControllerKind};
use std::path::Path;
use std::sync::Arc;

pub fn load_deck(registry: &CardRegistry, path: &str) -> Arc<Deck> {
    let list = DeckLoader::load_from_file(Path::new(path)).unwrap();
    Arc::new(list.resolve(registry).unwrap())
}

/// Green Stompy (Player 1) against Red Burn, logging to memory only
pub fn duel_template(controller: ControllerKind) -> Game {
    let registry = CardRegistry::builtin();
    let mut game_match = Match::new(MatchOptions::duel()).unwrap();
    game_match
        .add_player("Player 1", load_deck(&registry, "test_decks/green_stompy.dck"), controller)
        .unwrap();
    game_match
        .add_player("Player 2", load_deck(&registry, "test_decks/red_burn.dck"), controller)
        .unwrap();
    let mut game = game_match.create_game(false).unwrap();
    quiet(&mut game);
    game
}

/// Four-player commander pod alternating the two commander decks
pub fn commander_template(players: usize) -> Game {
    let registry = CardRegistry::builtin();
    let decks = [
        load_deck(&registry, "test_decks/zur_esper.dck"),
        load_deck(&registry, "test_decks/kamahl_selesnya.dck"),
    ];
    let mut game_match = Match::new(MatchOptions::commander(players)).unwrap();
    for i in 0..players {
        game_match
            .add_player(
                format!("Player {}", i + 1),
                Arc::clone(&decks[i % 2]),
                ControllerKind::Heuristic,
            )
            .unwrap();
    }
    let mut game = game_match.create_game(false).unwrap();
    quiet(&mut game);
    game
}

pub fn quiet(game: &mut Game) {
    let logger = &mut game.state_mut().logger;
    logger.set_output_mode(OutputMode::Memory);
    logger.set_verbosity(VerbosityLevel::Normal);
}
