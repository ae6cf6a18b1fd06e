//! Deck loaders
//!
//! Parsers for deck lists (.dck and plain text) and the code that puts
//! resolved decks into a game.

pub mod deck;
pub mod deck_async;
pub mod game_init;

pub use deck::{Deck, DeckEntry, DeckList, DeckLoader};
pub use deck_async::{load_deck_async, load_decks};
pub use game_init::GameInitializer;
