//! Directed player-to-opponent bindings

use crate::core::{PlayerId, PlayerName};
use crate::loader::Deck;
use crate::matches::MatchOptions;
use std::sync::Arc;

/// What one player knows about one opponent within a match
///
/// There is one binding per ordered (player, opponent) pair. The
/// `Arc<MatchOptions>` is the shared match context: every binding created
/// by one match holds the same allocation, and `same_match` compares by
/// pointer.
#[derive(Debug, Clone)]
pub struct MatchPlayer {
    pub player: PlayerId,
    pub opponent: PlayerId,
    pub opponent_name: PlayerName,
    pub opponent_deck: Option<Arc<Deck>>,
    pub options: Arc<MatchOptions>,
}

impl MatchPlayer {
    pub fn new(
        player: PlayerId,
        opponent: PlayerId,
        opponent_name: PlayerName,
        opponent_deck: Option<Arc<Deck>>,
        options: Arc<MatchOptions>,
    ) -> Self {
        MatchPlayer {
            player,
            opponent,
            opponent_name,
            opponent_deck,
            options,
        }
    }

    /// Both bindings belong to the same match
    pub fn same_match(&self, other: &MatchPlayer) -> bool {
        Arc::ptr_eq(&self.options, &other.options)
    }
}
