//! Game initialization from resolved decks

use crate::core::PlayerId;
use crate::game::GameState;
use crate::loader::Deck;
use crate::zones::Zone;
use crate::Result;
use std::sync::Arc;

/// Puts decks into a game state
pub struct GameInitializer;

impl GameInitializer {
    /// Create a library card for every main deck card and put commanders in the command zone
    ///
    /// Libraries keep deck list order; shuffling happens when the game starts.
    /// The top of a library is its last card, so the list is added in reverse
    /// to make the first listed card the top one.
    pub fn load_deck_into_game(game: &mut GameState, player_id: PlayerId, deck: &Deck) -> Result<()> {
        for definition in deck.main.iter().rev() {
            game.create_card(Arc::clone(definition), player_id, Zone::Library)?;
        }
        for definition in &deck.commanders {
            let id = game.create_card(Arc::clone(definition), player_id, Zone::Command)?;
            game.cards.get_mut(id)?.is_commander = true;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::DeckLoader;
    use crate::registry::CardRegistry;

    #[test]
    fn test_library_order_and_commanders() {
        let registry = CardRegistry::builtin();
        let deck = DeckLoader::parse("1 Lumengrid Sentinel\n59 Island\n[Commander]\n1 Zur the Enchanter\n")
            .unwrap()
            .resolve(&registry)
            .unwrap();

        let mut game = GameState::new();
        let p1 = game.add_player("Player 1", 40);
        GameInitializer::load_deck_into_game(&mut game, p1, &deck).unwrap();

        assert_eq!(game.library(p1).len(), 60);
        let top = *game.library(p1).last().unwrap();
        assert_eq!(game.cards.get(top).unwrap().name(), "Lumengrid Sentinel");

        let command = &game.get_player_zones(p1).unwrap().command.cards;
        assert_eq!(command.len(), 1);
        assert!(game.cards.get(command[0]).unwrap().is_commander);
    }
}
