//! Opening hands and mulligans
//!
//! Players decide one after another in turn order starting with the
//! starting player. Each mulligan shuffles the hand back and draws again;
//! the first `free_mulligans` cost nothing.
//!
//! - London: always draw seven, then put one card per paid mulligan on the
//!   bottom of the library.
//! - Paris: draw one card fewer per paid mulligan.
//! - Vancouver: as Paris, and after keeping a mulliganed hand the player
//!   looks at the top card and may put it on the bottom.

use crate::core::{CardId, PlayerId};
use crate::game::controller::{controller_for, exact_cards, GameStateView, OptionalChoice, PlayerController};
use crate::game::GameState;
use crate::zones::Zone;
use crate::Result;
use serde::{Deserialize, Serialize};

pub const OPENING_HAND_SIZE: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MulliganType {
    /// The format's default rule, currently London
    #[default]
    GameDefault,
    London,
    Vancouver,
    Paris,
}

impl MulliganType {
    /// The concrete rule this type stands for
    pub fn resolved(self) -> MulliganType {
        match self {
            MulliganType::GameDefault => MulliganType::London,
            other => other,
        }
    }
}

impl std::str::FromStr for MulliganType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "default" | "gamedefault" | "game_default" => Ok(MulliganType::GameDefault),
            "london" => Ok(MulliganType::London),
            "vancouver" => Ok(MulliganType::Vancouver),
            "paris" => Ok(MulliganType::Paris),
            _ => Err(format!("unknown mulligan type '{s}'")),
        }
    }
}

/// Draw up to `count` cards without ever drawing from an empty library
fn draw_up_to(game: &mut GameState, player: PlayerId, count: usize) -> Result<()> {
    let available = game.library(player).len().min(count);
    for _ in 0..available {
        game.draw_card(player)?;
    }
    Ok(())
}

fn shuffle_hand_into_library(game: &mut GameState, player: PlayerId) -> Result<()> {
    let hand: Vec<CardId> = game.hand(player).to_vec();
    for card in hand {
        game.move_card(card, Zone::Library)?;
    }
    game.shuffle_library(player);
    Ok(())
}

/// Deal opening hands and let every player mulligan
pub fn run_mulligans(
    game: &mut GameState,
    controllers: &mut [Box<dyn PlayerController>],
    mulligan_type: MulliganType,
    free_mulligans: u8,
) -> Result<()> {
    let rule = mulligan_type.resolved();
    let order = game.players_in_turn_order(game.turn.active_player);

    for player in order {
        draw_up_to(game, player, OPENING_HAND_SIZE)?;

        let mut taken: u8 = 0;
        loop {
            let hand = game.hand(player).to_vec();
            if hand.is_empty() || taken as usize >= OPENING_HAND_SIZE {
                break;
            }
            let view = GameStateView::new(game, player);
            if controller_for(controllers, player)?.keep_hand(&view, &hand, taken) {
                break;
            }

            taken += 1;
            let paid = taken.saturating_sub(free_mulligans) as usize;
            game.logger.normal(&format!("{} mulligans", game.player_name(player)));
            shuffle_hand_into_library(game, player)?;
            let draw = match rule {
                MulliganType::Paris | MulliganType::Vancouver => OPENING_HAND_SIZE.saturating_sub(paid),
                _ => OPENING_HAND_SIZE,
            };
            draw_up_to(game, player, draw)?;
        }

        let paid = taken.saturating_sub(free_mulligans) as usize;
        match rule {
            MulliganType::London if paid > 0 => {
                let hand = game.hand(player).to_vec();
                let count = paid.min(hand.len());
                let view = GameStateView::new(game, player);
                let picked = controller_for(controllers, player)?.choose_cards_to_bottom(&view, &hand, count);
                for card in exact_cards(&picked, &hand, count) {
                    game.put_on_bottom_of_library(card)?;
                }
            }
            MulliganType::Vancouver if taken > 0 => scry_one(game, controllers, player)?,
            _ => {}
        }

        game.logger.normal(&format!(
            "{} keeps {} cards",
            game.player_name(player),
            game.hand(player).len()
        ));
    }
    Ok(())
}

/// Look at the top card and optionally put it on the bottom
fn scry_one(game: &mut GameState, controllers: &mut [Box<dyn PlayerController>], player: PlayerId) -> Result<()> {
    let Some(&top) = game.library(player).last() else {
        return Ok(());
    };
    let description = format!("put {} on the bottom of your library", game.describe_card(top));
    let choice = OptionalChoice {
        source: None,
        description: &description,
    };
    let view = GameStateView::new(game, player);
    if controller_for(controllers, player)?.choose_to_use_optional(&view, &choice) {
        game.put_on_bottom_of_library(top)?;
    }
    Ok(())
}
