//! Player decision interface and game state view
//!
//! The game engine calls a `PlayerController` whenever a decision has to be
//! made. Controllers only get a read-only `GameStateView`; every call is
//! synchronous and must return without blocking on I/O. The engine
//! validates whatever comes back, so a controller can never make an
//! illegal choice stick.

use crate::core::{Card, CardId, PlayerId, SpellAbility, Target, TargetSpec};
use crate::game::phase::Step;
use crate::game::GameState;
use crate::{Result, SimError};
use rand_chacha::ChaCha12Rng;
use smallvec::SmallVec;
use std::cell::RefMut;

/// Read-only view of game state for controllers
pub struct GameStateView<'a> {
    game: &'a GameState,
    player_id: PlayerId,
}

impl<'a> GameStateView<'a> {
    pub fn new(game: &'a GameState, player_id: PlayerId) -> Self {
        GameStateView { game, player_id }
    }

    pub fn player_id(&self) -> PlayerId {
        self.player_id
    }

    /// Full read access, for controllers that need more than the helpers
    pub fn game(&self) -> &'a GameState {
        self.game
    }

    pub fn hand(&self) -> &[CardId] {
        self.game.hand(self.player_id)
    }

    pub fn battlefield(&self) -> &[CardId] {
        &self.game.battlefield.cards
    }

    pub fn get_card(&self, card_id: CardId) -> Option<&'a Card> {
        self.game.cards.get(card_id).ok()
    }

    pub fn life(&self, player: PlayerId) -> i32 {
        self.game.get_player(player).map(|p| p.life).unwrap_or(0)
    }

    pub fn my_life(&self) -> i32 {
        self.life(self.player_id)
    }

    /// Opponents still in the game, in turn order after this player
    pub fn opponents(&self) -> SmallVec<[PlayerId; 4]> {
        self.game
            .players_in_turn_order(self.player_id)
            .into_iter()
            .filter(|p| *p != self.player_id)
            .collect()
    }

    pub fn power(&self, card: CardId) -> i32 {
        self.game.power(card)
    }

    pub fn toughness(&self, card: CardId) -> i32 {
        self.game.toughness(card)
    }

    pub fn current_step(&self) -> Step {
        self.game.turn.current_step
    }

    pub fn active_player(&self) -> PlayerId {
        self.game.turn.active_player
    }

    pub fn turn_number(&self) -> u32 {
        self.game.turn.turn_number
    }

    /// Permanents this player controls
    pub fn my_permanents(&self) -> impl Iterator<Item = CardId> + 'a {
        self.game.permanents_controlled_by(self.player_id)
    }

    pub fn player_name(&self) -> &str {
        self.game.player_name(self.player_id)
    }

    /// The game's RNG
    ///
    /// Controllers that randomize draw from the game RNG so a seeded game
    /// replays identically. The borrow must be dropped before returning.
    pub fn rng(&self) -> RefMut<'a, ChaCha12Rng> {
        self.game.rng.borrow_mut()
    }
}

/// A request to choose targets for a spell or ability
#[derive(Debug, Clone)]
pub struct TargetRequest<'a> {
    pub source: Option<CardId>,
    pub description: &'a str,
    pub spec: &'a TargetSpec,
    /// Every currently legal target, in a deterministic order
    pub candidates: &'a [Target],
    /// The effect hurts what it targets
    pub harmful: bool,
}

/// A "you may" decision on resolution
#[derive(Debug, Clone)]
pub struct OptionalChoice<'a> {
    pub source: Option<CardId>,
    pub description: &'a str,
}

/// Decision interface implemented by every kind of player
pub trait PlayerController: Send {
    fn player_id(&self) -> PlayerId;

    /// Choose something to do with priority, or `None` to pass
    ///
    /// `available` only contains actions that are legal and affordable now.
    fn choose_spell_ability_to_play(
        &mut self,
        view: &GameStateView,
        available: &[SpellAbility],
    ) -> Option<SpellAbility>;

    /// Choose targets from `request.candidates`
    ///
    /// Anything not among the candidates is dropped, duplicates are dropped,
    /// and the engine fills up to the required minimum.
    fn choose_targets(&mut self, view: &GameStateView, request: &TargetRequest) -> SmallVec<[Target; 2]>;

    /// Decide whether to use a "you may" ability as it resolves
    fn choose_to_use_optional(&mut self, view: &GameStateView, choice: &OptionalChoice) -> bool;

    /// Choose attackers and whom each attacks
    fn choose_attackers(
        &mut self,
        view: &GameStateView,
        available: &[CardId],
        defenders: &[PlayerId],
    ) -> SmallVec<[(CardId, PlayerId); 4]>;

    /// Choose (blocker, attacker) pairs
    fn choose_blockers(
        &mut self,
        view: &GameStateView,
        available_blockers: &[CardId],
        attackers: &[CardId],
    ) -> SmallVec<[(CardId, CardId); 4]>;

    /// Choose exactly `count` cards from `hand` to discard
    fn choose_cards_to_discard(
        &mut self,
        view: &GameStateView,
        hand: &[CardId],
        count: usize,
    ) -> SmallVec<[CardId; 7]>;

    /// Keep the opening hand, or take another mulligan
    fn keep_hand(&mut self, view: &GameStateView, hand: &[CardId], mulligans_taken: u8) -> bool;

    /// Choose exactly `count` cards to put on the bottom of the library
    fn choose_cards_to_bottom(
        &mut self,
        view: &GameStateView,
        hand: &[CardId],
        count: usize,
    ) -> SmallVec<[CardId; 7]>;

    /// Independent copy for a copied game
    fn box_clone(&self) -> Box<dyn PlayerController>;

    fn on_priority_passed(&mut self, _view: &GameStateView) {}

    fn on_game_end(&mut self, _view: &GameStateView, _won: bool) {}
}

impl Clone for Box<dyn PlayerController> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

/// Find the controller for a player
pub fn controller_for(
    controllers: &mut [Box<dyn PlayerController>],
    player: PlayerId,
) -> Result<&mut Box<dyn PlayerController>> {
    controllers
        .iter_mut()
        .find(|c| c.player_id() == player)
        .ok_or_else(|| SimError::Invariant(format!("no controller for player {player}")))
}

/// Keep only valid, distinct picks from `hand` and top up to `count` from the front
pub(crate) fn exact_cards(picked: &[CardId], hand: &[CardId], count: usize) -> SmallVec<[CardId; 7]> {
    let mut result: SmallVec<[CardId; 7]> = SmallVec::new();
    for card in picked.iter().chain(hand.iter()) {
        if result.len() >= count {
            break;
        }
        if hand.contains(card) && !result.contains(card) {
            result.push(*card);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_cards_validates_and_fills() {
        let hand = [CardId::new(1), CardId::new(2), CardId::new(3)];
        let picked = [CardId::new(9), CardId::new(3), CardId::new(3)];
        let result = exact_cards(&picked, &hand, 2);
        assert_eq!(result.as_slice(), &[CardId::new(3), CardId::new(1)]);
    }

    #[test]
    fn test_view_opponents_in_turn_order() {
        let mut game = GameState::new();
        let p1 = game.add_player("Player 1", 40);
        let p2 = game.add_player("Player 2", 40);
        let p3 = game.add_player("Player 3", 40);

        let view = GameStateView::new(&game, p2);
        assert_eq!(view.opponents().as_slice(), &[p3, p1]);
        assert_eq!(view.my_life(), 40);
        assert_eq!(view.player_name(), "Player 2");
    }
}
