//! Zero controller for testing and automation
//!
//! Always takes the first option it is offered:
//! - Plays or casts the first available action
//! - Chooses the first legal targets
//! - Attacks with everything at the first defender
//! - Blocks attackers one-to-one in the order given
//! - Discards and bottoms the first cards in hand

use crate::core::{CardId, PlayerId, SpellAbility, Target};
use crate::game::controller::{GameStateView, OptionalChoice, PlayerController, TargetRequest};
use smallvec::SmallVec;

/// A controller that always chooses index 0
///
/// Fully deterministic without touching the game RNG, which makes it the
/// reference player for engine tests and benchmarks.
#[derive(Debug, Clone)]
pub struct ZeroController {
    player_id: PlayerId,
}

impl ZeroController {
    pub fn new(player_id: PlayerId) -> Self {
        ZeroController { player_id }
    }
}

impl PlayerController for ZeroController {
    fn player_id(&self) -> PlayerId {
        self.player_id
    }

    fn choose_spell_ability_to_play(
        &mut self,
        _view: &GameStateView,
        available: &[SpellAbility],
    ) -> Option<SpellAbility> {
        available.first().copied()
    }

    fn choose_targets(&mut self, _view: &GameStateView, request: &TargetRequest) -> SmallVec<[Target; 2]> {
        let count = request.spec.min_required().max(1).min(request.spec.max);
        request.candidates.iter().take(count).copied().collect()
    }

    fn choose_to_use_optional(&mut self, _view: &GameStateView, _choice: &OptionalChoice) -> bool {
        true
    }

    fn choose_attackers(
        &mut self,
        _view: &GameStateView,
        available: &[CardId],
        defenders: &[PlayerId],
    ) -> SmallVec<[(CardId, PlayerId); 4]> {
        match defenders.first() {
            Some(&defender) => available.iter().map(|&a| (a, defender)).collect(),
            None => SmallVec::new(),
        }
    }

    fn choose_blockers(
        &mut self,
        _view: &GameStateView,
        available_blockers: &[CardId],
        attackers: &[CardId],
    ) -> SmallVec<[(CardId, CardId); 4]> {
        available_blockers
            .iter()
            .zip(attackers.iter())
            .map(|(&blocker, &attacker)| (blocker, attacker))
            .collect()
    }

    fn choose_cards_to_discard(
        &mut self,
        _view: &GameStateView,
        hand: &[CardId],
        count: usize,
    ) -> SmallVec<[CardId; 7]> {
        hand.iter().take(count).copied().collect()
    }

    fn keep_hand(&mut self, _view: &GameStateView, _hand: &[CardId], _mulligans_taken: u8) -> bool {
        true
    }

    fn choose_cards_to_bottom(
        &mut self,
        _view: &GameStateView,
        hand: &[CardId],
        count: usize,
    ) -> SmallVec<[CardId; 7]> {
        hand.iter().take(count).copied().collect()
    }

    fn box_clone(&self) -> Box<dyn PlayerController> {
        Box::new(self.clone())
    }
}
