//! Random AI controller for baseline gameplay
//!
//! Every random choice is drawn from the game RNG through the view, so a
//! seeded game replays identically and copied games diverge only through
//! their seeds.

use crate::core::{CardId, PlayerId, SpellAbility, Target};
use crate::game::controller::{GameStateView, OptionalChoice, PlayerController, TargetRequest};
use rand::seq::SliceRandom;
use rand::Rng;
use smallvec::SmallVec;

/// A controller that makes random choices
#[derive(Debug, Clone)]
pub struct RandomController {
    player_id: PlayerId,
    /// Chance of passing priority when something could be played
    pass_probability: f64,
}

impl RandomController {
    pub fn new(player_id: PlayerId) -> Self {
        RandomController {
            player_id,
            pass_probability: 0.3,
        }
    }

    pub fn with_pass_probability(mut self, p: f64) -> Self {
        self.pass_probability = p.clamp(0.0, 1.0);
        self
    }
}

impl PlayerController for RandomController {
    fn player_id(&self) -> PlayerId {
        self.player_id
    }

    fn choose_spell_ability_to_play(
        &mut self,
        view: &GameStateView,
        available: &[SpellAbility],
    ) -> Option<SpellAbility> {
        let mut rng = view.rng();
        if available.is_empty() || rng.gen_bool(self.pass_probability) {
            return None;
        }
        available.choose(&mut *rng).copied()
    }

    fn choose_targets(&mut self, view: &GameStateView, request: &TargetRequest) -> SmallVec<[Target; 2]> {
        let mut rng = view.rng();
        let min = request.spec.min_required().min(request.candidates.len());
        let max = request.spec.max.min(request.candidates.len());
        let count = if max > min { rng.gen_range(min..=max) } else { min };
        request
            .candidates
            .choose_multiple(&mut *rng, count)
            .copied()
            .collect()
    }

    fn choose_to_use_optional(&mut self, view: &GameStateView, _choice: &OptionalChoice) -> bool {
        view.rng().gen_bool(0.5)
    }

    fn choose_attackers(
        &mut self,
        view: &GameStateView,
        available: &[CardId],
        defenders: &[PlayerId],
    ) -> SmallVec<[(CardId, PlayerId); 4]> {
        let mut rng = view.rng();
        let mut attacks = SmallVec::new();
        if defenders.is_empty() {
            return attacks;
        }
        for &creature in available {
            if rng.gen_bool(0.5) {
                if let Some(&defender) = defenders.choose(&mut *rng) {
                    attacks.push((creature, defender));
                }
            }
        }
        attacks
    }

    fn choose_blockers(
        &mut self,
        view: &GameStateView,
        available_blockers: &[CardId],
        attackers: &[CardId],
    ) -> SmallVec<[(CardId, CardId); 4]> {
        let mut rng = view.rng();
        let mut blocks = SmallVec::new();
        if attackers.is_empty() {
            return blocks;
        }
        for &blocker in available_blockers {
            if rng.gen_bool(0.5) {
                if let Some(&attacker) = attackers.choose(&mut *rng) {
                    blocks.push((blocker, attacker));
                }
            }
        }
        blocks
    }

    fn choose_cards_to_discard(
        &mut self,
        view: &GameStateView,
        hand: &[CardId],
        count: usize,
    ) -> SmallVec<[CardId; 7]> {
        hand.choose_multiple(&mut *view.rng(), count.min(hand.len()))
            .copied()
            .collect()
    }

    fn keep_hand(&mut self, view: &GameStateView, hand: &[CardId], _mulligans_taken: u8) -> bool {
        let lands = hand
            .iter()
            .filter(|&&c| view.get_card(c).is_some_and(|card| card.is_land()))
            .count();
        (2..=5).contains(&lands) || hand.len() <= 5
    }

    fn choose_cards_to_bottom(
        &mut self,
        view: &GameStateView,
        hand: &[CardId],
        count: usize,
    ) -> SmallVec<[CardId; 7]> {
        hand.choose_multiple(&mut *view.rng(), count.min(hand.len()))
            .copied()
            .collect()
    }

    fn box_clone(&self) -> Box<dyn PlayerController> {
        Box::new(self.clone())
    }
}
