//! Heuristic AI controller
//!
//! Makes decisions from evaluation functions rather than search: creatures
//! are scored by stats and keywords, attacks and blocks by one-on-one
//! combat math, and targets by who benefits from the effect. This is the
//! default computer player of the simulator.

use crate::core::{CardId, Keyword, PlayerId, SpellAbility, Target};
use crate::game::combat::can_block;
use crate::game::controller::{GameStateView, OptionalChoice, PlayerController, TargetRequest};
use crate::game::phase::Step;
use smallvec::SmallVec;

/// Combat math for one attacker against the blockers it could meet
struct CombatFactors {
    /// Can a single blocker kill the attacker?
    can_be_killed_by_one: bool,
    /// Does the attacker kill every possible blocker one-on-one?
    can_kill_all: bool,
    /// Is every blocker that kills it worth at least as much as the attacker?
    is_worth_less_than_all_killers: bool,
    /// Gains value even when blocked (lifelink, deathtouch)
    has_combat_effect: bool,
    number_of_blockers: usize,
}

/// Heuristic AI controller
///
/// Owns no RNG and makes no random choices, so its games depend only on
/// the game seed.
#[derive(Debug, Clone)]
pub struct HeuristicController {
    player_id: PlayerId,
    /// 0 = very defensive, 3 = balanced, 5 = attack with everything
    aggression_level: i32,
}

impl HeuristicController {
    pub fn new(player_id: PlayerId) -> Self {
        HeuristicController {
            player_id,
            aggression_level: 3,
        }
    }

    pub fn with_aggression(mut self, level: i32) -> Self {
        self.aggression_level = level.clamp(0, 5);
        self
    }

    /// Score a creature by its stats, cost and keywords
    pub fn evaluate_creature(&self, view: &GameStateView, card_id: CardId) -> i32 {
        let Some(card) = view.get_card(card_id) else { return 0 };
        let game = view.game();
        let has = |k: Keyword| game.has_keyword(card_id, k);

        let power = view.power(card_id);
        let toughness = view.toughness(card_id);
        let mut value = 100 + power * 15 + toughness * 10 + card.definition.mana_cost.cmc() as i32 * 5;

        if has(Keyword::Flying) {
            value += power * 10;
        }
        if power > 0 {
            if has(Keyword::Deathtouch) {
                value += 25;
            }
            if has(Keyword::Lifelink) {
                value += power * 10;
            }
            if has(Keyword::Vigilance) {
                value += power * 5 + toughness * 5;
            }
        }
        if has(Keyword::Reach) && !has(Keyword::Flying) {
            value += 5;
        }
        if has(Keyword::Defender) {
            value -= power * 9 + 40;
        }
        if card.definition.abilities.iter().any(|a| a.as_activated().is_some()) {
            value += 10;
        }
        value
    }

    /// Rough value of any card in hand, for discards and bottoming
    fn card_value(&self, view: &GameStateView, card_id: CardId) -> i32 {
        match view.get_card(card_id) {
            Some(card) if card.is_creature() => self.evaluate_creature(view, card_id),
            Some(card) if card.is_land() => 90,
            Some(card) => 100 + card.definition.mana_cost.cmc() as i32 * 10,
            None => 0,
        }
    }

    fn kills(view: &GameStateView, source: CardId, victim: CardId) -> bool {
        let power = view.power(source);
        power > 0 && (power >= view.toughness(victim) || view.game().has_keyword(source, Keyword::Deathtouch))
    }

    fn calculate_combat_factors(&self, view: &GameStateView, attacker: CardId, defender: PlayerId) -> CombatFactors {
        let game = view.game();
        let attacker_value = self.evaluate_creature(view, attacker);
        let blockers: SmallVec<[CardId; 8]> = game
            .permanents_controlled_by(defender)
            .filter(|&b| can_block(game, b, attacker))
            .collect();

        let killers: SmallVec<[CardId; 8]> = blockers
            .iter()
            .copied()
            .filter(|&b| Self::kills(view, b, attacker))
            .collect();

        CombatFactors {
            can_be_killed_by_one: !killers.is_empty(),
            can_kill_all: blockers.iter().all(|&b| Self::kills(view, attacker, b)),
            is_worth_less_than_all_killers: killers
                .iter()
                .all(|&k| self.evaluate_creature(view, k) >= attacker_value),
            has_combat_effect: game.has_keyword(attacker, Keyword::Lifelink)
                || game.has_keyword(attacker, Keyword::Deathtouch),
            number_of_blockers: blockers.len(),
        }
    }

    fn should_attack(&self, view: &GameStateView, attacker: CardId, defender: PlayerId) -> bool {
        if view.power(attacker) <= 0 {
            return false;
        }
        let f = self.calculate_combat_factors(view, attacker, defender);
        if f.number_of_blockers == 0 {
            return true;
        }
        match self.aggression_level {
            5 => true,
            4 => f.can_kill_all || !f.can_be_killed_by_one,
            3 => (f.can_kill_all && f.is_worth_less_than_all_killers) || (f.has_combat_effect && !f.can_be_killed_by_one),
            2 => f.can_kill_all && !f.can_be_killed_by_one,
            1 => f.number_of_blockers == 1 && f.can_kill_all && !f.can_be_killed_by_one,
            _ => false,
        }
    }

    fn should_block(&self, view: &GameStateView, blocker: CardId, attacker: CardId) -> bool {
        let can_kill_attacker = Self::kills(view, blocker, attacker);
        let will_survive = !Self::kills(view, attacker, blocker);
        match (can_kill_attacker, will_survive) {
            (true, true) => true,
            (true, false) => self.evaluate_creature(view, attacker) >= self.evaluate_creature(view, blocker),
            (false, true) => self.evaluate_creature(view, blocker) < 130,
            (false, false) => false,
        }
    }

    fn choose_best_land(&self, view: &GameStateView, lands: &[CardId]) -> Option<CardId> {
        // Untapped lands and lands with more mana abilities first
        lands.iter().copied().max_by_key(|&land| {
            let Some(card) = view.get_card(land) else { return (false, 0, std::cmp::Reverse(land)) };
            let abilities = card.definition.abilities.len();
            (!card.definition.enters_tapped(), abilities, std::cmp::Reverse(land))
        })
    }
}

impl PlayerController for HeuristicController {
    fn player_id(&self) -> PlayerId {
        self.player_id
    }

    /// Land first, then the most valuable spell, then abilities, on our own turn only
    fn choose_spell_ability_to_play(
        &mut self,
        view: &GameStateView,
        available: &[SpellAbility],
    ) -> Option<SpellAbility> {
        if view.active_player() != self.player_id || !matches!(view.current_step(), Step::Main1 | Step::Main2) {
            return None;
        }

        let lands: SmallVec<[CardId; 4]> = available
            .iter()
            .filter(|sa| sa.is_land_ability())
            .map(|sa| sa.card_id())
            .collect();
        if let Some(land) = self.choose_best_land(view, &lands) {
            return Some(SpellAbility::PlayLand { card_id: land });
        }

        let best_spell = available
            .iter()
            .filter(|sa| matches!(sa, SpellAbility::CastSpell { .. }))
            .max_by_key(|sa| (self.card_value(view, sa.card_id()), std::cmp::Reverse(sa.card_id())));
        if let Some(spell) = best_spell {
            return Some(*spell);
        }

        available
            .iter()
            .find(|sa| matches!(sa, SpellAbility::ActivateAbility { .. }))
            .copied()
    }

    /// Harmful effects go to opponents' best permanents or the lowest opponent,
    /// beneficial effects to our own side
    fn choose_targets(&mut self, view: &GameStateView, request: &TargetRequest) -> SmallVec<[Target; 2]> {
        let game = view.game();
        let ours = |t: &Target| match *t {
            Target::Player(p) => p == self.player_id,
            Target::Permanent(c) => game.cards.get(c).is_ok_and(|card| card.controller() == self.player_id),
        };
        let mut preferred: SmallVec<[Target; 8]> = request
            .candidates
            .iter()
            .copied()
            .filter(|t| ours(t) != request.harmful)
            .collect();
        preferred.sort_by_key(|t| {
            std::cmp::Reverse(match *t {
                Target::Permanent(c) => self.card_value(view, c),
                Target::Player(p) => 1000 - view.life(p),
            })
        });

        let wanted = request.spec.min_required().max(1).min(request.spec.max);
        let mut chosen: SmallVec<[Target; 2]> = preferred.into_iter().take(wanted).collect();
        if chosen.len() < request.spec.min_required() {
            // Forced to pick from the wrong side; the engine tops up
            chosen.clear();
        }
        chosen
    }

    fn choose_to_use_optional(&mut self, _view: &GameStateView, _choice: &OptionalChoice) -> bool {
        true
    }

    fn choose_attackers(
        &mut self,
        view: &GameStateView,
        available: &[CardId],
        defenders: &[PlayerId],
    ) -> SmallVec<[(CardId, PlayerId); 4]> {
        let Some(&defender) = defenders.iter().min_by_key(|&&p| (view.life(p), p)) else {
            return SmallVec::new();
        };
        available
            .iter()
            .copied()
            .filter(|&a| self.should_attack(view, a, defender))
            .map(|a| (a, defender))
            .collect()
    }

    fn choose_blockers(
        &mut self,
        view: &GameStateView,
        available_blockers: &[CardId],
        attackers: &[CardId],
    ) -> SmallVec<[(CardId, CardId); 4]> {
        let game = view.game();
        let mut sorted: SmallVec<[CardId; 8]> = attackers.iter().copied().collect();
        sorted.sort_by_key(|&a| std::cmp::Reverse(self.evaluate_creature(view, a)));

        let incoming: i32 = attackers.iter().map(|&a| view.power(a)).sum();
        let in_danger = incoming >= view.my_life();

        let mut used: SmallVec<[CardId; 8]> = SmallVec::new();
        let mut blocks = SmallVec::new();
        for attacker in sorted {
            let candidates = available_blockers
                .iter()
                .copied()
                .filter(|b| !used.contains(b) && can_block(game, *b, attacker));
            let choice = candidates
                .clone()
                .filter(|&b| self.should_block(view, b, attacker))
                .min_by_key(|&b| self.evaluate_creature(view, b))
                .or_else(|| {
                    // Chump with the cheapest creature when the attack is lethal
                    in_danger
                        .then(|| candidates.min_by_key(|&b| self.evaluate_creature(view, b)))
                        .flatten()
                });
            if let Some(blocker) = choice {
                used.push(blocker);
                blocks.push((blocker, attacker));
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
        let mut cards: SmallVec<[CardId; 7]> = hand.iter().copied().collect();
        cards.sort_by_key(|&c| (self.card_value(view, c), c));
        cards.truncate(count);
        cards
    }

    fn keep_hand(&mut self, view: &GameStateView, hand: &[CardId], mulligans_taken: u8) -> bool {
        let lands = hand
            .iter()
            .filter(|&&c| view.get_card(c).is_some_and(|card| card.is_land()))
            .count();
        mulligans_taken >= 2 || (2..=5).contains(&lands)
    }

    fn choose_cards_to_bottom(
        &mut self,
        view: &GameStateView,
        hand: &[CardId],
        count: usize,
    ) -> SmallVec<[CardId; 7]> {
        let lands = hand
            .iter()
            .filter(|&&c| view.get_card(c).is_some_and(|card| card.is_land()))
            .count();
        let mut cards: SmallVec<[CardId; 7]> = hand.iter().copied().collect();
        // Keep about three lands; bottom the most expensive spells otherwise
        cards.sort_by_key(|&c| {
            let is_land = view.get_card(c).is_some_and(|card| card.is_land());
            let cmc = view.get_card(c).map_or(0, |card| card.definition.mana_cost.cmc() as i32);
            let priority = match (is_land, lands > 3) {
                (true, true) => 0,
                (true, false) => 100,
                (false, _) => 50 - cmc,
            };
            (priority, c)
        });
        cards.truncate(count);
        cards
    }

    fn box_clone(&self) -> Box<dyn PlayerController> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CardDefinition, CardType};
    use crate::game::GameState;
    use crate::zones::Zone;
    use std::sync::Arc;

    fn creature(name: &str, power: i32, toughness: i32) -> Arc<CardDefinition> {
        Arc::new(CardDefinition::new(name, &[CardType::Creature]).with_pt(power, toughness))
    }

    #[test]
    fn test_evaluation_prefers_bigger_and_evasive() {
        let mut game = GameState::new();
        let p1 = game.add_player("Player 1", 20);
        let bears = game.create_card(creature("Grizzly Bears", 2, 2), p1, Zone::Battlefield).unwrap();
        let giant = game.create_card(creature("Hill Giant", 3, 3), p1, Zone::Battlefield).unwrap();
        let flyer = Arc::new(
            CardDefinition::new("Wind Drake", &[CardType::Creature])
                .with_pt(2, 2)
                .with_keywords(&[Keyword::Flying]),
        );
        let drake = game.create_card(flyer, p1, Zone::Battlefield).unwrap();

        let controller = HeuristicController::new(p1);
        let view = GameStateView::new(&game, p1);
        assert!(controller.evaluate_creature(&view, giant) > controller.evaluate_creature(&view, bears));
        assert!(controller.evaluate_creature(&view, drake) > controller.evaluate_creature(&view, bears));
    }

    #[test]
    fn test_attacks_into_empty_board_but_not_into_bigger_blocker() {
        let mut game = GameState::new();
        let p1 = game.add_player("Player 1", 20);
        let p2 = game.add_player("Player 2", 20);
        let bears = game.create_card(creature("Grizzly Bears", 2, 2), p1, Zone::Battlefield).unwrap();

        let mut controller = HeuristicController::new(p1);
        {
            let view = GameStateView::new(&game, p1);
            assert_eq!(controller.choose_attackers(&view, &[bears], &[p2]).len(), 1);
        }

        game.create_card(creature("Hill Giant", 3, 3), p2, Zone::Battlefield).unwrap();
        let view = GameStateView::new(&game, p1);
        assert!(controller.choose_attackers(&view, &[bears], &[p2]).is_empty());
    }

    #[test]
    fn test_blocks_when_it_kills_and_survives() {
        let mut game = GameState::new();
        let p1 = game.add_player("Player 1", 20);
        let p2 = game.add_player("Player 2", 20);
        let giant = game.create_card(creature("Hill Giant", 3, 3), p1, Zone::Battlefield).unwrap();
        let bears = game.create_card(creature("Grizzly Bears", 2, 2), p2, Zone::Battlefield).unwrap();

        let mut controller = HeuristicController::new(p1);
        let view = GameStateView::new(&game, p1);
        let blocks = controller.choose_blockers(&view, &[giant], &[bears]);
        assert_eq!(blocks.as_slice(), &[(giant, bears)]);
    }
}
