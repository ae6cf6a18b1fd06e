//! Automatic mana payment
//!
//! Costs are paid greedily: mana already floating in the pool first, then
//! colored requirements from the permanents that can make that color
//! (least flexible sources first, so dual lands are kept for later), then
//! generic mana from whatever is left.

use crate::core::{CardId, Color, Keyword, ManaCost, ManaPool, PlayerId};
use crate::game::GameState;
use crate::{Result, SimError};
use smallvec::SmallVec;

/// An untapped permanent with at least one tap mana ability
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManaSource {
    pub card_id: CardId,
    /// (ability index, mana produced) for each mana ability of the card
    pub options: SmallVec<[(usize, ManaCost); 2]>,
}

impl ManaSource {
    fn option_for(&self, color: Color) -> Option<(usize, ManaCost)> {
        self.options.iter().copied().find(|(_, m)| m.amount(color) > 0)
    }
}

/// Which sources to tap, and with which ability
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PaymentPlan {
    pub taps: SmallVec<[(CardId, usize); 8]>,
}

/// Mana sources `player` could tap right now, in battlefield order
pub fn mana_sources(game: &GameState, player: PlayerId) -> Vec<ManaSource> {
    game.permanents_controlled_by(player)
        .filter_map(|card_id| {
            let card = game.cards.get(card_id).ok()?;
            let permanent = card.permanent.as_ref()?;
            if permanent.tapped {
                return None;
            }
            let sick = card.is_creature()
                && permanent.entered_turn >= game.turn.turn_number
                && !game.has_keyword(card_id, Keyword::Haste);
            if sick {
                return None;
            }
            let options: SmallVec<[(usize, ManaCost); 2]> = card
                .definition
                .abilities
                .iter()
                .enumerate()
                .filter_map(|(i, a)| a.as_activated().map(|act| (i, act)))
                .filter(|(_, act)| act.is_mana_ability() && act.cost.tap && act.cost.mana.is_empty())
                .map(|(i, act)| (i, act.mana_produced()))
                .collect();
            (!options.is_empty()).then_some(ManaSource { card_id, options })
        })
        .collect()
}

/// Plan a payment, or `None` if the cost cannot be paid
pub fn plan_payment(pool: &ManaPool, cost: &ManaCost, sources: &[ManaSource]) -> Option<PaymentPlan> {
    let mut order: SmallVec<[usize; 16]> = (0..sources.len()).collect();
    // Stable: ties keep battlefield order
    order.sort_by_key(|&i| sources[i].options.len());

    let mut available = *pool;
    let mut used: SmallVec<[bool; 16]> = SmallVec::from_elem(false, sources.len());
    let mut plan = PaymentPlan::default();

    for color in Color::ALL {
        while available.amount(color) < cost.amount(color) {
            let (slot, (ability, produced)) = order
                .iter()
                .filter(|&&i| !used[i])
                .find_map(|&i| sources[i].option_for(color).map(|o| (i, o)))?;
            used[slot] = true;
            available.add(&produced);
            plan.taps.push((sources[slot].card_id, ability));
        }
    }

    while available.total() < cost.cmc() {
        let slot = order.iter().copied().find(|&i| !used[i])?;
        let (ability, produced) = sources[slot].options[0];
        used[slot] = true;
        available.add(&produced);
        plan.taps.push((sources[slot].card_id, ability));
    }

    available.can_pay(cost).then_some(plan)
}

/// Could `player` pay `cost` with their pool and untapped sources?
pub fn can_pay(game: &GameState, player: PlayerId, cost: &ManaCost) -> bool {
    let Ok(p) = game.get_player(player) else { return false };
    if p.mana_pool.can_pay(cost) {
        return true;
    }
    plan_payment(&p.mana_pool, cost, &mana_sources(game, player)).is_some()
}

/// Tap sources as needed and pay `cost` from the pool
pub fn pay_cost(game: &mut GameState, player: PlayerId, cost: &ManaCost) -> Result<()> {
    let pool = game.get_player(player)?.mana_pool;
    let plan = plan_payment(&pool, cost, &mana_sources(game, player))
        .ok_or_else(|| SimError::InvalidAction(format!("{} cannot pay {cost}", game.player_name(player))))?;

    for (card, ability) in plan.taps {
        let produced = game
            .cards
            .get(card)?
            .definition
            .abilities
            .get(ability)
            .and_then(|a| a.as_activated())
            .map(|a| a.mana_produced())
            .unwrap_or_default();
        game.tap_permanent(card)?;
        game.get_player_mut(player)?.mana_pool.add(&produced);
    }

    game.get_player_mut(player)?.mana_pool.pay_cost(cost)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Ability, AbilityCost, ActivatedAbility, CardDefinition, CardType, Effect};
    use crate::zones::Zone;
    use std::sync::Arc;

    fn mana_ability(produces: &str) -> Ability {
        Ability::Activated(ActivatedAbility {
            cost: AbilityCost {
                tap: true,
                mana: ManaCost::new(),
            },
            effects: vec![Effect::AddMana {
                mana: ManaCost::from_string(produces).unwrap(),
            }],
            target: None,
            description: format!("Add {produces}"),
        })
    }

    fn land(name: &str, produces: &[&str]) -> Arc<CardDefinition> {
        let mut def = CardDefinition::new(name, &[CardType::Land]);
        for p in produces {
            def = def.with_ability(mana_ability(p));
        }
        Arc::new(def)
    }

    #[test]
    fn test_colored_first_keeps_dual_for_later() {
        let mut game = GameState::new();
        let p1 = game.add_player("Player 1", 20);
        let dual = game.create_card(land("Taiga", &["R", "G"]), p1, Zone::Battlefield).unwrap();
        let forest = game.create_card(land("Forest", &["G"]), p1, Zone::Battlefield).unwrap();
        let mountain = game.create_card(land("Mountain", &["R"]), p1, Zone::Battlefield).unwrap();

        let sources = mana_sources(&game, p1);
        let plan = plan_payment(&ManaPool::new(), &ManaCost::from_string("1RG").unwrap(), &sources).unwrap();
        assert_eq!(plan.taps.as_slice(), &[(mountain, 0), (forest, 0), (dual, 0)]);
    }

    #[test]
    fn test_cannot_pay_missing_color() {
        let mut game = GameState::new();
        let p1 = game.add_player("Player 1", 20);
        game.create_card(land("Forest", &["G"]), p1, Zone::Battlefield).unwrap();
        game.create_card(land("Forest", &["G"]), p1, Zone::Battlefield).unwrap();

        assert!(can_pay(&game, p1, &ManaCost::from_string("1G").unwrap()));
        assert!(!can_pay(&game, p1, &ManaCost::from_string("R").unwrap()));
        assert!(!can_pay(&game, p1, &ManaCost::from_string("2G").unwrap()));
    }

    #[test]
    fn test_pay_cost_taps_and_empties_pool() {
        let mut game = GameState::new();
        let p1 = game.add_player("Player 1", 20);
        let a = game.create_card(land("Mountain", &["R"]), p1, Zone::Battlefield).unwrap();
        let b = game.create_card(land("Sol Ring", &["CC"]), p1, Zone::Battlefield).unwrap();

        pay_cost(&mut game, p1, &ManaCost::from_string("2R").unwrap()).unwrap();
        assert!(game.cards.get(a).unwrap().is_tapped());
        assert!(game.cards.get(b).unwrap().is_tapped());
        assert_eq!(game.get_player(p1).unwrap().mana_pool.total(), 0);
        assert!(pay_cost(&mut game, p1, &ManaCost::from_string("R").unwrap()).is_err());
    }

    #[test]
    fn test_summoning_sick_creature_cannot_tap_for_mana() {
        let mut game = GameState::new();
        let p1 = game.add_player("Player 1", 20);
        let elves = Arc::new(
            CardDefinition::new("Llanowar Elves", &[CardType::Creature])
                .with_pt(1, 1)
                .with_ability(mana_ability("G")),
        );
        game.create_card(elves, p1, Zone::Battlefield).unwrap();
        assert!(mana_sources(&game, p1).is_empty());

        game.turn.turn_number += 1;
        assert_eq!(mana_sources(&game, p1).len(), 1);
    }
}
