//! State-based actions
//!
//! Checked whenever a player would receive priority, and repeated until a
//! sweep changes nothing. Player losses are applied first; a player who
//! loses leaves the game immediately.

use crate::core::{CardId, PlayerId, COMMANDER_DAMAGE_LIMIT};
use crate::game::GameState;
use crate::zones::Zone;
use crate::Result;
use smallvec::SmallVec;

/// Why a player lost
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LossReason {
    LifeTotal,
    EmptyLibrary,
    CommanderDamage,
}

/// One sweep; returns true if anything happened
fn sweep(game: &mut GameState) -> Result<bool> {
    let mut changed = false;

    let losers: SmallVec<[(PlayerId, LossReason); 4]> = game
        .players
        .iter()
        .filter(|p| !p.has_lost)
        .filter_map(|p| {
            if p.life <= 0 {
                Some((p.id, LossReason::LifeTotal))
            } else if p.drew_from_empty_library {
                Some((p.id, LossReason::EmptyLibrary))
            } else if p.max_commander_damage() >= COMMANDER_DAMAGE_LIMIT {
                Some((p.id, LossReason::CommanderDamage))
            } else {
                None
            }
        })
        .collect();
    for (player, reason) in losers {
        game.logger.normal(&format!(
            "{} loses the game ({})",
            game.player_name(player),
            match reason {
                LossReason::LifeTotal => "life total",
                LossReason::EmptyLibrary => "drew from an empty library",
                LossReason::CommanderDamage => "commander damage",
            }
        ));
        game.remove_player(player)?;
        changed = true;
    }

    let mut dying: SmallVec<[CardId; 8]> = SmallVec::new();
    for &card in &game.battlefield.cards {
        let c = game.cards.get(card)?;
        let Some(permanent) = c.permanent.as_ref() else { continue };
        if !c.is_creature() {
            continue;
        }
        let toughness = game.toughness(card);
        let lethal = permanent.damage > 0 && (permanent.damage >= toughness || permanent.deathtouch_damage);
        if toughness <= 0 || lethal {
            dying.push(card);
        }
    }

    // Legend rule: the newest copy under each controller stays
    {
        let mut legends: SmallVec<[(PlayerId, &str); 4]> = SmallVec::new();
        for &card in game.battlefield.cards.iter().rev() {
            let c = game.cards.get(card)?;
            if !c.definition.legendary {
                continue;
            }
            let key = (c.controller(), c.name());
            if legends.contains(&key) {
                if !dying.contains(&card) {
                    dying.push(card);
                }
            } else {
                legends.push(key);
            }
        }
    }

    for card in dying {
        game.move_card(card, Zone::Graveyard)?;
        changed = true;
    }

    Ok(changed)
}

/// Apply state-based actions until the game is stable
///
/// Returns true if any action was performed.
pub fn check_state_based_actions(game: &mut GameState) -> Result<bool> {
    let mut any = false;
    while sweep(game)? {
        any = true;
        if game.is_game_over() {
            break;
        }
    }
    Ok(any)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CardDefinition, CardType, Target};
    use std::sync::Arc;

    fn setup() -> (GameState, PlayerId, PlayerId) {
        let mut game = GameState::new();
        let p1 = game.add_player("Player 1", 20);
        let p2 = game.add_player("Player 2", 20);
        (game, p1, p2)
    }

    #[test]
    fn test_lethal_damage_destroys() {
        let (mut game, p1, _) = setup();
        let def = Arc::new(CardDefinition::new("Grizzly Bears", &[CardType::Creature]).with_pt(2, 2));
        let bears = game.create_card(def, p1, Zone::Battlefield).unwrap();

        game.deal_damage(None, Target::Permanent(bears), 1, false).unwrap();
        assert!(!check_state_based_actions(&mut game).unwrap());

        game.deal_damage(None, Target::Permanent(bears), 1, false).unwrap();
        assert!(check_state_based_actions(&mut game).unwrap());
        assert_eq!(game.cards.get(bears).unwrap().zone, Zone::Graveyard);
    }

    #[test]
    fn test_life_loss_ends_two_player_game() {
        let (mut game, p1, p2) = setup();
        game.lose_life(p2, 20).unwrap();
        check_state_based_actions(&mut game).unwrap();
        assert!(game.is_game_over());
        assert_eq!(game.get_winner(), Some(p1));
    }

    #[test]
    fn test_simultaneous_loss_is_a_draw() {
        let (mut game, p1, p2) = setup();
        game.lose_life(p1, 20).unwrap();
        game.get_player_mut(p2).unwrap().drew_from_empty_library = true;
        check_state_based_actions(&mut game).unwrap();
        assert!(game.is_game_over());
        assert_eq!(game.get_winner(), None);
    }

    #[test]
    fn test_commander_damage_loss() {
        let (mut game, _, p2) = setup();
        game.get_player_mut(p2)
            .unwrap()
            .add_commander_damage(CardId::new(99), COMMANDER_DAMAGE_LIMIT);
        check_state_based_actions(&mut game).unwrap();
        assert!(!game.is_alive(p2));
    }

    #[test]
    fn test_legend_rule_keeps_newest() {
        let (mut game, p1, _) = setup();
        let def = Arc::new(
            CardDefinition::new("Isamaru, Hound of Konda", &[CardType::Creature])
                .with_pt(2, 2)
                .legendary(),
        );
        let old = game.create_card(def.clone(), p1, Zone::Battlefield).unwrap();
        let new = game.create_card(def, p1, Zone::Battlefield).unwrap();

        check_state_based_actions(&mut game).unwrap();
        assert_eq!(game.cards.get(old).unwrap().zone, Zone::Graveyard);
        assert!(game.battlefield.contains(new));
    }
}
