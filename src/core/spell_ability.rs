//! Playable actions
//!
//! Everything a player can do with priority, other than passing, is a
//! `SpellAbility`: playing a land, casting a spell from hand or the command
//! zone, or activating a non-mana ability of a permanent. Mana abilities are
//! never offered here; they are activated during cost payment.

use crate::core::CardId;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpellAbility {
    /// Lands don't use the stack
    PlayLand { card_id: CardId },

    /// Cast a spell; it goes on the stack with its targets chosen
    CastSpell { card_id: CardId },

    /// `ability_index` indexes the card definition's ability list
    ActivateAbility { card_id: CardId, ability_index: usize },
}

impl SpellAbility {
    pub fn card_id(&self) -> CardId {
        match self {
            SpellAbility::PlayLand { card_id }
            | SpellAbility::CastSpell { card_id }
            | SpellAbility::ActivateAbility { card_id, .. } => *card_id,
        }
    }

    pub fn is_land_ability(&self) -> bool {
        matches!(self, SpellAbility::PlayLand { .. })
    }
}

impl fmt::Display for SpellAbility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpellAbility::PlayLand { card_id } => write!(f, "play land {card_id}"),
            SpellAbility::CastSpell { card_id } => write!(f, "cast {card_id}"),
            SpellAbility::ActivateAbility {
                card_id,
                ability_index,
            } => write!(f, "activate {card_id}#{ability_index}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_id_of_each_kind() {
        let card_id = CardId::new(1);

        let land = SpellAbility::PlayLand { card_id };
        assert!(land.is_land_ability());
        assert_eq!(land.card_id(), card_id);

        let ability = SpellAbility::ActivateAbility {
            card_id,
            ability_index: 2,
        };
        assert!(!ability.is_land_ability());
        assert_eq!(ability.to_string(), "activate 1#2");
    }
}
