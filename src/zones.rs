//! Game zones (Library, Hand, Graveyard, Battlefield, etc.)

use crate::core::{CardId, PlayerId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Different zones where cards can exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Zone {
    Library,
    Hand,
    Battlefield,
    Graveyard,
    Exile,
    /// Spells being cast; the stack itself tracks them, not a `CardZone`
    Stack,
    Command,
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Zone::Library => "library",
            Zone::Hand => "hand",
            Zone::Battlefield => "battlefield",
            Zone::Graveyard => "graveyard",
            Zone::Exile => "exile",
            Zone::Stack => "stack",
            Zone::Command => "command zone",
        };
        write!(f, "{name}")
    }
}

/// An ordered list of cards
///
/// The last element is the top of a library. Every zone keeps insertion
/// order so that iteration (and therefore every controller decision) is
/// deterministic for a given seed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardZone {
    pub zone_type: Zone,

    /// Owner of this zone; the shared battlefield uses the first seat
    pub owner: PlayerId,

    pub cards: Vec<CardId>,
}

impl CardZone {
    pub fn new(zone_type: Zone, owner: PlayerId) -> Self {
        CardZone {
            zone_type,
            owner,
            cards: Vec::new(),
        }
    }

    pub fn add(&mut self, card_id: CardId) {
        self.cards.push(card_id);
    }

    pub fn remove(&mut self, card_id: CardId) -> bool {
        match self.position(card_id) {
            Some(pos) => {
                self.cards.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn position(&self, card_id: CardId) -> Option<usize> {
        self.cards.iter().position(|&id| id == card_id)
    }

    pub fn contains(&self, card_id: CardId) -> bool {
        self.cards.contains(&card_id)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Draw from top (for Library)
    pub fn draw_top(&mut self) -> Option<CardId> {
        self.cards.pop()
    }

    pub fn peek_top(&self) -> Option<CardId> {
        self.cards.last().copied()
    }

    /// Add to bottom (for Library)
    pub fn add_to_bottom(&mut self, card_id: CardId) {
        self.cards.insert(0, card_id);
    }

    pub fn shuffle(&mut self, rng: &mut impl rand::Rng) {
        use rand::seq::SliceRandom;
        self.cards.shuffle(rng);
    }
}

/// Zones owned by one player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerZones {
    pub library: CardZone,
    pub hand: CardZone,
    pub graveyard: CardZone,
    pub exile: CardZone,
    pub command: CardZone,
}

impl PlayerZones {
    pub fn new(player_id: PlayerId) -> Self {
        PlayerZones {
            library: CardZone::new(Zone::Library, player_id),
            hand: CardZone::new(Zone::Hand, player_id),
            graveyard: CardZone::new(Zone::Graveyard, player_id),
            exile: CardZone::new(Zone::Exile, player_id),
            command: CardZone::new(Zone::Command, player_id),
        }
    }

    /// Per-player zone; `None` for the shared battlefield and the stack
    pub fn get_zone(&self, zone: Zone) -> Option<&CardZone> {
        match zone {
            Zone::Library => Some(&self.library),
            Zone::Hand => Some(&self.hand),
            Zone::Graveyard => Some(&self.graveyard),
            Zone::Exile => Some(&self.exile),
            Zone::Command => Some(&self.command),
            Zone::Battlefield | Zone::Stack => None,
        }
    }

    pub fn get_zone_mut(&mut self, zone: Zone) -> Option<&mut CardZone> {
        match zone {
            Zone::Library => Some(&mut self.library),
            Zone::Hand => Some(&mut self.hand),
            Zone::Graveyard => Some(&mut self.graveyard),
            Zone::Exile => Some(&mut self.exile),
            Zone::Command => Some(&mut self.command),
            Zone::Battlefield | Zone::Stack => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_zone_keeps_order() {
        let mut zone = CardZone::new(Zone::Hand, PlayerId::new(1));
        assert!(zone.is_empty());

        for id in [10, 11, 12] {
            zone.add(CardId::new(id));
        }
        assert!(zone.remove(CardId::new(11)));
        assert!(!zone.remove(CardId::new(11)));
        assert_eq!(zone.cards, vec![CardId::new(10), CardId::new(12)]);
        assert_eq!(zone.position(CardId::new(12)), Some(1));
    }

    #[test]
    fn test_library_top_is_last() {
        let mut library = CardZone::new(Zone::Library, PlayerId::new(1));
        library.add(CardId::new(1));
        library.add(CardId::new(2));
        library.add_to_bottom(CardId::new(3));

        assert_eq!(library.peek_top(), Some(CardId::new(2)));
        assert_eq!(library.draw_top(), Some(CardId::new(2)));
        assert_eq!(library.draw_top(), Some(CardId::new(1)));
        assert_eq!(library.draw_top(), Some(CardId::new(3)));
        assert_eq!(library.draw_top(), None);
    }

    #[test]
    fn test_shared_zones_are_not_per_player() {
        let zones = PlayerZones::new(PlayerId::new(1));
        assert_eq!(zones.get_zone(Zone::Command).map(|z| z.zone_type), Some(Zone::Command));
        assert!(zones.get_zone(Zone::Battlefield).is_none());
        assert!(zones.get_zone(Zone::Stack).is_none());
    }
}
