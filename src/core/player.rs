//! Player representation

use crate::core::{CardId, GameEntity, ManaPool, PlayerId, PlayerName};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Commander damage a player loses to
pub const COMMANDER_DAMAGE_LIMIT: i32 = 21;

/// A player seat in a game
///
/// Losing is never applied directly by life changes: state-based actions
/// look at `life`, `drew_from_empty_library` and `commander_damage` and set
/// `has_lost`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,

    pub name: PlayerName,

    pub life: i32,

    pub mana_pool: ManaPool,

    /// Set once by state-based actions; a player who lost has left the game
    pub has_lost: bool,

    pub lands_played_this_turn: u8,

    /// Maximum lands per turn (usually 1)
    pub max_lands_per_turn: u8,

    pub max_hand_size: usize,

    /// Tried to draw from an empty library since the last SBA check
    pub drew_from_empty_library: bool,

    /// Combat damage received from each commander
    pub commander_damage: SmallVec<[(CardId, i32); 2]>,

    /// Times this player's commander was cast from the command zone
    pub commander_casts: u8,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<PlayerName>, starting_life: i32) -> Self {
        Player {
            id,
            name: name.into(),
            life: starting_life,
            mana_pool: ManaPool::new(),
            has_lost: false,
            lands_played_this_turn: 0,
            max_lands_per_turn: 1,
            max_hand_size: 7,
            drew_from_empty_library: false,
            commander_damage: SmallVec::new(),
            commander_casts: 0,
        }
    }

    pub fn can_play_land(&self) -> bool {
        self.lands_played_this_turn < self.max_lands_per_turn
    }

    pub fn add_commander_damage(&mut self, commander: CardId, amount: i32) {
        if let Some((_, total)) = self
            .commander_damage
            .iter_mut()
            .find(|(id, _)| *id == commander)
        {
            *total += amount;
        } else {
            self.commander_damage.push((commander, amount));
        }
    }

    /// Highest damage dealt by any single commander
    pub fn max_commander_damage(&self) -> i32 {
        self.commander_damage
            .iter()
            .map(|(_, amount)| *amount)
            .max()
            .unwrap_or(0)
    }

    /// Commander tax: two generic mana per previous cast from the command zone
    pub fn commander_tax(&self) -> u8 {
        self.commander_casts.saturating_mul(2)
    }
}

impl GameEntity for Player {
    type Id = PlayerId;

    fn id(&self) -> PlayerId {
        self.id
    }

    fn name(&self) -> &str {
        self.name.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_creation() {
        let id = PlayerId::new(1);
        let player = Player::new(id, "Alice", 20);

        assert_eq!(player.id, id);
        assert_eq!(player.name.as_str(), "Alice");
        assert_eq!(player.life, 20);
        assert_eq!(player.max_hand_size, 7);
        assert!(!player.has_lost);
        assert!(player.can_play_land());
    }

    #[test]
    fn test_commander_damage_is_tracked_per_commander() {
        let mut player = Player::new(PlayerId::new(0), "Bob", 40);
        player.add_commander_damage(CardId::new(10), 5);
        player.add_commander_damage(CardId::new(11), 7);
        player.add_commander_damage(CardId::new(10), 6);

        assert_eq!(player.commander_damage.len(), 2);
        assert_eq!(player.max_commander_damage(), 11);
    }

    #[test]
    fn test_commander_tax() {
        let mut player = Player::new(PlayerId::new(0), "Charlie", 40);
        assert_eq!(player.commander_tax(), 0);
        player.commander_casts = 2;
        assert_eq!(player.commander_tax(), 4);
    }
}
