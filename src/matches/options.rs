//! Match rulesets

use crate::game::{AttackOption, MulliganType, RangeOfInfluence};
use crate::{Result, SimError};
use serde::{Deserialize, Serialize};

/// Supported formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchType {
    TwoPlayerDuel,
    CommanderFreeForAll,
}

impl MatchType {
    pub fn starting_life(self) -> i32 {
        match self {
            MatchType::TwoPlayerDuel => 20,
            MatchType::CommanderFreeForAll => 40,
        }
    }

    pub fn default_attack_option(self) -> AttackOption {
        match self {
            MatchType::TwoPlayerDuel => AttackOption::Left,
            MatchType::CommanderFreeForAll => AttackOption::Multiple,
        }
    }

    pub fn is_multiplayer(self) -> bool {
        matches!(self, MatchType::CommanderFreeForAll)
    }

    pub fn min_players(self) -> usize {
        2
    }

    pub fn max_players(self) -> usize {
        match self {
            MatchType::TwoPlayerDuel => 2,
            MatchType::CommanderFreeForAll => 10,
        }
    }

    /// Minimum deck size, counting commanders
    pub fn min_deck_size(self, limited: bool) -> usize {
        match (self, limited) {
            (MatchType::TwoPlayerDuel, true) => 40,
            (MatchType::TwoPlayerDuel, false) => 60,
            (MatchType::CommanderFreeForAll, _) => 100,
        }
    }

    pub fn uses_commanders(self) -> bool {
        matches!(self, MatchType::CommanderFreeForAll)
    }

    /// Name of the game type as it appears in configuration
    pub fn game_type_name(self) -> &'static str {
        match self {
            MatchType::TwoPlayerDuel => "TwoPlayerDuel",
            MatchType::CommanderFreeForAll => "Commander",
        }
    }
}

/// Ruleset a match is played under
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchOptions {
    pub name: String,
    pub game_type: String,
    pub match_type: MatchType,
    pub multiplayer: bool,
    pub player_count: usize,
    pub limited: bool,
    pub attack_option: AttackOption,
    pub range_of_influence: RangeOfInfluence,
    pub mulligan_type: MulliganType,
    pub free_mulligans: u8,
    pub starting_life: i32,
    /// Game wins needed to take the match
    pub wins_needed: u32,
}

impl MatchOptions {
    pub fn new(name: impl Into<String>, match_type: MatchType, player_count: usize) -> Self {
        MatchOptions {
            name: name.into(),
            game_type: match_type.game_type_name().to_string(),
            match_type,
            multiplayer: match_type.is_multiplayer(),
            player_count,
            limited: false,
            attack_option: match_type.default_attack_option(),
            range_of_influence: RangeOfInfluence::All,
            mulligan_type: MulliganType::GameDefault,
            free_mulligans: 0,
            starting_life: match_type.starting_life(),
            wins_needed: 1,
        }
    }

    pub fn duel() -> Self {
        Self::new("TwoPlayerDuelSimulation", MatchType::TwoPlayerDuel, 2)
    }

    pub fn commander(player_count: usize) -> Self {
        Self::new("CommanderSimulation", MatchType::CommanderFreeForAll, player_count)
    }

    pub fn with_limited(mut self, limited: bool) -> Self {
        self.limited = limited;
        self
    }

    pub fn with_attack_option(mut self, option: AttackOption) -> Self {
        self.attack_option = option;
        self
    }

    pub fn with_mulligan_type(mut self, mulligan_type: MulliganType) -> Self {
        self.mulligan_type = mulligan_type;
        self
    }

    pub fn with_free_mulligans(mut self, free: u8) -> Self {
        self.free_mulligans = free;
        self
    }

    pub fn with_wins_needed(mut self, wins: u32) -> Self {
        self.wins_needed = wins;
        self
    }

    pub fn min_deck_size(&self) -> usize {
        self.match_type.min_deck_size(self.limited)
    }

    /// Reject option combinations the match type cannot be played with
    pub fn validate(&self) -> Result<()> {
        let (min, max) = (self.match_type.min_players(), self.match_type.max_players());
        if self.player_count < min || self.player_count > max {
            return Err(SimError::Config(format!(
                "{} needs {min} to {max} players, got {}",
                self.game_type, self.player_count
            )));
        }
        if self.starting_life <= 0 {
            return Err(SimError::Config(format!(
                "starting life must be positive, got {}",
                self.starting_life
            )));
        }
        if self.wins_needed == 0 {
            return Err(SimError::Config("a match needs at least one win".to_string()));
        }
        if self.player_count == 2 && self.attack_option == AttackOption::Multiple && !self.multiplayer {
            return Err(SimError::Config(
                "attack option 'multiple' needs a multiplayer match".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duel_defaults() {
        let options = MatchOptions::duel();
        assert_eq!(options.starting_life, 20);
        assert_eq!(options.attack_option, AttackOption::Left);
        assert_eq!(options.min_deck_size(), 60);
        assert_eq!(options.clone().with_limited(true).min_deck_size(), 40);
        assert!(!options.multiplayer);
        options.validate().unwrap();
    }

    #[test]
    fn test_commander_defaults() {
        let options = MatchOptions::commander(4);
        assert_eq!(options.starting_life, 40);
        assert_eq!(options.attack_option, AttackOption::Multiple);
        assert_eq!(options.min_deck_size(), 100);
        assert!(options.multiplayer);
        options.validate().unwrap();
    }

    #[test]
    fn test_player_count_checked() {
        assert!(MatchOptions::commander(1).validate().is_err());
        assert!(MatchOptions::new("x", MatchType::TwoPlayerDuel, 3).validate().is_err());
    }
}
