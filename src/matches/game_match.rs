//! A match: fixed roster, one ruleset, one or more games

use crate::core::{PlayerId, PlayerName};
use crate::game::{Game, GameOptions, GameResult, GameState, PlayerController, Seat};
use crate::loader::{Deck, GameInitializer};
use crate::matches::orchestrator::wire_pod;
use crate::matches::MatchOptions;
use crate::registry::ControllerKind;
use crate::{Result, SimError};
use std::sync::Arc;

/// One player of the roster
#[derive(Debug, Clone)]
pub struct MatchEntry {
    pub name: PlayerName,
    pub deck: Arc<Deck>,
    pub controller: ControllerKind,
}

#[derive(Debug, Clone)]
pub struct Match {
    options: Arc<MatchOptions>,
    entries: Vec<MatchEntry>,
    /// Game wins per roster position
    wins: Vec<u32>,
    draws: u32,
    games_played: u32,
}

impl Match {
    pub fn new(options: MatchOptions) -> Result<Self> {
        options.validate()?;
        Ok(Match {
            options: Arc::new(options),
            entries: Vec::new(),
            wins: Vec::new(),
            draws: 0,
            games_played: 0,
        })
    }

    pub fn options(&self) -> &Arc<MatchOptions> {
        &self.options
    }

    pub fn entries(&self) -> &[MatchEntry] {
        &self.entries
    }

    /// Add a player; the deck must be legal for the match
    pub fn add_player(&mut self, name: impl Into<PlayerName>, deck: Arc<Deck>, controller: ControllerKind) -> Result<()> {
        if self.entries.len() >= self.options.player_count {
            return Err(SimError::Config(format!(
                "{} is full ({} players)",
                self.options.name, self.options.player_count
            )));
        }
        deck.validate(&self.options)?;
        self.entries.push(MatchEntry {
            name: name.into(),
            deck,
            controller,
        });
        self.wins.push(0);
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.entries.len() == self.options.player_count
    }

    /// Build a wired, not yet started game from the roster
    ///
    /// Player ids follow roster order, so roster position `i` is the
    /// player created `i`-th.
    pub fn create_game(&self, test_mode: bool) -> Result<Game> {
        if !self.is_ready() {
            return Err(SimError::Config(format!(
                "{} needs {} players, has {}",
                self.options.name,
                self.options.player_count,
                self.entries.len()
            )));
        }

        let mut state = GameState::new();
        let mut seats = Vec::with_capacity(self.entries.len());
        let mut controllers: Vec<Box<dyn PlayerController>> = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            let player_id = state.add_player(entry.name.clone(), self.options.starting_life);
            GameInitializer::load_deck_into_game(&mut state, player_id, &entry.deck)?;
            controllers.push(entry.controller.build(player_id));
            seats.push(Seat::new(player_id, Some(Arc::clone(&entry.deck))));
        }
        wire_pod(&state, &mut seats, &self.options)?;

        let options = GameOptions {
            test_mode,
            mulligan_type: self.options.mulligan_type,
            free_mulligans: self.options.free_mulligans,
            attack_option: self.options.attack_option,
            range_of_influence: self.options.range_of_influence,
            ..GameOptions::default()
        };
        Game::new(state, controllers, seats, options)
    }

    /// Roster position of a player in games created by this match
    pub fn position_of(&self, game: &Game, player: PlayerId) -> Option<usize> {
        game.seats().iter().position(|s| s.player_id == player)
    }

    /// Count a finished game toward the match
    pub fn record_result(&mut self, game: &Game, result: &GameResult) {
        self.games_played += 1;
        match result.winner.and_then(|w| self.position_of(game, w)) {
            Some(position) => self.wins[position] += 1,
            None => self.draws += 1,
        }
    }

    pub fn wins(&self, position: usize) -> u32 {
        self.wins.get(position).copied().unwrap_or(0)
    }

    pub fn draws(&self) -> u32 {
        self.draws
    }

    pub fn games_played(&self) -> u32 {
        self.games_played
    }

    /// Roster position of the player that reached the needed wins
    pub fn winner(&self) -> Option<usize> {
        self.wins.iter().position(|&w| w >= self.options.wins_needed)
    }

    pub fn is_over(&self) -> bool {
        self.winner().is_some()
    }
}
