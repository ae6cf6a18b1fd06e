//! One playthrough: a game state, its players and how to run it
//!
//! A `Game` is built fully wired (decks in libraries, controllers bound,
//! match relationships attached) and then started exactly once. The
//! simulation harness never starts the configured game itself; it starts
//! independent copies.

use crate::core::PlayerId;
use crate::game::combat::{AttackOption, RangeOfInfluence};
use crate::game::controller::PlayerController;
use crate::game::game_loop::{GameLoop, GameResult, DEFAULT_MAX_ACTIONS_PER_STEP, DEFAULT_MAX_TURNS};
use crate::game::mulligan::{run_mulligans, MulliganType};
use crate::game::GameState;
use crate::loader::Deck;
use crate::matches::MatchPlayer;
use crate::{Result, SimError};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Per-game settings fixed before `start`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameOptions {
    /// Keep libraries in deck order and skip mulligans
    pub test_mode: bool,
    pub mulligan_type: MulliganType,
    pub free_mulligans: u8,
    pub attack_option: AttackOption,
    pub range_of_influence: RangeOfInfluence,
    pub max_turns: u32,
    pub max_actions_per_step: usize,
}

impl Default for GameOptions {
    fn default() -> Self {
        GameOptions {
            test_mode: false,
            mulligan_type: MulliganType::GameDefault,
            free_mulligans: 0,
            attack_option: AttackOption::Left,
            range_of_influence: RangeOfInfluence::All,
            max_turns: DEFAULT_MAX_TURNS,
            max_actions_per_step: DEFAULT_MAX_ACTIONS_PER_STEP,
        }
    }
}

/// A participating player and what the match bound to it
#[derive(Debug, Clone)]
pub struct Seat {
    pub player_id: PlayerId,
    pub deck: Option<Arc<Deck>>,
    /// One binding per opponent
    pub bindings: Vec<MatchPlayer>,
}

impl Seat {
    pub fn new(player_id: PlayerId, deck: Option<Arc<Deck>>) -> Self {
        Seat {
            player_id,
            deck,
            bindings: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    NotStarted,
    InProgress,
    Finished,
}

#[derive(Clone)]
pub struct Game {
    state: GameState,
    controllers: Vec<Box<dyn PlayerController>>,
    seats: Vec<Seat>,
    options: GameOptions,
    status: GameStatus,
    result: Option<GameResult>,
}

impl Game {
    /// Wrap a prepared state; every player in it needs exactly one controller
    pub fn new(
        state: GameState,
        controllers: Vec<Box<dyn PlayerController>>,
        seats: Vec<Seat>,
        options: GameOptions,
    ) -> Result<Self> {
        for player in &state.players {
            let bound = controllers.iter().filter(|c| c.player_id() == player.id).count();
            if bound != 1 {
                return Err(SimError::Config(format!(
                    "player {} has {bound} controllers",
                    player.name
                )));
            }
        }
        Ok(Game {
            state,
            controllers,
            seats,
            options,
            status: GameStatus::NotStarted,
            result: None,
        })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Mutable state for setting up a game that has not started yet
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn options(&self) -> &GameOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut GameOptions {
        &mut self.options
    }

    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    pub fn seats_mut(&mut self) -> &mut [Seat] {
        &mut self.seats
    }

    pub fn seat(&self, player: PlayerId) -> Option<&Seat> {
        self.seats.iter().find(|s| s.player_id == player)
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Fully independent copy
    ///
    /// Zones, permanents, the stack, pending events, controllers and the
    /// RNG are duplicated; only immutable card definitions and deck lists
    /// are shared.
    pub fn copy(&self) -> Game {
        self.clone()
    }

    /// Reseed the game RNG (shuffles and random decisions)
    pub fn reseed(&mut self, seed: u64) {
        self.state.seed_rng(seed);
    }

    /// Pick a starting player with the game RNG
    pub fn choose_random_starting_player(&self) -> Result<PlayerId> {
        let n = self.state.players.len();
        if n == 0 {
            return Err(SimError::Config("game has no players".to_string()));
        }
        let index = self.state.rng.borrow_mut().gen_range(0..n);
        Ok(self.state.players[index].id)
    }

    /// Play the game to completion with `starting_player` taking the first turn
    ///
    /// May only be called once; a started or finished game returns
    /// `AlreadyStarted`.
    pub fn start(&mut self, starting_player: PlayerId) -> Result<&GameResult> {
        if self.status != GameStatus::NotStarted {
            return Err(SimError::AlreadyStarted);
        }
        self.state.get_player(starting_player)?;
        self.status = GameStatus::InProgress;

        let outcome = self.play(starting_player);
        self.status = GameStatus::Finished;
        let result = outcome?;
        Ok(self.result.insert(result))
    }

    fn play(&mut self, starting_player: PlayerId) -> Result<GameResult> {
        self.state.turn.active_player = starting_player;
        self.state.logger.normal(&format!(
            "{} goes first",
            self.state.player_name(starting_player)
        ));

        if !self.options.test_mode {
            let players: Vec<PlayerId> = self.state.players.iter().map(|p| p.id).collect();
            for player in players {
                self.state.shuffle_library(player);
            }
            run_mulligans(
                &mut self.state,
                &mut self.controllers,
                self.options.mulligan_type,
                self.options.free_mulligans,
            )?;
        } else {
            let players = self.state.players_in_turn_order(starting_player);
            for player in players {
                for _ in 0..crate::game::mulligan::OPENING_HAND_SIZE.min(self.state.library(player).len()) {
                    self.state.draw_card(player)?;
                }
            }
        }

        GameLoop::new(&mut self.state, &mut self.controllers)
            .with_max_turns(self.options.max_turns)
            .with_max_actions_per_step(self.options.max_actions_per_step)
            .with_attack_option(self.options.attack_option)
            .with_range_of_influence(self.options.range_of_influence)
            .run_game()
    }

    pub fn result(&self) -> Option<&GameResult> {
        self.result.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.status == GameStatus::Finished
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.result.as_ref().and_then(|r| r.winner)
    }

    pub fn is_draw(&self) -> bool {
        self.result.as_ref().is_some_and(|r| r.winner.is_none())
    }

    /// "Player 1 is the winner" or "Game is a draw"; `None` before the game ends
    pub fn winner_description(&self) -> Option<String> {
        let result = self.result.as_ref()?;
        Some(match result.winner {
            Some(winner) => format!("{} is the winner", self.state.player_name(winner)),
            None => "Game is a draw".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CardDefinition, CardType};
    use crate::game::{OutputMode, ZeroController};
    use crate::zones::Zone;

    fn two_player_game(library: usize) -> (Game, PlayerId, PlayerId) {
        let mut state = GameState::new();
        let p1 = state.add_player("Player 1", 20);
        let p2 = state.add_player("Player 2", 20);
        state.logger.set_output_mode(OutputMode::Memory);
        let bears = Arc::new(CardDefinition::new("Grizzly Bears", &[CardType::Creature]).with_pt(2, 2));
        for player in [p1, p2] {
            for _ in 0..library {
                state.create_card(bears.clone(), player, Zone::Library).unwrap();
            }
        }
        let controllers: Vec<Box<dyn PlayerController>> =
            vec![Box::new(ZeroController::new(p1)), Box::new(ZeroController::new(p2))];
        let seats = vec![Seat::new(p1, None), Seat::new(p2, None)];
        let game = Game::new(state, controllers, seats, GameOptions::default()).unwrap();
        (game, p1, p2)
    }

    #[test]
    fn test_start_runs_to_completion() {
        let (mut game, p1, _) = two_player_game(10);
        game.reseed(7);
        let result = game.start(p1).unwrap().clone();
        assert!(game.is_finished());
        assert_eq!(game.winner(), result.winner);
        assert!(game.winner_description().unwrap().ends_with("is the winner"));
    }

    #[test]
    fn test_start_twice_is_rejected() {
        let (mut game, p1, _) = two_player_game(10);
        game.start(p1).unwrap();
        assert!(matches!(game.start(p1), Err(SimError::AlreadyStarted)));
    }

    #[test]
    fn test_copy_is_not_started_and_independent() {
        let (mut game, p1, _) = two_player_game(10);
        let copy = game.copy();
        game.start(p1).unwrap();
        assert_eq!(copy.status(), GameStatus::NotStarted);
        assert_eq!(copy.state().library(p1).len(), 10);
        assert!(copy.state().hand(p1).is_empty());
    }

    #[test]
    fn test_missing_controller_is_config_error() {
        let mut state = GameState::new();
        let p1 = state.add_player("Player 1", 20);
        state.add_player("Player 2", 20);
        let controllers: Vec<Box<dyn PlayerController>> = vec![Box::new(ZeroController::new(p1))];
        let err = Game::new(state, controllers, Vec::new(), GameOptions::default()).err().unwrap();
        assert!(matches!(err, SimError::Config(_)));
    }

    #[test]
    fn test_description_before_start() {
        let (game, _, _) = two_player_game(1);
        assert_eq!(game.winner_description(), None);
        assert!(!game.is_draw());
    }
}
