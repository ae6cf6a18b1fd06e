//! Simulation harness
//!
//! Runs independent copies of one configured game and tallies the results
//! from the point of view of the first player ("Player 1"). Every iteration
//! starts from `template.copy()` reseeded with `base_seed + i`, so
//! iterations differ from each other but a given base seed always
//! reproduces the same sequence of games.

use crate::core::PlayerId;
use crate::error::ErrorCategory;
use crate::game::{Game, GameLogger, VerbosityLevel};
use crate::{Result, SimError};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// A finished game from Player 1's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Win,
    Loss,
    Draw,
}

impl Outcome {
    pub const ALL: [Outcome; 3] = [Outcome::Win, Outcome::Loss, Outcome::Draw];
}

/// Classify a finished game by its winner's identity
pub fn classify(winner: Option<PlayerId>, reference: PlayerId) -> Outcome {
    match winner {
        Some(w) if w == reference => Outcome::Win,
        Some(_) => Outcome::Loss,
        None => Outcome::Draw,
    }
}

/// Running counts of outcomes plus failed iterations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    /// Iterations aborted by an invariant violation or loop ceiling
    pub failures: u32,
}

impl Tally {
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Win => self.wins += 1,
            Outcome::Loss => self.losses += 1,
            Outcome::Draw => self.draws += 1,
        }
    }

    pub fn count(&self, outcome: Outcome) -> u32 {
        match outcome {
            Outcome::Win => self.wins,
            Outcome::Loss => self.losses,
            Outcome::Draw => self.draws,
        }
    }

    /// Iterations consumed, failed ones included
    pub fn iterations(&self) -> u32 {
        self.wins + self.losses + self.draws + self.failures
    }

    /// The outcome with a strict plurality, if any
    pub fn leader(&self) -> Option<Outcome> {
        Outcome::ALL.into_iter().find(|&candidate| {
            Outcome::ALL
                .into_iter()
                .filter(|&other| other != candidate)
                .all(|other| self.count(candidate) > self.count(other))
        })
    }

    /// The outcome that leads no matter how the remaining iterations go
    pub fn decided(&self, remaining: u32, policy: EarlyExit) -> Option<Outcome> {
        let candidates: &[Outcome] = match policy {
            EarlyExit::Never => return None,
            EarlyExit::WinsOnly => &[Outcome::Win],
            EarlyExit::AnyOutcome => &Outcome::ALL,
        };
        candidates.iter().copied().find(|&candidate| {
            Outcome::ALL
                .into_iter()
                .filter(|&other| other != candidate)
                .all(|other| self.count(candidate) > self.count(other) + remaining)
        })
    }
}

/// When the harness may stop before running every iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EarlyExit {
    /// Stop once Player 1 winning the majority can no longer change
    #[default]
    WinsOnly,
    /// Stop once any outcome's plurality can no longer change
    AnyOutcome,
    /// Always run every iteration
    Never,
}

impl std::str::FromStr for EarlyExit {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "wins" | "wins-only" | "winsonly" => Ok(EarlyExit::WinsOnly),
            "any" | "any-outcome" | "anyoutcome" => Ok(EarlyExit::AnyOutcome),
            "never" | "none" | "off" => Ok(EarlyExit::Never),
            _ => Err(format!("invalid early exit '{s}' (expected: wins, any, never)")),
        }
    }
}

/// Final classification of a simulation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Player1Wins,
    Player1Loses,
    Draw,
    /// No outcome has a strict plurality
    Undecided,
}

impl Verdict {
    pub fn from_outcome(outcome: Option<Outcome>) -> Self {
        match outcome {
            Some(Outcome::Win) => Verdict::Player1Wins,
            Some(Outcome::Loss) => Verdict::Player1Loses,
            Some(Outcome::Draw) => Verdict::Draw,
            None => Verdict::Undecided,
        }
    }

    /// Process exit status for the verdict
    pub fn exit_code(self) -> i32 {
        match self {
            Verdict::Player1Wins => 0,
            Verdict::Player1Loses => 1,
            Verdict::Draw => 2,
            Verdict::Undecided => 3,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Player1Wins => write!(f, "Player 1 wins"),
            Verdict::Player1Loses => write!(f, "Player 1 loses"),
            Verdict::Draw => write!(f, "Draw"),
            Verdict::Undecided => write!(f, "No decisive outcome"),
        }
    }
}

/// Incremental early-exit fold over iteration outcomes in index order
///
/// Failed iterations count toward the iterations consumed but not toward
/// any outcome.
#[derive(Debug, Clone)]
pub struct OutcomeFold {
    tally: Tally,
    matches: usize,
    policy: EarlyExit,
    decided: Option<Outcome>,
}

impl OutcomeFold {
    pub fn new(matches: usize, policy: EarlyExit) -> Self {
        OutcomeFold {
            tally: Tally::default(),
            matches,
            policy,
            decided: None,
        }
    }

    /// Record one iteration; returns true once the verdict can no longer change
    pub fn push<E>(&mut self, outcome: std::result::Result<Outcome, E>) -> bool {
        if self.decided.is_some() {
            return true;
        }
        match outcome {
            Ok(outcome) => self.tally.record(outcome),
            Err(_) => self.tally.failures += 1,
        }
        let remaining = self.matches.saturating_sub(self.tally.iterations() as usize) as u32;
        if remaining > 0 {
            self.decided = self.tally.decided(remaining, self.policy);
        }
        self.decided.is_some()
    }

    pub fn tally(&self) -> &Tally {
        &self.tally
    }

    /// Final tally, verdict and the early stop point, if any
    pub fn finish(self) -> (Tally, Verdict, Option<usize>) {
        let stopped_after = self.decided.map(|_| self.tally.iterations() as usize);
        let verdict = Verdict::from_outcome(self.decided.or_else(|| self.tally.leader()));
        (self.tally, verdict, stopped_after)
    }
}

/// Fold outcomes in order, consuming only as many as the policy needs
pub fn fold_outcomes<E>(
    outcomes: impl IntoIterator<Item = std::result::Result<Outcome, E>>,
    matches: usize,
    policy: EarlyExit,
) -> (Tally, Verdict, Option<usize>) {
    let mut fold = OutcomeFold::new(matches, policy);
    for outcome in outcomes {
        if fold.push(outcome) {
            break;
        }
    }
    fold.finish()
}

/// One iteration's result
#[derive(Debug, Clone)]
pub struct IterationResult {
    pub index: usize,
    pub seed: u64,
    pub duration: Duration,
    /// Outcome, or the error that aborted the game
    pub outcome: std::result::Result<Outcome, String>,
    /// "Player 1 is the winner" / "Game is a draw"
    pub description: Option<String>,
    pub turns_played: u32,
}

#[derive(Debug, Clone)]
pub struct SimulationReport {
    pub tally: Tally,
    pub verdict: Verdict,
    pub requested: usize,
    pub base_seed: u64,
    /// Set when the run stopped early
    pub stopped_after: Option<usize>,
    pub iterations: Vec<IterationResult>,
}

impl SimulationReport {
    pub fn has_failures(&self) -> bool {
        self.tally.failures > 0
    }

    pub fn total_duration(&self) -> Duration {
        self.iterations.iter().map(|i| i.duration).sum()
    }
}

/// Repeats a configured game and aggregates the outcomes
pub struct SimulationHarness {
    matches: usize,
    base_seed: u64,
    early_exit: EarlyExit,
    logger: GameLogger,
}

impl SimulationHarness {
    pub fn new(matches: usize) -> Self {
        SimulationHarness {
            matches,
            base_seed: rand::random(),
            early_exit: EarlyExit::default(),
            logger: GameLogger::new(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.base_seed = seed;
        self
    }

    pub fn with_early_exit(mut self, early_exit: EarlyExit) -> Self {
        self.early_exit = early_exit;
        self
    }

    pub fn with_logger(mut self, logger: GameLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn logger(&self) -> &GameLogger {
        &self.logger
    }

    pub fn base_seed(&self) -> u64 {
        self.base_seed
    }

    fn seed_for(&self, index: usize) -> u64 {
        self.base_seed.wrapping_add(index as u64)
    }

    fn check_template(template: &Game) -> Result<PlayerId> {
        if template.status() != crate::game::GameStatus::NotStarted {
            return Err(SimError::AlreadyStarted);
        }
        template
            .state()
            .players
            .first()
            .map(|p| p.id)
            .ok_or_else(|| SimError::Config("game has no players".to_string()))
    }

    /// Copy, reseed, start and classify one iteration
    ///
    /// Configuration and harness errors propagate; anything else is a failed
    /// iteration.
    fn run_one(game: &mut Game, index: usize, seed: u64, starting: PlayerId, reference: PlayerId) -> Result<IterationResult> {
        game.reseed(seed);
        let start = Instant::now();
        let outcome = game.start(starting).map(|r| (r.winner, r.turns_played));
        let duration = start.elapsed();

        let (outcome, turns_played) = match outcome {
            Ok((winner, turns)) => (Ok(classify(winner, reference)), turns),
            Err(e) if e.category() == ErrorCategory::Invariant => (Err(e.to_string()), 0),
            Err(e) => return Err(e),
        };
        Ok(IterationResult {
            index,
            seed,
            duration,
            outcome,
            description: game.winner_description(),
            turns_played,
        })
    }

    fn log_iteration(&self, result: &IterationResult) {
        self.logger.normal(&format!("Time: {} ms", result.duration.as_millis()));
        match (&result.outcome, &result.description) {
            (Ok(_), Some(description)) => self.logger.minimal(description),
            (Err(e), _) => self
                .logger
                .minimal(&format!("Game {} failed: {e}", result.index + 1)),
            _ => {}
        }
    }

    /// Fold iteration results in index order, stopping where the sequential
    /// run would have stopped
    fn summarize(&self, mut results: Vec<IterationResult>) -> SimulationReport {
        let (tally, verdict, stopped_after) = fold_outcomes(
            results.iter().map(|r| r.outcome.as_ref().copied()),
            self.matches,
            self.early_exit,
        );
        results.truncate(tally.iterations() as usize);

        for result in &results {
            self.log_iteration(result);
        }
        if let Some(done) = stopped_after {
            self.logger.normal(&format!(
                "Stopping after {done} of {} games: outcome decided",
                self.matches
            ));
        }
        self.logger.minimal(&verdict.to_string());

        SimulationReport {
            tally,
            verdict,
            requested: self.matches,
            base_seed: self.base_seed,
            stopped_after,
            iterations: results,
        }
    }

    /// Run iterations one after another, stopping early when allowed
    pub fn run(&self, template: &Game, starting_player: PlayerId) -> Result<SimulationReport> {
        let reference = Self::check_template(template)?;
        let mut results = Vec::with_capacity(self.matches);
        let mut fold = OutcomeFold::new(self.matches, self.early_exit);

        for index in 0..self.matches {
            let mut game = template.copy();
            let result = Self::run_one(&mut game, index, self.seed_for(index), starting_player, reference)?;
            let stop = fold.push(result.outcome.as_ref().copied());
            results.push(result);
            if stop {
                break;
            }
        }
        Ok(self.summarize(results))
    }

    /// Run every iteration in parallel with rayon
    ///
    /// Each worker takes its own copy of the template; the results are then
    /// folded in iteration order exactly like `run`, so both give the same
    /// verdict for the same seed.
    pub fn run_parallel(&self, template: &Game, starting_player: PlayerId) -> Result<SimulationReport> {
        let reference = Self::check_template(template)?;
        let mut quiet = template.copy();
        quiet.state_mut().logger.set_verbosity(VerbosityLevel::Silent);
        let template = Mutex::new(quiet);
        let base_seed = self.base_seed;

        let results: Result<Vec<IterationResult>> = (0..self.matches)
            .into_par_iter()
            .map(|index| {
                let mut game = template
                    .lock()
                    .map_err(|_| SimError::Invariant("simulation template lock poisoned".to_string()))?
                    .copy();
                let seed = base_seed.wrapping_add(index as u64);
                Self::run_one(&mut game, index, seed, starting_player, reference)
            })
            .collect();
        Ok(self.summarize(results?))
    }
}
