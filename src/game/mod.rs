//! Game state, rules engine and turn structure

pub mod combat;
pub mod controller;
pub mod events;
#[allow(clippy::module_inception)]
pub mod game;
pub mod game_loop;
pub mod heuristic_controller;
pub mod logger;
pub mod mana_payment;
pub mod mulligan;
pub mod phase;
pub mod random_controller;
pub mod stack;
pub mod state;
pub mod state_based;
pub mod targeting;
pub mod triggers;
pub mod zero_controller;

pub use combat::{AttackOption, CombatState, RangeOfInfluence};
pub use controller::{GameStateView, OptionalChoice, PlayerController, TargetRequest};
pub use events::GameEvent;
pub use game::{Game, GameOptions, GameStatus, Seat};
pub use game_loop::{GameEndReason, GameLoop, GameResult};
pub use heuristic_controller::HeuristicController;
pub use logger::{GameLogger, LogEntry, OutputMode, VerbosityLevel};
pub use mulligan::MulliganType;
pub use phase::{Phase, Step, TurnStructure};
pub use random_controller::RandomController;
pub use stack::{ResolutionOutcome, Stack, StackItem, StackObjectKind};
pub use state::GameState;
pub use state_based::{check_state_based_actions, LossReason};
pub use triggers::{PendingTrigger, TriggerEngine};
pub use zero_controller::ZeroController;
