//! Matches, rulesets and pod wiring

pub mod combinations;
pub mod game_match;
pub mod match_player;
pub mod options;
pub mod orchestrator;

pub use combinations::{binomial, combinations};
pub use game_match::{Match, MatchEntry};
pub use match_player::MatchPlayer;
pub use options::{MatchOptions, MatchType};
pub use orchestrator::{unordered_pairs, wire_duel, wire_free_for_all, wire_pod};
