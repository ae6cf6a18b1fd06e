//! MTG Sim - headless Magic: The Gathering match simulator
//!
//! Builds duels and commander free-for-all pods from deck lists, wires the
//! pairwise opponent relationships, and plays many independent copies of a
//! configured game between computer players to decide whether Player 1's
//! deck wins, loses or draws.

pub mod config;
pub mod core;
pub mod error;
pub mod game;
pub mod loader;
pub mod matches;
pub mod registry;
pub mod simulation;
pub mod zones;

pub use error::{ErrorCategory, Result, SimError};
