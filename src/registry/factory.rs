//! Game-type and player-type lookup tables
//!
//! Both tables are filled once at startup (built-in entries plus whatever
//! the configuration adds) and only read afterwards.

use crate::core::PlayerId;
use crate::game::{HeuristicController, PlayerController, RandomController, ZeroController};
use crate::matches::MatchType;
use crate::{Result, SimError};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Decision policy behind a player type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControllerKind {
    Zero,
    Random,
    Heuristic,
}

impl ControllerKind {
    pub fn build(self, player: PlayerId) -> Box<dyn PlayerController> {
        match self {
            ControllerKind::Zero => Box::new(ZeroController::new(player)),
            ControllerKind::Random => Box::new(RandomController::new(player)),
            ControllerKind::Heuristic => Box::new(HeuristicController::new(player)),
        }
    }
}

impl fmt::Display for ControllerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerKind::Zero => write!(f, "zero"),
            ControllerKind::Random => write!(f, "random"),
            ControllerKind::Heuristic => write!(f, "heuristic"),
        }
    }
}

fn key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Player type name -> controller kind
#[derive(Debug, Clone)]
pub struct PlayerTypeRegistry {
    types: FxHashMap<String, ControllerKind>,
}

impl PlayerTypeRegistry {
    pub fn empty() -> Self {
        PlayerTypeRegistry {
            types: FxHashMap::default(),
        }
    }

    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register("Computer - mad", ControllerKind::Heuristic);
        registry.register("Computer - random", ControllerKind::Random);
        registry.register("Computer - zero", ControllerKind::Zero);
        for kind in [ControllerKind::Zero, ControllerKind::Random, ControllerKind::Heuristic] {
            registry.register(&kind.to_string(), kind);
        }
        registry
    }

    /// Later registrations under the same name replace earlier ones
    pub fn register(&mut self, name: &str, kind: ControllerKind) {
        self.types.insert(key(name), kind);
    }

    pub fn get(&self, name: &str) -> Result<ControllerKind> {
        self.types
            .get(&key(name))
            .copied()
            .ok_or_else(|| SimError::Config(format!("unknown player type '{name}'")))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Game type name -> match type
#[derive(Debug, Clone)]
pub struct GameTypeRegistry {
    types: FxHashMap<String, MatchType>,
}

impl GameTypeRegistry {
    pub fn empty() -> Self {
        GameTypeRegistry {
            types: FxHashMap::default(),
        }
    }

    /// The two CLI modes plus the formats' own names
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register("duel", MatchType::TwoPlayerDuel);
        registry.register("commander", MatchType::CommanderFreeForAll);
        for match_type in [MatchType::TwoPlayerDuel, MatchType::CommanderFreeForAll] {
            registry.register(match_type.game_type_name(), match_type);
        }
        registry
    }

    pub fn register(&mut self, name: &str, match_type: MatchType) {
        self.types.insert(key(name), match_type);
    }

    pub fn get(&self, name: &str) -> Result<MatchType> {
        self.types
            .get(&key(name))
            .copied()
            .ok_or_else(|| SimError::Config(format!("unknown game type '{name}'")))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
