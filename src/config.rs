//! Simulation configuration (`config/config.json`)
//!
//! ```json
//! {
//!   "game_types": [{ "name": "Two Player Duel", "match_type": "TwoPlayerDuel" }],
//!   "player_types": [{ "name": "Computer - mad", "controller": "heuristic" }],
//!   "card_files": ["cards/extra.json"],
//!   "default_player_type": "Computer - mad",
//!   "seed": 42,
//!   "max_turns": 500,
//!   "free_mulligans": 0
//! }
//! ```
//!
//! Every field is optional. Relative card file paths are resolved against
//! the config file's directory.

use crate::game::game_loop::DEFAULT_MAX_TURNS;
use crate::matches::MatchType;
use crate::registry::{CardRegistry, ControllerKind, GameTypeRegistry, PlayerTypeRegistry};
use crate::{Result, SimError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "config/config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameTypeEntry {
    pub name: String,
    pub match_type: MatchType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerTypeEntry {
    pub name: String,
    pub controller: ControllerKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub game_types: Vec<GameTypeEntry>,
    pub player_types: Vec<PlayerTypeEntry>,
    pub card_files: Vec<PathBuf>,
    pub default_player_type: String,
    /// Base seed; iteration `i` runs with `seed + i`
    pub seed: Option<u64>,
    pub max_turns: u32,
    pub free_mulligans: u8,
    /// Directory relative card files are resolved against
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            game_types: Vec::new(),
            player_types: Vec::new(),
            card_files: Vec::new(),
            default_player_type: "Computer - mad".to_string(),
            seed: None,
            max_turns: DEFAULT_MAX_TURNS,
            free_mulligans: 0,
            base_dir: PathBuf::from("."),
        }
    }
}

impl SimulationConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: SimulationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a config file; any failure is a configuration error
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SimError::Config(format!("cannot read {}: {e}", path.display())))?;
        let mut config = Self::from_json(&content)
            .map_err(|e| SimError::Config(format!("{}: {e}", path.display())))?;
        config.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(config)
    }

    /// An explicitly named file must load; without one the default path
    /// is used if present and built-in defaults otherwise
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_PATH);
                if default.exists() {
                    Self::load(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_turns == 0 {
            return Err(SimError::Config("max_turns must be at least 1".to_string()));
        }
        self.player_type_registry().get(&self.default_player_type)?;
        Ok(())
    }

    /// Built-in game types plus the configured ones
    pub fn game_type_registry(&self) -> GameTypeRegistry {
        let mut registry = GameTypeRegistry::builtin();
        for entry in &self.game_types {
            registry.register(&entry.name, entry.match_type);
        }
        registry
    }

    /// Built-in player types plus the configured ones
    pub fn player_type_registry(&self) -> PlayerTypeRegistry {
        let mut registry = PlayerTypeRegistry::builtin();
        for entry in &self.player_types {
            registry.register(&entry.name, entry.controller);
        }
        registry
    }

    /// Built-in cards plus every configured card file
    pub fn card_registry(&self) -> Result<CardRegistry> {
        let mut registry = CardRegistry::builtin();
        for file in &self.card_files {
            let path = if file.is_absolute() {
                file.clone()
            } else {
                self.base_dir.join(file)
            };
            registry.load_json_file(&path)?;
        }
        Ok(registry)
    }
}
