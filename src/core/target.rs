//! Targets and target specifications

use crate::core::{CardId, Filter, PlayerId, TargetController};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A chosen target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Target {
    Player(PlayerId),
    Permanent(CardId),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Player(id) => write!(f, "player {id}"),
            Target::Permanent(id) => write!(f, "permanent {id}"),
        }
    }
}

/// What kind of object a target slot accepts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetKind {
    /// A permanent on the battlefield matching the filter
    Permanent(Filter),
    /// A player still in the game
    Player(TargetController),
    /// Either a matching permanent or any player ("any target")
    Any(Filter),
}

/// Legality constraints for a targeted ability
///
/// `min`/`max` bound the number of targets; `optional` lets the controller
/// choose none even when `min` is positive and candidates exist ("you may
/// choose up to...").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSpec {
    pub kind: TargetKind,
    pub min: usize,
    pub max: usize,
    #[serde(default)]
    pub optional: bool,
}

impl TargetSpec {
    pub fn exactly_one(kind: TargetKind) -> Self {
        TargetSpec {
            kind,
            min: 1,
            max: 1,
            optional: false,
        }
    }

    pub fn up_to(kind: TargetKind, max: usize) -> Self {
        TargetSpec {
            kind,
            min: 0,
            max,
            optional: false,
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Number of targets that must be chosen for the ability to do anything
    pub fn min_required(&self) -> usize {
        if self.optional {
            0
        } else {
            self.min
        }
    }

    pub fn describe(&self) -> String {
        let noun = match &self.kind {
            TargetKind::Permanent(filter) => filter.to_string(),
            TargetKind::Player(TargetController::Opponent) => "opponent".to_string(),
            TargetKind::Player(_) => "player".to_string(),
            TargetKind::Any(_) => "any target".to_string(),
        };
        match (self.min_required(), self.max) {
            (1, 1) => format!("target {noun}"),
            (0, 1) => format!("up to one target {noun}"),
            (_, max) => format!("up to {max} target {noun}s"),
        }
    }
}
