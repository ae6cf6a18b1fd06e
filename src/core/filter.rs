//! Object filters and predicates
//!
//! A filter is a named object class ("artifact", "creature") narrowed by
//! zero or more predicates ("you control", "another", "tapped"). Filters are
//! plain immutable values owned by the ability that declares them; they are
//! evaluated against the game state every time they are consulted, so a
//! trigger condition checked when an event happens is checked again from
//! scratch when the ability resolves.

use crate::core::{CardId, CardType, Keyword, PlayerId, Subtype};
use crate::game::GameState;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which player, relative to the ability's controller, something refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TargetController {
    You,
    Opponent,
    #[default]
    Any,
}

impl TargetController {
    pub fn matches(self, player: PlayerId, you: PlayerId) -> bool {
        match self {
            TargetController::You => player == you,
            TargetController::Opponent => player != you,
            TargetController::Any => true,
        }
    }
}

/// Broad class of objects a filter accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectClass {
    Permanent,
    Creature,
    Artifact,
    Enchantment,
    Land,
    Nonland,
}

/// A single condition on an object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Predicate {
    /// The object's controller relative to the ability's controller
    ControlledBy(TargetController),
    Tapped,
    Untapped,
    /// Any object other than the ability's source
    Another,
    /// Only the ability's source itself
    IsSource,
    HasSubtype(Subtype),
    HasKeyword(Keyword),
    PowerAtMost(i32),
    PowerAtLeast(i32),
}

/// Who is asking: the ability's source object and its controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterContext {
    pub source: Option<CardId>,
    pub you: PlayerId,
}

impl FilterContext {
    pub fn new(source: Option<CardId>, you: PlayerId) -> Self {
        FilterContext { source, you }
    }
}

/// Named object class plus predicates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub name: String,
    pub class: ObjectClass,
    #[serde(default)]
    pub predicates: Vec<Predicate>,
}

impl Filter {
    pub fn new(name: impl Into<String>, class: ObjectClass) -> Self {
        Filter {
            name: name.into(),
            class,
            predicates: Vec::new(),
        }
    }

    pub fn permanent() -> Self {
        Filter::new("permanent", ObjectClass::Permanent)
    }

    pub fn creature() -> Self {
        Filter::new("creature", ObjectClass::Creature)
    }

    pub fn artifact() -> Self {
        Filter::new("artifact", ObjectClass::Artifact)
    }

    pub fn land() -> Self {
        Filter::new("land", ObjectClass::Land)
    }

    /// Add a predicate, extending the filter's name
    pub fn with(mut self, predicate: Predicate) -> Self {
        self.name = match &predicate {
            Predicate::ControlledBy(TargetController::You) => format!("{} you control", self.name),
            Predicate::ControlledBy(TargetController::Opponent) => {
                format!("{} an opponent controls", self.name)
            }
            Predicate::Another => format!("another {}", self.name),
            Predicate::Tapped => format!("tapped {}", self.name),
            Predicate::Untapped => format!("untapped {}", self.name),
            Predicate::HasKeyword(kw) => format!("{} with {:?}", self.name, kw).to_lowercase(),
            _ => self.name,
        };
        self.predicates.push(predicate);
        self
    }

    /// Evaluate the filter against an object
    ///
    /// `object_controller` is passed explicitly so callers can use the
    /// last known controller of an object that already left the battlefield.
    /// The object's zone is not checked here. Missing objects never match.
    pub fn matches(
        &self,
        game: &GameState,
        object: CardId,
        object_controller: PlayerId,
        ctx: &FilterContext,
    ) -> bool {
        let Ok(card) = game.cards.get(object) else {
            return false;
        };

        let class_ok = match self.class {
            ObjectClass::Permanent => !card.is_type(CardType::Instant) && !card.is_type(CardType::Sorcery),
            ObjectClass::Creature => card.is_type(CardType::Creature),
            ObjectClass::Artifact => card.is_type(CardType::Artifact),
            ObjectClass::Enchantment => card.is_type(CardType::Enchantment),
            ObjectClass::Land => card.is_type(CardType::Land),
            ObjectClass::Nonland => !card.is_type(CardType::Land),
        };
        if !class_ok {
            return false;
        }

        self.predicates.iter().all(|predicate| match predicate {
            Predicate::ControlledBy(who) => who.matches(object_controller, ctx.you),
            Predicate::Tapped => card.is_tapped(),
            Predicate::Untapped => !card.is_tapped(),
            Predicate::Another => ctx.source != Some(object),
            Predicate::IsSource => ctx.source == Some(object),
            Predicate::HasSubtype(subtype) => card.definition.subtypes.contains(subtype),
            Predicate::HasKeyword(keyword) => game.has_keyword(object, *keyword),
            Predicate::PowerAtMost(n) => game.power(object) <= *n,
            Predicate::PowerAtLeast(n) => game.power(object) >= *n,
        })
    }

    /// Evaluate the filter against a permanent currently on the battlefield
    pub fn matches_permanent(&self, game: &GameState, object: CardId, ctx: &FilterContext) -> bool {
        game.battlefield.contains(object)
            && game
                .cards
                .get(object)
                .map(|card| self.matches(game, object, card.controller(), ctx))
                .unwrap_or(false)
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_controller_relations() {
        let you = PlayerId::new(0);
        let other = PlayerId::new(1);
        assert!(TargetController::You.matches(you, you));
        assert!(!TargetController::You.matches(other, you));
        assert!(TargetController::Opponent.matches(other, you));
        assert!(TargetController::Any.matches(other, you));
    }

    #[test]
    fn test_filter_names_compose() {
        let filter = Filter::artifact().with(Predicate::ControlledBy(TargetController::You));
        assert_eq!(filter.to_string(), "artifact you control");

        let another = Filter::creature().with(Predicate::Another);
        assert_eq!(another.to_string(), "another creature");
        assert_eq!(another.predicates.len(), 1);
    }
}
