//! Card registry and type factories
//!
//! The registry is built once before any game starts and is the only
//! thing games share: decks hold `Arc`s into it and no game ever mutates
//! a definition.

pub mod builtin;
pub mod factory;

pub use factory::{ControllerKind, GameTypeRegistry, PlayerTypeRegistry};

use crate::core::{normalize_card_name, CardDefinition};
use crate::{Result, SimError};
use rustc_hash::FxHashMap;
use std::path::Path;
use std::sync::Arc;

/// Read-only card lookup by name
#[derive(Debug, Clone, Default)]
pub struct CardRegistry {
    cards: FxHashMap<String, Arc<CardDefinition>>,
}

impl CardRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in card pool
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for definition in builtin::builtin_cards() {
            registry.register(definition);
        }
        registry
    }

    /// Add a definition, replacing any card with the same normalized name
    pub fn register(&mut self, definition: CardDefinition) -> Arc<CardDefinition> {
        let definition = Arc::new(definition);
        self.cards
            .insert(definition.name.normalized(), Arc::clone(&definition));
        definition
    }

    /// Look a card up by name, ignoring case, accents and extra whitespace
    pub fn get(&self, name: &str) -> Result<Arc<CardDefinition>> {
        self.cards
            .get(&normalize_card_name(name))
            .cloned()
            .ok_or_else(|| SimError::UnknownCard(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.cards.contains_key(&normalize_card_name(name))
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Card names in sorted order
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.cards.values().map(|c| c.name.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Add definitions from a JSON array; returns how many were added
    pub fn load_json_str(&mut self, json: &str) -> Result<usize> {
        let definitions: Vec<CardDefinition> = serde_json::from_str(json)?;
        let count = definitions.len();
        for definition in definitions {
            self.register(definition);
        }
        Ok(count)
    }

    pub fn load_json_file(&mut self, path: &Path) -> Result<usize> {
        let content = std::fs::read_to_string(path)?;
        self.load_json_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CardType;

    #[test]
    fn test_lookup_is_normalized() {
        let registry = CardRegistry::builtin();
        let bolt = registry.get("  lightning   BOLT").unwrap();
        assert_eq!(bolt.name.as_str(), "Lightning Bolt");
        assert!(Arc::ptr_eq(&bolt, &registry.get("Lightning Bolt").unwrap()));
        assert!(registry.contains("man-o'-war"));
    }

    #[test]
    fn test_unknown_card() {
        let registry = CardRegistry::builtin();
        match registry.get("Nonexistent Card") {
            Err(SimError::UnknownCard(name)) => assert_eq!(name, "Nonexistent Card"),
            other => panic!("expected UnknownCard, got {other:?}"),
        }
    }

    #[test]
    fn test_load_json() {
        let mut registry = CardRegistry::new();
        let added = registry
            .load_json_str(
                r#"[
                    {"name": "Hill Giant", "mana_cost": "3R", "types": ["Creature"], "power": 3, "toughness": 3},
                    {"name": "Æther Adept", "mana_cost": "1UU", "types": ["Creature"], "power": 2, "toughness": 2}
                ]"#,
            )
            .unwrap();
        assert_eq!(added, 2);
        assert!(registry.get("aether adept").unwrap().is_type(CardType::Creature));
        assert!(matches!(
            registry.load_json_str("{not json"),
            Err(SimError::SerializationError(_))
        ));
    }
}
