//! Strongly-typed wrappers for game concepts
//!
//! Newtypes keep card names, player names and subtypes from being mixed up
//! with each other or with free-form text.

use deunicode::deunicode;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(s: impl Into<String>) -> Self {
                $name(s.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                $name(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                $name(s.to_string())
            }
        }
    };
}

string_newtype!(
    /// Card name as printed (e.g. "Lumengrid Sentinel")
    CardName
);

string_newtype!(
    /// Player name (e.g. "Player 1")
    PlayerName
);

string_newtype!(
    /// Card subtype (creature type, land type, artifact type)
    ///
    /// Examples: "Human", "Wizard", "Island", "Equipment"
    Subtype
);

impl CardName {
    /// Registry lookup key: ASCII-folded, lowercased, whitespace collapsed
    ///
    /// "Æther Vial" and "aether  vial" map to the same key.
    pub fn normalized(&self) -> String {
        normalize_card_name(&self.0)
    }
}

/// Normalize a card name for lookups
pub fn normalize_card_name(name: &str) -> String {
    deunicode(name)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_name_normalization() {
        let name = CardName::new("Æther Vial");
        assert_eq!(name.as_str(), "Æther Vial");
        assert_eq!(name.normalized(), "aether vial");
        assert_eq!(normalize_card_name("  Lumengrid   SENTINEL "), "lumengrid sentinel");
    }

    #[test]
    fn test_subtype() {
        let subtype = Subtype::from("Wizard");
        assert_eq!(subtype.as_str(), "Wizard");
        assert_eq!(subtype.to_string(), "Wizard");
    }

    #[test]
    fn test_player_name() {
        let name = PlayerName::new("Player 1");
        assert_eq!(name.as_str(), "Player 1");
    }
}
