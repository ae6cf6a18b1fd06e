//! Deck list loader (.dck and plain text)
//!
//! Accepted shapes, mixed freely:
//!
//! ```text
//! [metadata]
//! Name=Mono Green
//! [Main]
//! 24 Forest
//! 4 Grizzly Bears|M10
//! [Sideboard]
//! 2 Naturalize
//! [Commander]
//! 1 Kamahl, Fist of Krosa
//! ```
//!
//! or a plain list with `SB: 2 Naturalize` marking sideboard cards and a
//! bare `Sideboard` / `Commander` line switching sections. Counts may be
//! written `4` or `4x`.

use crate::core::{CardDefinition, CardType};
use crate::matches::{MatchOptions, MatchType};
use crate::registry::CardRegistry;
use crate::{Result, SimError};
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Deck loader for .dck and .txt files
pub struct DeckLoader;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Main,
    Sideboard,
    Commander,
    Metadata,
}

impl DeckLoader {
    /// Load a deck list from a file
    pub fn load_from_file(path: &Path) -> Result<DeckList> {
        let content = fs::read_to_string(path)?;
        let mut list = Self::parse(&content)?;
        if list.name.is_none() {
            list.name = path.file_stem().map(|s| s.to_string_lossy().into_owned());
        }
        Ok(list)
    }

    /// Parse a deck list from its text content
    pub fn parse(content: &str) -> Result<DeckList> {
        let mut list = DeckList::default();
        let mut section = Section::Main;

        for (line_number, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with("//") {
                continue;
            }

            if let Some(header) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                section = match header.trim().to_lowercase().as_str() {
                    "main" => Section::Main,
                    "sideboard" => Section::Sideboard,
                    "commander" => Section::Commander,
                    _ => Section::Metadata,
                };
                continue;
            }
            match line.trim_end_matches(':').to_lowercase().as_str() {
                "deck" | "main" => {
                    section = Section::Main;
                    continue;
                }
                "sideboard" => {
                    section = Section::Sideboard;
                    continue;
                }
                "commander" => {
                    section = Section::Commander;
                    continue;
                }
                _ => {}
            }

            if section == Section::Metadata {
                if let Some((key, value)) = line.split_once('=') {
                    if key.trim().eq_ignore_ascii_case("name") {
                        list.name = Some(value.trim().to_string());
                    }
                }
                continue;
            }

            let (target, rest) = match line.strip_prefix("SB:") {
                Some(rest) => (Section::Sideboard, rest.trim()),
                None => (section, line),
            };
            let entry = Self::parse_entry(rest).ok_or_else(|| {
                SimError::InvalidDeckFormat(format!("line {}: expected '<count> <card name>', got '{line}'", line_number + 1))
            })?;
            match target {
                Section::Sideboard => list.sideboard.push(entry),
                Section::Commander => list.commander.push(entry),
                _ => list.main_deck.push(entry),
            }
        }

        if list.main_deck.is_empty() && list.commander.is_empty() {
            return Err(SimError::InvalidDeckFormat("Empty deck".to_string()));
        }
        Ok(list)
    }

    /// "4 Name", "4x Name" or "4 Name|SET"
    fn parse_entry(line: &str) -> Option<DeckEntry> {
        let (count_str, rest) = line.split_once(char::is_whitespace)?;
        let count: u8 = count_str.trim_end_matches(['x', 'X']).parse().ok()?;
        let name = match rest.split_once('|') {
            Some((name, _set)) => name,
            None => rest,
        }
        .trim();
        if count == 0 || name.is_empty() {
            return None;
        }
        Some(DeckEntry {
            card_name: name.to_string(),
            count,
        })
    }
}

/// Card name and count as written in the list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckEntry {
    pub card_name: String,
    pub count: u8,
}

/// A parsed but unresolved deck list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeckList {
    pub name: Option<String>,
    pub main_deck: Vec<DeckEntry>,
    pub sideboard: Vec<DeckEntry>,
    pub commander: Vec<DeckEntry>,
}

impl DeckList {
    /// Total cards in main deck
    pub fn total_cards(&self) -> usize {
        self.main_deck.iter().map(|e| e.count as usize).sum()
    }

    /// Total cards in sideboard
    pub fn sideboard_size(&self) -> usize {
        self.sideboard.iter().map(|e| e.count as usize).sum()
    }

    /// Distinct card names across every section
    pub fn unique_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .main_deck
            .iter()
            .chain(&self.sideboard)
            .chain(&self.commander)
            .map(|e| e.card_name.as_str())
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Look every card up in the registry
    pub fn resolve(&self, registry: &CardRegistry) -> Result<Deck> {
        let expand = |entries: &[DeckEntry]| -> Result<Vec<Arc<CardDefinition>>> {
            let mut cards = Vec::new();
            for entry in entries {
                let definition = registry.get(&entry.card_name)?;
                cards.extend(std::iter::repeat(definition).take(entry.count as usize));
            }
            Ok(cards)
        };
        Ok(Deck {
            name: self.name.clone().unwrap_or_else(|| "Unnamed deck".to_string()),
            main: expand(&self.main_deck)?,
            sideboard: expand(&self.sideboard)?,
            commanders: expand(&self.commander)?,
        })
    }
}

/// A deck whose cards are resolved to shared definitions
#[derive(Debug, Clone)]
pub struct Deck {
    pub name: String,
    /// Library contents in list order
    pub main: Vec<Arc<CardDefinition>>,
    pub sideboard: Vec<Arc<CardDefinition>>,
    pub commanders: Vec<Arc<CardDefinition>>,
}

impl Deck {
    /// Cards the player starts with, commanders included
    pub fn len(&self) -> usize {
        self.main.len() + self.commanders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check the deck is legal for the match
    pub fn validate(&self, options: &MatchOptions) -> Result<()> {
        let min = options.min_deck_size();
        if self.len() < min {
            return Err(SimError::InvalidDeckFormat(format!(
                "{} has {} cards, {} needs at least {min}",
                self.name,
                self.len(),
                options.game_type
            )));
        }
        if options.match_type == MatchType::CommanderFreeForAll {
            if self.commanders.is_empty() {
                return Err(SimError::InvalidDeckFormat(format!("{} has no commander", self.name)));
            }
            if let Some(bad) = self
                .commanders
                .iter()
                .find(|c| !(c.legendary && c.is_type(CardType::Creature)))
            {
                return Err(SimError::InvalidDeckFormat(format!(
                    "{} cannot be a commander: not a legendary creature",
                    bad.name
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_deck() {
        let content = r#"
[metadata]
Name=Test Deck

[Main]
20 Mountain
40 Lightning Bolt

[Sideboard]
15 Shock
"#;

        let deck = DeckLoader::parse(content).unwrap();
        assert_eq!(deck.name.as_deref(), Some("Test Deck"));
        assert_eq!(deck.main_deck.len(), 2);
        assert_eq!(deck.total_cards(), 60);

        assert_eq!(deck.main_deck[0].card_name, "Mountain");
        assert_eq!(deck.main_deck[0].count, 20);
        assert_eq!(deck.main_deck[1].card_name, "Lightning Bolt");
        assert_eq!(deck.main_deck[1].count, 40);

        assert_eq!(deck.sideboard_size(), 15);
        assert_eq!(deck.sideboard[0].card_name, "Shock");
    }

    #[test]
    fn test_parse_plain_text_list() {
        let content = "4x Grizzly Bears|M10\n56 Forest\nSB: 2 Naturalize\n\nCommander\n1 Kamahl, Fist of Krosa\n";
        let deck = DeckLoader::parse(content).unwrap();
        assert_eq!(deck.total_cards(), 60);
        assert_eq!(deck.main_deck[0].card_name, "Grizzly Bears");
        assert_eq!(deck.sideboard[0].count, 2);
        assert_eq!(deck.commander[0].card_name, "Kamahl, Fist of Krosa");
    }

    #[test]
    fn test_malformed_line_is_rejected() {
        let err = DeckLoader::parse("20 Forest\nGrizzly Bears\n").unwrap_err();
        assert!(matches!(err, SimError::InvalidDeckFormat(ref m) if m.contains("line 2")));
        assert!(DeckLoader::parse("# nothing here\n").is_err());
    }

    #[test]
    fn test_resolve_and_validate() {
        let registry = CardRegistry::builtin();
        let list = DeckLoader::parse("24 Forest\n36 Grizzly Bears\n").unwrap();
        let deck = list.resolve(&registry).unwrap();
        assert_eq!(deck.len(), 60);
        assert!(Arc::ptr_eq(&deck.main[0], &deck.main[1]));
        deck.validate(&MatchOptions::duel()).unwrap();
        assert!(deck.validate(&MatchOptions::commander(4)).is_err());
    }

    #[test]
    fn test_unknown_card() {
        let registry = CardRegistry::builtin();
        let list = DeckLoader::parse("1 Black Lotus Prime\n").unwrap();
        assert!(matches!(list.resolve(&registry), Err(SimError::UnknownCard(_))));
    }
}
