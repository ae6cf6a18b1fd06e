//! Card types and definitions

use crate::core::{
    Ability, CardId, CardName, Effect, GameEntity, ManaCost, PlayerId, ReplacementEffect, Subtype,
    TargetSpec,
};
use crate::zones::Zone;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::sync::Arc;

/// Card types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardType {
    Land,
    Creature,
    Artifact,
    Enchantment,
    Instant,
    Sorcery,
}

/// Keyword abilities understood by combat and the damage rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Keyword {
    Flying,
    Reach,
    Haste,
    Vigilance,
    Defender,
    Lifelink,
    Deathtouch,
}

/// What an instant or sorcery does when it resolves
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellEffect {
    #[serde(default)]
    pub target: Option<TargetSpec>,
    pub effects: Vec<Effect>,
}

/// Immutable card template
///
/// Definitions live in the card registry and are shared through `Arc` by
/// every card object created from them, across every game copy. Nothing
/// mutates a definition once the registry is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDefinition {
    pub name: CardName,

    #[serde(default)]
    pub mana_cost: ManaCost,

    pub types: SmallVec<[CardType; 2]>,

    #[serde(default)]
    pub subtypes: SmallVec<[Subtype; 2]>,

    #[serde(default)]
    pub legendary: bool,

    #[serde(default)]
    pub power: Option<i32>,

    #[serde(default)]
    pub toughness: Option<i32>,

    #[serde(default)]
    pub keywords: SmallVec<[Keyword; 2]>,

    /// Abilities in declaration order; triggers tie-break on this index
    #[serde(default)]
    pub abilities: Vec<Ability>,

    #[serde(default)]
    pub spell: Option<SpellEffect>,

    /// Oracle text
    #[serde(default)]
    pub text: String,
}

impl CardDefinition {
    pub fn new(name: impl Into<CardName>, types: &[CardType]) -> Self {
        CardDefinition {
            name: name.into(),
            mana_cost: ManaCost::new(),
            types: types.iter().copied().collect(),
            subtypes: SmallVec::new(),
            legendary: false,
            power: None,
            toughness: None,
            keywords: SmallVec::new(),
            abilities: Vec::new(),
            spell: None,
            text: String::new(),
        }
    }

    pub fn with_cost(mut self, cost: ManaCost) -> Self {
        self.mana_cost = cost;
        self
    }

    pub fn with_pt(mut self, power: i32, toughness: i32) -> Self {
        self.power = Some(power);
        self.toughness = Some(toughness);
        self
    }

    pub fn with_subtypes(mut self, subtypes: &[&str]) -> Self {
        self.subtypes = subtypes.iter().map(|s| Subtype::new(*s)).collect();
        self
    }

    pub fn with_keywords(mut self, keywords: &[Keyword]) -> Self {
        self.keywords = keywords.iter().copied().collect();
        self
    }

    pub fn legendary(mut self) -> Self {
        self.legendary = true;
        self
    }

    pub fn with_ability(mut self, ability: Ability) -> Self {
        self.abilities.push(ability);
        self
    }

    pub fn with_spell(mut self, target: Option<TargetSpec>, effects: Vec<Effect>) -> Self {
        self.spell = Some(SpellEffect { target, effects });
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn is_type(&self, card_type: CardType) -> bool {
        self.types.contains(&card_type)
    }

    /// Lands, creatures, artifacts and enchantments
    pub fn is_permanent_card(&self) -> bool {
        !self.is_type(CardType::Instant) && !self.is_type(CardType::Sorcery)
    }

    pub fn enters_tapped(&self) -> bool {
        self.abilities
            .iter()
            .any(|a| matches!(a, Ability::Replacement(ReplacementEffect::EntersTapped)))
    }
}

/// Battlefield-only state of a card
///
/// Created when the card enters the battlefield and dropped when it
/// leaves, so a card that comes back is a new object with fresh state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Permanent {
    pub controller: PlayerId,
    pub tapped: bool,
    /// Damage marked this turn
    pub damage: i32,
    /// Marked damage includes damage from a deathtouch source
    pub deathtouch_damage: bool,
    /// Turn the permanent came under its controller's control (summoning sickness)
    pub entered_turn: u32,
    /// Until-end-of-turn modifiers
    pub power_bonus: i32,
    pub toughness_bonus: i32,
}

impl Permanent {
    pub fn new(controller: PlayerId, entered_turn: u32) -> Self {
        Permanent {
            controller,
            tapped: false,
            damage: 0,
            deathtouch_damage: false,
            entered_turn,
            power_bonus: 0,
            toughness_bonus: 0,
        }
    }
}

/// A card object in a game
///
/// Card objects keep their id for the whole game while they move between
/// zones. The template is shared; all mutable state is in `zone`,
/// `permanent` and the commander flag.
#[derive(Debug, Clone, Serialize)]
pub struct Card {
    pub id: CardId,
    pub definition: Arc<CardDefinition>,
    pub owner: PlayerId,
    pub zone: Zone,
    pub is_commander: bool,
    pub permanent: Option<Permanent>,
}

impl Card {
    pub fn new(id: CardId, definition: Arc<CardDefinition>, owner: PlayerId, zone: Zone) -> Self {
        Card {
            id,
            definition,
            owner,
            zone,
            is_commander: false,
            permanent: None,
        }
    }

    pub fn name(&self) -> &str {
        self.definition.name.as_str()
    }

    pub fn is_type(&self, card_type: CardType) -> bool {
        self.definition.is_type(card_type)
    }

    pub fn is_creature(&self) -> bool {
        self.is_type(CardType::Creature)
    }

    pub fn is_land(&self) -> bool {
        self.is_type(CardType::Land)
    }

    pub fn is_tapped(&self) -> bool {
        self.permanent.as_ref().is_some_and(|p| p.tapped)
    }

    /// Controller on the battlefield, owner everywhere else
    pub fn controller(&self) -> PlayerId {
        self.permanent
            .as_ref()
            .map(|p| p.controller)
            .unwrap_or(self.owner)
    }

    pub fn has_printed_keyword(&self, keyword: Keyword) -> bool {
        self.definition.keywords.contains(&keyword)
    }
}

impl GameEntity for Card {
    type Id = CardId;

    fn id(&self) -> CardId {
        self.id
    }

    fn name(&self) -> &str {
        self.definition.name.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_builder() {
        let bears = CardDefinition::new("Grizzly Bears", &[CardType::Creature])
            .with_cost(ManaCost::from_string("1G").unwrap())
            .with_pt(2, 2)
            .with_subtypes(&["Bear"]);

        assert!(bears.is_type(CardType::Creature));
        assert!(bears.is_permanent_card());
        assert_eq!(bears.mana_cost.cmc(), 2);
        assert_eq!(bears.subtypes[0].as_str(), "Bear");
        assert!(!bears.enters_tapped());
    }

    #[test]
    fn test_card_controller_falls_back_to_owner() {
        let def = Arc::new(CardDefinition::new("Ornithopter", &[CardType::Artifact, CardType::Creature]));
        let owner = PlayerId::new(0);
        let mut card = Card::new(CardId::new(5), def, owner, Zone::Hand);

        assert_eq!(card.controller(), owner);
        assert!(!card.is_tapped());

        let mut permanent = Permanent::new(PlayerId::new(1), 1);
        permanent.tapped = true;
        card.permanent = Some(permanent);
        assert_eq!(card.controller(), PlayerId::new(1));
        assert!(card.is_tapped());
    }

    #[test]
    fn test_definition_from_json() {
        let json = r#"{
            "name": "Hill Giant",
            "mana_cost": "3R",
            "types": ["Creature"],
            "subtypes": ["Giant"],
            "power": 3,
            "toughness": 3
        }"#;
        let def: CardDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(def.name.as_str(), "Hill Giant");
        assert_eq!(def.mana_cost.to_string(), "3R");
        assert_eq!(def.power, Some(3));
        assert!(def.abilities.is_empty());
    }
}
