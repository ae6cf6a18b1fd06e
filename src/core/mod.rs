//! Core game types and entities

pub mod ability;
pub mod card;
pub mod effects;
pub mod entity;
pub mod filter;
pub mod mana;
pub mod player;
pub mod spell_ability;
pub mod target;
pub mod types;

pub use ability::{
    AbilityCost, Ability, ActivatedAbility, ReplacementEffect, StaticAbility, TriggerEvent,
    TriggerSubject, TriggeredAbility,
};
pub use card::{Card, CardDefinition, CardType, Keyword, Permanent, SpellEffect};
pub use effects::{Effect, EffectContext, EffectTarget};
pub use entity::{CardId, EntityStore, GameEntity, PlayerId};
pub use filter::{Filter, FilterContext, ObjectClass, Predicate, TargetController};
pub use mana::{Color, ManaCost, ManaPool};
pub use player::{Player, COMMANDER_DAMAGE_LIMIT};
pub use spell_ability::SpellAbility;
pub use target::{Target, TargetKind, TargetSpec};
pub use types::{normalize_card_name, CardName, PlayerName, Subtype};
