//! Abilities granted by card definitions
//!
//! Abilities are tagged variants rather than a class hierarchy: the trigger
//! engine looks at `Triggered`, the priority loop offers `Activated`, the
//! characteristic calculation applies `Static`, and zone/damage code
//! consults `Replacement`.

use crate::core::{Effect, Filter, ManaCost, TargetController, TargetSpec};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ability {
    Triggered(TriggeredAbility),
    Activated(ActivatedAbility),
    Static(StaticAbility),
    Replacement(ReplacementEffect),
}

impl Ability {
    pub fn as_triggered(&self) -> Option<&TriggeredAbility> {
        match self {
            Ability::Triggered(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_activated(&self) -> Option<&ActivatedAbility> {
        match self {
            Ability::Activated(a) => Some(a),
            _ => None,
        }
    }
}

/// Game events a triggered ability can listen for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerEvent {
    EntersBattlefield,
    LeavesBattlefield,
    /// A creature went from the battlefield to a graveyard
    Dies,
    BecomesTapped,
    Attacks,
    SpellCast,
    BeginningOfUpkeep,
    BeginningOfEndStep,
    LifeGained,
}

impl TriggerEvent {
    /// Events whose object is expected to still be on the battlefield when
    /// the ability resolves
    pub fn object_stays_on_battlefield(self) -> bool {
        matches!(
            self,
            TriggerEvent::EntersBattlefield | TriggerEvent::BecomesTapped | TriggerEvent::Attacks
        )
    }
}

/// What the event has to be about for the ability to trigger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerSubject {
    /// The source object itself ("when this creature enters")
    This,
    /// Any object matching the filter, once per qualifying object
    /// ("whenever an artifact enters under your control")
    Object(Filter),
    /// A player related to the ability's controller ("at the beginning of
    /// your upkeep", "whenever you gain life")
    Player(TargetController),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggeredAbility {
    pub event: TriggerEvent,
    pub subject: TriggerSubject,
    pub effects: Vec<Effect>,
    #[serde(default)]
    pub target: Option<TargetSpec>,
    /// "You may": the trigger always fires, its controller may decline on resolution
    #[serde(default)]
    pub optional: bool,
    pub description: String,
}

/// Cost of an activated ability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AbilityCost {
    #[serde(default)]
    pub tap: bool,
    #[serde(default)]
    pub mana: ManaCost,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivatedAbility {
    pub cost: AbilityCost,
    pub effects: Vec<Effect>,
    #[serde(default)]
    pub target: Option<TargetSpec>,
    pub description: String,
}

impl ActivatedAbility {
    /// Mana abilities produce mana, have no target and never use the stack
    pub fn is_mana_ability(&self) -> bool {
        self.target.is_none()
            && !self.effects.is_empty()
            && self.effects.iter().all(|e| matches!(e, Effect::AddMana { .. }))
    }

    /// Total mana this ability adds when activated
    pub fn mana_produced(&self) -> ManaCost {
        let mut total = ManaCost::new();
        for effect in &self.effects {
            if let Effect::AddMana { mana } = effect {
                for (slot, amount) in total.symbols.iter_mut().zip(mana.symbols) {
                    *slot += amount;
                }
            }
        }
        total
    }
}

/// Continuous effects that modify characteristics while the source is on the battlefield
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StaticAbility {
    /// Permanents matching the filter get +power/+toughness
    Anthem {
        filter: Filter,
        power: i32,
        toughness: i32,
    },
}

/// Effects that modify how an event happens instead of reacting to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplacementEffect {
    /// This permanent enters the battlefield tapped
    EntersTapped,
    /// Damage that would be dealt to a matching permanent is prevented
    PreventDamage { filter: Filter },
}
