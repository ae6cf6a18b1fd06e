//! Game events observed by the trigger engine
//!
//! Every atomic state change that abilities can react to is recorded as a
//! `GameEvent` in `GameState::pending_events`. The trigger engine drains
//! the queue at the next check; events themselves never mutate anything.

use crate::core::{CardId, PlayerId, TriggerEvent};
use crate::game::phase::Step;
use crate::zones::Zone;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// A card changed zones
    ///
    /// `controller` is the controller in the zone it left when that was the
    /// battlefield (last known information), otherwise its new controller.
    ZoneChange {
        card: CardId,
        from: Zone,
        to: Zone,
        controller: PlayerId,
    },
    Tapped {
        card: CardId,
        controller: PlayerId,
    },
    AttackerDeclared {
        card: CardId,
        controller: PlayerId,
        defender: PlayerId,
    },
    SpellCast {
        card: CardId,
        controller: PlayerId,
    },
    StepBegan {
        step: Step,
        active_player: PlayerId,
    },
    LifeGained {
        player: PlayerId,
        amount: i32,
    },
}

impl GameEvent {
    /// Trigger kinds this event satisfies
    ///
    /// A creature dying is both a "dies" and a "leaves the battlefield" event.
    pub fn trigger_kinds(&self, object_was_creature: bool) -> smallvec::SmallVec<[TriggerEvent; 2]> {
        let mut kinds = smallvec::SmallVec::new();
        match self {
            GameEvent::ZoneChange { from, to, .. } => {
                if *to == Zone::Battlefield && *from != Zone::Battlefield {
                    kinds.push(TriggerEvent::EntersBattlefield);
                }
                if *from == Zone::Battlefield && *to != Zone::Battlefield {
                    kinds.push(TriggerEvent::LeavesBattlefield);
                    if *to == Zone::Graveyard && object_was_creature {
                        kinds.push(TriggerEvent::Dies);
                    }
                }
            }
            GameEvent::Tapped { .. } => kinds.push(TriggerEvent::BecomesTapped),
            GameEvent::AttackerDeclared { .. } => kinds.push(TriggerEvent::Attacks),
            GameEvent::SpellCast { .. } => kinds.push(TriggerEvent::SpellCast),
            GameEvent::StepBegan {
                step: Step::Upkeep, ..
            } => kinds.push(TriggerEvent::BeginningOfUpkeep),
            GameEvent::StepBegan { step: Step::End, .. } => {
                kinds.push(TriggerEvent::BeginningOfEndStep)
            }
            GameEvent::StepBegan { .. } => {}
            GameEvent::LifeGained { .. } => kinds.push(TriggerEvent::LifeGained),
        }
        kinds
    }

    /// The object the event is about, if any
    pub fn object(&self) -> Option<CardId> {
        match self {
            GameEvent::ZoneChange { card, .. }
            | GameEvent::Tapped { card, .. }
            | GameEvent::AttackerDeclared { card, .. }
            | GameEvent::SpellCast { card, .. } => Some(*card),
            GameEvent::StepBegan { .. } | GameEvent::LifeGained { .. } => None,
        }
    }

    /// The player the event is about: the object's controller, the active
    /// player of a step, or the player who gained life
    pub fn player(&self) -> PlayerId {
        match self {
            GameEvent::ZoneChange { controller, .. }
            | GameEvent::Tapped { controller, .. }
            | GameEvent::AttackerDeclared { controller, .. }
            | GameEvent::SpellCast { controller, .. } => *controller,
            GameEvent::StepBegan { active_player, .. } => *active_player,
            GameEvent::LifeGained { player, .. } => *player,
        }
    }
}
