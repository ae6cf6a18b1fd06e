//! Effects: units of game-state mutation
//!
//! An effect names *who* it applies to through [`EffectTarget`] and is
//! applied with [`Effect::apply`] against the targets that were chosen when
//! the spell or ability was put on the stack and re-validated at resolution.
//! A target that is no longer legal is simply skipped.

use crate::core::{CardId, ManaCost, PlayerId, Target};
use crate::game::logger::log_if_verbose;
use crate::game::GameState;
use crate::zones::Zone;
use crate::Result;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Who or what an effect applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectTarget {
    /// The targets chosen for the spell or ability
    Targets,
    /// The controller of the spell or ability
    Controller,
    /// The source permanent itself
    Source,
    /// The object whose event triggered the ability
    TriggeringObject,
    /// The player whose event triggered the ability
    TriggeringPlayer,
    EachOpponent,
    EachPlayer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    /// "Tap target permanent"
    Tap { target: EffectTarget },
    /// "Untap target land"
    Untap { target: EffectTarget },
    /// "Deal 3 damage to any target"
    DealDamage { target: EffectTarget, amount: i32 },
    /// "Destroy target creature"
    Destroy { target: EffectTarget },
    /// "Draw two cards"
    DrawCards { target: EffectTarget, count: u8 },
    /// "You gain 1 life"
    GainLife { target: EffectTarget, amount: i32 },
    /// "Each opponent loses 1 life"
    LoseLife { target: EffectTarget, amount: i32 },
    /// "Target creature gets +3/+3 until end of turn"
    Pump {
        target: EffectTarget,
        power: i32,
        toughness: i32,
    },
    /// "Target player mills two cards"
    Mill { target: EffectTarget, count: u8 },
    /// "Return target creature to its owner's hand"
    ReturnToHand { target: EffectTarget },
    /// Mana abilities: add mana to the controller's pool
    AddMana { mana: ManaCost },
}

/// Everything an effect needs to know about the ability it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectContext {
    pub source: Option<CardId>,
    pub controller: PlayerId,
    pub targets: SmallVec<[Target; 2]>,
    pub triggering_object: Option<CardId>,
    pub triggering_player: Option<PlayerId>,
}

impl EffectContext {
    pub fn new(source: Option<CardId>, controller: PlayerId) -> Self {
        EffectContext {
            source,
            controller,
            targets: SmallVec::new(),
            triggering_object: None,
            triggering_player: None,
        }
    }

    pub fn with_targets(mut self, targets: SmallVec<[Target; 2]>) -> Self {
        self.targets = targets;
        self
    }
}

impl EffectTarget {
    /// Permanents this selector currently refers to (battlefield only)
    fn permanents(self, game: &GameState, ctx: &EffectContext) -> SmallVec<[CardId; 4]> {
        let candidates: SmallVec<[CardId; 4]> = match self {
            EffectTarget::Targets => ctx
                .targets
                .iter()
                .filter_map(|t| match t {
                    Target::Permanent(id) => Some(*id),
                    Target::Player(_) => None,
                })
                .collect(),
            EffectTarget::Source => ctx.source.into_iter().collect(),
            EffectTarget::TriggeringObject => ctx.triggering_object.into_iter().collect(),
            _ => SmallVec::new(),
        };
        candidates
            .into_iter()
            .filter(|id| game.battlefield.contains(*id))
            .collect()
    }

    /// Players this selector currently refers to (players still in the game)
    fn players(self, game: &GameState, ctx: &EffectContext) -> SmallVec<[PlayerId; 4]> {
        let candidates: SmallVec<[PlayerId; 4]> = match self {
            EffectTarget::Targets => ctx
                .targets
                .iter()
                .filter_map(|t| match t {
                    Target::Player(id) => Some(*id),
                    Target::Permanent(_) => None,
                })
                .collect(),
            EffectTarget::Controller => smallvec::smallvec![ctx.controller],
            EffectTarget::TriggeringPlayer => ctx.triggering_player.into_iter().collect(),
            EffectTarget::EachOpponent => game
                .alive_players()
                .filter(|p| *p != ctx.controller)
                .collect(),
            EffectTarget::EachPlayer => game.alive_players().collect(),
            EffectTarget::Source | EffectTarget::TriggeringObject => SmallVec::new(),
        };
        candidates.into_iter().filter(|p| game.is_alive(*p)).collect()
    }
}

impl Effect {
    /// Apply the effect to the current game state
    ///
    /// Objects that have left the battlefield and players who left the
    /// game are skipped, so this only fails on engine inconsistencies.
    pub fn apply(&self, game: &mut GameState, ctx: &EffectContext) -> Result<()> {
        match self {
            Effect::Tap { target } => {
                for card in target.permanents(game, ctx) {
                    game.tap_permanent(card)?;
                }
            }
            Effect::Untap { target } => {
                for card in target.permanents(game, ctx) {
                    game.untap_permanent(card)?;
                }
            }
            Effect::DealDamage { target, amount } => {
                for card in target.permanents(game, ctx) {
                    game.deal_damage(ctx.source, Target::Permanent(card), *amount, false)?;
                }
                for player in target.players(game, ctx) {
                    game.deal_damage(ctx.source, Target::Player(player), *amount, false)?;
                }
            }
            Effect::Destroy { target } => {
                for card in target.permanents(game, ctx) {
                    log_if_verbose!(game.logger, "{} is destroyed", game.describe_card(card));
                    game.move_card(card, Zone::Graveyard)?;
                }
            }
            Effect::DrawCards { target, count } => {
                for player in target.players(game, ctx) {
                    for _ in 0..*count {
                        game.draw_card(player)?;
                    }
                }
            }
            Effect::GainLife { target, amount } => {
                for player in target.players(game, ctx) {
                    game.gain_life(player, *amount)?;
                }
            }
            Effect::LoseLife { target, amount } => {
                for player in target.players(game, ctx) {
                    game.lose_life(player, *amount)?;
                }
            }
            Effect::Pump {
                target,
                power,
                toughness,
            } => {
                for card in target.permanents(game, ctx) {
                    game.pump(card, *power, *toughness)?;
                }
            }
            Effect::Mill { target, count } => {
                for player in target.players(game, ctx) {
                    game.mill_cards(player, *count)?;
                }
            }
            Effect::ReturnToHand { target } => {
                for card in target.permanents(game, ctx) {
                    log_if_verbose!(game.logger, "{} returns to its owner's hand", game.describe_card(card));
                    game.move_card(card, Zone::Hand)?;
                }
            }
            Effect::AddMana { mana } => {
                game.get_player_mut(ctx.controller)?.mana_pool.add(mana);
            }
        }
        Ok(())
    }

    /// Whether the effect hurts whoever it is pointed at
    ///
    /// Controllers use this to aim targets at opponents or at themselves.
    pub fn is_harmful(&self) -> bool {
        matches!(
            self,
            Effect::Tap { .. }
                | Effect::DealDamage { .. }
                | Effect::Destroy { .. }
                | Effect::LoseLife { .. }
                | Effect::Mill { .. }
                | Effect::ReturnToHand { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_harmful_classification() {
        let bolt = Effect::DealDamage {
            target: EffectTarget::Targets,
            amount: 3,
        };
        let growth = Effect::Pump {
            target: EffectTarget::Targets,
            power: 3,
            toughness: 3,
        };
        assert!(bolt.is_harmful());
        assert!(!growth.is_harmful());
        assert!(Effect::Tap {
            target: EffectTarget::Targets
        }
        .is_harmful());
    }

    #[test]
    fn test_context_builder() {
        let ctx = EffectContext::new(Some(CardId::new(3)), PlayerId::new(0))
            .with_targets(smallvec::smallvec![Target::Player(PlayerId::new(1))]);
        assert_eq!(ctx.targets.len(), 1);
        assert_eq!(ctx.triggering_object, None);
    }
}
