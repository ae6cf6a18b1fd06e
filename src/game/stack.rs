//! The stack and spell/ability resolution
//!
//! The stack is strictly last-in-first-out. While the top object resolves
//! the stack is `Resolving`; it is `PendingResolution` whenever objects are
//! waiting and `Empty` otherwise.
//!
//! Resolution re-checks everything against the current state: the chosen
//! targets, and for "whenever a matching object ..." triggers whose object
//! should still be on the battlefield, the trigger's own filter. An ability
//! that can no longer do anything fizzles; that is a normal outcome, not an
//! error.

use crate::core::{
    Ability, CardId, EffectContext, FilterContext, PlayerId, Target, TargetSpec, TriggerEvent,
    TriggerSubject,
};
use crate::game::controller::{controller_for, GameStateView, OptionalChoice, PlayerController};
use crate::game::logger::log_if_verbose;
use crate::game::targeting::still_legal;
use crate::game::GameState;
use crate::zones::Zone;
use crate::{Result, SimError};
use smallvec::SmallVec;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackObjectKind {
    Spell {
        card: CardId,
    },
    /// A triggered (`event` is `Some`) or activated ability
    Ability {
        source: CardId,
        ability_index: usize,
        triggering_object: Option<CardId>,
        triggering_player: Option<PlayerId>,
        event: Option<TriggerEvent>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackItem {
    pub controller: PlayerId,
    pub kind: StackObjectKind,
    pub targets: SmallVec<[Target; 2]>,
}

impl StackItem {
    pub fn spell_card(&self) -> Option<CardId> {
        match self.kind {
            StackObjectKind::Spell { card } => Some(card),
            StackObjectKind::Ability { .. } => None,
        }
    }

    pub fn source(&self) -> CardId {
        match self.kind {
            StackObjectKind::Spell { card } => card,
            StackObjectKind::Ability { source, .. } => source,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolutionState {
    #[default]
    Empty,
    PendingResolution,
    Resolving,
}

/// What happened when the top of the stack resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionOutcome {
    Resolved,
    /// Every required target became illegal, or a trigger's condition no
    /// longer holds; nothing happened
    Fizzled,
    /// The controller chose not to use a "you may" ability
    Declined,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Stack {
    items: Vec<StackItem>,
    state: ResolutionState,
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: StackItem) {
        self.items.push(item);
        if self.state == ResolutionState::Empty {
            self.state = ResolutionState::PendingResolution;
        }
    }

    /// Push a batch so that its first item ends up on top
    pub fn push_batch(&mut self, batch: Vec<StackItem>) {
        for item in batch.into_iter().rev() {
            self.push(item);
        }
    }

    pub fn top(&self) -> Option<&StackItem> {
        self.items.last()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn state(&self) -> ResolutionState {
        self.state
    }

    /// Items from top to bottom
    pub fn iter(&self) -> impl Iterator<Item = &StackItem> {
        self.items.iter().rev()
    }

    fn begin_resolution(&mut self) -> Result<Option<StackItem>> {
        if self.state == ResolutionState::Resolving {
            return Err(SimError::Invariant(
                "stack resolution started while another object is resolving".to_string(),
            ));
        }
        let item = self.items.pop();
        if item.is_some() {
            self.state = ResolutionState::Resolving;
        }
        Ok(item)
    }

    fn finish_resolution(&mut self) {
        self.state = if self.items.is_empty() {
            ResolutionState::Empty
        } else {
            ResolutionState::PendingResolution
        };
    }

    /// Remove everything a player controls (the player left the game)
    pub fn remove_controlled_by(&mut self, player: PlayerId) -> Vec<StackItem> {
        let (removed, kept) = std::mem::take(&mut self.items)
            .into_iter()
            .partition(|item| item.controller == player);
        self.items = kept;
        if self.state != ResolutionState::Resolving {
            self.finish_resolution();
        }
        removed
    }
}

/// Resolve the top object of the stack
///
/// Returns `None` when the stack was empty.
pub fn resolve_top(
    game: &mut GameState,
    controllers: &mut [Box<dyn PlayerController>],
) -> Result<Option<ResolutionOutcome>> {
    let Some(item) = game.stack.begin_resolution()? else {
        return Ok(None);
    };

    let outcome = match item.kind {
        StackObjectKind::Spell { card } => resolve_spell(game, &item, card),
        StackObjectKind::Ability {
            source,
            ability_index,
            triggering_object,
            triggering_player,
            event,
        } => {
            let ctx = EffectContext {
                source: Some(source),
                controller: item.controller,
                targets: SmallVec::new(),
                triggering_object,
                triggering_player,
            };
            resolve_ability(game, controllers, &item, ability_index, event, ctx)
        }
    };
    game.stack.finish_resolution();
    let outcome = outcome?;

    match outcome {
        ResolutionOutcome::Resolved => {
            log_if_verbose!(game.logger, "{} resolves", game.describe_card(item.source()));
        }
        ResolutionOutcome::Fizzled => game
            .logger
            .normal(&format!("{} fizzles", game.describe_card(item.source()))),
        ResolutionOutcome::Declined => game.logger.normal(&format!(
            "{} declines to use {}",
            game.player_name(item.controller),
            game.describe_card(item.source())
        )),
    }
    Ok(Some(outcome))
}

/// Targets that survive re-validation, or `None` if the object fizzles
fn revalidate_targets(
    game: &GameState,
    spec: Option<&TargetSpec>,
    ctx: &FilterContext,
    chosen: &[Target],
) -> Option<SmallVec<[Target; 2]>> {
    let Some(spec) = spec else {
        return Some(SmallVec::new());
    };
    let legal = still_legal(game, spec, ctx, chosen);
    if spec.min_required() > 0 && legal.is_empty() {
        None
    } else {
        Some(legal)
    }
}

fn resolve_spell(game: &mut GameState, item: &StackItem, card: CardId) -> Result<ResolutionOutcome> {
    let definition = Arc::clone(&game.cards.get(card)?.definition);

    if definition.is_permanent_card() {
        game.move_card_with_controller(card, Zone::Battlefield, Some(item.controller))?;
        return Ok(ResolutionOutcome::Resolved);
    }

    let Some(spell) = definition.spell.as_ref() else {
        game.move_card(card, Zone::Graveyard)?;
        return Ok(ResolutionOutcome::Resolved);
    };

    let filter_ctx = FilterContext::new(Some(card), item.controller);
    let Some(targets) = revalidate_targets(game, spell.target.as_ref(), &filter_ctx, &item.targets) else {
        game.move_card(card, Zone::Graveyard)?;
        return Ok(ResolutionOutcome::Fizzled);
    };

    let ctx = EffectContext::new(Some(card), item.controller).with_targets(targets);
    for effect in &spell.effects {
        effect.apply(game, &ctx)?;
    }
    game.move_card(card, Zone::Graveyard)?;
    Ok(ResolutionOutcome::Resolved)
}

fn resolve_ability(
    game: &mut GameState,
    controllers: &mut [Box<dyn PlayerController>],
    item: &StackItem,
    ability_index: usize,
    event: Option<TriggerEvent>,
    mut ctx: EffectContext,
) -> Result<ResolutionOutcome> {
    let source = item.source();
    let definition = Arc::clone(&game.cards.get(source)?.definition);
    let filter_ctx = FilterContext::new(Some(source), item.controller);

    let (effects, target_spec, optional, description) = match definition.abilities.get(ability_index) {
        Some(Ability::Triggered(trigger)) => {
            if let (TriggerSubject::Object(filter), Some(event), Some(object)) =
                (&trigger.subject, event, ctx.triggering_object)
            {
                if event.object_stays_on_battlefield() && !filter.matches_permanent(game, object, &filter_ctx) {
                    return Ok(ResolutionOutcome::Fizzled);
                }
            }
            (
                &trigger.effects,
                trigger.target.as_ref(),
                trigger.optional,
                trigger.description.as_str(),
            )
        }
        Some(Ability::Activated(activated)) => (
            &activated.effects,
            activated.target.as_ref(),
            false,
            activated.description.as_str(),
        ),
        _ => {
            return Err(SimError::Invariant(format!(
                "stack item refers to missing ability {ability_index} of {}",
                definition.name
            )))
        }
    };

    let Some(targets) = revalidate_targets(game, target_spec, &filter_ctx, &item.targets) else {
        return Ok(ResolutionOutcome::Fizzled);
    };

    if optional {
        let choice = OptionalChoice {
            source: Some(source),
            description,
        };
        let view = GameStateView::new(game, item.controller);
        let use_it = controller_for(controllers, item.controller)?.choose_to_use_optional(&view, &choice);
        if !use_it {
            return Ok(ResolutionOutcome::Declined);
        }
    }

    ctx.targets = targets;
    for effect in effects {
        effect.apply(game, &ctx)?;
    }
    Ok(ResolutionOutcome::Resolved)
}
