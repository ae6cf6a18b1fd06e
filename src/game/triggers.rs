//! Trigger engine
//!
//! Events recorded since the last check are matched against the triggered
//! abilities of every permanent on the battlefield. A triggered ability whose
//! subject is its own source also sees events about that source after it
//! left the battlefield ("when this dies"), using the controller it had.
//!
//! Everything collected in one check forms one batch. The batch is ordered
//! by controller (active player first, then turn order), then by event,
//! then by the source's position on the battlefield, then by the ability's
//! declaration order on the card, and goes on the stack so that the first
//! trigger of the batch is on top.

use crate::core::{CardId, FilterContext, PlayerId, TriggerEvent, TriggerSubject, TriggeredAbility};
use crate::game::controller::PlayerController;
use crate::game::events::GameEvent;
use crate::game::stack::{StackItem, StackObjectKind};
use crate::game::targeting::choose_targets;
use crate::game::GameState;
use crate::zones::Zone;
use crate::Result;
use smallvec::SmallVec;
use std::sync::Arc;

/// A triggered ability waiting to be put on the stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTrigger {
    pub source: CardId,
    pub controller: PlayerId,
    pub ability_index: usize,
    pub event: TriggerEvent,
    pub triggering_object: Option<CardId>,
    pub triggering_player: Option<PlayerId>,
    event_index: usize,
    source_position: usize,
}

pub struct TriggerEngine;

impl TriggerEngine {
    /// Drain the pending events and return every ability they trigger, in stack order
    pub fn collect(game: &mut GameState) -> Vec<PendingTrigger> {
        let events = std::mem::take(&mut game.pending_events);
        let mut pending = Vec::new();

        for (event_index, event) in events.iter().enumerate() {
            let object = event.object();
            let was_creature = object
                .and_then(|o| game.cards.get(o).ok())
                .is_some_and(|c| c.is_creature());
            let kinds = event.trigger_kinds(was_creature);
            if kinds.is_empty() {
                continue;
            }

            let mut sources: SmallVec<[(CardId, PlayerId, usize, bool); 16]> = game
                .battlefield
                .cards
                .iter()
                .enumerate()
                .filter_map(|(pos, id)| {
                    game.cards
                        .get(*id)
                        .ok()
                        .map(|card| (*id, card.controller(), pos, false))
                })
                .collect();
            if let Some(obj) = object {
                if !game.battlefield.contains(obj) && game.cards.get(obj).is_ok_and(|c| c.zone != Zone::Stack) {
                    sources.push((obj, event.player(), usize::MAX, true));
                }
            }

            for (source, controller, source_position, last_known) in sources {
                if !game.is_alive(controller) {
                    continue;
                }
                let Ok(card) = game.cards.get(source) else { continue };
                let definition = Arc::clone(&card.definition);
                for (ability_index, ability) in definition.abilities.iter().enumerate() {
                    let Some(trigger) = ability.as_triggered() else { continue };
                    if !kinds.contains(&trigger.event) {
                        continue;
                    }
                    if last_known && trigger.subject != TriggerSubject::This {
                        continue;
                    }
                    if !Self::subject_matches(game, trigger, source, controller, event) {
                        continue;
                    }
                    pending.push(PendingTrigger {
                        source,
                        controller,
                        ability_index,
                        event: trigger.event,
                        triggering_object: object,
                        triggering_player: Some(event.player()),
                        event_index,
                        source_position,
                    });
                }
            }
        }

        pending.sort_by_key(|t| {
            (
                game.apnap_distance(t.controller),
                t.event_index,
                t.source_position,
                t.ability_index,
            )
        });
        pending
    }

    fn subject_matches(
        game: &GameState,
        trigger: &TriggeredAbility,
        source: CardId,
        controller: PlayerId,
        event: &GameEvent,
    ) -> bool {
        match &trigger.subject {
            TriggerSubject::This => event.object() == Some(source),
            TriggerSubject::Object(filter) => match event.object() {
                Some(object) => {
                    let ctx = FilterContext::new(Some(source), controller);
                    filter.matches(game, object, event.player(), &ctx)
                }
                None => false,
            },
            TriggerSubject::Player(who) => who.matches(event.player(), controller),
        }
    }
}

/// Choose targets for a batch of triggers and put it on the stack
///
/// A trigger with no legal target still goes on the stack with no targets;
/// it fizzles when it resolves.
pub fn put_triggers_on_stack(
    game: &mut GameState,
    controllers: &mut [Box<dyn PlayerController>],
    pending: Vec<PendingTrigger>,
) -> Result<usize> {
    let mut batch = Vec::with_capacity(pending.len());
    for trigger in pending {
        let definition = Arc::clone(&game.cards.get(trigger.source)?.definition);
        let Some(ability) = definition
            .abilities
            .get(trigger.ability_index)
            .and_then(|a| a.as_triggered())
        else {
            continue;
        };

        game.logger.normal(&format!(
            "{} triggers: {}",
            game.describe_card(trigger.source),
            ability.description
        ));

        let targets = match &ability.target {
            Some(spec) => {
                let harmful = ability.effects.iter().any(|e| e.is_harmful());
                choose_targets(
                    game,
                    controllers,
                    trigger.controller,
                    Some(trigger.source),
                    spec,
                    harmful,
                    &ability.description,
                )?
            }
            None => SmallVec::new(),
        };

        batch.push(StackItem {
            controller: trigger.controller,
            kind: StackObjectKind::Ability {
                source: trigger.source,
                ability_index: trigger.ability_index,
                triggering_object: trigger.triggering_object,
                triggering_player: trigger.triggering_player,
                event: Some(trigger.event),
            },
            targets,
        });
    }

    let count = batch.len();
    game.stack.push_batch(batch);
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        Ability, CardDefinition, CardType, Effect, EffectTarget, Filter, Predicate, TargetController,
    };

    fn warden() -> Arc<CardDefinition> {
        Arc::new(
            CardDefinition::new("Soul Warden", &[CardType::Creature])
                .with_pt(1, 1)
                .with_ability(Ability::Triggered(TriggeredAbility {
                    event: TriggerEvent::EntersBattlefield,
                    subject: TriggerSubject::Object(Filter::creature().with(Predicate::Another)),
                    effects: vec![Effect::GainLife {
                        target: EffectTarget::Controller,
                        amount: 1,
                    }],
                    target: None,
                    optional: false,
                    description: "you gain 1 life".to_string(),
                })),
        )
    }

    fn bears() -> Arc<CardDefinition> {
        Arc::new(CardDefinition::new("Grizzly Bears", &[CardType::Creature]).with_pt(2, 2))
    }

    #[test]
    fn test_one_trigger_per_watcher_active_player_first() {
        let mut game = GameState::new();
        let p1 = game.add_player("Player 1", 20);
        let p2 = game.add_player("Player 2", 20);
        let theirs = game.create_card(warden(), p2, Zone::Battlefield).unwrap();
        let mine = game.create_card(warden(), p1, Zone::Battlefield).unwrap();
        let entering = game.create_card(bears(), p2, Zone::Hand).unwrap();

        game.move_card(entering, Zone::Battlefield).unwrap();
        let pending = TriggerEngine::collect(&mut game);

        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].source, mine);
        assert_eq!(pending[1].source, theirs);
        assert!(game.pending_events.is_empty());
    }

    #[test]
    fn test_each_qualifying_event_triggers_separately() {
        let mut game = GameState::new();
        let p1 = game.add_player("Player 1", 20);
        game.create_card(warden(), p1, Zone::Battlefield).unwrap();
        let a = game.create_card(bears(), p1, Zone::Hand).unwrap();
        let b = game.create_card(bears(), p1, Zone::Hand).unwrap();

        game.move_card(a, Zone::Battlefield).unwrap();
        game.move_card(b, Zone::Battlefield).unwrap();
        let pending = TriggerEngine::collect(&mut game);
        let objects: Vec<_> = pending.iter().map(|t| t.triggering_object).collect();
        assert_eq!(objects, vec![Some(a), Some(b)]);
    }

    #[test]
    fn test_dies_trigger_uses_last_known_controller() {
        let mut game = GameState::new();
        let p1 = game.add_player("Player 1", 20);
        let _p2 = game.add_player("Player 2", 20);
        let traveler = Arc::new(
            CardDefinition::new("Doomed Traveler", &[CardType::Creature])
                .with_pt(1, 1)
                .with_ability(Ability::Triggered(TriggeredAbility {
                    event: TriggerEvent::Dies,
                    subject: TriggerSubject::This,
                    effects: vec![Effect::DrawCards {
                        target: EffectTarget::Controller,
                        count: 1,
                    }],
                    target: None,
                    optional: false,
                    description: "draw a card".to_string(),
                })),
        );
        let card = game.create_card(traveler, p1, Zone::Battlefield).unwrap();
        game.move_card(card, Zone::Graveyard).unwrap();

        let pending = TriggerEngine::collect(&mut game);
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].controller, p1);
        assert_eq!(pending[0].event, TriggerEvent::Dies);
    }

    #[test]
    fn test_player_subject_upkeep() {
        let mut game = GameState::new();
        let p1 = game.add_player("Player 1", 20);
        let p2 = game.add_player("Player 2", 20);
        let upkeep = Arc::new(
            CardDefinition::new("Phyrexian Arena", &[CardType::Enchantment]).with_ability(
                Ability::Triggered(TriggeredAbility {
                    event: TriggerEvent::BeginningOfUpkeep,
                    subject: TriggerSubject::Player(TargetController::You),
                    effects: vec![Effect::DrawCards {
                        target: EffectTarget::Controller,
                        count: 1,
                    }],
                    target: None,
                    optional: false,
                    description: "draw a card".to_string(),
                }),
            ),
        );
        game.create_card(upkeep, p1, Zone::Battlefield).unwrap();

        game.pending_events.push(GameEvent::StepBegan {
            step: crate::game::phase::Step::Upkeep,
            active_player: p2,
        });
        assert!(TriggerEngine::collect(&mut game).is_empty());

        game.pending_events.push(GameEvent::StepBegan {
            step: crate::game::phase::Step::Upkeep,
            active_player: p1,
        });
        assert_eq!(TriggerEngine::collect(&mut game).len(), 1);
    }
}
