//! Trigger collection, stack ordering and resolution-time re-checks
//!
//! These drive the engine pieces directly (no game loop) so each step of
//! "event -> trigger -> stack -> resolve" can be inspected.

use mtg_sim::core::{
    Ability, CardDefinition, CardType, Effect, EffectTarget, Filter, Predicate, Target, TargetKind,
    TargetSpec, TriggerEvent, TriggerSubject, TriggeredAbility,
};
use mtg_sim::game::stack::resolve_top;
use mtg_sim::game::triggers::put_triggers_on_stack;
use mtg_sim::game::{
    GameState, OutputMode, PlayerController, ResolutionOutcome, StackItem, StackObjectKind, TriggerEngine,
    ZeroController,
};
use mtg_sim::registry::CardRegistry;
use mtg_sim::zones::Zone;
use std::sync::Arc;

fn two_players() -> (GameState, Vec<Box<dyn PlayerController>>) {
    let mut game = GameState::new();
    game.logger.set_output_mode(OutputMode::Memory);
    let p1 = game.add_player("Player 1", 20);
    let p2 = game.add_player("Player 2", 20);
    game.turn.active_player = p1;
    let controllers: Vec<Box<dyn PlayerController>> =
        vec![Box::new(ZeroController::new(p1)), Box::new(ZeroController::new(p2))];
    (game, controllers)
}

/// "When this enters, you may tap another target permanent"
fn lone_watcher() -> Arc<CardDefinition> {
    Arc::new(
        CardDefinition::new("Lone Watcher", &[CardType::Creature])
            .with_pt(1, 1)
            .with_ability(Ability::Triggered(TriggeredAbility {
                event: TriggerEvent::EntersBattlefield,
                subject: TriggerSubject::This,
                effects: vec![Effect::Tap {
                    target: EffectTarget::Targets,
                }],
                target: Some(TargetSpec::exactly_one(TargetKind::Permanent(
                    Filter::permanent().with(Predicate::Another),
                ))),
                optional: true,
                description: "you may tap another target permanent".to_string(),
            })),
    )
}

#[test]
fn test_may_trigger_with_no_target_changes_nothing() {
    let (mut game, mut controllers) = two_players();
    let p1 = game.players[0].id;
    let watcher = game.create_card(lone_watcher(), p1, Zone::Hand).unwrap();

    game.move_card(watcher, Zone::Battlefield).unwrap();
    let pending = TriggerEngine::collect(&mut game);
    assert_eq!(pending.len(), 1, "the trigger still fires");

    let pushed = put_triggers_on_stack(&mut game, &mut controllers, pending).unwrap();
    assert_eq!(pushed, 1);
    assert!(game.stack.top().unwrap().targets.is_empty());

    let outcome = resolve_top(&mut game, &mut controllers).unwrap();
    assert_eq!(outcome, Some(ResolutionOutcome::Fizzled));
    assert!(game.stack.is_empty());
    assert!(!game.permanent(watcher).unwrap().tapped);
    assert_eq!(game.battlefield.cards.len(), 1);
}

#[test]
fn test_lumengrid_sentinel_taps_on_artifact() {
    let registry = CardRegistry::builtin();
    let (mut game, mut controllers) = two_players();
    let p1 = game.players[0].id;
    let p2 = game.players[1].id;
    let sentinel = game
        .create_card(registry.get("Lumengrid Sentinel").unwrap(), p1, Zone::Battlefield)
        .unwrap();
    let bears = game
        .create_card(registry.get("Grizzly Bears").unwrap(), p2, Zone::Battlefield)
        .unwrap();
    game.pending_events.clear();

    let thopter = game
        .create_card(registry.get("Ornithopter").unwrap(), p1, Zone::Hand)
        .unwrap();
    game.move_card(thopter, Zone::Battlefield).unwrap();

    let pending = TriggerEngine::collect(&mut game);
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].source, sentinel);
    assert_eq!(pending[0].triggering_object, Some(thopter));

    put_triggers_on_stack(&mut game, &mut controllers, pending).unwrap();
    let outcome = resolve_top(&mut game, &mut controllers).unwrap();
    assert_eq!(outcome, Some(ResolutionOutcome::Resolved));

    let tapped = [sentinel, bears, thopter]
        .into_iter()
        .filter(|&c| game.permanent(c).unwrap().tapped)
        .count();
    assert_eq!(tapped, 1);
}

#[test]
fn test_opponent_artifact_does_not_trigger_sentinel() {
    let registry = CardRegistry::builtin();
    let (mut game, _) = two_players();
    let p1 = game.players[0].id;
    let p2 = game.players[1].id;
    game.create_card(registry.get("Lumengrid Sentinel").unwrap(), p1, Zone::Battlefield)
        .unwrap();
    game.pending_events.clear();

    let thopter = game
        .create_card(registry.get("Ornithopter").unwrap(), p2, Zone::Hand)
        .unwrap();
    game.move_card(thopter, Zone::Battlefield).unwrap();
    assert!(TriggerEngine::collect(&mut game).is_empty());
}

#[test]
fn test_filter_rechecked_at_resolution() {
    let registry = CardRegistry::builtin();
    let (mut game, mut controllers) = two_players();
    let p1 = game.players[0].id;
    let p2 = game.players[1].id;
    let sentinel = game
        .create_card(registry.get("Lumengrid Sentinel").unwrap(), p1, Zone::Battlefield)
        .unwrap();
    game.pending_events.clear();

    let thopter = game
        .create_card(registry.get("Ornithopter").unwrap(), p1, Zone::Hand)
        .unwrap();
    game.move_card(thopter, Zone::Battlefield).unwrap();
    let pending = TriggerEngine::collect(&mut game);
    put_triggers_on_stack(&mut game, &mut controllers, pending).unwrap();

    // The artifact changes hands while the trigger waits on the stack
    game.permanent_mut(thopter).unwrap().controller = p2;

    let outcome = resolve_top(&mut game, &mut controllers).unwrap();
    assert_eq!(outcome, Some(ResolutionOutcome::Fizzled));
    assert!(!game.permanent(sentinel).unwrap().tapped);
    assert!(!game.permanent(thopter).unwrap().tapped);
}

#[test]
fn test_batch_resolves_active_player_first() {
    let registry = CardRegistry::builtin();
    let (mut game, mut controllers) = two_players();
    let p1 = game.players[0].id;
    let p2 = game.players[1].id;
    let warden = registry.get("Soul Warden").unwrap();
    game.create_card(Arc::clone(&warden), p2, Zone::Battlefield).unwrap();
    game.create_card(warden, p1, Zone::Battlefield).unwrap();
    game.pending_events.clear();

    let bears = game
        .create_card(registry.get("Grizzly Bears").unwrap(), p2, Zone::Hand)
        .unwrap();
    game.move_card(bears, Zone::Battlefield).unwrap();

    let pending = TriggerEngine::collect(&mut game);
    assert_eq!(pending.len(), 2);
    put_triggers_on_stack(&mut game, &mut controllers, pending).unwrap();

    // Active player's trigger is on top and resolves first
    assert_eq!(game.stack.top().unwrap().controller, p1);
    resolve_top(&mut game, &mut controllers).unwrap();
    assert_eq!(game.get_player(p1).unwrap().life, 21);
    assert_eq!(game.get_player(p2).unwrap().life, 20);

    resolve_top(&mut game, &mut controllers).unwrap();
    assert_eq!(game.get_player(p2).unwrap().life, 21);
    assert!(game.stack.is_empty());
}

/// "When this enters, tap up to two target permanents"
fn twin_watcher() -> Arc<CardDefinition> {
    Arc::new(
        CardDefinition::new("Twin Watcher", &[CardType::Creature])
            .with_pt(1, 1)
            .with_ability(Ability::Triggered(TriggeredAbility {
                event: TriggerEvent::EntersBattlefield,
                subject: TriggerSubject::This,
                effects: vec![Effect::Tap {
                    target: EffectTarget::Targets,
                }],
                target: Some(TargetSpec::up_to(TargetKind::Permanent(Filter::permanent()), 2)),
                optional: false,
                description: "tap up to two target permanents".to_string(),
            })),
    )
}

#[test]
fn test_illegal_target_skips_only_that_target() {
    let (mut game, mut controllers) = two_players();
    let p1 = game.players[0].id;
    let p2 = game.players[1].id;
    let bears = Arc::new(CardDefinition::new("Grizzly Bears", &[CardType::Creature]).with_pt(2, 2));
    let watcher = game.create_card(twin_watcher(), p1, Zone::Battlefield).unwrap();
    let first = game.create_card(bears.clone(), p2, Zone::Battlefield).unwrap();
    let second = game.create_card(bears, p2, Zone::Battlefield).unwrap();

    game.stack.push(StackItem {
        controller: p1,
        kind: StackObjectKind::Ability {
            source: watcher,
            ability_index: 0,
            triggering_object: Some(watcher),
            triggering_player: Some(p1),
            event: Some(TriggerEvent::EntersBattlefield),
        },
        targets: [Target::Permanent(first), Target::Permanent(second)].into_iter().collect(),
    });

    game.move_card(first, Zone::Graveyard).unwrap();
    let outcome = resolve_top(&mut game, &mut controllers).unwrap();

    assert_eq!(outcome, Some(ResolutionOutcome::Resolved));
    assert!(game.permanent(second).unwrap().tapped);
    assert_eq!(game.cards.get(first).unwrap().zone, Zone::Graveyard);
    assert!(!game.permanent(watcher).unwrap().tapped);
    assert!(game.stack.is_empty());
}
