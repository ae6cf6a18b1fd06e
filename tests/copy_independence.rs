//! A copied game shares no mutable state with the game it came from

mod common;

use mtg_sim::game::{Game, GameStatus};
use mtg_sim::registry::ControllerKind;
use mtg_sim::zones::Zone;
use proptest::prelude::*;

/// Everything about the players' starting position that a run could disturb
fn snapshot(game: &Game) -> Vec<(i32, Vec<u32>, usize, usize)> {
    let state = game.state();
    state
        .players
        .iter()
        .map(|p| {
            (
                p.life,
                state.library(p.id).iter().map(|c| c.as_u32()).collect(),
                state.hand(p.id).len(),
                state.permanents_controlled_by(p.id).count(),
            )
        })
        .collect()
}

fn first_player(game: &Game) -> mtg_sim::core::PlayerId {
    game.state().players[0].id
}

#[test]
fn test_running_a_copy_leaves_the_original_untouched() {
    let template = common::duel_template(ControllerKind::Heuristic);
    let before = snapshot(&template);

    let mut copy = template.copy();
    copy.reseed(7);
    copy.start(first_player(&copy)).unwrap();

    assert_eq!(copy.status(), GameStatus::Finished);
    assert_eq!(template.status(), GameStatus::NotStarted);
    assert_eq!(snapshot(&template), before);
    assert!(template.state().battlefield.cards.is_empty());
    assert!(template.state().stack.is_empty());
    assert!(template.state().logger.logs().is_empty());
}

#[test]
fn test_commander_copy_keeps_commanders_in_command_zone() {
    let template = common::commander_template(4);
    let mut copy = template.copy();
    copy.reseed(3);
    let starting = copy.choose_random_starting_player().unwrap();
    copy.start(starting).unwrap();

    for player in &template.state().players {
        let zones = template.state().get_player_zones(player.id).unwrap();
        assert_eq!(zones.command.cards.len(), 1);
        let commander = zones.command.cards[0];
        assert_eq!(template.state().cards.get(commander).unwrap().zone, Zone::Command);
    }
}

#[test]
fn test_original_cannot_be_started_twice() {
    let mut game = common::duel_template(ControllerKind::Zero);
    let first = first_player(&game);
    game.start(first).unwrap();
    assert!(matches!(game.start(first), Err(mtg_sim::SimError::AlreadyStarted)));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn prop_copies_are_independent_and_reproducible(seed in any::<u64>()) {
        let template = common::duel_template(ControllerKind::Random);
        let before = snapshot(&template);

        let mut a = template.copy();
        let mut b = template.copy();
        a.reseed(seed);
        b.reseed(seed);
        let first = first_player(&template);
        let result_a = a.start(first).unwrap().clone();
        let result_b = b.start(first).unwrap().clone();

        prop_assert_eq!(result_a, result_b);
        prop_assert_eq!(snapshot(&a), snapshot(&b));
        prop_assert_eq!(snapshot(&template), before);
        prop_assert_eq!(template.status(), GameStatus::NotStarted);
    }
}
