//! Stopping early never changes the verdict

mod common;

use mtg_sim::registry::ControllerKind;
use mtg_sim::simulation::{fold_outcomes, EarlyExit, Outcome, SimulationHarness, Tally, Verdict};
use proptest::prelude::*;

fn outcome_strategy() -> impl Strategy<Value = Outcome> {
    prop_oneof![Just(Outcome::Win), Just(Outcome::Loss), Just(Outcome::Draw)]
}

type Step = Result<Outcome, String>;

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        4 => outcome_strategy().prop_map(Ok),
        1 => Just(Err("turn ceiling reached".to_string())),
    ]
}

/// Verdict and outcomes consumed under `policy`
fn run_with_policy(outcomes: &[Outcome], policy: EarlyExit) -> (Verdict, usize) {
    let (tally, verdict, _) = fold_outcomes(
        outcomes.iter().map(|&o| Ok::<_, String>(o)),
        outcomes.len(),
        policy,
    );
    (verdict, tally.iterations() as usize)
}

#[test]
fn test_majority_of_wins_stops_early() {
    let outcomes = [Outcome::Win; 10];
    let (verdict, consumed) = run_with_policy(&outcomes, EarlyExit::WinsOnly);
    assert_eq!(verdict, Verdict::Player1Wins);
    assert_eq!(consumed, 6);
}

#[test]
fn test_losses_only_stop_early_when_asked() {
    let outcomes = [Outcome::Loss; 10];
    assert_eq!(run_with_policy(&outcomes, EarlyExit::WinsOnly), (Verdict::Player1Loses, 10));
    assert_eq!(run_with_policy(&outcomes, EarlyExit::AnyOutcome), (Verdict::Player1Loses, 6));
}

#[test]
fn test_tie_is_undecided() {
    let outcomes = [Outcome::Win, Outcome::Loss, Outcome::Draw, Outcome::Draw, Outcome::Win];
    assert_eq!(run_with_policy(&outcomes, EarlyExit::AnyOutcome).0, Verdict::Undecided);
}

#[test]
fn test_harness_verdict_does_not_depend_on_policy() {
    let template = common::duel_template(ControllerKind::Heuristic);
    let first = template.state().players[0].id;

    let full = SimulationHarness::new(5)
        .with_seed(11)
        .with_early_exit(EarlyExit::Never)
        .run(&template, first)
        .unwrap();
    let early = SimulationHarness::new(5)
        .with_seed(11)
        .with_early_exit(EarlyExit::AnyOutcome)
        .run(&template, first)
        .unwrap();

    assert_eq!(full.iterations.len(), 5);
    assert!(early.iterations.len() <= 5);
    assert_eq!(full.verdict, early.verdict);
    for (a, b) in full.iterations.iter().zip(&early.iterations) {
        assert_eq!(a.seed, b.seed);
        assert_eq!(a.outcome, b.outcome);
    }
}

proptest! {
    #[test]
    fn prop_early_verdict_matches_full_tally(
        steps in prop::collection::vec(step_strategy(), 1..40),
        any_outcome in any::<bool>(),
    ) {
        let policy = if any_outcome { EarlyExit::AnyOutcome } else { EarlyExit::WinsOnly };
        let total = steps.len();
        let (full_tally, full, full_stop) = fold_outcomes(steps.clone(), total, EarlyExit::Never);
        let (tally, early, stopped) = fold_outcomes(steps.clone(), total, policy);

        prop_assert_eq!(full_tally.iterations() as usize, total);
        prop_assert_eq!(full_stop, None);
        prop_assert!(tally.iterations() as usize <= total);
        prop_assert_eq!(stopped.is_some(), (tally.iterations() as usize) < total);
        if let Some(done) = stopped {
            prop_assert_eq!(done, tally.iterations() as usize);
        }
        prop_assert_eq!(early, full);

        let failures = steps.iter().filter(|s| s.is_err()).count() as u32;
        prop_assert_eq!(full_tally.failures, failures);
    }

    #[test]
    fn prop_decided_outcome_is_the_current_leader(
        wins in 0u32..30, losses in 0u32..30, draws in 0u32..30, remaining in 0u32..30,
    ) {
        let tally = Tally { wins, losses, draws, failures: 0 };
        if let Some(outcome) = tally.decided(remaining, EarlyExit::AnyOutcome) {
            prop_assert_eq!(tally.leader(), Some(outcome));
        }
    }
}
