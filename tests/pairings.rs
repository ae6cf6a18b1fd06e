//! Pod wiring properties: C(N,2) pairs, two directed bindings per pair

use mtg_sim::game::{GameState, Seat};
use mtg_sim::matches::{binomial, combinations, unordered_pairs, wire_pod, MatchOptions};
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;

fn pod(n: usize) -> (GameState, Vec<Seat>) {
    let mut state = GameState::new();
    let seats = (0..n)
        .map(|i| Seat::new(state.add_player(format!("Player {}", i + 1), 40), None))
        .collect();
    (state, seats)
}

proptest! {
    #[test]
    fn prop_combinations_are_distinct_sorted_subsets(n in 0usize..9, k in 0usize..5) {
        let input: Vec<usize> = (0..n).collect();
        let combos = combinations(&input, k);
        prop_assert_eq!(combos.len(), binomial(n, k));

        let distinct: HashSet<Vec<usize>> = combos.iter().cloned().collect();
        prop_assert_eq!(distinct.len(), combos.len());
        for combo in &combos {
            prop_assert_eq!(combo.len(), k);
            prop_assert!(combo.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn prop_pod_wiring_binds_every_pair_both_ways(n in 2usize..=10) {
        let (state, mut seats) = pod(n);
        let options = Arc::new(MatchOptions::commander(n));
        let bindings = wire_pod(&state, &mut seats, &options).unwrap();

        prop_assert_eq!(bindings, n * (n - 1));
        prop_assert_eq!(unordered_pairs(&seats).len(), binomial(n, 2));

        let mut directed = HashSet::new();
        for seat in &seats {
            prop_assert_eq!(seat.bindings.len(), n - 1);
            for binding in &seat.bindings {
                prop_assert_eq!(binding.player, seat.player_id);
                prop_assert_ne!(binding.opponent, seat.player_id);
                prop_assert!(binding.same_match(&seat.bindings[0]));
                prop_assert!(directed.insert((binding.player, binding.opponent)));
            }
        }
        for &(a, b) in &directed {
            prop_assert!(directed.contains(&(b, a)));
        }
    }

    #[test]
    fn prop_rewiring_is_idempotent(n in 2usize..=6) {
        let (state, mut seats) = pod(n);
        let options = Arc::new(MatchOptions::commander(n));
        wire_pod(&state, &mut seats, &options).unwrap();
        let first = unordered_pairs(&seats);
        wire_pod(&state, &mut seats, &options).unwrap();
        prop_assert_eq!(unordered_pairs(&seats), first);
        prop_assert!(seats.iter().all(|s| s.bindings.len() == n - 1));
    }
}
