//! Performance benchmarks for the simulator
//!
//! Measures the two costs the simulation harness pays per iteration:
//!
//! 1. **copy** - deep copy of a wired, not-yet-started game
//! 2. **full game** - copy, reseed and play to completion
//!
//! Both use Green Stompy against Red Burn with heuristic players. A third
//! group runs a short parallel simulation to compare against sequential.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mtg_sim::{
    game::{Game, GameLogger, VerbosityLevel},
    loader::DeckLoader,
    matches::{Match, MatchOptions},
    registry::{CardRegistry, ControllerKind},
    simulation::{EarlyExit, SimulationHarness},
    Result,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Build the wired template game once
fn load_template() -> Result<Game> {
    let registry = CardRegistry::builtin();
    let mut game_match = Match::new(MatchOptions::duel())?;
    for (name, path) in [
        ("Player 1", "test_decks/green_stompy.dck"),
        ("Player 2", "test_decks/red_burn.dck"),
    ] {
        let deck = DeckLoader::load_from_file(Path::new(path))?.resolve(&registry)?;
        game_match.add_player(name, Arc::new(deck), ControllerKind::Heuristic)?;
    }
    let mut game = game_match.create_game(false)?;
    game.state_mut().logger.set_verbosity(VerbosityLevel::Silent);
    Ok(game)
}

fn bench_copy(c: &mut Criterion) {
    let template = match load_template() {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Skipping benchmark - failed to load decks: {e}");
            return;
        }
    };

    c.bench_function("game_copy", |b| b.iter(|| black_box(template.copy())));
}

fn bench_full_game(c: &mut Criterion) {
    let template = match load_template() {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Skipping benchmark - failed to load decks: {e}");
            return;
        }
    };
    let first = template.state().players[0].id;

    let mut group = c.benchmark_group("game_execution");
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(20));

    for seed in [42u64, 12345] {
        group.bench_with_input(BenchmarkId::new("copy_and_play", seed), &seed, |b, &seed| {
            b.iter(|| {
                let mut game = template.copy();
                game.reseed(black_box(seed));
                game.start(first)
                    .map(|r| r.turns_played)
                    .expect("Game should complete successfully")
            });
        });
    }
    group.finish();
}

fn bench_harness(c: &mut Criterion) {
    let template = match load_template() {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Skipping benchmark - failed to load decks: {e}");
            return;
        }
    };
    let first = template.state().players[0].id;
    let quiet = GameLogger::with_verbosity(VerbosityLevel::Silent);

    let mut group = c.benchmark_group("harness");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(30));

    let harness = SimulationHarness::new(16)
        .with_seed(7)
        .with_early_exit(EarlyExit::Never)
        .with_logger(quiet);
    group.bench_function("sequential_16", |b| {
        b.iter(|| harness.run(&template, first).expect("Simulation should succeed"))
    });
    group.bench_function("parallel_16", |b| {
        b.iter(|| harness.run_parallel(&template, first).expect("Simulation should succeed"))
    });
    group.finish();
}

criterion_group!(benches, bench_copy, bench_full_game, bench_harness);
criterion_main!(benches);
