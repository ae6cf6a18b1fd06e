//! Pod wiring: who faces whom
//!
//! A duel binds its two players directly. A free-for-all pod enumerates
//! every unordered pair of seats with [`combinations`] and gives each pair
//! two directed bindings, so with N players every seat ends up holding
//! N-1 bindings and the pod holds N*(N-1) in total.

use crate::core::PlayerId;
use crate::game::{GameState, Seat};
use crate::matches::combinations::combinations;
use crate::matches::{MatchOptions, MatchPlayer};
use crate::{Result, SimError};
use std::sync::Arc;

fn binding(state: &GameState, seats: &[Seat], from: usize, to: usize, options: &Arc<MatchOptions>) -> Result<MatchPlayer> {
    let opponent = &seats[to];
    let name = state.get_player(opponent.player_id)?.name.clone();
    Ok(MatchPlayer::new(
        seats[from].player_id,
        opponent.player_id,
        name,
        opponent.deck.clone(),
        Arc::clone(options),
    ))
}

fn bind_pair(state: &GameState, seats: &mut [Seat], i: usize, j: usize, options: &Arc<MatchOptions>) -> Result<()> {
    let i_sees_j = binding(state, seats, i, j, options)?;
    let j_sees_i = binding(state, seats, j, i, options)?;
    seats[i].bindings.push(i_sees_j);
    seats[j].bindings.push(j_sees_i);
    Ok(())
}

/// Bind the two players of a duel to each other
pub fn wire_duel(state: &GameState, seats: &mut [Seat], options: &Arc<MatchOptions>) -> Result<usize> {
    if seats.len() != 2 {
        return Err(SimError::Config(format!(
            "a duel needs exactly 2 players, got {}",
            seats.len()
        )));
    }
    bind_pair(state, seats, 0, 1, options)?;
    Ok(2)
}

/// Bind every pair of seats in both directions; returns the number of bindings made
pub fn wire_free_for_all(state: &GameState, seats: &mut [Seat], options: &Arc<MatchOptions>) -> Result<usize> {
    if seats.len() < 2 {
        return Err(SimError::Config(format!(
            "a free-for-all needs at least 2 players, got {}",
            seats.len()
        )));
    }
    let indexes: Vec<usize> = (0..seats.len()).collect();
    let pairs = combinations(&indexes, 2);
    for pair in &pairs {
        bind_pair(state, seats, pair[0], pair[1], options)?;
    }
    state.logger.verbose(&format!(
        "Wired {} pairings among {} players",
        pairs.len(),
        seats.len()
    ));
    Ok(pairs.len() * 2)
}

/// Wire seats the way the match format requires
pub fn wire_pod(state: &GameState, seats: &mut [Seat], options: &Arc<MatchOptions>) -> Result<usize> {
    for seat in seats.iter_mut() {
        seat.bindings.clear();
    }
    if options.multiplayer {
        wire_free_for_all(state, seats, options)
    } else {
        wire_duel(state, seats, options)
    }
}

/// Every distinct unordered opponent pair present in the bindings
pub fn unordered_pairs(seats: &[Seat]) -> Vec<(PlayerId, PlayerId)> {
    let mut pairs: Vec<(PlayerId, PlayerId)> = seats
        .iter()
        .flat_map(|s| s.bindings.iter())
        .map(|b| (b.player.min(b.opponent), b.player.max(b.opponent)))
        .collect();
    pairs.sort();
    pairs.dedup();
    pairs
}
