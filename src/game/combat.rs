//! Combat: declaring attackers and blockers, and combat damage
//!
//! The attack option decides which opponents a player may attack: only the
//! next opponent in turn order (`Left`) or any opponent (`Multiple`).

use crate::core::{CardId, Keyword, PlayerId, Target};
use crate::game::events::GameEvent;
use crate::game::GameState;
use crate::Result;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeMap;

/// Which opponents a player may attack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AttackOption {
    /// Only the next opponent in turn order
    #[default]
    Left,
    /// Any opponent, split freely among attackers
    Multiple,
}

/// How far a player's influence reaches around the table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RangeOfInfluence {
    #[default]
    All,
    /// Players within this many seats
    Limited(u8),
}

/// Combat state for the current combat phase
///
/// Uses BTreeMap for deterministic iteration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CombatState {
    /// Attacker -> defending player
    pub attackers: BTreeMap<CardId, PlayerId>,

    /// Blocker -> the attacker it blocks
    pub blockers: BTreeMap<CardId, CardId>,

    pub combat_active: bool,
}

impl CombatState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare_attacker(&mut self, attacker: CardId, defending_player: PlayerId) {
        self.attackers.insert(attacker, defending_player);
        self.combat_active = true;
    }

    pub fn declare_blocker(&mut self, blocker: CardId, attacker: CardId) {
        self.blockers.insert(blocker, attacker);
    }

    pub fn is_attacking(&self, card_id: CardId) -> bool {
        self.attackers.contains_key(&card_id)
    }

    pub fn is_blocking(&self, card_id: CardId) -> bool {
        self.blockers.contains_key(&card_id)
    }

    /// Blockers of an attacker, in id order
    pub fn get_blockers(&self, attacker: CardId) -> SmallVec<[CardId; 4]> {
        self.blockers
            .iter()
            .filter(|(_, a)| **a == attacker)
            .map(|(b, _)| *b)
            .collect()
    }

    pub fn is_blocked(&self, attacker: CardId) -> bool {
        self.blockers.values().any(|a| *a == attacker)
    }

    pub fn get_defending_player(&self, attacker: CardId) -> Option<PlayerId> {
        self.attackers.get(&attacker).copied()
    }

    /// Attackers aimed at one player
    pub fn attackers_of(&self, defender: PlayerId) -> SmallVec<[CardId; 8]> {
        self.attackers
            .iter()
            .filter(|(_, d)| **d == defender)
            .map(|(a, _)| *a)
            .collect()
    }

    /// A creature left the battlefield
    pub fn remove_creature(&mut self, card: CardId) {
        self.attackers.remove(&card);
        self.blockers.remove(&card);
    }

    /// A defending player left the game; their attackers are removed from combat
    pub fn remove_defender(&mut self, player: PlayerId) {
        self.attackers.retain(|_, defender| *defender != player);
        let attackers = &self.attackers;
        self.blockers.retain(|_, attacker| attackers.contains_key(attacker));
    }

    pub fn clear(&mut self) {
        self.attackers.clear();
        self.blockers.clear();
        self.combat_active = false;
    }
}

/// Opponents `attacker` may attack under the attack option and range of influence
pub fn defenders_for(
    game: &GameState,
    attacker: PlayerId,
    option: AttackOption,
    range: RangeOfInfluence,
) -> SmallVec<[PlayerId; 4]> {
    let order = game.players_in_turn_order(attacker);
    let in_range = |seat_distance: usize| match range {
        RangeOfInfluence::All => true,
        RangeOfInfluence::Limited(r) => {
            let n = order.len();
            seat_distance.min(n - seat_distance) <= r as usize
        }
    };
    let opponents = order
        .iter()
        .enumerate()
        .skip(1)
        .filter(|(distance, _)| in_range(*distance))
        .map(|(_, p)| *p);
    match option {
        AttackOption::Left => opponents.take(1).collect(),
        AttackOption::Multiple => opponents.collect(),
    }
}

/// Untapped creature without summoning sickness or defender
pub fn can_attack(game: &GameState, card: CardId) -> bool {
    let Ok(c) = game.cards.get(card) else { return false };
    let Some(permanent) = c.permanent.as_ref() else { return false };
    c.is_creature()
        && !permanent.tapped
        && !game.has_keyword(card, Keyword::Defender)
        && (permanent.entered_turn < game.turn.turn_number || game.has_keyword(card, Keyword::Haste))
}

/// Can `blocker` legally block `attacker` (flying needs flying or reach)
pub fn can_block(game: &GameState, blocker: CardId, attacker: CardId) -> bool {
    let Ok(b) = game.cards.get(blocker) else { return false };
    if !b.is_creature() || b.is_tapped() || !game.battlefield.contains(blocker) {
        return false;
    }
    if game.has_keyword(attacker, Keyword::Flying) {
        return game.has_keyword(blocker, Keyword::Flying) || game.has_keyword(blocker, Keyword::Reach);
    }
    true
}

/// Declare an attacker: taps it unless it has vigilance
pub fn declare_attacker(game: &mut GameState, attacker: CardId, defender: PlayerId) -> Result<()> {
    let controller = game.cards.get(attacker)?.controller();
    if !game.has_keyword(attacker, Keyword::Vigilance) {
        game.tap_permanent(attacker)?;
    }
    game.combat.declare_attacker(attacker, defender);
    game.pending_events.push(GameEvent::AttackerDeclared {
        card: attacker,
        controller,
        defender,
    });
    game.logger.normal(&format!(
        "{} attacks {}",
        game.describe_card(attacker),
        game.player_name(defender)
    ));
    Ok(())
}

/// Combat damage step
///
/// Unblocked attackers hit their defending player. A blocked attacker
/// splits its damage among its blockers in id order, assigning lethal
/// damage to each before moving on; blockers deal their damage back.
pub fn assign_combat_damage(game: &mut GameState) -> Result<()> {
    let mut assignments: Vec<(CardId, Target, i32)> = Vec::new();

    for (&attacker, &defender) in &game.combat.attackers {
        if !game.battlefield.contains(attacker) {
            continue;
        }
        let power = game.power(attacker);
        let blockers = game.combat.get_blockers(attacker);
        if blockers.is_empty() {
            assignments.push((attacker, Target::Player(defender), power));
            continue;
        }

        let deathtouch = game.has_keyword(attacker, Keyword::Deathtouch);
        let mut remaining = power;
        for (i, &blocker) in blockers.iter().enumerate() {
            if remaining <= 0 {
                break;
            }
            let lethal = if deathtouch {
                1
            } else {
                let marked = game.permanent(blocker).map(|p| p.damage).unwrap_or(0);
                (game.toughness(blocker) - marked).max(1)
            };
            let amount = if i + 1 == blockers.len() {
                remaining
            } else {
                lethal.min(remaining)
            };
            assignments.push((attacker, Target::Permanent(blocker), amount));
            remaining -= amount;
        }
        for &blocker in &blockers {
            assignments.push((blocker, Target::Permanent(attacker), game.power(blocker)));
        }
    }

    for (source, target, amount) in assignments {
        game.deal_damage(Some(source), target, amount, true)?;
    }
    Ok(())
}
