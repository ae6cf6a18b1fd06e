//! Main game state structure

use crate::core::{
    Ability, Card, CardDefinition, CardId, EntityStore, FilterContext, Keyword, Permanent, Player,
    PlayerId, PlayerName, ReplacementEffect, StaticAbility, Target,
};
use crate::game::events::GameEvent;
use crate::game::logger::log_if_verbose;
use crate::game::stack::Stack;
use crate::game::{CombatState, GameLogger, TurnStructure};
use crate::zones::{CardZone, PlayerZones, Zone};
use crate::{Result, SimError};
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use smallvec::SmallVec;
use std::cell::RefCell;
use std::sync::Arc;

/// Complete game state
///
/// Every field is owned, so `clone()` is a deep copy that shares nothing
/// mutable with the source; card definitions are shared through `Arc` but
/// are immutable.
#[derive(Debug, Clone)]
pub struct GameState {
    /// All card objects in the game, in every zone
    pub cards: EntityStore<Card>,

    /// Players in seat order, which is also turn order
    pub players: Vec<Player>,

    pub player_zones: Vec<(PlayerId, PlayerZones)>,

    /// Shared battlefield, in the order permanents entered
    pub battlefield: CardZone,

    pub stack: Stack,

    pub turn: TurnStructure,

    pub combat: CombatState,

    /// Game RNG, also used by controllers through `GameStateView`
    ///
    /// Wrapped in RefCell so controllers can draw from it while holding a
    /// shared borrow of the state.
    pub rng: RefCell<ChaCha12Rng>,

    next_entity_id: u32,

    /// Events not yet seen by the trigger engine
    pub pending_events: Vec<GameEvent>,

    pub logger: GameLogger,
}

impl GameState {
    /// Empty game with no players
    pub fn new() -> Self {
        let placeholder = PlayerId::new(0);
        GameState {
            cards: EntityStore::new(),
            players: Vec::new(),
            player_zones: Vec::new(),
            battlefield: CardZone::new(Zone::Battlefield, placeholder),
            stack: Stack::new(),
            turn: TurnStructure::new(placeholder),
            combat: CombatState::new(),
            rng: RefCell::new(ChaCha12Rng::seed_from_u64(0)),
            next_entity_id: 0,
            pending_events: Vec::new(),
            logger: GameLogger::new(),
        }
    }

    /// Add a player in the next seat
    pub fn add_player(&mut self, name: impl Into<PlayerName>, starting_life: i32) -> PlayerId {
        let id = PlayerId::new(self.next_id());
        self.players.push(Player::new(id, name, starting_life));
        self.player_zones.push((id, PlayerZones::new(id)));
        if self.players.len() == 1 {
            self.turn = TurnStructure::new(id);
        }
        id
    }

    /// Set the RNG seed for deterministic gameplay
    pub fn seed_rng(&mut self, seed: u64) {
        *self.rng.borrow_mut() = ChaCha12Rng::seed_from_u64(seed);
    }

    pub fn shuffle_library(&mut self, player_id: PlayerId) {
        use rand::seq::SliceRandom;
        if let Some(zones) = self
            .player_zones
            .iter_mut()
            .find(|(id, _)| *id == player_id)
            .map(|(_, z)| z)
        {
            zones.library.cards.shuffle(&mut *self.rng.borrow_mut());
        }
    }

    fn next_id(&mut self) -> u32 {
        let id = self.next_entity_id;
        self.next_entity_id += 1;
        id
    }

    /// Create a card object from a definition directly in a zone
    pub fn create_card(
        &mut self,
        definition: Arc<CardDefinition>,
        owner: PlayerId,
        zone: Zone,
    ) -> Result<CardId> {
        let id = CardId::new(self.next_id());
        let mut card = Card::new(id, definition, owner, zone);
        match zone {
            Zone::Battlefield => {
                let mut permanent = Permanent::new(owner, self.turn.turn_number);
                permanent.tapped = card.definition.enters_tapped();
                card.permanent = Some(permanent);
                self.battlefield.add(id);
            }
            Zone::Stack => {
                return Err(SimError::InvalidAction(
                    "cards cannot be created on the stack".to_string(),
                ))
            }
            other => self.zone_list_mut(owner, other)?.add(id),
        }
        self.cards.insert(id, card);
        Ok(id)
    }

    pub fn get_player_zones(&self, player_id: PlayerId) -> Option<&PlayerZones> {
        self.player_zones
            .iter()
            .find(|(id, _)| *id == player_id)
            .map(|(_, zones)| zones)
    }

    pub fn get_player_zones_mut(&mut self, player_id: PlayerId) -> Option<&mut PlayerZones> {
        self.player_zones
            .iter_mut()
            .find(|(id, _)| *id == player_id)
            .map(|(_, zones)| zones)
    }

    fn zone_list_mut(&mut self, owner: PlayerId, zone: Zone) -> Result<&mut CardZone> {
        self.get_player_zones_mut(owner)
            .ok_or(SimError::EntityNotFound(owner.as_u32()))?
            .get_zone_mut(zone)
            .ok_or_else(|| SimError::Invariant(format!("{zone} is not a per-player zone")))
    }

    pub fn get_player(&self, id: PlayerId) -> Result<&Player> {
        self.players
            .iter()
            .find(|p| p.id == id)
            .ok_or(SimError::EntityNotFound(id.as_u32()))
    }

    pub fn get_player_mut(&mut self, id: PlayerId) -> Result<&mut Player> {
        self.players
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(SimError::EntityNotFound(id.as_u32()))
    }

    pub fn player_name(&self, id: PlayerId) -> &str {
        self.get_player(id)
            .map(|p| p.name.as_str())
            .unwrap_or("unknown player")
    }

    /// "Name (id)" for logs
    pub fn describe_card(&self, id: CardId) -> String {
        match self.cards.get(id) {
            Ok(card) => format!("{} ({})", card.name(), id),
            Err(_) => format!("card {id}"),
        }
    }

    pub fn seat_index(&self, id: PlayerId) -> Option<usize> {
        self.players.iter().position(|p| p.id == id)
    }

    pub fn is_alive(&self, id: PlayerId) -> bool {
        self.get_player(id).is_ok_and(|p| !p.has_lost)
    }

    /// Players still in the game, in seat order
    pub fn alive_players(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.players.iter().filter(|p| !p.has_lost).map(|p| p.id)
    }

    /// The next player after `current` in turn order who is still in the game
    pub fn next_alive_player(&self, current: PlayerId) -> Option<PlayerId> {
        let start = self.seat_index(current)?;
        let n = self.players.len();
        (1..=n)
            .map(|offset| &self.players[(start + offset) % n])
            .find(|p| !p.has_lost && p.id != current)
            .map(|p| p.id)
    }

    /// Players still in the game in turn order starting from `first`
    /// (APNAP order when `first` is the active player)
    pub fn players_in_turn_order(&self, first: PlayerId) -> SmallVec<[PlayerId; 4]> {
        let start = self.seat_index(first).unwrap_or(0);
        let n = self.players.len();
        (0..n)
            .map(|offset| &self.players[(start + offset) % n])
            .filter(|p| !p.has_lost)
            .map(|p| p.id)
            .collect()
    }

    /// Seats between the active player and `player`, going around the table
    pub fn apnap_distance(&self, player: PlayerId) -> usize {
        let n = self.players.len().max(1);
        match (self.seat_index(self.turn.active_player), self.seat_index(player)) {
            (Some(active), Some(seat)) => (seat + n - active) % n,
            _ => n,
        }
    }

    pub fn is_game_over(&self) -> bool {
        self.alive_players().count() <= 1
    }

    /// The sole remaining player, once the game is over
    pub fn get_winner(&self) -> Option<PlayerId> {
        let mut alive = self.alive_players();
        match (alive.next(), alive.next()) {
            (Some(winner), None) => Some(winner),
            _ => None,
        }
    }

    pub fn hand(&self, player: PlayerId) -> &[CardId] {
        self.get_player_zones(player)
            .map(|z| z.hand.cards.as_slice())
            .unwrap_or(&[])
    }

    pub fn library(&self, player: PlayerId) -> &[CardId] {
        self.get_player_zones(player)
            .map(|z| z.library.cards.as_slice())
            .unwrap_or(&[])
    }

    /// Permanents controlled by `player`, in battlefield order
    pub fn permanents_controlled_by(&self, player: PlayerId) -> impl Iterator<Item = CardId> + '_ {
        self.battlefield.cards.iter().copied().filter(move |id| {
            self.cards
                .get(*id)
                .is_ok_and(|card| card.controller() == player)
        })
    }

    pub fn permanent(&self, card: CardId) -> Result<&Permanent> {
        self.cards
            .get(card)?
            .permanent
            .as_ref()
            .ok_or_else(|| SimError::InvalidAction(format!("card {card} is not on the battlefield")))
    }

    pub fn permanent_mut(&mut self, card: CardId) -> Result<&mut Permanent> {
        self.cards
            .get_mut(card)?
            .permanent
            .as_mut()
            .ok_or_else(|| SimError::InvalidAction(format!("card {card} is not on the battlefield")))
    }

    /// Move a card to another zone under its owner's control
    pub fn move_card(&mut self, card: CardId, to: Zone) -> Result<()> {
        self.move_card_with_controller(card, to, None)
    }

    /// Move a card between zones
    ///
    /// Leaving the battlefield drops all permanent state. Entering it
    /// creates fresh state under `controller` (owner by default) and applies
    /// "enters tapped". A commander going to a graveyard or exile goes to
    /// its owner's command zone instead.
    pub fn move_card_with_controller(
        &mut self,
        card: CardId,
        to: Zone,
        controller: Option<PlayerId>,
    ) -> Result<()> {
        let (from, owner, last_controller, is_commander, enters_tapped) = {
            let c = self.cards.get(card)?;
            (
                c.zone,
                c.owner,
                c.controller(),
                c.is_commander,
                c.definition.enters_tapped(),
            )
        };

        let to = if is_commander && matches!(to, Zone::Graveyard | Zone::Exile) {
            Zone::Command
        } else {
            to
        };
        if from == to {
            return Ok(());
        }

        match from {
            Zone::Battlefield => {
                self.battlefield.remove(card);
                self.combat.remove_creature(card);
            }
            Zone::Stack => {}
            other => {
                self.zone_list_mut(owner, other)?.remove(card);
            }
        }

        let new_controller = controller.unwrap_or(owner);
        match to {
            Zone::Battlefield => self.battlefield.add(card),
            Zone::Stack => {}
            other => self.zone_list_mut(owner, other)?.add(card),
        }

        let turn_number = self.turn.turn_number;
        let c = self.cards.get_mut(card)?;
        c.zone = to;
        c.permanent = if to == Zone::Battlefield {
            let mut permanent = Permanent::new(new_controller, turn_number);
            permanent.tapped = enters_tapped;
            Some(permanent)
        } else {
            None
        };

        let event_controller = match (from, to) {
            (Zone::Battlefield, _) => last_controller,
            (_, Zone::Battlefield) => new_controller,
            _ => owner,
        };
        self.pending_events.push(GameEvent::ZoneChange {
            card,
            from,
            to,
            controller: event_controller,
        });

        if from == Zone::Battlefield || to == Zone::Battlefield {
            log_if_verbose!(self.logger, "{} moves from {} to {}", self.describe_card(card), from, to);
        }
        Ok(())
    }

    /// Put a card from anywhere on the bottom of its owner's library
    pub fn put_on_bottom_of_library(&mut self, card: CardId) -> Result<()> {
        self.move_card(card, Zone::Library)?;
        let owner = self.cards.get(card)?.owner;
        let library = self.zone_list_mut(owner, Zone::Library)?;
        library.remove(card);
        library.add_to_bottom(card);
        Ok(())
    }

    /// Draw the top card of a library
    ///
    /// Drawing from an empty library is recorded for the next state-based
    /// action check; it is not an error.
    pub fn draw_card(&mut self, player: PlayerId) -> Result<Option<CardId>> {
        let top = self
            .get_player_zones(player)
            .ok_or(SimError::EntityNotFound(player.as_u32()))?
            .library
            .peek_top();
        match top {
            Some(card) => {
                self.move_card(card, Zone::Hand)?;
                Ok(Some(card))
            }
            None => {
                self.get_player_mut(player)?.drew_from_empty_library = true;
                Ok(None)
            }
        }
    }

    /// Put the top `count` cards of a library into its graveyard
    pub fn mill_cards(&mut self, player: PlayerId, count: u8) -> Result<usize> {
        let mut milled = 0;
        for _ in 0..count {
            let top = self
                .get_player_zones(player)
                .ok_or(SimError::EntityNotFound(player.as_u32()))?
                .library
                .peek_top();
            let Some(card) = top else { break };
            self.move_card(card, Zone::Graveyard)?;
            milled += 1;
        }
        Ok(milled)
    }

    /// Tap a permanent; returns false if it was already tapped
    pub fn tap_permanent(&mut self, card: CardId) -> Result<bool> {
        let permanent = self.permanent_mut(card)?;
        if permanent.tapped {
            return Ok(false);
        }
        permanent.tapped = true;
        let controller = permanent.controller;
        self.pending_events.push(GameEvent::Tapped { card, controller });
        Ok(true)
    }

    pub fn untap_permanent(&mut self, card: CardId) -> Result<bool> {
        let permanent = self.permanent_mut(card)?;
        let was_tapped = permanent.tapped;
        permanent.tapped = false;
        Ok(was_tapped)
    }

    /// Untap step: untap everything the player controls
    pub fn untap_all(&mut self, player: PlayerId) -> Result<()> {
        let permanents: SmallVec<[CardId; 16]> = self.permanents_controlled_by(player).collect();
        for card in permanents {
            self.untap_permanent(card)?;
        }
        Ok(())
    }

    /// "Until end of turn" power/toughness change
    pub fn pump(&mut self, card: CardId, power: i32, toughness: i32) -> Result<()> {
        let permanent = self.permanent_mut(card)?;
        permanent.power_bonus += power;
        permanent.toughness_bonus += toughness;
        log_if_verbose!(self.logger, "{} gets {:+}/{:+} until end of turn", self.describe_card(card), power, toughness);
        Ok(())
    }

    pub fn has_keyword(&self, card: CardId, keyword: Keyword) -> bool {
        self.cards
            .get(card)
            .is_ok_and(|c| c.has_printed_keyword(keyword))
    }

    /// Sum of anthem bonuses applying to a permanent
    fn static_bonus(&self, card: CardId) -> (i32, i32) {
        let mut bonus = (0, 0);
        if !self.battlefield.contains(card) {
            return bonus;
        }
        for &source in &self.battlefield.cards {
            let Ok(source_card) = self.cards.get(source) else {
                continue;
            };
            for ability in &source_card.definition.abilities {
                if let Ability::Static(StaticAbility::Anthem {
                    filter,
                    power,
                    toughness,
                }) = ability
                {
                    let ctx = FilterContext::new(Some(source), source_card.controller());
                    // Anthem filters never look at power, so this cannot recurse
                    if filter.matches_permanent(self, card, &ctx) {
                        bonus.0 += power;
                        bonus.1 += toughness;
                    }
                }
            }
        }
        bonus
    }

    /// Current power including temporary and static modifiers
    pub fn power(&self, card: CardId) -> i32 {
        let Ok(c) = self.cards.get(card) else { return 0 };
        let temporary = c.permanent.as_ref().map_or(0, |p| p.power_bonus);
        c.definition.power.unwrap_or(0) + temporary + self.static_bonus(card).0
    }

    pub fn toughness(&self, card: CardId) -> i32 {
        let Ok(c) = self.cards.get(card) else { return 0 };
        let temporary = c.permanent.as_ref().map_or(0, |p| p.toughness_bonus);
        c.definition.toughness.unwrap_or(0) + temporary + self.static_bonus(card).1
    }

    /// Is damage to this permanent prevented by a replacement effect?
    fn is_damage_prevented(&self, target: CardId) -> bool {
        self.battlefield.cards.iter().any(|&source| {
            let Ok(source_card) = self.cards.get(source) else {
                return false;
            };
            source_card.definition.abilities.iter().any(|ability| match ability {
                Ability::Replacement(ReplacementEffect::PreventDamage { filter }) => {
                    let ctx = FilterContext::new(Some(source), source_card.controller());
                    filter.matches_permanent(self, target, &ctx)
                }
                _ => false,
            })
        })
    }

    /// Deal damage from a source (or from nowhere) to a player or permanent
    ///
    /// Returns the damage actually dealt. Applies prevention, deathtouch,
    /// lifelink and commander damage. Vanished targets take no damage.
    pub fn deal_damage(
        &mut self,
        source: Option<CardId>,
        target: Target,
        amount: i32,
        combat: bool,
    ) -> Result<i32> {
        if amount <= 0 {
            return Ok(0);
        }
        let (source_controller, lifelink, deathtouch, from_commander) = match source {
            Some(id) => {
                let card = self.cards.get(id)?;
                (
                    Some(card.controller()),
                    card.has_printed_keyword(Keyword::Lifelink),
                    card.has_printed_keyword(Keyword::Deathtouch),
                    card.is_commander,
                )
            }
            None => (None, false, false, false),
        };

        let dealt = match target {
            Target::Permanent(card) => {
                if !self.battlefield.contains(card) || !self.cards.get(card)?.is_creature() {
                    return Ok(0);
                }
                if self.is_damage_prevented(card) {
                    log_if_verbose!(self.logger, "Damage to {} is prevented", self.describe_card(card));
                    return Ok(0);
                }
                let permanent = self.permanent_mut(card)?;
                permanent.damage += amount;
                permanent.deathtouch_damage |= deathtouch;
                amount
            }
            Target::Player(player) => {
                if !self.is_alive(player) {
                    return Ok(0);
                }
                let p = self.get_player_mut(player)?;
                p.life -= amount;
                if combat && from_commander {
                    if let Some(commander) = source {
                        p.add_commander_damage(commander, amount);
                    }
                }
                amount
            }
        };

        log_if_verbose!(
            self.logger,
            "{} deals {} damage to {}",
            source.map(|s| self.describe_card(s)).unwrap_or_else(|| "Effect".to_string()),
            dealt,
            self.describe_target(target)
        );

        if lifelink {
            if let Some(controller) = source_controller {
                self.gain_life(controller, dealt)?;
            }
        }
        Ok(dealt)
    }

    pub fn describe_target(&self, target: Target) -> String {
        match target {
            Target::Player(p) => self.player_name(p).to_string(),
            Target::Permanent(c) => self.describe_card(c),
        }
    }

    pub fn gain_life(&mut self, player: PlayerId, amount: i32) -> Result<()> {
        if amount <= 0 || !self.is_alive(player) {
            return Ok(());
        }
        self.get_player_mut(player)?.life += amount;
        self.pending_events.push(GameEvent::LifeGained { player, amount });
        log_if_verbose!(self.logger, "{} gains {} life", self.player_name(player), amount);
        Ok(())
    }

    pub fn lose_life(&mut self, player: PlayerId, amount: i32) -> Result<()> {
        if amount <= 0 || !self.is_alive(player) {
            return Ok(());
        }
        self.get_player_mut(player)?.life -= amount;
        log_if_verbose!(self.logger, "{} loses {} life", self.player_name(player), amount);
        Ok(())
    }

    /// Cleanup step: damage and "until end of turn" effects wear off
    pub fn cleanup_temporary_effects(&mut self) -> Result<()> {
        let permanents = self.battlefield.cards.clone();
        for card in permanents {
            let permanent = self.permanent_mut(card)?;
            permanent.damage = 0;
            permanent.deathtouch_damage = false;
            permanent.power_bonus = 0;
            permanent.toughness_bonus = 0;
        }
        Ok(())
    }

    pub fn empty_mana_pools(&mut self) {
        for player in &mut self.players {
            player.mana_pool.clear();
        }
    }

    /// A player who lost leaves the game
    ///
    /// Their permanents and spells are exiled and their abilities on the
    /// stack cease to exist.
    pub fn remove_player(&mut self, player: PlayerId) -> Result<()> {
        self.get_player_mut(player)?.has_lost = true;

        for item in self.stack.remove_controlled_by(player) {
            if let Some(card) = item.spell_card() {
                self.move_card(card, Zone::Exile)?;
            }
        }

        let owned: SmallVec<[CardId; 16]> = self
            .battlefield
            .cards
            .iter()
            .copied()
            .filter(|id| self.cards.get(*id).is_ok_and(|c| c.owner == player))
            .collect();
        for card in owned {
            self.move_card(card, Zone::Exile)?;
        }

        self.combat.remove_defender(player);
        self.logger
            .normal(&format!("{} has left the game", self.player_name(player)));
        Ok(())
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}
