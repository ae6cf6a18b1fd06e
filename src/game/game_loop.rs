//! Game loop implementation
//!
//! Drives turns, steps and priority. Every step runs its turn-based
//! actions, then state-based actions and trigger delivery until stable,
//! then a priority round: players receive priority in turn order starting
//! with the active player, a player who acts receives priority again, and
//! once everyone passes in succession the top of the stack resolves (or,
//! with an empty stack, the step ends).

use crate::core::{CardId, CardType, FilterContext, Keyword, ManaCost, PlayerId, SpellAbility, Target, TargetSpec};
use crate::game::combat::{self, AttackOption, RangeOfInfluence};
use crate::game::controller::{controller_for, exact_cards, GameStateView, PlayerController};
use crate::game::events::GameEvent;
use crate::game::logger::{log_if_verbose, VerbosityLevel};
use crate::game::mana_payment::{can_pay, pay_cost};
use crate::game::phase::Step;
use crate::game::stack::{resolve_top, StackItem, StackObjectKind};
use crate::game::state_based::check_state_based_actions;
use crate::game::targeting::{choose_targets, legal_candidates};
use crate::game::triggers::{put_triggers_on_stack, TriggerEngine};
use crate::game::GameState;
use crate::zones::Zone;
use crate::{Result, SimError};
use smallvec::SmallVec;
use std::sync::Arc;

pub const DEFAULT_MAX_TURNS: u32 = 500;
pub const DEFAULT_MAX_ACTIONS_PER_STEP: usize = 1000;

/// Result of running a game to completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameResult {
    /// None for a draw
    pub winner: Option<PlayerId>,
    pub turns_played: u32,
    pub end_reason: GameEndReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEndReason {
    /// Every other player lost
    LastPlayerStanding(PlayerId),
    /// The last remaining players lost simultaneously
    Draw,
}

/// Game loop manager
pub struct GameLoop<'a> {
    pub game: &'a mut GameState,
    controllers: &'a mut [Box<dyn PlayerController>],
    max_turns: u32,
    max_actions_per_step: usize,
    attack_option: AttackOption,
    range_of_influence: RangeOfInfluence,
    turns_elapsed: u32,
}

impl<'a> GameLoop<'a> {
    pub fn new(game: &'a mut GameState, controllers: &'a mut [Box<dyn PlayerController>]) -> Self {
        GameLoop {
            game,
            controllers,
            max_turns: DEFAULT_MAX_TURNS,
            max_actions_per_step: DEFAULT_MAX_ACTIONS_PER_STEP,
            attack_option: AttackOption::Left,
            range_of_influence: RangeOfInfluence::All,
            turns_elapsed: 0,
        }
    }

    /// Turn ceiling; exceeding it is a `LoopLimit` error
    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    /// Priority decisions allowed in one step before it is treated as a loop
    pub fn with_max_actions_per_step(mut self, max_actions: usize) -> Self {
        self.max_actions_per_step = max_actions;
        self
    }

    pub fn with_attack_option(mut self, option: AttackOption) -> Self {
        self.attack_option = option;
        self
    }

    pub fn with_range_of_influence(mut self, range: RangeOfInfluence) -> Self {
        self.range_of_influence = range;
        self
    }

    /// Set verbosity on the game's logger
    pub fn with_verbosity(mut self, verbosity: VerbosityLevel) -> Self {
        self.game.logger.set_verbosity(verbosity);
        self
    }

    /// Run turns until the game is over
    pub fn run_game(&mut self) -> Result<GameResult> {
        loop {
            if let Some(result) = self.check_game_over() {
                self.notify_game_end(result.winner);
                return Ok(result);
            }
            if self.turns_elapsed >= self.max_turns {
                return Err(SimError::LoopLimit(format!(
                    "game did not finish within {} turns",
                    self.max_turns
                )));
            }
            self.run_turn()?;
        }
    }

    fn check_game_over(&self) -> Option<GameResult> {
        if !self.game.is_game_over() {
            return None;
        }
        let winner = self.game.get_winner();
        Some(GameResult {
            winner,
            turns_played: self.turns_elapsed,
            end_reason: match winner {
                Some(p) => GameEndReason::LastPlayerStanding(p),
                None => GameEndReason::Draw,
            },
        })
    }

    fn notify_game_end(&mut self, winner: Option<PlayerId>) {
        match winner {
            Some(p) => self
                .game
                .logger
                .normal(&format!("{} wins the game", self.game.player_name(p))),
            None => self.game.logger.normal("The game is a draw"),
        }
        let game: &GameState = self.game;
        for controller in self.controllers.iter_mut() {
            let player = controller.player_id();
            let view = GameStateView::new(game, player);
            controller.on_game_end(&view, winner == Some(player));
        }
    }

    /// Run one full turn of the active player
    pub fn run_turn(&mut self) -> Result<()> {
        let active = self.game.turn.active_player;
        self.turns_elapsed += 1;
        self.game.logger.normal(&format!(
            "Turn {} ({})",
            self.game.turn.turn_number,
            self.game.player_name(active)
        ));
        self.game.get_player_mut(active)?.lands_played_this_turn = 0;

        loop {
            self.execute_step()?;
            self.game.empty_mana_pools();
            if self.game.is_game_over() || !self.game.is_alive(active) {
                break;
            }
            if !self.game.turn.advance_step() {
                break;
            }
        }

        self.game.combat.clear();
        if let Some(next) = self.game.next_alive_player(active) {
            self.game.turn.next_turn(next);
        }
        Ok(())
    }

    fn execute_step(&mut self) -> Result<()> {
        let step = self.game.turn.current_step;
        let active = self.game.turn.active_player;
        log_if_verbose!(self.game.logger, "--- {} ---", step);

        match step {
            Step::Untap => {
                self.game.untap_all(active)?;
                return Ok(());
            }
            Step::Upkeep | Step::End => {
                self.game.pending_events.push(GameEvent::StepBegan {
                    step,
                    active_player: active,
                });
            }
            Step::Draw => {
                // The player who goes first skips the draw on turn 1
                if self.game.turn.turn_number > 1 {
                    let drawn = self.game.draw_card(active)?;
                    if let Some(card) = drawn {
                        log_if_verbose!(
                            self.game.logger,
                            "{} draws {}",
                            self.game.player_name(active),
                            self.game.describe_card(card)
                        );
                    }
                }
            }
            Step::BeginCombat => self.game.combat.clear(),
            Step::DeclareAttackers => {
                self.declare_attackers()?;
                if !self.game.combat.combat_active {
                    return Ok(());
                }
            }
            Step::DeclareBlockers => {
                if !self.game.combat.combat_active {
                    return Ok(());
                }
                self.declare_blockers()?;
            }
            Step::CombatDamage => {
                if !self.game.combat.combat_active {
                    return Ok(());
                }
                combat::assign_combat_damage(self.game)?;
            }
            Step::EndCombat => self.game.combat.clear(),
            Step::Cleanup => {
                self.cleanup()?;
                self.settle()?;
                // Players only receive priority in cleanup if something triggered
                if self.game.stack.is_empty() {
                    return Ok(());
                }
            }
            Step::Main1 | Step::Main2 => {}
        }

        self.priority_round()
    }

    /// State-based actions and trigger delivery, repeated until nothing changes
    fn settle(&mut self) -> Result<()> {
        loop {
            check_state_based_actions(self.game)?;
            if self.game.is_game_over() {
                self.game.pending_events.clear();
                return Ok(());
            }
            let pending = TriggerEngine::collect(self.game);
            if pending.is_empty() {
                return Ok(());
            }
            put_triggers_on_stack(self.game, self.controllers, pending)?;
        }
    }

    fn priority_round(&mut self) -> Result<()> {
        let mut actions = 0usize;
        loop {
            self.settle()?;
            if self.game.is_game_over() {
                return Ok(());
            }

            let mut current = self.game.turn.active_player;
            if !self.game.is_alive(current) {
                match self.game.next_alive_player(current) {
                    Some(p) => current = p,
                    None => return Ok(()),
                }
            }
            let mut consecutive_passes = 0;

            while consecutive_passes < self.game.alive_players().count() {
                actions += 1;
                if actions > self.max_actions_per_step {
                    return Err(SimError::LoopLimit(format!(
                        "more than {} priority actions in the {} step",
                        self.max_actions_per_step, self.game.turn.current_step
                    )));
                }
                self.game.turn.priority_player = Some(current);

                let available = self.available_actions(current)?;
                let choice = if available.is_empty() {
                    None
                } else {
                    let view = GameStateView::new(self.game, current);
                    controller_for(self.controllers, current)?.choose_spell_ability_to_play(&view, &available)
                };

                let acted = match choice {
                    Some(action) if available.contains(&action) => self.execute_action(current, action)?,
                    _ => false,
                };

                if acted {
                    consecutive_passes = 0;
                    self.settle()?;
                    if self.game.is_game_over() {
                        return Ok(());
                    }
                    if !self.game.is_alive(current) {
                        current = self.game.next_alive_player(current).unwrap_or(current);
                    }
                } else {
                    consecutive_passes += 1;
                    let view = GameStateView::new(self.game, current);
                    controller_for(self.controllers, current)?.on_priority_passed(&view);
                    current = self.game.next_alive_player(current).unwrap_or(current);
                }
            }

            self.game.turn.priority_player = None;
            if self.game.stack.is_empty() {
                return Ok(());
            }
            resolve_top(self.game, self.controllers)?;
        }
    }

    /// Actions `player` could legally take with priority right now
    pub fn available_actions(&self, player: PlayerId) -> Result<SmallVec<[SpellAbility; 8]>> {
        let game: &GameState = self.game;
        let mut actions = SmallVec::new();
        let sorcery_timing = game.turn.active_player == player
            && game.turn.current_step.is_sorcery_speed()
            && game.stack.is_empty();

        let hand = game.hand(player);
        if sorcery_timing && game.get_player(player)?.can_play_land() {
            actions.extend(
                hand.iter()
                    .copied()
                    .filter(|&c| game.cards.get(c).is_ok_and(|card| card.is_land()))
                    .map(|card_id| SpellAbility::PlayLand { card_id }),
            );
        }

        let command = game
            .get_player_zones(player)
            .map(|z| z.command.cards.as_slice())
            .unwrap_or(&[]);
        for &card_id in hand.iter().chain(command.iter()) {
            let card = game.cards.get(card_id)?;
            if card.is_land() {
                continue;
            }
            let instant = card.is_type(CardType::Instant);
            if !instant && !sorcery_timing {
                continue;
            }
            let cost = self.spell_cost(player, card_id)?;
            if !can_pay(game, player, &cost) {
                continue;
            }
            let target = card.definition.spell.as_ref().and_then(|s| s.target.as_ref());
            if !self.has_required_targets(player, card_id, target) {
                continue;
            }
            actions.push(SpellAbility::CastSpell { card_id });
        }

        for card_id in game.permanents_controlled_by(player) {
            let card = game.cards.get(card_id)?;
            for (ability_index, ability) in card.definition.abilities.iter().enumerate() {
                let Some(activated) = ability.as_activated() else { continue };
                if activated.is_mana_ability() {
                    continue;
                }
                if activated.cost.tap && !self.can_tap_for_cost(card_id) {
                    continue;
                }
                if !can_pay(game, player, &activated.cost.mana) {
                    continue;
                }
                if !self.has_required_targets(player, card_id, activated.target.as_ref()) {
                    continue;
                }
                actions.push(SpellAbility::ActivateAbility { card_id, ability_index });
            }
        }
        Ok(actions)
    }

    /// Mana cost including commander tax when cast from the command zone
    fn spell_cost(&self, player: PlayerId, card_id: CardId) -> Result<ManaCost> {
        let card = self.game.cards.get(card_id)?;
        let base = card.definition.mana_cost;
        if card.zone == Zone::Command {
            let tax = self.game.get_player(player)?.commander_tax();
            Ok(base.with_additional_generic(tax))
        } else {
            Ok(base)
        }
    }

    fn can_tap_for_cost(&self, card_id: CardId) -> bool {
        let Ok(card) = self.game.cards.get(card_id) else { return false };
        let Some(permanent) = card.permanent.as_ref() else { return false };
        let sick = card.is_creature()
            && permanent.entered_turn >= self.game.turn.turn_number
            && !self.game.has_keyword(card_id, Keyword::Haste);
        !permanent.tapped && !sick
    }

    fn has_required_targets(&self, player: PlayerId, source: CardId, spec: Option<&TargetSpec>) -> bool {
        match spec {
            Some(spec) if spec.min_required() > 0 => {
                let ctx = FilterContext::new(Some(source), player);
                !legal_candidates(self.game, spec, &ctx).is_empty()
            }
            _ => true,
        }
    }

    /// Returns false if the action turned out to be impossible
    fn execute_action(&mut self, player: PlayerId, action: SpellAbility) -> Result<bool> {
        log_if_verbose!(self.game.logger, "{} chooses {}", self.game.player_name(player), action);
        match action {
            SpellAbility::PlayLand { card_id } => {
                self.game.move_card(card_id, Zone::Battlefield)?;
                self.game.get_player_mut(player)?.lands_played_this_turn += 1;
                self.game.logger.normal(&format!(
                    "{} plays {}",
                    self.game.player_name(player),
                    self.game.describe_card(card_id)
                ));
                Ok(true)
            }
            SpellAbility::CastSpell { card_id } => self.cast_spell(player, card_id),
            SpellAbility::ActivateAbility { card_id, ability_index } => {
                self.activate_ability(player, card_id, ability_index)
            }
        }
    }

    fn cast_spell(&mut self, player: PlayerId, card_id: CardId) -> Result<bool> {
        let definition = Arc::clone(&self.game.cards.get(card_id)?.definition);
        let from_command = self.game.cards.get(card_id)?.zone == Zone::Command;
        let cost = self.spell_cost(player, card_id)?;

        let targets: SmallVec<[Target; 2]> = match definition.spell.as_ref().and_then(|s| s.target.as_ref()) {
            Some(spec) => {
                let harmful = definition
                    .spell
                    .as_ref()
                    .is_some_and(|s| s.effects.iter().any(|e| e.is_harmful()));
                let chosen = choose_targets(
                    self.game,
                    self.controllers,
                    player,
                    Some(card_id),
                    spec,
                    harmful,
                    definition.name.as_str(),
                )?;
                if chosen.is_empty() && spec.min_required() > 0 {
                    return Ok(false);
                }
                chosen
            }
            None => SmallVec::new(),
        };

        pay_cost(self.game, player, &cost)?;
        self.game.move_card(card_id, Zone::Stack)?;
        if from_command {
            self.game.get_player_mut(player)?.commander_casts += 1;
        }
        self.game.stack.push(StackItem {
            controller: player,
            kind: StackObjectKind::Spell { card: card_id },
            targets,
        });
        self.game.pending_events.push(GameEvent::SpellCast {
            card: card_id,
            controller: player,
        });
        self.game.logger.normal(&format!(
            "{} casts {}",
            self.game.player_name(player),
            self.game.describe_card(card_id)
        ));
        Ok(true)
    }

    fn activate_ability(&mut self, player: PlayerId, card_id: CardId, ability_index: usize) -> Result<bool> {
        let definition = Arc::clone(&self.game.cards.get(card_id)?.definition);
        let Some(activated) = definition.abilities.get(ability_index).and_then(|a| a.as_activated()) else {
            return Err(SimError::InvalidAction(format!(
                "{} has no activated ability {ability_index}",
                definition.name
            )));
        };

        let targets: SmallVec<[Target; 2]> = match activated.target.as_ref() {
            Some(spec) => {
                let harmful = activated.effects.iter().any(|e| e.is_harmful());
                let chosen = choose_targets(
                    self.game,
                    self.controllers,
                    player,
                    Some(card_id),
                    spec,
                    harmful,
                    &activated.description,
                )?;
                if chosen.is_empty() && spec.min_required() > 0 {
                    return Ok(false);
                }
                chosen
            }
            None => SmallVec::new(),
        };

        if activated.cost.tap && !self.game.tap_permanent(card_id)? {
            return Ok(false);
        }
        pay_cost(self.game, player, &activated.cost.mana)?;
        self.game.stack.push(StackItem {
            controller: player,
            kind: StackObjectKind::Ability {
                source: card_id,
                ability_index,
                triggering_object: None,
                triggering_player: None,
                event: None,
            },
            targets,
        });
        self.game.logger.normal(&format!(
            "{} activates {}: {}",
            self.game.player_name(player),
            self.game.describe_card(card_id),
            activated.description
        ));
        Ok(true)
    }

    fn declare_attackers(&mut self) -> Result<()> {
        let active = self.game.turn.active_player;
        let defenders = combat::defenders_for(self.game, active, self.attack_option, self.range_of_influence);
        let available: SmallVec<[CardId; 8]> = self
            .game
            .permanents_controlled_by(active)
            .filter(|&c| combat::can_attack(self.game, c))
            .collect();
        if available.is_empty() || defenders.is_empty() {
            return Ok(());
        }

        let view = GameStateView::new(self.game, active);
        let picks = controller_for(self.controllers, active)?.choose_attackers(&view, &available, &defenders);
        for (attacker, defender) in picks {
            if !available.contains(&attacker)
                || !defenders.contains(&defender)
                || self.game.combat.is_attacking(attacker)
            {
                continue;
            }
            combat::declare_attacker(self.game, attacker, defender)?;
        }
        Ok(())
    }

    fn declare_blockers(&mut self) -> Result<()> {
        let order = self.game.players_in_turn_order(self.game.turn.active_player);
        for defender in order.into_iter().skip(1) {
            let attackers = self.game.combat.attackers_of(defender);
            if attackers.is_empty() {
                continue;
            }
            let available: SmallVec<[CardId; 8]> = self
                .game
                .permanents_controlled_by(defender)
                .filter(|&b| attackers.iter().any(|&a| combat::can_block(self.game, b, a)))
                .collect();
            if available.is_empty() {
                continue;
            }

            let view = GameStateView::new(self.game, defender);
            let picks = controller_for(self.controllers, defender)?.choose_blockers(&view, &available, &attackers);
            for (blocker, attacker) in picks {
                if !available.contains(&blocker)
                    || !attackers.contains(&attacker)
                    || self.game.combat.is_blocking(blocker)
                    || !combat::can_block(self.game, blocker, attacker)
                {
                    continue;
                }
                self.game.combat.declare_blocker(blocker, attacker);
                self.game.logger.normal(&format!(
                    "{} blocks {}",
                    self.game.describe_card(blocker),
                    self.game.describe_card(attacker)
                ));
            }
        }
        Ok(())
    }

    /// Discard to maximum hand size, then end "until end of turn" effects
    fn cleanup(&mut self) -> Result<()> {
        let active = self.game.turn.active_player;
        let max = self.game.get_player(active)?.max_hand_size;
        let hand = self.game.hand(active).to_vec();
        if hand.len() > max {
            let excess = hand.len() - max;
            let view = GameStateView::new(self.game, active);
            let picked = controller_for(self.controllers, active)?.choose_cards_to_discard(&view, &hand, excess);
            for card in exact_cards(&picked, &hand, excess) {
                self.game.move_card(card, Zone::Graveyard)?;
                log_if_verbose!(
                    self.game.logger,
                    "{} discards {}",
                    self.game.player_name(active),
                    self.game.describe_card(card)
                );
            }
        }
        self.game.cleanup_temporary_effects()?;
        self.game.empty_mana_pools();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CardDefinition;
    use crate::game::{OutputMode, ZeroController};

    fn bears() -> Arc<CardDefinition> {
        Arc::new(CardDefinition::new("Grizzly Bears", &[CardType::Creature]).with_pt(2, 2))
    }

    fn setup() -> (GameState, Vec<Box<dyn PlayerController>>, PlayerId, PlayerId) {
        let mut game = GameState::new();
        let p1 = game.add_player("Player 1", 20);
        let p2 = game.add_player("Player 2", 20);
        game.logger.set_output_mode(OutputMode::Memory);
        let controllers: Vec<Box<dyn PlayerController>> =
            vec![Box::new(ZeroController::new(p1)), Box::new(ZeroController::new(p2))];
        (game, controllers, p1, p2)
    }

    #[test]
    fn test_first_player_skips_first_draw() {
        let (mut game, mut controllers, p1, _) = setup();
        let forest = Arc::new(CardDefinition::new("Forest", &[CardType::Land]));
        for _ in 0..5 {
            game.create_card(forest.clone(), p1, Zone::Library).unwrap();
        }
        let mut game_loop = GameLoop::new(&mut game, &mut controllers);
        game_loop.run_turn().unwrap();

        assert_eq!(game.library(p1).len(), 5);
        assert!(game.hand(p1).is_empty());
        assert_eq!(game.turn.turn_number, 2);
    }

    #[test]
    fn test_unblocked_attack_deals_damage() {
        let (mut game, mut controllers, p1, p2) = setup();
        let attacker = game.create_card(bears(), p1, Zone::Battlefield).unwrap();
        game.create_card(bears(), p1, Zone::Library).unwrap();
        game.turn.turn_number = 2;

        let mut game_loop = GameLoop::new(&mut game, &mut controllers);
        game_loop.run_turn().unwrap();

        assert_eq!(game.get_player(p2).unwrap().life, 18);
        assert!(game.cards.get(attacker).unwrap().is_tapped());
        assert!(game.logger.logs().iter().any(|e| e.message.contains("attacks Player 2")));
    }

    #[test]
    fn test_game_runs_to_decking() {
        let (mut game, mut controllers, p1, p2) = setup();
        let wall = Arc::new(
            CardDefinition::new("Wall of Stone", &[CardType::Creature])
                .with_pt(0, 8)
                .with_keywords(&[Keyword::Defender]),
        );
        game.create_card(wall, p1, Zone::Battlefield).unwrap();
        for player in [p1, p2] {
            for _ in 0..3 {
                game.create_card(bears(), player, Zone::Library).unwrap();
            }
        }

        let result = GameLoop::new(&mut game, &mut controllers).run_game().unwrap();
        assert!(result.winner.is_some());
        assert!(result.turns_played > 1);
    }

    #[test]
    fn test_turn_ceiling_is_an_error() {
        let (mut game, mut controllers, p1, p2) = setup();
        let wall = Arc::new(
            CardDefinition::new("Wall of Stone", &[CardType::Creature])
                .with_pt(0, 8)
                .with_keywords(&[Keyword::Defender]),
        );
        for player in [p1, p2] {
            game.create_card(wall.clone(), player, Zone::Battlefield).unwrap();
            for _ in 0..40 {
                game.create_card(wall.clone(), player, Zone::Library).unwrap();
            }
        }
        let err = GameLoop::new(&mut game, &mut controllers)
            .with_max_turns(4)
            .run_game()
            .unwrap_err();
        assert!(matches!(err, SimError::LoopLimit(_)));
    }
}
