//! Target legality and target choice
//!
//! Legality is always computed from the current game state. Targets are
//! chosen when a spell or ability is put on the stack and checked again,
//! one by one, when it resolves.

use crate::core::{CardId, FilterContext, PlayerId, Target, TargetKind, TargetSpec};
use crate::game::controller::{controller_for, GameStateView, PlayerController, TargetRequest};
use crate::game::GameState;
use crate::Result;
use smallvec::SmallVec;

/// Every legal target for `spec`, permanents in battlefield order then players in seat order
pub fn legal_candidates(game: &GameState, spec: &TargetSpec, ctx: &FilterContext) -> SmallVec<[Target; 8]> {
    let mut candidates = SmallVec::new();
    match &spec.kind {
        TargetKind::Permanent(filter) | TargetKind::Any(filter) => {
            candidates.extend(
                game.battlefield
                    .cards
                    .iter()
                    .filter(|id| filter.matches_permanent(game, **id, ctx))
                    .map(|id| Target::Permanent(*id)),
            );
        }
        TargetKind::Player(_) => {}
    }
    match &spec.kind {
        TargetKind::Player(who) => {
            candidates.extend(
                game.alive_players()
                    .filter(|p| who.matches(*p, ctx.you))
                    .map(Target::Player),
            );
        }
        TargetKind::Any(_) => candidates.extend(game.alive_players().map(Target::Player)),
        TargetKind::Permanent(_) => {}
    }
    candidates
}

/// Is `target` still a legal choice for `spec`?
pub fn is_legal(game: &GameState, spec: &TargetSpec, ctx: &FilterContext, target: Target) -> bool {
    match (&spec.kind, target) {
        (TargetKind::Permanent(filter) | TargetKind::Any(filter), Target::Permanent(id)) => {
            filter.matches_permanent(game, id, ctx)
        }
        (TargetKind::Player(who), Target::Player(p)) => game.is_alive(p) && who.matches(p, ctx.you),
        (TargetKind::Any(_), Target::Player(p)) => game.is_alive(p),
        _ => false,
    }
}

/// The chosen targets that are still legal, in the order they were chosen
pub fn still_legal(
    game: &GameState,
    spec: &TargetSpec,
    ctx: &FilterContext,
    chosen: &[Target],
) -> SmallVec<[Target; 2]> {
    chosen
        .iter()
        .copied()
        .filter(|t| is_legal(game, spec, ctx, *t))
        .collect()
}

/// Ask `player` to choose targets for `spec`
///
/// The answer is validated against the legal candidates, deduplicated and
/// capped at `spec.max`; if it falls short of the required minimum the
/// first remaining candidates are added. With no legal candidates the
/// result is empty.
pub fn choose_targets(
    game: &GameState,
    controllers: &mut [Box<dyn PlayerController>],
    player: PlayerId,
    source: Option<CardId>,
    spec: &TargetSpec,
    harmful: bool,
    description: &str,
) -> Result<SmallVec<[Target; 2]>> {
    let ctx = FilterContext::new(source, player);
    let candidates = legal_candidates(game, spec, &ctx);
    if candidates.is_empty() {
        return Ok(SmallVec::new());
    }

    let request = TargetRequest {
        source,
        description,
        spec,
        candidates: &candidates,
        harmful,
    };
    let view = GameStateView::new(game, player);
    let picked = controller_for(controllers, player)?.choose_targets(&view, &request);

    let mut chosen: SmallVec<[Target; 2]> = SmallVec::new();
    for target in picked {
        if chosen.len() < spec.max && candidates.contains(&target) && !chosen.contains(&target) {
            chosen.push(target);
        }
    }
    for target in candidates.iter() {
        if chosen.len() >= spec.min_required().min(spec.max) {
            break;
        }
        if !chosen.contains(target) {
            chosen.push(*target);
        }
    }

    if !chosen.is_empty() {
        let names: Vec<String> = chosen.iter().map(|t| game.describe_target(*t)).collect();
        game.logger.controller_choice(
            game.player_name(player),
            &format!("chose {} for {}", names.join(", "), description),
        );
    }
    Ok(chosen)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CardDefinition, CardType, Filter, Predicate, TargetController};
    use crate::zones::Zone;
    use std::sync::Arc;

    #[test]
    fn test_candidates_respect_filter_and_source() {
        let mut game = GameState::new();
        let p1 = game.add_player("Player 1", 20);
        let p2 = game.add_player("Player 2", 20);
        let bears = Arc::new(CardDefinition::new("Grizzly Bears", &[CardType::Creature]).with_pt(2, 2));
        let source = game.create_card(bears.clone(), p1, Zone::Battlefield).unwrap();
        let other = game.create_card(bears, p2, Zone::Battlefield).unwrap();

        let spec = TargetSpec::exactly_one(TargetKind::Permanent(
            Filter::permanent().with(Predicate::Another),
        ));
        let ctx = FilterContext::new(Some(source), p1);
        let candidates = legal_candidates(&game, &spec, &ctx);
        assert_eq!(candidates.as_slice(), &[Target::Permanent(other)]);

        let opponents = TargetSpec::exactly_one(TargetKind::Player(TargetController::Opponent));
        assert_eq!(
            legal_candidates(&game, &opponents, &ctx).as_slice(),
            &[Target::Player(p2)]
        );

        let any = TargetSpec::exactly_one(TargetKind::Any(Filter::creature()));
        assert_eq!(legal_candidates(&game, &any, &ctx).len(), 4);
    }

    #[test]
    fn test_targets_become_illegal() {
        let mut game = GameState::new();
        let p1 = game.add_player("Player 1", 20);
        let bears = Arc::new(CardDefinition::new("Grizzly Bears", &[CardType::Creature]).with_pt(2, 2));
        let card = game.create_card(bears, p1, Zone::Battlefield).unwrap();

        let spec = TargetSpec::exactly_one(TargetKind::Permanent(Filter::creature()));
        let ctx = FilterContext::new(None, p1);
        let chosen = [Target::Permanent(card)];
        assert_eq!(still_legal(&game, &spec, &ctx, &chosen).len(), 1);

        game.move_card(card, Zone::Graveyard).unwrap();
        assert!(still_legal(&game, &spec, &ctx, &chosen).is_empty());
    }
}
