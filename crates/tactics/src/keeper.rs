//! Decisions for agents that hold formation slots.
//!
//! Slot keepers step off the spawn cell, then act on the first rule that
//! yields a command: support agents heal the most wounded ally in reach,
//! armed agents hit whatever is in reach, everyone walks to an assigned slot,
//! and agents without a slot fall back on the strategy's default.

use game_core::{Capabilities, Direction};

use crate::decision::{Decision, Directive, Situation};
use crate::fallback::Fallback;
use crate::selector::{MoveSelector, Objective};

/// One step that gets strictly closer to the agent's pending slot.
pub fn advance_to_slot(situation: &Situation<'_>) -> Option<Direction> {
    let slot = situation.pending_slot()?;
    let origin = situation.position();
    let direction = MoveSelector::toward(origin, situation.legal_moves, slot.position)?;
    (origin.step(direction).chebyshev(slot.position) < origin.chebyshev(slot.position))
        .then_some(direction)
}

pub struct SlotKeeper;

impl SlotKeeper {
    pub fn decide(situation: &Situation<'_>, fallback: &dyn Fallback) -> Decision {
        let origin = situation.position();
        let anchor = situation.anchor.position;

        if situation.on_spawn() {
            if let Some(direction) = MoveSelector::select(
                origin,
                situation.legal_moves,
                Objective::Maximize,
                |p| p.chebyshev(anchor),
            ) {
                return Decision::moving(Directive::OnSpawn, direction);
            }
        }

        if situation.unit.class.has(Capabilities::SUPPORT) {
            if let Some(target) = situation.most_wounded_ally() {
                return Decision::healing(target);
            }
        }

        if let Some(target) = situation.closest_attackable_to_anchor() {
            return Decision::attacking(Directive::Engaging, target);
        }

        match situation.slot {
            Some((_, true)) => Decision::IDLE,
            Some((_, false)) => advance_to_slot(situation)
                .map(|direction| Decision::moving(Directive::AdvancingToSlot, direction))
                .unwrap_or(Decision::IDLE),
            None => match fallback.decide(situation) {
                Some(command) => Decision {
                    directive: Directive::Fallback,
                    command: Some(command),
                },
                None => Decision::IDLE,
            },
        }
    }
}
