//! What an agent does when its formation has nothing for it.

use game_core::FallbackMode;

use crate::decision::{Command, Situation};
use crate::selector::MoveSelector;

/// Behaviour for agents without a slot and without anything to attack.
pub trait Fallback: Send + Sync {
    fn name(&self) -> &'static str;

    /// Command to issue, or `None` to stay put.
    fn decide(&self, situation: &Situation<'_>) -> Option<Command>;
}

/// Steps toward the enemy's primary anchor.
#[derive(Clone, Copy, Debug, Default)]
pub struct AdvanceOnEnemy;

impl Fallback for AdvanceOnEnemy {
    fn name(&self) -> &'static str {
        "advance_on_enemy"
    }

    fn decide(&self, situation: &Situation<'_>) -> Option<Command> {
        let target = situation.enemy_anchor?;
        let origin = situation.position();
        let direction = MoveSelector::toward(origin, situation.legal_moves, target)?;
        (origin.step(direction).chebyshev(target) < origin.chebyshev(target))
            .then_some(Command::Move(direction))
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct HoldPosition;

impl Fallback for HoldPosition {
    fn name(&self) -> &'static str {
        "hold_position"
    }

    fn decide(&self, _situation: &Situation<'_>) -> Option<Command> {
        None
    }
}

pub fn from_mode(mode: FallbackMode) -> Box<dyn Fallback> {
    match mode {
        FallbackMode::Advance => Box::new(AdvanceOnEnemy),
        FallbackMode::Hold => Box::new(HoldPosition),
    }
}
