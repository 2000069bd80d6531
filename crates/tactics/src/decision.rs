//! Per-agent decision vocabulary.
//!
//! Decisions are made from a [`Situation`] snapshot without touching the
//! world, then handed to [`crate::orders::Orders`] for execution.

use game_core::{AttackTarget, Direction, EntityId, Position, StructureState, UnitState};

use crate::formation::{Anchor, Slot};

/// Everything one agent's decision depends on.
#[derive(Clone, Copy, Debug)]
pub struct Situation<'a> {
    pub unit: UnitState,
    /// Anchor whose formation the agent belongs to.
    pub anchor: Anchor,
    /// Directions the world currently allows, minus those refused this turn.
    pub legal_moves: &'a [Direction],
    /// Enemy agents in roster order.
    pub enemies: &'a [UnitState],
    /// Enemy agents the unit may attack right now, in roster order.
    pub attackable_units: &'a [UnitState],
    /// Enemy structures the unit may attack right now, primary first.
    pub attackable_structures: &'a [StructureState],
    /// Own agents the unit may heal right now, in roster order.
    pub healable_allies: &'a [UnitState],
    /// Slot assigned this turn and whether the agent already holds it.
    pub slot: Option<(Slot, bool)>,
    /// Position of the enemy's primary anchor, when one is known.
    pub enemy_anchor: Option<Position>,
}

impl Situation<'_> {
    pub fn position(&self) -> Position {
        self.unit.position
    }

    pub fn anchor_distance(&self) -> u32 {
        self.anchor.distance(self.unit.position)
    }

    pub fn on_spawn(&self) -> bool {
        self.unit.position == self.anchor.spawn
    }

    /// Assigned slot the agent is not standing on yet.
    pub fn pending_slot(&self) -> Option<Slot> {
        match self.slot {
            Some((slot, false)) => Some(slot),
            _ => None,
        }
    }

    /// Attackable enemy agent closest to the anchor; roster order breaks ties.
    pub fn closest_attackable_to_anchor(&self) -> Option<AttackTarget> {
        let mut best: Option<(&UnitState, u32)> = None;
        for enemy in self.attackable_units {
            let distance = self.anchor.distance(enemy.position);
            if best.is_none_or(|(_, best_distance)| distance < best_distance) {
                best = Some((enemy, distance));
            }
        }
        best.map(|(enemy, _)| AttackTarget::Unit(enemy.id))
            .or_else(|| {
                self.attackable_structures
                    .first()
                    .map(|structure| AttackTarget::Structure(structure.id))
            })
    }

    /// Healable ally with the lowest share of its maximum health.
    pub fn most_wounded_ally(&self) -> Option<EntityId> {
        let mut best: Option<&UnitState> = None;
        for ally in self.healable_allies {
            if !ally.is_wounded() {
                continue;
            }
            if best.is_none_or(|current| ally.more_wounded_than(current)) {
                best = Some(ally);
            }
        }
        best.map(|ally| ally.id)
    }
}

/// What the agent should send to the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Move(Direction),
    Attack(AttackTarget),
    Heal(EntityId),
}

/// Which rule produced a decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Directive {
    OnSpawn,
    Retreating,
    Repositioning,
    Engaging,
    Healing,
    AdvancingToSlot,
    Fallback,
    Idle,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Decision {
    pub directive: Directive,
    pub command: Option<Command>,
}

impl Decision {
    pub const IDLE: Decision = Decision {
        directive: Directive::Idle,
        command: None,
    };

    pub fn moving(directive: Directive, direction: Direction) -> Self {
        Self {
            directive,
            command: Some(Command::Move(direction)),
        }
    }

    pub fn attacking(directive: Directive, target: AttackTarget) -> Self {
        Self {
            directive,
            command: Some(Command::Attack(target)),
        }
    }

    pub fn healing(target: EntityId) -> Self {
        Self {
            directive: Directive::Healing,
            command: Some(Command::Heal(target)),
        }
    }
}
