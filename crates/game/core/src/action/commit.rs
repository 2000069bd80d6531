use std::fmt;

use crate::state::{EntityId, Position};

use super::Direction;

/// What an attack is aimed at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttackTarget {
    Unit(EntityId),
    Structure(EntityId),
}

impl AttackTarget {
    pub fn id(self) -> EntityId {
        match self {
            AttackTarget::Unit(id) | AttackTarget::Structure(id) => id,
        }
    }
}

impl fmt::Display for AttackTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttackTarget::Unit(id) => write!(f, "unit {id}"),
            AttackTarget::Structure(id) => write!(f, "structure {id}"),
        }
    }
}

/// An accepted command, as recorded by a world that keeps a log.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Commit {
    Move {
        unit: EntityId,
        direction: Direction,
        from: Position,
        to: Position,
    },
    Attack {
        attacker: EntityId,
        target: AttackTarget,
    },
    Heal {
        healer: EntityId,
        target: EntityId,
        restored: u32,
    },
}

impl Commit {
    pub fn actor(&self) -> EntityId {
        match self {
            Commit::Move { unit, .. } => *unit,
            Commit::Attack { attacker, .. } => *attacker,
            Commit::Heal { healer, .. } => *healer,
        }
    }
}

impl fmt::Display for Commit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Commit::Move {
                unit,
                direction,
                from,
                to,
            } => write!(f, "{unit} moves {direction} {from} -> {to}"),
            Commit::Attack { attacker, target } => write!(f, "{attacker} attacks {target}"),
            Commit::Heal {
                healer,
                target,
                restored,
            } => write!(f, "{healer} heals {target} for {restored}"),
        }
    }
}
