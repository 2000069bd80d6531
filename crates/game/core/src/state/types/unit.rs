//! Agent classes and their capability tags.
//!
//! Behaviour dispatch in the tactics layer reads [`Capabilities`], never the
//! class name, so a new class only needs a row in [`UnitClass::capabilities`].

use bitflags::bitflags;

use super::{EntityId, Position, Team};

bitflags! {
    /// What an agent class is able to do on the battlefield.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct Capabilities: u8 {
        /// Attacks adjacent targets.
        const MELEE       = 1 << 0;
        /// Attacks from beyond adjacency.
        const RANGED      = 1 << 1;
        /// Effective against structures.
        const SIEGE       = 1 << 2;
        /// Non-combat helper (healing).
        const SUPPORT     = 1 << 3;
        /// Holds the outer ring of a formation.
        const FRONT_LINE  = 1 << 4;
        /// Keeps a distance band around its anchor instead of holding a slot.
        const BAND_KEEPER = 1 << 5;
    }
}

/// Agent class as reported by the game engine.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum UnitClass {
    Warrior,
    Swordsman,
    Knight,
    Catapult,
    Healer,
}

impl UnitClass {
    pub const fn capabilities(self) -> Capabilities {
        match self {
            UnitClass::Warrior | UnitClass::Swordsman => {
                Capabilities::MELEE.union(Capabilities::FRONT_LINE)
            }
            UnitClass::Knight => Capabilities::MELEE,
            UnitClass::Catapult => Capabilities::RANGED
                .union(Capabilities::SIEGE)
                .union(Capabilities::BAND_KEEPER),
            UnitClass::Healer => Capabilities::SUPPORT,
        }
    }

    /// Chebyshev reach of the class's attack; zero for classes that cannot attack.
    pub const fn attack_range(self) -> u32 {
        match self {
            UnitClass::Warrior | UnitClass::Swordsman | UnitClass::Knight => 1,
            UnitClass::Catapult => 4,
            UnitClass::Healer => 0,
        }
    }

    pub const fn max_health(self) -> u32 {
        match self {
            UnitClass::Warrior => 30,
            UnitClass::Swordsman => 20,
            UnitClass::Knight => 25,
            UnitClass::Catapult => 15,
            UnitClass::Healer => 10,
        }
    }

    /// Chebyshev reach of the class's heal; zero for classes that cannot heal.
    pub const fn heal_range(self) -> u32 {
        match self {
            UnitClass::Healer => 2,
            _ => 0,
        }
    }

    /// Health one heal restores, before capping at the target's maximum.
    pub const fn heal_amount(self) -> u32 {
        match self {
            UnitClass::Healer => 5,
            _ => 0,
        }
    }

    pub const fn can_heal(self) -> bool {
        self.heal_range() > 0
    }

    /// True when agents of this class can threaten others.
    pub const fn can_engage(self) -> bool {
        self.attack_range() > 0
    }

    pub fn has(self, capability: Capabilities) -> bool {
        self.capabilities().contains(capability)
    }
}

/// Snapshot of one agent as observed at query time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitState {
    pub id: EntityId,
    pub position: Position,
    pub class: UnitClass,
    pub team: Team,
    pub health: u32,
}

impl UnitState {
    /// Creates a unit at full health for its class.
    pub fn new(id: EntityId, position: Position, class: UnitClass, team: Team) -> Self {
        Self {
            id,
            position,
            class,
            team,
            health: class.max_health(),
        }
    }

    #[must_use]
    pub fn with_health(mut self, health: u32) -> Self {
        self.health = health.min(self.class.max_health());
        self
    }

    pub fn is_wounded(&self) -> bool {
        self.health < self.class.max_health()
    }

    /// Orders by remaining health ratio without floating point.
    ///
    /// Returns `true` when `self` has a strictly lower share of its maximum
    /// health than `other`.
    pub fn more_wounded_than(&self, other: &UnitState) -> bool {
        u64::from(self.health) * u64::from(other.class.max_health())
            < u64::from(other.health) * u64::from(self.class.max_health())
    }
}
