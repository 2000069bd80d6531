//! Common error infrastructure for game-core.
//!
//! Every error raised by a world commit is a [`CommitError`]. Callers in the
//! tactics layer never propagate these; they classify them through
//! [`GameError::severity`] and move on to the next candidate.

use crate::action::Direction;
use crate::state::{EntityId, Position};

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: the world refused this command now; another command may succeed
/// - **Validation**: the command referred to something that does not exist or is not ours
/// - **Internal**: the world's own bookkeeping disagrees with itself
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Examples: destination blocked, target out of range
    Recoverable,

    /// Examples: unit not found, enemy unit commanded
    Validation,

    /// Examples: occupancy map desync
    Internal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal)
    }
}

/// Common trait for all game-core errors.
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Default implementation uses the error type name.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// Reasons a world refuses a move or attack commit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CommitError {
    #[error("unit {0} not found")]
    UnitNotFound(EntityId),

    #[error("target {0} not found")]
    TargetNotFound(EntityId),

    #[error("unit {0} is not controlled by this side")]
    NotOwned(EntityId),

    #[error("unit {0} already moved this turn")]
    AlreadyMoved(EntityId),

    #[error("unit {0} already attacked this turn")]
    AlreadyAttacked(EntityId),

    #[error("destination {destination} is out of bounds")]
    OutOfBounds { destination: Position },

    #[error("destination {destination} is blocked")]
    Blocked { destination: Position },

    #[error("destination {destination} is occupied")]
    Occupied { destination: Position },

    #[error("unit {unit} cannot move {direction}")]
    IllegalMove { unit: EntityId, direction: Direction },

    #[error("unit {attacker} cannot attack {target}: out of range or not hostile")]
    InvalidTarget { attacker: EntityId, target: EntityId },

    #[error("unit {0} has no attack")]
    Unarmed(EntityId),

    #[error("unit {0} cannot heal")]
    CannotHeal(EntityId),

    #[error("unit {0} already healed this turn")]
    AlreadyHealed(EntityId),

    #[error("unit {healer} cannot heal {target}: out of range, hostile or unhurt")]
    InvalidHealTarget { healer: EntityId, target: EntityId },

    #[error("occupancy desync for unit {unit} at {position}")]
    OccupancyDesync { unit: EntityId, position: Position },
}

impl GameError for CommitError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnitNotFound(_) | Self::TargetNotFound(_) | Self::NotOwned(_) => {
                ErrorSeverity::Validation
            }
            Self::OccupancyDesync { .. } => ErrorSeverity::Internal,
            _ => ErrorSeverity::Recoverable,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnitNotFound(_) => "COMMIT_UNIT_NOT_FOUND",
            Self::TargetNotFound(_) => "COMMIT_TARGET_NOT_FOUND",
            Self::NotOwned(_) => "COMMIT_NOT_OWNED",
            Self::AlreadyMoved(_) => "COMMIT_ALREADY_MOVED",
            Self::AlreadyAttacked(_) => "COMMIT_ALREADY_ATTACKED",
            Self::OutOfBounds { .. } => "COMMIT_OUT_OF_BOUNDS",
            Self::Blocked { .. } => "COMMIT_BLOCKED",
            Self::Occupied { .. } => "COMMIT_OCCUPIED",
            Self::IllegalMove { .. } => "COMMIT_ILLEGAL_MOVE",
            Self::InvalidTarget { .. } => "COMMIT_INVALID_TARGET",
            Self::Unarmed(_) => "COMMIT_UNARMED",
            Self::CannotHeal(_) => "COMMIT_CANNOT_HEAL",
            Self::AlreadyHealed(_) => "COMMIT_ALREADY_HEALED",
            Self::InvalidHealTarget { .. } => "COMMIT_INVALID_HEAL_TARGET",
            Self::OccupancyDesync { .. } => "COMMIT_OCCUPANCY_DESYNC",
        }
    }
}
