use crate::state::Position;

/// One of the eight king moves, or staying in place.
///
/// The declaration order is the canonical tie-break order used by every
/// selection in the tactics layer.
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
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
    Stay,
}

impl Direction {
    /// Every direction in tie-break order, `Stay` last.
    pub const ALL: [Direction; 9] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
        Direction::Stay,
    ];

    /// The eight moving directions in tie-break order.
    pub const MOVES: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    pub const fn offset(self) -> (i32, i32) {
        match self {
            Direction::North => (0, 1),
            Direction::NorthEast => (1, 1),
            Direction::East => (1, 0),
            Direction::SouthEast => (1, -1),
            Direction::South => (0, -1),
            Direction::SouthWest => (-1, -1),
            Direction::West => (-1, 0),
            Direction::NorthWest => (-1, 1),
            Direction::Stay => (0, 0),
        }
    }

    /// Position of this direction in [`Direction::ALL`].
    pub const fn ordinal(self) -> usize {
        self as usize
    }

    pub fn from_offset(dx: i32, dy: i32) -> Option<Direction> {
        Self::ALL
            .into_iter()
            .find(|direction| direction.offset() == (dx, dy))
    }

    /// Direction of the single step from `from` to an adjacent (or equal) `to`.
    pub fn between(from: Position, to: Position) -> Option<Direction> {
        let (dx, dy) = from.offset_to(to);
        Self::from_offset(dx, dy)
    }

    pub const fn is_stay(self) -> bool {
        matches!(self, Direction::Stay)
    }
}
