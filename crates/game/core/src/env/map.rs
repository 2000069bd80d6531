use crate::state::Position;

/// Static map oracle exposing immutable terrain layout.
pub trait MapOracle {
    fn dimensions(&self) -> MapDimensions;
    fn tile(&self, position: Position) -> Option<StaticTile>;

    fn contains(&self, position: Position) -> bool {
        self.dimensions().contains(position)
    }

    /// In-bounds and walkable terrain. Occupancy is not considered.
    fn is_passable(&self, position: Position) -> bool {
        self.tile(position).is_some_and(StaticTile::is_passable)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapDimensions {
    pub width: u32,
    pub height: u32,
}

impl MapDimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, position: Position) -> bool {
        position.x >= 0
            && position.y >= 0
            && position.x < self.width as i32
            && position.y < self.height as i32
    }

    /// Row-major index of `position`, or `None` when it lies outside the map.
    pub fn index(&self, position: Position) -> Option<usize> {
        if !self.contains(position) {
            return None;
        }
        Some(position.y as usize * self.width as usize + position.x as usize)
    }

    /// Inverse of [`MapDimensions::index`].
    pub fn position(&self, index: usize) -> Option<Position> {
        if index >= self.area() {
            return None;
        }
        let width = self.width as usize;
        Some(Position::new((index % width) as i32, (index / width) as i32))
    }

    pub const fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Immutable descriptor for a tile in the static layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StaticTile {
    terrain: TerrainKind,
}

impl StaticTile {
    pub const fn new(terrain: TerrainKind) -> Self {
        Self { terrain }
    }

    pub fn terrain(self) -> TerrainKind {
        self.terrain
    }

    pub fn is_passable(self) -> bool {
        self.terrain.is_passable()
    }
}

/// Terrain classes reported by the game engine.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TerrainKind {
    #[default]
    Grass,
    Sand,
    Bridge,
    Water,
    Mountain,
}

impl TerrainKind {
    pub fn is_passable(self) -> bool {
        matches!(
            self,
            TerrainKind::Grass | TerrainKind::Sand | TerrainKind::Bridge
        )
    }

    /// Single-character glyph used by textual map layouts.
    pub fn from_glyph(glyph: char) -> Option<TerrainKind> {
        match glyph {
            '.' => Some(TerrainKind::Grass),
            ',' => Some(TerrainKind::Sand),
            '=' => Some(TerrainKind::Bridge),
            '~' => Some(TerrainKind::Water),
            '^' => Some(TerrainKind::Mountain),
            _ => None,
        }
    }
}

/// Error raised when a textual layout cannot be turned into a grid.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("layout has no rows")]
    Empty,

    #[error("row {row} has width {found}, expected {expected}")]
    Ragged {
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("unknown terrain glyph {glyph:?} at row {row}, column {column}")]
    UnknownGlyph {
        glyph: char,
        row: usize,
        column: usize,
    },
}

/// Row-major terrain array implementing [`MapOracle`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TerrainGrid {
    dimensions: MapDimensions,
    tiles: Vec<TerrainKind>,
}

impl TerrainGrid {
    /// A grid of the given size filled with grass.
    pub fn new(dimensions: MapDimensions) -> Self {
        Self::filled(dimensions, TerrainKind::Grass)
    }

    pub fn filled(dimensions: MapDimensions, terrain: TerrainKind) -> Self {
        Self {
            dimensions,
            tiles: vec![terrain; dimensions.area()],
        }
    }

    /// Parses glyph rows where row `i` holds the cells with `y = i`.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, LayoutError> {
        let first = rows.first().ok_or(LayoutError::Empty)?;
        let width = first.as_ref().chars().count();
        if width == 0 {
            return Err(LayoutError::Empty);
        }

        let mut tiles = Vec::with_capacity(width * rows.len());
        for (row, line) in rows.iter().enumerate() {
            let line = line.as_ref();
            let found = line.chars().count();
            if found != width {
                return Err(LayoutError::Ragged {
                    row,
                    found,
                    expected: width,
                });
            }
            for (column, glyph) in line.chars().enumerate() {
                let terrain = TerrainKind::from_glyph(glyph).ok_or(LayoutError::UnknownGlyph {
                    glyph,
                    row,
                    column,
                })?;
                tiles.push(terrain);
            }
        }

        Ok(Self {
            dimensions: MapDimensions::new(width as u32, rows.len() as u32),
            tiles,
        })
    }

    /// Overwrites one cell. Returns `false` when `position` is out of bounds.
    pub fn set(&mut self, position: Position, terrain: TerrainKind) -> bool {
        match self.dimensions.index(position) {
            Some(index) => {
                self.tiles[index] = terrain;
                true
            }
            None => false,
        }
    }

    pub fn terrain(&self, position: Position) -> Option<TerrainKind> {
        self.dimensions
            .index(position)
            .and_then(|index| self.tiles.get(index).copied())
    }
}

impl MapOracle for TerrainGrid {
    fn dimensions(&self) -> MapDimensions {
        self.dimensions
    }

    fn tile(&self, position: Position) -> Option<StaticTile> {
        self.terrain(position).map(StaticTile::new)
    }
}
