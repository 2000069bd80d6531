//! Map data loader.
//!
//! Loads pure terrain data from map RON files. Two layouts are accepted:
//! glyph rows (row `i` is `y = i`) or dimensions plus a sparse list of tiles
//! painted over a filled background. Structures and agents are placed by
//! scenario files.

use std::path::Path;

use game_core::{MapDimensions, MapOracle, Position, TerrainGrid, TerrainKind};
use ron::extensions::Extensions;
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Map data structure for RON files (terrain only).
///
/// `dimensions` is parsed with implicit `Some`, so `dimensions: (4, 3)` reads
/// the same as `dimensions: Some((4, 3))`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct MapDataRon {
    dimensions: Option<(u32, u32)>,
    fill: TerrainKind,
    tiles: Vec<(i32, i32, TerrainKind)>,
    rows: Vec<String>,
}

impl MapDataRon {
    fn into_grid(self) -> LoadResult<TerrainGrid> {
        let mut grid = if self.rows.is_empty() {
            let (width, height) = self
                .dimensions
                .ok_or_else(|| anyhow::anyhow!("Map needs either rows or dimensions"))?;
            TerrainGrid::filled(MapDimensions::new(width, height), self.fill)
        } else {
            let grid = TerrainGrid::from_rows(&self.rows[..])?;
            if let Some((width, height)) = self.dimensions {
                let found = grid.dimensions();
                if (found.width, found.height) != (width, height) {
                    anyhow::bail!(
                        "Map rows are {}x{} but dimensions say {}x{}",
                        found.width,
                        found.height,
                        width,
                        height
                    );
                }
            }
            grid
        };

        for (x, y, terrain) in self.tiles {
            let position = Position::new(x, y);
            if !grid.set(position, terrain) {
                anyhow::bail!("Tile {} lies outside the map", position);
            }
        }

        Ok(grid)
    }
}

/// Loader for map data from RON files.
pub struct MapLoader;

impl MapLoader {
    pub fn load(path: &Path) -> LoadResult<TerrainGrid> {
        let content = read_file(path)?;
        Self::parse(&content).map_err(|e| anyhow::anyhow!("Invalid map {}: {}", path.display(), e))
    }

    pub fn parse(content: &str) -> LoadResult<TerrainGrid> {
        let data: MapDataRon = ron::Options::default()
            .with_default_extension(Extensions::IMPLICIT_SOME)
            .from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse map RON: {}", e))?;
        data.into_grid()
    }
}
