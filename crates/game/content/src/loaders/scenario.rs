//! Scenario loader.
//!
//! A scenario names a map file (relative to the scenario file) and places
//! structures and agents on it. The result is a [`SandboxWorld`] ready for
//! its first turn.
//!
//! ```ron
//! (
//!     map: "../maps/crossing.ron",
//!     ally: red,
//!     structures: [
//!         (team: red, kind: main_castle, at: (4, 4)),
//!         (team: red, kind: farm, at: (4, 16), spawn: Some((5, 16))),
//!     ],
//!     units: [
//!         (team: red, class: catapult, at: (4, 4)),
//!     ],
//! )
//! ```

use std::path::Path;

use game_core::{Position, SandboxWorld, StructureKind, Team, TerrainGrid, UnitClass};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, MapLoader, read_file};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureSpec {
    pub team: Team,
    pub kind: StructureKind,
    pub at: (i32, i32),
    /// Spawn cell when it differs from the structure's own cell.
    #[serde(default)]
    pub spawn: Option<(i32, i32)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSpec {
    pub team: Team,
    pub class: UnitClass,
    pub at: (i32, i32),
}

/// Scenario file contents before the map is resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioSpec {
    pub map: String,
    /// Side that commits first.
    #[serde(default = "ScenarioSpec::default_ally")]
    pub ally: Team,
    #[serde(default)]
    pub structures: Vec<StructureSpec>,
    #[serde(default)]
    pub units: Vec<UnitSpec>,
}

impl ScenarioSpec {
    fn default_ally() -> Team {
        Team::Red
    }

    /// Places every structure, then every agent, in file order.
    ///
    /// Entity ids follow placement order, so the roster order seen by a
    /// strategy is the order agents are listed in the file.
    pub fn build(&self, terrain: TerrainGrid) -> LoadResult<SandboxWorld> {
        let mut world = SandboxWorld::new(terrain, self.ally);

        for (index, spec) in self.structures.iter().enumerate() {
            let at = Position::new(spec.at.0, spec.at.1);
            let id = world
                .add_structure(spec.team, spec.kind, at)
                .map_err(|e| anyhow::anyhow!("Structure #{} at {}: {}", index, at, e))?;
            if let Some((x, y)) = spec.spawn {
                world
                    .set_spawn(id, Position::new(x, y))
                    .map_err(|e| anyhow::anyhow!("Structure #{} spawn: {}", index, e))?;
            }
        }

        for (index, spec) in self.units.iter().enumerate() {
            let at = Position::new(spec.at.0, spec.at.1);
            world
                .add_unit(spec.team, spec.class, at)
                .map_err(|e| anyhow::anyhow!("Unit #{} ({}) at {}: {}", index, spec.class, at, e))?;
        }

        Ok(world)
    }
}

/// Loader for scenarios from RON files.
pub struct ScenarioLoader;

impl ScenarioLoader {
    pub fn load(path: &Path) -> LoadResult<SandboxWorld> {
        let content = read_file(path)?;
        let spec = Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Invalid scenario {}: {}", path.display(), e))?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        let map_path = base.join(&spec.map);
        let terrain = MapLoader::load(&map_path)?;
        let world = spec.build(terrain)?;

        tracing::debug!(
            "loaded scenario {} ({} structures, {} units)",
            path.display(),
            spec.structures.len(),
            spec.units.len()
        );
        Ok(world)
    }

    pub fn parse(content: &str) -> LoadResult<ScenarioSpec> {
        ron::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse scenario RON: {}", e))
    }
}
