//! Content factory for loading tactics data from a data directory.

use std::path::{Path, PathBuf};

use game_core::{SandboxWorld, TacticsConfig};

use crate::loaders::{ConfigLoader, LoadResult, ScenarioLoader};

/// Loads configuration and scenarios from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── tactics.toml
/// ├── maps/
/// │   └── crossing.ron
/// └── scenarios/
///     └── crossing.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub const CONFIG_FILE: &'static str = "tactics.toml";
    pub const SCENARIO_DIR: &'static str = "scenarios";

    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Loads `tactics.toml`, or the defaults when the file does not exist.
    pub fn load_config(&self) -> LoadResult<TacticsConfig> {
        let path = self.data_dir.join(Self::CONFIG_FILE);
        if !path.exists() {
            tracing::debug!("no {} found, using default tactics config", path.display());
            return Ok(TacticsConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Loads `scenarios/<name>.ron`.
    pub fn load_scenario(&self, name: &str) -> LoadResult<SandboxWorld> {
        ScenarioLoader::load(&self.scenario_path(name))
    }

    pub fn scenario_path(&self, name: &str) -> PathBuf {
        self.data_dir
            .join(Self::SCENARIO_DIR)
            .join(format!("{name}.ron"))
    }
}
