//! Runner configuration structures and loaders.
use std::env;
use std::path::PathBuf;

/// Settings of one scenario run, before command-line overrides.
#[derive(Clone, Debug)]
pub struct RunnerConfig {
    pub data_dir: PathBuf,
    pub scenario: String,
    /// Tactics TOML used instead of `<data_dir>/tactics.toml`.
    pub config_path: Option<PathBuf>,
    pub turns: u32,
    /// Only the scenario's ally side plays; the other side stands still.
    pub solo: bool,
    pub session_id: Option<String>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(Self::DEFAULT_DATA_DIR),
            scenario: Self::DEFAULT_SCENARIO.to_string(),
            config_path: None,
            turns: Self::DEFAULT_TURNS,
            solo: false,
            session_id: None,
        }
    }
}

impl RunnerConfig {
    pub const DEFAULT_DATA_DIR: &'static str = "data";
    pub const DEFAULT_SCENARIO: &'static str = "crossing";
    pub const DEFAULT_TURNS: u32 = 20;

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `GARRISON_DATA_DIR` - Directory holding `tactics.toml` and scenarios (default: `data`)
    /// - `GARRISON_SCENARIO` - Scenario name under `scenarios/` (default: `crossing`)
    /// - `GARRISON_CONFIG` - Tactics TOML overriding the data directory's
    /// - `GARRISON_TURNS` - Rounds to play (default: 20)
    /// - `GARRISON_SOLO` - Only the ally side plays (default: false)
    /// - `GARRISON_SESSION_ID` - Log session name (default: auto-generated)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = env::var("GARRISON_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Ok(scenario) = env::var("GARRISON_SCENARIO") {
            config.scenario = scenario;
        }
        config.config_path = env::var("GARRISON_CONFIG").ok().map(PathBuf::from);
        if let Some(turns) = read_env::<u32>("GARRISON_TURNS") {
            config.turns = turns.max(1);
        }
        if let Some(solo) = read_env::<bool>("GARRISON_SOLO") {
            config.solo = solo;
        }
        config.session_id = env::var("GARRISON_SESSION_ID").ok();

        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
