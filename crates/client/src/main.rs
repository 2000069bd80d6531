//! Garrison scenario runner.
//!
//! Loads a scenario from the data directory, lets the tactics layer play both
//! sides of it in a sandbox world for a number of rounds, and logs every
//! decision.
//!
//! # Examples
//!
//! ```bash
//! # Default scenario, 20 rounds, decisions at debug level
//! RUST_LOG=tactics=debug cargo run -p garrison-client
//!
//! # Red side only, 40 rounds
//! cargo run -p garrison-client -- crossing --turns 40 --solo
//! ```

mod config;
mod logging;
mod runner;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use game_content::{ConfigLoader, ContentFactory};
use game_core::{Team, World};
use tactics::Directive;

use config::RunnerConfig;
use runner::Match;

/// Run a tactics scenario in the sandbox world
#[derive(Parser, Debug)]
#[command(name = "garrison")]
#[command(about = "Run a tactics scenario in the sandbox world", long_about = None)]
#[command(version)]
struct Cli {
    /// Scenario name under `<data-dir>/scenarios` (without `.ron`)
    scenario: Option<String>,

    /// Directory holding `tactics.toml`, `maps/` and `scenarios/`
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Tactics TOML to use instead of the data directory's
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Rounds to play
    #[arg(short = 'n', long)]
    turns: Option<u32>,

    /// Only the scenario's ally side plays
    #[arg(long)]
    solo: bool,
}

impl Cli {
    fn apply(self, mut config: RunnerConfig) -> RunnerConfig {
        if let Some(scenario) = self.scenario {
            config.scenario = scenario;
        }
        if let Some(dir) = self.data_dir {
            config.data_dir = dir;
        }
        if self.config.is_some() {
            config.config_path = self.config;
        }
        if let Some(turns) = self.turns {
            config.turns = turns.max(1);
        }
        config.solo |= self.solo;
        config
    }
}

fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = Cli::parse().apply(RunnerConfig::from_env());
    let _guard = logging::setup_logging(config.session_id.as_deref())?;

    tracing::info!("Starting garrison");
    tracing::info!("Scenario: {} ({} rounds)", config.scenario, config.turns);

    let factory = ContentFactory::new(&config.data_dir);
    let tactics_config = match &config.config_path {
        Some(path) => ConfigLoader::load(path)?,
        None => factory.load_config()?,
    };
    let world = factory.load_scenario(&config.scenario)?;
    tracing::info!(
        "Loaded {}: red {} units, blue {} units",
        factory.scenario_path(&config.scenario).display(),
        world.units(Team::Red).len(),
        world.units(Team::Blue).len()
    );

    let mut game = Match::new(world, &tactics_config, config.solo)?;
    let mut commits = 0;
    let mut engagements = 0;
    for _ in 0..config.turns {
        let report = game.play_round();
        commits += report.commits.len();
        engagements += report.count(Directive::Engaging);
        tracing::debug!(
            "round {} done: {} healing, {} on fallback",
            report.round,
            report.count(Directive::Healing),
            report.count(Directive::Fallback)
        );
    }

    println!(
        "{} rounds played: {} commits, {} engagements",
        config.turns, commits, engagements
    );
    for team in [Team::Red, Team::Blue] {
        let units = game.world().units(team);
        println!("{team}: {} units", units.len());
        for unit in units {
            println!("  {} {} at {}", unit.id, unit.class, unit.position);
        }
    }

    tracing::info!("Run complete");
    Ok(())
}
