//! Grid, roster and world-interface types shared by the tactics layer.
//!
//! `game-core` is pure: it defines what a strategy can observe (terrain,
//! agents, structures), the [`World`] commit surface it acts through, and the
//! [`TacticsConfig`] that tunes it. [`sandbox::SandboxWorld`] is an in-memory
//! [`World`] for tests and offline runs.
pub mod action;
pub mod config;
pub mod env;
pub mod error;
pub mod sandbox;
pub mod state;

pub use action::{AttackTarget, Commit, Direction};
pub use config::{
    ConfigError, DistanceBand, FallbackMode, FormationConfig, RingOverride, TacticsConfig,
};
pub use env::{
    LayoutError, MapDimensions, MapOracle, StaticTile, TerrainGrid, TerrainKind, World,
};
pub use error::{CommitError, ErrorSeverity, GameError};
pub use sandbox::SandboxWorld;
pub use state::{
    AnchorKind, Capabilities, EntityId, OccupancyMap, Position, StructureKind, StructureState,
    Team, UnitClass, UnitState,
};
