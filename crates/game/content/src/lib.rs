//! Data-driven content for the tactics layer.
//!
//! Provides loaders for RON/TOML data files:
//! - Tactics configuration (TOML)
//! - Map layouts (RON, either glyph rows or sparse tile lists)
//! - Scenarios placing structures and agents on a map (RON)
//!
//! Loaders produce `game-core` values directly; a scenario becomes a ready
//! [`game_core::SandboxWorld`].

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{
    ConfigLoader, ContentFactory, LoadResult, MapLoader, ScenarioLoader, ScenarioSpec,
    StructureSpec, UnitSpec,
};
