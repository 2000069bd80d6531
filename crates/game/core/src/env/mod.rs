//! Traits describing the world a strategy plays in.
//!
//! [`MapOracle`] exposes static terrain; [`World`] layers the live roster and
//! the move/attack commit surface on top of it.
mod map;
mod world;

pub use map::{LayoutError, MapDimensions, MapOracle, StaticTile, TerrainGrid, TerrainKind};
pub use world::World;
