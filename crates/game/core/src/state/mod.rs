//! Snapshots of agents and structures, plus the per-turn occupancy map.
//!
//! Everything here is a derived view of what the engine reports. Nothing is
//! carried across turns.
mod occupancy;
pub mod types;

pub use occupancy::OccupancyMap;
pub use types::{
    AnchorKind, Capabilities, EntityId, Position, StructureKind, StructureState, Team, UnitClass,
    UnitState,
};
