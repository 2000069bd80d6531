pub mod common;
pub mod structure;
pub mod unit;

pub use common::{EntityId, Position, Team};
pub use structure::{AnchorKind, StructureKind, StructureState};
pub use unit::{Capabilities, UnitClass, UnitState};
