use crate::env::MapDimensions;

use super::{EntityId, Position};

/// Index-addressed position → agent map for one turn.
///
/// Holds at most one agent per cell. Rebuilt from the roster at the start of a
/// turn and kept in step with every committed move.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OccupancyMap {
    dimensions: MapDimensions,
    cells: Vec<Option<EntityId>>,
}

impl OccupancyMap {
    pub fn new(dimensions: MapDimensions) -> Self {
        Self {
            dimensions,
            cells: vec![None; dimensions.area()],
        }
    }

    /// Builds a map from `(agent, position)` pairs. Out-of-bounds entries and
    /// second claimants of a cell are dropped.
    pub fn from_positions<I>(dimensions: MapDimensions, agents: I) -> Self
    where
        I: IntoIterator<Item = (EntityId, Position)>,
    {
        let mut map = Self::new(dimensions);
        for (agent, position) in agents {
            map.place(position, agent);
        }
        map
    }

    pub fn dimensions(&self) -> MapDimensions {
        self.dimensions
    }

    pub fn occupant(&self, position: Position) -> Option<EntityId> {
        self.dimensions
            .index(position)
            .and_then(|index| self.cells[index])
    }

    pub fn is_occupied(&self, position: Position) -> bool {
        self.occupant(position).is_some()
    }

    /// Puts `agent` on an empty in-bounds cell. Returns `false` otherwise.
    pub fn place(&mut self, position: Position, agent: EntityId) -> bool {
        let Some(index) = self.dimensions.index(position) else {
            return false;
        };
        match self.cells[index] {
            Some(existing) => existing == agent,
            None => {
                self.cells[index] = Some(agent);
                true
            }
        }
    }

    pub fn remove(&mut self, position: Position) -> Option<EntityId> {
        let index = self.dimensions.index(position)?;
        self.cells[index].take()
    }

    /// Moves whatever occupies `from` onto an empty `to`.
    ///
    /// Returns `false`, leaving the map untouched, when `from` is empty or `to`
    /// is occupied or out of bounds.
    pub fn relocate(&mut self, from: Position, to: Position) -> bool {
        let (Some(source), Some(target)) = (self.dimensions.index(from), self.dimensions.index(to))
        else {
            return false;
        };
        if source == target {
            return self.cells[source].is_some();
        }
        if self.cells[source].is_none() || self.cells[target].is_some() {
            return false;
        }
        self.cells[target] = self.cells[source].take();
        true
    }

    /// Occupied cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Position, EntityId)> + '_ {
        self.cells.iter().enumerate().filter_map(|(index, cell)| {
            let agent = (*cell)?;
            Some((self.dimensions.position(index)?, agent))
        })
    }

    pub fn len(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
