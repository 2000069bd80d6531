use crate::action::{AttackTarget, Direction};
use crate::error::CommitError;
use crate::state::{EntityId, Position, StructureState, Team, UnitState};

use super::MapOracle;

/// The game engine as seen by a strategy for one side.
///
/// Queries return fresh snapshots; commits mutate the engine immediately, so a
/// query made after a successful commit observes its effect. Roster order is
/// whatever order the engine reports units in, and callers process units in
/// that order.
pub trait World: MapOracle {
    /// The side this strategy commands.
    fn ally_team(&self) -> Team;

    fn enemy_team(&self) -> Team {
        self.ally_team().opponent()
    }

    fn units(&self, team: Team) -> Vec<UnitState>;
    fn unit(&self, id: EntityId) -> Option<UnitState>;
    fn structures(&self, team: Team) -> Vec<StructureState>;
    fn structure(&self, id: EntityId) -> Option<StructureState>;

    fn chebyshev_distance(&self, a: Position, b: Position) -> u32 {
        a.chebyshev(b)
    }

    /// Direction enumeration, eight moves plus `Stay`.
    fn directions(&self) -> [Direction; 9] {
        Direction::ALL
    }

    fn resolve(&self, from: Position, direction: Direction) -> Position {
        from.step(direction)
    }

    /// Moving directions `unit` may commit right now. Never contains `Stay`.
    fn legal_moves(&self, unit: EntityId) -> Vec<Direction>;

    fn can_move(&self, unit: EntityId, direction: Direction) -> bool {
        self.legal_moves(unit).contains(&direction)
    }

    /// Commits a move and returns the unit's new position.
    fn move_unit(&mut self, unit: EntityId, direction: Direction) -> Result<Position, CommitError>;

    fn can_attack(&self, attacker: EntityId, target: AttackTarget) -> bool;

    fn attack(&mut self, attacker: EntityId, target: AttackTarget) -> Result<(), CommitError>;

    /// Whether `healer` may heal the own agent `target` right now.
    ///
    /// Worlds without healing keep the default.
    fn can_heal(&self, healer: EntityId, target: EntityId) -> bool {
        let _ = (healer, target);
        false
    }

    /// Commits a heal and returns the health restored.
    fn heal(&mut self, healer: EntityId, target: EntityId) -> Result<u32, CommitError> {
        let _ = target;
        Err(CommitError::CannotHeal(healer))
    }
}
