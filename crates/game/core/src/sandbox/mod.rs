//! Deterministic in-memory world.
//!
//! `SandboxWorld` plays the engine's role for tests and the scenario runner:
//! it owns terrain, both rosters and structures, enforces one move and one
//! attack or heal per unit per turn, and records every accepted commit.
//! Attacks deal no damage; health only changes through heals and
//! [`SandboxWorld::set_health`].

use std::collections::BTreeSet;

use crate::action::{AttackTarget, Commit, Direction};
use crate::env::{MapDimensions, MapOracle, StaticTile, TerrainGrid, World};
use crate::error::CommitError;
use crate::state::{
    EntityId, Position, StructureKind, StructureState, Team, UnitClass, UnitState,
};

#[derive(Clone, Debug)]
pub struct SandboxWorld {
    terrain: TerrainGrid,
    ally: Team,
    units: Vec<UnitState>,
    structures: Vec<StructureState>,
    next_id: u32,
    turn: u64,
    moved: BTreeSet<EntityId>,
    attacked: BTreeSet<EntityId>,
    healed: BTreeSet<EntityId>,
    log: Vec<Commit>,
}

impl SandboxWorld {
    pub fn new(terrain: TerrainGrid, ally: Team) -> Self {
        Self {
            terrain,
            ally,
            units: Vec::new(),
            structures: Vec::new(),
            next_id: 1,
            turn: 0,
            moved: BTreeSet::new(),
            attacked: BTreeSet::new(),
            healed: BTreeSet::new(),
            log: Vec::new(),
        }
    }

    pub fn terrain(&self) -> &TerrainGrid {
        &self.terrain
    }

    pub fn turn(&self) -> u64 {
        self.turn
    }

    /// Switches the side that commits. Used to let two strategies alternate.
    pub fn set_ally_team(&mut self, team: Team) {
        self.ally = team;
    }

    /// Starts a new turn: every unit may move and attack once again.
    pub fn begin_turn(&mut self) {
        self.turn += 1;
        self.moved.clear();
        self.attacked.clear();
        self.healed.clear();
    }

    /// Accepted commits since construction or the last [`SandboxWorld::take_log`].
    pub fn log(&self) -> &[Commit] {
        &self.log
    }

    pub fn take_log(&mut self) -> Vec<Commit> {
        std::mem::take(&mut self.log)
    }

    fn allocate_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn add_structure(
        &mut self,
        team: Team,
        kind: StructureKind,
        position: Position,
    ) -> Result<EntityId, CommitError> {
        if !self.terrain.contains(position) {
            return Err(CommitError::OutOfBounds {
                destination: position,
            });
        }
        if self.structure_at(position).is_some() {
            return Err(CommitError::Occupied {
                destination: position,
            });
        }
        let id = self.allocate_id();
        self.structures
            .push(StructureState::new(id, position, kind, team));
        Ok(id)
    }

    /// Moves a structure's spawn cell away from its own position.
    pub fn set_spawn(&mut self, structure: EntityId, spawn: Position) -> Result<(), CommitError> {
        let state = self
            .structures
            .iter_mut()
            .find(|state| state.id == structure)
            .ok_or(CommitError::TargetNotFound(structure))?;
        state.spawn = spawn;
        Ok(())
    }

    /// Places a unit of `team` on `position`, bypassing turn limits.
    pub fn add_unit(
        &mut self,
        team: Team,
        class: UnitClass,
        position: Position,
    ) -> Result<EntityId, CommitError> {
        self.check_enterable(team, position)?;
        let id = self.allocate_id();
        self.units.push(UnitState::new(id, position, class, team));
        Ok(id)
    }

    /// Spawns a unit on a structure's spawn cell.
    pub fn spawn_unit(
        &mut self,
        structure: EntityId,
        class: UnitClass,
    ) -> Result<EntityId, CommitError> {
        let state = self
            .structures
            .iter()
            .find(|state| state.id == structure)
            .copied()
            .ok_or(CommitError::TargetNotFound(structure))?;
        self.add_unit(state.team, class, state.spawn)
    }

    pub fn remove_unit(&mut self, unit: EntityId) -> Option<UnitState> {
        let index = self.units.iter().position(|state| state.id == unit)?;
        Some(self.units.remove(index))
    }

    /// Overrides a unit's health, capped at its class maximum.
    pub fn set_health(&mut self, unit: EntityId, health: u32) -> Result<(), CommitError> {
        let state = self
            .units
            .iter_mut()
            .find(|state| state.id == unit)
            .ok_or(CommitError::UnitNotFound(unit))?;
        *state = state.with_health(health);
        Ok(())
    }

    pub fn unit_at(&self, position: Position) -> Option<&UnitState> {
        self.units.iter().find(|state| state.position == position)
    }

    pub fn structure_at(&self, position: Position) -> Option<&StructureState> {
        self.structures
            .iter()
            .find(|state| state.position == position)
    }

    fn check_enterable(&self, team: Team, destination: Position) -> Result<(), CommitError> {
        if !self.terrain.contains(destination) {
            return Err(CommitError::OutOfBounds { destination });
        }
        if !self.terrain.is_passable(destination) {
            return Err(CommitError::Blocked { destination });
        }
        if self
            .structure_at(destination)
            .is_some_and(|structure| structure.team != team)
        {
            return Err(CommitError::Blocked { destination });
        }
        if self.unit_at(destination).is_some() {
            return Err(CommitError::Occupied { destination });
        }
        Ok(())
    }

    fn commanded_unit(&self, unit: EntityId) -> Result<&UnitState, CommitError> {
        let state = self
            .units
            .iter()
            .find(|state| state.id == unit)
            .ok_or(CommitError::UnitNotFound(unit))?;
        if state.team != self.ally {
            return Err(CommitError::NotOwned(unit));
        }
        Ok(state)
    }

    fn check_move(&self, unit: EntityId, direction: Direction) -> Result<Position, CommitError> {
        let state = self.commanded_unit(unit)?;
        if self.moved.contains(&unit) {
            return Err(CommitError::AlreadyMoved(unit));
        }
        if direction.is_stay() {
            return Err(CommitError::IllegalMove { unit, direction });
        }
        let destination = state.position.step(direction);
        self.check_enterable(state.team, destination)?;
        Ok(destination)
    }

    fn check_attack(&self, attacker: EntityId, target: AttackTarget) -> Result<(), CommitError> {
        let state = self.commanded_unit(attacker)?;
        if self.attacked.contains(&attacker) {
            return Err(CommitError::AlreadyAttacked(attacker));
        }
        if !state.class.can_engage() {
            return Err(CommitError::Unarmed(attacker));
        }
        let (team, position) = match target {
            AttackTarget::Unit(id) => self
                .units
                .iter()
                .find(|unit| unit.id == id)
                .map(|unit| (unit.team, unit.position)),
            AttackTarget::Structure(id) => self
                .structures
                .iter()
                .find(|structure| structure.id == id)
                .map(|structure| (structure.team, structure.position)),
        }
        .ok_or(CommitError::TargetNotFound(target.id()))?;

        if team == state.team || state.position.chebyshev(position) > state.class.attack_range() {
            return Err(CommitError::InvalidTarget {
                attacker,
                target: target.id(),
            });
        }
        Ok(())
    }

    fn check_heal(&self, healer: EntityId, target: EntityId) -> Result<(), CommitError> {
        let state = self.commanded_unit(healer)?;
        if !state.class.can_heal() {
            return Err(CommitError::CannotHeal(healer));
        }
        if self.healed.contains(&healer) {
            return Err(CommitError::AlreadyHealed(healer));
        }
        let patient = self
            .units
            .iter()
            .find(|unit| unit.id == target)
            .ok_or(CommitError::TargetNotFound(target))?;
        if patient.team != state.team
            || patient.id == healer
            || !patient.is_wounded()
            || state.position.chebyshev(patient.position) > state.class.heal_range()
        {
            return Err(CommitError::InvalidHealTarget { healer, target });
        }
        Ok(())
    }
}

impl MapOracle for SandboxWorld {
    fn dimensions(&self) -> MapDimensions {
        self.terrain.dimensions()
    }

    fn tile(&self, position: Position) -> Option<StaticTile> {
        self.terrain.tile(position)
    }
}

impl World for SandboxWorld {
    fn ally_team(&self) -> Team {
        self.ally
    }

    fn units(&self, team: Team) -> Vec<UnitState> {
        self.units
            .iter()
            .filter(|unit| unit.team == team)
            .copied()
            .collect()
    }

    fn unit(&self, id: EntityId) -> Option<UnitState> {
        self.units.iter().find(|unit| unit.id == id).copied()
    }

    fn structures(&self, team: Team) -> Vec<StructureState> {
        self.structures
            .iter()
            .filter(|structure| structure.team == team)
            .copied()
            .collect()
    }

    fn structure(&self, id: EntityId) -> Option<StructureState> {
        self.structures
            .iter()
            .find(|structure| structure.id == id)
            .copied()
    }

    fn legal_moves(&self, unit: EntityId) -> Vec<Direction> {
        Direction::MOVES
            .into_iter()
            .filter(|direction| self.check_move(unit, *direction).is_ok())
            .collect()
    }

    fn move_unit(&mut self, unit: EntityId, direction: Direction) -> Result<Position, CommitError> {
        let destination = self.check_move(unit, direction)?;
        let state = self
            .units
            .iter_mut()
            .find(|state| state.id == unit)
            .ok_or(CommitError::UnitNotFound(unit))?;
        let from = state.position;
        state.position = destination;
        self.moved.insert(unit);
        self.log.push(Commit::Move {
            unit,
            direction,
            from,
            to: destination,
        });
        Ok(destination)
    }

    fn can_attack(&self, attacker: EntityId, target: AttackTarget) -> bool {
        self.check_attack(attacker, target).is_ok()
    }

    fn attack(&mut self, attacker: EntityId, target: AttackTarget) -> Result<(), CommitError> {
        self.check_attack(attacker, target)?;
        self.attacked.insert(attacker);
        self.log.push(Commit::Attack { attacker, target });
        Ok(())
    }

    fn can_heal(&self, healer: EntityId, target: EntityId) -> bool {
        self.check_heal(healer, target).is_ok()
    }

    fn heal(&mut self, healer: EntityId, target: EntityId) -> Result<u32, CommitError> {
        self.check_heal(healer, target)?;
        let amount = self
            .unit(healer)
            .map(|state| state.class.heal_amount())
            .ok_or(CommitError::UnitNotFound(healer))?;
        let patient = self
            .units
            .iter_mut()
            .find(|unit| unit.id == target)
            .ok_or(CommitError::TargetNotFound(target))?;
        let before = patient.health;
        *patient = patient.with_health(before.saturating_add(amount));
        let restored = patient.health - before;
        self.healed.insert(healer);
        self.log.push(Commit::Heal {
            healer,
            target,
            restored,
        });
        Ok(restored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::TerrainKind;

    fn open_world() -> SandboxWorld {
        SandboxWorld::new(TerrainGrid::new(MapDimensions::new(5, 5)), Team::Red)
    }

    #[test]
    fn units_move_once_per_turn() {
        let mut world = open_world();
        let unit = world
            .add_unit(Team::Red, UnitClass::Knight, Position::new(2, 2))
            .unwrap();

        assert_eq!(world.move_unit(unit, Direction::North), Ok(Position::new(2, 3)));
        assert_eq!(
            world.move_unit(unit, Direction::North),
            Err(CommitError::AlreadyMoved(unit))
        );
        assert!(world.legal_moves(unit).is_empty());

        world.begin_turn();
        assert_eq!(world.legal_moves(unit).len(), 8);
        assert_eq!(world.log().len(), 1);
    }

    #[test]
    fn legal_moves_respect_terrain_units_and_bounds() {
        let mut world = open_world();
        let unit = world
            .add_unit(Team::Red, UnitClass::Knight, Position::new(0, 0))
            .unwrap();
        world
            .add_unit(Team::Blue, UnitClass::Knight, Position::new(1, 0))
            .unwrap();
        let mut terrain = world.terrain().clone();
        terrain.set(Position::new(0, 1), TerrainKind::Water);
        world.terrain = terrain;

        assert_eq!(world.legal_moves(unit), vec![Direction::NorthEast]);
        assert!(!world.can_move(unit, Direction::Stay));
    }

    #[test]
    fn own_structure_cells_are_enterable_enemy_ones_are_not() {
        let mut world = open_world();
        let castle = world
            .add_structure(Team::Red, StructureKind::MainCastle, Position::new(2, 2))
            .unwrap();
        world
            .add_structure(Team::Blue, StructureKind::MainCastle, Position::new(4, 4))
            .unwrap();
        let spawned = world.spawn_unit(castle, UnitClass::Healer).unwrap();
        assert_eq!(world.unit(spawned).map(|u| u.position), Some(Position::new(2, 2)));

        let runner = world
            .add_unit(Team::Red, UnitClass::Knight, Position::new(3, 3))
            .unwrap();
        assert_eq!(
            world.move_unit(runner, Direction::NorthEast),
            Err(CommitError::Blocked {
                destination: Position::new(4, 4)
            })
        );
    }

    #[test]
    fn attacks_need_range_and_a_hostile_target() {
        let mut world = open_world();
        let catapult = world
            .add_unit(Team::Red, UnitClass::Catapult, Position::new(0, 0))
            .unwrap();
        let healer = world
            .add_unit(Team::Red, UnitClass::Healer, Position::new(0, 1))
            .unwrap();
        let friend = world
            .add_unit(Team::Red, UnitClass::Knight, Position::new(1, 1))
            .unwrap();
        let far = world
            .add_unit(Team::Blue, UnitClass::Knight, Position::new(4, 4))
            .unwrap();

        assert!(world.can_attack(catapult, AttackTarget::Unit(far)));
        assert!(!world.can_attack(catapult, AttackTarget::Unit(friend)));
        assert_eq!(
            world.attack(healer, AttackTarget::Unit(far)),
            Err(CommitError::Unarmed(healer))
        );
        assert_eq!(
            world.attack(friend, AttackTarget::Unit(far)),
            Err(CommitError::InvalidTarget {
                attacker: friend,
                target: far
            })
        );

        world.attack(catapult, AttackTarget::Unit(far)).unwrap();
        assert_eq!(
            world.attack(catapult, AttackTarget::Unit(far)),
            Err(CommitError::AlreadyAttacked(catapult))
        );
    }

    #[test]
    fn heals_restore_wounded_allies_in_reach_once_per_turn() {
        let mut world = open_world();
        let healer = world
            .add_unit(Team::Red, UnitClass::Healer, Position::new(0, 0))
            .unwrap();
        let warrior = world
            .add_unit(Team::Red, UnitClass::Warrior, Position::new(2, 2))
            .unwrap();
        let far = world
            .add_unit(Team::Red, UnitClass::Warrior, Position::new(4, 4))
            .unwrap();
        let enemy = world
            .add_unit(Team::Blue, UnitClass::Knight, Position::new(1, 0))
            .unwrap();

        // Unhurt allies cannot be healed.
        assert!(!world.can_heal(healer, warrior));

        world.set_health(warrior, 28).unwrap();
        world.set_health(far, 1).unwrap();
        world.set_health(enemy, 1).unwrap();
        assert!(!world.can_heal(healer, far));
        assert!(!world.can_heal(healer, enemy));
        assert_eq!(
            world.heal(warrior, far),
            Err(CommitError::CannotHeal(warrior))
        );

        assert_eq!(world.heal(healer, warrior), Ok(2));
        assert_eq!(world.unit(warrior).map(|u| u.health), Some(30));
        assert_eq!(world.log().last().map(Commit::actor), Some(healer));

        world.set_health(warrior, 10).unwrap();
        assert_eq!(
            world.heal(healer, warrior),
            Err(CommitError::AlreadyHealed(healer))
        );
        world.begin_turn();
        assert_eq!(world.heal(healer, warrior), Ok(5));
    }

    #[test]
    fn enemy_units_cannot_be_commanded() {
        let mut world = open_world();
        let enemy = world
            .add_unit(Team::Blue, UnitClass::Knight, Position::new(2, 2))
            .unwrap();
        assert!(world.legal_moves(enemy).is_empty());
        assert_eq!(
            world.move_unit(enemy, Direction::North),
            Err(CommitError::NotOwned(enemy))
        );
        world.set_ally_team(Team::Blue);
        assert!(world.move_unit(enemy, Direction::North).is_ok());
    }
}
