//! Commit layer wrapping a [`World`] for one turn.
//!
//! All moves, attacks and heals issued by the tactics layer go through [`Orders`].
//! It keeps the turn's [`OccupancyMap`] in step with accepted moves, and it
//! remembers every rejected command so the same command is never sent twice
//! in one turn.

use std::collections::BTreeSet;

use arrayvec::ArrayVec;
use game_core::{
    AttackTarget, Direction, EntityId, GameError, OccupancyMap, Position, UnitState, World,
};

/// Legal directions for one agent; never more than the nine the world knows.
pub type MoveSet = ArrayVec<Direction, 9>;

/// Result of handing a command to the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed,
    /// The world refused, or refused the identical command earlier this turn.
    Rejected,
}

impl CommitOutcome {
    pub fn is_committed(self) -> bool {
        matches!(self, CommitOutcome::Committed)
    }
}

pub struct Orders<'w, W: World + ?Sized> {
    world: &'w mut W,
    occupancy: OccupancyMap,
    allies: BTreeSet<EntityId>,
    rejected_moves: BTreeSet<(EntityId, Direction)>,
    rejected_attacks: BTreeSet<(EntityId, AttackTarget)>,
    rejected_heals: BTreeSet<(EntityId, EntityId)>,
    committed: usize,
}

impl<'w, W: World + ?Sized> Orders<'w, W> {
    /// Snapshots both rosters into a fresh occupancy map.
    pub fn new(world: &'w mut W) -> Self {
        let allies = world
            .units(world.ally_team())
            .into_iter()
            .map(|unit| unit.id)
            .collect();
        let occupancy = Self::snapshot(&*world);
        Self {
            world,
            occupancy,
            allies,
            rejected_moves: BTreeSet::new(),
            rejected_attacks: BTreeSet::new(),
            rejected_heals: BTreeSet::new(),
            committed: 0,
        }
    }

    fn snapshot(world: &W) -> OccupancyMap {
        let ally = world.units(world.ally_team());
        let enemy = world.units(world.enemy_team());
        OccupancyMap::from_positions(
            world.dimensions(),
            ally.iter()
                .chain(enemy.iter())
                .map(|unit| (unit.id, unit.position)),
        )
    }

    pub fn world(&self) -> &W {
        &*self.world
    }

    pub fn occupancy(&self) -> &OccupancyMap {
        &self.occupancy
    }

    pub fn is_ally(&self, unit: EntityId) -> bool {
        self.allies.contains(&unit)
    }

    /// Own agent standing on `position`, if any.
    pub fn ally_at(&self, position: Position) -> Option<EntityId> {
        self.occupancy
            .occupant(position)
            .filter(|occupant| self.is_ally(*occupant))
    }

    /// Fresh state of a unit; `None` once it has left the roster.
    pub fn unit(&self, unit: EntityId) -> Option<UnitState> {
        self.world.unit(unit)
    }

    /// Directions the world allows for `unit`, minus those already refused this turn.
    pub fn legal_moves(&self, unit: EntityId) -> MoveSet {
        self.world
            .legal_moves(unit)
            .into_iter()
            .filter(|direction| !self.rejected_moves.contains(&(unit, *direction)))
            .take(9)
            .collect()
    }

    pub fn can_attack(&self, attacker: EntityId, target: AttackTarget) -> bool {
        !self.rejected_attacks.contains(&(attacker, target))
            && self.world.can_attack(attacker, target)
    }

    pub fn can_heal(&self, healer: EntityId, target: EntityId) -> bool {
        !self.rejected_heals.contains(&(healer, target)) && self.world.can_heal(healer, target)
    }

    pub fn try_move(&mut self, unit: EntityId, direction: Direction) -> CommitOutcome {
        if self.rejected_moves.contains(&(unit, direction)) {
            return CommitOutcome::Rejected;
        }
        let Some(origin) = self.world.unit(unit).map(|state| state.position) else {
            self.rejected_moves.insert((unit, direction));
            return CommitOutcome::Rejected;
        };

        match self.world.move_unit(unit, direction) {
            Ok(destination) => {
                self.committed += 1;
                if !self.occupancy.relocate(origin, destination) {
                    tracing::warn!(
                        "occupancy desync moving {} {} -> {}; rebuilding",
                        unit,
                        origin,
                        destination
                    );
                    self.occupancy = Self::snapshot(&*self.world);
                }
                tracing::debug!("{} moved {} to {}", unit, direction, destination);
                CommitOutcome::Committed
            }
            Err(err) => {
                tracing::warn!(
                    unit = %unit,
                    %direction,
                    severity = err.severity().as_str(),
                    "move rejected: {}",
                    err
                );
                self.rejected_moves.insert((unit, direction));
                CommitOutcome::Rejected
            }
        }
    }

    pub fn try_attack(&mut self, attacker: EntityId, target: AttackTarget) -> CommitOutcome {
        if self.rejected_attacks.contains(&(attacker, target)) {
            return CommitOutcome::Rejected;
        }
        match self.world.attack(attacker, target) {
            Ok(()) => {
                self.committed += 1;
                tracing::debug!("{} attacked {}", attacker, target);
                CommitOutcome::Committed
            }
            Err(err) => {
                tracing::warn!(
                    unit = %attacker,
                    %target,
                    severity = err.severity().as_str(),
                    "attack rejected: {}",
                    err
                );
                self.rejected_attacks.insert((attacker, target));
                CommitOutcome::Rejected
            }
        }
    }

    pub fn try_heal(&mut self, healer: EntityId, target: EntityId) -> CommitOutcome {
        if self.rejected_heals.contains(&(healer, target)) {
            return CommitOutcome::Rejected;
        }
        match self.world.heal(healer, target) {
            Ok(restored) => {
                self.committed += 1;
                tracing::debug!("{} healed {} for {}", healer, target, restored);
                CommitOutcome::Committed
            }
            Err(err) => {
                tracing::warn!(
                    unit = %healer,
                    %target,
                    severity = err.severity().as_str(),
                    "heal rejected: {}",
                    err
                );
                self.rejected_heals.insert((healer, target));
                CommitOutcome::Rejected
            }
        }
    }

    /// Number of commands the world accepted so far this turn.
    pub fn committed(&self) -> usize {
        self.committed
    }

    pub fn rejected(&self) -> usize {
        self.rejected_moves.len() + self.rejected_attacks.len() + self.rejected_heals.len()
    }
}
