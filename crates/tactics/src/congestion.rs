//! Spawn-cell congestion resolution.
//!
//! When a structure's spawn cell is covered by our own agents, nothing can be
//! spawned until the blob of agents around it shuffles outward. The resolver
//! finds a chain of own agents from the spawn cell to the edge of the blob and
//! pushes that chain out by one cell: the outermost agent steps into free
//! ground, then each agent behind it steps into the cell just vacated, ending
//! with the spawn cell empty.
//!
//! Each agent moves at most once. A refused step ends the pass: the moves
//! already made stand, and the next turn searches again from the new layout.

use std::collections::{BTreeMap, BTreeSet};

use game_core::{Direction, MapOracle, Position, World};

use crate::orders::{CommitOutcome, Orders};

/// What one resolver pass achieved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// Nothing stood on the spawn cell.
    AlreadyClear,
    /// The blob has no exit this turn; try again next turn.
    NoPath,
    /// An exit exists but the outermost agent could not step out.
    Stuck { path: Vec<Position> },
    /// Only the first `moved` chain steps were made; the spawn cell is still covered.
    Partial { path: Vec<Position>, moved: usize },
    /// The whole chain moved and the spawn cell is empty.
    Cleared { path: Vec<Position> },
}

impl Resolution {
    pub fn label(&self) -> &'static str {
        match self {
            Resolution::AlreadyClear => "already_clear",
            Resolution::NoPath => "no_path",
            Resolution::Stuck { .. } => "stuck",
            Resolution::Partial { .. } => "partial",
            Resolution::Cleared { .. } => "cleared",
        }
    }
}

/// Finds a path `[spawn, c1, ..., cK]` through formation cells such that `cK`
/// touches an in-bounds, passable cell outside the formation.
///
/// Depth-first with an explicit stack. Neighbours are pushed in direction
/// order, so the last-pushed neighbour is explored first. Returns `None` when
/// `spawn` is not part of the formation or every reachable formation cell is
/// enclosed.
pub fn find_escape_path<M, F>(map: &M, spawn: Position, in_formation: F) -> Option<Vec<Position>>
where
    M: MapOracle + ?Sized,
    F: Fn(Position) -> bool,
{
    if !in_formation(spawn) {
        return None;
    }

    let mut stack: Vec<(Position, Option<Position>)> = vec![(spawn, None)];
    let mut visited: BTreeSet<Position> = BTreeSet::new();
    let mut parents: BTreeMap<Position, Position> = BTreeMap::new();

    while let Some((cell, parent)) = stack.pop() {
        if !visited.insert(cell) {
            continue;
        }
        if let Some(parent) = parent {
            parents.insert(cell, parent);
        }

        let mut exits = cell
            .neighbors()
            .filter(|next| map.is_passable(*next) && !in_formation(*next));
        if exits.next().is_some() {
            return Some(trace_back(&parents, cell));
        }

        for next in cell.neighbors() {
            if map.contains(next) && in_formation(next) && !visited.contains(&next) {
                stack.push((next, Some(cell)));
            }
        }
    }

    None
}

fn trace_back(parents: &BTreeMap<Position, Position>, end: Position) -> Vec<Position> {
    let mut path = vec![end];
    let mut cursor = end;
    while let Some(parent) = parents.get(&cursor) {
        path.push(*parent);
        cursor = *parent;
    }
    path.reverse();
    path
}

/// Clears blocked spawn cells for the strategy's own agents.
pub struct CongestionResolver;

impl CongestionResolver {
    /// One resolver pass for `spawn`, committing moves through `orders`.
    pub fn resolve<W: World + ?Sized>(
        orders: &mut Orders<'_, W>,
        spawn: Position,
    ) -> Resolution {
        if orders.ally_at(spawn).is_none() {
            return Resolution::AlreadyClear;
        }

        let path = {
            let is_formation = |position: Position| orders.ally_at(position).is_some();
            find_escape_path(orders.world(), spawn, is_formation)
        };
        let Some(path) = path else {
            tracing::debug!("spawn {} enclosed; deferring", spawn);
            return Resolution::NoPath;
        };
        tracing::debug!("spawn {} escape path {:?}", spawn, path);

        let Some(&outer) = path.last() else {
            return Resolution::NoPath;
        };
        if !Self::step_out(orders, outer) {
            return Resolution::Stuck { path };
        }

        // Walk the chain inward: the agent at path[i - 1] follows into path[i].
        let mut moved = 0;
        for index in (1..path.len()).rev() {
            let from = path[index - 1];
            let into = path[index];
            if !Self::follow(orders, from, into) {
                tracing::debug!("chain into {} stopped after {} steps", into, moved);
                return Resolution::Partial { path, moved };
            }
            moved += 1;
        }

        Resolution::Cleared { path }
    }

    /// Moves the agent on `cell` to any adjacent cell outside the formation.
    fn step_out<W: World + ?Sized>(orders: &mut Orders<'_, W>, cell: Position) -> bool {
        let Some(agent) = orders.ally_at(cell) else {
            return false;
        };
        let candidates = orders.legal_moves(agent);
        for direction in Direction::MOVES {
            if !candidates.contains(&direction) {
                continue;
            }
            let target = cell.step(direction);
            if orders.ally_at(target).is_some() || !orders.world().is_passable(target) {
                continue;
            }
            if orders.try_move(agent, direction) == CommitOutcome::Committed {
                return true;
            }
        }
        false
    }

    fn follow<W: World + ?Sized>(
        orders: &mut Orders<'_, W>,
        from: Position,
        into: Position,
    ) -> bool {
        let Some(agent) = orders.ally_at(from) else {
            return false;
        };
        let Some(direction) = Direction::between(from, into) else {
            return false;
        };
        if !orders.legal_moves(agent).contains(&direction) {
            return false;
        }
        orders.try_move(agent, direction).is_committed()
    }
}

#[cfg(test)]
mod tests {
    use game_core::{
        AttackTarget, CommitError, EntityId, MapDimensions, SandboxWorld, StaticTile,
        StructureState, Team, TerrainGrid, UnitClass, UnitState,
    };

    use super::*;

    /// Sandbox that refuses the n-th move commit (1-based) and accepts the rest.
    struct FlakyWorld {
        inner: SandboxWorld,
        refuse: Option<usize>,
        moves: usize,
    }

    impl MapOracle for FlakyWorld {
        fn dimensions(&self) -> MapDimensions {
            self.inner.dimensions()
        }

        fn tile(&self, position: Position) -> Option<StaticTile> {
            self.inner.tile(position)
        }
    }

    impl World for FlakyWorld {
        fn ally_team(&self) -> Team {
            self.inner.ally_team()
        }

        fn units(&self, team: Team) -> Vec<UnitState> {
            self.inner.units(team)
        }

        fn unit(&self, id: EntityId) -> Option<UnitState> {
            self.inner.unit(id)
        }

        fn structures(&self, team: Team) -> Vec<StructureState> {
            self.inner.structures(team)
        }

        fn structure(&self, id: EntityId) -> Option<StructureState> {
            self.inner.structure(id)
        }

        fn legal_moves(&self, unit: EntityId) -> Vec<Direction> {
            self.inner.legal_moves(unit)
        }

        fn move_unit(
            &mut self,
            unit: EntityId,
            direction: Direction,
        ) -> Result<Position, CommitError> {
            self.moves += 1;
            if self.refuse == Some(self.moves) {
                return Err(CommitError::IllegalMove { unit, direction });
            }
            self.inner.move_unit(unit, direction)
        }

        fn can_attack(&self, attacker: EntityId, target: AttackTarget) -> bool {
            self.inner.can_attack(attacker, target)
        }

        fn attack(&mut self, attacker: EntityId, target: AttackTarget) -> Result<(), CommitError> {
            self.inner.attack(attacker, target)
        }
    }

    /// One-row corridor with three own agents on (0,0), (1,0) and (2,0).
    fn corridor(refuse: Option<usize>) -> (FlakyWorld, [EntityId; 3]) {
        let mut inner =
            SandboxWorld::new(TerrainGrid::from_rows(&["....."]).unwrap(), Team::Red);
        let agents = [0, 1, 2].map(|x| {
            inner
                .add_unit(Team::Red, UnitClass::Knight, Position::new(x, 0))
                .unwrap()
        });
        let world = FlakyWorld {
            inner,
            refuse,
            moves: 0,
        };
        (world, agents)
    }

    fn positions(world: &FlakyWorld, agents: &[EntityId]) -> Vec<Position> {
        agents
            .iter()
            .filter_map(|agent| world.unit(*agent).map(|state| state.position))
            .collect()
    }

    fn chain() -> Vec<Position> {
        vec![Position::new(0, 0), Position::new(1, 0), Position::new(2, 0)]
    }

    #[test]
    fn whole_chain_shifts_outward_in_one_pass() {
        let (mut world, agents) = corridor(None);
        let resolution = CongestionResolver::resolve(&mut Orders::new(&mut world), Position::ORIGIN);

        assert_eq!(resolution, Resolution::Cleared { path: chain() });
        assert_eq!(
            positions(&world, &agents),
            vec![Position::new(1, 0), Position::new(2, 0), Position::new(3, 0)]
        );
    }

    #[test]
    fn refused_step_out_leaves_everyone_in_place() {
        let (mut world, agents) = corridor(Some(1));
        let resolution = CongestionResolver::resolve(&mut Orders::new(&mut world), Position::ORIGIN);

        assert_eq!(resolution, Resolution::Stuck { path: chain() });
        assert_eq!(positions(&world, &agents), chain());
    }

    #[test]
    fn refused_chain_step_keeps_the_moves_already_made() {
        let (mut world, agents) = corridor(Some(3));
        let resolution = CongestionResolver::resolve(&mut Orders::new(&mut world), Position::ORIGIN);

        assert_eq!(
            resolution,
            Resolution::Partial {
                path: chain(),
                moved: 1
            }
        );
        assert_eq!(
            positions(&world, &agents),
            vec![Position::new(0, 0), Position::new(2, 0), Position::new(3, 0)]
        );

        // The next turn finishes the job with a one-cell chain.
        world.inner.begin_turn();
        let resolution = CongestionResolver::resolve(&mut Orders::new(&mut world), Position::ORIGIN);
        assert_eq!(
            resolution,
            Resolution::Cleared {
                path: vec![Position::ORIGIN]
            }
        );
        assert_eq!(
            positions(&world, &agents),
            vec![Position::new(1, 0), Position::new(2, 0), Position::new(3, 0)]
        );
    }

    #[test]
    fn free_spawn_needs_no_work() {
        let (mut world, agents) = corridor(None);
        world.inner.remove_unit(agents[0]);
        let resolution = CongestionResolver::resolve(&mut Orders::new(&mut world), Position::ORIGIN);
        assert_eq!(resolution, Resolution::AlreadyClear);
        assert_eq!(world.moves, 0);
    }

    fn in_set(cells: &[(i32, i32)]) -> impl Fn(Position) -> bool + '_ {
        move |position| cells.contains(&(position.x, position.y))
    }

    #[test]
    fn spawn_outside_formation_has_no_path() {
        let grid = TerrainGrid::new(MapDimensions::new(3, 3));
        assert_eq!(find_escape_path(&grid, Position::new(0, 0), in_set(&[])), None);
    }

    #[test]
    fn spawn_touching_free_ground_is_its_own_path() {
        let grid = TerrainGrid::new(MapDimensions::new(3, 3));
        let path = find_escape_path(&grid, Position::new(1, 1), in_set(&[(1, 1)]));
        assert_eq!(path, Some(vec![Position::new(1, 1)]));
    }

    #[test]
    fn enclosed_formation_has_no_path() {
        // Everything not in the formation is water.
        let grid = TerrainGrid::from_rows(&["..~", "..~", "~~~"]).unwrap();
        let path = find_escape_path(
            &grid,
            Position::new(0, 0),
            in_set(&[(0, 0), (1, 0), (0, 1), (1, 1)]),
        );
        assert_eq!(path, None);
    }

    #[test]
    fn search_explores_last_pushed_neighbour_first() {
        // Corridor with both ends free. East is pushed before west, so west is
        // popped first and its exit wins.
        let grid = TerrainGrid::from_rows(&["....."]).unwrap();
        let cells = [(1, 0), (2, 0), (3, 0)];
        let path = find_escape_path(&grid, Position::new(2, 0), in_set(&cells));
        assert_eq!(path, Some(vec![Position::new(2, 0), Position::new(1, 0)]));
    }

    #[test]
    fn path_follows_discovery_parents() {
        // (0,0) only reaches (0,1); (0,1) touches free (1,2) diagonally.
        let grid = TerrainGrid::from_rows(&[".~~", ".~~", "..~"]).unwrap();
        let cells = [(0, 0), (0, 1), (0, 2)];
        let path = find_escape_path(&grid, Position::new(0, 0), in_set(&cells));
        assert_eq!(path, Some(vec![Position::new(0, 0), Position::new(0, 1)]));
    }
}
