use game_core::{
    AttackTarget, CommitError, ConfigError, Direction, EntityId, MapDimensions, MapOracle,
    Position, SandboxWorld, StaticTile, StructureKind, StructureState, TacticsConfig, Team,
    TerrainGrid, UnitClass, UnitState, World,
};
use std::collections::BTreeSet;
use tactics::{Command, CommitOutcome, Directive, TacticsContext, Tactician};

fn open_world(size: u32) -> SandboxWorld {
    SandboxWorld::new(TerrainGrid::new(MapDimensions::new(size, size)), Team::Red)
}

fn play(world: &mut SandboxWorld, tactician: &Tactician, ctx: &mut TacticsContext) {
    world.begin_turn();
    tactician.play_turn(world, ctx);
}

fn place(world: &mut SandboxWorld, team: Team, class: UnitClass, x: i32, y: i32) -> EntityId {
    world
        .add_unit(team, class, Position::new(x, y))
        .expect("unit placed")
}

fn build(world: &mut SandboxWorld, team: Team, kind: StructureKind, x: i32, y: i32) -> EntityId {
    world
        .add_structure(team, kind, Position::new(x, y))
        .expect("structure placed")
}

/// Sandbox that advertises every move as legal and then refuses all of them.
struct RefusingWorld {
    inner: SandboxWorld,
    attempts: Vec<(EntityId, Direction)>,
}

impl MapOracle for RefusingWorld {
    fn dimensions(&self) -> MapDimensions {
        self.inner.dimensions()
    }

    fn tile(&self, position: Position) -> Option<StaticTile> {
        self.inner.tile(position)
    }
}

impl World for RefusingWorld {
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

    fn legal_moves(&self, _unit: EntityId) -> Vec<Direction> {
        Direction::MOVES.to_vec()
    }

    fn move_unit(&mut self, unit: EntityId, direction: Direction) -> Result<Position, CommitError> {
        self.attempts.push((unit, direction));
        let destination = self
            .inner
            .unit(unit)
            .map(|state| state.position.step(direction))
            .unwrap_or_default();
        Err(CommitError::Blocked { destination })
    }

    fn can_attack(&self, attacker: EntityId, target: AttackTarget) -> bool {
        self.inner.can_attack(attacker, target)
    }

    fn attack(&mut self, attacker: EntityId, target: AttackTarget) -> Result<(), CommitError> {
        self.inner.attack(attacker, target)
    }
}

/// A small two-anchor skirmish used by the determinism check.
fn skirmish() -> SandboxWorld {
    let mut world = open_world(30);
    build(&mut world, Team::Red, StructureKind::MainCastle, 5, 5);
    build(&mut world, Team::Red, StructureKind::Farm, 5, 20);
    build(&mut world, Team::Blue, StructureKind::MainCastle, 22, 22);
    place(&mut world, Team::Red, UnitClass::Catapult, 5, 5);
    place(&mut world, Team::Red, UnitClass::Warrior, 6, 6);
    place(&mut world, Team::Red, UnitClass::Warrior, 4, 5);
    place(&mut world, Team::Red, UnitClass::Healer, 5, 6);
    place(&mut world, Team::Red, UnitClass::Healer, 6, 5);
    place(&mut world, Team::Red, UnitClass::Knight, 8, 8);
    place(&mut world, Team::Red, UnitClass::Swordsman, 6, 19);
    place(&mut world, Team::Blue, UnitClass::Knight, 14, 14);
    place(&mut world, Team::Blue, UnitClass::Knight, 9, 12);
    world
}

#[test]
fn identical_worlds_produce_identical_turns() {
    let tactician = Tactician::default();
    let mut first = skirmish();
    let mut second = skirmish();
    let mut first_ctx = TacticsContext::new();
    let mut second_ctx = TacticsContext::new();

    for _ in 0..6 {
        play(&mut first, &tactician, &mut first_ctx);
        play(&mut second, &tactician, &mut second_ctx);
        assert_eq!(first_ctx.last_summary(), second_ctx.last_summary());
    }

    assert!(!first.log().is_empty());
    assert_eq!(first.log(), second.log());
    assert_eq!(first.units(Team::Red), second.units(Team::Red));
}

#[test]
fn every_member_gets_its_own_slot() {
    let mut world = open_world(30);
    build(&mut world, Team::Red, StructureKind::MainCastle, 10, 10);
    build(&mut world, Team::Blue, StructureKind::MainCastle, 28, 28);
    for (x, y) in [(9, 9), (10, 9), (11, 9), (9, 10)] {
        place(&mut world, Team::Red, UnitClass::Warrior, x, y);
    }
    for (x, y) in [(11, 10), (9, 11), (10, 11), (11, 11)] {
        place(&mut world, Team::Red, UnitClass::Healer, x, y);
    }

    let config = TacticsConfig::default().with_primary_attack_ring(true);
    let tactician = Tactician::new(config).expect("valid config");
    let mut ctx = TacticsContext::new();
    play(&mut world, &tactician, &mut ctx);

    let summary = ctx.last_summary().expect("turn summary");
    let formation = summary.formations[0];
    assert!(!formation.dormant);
    assert_eq!(formation.members, 8);
    assert_eq!(formation.assigned, 8);
    let slots: BTreeSet<_> = summary.agents.iter().filter_map(|agent| agent.slot).collect();
    assert_eq!(slots.len(), 8);
    assert_eq!(summary.rejected, 0);
    assert!(summary.committed > 0);
    assert!(summary
        .agents
        .iter()
        .all(|agent| agent.outcome != Some(CommitOutcome::Rejected)));
}

#[test]
fn main_castle_garrison_sends_fighters_forward() {
    let mut world = open_world(30);
    build(&mut world, Team::Red, StructureKind::MainCastle, 10, 10);
    build(&mut world, Team::Blue, StructureKind::MainCastle, 28, 28);
    let warrior = place(&mut world, Team::Red, UnitClass::Warrior, 9, 9);
    let healer = place(&mut world, Team::Red, UnitClass::Healer, 11, 11);

    let tactician = Tactician::default();
    let mut ctx = TacticsContext::new();
    play(&mut world, &tactician, &mut ctx);

    let summary = ctx.last_summary().expect("turn summary");
    assert_eq!(summary.formations[0].assigned, 1);
    let warrior_report = summary.agent(warrior).copied().expect("warrior acted");
    assert_eq!(warrior_report.slot, None);
    assert_eq!(warrior_report.directive, Directive::Fallback);
    assert_eq!(
        summary.agent(healer).map(|report| report.slot),
        Some(Some(Position::new(14, 14)))
    );
}

#[test]
fn overlapping_rings_never_share_a_cell() {
    let mut world = open_world(30);
    build(&mut world, Team::Red, StructureKind::MainCastle, 10, 20);
    build(&mut world, Team::Red, StructureKind::Farm, 16, 20);
    build(&mut world, Team::Blue, StructureKind::MainCastle, 13, 0);
    let castle_healer = place(&mut world, Team::Red, UnitClass::Healer, 11, 20);
    let farm_healer = place(&mut world, Team::Red, UnitClass::Healer, 15, 20);

    // Healers hold ring 3 on both anchors; (13, 17) lies on both rings and
    // ranks first for both headings.
    let config = TacticsConfig::default().with_primary_attack_ring(true);
    let tactician = Tactician::new(config).expect("valid config");
    let mut ctx = TacticsContext::new();
    play(&mut world, &tactician, &mut ctx);

    let summary = ctx.last_summary().expect("turn summary");
    assert!(!summary.formations[1].dormant);
    let slot_of = |unit| summary.agent(unit).and_then(|report| report.slot);
    assert_eq!(slot_of(castle_healer), Some(Position::new(13, 17)));
    assert_eq!(slot_of(farm_healer), Some(Position::new(14, 17)));
}

#[test]
fn structures_inside_a_ring_are_never_slots() {
    let mut world = open_world(30);
    build(&mut world, Team::Red, StructureKind::MainCastle, 10, 10);
    build(&mut world, Team::Red, StructureKind::Farm, 14, 14);
    build(&mut world, Team::Blue, StructureKind::MainCastle, 28, 28);
    let healer = place(&mut world, Team::Red, UnitClass::Healer, 11, 11);

    let tactician = Tactician::default();
    let mut ctx = TacticsContext::new();
    play(&mut world, &tactician, &mut ctx);

    // (14, 14) would be the best ring-4 cell toward the enemy.
    let summary = ctx.last_summary().expect("turn summary");
    assert_eq!(summary.formations[0].slots, 71);
    let slot = summary.agent(healer).and_then(|report| report.slot);
    assert!(slot.is_some());
    assert_ne!(slot, Some(Position::new(14, 14)));
}

#[test]
fn healer_mends_the_most_wounded_ally_in_reach() {
    let mut world = open_world(30);
    build(&mut world, Team::Red, StructureKind::MainCastle, 10, 10);
    build(&mut world, Team::Blue, StructureKind::MainCastle, 28, 28);
    let healer = place(&mut world, Team::Red, UnitClass::Healer, 12, 12);
    let bruised = place(&mut world, Team::Red, UnitClass::Warrior, 13, 13);
    let battered = place(&mut world, Team::Red, UnitClass::Knight, 11, 13);
    let out_of_reach = place(&mut world, Team::Red, UnitClass::Knight, 16, 16);
    world.set_health(bruised, 20).expect("warrior hurt");
    world.set_health(battered, 10).expect("knight hurt");
    world.set_health(out_of_reach, 1).expect("knight hurt");

    let tactician = Tactician::default();
    let mut ctx = TacticsContext::new();
    play(&mut world, &tactician, &mut ctx);

    let report = ctx
        .last_summary()
        .and_then(|summary| summary.agent(healer).copied())
        .expect("healer acted");
    assert_eq!(report.directive, Directive::Healing);
    assert_eq!(report.command, Some(Command::Heal(battered)));
    assert_eq!(report.outcome, Some(CommitOutcome::Committed));
    assert_eq!(world.unit(battered).map(|u| u.health), Some(15));
    assert_eq!(world.unit(healer).map(|u| u.position), Some(Position::new(12, 12)));
}

#[test]
fn spawn_corridor_shifts_out_in_one_turn() {
    let terrain = TerrainGrid::from_rows(&["......"]).expect("valid layout");
    let mut world = SandboxWorld::new(terrain, Team::Red);
    build(&mut world, Team::Red, StructureKind::MainCastle, 0, 0);
    let agents = [0, 1, 2].map(|x| place(&mut world, Team::Red, UnitClass::Knight, x, 0));

    let tactician = Tactician::default();
    let mut ctx = TacticsContext::new();
    play(&mut world, &tactician, &mut ctx);

    let summary = ctx.last_summary().expect("turn summary");
    assert_eq!(summary.spawns[0].resolution.label(), "cleared");
    let positions: Vec<_> = agents
        .iter()
        .filter_map(|agent| world.unit(*agent).map(|u| u.position))
        .collect();
    assert_eq!(
        positions,
        vec![Position::new(1, 0), Position::new(2, 0), Position::new(3, 0)]
    );
}

#[test]
fn enclosed_spawn_waits_until_a_cell_opens() {
    let mut world = open_world(3);
    build(&mut world, Team::Red, StructureKind::MainCastle, 1, 1);
    let spawned = place(&mut world, Team::Red, UnitClass::Knight, 1, 1);
    let mut blockers = Vec::new();
    for position in Position::new(1, 1).neighbors() {
        blockers.push(place(&mut world, Team::Blue, UnitClass::Healer, position.x, position.y));
    }

    let tactician = Tactician::default();
    let mut ctx = TacticsContext::new();
    play(&mut world, &tactician, &mut ctx);

    let resolution = &ctx.last_summary().expect("turn summary").spawns[0].resolution;
    assert_eq!(resolution.label(), "stuck");
    assert!(world.unit_at(Position::new(1, 1)).is_some());

    // Free the cell north of the spawn.
    world.remove_unit(blockers[0]);
    play(&mut world, &tactician, &mut ctx);

    let resolution = &ctx.last_summary().expect("turn summary").spawns[0].resolution;
    assert_eq!(resolution.label(), "cleared");
    assert_eq!(world.unit(spawned).map(|u| u.position), Some(Position::new(1, 2)));
}

#[test]
fn siege_agent_in_band_without_targets_stays_idle() {
    let mut world = open_world(21);
    build(&mut world, Team::Red, StructureKind::MainCastle, 10, 10);
    let catapult = place(&mut world, Team::Red, UnitClass::Catapult, 10, 15);

    let tactician = Tactician::default();
    let mut ctx = TacticsContext::new();
    play(&mut world, &tactician, &mut ctx);

    let report = ctx
        .last_summary()
        .and_then(|summary| summary.agent(catapult).copied())
        .expect("catapult reported");
    assert_eq!(report.directive, Directive::Idle);
    assert!(report.command.is_none());
    assert!(world.log().is_empty());
}

#[test]
fn refused_command_is_not_retried_in_the_same_turn() {
    let mut inner = open_world(15);
    build(&mut inner, Team::Red, StructureKind::MainCastle, 2, 2);
    build(&mut inner, Team::Blue, StructureKind::MainCastle, 12, 12);
    let knight = place(&mut inner, Team::Red, UnitClass::Knight, 5, 5);
    inner.begin_turn();
    let mut world = RefusingWorld {
        inner,
        attempts: Vec::new(),
    };

    let tactician = Tactician::default();
    let mut ctx = TacticsContext::new();
    tactician.play_turn(&mut world, &mut ctx);

    assert_eq!(world.attempts, vec![(knight, Direction::NorthEast)]);
    let summary = ctx.last_summary().expect("turn summary");
    assert_eq!(summary.rejected, 1);
    assert_eq!(summary.committed, 0);
    assert_eq!(
        summary.agent(knight).and_then(|report| report.outcome),
        Some(CommitOutcome::Rejected)
    );
}

#[test]
fn distant_secondary_anchor_stays_dormant_until_enemies_approach() {
    let mut world = open_world(40);
    build(&mut world, Team::Red, StructureKind::MainCastle, 5, 5);
    let farm = build(&mut world, Team::Red, StructureKind::Farm, 5, 35);
    build(&mut world, Team::Blue, StructureKind::MainCastle, 30, 5);

    let tactician = Tactician::default();
    let mut ctx = TacticsContext::new();
    play(&mut world, &tactician, &mut ctx);

    let summary = ctx.last_summary().expect("turn summary");
    assert!(!summary.formations[0].dormant);
    assert_eq!(summary.formations[1].anchor, farm);
    assert!(summary.formations[1].dormant);
    assert_eq!(summary.formations[1].slots, 0);
    assert_eq!(ctx.turns_without_contact(), 1);

    place(&mut world, Team::Blue, UnitClass::Knight, 10, 30);
    play(&mut world, &tactician, &mut ctx);

    let summary = ctx.last_summary().expect("turn summary");
    assert!(!summary.formations[1].dormant);
    assert!(summary.formations[1].slots > 0);
    assert_eq!(ctx.turns_without_contact(), 0);
}

#[test]
fn attack_class_is_chosen_once_per_game() {
    let mut far = open_world(40);
    build(&mut far, Team::Red, StructureKind::MainCastle, 5, 5);
    build(&mut far, Team::Blue, StructureKind::MainCastle, 30, 5);

    // The warrior belongs to the farm, whose outer ring takes the attack class.
    let close = || {
        let mut world = open_world(20);
        build(&mut world, Team::Red, StructureKind::MainCastle, 5, 5);
        build(&mut world, Team::Red, StructureKind::Farm, 10, 14);
        build(&mut world, Team::Blue, StructureKind::MainCastle, 12, 5);
        place(&mut world, Team::Red, UnitClass::Warrior, 10, 17);
        world
    };

    let tactician = Tactician::default();
    let mut ctx = TacticsContext::new();
    play(&mut far, &tactician, &mut ctx);
    assert_eq!(ctx.attack_class(), Some(UnitClass::Warrior));

    // The remembered class outlives a change in anchor distance.
    let mut world = close();
    play(&mut world, &tactician, &mut ctx);
    assert_eq!(ctx.attack_class(), Some(UnitClass::Warrior));
    assert_eq!(ctx.last_summary().map(|s| s.formations[1].assigned), Some(1));

    let mut fresh = TacticsContext::new();
    let mut world = close();
    play(&mut world, &tactician, &mut fresh);
    assert_eq!(fresh.attack_class(), Some(UnitClass::Swordsman));
    assert_eq!(fresh.last_summary().map(|s| s.formations[1].assigned), Some(0));
}

#[test]
fn pinned_attack_class_is_not_remembered() {
    let mut world = open_world(40);
    build(&mut world, Team::Red, StructureKind::MainCastle, 5, 5);
    build(&mut world, Team::Blue, StructureKind::MainCastle, 30, 5);

    let config = TacticsConfig::default().with_attack_class(UnitClass::Knight);
    let tactician = Tactician::new(config).expect("valid config");
    let mut ctx = TacticsContext::new();
    play(&mut world, &tactician, &mut ctx);
    assert_eq!(ctx.attack_class(), None);
}

#[test]
fn invalid_config_is_refused() {
    let config = TacticsConfig::default().with_band(7, 3);
    assert!(matches!(
        Tactician::new(config),
        Err(ConfigError::InvertedBand { min: 7, max: 3 })
    ));
}

#[test]
fn side_without_anchors_does_nothing() {
    let mut world = open_world(10);
    build(&mut world, Team::Blue, StructureKind::MainCastle, 8, 8);
    place(&mut world, Team::Red, UnitClass::Warrior, 2, 2);

    let tactician = Tactician::default();
    let mut ctx = TacticsContext::new();
    play(&mut world, &tactician, &mut ctx);

    let summary = ctx.last_summary().expect("turn summary");
    assert!(summary.agents.is_empty());
    assert!(summary.spawns.is_empty());
    assert!(world.log().is_empty());
}
