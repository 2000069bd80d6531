//! Per-turn driver tying the tactics components together.
//!
//! One call to [`Tactician::play_turn`] runs, in order:
//!
//! 1. the congestion resolver on every own anchor's spawn cell,
//! 2. slot templates and assignments for every active anchor, sharing one
//!    set of reserved cells so no cell is handed out twice,
//! 3. one decision per own agent in roster order, committed immediately.
//!
//! Everything is recomputed from the world each turn; only the
//! [`TacticsContext`] survives between calls.

use std::collections::{BTreeMap, BTreeSet};

use game_core::{
    AttackTarget, Capabilities, ConfigError, EntityId, Position, StructureState, TacticsConfig,
    UnitClass, UnitState, World,
};

use crate::congestion::CongestionResolver;
use crate::context::{AgentReport, FormationReport, SpawnReport, TacticsContext, TurnSummary};
use crate::decision::{Command, Decision, Directive, Situation};
use crate::fallback::{self, Fallback};
use crate::formation::{
    Anchor, Formation, FormationAllocator, Heading, SlotTemplate, collect_anchors, nearest_anchor,
};
use crate::keeper::{SlotKeeper, advance_to_slot};
use crate::orders::{CommitOutcome, Orders};
use crate::threat::ThreatController;

pub struct Tactician {
    config: TacticsConfig,
    threat: ThreatController,
    fallback: Box<dyn Fallback>,
}

impl Tactician {
    pub fn new(config: TacticsConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            threat: ThreatController::new(&config),
            fallback: fallback::from_mode(config.fallback),
            config,
        })
    }

    /// Replaces the behaviour of agents with nothing else to do.
    #[must_use]
    pub fn with_fallback<F: Fallback + 'static>(mut self, fallback: F) -> Self {
        self.fallback = Box::new(fallback);
        self
    }

    pub fn config(&self) -> &TacticsConfig {
        &self.config
    }

    pub fn fallback(&self) -> &dyn Fallback {
        self.fallback.as_ref()
    }

    /// Plays one turn for the world's ally side.
    ///
    /// Acts only through world commits and never fails: missing anchors,
    /// vanished units and refused commands all degrade to doing less. A summary
    /// of the turn is left in `ctx`.
    pub fn play_turn<W: World + ?Sized>(&self, world: &mut W, ctx: &mut TacticsContext) {
        let turn = ctx.begin_turn();
        let mut summary = TurnSummary::new(turn);

        let ally = world.ally_team();
        let enemy = world.enemy_team();
        let own_structures = world.structures(ally);
        let anchors = collect_anchors(&own_structures);
        let mut enemy_structures = world.structures(enemy);
        enemy_structures.sort_by_key(|structure| structure.kind.anchor_kind());
        let enemy_anchor = enemy_structures
            .iter()
            .find(|structure| structure.is_primary())
            .map(|structure| structure.position);

        if anchors.is_empty() {
            tracing::debug!("turn {}: no own anchors, nothing to coordinate", turn);
            ctx.record_contact(false);
            ctx.finish_turn(summary);
            return;
        }

        let attack_class = self.attack_class(ctx, &anchors, enemy_anchor);
        let mut orders = Orders::new(world);

        for anchor in &anchors {
            let resolution = CongestionResolver::resolve(&mut orders, anchor.spawn);
            tracing::debug!(
                "turn {}: spawn {} of {} {}",
                turn,
                anchor.spawn,
                anchor.structure,
                resolution.label()
            );
            summary.spawns.push(SpawnReport {
                anchor: anchor.structure,
                resolution,
            });
        }

        let roster = orders.world().units(ally);
        let mut home: BTreeMap<EntityId, usize> = BTreeMap::new();
        let mut members: Vec<Vec<UnitState>> = vec![Vec::new(); anchors.len()];
        for unit in &roster {
            if let Some(index) = nearest_anchor(&anchors, unit.position) {
                home.insert(unit.id, index);
                members[index].push(*unit);
            }
        }

        let enemy_units = orders.world().units(enemy);
        let structure_cells: BTreeSet<Position> = own_structures
            .iter()
            .chain(enemy_structures.iter())
            .map(|structure| structure.position)
            .collect();
        let mut reserved = BTreeSet::new();
        let mut formations: Vec<Option<Formation>> = Vec::with_capacity(anchors.len());
        for (index, anchor) in anchors.iter().enumerate() {
            if self.is_dormant(anchor, &enemy_units, &enemy_structures) {
                tracing::debug!("turn {}: anchor {} dormant", turn, anchor.structure);
                summary.formations.push(FormationReport {
                    anchor: anchor.structure,
                    dormant: true,
                    slots: 0,
                    members: members[index].len(),
                    assigned: 0,
                });
                formations.push(None);
                continue;
            }

            let heading = enemy_anchor
                .map(|target| Heading::toward(anchor.position, target))
                .unwrap_or(Heading::NONE);
            let template = SlotTemplate::build(
                orders.world(),
                anchor,
                &self.config.formation,
                attack_class,
                &structure_cells,
            );
            let formation = FormationAllocator::allocate(
                template,
                &members[index],
                orders.occupancy(),
                heading,
                &mut reserved,
            );
            summary.formations.push(FormationReport {
                anchor: anchor.structure,
                dormant: false,
                slots: formation.template().len(),
                members: members[index].len(),
                assigned: formation.assignments().len(),
            });
            formations.push(Some(formation));
        }

        for member in &roster {
            let Some(unit) = orders.unit(member.id) else {
                continue;
            };
            let Some(&index) = home.get(&unit.id) else {
                continue;
            };
            let formation = formations[index].as_ref();
            let report = self.act(
                &mut orders,
                unit,
                anchors[index],
                formation,
                &enemy_structures,
                enemy_anchor,
            );
            summary.agents.push(report);
        }

        summary.committed = orders.committed();
        summary.rejected = orders.rejected();

        let contact = enemy_units.iter().any(|unit| {
            anchors
                .iter()
                .any(|anchor| anchor.distance(unit.position) <= self.config.formation.dormant_radius)
        });
        ctx.record_contact(contact);

        tracing::info!(
            "turn {}: {} agents, {} committed, {} rejected, {} quiet turns",
            turn,
            summary.agents.len(),
            summary.committed,
            summary.rejected,
            ctx.turns_without_contact()
        );
        ctx.finish_turn(summary);
    }

    /// Decides and commits one agent's action.
    fn act<W: World + ?Sized>(
        &self,
        orders: &mut Orders<'_, W>,
        unit: UnitState,
        anchor: Anchor,
        formation: Option<&Formation>,
        enemy_structures: &[StructureState],
        enemy_anchor: Option<Position>,
    ) -> AgentReport {
        let enemy = orders.world().enemy_team();
        let enemies = orders.world().units(enemy);
        let attackable_units: Vec<UnitState> = enemies
            .iter()
            .filter(|target| orders.can_attack(unit.id, AttackTarget::Unit(target.id)))
            .copied()
            .collect();
        let attackable_structures: Vec<StructureState> = enemy_structures
            .iter()
            .filter(|target| orders.can_attack(unit.id, AttackTarget::Structure(target.id)))
            .copied()
            .collect();
        let healable_allies: Vec<UnitState> = if unit.class.has(Capabilities::SUPPORT) {
            orders
                .world()
                .units(orders.world().ally_team())
                .into_iter()
                .filter(|ally| ally.id != unit.id && orders.can_heal(unit.id, ally.id))
                .collect()
        } else {
            Vec::new()
        };
        let legal_moves = orders.legal_moves(unit.id);

        let situation = Situation {
            unit,
            anchor,
            legal_moves: &legal_moves,
            enemies: &enemies,
            attackable_units: &attackable_units,
            attackable_structures: &attackable_structures,
            healable_allies: &healable_allies,
            slot: formation.and_then(|formation| formation.slot_for(unit.id)),
            enemy_anchor,
        };

        let decision = if unit.class.has(Capabilities::BAND_KEEPER) {
            let decision: Decision = self.threat.decide(&situation).into();
            if decision.directive == Directive::Idle {
                advance_to_slot(&situation)
                    .map(|direction| Decision::moving(Directive::AdvancingToSlot, direction))
                    .unwrap_or(decision)
            } else {
                decision
            }
        } else {
            SlotKeeper::decide(&situation, self.fallback.as_ref())
        };

        tracing::debug!(
            "{} {} at {}: {} {:?}",
            unit.class,
            unit.id,
            unit.position,
            decision.directive,
            decision.command
        );

        let outcome = decision.command.map(|command| match command {
            Command::Move(direction) => orders.try_move(unit.id, direction),
            Command::Attack(target) => orders.try_attack(unit.id, target),
            Command::Heal(target) => orders.try_heal(unit.id, target),
        });
        if outcome == Some(CommitOutcome::Rejected) {
            tracing::debug!("{} stops for this turn after a refused command", unit.id);
        }

        AgentReport {
            unit: unit.id,
            directive: decision.directive,
            command: decision.command,
            outcome,
            slot: situation.slot.map(|(slot, _)| slot.position),
        }
    }

    /// The outer-ring class for this game, chosen once and remembered.
    fn attack_class(
        &self,
        ctx: &mut TacticsContext,
        anchors: &[Anchor],
        enemy_anchor: Option<Position>,
    ) -> UnitClass {
        let formation = &self.config.formation;
        if let Some(pinned) = formation.attack_class {
            return pinned;
        }
        if let Some(chosen) = ctx.attack_class() {
            return chosen;
        }

        let own_primary = anchors.iter().find(|anchor| anchor.is_primary());
        match (own_primary, enemy_anchor) {
            (Some(own), Some(theirs)) => {
                let class = formation.attack_class_for_distance(own.distance(theirs));
                tracing::info!(
                    "attack class {} chosen for anchor distance {}",
                    class,
                    own.distance(theirs)
                );
                ctx.remember_attack_class(class);
                class
            }
            _ => formation.close_attack_class,
        }
    }

    /// Secondary anchors with no enemy agent or structure within range stay unformed.
    fn is_dormant(
        &self,
        anchor: &Anchor,
        enemy_units: &[UnitState],
        enemy_structures: &[StructureState],
    ) -> bool {
        if anchor.is_primary() {
            return false;
        }
        let nearest = enemy_units
            .iter()
            .map(|unit| unit.position)
            .chain(enemy_structures.iter().map(|structure| structure.position))
            .map(|position| anchor.distance(position))
            .min();
        nearest.is_none_or(|distance| distance > self.config.formation.dormant_radius)
    }
}

impl Default for Tactician {
    fn default() -> Self {
        let config = TacticsConfig::default();
        Self {
            threat: ThreatController::new(&config),
            fallback: fallback::from_mode(config.fallback),
            config,
        }
    }
}
