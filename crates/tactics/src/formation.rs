//! Ring formations around anchor structures.
//!
//! Each anchor gets a template of slots on the rings at Chebyshev distance 2,
//! 3 and 4, rebuilt every turn from the map. Only passable cells free of any
//! structure become slots. Secondary anchors put the attack class on ring 4
//! (with siege corners for melee front-line classes) and support agents on
//! rings 2 and 3. Primary anchors are garrisoned by support agents on every
//! ring unless configured otherwise.
//!
//! Agents are then matched to slots of their class, outermost ring first,
//! preferring slots that lie toward the enemy. A cell is handed out at most
//! once per turn across all formations: the caller threads one reservation
//! set through every [`FormationAllocator::allocate`] call, so overlapping
//! rings of neighbouring anchors never send two agents to the same cell.

use std::collections::BTreeSet;

use game_core::{
    AnchorKind, Capabilities, EntityId, FormationConfig, MapOracle, OccupancyMap, Position,
    StructureState, UnitClass, UnitState,
};

/// A structure used as a formation center.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Anchor {
    pub structure: EntityId,
    pub position: Position,
    pub spawn: Position,
    pub kind: AnchorKind,
}

impl Anchor {
    pub fn from_structure(structure: &StructureState) -> Self {
        Self {
            structure: structure.id,
            position: structure.position,
            spawn: structure.spawn,
            kind: structure.kind.anchor_kind(),
        }
    }

    pub fn is_primary(&self) -> bool {
        self.kind == AnchorKind::Primary
    }

    pub fn distance(&self, position: Position) -> u32 {
        self.position.chebyshev(position)
    }
}

/// Own anchors in world order, primary anchors first.
pub fn collect_anchors(structures: &[StructureState]) -> Vec<Anchor> {
    let mut anchors: Vec<Anchor> = structures.iter().map(Anchor::from_structure).collect();
    anchors.sort_by_key(|anchor| anchor.kind);
    anchors
}

/// Index of the anchor closest to `position`; the earlier anchor wins a tie.
pub fn nearest_anchor(anchors: &[Anchor], position: Position) -> Option<usize> {
    let mut best: Option<(usize, u32)> = None;
    for (index, anchor) in anchors.iter().enumerate() {
        let distance = anchor.distance(position);
        if best.is_none_or(|(_, best_distance)| distance < best_distance) {
            best = Some((index, distance));
        }
    }
    best.map(|(index, _)| index)
}

/// Unit vector pointing from our anchor toward the enemy's.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Heading {
    x: f64,
    y: f64,
}

impl Heading {
    /// Zero heading: every slot scores the same on the secondary key.
    pub const NONE: Heading = Heading { x: 0.0, y: 0.0 };

    pub fn toward(from: Position, to: Position) -> Heading {
        let (dx, dy) = from.offset_to(to);
        let length = ((dx * dx + dy * dy) as f64).sqrt();
        if length == 0.0 {
            return Heading::NONE;
        }
        Heading {
            x: dx as f64 / length,
            y: dy as f64 / length,
        }
    }

    /// Projection of the step `from -> to` onto this heading.
    pub fn score(&self, from: Position, to: Position) -> f64 {
        let (dx, dy) = from.offset_to(to);
        dx as f64 * self.x + dy as f64 * self.y
    }
}

/// One position an agent of `class` is expected to hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Slot {
    pub position: Position,
    pub ring: u32,
    pub class: UnitClass,
}

/// The slots of one anchor, ordered by ring, then `dx`, then `dy`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotTemplate {
    anchor: Anchor,
    slots: Vec<Slot>,
}

impl SlotTemplate {
    /// Lays out every in-bounds passable cell on rings 2, 3 and 4 that no
    /// structure stands on.
    pub fn build<M: MapOracle + ?Sized>(
        map: &M,
        anchor: &Anchor,
        config: &FormationConfig,
        attack_class: UnitClass,
        structure_cells: &BTreeSet<Position>,
    ) -> Self {
        let secondary = anchor.kind == AnchorKind::Secondary;
        let corner_siege =
            secondary && attack_class.has(Capabilities::MELEE | Capabilities::FRONT_LINE);
        let armed = secondary || config.primary_attack_ring;

        let mut slots = Vec::new();
        for ring in FormationConfig::RINGS {
            let r = ring as i32;
            for dx in -r..=r {
                for dy in -r..=r {
                    if dx.abs().max(dy.abs()) != r {
                        continue;
                    }
                    let position = Position::new(anchor.position.x + dx, anchor.position.y + dy);
                    if !map.is_passable(position) || structure_cells.contains(&position) {
                        continue;
                    }
                    let class = if ring != FormationConfig::ATTACK_RING {
                        config.inner_ring_class(ring)
                    } else if !armed {
                        config.support_class
                    } else if corner_siege && dx.abs() == r && dy.abs() == r {
                        config.siege_class
                    } else {
                        attack_class
                    };
                    slots.push(Slot {
                        position,
                        ring,
                        class,
                    });
                }
            }
        }

        Self {
            anchor: *anchor,
            slots,
        }
    }

    pub fn anchor(&self) -> &Anchor {
        &self.anchor
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn slot_at(&self, position: Position) -> Option<usize> {
        self.slots.iter().position(|slot| slot.position == position)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Slot given to one agent this turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Assignment {
    pub unit: EntityId,
    pub slot: usize,
    /// The agent already stands on the slot.
    pub holding: bool,
}

/// An anchor's template together with this turn's slot assignments.
#[derive(Clone, Debug)]
pub struct Formation {
    template: SlotTemplate,
    assignments: Vec<Assignment>,
}

impl Formation {
    pub fn anchor(&self) -> &Anchor {
        self.template.anchor()
    }

    pub fn template(&self) -> &SlotTemplate {
        &self.template
    }

    /// Assignments in roster order.
    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    pub fn assignment_for(&self, unit: EntityId) -> Option<&Assignment> {
        self.assignments.iter().find(|entry| entry.unit == unit)
    }

    pub fn slot_for(&self, unit: EntityId) -> Option<(Slot, bool)> {
        let entry = self.assignment_for(unit)?;
        let slot = self.template.slots().get(entry.slot)?;
        Some((*slot, entry.holding))
    }
}

/// Matches agents to template slots.
pub struct FormationAllocator;

impl FormationAllocator {
    /// Assigns `members` (in roster order) to slots of `template`.
    ///
    /// Agents already standing on a slot of their class keep it. Every other
    /// agent takes the free slot of its class on the outermost ring, breaking
    /// ring ties by [`Heading::score`] and then by template order. A slot is
    /// free when nobody stands on it and its cell is not in `reserved`.
    ///
    /// Every cell handed out is added to `reserved`.
    pub fn allocate(
        template: SlotTemplate,
        members: &[UnitState],
        occupancy: &OccupancyMap,
        heading: Heading,
        reserved: &mut BTreeSet<Position>,
    ) -> Formation {
        let slots = template.slots();
        let mut chosen: Vec<Option<Assignment>> = vec![None; members.len()];

        for (index, member) in members.iter().enumerate() {
            let Some(slot) = template.slot_at(member.position) else {
                continue;
            };
            if slots[slot].class == member.class && reserved.insert(member.position) {
                chosen[index] = Some(Assignment {
                    unit: member.id,
                    slot,
                    holding: true,
                });
            }
        }

        for (index, member) in members.iter().enumerate() {
            if chosen[index].is_some() {
                continue;
            }

            let mut best: Option<(usize, u32, f64)> = None;
            for (slot_index, slot) in slots.iter().enumerate() {
                if slot.class != member.class
                    || reserved.contains(&slot.position)
                    || occupancy.is_occupied(slot.position)
                {
                    continue;
                }
                let heading_score = heading.score(member.position, slot.position);
                let better = match best {
                    None => true,
                    Some((_, ring, score)) => {
                        slot.ring > ring || (slot.ring == ring && heading_score > score)
                    }
                };
                if better {
                    best = Some((slot_index, slot.ring, heading_score));
                }
            }

            if let Some((slot, ring, _)) = best {
                reserved.insert(slots[slot].position);
                tracing::trace!(
                    "{} {} assigned ring {} slot {}",
                    member.class,
                    member.id,
                    ring,
                    slots[slot].position
                );
                chosen[index] = Some(Assignment {
                    unit: member.id,
                    slot,
                    holding: false,
                });
            }
        }

        Formation {
            assignments: chosen.into_iter().flatten().collect(),
            template,
        }
    }
}
