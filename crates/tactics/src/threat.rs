//! Distance-band state machine for band-keeping agents.
//!
//! A band keeper (a catapult, by default) wants to sit between `band.min` and
//! `band.max` cells from its anchor: far enough out to cover the approaches,
//! close enough to be covered itself. Every turn it runs through the rules
//! below in priority order and acts on the first one that has a candidate:
//!
//! 1. [`ThreatState::OnSpawn`]: standing on the spawn cell, step off it.
//! 2. [`ThreatState::Retreating`]: an engaging enemy is inside the danger
//!    radius, step away from it, preferably staying inside the band.
//! 3. [`ThreatState::Repositioning`]: outside the band, step back toward it.
//! 4. [`ThreatState::Engaging`]: inside the band with something to shoot.
//! 5. [`ThreatState::Idle`]: nothing to do.
//!
//! A rule whose condition holds but that has no candidate falls through to the
//! next one. The retreat may leave the band when no in-band move exists;
//! distance from the threat takes precedence over position.

use game_core::{Direction, DistanceBand, Position, TacticsConfig, UnitState};

use crate::decision::{Command, Decision, Directive, Situation};
use crate::selector::{MoveSelector, Objective};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ThreatState {
    OnSpawn,
    Retreating,
    Repositioning,
    Engaging,
    Idle,
}

impl From<ThreatState> for Directive {
    fn from(state: ThreatState) -> Self {
        match state {
            ThreatState::OnSpawn => Directive::OnSpawn,
            ThreatState::Retreating => Directive::Retreating,
            ThreatState::Repositioning => Directive::Repositioning,
            ThreatState::Engaging => Directive::Engaging,
            ThreatState::Idle => Directive::Idle,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThreatDecision {
    pub state: ThreatState,
    pub command: Option<Command>,
}

impl From<ThreatDecision> for Decision {
    fn from(decision: ThreatDecision) -> Self {
        Decision {
            directive: decision.state.into(),
            command: decision.command,
        }
    }
}

/// Nearest enemy able to attack, and how far away it is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Threat {
    pub enemy: UnitState,
    pub distance: u32,
}

#[derive(Clone, Copy, Debug)]
pub struct ThreatController {
    danger_radius: u32,
    band: DistanceBand,
}

impl ThreatController {
    pub fn new(config: &TacticsConfig) -> Self {
        Self {
            danger_radius: config.danger_radius,
            band: config.band,
        }
    }

    pub fn band(&self) -> DistanceBand {
        self.band
    }

    /// Closest enemy with an attack; roster order breaks ties.
    pub fn nearest_threat(situation: &Situation<'_>) -> Option<Threat> {
        let origin = situation.position();
        let mut best: Option<Threat> = None;
        for enemy in situation.enemies {
            if !enemy.class.can_engage() {
                continue;
            }
            let distance = origin.chebyshev(enemy.position);
            if best.is_none_or(|threat| distance < threat.distance) {
                best = Some(Threat {
                    enemy: *enemy,
                    distance,
                });
            }
        }
        best
    }

    pub fn decide(&self, situation: &Situation<'_>) -> ThreatDecision {
        let origin = situation.position();
        let anchor = situation.anchor.position;
        let moves = situation.legal_moves;

        if situation.on_spawn() {
            if let Some(direction) = MoveSelector::select(origin, moves, Objective::Maximize, |p| {
                p.chebyshev(anchor)
            }) {
                return Self::moving(ThreatState::OnSpawn, direction);
            }
        }

        if let Some(threat) = Self::nearest_threat(situation)
            .filter(|threat| threat.distance < self.danger_radius)
        {
            if let Some(direction) = self.retreat(origin, anchor, threat.enemy.position, moves) {
                tracing::debug!(
                    "{} retreats {} from {} at distance {}",
                    situation.unit.id,
                    direction,
                    threat.enemy.id,
                    threat.distance
                );
                return Self::moving(ThreatState::Retreating, direction);
            }
        } else if !self.band.contains(situation.anchor_distance()) {
            if let Some(direction) = self.reposition(origin, anchor, moves) {
                return Self::moving(ThreatState::Repositioning, direction);
            }
        }

        if self.band.contains(situation.anchor_distance()) {
            if let Some(target) = situation.closest_attackable_to_anchor() {
                return ThreatDecision {
                    state: ThreatState::Engaging,
                    command: Some(Command::Attack(target)),
                };
            }
        }

        ThreatDecision {
            state: ThreatState::Idle,
            command: None,
        }
    }

    fn moving(state: ThreatState, direction: Direction) -> ThreatDecision {
        ThreatDecision {
            state,
            command: Some(Command::Move(direction)),
        }
    }

    /// Farthest step from `threat`, in-band steps first.
    fn retreat(
        &self,
        origin: Position,
        anchor: Position,
        threat: Position,
        moves: &[Direction],
    ) -> Option<Direction> {
        let away = |p: Position| p.chebyshev(threat);
        MoveSelector::select_where(
            origin,
            moves,
            Objective::Maximize,
            |p| self.band.contains(p.chebyshev(anchor)),
            away,
        )
        .or_else(|| MoveSelector::select(origin, moves, Objective::Maximize, away))
    }

    /// Step that lands closest to the band midpoint, or at least toward the band.
    fn reposition(
        &self,
        origin: Position,
        anchor: Position,
        moves: &[Direction],
    ) -> Option<Direction> {
        let band = self.band;
        let in_band = MoveSelector::select_where(
            origin,
            moves,
            Objective::Minimize,
            |p| band.contains(p.chebyshev(anchor)),
            |p| band.deviation(p.chebyshev(anchor)),
        );
        if in_band.is_some() {
            return in_band;
        }

        let objective = if origin.chebyshev(anchor) > band.max {
            Objective::Minimize
        } else {
            Objective::Maximize
        };
        MoveSelector::select(origin, moves, objective, |p| p.chebyshev(anchor))
    }
}
