//! State a strategy carries from one turn to the next.
//!
//! Nothing in the tactics layer keeps hidden state between turns; whatever
//! must persist lives in a [`TacticsContext`] owned by the caller and passed
//! to every [`crate::Tactician::play_turn`].

use game_core::{EntityId, Position, UnitClass};

use crate::congestion::Resolution;
use crate::decision::{Command, Directive};
use crate::orders::CommitOutcome;

/// Per-strategy context threaded through every turn.
#[derive(Clone, Debug, Default)]
pub struct TacticsContext {
    turn: u64,
    turns_without_contact: u32,
    attack_class: Option<UnitClass>,
    last_summary: Option<TurnSummary>,
}

impl TacticsContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of the turn being played (1-based once play has started).
    pub fn turn(&self) -> u64 {
        self.turn
    }

    /// Consecutive finished turns with no enemy agent near any own anchor.
    pub fn turns_without_contact(&self) -> u32 {
        self.turns_without_contact
    }

    /// Outer-ring class chosen on the first turn both primary anchors were known.
    pub fn attack_class(&self) -> Option<UnitClass> {
        self.attack_class
    }

    pub fn last_summary(&self) -> Option<&TurnSummary> {
        self.last_summary.as_ref()
    }

    pub(crate) fn begin_turn(&mut self) -> u64 {
        self.turn += 1;
        self.turn
    }

    pub(crate) fn remember_attack_class(&mut self, class: UnitClass) {
        self.attack_class = Some(class);
    }

    pub(crate) fn record_contact(&mut self, contact: bool) {
        if contact {
            self.turns_without_contact = 0;
        } else {
            self.turns_without_contact = self.turns_without_contact.saturating_add(1);
        }
    }

    pub(crate) fn finish_turn(&mut self, summary: TurnSummary) {
        self.last_summary = Some(summary);
    }
}

/// Diagnostic record of one turn.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TurnSummary {
    pub turn: u64,
    pub spawns: Vec<SpawnReport>,
    pub formations: Vec<FormationReport>,
    pub agents: Vec<AgentReport>,
    pub committed: usize,
    pub rejected: usize,
}

impl TurnSummary {
    pub fn new(turn: u64) -> Self {
        Self {
            turn,
            ..Self::default()
        }
    }

    pub fn count(&self, directive: Directive) -> usize {
        self.agents
            .iter()
            .filter(|agent| agent.directive == directive)
            .count()
    }

    pub fn agent(&self, unit: EntityId) -> Option<&AgentReport> {
        self.agents.iter().find(|agent| agent.unit == unit)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpawnReport {
    pub anchor: EntityId,
    pub resolution: Resolution,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FormationReport {
    pub anchor: EntityId,
    /// Secondary anchor with no enemy in range; no template was built.
    pub dormant: bool,
    pub slots: usize,
    pub members: usize,
    pub assigned: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AgentReport {
    pub unit: EntityId,
    pub directive: Directive,
    pub command: Option<Command>,
    /// `None` when no command was issued.
    pub outcome: Option<CommitOutcome>,
    /// Formation slot the agent was given this turn.
    pub slot: Option<Position>,
}
