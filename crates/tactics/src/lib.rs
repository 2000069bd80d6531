//! Tactical coordination for turn-based strategy bots.
//!
//! The crate turns a read-only view of the world into per-agent commands:
//!
//! - [`CongestionResolver`]: frees blocked spawn cells by shifting a chain of
//!   own agents outward
//! - [`FormationAllocator`]: assigns agents to ring slots around their anchor
//! - [`ThreatController`]: distance-band state machine for siege agents
//! - [`MoveSelector`]: deterministic best-direction search shared by all of the above
//!
//! [`Tactician`] runs them in order once per turn, acting through the
//! [`game_core::World`] commit surface and keeping cross-turn state in a
//! [`TacticsContext`].

pub mod congestion;
pub mod context;
pub mod decision;
pub mod fallback;
pub mod formation;
pub mod keeper;
pub mod orders;
pub mod selector;
pub mod tactician;
pub mod threat;

pub use congestion::{CongestionResolver, Resolution, find_escape_path};
pub use context::{AgentReport, FormationReport, SpawnReport, TacticsContext, TurnSummary};
pub use decision::{Command, Decision, Directive, Situation};
pub use fallback::{AdvanceOnEnemy, Fallback, HoldPosition};
pub use formation::{
    Anchor, Assignment, Formation, FormationAllocator, Heading, Slot, SlotTemplate,
    collect_anchors, nearest_anchor,
};
pub use keeper::{SlotKeeper, advance_to_slot};
pub use orders::{CommitOutcome, MoveSet, Orders};
pub use selector::{MoveSelector, Objective};
pub use tactician::Tactician;
pub use threat::{Threat, ThreatController, ThreatDecision, ThreatState};
