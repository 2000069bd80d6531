use super::{EntityId, Position, Team};

/// Buildings that can serve as formation anchors.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum StructureKind {
    MainCastle,
    Farm,
}

impl StructureKind {
    pub const fn anchor_kind(self) -> AnchorKind {
        match self {
            StructureKind::MainCastle => AnchorKind::Primary,
            StructureKind::Farm => AnchorKind::Secondary,
        }
    }
}

/// Role a structure plays as a formation center.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum AnchorKind {
    Primary,
    Secondary,
}

/// Snapshot of one structure as observed at query time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StructureState {
    pub id: EntityId,
    pub position: Position,
    pub kind: StructureKind,
    pub team: Team,
    /// Cell where new agents appear. Equals `position` unless the engine says otherwise.
    pub spawn: Position,
}

impl StructureState {
    pub fn new(id: EntityId, position: Position, kind: StructureKind, team: Team) -> Self {
        Self {
            id,
            position,
            kind,
            team,
            spawn: position,
        }
    }

    #[must_use]
    pub fn with_spawn(mut self, spawn: Position) -> Self {
        self.spawn = spawn;
        self
    }

    pub fn is_primary(&self) -> bool {
        self.kind.anchor_kind() == AnchorKind::Primary
    }
}
