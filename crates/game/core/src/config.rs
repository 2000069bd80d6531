//! Tunable parameters of the tactics layer.
//!
//! Every field has a default matching the tuned values of the strategy the
//! tactics layer grew out of. Loaders deserialize partial TOML documents on
//! top of these defaults, then call [`TacticsConfig::validate`].

use crate::state::UnitClass;

/// Distance band `[min, max]` (inclusive, Chebyshev) around an anchor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DistanceBand {
    pub min: u32,
    pub max: u32,
}

impl DistanceBand {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub const fn contains(&self, distance: u32) -> bool {
        distance >= self.min && distance <= self.max
    }

    /// Twice the distance from `distance` to the band midpoint.
    ///
    /// Kept in integers so an odd `min + max` needs no rounding.
    pub const fn deviation(&self, distance: u32) -> u32 {
        (2 * distance).abs_diff(self.min + self.max)
    }
}

impl Default for DistanceBand {
    fn default() -> Self {
        Self::new(TacticsConfig::DEFAULT_BAND_MIN, TacticsConfig::DEFAULT_BAND_MAX)
    }
}

/// What an agent with nothing better to do falls back on.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
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
pub enum FallbackMode {
    /// Step toward the enemy primary anchor.
    #[default]
    Advance,
    /// Do nothing.
    Hold,
}

/// Replaces the support class on one inner ring.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RingOverride {
    pub ring: u32,
    pub class: UnitClass,
}

/// Ring template and assignment options.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FormationConfig {
    /// Class expected on the inner rings.
    pub support_class: UnitClass,
    /// Class placed on the outer-ring corners of secondary anchors.
    ///
    /// Primary anchors are garrisoned by support agents on every ring unless
    /// `primary_attack_ring` is set.
    pub siege_class: UnitClass,
    /// Pins the outer-ring class instead of choosing it from the map.
    pub attack_class: Option<UnitClass>,
    /// Outer-ring class when the primary anchors are far apart.
    pub distant_attack_class: UnitClass,
    /// Outer-ring class when the primary anchors are close.
    pub close_attack_class: UnitClass,
    /// Primary-anchor distance above which `distant_attack_class` is chosen.
    pub attack_class_threshold: u32,
    pub ring_overrides: Vec<RingOverride>,
    /// Tags ring 4 of primary anchors with the attack class too.
    pub primary_attack_ring: bool,
    /// Secondary anchors with no enemy closer than this are left unformed.
    pub dormant_radius: u32,
}

impl FormationConfig {
    pub const RINGS: [u32; 3] = [2, 3, 4];
    pub const ATTACK_RING: u32 = 4;

    pub const DEFAULT_ATTACK_CLASS_THRESHOLD: u32 = 17;
    pub const DEFAULT_DORMANT_RADIUS: u32 = 25;

    pub fn new() -> Self {
        Self {
            support_class: UnitClass::Healer,
            siege_class: UnitClass::Catapult,
            attack_class: None,
            distant_attack_class: UnitClass::Warrior,
            close_attack_class: UnitClass::Swordsman,
            attack_class_threshold: Self::DEFAULT_ATTACK_CLASS_THRESHOLD,
            ring_overrides: Vec::new(),
            primary_attack_ring: false,
            dormant_radius: Self::DEFAULT_DORMANT_RADIUS,
        }
    }

    /// Class tagged on an inner ring, honoring overrides.
    pub fn inner_ring_class(&self, ring: u32) -> UnitClass {
        self.ring_overrides
            .iter()
            .find(|entry| entry.ring == ring)
            .map(|entry| entry.class)
            .unwrap_or(self.support_class)
    }

    /// Outer-ring class for a given distance between the two primary anchors.
    pub fn attack_class_for_distance(&self, distance: u32) -> UnitClass {
        if let Some(pinned) = self.attack_class {
            return pinned;
        }
        if distance > self.attack_class_threshold {
            self.distant_attack_class
        } else {
            self.close_attack_class
        }
    }
}

impl Default for FormationConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration of the whole tactics layer.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TacticsConfig {
    /// An engaging enemy strictly closer than this triggers a retreat.
    pub danger_radius: u32,
    pub band: DistanceBand,
    pub formation: FormationConfig,
    pub fallback: FallbackMode,
}

impl TacticsConfig {
    pub const DEFAULT_DANGER_RADIUS: u32 = 3;
    pub const DEFAULT_BAND_MIN: u32 = 3;
    pub const DEFAULT_BAND_MAX: u32 = 7;

    pub fn new() -> Self {
        Self {
            danger_radius: Self::DEFAULT_DANGER_RADIUS,
            band: DistanceBand::default(),
            formation: FormationConfig::new(),
            fallback: FallbackMode::default(),
        }
    }

    #[must_use]
    pub fn with_danger_radius(mut self, danger_radius: u32) -> Self {
        self.danger_radius = danger_radius;
        self
    }

    #[must_use]
    pub fn with_band(mut self, min: u32, max: u32) -> Self {
        self.band = DistanceBand::new(min, max);
        self
    }

    #[must_use]
    pub fn with_attack_class(mut self, class: UnitClass) -> Self {
        self.formation.attack_class = Some(class);
        self
    }

    #[must_use]
    pub fn with_ring_override(mut self, ring: u32, class: UnitClass) -> Self {
        self.formation
            .ring_overrides
            .retain(|entry| entry.ring != ring);
        self.formation.ring_overrides.push(RingOverride { ring, class });
        self
    }

    #[must_use]
    pub fn with_primary_attack_ring(mut self, enabled: bool) -> Self {
        self.formation.primary_attack_ring = enabled;
        self
    }

    #[must_use]
    pub fn with_dormant_radius(mut self, radius: u32) -> Self {
        self.formation.dormant_radius = radius;
        self
    }

    #[must_use]
    pub fn with_fallback(mut self, fallback: FallbackMode) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.band.min > self.band.max {
            return Err(ConfigError::InvertedBand {
                min: self.band.min,
                max: self.band.max,
            });
        }

        let formation = &self.formation;
        for (index, entry) in formation.ring_overrides.iter().enumerate() {
            if entry.ring == FormationConfig::ATTACK_RING
                || !FormationConfig::RINGS.contains(&entry.ring)
            {
                return Err(ConfigError::UnknownRing(entry.ring));
            }
            if formation.ring_overrides[..index]
                .iter()
                .any(|earlier| earlier.ring == entry.ring)
            {
                return Err(ConfigError::DuplicateRing(entry.ring));
            }
        }

        let attack_classes = formation.attack_class.into_iter().chain([
            formation.distant_attack_class,
            formation.close_attack_class,
        ]);
        for class in attack_classes {
            if !class.can_engage() {
                return Err(ConfigError::UnarmedAttackClass(class));
            }
        }

        Ok(())
    }
}

impl Default for TacticsConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("distance band is inverted: min {min} > max {max}")]
    InvertedBand { min: u32, max: u32 },

    #[error("ring {0} cannot be overridden; only inner rings 2 and 3 can")]
    UnknownRing(u32),

    #[error("ring {0} is overridden more than once")]
    DuplicateRing(u32),

    #[error("attack class {0} has no attack")]
    UnarmedAttackClass(UnitClass),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let config = TacticsConfig::default();
        assert_eq!(config.danger_radius, 3);
        assert_eq!(config.band, DistanceBand::new(3, 7));
        assert_eq!(config.formation.dormant_radius, 25);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn deviation_is_twice_the_midpoint_distance() {
        let band = DistanceBand::new(3, 7);
        assert_eq!(band.deviation(5), 0);
        assert_eq!(band.deviation(3), 4);
        assert_eq!(band.deviation(8), 6);
        assert!(band.contains(3) && band.contains(7));
        assert!(!band.contains(2) && !band.contains(8));
    }

    #[test]
    fn attack_class_follows_anchor_distance_unless_pinned() {
        let formation = FormationConfig::new();
        assert_eq!(formation.attack_class_for_distance(18), UnitClass::Warrior);
        assert_eq!(formation.attack_class_for_distance(17), UnitClass::Swordsman);

        let pinned = TacticsConfig::new().with_attack_class(UnitClass::Knight);
        assert_eq!(
            pinned.formation.attack_class_for_distance(40),
            UnitClass::Knight
        );
    }

    #[test]
    fn ring_override_replaces_support_class() {
        let config = TacticsConfig::new().with_ring_override(3, UnitClass::Knight);
        assert_eq!(config.formation.inner_ring_class(3), UnitClass::Knight);
        assert_eq!(config.formation.inner_ring_class(2), UnitClass::Healer);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn invalid_configs_are_rejected() {
        assert_eq!(
            TacticsConfig::new().with_band(8, 2).validate(),
            Err(ConfigError::InvertedBand { min: 8, max: 2 })
        );
        assert_eq!(
            TacticsConfig::new()
                .with_ring_override(4, UnitClass::Knight)
                .validate(),
            Err(ConfigError::UnknownRing(4))
        );
        assert_eq!(
            TacticsConfig::new()
                .with_attack_class(UnitClass::Healer)
                .validate(),
            Err(ConfigError::UnarmedAttackClass(UnitClass::Healer))
        );
    }
}
