//! Bot configuration.
//!
//! All tunable thresholds live in [`BotConfig`], loaded from RON. Every
//! section has defaults, so a config file only needs the values it wants
//! to change:
//!
//! ```ron
//! BotConfig(
//!     seed: 7,
//!     economy: (max_workers: 70),
//! )
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::UnitKind;
use crate::error::{BotError, Result};
use crate::math::Fixed;

/// Largest radius or probe distance accepted, in map units.
pub const MAX_DISTANCE: u32 = 1024;

/// Engage/hold thresholds for one combat unit type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackThreshold {
    /// Unit type the threshold applies to.
    pub unit: UnitKind,
    /// Above this count (and above `minimum`) idle units commit to the shared target.
    pub engage: u32,
    /// At or below this count units never attack.
    pub minimum: u32,
}

impl AttackThreshold {
    /// Create a new threshold.
    #[must_use]
    pub const fn new(unit: UnitKind, engage: u32, minimum: u32) -> Self {
        Self {
            unit,
            engage,
            minimum,
        }
    }

    /// Count commits the whole idle group to the shared target.
    #[must_use]
    pub const fn engages(&self, count: u32) -> bool {
        count > self.engage && count > self.minimum
    }

    /// Count allows individual harassment of visible enemies.
    #[must_use]
    pub const fn harasses(&self, count: u32) -> bool {
        count > self.minimum
    }
}

/// Worker, supply, gas and expansion limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyLimits {
    /// Hard cap on drones.
    pub max_workers: u32,
    /// Worker target per base.
    pub max_per_base: u32,
    /// Build supply when this much or less is left.
    pub supply_low_water: u32,
    /// Supply cap beyond which no more supply is built.
    pub supply_ceiling: u32,
    /// Game steps per in-game minute; one base is due per minute.
    pub ticks_per_minute: u64,
    /// Mineral bank that triggers gas even on undersaturated bases.
    pub gas_mineral_high_water: u32,
    /// Extractors allowed per base.
    pub extractors_per_base: u32,
    /// Geyser search radius around a base.
    pub geyser_radius: u32,
    /// How close a queen must be to boost a base.
    pub booster_radius: u32,
}

impl Default for EconomyLimits {
    fn default() -> Self {
        Self {
            max_workers: 65,
            max_per_base: 16,
            supply_low_water: 4,
            supply_ceiling: 200,
            ticks_per_minute: 165,
            gas_mineral_high_water: 500,
            extractors_per_base: 2,
            geyser_radius: 15,
            booster_radius: 15,
        }
    }
}

impl EconomyLimits {
    /// Geyser radius in map units.
    #[must_use]
    pub fn geyser_radius(&self) -> Fixed {
        Fixed::saturating_from_num(self.geyser_radius)
    }

    /// Booster radius in map units.
    #[must_use]
    pub fn booster_radius(&self) -> Fixed {
        Fixed::saturating_from_num(self.booster_radius)
    }
}

/// Placement probing for perimeter-searched structures.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TechSettings {
    /// First probe distance from the anchor.
    pub probe_min: u32,
    /// Last probe distance from the anchor, inclusive.
    pub probe_max: u32,
}

impl Default for TechSettings {
    fn default() -> Self {
        Self {
            probe_min: 4,
            probe_max: 14,
        }
    }
}

/// Army composition knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArmySettings {
    /// Standing cap for anti-heavy and anti-air units.
    pub standing_cap: u32,
    /// Light units are topped up while army / light stays at or below this.
    pub light_bias_ratio: u32,
    /// A base counts as covered when a queen is within this radius.
    pub queen_radius: u32,
}

impl Default for ArmySettings {
    fn default() -> Self {
        Self {
            standing_cap: 5,
            light_bias_ratio: 2,
            queen_radius: 15,
        }
    }
}

impl ArmySettings {
    /// Queen coverage radius in map units.
    #[must_use]
    pub fn queen_radius(&self) -> Fixed {
        Fixed::saturating_from_num(self.queen_radius)
    }
}

/// Strategy phase thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseSettings {
    /// Recovery is only considered from this tick on.
    pub recover_after_tick: u64,
    /// Fewer workers than this (after `recover_after_tick`) means recovery.
    pub recover_worker_floor: u32,
}

impl Default for PhaseSettings {
    fn default() -> Self {
        Self {
            recover_after_tick: 495,
            recover_worker_floor: 12,
        }
    }
}

/// Complete bot configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Seed mixed with the tick index for random choices.
    pub seed: u64,
    /// Economy limits.
    pub economy: EconomyLimits,
    /// Tech tree settings.
    pub tech: TechSettings,
    /// Army settings.
    pub army: ArmySettings,
    /// Attack thresholds, evaluated in this order.
    pub attack_thresholds: Vec<AttackThreshold>,
    /// Phase settings.
    pub phase: PhaseSettings,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            economy: EconomyLimits::default(),
            tech: TechSettings::default(),
            army: ArmySettings::default(),
            attack_thresholds: vec![
                AttackThreshold::new(UnitKind::Zergling, 20, 5),
                AttackThreshold::new(UnitKind::Roach, 5, 3),
                AttackThreshold::new(UnitKind::Hydralisk, 5, 3),
            ],
            phase: PhaseSettings::default(),
        }
    }
}

impl BotConfig {
    /// Load a config from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(BotError::ConfigNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Parse and validate a config from a RON string.
    pub fn from_ron_str(ron: &str) -> Result<Self> {
        let config: BotConfig = ron::from_str(ron)?;
        config.validate()?;
        Ok(config)
    }

    /// Threshold configured for a unit type, if any.
    #[must_use]
    pub fn threshold_for(&self, unit: UnitKind) -> Option<&AttackThreshold> {
        self.attack_thresholds.iter().find(|t| t.unit == unit)
    }

    /// Reject values the planners cannot work with.
    pub fn validate(&self) -> Result<()> {
        let invalid = |field: &str, message: &str| {
            Err(BotError::InvalidConfig {
                field: field.to_string(),
                message: message.to_string(),
            })
        };

        if self.economy.ticks_per_minute == 0 {
            return invalid("economy.ticks_per_minute", "must be positive");
        }
        if self.economy.max_per_base == 0 {
            return invalid("economy.max_per_base", "must be positive");
        }
        if self.economy.supply_ceiling == 0 {
            return invalid("economy.supply_ceiling", "must be positive");
        }
        if self.tech.probe_min > self.tech.probe_max {
            return invalid("tech.probe_min", "must not exceed tech.probe_max");
        }
        if self.army.light_bias_ratio == 0 {
            return invalid("army.light_bias_ratio", "must be positive");
        }

        let distances = [
            ("economy.geyser_radius", self.economy.geyser_radius),
            ("economy.booster_radius", self.economy.booster_radius),
            ("army.queen_radius", self.army.queen_radius),
            ("tech.probe_min", self.tech.probe_min),
            ("tech.probe_max", self.tech.probe_max),
        ];
        for (field, value) in distances {
            if value > MAX_DISTANCE {
                return invalid(field, &format!("must not exceed {MAX_DISTANCE} map units"));
            }
        }

        let mut seen = Vec::with_capacity(self.attack_thresholds.len());
        for threshold in &self.attack_thresholds {
            if seen.contains(&threshold.unit) {
                return invalid("attack_thresholds", "unit listed twice");
            }
            if matches!(
                threshold.unit,
                UnitKind::Larva | UnitKind::Drone | UnitKind::Overlord
            ) {
                return invalid("attack_thresholds", "threshold on a non-combat unit");
            }
            seen.push(threshold.unit);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_constants() {
        let config = BotConfig::default();
        assert_eq!(config.economy.max_workers, 65);
        assert_eq!(config.economy.max_per_base, 16);
        assert_eq!(config.economy.ticks_per_minute, 165);
        assert_eq!(config.tech.probe_min, 4);
        assert_eq!(config.tech.probe_max, 14);
        assert_eq!(
            config.threshold_for(UnitKind::Zergling),
            Some(&AttackThreshold::new(UnitKind::Zergling, 20, 5))
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_ron_keeps_defaults() {
        let config = BotConfig::from_ron_str("(seed: 9, economy: (max_workers: 40))").unwrap();
        assert_eq!(config.seed, 9);
        assert_eq!(config.economy.max_workers, 40);
        assert_eq!(config.economy.max_per_base, 16);
        assert_eq!(config.attack_thresholds.len(), 3);
    }

    #[test]
    fn test_thresholds_from_ron() {
        let config = BotConfig::from_ron_str(
            "(attack_thresholds: [(unit: Roach, engage: 8, minimum: 2)])",
        )
        .unwrap();
        assert_eq!(config.attack_thresholds.len(), 1);
        assert!(config.attack_thresholds[0].engages(9));
        assert!(!config.attack_thresholds[0].engages(8));
    }

    #[test]
    fn test_inverted_probe_range_is_rejected() {
        let err = BotConfig::from_ron_str("(tech: (probe_min: 10, probe_max: 4))").unwrap_err();
        assert!(matches!(err, BotError::InvalidConfig { ref field, .. } if field == "tech.probe_min"));
    }

    #[test]
    fn test_distances_are_bounded() {
        let err = BotConfig::from_ron_str("(economy: (geyser_radius: 3000000000))").unwrap_err();
        assert!(
            matches!(err, BotError::InvalidConfig { ref field, .. } if field == "economy.geyser_radius")
        );

        let err = BotConfig::from_ron_str("(tech: (probe_min: 4, probe_max: 5000))").unwrap_err();
        assert!(matches!(err, BotError::InvalidConfig { ref field, .. } if field == "tech.probe_max"));

        let mut config = BotConfig::default();
        config.army.queen_radius = MAX_DISTANCE;
        assert!(config.validate().is_ok());
        config.army.queen_radius = MAX_DISTANCE + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_oversized_radius_saturates_instead_of_panicking() {
        let mut economy = EconomyLimits::default();
        economy.geyser_radius = u32::MAX;
        assert_eq!(economy.geyser_radius(), Fixed::MAX);
    }

    #[test]
    fn test_duplicate_threshold_is_rejected() {
        let mut config = BotConfig::default();
        config
            .attack_thresholds
            .push(AttackThreshold::new(UnitKind::Roach, 1, 1));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_garbage_is_a_parse_error() {
        let err = BotConfig::from_ron_str("(seed: \"seven\")").unwrap_err();
        assert!(matches!(err, BotError::ConfigParse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = BotConfig::load("definitely/not/here.ron").unwrap_err();
        assert!(matches!(err, BotError::ConfigNotFound(_)));
    }

    #[test]
    fn test_threshold_predicates() {
        let roach = AttackThreshold::new(UnitKind::Roach, 5, 3);
        assert!(roach.engages(6));
        assert!(!roach.engages(5));
        assert!(roach.harasses(4));
        assert!(!roach.harasses(3));
    }
}
