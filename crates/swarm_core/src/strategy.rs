//! Strategy phase state machine.
//!
//! The phase is derived from the snapshot at the start of every tick and
//! is never stored, so it cannot drift from what the engine reports.
//! Planners consult it to decide whether to act:
//!
//! | Phase     | Effect                                                   |
//! |-----------|----------------------------------------------------------|
//! | `Recover` | tech, upgrades and attacks pause; economy rebuilds       |
//! | `Attack`  | everything runs; some unit group is over its threshold   |
//! | `Expand`  | zergling top-ups pause while the bank is short of a base |
//! | `Army`    | everything runs; army tech is online                     |
//! | `Economy` | everything runs; no army tech yet                        |
//!
//! `Attack` outranks `Expand`: a committed army keeps reinforcing even
//! when a base is overdue.

use serde::{Deserialize, Serialize};

use crate::catalog::{Product, StructureKind};
use crate::command::PlannerKind;
use crate::config::BotConfig;
use crate::snapshot::WorldSnapshot;

/// Current strategic priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategyPhase {
    /// Building up workers before army tech.
    Economy,
    /// Army tech online, building units.
    Army,
    /// At least one unit group is over its engage threshold.
    Attack,
    /// Worker count collapsed; rebuild before spending elsewhere.
    Recover,
    /// A new base is due and none is on the way.
    Expand,
}

impl StrategyPhase {
    /// Derive the phase from a snapshot.
    ///
    /// Checked in priority order: recover, attack, expand, army, economy.
    #[must_use]
    pub fn derive(snapshot: &WorldSnapshot, config: &BotConfig) -> Self {
        if snapshot.tick >= config.phase.recover_after_tick
            && snapshot.worker_count() < config.phase.recover_worker_floor
        {
            return Self::Recover;
        }

        let engaged = config.attack_thresholds.iter().any(|threshold| {
            threshold.engages(snapshot.units_of(threshold.unit).count())
        });
        if engaged {
            return Self::Attack;
        }

        if expansion_outstanding(snapshot, config) {
            return Self::Expand;
        }

        let pool_built = snapshot
            .structures_of(StructureKind::SpawningPool)
            .ready()
            .exists();
        if pool_built {
            Self::Army
        } else {
            Self::Economy
        }
    }

    /// Whether a planner should run in this phase.
    #[must_use]
    pub const fn allows(self, planner: PlannerKind) -> bool {
        match self {
            Self::Recover => matches!(planner, PlannerKind::Economy | PlannerKind::Army),
            Self::Economy | Self::Army | Self::Attack | Self::Expand => true,
        }
    }

    /// Whether this phase saves minerals for a new base.
    #[must_use]
    pub const fn banks_for_expansion(self) -> bool {
        matches!(self, Self::Expand)
    }
}

/// One base per in-game minute: `bases * ticks_per_minute < tick`.
#[must_use]
pub fn expansion_due(snapshot: &WorldSnapshot, config: &BotConfig) -> bool {
    let bases = u64::from(snapshot.townhalls().count());
    bases.saturating_mul(config.economy.ticks_per_minute) < snapshot.tick
}

/// An expansion is due and no hatchery is queued or under construction.
#[must_use]
pub fn expansion_outstanding(snapshot: &WorldSnapshot, config: &BotConfig) -> bool {
    let hatchery = Product::Structure(StructureKind::Hatchery);
    let on_the_way = snapshot.pending_count(hatchery) > 0
        || snapshot
            .structures_of(StructureKind::Hatchery)
            .iter()
            .any(|hatch| !hatch.ready);
    expansion_due(snapshot, config) && !on_the_way
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::UnitKind;
    use crate::math::Vec2Fixed;
    use crate::snapshot::Unit;

    fn unit<K>(id: u64, kind: K) -> Unit<K> {
        Unit {
            id,
            kind,
            position: Vec2Fixed::ZERO,
            ready: true,
            orders: 0,
            surplus_harvesters: 0,
            abilities: Vec::new(),
        }
    }

    fn snapshot(tick: u64, drones: u64) -> WorldSnapshot {
        WorldSnapshot {
            tick,
            units: (0..drones).map(|i| unit(100 + i, UnitKind::Drone)).collect(),
            structures: vec![unit(1, StructureKind::Hatchery)],
            ..Default::default()
        }
    }

    #[test]
    fn test_opening_is_economy() {
        let config = BotConfig::default();
        assert_eq!(
            StrategyPhase::derive(&snapshot(0, 12), &config),
            StrategyPhase::Economy
        );
    }

    #[test]
    fn test_pool_moves_to_army() {
        let config = BotConfig::default();
        let mut snap = snapshot(10, 14);
        snap.structures.push(unit(2, StructureKind::SpawningPool));
        assert_eq!(StrategyPhase::derive(&snap, &config), StrategyPhase::Army);
    }

    #[test]
    fn test_expansion_due_after_a_minute_per_base() {
        let config = BotConfig::default();
        assert!(!expansion_due(&snapshot(165, 12), &config));
        assert!(expansion_due(&snapshot(166, 12), &config));
        assert_eq!(
            StrategyPhase::derive(&snapshot(166, 16), &config),
            StrategyPhase::Expand
        );
    }

    #[test]
    fn test_worker_collapse_is_recover() {
        let config = BotConfig::default();
        let snap = snapshot(600, 5);
        let phase = StrategyPhase::derive(&snap, &config);
        assert_eq!(phase, StrategyPhase::Recover);
        assert!(!phase.allows(PlannerKind::Combat));
        assert!(!phase.allows(PlannerKind::TechTree));
        assert!(phase.allows(PlannerKind::Economy));
    }

    #[test]
    fn test_engaged_group_is_attack() {
        let config = BotConfig::default();
        let mut snap = snapshot(10, 14);
        snap.units
            .extend((0..6).map(|i| unit(500 + i, UnitKind::Roach)));
        assert_eq!(StrategyPhase::derive(&snap, &config), StrategyPhase::Attack);
    }

    #[test]
    fn test_only_expand_banks() {
        assert!(StrategyPhase::Expand.banks_for_expansion());
        assert!(StrategyPhase::Expand.allows(PlannerKind::Army));
        assert!(!StrategyPhase::Army.banks_for_expansion());
        assert!(!StrategyPhase::Attack.banks_for_expansion());
    }

    #[test]
    fn test_hatchery_on_the_way_is_not_expand() {
        let config = BotConfig::default();

        let mut queued = snapshot(400, 16);
        queued
            .pending
            .insert(Product::Structure(StructureKind::Hatchery), 1);
        assert!(expansion_due(&queued, &config));
        assert!(!expansion_outstanding(&queued, &config));
        assert_eq!(StrategyPhase::derive(&queued, &config), StrategyPhase::Economy);

        let mut building = snapshot(400, 16);
        let mut hatch = unit(2, StructureKind::Hatchery);
        hatch.ready = false;
        building.structures.push(hatch);
        building.structures.push(unit(3, StructureKind::SpawningPool));
        // Two townhalls cover 330 ticks; 400 is still overdue.
        assert!(expansion_due(&building, &config));
        assert_eq!(StrategyPhase::derive(&building, &config), StrategyPhase::Army);
    }

    #[test]
    fn test_attack_outranks_expand() {
        let config = BotConfig::default();
        let mut snap = snapshot(400, 16);
        snap.units
            .extend((0..6).map(|i| unit(500 + i, UnitKind::Roach)));
        assert!(expansion_outstanding(&snap, &config));
        assert_eq!(StrategyPhase::derive(&snap, &config), StrategyPhase::Attack);
    }
}
