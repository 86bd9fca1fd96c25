//! Test fixtures and helpers.
//!
//! Pre-built snapshots and a builder for custom ones, so every test
//! starts from the same map layout:
//!
//! - Main base at (20, 20)
//! - Map center at (100, 100)
//! - Enemy start at (180, 180)

use fixed::types::I32F32;
use swarm_core::catalog::{Ability, Product, Research, StructureKind, UnitKind};
use swarm_core::math::Vec2Fixed;
use swarm_core::snapshot::{EntityId, Geyser, Unit, VisibleEnemy, WorldSnapshot};

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a point from whole coordinates.
#[must_use]
pub fn point(x: i32, y: i32) -> Vec2Fixed {
    Vec2Fixed::from_ints(x, y)
}

/// Main base position used by [`opening`].
pub const HOME: (i32, i32) = (20, 20);

/// Map center used by [`SnapshotBuilder::new`].
pub const CENTER: (i32, i32) = (100, 100);

/// Enemy start location used by [`SnapshotBuilder::new`].
pub const ENEMY_START: (i32, i32) = (180, 180);

/// Abilities the engine would list for a fresh unit of this kind.
#[must_use]
pub fn unit_abilities(kind: UnitKind) -> Vec<Ability> {
    match kind {
        UnitKind::Queen => vec![Ability::Attack, Ability::InjectLarva],
        UnitKind::Zergling | UnitKind::Roach | UnitKind::Hydralisk => vec![Ability::Attack],
        UnitKind::Larva | UnitKind::Drone | UnitKind::Overlord => Vec::new(),
    }
}

/// Abilities the engine would list for a finished structure of this kind.
#[must_use]
pub fn structure_abilities(kind: StructureKind) -> Vec<Ability> {
    match kind {
        StructureKind::Hatchery => vec![Ability::UpgradeToLair],
        StructureKind::Lair => vec![Ability::UpgradeToHive],
        StructureKind::SpawningPool => vec![Ability::Research(Research::MetabolicBoost)],
        StructureKind::EvolutionChamber => vec![
            Ability::Research(Research::MeleeWeaponsLevel1),
            Ability::Research(Research::MissileWeaponsLevel1),
            Ability::Research(Research::GroundCarapaceLevel1),
        ],
        _ => Vec::new(),
    }
}

/// Builder for [`WorldSnapshot`]s.
///
/// Entity IDs are handed out sequentially from 1 in call order, so a
/// test can predict them.
#[derive(Debug, Clone)]
pub struct SnapshotBuilder {
    snapshot: WorldSnapshot,
    next_id: EntityId,
}

impl Default for SnapshotBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotBuilder {
    /// Empty map with the standard center and one enemy start location.
    #[must_use]
    pub fn new() -> Self {
        Self {
            snapshot: WorldSnapshot {
                map_center: point(CENTER.0, CENTER.1),
                enemy_start_locations: vec![point(ENEMY_START.0, ENEMY_START.1)],
                ..Default::default()
            },
            next_id: 1,
        }
    }

    fn allocate(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// ID the next added entity will get.
    #[must_use]
    pub fn next_id(&self) -> EntityId {
        self.next_id
    }

    /// Set the tick index.
    #[must_use]
    pub fn tick(mut self, tick: u64) -> Self {
        self.snapshot.tick = tick;
        self
    }

    /// Set mineral and vespene stock.
    #[must_use]
    pub fn resources(mut self, minerals: u32, vespene: u32) -> Self {
        self.snapshot.minerals = minerals;
        self.snapshot.vespene = vespene;
        self
    }

    /// Set supply used and cap.
    #[must_use]
    pub fn supply(mut self, used: u32, cap: u32) -> Self {
        self.snapshot.supply_used = used;
        self.snapshot.supply_cap = cap;
        self
    }

    /// Add a ready hatchery.
    #[must_use]
    pub fn base(self, x: i32, y: i32) -> Self {
        self.structure(StructureKind::Hatchery, x, y)
    }

    /// Add a ready structure with its default abilities.
    #[must_use]
    pub fn structure(mut self, kind: StructureKind, x: i32, y: i32) -> Self {
        let id = self.allocate();
        self.snapshot.structures.push(Unit {
            id,
            kind,
            position: point(x, y),
            ready: true,
            orders: 0,
            surplus_harvesters: 0,
            abilities: structure_abilities(kind),
        });
        self
    }

    /// Add a structure still under construction.
    #[must_use]
    pub fn unfinished(mut self, kind: StructureKind, x: i32, y: i32) -> Self {
        let id = self.allocate();
        self.snapshot.structures.push(Unit {
            id,
            kind,
            position: point(x, y),
            ready: false,
            orders: 0,
            surplus_harvesters: 0,
            abilities: Vec::new(),
        });
        self
    }

    /// Add `count` ready, idle units at one position.
    #[must_use]
    pub fn units(mut self, kind: UnitKind, count: u32, x: i32, y: i32) -> Self {
        for _ in 0..count {
            let id = self.allocate();
            self.snapshot.units.push(Unit {
                id,
                kind,
                position: point(x, y),
                ready: true,
                orders: 0,
                surplus_harvesters: 0,
                abilities: unit_abilities(kind),
            });
        }
        self
    }

    /// Add `count` units that already have an order queued.
    #[must_use]
    pub fn busy_units(mut self, kind: UnitKind, count: u32, x: i32, y: i32) -> Self {
        for _ in 0..count {
            let id = self.allocate();
            self.snapshot.units.push(Unit {
                id,
                kind,
                position: point(x, y),
                ready: true,
                orders: 1,
                surplus_harvesters: 0,
                abilities: unit_abilities(kind),
            });
        }
        self
    }

    /// Add a neutral geyser.
    #[must_use]
    pub fn geyser(mut self, x: i32, y: i32) -> Self {
        let id = self.allocate();
        self.snapshot.geysers.push(Geyser {
            id,
            position: point(x, y),
        });
        self
    }

    /// Record orders in flight for a product.
    #[must_use]
    pub fn pending(mut self, product: Product, count: u32) -> Self {
        self.snapshot.pending.insert(product, count);
        self
    }

    /// Set worker surplus on every townhall.
    #[must_use]
    pub fn saturation(mut self, surplus: i32) -> Self {
        for structure in &mut self.snapshot.structures {
            if structure.kind.is_townhall() {
                structure.surplus_harvesters = surplus;
            }
        }
        self
    }

    /// Add a visible enemy unit.
    #[must_use]
    pub fn enemy_unit(mut self, x: i32, y: i32) -> Self {
        let id = self.allocate();
        self.snapshot.enemy_units.push(VisibleEnemy {
            id,
            position: point(x, y),
        });
        self
    }

    /// Add a visible enemy structure.
    #[must_use]
    pub fn enemy_structure(mut self, x: i32, y: i32) -> Self {
        let id = self.allocate();
        self.snapshot.enemy_structures.push(VisibleEnemy {
            id,
            position: point(x, y),
        });
        self
    }

    /// Scatter visible enemy units and structures around the enemy start.
    #[must_use]
    pub fn enemies(mut self, units: usize, structures: usize) -> Self {
        let (x, y) = ENEMY_START;
        for i in 0..units {
            let offset = i32::try_from(i).unwrap_or(0);
            self = self.enemy_unit(x - 10 - 3 * offset, y - 10);
        }
        for i in 0..structures {
            let offset = i32::try_from(i).unwrap_or(0);
            self = self.enemy_structure(x + 4 * offset, y);
        }
        self
    }

    /// Replace the enemy start locations.
    #[must_use]
    pub fn enemy_starts(mut self, starts: &[(i32, i32)]) -> Self {
        self.snapshot.enemy_start_locations = starts.iter().map(|&(x, y)| point(x, y)).collect();
        self
    }

    /// Move the map center.
    #[must_use]
    pub fn map_center(mut self, x: i32, y: i32) -> Self {
        self.snapshot.map_center = point(x, y);
        self
    }

    /// Finish the snapshot.
    #[must_use]
    pub fn build(self) -> WorldSnapshot {
        self.snapshot
    }
}

/// The standard opening: one base, twelve drones, an overlord, three
/// larvae, two geysers, 50 minerals and 12/14 supply.
#[must_use]
pub fn opening() -> SnapshotBuilder {
    let (x, y) = HOME;
    SnapshotBuilder::new()
        .base(x, y)
        .units(UnitKind::Drone, 12, x + 3, y)
        .units(UnitKind::Larva, 3, x, y - 2)
        .units(UnitKind::Overlord, 1, x, y)
        .geyser(x + 7, y + 2)
        .geyser(x - 6, y + 5)
        .resources(50, 0)
        .supply(12, 14)
}

/// Parse a snapshot from RON, for scenario files.
///
/// # Panics
///
/// Panics if the text is not a valid snapshot.
#[must_use]
pub fn snapshot_from_ron(text: &str) -> WorldSnapshot {
    match ron::from_str(text) {
        Ok(snapshot) => snapshot,
        Err(err) => panic!("invalid snapshot RON: {err}"),
    }
}

/// Dump a snapshot as RON, to paste a failing case into a test.
#[must_use]
pub fn snapshot_to_ron(snapshot: &WorldSnapshot) -> String {
    ron::ser::to_string_pretty(snapshot, ron::ser::PrettyConfig::default()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_sequential() {
        let builder = SnapshotBuilder::new().base(0, 0).units(UnitKind::Drone, 2, 1, 1);
        assert_eq!(builder.next_id(), 4);
        let snapshot = builder.build();
        let ids: Vec<_> = snapshot.units.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn test_opening_layout() {
        let snapshot = opening().build();
        assert_eq!(snapshot.townhalls().amount(), 1);
        assert_eq!(snapshot.workers().amount(), 12);
        assert_eq!(snapshot.units_of(UnitKind::Larva).amount(), 3);
        assert_eq!(snapshot.supply_left(), 2);
        assert_eq!(snapshot.geysers.len(), 2);
    }

    #[test]
    fn test_ron_roundtrip_keeps_layout() {
        let snapshot = opening().tick(42).build();
        let restored = snapshot_from_ron(&snapshot_to_ron(&snapshot));
        assert_eq!(restored, snapshot);
    }
}
