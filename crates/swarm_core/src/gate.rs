//! Affordability and availability predicates.
//!
//! [`ResourceGate`] is a pure view over the snapshot, the catalog and the
//! amount already spent this tick. Missing data always answers `false`;
//! the gate never fails.

use crate::catalog::{Ability, Catalog, Cost, Product, ProductionSource, StructureKind, UnitKind};
use crate::snapshot::{Unit, WorldSnapshot};

/// Snapshot-only predicates used by every planner.
#[derive(Debug, Clone, Copy)]
pub struct ResourceGate<'a> {
    snapshot: &'a WorldSnapshot,
    catalog: &'a Catalog,
    spent: Cost,
}

impl<'a> ResourceGate<'a> {
    /// Create a gate over a snapshot, minus what has already been spent.
    #[must_use]
    pub const fn new(snapshot: &'a WorldSnapshot, catalog: &'a Catalog, spent: Cost) -> Self {
        Self {
            snapshot,
            catalog,
            spent,
        }
    }

    /// Minerals still unspent this tick.
    #[must_use]
    pub fn minerals(&self) -> u32 {
        self.snapshot.minerals.saturating_sub(self.spent.minerals)
    }

    /// Vespene still unspent this tick.
    #[must_use]
    pub fn vespene(&self) -> u32 {
        self.snapshot.vespene.saturating_sub(self.spent.vespene)
    }

    /// Supply still free this tick.
    #[must_use]
    pub fn supply_left(&self) -> u32 {
        self.snapshot.supply_left().saturating_sub(self.spent.supply)
    }

    fn covers(&self, cost: Cost) -> bool {
        self.minerals() >= cost.minerals
            && self.vespene() >= cost.vespene
            && self.supply_left() >= cost.supply
    }

    /// Whether the remaining budget pays for `product`.
    #[must_use]
    pub fn can_afford(&self, product: Product) -> bool {
        let cost = match product {
            Product::Unit(kind) => self.catalog.unit(kind).map(|spec| spec.cost),
            Product::Structure(structure) => self.catalog.node(structure).map(|node| node.cost),
            Product::Research(research) => self.catalog.research(research).map(|spec| spec.cost),
        };
        cost.is_some_and(|cost| self.covers(cost))
    }

    /// A finished structure fulfilling `structure` exists.
    #[must_use]
    pub fn is_built(&self, structure: StructureKind) -> bool {
        self.snapshot.structures_satisfying(structure).ready().exists()
    }

    /// An order for `product` is already in flight.
    ///
    /// Structures still under construction count as pending.
    #[must_use]
    pub fn is_pending(&self, product: Product) -> bool {
        if self.snapshot.pending_count(product) > 0 {
            return true;
        }
        match product {
            Product::Structure(structure) => self
                .snapshot
                .structures_of(structure)
                .iter()
                .any(|s| !s.ready),
            Product::Unit(_) | Product::Research(_) => false,
        }
    }

    /// Every prerequisite of `structure`, and every prerequisite of those,
    /// is built. Unknown structures are never buildable.
    #[must_use]
    pub fn prerequisites_met(&self, structure: StructureKind) -> bool {
        self.catalog.node(structure).is_some_and(|node| {
            node.prerequisites
                .iter()
                .all(|prereq| self.is_built(*prereq) && self.prerequisites_met(*prereq))
        })
    }

    /// Every structure a unit type needs is built, transitively.
    #[must_use]
    pub fn unit_prerequisites_met(&self, kind: UnitKind) -> bool {
        self.catalog.unit(kind).is_some_and(|spec| {
            spec.prerequisites
                .iter()
                .all(|prereq| self.is_built(*prereq) && self.prerequisites_met(*prereq))
        })
    }

    /// Prerequisites satisfied, a producer exists and supply is not capped.
    #[must_use]
    pub fn is_available(&self, kind: UnitKind) -> bool {
        let Some(spec) = self.catalog.unit(kind) else {
            return false;
        };
        let source_exists = match spec.source {
            ProductionSource::Larva => self.snapshot.units_of(UnitKind::Larva).exists(),
            ProductionSource::Townhall => self.snapshot.townhalls().ready().idle().exists(),
        };
        source_exists && spec.cost.supply <= self.supply_left() && self.unit_prerequisites_met(kind)
    }

    /// The actor is finished and the engine lists `ability` for it.
    #[must_use]
    pub fn capability_ready<K>(&self, actor: &Unit<K>, ability: Ability) -> bool {
        actor.ready && actor.has_ability(ability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec2Fixed;

    fn structure(id: u64, kind: StructureKind, ready: bool) -> Unit<StructureKind> {
        Unit {
            id,
            kind,
            position: Vec2Fixed::ZERO,
            ready,
            orders: 0,
            surplus_harvesters: 0,
            abilities: Vec::new(),
        }
    }

    fn larva(id: u64) -> Unit<UnitKind> {
        Unit {
            id,
            kind: UnitKind::Larva,
            position: Vec2Fixed::ZERO,
            ready: true,
            orders: 0,
            surplus_harvesters: 0,
            abilities: Vec::new(),
        }
    }

    fn base_snapshot() -> WorldSnapshot {
        WorldSnapshot {
            minerals: 200,
            vespene: 0,
            supply_used: 12,
            supply_cap: 14,
            units: vec![larva(10)],
            structures: vec![structure(1, StructureKind::Hatchery, true)],
            ..Default::default()
        }
    }

    #[test]
    fn test_can_afford_respects_spent_budget() {
        let catalog = Catalog::standard().unwrap();
        let snap = base_snapshot();
        let drone = Product::Unit(UnitKind::Drone);

        assert!(ResourceGate::new(&snap, &catalog, Cost::ZERO).can_afford(drone));
        let gate = ResourceGate::new(&snap, &catalog, Cost::new(160, 0, 0));
        assert!(!gate.can_afford(drone));
    }

    #[test]
    fn test_can_afford_checks_supply() {
        let catalog = Catalog::standard().unwrap();
        let snap = base_snapshot();
        let gate = ResourceGate::new(&snap, &catalog, Cost::new(0, 0, 2));
        assert!(!gate.can_afford(Product::Unit(UnitKind::Drone)));
        assert!(gate.can_afford(Product::Unit(UnitKind::Overlord)));
    }

    #[test]
    fn test_prerequisites_are_transitive() {
        let catalog = Catalog::standard().unwrap();
        let mut snap = base_snapshot();
        // A lair standing without a pool: the den needs the lair, which needs the pool.
        snap.structures = vec![structure(1, StructureKind::Lair, true)];
        let gate = ResourceGate::new(&snap, &catalog, Cost::ZERO);

        assert!(gate.is_built(StructureKind::Lair));
        assert!(!gate.prerequisites_met(StructureKind::HydraliskDen));

        snap.structures.push(structure(2, StructureKind::SpawningPool, true));
        let gate = ResourceGate::new(&snap, &catalog, Cost::ZERO);
        assert!(gate.prerequisites_met(StructureKind::HydraliskDen));
    }

    #[test]
    fn test_unfinished_structures_are_pending_not_built() {
        let catalog = Catalog::standard().unwrap();
        let mut snap = base_snapshot();
        snap.structures.push(structure(2, StructureKind::SpawningPool, false));
        let gate = ResourceGate::new(&snap, &catalog, Cost::ZERO);

        assert!(!gate.is_built(StructureKind::SpawningPool));
        assert!(gate.is_pending(Product::Structure(StructureKind::SpawningPool)));
        assert!(!gate.is_available(UnitKind::Zergling));
    }

    #[test]
    fn test_is_available_needs_a_producer() {
        let catalog = Catalog::standard().unwrap();
        let mut snap = base_snapshot();
        assert!(ResourceGate::new(&snap, &catalog, Cost::ZERO).is_available(UnitKind::Drone));

        snap.units.clear();
        assert!(!ResourceGate::new(&snap, &catalog, Cost::ZERO).is_available(UnitKind::Drone));
    }

    #[test]
    fn test_capability_requires_ready_actor() {
        let catalog = Catalog::standard().unwrap();
        let snap = base_snapshot();
        let gate = ResourceGate::new(&snap, &catalog, Cost::ZERO);

        let mut hatchery = structure(1, StructureKind::Hatchery, false);
        hatchery.abilities.push(Ability::UpgradeToLair);
        assert!(!gate.capability_ready(&hatchery, Ability::UpgradeToLair));
        hatchery.ready = true;
        assert!(gate.capability_ready(&hatchery, Ability::UpgradeToLair));
        assert!(!gate.capability_ready(&hatchery, Ability::InjectLarva));
    }
}
