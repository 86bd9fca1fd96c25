//! Read-only per-tick view of the world.
//!
//! The engine produces a fresh [`WorldSnapshot`] every tick. Planners
//! never mutate it; they query it through [`Group`] views that compose
//! the usual filters (ready, idle, near a point, not yet claimed this
//! tick) without copying unit data.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::{Ability, Product, StructureKind, UnitKind};
use crate::ledger::ClaimLedger;
use crate::math::{Fixed, Vec2Fixed};

/// Unique identifier for units, structures and neutral entities.
pub type EntityId = u64;

/// One owned unit or structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit<K> {
    /// Entity ID.
    pub id: EntityId,
    /// Unit or structure type.
    pub kind: K,
    /// Current position.
    pub position: Vec2Fixed,
    /// Finished building / hatching.
    pub ready: bool,
    /// Orders (units) or production queue entries (structures).
    pub orders: u32,
    /// Worker surplus at a townhall; negative means undersaturated.
    #[serde(default)]
    pub surplus_harvesters: i32,
    /// Abilities the engine reports as castable right now.
    #[serde(default)]
    pub abilities: Vec<Ability>,
}

impl<K> Unit<K> {
    /// No orders / empty production queue.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.orders == 0
    }

    /// Whether the engine reports `ability` as available.
    #[must_use]
    pub fn has_ability(&self, ability: Ability) -> bool {
        self.abilities.contains(&ability)
    }
}

/// A neutral vespene geyser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Geyser {
    /// Entity ID.
    pub id: EntityId,
    /// Position.
    pub position: Vec2Fixed,
}

/// Position and identity of a visible enemy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibleEnemy {
    /// Entity ID.
    pub id: EntityId,
    /// Current position.
    pub position: Vec2Fixed,
}

/// Immutable world state for one tick.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Game step this snapshot belongs to.
    pub tick: u64,
    /// Mineral stock.
    pub minerals: u32,
    /// Vespene stock.
    pub vespene: u32,
    /// Supply in use.
    pub supply_used: u32,
    /// Supply capacity.
    pub supply_cap: u32,
    /// Own units.
    pub units: Vec<Unit<UnitKind>>,
    /// Own structures, finished or under construction.
    pub structures: Vec<Unit<StructureKind>>,
    /// Neutral geysers.
    pub geysers: Vec<Geyser>,
    /// Orders in flight per product (eggs, queued trainings, drones en route).
    pub pending: BTreeMap<Product, u32>,
    /// Enemy units currently visible.
    pub enemy_units: Vec<VisibleEnemy>,
    /// Enemy structures currently visible or remembered.
    pub enemy_structures: Vec<VisibleEnemy>,
    /// Possible enemy start locations.
    pub enemy_start_locations: Vec<Vec2Fixed>,
    /// Center of the playable area.
    pub map_center: Vec2Fixed,
}

impl WorldSnapshot {
    /// Remaining supply.
    #[must_use]
    pub fn supply_left(&self) -> u32 {
        self.supply_cap.saturating_sub(self.supply_used)
    }

    /// All own units of a type.
    #[must_use]
    pub fn units_of(&self, kind: UnitKind) -> Group<'_, UnitKind> {
        Group::collect(self.units.iter().filter(|unit| unit.kind == kind))
    }

    /// All own structures of a type (exact match, no tier aliasing).
    #[must_use]
    pub fn structures_of(&self, kind: StructureKind) -> Group<'_, StructureKind> {
        Group::collect(self.structures.iter().filter(|s| s.kind == kind))
    }

    /// Structures that fulfil a requirement for `required`.
    #[must_use]
    pub fn structures_satisfying(&self, required: StructureKind) -> Group<'_, StructureKind> {
        Group::collect(self.structures.iter().filter(|s| s.kind.satisfies(required)))
    }

    /// Hatcheries, lairs and hives.
    #[must_use]
    pub fn townhalls(&self) -> Group<'_, StructureKind> {
        Group::collect(self.structures.iter().filter(|s| s.kind.is_townhall()))
    }

    /// Drones.
    #[must_use]
    pub fn workers(&self) -> Group<'_, UnitKind> {
        self.units_of(UnitKind::Drone)
    }

    /// Drones plus drones still in their eggs.
    #[must_use]
    pub fn worker_count(&self) -> u32 {
        self.workers()
            .count()
            .saturating_add(self.pending_count(Product::Unit(UnitKind::Drone)))
    }

    /// Orders in flight for a product.
    #[must_use]
    pub fn pending_count(&self, product: Product) -> u32 {
        self.pending.get(&product).copied().unwrap_or(0)
    }

    /// Geysers strictly within `radius` of a point.
    pub fn geysers_near(&self, radius: Fixed, point: Vec2Fixed) -> impl Iterator<Item = &Geyser> {
        self.geysers
            .iter()
            .filter(move |geyser| point.is_closer_than(radius, geyser.position))
    }
}

/// A filtered view over snapshot units.
///
/// Filters consume and return the group so they chain:
/// `snapshot.units_of(Queen).ready().idle().closest_to(base)`.
/// Member order is always snapshot order.
#[derive(Debug, Clone)]
pub struct Group<'a, K> {
    members: Vec<&'a Unit<K>>,
}

impl<'a, K> Group<'a, K> {
    fn collect(iter: impl Iterator<Item = &'a Unit<K>>) -> Self {
        Self {
            members: iter.collect(),
        }
    }

    fn retain(mut self, keep: impl Fn(&Unit<K>) -> bool) -> Self {
        self.members.retain(|unit| keep(unit));
        self
    }

    /// Finished members only.
    #[must_use]
    pub fn ready(self) -> Self {
        self.retain(|unit| unit.ready)
    }

    /// Members without orders.
    #[must_use]
    pub fn idle(self) -> Self {
        self.retain(Unit::is_idle)
    }

    /// Members with at least one order queued.
    #[must_use]
    pub fn queued(self) -> Self {
        self.retain(|unit| !unit.is_idle())
    }

    /// Members strictly within `radius` of a point.
    #[must_use]
    pub fn closer_than(self, radius: Fixed, point: Vec2Fixed) -> Self {
        self.retain(|unit| point.is_closer_than(radius, unit.position))
    }

    /// Members not yet claimed by a request this tick.
    #[must_use]
    pub fn unclaimed(self, ledger: &ClaimLedger) -> Self {
        self.retain(|unit| !ledger.is_claimed(unit.id))
    }

    /// Number of members.
    #[must_use]
    pub fn amount(&self) -> usize {
        self.members.len()
    }

    /// Number of members as a supply-style count.
    #[must_use]
    pub fn count(&self) -> u32 {
        u32::try_from(self.members.len()).unwrap_or(u32::MAX)
    }

    /// Whether the group has any member.
    #[must_use]
    pub fn exists(&self) -> bool {
        !self.members.is_empty()
    }

    /// First member in snapshot order.
    #[must_use]
    pub fn first(&self) -> Option<&'a Unit<K>> {
        self.members.first().copied()
    }

    /// Member nearest to a point; ties go to the earlier member.
    #[must_use]
    pub fn closest_to(&self, point: Vec2Fixed) -> Option<&'a Unit<K>> {
        self.members
            .iter()
            .copied()
            .min_by(|a, b| {
                a.position
                    .distance_squared(point)
                    .cmp(&b.position.distance_squared(point))
            })
    }

    /// Iterate members.
    pub fn iter(&self) -> impl Iterator<Item = &'a Unit<K>> + '_ {
        self.members.iter().copied()
    }

    /// Members as a slice, for random selection.
    #[must_use]
    pub fn as_slice(&self) -> &[&'a Unit<K>] {
        &self.members
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(id: EntityId, kind: UnitKind, x: i32, y: i32) -> Unit<UnitKind> {
        Unit {
            id,
            kind,
            position: Vec2Fixed::from_ints(x, y),
            ready: true,
            orders: 0,
            surplus_harvesters: 0,
            abilities: Vec::new(),
        }
    }

    fn snapshot() -> WorldSnapshot {
        let mut busy = unit(3, UnitKind::Drone, 5, 0);
        busy.orders = 1;
        let mut egg = unit(4, UnitKind::Drone, 1, 0);
        egg.ready = false;

        WorldSnapshot {
            units: vec![
                unit(1, UnitKind::Drone, 10, 0),
                unit(2, UnitKind::Drone, 2, 0),
                busy,
                egg,
                unit(5, UnitKind::Queen, 0, 0),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_filters_compose() {
        let snap = snapshot();
        let drones = snap.workers();
        assert_eq!(drones.amount(), 4);
        assert_eq!(drones.count(), 4);
        assert_eq!(snap.workers().ready().amount(), 3);
        assert_eq!(snap.workers().ready().idle().amount(), 2);
        assert_eq!(snap.workers().queued().first().map(|u| u.id), Some(3));
    }

    #[test]
    fn test_closest_to_and_radius() {
        let snap = snapshot();
        let origin = Vec2Fixed::ZERO;
        assert_eq!(snap.workers().closest_to(origin).map(|u| u.id), Some(4));
        assert_eq!(
            snap.workers().closer_than(Fixed::from_num(3), origin).amount(),
            2
        );
    }

    #[test]
    fn test_unclaimed_skips_ledger_entries() {
        let snap = snapshot();
        let mut ledger = ClaimLedger::new();
        assert!(ledger.claim(2));
        let free: Vec<_> = snap.workers().unclaimed(&ledger).iter().map(|u| u.id).collect();
        assert_eq!(free, vec![1, 3, 4]);
    }

    #[test]
    fn test_supply_left_saturates() {
        let snap = WorldSnapshot {
            supply_used: 30,
            supply_cap: 28,
            ..Default::default()
        };
        assert_eq!(snap.supply_left(), 0);
    }
}
