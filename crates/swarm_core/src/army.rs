//! Army composition.
//!
//! Nothing is remembered between ticks: the category counts and the skew
//! signal are rebuilt from the snapshot each time. Production priority:
//!
//! 1. Queens, one per base that has none nearby
//! 2. Roaches (anti-heavy) up to the standing cap
//! 3. Hydralisks (anti-air) up to the standing cap
//! 4. Zerglings (anti-light) whenever the light share drops too low
//!
//! Every producer goes through the claim ledger, so a larva handed to a
//! roach is gone before the zergling step looks for one.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::catalog::{Catalog, Category, Product, StructureKind, UnitKind};
use crate::command::{Action, PlannerKind, Request};
use crate::context::TickContext;
use crate::math::Fixed;
use crate::orchestrator::Planner;
use crate::snapshot::WorldSnapshot;

/// Combat unit counts per category, eggs included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositionSkew {
    /// Anti-light units.
    pub light: u32,
    /// Anti-heavy units.
    pub heavy: u32,
    /// Anti-air units.
    pub anti_air: u32,
}

impl CompositionSkew {
    /// Count owned and pending combat units by category.
    #[must_use]
    pub fn from_snapshot(snapshot: &WorldSnapshot, catalog: &Catalog) -> Self {
        let mut skew = Self::default();
        let pending = snapshot.pending.iter().filter_map(|(product, count)| match product {
            Product::Unit(kind) => Some((*kind, *count)),
            Product::Structure(_) | Product::Research(_) => None,
        });
        let owned = snapshot.units.iter().map(|unit| (unit.kind, 1));

        for (kind, count) in owned.chain(pending) {
            let Some(spec) = catalog.unit(kind) else {
                continue;
            };
            let slot = match spec.category {
                Category::Light => &mut skew.light,
                Category::Heavy => &mut skew.heavy,
                Category::AntiAir => &mut skew.anti_air,
                Category::Economy | Category::Air | Category::Caster => continue,
            };
            *slot = slot.saturating_add(count);
        }
        skew
    }

    /// Total combat units.
    #[must_use]
    pub fn army(&self) -> u32 {
        self.light
            .saturating_add(self.heavy)
            .saturating_add(self.anti_air)
    }

    /// Army size divided by one category's size, `None` when it is empty.
    #[must_use]
    pub fn ratio(&self, category: Category) -> Option<Fixed> {
        let count = match category {
            Category::Light => self.light,
            Category::Heavy => self.heavy,
            Category::AntiAir => self.anti_air,
            Category::Economy | Category::Air | Category::Caster => return None,
        };
        (count > 0).then(|| Fixed::from_num(self.army()) / Fixed::from_num(count))
    }

    /// Light units are missing, or army / light is at most `bias_ratio`.
    #[must_use]
    pub fn light_under_represented(&self, bias_ratio: u32) -> bool {
        self.light == 0 || self.army() <= self.light.saturating_mul(bias_ratio)
    }
}

/// Trains queens and combat units.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArmyCompositionPlanner;

impl Planner for ArmyCompositionPlanner {
    fn kind(&self) -> PlannerKind {
        PlannerKind::Army
    }

    fn plan(&self, ctx: &mut TickContext<'_>) {
        let skew = CompositionSkew::from_snapshot(ctx.snapshot(), ctx.catalog());

        train_queens(ctx);
        train_capped(ctx, UnitKind::Roach);
        train_capped(ctx, UnitKind::Hydralisk);
        train_light(ctx, skew);
    }
}

fn train_queens(ctx: &mut TickContext<'_>) {
    let snapshot = ctx.snapshot();
    let queen = Product::Unit(UnitKind::Queen);
    if !ctx.gate().unit_prerequisites_met(UnitKind::Queen) {
        return;
    }

    let radius = ctx.config().army.queen_radius();
    let queens = snapshot.units_of(UnitKind::Queen);
    let wanted = snapshot.townhalls().ready().count();
    let mut total = queens.count().saturating_add(snapshot.pending_count(queen));

    let producers = snapshot
        .townhalls()
        .ready()
        .idle()
        .unclaimed(ctx.ledger());
    for base in producers.iter() {
        if total >= wanted || !ctx.gate().can_afford(queen) {
            return;
        }
        let covered = queens
            .iter()
            .any(|q| q.position.is_closer_than(radius, base.position));
        if covered {
            continue;
        }
        if ctx.submit(Request::new(base.id, Action::Train(UnitKind::Queen))) {
            total += 1;
            info!(base = base.id, queens = total, "Training queen");
        }
    }
}

fn train_capped(ctx: &mut TickContext<'_>, kind: UnitKind) {
    let snapshot = ctx.snapshot();
    let product = Product::Unit(kind);
    let cap = ctx.config().army.standing_cap;
    let have = snapshot
        .units_of(kind)
        .count()
        .saturating_add(snapshot.pending_count(product));

    let gate = ctx.gate();
    if have >= cap || !gate.is_available(kind) || !gate.can_afford(product) {
        return;
    }
    if ctx.train_from_larva(kind) {
        debug!(unit = ?kind, have, cap, "Training capped unit");
    }
}

fn train_light(ctx: &mut TickContext<'_>, skew: CompositionSkew) {
    if !skew.light_under_represented(ctx.config().army.light_bias_ratio) {
        return;
    }
    if banking_for_expansion(ctx, skew) {
        debug!(light = skew.light, "Banking for expansion, no light top-up this tick");
        return;
    }

    let zergling = Product::Unit(UnitKind::Zergling);
    let gate = ctx.gate();
    if !gate.is_available(UnitKind::Zergling) || !gate.can_afford(zergling) {
        return;
    }
    if ctx.train_from_larva(UnitKind::Zergling) {
        debug!(
            light = skew.light,
            army = skew.army(),
            "Light units under-represented, training zerglings"
        );
    }
}

/// Top-ups wait while an overdue base is still unaffordable. An empty
/// light force is always refilled, and nothing waits once the hatchery
/// has been ordered this tick.
fn banking_for_expansion(ctx: &TickContext<'_>, skew: CompositionSkew) -> bool {
    let hatchery = Product::Structure(StructureKind::Hatchery);
    let ordered = ctx
        .issued()
        .iter()
        .any(|issued| issued.request.action.product() == Some(hatchery));

    ctx.phase().banks_for_expansion()
        && skew.light > 0
        && !ordered
        && !ctx.gate().can_afford(hatchery)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skew(light: u32, heavy: u32, anti_air: u32) -> CompositionSkew {
        CompositionSkew {
            light,
            heavy,
            anti_air,
        }
    }

    #[test]
    fn test_empty_army_wants_light() {
        assert!(skew(0, 0, 0).light_under_represented(2));
        assert_eq!(skew(0, 0, 0).ratio(Category::Light), None);
    }

    #[test]
    fn test_light_bias_threshold() {
        // army 6, light 3: ratio exactly 2
        assert!(skew(3, 3, 0).light_under_represented(2));
        // army 7, light 3: ratio above 2
        assert!(!skew(3, 3, 1).light_under_represented(2));
        assert_eq!(skew(2, 4, 2).ratio(Category::Light), Some(Fixed::from_num(4)));
    }

    #[test]
    fn test_counts_include_pending_eggs() {
        use crate::math::Vec2Fixed;
        use crate::snapshot::Unit;

        let catalog = Catalog::standard().unwrap();
        let roach = Unit {
            id: 1,
            kind: UnitKind::Roach,
            position: Vec2Fixed::ZERO,
            ready: true,
            orders: 0,
            surplus_harvesters: 0,
            abilities: Vec::new(),
        };
        let mut snapshot = WorldSnapshot {
            units: vec![roach],
            ..Default::default()
        };
        snapshot.pending.insert(Product::Unit(UnitKind::Zergling), 2);
        snapshot.pending.insert(Product::Unit(UnitKind::Drone), 5);

        assert_eq!(
            CompositionSkew::from_snapshot(&snapshot, &catalog),
            skew(2, 1, 0)
        );
    }
}
