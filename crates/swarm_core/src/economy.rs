//! Economy controller.
//!
//! Runs first every tick, in this order:
//!
//! 1. Supply: one overlord when supply runs low
//! 2. Workers: one drone while bases are undersaturated
//! 3. Spawn boost: each idle queen near a base injects it
//! 4. Gas: extractors on free geysers, at most two per base
//! 5. Expansion: one new base per in-game minute
//!
//! Every step re-reads the gate, so money spent by an earlier step is
//! already subtracted when the next one checks affordability.

use tracing::{debug, info};

use crate::catalog::{Ability, Product, StructureKind, UnitKind};
use crate::command::{Action, PlannerKind, Request, Site, Target};
use crate::context::TickContext;
use crate::math::Fixed;
use crate::orchestrator::Planner;
use crate::snapshot::EntityId;
use crate::strategy::expansion_due;

/// Supply, workers, spawn boost, gas and expansion.
#[derive(Debug, Clone, Copy, Default)]
pub struct EconomyController;

impl Planner for EconomyController {
    fn kind(&self) -> PlannerKind {
        PlannerKind::Economy
    }

    fn plan(&self, ctx: &mut TickContext<'_>) {
        increase_supply(ctx);
        build_workers(ctx);
        boost_spawning(ctx);
        establish_gas(ctx);
        expand(ctx);
    }
}

fn increase_supply(ctx: &mut TickContext<'_>) {
    let limits = &ctx.config().economy;
    let snapshot = ctx.snapshot();
    let gate = ctx.gate();
    let overlord = Product::Unit(UnitKind::Overlord);

    if gate.supply_left() > limits.supply_low_water
        || snapshot.supply_cap >= limits.supply_ceiling
        || gate.is_pending(overlord)
        || !gate.can_afford(overlord)
    {
        return;
    }

    if ctx.train_from_larva(UnitKind::Overlord) {
        info!(
            tick = snapshot.tick,
            supply_left = gate.supply_left(),
            "Increasing supply"
        );
    }
}

fn build_workers(ctx: &mut TickContext<'_>) {
    let limits = &ctx.config().economy;
    let snapshot = ctx.snapshot();
    let workers = snapshot.worker_count();
    let target = snapshot
        .townhalls()
        .count()
        .saturating_mul(limits.max_per_base);

    if target <= workers || workers >= limits.max_workers {
        return;
    }
    if !ctx.gate().can_afford(Product::Unit(UnitKind::Drone)) {
        return;
    }

    if ctx.train_from_larva(UnitKind::Drone) {
        debug!(workers, target, "Training worker");
    }
}

fn boost_spawning(ctx: &mut TickContext<'_>) {
    let snapshot = ctx.snapshot();
    let radius = ctx.config().economy.booster_radius();
    let bases = snapshot.townhalls().ready();

    for base in bases.iter() {
        let queens = snapshot
            .units_of(UnitKind::Queen)
            .ready()
            .idle()
            .unclaimed(ctx.ledger());
        let Some(queen) = queens.closest_to(base.position) else {
            return;
        };
        if !queen.position.is_closer_than(radius, base.position) {
            continue;
        }
        if !ctx.gate().capability_ready(queen, Ability::InjectLarva) {
            continue;
        }

        let inject = Action::Cast(Ability::InjectLarva, Target::Unit(base.id));
        ctx.submit(Request::new(queen.id, inject));
    }
}

fn establish_gas(ctx: &mut TickContext<'_>) {
    let limits = &ctx.config().economy;
    let snapshot = ctx.snapshot();
    let extractor = Product::Structure(StructureKind::Extractor);

    let ideal = snapshot
        .townhalls()
        .count()
        .saturating_mul(limits.extractors_per_base);
    let mut extractors = snapshot
        .structures_of(StructureKind::Extractor)
        .count()
        .saturating_add(snapshot.pending_count(extractor));
    let mut targeted: Vec<EntityId> = Vec::new();

    let bases = snapshot.townhalls().ready();
    for base in bases.iter() {
        if base.surplus_harvesters < 0 && snapshot.minerals <= limits.gas_mineral_high_water {
            continue;
        }

        for geyser in snapshot.geysers_near(limits.geyser_radius(), base.position) {
            if extractors >= ideal || !ctx.gate().can_afford(extractor) {
                return;
            }
            let occupied = targeted.contains(&geyser.id)
                || snapshot
                    .structures_of(StructureKind::Extractor)
                    .closer_than(Fixed::ONE, geyser.position)
                    .exists();
            if occupied {
                continue;
            }
            let Some(drone) = ctx.nearest_builder(geyser.position) else {
                return;
            };

            let build = Action::Build {
                structure: StructureKind::Extractor,
                site: Site::Geyser(geyser.id),
            };
            if ctx.submit(Request::new(drone.id, build)) {
                extractors += 1;
                targeted.push(geyser.id);
                info!(geyser = geyser.id, extractors, ideal, "Building extractor");
            }
        }
    }
}

fn expand(ctx: &mut TickContext<'_>) {
    let snapshot = ctx.snapshot();
    if !expansion_due(snapshot, ctx.config()) {
        return;
    }

    let gate = ctx.gate();
    let hatchery = Product::Structure(StructureKind::Hatchery);
    if gate.is_pending(hatchery) || !gate.can_afford(hatchery) {
        return;
    }

    let home = snapshot
        .townhalls()
        .ready()
        .first()
        .map_or(snapshot.map_center, |base| base.position);
    let Some(drone) = ctx.nearest_builder(home) else {
        debug!("No builder available for expansion");
        return;
    };

    let build = Action::Build {
        structure: StructureKind::Hatchery,
        site: Site::Expansion,
    };
    if ctx.submit(Request::new(drone.id, build)) {
        info!(
            tick = snapshot.tick,
            bases = snapshot.townhalls().count(),
            "Expanding to a new base"
        );
    }
}
