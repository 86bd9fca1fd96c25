//! Research and townhall morphs.

use tracing::info;

use crate::catalog::{Ability, Product, ResearchSpec, StructureKind};
use crate::command::{Action, PlannerKind, Request};
use crate::context::TickContext;
use crate::orchestrator::Planner;

/// Townhall morphs: `(from, into, ability)`.
const MORPHS: [(StructureKind, StructureKind, Ability); 2] = [
    (StructureKind::Hatchery, StructureKind::Lair, Ability::UpgradeToLair),
    (StructureKind::Lair, StructureKind::Hive, Ability::UpgradeToHive),
];

/// Starts research on idle structures and morphs townhalls up a tier.
///
/// Each research is requested at most once per tick, on the first ready,
/// idle, unclaimed host that the engine says can start it.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpgradeManager;

impl Planner for UpgradeManager {
    fn kind(&self) -> PlannerKind {
        PlannerKind::Upgrades
    }

    fn plan(&self, ctx: &mut TickContext<'_>) {
        for spec in ctx.catalog().researches() {
            research(ctx, spec);
        }
        for (from, into, ability) in MORPHS {
            morph(ctx, from, into, ability);
        }
    }
}

fn research(ctx: &mut TickContext<'_>, spec: &ResearchSpec) {
    let product = Product::Research(spec.research);
    let ability = Ability::Research(spec.research);
    let gate = ctx.gate();
    if gate.is_pending(product) || !gate.can_afford(product) {
        return;
    }

    let hosts = ctx
        .snapshot()
        .structures_of(spec.building)
        .ready()
        .idle()
        .unclaimed(ctx.ledger());
    let Some(host) = hosts.iter().find(|host| gate.capability_ready(*host, ability)) else {
        return;
    };

    if ctx.submit(Request::new(host.id, Action::Research(spec.research))) {
        info!(research = ?spec.research, building = ?spec.building, "Starting research");
    }
}

/// Only one townhall of each tier is morphed; the rest stay as they are.
fn morph(ctx: &mut TickContext<'_>, from: StructureKind, into: StructureKind, ability: Ability) {
    let snapshot = ctx.snapshot();
    let gate = ctx.gate();
    let product = Product::Structure(into);

    if snapshot.structures_satisfying(into).exists()
        || gate.is_pending(product)
        || !gate.prerequisites_met(into)
        || !gate.can_afford(product)
    {
        return;
    }

    let hosts = snapshot
        .structures_of(from)
        .ready()
        .idle()
        .unclaimed(ctx.ledger());
    let Some(host) = hosts.iter().find(|host| gate.capability_ready(*host, ability)) else {
        return;
    };

    if ctx.submit(Request::new(host.id, Action::Morph(into))) {
        info!(from = ?from, into = ?into, "Morphing townhall");
    }
}
