//! Prerequisite-gated construction.
//!
//! Walks the catalog's tech DAG in prerequisite-first order and, for each
//! node it owns, tries to start one more instance when:
//!
//! - the instance limit is not reached and nothing is already pending,
//! - every prerequisite is built, transitively,
//! - the node is affordable from what is left this tick,
//! - a drone is free to build it.
//!
//! Perimeter nodes probe points along the ray from the anchor toward the
//! map center and stop at the first placement the engine accepts. Near
//! nodes hand the anchor to the engine and let it search.

use tracing::{debug, info};

use crate::catalog::{Anchor, PlacementPolicy, Product, TechNode};
use crate::command::{Action, PlannerKind, Request, Site};
use crate::context::TickContext;
use crate::math::{Fixed, Vec2Fixed};
use crate::orchestrator::Planner;
use crate::snapshot::WorldSnapshot;

/// Builds the tech structures the catalog assigns to it.
#[derive(Debug, Clone, Copy, Default)]
pub struct TechTreePlanner;

impl Planner for TechTreePlanner {
    fn kind(&self) -> PlannerKind {
        PlannerKind::TechTree
    }

    fn plan(&self, ctx: &mut TickContext<'_>) {
        let nodes = ctx
            .catalog()
            .nodes_in_order()
            .filter(|node| node.owner == PlannerKind::TechTree);

        for node in nodes {
            if !wants(ctx, node) {
                continue;
            }
            match node.placement {
                PlacementPolicy::Perimeter(anchor) => {
                    probe_perimeter(ctx, node, anchor);
                }
                PlacementPolicy::Near(anchor) => {
                    build_near(ctx, node, anchor);
                }
                PlacementPolicy::OnGeyser
                | PlacementPolicy::ExpansionSite
                | PlacementPolicy::InPlace => {
                    debug!(structure = ?node.structure, "Placement handled by another planner");
                }
            }
        }
    }
}

/// All gates except builder availability.
fn wants(ctx: &TickContext<'_>, node: &TechNode) -> bool {
    let snapshot = ctx.snapshot();
    let gate = ctx.gate();
    let product = Product::Structure(node.structure);

    let instances = snapshot
        .structures_of(node.structure)
        .count()
        .saturating_add(snapshot.pending_count(product));

    instances < node.limit
        && !gate.is_pending(product)
        && gate.prerequisites_met(node.structure)
        && gate.can_afford(product)
}

/// Position of the first ready structure matching the anchor.
pub fn anchor_position(snapshot: &WorldSnapshot, anchor: Anchor) -> Option<Vec2Fixed> {
    let found = match anchor {
        Anchor::Townhall => snapshot.townhalls().ready().first(),
        Anchor::Structure(kind) => snapshot.structures_satisfying(kind).ready().first(),
    };
    found.map(|structure| structure.position)
}

fn probe_perimeter(ctx: &mut TickContext<'_>, node: &TechNode, anchor: Anchor) -> bool {
    let snapshot = ctx.snapshot();
    let probes = &ctx.config().tech;
    let Some(origin) = anchor_position(snapshot, anchor) else {
        return false;
    };

    for distance in probes.probe_min..=probes.probe_max {
        let target = origin.towards(snapshot.map_center, Fixed::saturating_from_num(distance));
        let Some(builder) = ctx.nearest_builder(target) else {
            return false;
        };

        let build = Action::Build {
            structure: node.structure,
            site: Site::Exact(target),
        };
        if ctx.submit(Request::new(builder.id, build)) {
            info!(
                tick = snapshot.tick,
                structure = ?node.structure,
                distance,
                "Placed structure toward map center"
            );
            return true;
        }
    }

    debug!(structure = ?node.structure, "Every probe rejected, retrying next tick");
    false
}

fn build_near(ctx: &mut TickContext<'_>, node: &TechNode, anchor: Anchor) -> bool {
    let Some(origin) = anchor_position(ctx.snapshot(), anchor) else {
        return false;
    };
    let Some(builder) = ctx.nearest_builder(origin) else {
        return false;
    };

    let build = Action::Build {
        structure: node.structure,
        site: Site::Near(origin),
    };
    let accepted = ctx.submit(Request::new(builder.id, build));
    if accepted {
        info!(structure = ?node.structure, "Building structure");
    }
    accepted
}
