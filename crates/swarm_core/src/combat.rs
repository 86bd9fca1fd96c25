//! Attack dispatch.
//!
//! One shared target is chosen per tick. Each configured unit group then
//! either commits to it, harasses visible enemies one unit at a time, or
//! holds, depending on its [`AttackThreshold`](crate::config::AttackThreshold).

use tracing::{debug, info};

use crate::catalog::{Ability, UnitKind};
use crate::command::{Action, PlannerKind, Request, Target};
use crate::context::TickContext;
use crate::orchestrator::Planner;
use crate::snapshot::Unit;

/// Sends idle combat units at the enemy.
#[derive(Debug, Clone, Copy, Default)]
pub struct CombatCommander;

impl CombatCommander {
    /// The tick's shared target.
    ///
    /// A random visible enemy unit, else a random visible enemy structure,
    /// else the first known start location. `None` only when the map lists
    /// no start locations at all.
    pub fn select_target(ctx: &mut TickContext<'_>) -> Option<Target> {
        let snapshot = ctx.snapshot();
        if let Some(enemy) = ctx.choose(&snapshot.enemy_units) {
            return Some(Target::Point(enemy.position));
        }
        if let Some(structure) = ctx.choose(&snapshot.enemy_structures) {
            return Some(Target::Point(structure.position));
        }
        snapshot
            .enemy_start_locations
            .first()
            .map(|location| Target::Point(*location))
    }
}

impl Planner for CombatCommander {
    fn kind(&self) -> PlannerKind {
        PlannerKind::Combat
    }

    fn plan(&self, ctx: &mut TickContext<'_>) {
        let target = Self::select_target(ctx);
        let config = ctx.config();

        for threshold in &config.attack_thresholds {
            let count = ctx.snapshot().units_of(threshold.unit).count();

            if threshold.engages(count) {
                let Some(target) = target else {
                    debug!(unit = ?threshold.unit, "No target known, holding");
                    continue;
                };
                let sent = commit(ctx, threshold.unit, target);
                if sent > 0 {
                    info!(unit = ?threshold.unit, count, sent, ?target, "Attacking");
                }
            } else if threshold.harasses(count) && !ctx.snapshot().enemy_units.is_empty() {
                let sent = harass(ctx, threshold.unit);
                if sent > 0 {
                    debug!(unit = ?threshold.unit, count, sent, "Harassing visible enemies");
                }
            }
        }
    }
}

fn attackers<'a>(ctx: &TickContext<'a>, kind: UnitKind) -> Vec<&'a Unit<UnitKind>> {
    let gate = ctx.gate();
    ctx.snapshot()
        .units_of(kind)
        .idle()
        .unclaimed(ctx.ledger())
        .iter()
        .filter(|unit| gate.capability_ready(*unit, Ability::Attack))
        .collect()
}

fn commit(ctx: &mut TickContext<'_>, kind: UnitKind, target: Target) -> usize {
    let mut sent = 0;
    for unit in attackers(ctx, kind) {
        if ctx.submit(Request::new(unit.id, Action::Attack(target))) {
            sent += 1;
        }
    }
    sent
}

fn harass(ctx: &mut TickContext<'_>, kind: UnitKind) -> usize {
    let snapshot = ctx.snapshot();
    let enemies = &snapshot.enemy_units;
    let mut sent = 0;
    for unit in attackers(ctx, kind) {
        let Some(enemy) = ctx.choose(enemies) else {
            break;
        };
        if ctx.submit(Request::new(unit.id, Action::Attack(Target::Unit(enemy.id)))) {
            sent += 1;
        }
    }
    sent
}
