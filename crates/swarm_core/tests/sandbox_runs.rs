//! Multi-tick runs against the in-memory sandbox engine.
//!
//! The sandbox pays for, places and completes whatever the bot asks for,
//! so these tests watch the bot react to the consequences of its own
//! decisions across many ticks.

use std::collections::BTreeSet;

use swarm_core::prelude::*;
use swarm_test_utils::fixtures::{fixed, opening, point, SnapshotBuilder, HOME};
use swarm_test_utils::init_tracing;
use swarm_test_utils::sandbox::Sandbox;

fn bot() -> SwarmBot {
    init_tracing();
    SwarmBot::new(BotConfig::default()).unwrap()
}

fn assert_exclusive(reports: &[TickReport]) {
    for report in reports {
        let mut actors = BTreeSet::new();
        for issued in &report.issued {
            assert!(
                actors.insert(issued.request.actor),
                "tick {}: actor {} used twice",
                report.tick,
                issued.request.actor
            );
        }
    }
}

#[test]
fn test_opening_grows_into_second_base() {
    let bot = bot();
    let mut sandbox = Sandbox::new(opening().build());

    let reports = sandbox.run(&bot, 300);
    let world = sandbox.snapshot();

    assert_exclusive(&reports);
    assert!(world.worker_count() > 12, "workers: {}", world.worker_count());
    assert!(world.structures_of(StructureKind::SpawningPool).exists());
    assert!(world.townhalls().amount() >= 2, "no expansion by tick {}", world.tick);
    assert!(sandbox.extractor_count() <= world.townhalls().amount() * 2);
}

#[test]
fn test_pool_is_only_ordered_once() {
    let bot = bot();
    let mut sandbox = Sandbox::new(opening().build());

    let reports = sandbox.run(&bot, 150);
    let pools = reports
        .iter()
        .flat_map(|report| report.issued_by(PlannerKind::TechTree))
        .filter(|r| {
            matches!(
                r.action,
                Action::Build {
                    structure: StructureKind::SpawningPool,
                    ..
                }
            )
        })
        .count();

    assert_eq!(pools, 1);
}

#[test]
fn test_blocked_ground_pushes_pool_outward() {
    let (x, y) = HOME;
    let world = SnapshotBuilder::new()
        .base(x, y)
        .units(UnitKind::Drone, 16, x + 3, y)
        .units(UnitKind::Overlord, 1, x, y)
        .resources(200, 0)
        .supply(16, 30)
        .build();
    let home = point(x, y);
    let center = point(100, 100);

    let mut sandbox = Sandbox::new(world);
    sandbox.block(home.towards(center, fixed(4)));
    sandbox.block(home.towards(center, fixed(5)));

    let reports = sandbox.run(&bot(), 1);
    let pool = sandbox
        .snapshot()
        .structures_of(StructureKind::SpawningPool)
        .first()
        .map(|pool| pool.position);

    assert_eq!(reports[0].rejected_by(PlannerKind::TechTree).count(), 2);
    assert_eq!(pool, Some(home.towards(center, fixed(6))));
}

#[test]
fn test_recovery_rebuilds_workers_and_holds_army() {
    let (x, y) = HOME;
    let world = SnapshotBuilder::new()
        .tick(600)
        .base(x, y)
        .units(UnitKind::Drone, 4, x + 3, y)
        .units(UnitKind::Larva, 3, x, y - 2)
        .units(UnitKind::Overlord, 4, x, y)
        .units(UnitKind::Zergling, 30, 40, 40)
        .enemy_unit(150, 150)
        .resources(500, 0)
        .supply(34, 38)
        .build();

    let mut sandbox = Sandbox::new(world);
    let reports = sandbox.run(&bot(), 40);

    assert!(reports.iter().all(|r| r.phase == StrategyPhase::Recover));
    assert!(reports
        .iter()
        .flat_map(|r| r.issued.iter())
        .all(|issued| !matches!(issued.request.action, Action::Attack(_))));
    assert!(sandbox.snapshot().worker_count() > 4);
}
