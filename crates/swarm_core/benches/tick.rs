//! Per-tick decision benchmarks for swarm_core.
//!
//! Run with: `cargo bench -p swarm_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use swarm_core::prelude::*;
use swarm_test_utils::fixtures::{opening, SnapshotBuilder};
use swarm_test_utils::sinks::RecordingSink;

/// A late-game world: three bases, full worker lines, tech and an army.
fn late_game() -> WorldSnapshot {
    let mut builder = SnapshotBuilder::new().tick(900).resources(2_000, 1_200);
    for (x, y) in [(20, 20), (60, 20), (20, 60)] {
        builder = builder
            .base(x, y)
            .geyser(x + 7, y + 2)
            .geyser(x - 6, y + 5)
            .units(UnitKind::Drone, 16, x + 3, y)
            .units(UnitKind::Larva, 3, x, y - 2)
            .units(UnitKind::Queen, 1, x + 1, y + 1);
    }
    builder
        .structure(StructureKind::SpawningPool, 26, 14)
        .structure(StructureKind::EvolutionChamber, 30, 14)
        .structure(StructureKind::RoachWarren, 34, 14)
        .structure(StructureKind::Lair, 40, 40)
        .units(UnitKind::Overlord, 12, 20, 20)
        .units(UnitKind::Zergling, 24, 40, 40)
        .units(UnitKind::Roach, 6, 42, 40)
        .enemy_unit(150, 150)
        .enemy_unit(155, 150)
        .enemy_structure(180, 170)
        .supply(90, 120)
        .build()
}

/// Runs one full tick of every planner.
pub fn tick_benchmark(c: &mut Criterion) {
    let bot = SwarmBot::new(BotConfig::default()).unwrap();
    let early = opening().build();
    let late = late_game();

    c.bench_function("on_tick_opening", |b| {
        b.iter(|| {
            let mut sink = RecordingSink::new();
            black_box(bot.on_tick(black_box(&early), &mut sink))
        })
    });

    c.bench_function("on_tick_late_game", |b| {
        b.iter(|| {
            let mut sink = RecordingSink::new();
            black_box(bot.on_tick(black_box(&late), &mut sink))
        })
    });

    c.bench_function("catalog_standard", |b| {
        b.iter(|| black_box(Catalog::standard()))
    });
}

criterion_group!(benches, tick_benchmark);
criterion_main!(benches);
