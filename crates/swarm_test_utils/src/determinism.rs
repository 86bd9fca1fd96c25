//! Determinism testing utilities.
//!
//! The bot keeps no state between ticks and seeds its randomness from the
//! tick index, so the same snapshot must always produce the same requests.
//! Sources of drift this harness is meant to catch:
//!
//! - **Unseeded randomness**: every random pick goes through the tick RNG.
//! - **Hash iteration order**: inventories and pending counts are kept in
//!   snapshot order or in ordered maps.
//! - **Floating-point geometry**: probe points use fixed-point math via
//!   [`swarm_core::math::Fixed`].

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use swarm_core::command::Request;
use swarm_core::orchestrator::SwarmBot;
use swarm_core::snapshot::WorldSnapshot;

use crate::sinks::RecordingSink;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
}

impl DeterminismResult {
    /// All distinct hashes (one for a deterministic run).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that every run matched, with a detailed message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Bot is non-deterministic!\n\
                 Runs: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run `run` several times and compare the hashes it returns.
pub fn verify_determinism<F>(runs: usize, mut run: F) -> DeterminismResult
where
    F: FnMut() -> u64,
{
    let hashes: Vec<u64> = (0..runs).map(|_| run()).collect();
    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);
    DeterminismResult {
        is_deterministic,
        hashes,
    }
}

/// Requests one tick produces against an accept-everything sink.
pub fn requests_for(bot: &SwarmBot, snapshot: &WorldSnapshot) -> Vec<Request> {
    let mut sink = RecordingSink::new();
    bot.on_tick(snapshot, &mut sink);
    sink.accepted
}

/// Replay one snapshot `runs` times and compare the requests.
pub fn replay_tick(bot: &SwarmBot, snapshot: &WorldSnapshot, runs: usize) -> DeterminismResult {
    verify_determinism(runs, || compute_hash(&requests_for(bot, snapshot)))
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for random but plausible snapshots.
pub mod strategies {
    use proptest::prelude::*;
    use swarm_core::catalog::{Product, StructureKind, UnitKind};
    use swarm_core::snapshot::WorldSnapshot;

    use crate::fixtures::SnapshotBuilder;

    /// Base positions, far enough apart that geyser radii do not overlap.
    const BASE_SITES: [(i32, i32); 4] = [(20, 20), (60, 20), (20, 60), (60, 60)];

    /// Tech structures that may be present, in catalog order.
    const TECH: [StructureKind; 6] = [
        StructureKind::SpawningPool,
        StructureKind::EvolutionChamber,
        StructureKind::RoachWarren,
        StructureKind::Lair,
        StructureKind::HydraliskDen,
        StructureKind::BanelingNest,
    ];

    /// Army counts: zerglings, roaches, hydralisks, queens.
    pub fn arb_army() -> impl Strategy<Value = (u32, u32, u32, u32)> {
        (0u32..30, 0u32..8, 0u32..8, 0u32..3)
    }

    /// Which tech structures exist. Each one only counts if everything
    /// before it in the chain it needs is there too, so the generated
    /// world never holds a den without a lair.
    pub fn arb_tech() -> impl Strategy<Value = Vec<bool>> {
        prop::collection::vec(any::<bool>(), TECH.len())
    }

    /// A world with 1 to 4 bases, two geysers per base, some extractors
    /// (never more than two per base), workers up to the cap, larvae, an
    /// army, tech, pending eggs and maybe some visible enemies.
    pub fn arb_snapshot() -> impl Strategy<Value = WorldSnapshot> {
        (
            0u64..2_000,
            (0u32..3_000, 0u32..1_500),
            1usize..=4,
            0u32..=65,
            0u32..6,
            arb_tech(),
            arb_army(),
            0usize..=8,
            (0usize..4, 0usize..3),
            (0u32..3, 0u32..3),
            -8i32..8,
        )
            .prop_map(
                |(
                    tick,
                    (minerals, vespene),
                    bases,
                    drones,
                    larvae,
                    tech,
                    (zerglings, roaches, hydras, queens),
                    extractors,
                    (enemy_units, enemy_structures),
                    (pending_drones, pending_overlords),
                    surplus,
                )| {
                    let mut builder = SnapshotBuilder::new()
                        .tick(tick)
                        .resources(minerals, vespene);

                    for &(x, y) in &BASE_SITES[..bases] {
                        builder = builder.base(x, y).geyser(x + 7, y + 2).geyser(x - 6, y + 5);
                    }
                    builder = builder.saturation(surplus);

                    let extractors = extractors.min(2 * bases);
                    for i in 0..extractors {
                        let (x, y) = BASE_SITES[i / 2];
                        let (gx, gy) = if i % 2 == 0 { (x + 7, y + 2) } else { (x - 6, y + 5) };
                        builder = builder.structure(StructureKind::Extractor, gx, gy);
                    }

                    let (hx, hy) = BASE_SITES[0];
                    let pool = tech[0];
                    let lair = pool && tech[3];
                    let present = [
                        pool,
                        pool && tech[1],
                        pool && tech[2],
                        lair,
                        lair && tech[4],
                        pool && tech[5],
                    ];
                    for (offset, (&kind, &here)) in (1i32..).zip(TECH.iter().zip(&present)) {
                        if here {
                            builder = builder.structure(kind, hx + 4 * offset, hy - 6);
                        }
                    }

                    let drones = drones.saturating_sub(pending_drones);
                    let supply_used = drones
                        + pending_drones
                        + zerglings
                        + 2 * (roaches + hydras + queens);
                    builder
                        .units(UnitKind::Drone, drones, hx + 3, hy)
                        .units(UnitKind::Larva, larvae, hx, hy - 2)
                        .units(UnitKind::Zergling, zerglings, hx + 10, hy + 10)
                        .units(UnitKind::Roach, roaches, hx + 11, hy + 10)
                        .units(UnitKind::Hydralisk, hydras, hx + 12, hy + 10)
                        .units(UnitKind::Queen, queens, hx + 1, hy + 1)
                        .pending(Product::Unit(UnitKind::Drone), pending_drones)
                        .pending(Product::Unit(UnitKind::Overlord), pending_overlords)
                        .supply(supply_used, (supply_used + 6).min(200))
                        .enemies(enemy_units, enemy_structures)
                        .build()
                },
            )
    }
}
