//! Property-based invariants over random snapshots.
//!
//! Every property runs the full pipeline against an accept-everything
//! sink, so anything the bot emits reaches the checks.

use std::collections::BTreeSet;

use proptest::prelude::*;
use swarm_core::prelude::*;
use swarm_test_utils::determinism::strategies::arb_snapshot;
use swarm_test_utils::determinism::{replay_tick, requests_for};

fn bot() -> SwarmBot {
    SwarmBot::new(BotConfig::default()).unwrap()
}

fn structure_of(action: Action) -> Option<StructureKind> {
    match action {
        Action::Build { structure, .. } | Action::Morph(structure) => Some(structure),
        _ => None,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// No unit or structure receives two requests in one tick.
    #[test]
    fn prop_actors_are_exclusive(snapshot in arb_snapshot()) {
        let requests = requests_for(&bot(), &snapshot);
        let mut actors = BTreeSet::new();
        for request in &requests {
            prop_assert!(
                actors.insert(request.actor),
                "actor {} received two requests: {:?}",
                request.actor,
                requests
            );
        }
    }

    /// Accepted spending never exceeds the bank.
    #[test]
    fn prop_spending_fits_the_bank(snapshot in arb_snapshot()) {
        let bot = bot();
        let requests = requests_for(&bot, &snapshot);
        let (minerals, vespene) = requests
            .iter()
            .filter_map(|r| r.action.product())
            .map(|product| bot.catalog().cost_of(product))
            .fold((0u32, 0u32), |(m, v), cost| (m + cost.minerals, v + cost.vespene));

        prop_assert!(minerals <= snapshot.minerals, "{minerals} > {}", snapshot.minerals);
        prop_assert!(vespene <= snapshot.vespene, "{vespene} > {}", snapshot.vespene);
    }

    /// Extractors (standing plus newly ordered) stay within two per base.
    #[test]
    fn prop_extractors_bounded_by_bases(snapshot in arb_snapshot()) {
        let requests = requests_for(&bot(), &snapshot);
        let ordered = requests
            .iter()
            .filter(|r| structure_of(r.action) == Some(StructureKind::Extractor))
            .count();
        let standing = snapshot.structures_of(StructureKind::Extractor).amount();
        let ideal = snapshot.townhalls().amount() * 2;

        prop_assert!(standing + ordered <= ideal, "{standing} + {ordered} > {ideal}");
    }

    /// At most one drone per tick, and none once the worker line is full.
    #[test]
    fn prop_workers_bounded(snapshot in arb_snapshot()) {
        let config = BotConfig::default();
        let requests = requests_for(&bot(), &snapshot);
        let drones = requests
            .iter()
            .filter(|r| r.action == Action::Train(UnitKind::Drone))
            .count();
        let workers = snapshot.worker_count();
        let target = snapshot.townhalls().count() * config.economy.max_per_base;

        prop_assert!(drones <= 1);
        if workers >= config.economy.max_workers || workers >= target {
            prop_assert_eq!(drones, 0);
        }
    }

    /// Everything built, morphed or trained has its whole prerequisite
    /// chain standing.
    #[test]
    fn prop_prerequisites_are_transitive(snapshot in arb_snapshot()) {
        let bot = bot();
        let requests = requests_for(&bot, &snapshot);
        let gate = ResourceGate::new(&snapshot, bot.catalog(), Cost::ZERO);

        for request in &requests {
            if let Some(structure) = structure_of(request.action) {
                prop_assert!(
                    gate.prerequisites_met(structure),
                    "{structure:?} ordered without its prerequisites"
                );
            }
            if let Action::Train(kind) = request.action {
                prop_assert!(
                    gate.unit_prerequisites_met(kind),
                    "{kind:?} trained without its prerequisites"
                );
            }
        }
    }

    /// A structure already standing or in flight is never ordered again
    /// beyond its limit.
    #[test]
    fn prop_tech_respects_limits(snapshot in arb_snapshot()) {
        let bot = bot();
        let requests = requests_for(&bot, &snapshot);

        for node in bot.catalog().nodes_in_order() {
            if node.owner != PlannerKind::TechTree {
                continue;
            }
            let ordered = requests
                .iter()
                .filter(|r| structure_of(r.action) == Some(node.structure))
                .count();
            let standing = snapshot.structures_of(node.structure).amount();
            let limit = usize::try_from(node.limit).unwrap();
            prop_assert!(
                ordered == 0 || standing + ordered <= limit,
                "{:?}: {standing} standing, {ordered} ordered, limit {limit}",
                node.structure
            );
        }
    }

    /// Recovery never sends the army out.
    #[test]
    fn prop_recover_never_attacks(mut snapshot in arb_snapshot()) {
        let config = BotConfig::default();
        snapshot.tick = snapshot.tick.max(config.phase.recover_after_tick);
        snapshot.units.retain(|u| u.kind != UnitKind::Drone);
        snapshot.pending.remove(&Product::Unit(UnitKind::Drone));
        prop_assert_eq!(StrategyPhase::derive(&snapshot, &config), StrategyPhase::Recover);

        let requests = requests_for(&bot(), &snapshot);
        prop_assert!(requests.iter().all(|r| !matches!(r.action, Action::Attack(_))));
    }

    /// Replaying a snapshot replays its requests.
    #[test]
    fn prop_ticks_are_idempotent(snapshot in arb_snapshot()) {
        let result = replay_tick(&bot(), &snapshot, 3);
        prop_assert!(result.is_deterministic, "hashes: {:?}", result.hashes);
    }
}
