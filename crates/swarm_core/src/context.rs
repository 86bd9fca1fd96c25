//! Per-tick planner context.
//!
//! A [`TickContext`] is created for each tick and dropped at the end of
//! it. It bundles the immutable inputs (snapshot, catalog, config, phase)
//! with the only mutable state a tick has: the claim ledger, the seeded
//! RNG, and the report of what was issued or rejected.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, UnitKind};
use crate::command::{Action, IssuedRequest, PlannerKind, Request};
use crate::config::BotConfig;
use crate::error::Rejection;
use crate::gate::ResourceGate;
use crate::ledger::ClaimLedger;
use crate::math::Vec2Fixed;
use crate::sink::CommandSink;
use crate::snapshot::{Unit, WorldSnapshot};
use crate::strategy::StrategyPhase;

/// Golden-ratio increment used to spread tick indices across seeds.
const TICK_SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

/// A request the engine (or the ledger) refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedRequest {
    /// Planner that emitted the request.
    pub origin: PlannerKind,
    /// The request.
    pub request: Request,
    /// Why it was refused.
    pub reason: Rejection,
}

/// Everything that happened in one tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickReport {
    /// Tick index from the snapshot.
    pub tick: u64,
    /// Phase the planners ran under.
    pub phase: StrategyPhase,
    /// Accepted requests, in submission order.
    pub issued: Vec<IssuedRequest>,
    /// Refused requests, in submission order.
    pub rejected: Vec<RejectedRequest>,
}

impl TickReport {
    /// Accepted requests without their origin tags.
    #[must_use]
    pub fn requests(&self) -> Vec<Request> {
        self.issued.iter().map(|issued| issued.request).collect()
    }

    /// Accepted requests made by one planner.
    pub fn issued_by(&self, planner: PlannerKind) -> impl Iterator<Item = &Request> + '_ {
        self.issued
            .iter()
            .filter(move |issued| issued.origin == planner)
            .map(|issued| &issued.request)
    }

    /// Refused requests made by one planner.
    pub fn rejected_by(&self, planner: PlannerKind) -> impl Iterator<Item = &RejectedRequest> + '_ {
        self.rejected
            .iter()
            .filter(move |rejected| rejected.origin == planner)
    }
}

/// Shared state for all planners within one tick.
pub struct TickContext<'a> {
    snapshot: &'a WorldSnapshot,
    catalog: &'a Catalog,
    config: &'a BotConfig,
    sink: &'a mut dyn CommandSink,
    ledger: ClaimLedger,
    rng: StdRng,
    phase: StrategyPhase,
    current: PlannerKind,
    report: TickReport,
}

impl<'a> TickContext<'a> {
    /// Open a tick over a snapshot.
    pub fn new(
        snapshot: &'a WorldSnapshot,
        catalog: &'a Catalog,
        config: &'a BotConfig,
        sink: &'a mut dyn CommandSink,
    ) -> Self {
        let phase = StrategyPhase::derive(snapshot, config);
        let seed = config.seed ^ snapshot.tick.wrapping_mul(TICK_SEED_MIX);
        Self {
            snapshot,
            catalog,
            config,
            sink,
            ledger: ClaimLedger::new(),
            rng: StdRng::seed_from_u64(seed),
            phase,
            current: PlannerKind::Economy,
            report: TickReport {
                tick: snapshot.tick,
                phase,
                issued: Vec::new(),
                rejected: Vec::new(),
            },
        }
    }

    /// The tick's snapshot.
    #[must_use]
    pub fn snapshot(&self) -> &'a WorldSnapshot {
        self.snapshot
    }

    /// Static tables.
    #[must_use]
    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    /// Bot configuration.
    #[must_use]
    pub fn config(&self) -> &'a BotConfig {
        self.config
    }

    /// Phase derived for this tick.
    #[must_use]
    pub fn phase(&self) -> StrategyPhase {
        self.phase
    }

    /// Claims made so far.
    #[must_use]
    pub fn ledger(&self) -> &ClaimLedger {
        &self.ledger
    }

    /// Predicates over the snapshot minus what has been spent so far.
    #[must_use]
    pub fn gate(&self) -> ResourceGate<'a> {
        ResourceGate::new(self.snapshot, self.catalog, self.ledger.spent())
    }

    /// Requests accepted so far this tick.
    #[must_use]
    pub fn issued(&self) -> &[IssuedRequest] {
        &self.report.issued
    }

    /// Tag subsequent requests with `planner`.
    pub fn begin(&mut self, planner: PlannerKind) {
        self.current = planner;
    }

    /// Nearest ready drone not yet claimed this tick.
    #[must_use]
    pub fn nearest_builder(&self, point: Vec2Fixed) -> Option<&'a Unit<UnitKind>> {
        self.snapshot
            .workers()
            .ready()
            .unclaimed(&self.ledger)
            .closest_to(point)
    }

    /// Pick one element uniformly with the tick's seeded RNG.
    pub fn choose<'s, T>(&mut self, items: &'s [T]) -> Option<&'s T> {
        items.choose(&mut self.rng)
    }

    /// Claim the actor and forward the request to the engine.
    ///
    /// Returns `true` if the engine accepted it. A refused request frees
    /// its actor again; an actor already claimed this tick is never
    /// forwarded.
    pub fn submit(&mut self, request: Request) -> bool {
        let origin = self.current;

        if !self.ledger.claim(request.actor) {
            tracing::warn!(
                actor = request.actor,
                planner = ?origin,
                "Actor already claimed this tick, request dropped"
            );
            self.report.rejected.push(RejectedRequest {
                origin,
                request,
                reason: Rejection::AlreadyClaimed(request.actor),
            });
            return false;
        }

        match self.sink.submit(&request) {
            Ok(()) => {
                if let Some(product) = request.action.product() {
                    self.ledger.spend(self.catalog.cost_of(product));
                }
                tracing::debug!(
                    tick = self.snapshot.tick,
                    planner = ?origin,
                    actor = request.actor,
                    action = ?request.action,
                    "Request accepted"
                );
                self.report.issued.push(IssuedRequest { origin, request });
                true
            }
            Err(reason) => {
                self.ledger.release(request.actor);
                tracing::debug!(
                    tick = self.snapshot.tick,
                    planner = ?origin,
                    actor = request.actor,
                    action = ?request.action,
                    %reason,
                    "Request rejected"
                );
                self.report.rejected.push(RejectedRequest {
                    origin,
                    request,
                    reason,
                });
                false
            }
        }
    }

    /// Train `kind` from a random unclaimed larva.
    ///
    /// Larvae are fungible, so any free one will do. Returns `false` when
    /// none is left or the engine refused.
    pub fn train_from_larva(&mut self, kind: UnitKind) -> bool {
        let larvae = self
            .snapshot
            .units_of(UnitKind::Larva)
            .unclaimed(&self.ledger);
        let Some(larva) = larvae.as_slice().choose(&mut self.rng).copied() else {
            return false;
        };
        self.submit(Request::new(larva.id, Action::Train(kind)))
    }

    /// Close the tick and hand back the report.
    #[must_use]
    pub fn finish(self) -> TickReport {
        self.report
    }
}
