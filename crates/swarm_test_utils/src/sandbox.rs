//! A miniature engine for multi-tick tests.
//!
//! [`Sandbox`] owns a [`WorldSnapshot`], answers requests the way the real
//! engine would (actor checks, prerequisites, placement, payment) and
//! advances time: eggs hatch, buildings finish, research completes and
//! drones mine. It is deliberately crude. There is no pathing and no
//! combat resolution; an attack order simply keeps a unit busy for a while.

use std::collections::BTreeSet;

use swarm_core::catalog::{
    Ability, Catalog, Cost, Product, ProductionSource, Research, StructureKind, UnitKind,
};
use swarm_core::command::{Action, Request, Site, Target};
use swarm_core::context::TickReport;
use swarm_core::error::Rejection;
use swarm_core::math::{Fixed, Vec2Fixed};
use swarm_core::orchestrator::SwarmBot;
use swarm_core::sink::CommandSink;
use swarm_core::snapshot::{EntityId, Unit, WorldSnapshot};
use tracing::trace;

use crate::fixtures::{structure_abilities, unit_abilities};

/// Timing and income knobs.
#[derive(Debug, Clone)]
pub struct SandboxRules {
    /// Ticks from order to completion for everything.
    pub build_ticks: u64,
    /// A townhall spawns a larva every this many ticks.
    pub larva_interval: u64,
    /// Larvae a townhall holds before it stops spawning.
    pub max_larvae: usize,
    /// Minerals per drone per tick.
    pub income_per_worker: u32,
    /// Vespene per finished extractor per tick.
    pub gas_per_extractor: u32,
    /// Free expansion sites, handed out in order.
    pub expansions: Vec<Vec2Fixed>,
}

impl Default for SandboxRules {
    fn default() -> Self {
        Self {
            build_ticks: 20,
            larva_interval: 10,
            max_larvae: 3,
            income_per_worker: 1,
            gas_per_extractor: 3,
            expansions: vec![
                Vec2Fixed::from_ints(60, 20),
                Vec2Fixed::from_ints(20, 60),
                Vec2Fixed::from_ints(60, 60),
            ],
        }
    }
}

#[derive(Debug, Clone)]
enum Outcome {
    Hatch(UnitKind, Vec2Fixed),
    Finish(EntityId),
    Morph(EntityId, StructureKind),
    Research(Research),
    Inject(EntityId),
    Idle,
}

#[derive(Debug, Clone)]
struct Job {
    ready_at: u64,
    host: Option<EntityId>,
    pending: Option<Product>,
    outcome: Outcome,
}

/// Townhalls supply this much each.
const TOWNHALL_SUPPLY: u32 = 6;
/// Overlords supply this much each.
const OVERLORD_SUPPLY: u32 = 8;
/// Hard supply cap.
const SUPPLY_LIMIT: u32 = 200;
/// Structures may not be placed closer than this to each other.
const FOOTPRINT: i32 = 2;
/// Larvae from one inject.
const INJECT_LARVAE: u32 = 3;

/// In-memory engine implementing [`CommandSink`].
pub struct Sandbox {
    world: WorldSnapshot,
    rules: SandboxRules,
    catalog: Catalog,
    next_id: EntityId,
    jobs: Vec<Job>,
    researched: BTreeSet<Research>,
    blocked: Vec<Vec2Fixed>,
    log: Vec<Request>,
}

impl Sandbox {
    /// Wrap a starting world with default rules.
    ///
    /// # Panics
    ///
    /// Panics if the standard catalog fails to build.
    #[must_use]
    pub fn new(world: WorldSnapshot) -> Self {
        Self::with_rules(world, SandboxRules::default())
    }

    /// Wrap a starting world with custom rules.
    ///
    /// # Panics
    ///
    /// Panics if the standard catalog fails to build.
    #[must_use]
    pub fn with_rules(world: WorldSnapshot, rules: SandboxRules) -> Self {
        let catalog = Catalog::standard().expect("standard catalog is valid");
        let next_id = world
            .units
            .iter()
            .map(|u| u.id)
            .chain(world.structures.iter().map(|s| s.id))
            .chain(world.geysers.iter().map(|g| g.id))
            .chain(world.enemy_units.iter().map(|e| e.id))
            .chain(world.enemy_structures.iter().map(|e| e.id))
            .max()
            .unwrap_or(0)
            + 1;
        Self {
            world,
            rules,
            catalog,
            next_id,
            jobs: Vec::new(),
            researched: BTreeSet::new(),
            blocked: Vec::new(),
            log: Vec::new(),
        }
    }

    /// Current world state.
    #[must_use]
    pub fn snapshot(&self) -> &WorldSnapshot {
        &self.world
    }

    /// Every accepted request so far.
    #[must_use]
    pub fn log(&self) -> &[Request] {
        &self.log
    }

    /// Completed research.
    #[must_use]
    pub fn researched(&self) -> &BTreeSet<Research> {
        &self.researched
    }

    /// Refuse exact-site builds at this point.
    pub fn block(&mut self, at: Vec2Fixed) {
        self.blocked.push(at);
    }

    /// Extractors built or under construction.
    #[must_use]
    pub fn extractor_count(&self) -> usize {
        self.world.structures_of(StructureKind::Extractor).amount()
    }

    /// Run the bot for `ticks` game steps, advancing the world after each.
    pub fn run(&mut self, bot: &SwarmBot, ticks: u64) -> Vec<TickReport> {
        let mut reports = Vec::new();
        for _ in 0..ticks {
            let snapshot = self.world.clone();
            reports.push(bot.on_tick(&snapshot, self));
            self.advance();
        }
        reports
    }

    /// Move time forward one tick.
    pub fn advance(&mut self) {
        self.world.tick += 1;
        let tick = self.world.tick;

        let drones = self.world.workers().count();
        let extractors = self
            .world
            .structures_of(StructureKind::Extractor)
            .ready()
            .count();
        self.world.minerals = self
            .world
            .minerals
            .saturating_add(drones.saturating_mul(self.rules.income_per_worker));
        self.world.vespene = self
            .world
            .vespene
            .saturating_add(extractors.saturating_mul(self.rules.gas_per_extractor));

        if self.rules.larva_interval > 0 && tick % self.rules.larva_interval == 0 {
            self.spawn_larvae();
        }

        let (done, waiting): (Vec<Job>, Vec<Job>) =
            self.jobs.drain(..).partition(|job| job.ready_at <= tick);
        self.jobs = waiting;
        for job in done {
            self.complete(job);
        }

        self.refresh_supply_and_saturation();
    }

    fn allocate(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn spawn_larvae(&mut self) {
        let radius = Fixed::from_num(5);
        let hatcheries: Vec<Vec2Fixed> = self
            .world
            .townhalls()
            .ready()
            .iter()
            .map(|base| base.position)
            .collect();
        for at in hatcheries {
            let nearby = self
                .world
                .units_of(UnitKind::Larva)
                .closer_than(radius, at)
                .amount();
            if nearby < self.rules.max_larvae {
                self.spawn_unit(UnitKind::Larva, at);
            }
        }
    }

    fn spawn_unit(&mut self, kind: UnitKind, at: Vec2Fixed) {
        let id = self.allocate();
        self.world.units.push(Unit {
            id,
            kind,
            position: at,
            ready: true,
            orders: 0,
            surplus_harvesters: 0,
            abilities: unit_abilities(kind),
        });
    }

    fn complete(&mut self, job: Job) {
        if let Some(product) = job.pending {
            if let Some(count) = self.world.pending.get_mut(&product) {
                *count = count.saturating_sub(1);
                if *count == 0 {
                    self.world.pending.remove(&product);
                }
            }
        }
        if let Some(host) = job.host {
            self.set_orders(host, 0);
        }

        match job.outcome {
            Outcome::Hatch(kind, at) => self.spawn_unit(kind, at),
            Outcome::Finish(id) => {
                if let Some(structure) = self.world.structures.iter_mut().find(|s| s.id == id) {
                    structure.ready = true;
                    structure.abilities = structure_abilities(structure.kind);
                }
            }
            Outcome::Morph(id, into) => {
                if let Some(structure) = self.world.structures.iter_mut().find(|s| s.id == id) {
                    structure.kind = into;
                    structure.abilities = structure_abilities(into);
                }
            }
            Outcome::Research(research) => {
                self.researched.insert(research);
            }
            Outcome::Inject(base) => {
                let at = self
                    .world
                    .structures
                    .iter()
                    .find(|s| s.id == base)
                    .map(|s| s.position);
                if let Some(at) = at {
                    for _ in 0..INJECT_LARVAE {
                        self.spawn_unit(UnitKind::Larva, at);
                    }
                }
            }
            Outcome::Idle => {}
        }
    }

    fn refresh_supply_and_saturation(&mut self) {
        let bases = self.world.townhalls().ready().count();
        let overlords = self.world.units_of(UnitKind::Overlord).count();
        self.world.supply_cap = bases
            .saturating_mul(TOWNHALL_SUPPLY)
            .saturating_add(overlords.saturating_mul(OVERLORD_SUPPLY))
            .min(SUPPLY_LIMIT);

        let drones = i32::try_from(self.world.workers().count()).unwrap_or(i32::MAX);
        let per_base = i32::try_from(bases.max(1)).unwrap_or(1);
        for structure in &mut self.world.structures {
            if structure.kind.is_townhall() {
                structure.surplus_harvesters = drones / per_base - 16;
            }
        }
    }

    fn set_orders(&mut self, id: EntityId, orders: u32) {
        if let Some(unit) = self.world.units.iter_mut().find(|u| u.id == id) {
            unit.orders = orders;
        } else if let Some(structure) = self.world.structures.iter_mut().find(|s| s.id == id) {
            structure.orders = orders;
        }
    }

    fn unit(&self, id: EntityId) -> Option<&Unit<UnitKind>> {
        self.world.units.iter().find(|u| u.id == id)
    }

    fn structure(&self, id: EntityId) -> Option<&Unit<StructureKind>> {
        self.world.structures.iter().find(|s| s.id == id)
    }

    fn built(&self, required: StructureKind) -> bool {
        self.world.structures_satisfying(required).ready().exists()
    }

    fn check_prerequisites(&self, prerequisites: &[StructureKind]) -> Result<(), Rejection> {
        if prerequisites.iter().all(|p| self.built(*p)) {
            Ok(())
        } else {
            Err(Rejection::AbilityUnavailable)
        }
    }

    fn pay(&mut self, cost: Cost) -> Result<(), Rejection> {
        let world = &mut self.world;
        if world.minerals < cost.minerals
            || world.vespene < cost.vespene
            || world.supply_left() < cost.supply
        {
            return Err(Rejection::InsufficientResources);
        }
        world.minerals -= cost.minerals;
        world.vespene -= cost.vespene;
        world.supply_used += cost.supply;
        Ok(())
    }

    fn schedule(&mut self, host: Option<EntityId>, pending: Option<Product>, outcome: Outcome) {
        if let Some(product) = pending {
            *self.world.pending.entry(product).or_insert(0) += 1;
        }
        self.jobs.push(Job {
            ready_at: self.world.tick + self.rules.build_ticks,
            host,
            pending,
            outcome,
        });
    }

    fn train(&mut self, actor: EntityId, kind: UnitKind) -> Result<(), Rejection> {
        let spec = self
            .catalog
            .unit(kind)
            .cloned()
            .ok_or_else(|| Rejection::Engine(format!("{kind:?} is not trainable")))?;

        let at = match spec.source {
            ProductionSource::Larva => self
                .unit(actor)
                .filter(|u| u.kind == UnitKind::Larva)
                .map(|u| u.position),
            ProductionSource::Townhall => self
                .structure(actor)
                .filter(|s| s.kind.is_townhall() && s.ready && s.is_idle())
                .map(|s| s.position),
        }
        .ok_or(Rejection::NoValidActor)?;

        self.check_prerequisites(&spec.prerequisites)?;
        self.pay(spec.cost)?;

        let host = match spec.source {
            ProductionSource::Larva => {
                self.world.units.retain(|u| u.id != actor);
                None
            }
            ProductionSource::Townhall => {
                self.set_orders(actor, 1);
                Some(actor)
            }
        };
        self.schedule(host, Some(Product::Unit(kind)), Outcome::Hatch(kind, at));
        Ok(())
    }

    fn site_is_free(&self, at: Vec2Fixed) -> bool {
        let footprint = Fixed::from_num(FOOTPRINT);
        let blocked = self.blocked.iter().any(|b| b.is_closer_than(Fixed::ONE, at));
        let occupied = self
            .world
            .structures
            .iter()
            .any(|s| s.position.is_closer_than(footprint, at));
        !blocked && !occupied
    }

    fn resolve_site(&self, structure: StructureKind, site: Site) -> Result<Vec2Fixed, Rejection> {
        match site {
            Site::Exact(at) => {
                if self.site_is_free(at) {
                    Ok(at)
                } else {
                    Err(Rejection::InvalidPlacement)
                }
            }
            Site::Near(anchor) => (1..=10)
                .map(|step| anchor + Vec2Fixed::from_ints(step * 3, 0))
                .find(|at| self.site_is_free(*at))
                .ok_or(Rejection::InvalidPlacement),
            Site::Geyser(id) => {
                let geyser = self
                    .world
                    .geysers
                    .iter()
                    .find(|g| g.id == id)
                    .ok_or(Rejection::InvalidPlacement)?;
                let taken = self
                    .world
                    .structures_of(StructureKind::Extractor)
                    .closer_than(Fixed::ONE, geyser.position)
                    .exists();
                if structure != StructureKind::Extractor || taken {
                    return Err(Rejection::InvalidPlacement);
                }
                Ok(geyser.position)
            }
            Site::Expansion => {
                let radius = Fixed::from_num(5);
                self.rules
                    .expansions
                    .iter()
                    .copied()
                    .find(|at| !self.world.townhalls().closer_than(radius, *at).exists())
                    .ok_or(Rejection::InvalidPlacement)
            }
        }
    }

    fn build(
        &mut self,
        actor: EntityId,
        structure: StructureKind,
        site: Site,
    ) -> Result<(), Rejection> {
        if !self
            .unit(actor)
            .is_some_and(|u| u.kind == UnitKind::Drone && u.ready)
        {
            return Err(Rejection::NoValidActor);
        }
        let node = self
            .catalog
            .node(structure)
            .cloned()
            .ok_or_else(|| Rejection::Engine(format!("{structure:?} is not buildable")))?;
        self.check_prerequisites(&node.prerequisites)?;
        let at = self.resolve_site(structure, site)?;
        self.pay(node.cost)?;

        // The drone becomes the building.
        self.world.units.retain(|u| u.id != actor);
        self.world.supply_used = self.world.supply_used.saturating_sub(1);

        let id = self.allocate();
        self.world.structures.push(Unit {
            id,
            kind: structure,
            position: at,
            ready: false,
            orders: 0,
            surplus_harvesters: 0,
            abilities: Vec::new(),
        });
        self.schedule(None, None, Outcome::Finish(id));
        Ok(())
    }

    fn morph(&mut self, actor: EntityId, into: StructureKind) -> Result<(), Rejection> {
        let ability = match into {
            StructureKind::Lair => Ability::UpgradeToLair,
            StructureKind::Hive => Ability::UpgradeToHive,
            _ => return Err(Rejection::AbilityUnavailable),
        };
        let host = self.structure(actor).ok_or(Rejection::NoValidActor)?;
        if !host.ready || !host.is_idle() || !host.has_ability(ability) {
            return Err(Rejection::AbilityUnavailable);
        }
        let node = self
            .catalog
            .node(into)
            .cloned()
            .ok_or(Rejection::AbilityUnavailable)?;
        self.check_prerequisites(&node.prerequisites)?;
        self.pay(node.cost)?;

        self.set_orders(actor, 1);
        self.schedule(
            Some(actor),
            Some(Product::Structure(into)),
            Outcome::Morph(actor, into),
        );
        Ok(())
    }

    fn research(&mut self, actor: EntityId, research: Research) -> Result<(), Rejection> {
        let ability = Ability::Research(research);
        let host = self.structure(actor).ok_or(Rejection::NoValidActor)?;
        if !host.ready || !host.is_idle() || !host.has_ability(ability) {
            return Err(Rejection::AbilityUnavailable);
        }
        let cost = self.catalog.cost_of(Product::Research(research));
        self.pay(cost)?;

        // Started research is no longer offered anywhere.
        for structure in &mut self.world.structures {
            structure.abilities.retain(|a| *a != ability);
        }
        self.set_orders(actor, 1);
        self.schedule(
            Some(actor),
            Some(Product::Research(research)),
            Outcome::Research(research),
        );
        Ok(())
    }

    fn cast(&mut self, actor: EntityId, ability: Ability, target: Target) -> Result<(), Rejection> {
        let caster = self.unit(actor).ok_or(Rejection::NoValidActor)?;
        if !caster.is_idle() || !caster.has_ability(ability) {
            return Err(Rejection::AbilityUnavailable);
        }
        let (Ability::InjectLarva, Target::Unit(base)) = (ability, target) else {
            return Err(Rejection::AbilityUnavailable);
        };
        if !self.structure(base).is_some_and(|s| s.kind.is_townhall()) {
            return Err(Rejection::AbilityUnavailable);
        }
        self.set_orders(actor, 1);
        self.schedule(Some(actor), None, Outcome::Inject(base));
        Ok(())
    }

    fn attack(&mut self, actor: EntityId) -> Result<(), Rejection> {
        let unit = self.unit(actor).ok_or(Rejection::NoValidActor)?;
        if !unit.has_ability(Ability::Attack) {
            return Err(Rejection::AbilityUnavailable);
        }
        self.set_orders(actor, 1);
        self.schedule(Some(actor), None, Outcome::Idle);
        Ok(())
    }
}

impl CommandSink for Sandbox {
    fn submit(&mut self, request: &Request) -> Result<(), Rejection> {
        let result = match request.action {
            Action::Train(kind) => self.train(request.actor, kind),
            Action::Build { structure, site } => self.build(request.actor, structure, site),
            Action::Morph(into) => self.morph(request.actor, into),
            Action::Research(research) => self.research(request.actor, research),
            Action::Cast(ability, target) => self.cast(request.actor, ability, target),
            Action::Attack(_) => self.attack(request.actor),
        };
        match &result {
            Ok(()) => {
                trace!(tick = self.world.tick, actor = request.actor, action = ?request.action, "Sandbox accepted");
                self.log.push(*request);
            }
            Err(reason) => {
                trace!(tick = self.world.tick, actor = request.actor, %reason, "Sandbox rejected");
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{opening, SnapshotBuilder};

    #[test]
    fn test_larva_training_consumes_larva_and_hatches_later() {
        let world = opening().resources(100, 0).build();
        let larva = world.units_of(UnitKind::Larva).first().unwrap().id;
        let mut sandbox = Sandbox::new(world);

        let request = Request::new(larva, Action::Train(UnitKind::Drone));
        assert_eq!(sandbox.submit(&request), Ok(()));
        assert_eq!(sandbox.snapshot().units_of(UnitKind::Larva).amount(), 2);
        assert_eq!(sandbox.snapshot().pending_count(Product::Unit(UnitKind::Drone)), 1);
        assert_eq!(sandbox.snapshot().minerals, 50);

        // Same larva twice: it is gone now.
        assert_eq!(sandbox.submit(&request), Err(Rejection::NoValidActor));

        for _ in 0..20 {
            sandbox.advance();
        }
        assert_eq!(sandbox.snapshot().workers().amount(), 13);
        assert_eq!(sandbox.snapshot().pending_count(Product::Unit(UnitKind::Drone)), 0);
    }

    #[test]
    fn test_prerequisites_are_enforced() {
        let world = opening().resources(500, 0).build();
        let larva = world.units_of(UnitKind::Larva).first().unwrap().id;
        let mut sandbox = Sandbox::new(world);

        let request = Request::new(larva, Action::Train(UnitKind::Zergling));
        assert_eq!(sandbox.submit(&request), Err(Rejection::AbilityUnavailable));
    }

    #[test]
    fn test_blocked_site_is_invalid_placement() {
        let world = opening().resources(500, 0).build();
        let drone = world.workers().first().unwrap().id;
        let mut sandbox = Sandbox::new(world);
        let at = Vec2Fixed::from_ints(30, 30);
        sandbox.block(at);

        let build = Action::Build {
            structure: StructureKind::SpawningPool,
            site: Site::Exact(at),
        };
        assert_eq!(
            sandbox.submit(&Request::new(drone, build)),
            Err(Rejection::InvalidPlacement)
        );
        assert_eq!(sandbox.snapshot().minerals, 500);
    }

    #[test]
    fn test_structures_finish_and_gain_abilities() {
        let world = SnapshotBuilder::new()
            .base(20, 20)
            .units(UnitKind::Drone, 1, 22, 20)
            .resources(200, 0)
            .supply(1, 6)
            .build();
        let drone = world.workers().first().unwrap().id;
        let mut sandbox = Sandbox::new(world);

        let build = Action::Build {
            structure: StructureKind::SpawningPool,
            site: Site::Near(Vec2Fixed::from_ints(20, 20)),
        };
        assert_eq!(sandbox.submit(&Request::new(drone, build)), Ok(()));
        assert_eq!(sandbox.snapshot().workers().amount(), 0);

        for _ in 0..20 {
            sandbox.advance();
        }
        let pool = sandbox
            .snapshot()
            .structures_of(StructureKind::SpawningPool)
            .ready()
            .first()
            .cloned()
            .unwrap();
        assert!(pool.has_ability(Ability::Research(Research::MetabolicBoost)));
    }
}
