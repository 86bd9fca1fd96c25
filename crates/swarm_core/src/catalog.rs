//! Static unit, structure and research tables.
//!
//! The catalog is built once at start-up and never changes. It answers
//! "what does X cost", "what produces X" and "what must exist before X",
//! and owns the prerequisite DAG that the tech planner walks.
//!
//! # Prerequisite order
//!
//! [`Catalog::new`] rejects dangling prerequisites and cycles, then caches
//! a prerequisite-first order with a stable tie-break on
//! `(tier, declaration index)`. Every consumer sees the same order on
//! every tick.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::command::PlannerKind;
use crate::error::{BotError, Result};

/// Unit types the bot owns or produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum UnitKind {
    /// Spawn resource; consumed by every larva-trained unit.
    Larva,
    /// Worker and builder.
    Drone,
    /// Supply provider.
    Overlord,
    /// Booster and support caster, trained at a townhall.
    Queen,
    /// Cheap melee unit (anti-light).
    Zergling,
    /// Armored ranged unit (anti-heavy).
    Roach,
    /// Ranged unit that can hit air.
    Hydralisk,
}

/// Structure types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StructureKind {
    /// Base, tier 1.
    Hatchery,
    /// Base, tier 2.
    Lair,
    /// Base, tier 3.
    Hive,
    /// Gas harvesting building on a geyser.
    Extractor,
    /// Unlocks queens and zerglings.
    SpawningPool,
    /// Weapon and carapace research.
    EvolutionChamber,
    /// Unlocks roaches.
    RoachWarren,
    /// Unlocks banelings.
    BanelingNest,
    /// Unlocks hydralisks.
    HydraliskDen,
    /// Caster tech, required for hive.
    InfestationPit,
    /// Unlocks ultralisks.
    UltraliskCavern,
    /// Static anti-air defense.
    SporeCrawler,
}

impl StructureKind {
    /// All three base tiers count as townhalls.
    #[must_use]
    pub const fn is_townhall(self) -> bool {
        matches!(self, Self::Hatchery | Self::Lair | Self::Hive)
    }

    /// Whether an instance of `self` fulfils a requirement for `required`.
    ///
    /// Morphed bases keep satisfying the tiers below them.
    #[must_use]
    pub fn satisfies(self, required: Self) -> bool {
        self == required
            || matches!(
                (required, self),
                (Self::Hatchery, Self::Lair | Self::Hive) | (Self::Lair, Self::Hive)
            )
    }
}

/// Researchable upgrades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Research {
    /// Zergling movement speed.
    MetabolicBoost,
    /// Melee attacks, level 1.
    MeleeWeaponsLevel1,
    /// Ranged attacks, level 1.
    MissileWeaponsLevel1,
    /// Ground armor, level 1.
    GroundCarapaceLevel1,
}

/// Abilities the engine may report as currently castable on a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Ability {
    /// Plain attack order.
    Attack,
    /// Queen boost on a townhall.
    InjectLarva,
    /// Hatchery morph.
    UpgradeToLair,
    /// Lair morph.
    UpgradeToHive,
    /// Start a research at a structure.
    Research(Research),
}

/// Role of a unit type in army composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Workers and supply.
    Economy,
    /// Fights light units.
    Light,
    /// Fights armored units.
    Heavy,
    /// Hits air targets.
    AntiAir,
    /// Flying combat units.
    Air,
    /// Support casters.
    Caster,
}

/// Resource and supply price of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Cost {
    /// Mineral price.
    pub minerals: u32,
    /// Vespene price.
    pub vespene: u32,
    /// Supply consumed.
    pub supply: u32,
}

impl Cost {
    /// Free.
    pub const ZERO: Self = Self::new(0, 0, 0);

    /// Create a new cost.
    #[must_use]
    pub const fn new(minerals: u32, vespene: u32, supply: u32) -> Self {
        Self {
            minerals,
            vespene,
            supply,
        }
    }
}

impl std::ops::Add for Cost {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            minerals: self.minerals.saturating_add(rhs.minerals),
            vespene: self.vespene.saturating_add(rhs.vespene),
            supply: self.supply.saturating_add(rhs.supply),
        }
    }
}

impl std::ops::AddAssign for Cost {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

/// Anything the bot can pay for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Product {
    /// A trained unit.
    Unit(UnitKind),
    /// A constructed or morphed structure.
    Structure(StructureKind),
    /// A research.
    Research(Research),
}

/// Which pool a unit is trained from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductionSource {
    /// Consumes one larva.
    Larva,
    /// Queued at an idle ready townhall.
    Townhall,
}

/// Static entry for a trainable unit type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitTypeSpec {
    /// Unit type.
    pub kind: UnitKind,
    /// Price.
    pub cost: Cost,
    /// Producer pool.
    pub source: ProductionSource,
    /// Structures that must exist.
    pub prerequisites: Vec<StructureKind>,
    /// Composition role.
    pub category: Category,
}

impl UnitTypeSpec {
    fn new(kind: UnitKind, cost: Cost, source: ProductionSource, category: Category) -> Self {
        Self {
            kind,
            cost,
            source,
            prerequisites: Vec::new(),
            category,
        }
    }

    fn requires(mut self, structure: StructureKind) -> Self {
        self.prerequisites.push(structure);
        self
    }
}

/// Rough position of a node in the build order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TechTier {
    /// Bases, gas, pool and upgrade buildings.
    Foundation,
    /// Army tech buildings.
    Weapons,
    /// Caster tech buildings.
    Caster,
    /// Static defense.
    Defense,
}

/// What a placement is measured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Anchor {
    /// First ready townhall.
    Townhall,
    /// First ready instance of a given structure.
    Structure(StructureKind),
}

/// How a drone-built node chooses its location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementPolicy {
    /// Hand the anchor to the engine and let it search nearby.
    Near(Anchor),
    /// Probe along the ray from the anchor toward the map center.
    Perimeter(Anchor),
    /// Built on a vespene geyser.
    OnGeyser,
    /// Expansion site chosen by the engine.
    ExpansionSite,
    /// Morph of an existing structure, no placement.
    InPlace,
}

/// A structure type together with its prerequisite edges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechNode {
    /// Structure type.
    pub structure: StructureKind,
    /// Price.
    pub cost: Cost,
    /// Structures that must all be built first.
    pub prerequisites: Vec<StructureKind>,
    /// Ordering tier.
    pub tier: TechTier,
    /// Where the structure goes.
    pub placement: PlacementPolicy,
    /// Planner responsible for requesting it.
    pub owner: PlannerKind,
    /// Maximum instances the tech planner keeps.
    pub limit: u32,
}

impl TechNode {
    fn new(
        structure: StructureKind,
        cost: Cost,
        tier: TechTier,
        placement: PlacementPolicy,
        owner: PlannerKind,
    ) -> Self {
        Self {
            structure,
            cost,
            prerequisites: Vec::new(),
            tier,
            placement,
            owner,
            limit: 1,
        }
    }

    fn requires(mut self, structure: StructureKind) -> Self {
        self.prerequisites.push(structure);
        self
    }

    fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }
}

/// Static entry for a research.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchSpec {
    /// Research.
    pub research: Research,
    /// Price.
    pub cost: Cost,
    /// Structure that hosts it.
    pub building: StructureKind,
}

/// Immutable lookup tables plus the cached prerequisite-first order.
#[derive(Debug, Clone)]
pub struct Catalog {
    units: BTreeMap<UnitKind, UnitTypeSpec>,
    nodes: Vec<TechNode>,
    research: BTreeMap<Research, ResearchSpec>,
    order: Vec<StructureKind>,
}

impl Catalog {
    /// Build a catalog, validating the tech DAG.
    pub fn new(
        units: Vec<UnitTypeSpec>,
        nodes: Vec<TechNode>,
        research: Vec<ResearchSpec>,
    ) -> Result<Self> {
        let order = prerequisite_order(&nodes)?;
        Ok(Self {
            units: units.into_iter().map(|spec| (spec.kind, spec)).collect(),
            nodes,
            research: research.into_iter().map(|spec| (spec.research, spec)).collect(),
            order,
        })
    }

    /// The standard swarm catalog.
    pub fn standard() -> Result<Self> {
        use PlacementPolicy::{ExpansionSite, InPlace, Near, OnGeyser, Perimeter};
        use ProductionSource::{Larva, Townhall};
        use StructureKind::*;

        let units = vec![
            UnitTypeSpec::new(UnitKind::Drone, Cost::new(50, 0, 1), Larva, Category::Economy),
            UnitTypeSpec::new(UnitKind::Overlord, Cost::new(100, 0, 0), Larva, Category::Economy),
            UnitTypeSpec::new(UnitKind::Queen, Cost::new(150, 0, 2), Townhall, Category::Caster)
                .requires(SpawningPool),
            UnitTypeSpec::new(UnitKind::Zergling, Cost::new(50, 0, 1), Larva, Category::Light)
                .requires(SpawningPool),
            UnitTypeSpec::new(UnitKind::Roach, Cost::new(75, 25, 2), Larva, Category::Heavy)
                .requires(RoachWarren),
            UnitTypeSpec::new(
                UnitKind::Hydralisk,
                Cost::new(100, 50, 2),
                Larva,
                Category::AntiAir,
            )
            .requires(HydraliskDen),
        ];

        use TechTier::{Caster, Defense, Foundation, Weapons};

        let town = Anchor::Townhall;
        let by_economy = PlannerKind::Economy;
        let by_tech = PlannerKind::TechTree;
        let by_upgrades = PlannerKind::Upgrades;
        let nodes = vec![
            TechNode::new(Hatchery, Cost::new(300, 0, 0), Foundation, ExpansionSite, by_economy),
            TechNode::new(Extractor, Cost::new(25, 0, 0), Foundation, OnGeyser, by_economy)
                .requires(Hatchery),
            TechNode::new(SpawningPool, Cost::new(200, 0, 0), Foundation, Perimeter(town), by_tech)
                .requires(Hatchery),
            TechNode::new(EvolutionChamber, Cost::new(75, 0, 0), Foundation, Near(town), by_tech)
                .requires(SpawningPool),
            TechNode::new(Lair, Cost::new(150, 100, 0), Foundation, InPlace, by_upgrades)
                .requires(SpawningPool),
            TechNode::new(RoachWarren, Cost::new(150, 0, 0), Weapons, Near(town), by_tech)
                .requires(SpawningPool),
            TechNode::new(BanelingNest, Cost::new(100, 50, 0), Weapons, Near(town), by_tech)
                .requires(SpawningPool),
            TechNode::new(
                HydraliskDen,
                Cost::new(100, 100, 0),
                Weapons,
                Near(Anchor::Structure(Lair)),
                by_tech,
            )
            .requires(Lair),
            TechNode::new(InfestationPit, Cost::new(100, 100, 0), Caster, Near(town), by_tech)
                .requires(Lair),
            TechNode::new(Hive, Cost::new(200, 150, 0), Foundation, InPlace, by_upgrades)
                .requires(Lair)
                .requires(InfestationPit),
            TechNode::new(UltraliskCavern, Cost::new(150, 200, 0), Weapons, Near(town), by_tech)
                .requires(Hive),
            TechNode::new(SporeCrawler, Cost::new(75, 0, 0), Defense, Near(town), by_tech)
                .requires(EvolutionChamber)
                .limit(2),
        ];

        let research = vec![
            ResearchSpec {
                research: Research::MetabolicBoost,
                cost: Cost::new(100, 100, 0),
                building: SpawningPool,
            },
            ResearchSpec {
                research: Research::MeleeWeaponsLevel1,
                cost: Cost::new(100, 100, 0),
                building: EvolutionChamber,
            },
            ResearchSpec {
                research: Research::MissileWeaponsLevel1,
                cost: Cost::new(100, 100, 0),
                building: EvolutionChamber,
            },
            ResearchSpec {
                research: Research::GroundCarapaceLevel1,
                cost: Cost::new(150, 150, 0),
                building: EvolutionChamber,
            },
        ];

        Self::new(units, nodes, research)
    }

    /// Spec for a trainable unit.
    #[must_use]
    pub fn unit(&self, kind: UnitKind) -> Option<&UnitTypeSpec> {
        self.units.get(&kind)
    }

    /// Tech node for a structure.
    #[must_use]
    pub fn node(&self, structure: StructureKind) -> Option<&TechNode> {
        self.nodes.iter().find(|node| node.structure == structure)
    }

    /// Spec for a research.
    #[must_use]
    pub fn research(&self, research: Research) -> Option<&ResearchSpec> {
        self.research.get(&research)
    }

    /// All research specs, in declaration order of [`Research`].
    pub fn researches(&self) -> impl Iterator<Item = &ResearchSpec> {
        self.research.values()
    }

    /// Tech nodes in prerequisite-first order.
    pub fn nodes_in_order(&self) -> impl Iterator<Item = &TechNode> {
        self.order.iter().filter_map(|structure| self.node(*structure))
    }

    /// The cached prerequisite-first order.
    #[must_use]
    pub fn build_order(&self) -> &[StructureKind] {
        &self.order
    }

    /// Price of a product; unknown products are free.
    #[must_use]
    pub fn cost_of(&self, product: Product) -> Cost {
        match product {
            Product::Unit(kind) => self.unit(kind).map(|spec| spec.cost),
            Product::Structure(structure) => self.node(structure).map(|node| node.cost),
            Product::Research(research) => self.research(research).map(|spec| spec.cost),
        }
        .unwrap_or(Cost::ZERO)
    }
}

/// Kahn's algorithm with a stable `(tier, declaration index)` tie-break.
fn prerequisite_order(nodes: &[TechNode]) -> Result<Vec<StructureKind>> {
    let declared: BTreeSet<StructureKind> = nodes.iter().map(|node| node.structure).collect();
    for node in nodes {
        if let Some(missing) = node
            .prerequisites
            .iter()
            .find(|prereq| !declared.contains(prereq))
        {
            return Err(BotError::UnknownPrerequisite {
                node: node.structure,
                missing: *missing,
            });
        }
    }

    let mut placed: BTreeSet<StructureKind> = BTreeSet::new();
    let mut order = Vec::with_capacity(nodes.len());

    while order.len() < nodes.len() {
        let next = nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| !placed.contains(&node.structure))
            .filter(|(_, node)| node.prerequisites.iter().all(|p| placed.contains(p)))
            .min_by_key(|(index, node)| (node.tier, *index));

        let Some((_, node)) = next else {
            let stuck = nodes
                .iter()
                .map(|node| node.structure)
                .filter(|structure| !placed.contains(structure))
                .collect();
            return Err(BotError::TechCycle(stuck));
        };

        placed.insert(node.structure);
        order.push(node.structure);
    }

    Ok(order)
}
