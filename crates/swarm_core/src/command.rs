//! Requests the planners hand to the engine.
//!
//! A [`Request`] is the atomic unit of work: which specific unit acts,
//! and what it should do. Requests are plain data so they can be logged,
//! compared across runs and replayed against a scripted sink in tests.

use serde::{Deserialize, Serialize};

use crate::catalog::{Ability, Product, Research, StructureKind, UnitKind};
use crate::math::Vec2Fixed;
use crate::snapshot::EntityId;

/// The sub-planners, in the order the orchestrator runs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PlannerKind {
    /// Supply, workers, boost, gas, expansion.
    Economy,
    /// Prerequisite-gated construction.
    TechTree,
    /// Army composition and unit training.
    Army,
    /// Research and base morphs.
    Upgrades,
    /// Attack dispatch.
    Combat,
}

/// Target of an ability or attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Target {
    /// A map location.
    Point(Vec2Fixed),
    /// A specific unit or structure.
    Unit(EntityId),
}

/// Where a structure should be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Site {
    /// Exactly this point.
    Exact(Vec2Fixed),
    /// Engine searches for a free spot around this point.
    Near(Vec2Fixed),
    /// On the given vespene geyser.
    Geyser(EntityId),
    /// Next free expansion, chosen by the engine.
    Expansion,
}

/// What the acting unit should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Train a unit from a larva or townhall.
    Train(UnitKind),
    /// Build a structure with a drone.
    Build {
        /// Structure to build.
        structure: StructureKind,
        /// Location policy.
        site: Site,
    },
    /// Morph the acting structure into another one.
    Morph(StructureKind),
    /// Start a research at the acting structure.
    Research(Research),
    /// Cast an ability.
    Cast(Ability, Target),
    /// Attack a point or unit.
    Attack(Target),
}

impl Action {
    /// The product this action pays for, if any.
    #[must_use]
    pub const fn product(&self) -> Option<Product> {
        match *self {
            Self::Train(unit) => Some(Product::Unit(unit)),
            Self::Build { structure, .. } | Self::Morph(structure) => {
                Some(Product::Structure(structure))
            }
            Self::Research(research) => Some(Product::Research(research)),
            Self::Cast(..) | Self::Attack(_) => None,
        }
    }
}

/// A single command for one specific actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Request {
    /// Acting unit or structure.
    pub actor: EntityId,
    /// What it should do.
    pub action: Action,
}

impl Request {
    /// Create a new request.
    #[must_use]
    pub const fn new(actor: EntityId, action: Action) -> Self {
        Self { actor, action }
    }
}

/// A request the engine accepted, tagged with the planner that made it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IssuedRequest {
    /// Planner that emitted the request.
    pub origin: PlannerKind,
    /// The request itself.
    pub request: Request,
}
