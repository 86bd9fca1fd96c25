//! # Swarm Core
//!
//! Reactive decision engine for a swarm-faction RTS bot.
//!
//! Once per game step the host hands over an immutable [`WorldSnapshot`]
//! and a [`CommandSink`]; [`SwarmBot::on_tick`] runs an ordered pipeline
//! of planners that decide what to build, train, research and attack.
//!
//! This crate holds **no** state across ticks:
//! - Every decision is re-derived from the snapshot
//! - Producers are claimed through a ledger that lives for one tick
//! - Randomness is seeded from the tick index, so replaying a snapshot
//!   replays its requests
//!
//! ## Crate Structure
//!
//! - [`snapshot`] - Read-only world view and group queries
//! - [`gate`] - Affordability and prerequisite predicates
//! - [`economy`], [`tech_tree`], [`army`], [`upgrades`], [`combat`] - Planners
//! - [`orchestrator`] - Tick entry point
//! - [`catalog`] - Unit, structure and research tables
//! - [`config`] - RON configuration
//!
//! [`WorldSnapshot`]: snapshot::WorldSnapshot
//! [`CommandSink`]: sink::CommandSink
//! [`SwarmBot::on_tick`]: orchestrator::SwarmBot::on_tick

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod army;
pub mod catalog;
pub mod combat;
pub mod command;
pub mod config;
pub mod context;
pub mod economy;
pub mod error;
pub mod gate;
pub mod ledger;
pub mod math;
pub mod orchestrator;
pub mod sink;
pub mod snapshot;
pub mod strategy;
pub mod tech_tree;
pub mod upgrades;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::army::{ArmyCompositionPlanner, CompositionSkew};
    pub use crate::catalog::{
        Ability, Anchor, Catalog, Category, Cost, PlacementPolicy, Product, ProductionSource,
        Research, StructureKind, TechNode, TechTier, UnitKind,
    };
    pub use crate::combat::CombatCommander;
    pub use crate::command::{Action, IssuedRequest, PlannerKind, Request, Site, Target};
    pub use crate::config::{AttackThreshold, BotConfig};
    pub use crate::context::{RejectedRequest, TickContext, TickReport};
    pub use crate::economy::EconomyController;
    pub use crate::error::{BotError, Rejection, Result};
    pub use crate::gate::ResourceGate;
    pub use crate::ledger::ClaimLedger;
    pub use crate::math::{Fixed, Vec2Fixed};
    pub use crate::orchestrator::{Planner, SwarmBot};
    pub use crate::sink::CommandSink;
    pub use crate::snapshot::{EntityId, Geyser, Group, Unit, VisibleEnemy, WorldSnapshot};
    pub use crate::strategy::StrategyPhase;
    pub use crate::tech_tree::TechTreePlanner;
    pub use crate::upgrades::UpgradeManager;
}
