//! Tick orchestration.
//!
//! [`SwarmBot`] owns the immutable inputs (config, catalog, planner list)
//! and runs every planner in a fixed order over a fresh [`TickContext`]
//! once per game step.
//!
//! # Planner Order
//!
//! Economy, tech tree, army, upgrades, combat. Earlier planners claim
//! producers and spend money first; later planners only see what is left.

use tracing::{debug, info};

use crate::army::ArmyCompositionPlanner;
use crate::catalog::Catalog;
use crate::combat::CombatCommander;
use crate::command::PlannerKind;
use crate::config::BotConfig;
use crate::context::{TickContext, TickReport};
use crate::economy::EconomyController;
use crate::error::Result;
use crate::sink::CommandSink;
use crate::snapshot::WorldSnapshot;
use crate::tech_tree::TechTreePlanner;
use crate::upgrades::UpgradeManager;

/// One stage of the per-tick pipeline.
///
/// Planners hold no state of their own. Everything they know comes from
/// the context, and everything they do goes through
/// [`TickContext::submit`].
pub trait Planner {
    /// Which planner this is, for phase gating and request tagging.
    fn kind(&self) -> PlannerKind;

    /// Inspect the tick and submit requests.
    fn plan(&self, ctx: &mut TickContext<'_>);
}

/// The decision engine.
pub struct SwarmBot {
    config: BotConfig,
    catalog: Catalog,
    planners: Vec<Box<dyn Planner>>,
}

impl SwarmBot {
    /// Create a bot with the standard catalog.
    ///
    /// # Errors
    /// Returns an error if the config fails validation.
    pub fn new(config: BotConfig) -> Result<Self> {
        Self::with_catalog(config, Catalog::standard()?)
    }

    /// Create a bot over a custom catalog.
    ///
    /// # Errors
    /// Returns an error if the config fails validation.
    pub fn with_catalog(config: BotConfig, catalog: Catalog) -> Result<Self> {
        config.validate()?;
        info!(
            seed = config.seed,
            build_order = ?catalog.build_order(),
            "Swarm bot ready"
        );
        Ok(Self {
            config,
            catalog,
            planners: vec![
                Box::new(EconomyController),
                Box::new(TechTreePlanner),
                Box::new(ArmyCompositionPlanner),
                Box::new(UpgradeManager),
                Box::new(CombatCommander),
            ],
        })
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    /// Static tables.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Run all planners for one game step.
    ///
    /// Never fails: infeasible requests are skipped and rejected ones are
    /// recorded in the returned report.
    pub fn on_tick(&self, snapshot: &WorldSnapshot, sink: &mut dyn CommandSink) -> TickReport {
        let mut ctx = TickContext::new(snapshot, &self.catalog, &self.config, sink);
        let phase = ctx.phase();

        for planner in &self.planners {
            let kind = planner.kind();
            if !phase.allows(kind) {
                debug!(planner = ?kind, ?phase, "Planner paused for this phase");
                continue;
            }
            ctx.begin(kind);
            planner.plan(&mut ctx);
        }

        let report = ctx.finish();

        #[cfg(feature = "debug-validation")]
        validate_report(&report);

        debug!(
            tick = report.tick,
            ?phase,
            issued = report.issued.len(),
            rejected = report.rejected.len(),
            "Tick complete"
        );
        report
    }
}

/// Cross-check a finished tick: no actor may appear in two accepted requests.
#[cfg(feature = "debug-validation")]
fn validate_report(report: &TickReport) {
    let mut actors = std::collections::BTreeSet::new();
    for issued in &report.issued {
        if !actors.insert(issued.request.actor) {
            tracing::error!(
                tick = report.tick,
                actor = issued.request.actor,
                "Actor received two accepted requests in one tick"
            );
        }
    }
}
