//! Config validation.

use std::path::Path;

use swarm_core::catalog::StructureKind;
use swarm_core::config::BotConfig;
use swarm_core::orchestrator::SwarmBot;

use crate::error::Result;

/// What a valid config turned into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationSummary {
    /// Configured seed.
    pub seed: u64,
    /// Number of attack thresholds.
    pub thresholds: usize,
    /// Prerequisite-first build order of the catalog the bot would use.
    pub build_order: Vec<StructureKind>,
}

/// Load, range-check and instantiate a bot from a RON config file.
///
/// # Errors
///
/// Returns an error if the file is missing, unreadable, not valid RON, or
/// holds values the planners cannot work with.
pub fn validate_config_file(path: &Path) -> Result<ValidationSummary> {
    summarize(BotConfig::load(path)?)
}

/// Same as [`validate_config_file`] for config text already in memory.
///
/// # Errors
///
/// Returns an error if the text is not a valid config.
pub fn validate_config_str(text: &str) -> Result<ValidationSummary> {
    summarize(BotConfig::from_ron_str(text)?)
}

fn summarize(config: BotConfig) -> Result<ValidationSummary> {
    let bot = SwarmBot::new(config)?;
    Ok(ValidationSummary {
        seed: bot.config().seed,
        thresholds: bot.config().attack_thresholds.len(),
        build_order: bot.catalog().build_order().to_vec(),
    })
}
