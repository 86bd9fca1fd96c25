//! Error types for the strategy engine.
//!
//! Nothing that happens inside a tick is fatal. [`BotError`] only covers
//! construction time (loading configuration, validating the tech tree);
//! [`Rejection`] is the engine's answer to a single submitted request.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::StructureKind;

/// Result type alias using [`BotError`].
pub type Result<T> = std::result::Result<T, BotError>;

/// Top-level error type for bot construction and configuration.
#[derive(Debug, Error)]
pub enum BotError {
    /// Config file does not exist.
    #[error("Config file not found: {0}")]
    ConfigNotFound(String),

    /// Config file could not be read.
    #[error("Failed to read config file: {0}")]
    ConfigRead(#[from] std::io::Error),

    /// Config file is not valid RON for [`crate::config::BotConfig`].
    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] ron::error::SpannedError),

    /// Config parsed but holds values the planners cannot work with.
    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfig {
        /// Offending field path.
        field: String,
        /// Why the value was refused.
        message: String,
    },

    /// A tech node lists a prerequisite that has no node of its own.
    #[error("Tech node {node:?} requires {missing:?}, which is not in the tech tree")]
    UnknownPrerequisite {
        /// Node with the dangling edge.
        node: StructureKind,
        /// Prerequisite that could not be resolved.
        missing: StructureKind,
    },

    /// The tech tree contains a cycle, so no prerequisite-first order exists.
    #[error("Tech tree has a prerequisite cycle through {0:?}")]
    TechCycle(Vec<StructureKind>),
}

/// Why the engine declined a submitted request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum Rejection {
    /// The acting unit no longer exists or cannot perform the action.
    #[error("No valid actor for the request")]
    NoValidActor,

    /// The chosen build location is blocked or off-creep.
    #[error("Invalid placement")]
    InvalidPlacement,

    /// Funds or supply ran out between planning and submission.
    #[error("Insufficient resources")]
    InsufficientResources,

    /// The ability is on cooldown, already queued or not researched.
    #[error("Ability unavailable")]
    AbilityUnavailable,

    /// The ledger already handed this actor to another request this tick.
    #[error("Actor {0} already claimed this tick")]
    AlreadyClaimed(u64),

    /// Any other engine-side refusal.
    #[error("Engine rejected request: {0}")]
    Engine(String),
}
