//! Tool errors.

use thiserror::Error;

use swarm_core::error::BotError;

/// Result type alias using [`ToolError`].
pub type Result<T> = std::result::Result<T, ToolError>;

/// Everything a tool command can fail with.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Config or catalog rejected by the bot.
    #[error(transparent)]
    Bot(#[from] BotError),

    /// Input file could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        /// Offending path.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Snapshot file is not valid RON.
    #[error("Failed to parse snapshot: {0}")]
    Snapshot(#[from] ron::error::SpannedError),

    /// Output could not be rendered.
    #[error("Failed to render RON: {0}")]
    Render(#[from] ron::Error),
}
