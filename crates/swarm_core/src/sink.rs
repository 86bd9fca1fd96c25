//! Command submission interface.
//!
//! The engine is a black box behind [`CommandSink`]. Submission is
//! synchronous within the tick: a request is accepted or rejected before
//! the planner considers the next one.
//!
//! # Command Flow
//!
//! Every order the bot gives goes through [`CommandSink::submit`]. There
//! is no other channel to the engine, so a scripted sink in tests sees
//! exactly what a live engine would.

use crate::command::Request;
use crate::error::Rejection;

/// Accepts or rejects one request at a time.
pub trait CommandSink {
    /// Submit a request to the engine.
    ///
    /// # Errors
    /// Returns the engine's [`Rejection`] if:
    /// - The actor no longer exists or cannot act
    /// - The placement is invalid
    /// - Funds or supply ran out
    /// - The ability is unavailable
    fn submit(&mut self, request: &Request) -> Result<(), Rejection>;
}

impl<S: CommandSink + ?Sized> CommandSink for &mut S {
    fn submit(&mut self, request: &Request) -> Result<(), Rejection> {
        (**self).submit(request)
    }
}
