//! # Swarm Development Tools
//!
//! Command-line helpers for working on the bot:
//! - Config validation
//! - Tech tree inspection
//! - Offline replay of a single tick from a saved snapshot

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod error;
pub mod inspect;
pub mod validate;
