//! Command sinks for tests.
//!
//! [`RecordingSink`] accepts everything. [`ScriptedSink`] answers from a
//! closure, which is how tests model placement failures or an engine that
//! has just run out of money.

use swarm_core::command::{Action, Request, Site};
use swarm_core::error::Rejection;
use swarm_core::math::Vec2Fixed;
use swarm_core::sink::CommandSink;

/// Accepts every request and remembers it.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    /// Requests in submission order.
    pub accepted: Vec<Request>,
}

impl RecordingSink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CommandSink for RecordingSink {
    fn submit(&mut self, request: &Request) -> Result<(), Rejection> {
        self.accepted.push(*request);
        Ok(())
    }
}

/// Answers each request with a caller-supplied rule.
pub struct ScriptedSink<F> {
    rule: F,
    /// Requests the rule accepted.
    pub accepted: Vec<Request>,
    /// Requests the rule refused, with the reason.
    pub rejected: Vec<(Request, Rejection)>,
}

impl<F> ScriptedSink<F>
where
    F: FnMut(&Request) -> Result<(), Rejection>,
{
    /// Create a sink around a rule.
    pub fn new(rule: F) -> Self {
        Self {
            rule,
            accepted: Vec::new(),
            rejected: Vec::new(),
        }
    }

    /// Every request submitted, accepted or not, in order.
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.accepted.len() + self.rejected.len()
    }
}

impl<F> CommandSink for ScriptedSink<F>
where
    F: FnMut(&Request) -> Result<(), Rejection>,
{
    fn submit(&mut self, request: &Request) -> Result<(), Rejection> {
        match (self.rule)(request) {
            Ok(()) => {
                self.accepted.push(*request);
                Ok(())
            }
            Err(reason) => {
                self.rejected.push((*request, reason.clone()));
                Err(reason)
            }
        }
    }
}

/// A sink that refuses everything with `reason`.
pub fn rejecting(reason: Rejection) -> ScriptedSink<impl FnMut(&Request) -> Result<(), Rejection>> {
    ScriptedSink::new(move |_| Err(reason.clone()))
}

/// A sink that refuses exact-site builds wherever `blocked` says the
/// ground is taken. Everything else is accepted.
pub fn blocking_sites<B>(mut blocked: B) -> ScriptedSink<impl FnMut(&Request) -> Result<(), Rejection>>
where
    B: FnMut(Vec2Fixed) -> bool,
{
    ScriptedSink::new(move |request: &Request| match request.action {
        Action::Build {
            site: Site::Exact(at),
            ..
        } if blocked(at) => Err(Rejection::InvalidPlacement),
        _ => Ok(()),
    })
}
