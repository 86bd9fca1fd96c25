//! Within-tick claim ledger.
//!
//! Larvae, townhalls, drones and combat units are contended by several
//! planners. Every request reserves its actor here first; an actor that is
//! already claimed cannot be handed out again until the next tick, when a
//! fresh ledger is created. The ledger also tracks what accepted requests
//! have spent so affordability checks later in the tick see the reduced
//! budget.

use std::collections::BTreeSet;

use crate::catalog::Cost;
use crate::snapshot::EntityId;

/// Claims and spending for one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimLedger {
    claimed: BTreeSet<EntityId>,
    spent: Cost,
}

impl ClaimLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve an actor. Returns `false` if it was already claimed.
    pub fn claim(&mut self, id: EntityId) -> bool {
        self.claimed.insert(id)
    }

    /// Give an actor back after the engine refused its request.
    pub fn release(&mut self, id: EntityId) {
        self.claimed.remove(&id);
    }

    /// Whether an actor is reserved.
    #[must_use]
    pub fn is_claimed(&self, id: EntityId) -> bool {
        self.claimed.contains(&id)
    }

    /// Number of reserved actors.
    #[must_use]
    pub fn claimed_count(&self) -> usize {
        self.claimed.len()
    }

    /// Record the price of an accepted request.
    pub fn spend(&mut self, cost: Cost) {
        self.spent += cost;
    }

    /// Total spent so far this tick.
    #[must_use]
    pub const fn spent(&self) -> Cost {
        self.spent
    }
}
