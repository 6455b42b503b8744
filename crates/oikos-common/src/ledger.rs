//! Balance ledger - the external wallet-store boundary
//!
//! The core never performs real settlement; it reads and writes an
//! append-free ledger keyed by agent identity. [`InMemoryLedger`] is the
//! stand-in used for simulation runs.

use std::collections::HashMap;

use parking_lot::RwLock;
use rust_decimal::Decimal;

use crate::types::ids::AgentId;

/// External balance store interface
pub trait BalanceLedger: Send + Sync {
    /// Current total balance for an agent (zero if unknown)
    fn balance(&self, agent: &AgentId) -> Decimal;

    /// Overwrite an agent's recorded balance
    fn set_balance(&self, agent: &AgentId, amount: Decimal);

    /// Remove an agent's entry (death cleanup)
    fn remove(&self, agent: &AgentId);

    /// Sum of all recorded balances
    fn total(&self) -> Decimal;
}

/// In-memory ledger used by the simulation
#[derive(Default)]
pub struct InMemoryLedger {
    balances: RwLock<HashMap<AgentId, Decimal>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of agents with a recorded balance
    pub fn len(&self) -> usize {
        self.balances.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.read().is_empty()
    }
}

impl BalanceLedger for InMemoryLedger {
    fn balance(&self, agent: &AgentId) -> Decimal {
        self.balances
            .read()
            .get(agent)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    fn set_balance(&self, agent: &AgentId, amount: Decimal) {
        self.balances.write().insert(*agent, amount);
    }

    fn remove(&self, agent: &AgentId) {
        self.balances.write().remove(agent);
    }

    fn total(&self) -> Decimal {
        self.balances.read().values().copied().sum()
    }
}
