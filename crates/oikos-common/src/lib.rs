//! # Oikos Common
//!
//! Shared types, errors, and simulation-wide constants for the Oikos
//! digital-organism economy.
//!
//! ## Core Types
//!
//! - [`AgentId`]/[`LineageId`]: typed identities for agents and founder lines
//! - [`AgentWallet`]: liquid/locked USDC balance management
//! - [`BalanceLedger`]: the external wallet-store boundary, with an
//!   in-memory implementation for simulation runs
//!
//! All monetary amounts are [`rust_decimal::Decimal`]; trait and
//! probability math is `f64` and converts at the boundary via [`money`]
//! and [`money_f64`].

pub mod error;
pub mod ledger;
pub mod types;

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

// Re-export commonly used types at crate root
pub use error::{OikosError, Result};
pub use ledger::{BalanceLedger, InMemoryLedger};
pub use types::{
    ids::{AgentId, LineageId},
    wallet::{AgentWallet, WalletError},
};

/// Oikos version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Simulated hours per tick (1 tick = 1 day)
pub const TICK_HOURS: f64 = 24.0;

// ── Death thresholds ────────────────────────────────────────────────────

/// Balance at which an agent dies immediately (economic collapse)
pub const EMERGENCY_BALANCE_THRESHOLD: f64 = 0.001;

/// Balance below which an agent enters the dying state
pub const DYING_BALANCE_THRESHOLD: f64 = 0.5;

/// Ticks an agent survives in the dying state without recovery
pub const DYING_DURATION: u64 = 5;

/// Consecutive negative-net-flow ticks before economic death
pub const MAX_CONSECUTIVE_FAILURES: u32 = 100;

/// Minimum count of essential genes; below this the genome is unviable
pub const ESSENTIAL_GENE_FLOOR: usize = 20;

// ── Breeding ────────────────────────────────────────────────────────────

/// Minimum balance to request breeding
pub const BREEDING_BALANCE_THRESHOLD: f64 = 15.0;

/// Cost deducted from each parent on a breeding request
pub const BREEDING_COST_PER_PARENT: f64 = 5.0;

/// Starting balance granted to offspring
pub const OFFSPRING_INITIAL_BALANCE: f64 = 6.0;

/// Ticks between breeding requests per agent
pub const BREEDING_COOLDOWN: u64 = 20;

/// Minimum age in ticks before an agent may breed
pub const MINIMUM_BREEDING_AGE: u64 = 15;

// ── Population ──────────────────────────────────────────────────────────

/// Hard population ceiling; breeding requests beyond it are dropped
pub const MAX_POPULATION: usize = 30;

/// Population size that triggers competition culling
pub const OVERCROWDING_THRESHOLD: usize = 25;

// ── Economics ───────────────────────────────────────────────────────────

/// Flat operational cost per tick, before metabolic and activity charges
pub const BASE_TICK_COST: f64 = 0.8;

/// Task rewards are capped at this fraction of current balance
pub const EARNINGS_CAP_PERCENT: f64 = 0.30;

/// A single negative event can destroy at most this fraction of balance
pub const NEGATIVE_EVENT_LOSS_CAP: f64 = 0.20;

/// Minimum liquid capital before opening new positions
pub const DEFI_MIN_LIQUID: f64 = 5.0;

/// Accrued yield paid on position exit is capped at this fraction of principal
pub const POSITION_PAYOUT_CAP: f64 = 0.50;

// ── Senescence ──────────────────────────────────────────────────────────

/// Tick after which old-age death rolls begin
pub const SENESCENCE_START_TICK: u64 = 500;

/// Base per-tick death probability once senescent
pub const SENESCENCE_BASE_DEATH_RATE: f64 = 0.05;

// ── Termination conditions ──────────────────────────────────────────────

/// Condition A: descendants of one founder reach this share of the population
pub const LINEAGE_DOMINANCE_RATIO: f64 = 0.70;

/// Condition A: minimum population for the lineage check
pub const LINEAGE_MIN_POPULATION: usize = 30;

/// Condition B: one agent holds this share of total balance
pub const ECONOMIC_DOMINANCE_RATIO: f64 = 0.80;

/// Condition B: minimum population for the economic check
pub const ECONOMIC_MIN_POPULATION: usize = 10;

/// Condition C: age exceeding this multiple of early-generation mean lifespan
pub const SURVIVAL_OUTLIER_MULTIPLIER: f64 = 5.0;

/// Condition C: minimum death samples before the check applies
pub const SURVIVAL_MIN_SAMPLES: usize = 10;

/// Condition D: cumulative emergent decisions that halt the simulation
pub const EMERGENT_BEHAVIOR_STOP_COUNT: u64 = 10;

// ── Genome ──────────────────────────────────────────────────────────────

/// Gene count of a founder genome
pub const FOUNDER_GENE_COUNT: usize = 63;

/// Upper bound on genes per genome
pub const MAX_GENE_COUNT: usize = 200;

/// Lower bound on genes per genome
pub const MIN_GENE_COUNT: usize = 20;

/// Baseline per-tick probability of a point mutation
pub const BASE_MUTATION_RATE: f64 = 0.02;

/// Baseline per-tick probability of a gene duplication
pub const BASE_DUPLICATION_RATE: f64 = 0.01;

/// Baseline per-tick probability of a gene deletion
pub const BASE_DELETION_RATE: f64 = 0.01;

/// Baseline per-tick probability of horizontal gene transfer
pub const BASE_HGT_RATE: f64 = 0.001;

/// Baseline per-tick probability of de-novo gene emergence
pub const BASE_DE_NOVO_RATE: f64 = 0.001;

/// Convert an `f64` amount into simulation money.
///
/// Non-finite inputs collapse to zero; phase math treats that as "nothing
/// to pay", which matches the partial-payment error model.
pub fn money(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or(Decimal::ZERO)
}

/// Convert simulation money back to `f64` for ratio/probability math.
pub fn money_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_round_trip() {
        let d = money(12.5);
        assert_eq!(money_f64(d), 12.5);
    }

    #[test]
    fn test_money_non_finite_is_zero() {
        assert_eq!(money(f64::NAN), Decimal::ZERO);
        assert_eq!(money(f64::INFINITY), Decimal::ZERO);
    }
}
