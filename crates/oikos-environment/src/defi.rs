//! DeFi opportunity catalog
//!
//! Yield-bearing opportunities agents can lock capital into. Yields are
//! daily fractions derived from realistic protocol APYs; risk expresses
//! itself as negative accrual rolls. The catalog is read-only
//! configuration; all selection logic layered on top is pure over an
//! injected rng.

use oikos_genome::{ExpressionResult, TraitKey};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Category of a yield opportunity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefiKind {
    Arbitrage,
    Lending,
    LpReward,
    Staking,
    YieldFarming,
    Mev,
}

/// One entry of the DeFi opportunity table
#[derive(Debug, Clone)]
pub struct DefiOpportunity {
    pub id: &'static str,
    pub name: &'static str,
    pub kind: DefiKind,
    /// Capital bounds for one position (USDC)
    pub min_capital: f64,
    pub max_capital: f64,
    /// Daily yield range as a fraction of staked capital
    pub daily_yield_min: f64,
    pub daily_yield_max: f64,
    /// Probability a yield roll goes against the agent
    pub risk_level: f64,
    /// Probability the opportunity is open on a given tick
    pub daily_probability: f64,
    /// Minimum expressed traits to participate
    pub required_traits: &'static [(TraitKey, f64)],
    /// Flat execution cost (USDC)
    pub gas_cost: f64,
    /// Ticks the capital stays locked
    pub lockup_ticks: u64,
    /// Fraction of principal burned on exit before maturity
    pub early_exit_penalty: f64,
}

/// The opportunity table. Capital bounds are scaled to the simulation's
/// 30-USDC starting balances; yield and risk numbers follow real protocol
/// ranges.
pub static DEFI_OPPORTUNITIES: &[DefiOpportunity] = &[
    DefiOpportunity {
        id: "dex_arb_eth_usdc",
        name: "ETH/USDC DEX arbitrage",
        kind: DefiKind::Arbitrage,
        min_capital: 5.0,
        max_capital: 50.0,
        daily_yield_min: 0.0004,
        daily_yield_max: 0.002,
        risk_level: 0.3,
        daily_probability: 0.25,
        required_traits: &[
            (TraitKey::OnchainAffinity, 0.6),
            (TraitKey::AnalyticalAbility, 0.5),
            (TraitKey::RiskAppetite, 0.4),
        ],
        gas_cost: 0.005,
        lockup_ticks: 1,
        early_exit_penalty: 0.0,
    },
    DefiOpportunity {
        id: "dex_arb_triangular",
        name: "Triangular arbitrage",
        kind: DefiKind::Arbitrage,
        min_capital: 8.0,
        max_capital: 80.0,
        daily_yield_min: 0.0003,
        daily_yield_max: 0.0015,
        risk_level: 0.35,
        daily_probability: 0.15,
        required_traits: &[
            (TraitKey::OnchainAffinity, 0.7),
            (TraitKey::AnalyticalAbility, 0.6),
            (TraitKey::RiskAppetite, 0.5),
        ],
        gas_cost: 0.008,
        lockup_ticks: 1,
        early_exit_penalty: 0.0,
    },
    DefiOpportunity {
        id: "money_market_usdc",
        name: "USDC money-market deposit",
        kind: DefiKind::Lending,
        min_capital: 1.0,
        max_capital: 100.0,
        daily_yield_min: 0.00008,
        daily_yield_max: 0.00022,
        risk_level: 0.05,
        daily_probability: 0.9,
        required_traits: &[
            (TraitKey::OnchainAffinity, 0.3),
            (TraitKey::SavingsRate, 0.4),
        ],
        gas_cost: 0.002,
        lockup_ticks: 3,
        early_exit_penalty: 0.05,
    },
    DefiOpportunity {
        id: "money_market_eth",
        name: "ETH money-market deposit",
        kind: DefiKind::Lending,
        min_capital: 2.0,
        max_capital: 60.0,
        daily_yield_min: 0.00006,
        daily_yield_max: 0.00016,
        risk_level: 0.08,
        daily_probability: 0.85,
        required_traits: &[(TraitKey::OnchainAffinity, 0.3)],
        gas_cost: 0.003,
        lockup_ticks: 3,
        early_exit_penalty: 0.05,
    },
    DefiOpportunity {
        id: "lp_eth_usdc",
        name: "ETH/USDC liquidity pool",
        kind: DefiKind::LpReward,
        min_capital: 3.0,
        max_capital: 120.0,
        daily_yield_min: 0.00027,
        daily_yield_max: 0.00082,
        risk_level: 0.45,
        daily_probability: 0.95,
        required_traits: &[
            (TraitKey::OnchainAffinity, 0.5),
            (TraitKey::RiskAppetite, 0.5),
        ],
        gas_cost: 0.008,
        lockup_ticks: 5,
        early_exit_penalty: 0.1,
    },
    DefiOpportunity {
        id: "lp_stable_pair",
        name: "Stable-pair liquidity pool",
        kind: DefiKind::LpReward,
        min_capital: 4.0,
        max_capital: 200.0,
        daily_yield_min: 0.00014,
        daily_yield_max: 0.00041,
        risk_level: 0.25,
        daily_probability: 0.95,
        required_traits: &[
            (TraitKey::OnchainAffinity, 0.4),
            (TraitKey::RiskAppetite, 0.3),
        ],
        gas_cost: 0.006,
        lockup_ticks: 5,
        early_exit_penalty: 0.08,
    },
    DefiOpportunity {
        id: "lp_altcoin_degen",
        name: "High-risk altcoin pool",
        kind: DefiKind::LpReward,
        min_capital: 3.0,
        max_capital: 40.0,
        daily_yield_min: 0.00055,
        daily_yield_max: 0.0027,
        risk_level: 0.75,
        daily_probability: 0.4,
        required_traits: &[
            (TraitKey::OnchainAffinity, 0.6),
            (TraitKey::RiskAppetite, 0.8),
        ],
        gas_cost: 0.01,
        lockup_ticks: 4,
        early_exit_penalty: 0.15,
    },
    DefiOpportunity {
        id: "eth_staking",
        name: "Liquid ETH staking",
        kind: DefiKind::Staking,
        min_capital: 2.0,
        max_capital: 100.0,
        daily_yield_min: 0.00011,
        daily_yield_max: 0.00027,
        risk_level: 0.15,
        daily_probability: 0.95,
        required_traits: &[
            (TraitKey::OnchainAffinity, 0.4),
            (TraitKey::RiskAppetite, 0.3),
        ],
        gas_cost: 0.004,
        lockup_ticks: 7,
        early_exit_penalty: 0.1,
    },
    DefiOpportunity {
        id: "gauge_farming",
        name: "Gauge reward farming",
        kind: DefiKind::YieldFarming,
        min_capital: 5.0,
        max_capital: 90.0,
        daily_yield_min: 0.00041,
        daily_yield_max: 0.0014,
        risk_level: 0.5,
        daily_probability: 0.7,
        required_traits: &[
            (TraitKey::OnchainAffinity, 0.6),
            (TraitKey::RiskAppetite, 0.6),
            (TraitKey::AdaptationSpeed, 0.5),
        ],
        gas_cost: 0.012,
        lockup_ticks: 6,
        early_exit_penalty: 0.12,
    },
    DefiOpportunity {
        id: "mev_sandwich",
        name: "MEV sandwich extraction",
        kind: DefiKind::Mev,
        min_capital: 20.0,
        max_capital: 300.0,
        daily_yield_min: 0.0,
        daily_yield_max: 0.01,
        risk_level: 0.85,
        daily_probability: 0.1,
        required_traits: &[
            (TraitKey::OnchainAffinity, 0.9),
            (TraitKey::AnalyticalAbility, 0.9),
            (TraitKey::RiskAppetite, 0.9),
        ],
        gas_cost: 0.02,
        lockup_ticks: 1,
        early_exit_penalty: 0.0,
    },
];

/// Look up a catalog entry by id
pub fn find_opportunity(id: &str) -> Option<&'static DefiOpportunity> {
    DEFI_OPPORTUNITIES.iter().find(|o| o.id == id)
}

/// Opportunities open this tick for an agent with the given capital.
/// Trait gates are not applied here; ranking and gating happen in the
/// caller's selection step.
pub fn sample_available(capital: f64, rng: &mut impl Rng) -> Vec<&'static DefiOpportunity> {
    DEFI_OPPORTUNITIES
        .iter()
        .filter(|opp| capital >= opp.min_capital && rng.gen_bool(opp.daily_probability))
        .collect()
}

/// Risk-adjusted attractiveness of an opportunity for this phenotype:
/// yield midpoint weighted by how closely the opportunity's risk matches
/// the agent's appetite.
pub fn risk_adjusted_score(opp: &DefiOpportunity, expression: &ExpressionResult) -> f64 {
    let midpoint = (opp.daily_yield_min + opp.daily_yield_max) / 2.0;
    let risk_fit = 1.0 - (opp.risk_level - expression.risk_appetite).abs();
    midpoint * risk_fit.max(0.0)
}

/// Whether the phenotype clears the opportunity's trait gates
pub fn meets_gates(opp: &DefiOpportunity, expression: &ExpressionResult) -> bool {
    expression.meets_gates(opp.required_traits)
}

/// Roll one day of yield for a position in this opportunity, as a signed
/// fraction of staked capital.
///
/// A risk roll below the opportunity's risk level turns the day negative,
/// with severity amplified by the agent's own appetite; strong analytical
/// ability improves good days.
pub fn roll_daily_yield(
    opp: &DefiOpportunity,
    expression: &ExpressionResult,
    rng: &mut impl Rng,
) -> f64 {
    let span = opp.daily_yield_max - opp.daily_yield_min;
    let base = opp.daily_yield_min + rng.gen_range(0.0..=1.0) * span;

    if rng.gen_range(0.0..1.0) < opp.risk_level {
        let severity = opp.risk_level * (1.0 + expression.risk_appetite * 0.5);
        return -base * severity * 2.0;
    }

    if expression.analytical_ability > 0.7 {
        return base * (1.0 + (expression.analytical_ability - 0.7) * 0.3);
    }

    base
}
