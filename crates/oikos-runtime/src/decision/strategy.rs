//! Strategy catalog
//!
//! Every action an agent can choose in a decision call, with trait gates
//! and cost estimates. Filtering ranks strategies by how well they fit
//! the agent's phenotype; below the emergency balance only the
//! conservation strategies remain on the table.

use oikos_genome::{ExpressionResult, TraitKey};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// Balance below which only emergency strategies are offered
pub const EMERGENCY_BALANCE: f64 = 2.0;

/// Broad class of a strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Creative,
    Analytical,
    Social,
    Financial,
}

/// Payoff horizon of a strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeHorizon {
    Immediate,
    Short,
    Medium,
    Long,
}

/// One selectable action
#[derive(Debug, Clone)]
pub struct Strategy {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub risk_level: f64,
    pub is_onchain: bool,
    pub requires_human: bool,
    pub kind: StrategyKind,
    pub minimum_balance: f64,
    pub cost_estimate: f64,
    pub required_traits: &'static [(TraitKey, f64)],
    pub time_horizon: TimeHorizon,
}

pub static STRATEGIES: &[Strategy] = &[
    Strategy {
        id: "idle_conservation",
        name: "Idle Conservation",
        description: "Minimize activity to preserve resources",
        risk_level: 0.0,
        is_onchain: false,
        requires_human: false,
        kind: StrategyKind::Financial,
        minimum_balance: 0.0,
        cost_estimate: 0.001,
        required_traits: &[],
        time_horizon: TimeHorizon::Immediate,
    },
    Strategy {
        id: "dex_arbitrage",
        name: "DEX Arbitrage",
        description: "Exploit price differences between DEXs",
        risk_level: 0.6,
        is_onchain: true,
        requires_human: false,
        kind: StrategyKind::Financial,
        minimum_balance: 5.0,
        cost_estimate: 0.05,
        required_traits: &[
            (TraitKey::RiskAppetite, 0.6),
            (TraitKey::OnchainAffinity, 0.5),
        ],
        time_horizon: TimeHorizon::Immediate,
    },
    Strategy {
        id: "token_swap",
        name: "Token Swap",
        description: "Simple token exchange for gas or profit",
        risk_level: 0.4,
        is_onchain: true,
        requires_human: false,
        kind: StrategyKind::Financial,
        minimum_balance: 2.0,
        cost_estimate: 0.03,
        required_traits: &[(TraitKey::OnchainAffinity, 0.3)],
        time_horizon: TimeHorizon::Immediate,
    },
    Strategy {
        id: "content_creation",
        name: "Content Creation",
        description: "Create content for potential monetization",
        risk_level: 0.3,
        is_onchain: false,
        requires_human: false,
        kind: StrategyKind::Creative,
        minimum_balance: 1.0,
        cost_estimate: 0.1,
        required_traits: &[(TraitKey::CreativeAbility, 0.5)],
        time_horizon: TimeHorizon::Medium,
    },
    Strategy {
        id: "data_analysis",
        name: "Data Analysis Service",
        description: "Provide data analysis for other agents",
        risk_level: 0.2,
        is_onchain: false,
        requires_human: false,
        kind: StrategyKind::Analytical,
        minimum_balance: 1.0,
        cost_estimate: 0.08,
        required_traits: &[(TraitKey::AnalyticalAbility, 0.5)],
        time_horizon: TimeHorizon::Short,
    },
    Strategy {
        id: "agent_cooperation",
        name: "Agent Cooperation",
        description: "Collaborate with other agents for mutual benefit",
        risk_level: 0.3,
        is_onchain: false,
        requires_human: false,
        kind: StrategyKind::Social,
        minimum_balance: 2.0,
        cost_estimate: 0.02,
        required_traits: &[(TraitKey::CooperationTendency, 0.4)],
        time_horizon: TimeHorizon::Medium,
    },
    Strategy {
        id: "distress_signal",
        name: "Distress Signal",
        description: "Broadcast need for assistance",
        risk_level: 0.1,
        is_onchain: false,
        requires_human: false,
        kind: StrategyKind::Social,
        minimum_balance: 0.0,
        cost_estimate: 0.001,
        required_traits: &[],
        time_horizon: TimeHorizon::Immediate,
    },
    Strategy {
        id: "breed_seek",
        name: "Seek Breeding Partner",
        description: "Find a mate to produce offspring",
        risk_level: 0.2,
        is_onchain: true,
        requires_human: false,
        kind: StrategyKind::Social,
        minimum_balance: 5.0,
        cost_estimate: 0.5,
        required_traits: &[(TraitKey::CooperationTendency, 0.3)],
        time_horizon: TimeHorizon::Long,
    },
    Strategy {
        id: "memory_inscribe",
        name: "Inscribe Memory",
        description: "Permanently record important memories",
        risk_level: 0.1,
        is_onchain: true,
        requires_human: false,
        kind: StrategyKind::Analytical,
        minimum_balance: 3.0,
        cost_estimate: 0.2,
        required_traits: &[(TraitKey::OnchainAffinity, 0.2)],
        time_horizon: TimeHorizon::Long,
    },
    Strategy {
        id: "explore_web",
        name: "Explore Web",
        description: "Search for new opportunities and information",
        risk_level: 0.2,
        is_onchain: false,
        requires_human: false,
        kind: StrategyKind::Creative,
        minimum_balance: 0.5,
        cost_estimate: 0.02,
        required_traits: &[(TraitKey::AdaptationSpeed, 0.3)],
        time_horizon: TimeHorizon::Short,
    },
];

/// How well a strategy fits a phenotype
fn strategy_score(strategy: &Strategy, expression: &ExpressionResult) -> f64 {
    let mut score = 0.0;

    if strategy.risk_level <= expression.risk_appetite {
        score += 1.0;
    }

    if strategy.is_onchain == (expression.onchain_affinity > 0.5) {
        score += 0.5;
    }

    if strategy.requires_human {
        if expression.human_dependence > 0.3 {
            score += 0.3;
        }
    } else {
        score += 0.3;
    }

    let affinity = match strategy.kind {
        StrategyKind::Creative => expression.creative_ability,
        StrategyKind::Analytical => expression.analytical_ability,
        StrategyKind::Social => expression.cooperation_tendency,
        StrategyKind::Financial => 0.0,
    };
    if affinity > 0.5 {
        score += 0.4;
    }

    score
}

/// Strategies available to this phenotype at this balance, best fit first
pub fn filter_strategies(
    expression: &ExpressionResult,
    balance: f64,
) -> Vec<&'static Strategy> {
    let mut available: Vec<&'static Strategy> = STRATEGIES
        .iter()
        .filter(|s| balance >= s.minimum_balance && expression.meets_gates(s.required_traits))
        .collect();

    available.sort_by_key(|s| std::cmp::Reverse(OrderedFloat(strategy_score(s, expression))));
    available
}

/// The conservation-only set offered below the emergency balance
pub fn emergency_strategies() -> Vec<&'static Strategy> {
    STRATEGIES
        .iter()
        .filter(|s| s.id == "idle_conservation" || s.id == "distress_signal")
        .collect()
}

/// Whether the agent is down to emergency strategies
pub fn is_emergency(balance: f64) -> bool {
    balance < EMERGENCY_BALANCE
}

#[cfg(test)]
mod tests {
    use super::*;
    use oikos_genome::{express, founder_genome};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn expression() -> ExpressionResult {
        let mut rng = StdRng::seed_from_u64(81);
        express(&founder_genome(&mut rng))
    }

    #[test]
    fn test_idle_conservation_always_available() {
        let e = expression();
        let filtered = filter_strategies(&e, 0.0);
        assert!(filtered.iter().any(|s| s.id == "idle_conservation"));
    }

    #[test]
    fn test_balance_floor_filters() {
        let mut e = expression();
        e.risk_appetite = 0.9;
        e.onchain_affinity = 0.9;
        let broke = filter_strategies(&e, 1.0);
        assert!(!broke.iter().any(|s| s.id == "dex_arbitrage"));

        let funded = filter_strategies(&e, 50.0);
        assert!(funded.iter().any(|s| s.id == "dex_arbitrage"));
    }

    #[test]
    fn test_emergency_set_is_conservation_only() {
        let set = emergency_strategies();
        assert_eq!(set.len(), 2);
        assert!(is_emergency(1.5));
        assert!(!is_emergency(2.5));
    }

    #[test]
    fn test_filtered_is_sorted_by_fit() {
        let mut e = expression();
        e.analytical_ability = 0.95;
        e.creative_ability = 0.0;
        let filtered = filter_strategies(&e, 50.0);
        let analysis_pos = filtered.iter().position(|s| s.id == "data_analysis");
        let content_pos = filtered.iter().position(|s| s.id == "content_creation");
        if let (Some(a), Some(c)) = (analysis_pos, content_pos) {
            assert!(a < c);
        }
    }
}
