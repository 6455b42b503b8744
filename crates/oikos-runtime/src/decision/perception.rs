//! Perception snapshot
//!
//! What an agent "sees" before a decision call: its own phenotype and
//! balances, the environment mode derived from them, and aggregate
//! population statistics from the pre-tick snapshot.

use oikos_common::AgentId;
use oikos_genome::ExpressionResult;
use serde::{Deserialize, Serialize};

/// Operating mode derived from the balance level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentMode {
    Normal,
    LowPower,
    Emergency,
    Dormant,
}

/// Aggregate view of the rest of the population
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PopulationView {
    pub count: usize,
    pub average_balance: f64,
    pub recent_deaths: u64,
}

/// The full perception snapshot handed to the decision provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Perception {
    pub agent_id: AgentId,
    pub expression: ExpressionResult,
    pub age: u64,
    pub generation: u32,
    pub tick: u64,

    pub liquid_balance: f64,
    pub total_balance: f64,
    pub daily_burn: f64,
    pub runway_days: f64,

    pub mode: EnvironmentMode,
    pub stress_level: f64,

    pub population: PopulationView,
    /// Outcome of the most recent recorded action, if any
    pub recent_success: Option<bool>,
}

/// Derive the operating mode from a total balance
pub fn environment_mode(balance: f64) -> EnvironmentMode {
    if balance < 0.5 {
        EnvironmentMode::Dormant
    } else if balance < 2.0 {
        EnvironmentMode::Emergency
    } else if balance < 5.0 {
        EnvironmentMode::LowPower
    } else {
        EnvironmentMode::Normal
    }
}

/// Stress from low balance and short runway, in [0, 1]
pub fn stress_level(balance: f64, runway_days: f64) -> f64 {
    let mut stress: f64 = 0.0;
    if balance < 2.0 {
        stress += 0.5;
    }
    if runway_days < 3.0 {
        stress += 0.3;
    }
    stress.min(1.0)
}
