//! Per-agent survival state
//!
//! The mutable runtime record the nine phases operate on. Created at
//! birth, mutated exclusively by the orchestrator one agent at a time,
//! summarized into a tombstone on death.

use std::collections::VecDeque;
use std::time::Instant;

use oikos_common::AgentWallet;
use oikos_environment::{DefiStats, TokenHolding};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::development::DevelopmentStage;

/// Bound on action/event history length
const HISTORY_LIMIT: usize = 200;

/// Two-state liveness with a dying countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurvivalStatus {
    Alive,
    Dying { ticks_left: u64 },
}

/// One open yield-bearing position
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefiPosition {
    pub id: Uuid,
    pub opportunity_id: String,
    /// Principal locked in the wallet for this position
    pub invested: Decimal,
    pub opened_tick: u64,
    pub lockup_ticks: u64,
    /// Net yield accrued so far; negative after bad risk rolls
    pub accrued: Decimal,
    pub risk_level: f64,
}

impl DefiPosition {
    pub fn matured(&self, tick: u64) -> bool {
        tick >= self.opened_tick + self.lockup_ticks
    }
}

/// Speculative token holdings from airdrops
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenPortfolio {
    pub holdings: Vec<TokenHolding>,
    pub realized_profits: Decimal,
}

impl TokenPortfolio {
    pub fn total_current_value(&self) -> f64 {
        self.holdings.iter().map(|h| h.current_value).sum()
    }

    pub fn unrealized_pnl(&self) -> f64 {
        self.holdings.iter().map(|h| h.unrealized_pnl()).sum()
    }
}

/// One entry of the bounded action history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionRecord {
    pub tick: u64,
    pub action: String,
    pub success: bool,
    pub cost: Decimal,
}

/// One entry of the bounded event log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    pub tick: u64,
    pub event: String,
}

/// Cumulative income by source
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EarningsBreakdown {
    pub defi: Decimal,
    pub tasks: Decimal,
    pub tokens: Decimal,
    pub events: Decimal,
}

/// Cumulative spending by category
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpendingBreakdown {
    pub operational: Decimal,
    pub losses: Decimal,
    pub inference: Decimal,
    pub breeding: Decimal,
}

/// The per-agent mutable survival record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurvivalState {
    pub tick: u64,
    pub is_alive: bool,
    pub status: SurvivalStatus,
    pub stage: DevelopmentStage,

    pub wallet: AgentWallet,
    pub positions: Vec<DefiPosition>,
    pub tokens: TokenPortfolio,
    pub defi_stats: DefiStats,

    /// Persistent task-market reputation in [0, 1]
    pub reputation: f64,
    pub last_breeding_tick: u64,
    pub consecutive_failures: u32,

    pub action_history: VecDeque<ActionRecord>,
    pub event_log: VecDeque<EventRecord>,

    pub total_earned: EarningsBreakdown,
    pub total_spent: SpendingBreakdown,

    pub llm_calls: u64,
    /// Wall-clock instant of the last decision call, for throttling
    #[serde(skip)]
    pub last_llm_call: Option<Instant>,
    /// Reasoning text of the most recent decision, kept for tombstones
    pub last_reasoning: Option<String>,

    /// Consecutive ticks with negative net flow
    pub days_starving: u32,
    /// Consecutive ticks with positive net flow
    pub days_thriving: u32,
    pub stress_level: f64,
}

impl SurvivalState {
    /// Fresh state with the agent's starting balance
    pub fn new(initial_balance: Decimal) -> Self {
        Self {
            tick: 0,
            is_alive: true,
            status: SurvivalStatus::Alive,
            stage: DevelopmentStage::Neonate,
            wallet: AgentWallet::with_balance(initial_balance),
            positions: Vec::new(),
            tokens: TokenPortfolio::default(),
            defi_stats: DefiStats::default(),
            reputation: 0.5,
            last_breeding_tick: 0,
            consecutive_failures: 0,
            action_history: VecDeque::new(),
            event_log: VecDeque::new(),
            total_earned: EarningsBreakdown::default(),
            total_spent: SpendingBreakdown::default(),
            llm_calls: 0,
            last_llm_call: None,
            last_reasoning: None,
            days_starving: 0,
            days_thriving: 0,
            stress_level: 0.0,
        }
    }

    /// Total balance including locked capital
    pub fn total_balance(&self) -> Decimal {
        self.wallet.total()
    }

    /// Sum of invested principal across open positions; must equal
    /// `wallet.locked` at all times.
    pub fn invested_capital(&self) -> Decimal {
        self.positions.iter().map(|p| p.invested).sum()
    }

    pub fn record_action(&mut self, tick: u64, action: impl Into<String>, success: bool, cost: Decimal) {
        self.action_history.push_back(ActionRecord {
            tick,
            action: action.into(),
            success,
            cost,
        });
        while self.action_history.len() > HISTORY_LIMIT {
            self.action_history.pop_front();
        }
    }

    pub fn record_event(&mut self, tick: u64, event: impl Into<String>) {
        self.event_log.push_back(EventRecord {
            tick,
            event: event.into(),
        });
        while self.event_log.len() > HISTORY_LIMIT {
            self.event_log.pop_front();
        }
    }

    /// Success flag of the most recent recorded action
    pub fn recent_success(&self) -> Option<bool> {
        self.action_history.back().map(|a| a.success)
    }
}

/// Per-phase economics rollup
#[derive(Debug, Clone, Default)]
pub struct PhaseOutcome {
    pub events: Vec<String>,
    pub earnings: Decimal,
    pub costs: Decimal,
    pub losses: Decimal,
}

impl PhaseOutcome {
    pub fn merge(&mut self, other: PhaseOutcome) {
        self.events.extend(other.events);
        self.earnings += other.earnings;
        self.costs += other.costs;
        self.losses += other.losses;
    }

    /// Net flow: earnings minus costs minus losses
    pub fn net(&self) -> Decimal {
        self.earnings - self.costs - self.losses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_new_state_starts_alive_with_balance() {
        let state = SurvivalState::new(dec!(30));
        assert!(state.is_alive);
        assert_eq!(state.status, SurvivalStatus::Alive);
        assert_eq!(state.total_balance(), dec!(30));
        assert_eq!(state.reputation, 0.5);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut state = SurvivalState::new(dec!(30));
        for i in 0..500 {
            state.record_action(i, "idle", true, Decimal::ZERO);
            state.record_event(i, "tick");
        }
        assert_eq!(state.action_history.len(), HISTORY_LIMIT);
        assert_eq!(state.event_log.len(), HISTORY_LIMIT);
        // oldest entries dropped
        assert_eq!(state.action_history.front().unwrap().tick, 300);
    }

    #[test]
    fn test_phase_outcome_net() {
        let outcome = PhaseOutcome {
            events: vec![],
            earnings: dec!(5),
            costs: dec!(2),
            losses: dec!(1),
        };
        assert_eq!(outcome.net(), dec!(2));
    }

    #[test]
    fn test_invested_matches_locked_when_positions_open() {
        let mut state = SurvivalState::new(dec!(30));
        state.wallet.lock(dec!(10)).unwrap();
        state.positions.push(DefiPosition {
            id: Uuid::new_v4(),
            opportunity_id: "money_market_usdc".to_string(),
            invested: dec!(10),
            opened_tick: 1,
            lockup_ticks: 3,
            accrued: Decimal::ZERO,
            risk_level: 0.05,
        });
        assert_eq!(state.invested_capital(), state.wallet.locked);
    }
}
