//! Decision provider boundary
//!
//! The LLM transport lives outside the core. The orchestrator hands a
//! perception snapshot and a filtered strategy list to a
//! [`DecisionProvider`] and gets back a structured [`Decision`]. Any
//! provider failure (network, timeout, parse) is recovered locally via
//! [`decide_with_fallback`]; it never propagates into the survival loop.

use async_trait::async_trait;
use oikos_common::{OikosError, Result};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use super::perception::Perception;
use super::strategy::Strategy;

/// A structured decision returned by the provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    /// Strategy the agent committed to
    pub strategy_id: String,
    /// 1-based index into the offered strategy list
    pub action_index: usize,
    pub reasoning: String,
    /// Confidence in [0, 1]
    pub confidence: f64,
    /// Self-reported emotional state
    pub emotion: String,
    /// Provider-side cost of producing the decision
    pub cost: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

impl Decision {
    /// The recovery decision used whenever the provider fails or offers
    /// nothing usable.
    pub fn idle_fallback() -> Self {
        Self {
            strategy_id: "idle_conservation".to_string(),
            action_index: 1,
            reasoning: "Decision provider unavailable; conserving resources".to_string(),
            confidence: 0.0,
            emotion: "confused".to_string(),
            cost: Decimal::ZERO,
            raw_prompt: None,
            raw_response: None,
        }
    }
}

/// External decision-making boundary
#[async_trait]
pub trait DecisionProvider: Send + Sync {
    /// Choose a strategy from the offered list.
    ///
    /// `strategies` is never empty; implementations should return an
    /// `action_index` in `1..=strategies.len()`.
    async fn decide(
        &self,
        perception: &Perception,
        strategies: &[&'static Strategy],
    ) -> Result<Decision>;
}

/// Call the provider and fall back to the idle decision on any failure.
///
/// The returned decision is also re-anchored to the offered list: an
/// out-of-range action index degrades to the first strategy rather than
/// erroring.
pub async fn decide_with_fallback(
    provider: &dyn DecisionProvider,
    perception: &Perception,
    strategies: &[&'static Strategy],
) -> Decision {
    if strategies.is_empty() {
        return Decision::idle_fallback();
    }

    match provider.decide(perception, strategies).await {
        Ok(mut decision) => {
            if decision.action_index == 0 || decision.action_index > strategies.len() {
                decision.action_index = 1;
                decision.strategy_id = strategies[0].id.to_string();
            }
            decision.confidence = decision.confidence.clamp(0.0, 1.0);
            decision
        }
        Err(_) => Decision::idle_fallback(),
    }
}

/// Deterministic provider used when no LLM endpoint is configured.
///
/// Picks the best-fit strategy (the head of the filtered list) and
/// synthesizes a short reasoning line from the perception.
pub struct HeuristicProvider;

#[async_trait]
impl DecisionProvider for HeuristicProvider {
    async fn decide(
        &self,
        perception: &Perception,
        strategies: &[&'static Strategy],
    ) -> Result<Decision> {
        let Some(choice) = strategies.first() else {
            return Err(OikosError::Decision("no strategies offered".to_string()));
        };

        let (emotion, confidence) = match perception.mode {
            super::perception::EnvironmentMode::Normal => ("content", 0.7),
            super::perception::EnvironmentMode::LowPower => ("cautious", 0.55),
            super::perception::EnvironmentMode::Emergency => ("anxious", 0.4),
            super::perception::EnvironmentMode::Dormant => ("desperate", 0.3),
        };

        Ok(Decision {
            strategy_id: choice.id.to_string(),
            action_index: 1,
            reasoning: format!(
                "Balance {:.2} with {:.1} days of runway; {} fits my traits best",
                perception.total_balance, perception.runway_days, choice.name
            ),
            confidence,
            emotion: emotion.to_string(),
            cost: Decimal::ZERO,
            raw_prompt: None,
            raw_response: None,
        })
    }
}

/// Test double that replays a queue of canned results
#[derive(Default)]
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Result<Decision>>>,
}

impl ScriptedProvider {
    pub fn new(script: Vec<Result<Decision>>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
        }
    }
}

#[async_trait]
impl DecisionProvider for ScriptedProvider {
    async fn decide(
        &self,
        _perception: &Perception,
        strategies: &[&'static Strategy],
    ) -> Result<Decision> {
        match self.script.lock().pop_front() {
            Some(result) => result,
            None => {
                // Script exhausted: keep choosing the first offer
                let choice = strategies
                    .first()
                    .ok_or_else(|| OikosError::Decision("no strategies offered".to_string()))?;
                let mut decision = Decision::idle_fallback();
                decision.strategy_id = choice.id.to_string();
                decision.reasoning = "scripted provider exhausted".to_string();
                Ok(decision)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::perception::{environment_mode, PopulationView};
    use super::super::strategy::filter_strategies;
    use super::*;
    use oikos_common::AgentId;
    use oikos_genome::{express, founder_genome};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn perception() -> Perception {
        let mut rng = StdRng::seed_from_u64(91);
        let expression = express(&founder_genome(&mut rng));
        Perception {
            agent_id: AgentId::new(),
            expression,
            age: 10,
            generation: 0,
            tick: 10,
            liquid_balance: 20.0,
            total_balance: 25.0,
            daily_burn: 0.8,
            runway_days: 30.0,
            mode: environment_mode(25.0),
            stress_level: 0.0,
            population: PopulationView::default(),
            recent_success: None,
        }
    }

    #[tokio::test]
    async fn test_heuristic_provider_picks_head_of_list() {
        let p = perception();
        let strategies = filter_strategies(&p.expression, p.total_balance);
        let decision = HeuristicProvider.decide(&p, &strategies).await.unwrap();
        assert_eq!(decision.strategy_id, strategies[0].id);
        assert_eq!(decision.action_index, 1);
    }

    #[tokio::test]
    async fn test_fallback_on_provider_error() {
        let provider =
            ScriptedProvider::new(vec![Err(OikosError::Decision("timeout".to_string()))]);
        let p = perception();
        let strategies = filter_strategies(&p.expression, p.total_balance);

        let decision = decide_with_fallback(&provider, &p, &strategies).await;
        assert_eq!(decision.strategy_id, "idle_conservation");
        assert_eq!(decision.confidence, 0.0);
    }

    #[tokio::test]
    async fn test_fallback_reanchors_bad_index() {
        let mut rogue = Decision::idle_fallback();
        rogue.action_index = 99;
        rogue.strategy_id = "no_such_strategy".to_string();
        let provider = ScriptedProvider::new(vec![Ok(rogue)]);

        let p = perception();
        let strategies = filter_strategies(&p.expression, p.total_balance);
        let decision = decide_with_fallback(&provider, &p, &strategies).await;
        assert_eq!(decision.action_index, 1);
        assert_eq!(decision.strategy_id, strategies[0].id);
    }
}
