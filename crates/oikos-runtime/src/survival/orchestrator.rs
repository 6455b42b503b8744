//! Survival tick orchestrator
//!
//! Runs one agent's tick: ages the agent, applies epigenetics, judges
//! death, then executes the nine economic phases in fixed order. Death
//! short-circuits the remaining phases; the only suspension point is the
//! decision-provider call in phase 7. Phase failures for one agent never
//! propagate; the caller moves on to the next agent regardless.

use std::time::{Duration, Instant};

use oikos_common::{money, money_f64, AgentId, BASE_TICK_COST, EMERGENCY_BALANCE_THRESHOLD};
use oikos_genome::{
    apply_epigenetics, express, DynamicGenome, EnvironmentSample, ExpressionResult,
};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::breeding::{BreedingRequest, MateCandidate};
use super::death::{check_death, make_tombstone, update_dying_status, DeathCause, Tombstone};
use super::development::{determine_stage, StageInfo};
use super::phases::{self, TickContext};
use super::state::{PhaseOutcome, SurvivalState};
use crate::config::SimulationConfig;
use crate::decision::{
    decide_with_fallback, emergency_strategies, environment_mode, filter_strategies, is_emergency,
    stress_level, DecisionProvider, EmergentClassifier, Perception, PopulationView,
};
use crate::journal::{InferenceRecord, Journal, TickRecord};

/// One agent: identity, genome, lineage bookkeeping, and survival state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub genome: DynamicGenome,
    /// Birth parents, `None` for founders
    pub parents: Option<(AgentId, AgentId)>,
    /// Founder agents this one descends from (itself, for founders)
    pub founder_roots: Vec<AgentId>,
    pub state: SurvivalState,
}

impl Agent {
    /// Generation-0 agent
    pub fn founder(id: AgentId, name: String, genome: DynamicGenome, balance: Decimal) -> Self {
        Self {
            id,
            name,
            genome,
            parents: None,
            founder_roots: vec![id],
            state: SurvivalState::new(balance),
        }
    }

    /// Bred agent
    pub fn offspring(
        id: AgentId,
        name: String,
        genome: DynamicGenome,
        parents: (AgentId, AgentId),
        founder_roots: Vec<AgentId>,
        balance: Decimal,
    ) -> Self {
        Self {
            id,
            name,
            genome,
            parents: Some(parents),
            founder_roots,
            state: SurvivalState::new(balance),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.state.is_alive
    }

    pub fn age(&self) -> u64 {
        self.state.tick
    }

    pub fn generation(&self) -> u32 {
        self.genome.meta.generation
    }
}

/// Shared collaborators for one tick
pub struct TickDeps<'a> {
    pub provider: &'a dyn DecisionProvider,
    pub classifier: &'a dyn EmergentClassifier,
    pub journal: &'a dyn Journal,
    pub config: &'a SimulationConfig,
}

/// What one agent's tick produced
#[derive(Debug, Default)]
pub struct TickReport {
    pub outcome: PhaseOutcome,
    pub net: Decimal,
    pub tombstone: Option<Tombstone>,
    pub breeding_request: Option<BreedingRequest>,
    /// Decision calls that carried at least one emergent flag
    pub emergent_decisions: u64,
}

/// Execute one full survival tick for a live agent.
pub async fn run_tick<R: Rng>(
    agent: &mut Agent,
    deps: &TickDeps<'_>,
    snapshot: &[MateCandidate],
    population: &PopulationView,
    yield_multiplier: f64,
    rng: &mut R,
) -> TickReport {
    let mut report = TickReport::default();
    agent.state.tick += 1;

    // Environment-conditioned epigenetics run before expression so this
    // tick's phenotype reflects this tick's environment.
    let env = EnvironmentSample {
        balance: money_f64(agent.state.total_balance()),
        days_starving: agent.state.days_starving,
        days_thriving: agent.state.days_thriving,
        stress_level: agent.state.stress_level,
    };
    let (marked_genome, _) = apply_epigenetics(&agent.genome, &env);
    agent.genome = marked_genome;

    let expression = express(&agent.genome);
    let stage = determine_stage(agent.state.tick, expression.max_lifespan);
    agent.state.stage = stage.stage;

    // Pre-phase death verdicts; neonates are protected
    if !stage.protected_from_death {
        let verdict = update_dying_status(&mut agent.state)
            .or_else(|| check_death(&agent.state, &agent.genome, &expression, rng));
        if let Some((cause, reason)) = verdict {
            finalize_death(agent, deps, cause, reason, &mut report).await;
            return report;
        }
    }

    let ctx = TickContext {
        genome: &agent.genome,
        expression: &expression,
        stage,
        yield_multiplier,
        config: deps.config,
    };

    let mut died: Option<(DeathCause, String)> = None;

    macro_rules! phase {
        ($body:expr) => {
            if died.is_none() {
                report.outcome.merge($body);
                died = emergency_check(&agent.state, &stage);
            }
        };
    }

    phase!(phases::settle_positions(&mut agent.state, &ctx, rng));
    phase!(phases::pay_costs(&mut agent.state, &ctx));
    phase!(phases::open_positions(&mut agent.state, &ctx, rng));
    phase!(phases::airdrop_check(&mut agent.state, &ctx, rng));
    phase!(phases::task_market(&mut agent.state, &ctx, rng));
    phase!(phases::negative_events(&mut agent.state, &ctx, rng));

    if died.is_none() {
        let (outcome, emergent) = decision_phase(
            &mut agent.state,
            agent.id,
            agent.genome.meta.generation,
            deps,
            &expression,
            population,
        )
        .await;
        report.outcome.merge(outcome);
        report.emergent_decisions = emergent;
        died = emergency_check(&agent.state, &stage);
    }

    if died.is_none() {
        report
            .outcome
            .merge(phases::manage_tokens(&mut agent.state, &ctx));
        died = emergency_check(&agent.state, &stage);
    }

    if died.is_none() {
        let (outcome, request) =
            phases::breeding_check(&mut agent.state, &ctx, agent.id, snapshot, rng);
        report.outcome.merge(outcome);
        report.breeding_request = request;
    }

    if let Some((cause, reason)) = died {
        finalize_death(agent, deps, cause, reason, &mut report).await;
        return report;
    }

    // Net-flow bookkeeping feeds the next tick's death check and
    // epigenetic triggers
    report.net = report.outcome.net();
    if report.net < Decimal::ZERO {
        agent.state.consecutive_failures += 1;
        agent.state.days_starving += 1;
        agent.state.days_thriving = 0;
    } else {
        agent.state.consecutive_failures = 0;
        agent.state.days_thriving += 1;
        agent.state.days_starving = 0;
    }

    let total = money_f64(agent.state.total_balance());
    let burn = expression.metabolic_cost + BASE_TICK_COST;
    agent.state.stress_level = stress_level(total, total / burn.max(1e-9));

    for event in &report.outcome.events {
        agent.state.record_event(agent.state.tick, event.clone());
    }

    let record = TickRecord {
        tick: agent.state.tick,
        agent_id: agent.id,
        name: agent.name.clone(),
        earnings: report.outcome.earnings,
        costs: report.outcome.costs,
        losses: report.outcome.losses,
        net: report.net,
        balance: agent.state.total_balance(),
        events: report.outcome.events.clone(),
    };
    if let Err(error) = deps.journal.tick(&record).await {
        warn!(agent = %agent.id, %error, "journal tick write failed");
    }

    report
}

/// Phase 7: up to a configured number of throttled decision calls.
async fn decision_phase(
    state: &mut SurvivalState,
    agent_id: AgentId,
    generation: u32,
    deps: &TickDeps<'_>,
    expression: &ExpressionResult,
    population: &PopulationView,
) -> (PhaseOutcome, u64) {
    let mut outcome = PhaseOutcome::default();
    let mut emergent = 0u64;

    for _ in 0..deps.config.max_llm_calls_per_tick {
        let fee = money(deps.config.inference_base_fee * (1.0 + expression.inference_quality));
        if state.wallet.liquid < fee {
            outcome
                .events
                .push("skipped decision call: cannot cover inference fee".to_string());
            break;
        }

        // External rate limits: respect the per-agent inter-call gap
        if let Some(last) = state.last_llm_call {
            let min_gap = Duration::from_millis(deps.config.llm_min_interval_ms);
            let elapsed = last.elapsed();
            if elapsed < min_gap {
                tokio::time::sleep(min_gap - elapsed).await;
            }
        }

        let total = money_f64(state.total_balance());
        let burn = expression.metabolic_cost + BASE_TICK_COST;
        let runway = total / burn.max(1e-9);
        let perception = Perception {
            agent_id,
            expression: expression.clone(),
            age: state.tick,
            generation,
            tick: state.tick,
            liquid_balance: money_f64(state.wallet.liquid),
            total_balance: total,
            daily_burn: burn,
            runway_days: runway,
            mode: environment_mode(total),
            stress_level: state.stress_level,
            population: *population,
            recent_success: state.recent_success(),
        };

        let strategies = if is_emergency(total) {
            emergency_strategies()
        } else {
            filter_strategies(expression, total)
        };

        let decision = decide_with_fallback(deps.provider, &perception, &strategies).await;

        let paid = state.wallet.debit_up_to(fee);
        outcome.costs += paid;
        state.total_spent.inference += paid;
        state.llm_calls += 1;
        state.last_llm_call = Some(Instant::now());
        state.last_reasoning = Some(decision.reasoning.clone());

        let flags = deps.classifier.classify(
            &decision.reasoning,
            decision.raw_response.as_deref().unwrap_or(""),
        );
        if !flags.is_empty() {
            emergent += 1;
        }

        let record = InferenceRecord {
            tick: state.tick,
            agent_id,
            generation,
            strategy_id: decision.strategy_id.clone(),
            reasoning: decision.reasoning.clone(),
            confidence: decision.confidence,
            emotion: decision.emotion.clone(),
            fee: paid,
            flags,
        };
        if let Err(error) = deps.journal.inference(&record).await {
            warn!(agent = %agent_id, %error, "journal inference write failed");
        }

        outcome
            .events
            .push(format!("decided {} ({:.0}% confident)", decision.strategy_id, decision.confidence * 100.0));
        state.record_action(state.tick, decision.strategy_id, true, paid);
    }

    (outcome, emergent)
}

/// Balance-collapse check between phases
fn emergency_check(state: &SurvivalState, stage: &StageInfo) -> Option<(DeathCause, String)> {
    if stage.protected_from_death {
        return None;
    }
    if money_f64(state.total_balance()) <= EMERGENCY_BALANCE_THRESHOLD {
        return Some((DeathCause::Emergency, "balance depleted mid-tick".to_string()));
    }
    None
}

async fn finalize_death(
    agent: &mut Agent,
    deps: &TickDeps<'_>,
    cause: DeathCause,
    reason: String,
    report: &mut TickReport,
) {
    agent.state.is_alive = false;
    let tombstone = make_tombstone(
        agent.id,
        agent.name.clone(),
        &agent.state,
        &agent.genome,
        cause,
        reason,
    );
    if let Err(error) = deps.journal.tombstone(&tombstone).await {
        warn!(agent = %agent.id, %error, "journal tombstone write failed");
    }
    report.tombstone = Some(tombstone);
    report.net = report.outcome.net();
}
