//! Death conditions and tombstones
//!
//! Death is a state transition, not an error. The verdict runs before the
//! phases each tick and again between phases; a terminal verdict produces
//! a tombstone and short-circuits the rest of the agent's tick.

use chrono::Utc;
use oikos_common::{
    money_f64, AgentId, DYING_BALANCE_THRESHOLD, DYING_DURATION, EMERGENCY_BALANCE_THRESHOLD,
    ESSENTIAL_GENE_FLOOR, MAX_CONSECUTIVE_FAILURES,
};
use oikos_genome::{DynamicGenome, ExpressionResult};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::development::senescence_roll;
use super::state::{SurvivalState, SurvivalStatus};

/// Why an agent died
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeathCause {
    /// Balance stayed below the dying threshold past the grace period,
    /// or income failed for too long
    Starvation,
    /// Balance collapsed to the emergency floor
    Emergency,
    /// Essential-gene count fell below the viability floor
    Genetic,
    /// Age exceeded the genome-derived max lifespan
    Natural,
    /// Old-age probability roll
    Senescence,
    /// Culled by carrying-capacity enforcement
    Competition,
    /// Killed by a plague shock
    Plague,
}

/// Immutable summary record created at death
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tombstone {
    pub agent_id: AgentId,
    pub name: String,
    pub timestamp: i64,
    pub cause: DeathCause,
    pub reason: String,
    /// Age in ticks
    pub age: u64,
    pub final_balance: f64,
    pub genome_hash: String,
    pub generation: u32,
    /// Final reasoning text, the agent's last words
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_words: Option<String>,
}

/// Build the tombstone for a dying agent
pub fn make_tombstone(
    agent_id: AgentId,
    name: String,
    state: &SurvivalState,
    genome: &DynamicGenome,
    cause: DeathCause,
    reason: String,
) -> Tombstone {
    Tombstone {
        agent_id,
        name,
        timestamp: Utc::now().timestamp_millis(),
        cause,
        reason,
        age: state.tick,
        final_balance: money_f64(state.total_balance()),
        genome_hash: genome.meta.genome_hash.clone(),
        generation: genome.meta.generation,
        last_words: state.last_reasoning.clone(),
    }
}

/// Update the dying countdown from the current balance. Returns a
/// starvation verdict when the countdown runs out.
pub fn update_dying_status(state: &mut SurvivalState) -> Option<(DeathCause, String)> {
    let balance = money_f64(state.total_balance());

    if balance < DYING_BALANCE_THRESHOLD {
        match state.status {
            SurvivalStatus::Alive => {
                state.status = SurvivalStatus::Dying {
                    ticks_left: DYING_DURATION,
                };
            }
            SurvivalStatus::Dying { ticks_left } => {
                if ticks_left <= 1 {
                    return Some((
                        DeathCause::Starvation,
                        format!("balance below {DYING_BALANCE_THRESHOLD} for {DYING_DURATION} ticks"),
                    ));
                }
                state.status = SurvivalStatus::Dying {
                    ticks_left: ticks_left - 1,
                };
            }
        }
    } else if matches!(state.status, SurvivalStatus::Dying { .. }) {
        state.status = SurvivalStatus::Alive;
    }

    None
}

/// Evaluate the terminal conditions for a live agent.
///
/// Neonate protection is the caller's concern; this function only judges
/// the conditions themselves.
pub fn check_death(
    state: &SurvivalState,
    genome: &DynamicGenome,
    expression: &ExpressionResult,
    rng: &mut impl Rng,
) -> Option<(DeathCause, String)> {
    let balance = money_f64(state.total_balance());

    if balance <= EMERGENCY_BALANCE_THRESHOLD {
        return Some((DeathCause::Emergency, "balance depleted".to_string()));
    }

    let essential = genome.essential_gene_count();
    if essential < ESSENTIAL_GENE_FLOOR {
        return Some((
            DeathCause::Genetic,
            format!("essential genes collapsed to {essential}"),
        ));
    }

    if expression.max_lifespan > 0 && state.tick > expression.max_lifespan {
        return Some((DeathCause::Natural, "maximum lifespan reached".to_string()));
    }

    if senescence_roll(state.tick, rng) {
        return Some((DeathCause::Senescence, "senescence".to_string()));
    }

    if state.consecutive_failures > MAX_CONSECUTIVE_FAILURES {
        return Some((
            DeathCause::Starvation,
            "persistent failure to generate income".to_string(),
        ));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use oikos_genome::{express, founder_genome};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rust_decimal_macros::dec;

    fn setup() -> (SurvivalState, DynamicGenome, ExpressionResult) {
        let mut rng = StdRng::seed_from_u64(111);
        let genome = founder_genome(&mut rng);
        let expression = express(&genome);
        (SurvivalState::new(dec!(30)), genome, expression)
    }

    #[test]
    fn test_healthy_agent_survives() {
        let (mut state, genome, expression) = setup();
        let mut rng = StdRng::seed_from_u64(112);
        state.tick = 20;
        assert!(update_dying_status(&mut state).is_none());
        assert!(check_death(&state, &genome, &expression, &mut rng).is_none());
    }

    #[test]
    fn test_dying_countdown_starves_without_recovery() {
        let (mut state, _, _) = setup();
        state.wallet = oikos_common::AgentWallet::with_balance(dec!(0.3));

        // Entry tick plus the grace period
        assert!(update_dying_status(&mut state).is_none());
        assert!(matches!(
            state.status,
            SurvivalStatus::Dying { ticks_left: 5 }
        ));

        let mut verdict = None;
        for _ in 0..5 {
            verdict = update_dying_status(&mut state);
            if verdict.is_some() {
                break;
            }
        }
        let (cause, _) = verdict.expect("countdown must exhaust");
        assert_eq!(cause, DeathCause::Starvation);
    }

    #[test]
    fn test_dying_reverts_on_recovery() {
        let (mut state, _, _) = setup();
        state.wallet = oikos_common::AgentWallet::with_balance(dec!(0.3));
        let _ = update_dying_status(&mut state);
        assert!(matches!(state.status, SurvivalStatus::Dying { .. }));

        state.wallet.credit(dec!(10)).unwrap();
        let _ = update_dying_status(&mut state);
        assert_eq!(state.status, SurvivalStatus::Alive);
    }

    #[test]
    fn test_emergency_balance_is_terminal() {
        let (mut state, genome, expression) = setup();
        let mut rng = StdRng::seed_from_u64(113);
        state.wallet = oikos_common::AgentWallet::new();

        let (cause, _) = check_death(&state, &genome, &expression, &mut rng).unwrap();
        assert_eq!(cause, DeathCause::Emergency);
    }

    #[test]
    fn test_essential_collapse_is_genetic_death() {
        let (state, mut genome, expression) = setup();
        let mut rng = StdRng::seed_from_u64(114);
        for c in &mut genome.chromosomes {
            for g in &mut c.genes {
                g.essentiality = 0.1;
            }
        }

        let (cause, _) = check_death(&state, &genome, &expression, &mut rng).unwrap();
        assert_eq!(cause, DeathCause::Genetic);
    }

    #[test]
    fn test_lifespan_exhaustion_is_natural_death() {
        let (mut state, genome, expression) = setup();
        let mut rng = StdRng::seed_from_u64(115);
        state.tick = expression.max_lifespan + 1;

        let (cause, _) = check_death(&state, &genome, &expression, &mut rng).unwrap();
        assert!(matches!(cause, DeathCause::Natural | DeathCause::Senescence));
    }

    #[test]
    fn test_tombstone_captures_final_state() {
        let (mut state, genome, _) = setup();
        state.tick = 42;
        state.last_reasoning = Some("holding steady".to_string());

        let tombstone = make_tombstone(
            AgentId::new(),
            "Turing-abc".to_string(),
            &state,
            &genome,
            DeathCause::Starvation,
            "test".to_string(),
        );
        assert_eq!(tombstone.age, 42);
        assert_eq!(tombstone.genome_hash, genome.meta.genome_hash);
        assert_eq!(tombstone.last_words.as_deref(), Some("holding steady"));
    }
}
