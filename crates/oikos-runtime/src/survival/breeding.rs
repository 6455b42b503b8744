//! Breeding gates and mate selection
//!
//! Mate selection reads the pre-tick balance snapshot: candidates are
//! scored by balance, generational age, and genetic distance, then the
//! agent's breeding selectivity narrows the pool it samples from.

use oikos_common::{
    money_f64, AgentId, BREEDING_BALANCE_THRESHOLD, BREEDING_COOLDOWN, MINIMUM_BREEDING_AGE,
};
use oikos_genome::{effective_value, DynamicGenome};
use ordered_float::OrderedFloat;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::development::StageInfo;
use super::state::SurvivalState;

/// One row of the pre-tick balance snapshot used for mate selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MateCandidate {
    pub id: AgentId,
    pub balance: f64,
    pub generation: u32,
    pub genome_hash: String,
}

/// A breeding request emitted by phase 9, fulfilled by the population
/// manager after the agent loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreedingRequest {
    pub parent: AgentId,
    pub mate: AgentId,
    pub tick: u64,
}

/// Whether this agent may request breeding this tick
pub fn can_breed(
    genome: &DynamicGenome,
    state: &SurvivalState,
    stage: &StageInfo,
) -> bool {
    if !stage.can_reproduce {
        return false;
    }

    let balance = money_f64(state.total_balance());
    if balance < BREEDING_BALANCE_THRESHOLD {
        return false;
    }
    if state.tick < MINIMUM_BREEDING_AGE {
        return false;
    }
    if state.last_breeding_tick > 0 && state.tick - state.last_breeding_tick < BREEDING_COOLDOWN {
        return false;
    }

    // Highly selective agents hold out for twice the wealth bar
    let selectivity = effective_value(genome, "breeding_selectivity");
    if selectivity > 0.7 && balance < BREEDING_BALANCE_THRESHOLD * 2.0 {
        return false;
    }

    true
}

/// Pick a mate from the candidate snapshot.
///
/// Score = balance x (generation + 1) x diversity bonus (1.5 when the
/// genome hashes differ). Selectivity above 0.5 samples from the top 20%
/// of scores, otherwise the top 50%.
pub fn select_mate(
    genome: &DynamicGenome,
    own_id: AgentId,
    candidates: &[MateCandidate],
    rng: &mut impl Rng,
) -> Option<AgentId> {
    let own_hash = &genome.meta.genome_hash;
    let selectivity = effective_value(genome, "breeding_selectivity");

    let mut scored: Vec<(&MateCandidate, f64)> = candidates
        .iter()
        .filter(|c| c.id != own_id)
        .map(|c| {
            let diversity = if &c.genome_hash != own_hash { 1.5 } else { 1.0 };
            let score = c.balance * (c.generation as f64 + 1.0) * diversity;
            (c, score)
        })
        .collect();

    if scored.is_empty() {
        return None;
    }

    scored.sort_by_key(|(_, score)| std::cmp::Reverse(OrderedFloat(*score)));

    let pool_fraction = if selectivity > 0.5 { 0.2 } else { 0.5 };
    let pool_size = ((scored.len() as f64 * pool_fraction).floor() as usize).max(1);
    let pick = rng.gen_range(0..pool_size);

    Some(scored[pick].0.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::survival::development::determine_stage;
    use oikos_genome::founder_genome;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rust_decimal_macros::dec;

    fn adult_stage() -> StageInfo {
        determine_stage(20, 1000)
    }

    fn ready_state() -> SurvivalState {
        let mut state = SurvivalState::new(dec!(20));
        state.tick = 20;
        state
    }

    fn neutral_genome(selectivity: f64) -> DynamicGenome {
        let mut rng = StdRng::seed_from_u64(121);
        let mut genome = founder_genome(&mut rng);
        for c in &mut genome.chromosomes {
            for g in &mut c.genes {
                if g.name == "breeding_selectivity" {
                    g.value = selectivity;
                    g.weight = 1.0;
                }
            }
        }
        genome
    }

    #[test]
    fn test_funded_adult_can_breed() {
        let genome = neutral_genome(0.4);
        let state = ready_state();
        assert!(can_breed(&genome, &state, &adult_stage()));
    }

    #[test]
    fn test_poor_agent_cannot_breed() {
        let genome = neutral_genome(0.4);
        let mut state = ready_state();
        state.wallet = oikos_common::AgentWallet::with_balance(dec!(10));
        assert!(!can_breed(&genome, &state, &adult_stage()));
    }

    #[test]
    fn test_young_agent_cannot_breed() {
        let genome = neutral_genome(0.4);
        let mut state = ready_state();
        state.tick = 10;
        assert!(!can_breed(&genome, &state, &determine_stage(10, 1000)));
    }

    #[test]
    fn test_cooldown_blocks_repeat_breeding() {
        let genome = neutral_genome(0.4);
        let mut state = ready_state();
        state.tick = 30;
        state.last_breeding_tick = 25;
        assert!(!can_breed(&genome, &state, &adult_stage()));

        state.last_breeding_tick = 5;
        assert!(can_breed(&genome, &state, &adult_stage()));
    }

    #[test]
    fn test_selective_agent_needs_double_threshold() {
        let genome = neutral_genome(0.9);
        let state = ready_state(); // balance 20 < 30
        assert!(!can_breed(&genome, &state, &adult_stage()));

        let mut rich = ready_state();
        rich.wallet = oikos_common::AgentWallet::with_balance(dec!(40));
        assert!(can_breed(&genome, &rich, &adult_stage()));
    }

    #[test]
    fn test_select_mate_skips_self_and_prefers_wealth() {
        let mut rng = StdRng::seed_from_u64(122);
        let genome = neutral_genome(0.9);
        let own = AgentId::new();
        let rich = AgentId::new();

        let candidates = vec![
            MateCandidate {
                id: own,
                balance: 1000.0,
                generation: 5,
                genome_hash: genome.meta.genome_hash.clone(),
            },
            MateCandidate {
                id: rich,
                balance: 100.0,
                generation: 2,
                genome_hash: "other-hash".to_string(),
            },
            MateCandidate {
                id: AgentId::new(),
                balance: 1.0,
                generation: 0,
                genome_hash: "third-hash".to_string(),
            },
        ];

        // Selectivity 0.9 -> pool of 1 -> always the top-scored non-self
        for _ in 0..20 {
            assert_eq!(select_mate(&genome, own, &candidates, &mut rng), Some(rich));
        }
    }

    #[test]
    fn test_select_mate_none_without_candidates() {
        let mut rng = StdRng::seed_from_u64(123);
        let genome = neutral_genome(0.5);
        let own = AgentId::new();
        assert!(select_mate(&genome, own, &[], &mut rng).is_none());
    }
}
