//! Epigenetic engine
//!
//! A fixed table of environment-to-domain triggers writes decaying marks
//! onto genes. Re-triggering a domain overwrites the gene's existing mark
//! rather than stacking, so one trigger firing for many ticks stays
//! idempotent. Marks decay exponentially with generation distance and are
//! pruned below a strength floor.

use serde::{Deserialize, Serialize};

use crate::gene::{EpigeneticMark, GeneDomain, Modification};
use crate::genome::DynamicGenome;

/// Marks weaker than this are pruned
const MARK_STRENGTH_FLOOR: f64 = 0.01;

/// Default heritability of environment-induced marks
const MARK_HERITABILITY: f64 = 0.3;

/// Default per-generation decay of environment-induced marks
const MARK_DECAY: f64 = 0.1;

/// The environment slice the trigger table conditions on
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct EnvironmentSample {
    /// Current total balance in USDC
    pub balance: f64,
    /// Consecutive ticks with negative net flow
    pub days_starving: u32,
    /// Consecutive ticks with positive net flow
    pub days_thriving: u32,
    /// Stress level in [0, 1]
    pub stress_level: f64,
}

struct Trigger {
    applies: fn(&EnvironmentSample) -> bool,
    domain: GeneDomain,
    modification: Modification,
    strength: f64,
}

/// Environment-to-domain trigger table
const TRIGGERS: &[Trigger] = &[
    Trigger {
        applies: |env| env.balance < 2.0,
        domain: GeneDomain::Dormancy,
        modification: Modification::Activate,
        strength: 0.6,
    },
    Trigger {
        applies: |env| env.balance < 2.0,
        domain: GeneDomain::Metabolism,
        modification: Modification::Downregulate,
        strength: 0.5,
    },
    Trigger {
        applies: |env| env.days_starving > 3,
        domain: GeneDomain::Adaptation,
        modification: Modification::Upregulate,
        strength: 0.4,
    },
    Trigger {
        applies: |env| env.days_thriving > 7,
        domain: GeneDomain::MateSelection,
        modification: Modification::Upregulate,
        strength: 0.3,
    },
    Trigger {
        applies: |env| env.stress_level > 0.7,
        domain: GeneDomain::StressResponse,
        modification: Modification::Upregulate,
        strength: 0.5,
    },
];

/// Apply environment-conditioned marks, then decay and prune the whole
/// epigenome. Pure: returns the updated genome and the marks written this
/// call.
pub fn apply_epigenetics(
    genome: &DynamicGenome,
    env: &EnvironmentSample,
) -> (DynamicGenome, Vec<EpigeneticMark>) {
    let mut next = genome.clone();
    let mut applied = Vec::new();

    for trigger in TRIGGERS.iter().filter(|t| (t.applies)(env)) {
        let targets: Vec<_> = next
            .genes_in_domain(trigger.domain)
            .map(|g| g.id.clone())
            .collect();

        for target in targets {
            let mark = EpigeneticMark {
                target: target.clone(),
                modification: trigger.modification,
                strength: trigger.strength.clamp(0.0, 1.0),
                cause: format!("environmental_trigger:balance={:.2}", env.balance),
                heritability: MARK_HERITABILITY,
                decay: MARK_DECAY,
                generation_created: next.meta.generation,
            };

            match next.epigenome.iter_mut().find(|m| m.target == target) {
                Some(existing) => *existing = mark.clone(),
                None => next.epigenome.push(mark.clone()),
            }
            applied.push(mark);
        }
    }

    decay_marks(&mut next);
    (next, applied)
}

/// Decay every mark by `(1 - decay)^(generation - created)` and drop
/// those below the strength floor.
pub fn decay_marks(genome: &mut DynamicGenome) {
    let generation = genome.meta.generation;
    for mark in &mut genome.epigenome {
        let elapsed = generation.saturating_sub(mark.generation_created);
        mark.strength *= (1.0 - mark.decay).powi(elapsed as i32);
    }
    genome.epigenome.retain(|m| m.strength > MARK_STRENGTH_FLOOR);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::founder_genome;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn genome() -> DynamicGenome {
        let mut rng = StdRng::seed_from_u64(99);
        founder_genome(&mut rng)
    }

    fn starving_env() -> EnvironmentSample {
        EnvironmentSample {
            balance: 1.5,
            days_starving: 5,
            days_thriving: 0,
            stress_level: 0.9,
        }
    }

    #[test]
    fn test_low_balance_marks_dormancy_and_metabolism() {
        let g = genome();
        let (marked, applied) = apply_epigenetics(&g, &starving_env());

        assert!(!applied.is_empty());
        let dormancy_ids: Vec<_> = marked
            .genes_in_domain(GeneDomain::Dormancy)
            .map(|g| g.id.clone())
            .collect();
        for id in &dormancy_ids {
            assert!(marked.epigenome.iter().any(|m| &m.target == id));
        }
    }

    #[test]
    fn test_retrigger_overwrites_instead_of_stacking() {
        let g = genome();
        let env = starving_env();
        let (once, _) = apply_epigenetics(&g, &env);
        let (twice, _) = apply_epigenetics(&once, &env);
        assert_eq!(once.epigenome.len(), twice.epigenome.len());
    }

    #[test]
    fn test_calm_environment_writes_nothing() {
        let g = genome();
        let env = EnvironmentSample {
            balance: 50.0,
            days_starving: 0,
            days_thriving: 1,
            stress_level: 0.1,
        };
        let (next, applied) = apply_epigenetics(&g, &env);
        assert!(applied.is_empty());
        assert!(next.epigenome.is_empty());
    }

    #[test]
    fn test_marks_decay_across_generations_and_prune() {
        let g = genome();
        let (mut marked, _) = apply_epigenetics(&g, &starving_env());
        let strength_at_creation = marked.epigenome[0].strength;

        // Same epigenome carried 10 generations forward
        marked.meta.generation += 10;
        decay_marks(&mut marked);
        if let Some(mark) = marked.epigenome.first() {
            assert!(mark.strength < strength_at_creation);
        }

        // Far enough out, everything prunes
        marked.meta.generation += 100;
        decay_marks(&mut marked);
        assert!(marked.epigenome.is_empty());
    }

    #[test]
    fn test_input_genome_is_untouched() {
        let g = genome();
        let before = g.epigenome.len();
        let _ = apply_epigenetics(&g, &starving_env());
        assert_eq!(g.epigenome.len(), before);
    }
}
