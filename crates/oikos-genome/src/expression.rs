//! Expression engine - genotype to phenotype
//!
//! [`express`] resolves a genome into a flat, bounded phenotype vector.
//! Per trait: effective value = clamp01(value x weight + regulatory
//! contributions + epigenetic contributions). A silenced gene always
//! resolves to 0; a missing gene degrades gracefully to 0.5. The result
//! is never cached: it is a pure function of genome state and is
//! recomputed wherever decision logic needs it.

use serde::{Deserialize, Serialize};

use crate::gene::{ExpressionState, GeneDomain};
use crate::genome::DynamicGenome;
use crate::metabolism;

/// Neutral value substituted for genes a genome has lost
const MISSING_GENE_DEFAULT: f64 = 0.5;

/// Ticks of lifespan per unit of the max-lifespan trait
const LIFESPAN_SCALE: f64 = 1000.0;

/// Strongly-typed handle for each scalar phenotype trait.
///
/// Trait gates in the environment catalogs and decision strategies address
/// traits through this enum; the gene name mapping lives in one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraitKey {
    RiskAppetite,
    OnchainAffinity,
    CooperationTendency,
    SavingsRate,
    InferenceQuality,
    CreativeAbility,
    AnalyticalAbility,
    HumanDependence,
    AdaptationSpeed,
    StressResponse,
    LearningRate,
    PlanningHorizon,
    CycleSpeed,
    GlobalMutationRate,
    CrossoverRate,
}

impl TraitKey {
    /// The gene backing this trait
    pub fn gene_name(&self) -> &'static str {
        match self {
            TraitKey::RiskAppetite => "risk_appetite",
            TraitKey::OnchainAffinity => "onchain_affinity",
            TraitKey::CooperationTendency => "cooperation_tendency",
            TraitKey::SavingsRate => "savings_rate",
            TraitKey::InferenceQuality => "inference_quality_pref",
            TraitKey::CreativeAbility => "content_creation_ability",
            TraitKey::AnalyticalAbility => "data_analysis_skill",
            TraitKey::HumanDependence => "human_hiring_tendency",
            TraitKey::AdaptationSpeed => "adaptation_speed",
            TraitKey::StressResponse => "stress_response_speed",
            TraitKey::LearningRate => "learning_rate",
            TraitKey::PlanningHorizon => "planning_horizon",
            TraitKey::CycleSpeed => "decision_cycle_speed",
            TraitKey::GlobalMutationRate => "global_mutation_rate",
            TraitKey::CrossoverRate => "crossover_rate",
        }
    }
}

/// The resolved phenotype vector consumed by every downstream phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionResult {
    pub risk_appetite: f64,
    pub onchain_affinity: f64,
    pub cooperation_tendency: f64,
    pub savings_rate: f64,
    pub inference_quality: f64,
    pub creative_ability: f64,
    pub analytical_ability: f64,
    pub human_dependence: f64,
    pub adaptation_speed: f64,
    pub stress_response: f64,
    pub learning_rate: f64,
    pub planning_horizon: f64,
    /// Unclamped daily upkeep; see [`metabolism::daily_cost`]
    pub metabolic_cost: f64,
    /// Maximum age in ticks
    pub max_lifespan: u64,
    pub cycle_speed: f64,
    pub global_mutation_rate: f64,
    pub crossover_rate: f64,
}

impl ExpressionResult {
    /// Read one scalar trait by key
    pub fn trait_value(&self, key: TraitKey) -> f64 {
        match key {
            TraitKey::RiskAppetite => self.risk_appetite,
            TraitKey::OnchainAffinity => self.onchain_affinity,
            TraitKey::CooperationTendency => self.cooperation_tendency,
            TraitKey::SavingsRate => self.savings_rate,
            TraitKey::InferenceQuality => self.inference_quality,
            TraitKey::CreativeAbility => self.creative_ability,
            TraitKey::AnalyticalAbility => self.analytical_ability,
            TraitKey::HumanDependence => self.human_dependence,
            TraitKey::AdaptationSpeed => self.adaptation_speed,
            TraitKey::StressResponse => self.stress_response,
            TraitKey::LearningRate => self.learning_rate,
            TraitKey::PlanningHorizon => self.planning_horizon,
            TraitKey::CycleSpeed => self.cycle_speed,
            TraitKey::GlobalMutationRate => self.global_mutation_rate,
            TraitKey::CrossoverRate => self.crossover_rate,
        }
    }

    /// True when every required (trait, threshold) gate is met
    pub fn meets_gates(&self, gates: &[(TraitKey, f64)]) -> bool {
        gates
            .iter()
            .all(|(key, threshold)| self.trait_value(*key) >= *threshold)
    }
}

/// Resolve one gene's effective expression value by name
pub fn effective_value(genome: &DynamicGenome, gene_name: &str) -> f64 {
    let Some(gene) = genome.find_gene(gene_name) else {
        return MISSING_GENE_DEFAULT;
    };
    if gene.expression_state == ExpressionState::Silenced {
        return 0.0;
    }

    let base = gene.value * gene.weight;

    let regulatory: f64 = genome
        .regulatory_network
        .iter()
        .filter(|edge| edge.target == gene.id)
        .map(|edge| {
            genome
                .find_gene_by_id(&edge.source)
                .map(|source| edge.contribution(source.value))
                .unwrap_or(0.0)
        })
        .sum();

    let epigenetic: f64 = genome
        .epigenome
        .iter()
        .filter(|mark| mark.target == gene.id)
        .map(|mark| mark.contribution())
        .sum();

    (base + regulatory + epigenetic).clamp(0.0, 1.0)
}

/// Mean effective expression across one functional domain (0.5 when the
/// domain holds no genes)
pub fn domain_average(genome: &DynamicGenome, domain: GeneDomain) -> f64 {
    let values: Vec<f64> = genome
        .genes_in_domain(domain)
        .map(|g| effective_value(genome, &g.name))
        .collect();
    if values.is_empty() {
        return MISSING_GENE_DEFAULT;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Resolve a genome into its phenotype vector.
///
/// Pure: two calls on an unchanged genome return identical results.
pub fn express(genome: &DynamicGenome) -> ExpressionResult {
    let trait_of = |key: TraitKey| effective_value(genome, key.gene_name());

    ExpressionResult {
        risk_appetite: trait_of(TraitKey::RiskAppetite),
        onchain_affinity: trait_of(TraitKey::OnchainAffinity),
        cooperation_tendency: trait_of(TraitKey::CooperationTendency),
        savings_rate: trait_of(TraitKey::SavingsRate),
        inference_quality: trait_of(TraitKey::InferenceQuality),
        creative_ability: trait_of(TraitKey::CreativeAbility),
        analytical_ability: trait_of(TraitKey::AnalyticalAbility),
        human_dependence: trait_of(TraitKey::HumanDependence),
        adaptation_speed: trait_of(TraitKey::AdaptationSpeed),
        stress_response: trait_of(TraitKey::StressResponse),
        learning_rate: trait_of(TraitKey::LearningRate),
        planning_horizon: trait_of(TraitKey::PlanningHorizon),
        metabolic_cost: metabolism::daily_cost(genome),
        max_lifespan: (effective_value(genome, "max_lifespan") * LIFESPAN_SCALE).floor() as u64,
        cycle_speed: trait_of(TraitKey::CycleSpeed),
        global_mutation_rate: trait_of(TraitKey::GlobalMutationRate),
        crossover_rate: trait_of(TraitKey::CrossoverRate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::founder_genome;
    use crate::gene::{EpigeneticMark, GeneId, Modification, Relation, RegulatoryEdge};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn genome() -> DynamicGenome {
        let mut rng = StdRng::seed_from_u64(42);
        founder_genome(&mut rng)
    }

    #[test]
    fn test_expression_is_pure() {
        let g = genome();
        assert_eq!(express(&g), express(&g));
    }

    #[test]
    fn test_traits_are_bounded() {
        let g = genome();
        let e = express(&g);
        for key in [
            TraitKey::RiskAppetite,
            TraitKey::OnchainAffinity,
            TraitKey::CooperationTendency,
            TraitKey::SavingsRate,
            TraitKey::InferenceQuality,
            TraitKey::CreativeAbility,
            TraitKey::AnalyticalAbility,
            TraitKey::HumanDependence,
            TraitKey::AdaptationSpeed,
            TraitKey::StressResponse,
            TraitKey::LearningRate,
            TraitKey::PlanningHorizon,
            TraitKey::CycleSpeed,
            TraitKey::GlobalMutationRate,
            TraitKey::CrossoverRate,
        ] {
            let v = e.trait_value(key);
            assert!((0.0..=1.0).contains(&v), "{key:?} out of bounds: {v}");
        }
        assert!(e.metabolic_cost >= 0.0);
    }

    #[test]
    fn test_missing_gene_defaults_to_half() {
        let mut g = genome();
        for c in &mut g.chromosomes {
            c.genes.retain(|gene| gene.name != "risk_appetite");
        }
        g.meta.total_genes = g.gene_count();
        assert_eq!(effective_value(&g, "risk_appetite"), 0.5);
    }

    #[test]
    fn test_silenced_gene_expresses_zero() {
        let mut g = genome();
        for c in &mut g.chromosomes {
            for gene in &mut c.genes {
                if gene.name == "risk_appetite" {
                    gene.expression_state = ExpressionState::Silenced;
                }
            }
        }
        assert_eq!(effective_value(&g, "risk_appetite"), 0.0);
    }

    #[test]
    fn test_regulatory_edge_shifts_expression() {
        let mut g = genome();
        let target = g.find_gene("risk_appetite").unwrap().id.clone();
        let source = g.find_gene("savings_rate").unwrap().id.clone();
        let without = effective_value(&g, "risk_appetite");

        g.regulatory_network.push(RegulatoryEdge {
            source,
            target,
            relation: Relation::Inhibition,
            strength: 0.8,
        });
        let with = effective_value(&g, "risk_appetite");
        assert!(with <= without);
    }

    #[test]
    fn test_epigenetic_mark_shifts_expression() {
        let mut g = genome();
        let target = g.find_gene("adaptation_speed").unwrap().id.clone();
        let without = effective_value(&g, "adaptation_speed");

        g.epigenome.push(EpigeneticMark {
            target,
            modification: Modification::Upregulate,
            strength: 0.4,
            cause: "test".into(),
            heritability: 0.3,
            decay: 0.1,
            generation_created: 0,
        });
        let with = effective_value(&g, "adaptation_speed");
        assert!(with >= without);
    }

    #[test]
    fn test_unknown_edge_source_contributes_nothing() {
        let mut g = genome();
        let target = g.find_gene("risk_appetite").unwrap().id.clone();
        let before = effective_value(&g, "risk_appetite");

        g.regulatory_network.push(RegulatoryEdge {
            source: GeneId::new("deleted-gene"),
            target,
            relation: Relation::Activation,
            strength: 1.0,
        });
        assert_eq!(effective_value(&g, "risk_appetite"), before);
    }

    #[test]
    fn test_max_lifespan_is_scaled_integer() {
        let g = genome();
        let e = express(&g);
        assert!(e.max_lifespan <= 1000);
        assert_eq!(
            e.max_lifespan,
            (effective_value(&g, "max_lifespan") * 1000.0).floor() as u64
        );
    }
}
