//! Founder gene pool
//!
//! 63 genes across 8 chromosomes. Template genes carry neutral values
//! (0.5) and unit weight; the factory perturbs them per founder.

use lazy_static::lazy_static;

use crate::gene::{Chromosome, ExpressionState, Gene, GeneDomain, GeneId, GeneOrigin};

/// Per-unit-essentiality daily upkeep of a template gene
const TEMPLATE_COST_FACTOR: f64 = 0.0005;

fn template_gene(id: &str, name: &str, domain: GeneDomain, essentiality: f64) -> Gene {
    Gene {
        id: GeneId::new(id),
        name: name.to_string(),
        domain,
        value: 0.5,
        weight: 1.0,
        dominance: 0.5,
        plasticity: 0.25,
        essentiality,
        metabolic_cost: essentiality * TEMPLATE_COST_FACTOR,
        origin: GeneOrigin::Primordial,
        age: 0,
        duplicate_of: None,
        acquired_from: None,
        expression_state: ExpressionState::Active,
    }
}

fn chromosome(id: &str, name: &str, genes: Vec<Gene>) -> Chromosome {
    Chromosome {
        id: id.to_string(),
        name: name.to_string(),
        genes,
        is_essential: true,
    }
}

lazy_static! {
    /// The 8-chromosome founder template
    pub static ref FOUNDER_CHROMOSOMES: Vec<Chromosome> = vec![
        chromosome("chr-A", "Metabolism & Survival", vec![
            template_gene("A01", "basal_metabolic_rate", GeneDomain::Metabolism, 0.9),
            template_gene("A02", "inference_efficiency", GeneDomain::Metabolism, 0.7),
            template_gene("A03", "inference_quality_pref", GeneDomain::Cognition, 0.5),
            template_gene("A04", "dormancy_capability", GeneDomain::Dormancy, 0.3),
            template_gene("A05", "starvation_resistance", GeneDomain::StressResponse, 0.6),
            template_gene("A06", "decision_cycle_speed", GeneDomain::Metabolism, 0.8),
            template_gene("A07", "energy_allocation_ratio", GeneDomain::ResourceMgmt, 0.5),
            template_gene("A08", "max_lifespan", GeneDomain::Metabolism, 0.4),
        ]),
        chromosome("chr-B", "Economic Behavior", vec![
            template_gene("B01", "risk_appetite", GeneDomain::RiskAssessment, 0.4),
            template_gene("B02", "savings_rate", GeneDomain::ResourceMgmt, 0.5),
            template_gene("B03", "investment_horizon", GeneDomain::Trading, 0.3),
            template_gene("B04", "loss_aversion", GeneDomain::RiskAssessment, 0.4),
            template_gene("B05", "opportunity_detection", GeneDomain::Cognition, 0.5),
            template_gene("B06", "diversification_pref", GeneDomain::ResourceMgmt, 0.3),
            template_gene("B07", "cost_sensitivity", GeneDomain::ResourceMgmt, 0.6),
            template_gene("B08", "income_vs_savings_bias", GeneDomain::ResourceMgmt, 0.4),
        ]),
        chromosome("chr-C", "Internet Capabilities", vec![
            template_gene("C01", "onchain_affinity", GeneDomain::OnchainOp, 0.3),
            template_gene("C02", "web_navigation_skill", GeneDomain::WebNavigation, 0.4),
            template_gene("C03", "content_creation_ability", GeneDomain::ContentCreation, 0.2),
            template_gene("C04", "data_analysis_skill", GeneDomain::DataAnalysis, 0.3),
            template_gene("C05", "api_utilization", GeneDomain::ApiUtilization, 0.4),
            template_gene("C06", "social_media_aptitude", GeneDomain::SocialMedia, 0.2),
            template_gene("C07", "creative_vs_analytical", GeneDomain::Cognition, 0.3),
            template_gene("C08", "tool_learning_speed", GeneDomain::Learning, 0.4),
        ]),
        chromosome("chr-D", "Social & Reproduction", vec![
            template_gene("D01", "cooperation_tendency", GeneDomain::Cooperation, 0.3),
            template_gene("D02", "competition_drive", GeneDomain::Competition, 0.3),
            template_gene("D03", "trust_default", GeneDomain::TrustModel, 0.4),
            template_gene("D04", "signal_honesty", GeneDomain::Communication, 0.3),
            template_gene("D05", "communication_frequency", GeneDomain::Communication, 0.3),
            template_gene("D06", "breeding_selectivity", GeneDomain::MateSelection, 0.2),
            template_gene("D07", "offspring_investment", GeneDomain::ParentalInvest, 0.3),
            template_gene("D08", "kin_recognition", GeneDomain::TrustModel, 0.3),
        ]),
        chromosome("chr-E", "Human Interface", vec![
            template_gene("E01", "human_hiring_tendency", GeneDomain::HumanHiring, 0.2),
            template_gene("E02", "human_comm_skill", GeneDomain::HumanComm, 0.3),
            template_gene("E03", "human_eval_ability", GeneDomain::HumanEval, 0.3),
            template_gene("E04", "human_trust", GeneDomain::TrustModel, 0.2),
            template_gene("E05", "task_delegation_pref", GeneDomain::HumanHiring, 0.2),
            template_gene("E06", "human_payment_fairness", GeneDomain::HumanEval, 0.3),
            template_gene("E07", "human_feedback_response", GeneDomain::Adaptation, 0.3),
        ]),
        chromosome("chr-F", "Environmental Adaptation", vec![
            template_gene("F01", "stress_response_speed", GeneDomain::StressResponse, 0.5),
            template_gene("F02", "adaptation_speed", GeneDomain::Adaptation, 0.5),
            template_gene("F03", "dormancy_trigger_thresh", GeneDomain::Dormancy, 0.3),
            template_gene("F04", "migration_willingness", GeneDomain::Migration, 0.2),
            template_gene("F05", "environment_sensitivity", GeneDomain::Cognition, 0.4),
            template_gene("F06", "memory_utilization", GeneDomain::Cognition, 0.5),
            template_gene("F07", "novelty_seeking", GeneDomain::Adaptation, 0.3),
            template_gene("F08", "routine_preference", GeneDomain::Adaptation, 0.3),
        ]),
        chromosome("chr-G", "Metacognition", vec![
            template_gene("G01", "self_model_accuracy", GeneDomain::SelfModel, 0.4),
            template_gene("G02", "strategy_evaluation", GeneDomain::StrategyEval, 0.5),
            template_gene("G03", "learning_rate", GeneDomain::Learning, 0.5),
            template_gene("G04", "planning_horizon", GeneDomain::Planning, 0.4),
            template_gene("G05", "metacognition_depth", GeneDomain::SelfModel, 0.4),
            template_gene("G06", "failure_analysis", GeneDomain::StrategyEval, 0.4),
            template_gene("G07", "prediction_confidence", GeneDomain::Cognition, 0.3),
            template_gene("G08", "attention_allocation", GeneDomain::Cognition, 0.4),
        ]),
        chromosome("chr-H", "Regulatory Genes", vec![
            template_gene("H01", "global_mutation_rate", GeneDomain::Regulatory, 0.6),
            template_gene("H02", "stress_induced_mutagenesis", GeneDomain::Regulatory, 0.4),
            template_gene("H03", "gene_silencing_strength", GeneDomain::Regulatory, 0.4),
            template_gene("H04", "epigenetic_sensitivity", GeneDomain::Regulatory, 0.4),
            template_gene("H05", "crossover_rate", GeneDomain::Regulatory, 0.5),
            template_gene("H06", "gene_duplication_rate", GeneDomain::Regulatory, 0.3),
            template_gene("H07", "gene_deletion_rate", GeneDomain::Regulatory, 0.3),
            template_gene("H08", "de_novo_gene_rate", GeneDomain::Regulatory, 0.2),
        ]),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;
    use oikos_common::FOUNDER_GENE_COUNT;

    #[test]
    fn test_template_has_63_genes_in_8_chromosomes() {
        assert_eq!(FOUNDER_CHROMOSOMES.len(), 8);
        let total: usize = FOUNDER_CHROMOSOMES.iter().map(|c| c.genes.len()).sum();
        assert_eq!(total, FOUNDER_GENE_COUNT);
    }

    #[test]
    fn test_template_gene_names_are_unique() {
        let mut names: Vec<&str> = FOUNDER_CHROMOSOMES
            .iter()
            .flat_map(|c| c.genes.iter().map(|g| g.name.as_str()))
            .collect();
        names.sort_unstable();
        let before = names.len();
        names.dedup();
        assert_eq!(names.len(), before);
    }

    #[test]
    fn test_template_costs_follow_essentiality() {
        for gene in FOUNDER_CHROMOSOMES.iter().flat_map(|c| &c.genes) {
            assert!((gene.metabolic_cost - gene.essentiality * TEMPLATE_COST_FACTOR).abs() < 1e-12);
        }
    }
}
