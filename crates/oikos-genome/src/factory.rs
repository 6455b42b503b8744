//! Genome factory
//!
//! Builds founder genomes by cloning the template set with randomized
//! perturbation, so generation-0 agents start genetically distinct.

use oikos_common::LineageId;
use rand::Rng;

use crate::defaults::FOUNDER_CHROMOSOMES;
use crate::gene::{clamp_value, clamp_weight, Chromosome, Gene, GeneId};
use crate::genome::DynamicGenome;

/// Magnitude of the value perturbation applied to each template gene
const VALUE_JITTER: f64 = 0.1;

/// Magnitude of the weight perturbation applied to each template gene
const WEIGHT_JITTER: f64 = 0.2;

fn perturb_gene(template: &Gene, rng: &mut impl Rng) -> Gene {
    let mut gene = template.clone();
    gene.id = GeneId::derived(&template.id, "f", rng);
    gene.value = clamp_value(template.value + rng.gen_range(-VALUE_JITTER..=VALUE_JITTER));
    gene.weight = clamp_weight(template.weight + rng.gen_range(-WEIGHT_JITTER..=WEIGHT_JITTER));
    gene.dominance = rng.gen_range(0.0..1.0);
    gene.plasticity = rng.gen_range(0.0..0.5);
    gene
}

fn clone_chromosome(template: &Chromosome, rng: &mut impl Rng) -> Chromosome {
    Chromosome {
        id: template.id.clone(),
        name: template.name.clone(),
        genes: template.genes.iter().map(|g| perturb_gene(g, rng)).collect(),
        is_essential: template.is_essential,
    }
}

/// Create a generation-0 genome: the full 63-gene template, perturbed,
/// with an empty regulatory network and epigenome.
pub fn founder_genome(rng: &mut impl Rng) -> DynamicGenome {
    let chromosomes = FOUNDER_CHROMOSOMES
        .iter()
        .map(|c| clone_chromosome(c, rng))
        .collect();

    DynamicGenome::assemble(0, LineageId::new(), chromosomes, Vec::new(), Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use oikos_common::FOUNDER_GENE_COUNT;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_founder_has_exactly_63_genes_in_8_chromosomes() {
        let mut rng = StdRng::seed_from_u64(1);
        let genome = founder_genome(&mut rng);
        assert_eq!(genome.chromosomes.len(), 8);
        assert_eq!(genome.gene_count(), FOUNDER_GENE_COUNT);
        assert_eq!(genome.meta.total_genes, FOUNDER_GENE_COUNT);
        assert!(genome.validate().is_ok());
    }

    #[test]
    fn test_founder_is_generation_zero_with_empty_layers() {
        let mut rng = StdRng::seed_from_u64(2);
        let genome = founder_genome(&mut rng);
        assert_eq!(genome.meta.generation, 0);
        assert!(genome.regulatory_network.is_empty());
        assert!(genome.epigenome.is_empty());
    }

    #[test]
    fn test_perturbation_stays_in_bounds() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let genome = founder_genome(&mut rng);
            for gene in genome.genes() {
                assert!((0.0..=1.0).contains(&gene.value));
                assert!((0.1..=3.0).contains(&gene.weight));
                assert!((0.0..=1.0).contains(&gene.dominance));
                assert!((0.0..=0.5).contains(&gene.plasticity));
            }
        }
    }

    #[test]
    fn test_founders_are_distinct() {
        let mut rng = StdRng::seed_from_u64(4);
        let a = founder_genome(&mut rng);
        let b = founder_genome(&mut rng);
        assert_ne!(a.meta.genome_hash, b.meta.genome_hash);
    }
}
