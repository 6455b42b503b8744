//! Genetic operators
//!
//! Six transformations over a genome: point mutation, crossover, gene
//! duplication, gene deletion, horizontal gene transfer, de-novo gene
//! emergence. All are pure: the input genome is never mutated, and the
//! caller commits the returned genome. Each application restamps the
//! content hash and keeps `meta.total_genes` in step with the edit.

use oikos_common::AgentId;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::gene::{
    clamp_value, clamp_weight, Chromosome, ExpressionState, Gene, GeneDomain, GeneId, GeneOrigin,
};
use crate::genome::DynamicGenome;

/// Maximum absolute value delta of a point mutation
const POINT_MUTATION_DELTA: f64 = 0.05;

/// Value discount applied to a duplicated gene
const DUPLICATION_VALUE_FACTOR: f64 = 0.95;

/// Weight discount applied to a duplicated gene
const DUPLICATION_WEIGHT_FACTOR: f64 = 0.5;

/// Weight discount applied to a horizontally transferred gene
const HGT_WEIGHT_FACTOR: f64 = 0.3;

/// Which operator produced a [`MutationEvent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    Point,
    Crossover,
    Duplication,
    Deletion,
    HorizontalTransfer,
    DeNovo,
}

/// Audit record emitted by every operator application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationEvent {
    pub gene: GeneId,
    pub kind: MutationKind,
    pub before: Option<serde_json::Value>,
    pub after: Option<serde_json::Value>,
    pub generation: u32,
}

/// Perturb one uniformly chosen gene's value by a delta in
/// [-0.05, +0.05], clamped to [0, 1]. Never changes the gene count.
pub fn point_mutation(
    genome: &DynamicGenome,
    rng: &mut impl Rng,
) -> (DynamicGenome, MutationEvent) {
    let mut next = genome.clone();

    let total = next.gene_count();
    let flat = rng.gen_range(0..total);
    let (ci, gi) = locate(&next, flat);

    let gene = &mut next.chromosomes[ci].genes[gi];
    let before = gene.value;
    gene.value = clamp_value(gene.value + rng.gen_range(-POINT_MUTATION_DELTA..=POINT_MUTATION_DELTA));
    if gene.origin == GeneOrigin::Primordial {
        gene.origin = GeneOrigin::Mutated;
    }

    let event = MutationEvent {
        gene: gene.id.clone(),
        kind: MutationKind::Point,
        before: Some(json!(before)),
        after: Some(json!(gene.value)),
        generation: next.meta.generation,
    };

    next.rehash();
    (next, event)
}

/// Recombine two parent genomes into a child.
///
/// Per chromosome index, either parent A's chromosome is cloned wholesale
/// (p = 0.5, and always when parent B has no chromosome at that index) or
/// a single-point splice takes A's genes before a random cut and B's genes
/// after it. The child starts a fresh lineage at generation
/// `parent_a.generation + 1`; regulatory network and epigenome are not
/// inherited.
pub fn crossover(
    parent_a: &DynamicGenome,
    parent_b: &DynamicGenome,
    rng: &mut impl Rng,
) -> (DynamicGenome, Vec<MutationEvent>) {
    let generation = parent_a.meta.generation + 1;
    let mut events = Vec::new();

    let chromosomes = parent_a
        .chromosomes
        .iter()
        .enumerate()
        .map(|(idx, chr_a)| match parent_b.chromosomes.get(idx) {
            Some(chr_b) if rng.gen_bool(0.5) => {
                splice_chromosomes(chr_a, chr_b, generation, &mut events, rng)
            }
            _ => reident_chromosome(chr_a, rng),
        })
        .collect();

    let child = DynamicGenome::assemble(
        generation,
        oikos_common::LineageId::new(),
        chromosomes,
        Vec::new(),
        Vec::new(),
    );

    (child, events)
}

fn splice_chromosomes(
    a: &Chromosome,
    b: &Chromosome,
    generation: u32,
    events: &mut Vec<MutationEvent>,
    rng: &mut impl Rng,
) -> Chromosome {
    let cut = rng.gen_range(0..a.genes.len().min(b.genes.len()));

    let genes: Vec<Gene> = a.genes[..cut]
        .iter()
        .chain(b.genes[cut..].iter())
        .map(|g| {
            let mut gene = g.clone();
            gene.id = GeneId::derived(&g.id, "x", rng);
            gene
        })
        .collect();

    events.push(MutationEvent {
        gene: GeneId::new(a.id.clone()),
        kind: MutationKind::Crossover,
        before: Some(json!({ "parent_a": a.genes.len(), "parent_b": b.genes.len() })),
        after: Some(json!(genes.len())),
        generation,
    });

    Chromosome {
        id: a.id.clone(),
        name: a.name.clone(),
        genes,
        is_essential: a.is_essential,
    }
}

fn reident_chromosome(c: &Chromosome, rng: &mut impl Rng) -> Chromosome {
    Chromosome {
        id: c.id.clone(),
        name: c.name.clone(),
        genes: c
            .genes
            .iter()
            .map(|g| {
                let mut gene = g.clone();
                gene.id = GeneId::derived(&g.id, "x", rng);
                gene
            })
            .collect(),
        is_essential: c.is_essential,
    }
}

/// Clone a randomly chosen gene in place within its chromosome: new id,
/// back-reference to the source, value x0.95, weight halved. Gene count +1.
pub fn gene_duplication(
    genome: &DynamicGenome,
    rng: &mut impl Rng,
) -> (DynamicGenome, MutationEvent) {
    let mut next = genome.clone();

    let ci = rng.gen_range(0..next.chromosomes.len());
    let gi = rng.gen_range(0..next.chromosomes[ci].genes.len());
    let source = next.chromosomes[ci].genes[gi].clone();

    let mut duplicated = source.clone();
    duplicated.id = GeneId::derived(&source.id, "dup", rng);
    duplicated.duplicate_of = Some(source.id.clone());
    duplicated.origin = GeneOrigin::Duplicated;
    duplicated.value = clamp_value(source.value * DUPLICATION_VALUE_FACTOR);
    duplicated.weight = clamp_weight(source.weight * DUPLICATION_WEIGHT_FACTOR);

    let event = MutationEvent {
        gene: duplicated.id.clone(),
        kind: MutationKind::Duplication,
        before: Some(json!(source.id.as_str())),
        after: Some(json!(duplicated.id.as_str())),
        generation: next.meta.generation,
    };

    next.chromosomes[ci].genes.push(duplicated);
    next.meta.total_genes += 1;
    next.rehash();
    (next, event)
}

/// Remove one randomly chosen gene with essentiality < 0.5.
///
/// Returns `None` for the event when no gene is eligible; the essential
/// set is never shrunk by this operator.
pub fn gene_deletion(
    genome: &DynamicGenome,
    rng: &mut impl Rng,
) -> (DynamicGenome, Option<MutationEvent>) {
    let mut next = genome.clone();

    let deletable: Vec<(usize, usize)> = next
        .chromosomes
        .iter()
        .enumerate()
        .flat_map(|(ci, c)| {
            c.genes
                .iter()
                .enumerate()
                .filter(|(_, g)| !g.is_essential())
                .map(move |(gi, _)| (ci, gi))
        })
        .collect();

    let Some(&(ci, gi)) = deletable.get(rng.gen_range(0..deletable.len().max(1))) else {
        return (next, None);
    };

    let removed = next.chromosomes[ci].genes.remove(gi);
    next.meta.total_genes -= 1;

    let event = MutationEvent {
        gene: removed.id.clone(),
        kind: MutationKind::Deletion,
        before: Some(json!({ "name": removed.name, "value": removed.value })),
        after: None,
        generation: next.meta.generation,
    };

    next.rehash();
    (next, Some(event))
}

/// Copy a gene from a donor agent's genome into a random chromosome of
/// the recipient: new id, weight x0.3, donor recorded. Gene count +1.
pub fn horizontal_transfer(
    recipient: &DynamicGenome,
    donor_gene: &Gene,
    donor: AgentId,
    rng: &mut impl Rng,
) -> (DynamicGenome, MutationEvent) {
    let mut next = recipient.clone();

    let mut transferred = donor_gene.clone();
    transferred.id = GeneId::derived(&donor_gene.id, "hgt", rng);
    transferred.acquired_from = Some(donor);
    transferred.origin = GeneOrigin::HorizontalTransfer;
    transferred.weight = clamp_weight(donor_gene.weight * HGT_WEIGHT_FACTOR);

    let event = MutationEvent {
        gene: transferred.id.clone(),
        kind: MutationKind::HorizontalTransfer,
        before: Some(json!(donor_gene.id.as_str())),
        after: Some(json!(transferred.id.as_str())),
        generation: next.meta.generation,
    };

    let ci = rng.gen_range(0..next.chromosomes.len());
    next.chromosomes[ci].genes.push(transferred);
    next.meta.total_genes += 1;
    next.rehash();
    (next, event)
}

/// Synthesize a brand-new gene: random domain, random value, low weight
/// and essentiality, inserted into a random chromosome. Gene count +1.
pub fn de_novo_gene(genome: &DynamicGenome, rng: &mut impl Rng) -> (DynamicGenome, MutationEvent) {
    let mut next = genome.clone();

    let domain = GeneDomain::ALL[rng.gen_range(0..GeneDomain::ALL.len())];
    let id = GeneId::fresh("novo", rng);
    let name = format!("novel_{}", &id.as_str()["novo-".len()..]);

    let gene = Gene {
        id: id.clone(),
        name,
        domain,
        value: rng.gen_range(0.0..1.0),
        weight: 0.1 + rng.gen_range(0.0..0.2),
        dominance: rng.gen_range(0.0..1.0),
        plasticity: rng.gen_range(0.0..0.5),
        essentiality: rng.gen_range(0.0..0.2),
        metabolic_cost: rng.gen_range(0.0..0.0001),
        origin: GeneOrigin::DeNovo,
        age: 0,
        duplicate_of: None,
        acquired_from: None,
        expression_state: ExpressionState::Active,
    };

    let event = MutationEvent {
        gene: id,
        kind: MutationKind::DeNovo,
        before: None,
        after: Some(json!({ "name": gene.name, "value": gene.value })),
        generation: next.meta.generation,
    };

    let ci = rng.gen_range(0..next.chromosomes.len());
    next.chromosomes[ci].genes.push(gene);
    next.meta.total_genes += 1;
    next.rehash();
    (next, event)
}

/// Map a flat gene index to (chromosome, gene) coordinates
fn locate(genome: &DynamicGenome, mut flat: usize) -> (usize, usize) {
    for (ci, c) in genome.chromosomes.iter().enumerate() {
        if flat < c.genes.len() {
            return (ci, flat);
        }
        flat -= c.genes.len();
    }
    // flat was taken modulo the live count, so the walk always lands
    (genome.chromosomes.len() - 1, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::founder_genome;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn seeded(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    #[test]
    fn test_point_mutation_preserves_gene_count() {
        let mut rng = seeded(10);
        let genome = founder_genome(&mut rng);

        let (mutated, event) = point_mutation(&genome, &mut rng);
        assert_eq!(mutated.meta.total_genes, genome.meta.total_genes);
        assert!(mutated.validate().is_ok());
        assert_eq!(event.kind, MutationKind::Point);
        // input untouched
        assert_eq!(genome.gene_count(), 63);
    }

    #[test]
    fn test_point_mutation_stays_in_bounds() {
        let mut rng = seeded(11);
        let mut genome = founder_genome(&mut rng);
        for _ in 0..500 {
            let (next, _) = point_mutation(&genome, &mut rng);
            genome = next;
        }
        for gene in genome.genes() {
            assert!((0.0..=1.0).contains(&gene.value));
        }
    }

    #[test]
    fn test_repeated_mutation_produces_variance() {
        let mut rng = seeded(12);
        let genome = founder_genome(&mut rng);

        let mut finals = Vec::with_capacity(1000);
        for _ in 0..1000 {
            let (mutated, event) = point_mutation(&genome, &mut rng);
            let after = event.after.unwrap().as_f64().unwrap();
            finals.push(after);
            assert!(mutated.validate().is_ok());
        }

        let mean = finals.iter().sum::<f64>() / finals.len() as f64;
        let variance = finals.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / finals.len() as f64;
        assert!(variance > 0.0, "mutation must never be a no-op in aggregate");
    }

    #[test]
    fn test_crossover_generation_and_shape() {
        let mut rng = seeded(13);
        let a = founder_genome(&mut rng);
        let b = founder_genome(&mut rng);

        let (child, _) = crossover(&a, &b, &mut rng);
        assert_eq!(child.meta.generation, a.meta.generation + 1);
        assert_eq!(child.chromosomes.len(), a.chromosomes.len());
        assert!(child.regulatory_network.is_empty());
        assert!(child.epigenome.is_empty());
        assert_ne!(child.meta.lineage, a.meta.lineage);
        assert!(child.validate().is_ok());
    }

    #[test]
    fn test_duplication_adds_exactly_one() {
        let mut rng = seeded(14);
        let genome = founder_genome(&mut rng);

        let (next, event) = gene_duplication(&genome, &mut rng);
        assert_eq!(next.meta.total_genes, genome.meta.total_genes + 1);
        assert!(next.validate().is_ok());

        let duplicated = next.find_gene_by_id(&event.gene).unwrap();
        assert_eq!(duplicated.origin, GeneOrigin::Duplicated);
        assert!(duplicated.duplicate_of.is_some());
    }

    #[test]
    fn test_deletion_removes_at_most_one_non_essential() {
        let mut rng = seeded(15);
        let genome = founder_genome(&mut rng);
        let essential_before = genome.essential_gene_count();

        let (next, event) = gene_deletion(&genome, &mut rng);
        assert!(event.is_some());
        assert_eq!(next.meta.total_genes, genome.meta.total_genes - 1);
        assert_eq!(next.essential_gene_count(), essential_before);
        assert!(next.validate().is_ok());
    }

    #[test]
    fn test_deletion_noop_when_all_essential() {
        let mut rng = seeded(16);
        let mut genome = founder_genome(&mut rng);
        for c in &mut genome.chromosomes {
            for g in &mut c.genes {
                g.essentiality = 0.9;
            }
        }

        let (next, event) = gene_deletion(&genome, &mut rng);
        assert!(event.is_none());
        assert_eq!(next.meta.total_genes, genome.meta.total_genes);
    }

    #[test]
    fn test_horizontal_transfer_records_donor() {
        let mut rng = seeded(17);
        let recipient = founder_genome(&mut rng);
        let donor_genome = founder_genome(&mut rng);
        let donor_gene = donor_genome.find_gene("risk_appetite").unwrap().clone();
        let donor = AgentId::new();

        let (next, event) = horizontal_transfer(&recipient, &donor_gene, donor, &mut rng);
        assert_eq!(next.meta.total_genes, recipient.meta.total_genes + 1);

        let transferred = next.find_gene_by_id(&event.gene).unwrap();
        assert_eq!(transferred.origin, GeneOrigin::HorizontalTransfer);
        assert_eq!(transferred.acquired_from, Some(donor));
        assert!((transferred.weight - clamp_weight(donor_gene.weight * 0.3)).abs() < 1e-12);
    }

    #[test]
    fn test_de_novo_adds_low_essentiality_gene() {
        let mut rng = seeded(18);
        let genome = founder_genome(&mut rng);

        let (next, event) = de_novo_gene(&genome, &mut rng);
        assert_eq!(next.meta.total_genes, genome.meta.total_genes + 1);

        let novel = next.find_gene_by_id(&event.gene).unwrap();
        assert_eq!(novel.origin, GeneOrigin::DeNovo);
        assert!(novel.essentiality < 0.2);
        assert!(novel.name.starts_with("novel_"));
    }
}
