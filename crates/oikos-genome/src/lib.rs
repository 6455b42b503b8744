//! # Oikos Genome
//!
//! The genome engine of the Oikos digital-organism economy: the heritable
//! data model and the genetic machinery that turns it into behavior.
//!
//! ## Layers
//!
//! - [`gene`]: genes, chromosomes, regulatory edges, epigenetic marks
//! - [`defaults`] + [`factory`]: the 63-gene founder template and the
//!   perturbed founder genomes built from it
//! - [`operators`]: the six genetic operators (point mutation, crossover,
//!   duplication, deletion, horizontal transfer, de-novo emergence), all
//!   pure `(genome, ..) -> (genome, event)` functions
//! - [`epigenetics`]: environment-conditioned expression marks with
//!   generational decay
//! - [`expression`]: genotype -> phenotype resolution into a bounded
//!   trait vector
//! - [`metabolism`]: genome-derived survival cost
//!
//! Every randomized function takes `&mut impl Rng`, so callers decide
//! between `thread_rng` in production and seeded rngs in tests.

pub mod defaults;
pub mod epigenetics;
pub mod expression;
pub mod factory;
pub mod gene;
pub mod genome;
pub mod metabolism;
pub mod operators;

// Re-export core types at crate root
pub use epigenetics::{apply_epigenetics, decay_marks, EnvironmentSample};
pub use expression::{domain_average, effective_value, express, ExpressionResult, TraitKey};
pub use factory::founder_genome;
pub use gene::{
    Chromosome, EpigeneticMark, ExpressionState, Gene, GeneDomain, GeneId, GeneOrigin,
    Modification, RegulatoryEdge, Relation,
};
pub use genome::{DynamicGenome, GenomeMeta};
pub use operators::{
    crossover, de_novo_gene, gene_deletion, gene_duplication, horizontal_transfer, point_mutation,
    MutationEvent, MutationKind,
};
