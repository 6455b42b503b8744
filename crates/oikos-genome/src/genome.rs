//! The aggregate genome
//!
//! [`DynamicGenome`] holds the chromosome list, the regulatory network,
//! and the epigenome, plus metadata with a content hash. The hash is an
//! identity/audit fingerprint over lineage, generation, and every gene's
//! (name, value, weight), not a security primitive.

use chrono::Utc;
use oikos_common::error::GenomeError;
use oikos_common::LineageId;
use serde::{Deserialize, Serialize};

use crate::gene::{Chromosome, EpigeneticMark, Gene, GeneDomain, GeneId, RegulatoryEdge};

/// Genome metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenomeMeta {
    /// 0 for founders, parentA.generation + 1 for offspring
    pub generation: u32,
    pub lineage: LineageId,
    /// Hex blake3 digest; recompute with [`DynamicGenome::compute_hash`]
    pub genome_hash: String,
    /// Must equal the sum of genes across chromosomes at all times
    pub total_genes: usize,
    /// Unix millis at creation
    pub birth_timestamp: i64,
}

/// A complete genome: chromosomes + regulatory network + epigenome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DynamicGenome {
    pub meta: GenomeMeta,
    pub chromosomes: Vec<Chromosome>,
    pub regulatory_network: Vec<RegulatoryEdge>,
    pub epigenome: Vec<EpigeneticMark>,
}

impl DynamicGenome {
    /// Assemble a genome and stamp its hash. `total_genes` is derived,
    /// never trusted from the caller.
    pub fn assemble(
        generation: u32,
        lineage: LineageId,
        chromosomes: Vec<Chromosome>,
        regulatory_network: Vec<RegulatoryEdge>,
        epigenome: Vec<EpigeneticMark>,
    ) -> Self {
        let total_genes = chromosomes.iter().map(|c| c.genes.len()).sum();
        let mut genome = Self {
            meta: GenomeMeta {
                generation,
                lineage,
                genome_hash: String::new(),
                total_genes,
                birth_timestamp: Utc::now().timestamp_millis(),
            },
            chromosomes,
            regulatory_network,
            epigenome,
        };
        genome.meta.genome_hash = genome.compute_hash();
        genome
    }

    /// Iterate every gene across all chromosomes
    pub fn genes(&self) -> impl Iterator<Item = &Gene> {
        self.chromosomes.iter().flat_map(|c| c.genes.iter())
    }

    /// Actual gene count (as opposed to the recorded meta counter)
    pub fn gene_count(&self) -> usize {
        self.chromosomes.iter().map(|c| c.genes.len()).sum()
    }

    /// Count of genes the deletion operator must not touch
    pub fn essential_gene_count(&self) -> usize {
        self.genes().filter(|g| g.is_essential()).count()
    }

    /// Find a gene by name (first match; founder names are unique)
    pub fn find_gene(&self, name: &str) -> Option<&Gene> {
        self.genes().find(|g| g.name == name)
    }

    /// Find a gene by id
    pub fn find_gene_by_id(&self, id: &GeneId) -> Option<&Gene> {
        self.genes().find(|g| &g.id == id)
    }

    /// All genes in one functional domain
    pub fn genes_in_domain(&self, domain: GeneDomain) -> impl Iterator<Item = &Gene> {
        self.genes().filter(move |g| g.domain == domain)
    }

    /// Deterministic digest over lineage, generation, and every gene's
    /// (name, value, weight).
    pub fn compute_hash(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.meta.lineage.as_uuid().as_bytes());
        hasher.update(&self.meta.generation.to_le_bytes());
        for gene in self.genes() {
            hasher.update(gene.name.as_bytes());
            hasher.update(&gene.value.to_le_bytes());
            hasher.update(&gene.weight.to_le_bytes());
        }
        hasher.finalize().to_hex().to_string()
    }

    /// Restamp the hash after structural edits (operators call this once
    /// per application, after adjusting `total_genes`).
    pub fn rehash(&mut self) {
        self.meta.genome_hash = self.compute_hash();
    }

    /// Check the gene-count invariant
    pub fn validate(&self) -> Result<(), GenomeError> {
        if self.chromosomes.is_empty() {
            return Err(GenomeError::Empty);
        }
        let actual = self.gene_count();
        if actual != self.meta.total_genes {
            return Err(GenomeError::GeneCountMismatch {
                recorded: self.meta.total_genes,
                actual,
            });
        }
        Ok(())
    }
}
