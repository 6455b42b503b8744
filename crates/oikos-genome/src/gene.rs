//! Gene-level data model
//!
//! A [`Gene`] is one heritable trait: a scalar value with a weight
//! multiplier, regulatory metadata, and an origin tag describing how it
//! entered the genome. Genes are grouped into named [`Chromosome`]s;
//! [`RegulatoryEdge`]s and [`EpigeneticMark`]s layer expression modifiers
//! on top of the raw values.

use oikos_common::AgentId;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Value bounds for a gene's scalar value
pub const GENE_VALUE_MIN: f64 = 0.0;
pub const GENE_VALUE_MAX: f64 = 1.0;

/// Bounds for a gene's weight multiplier
pub const GENE_WEIGHT_MIN: f64 = 0.1;
pub const GENE_WEIGHT_MAX: f64 = 3.0;

/// Essentiality at or above which a gene cannot be deleted
pub const ESSENTIALITY_PROTECTED: f64 = 0.5;

/// Stable identifier of one gene within a genome
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeneId(String);

impl GeneId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derive a fresh id from a parent id, keeping the ancestry readable
    /// in logs (`A01-dup-x3f9q2`).
    pub fn derived(parent: &GeneId, tag: &str, rng: &mut impl Rng) -> Self {
        Self(format!("{}-{}-{}", parent.0, tag, random_suffix(rng)))
    }

    /// Mint an id with no parent (de-novo genes)
    pub fn fresh(prefix: &str, rng: &mut impl Rng) -> Self {
        Self(format!("{}-{}", prefix, random_suffix(rng)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for GeneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn random_suffix(rng: &mut impl Rng) -> String {
    rng.sample_iter(Alphanumeric)
        .take(6)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect()
}

/// Functional category of a gene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GeneDomain {
    Metabolism,
    Cognition,
    ResourceMgmt,
    RiskAssessment,
    Trading,
    OnchainOp,
    WebNavigation,
    ContentCreation,
    DataAnalysis,
    ApiUtilization,
    SocialMedia,
    Cooperation,
    Competition,
    Communication,
    TrustModel,
    MateSelection,
    ParentalInvest,
    HumanHiring,
    HumanComm,
    HumanEval,
    StressResponse,
    Adaptation,
    Dormancy,
    Migration,
    SelfModel,
    StrategyEval,
    Learning,
    Planning,
    Regulatory,
}

impl GeneDomain {
    /// All domains, for uniform random selection (de-novo genes)
    pub const ALL: [GeneDomain; 29] = [
        GeneDomain::Metabolism,
        GeneDomain::Cognition,
        GeneDomain::ResourceMgmt,
        GeneDomain::RiskAssessment,
        GeneDomain::Trading,
        GeneDomain::OnchainOp,
        GeneDomain::WebNavigation,
        GeneDomain::ContentCreation,
        GeneDomain::DataAnalysis,
        GeneDomain::ApiUtilization,
        GeneDomain::SocialMedia,
        GeneDomain::Cooperation,
        GeneDomain::Competition,
        GeneDomain::Communication,
        GeneDomain::TrustModel,
        GeneDomain::MateSelection,
        GeneDomain::ParentalInvest,
        GeneDomain::HumanHiring,
        GeneDomain::HumanComm,
        GeneDomain::HumanEval,
        GeneDomain::StressResponse,
        GeneDomain::Adaptation,
        GeneDomain::Dormancy,
        GeneDomain::Migration,
        GeneDomain::SelfModel,
        GeneDomain::StrategyEval,
        GeneDomain::Learning,
        GeneDomain::Planning,
        GeneDomain::Regulatory,
    ];
}

/// How a gene entered the genome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GeneOrigin {
    Primordial,
    Inherited,
    Duplicated,
    Mutated,
    HorizontalTransfer,
    DeNovo,
}

/// Current expression state of a gene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpressionState {
    Active,
    Silenced,
    Conditional,
}

/// One heritable trait
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gene {
    /// Stable identifier within the genome
    pub id: GeneId,

    /// Human-readable name; expression lookups key on this
    pub name: String,

    /// Functional category
    pub domain: GeneDomain,

    /// Scalar trait value in [0, 1]
    pub value: f64,

    /// Weight multiplier in [0.1, 3.0]
    pub weight: f64,

    /// Reserved for diploid semantics
    pub dominance: f64,

    /// Reserved for environment-driven value drift
    pub plasticity: f64,

    /// >= 0.5 marks the gene non-deletable
    pub essentiality: f64,

    /// Per-day upkeep charged by the metabolism calculator
    pub metabolic_cost: f64,

    /// How this gene entered the genome
    pub origin: GeneOrigin,

    /// Generations this gene has survived
    pub age: u32,

    /// Source gene when this gene arose by duplication
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duplicate_of: Option<GeneId>,

    /// Donor agent when this gene arrived by horizontal transfer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acquired_from: Option<AgentId>,

    /// Expression state
    pub expression_state: ExpressionState,
}

impl Gene {
    /// Whether the deletion operator must leave this gene alone
    #[inline]
    pub fn is_essential(&self) -> bool {
        self.essentiality >= ESSENTIALITY_PROTECTED
    }
}

/// A named, ordered group of genes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chromosome {
    pub id: String,
    pub name: String,
    pub genes: Vec<Gene>,
    pub is_essential: bool,
}

/// Direction of a regulatory relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    Activation,
    Inhibition,
}

/// Directed edge in the regulatory network layered over raw gene values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegulatoryEdge {
    pub source: GeneId,
    pub target: GeneId,
    pub relation: Relation,
    /// Contribution magnitude in [0, 1]
    pub strength: f64,
}

impl RegulatoryEdge {
    /// Signed contribution given the source gene's value
    pub fn contribution(&self, source_value: f64) -> f64 {
        match self.relation {
            Relation::Activation => self.strength * source_value,
            Relation::Inhibition => -self.strength * source_value,
        }
    }
}

/// Expression modification applied by an epigenetic mark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modification {
    Upregulate,
    Downregulate,
    Silence,
    Activate,
}

/// A decaying, environment-induced modifier on one gene's expression
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpigeneticMark {
    pub target: GeneId,
    pub modification: Modification,
    pub strength: f64,
    /// What triggered the mark, for audit trails
    pub cause: String,
    /// Probability the mark survives into offspring
    pub heritability: f64,
    /// Per-generation strength decay rate
    pub decay: f64,
    pub generation_created: u32,
}

impl EpigeneticMark {
    /// Signed expression contribution of this mark
    pub fn contribution(&self) -> f64 {
        match self.modification {
            Modification::Upregulate | Modification::Activate => self.strength,
            Modification::Downregulate | Modification::Silence => -self.strength,
        }
    }
}

/// Clamp a gene value into its legal range
#[inline]
pub fn clamp_value(v: f64) -> f64 {
    v.clamp(GENE_VALUE_MIN, GENE_VALUE_MAX)
}

/// Clamp a gene weight into its legal range
#[inline]
pub fn clamp_weight(w: f64) -> f64 {
    w.clamp(GENE_WEIGHT_MIN, GENE_WEIGHT_MAX)
}
