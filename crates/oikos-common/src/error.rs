//! Error types for the Oikos simulation
//!
//! Provides a unified error type and domain-specific error variants.
//!
//! Most runtime failures are not errors here: decision-provider failures
//! are recovered as idle fallback decisions, insufficient funds become
//! partial payments or skipped phases, and death conditions are ordinary
//! state transitions. What remains is genuinely exceptional: broken
//! configuration at startup, journal I/O, and invariant breaches that get
//! translated into a genetic death cause by the caller.

use thiserror::Error;

/// Result type alias using OikosError
pub type Result<T> = std::result::Result<T, OikosError>;

/// Unified error type for Oikos operations
#[derive(Debug, Error)]
pub enum OikosError {
    // Wallet errors
    #[error("Wallet error: {0}")]
    Wallet(#[from] crate::types::wallet::WalletError),

    // Genome errors
    #[error("Genome error: {0}")]
    Genome(#[from] GenomeError),

    // Decision-provider errors (recovered locally, surfaced for logging)
    #[error("Decision provider error: {0}")]
    Decision(String),

    // Journal/persistence errors
    #[error("Journal error: {0}")]
    Journal(String),

    // Configuration errors (fatal at process start only)
    #[error("Configuration error: {0}")]
    Config(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    // Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Genome-integrity errors
#[derive(Debug, Error)]
pub enum GenomeError {
    #[error("Gene count mismatch: meta records {recorded}, chromosomes hold {actual}")]
    GeneCountMismatch { recorded: usize, actual: usize },

    #[error("Genome has no chromosomes")]
    Empty,

    #[error("Essential gene count below viability floor: {count} < {floor}")]
    EssentialCollapse { count: usize, floor: usize },
}

// Implement From for common external error types
impl From<serde_json::Error> for OikosError {
    fn from(err: serde_json::Error) -> Self {
        OikosError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for OikosError {
    fn from(err: std::io::Error) -> Self {
        OikosError::Journal(err.to_string())
    }
}

impl From<anyhow::Error> for OikosError {
    fn from(err: anyhow::Error) -> Self {
        OikosError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = OikosError::Genome(GenomeError::GeneCountMismatch {
            recorded: 63,
            actual: 62,
        });
        assert!(err.to_string().contains("63"));
        assert!(err.to_string().contains("62"));
    }

    #[test]
    fn test_essential_collapse_display() {
        let err = GenomeError::EssentialCollapse {
            count: 12,
            floor: 20,
        };
        assert!(err.to_string().contains("12 < 20"));
    }
}
