//! # Oikos Runtime
//!
//! The survival loop and population layer of the Oikos digital-organism
//! economy:
//!
//! - [`survival`]: per-agent state and the nine-phase tick orchestrator
//! - [`decision`]: perception, strategies, the decision-provider boundary,
//!   and emergent-behavior classification
//! - [`population`]: the agent collection, environmental shocks, breeding
//!   fulfilment, carrying-capacity culling, and the four termination
//!   conditions
//! - [`journal`]: append-only record sinks
//! - [`config`]: env-layered simulation configuration
//!
//! Scheduling is single-threaded cooperative: one tick advances every
//! agent sequentially, and the only suspension point is the decision
//! provider's async call.

pub mod config;
pub mod decision;
pub mod journal;
pub mod naming;
pub mod population;
pub mod survival;

pub use config::SimulationConfig;
pub use decision::{
    Decision, DecisionProvider, EmergentClassifier, EmergentFlag, HeuristicProvider,
    KeywordClassifier, NullClassifier, Perception, PopulationView, ScriptedProvider,
};
pub use journal::{BirthRecord, InferenceRecord, Journal, JsonlJournal, NullJournal, TickRecord};
pub use naming::NameRegistry;
pub use population::{
    Population, PopulationStats, TerminationCondition, TerminationReport,
};
pub use survival::{
    Agent, BreedingRequest, DeathCause, DevelopmentStage, MateCandidate, SurvivalState,
    SurvivalStatus, TickDeps, TickReport, Tombstone,
};
