//! Decision boundary: perception, strategies, the provider trait, and
//! emergent-behavior classification.

pub mod emergent;
pub mod perception;
pub mod provider;
pub mod strategy;

pub use emergent::{EmergentClassifier, EmergentFlag, KeywordClassifier, NullClassifier};
pub use perception::{environment_mode, stress_level, EnvironmentMode, Perception, PopulationView};
pub use provider::{
    decide_with_fallback, Decision, DecisionProvider, HeuristicProvider, ScriptedProvider,
};
pub use strategy::{
    emergency_strategies, filter_strategies, is_emergency, Strategy, StrategyKind, TimeHorizon,
    STRATEGIES,
};
