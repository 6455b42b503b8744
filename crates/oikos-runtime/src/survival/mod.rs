//! The survival loop: per-agent state, lifecycle, and the nine-phase
//! tick orchestrator.

pub mod breeding;
pub mod death;
pub mod development;
pub mod orchestrator;
pub mod phases;
pub mod state;

pub use breeding::{can_breed, select_mate, BreedingRequest, MateCandidate};
pub use death::{check_death, make_tombstone, update_dying_status, DeathCause, Tombstone};
pub use development::{determine_stage, senescence_roll, DevelopmentStage, StageInfo};
pub use orchestrator::{run_tick, Agent, TickDeps, TickReport};
pub use phases::TickContext;
pub use state::{
    ActionRecord, DefiPosition, EarningsBreakdown, EventRecord, PhaseOutcome, SpendingBreakdown,
    SurvivalState, SurvivalStatus, TokenPortfolio,
};
