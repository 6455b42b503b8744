//! # Oikos Environment
//!
//! Read-only policy catalogs the survival orchestrator draws from, plus
//! pure evaluation functions over them:
//!
//! - [`defi`]: yield opportunities agents lock capital into
//! - [`tasks`]: the human gig-task market
//! - [`hazards`]: per-agent negative events
//! - [`airdrops`]: token campaigns and price trajectories
//! - [`shocks`]: population-wide environmental shocks
//!
//! Every probability table is a tagged-variant policy type and every roll
//! takes `&mut impl Rng`, so the whole environment is deterministic under
//! a seeded rng.

pub mod airdrops;
pub mod defi;
pub mod hazards;
pub mod shocks;
pub mod tasks;

pub use airdrops::{
    check_eligibility, find_campaign, mint, pick_trajectory, revalue, AirdropCampaign, DefiStats,
    PriceTrajectory, TokenHolding, AIRDROP_CAMPAIGNS,
};
pub use defi::{
    find_opportunity, meets_gates, risk_adjusted_score, roll_daily_yield, sample_available,
    DefiKind, DefiOpportunity, DEFI_OPPORTUNITIES,
};
pub use hazards::{apply as apply_hazard, roll_events, HazardKind, HazardOutcome, NegativeEvent};
pub use shocks::{roll_shock, ShockEffect, ShockKind};
pub use tasks::{attempt, can_attempt, sample_daily, HumanTask, TaskKind, TaskOutcome};
