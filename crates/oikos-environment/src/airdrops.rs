//! Airdrop campaigns and token price trajectories
//!
//! Agents who participate in DeFi occasionally receive speculative token
//! airdrops. Tokens are not cash: each holding follows a hidden price
//! trajectory and the agent must decide when (or whether) to sell.

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Shape of a token's price path after the airdrop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceTrajectory {
    PumpDump,
    SteadyGrowth,
    SlowDecay,
    RugPull,
    Moon,
}

/// Airdrop eligibility thresholds over an agent's DeFi history
#[derive(Debug, Clone, Copy)]
pub struct Eligibility {
    pub min_positions_opened: u64,
    pub min_capital_deployed: f64,
    pub min_ticks_active: u64,
}

/// One campaign in the airdrop table
#[derive(Debug, Clone)]
pub struct AirdropCampaign {
    pub id: &'static str,
    pub token_symbol: &'static str,
    pub token_name: &'static str,
    pub min_amount: f64,
    pub max_amount: f64,
    /// Initial per-token price range (USDC)
    pub price_min: f64,
    pub price_max: f64,
    pub volatility: f64,
    /// Per-tick probability for eligible agents
    pub probability: f64,
    pub eligibility: Eligibility,
    /// Trajectory distribution; weights sum to 1
    pub trajectory_weights: &'static [(PriceTrajectory, f64)],
}

pub static AIRDROP_CAMPAIGNS: &[AirdropCampaign] = &[
    AirdropCampaign {
        id: "gauge_governance",
        token_symbol: "GAUGE",
        token_name: "Gauge Governance",
        min_amount: 100.0,
        max_amount: 5000.0,
        price_min: 0.001,
        price_max: 0.005,
        volatility: 0.3,
        probability: 0.05,
        eligibility: Eligibility {
            min_positions_opened: 2,
            min_capital_deployed: 20.0,
            min_ticks_active: 7,
        },
        trajectory_weights: &[
            (PriceTrajectory::PumpDump, 0.3),
            (PriceTrajectory::SteadyGrowth, 0.3),
            (PriceTrajectory::SlowDecay, 0.3),
            (PriceTrajectory::RugPull, 0.05),
            (PriceTrajectory::Moon, 0.05),
        ],
    },
    AirdropCampaign {
        id: "new_protocol_launch",
        token_symbol: "NEWB",
        token_name: "NewDeFi Protocol",
        min_amount: 50.0,
        max_amount: 2000.0,
        price_min: 0.0005,
        price_max: 0.002,
        volatility: 0.6,
        probability: 0.02,
        eligibility: Eligibility {
            min_positions_opened: 1,
            min_capital_deployed: 10.0,
            min_ticks_active: 3,
        },
        trajectory_weights: &[
            (PriceTrajectory::PumpDump, 0.4),
            (PriceTrajectory::SteadyGrowth, 0.1),
            (PriceTrajectory::SlowDecay, 0.2),
            (PriceTrajectory::RugPull, 0.2),
            (PriceTrajectory::Moon, 0.1),
        ],
    },
    AirdropCampaign {
        id: "loyalty_reward",
        token_symbol: "LOYAL",
        token_name: "Platform Loyalty",
        min_amount: 200.0,
        max_amount: 1000.0,
        price_min: 0.0001,
        price_max: 0.0005,
        volatility: 0.2,
        probability: 0.08,
        eligibility: Eligibility {
            min_positions_opened: 5,
            min_capital_deployed: 50.0,
            min_ticks_active: 14,
        },
        trajectory_weights: &[
            (PriceTrajectory::PumpDump, 0.1),
            (PriceTrajectory::SteadyGrowth, 0.5),
            (PriceTrajectory::SlowDecay, 0.3),
            (PriceTrajectory::RugPull, 0.05),
            (PriceTrajectory::Moon, 0.05),
        ],
    },
];

/// A token position received from a campaign
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenHolding {
    pub id: Uuid,
    pub campaign_id: String,
    pub symbol: String,
    pub amount: f64,
    /// Value at airdrop time (cost basis)
    pub initial_value: f64,
    /// Mark-to-market value
    pub current_value: f64,
    pub volatility: f64,
    pub received_tick: u64,
}

impl TokenHolding {
    /// Unrealized profit and loss
    pub fn unrealized_pnl(&self) -> f64 {
        self.current_value - self.initial_value
    }

    /// PnL as a fraction of cost basis
    pub fn pnl_fraction(&self) -> f64 {
        if self.initial_value <= 0.0 {
            return 0.0;
        }
        self.unrealized_pnl() / self.initial_value
    }
}

/// An agent's DeFi track record, the input to eligibility checks
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DefiStats {
    pub positions_opened: u64,
    pub capital_deployed: f64,
}

/// Look up a campaign by id
pub fn find_campaign(id: &str) -> Option<&'static AirdropCampaign> {
    AIRDROP_CAMPAIGNS.iter().find(|c| c.id == id)
}

/// First campaign the agent qualifies for this tick, if its probability
/// roll also hits.
pub fn check_eligibility(
    stats: &DefiStats,
    ticks_active: u64,
    rng: &mut impl Rng,
) -> Option<&'static AirdropCampaign> {
    AIRDROP_CAMPAIGNS.iter().find(|campaign| {
        let e = &campaign.eligibility;
        stats.positions_opened >= e.min_positions_opened
            && stats.capital_deployed >= e.min_capital_deployed
            && ticks_active >= e.min_ticks_active
            && rng.gen_bool(campaign.probability)
    })
}

/// Mint a holding from a campaign hit
pub fn mint(campaign: &AirdropCampaign, tick: u64, rng: &mut impl Rng) -> TokenHolding {
    let amount = rng.gen_range(campaign.min_amount..=campaign.max_amount).floor();
    let price = rng.gen_range(campaign.price_min..=campaign.price_max);
    let value = amount * price;

    TokenHolding {
        id: Uuid::new_v4(),
        campaign_id: campaign.id.to_string(),
        symbol: campaign.token_symbol.to_string(),
        amount,
        initial_value: value,
        current_value: value,
        volatility: campaign.volatility,
        received_tick: tick,
    }
}

/// Sample a trajectory from a campaign's weight table
pub fn pick_trajectory(campaign: &AirdropCampaign, rng: &mut impl Rng) -> PriceTrajectory {
    let roll: f64 = rng.gen_range(0.0..1.0);
    let mut cumulative = 0.0;
    for (trajectory, weight) in campaign.trajectory_weights {
        cumulative += weight;
        if roll <= cumulative {
            return *trajectory;
        }
    }
    PriceTrajectory::SlowDecay
}

/// Mark-to-market value of a holding `ticks_held` ticks after receipt,
/// following the given trajectory.
pub fn revalue(
    holding: &TokenHolding,
    trajectory: PriceTrajectory,
    ticks_held: u64,
    rng: &mut impl Rng,
) -> f64 {
    if holding.amount <= 0.0 {
        return 0.0;
    }
    let initial_price = holding.initial_value / holding.amount;
    let t = ticks_held as f64;

    let price = match trajectory {
        PriceTrajectory::PumpDump => {
            if ticks_held <= 5 {
                initial_price * (1.0 + t * 0.2)
            } else {
                initial_price * 1.5 * 0.7_f64.powf(t - 5.0)
            }
        }
        PriceTrajectory::SteadyGrowth => {
            initial_price * 1.03_f64.powf(t) * (1.0 + rng.gen_range(-0.05..0.05))
        }
        PriceTrajectory::SlowDecay => initial_price * 0.95_f64.powf(t),
        PriceTrajectory::RugPull => {
            if ticks_held <= 3 {
                initial_price * (1.0 + t * 0.1)
            } else {
                initial_price * 0.01
            }
        }
        PriceTrajectory::Moon => {
            initial_price * 1.15_f64.powf(t) * (1.0 + rng.gen_range(-0.06..0.14))
        }
    };

    price.max(0.000001) * holding.amount
}
