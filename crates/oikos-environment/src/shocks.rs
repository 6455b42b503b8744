//! Population-wide environmental shocks
//!
//! Before each tick the population manager rolls for one shock that
//! touches every agent: a market crash haircuts liquid balances, a
//! resource boom multiplies position yield for the tick, and a plague
//! hits random agents with direct losses.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Kind of environment-wide shock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShockKind {
    MarketCrash,
    ResourceBoom,
    Plague,
}

/// Per-tick probability of each shock
const SHOCK_TABLE: &[(ShockKind, f64)] = &[
    (ShockKind::MarketCrash, 0.02),
    (ShockKind::ResourceBoom, 0.03),
    (ShockKind::Plague, 0.01),
];

/// Concrete effect of a shock on this tick
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ShockEffect {
    pub kind: ShockKind,
    /// Fraction of each agent's liquid balance destroyed
    pub balance_haircut: f64,
    /// Multiplier on position yield accrual this tick
    pub yield_multiplier: f64,
    /// Per-agent probability of a plague hit
    pub hit_probability: f64,
    /// Fraction of balance lost on a plague hit
    pub hit_loss_fraction: f64,
}

impl ShockEffect {
    fn for_kind(kind: ShockKind) -> Self {
        match kind {
            ShockKind::MarketCrash => Self {
                kind,
                balance_haircut: 0.08,
                yield_multiplier: 1.0,
                hit_probability: 0.0,
                hit_loss_fraction: 0.0,
            },
            ShockKind::ResourceBoom => Self {
                kind,
                balance_haircut: 0.0,
                yield_multiplier: 1.5,
                hit_probability: 0.0,
                hit_loss_fraction: 0.0,
            },
            ShockKind::Plague => Self {
                kind,
                balance_haircut: 0.0,
                yield_multiplier: 1.0,
                hit_probability: 0.15,
                hit_loss_fraction: 0.10,
            },
        }
    }
}

/// Roll for this tick's shock; at most one fires.
pub fn roll_shock(rng: &mut impl Rng) -> Option<ShockEffect> {
    for (kind, probability) in SHOCK_TABLE {
        if rng.gen_bool(*probability) {
            return Some(ShockEffect::for_kind(*kind));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_shocks_are_rare_but_occur() {
        let mut rng = StdRng::seed_from_u64(61);
        let fired = (0..2000).filter(|_| roll_shock(&mut rng).is_some()).count();
        // ~6% combined probability per tick
        assert!(fired > 40);
        assert!(fired < 400);
    }

    #[test]
    fn test_crash_haircuts_boom_multiplies() {
        let crash = ShockEffect::for_kind(ShockKind::MarketCrash);
        assert!(crash.balance_haircut > 0.0);
        assert_eq!(crash.yield_multiplier, 1.0);

        let boom = ShockEffect::for_kind(ShockKind::ResourceBoom);
        assert_eq!(boom.balance_haircut, 0.0);
        assert!(boom.yield_multiplier > 1.0);

        let plague = ShockEffect::for_kind(ShockKind::Plague);
        assert!(plague.hit_probability > 0.0);
    }
}
