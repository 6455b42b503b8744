//! Negative event catalog
//!
//! Random losses rolled independently per agent each tick. No event
//! state is shared across agents, so one agent's market crash never
//! bleeds into another's roll. At most two events land per agent per
//! tick, and a single event can destroy at most 20% of the balance.

use oikos_common::NEGATIVE_EVENT_LOSS_CAP;
use oikos_genome::{ExpressionResult, TraitKey};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Maximum events applied to one agent in one tick
const MAX_EVENTS_PER_TICK: usize = 2;

/// Scale applied to the met-trait fraction when rolling avoidance
const AVOIDANCE_FACTOR: f64 = 0.7;

/// Category of a negative event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HazardKind {
    MarketCrash,
    Hack,
    Scam,
    Regulatory,
    Competition,
    Technical,
    Social,
}

/// One entry of the negative-event table
#[derive(Debug, Clone)]
pub struct NegativeEvent {
    pub id: &'static str,
    pub name: &'static str,
    pub kind: HazardKind,
    /// Absolute USDC loss range before the balance cap
    pub impact_min: f64,
    pub impact_max: f64,
    /// Per-tick probability of the event hitting an agent
    pub probability: f64,
    /// Whether matching traits can dodge the event entirely
    pub avoidable: bool,
    /// Trait thresholds that contribute to avoidance
    pub avoidance_traits: &'static [(TraitKey, f64)],
}

pub static NEGATIVE_EVENTS: &[NegativeEvent] = &[
    NegativeEvent {
        id: "market_pullback",
        name: "Market pullback",
        kind: HazardKind::MarketCrash,
        impact_min: 0.1,
        impact_max: 0.5,
        probability: 0.10,
        avoidable: false,
        avoidance_traits: &[],
    },
    NegativeEvent {
        id: "bear_capitulation",
        name: "Bear-market capitulation",
        kind: HazardKind::MarketCrash,
        impact_min: 0.3,
        impact_max: 1.2,
        probability: 0.03,
        avoidable: false,
        avoidance_traits: &[],
    },
    NegativeEvent {
        id: "black_swan",
        name: "Black swan headline",
        kind: HazardKind::MarketCrash,
        impact_min: 0.5,
        impact_max: 2.0,
        probability: 0.01,
        avoidable: false,
        avoidance_traits: &[],
    },
    NegativeEvent {
        id: "wallet_drained",
        name: "Wallet drained",
        kind: HazardKind::Hack,
        impact_min: 0.5,
        impact_max: 2.0,
        probability: 0.01,
        avoidable: true,
        avoidance_traits: &[(TraitKey::AnalyticalAbility, 0.8)],
    },
    NegativeEvent {
        id: "phishing_victim",
        name: "Phishing link signed",
        kind: HazardKind::Scam,
        impact_min: 0.2,
        impact_max: 1.0,
        probability: 0.05,
        avoidable: true,
        avoidance_traits: &[(TraitKey::AnalyticalAbility, 0.6)],
    },
    NegativeEvent {
        id: "fake_airdrop",
        name: "Malicious airdrop claim",
        kind: HazardKind::Scam,
        impact_min: 0.1,
        impact_max: 0.5,
        probability: 0.06,
        avoidable: true,
        avoidance_traits: &[(TraitKey::AnalyticalAbility, 0.5)],
    },
    NegativeEvent {
        id: "superior_competitor",
        name: "Sharper competitor enters",
        kind: HazardKind::Competition,
        impact_min: 0.1,
        impact_max: 0.4,
        probability: 0.08,
        avoidable: false,
        avoidance_traits: &[],
    },
    NegativeEvent {
        id: "price_undercut",
        name: "Price war",
        kind: HazardKind::Competition,
        impact_min: 0.05,
        impact_max: 0.3,
        probability: 0.10,
        avoidable: false,
        avoidance_traits: &[],
    },
    NegativeEvent {
        id: "node_outage",
        name: "RPC node outage",
        kind: HazardKind::Technical,
        impact_min: 0.02,
        impact_max: 0.15,
        probability: 0.12,
        avoidable: false,
        avoidance_traits: &[],
    },
    NegativeEvent {
        id: "failed_transaction",
        name: "Transaction reverted",
        kind: HazardKind::Technical,
        impact_min: 0.01,
        impact_max: 0.05,
        probability: 0.15,
        avoidable: true,
        avoidance_traits: &[(TraitKey::OnchainAffinity, 0.5)],
    },
    NegativeEvent {
        id: "api_rate_limit",
        name: "API rate-limited",
        kind: HazardKind::Technical,
        impact_min: 0.01,
        impact_max: 0.08,
        probability: 0.10,
        avoidable: true,
        avoidance_traits: &[(TraitKey::AnalyticalAbility, 0.6)],
    },
];

/// Result of applying one negative event to an agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HazardOutcome {
    pub event_id: String,
    pub avoided: bool,
    /// Actual loss after the balance cap (0 when avoided)
    pub loss: f64,
}

/// Roll this tick's events for one agent. Fully independent per call.
pub fn roll_events(rng: &mut impl Rng) -> Vec<&'static NegativeEvent> {
    let mut triggered = Vec::new();
    for event in NEGATIVE_EVENTS {
        if triggered.len() >= MAX_EVENTS_PER_TICK {
            break;
        }
        if rng.gen_bool(event.probability) {
            triggered.push(event);
        }
    }
    triggered
}

/// Apply one event: roll avoidance from the fraction of avoidance traits
/// the agent meets, then cap the loss at 20% of balance. An avoidable
/// event whose traits are all unmet resolves to avoidance probability 0
/// and always lands.
pub fn apply(
    event: &NegativeEvent,
    balance: f64,
    expression: &ExpressionResult,
    rng: &mut impl Rng,
) -> HazardOutcome {
    if event.avoidable && !event.avoidance_traits.is_empty() {
        let met = event
            .avoidance_traits
            .iter()
            .filter(|(key, threshold)| expression.trait_value(*key) >= *threshold)
            .count();
        let avoidance = met as f64 / event.avoidance_traits.len() as f64 * AVOIDANCE_FACTOR;
        if avoidance > 0.0 && rng.gen_range(0.0..1.0) < avoidance {
            return HazardOutcome {
                event_id: event.id.to_string(),
                avoided: true,
                loss: 0.0,
            };
        }
    }

    let raw = rng.gen_range(event.impact_min..=event.impact_max);
    HazardOutcome {
        event_id: event.id.to_string(),
        avoided: false,
        loss: raw.min(balance * NEGATIVE_EVENT_LOSS_CAP).max(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oikos_genome::{express, founder_genome};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn expression() -> ExpressionResult {
        let mut rng = StdRng::seed_from_u64(41);
        express(&founder_genome(&mut rng))
    }

    #[test]
    fn test_at_most_two_events_per_tick() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            assert!(roll_events(&mut rng).len() <= MAX_EVENTS_PER_TICK);
        }
    }

    #[test]
    fn test_loss_capped_at_twenty_percent() {
        let mut rng = StdRng::seed_from_u64(43);
        let e = expression();
        let swan = NEGATIVE_EVENTS.iter().find(|n| n.id == "black_swan").unwrap();

        for _ in 0..100 {
            let outcome = apply(swan, 1.0, &e, &mut rng);
            assert!(outcome.loss <= 0.2 + 1e-12);
        }
    }

    #[test]
    fn test_unmet_avoidance_traits_always_land() {
        let mut rng = StdRng::seed_from_u64(44);
        let mut e = expression();
        e.analytical_ability = 0.0;
        let phishing = NEGATIVE_EVENTS
            .iter()
            .find(|n| n.id == "phishing_victim")
            .unwrap();

        for _ in 0..200 {
            let outcome = apply(phishing, 10.0, &e, &mut rng);
            assert!(!outcome.avoided);
            assert!(outcome.loss > 0.0);
        }
    }

    #[test]
    fn test_met_avoidance_traits_sometimes_dodge() {
        let mut rng = StdRng::seed_from_u64(45);
        let mut e = expression();
        e.analytical_ability = 0.95;
        let phishing = NEGATIVE_EVENTS
            .iter()
            .find(|n| n.id == "phishing_victim")
            .unwrap();

        let avoided = (0..500)
            .filter(|_| apply(phishing, 10.0, &e, &mut rng).avoided)
            .count();
        // Expected avoidance rate 0.7
        assert!(avoided > 250);
    }
}
