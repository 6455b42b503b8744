//! Development stages
//!
//! Agents move through neonate, juvenile, adult, and senescent stages.
//! Stage modulates metabolism and mutation pressure, gates reproduction,
//! and protects newborns from death checks.

use oikos_common::{SENESCENCE_BASE_DEATH_RATE, SENESCENCE_START_TICK};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Ticks spent as a neonate
pub const NEONATE_DURATION: u64 = 5;

/// Further ticks spent as a juvenile
pub const JUVENILE_DURATION: u64 = 10;

/// Fraction of max lifespan at which senescence begins
const SENESCENT_LIFESPAN_FRACTION: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DevelopmentStage {
    Neonate,
    Juvenile,
    Adult,
    Senescent,
}

/// Stage plus its gameplay modifiers
#[derive(Debug, Clone, Copy)]
pub struct StageInfo {
    pub stage: DevelopmentStage,
    pub can_reproduce: bool,
    pub protected_from_death: bool,
    pub mutation_rate_multiplier: f64,
    pub metabolism_multiplier: f64,
}

/// Stage for an agent of the given age and genome-derived max lifespan
pub fn determine_stage(tick: u64, max_lifespan: u64) -> StageInfo {
    if tick < NEONATE_DURATION {
        return StageInfo {
            stage: DevelopmentStage::Neonate,
            can_reproduce: false,
            protected_from_death: true,
            mutation_rate_multiplier: 2.0,
            metabolism_multiplier: 0.8,
        };
    }

    if tick < NEONATE_DURATION + JUVENILE_DURATION {
        return StageInfo {
            stage: DevelopmentStage::Juvenile,
            can_reproduce: false,
            protected_from_death: false,
            mutation_rate_multiplier: 1.2,
            metabolism_multiplier: 1.0,
        };
    }

    let senescence_threshold = (max_lifespan as f64 * SENESCENT_LIFESPAN_FRACTION) as u64;
    if tick > senescence_threshold {
        return StageInfo {
            stage: DevelopmentStage::Senescent,
            can_reproduce: true,
            protected_from_death: false,
            mutation_rate_multiplier: 1.5,
            metabolism_multiplier: 1.5,
        };
    }

    StageInfo {
        stage: DevelopmentStage::Adult,
        can_reproduce: true,
        protected_from_death: false,
        mutation_rate_multiplier: 1.0,
        metabolism_multiplier: 1.0,
    }
}

/// Roll for old-age death. Only fires past the senescence start tick;
/// the chance rises with age and caps at 50% per tick.
pub fn senescence_roll(tick: u64, rng: &mut impl Rng) -> bool {
    if tick < SENESCENCE_START_TICK {
        return false;
    }
    let chance =
        SENESCENCE_BASE_DEATH_RATE + (tick - SENESCENCE_START_TICK) as f64 * 0.001;
    rng.gen_bool(chance.min(0.5))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_stage_progression() {
        assert_eq!(determine_stage(0, 1000).stage, DevelopmentStage::Neonate);
        assert_eq!(determine_stage(7, 1000).stage, DevelopmentStage::Juvenile);
        assert_eq!(determine_stage(15, 1000).stage, DevelopmentStage::Adult);
        assert_eq!(determine_stage(900, 1000).stage, DevelopmentStage::Senescent);
    }

    #[test]
    fn test_neonates_cannot_reproduce_and_are_protected() {
        let info = determine_stage(2, 1000);
        assert!(!info.can_reproduce);
        assert!(info.protected_from_death);
        assert!(info.metabolism_multiplier < 1.0);
    }

    #[test]
    fn test_senescents_burn_hotter() {
        let info = determine_stage(990, 1000);
        assert!(info.can_reproduce);
        assert!(info.metabolism_multiplier > 1.0);
    }

    #[test]
    fn test_no_senescence_roll_before_start_tick() {
        let mut rng = StdRng::seed_from_u64(101);
        for _ in 0..200 {
            assert!(!senescence_roll(100, &mut rng));
        }
    }

    #[test]
    fn test_senescence_roll_fires_eventually() {
        let mut rng = StdRng::seed_from_u64(102);
        let fired = (0..200).any(|_| senescence_roll(600, &mut rng));
        assert!(fired);
    }
}
