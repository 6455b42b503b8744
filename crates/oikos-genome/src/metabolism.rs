//! Metabolism calculator
//!
//! Derives per-tick survival cost from gene-level maintenance costs plus
//! small upkeep for the regulatory network and epigenome.

use crate::genome::DynamicGenome;

/// Base maintenance unit in USDC per day
const GENE_MAINTENANCE_BASE: f64 = 0.0001;

/// Daily metabolic cost of carrying this genome
pub fn daily_cost(genome: &DynamicGenome) -> f64 {
    let gene_costs: f64 = genome.genes().map(|g| g.metabolic_cost).sum();
    let regulatory_cost = genome.regulatory_network.len() as f64 * GENE_MAINTENANCE_BASE * 0.1;
    let epigenetic_cost = genome.epigenome.len() as f64 * GENE_MAINTENANCE_BASE * 0.05;

    gene_costs + regulatory_cost + epigenetic_cost
}

/// Metabolic cost for one tick spanning `tick_hours` simulated hours
pub fn tick_cost(genome: &DynamicGenome, tick_hours: f64) -> f64 {
    daily_cost(genome) * (tick_hours / 24.0)
}

/// Days the given balance sustains this genome with zero income
pub fn runway_days(balance: f64, genome: &DynamicGenome) -> f64 {
    let daily = daily_cost(genome);
    if daily <= 0.0 {
        return f64::INFINITY;
    }
    balance / daily
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::founder_genome;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_daily_cost_is_positive_for_founder() {
        let mut rng = StdRng::seed_from_u64(5);
        let genome = founder_genome(&mut rng);
        assert!(daily_cost(&genome) > 0.0);
    }

    #[test]
    fn test_tick_cost_scales_with_hours() {
        let mut rng = StdRng::seed_from_u64(6);
        let genome = founder_genome(&mut rng);
        let daily = daily_cost(&genome);
        assert!((tick_cost(&genome, 12.0) - daily / 2.0).abs() < 1e-12);
        assert!((tick_cost(&genome, 24.0) - daily).abs() < 1e-12);
    }

    #[test]
    fn test_runway_inverse_to_cost() {
        let mut rng = StdRng::seed_from_u64(7);
        let genome = founder_genome(&mut rng);
        let runway = runway_days(30.0, &genome);
        assert!(runway > 0.0);
        assert!((runway - 30.0 / daily_cost(&genome)).abs() < 1e-9);
    }
}
