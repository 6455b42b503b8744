//! Agent name assignment
//!
//! Every agent gets a human-readable name picked from a pool matching its
//! dominant expressed trait. The registry is owned by the population
//! manager; nothing here is global.

use std::collections::HashMap;

use oikos_common::AgentId;
use oikos_genome::ExpressionResult;
use rand::Rng;

const ANALYTICAL: &[&str] = &["Descartes", "Turing", "Leibniz", "Russell", "Hilbert", "Shannon"];
const CREATIVE: &[&str] = &["DaVinci", "VanGogh", "Mozart", "Basho", "Kahlo", "Picasso"];
const SOCIAL: &[&str] = &["Confucius", "Socrates", "Gandhi", "Mandela", "Addams", "Douglass"];
const RISK_TAKER: &[&str] = &["Magellan", "Amundsen", "Earhart", "Shackleton", "Gagarin", "Tereshkova"];
const CONSERVATIVE: &[&str] = &["Graham", "Munger", "Bogle", "Fabius", "Kutuzov", "Washington"];
const HYBRID: &[&str] = &["Archimedes", "Newton", "Einstein", "Feynman", "Curie", "Noether"];

/// Name registry keyed by agent identity
#[derive(Debug, Default)]
pub struct NameRegistry {
    names: HashMap<AgentId, String>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign (or return the existing) name for an agent, choosing the
    /// pool from its strongest expressed tendency.
    pub fn assign(
        &mut self,
        agent: AgentId,
        expression: &ExpressionResult,
        rng: &mut impl Rng,
    ) -> String {
        if let Some(existing) = self.names.get(&agent) {
            return existing.clone();
        }

        let pool = if expression.analytical_ability > 0.7 {
            ANALYTICAL
        } else if expression.creative_ability > 0.7 {
            CREATIVE
        } else if expression.cooperation_tendency > 0.7 {
            SOCIAL
        } else if expression.risk_appetite > 0.7 {
            RISK_TAKER
        } else if expression.risk_appetite < 0.3 {
            CONSERVATIVE
        } else {
            HYBRID
        };

        let base = pool[rng.gen_range(0..pool.len())];
        let name = format!("{}-{}", base, agent.short());
        self.names.insert(agent, name.clone());
        name
    }

    /// Name for an agent, falling back to the id form
    pub fn get(&self, agent: &AgentId) -> String {
        self.names
            .get(agent)
            .cloned()
            .unwrap_or_else(|| agent.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oikos_genome::{express, founder_genome};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_assignment_is_stable() {
        let mut rng = StdRng::seed_from_u64(71);
        let expression = express(&founder_genome(&mut rng));
        let mut registry = NameRegistry::new();
        let agent = AgentId::new();

        let first = registry.assign(agent, &expression, &mut rng);
        let second = registry.assign(agent, &expression, &mut rng);
        assert_eq!(first, second);
        assert_eq!(registry.get(&agent), first);
    }

    #[test]
    fn test_analytical_agents_draw_from_analytical_pool() {
        let mut rng = StdRng::seed_from_u64(72);
        let mut expression = express(&founder_genome(&mut rng));
        expression.analytical_ability = 0.95;

        let mut registry = NameRegistry::new();
        let name = registry.assign(AgentId::new(), &expression, &mut rng);
        assert!(ANALYTICAL.iter().any(|n| name.starts_with(n)));
    }

    #[test]
    fn test_unknown_agent_falls_back_to_id() {
        let registry = NameRegistry::new();
        let agent = AgentId::new();
        assert_eq!(registry.get(&agent), agent.to_string());
    }
}
