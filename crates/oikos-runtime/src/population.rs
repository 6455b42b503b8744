//! Population manager
//!
//! Owns the agent collection and everything that crosses agent
//! boundaries: the balance ledger, the name registry, environmental
//! shocks, breeding fulfilment, carrying-capacity culling, and the four
//! global termination conditions. Agents are inserted at birth and
//! flagged dead (never concurrently mutated); the per-agent survival
//! state is touched only through the orchestrator.

use std::collections::HashMap;
use std::path::Path;

use oikos_common::{
    money, money_f64, AgentId, BalanceLedger, BREEDING_COST_PER_PARENT,
    ECONOMIC_DOMINANCE_RATIO, ECONOMIC_MIN_POPULATION, EMERGENT_BEHAVIOR_STOP_COUNT,
    InMemoryLedger, LINEAGE_DOMINANCE_RATIO, LINEAGE_MIN_POPULATION, MAX_GENE_COUNT,
    MAX_POPULATION, MIN_GENE_COUNT, OFFSPRING_INITIAL_BALANCE, OVERCROWDING_THRESHOLD, Result,
    SURVIVAL_MIN_SAMPLES, SURVIVAL_OUTLIER_MULTIPLIER, BASE_DELETION_RATE, BASE_DE_NOVO_RATE,
    BASE_DUPLICATION_RATE, BASE_HGT_RATE, BASE_MUTATION_RATE,
};
use oikos_genome::{
    crossover, de_novo_gene, express, founder_genome, gene_deletion, gene_duplication,
    horizontal_transfer, point_mutation, DynamicGenome,
};
use oikos_environment::{roll_shock, ShockEffect};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::SimulationConfig;
use crate::decision::{DecisionProvider, EmergentClassifier, PopulationView};
use crate::journal::{BirthRecord, Journal, ShockRecord};
use crate::naming::NameRegistry;
use crate::survival::{
    make_tombstone, run_tick, Agent, BreedingRequest, DeathCause, MateCandidate, TickDeps,
    Tombstone,
};

/// Per-tick population statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationStats {
    pub tick: u64,
    pub total_agents: usize,
    pub alive: usize,
    pub deaths_total: u64,
    pub breeding_events: u64,
    pub average_balance: f64,
    pub median_balance: f64,
    pub min_balance: f64,
    pub max_balance: f64,
    pub average_age: f64,
    pub oldest_age: u64,
    pub emergent_count: u64,
}

/// Which global condition ended the experiment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationCondition {
    /// A: one founder's descendants dominate the population
    LineageDominance,
    /// B: one agent holds most of the economy
    EconomicDominance,
    /// C: an agent outlives early generations several times over
    OutlierSurvival,
    /// D: emergent decisions accumulated past the stop count
    EmergentAccumulation,
}

impl TerminationCondition {
    pub fn code(&self) -> char {
        match self {
            TerminationCondition::LineageDominance => 'A',
            TerminationCondition::EconomicDominance => 'B',
            TerminationCondition::OutlierSurvival => 'C',
            TerminationCondition::EmergentAccumulation => 'D',
        }
    }
}

impl std::fmt::Display for TerminationCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Report handed to the process supervisor after each tick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerminationReport {
    pub triggered: bool,
    pub condition: Option<TerminationCondition>,
    pub agent_id: Option<AgentId>,
    pub detail: String,
}

impl TerminationReport {
    fn none() -> Self {
        Self {
            triggered: false,
            condition: None,
            agent_id: None,
            detail: String::new(),
        }
    }
}

/// Serializable slice of a population for snapshots
#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    tick: u64,
    breeding_events: u64,
    death_events: u64,
    emergent_count: u64,
    agents: Vec<Agent>,
    tombstones: Vec<Tombstone>,
}

/// The population and its shared collaborators
pub struct Population {
    agents: HashMap<AgentId, Agent>,
    tombstones: Vec<Tombstone>,
    names: NameRegistry,
    ledger: Box<dyn BalanceLedger>,
    provider: Box<dyn DecisionProvider>,
    classifier: Box<dyn EmergentClassifier>,
    journal: Box<dyn Journal>,
    config: SimulationConfig,
    rng: StdRng,

    tick: u64,
    breeding_events: u64,
    death_events: u64,
    deaths_last_tick: u64,
    emergent_count: u64,
}

impl Population {
    pub fn new(
        config: SimulationConfig,
        provider: Box<dyn DecisionProvider>,
        classifier: Box<dyn EmergentClassifier>,
        journal: Box<dyn Journal>,
    ) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            agents: HashMap::new(),
            tombstones: Vec::new(),
            names: NameRegistry::new(),
            ledger: Box::new(InMemoryLedger::new()),
            provider,
            classifier,
            journal,
            config,
            rng,
            tick: 0,
            breeding_events: 0,
            death_events: 0,
            deaths_last_tick: 0,
            emergent_count: 0,
        }
    }

    /// Create the founder generation
    pub async fn initialize(&mut self) {
        for _ in 0..self.config.initial_agents {
            let genome = founder_genome(&mut self.rng);
            let expression = express(&genome);
            let id = AgentId::new();
            let name = self.names.assign(id, &expression, &mut self.rng);
            let balance = money(self.config.initial_balance);

            let agent = Agent::founder(id, name.clone(), genome, balance);
            self.ledger.set_balance(&id, balance);

            let record = BirthRecord {
                tick: 0,
                agent_id: id,
                name,
                parent_a: None,
                parent_b: None,
                generation: 0,
                initial_balance: balance,
            };
            if let Err(error) = self.journal.birth(&record).await {
                warn!(%error, "journal birth write failed");
            }

            self.agents.insert(id, agent);
        }
        info!(count = self.config.initial_agents, "founder generation created");
    }

    /// Insert a pre-built agent (snapshot restore, scenario setup)
    pub fn insert_agent(&mut self, agent: Agent) {
        self.ledger.set_balance(&agent.id, agent.state.total_balance());
        self.agents.insert(agent.id, agent);
    }

    /// Advance the whole population by one tick
    pub async fn run_tick(&mut self) -> PopulationStats {
        self.tick += 1;
        let deaths_before = self.death_events;

        // Environment-wide shock, applied before any agent runs
        let shock = roll_shock(&mut self.rng);
        let yield_multiplier = match &shock {
            Some(effect) => effect.yield_multiplier,
            None => 1.0,
        };
        if let Some(effect) = shock {
            self.apply_shock(&effect).await;
        }

        // Pre-tick snapshot: agents read each other only through this
        let snapshot: Vec<MateCandidate> = self
            .living()
            .map(|a| MateCandidate {
                id: a.id,
                balance: money_f64(a.state.total_balance()),
                generation: a.generation(),
                genome_hash: a.genome.meta.genome_hash.clone(),
            })
            .collect();

        let view = PopulationView {
            count: snapshot.len(),
            average_balance: if snapshot.is_empty() {
                0.0
            } else {
                snapshot.iter().map(|c| c.balance).sum::<f64>() / snapshot.len() as f64
            },
            recent_deaths: self.deaths_last_tick,
        };

        let living_ids: Vec<AgentId> = self.living().map(|a| a.id).collect();
        let mut breeding_requests: Vec<BreedingRequest> = Vec::new();

        for id in living_ids {
            let deps = TickDeps {
                provider: self.provider.as_ref(),
                classifier: self.classifier.as_ref(),
                journal: self.journal.as_ref(),
                config: &self.config,
            };
            let Some(agent) = self.agents.get_mut(&id) else {
                continue;
            };
            if !agent.is_alive() {
                continue;
            }

            let report = run_tick(
                agent,
                &deps,
                &snapshot,
                &view,
                yield_multiplier,
                &mut self.rng,
            )
            .await;

            self.emergent_count += report.emergent_decisions;

            if let Some(tombstone) = report.tombstone {
                self.ledger.remove(&tombstone.agent_id);
                self.tombstones.push(tombstone);
                self.death_events += 1;
            } else {
                let balance = self.agents[&id].state.total_balance();
                self.ledger.set_balance(&id, balance);
                if let Some(request) = report.breeding_request {
                    breeding_requests.push(request);
                }
            }
        }

        for request in breeding_requests {
            self.fulfil_breeding(request).await;
        }

        self.cull_overcrowding().await;

        self.deaths_last_tick = self.death_events - deaths_before;
        self.stats()
    }

    async fn apply_shock(&mut self, effect: &ShockEffect) {
        info!(kind = ?effect.kind, "environmental shock");
        let record = ShockRecord {
            tick: self.tick,
            kind: format!("{:?}", effect.kind).to_lowercase(),
        };
        if let Err(error) = self.journal.shock(&record).await {
            warn!(%error, "journal shock write failed");
        }

        let ids: Vec<AgentId> = self.living().map(|a| a.id).collect();
        for id in ids {
            let hit = effect.hit_probability > 0.0 && self.rng.gen_bool(effect.hit_probability);
            let Some(agent) = self.agents.get_mut(&id) else {
                continue;
            };

            if effect.balance_haircut > 0.0 {
                let cut = money(money_f64(agent.state.wallet.liquid) * effect.balance_haircut);
                let paid = agent.state.wallet.debit_up_to(cut);
                agent.state.total_spent.losses += paid;
            }
            if hit {
                let loss = money(
                    money_f64(agent.state.total_balance()) * effect.hit_loss_fraction,
                );
                let paid = agent.state.wallet.debit_up_to(loss);
                agent.state.total_spent.losses += paid;
                agent
                    .state
                    .record_event(self.tick, "struck by plague".to_string());
            }
        }
    }

    /// Fulfil a breeding request: the mate pays its share, the child
    /// genome recombines through crossover plus birth-time operator
    /// rolls, and the offspring joins the population under the ceiling.
    async fn fulfil_breeding(&mut self, request: BreedingRequest) {
        if self.living().count() >= MAX_POPULATION {
            info!(parent = %request.parent, "breeding dropped: population ceiling");
            return;
        }

        let Some(parent) = self.agents.get(&request.parent) else {
            return;
        };
        let Some(mate) = self.agents.get(&request.mate) else {
            return;
        };
        if !parent.is_alive() || !mate.is_alive() {
            return;
        }

        let parent_genome = parent.genome.clone();
        let parent_roots = parent.founder_roots.clone();
        let mate_genome = mate.genome.clone();
        let mate_roots = mate.founder_roots.clone();

        // The requester paid in phase 9; the mate pays at fulfilment
        if let Some(mate) = self.agents.get_mut(&request.mate) {
            let paid = mate
                .state
                .wallet
                .debit_up_to(money(BREEDING_COST_PER_PARENT));
            mate.state.total_spent.breeding += paid;
            mate.state.last_breeding_tick = self.tick;
        }

        let (child_genome, _) = crossover(&parent_genome, &mate_genome, &mut self.rng);
        let child_genome = self.birth_mutations(child_genome);
        let expression = express(&child_genome);

        let id = AgentId::new();
        let name = self.names.assign(id, &expression, &mut self.rng);
        let balance = money(OFFSPRING_INITIAL_BALANCE);

        let mut roots = parent_roots;
        for root in mate_roots {
            if !roots.contains(&root) {
                roots.push(root);
            }
        }

        let generation = child_genome.meta.generation;
        let offspring = Agent::offspring(
            id,
            name.clone(),
            child_genome,
            (request.parent, request.mate),
            roots,
            balance,
        );
        self.ledger.set_balance(&id, balance);

        let record = BirthRecord {
            tick: self.tick,
            agent_id: id,
            name,
            parent_a: Some(request.parent),
            parent_b: Some(request.mate),
            generation,
            initial_balance: balance,
        };
        if let Err(error) = self.journal.birth(&record).await {
            warn!(%error, "journal birth write failed");
        }

        self.agents.insert(id, offspring);
        self.breeding_events += 1;
    }

    /// Birth-time operator rolls over a freshly recombined genome
    fn birth_mutations(&mut self, genome: DynamicGenome) -> DynamicGenome {
        let mut genome = genome;
        let mutation_boost = 1.0 + express(&genome).global_mutation_rate;

        if self.rng.gen_bool((BASE_MUTATION_RATE * mutation_boost).min(1.0)) {
            genome = point_mutation(&genome, &mut self.rng).0;
        }
        if genome.gene_count() < MAX_GENE_COUNT && self.rng.gen_bool(BASE_DUPLICATION_RATE) {
            genome = gene_duplication(&genome, &mut self.rng).0;
        }
        if genome.gene_count() > MIN_GENE_COUNT && self.rng.gen_bool(BASE_DELETION_RATE) {
            genome = gene_deletion(&genome, &mut self.rng).0;
        }
        if genome.gene_count() < MAX_GENE_COUNT && self.rng.gen_bool(BASE_DE_NOVO_RATE) {
            genome = de_novo_gene(&genome, &mut self.rng).0;
        }
        if genome.gene_count() < MAX_GENE_COUNT && self.rng.gen_bool(BASE_HGT_RATE) {
            if let Some(donor_gene_and_id) = self.random_donor_gene() {
                let (donor_gene, donor_id) = donor_gene_and_id;
                genome = horizontal_transfer(&genome, &donor_gene, donor_id, &mut self.rng).0;
            }
        }

        genome
    }

    fn random_donor_gene(&mut self) -> Option<(oikos_genome::Gene, AgentId)> {
        let ids: Vec<AgentId> = self.living().map(|a| a.id).collect();
        if ids.is_empty() {
            return None;
        }
        let donor_id = ids[self.rng.gen_range(0..ids.len())];
        let donor = self.agents.get(&donor_id)?;
        let genes: Vec<_> = donor.genome.genes().cloned().collect();
        if genes.is_empty() {
            return None;
        }
        let gene = genes[self.rng.gen_range(0..genes.len())].clone();
        Some((gene, donor_id))
    }

    /// Cull the poorest agents while the population exceeds the
    /// overcrowding threshold, tagging the cause as competition.
    async fn cull_overcrowding(&mut self) {
        while self.living().count() > OVERCROWDING_THRESHOLD {
            let poorest = self
                .living()
                .min_by_key(|a| a.state.total_balance())
                .map(|a| a.id);
            let Some(id) = poorest else {
                break;
            };

            let Some(agent) = self.agents.get_mut(&id) else {
                break;
            };
            agent.state.is_alive = false;
            let tombstone = make_tombstone(
                agent.id,
                agent.name.clone(),
                &agent.state,
                &agent.genome,
                DeathCause::Competition,
                "culled by carrying capacity".to_string(),
            );
            if let Err(error) = self.journal.tombstone(&tombstone).await {
                warn!(agent = %id, %error, "journal tombstone write failed");
            }
            self.ledger.remove(&id);
            self.tombstones.push(tombstone);
            self.death_events += 1;
        }
    }

    /// Evaluate the four global termination conditions
    pub fn check_termination(&self) -> TerminationReport {
        let alive: Vec<&Agent> = self.living().collect();

        // A: lineage dominance
        if alive.len() > LINEAGE_MIN_POPULATION {
            let mut by_root: HashMap<AgentId, usize> = HashMap::new();
            for agent in &alive {
                for root in &agent.founder_roots {
                    *by_root.entry(*root).or_default() += 1;
                }
            }
            for (root, count) in by_root {
                let ratio = count as f64 / alive.len() as f64;
                if ratio >= LINEAGE_DOMINANCE_RATIO {
                    return TerminationReport {
                        triggered: true,
                        condition: Some(TerminationCondition::LineageDominance),
                        agent_id: Some(root),
                        detail: format!(
                            "founder {root} descendants hold {:.0}% of {} agents",
                            ratio * 100.0,
                            alive.len()
                        ),
                    };
                }
            }
        }

        // B: economic dominance
        if alive.len() > ECONOMIC_MIN_POPULATION {
            let total: f64 = alive
                .iter()
                .map(|a| money_f64(a.state.total_balance()))
                .sum();
            if total > 0.0 {
                if let Some(richest) = alive.iter().max_by_key(|a| a.state.total_balance()) {
                    let share = money_f64(richest.state.total_balance()) / total;
                    if share >= ECONOMIC_DOMINANCE_RATIO {
                        return TerminationReport {
                            triggered: true,
                            condition: Some(TerminationCondition::EconomicDominance),
                            agent_id: Some(richest.id),
                            detail: format!(
                                "{} holds {:.0}% of total balance",
                                richest.name,
                                share * 100.0
                            ),
                        };
                    }
                }
            }
        }

        // C: outlier survival against early-generation lifespans
        let early_lifespans: Vec<u64> = self
            .tombstones
            .iter()
            .filter(|t| t.generation < 5)
            .map(|t| t.age)
            .collect();
        if early_lifespans.len() >= SURVIVAL_MIN_SAMPLES {
            let mean =
                early_lifespans.iter().sum::<u64>() as f64 / early_lifespans.len() as f64;
            let bar = mean * SURVIVAL_OUTLIER_MULTIPLIER;
            if let Some(outlier) = alive.iter().find(|a| a.age() as f64 > bar) {
                return TerminationReport {
                    triggered: true,
                    condition: Some(TerminationCondition::OutlierSurvival),
                    agent_id: Some(outlier.id),
                    detail: format!(
                        "{} is {} ticks old, over {bar:.0} (5x early mean {mean:.0})",
                        outlier.name,
                        outlier.age()
                    ),
                };
            }
        }

        // D: emergent-behavior accumulation
        if self.emergent_count >= EMERGENT_BEHAVIOR_STOP_COUNT {
            return TerminationReport {
                triggered: true,
                condition: Some(TerminationCondition::EmergentAccumulation),
                agent_id: None,
                detail: format!(
                    "{} emergent decisions accumulated",
                    self.emergent_count
                ),
            };
        }

        TerminationReport::none()
    }

    /// Current population statistics
    pub fn stats(&self) -> PopulationStats {
        let mut balances: Vec<f64> = self
            .living()
            .map(|a| money_f64(a.state.total_balance()))
            .collect();
        balances.sort_by(|a, b| a.total_cmp(b));
        let ages: Vec<u64> = self.living().map(|a| a.age()).collect();

        let alive = balances.len();
        PopulationStats {
            tick: self.tick,
            total_agents: self.agents.len(),
            alive,
            deaths_total: self.death_events,
            breeding_events: self.breeding_events,
            average_balance: if alive == 0 {
                0.0
            } else {
                balances.iter().sum::<f64>() / alive as f64
            },
            median_balance: if alive == 0 { 0.0 } else { balances[alive / 2] },
            min_balance: balances.first().copied().unwrap_or(0.0),
            max_balance: balances.last().copied().unwrap_or(0.0),
            average_age: if ages.is_empty() {
                0.0
            } else {
                ages.iter().sum::<u64>() as f64 / ages.len() as f64
            },
            oldest_age: ages.iter().copied().max().unwrap_or(0),
            emergent_count: self.emergent_count,
        }
    }

    /// Living agents, in map-iteration order
    pub fn living(&self) -> impl Iterator<Item = &Agent> {
        self.agents.values().filter(|a| a.is_alive())
    }

    pub fn agent(&self, id: &AgentId) -> Option<&Agent> {
        self.agents.get(id)
    }

    pub fn tombstones(&self) -> &[Tombstone] {
        &self.tombstones
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    pub fn emergent_count(&self) -> u64 {
        self.emergent_count
    }

    /// Write the population to a JSON snapshot file
    pub fn save_snapshot(&self, path: impl AsRef<Path>) -> Result<()> {
        if let Some(dir) = path.as_ref().parent() {
            std::fs::create_dir_all(dir)?;
        }
        let snapshot = Snapshot {
            tick: self.tick,
            breeding_events: self.breeding_events,
            death_events: self.death_events,
            emergent_count: self.emergent_count,
            agents: self.agents.values().cloned().collect(),
            tombstones: self.tombstones.clone(),
        };
        std::fs::write(path, serde_json::to_string_pretty(&snapshot)?)?;
        Ok(())
    }
}
