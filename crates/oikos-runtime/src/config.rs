//! Simulation configuration
//!
//! Hard defaults layered under `OIKOS_*` environment variables (a `.env`
//! file is honored). Configuration problems are fatal before the loop
//! starts and are collected into one error listing; once the simulation
//! runs, nothing here can fail it.

use std::path::PathBuf;

use oikos_common::{OikosError, Result};
use serde::{Deserialize, Serialize};

/// Simulation-run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Founder agents created at start
    pub initial_agents: usize,
    /// Starting balance per founder (USDC)
    pub initial_balance: f64,
    /// Wall-clock milliseconds per tick in the supervisor loop
    pub tick_interval_ms: u64,
    /// Stop after this many ticks regardless of termination conditions
    pub max_ticks: Option<u64>,
    /// Seed for the population rng; entropy when unset
    pub seed: Option<u64>,

    /// New positions an agent may open per tick
    pub max_new_positions_per_tick: usize,
    /// Task attempts per agent per tick
    pub max_task_attempts_per_tick: usize,
    /// Decision calls per agent per tick
    pub max_llm_calls_per_tick: u32,
    /// Minimum wall-clock gap between decision calls per agent
    pub llm_min_interval_ms: u64,
    /// Base inference fee per call (USDC), scaled by inference quality
    pub inference_base_fee: f64,

    /// Journal directory; `None` disables the jsonl journal
    pub log_dir: Option<PathBuf>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            initial_agents: 10,
            initial_balance: 30.0,
            tick_interval_ms: 4_000,
            max_ticks: None,
            seed: None,
            max_new_positions_per_tick: 2,
            max_task_attempts_per_tick: 2,
            max_llm_calls_per_tick: 2,
            llm_min_interval_ms: 500,
            inference_base_fee: 0.001,
            log_dir: Some(PathBuf::from("./logs")),
        }
    }
}

impl SimulationConfig {
    /// Load configuration from environment and an optional `.env` file
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let mut cfg = Self::default();
        let mut errors = Vec::new();

        read_var("OIKOS_INITIAL_AGENTS", &mut cfg.initial_agents, &mut errors);
        read_var("OIKOS_INITIAL_BALANCE", &mut cfg.initial_balance, &mut errors);
        read_var("OIKOS_TICK_INTERVAL_MS", &mut cfg.tick_interval_ms, &mut errors);
        read_opt_var("OIKOS_MAX_TICKS", &mut cfg.max_ticks, &mut errors);
        read_opt_var("OIKOS_SEED", &mut cfg.seed, &mut errors);
        read_var(
            "OIKOS_MAX_NEW_POSITIONS",
            &mut cfg.max_new_positions_per_tick,
            &mut errors,
        );
        read_var(
            "OIKOS_MAX_TASK_ATTEMPTS",
            &mut cfg.max_task_attempts_per_tick,
            &mut errors,
        );
        read_var(
            "OIKOS_MAX_LLM_CALLS",
            &mut cfg.max_llm_calls_per_tick,
            &mut errors,
        );
        read_var(
            "OIKOS_LLM_MIN_INTERVAL_MS",
            &mut cfg.llm_min_interval_ms,
            &mut errors,
        );
        read_var(
            "OIKOS_INFERENCE_BASE_FEE",
            &mut cfg.inference_base_fee,
            &mut errors,
        );

        if let Ok(dir) = std::env::var("OIKOS_LOG_DIR") {
            cfg.log_dir = if dir.is_empty() {
                None
            } else {
                Some(PathBuf::from(dir))
            };
        }

        if cfg.initial_agents == 0 {
            errors.push("OIKOS_INITIAL_AGENTS must be at least 1".to_string());
        }
        if cfg.initial_balance <= 0.0 {
            errors.push("OIKOS_INITIAL_BALANCE must be positive".to_string());
        }

        if errors.is_empty() {
            Ok(cfg)
        } else {
            Err(OikosError::Config(errors.join("; ")))
        }
    }
}

fn read_var<T: std::str::FromStr>(name: &str, slot: &mut T, errors: &mut Vec<String>) {
    if let Ok(raw) = std::env::var(name) {
        match raw.parse() {
            Ok(value) => *slot = value,
            Err(_) => errors.push(format!("{name} is not a valid value: {raw}")),
        }
    }
}

fn read_opt_var<T: std::str::FromStr>(name: &str, slot: &mut Option<T>, errors: &mut Vec<String>) {
    if let Ok(raw) = std::env::var(name) {
        match raw.parse() {
            Ok(value) => *slot = Some(value),
            Err(_) => errors.push(format!("{name} is not a valid value: {raw}")),
        }
    }
}
