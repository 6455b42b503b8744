//! Oikos simulation supervisor
//!
//! Loads configuration, creates the founder population, and drives the
//! tick loop until a termination condition fires, the population goes
//! extinct, the tick budget runs out, or the operator interrupts.

use std::time::Duration;

use anyhow::Context;
use oikos_runtime::journal::Journal;
use oikos_runtime::{
    HeuristicProvider, JsonlJournal, KeywordClassifier, NullJournal, Population,
    SimulationConfig,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match SimulationConfig::load() {
        Ok(config) => config,
        Err(err) => {
            error!("configuration invalid: {err}");
            std::process::exit(1);
        }
    };

    info!(
        agents = config.initial_agents,
        balance = config.initial_balance,
        tick_ms = config.tick_interval_ms,
        "oikos simulation starting"
    );

    let journal: Box<dyn Journal> = match &config.log_dir {
        Some(dir) => Box::new(JsonlJournal::new(dir).context("creating journal directory")?),
        None => Box::new(NullJournal),
    };

    let mut population = Population::new(
        config.clone(),
        Box::new(HeuristicProvider),
        Box::new(KeywordClassifier),
        journal,
    );
    population.initialize().await;

    let mut interval = tokio::time::interval(Duration::from_millis(config.tick_interval_ms));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let stats = population.run_tick().await;
                info!(
                    tick = stats.tick,
                    alive = stats.alive,
                    avg_balance = format!("{:.2}", stats.average_balance),
                    births = stats.breeding_events,
                    deaths = stats.deaths_total,
                    "tick complete"
                );

                let report = population.check_termination();
                if report.triggered {
                    if let Some(condition) = report.condition {
                        info!(condition = %condition, detail = %report.detail, "termination condition met");
                    }
                    break;
                }
                if stats.alive == 0 {
                    info!("population extinct");
                    break;
                }
                if let Some(max) = config.max_ticks {
                    if stats.tick >= max {
                        info!(ticks = max, "tick budget exhausted");
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupt received, shutting down");
                break;
            }
        }
    }

    population
        .save_snapshot("./snapshots/final.json")
        .context("writing final snapshot")?;

    let stats = population.stats();
    info!(
        ticks = stats.tick,
        alive = stats.alive,
        deaths = stats.deaths_total,
        births = stats.breeding_events,
        avg_balance = format!("{:.2}", stats.average_balance),
        "simulation finished"
    );

    Ok(())
}
