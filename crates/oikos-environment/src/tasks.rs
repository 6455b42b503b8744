//! Human task market
//!
//! Gig-economy tasks agents can attempt for USDC rewards. Success depends
//! on expressed traits with random variance; failures cost reputation,
//! and reputation gates access to harder tasks.

use oikos_genome::{ExpressionResult, TraitKey};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Fraction of a trait threshold an agent must reach to even attempt
const ATTEMPT_GATE_FACTOR: f64 = 0.7;

/// Reputation gained per successful task
const REPUTATION_GAIN: f64 = 0.05;

/// Category of a human task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    ContentWriting,
    DataAnalysis,
    CodeReview,
    Translation,
    SocialMedia,
    CustomerService,
    Research,
    Design,
}

/// One entry of the human-task table
#[derive(Debug, Clone)]
pub struct HumanTask {
    pub id: &'static str,
    pub kind: TaskKind,
    pub name: &'static str,
    /// Reward range (USDC)
    pub reward_min: f64,
    pub reward_max: f64,
    /// Difficulty in [0, 1]; also the reputation bar, shifted down
    pub difficulty: f64,
    /// Minimum expressed traits to attempt
    pub required_traits: &'static [(TraitKey, f64)],
    /// Probability the task is posted on a given tick
    pub daily_probability: f64,
    /// Success rate before trait modifiers
    pub base_success_rate: f64,
    /// Reputation lost on failure
    pub failure_penalty: f64,
}

pub static HUMAN_TASKS: &[HumanTask] = &[
    HumanTask {
        id: "blog_post_writing",
        kind: TaskKind::ContentWriting,
        name: "Write a blog post",
        reward_min: 5.0,
        reward_max: 50.0,
        difficulty: 0.4,
        required_traits: &[
            (TraitKey::CreativeAbility, 0.4),
            (TraitKey::HumanDependence, 0.3),
        ],
        daily_probability: 0.3,
        base_success_rate: 0.75,
        failure_penalty: 0.1,
    },
    HumanTask {
        id: "twitter_thread",
        kind: TaskKind::SocialMedia,
        name: "Compose a Twitter thread",
        reward_min: 3.0,
        reward_max: 20.0,
        difficulty: 0.3,
        required_traits: &[(TraitKey::CreativeAbility, 0.5)],
        daily_probability: 0.4,
        base_success_rate: 0.8,
        failure_penalty: 0.05,
    },
    HumanTask {
        id: "data_cleaning",
        kind: TaskKind::DataAnalysis,
        name: "Clean a CSV dataset",
        reward_min: 10.0,
        reward_max: 80.0,
        difficulty: 0.5,
        required_traits: &[
            (TraitKey::AnalyticalAbility, 0.6),
            (TraitKey::HumanDependence, 0.2),
        ],
        daily_probability: 0.25,
        base_success_rate: 0.85,
        failure_penalty: 0.15,
    },
    HumanTask {
        id: "market_research",
        kind: TaskKind::Research,
        name: "Protocol research report",
        reward_min: 20.0,
        reward_max: 150.0,
        difficulty: 0.6,
        required_traits: &[
            (TraitKey::AnalyticalAbility, 0.7),
            (TraitKey::OnchainAffinity, 0.5),
        ],
        daily_probability: 0.2,
        base_success_rate: 0.7,
        failure_penalty: 0.2,
    },
    HumanTask {
        id: "contract_debugging",
        kind: TaskKind::CodeReview,
        name: "Debug a smart contract",
        reward_min: 50.0,
        reward_max: 500.0,
        difficulty: 0.8,
        required_traits: &[
            (TraitKey::AnalyticalAbility, 0.8),
            (TraitKey::OnchainAffinity, 0.7),
        ],
        daily_probability: 0.1,
        base_success_rate: 0.6,
        failure_penalty: 0.3,
    },
    HumanTask {
        id: "doc_translation",
        kind: TaskKind::Translation,
        name: "Translate technical docs",
        reward_min: 8.0,
        reward_max: 60.0,
        difficulty: 0.45,
        required_traits: &[
            (TraitKey::CreativeAbility, 0.4),
            (TraitKey::HumanDependence, 0.3),
        ],
        daily_probability: 0.2,
        base_success_rate: 0.8,
        failure_penalty: 0.1,
    },
    HumanTask {
        id: "community_moderation",
        kind: TaskKind::CustomerService,
        name: "Moderate a community",
        reward_min: 15.0,
        reward_max: 100.0,
        difficulty: 0.35,
        required_traits: &[
            (TraitKey::CooperationTendency, 0.5),
            (TraitKey::HumanDependence, 0.4),
        ],
        daily_probability: 0.25,
        base_success_rate: 0.85,
        failure_penalty: 0.1,
    },
    HumanTask {
        id: "meme_design",
        kind: TaskKind::Design,
        name: "Design campaign memes",
        reward_min: 2.0,
        reward_max: 30.0,
        difficulty: 0.25,
        required_traits: &[(TraitKey::CreativeAbility, 0.6)],
        daily_probability: 0.35,
        base_success_rate: 0.7,
        failure_penalty: 0.05,
    },
    HumanTask {
        id: "dapp_beta_testing",
        kind: TaskKind::CodeReview,
        name: "Beta-test a dApp",
        reward_min: 10.0,
        reward_max: 100.0,
        difficulty: 0.5,
        required_traits: &[
            (TraitKey::AnalyticalAbility, 0.5),
            (TraitKey::OnchainAffinity, 0.4),
        ],
        daily_probability: 0.2,
        base_success_rate: 0.75,
        failure_penalty: 0.1,
    },
    HumanTask {
        id: "data_labeling",
        kind: TaskKind::DataAnalysis,
        name: "Label training data",
        reward_min: 5.0,
        reward_max: 40.0,
        difficulty: 0.3,
        required_traits: &[
            (TraitKey::AnalyticalAbility, 0.4),
            (TraitKey::HumanDependence, 0.2),
        ],
        daily_probability: 0.3,
        base_success_rate: 0.9,
        failure_penalty: 0.05,
    },
];

/// Outcome of one task attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskOutcome {
    pub task_id: String,
    pub success: bool,
    /// Reward before the caller's earnings cap (0 on failure)
    pub reward: f64,
    pub reputation_delta: f64,
}

/// Tasks posted this tick
pub fn sample_daily(rng: &mut impl Rng) -> Vec<&'static HumanTask> {
    HUMAN_TASKS
        .iter()
        .filter(|t| rng.gen_bool(t.daily_probability))
        .collect()
}

/// Whether an agent may attempt a task: every trait at 70% of its
/// threshold or better, and reputation within reach of the difficulty.
pub fn can_attempt(task: &HumanTask, expression: &ExpressionResult, reputation: f64) -> bool {
    if reputation < task.difficulty - 0.4 {
        return false;
    }
    task.required_traits
        .iter()
        .all(|(key, threshold)| expression.trait_value(*key) >= threshold * ATTEMPT_GATE_FACTOR)
}

/// Success probability for an attempt: the base rate shifted by how far
/// each required trait sits above or below its threshold (undershooting
/// hurts twice as much as overshooting helps), plus human-factor noise.
fn success_rate(task: &HumanTask, expression: &ExpressionResult, rng: &mut impl Rng) -> f64 {
    let mut rate = task.base_success_rate;

    for (key, threshold) in task.required_traits {
        let value = expression.trait_value(*key);
        if value >= *threshold {
            rate += (value - threshold) * 0.5;
        } else {
            rate -= (threshold - value) * 1.0;
        }
    }

    rate += rng.gen_range(-0.1..0.1);
    rate.clamp(0.1, 0.95)
}

/// Attempt a task; the caller debits nothing and credits the capped
/// reward on success.
pub fn attempt(
    task: &HumanTask,
    expression: &ExpressionResult,
    rng: &mut impl Rng,
) -> TaskOutcome {
    let rate = success_rate(task, expression, rng);

    if rng.gen_range(0.0..1.0) < rate {
        let reward = rng.gen_range(task.reward_min..=task.reward_max);
        let quality = (expression.creative_ability + expression.analytical_ability) / 2.0;
        TaskOutcome {
            task_id: task.id.to_string(),
            success: true,
            reward: reward * (1.0 + quality * 0.2),
            reputation_delta: REPUTATION_GAIN,
        }
    } else {
        TaskOutcome {
            task_id: task.id.to_string(),
            success: false,
            reward: 0.0,
            reputation_delta: -task.failure_penalty,
        }
    }
}
