//! Monte Carlo policy evaluation.
use super::returns;
use crate::{
    record::{Record, RecordValue},
    sample_episode, Configurable, Env, Learner, PolicyTable,
};
use anyhow::Result;
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Which occurrences of a state inside one episode receive an update.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq)]
pub enum VisitMode {
    /// Only the earliest occurrence per episode.
    FirstVisit,
    /// Every occurrence.
    EveryVisit,
}

/// Configuration of [`MonteCarloPrediction`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct McPredictionConfig {
    /// Discount factor.
    pub gamma: f64,

    /// Visit discipline.
    pub visit: VisitMode,

    /// Maximum episode length before generation fails.
    pub step_cap: usize,

    /// Seed of the random number generator.
    pub seed: u64,
}

impl Default for McPredictionConfig {
    fn default() -> Self {
        Self {
            gamma: 1.0,
            visit: VisitMode::FirstVisit,
            step_cap: 100_000,
            seed: 42,
        }
    }
}

impl McPredictionConfig {
    /// Sets the discount factor.
    pub fn gamma(mut self, v: f64) -> Self {
        self.gamma = v;
        self
    }

    /// Sets the visit discipline.
    pub fn visit(mut self, v: VisitMode) -> Self {
        self.visit = v;
        self
    }

    /// Sets the step cap of episode generation.
    pub fn step_cap(mut self, v: usize) -> Self {
        self.step_cap = v;
        self
    }

    /// Sets the seed of the random number generator.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }
}

/// Monte Carlo evaluation of a fixed policy.
///
/// Each episode is generated by the policy under evaluation and folded
/// into the per-state value estimates by an incremental mean; the policy's
/// action probabilities are never touched. Converges to the state-value
/// function of the policy as the iteration budget grows.
pub struct MonteCarloPrediction {
    gamma: f64,
    visit: VisitMode,
    step_cap: usize,
    rng: StdRng,
}

impl Configurable for MonteCarloPrediction {
    type Config = McPredictionConfig;

    fn build(config: Self::Config) -> Self {
        Self {
            gamma: config.gamma,
            visit: config.visit,
            step_cap: config.step_cap,
            rng: StdRng::seed_from_u64(config.seed),
        }
    }
}

impl<E: Env> Learner<E> for MonteCarloPrediction {
    fn episode(&mut self, env: &mut E, policy: &mut PolicyTable<E::Act>) -> Result<Record> {
        let ep = sample_episode(env, policy, false, &mut self.rng, self.step_cap)?;
        let gs = returns(&ep, self.gamma);

        let mut seen = vec![false; policy.n_states()];
        for (step, g) in ep.iter().zip(gs.iter()) {
            if let VisitMode::FirstVisit = self.visit {
                if seen[step.state.0] {
                    continue;
                }
                seen[step.state.0] = true;
            }
            policy.get_mut(step.state)?.update_value_mean(*g);
        }

        let mut record = Record::from_scalar("episode_len", ep.len() as f32);
        record.insert(
            "episode_return",
            RecordValue::Scalar(gs.first().copied().unwrap_or(0.0) as f32),
        );
        Ok(record)
    }
}
