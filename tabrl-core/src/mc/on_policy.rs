//! On-policy first-visit Monte Carlo control.
use super::returns;
use crate::{
    error::TabrlError,
    record::{Record, RecordValue},
    sample_episode, Configurable, Env, Learner, PolicyTable,
};
use anyhow::Result;
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Configuration of [`OnPolicyControl`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct OnPolicyControlConfig {
    /// Discount factor.
    pub gamma: f64,

    /// Exploration probability of the soft policy.
    pub epsilon: f64,

    /// Maximum episode length before generation fails.
    pub step_cap: usize,

    /// Seed of the random number generator.
    pub seed: u64,
}

impl Default for OnPolicyControlConfig {
    fn default() -> Self {
        Self {
            gamma: 1.0,
            epsilon: 0.1,
            step_cap: 100_000,
            seed: 42,
        }
    }
}

impl OnPolicyControlConfig {
    /// Sets the discount factor.
    pub fn gamma(mut self, v: f64) -> Self {
        self.gamma = v;
        self
    }

    /// Sets the exploration probability.
    pub fn epsilon(mut self, v: f64) -> Self {
        self.epsilon = v;
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

/// On-policy first-visit control over soft policies.
///
/// The behavior generating the data and the policy being improved are the
/// same table. After each first-visit pair update the visited state is
/// immediately rebalanced with the configured epsilon, interleaving
/// prediction and improvement within one pass; the soft floor keeps every
/// action explorable.
pub struct OnPolicyControl {
    gamma: f64,
    epsilon: f64,
    step_cap: usize,
    rng: StdRng,
}

impl Configurable for OnPolicyControl {
    type Config = OnPolicyControlConfig;

    fn build(config: Self::Config) -> Self {
        Self {
            gamma: config.gamma,
            epsilon: config.epsilon,
            step_cap: config.step_cap,
            rng: StdRng::seed_from_u64(config.seed),
        }
    }
}

impl<E: Env> Learner<E> for OnPolicyControl {
    fn episode(&mut self, env: &mut E, policy: &mut PolicyTable<E::Act>) -> Result<Record> {
        let ep = sample_episode(env, policy, false, &mut self.rng, self.step_cap)?;
        let gs = returns(&ep, self.gamma);

        let mut seen: HashSet<(usize, usize)> = HashSet::new();
        for (step, g) in ep.iter().zip(gs.iter()) {
            let ps = policy.get_mut(step.state)?;
            let ix = ps.action_index(step.act).ok_or(TabrlError::IllegalAction {
                state: step.state,
                act: format!("{:?}", step.act),
            })?;
            if !seen.insert((step.state.0, ix)) {
                continue;
            }
            ps.record_visit();
            ps.action_at_mut(ix).update_mean(*g);
            ps.rebalance(self.epsilon);
        }

        let mut record = Record::from_scalar("episode_len", ep.len() as f32);
        record.insert(
            "episode_return",
            RecordValue::Scalar(gs.first().copied().unwrap_or(0.0) as f32),
        );
        Ok(record)
    }
}
