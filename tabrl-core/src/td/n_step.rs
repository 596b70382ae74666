//! n-step SARSA.
use super::ReturnBank;
use crate::{
    error::TabrlError,
    record::{Record, RecordValue},
    sample_episode, Configurable, Env, EpisodeStep, Learner, PolicyTable,
};
use anyhow::Result;
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Configuration of [`NStepSarsa`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct NStepSarsaConfig {
    /// Lookahead depth N.
    pub n: usize,

    /// Constant step size.
    pub alpha: f64,

    /// Discount factor.
    pub gamma: f64,

    /// Exploration probability of the soft policy.
    pub epsilon: f64,

    /// Maximum episode length before generation fails.
    pub step_cap: usize,

    /// Seed of the random number generator.
    pub seed: u64,
}

impl Default for NStepSarsaConfig {
    fn default() -> Self {
        Self {
            n: 4,
            alpha: 0.1,
            gamma: 1.0,
            epsilon: 0.1,
            step_cap: 100_000,
            seed: 42,
        }
    }
}

impl NStepSarsaConfig {
    /// Sets the lookahead depth.
    pub fn n(mut self, v: usize) -> Self {
        self.n = v;
        self
    }

    /// Sets the step size.
    pub fn alpha(mut self, v: f64) -> Self {
        self.alpha = v;
        self
    }

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

/// SARSA with an N-step lookahead window.
///
/// Steps are enqueued into a [`ReturnBank`] as they arrive; once N steps
/// are pending (or the episode has ended) the oldest is dequeued and
/// updated with the discounted partial return over the pending rewards,
/// plus the bootstrap correction `gamma^N * Q(s_{tau+N}, a_{tau+N})`
/// whenever the updated step lies at least N steps before the episode end.
/// With N = 1 the updates are numerically identical to one-step SARSA;
/// as N approaches the episode length they become full Monte Carlo
/// returns.
pub struct NStepSarsa {
    n: usize,
    alpha: f64,
    gamma: f64,
    epsilon: f64,
    step_cap: usize,
    rng: StdRng,
}

impl Configurable for NStepSarsa {
    type Config = NStepSarsaConfig;

    fn build(config: Self::Config) -> Self {
        Self {
            n: config.n.max(1),
            alpha: config.alpha,
            gamma: config.gamma,
            epsilon: config.epsilon,
            step_cap: config.step_cap,
            rng: StdRng::seed_from_u64(config.seed),
        }
    }
}

impl NStepSarsa {
    fn apply<E: Env>(
        &self,
        policy: &mut PolicyTable<E::Act>,
        step: &EpisodeStep<E::Act>,
        g: f64,
    ) -> Result<()> {
        let ps = policy.get_mut(step.state)?;
        let ix = ps.action_index(step.act).ok_or(TabrlError::IllegalAction {
            state: step.state,
            act: format!("{:?}", step.act),
        })?;
        ps.record_visit();
        ps.action_at_mut(ix).update_td(self.alpha, g);
        ps.rebalance(self.epsilon);
        Ok(())
    }
}

impl<E: Env> Learner<E> for NStepSarsa {
    fn episode(&mut self, env: &mut E, policy: &mut PolicyTable<E::Act>) -> Result<Record> {
        let ep = sample_episode(env, policy, false, &mut self.rng, self.step_cap)?;

        let mut bank = ReturnBank::new(self.n);
        for (i, step) in ep.iter().enumerate() {
            bank.push(*step);
            if !bank.is_full() {
                continue;
            }
            // The oldest pending step is tau = i + 1 - n; its bootstrap
            // state-action pair, if any, is step tau + n.
            let tau = i + 1 - self.n;
            let mut g = bank.partial_return(self.gamma);
            if let Some(boot) = ep.get(tau + self.n) {
                let q = policy
                    .get(boot.state)?
                    .action(boot.act)
                    .ok_or(TabrlError::IllegalAction {
                        state: boot.state,
                        act: format!("{:?}", boot.act),
                    })?
                    .value_or(0.0);
                g += self.gamma.powi(self.n as i32) * q;
            }
            if let Some(oldest) = bank.pop() {
                self.apply::<E>(policy, &oldest, g)?;
            }
        }

        // Tail of the episode: fewer than N rewards remain, no bootstrap.
        while !bank.is_empty() {
            let g = bank.partial_return(self.gamma);
            if let Some(oldest) = bank.pop() {
                self.apply::<E>(policy, &oldest, g)?;
            }
        }

        let total: f64 = ep.iter().map(|s| s.reward).sum();
        let mut record = Record::from_scalar("episode_len", ep.len() as f32);
        record.insert("episode_return", RecordValue::Scalar(total as f32));
        Ok(record)
    }
}
