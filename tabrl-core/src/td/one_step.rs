//! One-step temporal-difference control.
use crate::{
    error::TabrlError,
    record::{Record, RecordValue},
    sample_episode, Configurable, Env, Learner, PolicyTable,
};
use anyhow::Result;
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};

/// The bootstrap rule of the one-step target.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq)]
pub enum Backup {
    /// The actually-sampled next action: `Q(s', a')`.
    Sarsa,

    /// The best next action regardless of the behavior: `max_a Q(s', a)`.
    QLearning,

    /// The expectation under the current distribution: `sum_a P(s',a) Q(s',a)`.
    ExpectedSarsa,
}

/// Configuration of [`OneStepTd`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct OneStepTdConfig {
    /// Bootstrap rule.
    pub backup: Backup,

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

impl Default for OneStepTdConfig {
    fn default() -> Self {
        Self {
            backup: Backup::Sarsa,
            alpha: 0.1,
            gamma: 1.0,
            epsilon: 0.1,
            step_cap: 100_000,
            seed: 42,
        }
    }
}

impl OneStepTdConfig {
    /// Sets the bootstrap rule.
    pub fn backup(mut self, v: Backup) -> Self {
        self.backup = v;
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

/// One-step TD control: SARSA, Q-learning or Expected SARSA.
///
/// An on-policy episode is generated first; the sweep then slides a
/// one-step window over it, computes the bootstrap target according to the
/// configured [`Backup`] rule, applies the constant-step-size update and
/// rebalances the visited state with the soft epsilon. The final step of
/// the episode bootstraps from zero, its successor being terminal.
pub struct OneStepTd {
    backup: Backup,
    alpha: f64,
    gamma: f64,
    epsilon: f64,
    step_cap: usize,
    rng: StdRng,
}

impl Configurable for OneStepTd {
    type Config = OneStepTdConfig;

    fn build(config: Self::Config) -> Self {
        Self {
            backup: config.backup,
            alpha: config.alpha,
            gamma: config.gamma,
            epsilon: config.epsilon,
            step_cap: config.step_cap,
            rng: StdRng::seed_from_u64(config.seed),
        }
    }
}

impl<E: Env> Learner<E> for OneStepTd {
    fn episode(&mut self, env: &mut E, policy: &mut PolicyTable<E::Act>) -> Result<Record> {
        let ep = sample_episode(env, policy, false, &mut self.rng, self.step_cap)?;

        let mut total = 0.0;
        for t in 0..ep.len() {
            let step = &ep[t];
            total += step.reward;

            let target = match ep.get(t + 1) {
                None => 0.0,
                Some(next) => {
                    let ns = policy.get(next.state)?;
                    match self.backup {
                        Backup::Sarsa => ns
                            .action(next.act)
                            .ok_or(TabrlError::IllegalAction {
                                state: next.state,
                                act: format!("{:?}", next.act),
                            })?
                            .value_or(0.0),
                        Backup::QLearning => ns.max_value_or(0.0),
                        Backup::ExpectedSarsa => ns.expected_value(),
                    }
                }
            };

            let ps = policy.get_mut(step.state)?;
            let ix = ps.action_index(step.act).ok_or(TabrlError::IllegalAction {
                state: step.state,
                act: format!("{:?}", step.act),
            })?;
            ps.record_visit();
            ps.action_at_mut(ix)
                .update_td(self.alpha, step.reward + self.gamma * target);
            ps.rebalance(self.epsilon);
        }

        let mut record = Record::from_scalar("episode_len", ep.len() as f32);
        record.insert("episode_return", RecordValue::Scalar(total as f32));
        Ok(record)
    }
}
