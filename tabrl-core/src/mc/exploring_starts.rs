//! Monte Carlo control with exploring starts.
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

/// Configuration of [`MonteCarloEs`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct MonteCarloEsConfig {
    /// Discount factor.
    pub gamma: f64,

    /// Maximum episode length before generation fails.
    pub step_cap: usize,

    /// Seed of the random number generator.
    pub seed: u64,
}

impl Default for MonteCarloEsConfig {
    fn default() -> Self {
        Self {
            gamma: 1.0,
            step_cap: 100_000,
            seed: 42,
        }
    }
}

impl MonteCarloEsConfig {
    /// Sets the discount factor.
    pub fn gamma(mut self, v: f64) -> Self {
        self.gamma = v;
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

/// Monte Carlo control with exploring starts.
///
/// Episodes start from a uniformly random state-action pair, so every pair
/// keeps being tried no matter how degenerate the current policy is. Each
/// episode's first-visit returns update the pair values; the whole table is
/// then rebalanced greedily, giving a deterministic-as-possible policy from
/// purely sampled experience.
pub struct MonteCarloEs {
    gamma: f64,
    step_cap: usize,
    rng: StdRng,
}

impl Configurable for MonteCarloEs {
    type Config = MonteCarloEsConfig;

    fn build(config: Self::Config) -> Self {
        Self {
            gamma: config.gamma,
            step_cap: config.step_cap,
            rng: StdRng::seed_from_u64(config.seed),
        }
    }
}

impl<E: Env> Learner<E> for MonteCarloEs {
    fn episode(&mut self, env: &mut E, policy: &mut PolicyTable<E::Act>) -> Result<Record> {
        let ep = sample_episode(env, policy, true, &mut self.rng, self.step_cap)?;
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
        }

        policy.rebalance_all(0.0);

        let mut record = Record::from_scalar("episode_len", ep.len() as f32);
        record.insert(
            "episode_return",
            RecordValue::Scalar(gs.first().copied().unwrap_or(0.0) as f32),
        );
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{LineConfig, LineWorld, Walk};

    #[test]
    fn control_learns_to_walk_right() {
        let mut env = LineWorld::fixture(LineConfig {
            len: 5,
            step_reward: -1.0,
            goal_reward: 5.0,
        });
        let mut policy = PolicyTable::for_env(&env);
        let mut learner =
            MonteCarloEs::build(MonteCarloEsConfig::default().step_cap(200).seed(11));

        for _ in 0..400 {
            // A transiently cyclic greedy policy can fail generation with
            // a truncated episode; the next exploring start escapes it.
            let _ = Learner::<LineWorld>::episode(&mut learner, &mut env, &mut policy);
        }

        for id in env.states() {
            assert_eq!(policy.get(id).unwrap().greedy_action(), Some(Walk::Right));
        }
    }
}
