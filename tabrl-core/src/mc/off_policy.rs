//! Off-policy every-visit Monte Carlo control with importance sampling.
use crate::{
    error::TabrlError,
    record::{Record, RecordValue},
    sample_episode, Act, Configurable, Env, Learner, PolicyTable,
};
use anyhow::Result;
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Configuration of [`OffPolicyControl`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct OffPolicyControlConfig {
    /// Discount factor.
    pub gamma: f64,

    /// Maximum episode length before generation fails.
    pub step_cap: usize,

    /// Seed of the random number generator.
    pub seed: u64,
}

impl Default for OffPolicyControlConfig {
    fn default() -> Self {
        Self {
            gamma: 1.0,
            step_cap: 100_000,
            seed: 42,
        }
    }
}

impl OffPolicyControlConfig {
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

/// Off-policy every-visit control with weighted importance sampling.
///
/// Episodes are generated by a fixed stochastic behavior policy while the
/// table passed to [`Learner::episode`] is the target policy, kept greedy
/// throughout. The reversed walk maintains an importance weight `w` and a
/// per-pair cumulative weight sum, and stops the moment the target's greedy
/// choice diverges from the action the behavior policy actually took: from
/// that point on the sample no longer informs the target's greedy branch.
///
/// The recurrence order is load-bearing and deliberately preserved: the
/// weight update `w *= target_p / behavior_p` happens after the divergence
/// check and uses the target probability read before this step's
/// rebalance.
pub struct OffPolicyControl<A: Act> {
    gamma: f64,
    step_cap: usize,
    rng: StdRng,
    behavior: Option<PolicyTable<A>>,
}

impl<A: Act> Configurable for OffPolicyControl<A> {
    type Config = OffPolicyControlConfig;

    fn build(config: Self::Config) -> Self {
        Self {
            gamma: config.gamma,
            step_cap: config.step_cap,
            rng: StdRng::seed_from_u64(config.seed),
            behavior: None,
        }
    }
}

impl<A: Act> OffPolicyControl<A> {
    /// Replaces the behavior policy.
    ///
    /// By default the behavior policy is built uniform over every state's
    /// legal actions on the first call to [`Learner::episode`]. It is never
    /// rebalanced.
    pub fn set_behavior(&mut self, behavior: PolicyTable<A>) {
        self.behavior = Some(behavior);
    }
}

impl<E: Env> Learner<E> for OffPolicyControl<E::Act> {
    fn episode(&mut self, env: &mut E, policy: &mut PolicyTable<E::Act>) -> Result<Record> {
        let behavior = &*self.behavior.get_or_insert_with(|| PolicyTable::for_env(env));

        let ep = sample_episode(env, behavior, false, &mut self.rng, self.step_cap)?;

        let mut g = 0.0;
        let mut w = 1.0;
        let mut updated = 0usize;
        for step in ep.iter().rev() {
            g = step.reward + self.gamma * g;

            let behavior_p = behavior
                .get(step.state)?
                .action(step.act)
                .ok_or(TabrlError::IllegalAction {
                    state: step.state,
                    act: format!("{:?}", step.act),
                })?
                .prob();

            let ps = policy.get_mut(step.state)?;
            let ix = ps.action_index(step.act).ok_or(TabrlError::IllegalAction {
                state: step.state,
                act: format!("{:?}", step.act),
            })?;
            // Target probability before this step's rebalance.
            let target_p = ps.action_at(ix).prob();

            ps.record_visit();
            ps.action_at_mut(ix).update_weighted(w, g);
            ps.rebalance(0.0);
            updated += 1;

            // The taken action fell out of the greedy tie set: the rest of
            // the episode cannot inform the target policy.
            if !ps.action_at(ix).in_policy() {
                break;
            }

            w *= target_p / behavior_p;
            // A zero weight cannot inform earlier steps and would divide
            // by a zero cumulative sum there; a non-finite one has
            // overflowed.
            if w == 0.0 || !w.is_finite() {
                break;
            }
        }

        let mut record = Record::from_scalar("episode_len", ep.len() as f32);
        record.insert("updated_steps", RecordValue::Scalar(updated as f32));
        record.insert(
            "importance_weight",
            RecordValue::Scalar(w as f32),
        );
        Ok(record)
    }
}
