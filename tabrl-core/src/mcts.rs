//! Monte Carlo tree search.
use crate::{
    error::TabrlError,
    record::{Record, RecordValue},
    Configurable, Env, Learner, PolicyTable, StateId,
};
use anyhow::Result;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Configuration of [`Mcts`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct MctsConfig {
    /// Exploration constant of the UCB score.
    pub c: f64,

    /// Maximum rollout length before the simulation fails.
    pub rollout_cap: usize,

    /// Seed of the random number generator.
    pub seed: u64,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            c: std::f64::consts::SQRT_2,
            rollout_cap: 100_000,
            seed: 42,
        }
    }
}

impl MctsConfig {
    /// Sets the exploration constant.
    pub fn c(mut self, v: f64) -> Self {
        self.c = v;
        self
    }

    /// Sets the rollout step cap.
    pub fn rollout_cap(mut self, v: usize) -> Self {
        self.rollout_cap = v;
        self
    }

    /// Sets the seed of the random number generator.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }
}

/// Monte Carlo tree search over the policy table.
///
/// One [`Learner::episode`] call is one simulation: selection walks the
/// states already in the table by UCB score (never-tried actions score
/// +inf, so they are forced before any exploitation), expansion adds the
/// first state the walk leaves the table at, the rollout follows a
/// uniform-random policy to a terminal state and keeps only the terminal
/// reward, and backpropagation pops the recorded path, counting visits and
/// wins (reward > 0) and re-running the UCB rebalance at every state on
/// it.
///
/// The table passed in should start empty ([`PolicyTable::empty`]); the
/// tree grows lazily as states are expanded. Environments may report
/// truncated transitions at any step (for example a cycle guard forcing
/// termination with a penalty); selection and rollout treat those exactly
/// like terminal ones.
pub struct Mcts {
    c: f64,
    rollout_cap: usize,
    rng: StdRng,
}

impl Configurable for Mcts {
    type Config = MctsConfig;

    fn build(config: Self::Config) -> Self {
        Self {
            c: config.c,
            rollout_cap: config.rollout_cap,
            rng: StdRng::seed_from_u64(config.seed),
        }
    }
}

impl Mcts {
    fn rollout<E: Env>(&mut self, env: &mut E, from: StateId) -> Result<f64> {
        let mut cur = from;
        for _ in 0..self.rollout_cap {
            let act = {
                let actions = env.state(cur).actions();
                if actions.is_empty() {
                    return Ok(0.0);
                }
                actions[self.rng.gen_range(0..actions.len())]
            };
            let t = env.transit(cur, act)?;
            if t.is_done() {
                return Ok(t.reward);
            }
            cur = t.next;
        }
        Err(TabrlError::EpisodeTruncated {
            steps: self.rollout_cap,
        }
        .into())
    }
}

impl<E: Env> Learner<E> for Mcts {
    fn episode(&mut self, env: &mut E, policy: &mut PolicyTable<E::Act>) -> Result<Record> {
        env.reset()?;
        let root = env
            .start_state()
            .or_else(|| env.states().first().copied())
            .ok_or(TabrlError::NoStates)?;

        // Selection: follow UCB through the expanded part of the tree,
        // recording the path. A terminal or truncated transition jumps
        // straight to backpropagation with its reward.
        let mut path: Vec<(StateId, E::Act)> = Vec::new();
        let mut cur = root;
        let mut outcome = None;
        while policy.contains(cur) {
            if path.len() >= self.rollout_cap {
                // A cyclic selection path that never leaves the tree.
                return Err(TabrlError::EpisodeTruncated {
                    steps: self.rollout_cap,
                }
                .into());
            }
            let act = match policy.get(cur)?.ucb_action(self.c) {
                Some(a) => a,
                None => break,
            };
            let t = env.transit(cur, act)?;
            path.push((cur, act));
            if t.is_done() {
                outcome = Some(t.reward);
                break;
            }
            cur = t.next;
        }

        // Expansion and simulation.
        let reward = match outcome {
            Some(r) => r,
            None => {
                let actions = env.state(cur).actions().to_vec();
                policy.insert_uniform(cur, &actions);
                self.rollout(env, cur)?
            }
        };

        // Backpropagation along the recorded path.
        let win = reward > 0.0;
        for (state, act) in path.iter().rev() {
            let ps = policy.get_mut(*state)?;
            let ix = ps.action_index(*act).ok_or(TabrlError::IllegalAction {
                state: *state,
                act: format!("{:?}", act),
            })?;
            ps.record_visit();
            ps.action_at_mut(ix).update_win(win);
            ps.rebalance_ucb(self.c);
        }

        let mut record = Record::from_scalar("path_len", path.len() as f32);
        record.insert("reward", RecordValue::Scalar(reward as f32));
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{GuardedLine, LineConfig, Walk};
    use crate::Env;

    fn fixture() -> (GuardedLine, PolicyTable<Walk>) {
        let env = GuardedLine::fixture(LineConfig {
            len: 5,
            step_reward: 0.0,
            goal_reward: 1.0,
        });
        let n = env.n_states();
        (env, PolicyTable::empty(n))
    }

    #[test]
    fn tree_grows_from_the_root() {
        let (mut env, mut policy) = fixture();
        let mut mcts = Mcts::build(MctsConfig::default().seed(43));

        assert_eq!(policy.states().count(), 0);
        Learner::<GuardedLine>::episode(&mut mcts, &mut env, &mut policy).unwrap();
        // The first simulation expands exactly the root.
        assert_eq!(policy.states().count(), 1);
        assert!(policy.contains(env.start_state().unwrap()));

        for _ in 0..50 {
            Learner::<GuardedLine>::episode(&mut mcts, &mut env, &mut policy).unwrap();
        }
        assert!(policy.states().count() > 1);
    }

    #[test]
    fn untried_actions_are_selected_before_retries() {
        let (mut env, mut policy) = fixture();
        let mut mcts = Mcts::build(MctsConfig::default().seed(47));

        // Expand the root, then run one more simulation: its first
        // selection step must pick an action, and the second simulation
        // after that must pick the other, untried one.
        for _ in 0..3 {
            Learner::<GuardedLine>::episode(&mut mcts, &mut env, &mut policy).unwrap();
        }
        let root = env.start_state().unwrap();
        let ps = policy.get(root).unwrap();
        for (_, sap) in ps.actions() {
            assert!(sap.visits() >= 1, "an untried action was passed over");
        }
    }

    #[test]
    fn repeated_search_prefers_the_goal_direction() {
        let (mut env, mut policy) = fixture();
        let mut mcts = Mcts::build(MctsConfig::default().seed(53));

        for _ in 0..2000 {
            Learner::<GuardedLine>::episode(&mut mcts, &mut env, &mut policy).unwrap();
        }
        let root = env.start_state().unwrap();
        let ps = policy.get(root).unwrap();
        let right = ps.action(Walk::Right).unwrap();
        let left = ps.action(Walk::Left).unwrap();
        assert!(right.value_or(0.0) > left.value_or(0.0));
    }

    #[test]
    fn fixed_seed_runs_are_identical() {
        let run = || {
            let (mut env, mut policy) = fixture();
            let mut mcts = Mcts::build(MctsConfig::default().seed(59));
            for _ in 0..200 {
                Learner::<GuardedLine>::episode(&mut mcts, &mut env, &mut policy).unwrap();
            }
            policy
        };
        assert_eq!(run(), run());
    }
}
