//! Default implementation of the [`Evaluator`] trait.
use super::{greedy_step, Evaluator};
use crate::{error::TabrlError, Env, PolicyTable};
use anyhow::Result;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Runs a fixed number of greedy episodes and averages their returns.
///
/// Episodes start at the environment's designated start state if it has
/// one, otherwise at a uniformly random non-terminal state. Actions are
/// the greedy choices of the evaluated table; ties resolve to the first
/// maximal action.
pub struct DefaultEvaluator {
    n_episodes: usize,
    step_cap: usize,
    rng: StdRng,
}

impl DefaultEvaluator {
    /// Constructs a new [`DefaultEvaluator`].
    pub fn new(n_episodes: usize, step_cap: usize, seed: u64) -> Self {
        Self {
            n_episodes,
            step_cap,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<E: Env> Evaluator<E> for DefaultEvaluator {
    fn evaluate(&mut self, env: &mut E, policy: &PolicyTable<E::Act>) -> Result<f64> {
        let mut r_total = 0.0;

        for _ in 0..self.n_episodes {
            env.reset()?;
            let mut cur = match env.start_state() {
                Some(s) => s,
                None => {
                    let states = env.states();
                    if states.is_empty() {
                        return Err(TabrlError::NoStates.into());
                    }
                    states[self.rng.gen_range(0..states.len())]
                }
            };

            let mut steps = 0;
            loop {
                let t = greedy_step(env, policy, cur)?;
                r_total += t.reward;
                if t.is_done() {
                    break;
                }
                cur = t.next;
                steps += 1;
                if steps >= self.step_cap {
                    return Err(TabrlError::EpisodeTruncated { steps }.into());
                }
            }
        }

        Ok(r_total / self.n_episodes as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{deterministic_right, LineConfig, LineWorld};

    #[test]
    fn greedy_evaluation_matches_hand_computed_return() {
        let mut env = LineWorld::fixture(LineConfig {
            len: 5,
            step_reward: -1.0,
            goal_reward: 5.0,
        });
        let policy = deterministic_right(&env);
        let mut evaluator = DefaultEvaluator::new(3, 100, 0);

        // Start state is the middle (s2): two steps right, -1 + 4.
        let avg = Evaluator::<LineWorld>::evaluate(&mut evaluator, &mut env, &policy).unwrap();
        assert!((avg - 3.0).abs() < 1e-9);
    }
}
