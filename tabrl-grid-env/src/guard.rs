//! Revisit guard for cyclic environments.
use anyhow::Result;
use tabrl_core::{Env, State, StateId, Transition};

/// Configuration of [`VisitedGuard`].
#[derive(Clone, Debug)]
pub struct VisitedGuardConfig<C: Clone> {
    /// Configuration of the wrapped environment.
    pub inner: C,

    /// Reward of a truncated (revisiting) step.
    pub penalty: f64,
}

impl<C: Clone> VisitedGuardConfig<C> {
    /// Constructs a new [`VisitedGuardConfig`].
    pub fn new(inner: C, penalty: f64) -> Self {
        Self { inner, penalty }
    }
}

/// Wraps an environment and truncates a trajectory that revisits a state.
///
/// Every transition marks its source state as visited. A step into an
/// already-visited state keeps the wrapped transition's destination but
/// reports it as truncated with the configured penalty reward. Guarded
/// episodes are therefore finite even on cyclic state graphs, which
/// uninformed tree-search rollouts rely on.
pub struct VisitedGuard<E: Env> {
    inner: E,
    visited: Vec<bool>,
    penalty: f64,
}

impl<E: Env> VisitedGuard<E> {
    /// The wrapped environment.
    pub fn inner(&self) -> &E {
        &self.inner
    }
}

impl<E: Env> Env for VisitedGuard<E> {
    type Config = VisitedGuardConfig<E::Config>;
    type Act = E::Act;

    fn build(config: &Self::Config, seed: u64) -> Result<Self> {
        let inner = E::build(&config.inner, seed)?;
        let visited = vec![false; inner.n_states()];
        Ok(Self {
            inner,
            visited,
            penalty: config.penalty,
        })
    }

    fn reset(&mut self) -> Result<()> {
        self.inner.reset()?;
        self.visited.iter_mut().for_each(|v| *v = false);
        Ok(())
    }

    fn n_states(&self) -> usize {
        self.inner.n_states()
    }

    fn state(&self, id: StateId) -> &State<Self::Act> {
        self.inner.state(id)
    }

    fn states_plus(&self) -> Vec<StateId> {
        self.inner.states_plus()
    }

    fn states(&self) -> Vec<StateId> {
        self.inner.states()
    }

    fn start_state(&self) -> Option<StateId> {
        self.inner.start_state()
    }

    fn transit(&mut self, state: StateId, act: Self::Act) -> Result<Transition> {
        let t = self.inner.transit(state, act)?;
        self.visited[state.0] = true;
        if !t.is_done() && self.visited[t.next.0] {
            return Ok(Transition {
                next: t.next,
                reward: self.penalty,
                is_terminated: false,
                is_truncated: true,
            });
        }
        Ok(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GridWorld, GridWorldConfig, Move};

    fn guarded() -> VisitedGuard<GridWorld> {
        let config = VisitedGuardConfig::new(GridWorldConfig::default().start(1, 1), -5.0);
        VisitedGuard::build(&config, 0).unwrap()
    }

    #[test]
    fn revisiting_a_state_truncates_with_the_penalty() {
        let mut env = guarded();
        env.reset().unwrap();

        let t = env.transit(StateId(5), Move::Right).unwrap();
        assert_eq!(t.next, StateId(6));
        assert!(!t.is_done());

        // Stepping back onto (1, 1) truncates.
        let t = env.transit(StateId(6), Move::Left).unwrap();
        assert_eq!(t.next, StateId(5));
        assert!(t.is_truncated);
        assert!(!t.is_terminated);
        assert_eq!(t.reward, -5.0);
    }

    #[test]
    fn reset_clears_the_visited_set() {
        let mut env = guarded();
        env.reset().unwrap();
        env.transit(StateId(5), Move::Right).unwrap();
        env.reset().unwrap();

        // (1, 1) is fresh again after reset.
        let t = env.transit(StateId(6), Move::Left).unwrap();
        assert!(!t.is_truncated);
    }

    #[test]
    fn terminal_transitions_pass_through_unchanged() {
        let mut env = guarded();
        env.reset().unwrap();
        env.transit(StateId(1), Move::Right).unwrap();

        // Entering the terminal ends the episode even though (0, 0) was
        // never visited.
        let t = env.transit(StateId(1), Move::Left).unwrap();
        assert!(t.is_terminated);
        assert_eq!(t.reward, 1.0);
    }
}
