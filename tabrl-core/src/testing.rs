//! Environments used in unit tests.
use crate::{error::TabrlError, Act, Env, PolicyTable, State, StateId, Transition};
use anyhow::Result;

/// Action of [`LineWorld`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Walk {
    /// Towards state 0.
    Left,
    /// Towards the goal end.
    Right,
}

impl Act for Walk {}

/// Configuration of [`LineWorld`].
#[derive(Clone, Debug)]
pub struct LineConfig {
    /// Number of states including the two terminal ends.
    pub len: usize,
    /// Reward of every step.
    pub step_reward: f64,
    /// Extra reward for entering the rightmost (goal) terminal.
    pub goal_reward: f64,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            len: 5,
            step_reward: -1.0,
            goal_reward: 5.0,
        }
    }
}

/// A corridor of states with terminals at both ends.
///
/// Walking right from the state next to the goal earns the goal bonus;
/// walking into the left end earns only the step reward. Deterministic
/// transitions, no cycles, which keeps hand-computed values exact.
pub struct LineWorld {
    states: Vec<State<Walk>>,
    step_reward: f64,
    goal_reward: f64,
}

impl LineWorld {
    /// Builds the corridor directly, without going through [`Env::build`].
    pub fn fixture(config: LineConfig) -> Self {
        debug_assert!(config.len >= 3);
        let len = config.len;
        let states = (0..len)
            .map(|ix| {
                let terminal = ix == 0 || ix == len - 1;
                let actions = if terminal {
                    vec![]
                } else {
                    vec![Walk::Left, Walk::Right]
                };
                State::new(StateId(ix), terminal, actions)
            })
            .collect();
        Self {
            states,
            step_reward: config.step_reward,
            goal_reward: config.goal_reward,
        }
    }

    /// Restricts every non-terminal state to the single action `Right`.
    ///
    /// With one action per state, any two policies over this world agree
    /// with probability 1, which is what the importance-sampling tests
    /// need.
    pub fn right_only(mut self) -> Self {
        let len = self.states.len();
        self.states = (0..len)
            .map(|ix| {
                let terminal = ix == 0 || ix == len - 1;
                let actions = if terminal { vec![] } else { vec![Walk::Right] };
                State::new(StateId(ix), terminal, actions)
            })
            .collect();
        self
    }
}

impl Env for LineWorld {
    type Config = LineConfig;
    type Act = Walk;

    fn build(config: &Self::Config, _seed: u64) -> Result<Self> {
        Ok(Self::fixture(config.clone()))
    }

    fn n_states(&self) -> usize {
        self.states.len()
    }

    fn state(&self, id: StateId) -> &State<Walk> {
        &self.states[id.0]
    }

    fn states_plus(&self) -> Vec<StateId> {
        self.states.iter().map(|s| s.id()).collect()
    }

    fn states(&self) -> Vec<StateId> {
        self.states
            .iter()
            .filter(|s| !s.is_terminal())
            .map(|s| s.id())
            .collect()
    }

    fn start_state(&self) -> Option<StateId> {
        Some(StateId(self.states.len() / 2))
    }

    fn transit(&mut self, state: StateId, act: Walk) -> Result<Transition> {
        if !self.state(state).actions().contains(&act) {
            return Err(TabrlError::IllegalAction {
                state,
                act: format!("{:?}", act),
            }
            .into());
        }
        let next = match act {
            Walk::Left => StateId(state.0 - 1),
            Walk::Right => StateId(state.0 + 1),
        };
        let goal = next.0 == self.states.len() - 1;
        let terminal = self.state(next).is_terminal();
        Ok(Transition {
            next,
            reward: self.step_reward + if goal { self.goal_reward } else { 0.0 },
            is_terminated: terminal,
            is_truncated: false,
        })
    }
}

/// [`LineWorld`] behind a revisit guard, for the tree-search tests.
///
/// Force-terminates with a zero reward as soon as a trajectory enters a
/// state it has already been in. Mirrors the cycle-guard wrapper of the
/// environment crates; tree search relies on some such wrapper whenever
/// the state graph has cycles.
pub struct GuardedLine {
    inner: LineWorld,
    visited: Vec<bool>,
}

impl GuardedLine {
    /// Wraps a corridor fixture.
    pub fn fixture(config: LineConfig) -> Self {
        let inner = LineWorld::fixture(config);
        let visited = vec![false; inner.n_states()];
        Self { inner, visited }
    }
}

impl Env for GuardedLine {
    type Config = LineConfig;
    type Act = Walk;

    fn build(config: &Self::Config, _seed: u64) -> Result<Self> {
        Ok(Self::fixture(config.clone()))
    }

    fn reset(&mut self) -> Result<()> {
        self.visited.iter_mut().for_each(|v| *v = false);
        Ok(())
    }

    fn n_states(&self) -> usize {
        self.inner.n_states()
    }

    fn state(&self, id: StateId) -> &State<Walk> {
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

    fn transit(&mut self, state: StateId, act: Walk) -> Result<Transition> {
        self.visited[state.0] = true;
        let mut t = self.inner.transit(state, act)?;
        if !t.is_terminated && self.visited[t.next.0] {
            t.reward = 0.0;
            t.is_truncated = true;
        }
        Ok(t)
    }
}

/// A full table that always walks right, for prediction tests.
pub fn deterministic_right(env: &LineWorld) -> PolicyTable<Walk> {
    let mut policy = PolicyTable::for_env(env);
    for id in env.states() {
        let ps = policy.get_mut(id).unwrap();
        let ix = ps.action_index(Walk::Right).unwrap();
        ps.action_at_mut(ix).update_mean(1.0);
        ps.rebalance(0.0);
    }
    policy
}
