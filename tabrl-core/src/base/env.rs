//! Environment.
use super::{Act, State, StateId};
use anyhow::Result;

/// The result of one environment step.
///
/// `is_truncated` is set by environments (or wrappers around them) that end
/// a trajectory early, for example when a cycle guard detects a revisited
/// state. The learning algorithms treat a truncated transition like a
/// terminal one and must tolerate it at any step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transition {
    /// The state reached by the step.
    pub next: StateId,

    /// Reward of the step.
    pub reward: f64,

    /// Flag denoting that `next` is a terminal state.
    pub is_terminated: bool,

    /// Flag denoting that the trajectory was cut short by the environment.
    pub is_truncated: bool,
}

impl Transition {
    #[inline]
    /// Terminated or truncated.
    pub fn is_done(&self) -> bool {
        self.is_terminated || self.is_truncated
    }
}

/// Represents an environment, a finite MDP.
///
/// The learning core consumes this capability set and never inspects
/// environment internals. Transition geometry, reward shaping and terminal
/// placement all live behind this trait.
pub trait Env {
    /// Configurations.
    type Config: Clone;

    /// Action of the environment.
    type Act: Act;

    /// Builds an environment with a given random seed.
    fn build(config: &Self::Config, seed: u64) -> Result<Self>
    where
        Self: Sized;

    /// Prepares the environment for a fresh trajectory.
    ///
    /// Stateless environments keep the default no-op. Wrappers that track
    /// per-trajectory state (see the cycle guard in `tabrl-grid-env`) clear
    /// it here.
    fn reset(&mut self) -> Result<()> {
        Ok(())
    }

    /// The number of states, including terminal ones.
    fn n_states(&self) -> usize;

    /// The state with the given id.
    ///
    /// Panics if `id` is out of range; passing a foreign id is a
    /// programming error, not a recoverable condition.
    fn state(&self, id: StateId) -> &State<Self::Act>;

    /// Every state including terminal ones, for table initialization.
    fn states_plus(&self) -> Vec<StateId>;

    /// Only the non-terminal states, for episode start-state sampling.
    fn states(&self) -> Vec<StateId>;

    /// A designated start state, if the environment has one.
    fn start_state(&self) -> Option<StateId> {
        None
    }

    /// Performs an environment step.
    ///
    /// Must return some valid transition for any legal action of a
    /// non-terminal state; an illegal action fails with
    /// [`TabrlError::IllegalAction`](crate::error::TabrlError).
    fn transit(&mut self, state: StateId, act: Self::Act) -> Result<Transition>;
}
