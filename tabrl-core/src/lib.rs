#![warn(missing_docs)]
//! A library for tabular reinforcement learning over finite MDPs.
//!
//! Environments expose their state space and one-step transition function
//! through the [`Env`] trait; a [`PolicyTable`] holds per-state and
//! per-state-action statistics and the rebalancing rule that turns value
//! estimates into a stochastic action-selection distribution. The update
//! algorithms all implement [`Learner`]: Monte Carlo prediction and
//! control (on- and off-policy, with exploring starts and importance
//! sampling), one-step and n-step temporal-difference control, and Monte
//! Carlo tree search. The [`Trainer`] drives any of them for a fixed
//! iteration budget.
pub mod error;
pub mod mc;
pub mod record;
pub mod td;
pub mod util;

mod base;
pub use base::{Act, Configurable, Env, Learner, State, StateId, Transition};

mod policy;
pub use policy::{PolicyState, PolicyTable, StateActionPolicy};

mod episode;
pub use episode::{sample_episode, Episode, EpisodeSampler, EpisodeStep};

mod mcts;
pub use mcts::{Mcts, MctsConfig};

mod evaluator;
pub use evaluator::{DefaultEvaluator, Evaluator};

mod trainer;
pub use trainer::{Trainer, TrainerConfig};

#[cfg(test)]
pub(crate) mod testing;
