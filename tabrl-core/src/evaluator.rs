//! Evaluate a policy table.
use crate::{error::TabrlError, Env, PolicyTable};
use anyhow::Result;
mod default_evaluator;
pub use default_evaluator::DefaultEvaluator;

/// Evaluates the current policy of a table.
pub trait Evaluator<E: Env> {
    /// Runs evaluation episodes and returns a summary score.
    fn evaluate(&mut self, env: &mut E, policy: &PolicyTable<E::Act>) -> Result<f64>;
}

pub(crate) fn greedy_step<E: Env>(
    env: &mut E,
    policy: &PolicyTable<E::Act>,
    state: crate::StateId,
) -> Result<crate::Transition> {
    let act = policy
        .get(state)?
        .greedy_action()
        .ok_or(TabrlError::NoActions(state))?;
    env.transit(state, act)
}
