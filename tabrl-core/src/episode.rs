//! Episode generation.
//!
//! An episode is one trajectory from a sampled start state to a terminal
//! state. [`EpisodeSampler`] produces the steps lazily, so a consumer may
//! stop early; [`sample_episode`] materializes a whole episode under an
//! explicit step cap. Every call produces a fresh random trajectory; the
//! sequence is not restartable.
use crate::{error::TabrlError, Act, Env, PolicyTable, StateId};
use anyhow::Result;
use rand::{rngs::StdRng, Rng};

/// One (state, action, reward) triple of an episode.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EpisodeStep<A: Act> {
    /// State the action was taken in.
    pub state: StateId,
    /// The action taken.
    pub act: A,
    /// Reward of the step.
    pub reward: f64,
}

/// An ordered, finite sequence of episode steps.
pub type Episode<A> = Vec<EpisodeStep<A>>;

/// Lazily draws one episode against an environment.
///
/// The starting state is picked uniformly at random among the non-terminal
/// states. With an exploring start the first action is also uniform over
/// the state's legal set, bypassing the policy; this guarantees full
/// state-action coverage even for a degenerate policy. Every other action
/// is sampled from the policy table's distribution.
pub struct EpisodeSampler<'a, E: Env> {
    env: &'a mut E,
    policy: &'a PolicyTable<E::Act>,
    rng: &'a mut StdRng,
    exploring_start: bool,
    cur: Option<StateId>,
    first: bool,
}

impl<'a, E: Env> EpisodeSampler<'a, E> {
    /// Starts a fresh trajectory.
    pub fn new(
        env: &'a mut E,
        policy: &'a PolicyTable<E::Act>,
        exploring_start: bool,
        rng: &'a mut StdRng,
    ) -> Result<Self> {
        env.reset()?;
        let states = env.states();
        if states.is_empty() {
            return Err(TabrlError::NoStates.into());
        }
        let start = states[rng.gen_range(0..states.len())];
        Ok(Self {
            env,
            policy,
            rng,
            exploring_start,
            cur: Some(start),
            first: true,
        })
    }

    /// Whether the trajectory has reached a terminal state.
    pub fn finished(&self) -> bool {
        self.cur.is_none()
    }
}

impl<'a, E: Env> Iterator for EpisodeSampler<'a, E> {
    type Item = Result<EpisodeStep<E::Act>>;

    fn next(&mut self) -> Option<Self::Item> {
        let state = self.cur?;

        let act = if self.first && self.exploring_start {
            let actions = self.env.state(state).actions();
            if actions.is_empty() {
                self.cur = None;
                return Some(Err(TabrlError::NoActions(state).into()));
            }
            actions[self.rng.gen_range(0..actions.len())]
        } else {
            match self.policy.sample(state, self.rng) {
                Ok(a) => a,
                Err(e) => {
                    self.cur = None;
                    return Some(Err(e.into()));
                }
            }
        };
        self.first = false;

        let t = match self.env.transit(state, act) {
            Ok(t) => t,
            Err(e) => {
                self.cur = None;
                return Some(Err(e));
            }
        };
        self.cur = if t.is_done() { None } else { Some(t.next) };

        Some(Ok(EpisodeStep {
            state,
            act,
            reward: t.reward,
        }))
    }
}

/// Materializes one episode, failing if it exceeds `step_cap` steps.
///
/// The cap is the external mitigation for environments whose state graph
/// never reaches a terminal state under the sampled policy; hitting it
/// surfaces [`TabrlError::EpisodeTruncated`] instead of hanging.
pub fn sample_episode<E: Env>(
    env: &mut E,
    policy: &PolicyTable<E::Act>,
    exploring_start: bool,
    rng: &mut StdRng,
    step_cap: usize,
) -> Result<Episode<E::Act>> {
    let mut sampler = EpisodeSampler::new(env, policy, exploring_start, rng)?;
    let mut steps = Vec::new();
    while let Some(step) = sampler.next() {
        steps.push(step?);
        if steps.len() >= step_cap && !sampler.finished() {
            return Err(TabrlError::EpisodeTruncated { steps: steps.len() }.into());
        }
    }
    Ok(steps)
}
