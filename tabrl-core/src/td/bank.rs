//! Bounded FIFO of pending n-step returns.
use crate::{Act, EpisodeStep};
use std::collections::VecDeque;

/// Holds the last N pending (state, action, reward) triples of an episode
/// and computes the discounted partial return over them on demand.
///
/// Transient: one bank lives for one episode sweep.
#[derive(Debug)]
pub struct ReturnBank<A: Act> {
    steps: VecDeque<EpisodeStep<A>>,
    cap: usize,
}

impl<A: Act> ReturnBank<A> {
    /// A bank holding up to `cap` steps; a capacity below 1 is raised to 1.
    pub fn new(cap: usize) -> Self {
        let cap = cap.max(1);
        Self {
            steps: VecDeque::with_capacity(cap),
            cap,
        }
    }

    /// Number of pending steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns true if no step is pending.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Returns true once the bank holds its full capacity of steps.
    pub fn is_full(&self) -> bool {
        self.steps.len() == self.cap
    }

    /// Enqueues a step.
    pub fn push(&mut self, step: EpisodeStep<A>) {
        debug_assert!(self.steps.len() < self.cap);
        self.steps.push_back(step);
    }

    /// Dequeues the oldest pending step.
    pub fn pop(&mut self) -> Option<EpisodeStep<A>> {
        self.steps.pop_front()
    }

    /// Discounted partial return over the pending rewards, oldest first.
    pub fn partial_return(&self, gamma: f64) -> f64 {
        self.steps
            .iter()
            .enumerate()
            .map(|(k, step)| gamma.powi(k as i32) * step.reward)
            .sum()
    }
}
