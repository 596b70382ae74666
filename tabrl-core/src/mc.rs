//! Monte Carlo prediction and control.
//!
//! All four algorithms share the same shape: generate one full episode,
//! walk it in reverse accumulating the discounted return, and fold the
//! returns into the policy table. They differ in what they key on (states
//! or state-action pairs), how episodes are generated (current policy,
//! exploring starts, or a separate behavior policy) and when rebalancing
//! happens.
mod exploring_starts;
mod off_policy;
mod on_policy;
mod prediction;

pub use exploring_starts::{MonteCarloEs, MonteCarloEsConfig};
pub use off_policy::{OffPolicyControl, OffPolicyControlConfig};
pub use on_policy::{OnPolicyControl, OnPolicyControlConfig};
pub use prediction::{McPredictionConfig, MonteCarloPrediction, VisitMode};

use crate::{Act, Episode};

/// Discounted return of every step, computed by one reverse pass.
fn returns<A: Act>(episode: &Episode<A>, gamma: f64) -> Vec<f64> {
    let mut gs = vec![0.0; episode.len()];
    let mut g = 0.0;
    for (ix, step) in episode.iter().enumerate().rev() {
        g = step.reward + gamma * g;
        gs[ix] = g;
    }
    gs
}
