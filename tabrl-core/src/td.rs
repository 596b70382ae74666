//! Temporal-difference control.
//!
//! One-step SARSA, Q-learning and Expected SARSA share a single skeleton
//! over a materialized episode; the n-step variant generalizes the
//! lookahead window with a bounded FIFO of pending steps. All of them use
//! a constant step size rather than the 1/N incremental mean of the Monte
//! Carlo methods, which lets them track non-stationary targets.
mod bank;
mod n_step;
mod one_step;

pub use bank::ReturnBank;
pub use n_step::{NStepSarsa, NStepSarsaConfig};
pub use one_step::{Backup, OneStepTd, OneStepTdConfig};
