#![warn(missing_docs)]
//! Grid world environments for `tabrl-core`.
//!
//! [`GridWorld`] is a deterministic rectangular grid with configurable
//! terminal cells and rewards. [`VisitedGuard`] wraps any environment and
//! force-terminates a trajectory that revisits a state, which tree search
//! needs on cyclic state graphs.
mod grid_world;
pub use grid_world::{GridWorld, GridWorldConfig, Move};

mod guard;
pub use guard::{VisitedGuard, VisitedGuardConfig};
