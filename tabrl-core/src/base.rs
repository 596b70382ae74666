//! Core functionalities.
mod act;
mod env;
mod learner;
mod state;
pub use act::Act;
pub use env::{Env, Transition};
pub use learner::{Configurable, Learner};
pub use state::{State, StateId};
