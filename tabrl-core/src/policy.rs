//! Stochastic tabular policies.
//!
//! A [`PolicyTable`] maps every state of an environment to a
//! [`PolicyState`], which holds the state's value estimate and one
//! [`StateActionPolicy`] record per legal action. Action-selection
//! probabilities are recomputed from the current value estimates by the
//! rebalancing operations; after every rebalance the probabilities of a
//! state's actions sum to 1 and exactly the maximal actions carry the
//! exploitation mass.
mod policy_state;
mod state_action;
mod table;

pub use policy_state::PolicyState;
pub use state_action::StateActionPolicy;
pub use table::PolicyTable;
