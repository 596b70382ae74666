//! Errors in the library.
use crate::StateId;
use thiserror::Error;

/// Errors in the library.
///
/// All variants are local to one update call; no recovery state is kept
/// across calls.
#[derive(Error, Debug)]
pub enum TabrlError {
    /// A state was looked up that the policy table does not contain.
    #[error("unknown state: {0}")]
    UnknownState(StateId),

    /// An action outside a state's legal set was requested.
    #[error("illegal action {act} at state {state}")]
    IllegalAction {
        /// State at which the action was requested.
        state: StateId,
        /// Debug rendering of the offending action.
        act: String,
    },

    /// Action sampling was attempted at a state without actions.
    #[error("state {0} has no actions to sample")]
    NoActions(StateId),

    /// The environment has no non-terminal states to start an episode from.
    #[error("environment has no non-terminal states")]
    NoStates,

    /// An episode exceeded the step cap without reaching a terminal state.
    #[error("episode did not terminate within {steps} steps")]
    EpisodeTruncated {
        /// Number of steps generated before giving up.
        steps: usize,
    },

    /// Record key error.
    #[error("record key error: {0}")]
    RecordKeyError(String),

    /// Record value type error.
    #[error("record value type error: {0}")]
    RecordValueTypeError(String),
}
