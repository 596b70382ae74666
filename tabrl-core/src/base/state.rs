//! State model.
use super::Act;
use std::fmt;

/// Identifies a state of an environment.
///
/// Every state is assigned a stable small integer at environment
/// construction time. All tables in the library are arenas indexed by this
/// id, so two ids referring to the same logical state are the same value
/// and table lookups never depend on hashing or object identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StateId(pub usize);

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A state of an environment.
///
/// Carries the terminal tag and the legal action set. Immutable once the
/// environment is built; a terminal state owns no actions.
#[derive(Clone, Debug, PartialEq)]
pub struct State<A: Act> {
    id: StateId,
    terminal: bool,
    actions: Vec<A>,
}

impl<A: Act> State<A> {
    /// Constructs a state.
    ///
    /// Terminal states must be given an empty action set.
    pub fn new(id: StateId, terminal: bool, actions: Vec<A>) -> Self {
        debug_assert!(!terminal || actions.is_empty());
        Self {
            id,
            terminal,
            actions,
        }
    }

    /// The id of this state.
    pub fn id(&self) -> StateId {
        self.id
    }

    /// Whether this state is terminal.
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// The legal actions of this state.
    pub fn actions(&self) -> &[A] {
        &self.actions
    }
}
