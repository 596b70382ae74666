//! Arena-indexed policy table.
use super::PolicyState;
use crate::{error::TabrlError, Act, Env, StateId};
use rand::rngs::StdRng;

/// Mapping from states to their policy records.
///
/// The table is backed by a vector indexed by [`StateId`], so lookups never
/// depend on hashing or object identity. Entries are either pre-created for
/// every state of an environment ([`PolicyTable::for_env`]) or grown lazily
/// one state at a time ([`PolicyTable::insert_uniform`]), which is how the
/// tree-search algorithm expands its tree.
#[derive(Clone, Debug, PartialEq)]
pub struct PolicyTable<A: Act> {
    entries: Vec<Option<PolicyState<A>>>,
}

impl<A: Act> PolicyTable<A> {
    /// An empty table able to hold `n_states` entries.
    pub fn empty(n_states: usize) -> Self {
        Self {
            entries: vec![None; n_states],
        }
    }

    /// A table with a uniform record for every state of the environment.
    ///
    /// Terminal states get an empty record; they are never sampled for
    /// actions.
    pub fn for_env<E: Env<Act = A>>(env: &E) -> Self {
        let mut table = Self::empty(env.n_states());
        for id in env.states_plus() {
            let state = env.state(id);
            table.entries[id.0] = Some(PolicyState::uniform(state.actions()));
        }
        table
    }

    /// Number of entry slots, present or not.
    pub fn n_states(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has a record for the given state.
    pub fn contains(&self, id: StateId) -> bool {
        self.entries.get(id.0).map_or(false, Option::is_some)
    }

    /// Ids of the states the table has records for.
    pub fn states(&self) -> impl Iterator<Item = StateId> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_some())
            .map(|(ix, _)| StateId(ix))
    }

    /// Inserts a uniform record for a state.
    ///
    /// Replaces any existing record; callers growing a tree check
    /// [`PolicyTable::contains`] first.
    pub fn insert_uniform(&mut self, id: StateId, actions: &[A]) {
        self.entries[id.0] = Some(PolicyState::uniform(actions));
    }

    /// The record of a state.
    pub fn get(&self, id: StateId) -> Result<&PolicyState<A>, TabrlError> {
        self.entries
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or(TabrlError::UnknownState(id))
    }

    /// Mutable access to the record of a state.
    pub fn get_mut(&mut self, id: StateId) -> Result<&mut PolicyState<A>, TabrlError> {
        self.entries
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(TabrlError::UnknownState(id))
    }

    /// Samples an action at a state from the current distribution.
    pub fn sample(&self, id: StateId, rng: &mut StdRng) -> Result<A, TabrlError> {
        self.get(id)?.sample(rng).ok_or(TabrlError::NoActions(id))
    }

    /// Rebalances every present record with the given epsilon.
    pub fn rebalance_all(&mut self, epsilon: f64) {
        for entry in self.entries.iter_mut().flatten() {
            entry.rebalance(epsilon);
        }
    }
}
