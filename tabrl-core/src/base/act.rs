//! Action.
use std::fmt::Debug;

/// An action of an environment.
///
/// Actions are small copyable values, typically fieldless enums. Equality is
/// used to locate an action inside a state's legal set, so two values
/// representing the same action must compare equal.
pub trait Act: Copy + Clone + Debug + PartialEq {}
