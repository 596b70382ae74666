//! Learner.
use super::Env;
use crate::{record::Record, PolicyTable};
use anyhow::Result;
use serde::de::DeserializeOwned;
use std::path::Path;

/// A policy-table update algorithm.
///
/// One call to [`Learner::episode`] is one unit of work: the learner
/// generates a single episode (or tree-search path) against `env` and
/// mutates `policy` accordingly. The [`Trainer`](crate::Trainer) drives
/// this for a fixed iteration budget. The table is exclusively owned by
/// the learner for the duration of the call.
pub trait Learner<E: Env> {
    /// Generates one episode and applies the algorithm's updates.
    fn episode(&mut self, env: &mut E, policy: &mut PolicyTable<E::Act>) -> Result<Record>;
}

/// A configurable object.
pub trait Configurable {
    /// Configuration.
    type Config: Clone + DeserializeOwned;

    /// Builds the object.
    fn build(config: Self::Config) -> Self;

    /// Build the object with the configuration in the yaml file of the given path.
    fn build_from_path(path: impl AsRef<Path>) -> Result<Self>
    where
        Self: Sized,
    {
        let file = std::fs::File::open(path)?;
        let rdr = std::io::BufReader::new(file);
        let config = serde_yaml::from_reader(rdr)?;
        Ok(Self::build(config))
    }
}
