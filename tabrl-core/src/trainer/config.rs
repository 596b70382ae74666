//! Configuration of [`Trainer`](super::Trainer).
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Trainer`](super::Trainer).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct TrainerConfig {
    /// The maximum number of training iterations.
    pub max_iters: usize,

    /// Interval of evaluation in iterations. Zero disables evaluation.
    pub eval_interval: usize,

    /// Interval of flushing records in iterations. Zero disables flushing.
    pub flush_record_interval: usize,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            max_iters: 0,
            eval_interval: 0,
            flush_record_interval: 0,
        }
    }
}

impl TrainerConfig {
    /// Sets the number of training iterations.
    pub fn max_iters(mut self, v: usize) -> Self {
        self.max_iters = v;
        self
    }

    /// Sets the interval of evaluation in iterations.
    pub fn eval_interval(mut self, v: usize) -> Self {
        self.eval_interval = v;
        self
    }

    /// Sets the interval of flushing records in iterations.
    pub fn flush_record_interval(mut self, v: usize) -> Self {
        self.flush_record_interval = v;
        self
    }

    /// Constructs [`TrainerConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`TrainerConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
