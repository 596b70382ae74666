//! Base implementation of records for logging.
use crate::error::TabrlError;
use chrono::prelude::{DateTime, Local};
use std::{
    collections::{
        hash_map::{Iter, Keys},
        HashMap,
    },
    convert::Into,
};

/// Represents possible types of values in a [`Record`].
#[derive(Debug, Clone)]
pub enum RecordValue {
    /// A single floating-point value, typically a metric.
    Scalar(f32),

    /// A timestamp with local timezone.
    DateTime(DateTime<Local>),

    /// A text value.
    String(String),
}

/// A container of metrics for one training iteration.
#[derive(Debug, Default)]
pub struct Record(HashMap<String, RecordValue>);

impl Record {
    /// Creates an empty record.
    pub fn empty() -> Self {
        Self(HashMap::new())
    }

    /// Creates a record containing a single scalar value.
    pub fn from_scalar(name: impl Into<String>, value: f32) -> Self {
        Self(HashMap::from([(name.into(), RecordValue::Scalar(value))]))
    }

    /// Returns an iterator over the keys in the record.
    pub fn keys(&self) -> Keys<String, RecordValue> {
        self.0.keys()
    }

    /// Returns an iterator over key-value pairs in the record.
    pub fn iter(&self) -> Iter<'_, String, RecordValue> {
        self.0.iter()
    }

    /// Inserts a key-value pair into the record.
    pub fn insert(&mut self, k: impl Into<String>, v: RecordValue) {
        self.0.insert(k.into(), v);
    }

    /// Returns the value for the given key, if present.
    pub fn get(&self, k: &str) -> Option<&RecordValue> {
        self.0.get(k)
    }

    /// Returns true if the record has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Merges the entries of another record into this one.
    pub fn merge(mut self, record: Record) -> Self {
        self.0.extend(record.0);
        self
    }

    /// Gets a scalar value for the given key.
    ///
    /// Fails if the key is absent or holds a non-scalar value.
    pub fn get_scalar(&self, k: &str) -> Result<f32, TabrlError> {
        match self.0.get(k) {
            Some(RecordValue::Scalar(v)) => Ok(*v),
            Some(_) => Err(TabrlError::RecordValueTypeError("Scalar".into())),
            None => Err(TabrlError::RecordKeyError(k.into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_scalar() {
        let mut record = Record::from_scalar("loss", 0.5);
        record.insert("note", RecordValue::String("warmup".into()));

        assert_eq!(record.keys().count(), 2);
        assert_eq!(record.get_scalar("loss").unwrap(), 0.5);
        assert!(record.get_scalar("note").is_err());
        assert!(record.get_scalar("missing").is_err());
    }

    #[test]
    fn merge_overwrites() {
        let a = Record::from_scalar("x", 1.0);
        let b = Record::from_scalar("x", 2.0);
        assert_eq!(a.merge(b).get_scalar("x").unwrap(), 2.0);
    }
}
