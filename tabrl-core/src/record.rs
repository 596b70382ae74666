//! Types and traits for recording training metrics.
//!
//! [`Record`] is a container of key-value pairs produced during learning
//! runs, [`Recorder`] is the interface through which the
//! [`Trainer`](crate::Trainer) writes them out. [`NullRecorder`] discards
//! everything, [`BufferedRecorder`] keeps records in memory for inspection
//! after a run.
mod base;
mod buffered_recorder;
mod null_recorder;
mod recorder;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use null_recorder::NullRecorder;
pub use recorder::Recorder;
