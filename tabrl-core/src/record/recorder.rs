use super::Record;

/// Writes a record to an output destination.
pub trait Recorder {
    /// Write a record to the [`Recorder`].
    fn write(&mut self, record: Record);

    /// Writes out anything buffered so far.
    fn flush(&mut self, _step: i64) {}
}
