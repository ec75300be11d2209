use crate::models::error::RecorderError;

/// Append-only destination for encoded bytes, owned by the encode worker.
pub trait EncodedSink: Send {
    /// Append a block of encoded bytes.
    fn write(&mut self, data: &[u8]) -> Result<(), RecorderError>;

    /// Flush and close the sink. Called exactly once, after the encoder's
    /// flushed tail has been written.
    fn finish(&mut self) -> Result<(), RecorderError>;
}

/// Factory for sinks, invoked once per session during `start()`.
pub trait SinkProvider: Send + Sync {
    fn open(&self) -> Result<Box<dyn EncodedSink>, RecorderError>;
}
