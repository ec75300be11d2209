use crate::models::config::PcmSpec;
use crate::models::error::RecorderError;

/// An open audio input device, owned exclusively by the capture loop.
///
/// `read` is a blocking call that fills the buffer with interleaved PCM
/// samples and returns how many were written; it may return fewer samples
/// than the buffer holds. The device is released when the handle is dropped.
pub trait AudioInput: Send {
    /// Begin delivering samples. Called once, before the first `read`.
    fn start(&mut self) -> Result<(), RecorderError>;

    /// Read the next block of samples into `buffer`.
    ///
    /// Returns the number of valid samples at the front of the buffer.
    /// Anything past that count is stale data from a previous cycle and
    /// must not be consumed.
    fn read(&mut self, buffer: &mut [i16]) -> Result<usize, RecorderError>;

    /// Stop delivering samples. The handle may be dropped afterwards.
    fn stop(&mut self);
}

/// Interface for platform-specific audio input backends.
///
/// The session queries the device's minimum buffer size, aligns it to the
/// notification period, and opens the device at the aligned size. Each
/// `open` produces a fresh handle; the previous one is released on drop.
pub trait InputProvider: Send + Sync {
    /// Smallest capture buffer (in bytes) the device supports for `spec`.
    fn minimum_buffer_size(&self, spec: &PcmSpec) -> Result<usize, RecorderError>;

    /// Open the device with a capture buffer of `buffer_size_bytes`.
    ///
    /// The capture loop runs on a dedicated thread; implementations should
    /// request low-latency scheduling for their delivery path where the
    /// platform supports it.
    fn open(
        &self,
        spec: &PcmSpec,
        buffer_size_bytes: usize,
    ) -> Result<Box<dyn AudioInput>, RecorderError>;
}
