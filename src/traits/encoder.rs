use crate::models::config::EncoderParams;
use crate::models::error::RecorderError;

/// An initialized perceptual audio encoder, owned by the encode worker.
///
/// The compression algorithm itself lives behind this trait; this crate
/// only moves PCM in and encoded bytes out.
pub trait AudioEncoder: Send {
    /// Encode one chunk of interleaved PCM samples.
    ///
    /// May return an empty vec while the encoder accumulates internal state.
    fn encode(&mut self, samples: &[i16]) -> Result<Vec<u8>, RecorderError>;

    /// Flush any buffered state and return the final tail bytes.
    fn flush(&mut self) -> Result<Vec<u8>, RecorderError>;
}

/// Factory for encoders, invoked once per session during `start()`.
pub trait EncoderProvider: Send + Sync {
    /// Create and initialize an encoder for `params`.
    fn create(&self, params: &EncoderParams) -> Result<Box<dyn AudioEncoder>, RecorderError>;
}
