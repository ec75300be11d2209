//! # mic-recorder-core
//!
//! Real-time microphone capture core library.
//!
//! Captures PCM samples from an input device on a dedicated thread and
//! streams them through an unbounded queue into a background encoding
//! worker, which feeds an external encoder and appends its output to a
//! sink. Platform devices, perceptual encoders, and sinks plug in through
//! the `traits` module; this crate owns the real-time read loop, the
//! cross-thread hand-off, volume metering, buffer alignment, and the
//! start/stop/timeout state machine.
//!
//! ## Architecture
//!
//! ```text
//! mic-recorder-core (this crate)
//! ├── traits/       ← InputProvider, AudioInput, EncoderProvider,
//! │                   AudioEncoder, SinkProvider, EncodedSink, RecorderDelegate
//! ├── models/       ← RecorderError, RecorderState, RecorderConfig, PcmSpec
//! ├── processing/   ← frame alignment, volume metering
//! ├── encode/       ← EncodeWorker (queue drain thread), SampleChunk
//! ├── session/      ← MicRecorder (generic orchestrator)
//! └── storage/      ← FileSink
//! ```
//!
//! Data flow:
//!
//! ```text
//! [AudioInput] → capture loop ─┬→ [VolumeMeter] (in-loop, lock-free reads)
//!                              └→ [EncodeWorker] → [AudioEncoder] → [EncodedSink]
//! ```

pub mod encode;
pub mod models;
pub mod processing;
pub mod session;
pub mod storage;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use encode::worker::{EncodeWorker, SampleChunk};
pub use models::config::{EncoderParams, PcmSpec, RecorderConfig, NOTIFICATION_PERIOD_FRAMES};
pub use models::error::RecorderError;
pub use models::state::RecorderState;
pub use processing::frame_align::aligned_buffer_size;
pub use processing::volume_meter::{VolumeMeter, VolumeReading};
pub use session::recorder::{MicRecorder, MAX_VOLUME};
pub use storage::file_sink::{FileSink, FileSinkProvider};
pub use traits::delegate::RecorderDelegate;
pub use traits::encoder::{AudioEncoder, EncoderProvider};
pub use traits::input_device::{AudioInput, InputProvider};
pub use traits::sink::{EncodedSink, SinkProvider};
