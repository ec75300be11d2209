use thiserror::Error;

/// Errors that can occur during a recording session.
///
/// Initialization failures surface synchronously from `start()`; runtime
/// failures are forwarded through `RecorderDelegate::on_error` from whichever
/// thread detected them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecorderError {
    #[error("input device not available")]
    DeviceNotAvailable,

    #[error("input device error: {0}")]
    Device(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("encoder error: {0}")]
    Encoder(String),

    #[error("sink error: {0}")]
    Sink(String),
}
