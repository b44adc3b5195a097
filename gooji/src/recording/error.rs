use thiserror::Error;

use super::session::SessionState;
use crate::device::error::DeviceError;

/// Recording session errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordingError {
    /// The requested state transition is not allowed
    #[error("Invalid session transition from {from:?} to {to:?}")]
    InvalidTransition {
        from: SessionState,
        to: SessionState,
    },

    /// A chunk arrived while no recording was active
    #[error("No recording is active")]
    NotRecording,

    /// Stop was requested before a format was negotiated
    #[error("Recording format has not been negotiated")]
    FormatNotNegotiated,

    /// No live stream is bound to the session
    #[error("No live capture stream is available")]
    NoActiveStream,

    /// Underlying device failure
    #[error("Device error: {0}")]
    Device(#[from] DeviceError),
}

/// Result type for recording operations
pub type RecordingResult<T> = Result<T, RecordingError>;
