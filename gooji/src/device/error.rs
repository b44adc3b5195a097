use serde::Serialize;
use thiserror::Error;

/// Device acquisition errors
///
/// Host failures are classified into these variants once, at the
/// [`MediaBackend`](crate::media::MediaBackend) boundary. Code above the
/// boundary never inspects error names or message text.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DeviceError {
    /// Camera or microphone permission was denied
    #[error("Camera or microphone permission denied")]
    PermissionDenied,

    /// No capture device is available
    #[error("No capture device found")]
    DeviceNotFound,

    /// The host does not support media capture
    #[error("Media capture is not supported by this host")]
    Unsupported,

    /// Unclassified device failure
    #[error("Device error: {0}")]
    Unknown(String),
}

/// Result type for device operations
pub type DeviceResult<T> = Result<T, DeviceError>;
