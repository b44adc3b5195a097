use thiserror::Error;

/// Upload transfer errors
///
/// Validation, media-type and size failures are produced locally before any
/// network I/O. Transport and server failures are classified once from the
/// HTTP client's error at the request boundary. There is no automatic
/// retry; a failed job is resubmitted by constructing a new one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    /// A required field is empty
    #[error("Required field '{field}' must not be empty")]
    Validation { field: &'static str },

    /// The payload's media type is not in the accepted allow-list
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// The payload exceeds the size ceiling
    #[error("Payload of {size} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge { size: u64, limit: u64 },

    /// Network-level failure (includes transport timeouts and a 2xx
    /// response whose confirmation payload cannot be parsed)
    #[error("Transport error: {0}")]
    Transport(String),

    /// The backend answered with a non-success status
    #[error("Server error: HTTP {0}")]
    Server(u16),
}

impl UploadError {
    /// Check whether the error was produced locally, before any network
    /// call was attempted
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. } | Self::UnsupportedMediaType(_) | Self::PayloadTooLarge { .. }
        )
    }
}

/// Result type for upload operations
pub type UploadResult<T> = Result<T, UploadError>;
