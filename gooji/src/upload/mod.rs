/// Upload transfer to the media backend
///
/// One job = one attempt: payload and metadata are frozen at creation,
/// progress is monotonic, terminal outcomes are success or a classified
/// failure, and resubmission always constructs a new job.

/// Streaming multipart client
pub mod client;

/// Upload error types
pub mod error;

/// Job, payload and progress types
pub mod job;

/// Upload metadata and validation
pub mod metadata;

// Re-export commonly used types
pub use client::UploadClient;
pub use error::{UploadError, UploadResult};
pub use job::{
    JobState, ProgressTracker, UploadJob, UploadPayload, ALLOWED_MEDIA_TYPES, MAX_PAYLOAD_BYTES,
};
pub use metadata::UploadMetadata;
