use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::watch;

use super::error::UploadError;
use super::metadata::UploadMetadata;
use crate::api::types::VideoRecord;
use crate::recording::artifact::RecordingArtifact;

/// Maximum accepted payload size: 500 MiB, enforced before any network call
pub const MAX_PAYLOAD_BYTES: u64 = 500 * 1024 * 1024;

/// Accepted video container types
pub const ALLOWED_MEDIA_TYPES: [&str; 4] = [
    "video/mp4",
    "video/webm",
    "video/quicktime",
    "video/x-msvideo",
];

/// Source of an upload's byte content
///
/// Either a sealed recording artifact or a user-selected file. Both are
/// immutable; the payload is shared into the job behind an `Arc` and never
/// mutated after job creation.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadPayload {
    /// A sealed in-browser recording
    Recording(Arc<RecordingArtifact>),

    /// A file picked or dropped by the user
    File {
        /// Original file name
        name: String,
        /// Declared media type
        mime_type: String,
        /// File content
        data: Bytes,
    },
}

impl UploadPayload {
    /// Payload size in bytes
    pub fn size_bytes(&self) -> u64 {
        match self {
            Self::Recording(artifact) => artifact.size_bytes(),
            Self::File { data, .. } => data.len() as u64,
        }
    }

    /// Check whether the payload carries no bytes
    pub fn is_empty(&self) -> bool {
        self.size_bytes() == 0
    }

    /// Declared media type
    pub fn mime_type(&self) -> &str {
        match self {
            Self::Recording(artifact) => artifact.mime_type(),
            Self::File { mime_type, .. } => mime_type,
        }
    }

    /// Media type with any parameters stripped, for allow-list comparison
    pub fn essence(&self) -> String {
        let raw = self.mime_type();
        raw.parse::<mime::Mime>()
            .map(|m| m.essence_str().to_ascii_lowercase())
            .unwrap_or_else(|_| {
                raw.split(';').next().unwrap_or(raw).trim().to_ascii_lowercase()
            })
    }

    /// File name sent with the multipart part
    pub fn file_name(&self) -> String {
        match self {
            Self::Recording(artifact) => {
                let extension = match artifact.mime_type() {
                    "video/webm" => "webm",
                    "video/mp4" => "mp4",
                    "video/quicktime" => "mov",
                    "video/x-msvideo" => "avi",
                    _ => "bin",
                };
                format!("recording.{extension}")
            }
            Self::File { name, .. } => name.clone(),
        }
    }

    /// Payload content (cheap clone, shares the allocation)
    pub fn data(&self) -> Bytes {
        match self {
            Self::Recording(artifact) => artifact.data(),
            Self::File { data, .. } => data.clone(),
        }
    }
}

/// Lifecycle of one upload job
#[derive(Debug, Clone, PartialEq)]
pub enum JobState {
    /// Created, not yet submitted
    Pending,
    /// Transfer in flight
    InProgress,
    /// Terminal: the backend confirmed the record
    Succeeded(VideoRecord),
    /// Terminal: validation, transport or server failure
    Failed(UploadError),
}

impl JobState {
    /// Check whether the job has reached a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded(_) | Self::Failed(_))
    }
}

/// Byte-accurate transfer progress
///
/// The ratio is tracked at full precision and never decreases; rounding
/// happens only in [`display_percent`](ProgressTracker::display_percent).
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    transferred: u64,
    total: u64,
    ratio: f64,
}

impl ProgressTracker {
    /// Track a transfer of `total` bytes
    pub fn new(total: u64) -> Self {
        Self {
            transferred: 0,
            total,
            ratio: 0.0,
        }
    }

    /// Record `bytes` more transferred; returns the updated ratio
    pub fn advance(&mut self, bytes: u64) -> f64 {
        self.transferred = self.transferred.saturating_add(bytes);
        if self.total > 0 {
            let next = (self.transferred as f64 / self.total as f64).min(1.0);
            if next > self.ratio {
                self.ratio = next;
            }
        }
        self.ratio
    }

    /// Force the ratio to exactly 1.0 (terminal success)
    pub fn complete(&mut self) -> f64 {
        self.ratio = 1.0;
        self.ratio
    }

    /// Full-precision ratio in [0, 1]
    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    /// Bytes recorded as transferred
    pub fn transferred(&self) -> u64 {
        self.transferred
    }

    /// Rounded percentage for display
    pub fn display_percent(&self) -> u8 {
        (self.ratio * 100.0).round() as u8
    }
}

/// One in-flight transfer: payload + metadata + progress + status
///
/// The payload is frozen at construction. Resubmitting after a failure
/// never mutates the failed job; [`renew`](UploadJob::renew) builds a new
/// job around the same payload and metadata.
///
/// # Example
/// ```
/// use bytes::Bytes;
/// use gooji_lib::upload::{JobState, UploadJob, UploadMetadata, UploadPayload};
///
/// let payload = UploadPayload::File {
///     name: "clip.webm".to_string(),
///     mime_type: "video/webm".to_string(),
///     data: Bytes::from_static(b"not really a video"),
/// };
/// let metadata = UploadMetadata::new("Title", "Description", "story");
///
/// let job = UploadJob::new(payload, metadata);
/// assert_eq!(*job.state(), JobState::Pending);
/// assert_eq!(job.progress(), 0.0);
/// ```
#[derive(Debug)]
pub struct UploadJob {
    payload: Arc<UploadPayload>,
    metadata: UploadMetadata,
    state: JobState,
    progress_tx: Arc<watch::Sender<f64>>,
    progress_rx: watch::Receiver<f64>,
}

impl UploadJob {
    /// Create a pending job, freezing payload and metadata
    pub fn new(payload: UploadPayload, metadata: UploadMetadata) -> Self {
        Self::from_shared(Arc::new(payload), metadata)
    }

    /// Create a pending job around an already-shared payload
    pub fn from_shared(payload: Arc<UploadPayload>, metadata: UploadMetadata) -> Self {
        let (progress_tx, progress_rx) = watch::channel(0.0);
        Self {
            payload,
            metadata,
            state: JobState::Pending,
            progress_tx: Arc::new(progress_tx),
            progress_rx,
        }
    }

    /// Build a fresh pending job from the same payload and metadata
    ///
    /// This is the resubmission path after a failure: the payload bytes are
    /// shared, the metadata is copied, and progress starts from zero.
    pub fn renew(&self) -> Self {
        Self::from_shared(Arc::clone(&self.payload), self.metadata.clone())
    }

    /// Frozen payload
    pub fn payload(&self) -> &UploadPayload {
        &self.payload
    }

    /// Metadata entered by the user
    pub fn metadata(&self) -> &UploadMetadata {
        &self.metadata
    }

    /// Current lifecycle state
    pub fn state(&self) -> &JobState {
        &self.state
    }

    /// Latest reported progress ratio
    pub fn progress(&self) -> f64 {
        *self.progress_rx.borrow()
    }

    /// Watch the progress ratio as it advances
    pub fn subscribe_progress(&self) -> watch::Receiver<f64> {
        self.progress_rx.clone()
    }

    pub(crate) fn progress_sender(&self) -> Arc<watch::Sender<f64>> {
        Arc::clone(&self.progress_tx)
    }

    pub(crate) fn mark_in_progress(&mut self) {
        self.state = JobState::InProgress;
    }

    pub(crate) fn mark_succeeded(&mut self, record: VideoRecord) {
        self.state = JobState::Succeeded(record);
    }

    pub(crate) fn mark_failed(&mut self, error: UploadError) {
        self.state = JobState::Failed(error);
    }
}
