/// Streaming multipart upload to the media backend
///
/// One [`UploadClient`] serves any number of independent jobs. Validation
/// runs synchronously before any network I/O; the transfer streams the
/// payload in fixed-size slices so progress can be reported per byte
/// handed to the transport.
use bytes::Bytes;
use futures_util::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::Body;
use tracing::{debug, info, warn};

use super::error::{UploadError, UploadResult};
use super::job::{ProgressTracker, UploadJob, ALLOWED_MEDIA_TYPES, MAX_PAYLOAD_BYTES};
use crate::api::types::VideoRecord;
use crate::state::config::AppConfig;

/// Slice size for the streaming body
const STREAM_CHUNK_BYTES: usize = 64 * 1024;

/// Upload transfer client
///
/// # Example
/// ```no_run
/// use bytes::Bytes;
/// use gooji_lib::upload::{UploadClient, UploadJob, UploadMetadata, UploadPayload};
///
/// # #[tokio::main]
/// # async fn main() {
/// let client = UploadClient::new("http://localhost:8080");
///
/// let payload = UploadPayload::File {
///     name: "clip.webm".to_string(),
///     mime_type: "video/webm".to_string(),
///     data: Bytes::from_static(b"..."),
/// };
/// let metadata = UploadMetadata::new("Title", "Description", "story");
/// let mut job = UploadJob::new(payload, metadata);
///
/// match client.submit(&mut job).await {
///     Ok(record) => println!("Uploaded as {}", record.id),
///     Err(err) => eprintln!("Upload failed: {err}"),
/// }
/// # }
/// ```
pub struct UploadClient {
    http: reqwest::Client,
    base_url: String,
    max_payload_bytes: u64,
    allowed_media_types: Vec<String>,
}

impl UploadClient {
    /// Create a client against the given backend base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            max_payload_bytes: MAX_PAYLOAD_BYTES,
            allowed_media_types: ALLOWED_MEDIA_TYPES.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// Create a client from the application configuration
    ///
    /// # Errors
    /// Returns [`UploadError::Transport`] if the HTTP client cannot be
    /// built.
    pub fn from_config(config: &AppConfig) -> UploadResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.api.request_timeout())
            .build()
            .map_err(|e| UploadError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.api.base_url.clone(),
            max_payload_bytes: config.upload.max_payload_bytes,
            allowed_media_types: config.upload.allowed_media_types.clone(),
        })
    }

    /// Override the payload size ceiling
    pub fn with_max_payload_bytes(mut self, max_payload_bytes: u64) -> Self {
        self.max_payload_bytes = max_payload_bytes;
        self
    }

    /// Payload size ceiling in effect
    pub fn max_payload_bytes(&self) -> u64 {
        self.max_payload_bytes
    }

    /// Pre-flight validation: metadata, payload presence, media type and
    /// size ceiling
    ///
    /// Runs synchronously and never touches the network.
    ///
    /// # Errors
    /// [`UploadError::Validation`] for an empty required field or empty
    /// payload, [`UploadError::UnsupportedMediaType`] for a type outside
    /// the allow-list, [`UploadError::PayloadTooLarge`] above the ceiling.
    pub fn validate(&self, job: &UploadJob) -> UploadResult<()> {
        job.metadata().validate()?;

        let payload = job.payload();
        if payload.is_empty() {
            return Err(UploadError::Validation { field: "video" });
        }

        let essence = payload.essence();
        if !self.allowed_media_types.iter().any(|t| t == &essence) {
            return Err(UploadError::UnsupportedMediaType(
                payload.mime_type().to_string(),
            ));
        }

        let size = payload.size_bytes();
        if size > self.max_payload_bytes {
            return Err(UploadError::PayloadTooLarge {
                size,
                limit: self.max_payload_bytes,
            });
        }

        Ok(())
    }

    /// Submit a job and drive it to a terminal state
    ///
    /// On success the job's progress reaches exactly 1.0 and the state
    /// becomes [`JobState::Succeeded`](super::JobState::Succeeded). On any
    /// failure the state carries the classified error and the payload and
    /// metadata stay intact for [`UploadJob::renew`].
    ///
    /// # Errors
    /// The same error stored on the job: local validation failures before
    /// any network call, [`UploadError::Transport`] for network-level
    /// failures, [`UploadError::Server`] for non-2xx responses.
    pub async fn submit(&self, job: &mut UploadJob) -> UploadResult<VideoRecord> {
        if let Err(err) = self.validate(job) {
            warn!(error = %err, "Upload rejected before transfer");
            job.mark_failed(err.clone());
            return Err(err);
        }

        job.mark_in_progress();
        info!(
            size = job.payload().size_bytes(),
            mime = job.payload().mime_type(),
            title = %job.metadata().title,
            "Starting upload"
        );

        match self.transfer(job).await {
            Ok(record) => {
                job.progress_sender().send_replace(1.0);
                info!(id = %record.id, "Upload succeeded");
                job.mark_succeeded(record.clone());
                Ok(record)
            }
            Err(err) => {
                warn!(error = %err, "Upload failed");
                job.mark_failed(err.clone());
                Err(err)
            }
        }
    }

    /// Run the multipart transfer for an already-validated job
    async fn transfer(&self, job: &UploadJob) -> UploadResult<VideoRecord> {
        let payload = job.payload();
        let total = payload.size_bytes();
        let progress_tx = job.progress_sender();

        let mut tracker = ProgressTracker::new(total);
        let slices = slice_payload(&payload.data());
        debug!(slices = slices.len(), total, "Streaming payload");

        let body_stream = futures_util::stream::iter(
            slices.into_iter().map(Ok::<Bytes, std::io::Error>),
        )
        .inspect(move |chunk| {
            if let Ok(chunk) = chunk {
                let ratio = tracker.advance(chunk.len() as u64);
                progress_tx.send_replace(ratio);
            }
        });

        let part = Part::stream_with_length(Body::wrap_stream(body_stream), total)
            .file_name(payload.file_name())
            .mime_str(&payload.essence())
            .map_err(|e| UploadError::Transport(e.to_string()))?;

        let metadata = job.metadata();
        let form = Form::new()
            .part("video", part)
            .text("title", metadata.title.clone())
            .text("description", metadata.description.clone())
            .text("tags", metadata.tags_field())
            .text("category", metadata.category.clone())
            .text("language", metadata.language.clone())
            .text("public", metadata.public.to_string());

        let response = self
            .http
            .post(self.endpoint())
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::Server(status.as_u16()));
        }

        // A success response must carry a parseable confirmation record
        response
            .json::<VideoRecord>()
            .await
            .map_err(|e| UploadError::Transport(e.to_string()))
    }

    fn endpoint(&self) -> String {
        format!("{}/api/videos", self.base_url.trim_end_matches('/'))
    }
}

/// Cut the payload into fixed-size slices sharing the same allocation
fn slice_payload(data: &Bytes) -> Vec<Bytes> {
    let mut slices = Vec::with_capacity(data.len().div_ceil(STREAM_CHUNK_BYTES).max(1));
    let mut offset = 0;
    while offset < data.len() {
        let end = (offset + STREAM_CHUNK_BYTES).min(data.len());
        slices.push(data.slice(offset..end));
        offset = end;
    }
    slices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::job::UploadPayload;
    use crate::upload::metadata::UploadMetadata;
    use crate::upload::JobState;

    fn job_with(size: usize, mime: &str, title: &str) -> UploadJob {
        let payload = UploadPayload::File {
            name: "clip.webm".to_string(),
            mime_type: mime.to_string(),
            data: Bytes::from(vec![0u8; size]),
        };
        UploadJob::new(
            payload,
            UploadMetadata::new(title, "Description", "story"),
        )
    }

    #[test]
    fn test_size_ceiling_constant() {
        assert_eq!(MAX_PAYLOAD_BYTES, 500 * 1024 * 1024);
        assert_eq!(UploadClient::new("http://x").max_payload_bytes(), MAX_PAYLOAD_BYTES);
    }

    #[test]
    fn test_payload_at_limit_passes_local_validation() {
        let client = UploadClient::new("http://localhost:8080").with_max_payload_bytes(4096);

        let job = job_with(4096, "video/webm", "Title");
        assert!(client.validate(&job).is_ok());
    }

    #[test]
    fn test_payload_one_byte_over_limit_rejected() {
        let client = UploadClient::new("http://localhost:8080").with_max_payload_bytes(4096);

        let job = job_with(4097, "video/webm", "Title");
        assert_eq!(
            client.validate(&job),
            Err(UploadError::PayloadTooLarge {
                size: 4097,
                limit: 4096,
            })
        );
    }

    #[test]
    fn test_empty_title_rejected_without_network() {
        let client = UploadClient::new("http://localhost:8080");

        let job = job_with(16, "video/webm", "  ");
        assert_eq!(
            client.validate(&job),
            Err(UploadError::Validation { field: "title" })
        );
    }

    #[test]
    fn test_empty_payload_rejected() {
        let client = UploadClient::new("http://localhost:8080");

        let job = job_with(0, "video/webm", "Title");
        assert_eq!(
            client.validate(&job),
            Err(UploadError::Validation { field: "video" })
        );
    }

    #[test]
    fn test_media_type_allow_list() {
        let client = UploadClient::new("http://localhost:8080");

        for mime in ALLOWED_MEDIA_TYPES {
            assert!(client.validate(&job_with(16, mime, "Title")).is_ok());
        }

        let job = job_with(16, "audio/ogg", "Title");
        assert_eq!(
            client.validate(&job),
            Err(UploadError::UnsupportedMediaType("audio/ogg".to_string()))
        );
    }

    #[test]
    fn test_codec_parameters_do_not_defeat_allow_list() {
        let client = UploadClient::new("http://localhost:8080");
        let job = job_with(16, "video/webm;codecs=vp9,opus", "Title");
        assert!(client.validate(&job).is_ok());
    }

    #[tokio::test]
    async fn test_validation_failure_marks_job_failed() {
        let client = UploadClient::new("http://localhost:8080");

        let mut job = job_with(16, "text/plain", "Title");
        let result = client.submit(&mut job).await;

        assert!(result.is_err());
        assert_eq!(
            *job.state(),
            JobState::Failed(UploadError::UnsupportedMediaType("text/plain".to_string()))
        );
        // Metadata survives for resubmission
        assert_eq!(job.metadata().title, "Title");
    }

    #[test]
    fn test_slice_payload_covers_all_bytes() {
        let data = Bytes::from(vec![7u8; STREAM_CHUNK_BYTES * 2 + 10]);
        let slices = slice_payload(&data);

        assert_eq!(slices.len(), 3);
        assert_eq!(slices[0].len(), STREAM_CHUNK_BYTES);
        assert_eq!(slices[2].len(), 10);
        assert_eq!(
            slices.iter().map(Bytes::len).sum::<usize>(),
            data.len()
        );
    }

    #[test]
    fn test_endpoint_normalizes_trailing_slash() {
        let client = UploadClient::new("http://localhost:8080/");
        assert_eq!(client.endpoint(), "http://localhost:8080/api/videos");
    }
}
