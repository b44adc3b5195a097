/// In-memory media backend
///
/// A pure, scriptable implementation of [`MediaBackend`] used by tests,
/// examples, and any host that wants to drive the capture flow without a
/// real device stack. Failures, permissions, inventories and encoder
/// capabilities are all configured up front; every side effect (preview
/// binds, releases, started encoders) is recorded for inspection.
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc;
use tracing::debug;

use crate::device::acquire::{DeviceInventory, MediaDeviceInfo};
use crate::device::constraints::StreamConstraints;
use crate::device::error::{DeviceError, DeviceResult};
use crate::device::permission::PermissionStatus;
use crate::media::backend::{EncoderId, MediaBackend, MediaStreamHandle};
use crate::recording::format::RecordingFormat;

struct EncoderLane {
    sender: mpsc::Sender<Bytes>,
    /// Chunks emitted by the encoder but not yet delivered; flushed on stop
    queued: VecDeque<Bytes>,
}

struct Inner {
    permission: PermissionStatus,
    inventory: DeviceInventory,
    scripted_failures: u32,
    scripted_error: DeviceError,
    supported_formats: Vec<String>,
    default_format: String,
    next_id: u64,
    acquire_attempts: u32,
    live_streams: Vec<u64>,
    preview_binds: Vec<u64>,
    released_streams: Vec<u64>,
    started_formats: Vec<RecordingFormat>,
    encoders: HashMap<u64, EncoderLane>,
}

/// Scriptable in-memory [`MediaBackend`]
///
/// # Example
/// ```
/// use gooji_lib::device::{DeviceError, StreamConstraints};
/// use gooji_lib::media::{FakeMediaBackend, MediaBackend};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let backend = FakeMediaBackend::new();
/// backend.script_acquire_failures(1, DeviceError::PermissionDenied);
///
/// // First attempt fails as scripted, second succeeds
/// assert!(backend.acquire(&StreamConstraints::default()).await.is_err());
/// assert!(backend.acquire(&StreamConstraints::default()).await.is_ok());
/// # }
/// ```
pub struct FakeMediaBackend {
    inner: Mutex<Inner>,
}

impl FakeMediaBackend {
    /// Create a backend with permissive defaults
    ///
    /// Permissions granted, one camera and one microphone available, and
    /// both the preferred codec pairing and the generic container
    /// supported.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                permission: PermissionStatus::granted(),
                inventory: DeviceInventory {
                    video: vec![MediaDeviceInfo::new("camera-0", "Integrated Camera")],
                    audio: vec![MediaDeviceInfo::new("mic-0", "Internal Microphone")],
                },
                scripted_failures: 0,
                scripted_error: DeviceError::Unknown("unscripted failure".to_string()),
                supported_formats: vec![
                    crate::recording::format::PREFERRED_FORMAT.to_string(),
                    crate::recording::format::GENERIC_FORMAT.to_string(),
                ],
                default_format: "video/webm".to_string(),
                next_id: 1,
                acquire_attempts: 0,
                live_streams: Vec::new(),
                preview_binds: Vec::new(),
                released_streams: Vec::new(),
                started_formats: Vec::new(),
                encoders: HashMap::new(),
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("fake backend state poisoned")
    }

    /// Override the reported permission states
    pub fn set_permission_status(&self, status: PermissionStatus) {
        self.lock().permission = status;
    }

    /// Override the device inventory
    pub fn set_inventory(&self, inventory: DeviceInventory) {
        self.lock().inventory = inventory;
    }

    /// Make the next `count` acquisitions fail with `error`
    pub fn script_acquire_failures(&self, count: u32, error: DeviceError) {
        let mut inner = self.lock();
        inner.scripted_failures = count;
        inner.scripted_error = error;
    }

    /// Override the set of encoder-supported MIME types
    pub fn set_supported_formats<S: Into<String>>(&self, formats: Vec<S>) {
        self.lock().supported_formats = formats.into_iter().map(Into::into).collect();
    }

    /// Override the encoder-default container type
    pub fn set_default_format(&self, format: impl Into<String>) {
        self.lock().default_format = format.into();
    }

    /// Deliver a chunk on a running encoder's channel
    ///
    /// # Panics
    /// Panics if the encoder is not running; fakes fail loudly.
    pub async fn emit_chunk(&self, encoder: EncoderId, data: Bytes) {
        let sender = {
            let inner = self.lock();
            inner
                .encoders
                .get(&encoder.raw())
                .expect("emit_chunk on unknown encoder")
                .sender
                .clone()
        };
        sender.send(data).await.expect("encoder channel closed");
    }

    /// Buffer a chunk inside the encoder, delivered only by the
    /// stop-then-flush sequence
    pub fn queue_chunk(&self, encoder: EncoderId, data: Bytes) {
        let mut inner = self.lock();
        inner
            .encoders
            .get_mut(&encoder.raw())
            .expect("queue_chunk on unknown encoder")
            .queued
            .push_back(data);
    }

    /// Number of acquisitions attempted (successful or not)
    pub fn acquire_attempts(&self) -> u32 {
        self.lock().acquire_attempts
    }

    /// Number of streams currently live
    pub fn live_stream_count(&self) -> usize {
        self.lock().live_streams.len()
    }

    /// Stream ids bound to the preview surface, in order
    pub fn preview_binds(&self) -> Vec<u64> {
        self.lock().preview_binds.clone()
    }

    /// Stream ids released, in order
    pub fn released_streams(&self) -> Vec<u64> {
        self.lock().released_streams.clone()
    }

    /// Formats passed to `start_encoder`, in order
    pub fn started_formats(&self) -> Vec<RecordingFormat> {
        self.lock().started_formats.clone()
    }

    /// Number of encoders currently running
    pub fn active_encoder_count(&self) -> usize {
        self.lock().encoders.len()
    }

    /// Ids of the encoders currently running, in start order
    pub fn active_encoders(&self) -> Vec<EncoderId> {
        let inner = self.lock();
        let mut ids: Vec<u64> = inner.encoders.keys().copied().collect();
        ids.sort_unstable();
        ids.into_iter().map(EncoderId::from_raw).collect()
    }
}

impl Default for FakeMediaBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaBackend for FakeMediaBackend {
    async fn acquire(&self, _constraints: &StreamConstraints) -> DeviceResult<MediaStreamHandle> {
        let mut inner = self.lock();
        inner.acquire_attempts += 1;

        if inner.scripted_failures > 0 {
            inner.scripted_failures -= 1;
            return Err(inner.scripted_error.clone());
        }

        let id = inner.next_id;
        inner.next_id += 1;
        inner.live_streams.push(id);

        debug!(stream = id, "Fake stream acquired");
        Ok(MediaStreamHandle::from_raw(id))
    }

    async fn enumerate(&self) -> DeviceResult<DeviceInventory> {
        Ok(self.lock().inventory.clone())
    }

    async fn permission_status(&self) -> PermissionStatus {
        self.lock().permission
    }

    async fn bind_preview(&self, stream: &MediaStreamHandle) {
        self.lock().preview_binds.push(stream.raw());
    }

    async fn release(&self, stream: &MediaStreamHandle) {
        let mut inner = self.lock();
        inner.live_streams.retain(|id| *id != stream.raw());
        inner.released_streams.push(stream.raw());
    }

    fn is_format_supported(&self, mime_type: &str) -> bool {
        self.lock()
            .supported_formats
            .iter()
            .any(|f| f == mime_type)
    }

    fn default_format(&self) -> String {
        self.lock().default_format.clone()
    }

    async fn start_encoder(
        &self,
        stream: &MediaStreamHandle,
        format: &RecordingFormat,
        chunks: mpsc::Sender<Bytes>,
    ) -> DeviceResult<EncoderId> {
        let mut inner = self.lock();

        if !inner.live_streams.contains(&stream.raw()) {
            return Err(DeviceError::Unknown(format!(
                "stream {} is not live",
                stream.raw()
            )));
        }

        let id = inner.next_id;
        inner.next_id += 1;
        inner.started_formats.push(format.clone());
        inner.encoders.insert(
            id,
            EncoderLane {
                sender: chunks,
                queued: VecDeque::new(),
            },
        );

        debug!(encoder = id, mime = %format.mime_type, "Fake encoder started");
        Ok(EncoderId::from_raw(id))
    }

    async fn stop_encoder(&self, encoder: EncoderId) {
        let lane = self.lock().encoders.remove(&encoder.raw());

        // Stop-then-flush: everything the encoder emitted before the stop
        // request is delivered before the channel closes.
        if let Some(mut lane) = lane {
            while let Some(chunk) = lane.queued.pop_front() {
                let _ = lane.sender.send(chunk).await;
            }
            debug!(encoder = encoder.raw(), "Fake encoder stopped");
        }
    }
}
