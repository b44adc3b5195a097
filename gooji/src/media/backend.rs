/// Host media capability boundary
///
/// Everything the capture flow needs from the host environment (stream
/// negotiation, device enumeration, permission queries, chunked encoding)
/// goes through this trait, so the state machines never touch a concrete
/// host API.
use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;
use tokio::sync::mpsc;

use crate::device::constraints::StreamConstraints;
use crate::device::error::DeviceResult;
use crate::device::acquire::DeviceInventory;
use crate::device::permission::PermissionStatus;
use crate::recording::format::RecordingFormat;

/// Opaque handle to a live audio+video source
///
/// Owned by [`DeviceAcquirer`](crate::device::DeviceAcquirer) until handed
/// to a recording session; released when the session ends or acquisition
/// fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct MediaStreamHandle(u64);

impl MediaStreamHandle {
    /// Build a handle from a backend-assigned id
    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Backend-assigned id
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Opaque handle to a running encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EncoderId(u64);

impl EncoderId {
    /// Build a handle from a backend-assigned id
    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Backend-assigned id
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Injected media capability
///
/// Implementations classify their own failures into
/// [`DeviceError`](crate::device::DeviceError) at this boundary; callers
/// never inspect host error strings.
///
/// The encoder contract mirrors the host recorder it abstracts: chunks are
/// delivered on the supplied channel strictly in emission order, and
/// [`stop_encoder`](MediaBackend::stop_encoder) flushes every chunk emitted
/// before the stop request, then closes the channel.
#[async_trait]
pub trait MediaBackend: Send + Sync {
    /// Request a live stream matching the constraints
    async fn acquire(&self, constraints: &StreamConstraints) -> DeviceResult<MediaStreamHandle>;

    /// List available video/audio input devices
    ///
    /// Empty lists are a valid result, not an error.
    async fn enumerate(&self) -> DeviceResult<DeviceInventory>;

    /// Query camera and microphone permission states independently
    async fn permission_status(&self) -> PermissionStatus;

    /// Attach a live stream to the host preview surface
    async fn bind_preview(&self, stream: &MediaStreamHandle);

    /// Stop the underlying stream
    async fn release(&self, stream: &MediaStreamHandle);

    /// Probe encoder support for a MIME type
    fn is_format_supported(&self, mime_type: &str) -> bool;

    /// Container MIME type the encoder falls back to when nothing in the
    /// preference order is supported
    fn default_format(&self) -> String;

    /// Begin encoding the stream, delivering chunks on `chunks`
    async fn start_encoder(
        &self,
        stream: &MediaStreamHandle,
        format: &RecordingFormat,
        chunks: mpsc::Sender<Bytes>,
    ) -> DeviceResult<EncoderId>;

    /// Stop the encoder, flushing pending chunks before the channel closes
    async fn stop_encoder(&self, encoder: EncoderId);
}
