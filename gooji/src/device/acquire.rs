use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::device::constraints::StreamConstraints;
use crate::device::error::{DeviceError, DeviceResult};
use crate::device::permission::{CombinedPermission, PermissionStatus};
use crate::media::{MediaBackend, MediaStreamHandle};

/// Information about a single capture device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaDeviceInfo {
    /// Device identifier (unique within its kind)
    pub id: String,
    /// Human-readable device label
    pub label: String,
}

impl MediaDeviceInfo {
    /// Create a device entry
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// Available video and audio input devices
///
/// Empty lists are a valid inventory, not an error; the acquirer surfaces
/// them as a user-visible warning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInventory {
    /// Video input devices
    pub video: Vec<MediaDeviceInfo>,
    /// Audio input devices
    pub audio: Vec<MediaDeviceInfo>,
}

impl DeviceInventory {
    /// Check whether no capture devices are available at all
    pub fn is_empty(&self) -> bool {
        self.video.is_empty() && self.audio.is_empty()
    }

    /// Total number of known devices
    pub fn len(&self) -> usize {
        self.video.len() + self.audio.len()
    }
}

/// Bounded automatic retry for device acquisition
///
/// Used by the recording flow: a fixed number of attempts with a fixed
/// back-off delay between them. Explicit user-action retry goes through
/// [`DeviceAcquirer::acquire`] directly and is not bounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of acquisition attempts
    pub max_attempts: u32,
    /// Delay between attempts
    pub backoff: Duration,
}

impl RetryPolicy {
    /// Create a policy with the given bounds
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts,
            backoff,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

/// Observable acquisition status
///
/// Rendered by the host as a persistent status panel; errors are held here
/// rather than propagated into the recording flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AcquireStatus {
    /// No acquisition attempted yet
    Idle,
    /// A live stream is bound to the preview
    Ready,
    /// Acquisition succeeded but with a degraded environment
    Warning { message: String },
    /// Acquisition failed
    Error {
        kind: DeviceError,
        message: String,
    },
}

impl AcquireStatus {
    /// Check if a live stream is available
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    /// Check if the last acquisition failed
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

/// Session-scoped owner of the live capture stream
///
/// At most one stream handle is live at a time: a new acquisition always
/// releases the previous handle first. The acquirer owns the handle until
/// it is borrowed by a recording session, and releases it when the capture
/// flow shuts down.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use gooji_lib::device::{DeviceAcquirer, StreamConstraints};
/// use gooji_lib::media::FakeMediaBackend;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let backend = Arc::new(FakeMediaBackend::new());
/// let mut acquirer = DeviceAcquirer::new(backend);
///
/// let handle = acquirer.acquire(&StreamConstraints::default()).await.unwrap();
/// assert!(acquirer.status().is_ready());
/// assert_eq!(acquirer.current_stream(), Some(&handle));
/// # }
/// ```
pub struct DeviceAcquirer {
    backend: Arc<dyn MediaBackend>,
    current: Option<MediaStreamHandle>,
    status: AcquireStatus,
    attempts: u32,
}

impl DeviceAcquirer {
    /// Create an acquirer over the given media backend
    pub fn new(backend: Arc<dyn MediaBackend>) -> Self {
        Self {
            backend,
            current: None,
            status: AcquireStatus::Idle,
            attempts: 0,
        }
    }

    /// Current observable status
    pub fn status(&self) -> &AcquireStatus {
        &self.status
    }

    /// Currently live stream handle, if any
    pub fn current_stream(&self) -> Option<&MediaStreamHandle> {
        self.current.as_ref()
    }

    /// Total acquisition attempts made by this acquirer
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Request a live stream matching the constraints
    ///
    /// Any previously held handle is released before the new request is
    /// issued. On success the handle is bound to the preview surface and
    /// the status becomes [`AcquireStatus::Ready`]; on failure the status
    /// carries the classified error and the failure is also returned.
    ///
    /// # Errors
    /// Returns the [`DeviceError`] classified by the backend.
    pub async fn acquire(
        &mut self,
        constraints: &StreamConstraints,
    ) -> DeviceResult<MediaStreamHandle> {
        if let Some(previous) = self.current.take() {
            debug!(stream = previous.raw(), "Releasing previous stream");
            self.backend.release(&previous).await;
        }

        self.attempts += 1;

        match self.backend.acquire(constraints).await {
            Ok(handle) => {
                info!(
                    stream = handle.raw(),
                    width = constraints.ideal_width,
                    height = constraints.ideal_height,
                    "Capture stream acquired"
                );
                self.backend.bind_preview(&handle).await;
                self.current = Some(handle);
                self.status = AcquireStatus::Ready;
                Ok(handle)
            }
            Err(err) => {
                warn!(error = %err, "Capture stream acquisition failed");
                self.status = AcquireStatus::Error {
                    kind: err.clone(),
                    message: err.to_string(),
                };
                Err(err)
            }
        }
    }

    /// Request a live stream with bounded automatic retry
    ///
    /// Retries with a fixed back-off until the policy is exhausted, then
    /// returns the last error and leaves the status terminal. No further
    /// automatic retry happens after this returns.
    ///
    /// # Errors
    /// Returns the last [`DeviceError`] observed once all attempts fail.
    pub async fn acquire_with_retry(
        &mut self,
        constraints: &StreamConstraints,
        policy: &RetryPolicy,
    ) -> DeviceResult<MediaStreamHandle> {
        let mut last_error = DeviceError::Unknown("no acquisition attempted".to_string());

        for attempt in 1..=policy.max_attempts.max(1) {
            match self.acquire(constraints).await {
                Ok(handle) => return Ok(handle),
                Err(err) => {
                    warn!(
                        attempt,
                        max_attempts = policy.max_attempts,
                        error = %err,
                        "Acquisition attempt failed"
                    );
                    last_error = err;

                    if attempt < policy.max_attempts {
                        tokio::time::sleep(policy.backoff).await;
                    }
                }
            }
        }

        warn!(error = %last_error, "Acquisition retry budget exhausted");
        Err(last_error)
    }

    /// List available capture devices
    ///
    /// An empty inventory is not an error; it downgrades the status to a
    /// warning so the host can render a soft notice.
    ///
    /// # Errors
    /// Returns a [`DeviceError`] only when enumeration itself fails.
    pub async fn enumerate(&mut self) -> DeviceResult<DeviceInventory> {
        let inventory = self.backend.enumerate().await?;

        if inventory.is_empty() {
            warn!("No capture devices detected");
            self.status = AcquireStatus::Warning {
                message: "No camera or microphone detected".to_string(),
            };
        } else {
            debug!(
                video = inventory.video.len(),
                audio = inventory.audio.len(),
                "Capture devices enumerated"
            );
        }

        Ok(inventory)
    }

    /// Query camera and microphone permission states independently
    pub async fn permission_status(&self) -> PermissionStatus {
        self.backend.permission_status().await
    }

    /// Combined camera + microphone permission summary for display
    pub async fn combined_permission(&self) -> CombinedPermission {
        self.backend.permission_status().await.combined()
    }

    /// Release the live stream, if any
    pub async fn release(&mut self) {
        if let Some(handle) = self.current.take() {
            debug!(stream = handle.raw(), "Releasing capture stream");
            self.backend.release(&handle).await;
        }
        self.status = AcquireStatus::Idle;
    }
}
