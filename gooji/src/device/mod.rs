/// Stream acquisition and device enumeration
pub mod acquire;

/// Capture constraints
pub mod constraints;

/// Device-related error types
pub mod error;

/// Camera/microphone permission model
pub mod permission;

// Re-export commonly used types
pub use acquire::{
    AcquireStatus, DeviceAcquirer, DeviceInventory, MediaDeviceInfo, RetryPolicy,
};
pub use constraints::{FacingMode, StreamConstraints};
pub use error::{DeviceError, DeviceResult};
pub use permission::{CombinedPermission, PermissionState, PermissionStatus};
