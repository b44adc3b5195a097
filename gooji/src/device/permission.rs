use serde::{Deserialize, Serialize};

/// Permission state for a single capture device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    /// Access has been granted
    Granted,
    /// Access has been denied
    Denied,
    /// The host will prompt on first use
    Prompt,
    /// The state could not be determined
    Unknown,
}

impl PermissionState {
    /// Check if access is granted
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }

    /// Check if access is denied
    pub fn is_denied(&self) -> bool {
        matches!(self, Self::Denied)
    }
}

/// Combined camera + microphone permission summary
///
/// Used for display: a single badge instead of two independent states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CombinedPermission {
    /// Both camera and microphone granted
    Granted,
    /// At least one device denied
    Denied,
    /// Exactly one device granted, the other undecided
    PartiallyGranted,
    /// Neither state is decided
    Unknown,
}

/// Independent permission states for camera and microphone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionStatus {
    /// Camera permission state
    pub camera: PermissionState,
    /// Microphone permission state
    pub microphone: PermissionState,
}

impl PermissionStatus {
    /// Create a status from independent states
    pub fn new(camera: PermissionState, microphone: PermissionState) -> Self {
        Self { camera, microphone }
    }

    /// Both devices granted
    pub fn granted() -> Self {
        Self::new(PermissionState::Granted, PermissionState::Granted)
    }

    /// Both devices undecided
    pub fn unknown() -> Self {
        Self::new(PermissionState::Unknown, PermissionState::Unknown)
    }

    /// Combine both states into a single display summary
    ///
    /// Denied takes precedence: if either device is denied the summary is
    /// [`CombinedPermission::Denied`], regardless of the other state.
    pub fn combined(&self) -> CombinedPermission {
        use PermissionState::*;

        match (self.camera, self.microphone) {
            (Denied, _) | (_, Denied) => CombinedPermission::Denied,
            (Granted, Granted) => CombinedPermission::Granted,
            (Granted, _) | (_, Granted) => CombinedPermission::PartiallyGranted,
            _ => CombinedPermission::Unknown,
        }
    }
}

impl Default for PermissionStatus {
    fn default() -> Self {
        Self::unknown()
    }
}
