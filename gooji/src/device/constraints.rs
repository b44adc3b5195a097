use serde::{Deserialize, Serialize};

/// Preferred camera orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Front-facing camera
    User,
    /// Rear-facing camera
    Environment,
}

impl Default for FacingMode {
    fn default() -> Self {
        Self::User
    }
}

impl FacingMode {
    /// String form used by capture constraints
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Environment => "environment",
        }
    }
}

/// Constraints requested from the capture device
///
/// Width and height are ideals, not requirements; the backend grants the
/// closest configuration it can.
///
/// # Example
/// ```
/// use gooji_lib::device::{FacingMode, StreamConstraints};
///
/// let constraints = StreamConstraints::new(1280, 720)
///     .with_facing_mode(FacingMode::User)
///     .with_audio(true);
/// assert_eq!(constraints.ideal_width, 1280);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamConstraints {
    /// Ideal capture width in pixels
    pub ideal_width: u32,

    /// Ideal capture height in pixels
    pub ideal_height: u32,

    /// Preferred camera orientation
    pub facing_mode: FacingMode,

    /// Whether an audio track is requested alongside video
    pub audio: bool,
}

impl StreamConstraints {
    /// Create constraints with the given ideal resolution
    ///
    /// Audio is enabled and the front-facing camera is preferred.
    pub fn new(ideal_width: u32, ideal_height: u32) -> Self {
        Self {
            ideal_width,
            ideal_height,
            facing_mode: FacingMode::default(),
            audio: true,
        }
    }

    /// 1920x1080 capture constraints
    pub fn full_hd() -> Self {
        Self::new(1920, 1080)
    }

    /// Set the preferred camera orientation
    pub fn with_facing_mode(mut self, facing_mode: FacingMode) -> Self {
        self.facing_mode = facing_mode;
        self
    }

    /// Enable or disable the audio track
    pub fn with_audio(mut self, audio: bool) -> Self {
        self.audio = audio;
        self
    }
}

impl Default for StreamConstraints {
    fn default() -> Self {
        Self::new(1280, 720)
    }
}
