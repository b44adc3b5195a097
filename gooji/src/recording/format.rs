use serde::Serialize;
use tracing::{debug, info};

use crate::media::MediaBackend;

/// High-efficiency codec pairing, tried first
pub const PREFERRED_FORMAT: &str = "video/webm;codecs=vp9,opus";

/// Generic container fallback
pub const GENERIC_FORMAT: &str = "video/webm";

/// Which rung of the preference ladder was selected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatTier {
    /// The preferred codec pairing is supported
    Preferred,
    /// Only the generic container is supported
    Generic,
    /// Neither is supported; the encoder picks its own default
    EncoderDefault,
}

/// Negotiated recording format
///
/// Resolved exactly once when a recording starts, never per chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordingFormat {
    /// Full MIME type handed to the encoder (may carry codec parameters)
    pub mime_type: String,
    /// Preference rung that was selected
    pub tier: FormatTier,
}

impl RecordingFormat {
    /// Walk the preference order against the backend's encoder support
    ///
    /// `video/webm;codecs=vp9,opus` first, then `video/webm`, then
    /// whatever the encoder reports as its default.
    pub fn negotiate(backend: &dyn MediaBackend) -> Self {
        if backend.is_format_supported(PREFERRED_FORMAT) {
            debug!(mime = PREFERRED_FORMAT, "Preferred format supported");
            return Self {
                mime_type: PREFERRED_FORMAT.to_string(),
                tier: FormatTier::Preferred,
            };
        }

        if backend.is_format_supported(GENERIC_FORMAT) {
            info!(
                mime = GENERIC_FORMAT,
                "Preferred codecs unavailable, using generic container"
            );
            return Self {
                mime_type: GENERIC_FORMAT.to_string(),
                tier: FormatTier::Generic,
            };
        }

        let fallback = backend.default_format();
        info!(mime = %fallback, "No negotiated format supported, using encoder default");
        Self {
            mime_type: fallback,
            tier: FormatTier::EncoderDefault,
        }
    }

    /// Container MIME type with codec parameters stripped
    ///
    /// Sealed artifacts are tagged with this, not with the full encoder
    /// string.
    pub fn container(&self) -> String {
        self.mime_type
            .parse::<mime::Mime>()
            .map(|m| m.essence_str().to_string())
            .unwrap_or_else(|_| {
                self.mime_type
                    .split(';')
                    .next()
                    .unwrap_or(&self.mime_type)
                    .trim()
                    .to_string()
            })
    }
}
