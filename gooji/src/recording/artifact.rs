use bytes::Bytes;
use serde::Serialize;

/// Sealed result of a completed recording
///
/// Created exactly once when a recording stops; the byte content is the
/// ordered concatenation of every chunk captured since the recording
/// started. Read-only afterwards — playback and upload consume it through
/// shared references, never by mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordingArtifact {
    #[serde(skip)]
    data: Bytes,
    mime_type: String,
    size_bytes: u64,
}

impl RecordingArtifact {
    /// Seal a byte blob under the given container MIME type
    pub fn new(data: Bytes, mime_type: impl Into<String>) -> Self {
        let size_bytes = data.len() as u64;
        Self {
            data,
            mime_type: mime_type.into(),
            size_bytes,
        }
    }

    /// Sealed byte content (cheap to clone, shares the allocation)
    pub fn data(&self) -> Bytes {
        self.data.clone()
    }

    /// Container MIME type the artifact was sealed with
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Size of the sealed content in bytes
    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Check whether the artifact has no content
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
