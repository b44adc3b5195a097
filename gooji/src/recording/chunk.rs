use bytes::{Bytes, BytesMut};

use super::artifact::RecordingArtifact;

/// Immutable fragment of encoded media delivered during active recording
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedChunk {
    data: Bytes,
}

impl CapturedChunk {
    /// Wrap a byte fragment
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }

    /// Fragment content
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Fragment size in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check whether the fragment is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Ordered, append-only buffer of captured chunks
///
/// Owned exclusively by the active recording session; chunks are appended
/// in arrival order and never mutated. Sealing concatenates them into a
/// single [`RecordingArtifact`] without consuming the buffer — the buffer
/// is cleared only when the next recording starts.
#[derive(Debug, Default)]
pub struct ChunkSequence {
    chunks: Vec<CapturedChunk>,
    total_bytes: u64,
}

impl ChunkSequence {
    /// Create an empty sequence
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk in arrival order
    pub fn push(&mut self, data: Bytes) {
        self.total_bytes += data.len() as u64;
        self.chunks.push(CapturedChunk::new(data));
    }

    /// Number of chunks captured so far
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Check whether no chunks have been captured
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Total buffered size in bytes
    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// Discard all buffered chunks
    pub fn clear(&mut self) {
        self.chunks.clear();
        self.total_bytes = 0;
    }

    /// Concatenate all chunks in arrival order into a sealed artifact
    pub fn seal(&self, mime_type: &str) -> RecordingArtifact {
        let mut buffer = BytesMut::with_capacity(self.total_bytes as usize);
        for chunk in &self.chunks {
            buffer.extend_from_slice(chunk.data());
        }
        RecordingArtifact::new(buffer.freeze(), mime_type)
    }
}
