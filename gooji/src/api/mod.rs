/// Backend HTTP contract
///
/// Typed client and wire types for the media site's REST API. The gallery
/// UI itself is an external collaborator; this module only implements the
/// data contract it consumes.

/// Gallery collaborator client
pub mod client;

/// API error types
pub mod error;

/// Wire types and query parameters
pub mod types;

// Re-export commonly used types
pub use client::{placeholder_thumbnail, ApiClient};
pub use error::{ApiError, ApiResult};
pub use types::{
    DeleteConfirmation, GalleryPage, GalleryQuery, HealthReport, SortOrder, VideoRecord,
    PAGE_SIZE,
};
