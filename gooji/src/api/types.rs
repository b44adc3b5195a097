use serde::{Deserialize, Serialize};

/// Videos per gallery page
///
/// A response shorter than this signals that no further pages exist.
pub const PAGE_SIZE: usize = 10;

/// One published video as the backend reports it
///
/// Decoding is tolerant: only `id` is required, everything else falls back
/// to its default so older records and the upload confirmation payload
/// (which carries a subset of fields) both parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    /// Stable record identifier
    pub id: String,

    /// Display title
    #[serde(default)]
    pub title: String,

    /// Free-form description
    #[serde(default)]
    pub description: String,

    /// Normalized tag list
    #[serde(default)]
    pub tags: Vec<String>,

    /// Playback duration in seconds
    #[serde(default)]
    pub duration: f64,

    /// RFC 3339 creation timestamp
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Gallery sort order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Most recent first
    Newest,
    /// Oldest first
    Oldest,
    /// Alphabetical by title
    Title,
}

impl SortOrder {
    /// Query-string value
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::Oldest => "oldest",
            Self::Title => "title",
        }
    }
}

impl Default for SortOrder {
    fn default() -> Self {
        Self::Newest
    }
}

/// Query parameters for one gallery page
///
/// # Example
/// ```
/// use gooji_lib::api::{GalleryQuery, SortOrder};
///
/// let query = GalleryQuery::page(2)
///     .with_search("miigwech")
///     .with_tag("language")
///     .with_sort(SortOrder::Oldest);
/// assert_eq!(query.page, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryQuery {
    /// 1-based page number
    pub page: u32,
    /// Free-text search term
    pub search: Option<String>,
    /// Single tag filter
    pub tag: Option<String>,
    /// Sort order
    pub sort: SortOrder,
}

impl GalleryQuery {
    /// Query for the given 1-based page
    pub fn page(page: u32) -> Self {
        Self {
            page: page.max(1),
            search: None,
            tag: None,
            sort: SortOrder::default(),
        }
    }

    /// Filter by a search term
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Filter by a tag
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Set the sort order
    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    /// Key/value pairs for the request query string
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("page", self.page.to_string())];
        if let Some(ref search) = self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(ref tag) = self.tag {
            pairs.push(("tag", tag.clone()));
        }
        pairs.push(("sort", self.sort.as_str().to_string()));
        pairs
    }
}

impl Default for GalleryQuery {
    fn default() -> Self {
        Self::page(1)
    }
}

/// One page of gallery results
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GalleryPage {
    /// Records on this page, in backend order
    pub videos: Vec<VideoRecord>,
    /// Whether a further page may exist
    pub has_more: bool,
}

impl GalleryPage {
    /// Wrap a raw listing, deriving `has_more` from the page size
    pub fn from_listing(videos: Vec<VideoRecord>) -> Self {
        let has_more = videos.len() == PAGE_SIZE;
        Self { videos, has_more }
    }
}

/// Confirmation payload returned by a delete
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeleteConfirmation {
    /// Identifier of the deleted record
    #[serde(default)]
    pub id: String,
    /// Optional human-readable confirmation
    #[serde(default)]
    pub message: Option<String>,
}

/// Backend health probe result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    /// Overall status string (`"healthy"` when all checks pass)
    #[serde(default)]
    pub status: String,
    /// Individual subsystem checks
    #[serde(default)]
    pub checks: std::collections::HashMap<String, bool>,
}
