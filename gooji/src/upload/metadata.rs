use serde::{Deserialize, Serialize};

use super::error::{UploadError, UploadResult};

/// Descriptive fields accompanying one upload
///
/// Title, description and category are required; tags and language may be
/// empty. The metadata survives a failed transfer unchanged so the user
/// can resubmit without re-entering anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadMetadata {
    /// Display title (required)
    pub title: String,

    /// Free-form description (required)
    pub description: String,

    /// Comma/space-separated tag string (optional)
    pub tags: String,

    /// Content category, e.g. "language" or "story" (required)
    pub category: String,

    /// Spoken language of the content (optional)
    pub language: String,

    /// Whether the video is publicly listed
    pub public: bool,
}

impl UploadMetadata {
    /// Create metadata with the required fields filled in
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            tags: String::new(),
            category: category.into(),
            language: String::new(),
            public: true,
        }
    }

    /// Set the tag string
    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = tags.into();
        self
    }

    /// Set the content language
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Set public visibility
    pub fn with_public(mut self, public: bool) -> Self {
        self.public = public;
        self
    }

    /// Check that every required field is non-empty after trimming
    ///
    /// # Errors
    /// Returns [`UploadError::Validation`] naming the first empty field.
    pub fn validate(&self) -> UploadResult<()> {
        if self.title.trim().is_empty() {
            return Err(UploadError::Validation { field: "title" });
        }
        if self.description.trim().is_empty() {
            return Err(UploadError::Validation {
                field: "description",
            });
        }
        if self.category.trim().is_empty() {
            return Err(UploadError::Validation { field: "category" });
        }
        Ok(())
    }

    /// Split the tag string on commas and whitespace, dropping empties
    pub fn normalized_tags(&self) -> Vec<String> {
        self.tags
            .split(|c: char| c == ',' || c.is_whitespace())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Normalized tag string as sent on the wire
    pub fn tags_field(&self) -> String {
        self.normalized_tags().join(", ")
    }
}
