/// Typed client for the media backend's HTTP contract
///
/// Covers the gallery collaborator endpoints: paged listing, playable
/// binary fetch, deletion, thumbnails and the health probe. Upload has its
/// own client in [`crate::upload`].
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use tracing::{debug, warn};

use super::error::{ApiError, ApiResult};
use super::types::{DeleteConfirmation, GalleryPage, GalleryQuery, HealthReport, VideoRecord};
use crate::state::config::ApiConfig;

/// Built-in thumbnail placeholder (320x180 SVG), served whenever a real
/// thumbnail cannot be fetched
const THUMBNAIL_PLACEHOLDER_B64: &str = "PHN2ZyB3aWR0aD0iMzIwIiBoZWlnaHQ9IjE4MCIgdmlld0JveD0iMCAwIDMyMCAxODAiIGZpbGw9Im5vbmUiIHhtbG5zPSJodHRwOi8vd3d3LnczLm9yZy8yMDAwL3N2ZyI+CjxyZWN0IHdpZHRoPSIzMjAiIGhlaWdodD0iMTgwIiBmaWxsPSIjRjNGNEY2Ii8+CjxwYXRoIGQ9Ik0xNjAgOTBDMTQzLjQzMSA5MCAxMzAgMTAzLjQzMSAxMzAgMTIwQzEzMCAxMzYuNTY5IDE0My40MzEgMTUwIDE2MCAxNTBDMTc2LjU2OSAxNTAgMTkwIDEzNi41NjkgMTkwIDEyMEMxOTAgMTAzLjQzMSAxNzYuNTY5IDkwIDE2MCA5MFoiIGZpbGw9IiM5Q0EzQUYiLz4KPHBhdGggZD0iTTE2MCAxMzBDMTU1LjU4MiAxMzAgMTUyIDEyNi40MTggMTUyIDEyMkMxNTIgMTE3LjU4MiAxNTUuNTgyIDExNCAxNjAgMTE0QzE2NC40MTggMTE0IDE2OCAxMTcuNTgyIDE2OCAxMjJDMTY4IDEyNi40MTggMTY0LjQxOCAxMzAgMTYwIDEzMFoiIGZpbGw9IndoaXRlIi8+Cjwvc3ZnPgo=";

/// Decode the built-in placeholder thumbnail
pub fn placeholder_thumbnail() -> Bytes {
    Bytes::from(
        STANDARD
            .decode(THUMBNAIL_PLACEHOLDER_B64)
            .expect("embedded placeholder is valid base64"),
    )
}

/// Gallery collaborator client
///
/// # Example
/// ```no_run
/// use gooji_lib::api::{ApiClient, GalleryQuery};
///
/// # #[tokio::main]
/// # async fn main() {
/// let client = ApiClient::new("http://localhost:8080");
///
/// let page = client.list_videos(&GalleryQuery::page(1)).await.unwrap();
/// for video in &page.videos {
///     println!("{}: {}", video.id, video.title);
/// }
/// # }
/// ```
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client against the given backend base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Create a client from the API configuration
    ///
    /// # Errors
    /// Returns [`ApiError::Transport`] if the HTTP client cannot be built.
    pub fn from_config(config: &ApiConfig) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }

    /// Fetch one page of the gallery listing
    ///
    /// `has_more` is derived from the page size: a short page means no
    /// further pages exist.
    ///
    /// # Errors
    /// [`ApiError::Status`] on a non-2xx response, [`ApiError::Transport`]
    /// / [`ApiError::Decode`] otherwise.
    pub async fn list_videos(&self, query: &GalleryQuery) -> ApiResult<GalleryPage> {
        let response = self
            .http
            .get(self.url("/api/videos"))
            .query(&query.to_query_pairs())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }

        let videos: Vec<VideoRecord> = response.json().await?;
        debug!(count = videos.len(), page = query.page, "Gallery page fetched");
        Ok(GalleryPage::from_listing(videos))
    }

    /// Fetch a video's playable binary stream
    ///
    /// # Errors
    /// [`ApiError::Status`] on a non-2xx response (404 for an unknown id).
    pub async fn fetch_video(&self, id: &str) -> ApiResult<Bytes> {
        let response = self
            .http
            .get(self.url(&format!("/api/videos/{id}")))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }

        Ok(response.bytes().await?)
    }

    /// Delete a video record
    ///
    /// # Errors
    /// [`ApiError::Status`] on a non-2xx response.
    pub async fn delete_video(&self, id: &str) -> ApiResult<DeleteConfirmation> {
        let response = self
            .http
            .delete(self.url(&format!("/api/videos/{id}")))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }

        Ok(response.json().await?)
    }

    /// Fetch a video's thumbnail image
    ///
    /// Never fails: a missing thumbnail, a non-2xx response or a transport
    /// error all degrade to the built-in placeholder image.
    pub async fn fetch_thumbnail(&self, id: &str) -> Bytes {
        let request = self
            .http
            .get(self.url("/api/thumbnails"))
            .query(&[("id", id)]);

        match request.send().await {
            Ok(response) if response.status().is_success() => match response.bytes().await {
                Ok(bytes) if !bytes.is_empty() => bytes,
                _ => {
                    debug!(id, "Empty thumbnail body, using placeholder");
                    placeholder_thumbnail()
                }
            },
            Ok(response) => {
                debug!(id, status = %response.status(), "Thumbnail unavailable, using placeholder");
                placeholder_thumbnail()
            }
            Err(err) => {
                warn!(id, error = %err, "Thumbnail fetch failed, using placeholder");
                placeholder_thumbnail()
            }
        }
    }

    /// Probe backend health
    ///
    /// # Errors
    /// [`ApiError::Status`] on a non-2xx response.
    pub async fn health(&self) -> ApiResult<HealthReport> {
        let response = self.http.get(self.url("/api/health")).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }

        Ok(response.json().await?)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_decodes_to_svg() {
        let bytes = placeholder_thumbnail();
        assert!(!bytes.is_empty());

        let text = std::str::from_utf8(&bytes).unwrap();
        assert!(text.starts_with("<svg"));
        assert!(text.contains("320"));
        assert!(text.contains("180"));
    }

    #[test]
    fn test_url_joining() {
        let client = ApiClient::new("http://localhost:8080/");
        assert_eq!(client.url("/api/videos"), "http://localhost:8080/api/videos");

        let client = ApiClient::new("http://localhost:8080");
        assert_eq!(
            client.url("/api/thumbnails"),
            "http://localhost:8080/api/thumbnails"
        );
    }
}
