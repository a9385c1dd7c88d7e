//! Fetching video thumbnails.

use crate::error::{Error, Result};
use crate::fetcher::{Transport, base_headers};
use crate::model::field::{self, THUMBNAIL_URL_PATH};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Downloads the thumbnail referenced by the metadata and writes it to `destination`.
///
/// # Errors
///
/// Returns [`Error::MissingField`] if the metadata has no thumbnail URL,
/// [`Error::Thumbnail`] on a non-200 status, or an IO error if the file can't be written.
pub async fn fetch_thumbnail(
    transport: &dyn Transport,
    metadata: &Value,
    user_agent: &str,
    destination: impl AsRef<Path>,
) -> Result<PathBuf> {
    log::info!("Downloading thumbnail...");

    let url = field::thumbnail_url(metadata).ok_or(Error::MissingField(THUMBNAIL_URL_PATH))?;
    let response = transport.get(url, base_headers(user_agent)).await?;
    if !response.is_ok() {
        return Err(Error::Thumbnail(response.status));
    }

    tokio::fs::write(destination.as_ref(), &response.body).await?;
    Ok(destination.as_ref().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::DEFAULT_USER_AGENT;
    use crate::fetcher::testing::FakeTransport;
    use serde_json::json;

    #[tokio::test]
    async fn missing_url_is_reported() {
        let transport = FakeTransport::default();

        let result = fetch_thumbnail(&transport, &json!({}), DEFAULT_USER_AGENT, "unused.jpg").await;

        assert!(matches!(result, Err(Error::MissingField("thumbnail_url"))));
        assert!(transport.requested().is_empty());
    }

    #[tokio::test]
    async fn thumbnail_is_written() {
        let transport = FakeTransport::default().route("http://img/t.jpg", 200, "JPEGDATA");
        let destination = std::env::temp_dir().join("rutubedl-thumbnail-test.jpg");
        let metadata = json!({"thumbnail_url": "http://img/t.jpg"});

        let path = fetch_thumbnail(&transport, &metadata, DEFAULT_USER_AGENT, &destination)
            .await
            .unwrap();

        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"JPEGDATA");
        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn failed_status_is_reported() {
        let transport = FakeTransport::default().route("http://img/t.jpg", 500, "");
        let metadata = json!({"thumbnail_url": "http://img/t.jpg"});

        let result = fetch_thumbnail(&transport, &metadata, DEFAULT_USER_AGENT, "unused.jpg").await;

        assert!(matches!(result, Err(Error::Thumbnail(500))));
    }
}
