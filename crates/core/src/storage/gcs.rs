//! Google Cloud Storage implementation of the media store.

use async_trait::async_trait;
use reqwest::Client;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::StorageConfig;

use super::{MediaStore, StoredMedia, UploadError};

/// Media store backed by the GCS JSON upload API.
///
/// Uses a plain `uploadType=media` upload with an OAuth bearer token and
/// returns the object's public URL, which assumes the bucket allows
/// public reads for the configured prefix.
pub struct GcsMediaStore {
    client: Client,
    config: StorageConfig,
    base_url: String,
}

impl GcsMediaStore {
    /// Create a new store from configuration.
    pub fn new(config: StorageConfig) -> Result<Self, UploadError> {
        if config.bucket.is_empty() {
            return Err(UploadError::NotConfigured("bucket is empty".to_string()));
        }
        if config.access_token.is_empty() {
            return Err(UploadError::NotConfigured(
                "access token is empty".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| "https://storage.googleapis.com".to_string());

        Ok(Self {
            client,
            config,
            base_url,
        })
    }

    /// Full object name for a key, prefix applied.
    fn object_name(&self, key: &str) -> String {
        if self.config.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}/{}", self.config.prefix.trim_matches('/'), key)
        }
    }

    /// Public URL for an object name. Path segments are percent-encoded
    /// individually so the slashes survive.
    fn public_url(&self, object_name: &str) -> String {
        let encoded: Vec<String> = object_name
            .split('/')
            .map(|seg| urlencoding::encode(seg).into_owned())
            .collect();
        format!(
            "{}/{}/{}",
            self.base_url,
            self.config.bucket,
            encoded.join("/")
        )
    }
}

/// Content type by file extension; the Graph API cares about video/mp4.
fn content_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .as_deref()
    {
        Some("mp4") => "video/mp4",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}

#[async_trait]
impl MediaStore for GcsMediaStore {
    fn name(&self) -> &str {
        "gcs"
    }

    async fn upload(&self, local: &Path, key: &str) -> Result<StoredMedia, UploadError> {
        let bytes = tokio::fs::read(local).await?;
        let size_bytes = bytes.len() as u64;
        let object_name = self.object_name(key);

        let url = format!(
            "{}/upload/storage/v1/b/{}/o",
            self.base_url, self.config.bucket
        );
        debug!(object = %object_name, size_bytes, "uploading to GCS");

        let response = self
            .client
            .post(&url)
            .query(&[("uploadType", "media"), ("name", object_name.as_str())])
            .bearer_auth(&self.config.access_token)
            .header(reqwest::header::CONTENT_TYPE, content_type_for(local))
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(UploadError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let public_url = self.public_url(&object_name);
        info!(object = %object_name, url = %public_url, "uploaded");
        Ok(StoredMedia {
            key: object_name,
            public_url,
            size_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> GcsMediaStore {
        let config = StorageConfig {
            bucket: "my-bucket".to_string(),
            prefix: "discogs-posts".to_string(),
            access_token: "token".to_string(),
            base_url: None,
            timeout_secs: 10,
        };
        GcsMediaStore::new(config).unwrap()
    }

    #[test]
    fn test_new_requires_credentials() {
        let config = StorageConfig::default();
        assert!(matches!(
            GcsMediaStore::new(config),
            Err(UploadError::NotConfigured(_))
        ));
    }

    #[test]
    fn test_object_name_applies_prefix() {
        let store = store();
        assert_eq!(
            store.object_name("My Release/track-01.mp4"),
            "discogs-posts/My Release/track-01.mp4"
        );
    }

    #[test]
    fn test_public_url_encodes_segments() {
        let store = store();
        let url = store.public_url("discogs-posts/My Release/track-01.mp4");
        assert_eq!(
            url,
            "https://storage.googleapis.com/my-bucket/discogs-posts/My%20Release/track-01.mp4"
        );
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for(Path::new("a.mp4")), "video/mp4");
        assert_eq!(content_type_for(Path::new("a.JPG")), "image/jpeg");
        assert_eq!(content_type_for(Path::new("a.bin")), "application/octet-stream");
    }
}
