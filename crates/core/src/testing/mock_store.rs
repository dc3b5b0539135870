//! Mock media store for testing.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::storage::{MediaStore, StoredMedia, UploadError};

/// Mock implementation of the MediaStore trait.
#[derive(Debug, Clone)]
pub struct MockStore {
    /// Keys that were uploaded, in order.
    uploads: Arc<RwLock<Vec<String>>>,
    /// Substrings of keys that should fail to upload.
    failing: Arc<RwLock<Vec<String>>>,
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MockStore {
    /// Create a new mock store.
    pub fn new() -> Self {
        Self {
            uploads: Arc::new(RwLock::new(Vec::new())),
            failing: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Get all uploaded keys.
    pub async fn recorded_uploads(&self) -> Vec<String> {
        self.uploads.read().await.clone()
    }

    /// Number of upload attempts.
    pub async fn upload_count(&self) -> usize {
        self.uploads.read().await.len()
    }

    /// Make uploads whose key contains the substring fail.
    pub async fn fail_keys_containing(&self, substring: impl Into<String>) {
        self.failing.write().await.push(substring.into());
    }
}

#[async_trait]
impl MediaStore for MockStore {
    fn name(&self) -> &str {
        "mock"
    }

    async fn upload(&self, _local: &Path, key: &str) -> Result<StoredMedia, UploadError> {
        self.uploads.write().await.push(key.to_string());

        let failing = self.failing.read().await;
        if failing.iter().any(|s| key.contains(s.as_str())) {
            return Err(UploadError::Api {
                status: 503,
                message: "mock: upload failed".to_string(),
            });
        }

        Ok(StoredMedia {
            key: key.to_string(),
            public_url: format!("https://cdn.test/{}", key.replace(' ', "%20")),
            size_bytes: 3,
        })
    }
}
