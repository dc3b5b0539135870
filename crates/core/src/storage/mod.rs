//! Cloud storage boundary: turns local media files into public URLs.
//!
//! The Graph API only accepts media it can fetch itself, so every asset
//! is staged in a bucket first. The [`MediaStore`] trait keeps the
//! publisher testable; [`GcsMediaStore`] is the Google Cloud Storage
//! implementation.

mod gcs;

pub use gcs::GcsMediaStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during an upload.
#[derive(Debug, Error)]
pub enum UploadError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Storage API returned a non-success status.
    #[error("Upload rejected: {status} - {message}")]
    Api { status: u16, message: String },

    /// Local file problem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Store not configured (missing bucket or token).
    #[error("Store not configured: {0}")]
    NotConfigured(String),
}

/// A successfully staged media object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMedia {
    /// Object key within the bucket (prefix included).
    pub key: String,
    /// Publicly fetchable URL.
    pub public_url: String,
    /// Uploaded size in bytes.
    pub size_bytes: u64,
}

/// A store that can stage media files under public URLs.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Returns the name of this store implementation.
    fn name(&self) -> &str;

    /// Uploads a local file under the given key (relative to the store's
    /// configured prefix) and returns its public URL.
    async fn upload(&self, local: &Path, key: &str) -> Result<StoredMedia, UploadError>;
}
