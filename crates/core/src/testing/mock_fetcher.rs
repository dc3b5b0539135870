//! Mock audio fetcher for testing.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::fetcher::{AudioFetcher, FetchError};

/// Mock implementation of the AudioFetcher trait.
///
/// Successful fetches write a small mp3-named file at the destination
/// stem, mirroring what yt-dlp would leave behind.
#[derive(Debug, Clone)]
pub struct MockFetcher {
    /// Queries that were fetched, in order.
    queries: Arc<RwLock<Vec<String>>>,
    /// Substrings of queries that should fail as unresolvable.
    unresolvable: Arc<RwLock<Vec<String>>>,
    /// Fail every fetch as a tool failure.
    fail_all: Arc<RwLock<bool>>,
}

impl Default for MockFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFetcher {
    /// Create a new mock fetcher.
    pub fn new() -> Self {
        Self {
            queries: Arc::new(RwLock::new(Vec::new())),
            unresolvable: Arc::new(RwLock::new(Vec::new())),
            fail_all: Arc::new(RwLock::new(false)),
        }
    }

    /// Get all fetched queries.
    pub async fn recorded_queries(&self) -> Vec<String> {
        self.queries.read().await.clone()
    }

    /// Number of fetch calls.
    pub async fn fetch_count(&self) -> usize {
        self.queries.read().await.len()
    }

    /// Make queries containing the given substring fail as unresolvable.
    pub async fn fail_queries_containing(&self, substring: impl Into<String>) {
        self.unresolvable.write().await.push(substring.into());
    }

    /// Fail every fetch with a tool failure.
    pub async fn fail_all_fetches(&self) {
        *self.fail_all.write().await = true;
    }
}

#[async_trait]
impl AudioFetcher for MockFetcher {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(&self, query: &str, dest_stem: &Path) -> Result<PathBuf, FetchError> {
        self.queries.write().await.push(query.to_string());

        if *self.fail_all.read().await {
            return Err(FetchError::tool_failed("mock: fetch disabled", None));
        }

        let unresolvable = self.unresolvable.read().await;
        if unresolvable.iter().any(|s| query.contains(s.as_str())) {
            return Err(FetchError::NoResult {
                query: query.to_string(),
            });
        }
        drop(unresolvable);

        if let Some(parent) = dest_stem.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let path = dest_stem.with_extension("mp3");
        tokio::fs::write(&path, b"mock audio").await?;
        Ok(path)
    }

    async fn validate(&self) -> Result<(), FetchError> {
        Ok(())
    }
}
