//! Trait definition for the audio fetcher boundary.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::error::FetchError;

/// A tool that resolves a search query to a local audio file.
#[async_trait]
pub trait AudioFetcher: Send + Sync {
    /// Returns the name of this fetcher implementation.
    fn name(&self) -> &str;

    /// Searches for the query and downloads the best match.
    ///
    /// `dest_stem` is the destination path without extension; the
    /// fetcher picks the extension and returns the path of the file it
    /// actually produced.
    async fn fetch(&self, query: &str, dest_stem: &Path) -> Result<PathBuf, FetchError>;

    /// Validates that the fetcher is properly configured and ready.
    async fn validate(&self) -> Result<(), FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoFetcher;

    #[async_trait]
    impl AudioFetcher for EchoFetcher {
        fn name(&self) -> &str {
            "echo"
        }

        async fn fetch(&self, _query: &str, dest_stem: &Path) -> Result<PathBuf, FetchError> {
            Ok(dest_stem.with_extension("mp3"))
        }

        async fn validate(&self) -> Result<(), FetchError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_fetcher_returns_extension() {
        let fetcher = EchoFetcher;
        let path = fetcher
            .fetch("artist song", Path::new("/tmp/track-01"))
            .await
            .unwrap();
        assert_eq!(path, PathBuf::from("/tmp/track-01.mp3"));
    }
}
