//! yt-dlp based audio fetcher implementation.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::debug;

use crate::config::FetcherConfig;

use super::error::FetchError;
use super::traits::AudioFetcher;

/// Audio fetcher that shells out to yt-dlp with a single-result search.
pub struct YtDlpFetcher {
    config: FetcherConfig,
}

impl YtDlpFetcher {
    /// Creates a new fetcher with the given configuration.
    pub fn new(config: FetcherConfig) -> Self {
        Self { config }
    }

    /// Creates a fetcher with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(FetcherConfig::default())
    }

    fn build_args(&self, query: &str, dest_stem: &Path) -> Vec<String> {
        vec![
            format!("ytsearch1:{}", query),
            "-x".to_string(),
            "--audio-format".to_string(),
            self.config.audio_format.clone(),
            "-o".to_string(),
            format!("{}.%(ext)s", dest_stem.to_string_lossy()),
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
            "--quiet".to_string(),
        ]
    }

    /// Finds the file the tool produced: the expected extension first,
    /// then anything else sharing the stem (the extractor sometimes keeps
    /// its own container format).
    async fn resolve_output(&self, dest_stem: &Path) -> Result<Option<PathBuf>, FetchError> {
        let expected = dest_stem.with_extension(&self.config.audio_format);
        if tokio::fs::try_exists(&expected).await? {
            return Ok(Some(expected));
        }

        let Some(parent) = dest_stem.parent() else {
            return Ok(None);
        };
        let Some(stem_name) = dest_stem.file_name().map(|n| n.to_string_lossy().to_string())
        else {
            return Ok(None);
        };

        let mut entries = tokio::fs::read_dir(parent).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with(&format!("{}.", stem_name)) {
                return Ok(Some(entry.path()));
            }
        }
        Ok(None)
    }
}

#[async_trait]
impl AudioFetcher for YtDlpFetcher {
    fn name(&self) -> &str {
        "yt-dlp"
    }

    async fn fetch(&self, query: &str, dest_stem: &Path) -> Result<PathBuf, FetchError> {
        if let Some(parent) = dest_stem.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let args = self.build_args(query, dest_stem);
        debug!(query, "spawning yt-dlp");

        let child = Command::new(&self.config.ytdlp_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    FetchError::ToolNotFound {
                        path: self.config.ytdlp_path.clone(),
                    }
                } else {
                    FetchError::Io(e)
                }
            })?;

        let timeout_duration = Duration::from_secs(self.config.timeout_secs);
        let output = match timeout(timeout_duration, child.wait_with_output()).await {
            Ok(result) => result.map_err(FetchError::Io)?,
            Err(_) => {
                return Err(FetchError::Timeout {
                    timeout_secs: self.config.timeout_secs,
                })
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            return Err(FetchError::tool_failed(
                format!("yt-dlp exited with code: {:?}", output.status.code()),
                (!stderr.is_empty()).then_some(stderr),
            ));
        }

        match self.resolve_output(dest_stem).await? {
            Some(path) => Ok(path),
            // Exit 0 with no file means the search came up empty.
            None => Err(FetchError::NoResult {
                query: query.to_string(),
            }),
        }
    }

    async fn validate(&self) -> Result<(), FetchError> {
        let status = Command::new(&self.config.ytdlp_path)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;
        match status {
            Ok(s) if s.success() => Ok(()),
            _ => Err(FetchError::ToolNotFound {
                path: self.config.ytdlp_path.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_args_single_result_search() {
        let fetcher = YtDlpFetcher::with_defaults();
        let args = fetcher.build_args("Artist Album Song", Path::new("/tmp/track-01"));

        assert_eq!(args[0], "ytsearch1:Artist Album Song");
        assert!(args.contains(&"-x".to_string()));
        assert!(args.contains(&"--no-playlist".to_string()));
        let o = args.iter().position(|a| a == "-o").unwrap();
        assert_eq!(args[o + 1], "/tmp/track-01.%(ext)s");
    }

    #[tokio::test]
    async fn test_resolve_output_expected_extension() {
        let dir = tempfile::tempdir().unwrap();
        let stem = dir.path().join("track-01");
        tokio::fs::write(stem.with_extension("mp3"), b"x").await.unwrap();

        let fetcher = YtDlpFetcher::with_defaults();
        let resolved = fetcher.resolve_output(&stem).await.unwrap();
        assert_eq!(resolved.unwrap(), stem.with_extension("mp3"));
    }

    #[tokio::test]
    async fn test_resolve_output_other_extension() {
        let dir = tempfile::tempdir().unwrap();
        let stem = dir.path().join("track-02");
        tokio::fs::write(stem.with_extension("opus"), b"x").await.unwrap();

        let fetcher = YtDlpFetcher::with_defaults();
        let resolved = fetcher.resolve_output(&stem).await.unwrap();
        assert_eq!(resolved.unwrap(), stem.with_extension("opus"));
    }

    #[tokio::test]
    async fn test_resolve_output_nothing_produced() {
        let dir = tempfile::tempdir().unwrap();
        let stem = dir.path().join("track-03");

        let fetcher = YtDlpFetcher::with_defaults();
        assert!(fetcher.resolve_output(&stem).await.unwrap().is_none());
    }
}
