//! Mock transcoder for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::transcoder::{ClipJob, ClipResult, MediaInfo, TranscodeError, Transcoder};

/// A recorded render for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedRender {
    /// The job that was submitted.
    pub job: ClipJob,
    /// Whether the render succeeded.
    pub success: bool,
}

/// Mock implementation of the Transcoder trait.
///
/// Successful renders write a small file at the job's output path, so
/// folder-shape assertions (selector, idempotence) work against real
/// directories.
#[derive(Debug, Clone)]
pub struct MockTranscoder {
    /// Recorded renders.
    renders: Arc<RwLock<Vec<RecordedRender>>>,
    /// Pre-configured probe durations by path.
    probe_durations: Arc<RwLock<HashMap<PathBuf, f64>>>,
    /// Default probe duration for unknown files.
    default_duration_secs: Arc<RwLock<f64>>,
    /// Fail this many upcoming renders with a retryable error.
    retryable_failures: Arc<RwLock<u32>>,
    /// Fail every render, retries included.
    fail_all: Arc<RwLock<bool>>,
}

impl Default for MockTranscoder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTranscoder {
    /// Create a new mock transcoder. Unknown files probe as 200 seconds.
    pub fn new() -> Self {
        Self {
            renders: Arc::new(RwLock::new(Vec::new())),
            probe_durations: Arc::new(RwLock::new(HashMap::new())),
            default_duration_secs: Arc::new(RwLock::new(200.0)),
            retryable_failures: Arc::new(RwLock::new(0)),
            fail_all: Arc::new(RwLock::new(false)),
        }
    }

    /// Get all recorded renders.
    pub async fn recorded_renders(&self) -> Vec<RecordedRender> {
        self.renders.read().await.clone()
    }

    /// Number of render attempts, successful or not.
    pub async fn render_count(&self) -> usize {
        self.renders.read().await.len()
    }

    /// Set the probed duration for a specific path.
    pub async fn set_probe_duration(&self, path: impl AsRef<Path>, duration_secs: f64) {
        self.probe_durations
            .write()
            .await
            .insert(path.as_ref().to_path_buf(), duration_secs);
    }

    /// Set the probed duration for unknown files.
    pub async fn set_default_duration(&self, duration_secs: f64) {
        *self.default_duration_secs.write().await = duration_secs;
    }

    /// Fail the next `count` renders with a retryable error.
    pub async fn fail_next_renders(&self, count: u32) {
        *self.retryable_failures.write().await = count;
    }

    /// Fail every render, retries included.
    pub async fn fail_all_renders(&self) {
        *self.fail_all.write().await = true;
    }
}

#[async_trait]
impl Transcoder for MockTranscoder {
    fn name(&self) -> &str {
        "mock"
    }

    async fn probe(&self, path: &Path) -> Result<MediaInfo, TranscodeError> {
        let duration_secs = {
            let known = self.probe_durations.read().await;
            match known.get(path) {
                Some(d) => *d,
                None => *self.default_duration_secs.read().await,
            }
        };

        Ok(MediaInfo {
            path: path.to_path_buf(),
            duration_secs,
            format: "mp3".to_string(),
            size_bytes: 1024,
        })
    }

    async fn render_clip(&self, job: ClipJob) -> Result<ClipResult, TranscodeError> {
        if *self.fail_all.read().await {
            self.renders.write().await.push(RecordedRender {
                job,
                success: false,
            });
            return Err(TranscodeError::encode_failed("mock: render disabled", None));
        }

        {
            let mut remaining = self.retryable_failures.write().await;
            if *remaining > 0 {
                *remaining -= 1;
                drop(remaining);
                self.renders.write().await.push(RecordedRender {
                    job,
                    success: false,
                });
                return Err(TranscodeError::encode_failed("mock: transient failure", None));
            }
        }

        if let Some(parent) = job.output_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&job.output_path, b"mock video").await?;

        let result = ClipResult {
            output_path: job.output_path.clone(),
            output_size_bytes: 10,
            elapsed_ms: 1,
        };
        self.renders.write().await.push(RecordedRender {
            job,
            success: true,
        });
        Ok(result)
    }

    async fn validate(&self) -> Result<(), TranscodeError> {
        Ok(())
    }
}
