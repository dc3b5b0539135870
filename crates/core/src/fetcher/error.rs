//! Error types for the audio fetcher module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while resolving an audio source.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Fetch tool binary not found.
    #[error("Audio fetch tool not found at path: {path}")]
    ToolNotFound { path: PathBuf },

    /// The search produced no downloadable result.
    #[error("No audio source found for query: {query}")]
    NoResult { query: String },

    /// The tool ran but failed.
    #[error("Audio fetch failed: {reason}")]
    ToolFailed {
        reason: String,
        stderr: Option<String>,
    },

    /// Download timed out.
    #[error("Audio fetch timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FetchError {
    /// Creates a tool failed error with captured stderr.
    pub fn tool_failed(reason: impl Into<String>, stderr: Option<String>) -> Self {
        Self::ToolFailed {
            reason: reason.into(),
            stderr,
        }
    }
}
