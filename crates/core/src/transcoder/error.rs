//! Error types for the transcoder module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while rendering a clip.
#[derive(Debug, Error)]
pub enum TranscodeError {
    /// FFmpeg binary not found.
    #[error("FFmpeg not found at path: {path}")]
    FfmpegNotFound { path: PathBuf },

    /// FFprobe binary not found.
    #[error("FFprobe not found at path: {path}")]
    FfprobeNotFound { path: PathBuf },

    /// Input file not found.
    #[error("Input file not found: {path}")]
    InputNotFound { path: PathBuf },

    /// Encode process failed.
    #[error("Encode failed: {reason}")]
    EncodeFailed {
        reason: String,
        stderr: Option<String>,
    },

    /// Encode timed out.
    #[error("Encode timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// Failed to probe a media file.
    #[error("Failed to probe media file: {reason}")]
    ProbeFailed { reason: String },

    /// Failed to parse tool output.
    #[error("Failed to parse media info: {reason}")]
    ParseError { reason: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TranscodeError {
    /// Creates an encode failed error with captured stderr.
    pub fn encode_failed(reason: impl Into<String>, stderr: Option<String>) -> Self {
        Self::EncodeFailed {
            reason: reason.into(),
            stderr,
        }
    }

    /// Creates a probe failed error.
    pub fn probe_failed(reason: impl Into<String>) -> Self {
        Self::ProbeFailed {
            reason: reason.into(),
        }
    }

    /// Whether one more attempt is worth it. Missing binaries and missing
    /// inputs are not going to fix themselves between attempts.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::Io(_) | Self::EncodeFailed { .. }
        )
    }
}
