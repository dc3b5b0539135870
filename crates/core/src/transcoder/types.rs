//! Types for the transcoder module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One clip rendering job: a window of the source audio under a static
/// cover frame.
#[derive(Debug, Clone)]
pub struct ClipJob {
    /// Source audio file.
    pub audio_path: PathBuf,
    /// Static cover image shown for the whole clip.
    pub cover_path: PathBuf,
    /// Output video file.
    pub output_path: PathBuf,
    /// Window start into the source, in seconds.
    pub start_secs: u64,
    /// Window length in seconds.
    pub duration_secs: u64,
    /// Square canvas edge in pixels.
    pub canvas_px: u32,
    /// Output frame rate.
    pub fps: u32,
}

/// Result of a successful clip render.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipResult {
    /// Output video file.
    pub output_path: PathBuf,
    /// Output size in bytes.
    pub output_size_bytes: u64,
    /// Wall time spent encoding, in milliseconds.
    pub elapsed_ms: u64,
}

/// Probed information about a media file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaInfo {
    /// File that was probed.
    pub path: PathBuf,
    /// Container duration in seconds.
    pub duration_secs: f64,
    /// Container format name.
    pub format: String,
    /// File size in bytes.
    pub size_bytes: u64,
}
