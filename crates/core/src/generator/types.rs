//! Types for the generator module.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::fetcher::FetchError;
use crate::transcoder::TranscodeError;

/// Errors that abort the whole release run.
///
/// Per-track problems never surface here; they land in the report.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// Filesystem problem with the release folder itself.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Why a single track produced no video.
#[derive(Debug, Error)]
pub enum TrackFailure {
    /// No audio source could be resolved.
    #[error("audio resolution failed: {0}")]
    Resolution(#[from] FetchError),

    /// Source audio is shorter than the requested clip window.
    #[error("source is {duration_secs:.1}s, clip window needs {required_secs}s")]
    SourceTooShort {
        duration_secs: f64,
        required_secs: u64,
    },

    /// The resolved source could not be probed.
    #[error("source probe failed: {0}")]
    Probe(TranscodeError),

    /// Encoding failed, including the retry.
    #[error("transcode failed: {0}")]
    Transcode(TranscodeError),
}

/// What happened to one track.
#[derive(Debug)]
pub enum TrackOutcome {
    /// A new video was rendered.
    Generated { path: PathBuf },
    /// The video already existed; nothing was done.
    AlreadyPresent { path: PathBuf },
    /// The track failed and was skipped.
    Failed { failure: TrackFailure },
}

/// Per-track record in the run report.
#[derive(Debug)]
pub struct TrackRecord {
    /// 1-based track position.
    pub position: u32,
    /// Track title.
    pub title: String,
    pub outcome: TrackOutcome,
}

/// Report for one generator run over one release.
#[derive(Debug)]
pub struct GenerationReport {
    /// Release title the run was for.
    pub release_title: String,
    /// The release folder everything was written into.
    pub folder: PathBuf,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// Metadata file path (written or already present).
    pub metadata_path: PathBuf,
    /// Cover image path, when one could be resolved.
    pub cover_path: Option<PathBuf>,
    /// Why video generation was aborted before the track loop, if it was.
    pub cover_error: Option<String>,
    /// Per-track outcomes, in tracklist order.
    pub tracks: Vec<TrackRecord>,
}

impl GenerationReport {
    /// Number of freshly generated videos.
    pub fn generated(&self) -> usize {
        self.tracks
            .iter()
            .filter(|t| matches!(t.outcome, TrackOutcome::Generated { .. }))
            .count()
    }

    /// Number of tracks skipped because their video already existed.
    pub fn already_present(&self) -> usize {
        self.tracks
            .iter()
            .filter(|t| matches!(t.outcome, TrackOutcome::AlreadyPresent { .. }))
            .count()
    }

    /// Number of failed tracks.
    pub fn failed(&self) -> usize {
        self.tracks
            .iter()
            .filter(|t| matches!(t.outcome, TrackOutcome::Failed { .. }))
            .count()
    }

    /// Failed records, for operator display.
    pub fn failures(&self) -> impl Iterator<Item = &TrackRecord> {
        self.tracks
            .iter()
            .filter(|t| matches!(t.outcome, TrackOutcome::Failed { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_counters() {
        let report = GenerationReport {
            release_title: "R".to_string(),
            folder: PathBuf::from("/out/R"),
            started_at: Utc::now(),
            metadata_path: PathBuf::from("/out/R/release.txt"),
            cover_path: Some(PathBuf::from("/out/R/cover.jpg")),
            cover_error: None,
            tracks: vec![
                TrackRecord {
                    position: 1,
                    title: "a".to_string(),
                    outcome: TrackOutcome::Generated {
                        path: PathBuf::from("/out/R/track-01.mp4"),
                    },
                },
                TrackRecord {
                    position: 2,
                    title: "b".to_string(),
                    outcome: TrackOutcome::Failed {
                        failure: TrackFailure::SourceTooShort {
                            duration_secs: 45.0,
                            required_secs: 120,
                        },
                    },
                },
                TrackRecord {
                    position: 3,
                    title: "c".to_string(),
                    outcome: TrackOutcome::AlreadyPresent {
                        path: PathBuf::from("/out/R/track-03.mp4"),
                    },
                },
            ],
        };

        assert_eq!(report.generated(), 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.already_present(), 1);
        assert_eq!(report.failures().count(), 1);
    }
}
