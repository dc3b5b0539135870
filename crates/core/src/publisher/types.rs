//! Types for the publisher module.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::instagram::{PublishError, PublishedPost};
use crate::storage::UploadError;

/// Why a folder produced no post.
#[derive(Debug, Error)]
pub enum PublishFailure {
    /// Every upload failed, or the folder had nothing to upload.
    #[error("no uploadable media")]
    NoUploadableMedia,

    /// The caption file could not be read.
    #[error("caption unreadable: {0}")]
    Caption(#[from] std::io::Error),

    /// Container creation, processing or the publish call failed.
    #[error(transparent)]
    Graph(#[from] PublishError),
}

/// What happened to one media item of the post.
#[derive(Debug)]
pub enum ItemOutcome {
    /// Staged in cloud storage.
    Uploaded { url: String },
    /// Upload failed; the item is skipped.
    UploadFailed { error: UploadError },
}

/// Per-item record in the publish report.
#[derive(Debug)]
pub struct ItemRecord {
    /// Local video path.
    pub video: PathBuf,
    pub outcome: ItemOutcome,
}

/// Final outcome for the folder.
#[derive(Debug)]
pub enum PostOutcome {
    /// The post went out.
    Published(PublishedPost),
    /// The post was aborted; nothing was published.
    Aborted(PublishFailure),
}

/// Report for one publish attempt over one folder.
#[derive(Debug)]
pub struct PublishReport {
    /// Folder the attempt was for.
    pub folder_name: String,
    /// When the attempt started.
    pub started_at: DateTime<Utc>,
    /// Per-item upload records.
    pub items: Vec<ItemRecord>,
    pub outcome: PostOutcome,
}

impl PublishReport {
    /// Number of successfully staged items.
    pub fn uploaded(&self) -> usize {
        self.items
            .iter()
            .filter(|i| matches!(i.outcome, ItemOutcome::Uploaded { .. }))
            .count()
    }

    /// Whether the post was published.
    pub fn is_published(&self) -> bool {
        matches!(self.outcome, PostOutcome::Published(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_counters() {
        let report = PublishReport {
            folder_name: "R".to_string(),
            started_at: Utc::now(),
            items: vec![
                ItemRecord {
                    video: PathBuf::from("/r/track-01.mp4"),
                    outcome: ItemOutcome::Uploaded {
                        url: "https://cdn/x.mp4".to_string(),
                    },
                },
                ItemRecord {
                    video: PathBuf::from("/r/track-02.mp4"),
                    outcome: ItemOutcome::UploadFailed {
                        error: UploadError::NotConfigured("x".to_string()),
                    },
                },
            ],
            outcome: PostOutcome::Aborted(PublishFailure::NoUploadableMedia),
        };

        assert_eq!(report.uploaded(), 1);
        assert!(!report.is_published());
    }
}
