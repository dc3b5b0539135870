//! Testing utilities and mock implementations for E2E tests.
//!
//! This module provides mock implementations of the external tool and
//! service traits, allowing the two pipelines to be exercised end to end
//! without ffmpeg, yt-dlp, a bucket or a Graph API token.
//!
//! # Example
//!
//! ```rust,ignore
//! use digger_core::testing::{MockFetcher, MockGraphApi, MockStore, MockTranscoder};
//!
//! let transcoder = MockTranscoder::new();
//! let fetcher = MockFetcher::new();
//!
//! // Configure behavior
//! fetcher.fail_queries_containing("Track Two").await;
//! transcoder.fail_next_renders(1).await;
//!
//! // Use in VideoGenerator / PublishRunner...
//! ```

mod mock_fetcher;
mod mock_graph;
mod mock_store;
mod mock_transcoder;

pub use mock_fetcher::MockFetcher;
pub use mock_graph::{MockGraphApi, RecordedContainer};
pub use mock_store::MockStore;
pub use mock_transcoder::{MockTranscoder, RecordedRender};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::{Path, PathBuf};

    use crate::release::{CoverArt, PriceSummary, Release, Track, METADATA_FILE_NAME};

    /// Create a test release with the given number of tracks.
    pub fn release(title: &str, track_count: u32) -> Release {
        let tracks = (1..=track_count)
            .map(|position| Track {
                position,
                side_position: Some(format!("A{}", position)),
                title: format!("Track {}", position),
                duration: Some("3:30".to_string()),
                artists: None,
            })
            .collect();

        Release {
            id: 1_234_567,
            title: title.to_string(),
            artists: vec!["Fixture Artist".to_string()],
            year: Some(1995),
            country: Some("US".to_string()),
            labels: vec!["Fixture Records".to_string()],
            tracks,
            images: vec![CoverArt {
                uri: "https://img.test/full.jpg".to_string(),
                thumbnail: Some("https://img.test/thumb.jpg".to_string()),
            }],
            prices: Some(PriceSummary {
                currency: "USD".to_string(),
                min: Some(4.0),
                median: Some(11.0),
                max: Some(25.0),
            }),
        }
    }

    /// Pre-place a cover image for a release, so generator tests never
    /// reach for the network.
    pub async fn place_cover(output_root: &Path, release: &Release) -> PathBuf {
        let folder = output_root.join(release.folder_name());
        tokio::fs::create_dir_all(&folder).await.unwrap();
        let cover = folder.join(crate::release::COVER_FILE_NAME);
        tokio::fs::write(&cover, b"jpeg").await.unwrap();
        cover
    }

    /// Write a complete release folder (metadata + videos) under `root`,
    /// the way the generator stage would leave it.
    pub async fn write_release_folder(root: &Path, name: &str, videos: u32) -> PathBuf {
        let folder = root.join(name);
        tokio::fs::create_dir_all(&folder).await.unwrap();
        tokio::fs::write(folder.join(METADATA_FILE_NAME), format!("Release: {}\n", name))
            .await
            .unwrap();
        for position in 1..=videos {
            tokio::fs::write(folder.join(format!("track-{:02}.mp4", position)), b"mp4")
                .await
                .unwrap();
        }
        folder
    }
}
