//! Generator pipeline integration tests.
//!
//! These tests drive the full per-release generation flow with mock
//! media tools over a real temp directory:
//! - folder shape (metadata file + per-track videos)
//! - idempotent re-runs
//! - per-track failure isolation
//! - short-source policies
//! - transcode retry behavior

use std::path::Path;

use tempfile::TempDir;

use digger_core::config::{GeneratorConfig, ShortSourcePolicy};
use digger_core::generator::{TrackFailure, TrackOutcome, VideoGenerator};
use digger_core::release::{Release, METADATA_FILE_NAME};
use digger_core::selector;
use digger_core::testing::{fixtures, MockFetcher, MockTranscoder};

struct TestHarness {
    output_root: TempDir,
    transcoder: MockTranscoder,
    fetcher: MockFetcher,
    generator: VideoGenerator<MockTranscoder, MockFetcher>,
}

impl TestHarness {
    fn new() -> Self {
        Self::with_config(GeneratorConfig::default())
    }

    fn with_config(config: GeneratorConfig) -> Self {
        let output_root = TempDir::new().expect("Failed to create temp dir");
        let transcoder = MockTranscoder::new();
        let fetcher = MockFetcher::new();
        let generator = VideoGenerator::new(
            config,
            transcoder.clone(),
            fetcher.clone(),
            "digger-tests/0.1",
        )
        .expect("Failed to create generator");

        Self {
            output_root,
            transcoder,
            fetcher,
            generator,
        }
    }

    fn root(&self) -> &Path {
        self.output_root.path()
    }

    async fn release_with_cover(&self, title: &str, tracks: u32) -> Release {
        let release = fixtures::release(title, tracks);
        fixtures::place_cover(self.root(), &release).await;
        release
    }
}

#[tokio::test]
async fn test_full_release_produces_expected_folder() {
    let harness = TestHarness::new();
    let release = harness.release_with_cover("Test Album", 3).await;

    let report = harness
        .generator
        .run(&release, harness.root())
        .await
        .unwrap();

    assert_eq!(report.generated(), 3);
    assert_eq!(report.failed(), 0);

    let folder = harness.root().join("Test Album");
    assert!(folder.join(METADATA_FILE_NAME).exists());
    for position in 1..=3 {
        assert!(folder.join(format!("track-{:02}.mp4", position)).exists());
    }

    // One fetch per track, queries carry artist + release + track title.
    let queries = harness.fetcher.recorded_queries().await;
    assert_eq!(queries.len(), 3);
    assert!(queries[0].contains("Fixture Artist"));
    assert!(queries[0].contains("Track 1"));

    // The selector now considers the folder eligible.
    let eligible = selector::scan(harness.root()).await.unwrap();
    assert_eq!(eligible.len(), 1);
    assert_eq!(eligible[0].videos.len(), 3);
}

#[tokio::test]
async fn test_rerun_is_idempotent() {
    let harness = TestHarness::new();
    let release = harness.release_with_cover("Idempotent", 2).await;

    let first = harness
        .generator
        .run(&release, harness.root())
        .await
        .unwrap();
    assert_eq!(first.generated(), 2);
    assert_eq!(harness.transcoder.render_count().await, 2);

    let second = harness
        .generator
        .run(&release, harness.root())
        .await
        .unwrap();
    assert_eq!(second.generated(), 0);
    assert_eq!(second.already_present(), 2);

    // No new transcoding and no new downloads on the re-run.
    assert_eq!(harness.transcoder.render_count().await, 2);
    assert_eq!(harness.fetcher.fetch_count().await, 2);
}

#[tokio::test]
async fn test_unresolvable_track_is_skipped_not_fatal() {
    let harness = TestHarness::new();
    let release = harness.release_with_cover("Partial", 3).await;
    harness.fetcher.fail_queries_containing("Track 2").await;

    let report = harness
        .generator
        .run(&release, harness.root())
        .await
        .unwrap();

    assert_eq!(report.generated(), 2);
    assert_eq!(report.failed(), 1);

    let failed: Vec<_> = report.failures().collect();
    assert_eq!(failed[0].position, 2);
    assert!(matches!(
        failed[0].outcome,
        TrackOutcome::Failed {
            failure: TrackFailure::Resolution(_)
        }
    ));

    let folder = harness.root().join("Partial");
    assert!(folder.join(METADATA_FILE_NAME).exists());
    assert!(folder.join("track-01.mp4").exists());
    assert!(!folder.join("track-02.mp4").exists());
    assert!(folder.join("track-03.mp4").exists());
}

#[tokio::test]
async fn test_short_source_rejected_by_default() {
    let harness = TestHarness::new();
    let release = harness.release_with_cover("Short", 1).await;
    // Shorter than the 90 + 30 second window.
    harness.transcoder.set_default_duration(100.0).await;

    let report = harness
        .generator
        .run(&release, harness.root())
        .await
        .unwrap();

    assert_eq!(report.failed(), 1);
    let failed: Vec<_> = report.failures().collect();
    assert!(matches!(
        failed[0].outcome,
        TrackOutcome::Failed {
            failure: TrackFailure::SourceTooShort {
                required_secs: 120,
                ..
            }
        }
    ));
    // No clip was attempted from the wrong window.
    assert_eq!(harness.transcoder.render_count().await, 0);
}

#[tokio::test]
async fn test_short_source_from_start_policy() {
    let config = GeneratorConfig {
        short_source_policy: ShortSourcePolicy::FromStart,
        ..GeneratorConfig::default()
    };
    let harness = TestHarness::with_config(config);
    let release = harness.release_with_cover("ShortOk", 1).await;
    harness.transcoder.set_default_duration(100.0).await;

    let report = harness
        .generator
        .run(&release, harness.root())
        .await
        .unwrap();
    assert_eq!(report.generated(), 1);

    let renders = harness.transcoder.recorded_renders().await;
    assert_eq!(renders.len(), 1);
    assert_eq!(renders[0].job.start_secs, 0);
    assert_eq!(renders[0].job.duration_secs, 30);
}

#[tokio::test]
async fn test_transcode_retried_once_then_succeeds() {
    let harness = TestHarness::new();
    let release = harness.release_with_cover("Retry", 1).await;
    harness.transcoder.fail_next_renders(1).await;

    let report = harness
        .generator
        .run(&release, harness.root())
        .await
        .unwrap();

    assert_eq!(report.generated(), 1);
    // First attempt failed, retry succeeded.
    assert_eq!(harness.transcoder.render_count().await, 2);
}

#[tokio::test]
async fn test_transcode_permanent_failure_after_retry() {
    let harness = TestHarness::new();
    let release = harness.release_with_cover("Broken", 2).await;
    harness.transcoder.fail_all_renders().await;

    let report = harness
        .generator
        .run(&release, harness.root())
        .await
        .unwrap();

    assert_eq!(report.generated(), 0);
    assert_eq!(report.failed(), 2);
    // Exactly one retry per track, then permanent skip.
    assert_eq!(harness.transcoder.render_count().await, 4);

    let failed: Vec<_> = report.failures().collect();
    assert!(matches!(
        failed[0].outcome,
        TrackOutcome::Failed {
            failure: TrackFailure::Transcode(_)
        }
    ));
}

#[tokio::test]
async fn test_missing_cover_aborts_videos_but_keeps_metadata() {
    let harness = TestHarness::new();
    let mut release = fixtures::release("NoCover", 2);
    release.images.clear();
    // No pre-placed cover and no image URLs to download.

    let report = harness
        .generator
        .run(&release, harness.root())
        .await
        .unwrap();

    assert!(report.cover_error.is_some());
    assert!(report.tracks.is_empty());
    assert_eq!(harness.fetcher.fetch_count().await, 0);

    let folder = harness.root().join("NoCover");
    assert!(folder.join(METADATA_FILE_NAME).exists());

    // Without videos the folder is not eligible for publishing.
    let eligible = selector::scan(harness.root()).await.unwrap();
    assert!(eligible.is_empty());
}
