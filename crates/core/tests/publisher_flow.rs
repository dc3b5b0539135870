//! Publisher flow integration tests.
//!
//! These tests drive the upload + container + publish flow with mock
//! store and Graph API over real release folders:
//! - single-video reel flow
//! - carousel container counts and ordering
//! - stuck/failed containers aborting the post
//! - upload failure isolation
//! - bounded publish retry on throttling

use tempfile::TempDir;

use digger_core::config::PublisherConfig;
use digger_core::instagram::{ContainerStatus, PublishError};
use digger_core::publisher::{PostOutcome, PublishFailure, PublishRunner};
use digger_core::selector::{self, ReleaseFolder};
use digger_core::testing::{fixtures, MockGraphApi, MockStore, RecordedContainer};

struct TestHarness {
    output_root: TempDir,
    store: MockStore,
    graph: MockGraphApi,
    runner: PublishRunner<MockStore, MockGraphApi>,
}

impl TestHarness {
    fn new() -> Self {
        Self::with_config(fast_config())
    }

    fn with_config(config: PublisherConfig) -> Self {
        let output_root = TempDir::new().expect("Failed to create temp dir");
        let store = MockStore::new();
        let graph = MockGraphApi::new();
        let runner = PublishRunner::new(config, store.clone(), graph.clone());

        Self {
            output_root,
            store,
            graph,
            runner,
        }
    }

    async fn folder(&self, name: &str, videos: u32) -> ReleaseFolder {
        fixtures::write_release_folder(self.output_root.path(), name, videos).await;
        let eligible = selector::scan(self.output_root.path()).await.unwrap();
        eligible
            .into_iter()
            .find(|f| f.name == name)
            .expect("folder should be eligible")
    }
}

fn fast_config() -> PublisherConfig {
    PublisherConfig {
        poll_interval_secs: 1,
        processing_timeout_secs: 0,
        publish_attempts: 2,
        thumb_offset_secs: 1,
    }
}

#[tokio::test]
async fn test_single_video_publishes_as_reel() {
    let harness = TestHarness::new();
    let folder = harness.folder("Solo", 1).await;

    let report = harness.runner.publish_folder(&folder).await;

    assert!(report.is_published());
    assert_eq!(report.uploaded(), 1);

    let containers = harness.graph.recorded_containers().await;
    assert_eq!(containers.len(), 1);
    match &containers[0].1 {
        RecordedContainer::Reel { video_url, caption } => {
            assert!(video_url.contains("Solo"));
            assert_eq!(caption, "Release: Solo\n");
        }
        other => panic!("expected a reel container, got {:?}", other),
    }

    assert_eq!(harness.graph.publish_count().await, 1);
}

#[tokio::test]
async fn test_carousel_creates_children_parent_and_one_publish() {
    let harness = TestHarness::new();
    let folder = harness.folder("Triple", 3).await;

    let report = harness.runner.publish_folder(&folder).await;
    assert!(report.is_published());

    let containers = harness.graph.recorded_containers().await;
    // Exactly 3 children + 1 parent.
    assert_eq!(containers.len(), 4);

    let child_ids: Vec<String> = containers
        .iter()
        .filter(|(_, c)| matches!(c, RecordedContainer::CarouselItem { .. }))
        .map(|(id, _)| id.clone())
        .collect();
    assert_eq!(child_ids.len(), 3);

    match &containers[3].1 {
        RecordedContainer::Carousel { children, caption } => {
            assert_eq!(children, &child_ids);
            assert_eq!(caption, "Release: Triple\n");
        }
        other => panic!("expected a carousel parent, got {:?}", other),
    }

    let publishes = harness.graph.recorded_publishes().await;
    assert_eq!(publishes, vec![containers[3].0.clone()]);
}

#[tokio::test]
async fn test_stuck_child_aborts_whole_carousel() {
    let harness = TestHarness::new();
    let folder = harness.folder("Stuck", 3).await;
    // Child 2 never leaves processing; timeout is zero so the abort is
    // immediate.
    harness
        .graph
        .set_status("container-2", ContainerStatus::InProgress)
        .await;

    let report = harness.runner.publish_folder(&folder).await;

    match report.outcome {
        PostOutcome::Aborted(PublishFailure::Graph(PublishError::ProcessingTimeout {
            ref container_id,
            ..
        })) => assert_eq!(container_id, "container-2"),
        ref other => panic!("expected processing timeout, got {:?}", other),
    }

    // The children exist upstream but no parent was created and nothing
    // was published: no partial carousel.
    assert_eq!(harness.graph.container_count().await, 3);
    assert_eq!(harness.graph.publish_count().await, 0);
}

#[tokio::test]
async fn test_failed_child_aborts_whole_carousel() {
    let harness = TestHarness::new();
    let folder = harness.folder("Errored", 2).await;
    harness
        .graph
        .set_status("container-1", ContainerStatus::Error)
        .await;

    let report = harness.runner.publish_folder(&folder).await;

    assert!(matches!(
        report.outcome,
        PostOutcome::Aborted(PublishFailure::Graph(PublishError::ContainerFailed { .. }))
    ));
    assert_eq!(harness.graph.publish_count().await, 0);
}

#[tokio::test]
async fn test_upload_failure_skips_item_but_posts_rest() {
    let harness = TestHarness::new();
    let folder = harness.folder("Gappy", 3).await;
    harness.store.fail_keys_containing("track-02").await;

    let report = harness.runner.publish_folder(&folder).await;

    assert!(report.is_published());
    assert_eq!(report.uploaded(), 2);
    assert_eq!(harness.store.upload_count().await, 3);

    // The carousel only references the two staged items.
    let containers = harness.graph.recorded_containers().await;
    let children: Vec<_> = containers
        .iter()
        .filter(|(_, c)| matches!(c, RecordedContainer::CarouselItem { .. }))
        .collect();
    assert_eq!(children.len(), 2);
}

#[tokio::test]
async fn test_all_uploads_failed_aborts_without_containers() {
    let harness = TestHarness::new();
    let folder = harness.folder("Offline", 2).await;
    harness.store.fail_keys_containing("track-").await;

    let report = harness.runner.publish_folder(&folder).await;

    assert!(matches!(
        report.outcome,
        PostOutcome::Aborted(PublishFailure::NoUploadableMedia)
    ));
    assert_eq!(report.uploaded(), 0);
    assert_eq!(harness.graph.container_count().await, 0);
    assert_eq!(harness.graph.publish_count().await, 0);
}

#[tokio::test]
async fn test_throttled_publish_retries_within_budget() {
    let harness = TestHarness::new();
    let folder = harness.folder("Throttled", 1).await;
    harness.graph.throttle_next_publishes(1).await;

    let report = harness.runner.publish_folder(&folder).await;

    assert!(report.is_published());
    assert_eq!(harness.graph.publish_count().await, 2);
}

#[tokio::test]
async fn test_throttled_publish_surfaces_after_budget() {
    let harness = TestHarness::new();
    let folder = harness.folder("VeryThrottled", 1).await;
    harness.graph.throttle_next_publishes(5).await;

    let report = harness.runner.publish_folder(&folder).await;

    assert!(matches!(
        report.outcome,
        PostOutcome::Aborted(PublishFailure::Graph(PublishError::RateLimited { .. }))
    ));
    // publish_attempts = 2: no blind retrying beyond the budget.
    assert_eq!(harness.graph.publish_count().await, 2);
}
