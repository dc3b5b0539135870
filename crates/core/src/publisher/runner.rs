//! Publish flow implementation.

use chrono::Utc;
use tokio::time::{sleep, Duration, Instant};
use tracing::{info, warn};

use crate::config::PublisherConfig;
use crate::instagram::{GraphApi, PublishError, PublishedPost};
use crate::selector::ReleaseFolder;
use crate::storage::MediaStore;

use super::types::{ItemOutcome, ItemRecord, PostOutcome, PublishFailure, PublishReport};

/// Drives the upload + container + publish flow for one folder at a time.
pub struct PublishRunner<S: MediaStore, G: GraphApi> {
    config: PublisherConfig,
    store: S,
    graph: G,
}

impl<S: MediaStore, G: GraphApi> PublishRunner<S, G> {
    /// Creates a new runner.
    pub fn new(config: PublisherConfig, store: S, graph: G) -> Self {
        Self {
            config,
            store,
            graph,
        }
    }

    /// Publishes one eligible folder. Never panics or errors out: every
    /// result, including aborts, lands in the report.
    pub async fn publish_folder(&self, folder: &ReleaseFolder) -> PublishReport {
        let mut report = PublishReport {
            folder_name: folder.name.clone(),
            started_at: Utc::now(),
            items: Vec::new(),
            outcome: PostOutcome::Aborted(PublishFailure::NoUploadableMedia),
        };

        let caption = match folder.caption().await {
            Ok(caption) => caption,
            Err(e) => {
                report.outcome = PostOutcome::Aborted(PublishFailure::Caption(e));
                return report;
            }
        };

        // Phase 1: stage every video; failures skip the item.
        let mut urls = Vec::new();
        for video in &folder.videos {
            let file_name = video
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            let key = format!("{}/{}", folder.name, file_name);

            match self.store.upload(video, &key).await {
                Ok(stored) => {
                    urls.push(stored.public_url.clone());
                    report.items.push(ItemRecord {
                        video: video.clone(),
                        outcome: ItemOutcome::Uploaded {
                            url: stored.public_url,
                        },
                    });
                }
                Err(error) => {
                    warn!(video = %video.display(), %error, "upload failed, skipping item");
                    report.items.push(ItemRecord {
                        video: video.clone(),
                        outcome: ItemOutcome::UploadFailed { error },
                    });
                }
            }
        }

        if urls.is_empty() {
            return report;
        }

        // Phase 2: containers, processing wait, publish.
        report.outcome = match self.create_and_publish(&urls, &caption).await {
            Ok(post) => {
                info!(folder = %folder.name, media_id = %post.media_id, "published");
                PostOutcome::Published(post)
            }
            Err(e) => {
                warn!(folder = %folder.name, error = %e, "publish aborted");
                PostOutcome::Aborted(e)
            }
        };
        report
    }

    async fn create_and_publish(
        &self,
        urls: &[String],
        caption: &str,
    ) -> Result<PublishedPost, PublishFailure> {
        let creation_id = if urls.len() == 1 {
            let id = self
                .graph
                .create_reel_container(&urls[0], caption, self.config.thumb_offset_secs)
                .await?;
            self.wait_for_container(&id).await?;
            id
        } else {
            let mut children = Vec::with_capacity(urls.len());
            for url in urls {
                children.push(self.graph.create_carousel_item(url).await?);
            }
            // Every child must finish before the parent references them;
            // a stuck child aborts the whole carousel.
            for child in &children {
                self.wait_for_container(child).await?;
            }
            let parent = self.graph.create_carousel(&children, caption).await?;
            self.wait_for_container(&parent).await?;
            parent
        };

        Ok(self.publish_with_bounded_retry(&creation_id).await?)
    }

    /// Polls a container until it is ready, fails terminally, or exceeds
    /// the processing timeout.
    async fn wait_for_container(&self, container_id: &str) -> Result<(), PublishError> {
        let timeout = Duration::from_secs(self.config.processing_timeout_secs);
        let poll_interval = Duration::from_secs(self.config.poll_interval_secs);
        let start = Instant::now();

        loop {
            let status = self.graph.container_status(container_id).await?;
            if status.is_ready() {
                return Ok(());
            }
            if status.is_terminal_failure() {
                return Err(PublishError::ContainerFailed {
                    container_id: container_id.to_string(),
                    status,
                });
            }
            if start.elapsed() >= timeout {
                return Err(PublishError::ProcessingTimeout {
                    container_id: container_id.to_string(),
                    waited_secs: start.elapsed().as_secs(),
                });
            }
            sleep(poll_interval).await;
        }
    }

    /// The publish call is an irreversible side effect: only throttling
    /// is retried, and only within the configured attempt budget.
    async fn publish_with_bounded_retry(
        &self,
        creation_id: &str,
    ) -> Result<PublishedPost, PublishError> {
        let attempts = self.config.publish_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.graph.publish(creation_id).await {
                Ok(post) => return Ok(post),
                Err(e) if e.is_retryable() && attempt < attempts => {
                    warn!(attempt, error = %e, "publish throttled, retrying");
                    sleep(Duration::from_secs(self.config.poll_interval_secs)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
