//! Mock Graph API for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::instagram::{ContainerStatus, GraphApi, IgAccount, PublishError, PublishedPost};

/// What kind of container a call created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedContainer {
    /// Single-video REELS container.
    Reel { video_url: String, caption: String },
    /// Carousel child container.
    CarouselItem { video_url: String },
    /// Carousel parent container.
    Carousel {
        children: Vec<String>,
        caption: String,
    },
}

/// Mock implementation of the GraphApi trait.
///
/// Container ids are deterministic ("container-1", "container-2", ...)
/// in creation order, so tests can target a specific container with
/// `set_status`.
#[derive(Debug, Clone)]
pub struct MockGraphApi {
    /// Created containers, in order.
    containers: Arc<RwLock<Vec<(String, RecordedContainer)>>>,
    /// Status override per container id; unknown ids report Finished.
    statuses: Arc<RwLock<HashMap<String, ContainerStatus>>>,
    /// Publish calls (creation ids), in order.
    publishes: Arc<RwLock<Vec<String>>>,
    /// Fail this many upcoming publish calls with throttling.
    throttled_publishes: Arc<RwLock<u32>>,
    /// Accounts returned by the lookup.
    accounts: Arc<RwLock<Vec<IgAccount>>>,
}

impl Default for MockGraphApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGraphApi {
    /// Create a new mock Graph API.
    pub fn new() -> Self {
        Self {
            containers: Arc::new(RwLock::new(Vec::new())),
            statuses: Arc::new(RwLock::new(HashMap::new())),
            publishes: Arc::new(RwLock::new(Vec::new())),
            throttled_publishes: Arc::new(RwLock::new(0)),
            accounts: Arc::new(RwLock::new(Vec::new())),
        }
    }

    async fn next_id(&self) -> String {
        format!("container-{}", self.containers.read().await.len() + 1)
    }

    /// All created containers with their ids.
    pub async fn recorded_containers(&self) -> Vec<(String, RecordedContainer)> {
        self.containers.read().await.clone()
    }

    /// Number of created containers.
    pub async fn container_count(&self) -> usize {
        self.containers.read().await.len()
    }

    /// All publish calls.
    pub async fn recorded_publishes(&self) -> Vec<String> {
        self.publishes.read().await.clone()
    }

    /// Number of publish calls.
    pub async fn publish_count(&self) -> usize {
        self.publishes.read().await.len()
    }

    /// Override the status a container reports.
    pub async fn set_status(&self, container_id: impl Into<String>, status: ContainerStatus) {
        self.statuses.write().await.insert(container_id.into(), status);
    }

    /// Throttle the next `count` publish calls.
    pub async fn throttle_next_publishes(&self, count: u32) {
        *self.throttled_publishes.write().await = count;
    }

    /// Set the accounts returned by the lookup.
    pub async fn set_accounts(&self, accounts: Vec<IgAccount>) {
        *self.accounts.write().await = accounts;
    }
}

#[async_trait]
impl GraphApi for MockGraphApi {
    async fn create_reel_container(
        &self,
        video_url: &str,
        caption: &str,
        _thumb_offset_secs: u64,
    ) -> Result<String, PublishError> {
        let id = self.next_id().await;
        self.containers.write().await.push((
            id.clone(),
            RecordedContainer::Reel {
                video_url: video_url.to_string(),
                caption: caption.to_string(),
            },
        ));
        Ok(id)
    }

    async fn create_carousel_item(&self, video_url: &str) -> Result<String, PublishError> {
        let id = self.next_id().await;
        self.containers.write().await.push((
            id.clone(),
            RecordedContainer::CarouselItem {
                video_url: video_url.to_string(),
            },
        ));
        Ok(id)
    }

    async fn create_carousel(
        &self,
        children: &[String],
        caption: &str,
    ) -> Result<String, PublishError> {
        let id = self.next_id().await;
        self.containers.write().await.push((
            id.clone(),
            RecordedContainer::Carousel {
                children: children.to_vec(),
                caption: caption.to_string(),
            },
        ));
        Ok(id)
    }

    async fn container_status(&self, container_id: &str) -> Result<ContainerStatus, PublishError> {
        let statuses = self.statuses.read().await;
        Ok(statuses
            .get(container_id)
            .cloned()
            .unwrap_or(ContainerStatus::Finished))
    }

    async fn publish(&self, creation_id: &str) -> Result<PublishedPost, PublishError> {
        self.publishes.write().await.push(creation_id.to_string());

        let mut throttled = self.throttled_publishes.write().await;
        if *throttled > 0 {
            *throttled -= 1;
            return Err(PublishError::RateLimited {
                message: "mock: application request limit reached".to_string(),
            });
        }

        Ok(PublishedPost {
            media_id: format!("media-{}", self.publishes.read().await.len()),
        })
    }

    async fn lookup_business_accounts(&self) -> Result<Vec<IgAccount>, PublishError> {
        Ok(self.accounts.read().await.clone())
    }
}
