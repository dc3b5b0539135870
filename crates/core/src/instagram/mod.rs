//! Instagram Graph API integration.
//!
//! The Graph API publishes media in two phases: a server-side container
//! is created per asset (REELS for a single video, VIDEO children plus a
//! CAROUSEL parent for multi-item posts), polled until processed, then
//! published. The [`GraphApi`] trait covers exactly those endpoints plus
//! the one-time business account lookup; [`GraphClient`] is the real
//! implementation.

mod graph;
mod types;

pub use graph::GraphClient;
pub use types::{ContainerStatus, IgAccount, PublishedPost};

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while talking to the Graph API.
#[derive(Debug, Error)]
pub enum PublishError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API throttled the call.
    #[error("Graph API rate limited: {message}")]
    RateLimited { message: String },

    /// The API rejected the call.
    #[error("Graph API error: {status} - {message}")]
    Api {
        status: u16,
        code: Option<i64>,
        message: String,
    },

    /// A container finished in a failure state.
    #[error("Container {container_id} ended in state {status:?}")]
    ContainerFailed {
        container_id: String,
        status: ContainerStatus,
    },

    /// A container never finished processing within the timeout.
    #[error("Container {container_id} still processing after {waited_secs}s")]
    ProcessingTimeout {
        container_id: String,
        waited_secs: u64,
    },

    /// Response shape was unusable.
    #[error("Unexpected response shape: {reason}")]
    Parse { reason: String },

    /// Client not configured (missing token or account id).
    #[error("Client not configured: {0}")]
    NotConfigured(String),
}

impl PublishError {
    /// Creates a parse error.
    pub fn parse(reason: impl Into<String>) -> Self {
        Self::Parse {
            reason: reason.into(),
        }
    }

    /// Whether a bounded retry makes sense. Publishing is irreversible,
    /// so only throttling qualifies.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }
}

/// The Graph API surface the publisher needs.
#[async_trait]
pub trait GraphApi: Send + Sync {
    /// Creates a REELS container for a single-video post.
    async fn create_reel_container(
        &self,
        video_url: &str,
        caption: &str,
        thumb_offset_secs: u64,
    ) -> Result<String, PublishError>;

    /// Creates a carousel child container for one video.
    async fn create_carousel_item(&self, video_url: &str) -> Result<String, PublishError>;

    /// Creates the carousel parent container referencing the children.
    async fn create_carousel(
        &self,
        children: &[String],
        caption: &str,
    ) -> Result<String, PublishError>;

    /// Reads a container's processing status.
    async fn container_status(&self, container_id: &str) -> Result<ContainerStatus, PublishError>;

    /// Publishes a finished container.
    async fn publish(&self, creation_id: &str) -> Result<PublishedPost, PublishError>;

    /// One-time lookup of the Instagram business accounts reachable from
    /// the token's pages.
    async fn lookup_business_accounts(&self) -> Result<Vec<IgAccount>, PublishError>;
}
